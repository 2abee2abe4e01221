//! Tile mesh construction: regular grid tessellation over a tile's UV range,
//! displaced through the height field, with optional edge skirts.

use glam::DVec3;
use tellus_cubesphere::{TileAddress, face_vector};
use tellus_terrain::HeightField;

use crate::TileVertex;

/// Geometry parameters for tile builds, shared by every tile of a planet.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TileMeshParams {
    /// Base sphere radius in km.
    pub planet_radius_km: f64,
    /// Quad cells per tile edge.
    pub grid: u32,
    /// How far skirt vertices drop below the surface, in km.
    /// Zero disables skirts.
    pub skirt_depth_km: f64,
}

/// Mesh generation failures.
///
/// These indicate a logic defect in the generator, not bad input: the
/// offending tile build is aborted rather than silently producing a
/// malformed buffer.
#[derive(Debug, thiserror::Error)]
pub enum MeshError {
    /// Generated vertex count does not match the precomputed total.
    #[error("tile {address}: generated {actual} vertices, expected {expected}")]
    VertexCountMismatch {
        /// The tile being built.
        address: TileAddress,
        /// Precomputed vertex total.
        expected: usize,
        /// Actually generated vertex count.
        actual: usize,
    },
    /// Generated index count does not match the precomputed total.
    #[error("tile {address}: generated {actual} indices, expected {expected}")]
    IndexCountMismatch {
        /// The tile being built.
        address: TileAddress,
        /// Precomputed index total.
        expected: usize,
        /// Actually generated index count.
        actual: usize,
    },
}

/// A CPU-side tile mesh: interleaved position+normal vertices and `u32`
/// triangle indices.
#[derive(Clone, Debug, Default)]
pub struct TileMesh {
    /// Interleaved vertex buffer.
    pub vertices: Vec<TileVertex>,
    /// Triangle index buffer, counter-clockwise viewed from outside.
    pub indices: Vec<u32>,
}

impl TileMesh {
    /// Vertex buffer contents as bytes for GPU upload.
    #[must_use]
    pub fn vertex_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.vertices)
    }

    /// Index buffer contents as bytes for GPU upload.
    #[must_use]
    pub fn index_bytes(&self) -> &[u8] {
        bytemuck::cast_slice(&self.indices)
    }

    /// Number of vertices.
    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Number of triangles.
    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// Build the renderable mesh for one tile.
///
/// Samples a `(grid + 1) × (grid + 1)` regular grid over the tile's UV
/// range. Each vertex sits at `dir * (planet_radius + height)` where `dir`
/// is the normalized [`face_vector`] of its sample point; the vertex normal
/// is that radial direction. The grid is triangulated into two triangles per
/// cell, wound counter-clockwise viewed from outside the sphere.
///
/// When skirts are enabled, one extra ring of vertices is emitted along each
/// of the four tile edges, each displaced inward from its parent edge vertex
/// by `skirt_depth_km` along the vertex normal, and stitched to the core
/// edge with outward-facing quads. Skirts sit below the true surface
/// regardless of local height and close the cracks against neighboring
/// tiles rendered at a different subdivision level.
pub fn build_tile_mesh(
    addr: &TileAddress,
    params: &TileMeshParams,
    height_field: &dyn HeightField,
) -> Result<TileMesh, MeshError> {
    debug_assert!(params.grid >= 1, "grid must have at least one cell");
    let g = params.grid as usize;
    let (u0, v0, u1, v1) = addr.uv_range();
    let skirted = params.skirt_depth_km > 0.0;

    let expected_vertices = (g + 1) * (g + 1) + if skirted { 4 * (g + 1) } else { 0 };
    let expected_indices = 6 * g * g + if skirted { 24 * g } else { 0 };

    let mut vertices = Vec::with_capacity(expected_vertices);
    let mut indices = Vec::with_capacity(expected_indices);

    // Core grid: rows walk v, columns walk u.
    for row in 0..=g {
        let v = v0 + (v1 - v0) * row as f64 / g as f64;
        for col in 0..=g {
            let u = u0 + (u1 - u0) * col as f64 / g as f64;
            let dir = face_vector(addr.face, u, v).normalize();
            let height = height_field.sample(dir);
            vertices.push(TileVertex::new(
                dir * (params.planet_radius_km + height),
                dir,
            ));
        }
    }

    // Two triangles per cell. The (u, v, radial) frame is right-handed, so
    // counter-clockwise in UV is counter-clockwise seen from outside.
    let stride = g + 1;
    for row in 0..g {
        for col in 0..g {
            let i00 = (row * stride + col) as u32;
            let i10 = i00 + 1;
            let i01 = i00 + stride as u32;
            let i11 = i01 + 1;
            indices.extend_from_slice(&[i00, i10, i11, i00, i11, i01]);
        }
    }

    if skirted {
        let bottom: Vec<u32> = (0..=g).map(|c| c as u32).collect();
        let top: Vec<u32> = (0..=g).map(|c| (g * stride + c) as u32).collect();
        let left: Vec<u32> = (0..=g).map(|r| (r * stride) as u32).collect();
        let right: Vec<u32> = (0..=g).map(|r| (r * stride + g) as u32).collect();

        // The flip flag keeps each skirt strip facing away from the tile:
        // edges traversed with the interior on their left need reversed
        // winding.
        for (edge, flip) in [(bottom, false), (right, false), (top, true), (left, true)] {
            emit_skirt(
                &mut vertices,
                &mut indices,
                &edge,
                params.skirt_depth_km,
                flip,
            );
        }
    }

    if vertices.len() != expected_vertices {
        return Err(MeshError::VertexCountMismatch {
            address: *addr,
            expected: expected_vertices,
            actual: vertices.len(),
        });
    }
    if indices.len() != expected_indices {
        return Err(MeshError::IndexCountMismatch {
            address: *addr,
            expected: expected_indices,
            actual: indices.len(),
        });
    }

    Ok(TileMesh { vertices, indices })
}

/// Emit one skirt ring: a lowered copy of each core edge vertex, stitched to
/// the core edge with two triangles per segment.
fn emit_skirt(
    vertices: &mut Vec<TileVertex>,
    indices: &mut Vec<u32>,
    edge: &[u32],
    depth_km: f64,
    flip: bool,
) {
    let base = vertices.len() as u32;
    for &core in edge {
        let parent = vertices[core as usize];
        let normal = DVec3::new(
            f64::from(parent.normal[0]),
            f64::from(parent.normal[1]),
            f64::from(parent.normal[2]),
        );
        let position = DVec3::new(
            f64::from(parent.position[0]),
            f64::from(parent.position[1]),
            f64::from(parent.position[2]),
        ) - normal * depth_km;
        // The skirt keeps its parent's normal so lighting does not crease at
        // the tile edge.
        vertices.push(TileVertex::new(position, normal));
    }

    for k in 0..edge.len() - 1 {
        let e0 = edge[k];
        let e1 = edge[k + 1];
        let s0 = base + k as u32;
        let s1 = s0 + 1;
        if flip {
            indices.extend_from_slice(&[e0, s1, s0, e0, e1, s1]);
        } else {
            indices.extend_from_slice(&[e0, s0, s1, e0, s1, e1]);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tellus_cubesphere::CubeFace;
    use tellus_terrain::FlatHeightField;

    const PLANET_RADIUS_KM: f64 = 3390.0;

    fn params(grid: u32, skirt_depth_km: f64) -> TileMeshParams {
        TileMeshParams {
            planet_radius_km: PLANET_RADIUS_KM,
            grid,
            skirt_depth_km,
        }
    }

    fn flat_build(addr: &TileAddress, grid: u32, skirt: f64) -> TileMesh {
        build_tile_mesh(addr, &params(grid, skirt), &FlatHeightField::default())
            .expect("build should succeed")
    }

    fn position(mesh: &TileMesh, i: usize) -> DVec3 {
        DVec3::new(
            f64::from(mesh.vertices[i].position[0]),
            f64::from(mesh.vertices[i].position[1]),
            f64::from(mesh.vertices[i].position[2]),
        )
    }

    #[test]
    fn test_vertex_and_index_counts_without_skirts() {
        let addr = TileAddress::root(CubeFace::PosX);
        let mesh = flat_build(&addr, 8, 0.0);
        assert_eq!(mesh.vertex_count(), 81);
        assert_eq!(mesh.indices.len(), 6 * 64);
        assert_eq!(mesh.triangle_count(), 128);
    }

    #[test]
    fn test_vertex_and_index_counts_with_skirts() {
        let addr = TileAddress::root(CubeFace::PosX);
        let mesh = flat_build(&addr, 8, 2.0);
        assert_eq!(mesh.vertex_count(), 81 + 4 * 9);
        assert_eq!(mesh.indices.len(), 6 * 64 + 24 * 8);
    }

    #[test]
    fn test_all_indices_are_in_range() {
        let addr = TileAddress::new(CubeFace::NegY, 3, 1, 6);
        let mesh = flat_build(&addr, 8, 2.0);
        let n = mesh.vertex_count() as u32;
        for &idx in &mesh.indices {
            assert!(idx < n, "index {idx} out of bounds (vertex count {n})");
        }
    }

    #[test]
    fn test_flat_field_core_vertices_lie_on_sphere() {
        let addr = TileAddress::new(CubeFace::PosZ, 2, 1, 3);
        let mesh = flat_build(&addr, 8, 0.0);
        for i in 0..mesh.vertex_count() {
            let r = position(&mesh, i).length();
            assert!(
                (r - PLANET_RADIUS_KM).abs() < 0.01,
                "vertex {i} not at planet radius: {r}"
            );
        }
    }

    #[test]
    fn test_heights_displace_radially() {
        let addr = TileAddress::new(CubeFace::PosX, 1, 0, 1);
        let mesh = build_tile_mesh(&addr, &params(8, 0.0), &FlatHeightField::new(5.0))
            .expect("build should succeed");
        for i in 0..mesh.vertex_count() {
            let r = position(&mesh, i).length();
            assert!(
                (r - (PLANET_RADIUS_KM + 5.0)).abs() < 0.01,
                "vertex {i} not lifted by height: {r}"
            );
        }
    }

    #[test]
    fn test_normals_are_radial_unit_vectors() {
        let addr = TileAddress::new(CubeFace::NegZ, 2, 2, 0);
        let mesh = flat_build(&addr, 8, 0.0);
        for (i, vertex) in mesh.vertices.iter().enumerate() {
            let n = DVec3::new(
                f64::from(vertex.normal[0]),
                f64::from(vertex.normal[1]),
                f64::from(vertex.normal[2]),
            );
            assert!((n.length() - 1.0).abs() < 1e-6, "normal {i} not unit");
            let p = position(&mesh, i).normalize();
            assert!(
                (n - p).length() < 1e-4,
                "normal {i} is not the radial direction"
            );
        }
    }

    #[test]
    fn test_core_triangles_face_outward() {
        let addr = TileAddress::new(CubeFace::PosY, 2, 1, 1);
        let mesh = flat_build(&addr, 8, 0.0);
        for tri in mesh.indices.chunks(3) {
            let p0 = position(&mesh, tri[0] as usize);
            let p1 = position(&mesh, tri[1] as usize);
            let p2 = position(&mesh, tri[2] as usize);
            let face_normal = (p1 - p0).cross(p2 - p0);
            let outward = (p0 + p1 + p2) / 3.0;
            assert!(
                face_normal.dot(outward) > 0.0,
                "triangle {tri:?} winds inward"
            );
        }
    }

    #[test]
    fn test_skirt_vertices_sit_below_their_edge_vertices() {
        let addr = TileAddress::new(CubeFace::PosX, 3, 4, 4);
        let grid = 8usize;
        let skirt = 2.0;
        let mesh = flat_build(&addr, grid as u32, skirt);

        let core_count = (grid + 1) * (grid + 1);
        for i in core_count..mesh.vertex_count() {
            let r = position(&mesh, i).length();
            assert!(
                (r - (PLANET_RADIUS_KM - skirt)).abs() < 0.01,
                "skirt vertex {i} not lowered by skirt depth: {r}"
            );
        }
    }

    #[test]
    fn test_skirts_stay_below_surface_for_any_bounded_height() {
        // With a nonzero height field, every skirt vertex must still sit
        // exactly skirt_depth below its parent, i.e. below the local surface.
        let addr = TileAddress::new(CubeFace::NegX, 2, 1, 2);
        let grid = 8usize;
        let skirt = 3.0;
        let mesh = build_tile_mesh(
            &addr,
            &params(grid as u32, skirt),
            &FlatHeightField::new(7.0),
        )
        .expect("build should succeed");

        let core_count = (grid + 1) * (grid + 1);
        for i in core_count..mesh.vertex_count() {
            let r = position(&mesh, i).length();
            assert!(
                (r - (PLANET_RADIUS_KM + 7.0 - skirt)).abs() < 0.01,
                "skirt vertex {i} is not skirt_depth below the surface: {r}"
            );
        }
    }

    #[test]
    fn test_adjacent_tiles_share_identical_edge_vertices() {
        // The right edge of (x, y) and the left edge of (x+1, y) sample the
        // same UV line, so their vertices must agree exactly.
        let grid = 8usize;
        let a = TileAddress::new(CubeFace::PosX, 3, 2, 5);
        let b = TileAddress::new(CubeFace::PosX, 3, 3, 5);
        let mesh_a = flat_build(&a, grid as u32, 0.0);
        let mesh_b = flat_build(&b, grid as u32, 0.0);

        let stride = grid + 1;
        for row in 0..=grid {
            let right_of_a = position(&mesh_a, row * stride + grid);
            let left_of_b = position(&mesh_b, row * stride);
            assert!(
                (right_of_a - left_of_b).length() < 1e-6,
                "boundary vertices diverge at row {row}"
            );
        }
    }

    #[test]
    fn test_deterministic_rebuild() {
        let addr = TileAddress::new(CubeFace::PosZ, 4, 9, 2);
        let a = flat_build(&addr, 16, 2.0);
        let b = flat_build(&addr, 16, 2.0);
        assert_eq!(a.vertices, b.vertices);
        assert_eq!(a.indices, b.indices);
    }

    #[test]
    fn test_byte_views_match_counts() {
        let addr = TileAddress::root(CubeFace::NegZ);
        let mesh = flat_build(&addr, 8, 2.0);
        assert_eq!(mesh.vertex_bytes().len(), mesh.vertex_count() * 24);
        assert_eq!(mesh.index_bytes().len(), mesh.indices.len() * 4);
    }
}
