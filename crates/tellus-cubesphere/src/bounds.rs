//! Conservative tile bounding spheres for frustum culling.

use glam::DVec3;

use crate::{TileAddress, face_vector};

/// A bounding sphere relative to the planet center, in kilometers.
#[derive(Clone, Copy, Debug)]
pub struct BoundingSphere {
    /// Center of the sphere, relative to the planet center.
    pub center: DVec3,
    /// Radius of the bounding sphere.
    pub radius: f64,
}

impl BoundingSphere {
    /// Compute a conservative bounding sphere for a tile, without building
    /// its mesh.
    ///
    /// The center is the surface point under the tile's UV midpoint at the
    /// base radius. The radius is the largest distance from that center to
    /// any of the four tile corners lifted to `planet_radius_km +
    /// max_height_km`, padded by `skirt_depth_km + max_height_km / 2`.
    ///
    /// The result must never be smaller than the extent of the mesh the tile
    /// would actually produce for any height field bounded by
    /// `[0, max_height_km]`, skirt ring included; culling correctness
    /// depends on it.
    #[must_use]
    pub fn for_tile(
        addr: &TileAddress,
        planet_radius_km: f64,
        max_height_km: f64,
        skirt_depth_km: f64,
    ) -> Self {
        let (u0, v0, u1, v1) = addr.uv_range();
        let (cu, cv) = addr.center_uv();

        let center = face_vector(addr.face, cu, cv).normalize() * planet_radius_km;

        let lifted = planet_radius_km + max_height_km;
        let mut radius: f64 = 0.0;
        for (u, v) in [(u0, v0), (u1, v0), (u0, v1), (u1, v1)] {
            let corner = face_vector(addr.face, u, v).normalize() * lifted;
            radius = radius.max(corner.distance(center));
        }

        Self {
            center,
            radius: radius + skirt_depth_km + max_height_km * 0.5,
        }
    }
}
