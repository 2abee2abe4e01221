//! Tile mesh generation: vertex format, grid tessellation with skirts, and
//! GPU buffer upload.

mod gpu;
mod tile_mesh;
mod tile_vertex;

pub use gpu::GpuTileMesh;
pub use tile_mesh::{MeshError, TileMesh, TileMeshParams, build_tile_mesh};
pub use tile_vertex::{TILE_VERTEX_ATTRIBUTES, TILE_VERTEX_LAYOUT, TileVertex};
