//! Cube-sphere geometry: face-to-direction mapping, quadtree tile addressing,
//! and conservative tile bounding volumes.

mod bounds;
mod cube_face;
mod tile_address;

pub use bounds::BoundingSphere;
pub use cube_face::{CubeFace, face_vector};
pub use tile_address::TileAddress;
