//! Height-field sampling for planetary terrain.

mod fbm;
mod height_field;

pub use fbm::{FbmHeightField, FbmParams};
pub use height_field::{FlatHeightField, HeightField};
