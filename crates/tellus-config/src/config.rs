//! Clamped terrain tuning parameters.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Tuning parameters for the planetary terrain engine.
///
/// Values are clamped to documented floors at construction instead of being
/// rejected: bad tuning degrades gracefully rather than crashing a running
/// renderer. Once constructed a config is treated as immutable.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TerrainConfig {
    /// Quad cells per tile edge. Floor: 8.
    pub grid: u32,
    /// Maximum quadtree subdivision depth. Ceiling: the addressable maximum.
    pub max_level: u8,
    /// How far skirt vertices drop below the surface, in km. Floor: 0.
    pub skirt_depth_km: f64,
    /// Upper bound on height-field output, in km. Floor: 0.
    pub max_height_km: f64,
    /// Screen-space error threshold in pixels. Floor: 0.25.
    pub sse_threshold_px: f64,
    /// Maximum number of tiles resident in the cache. Floor: 16.
    pub cache_capacity: usize,
}

/// Finest subdivision level the tile addressing scheme supports.
const LEVEL_CEILING: u8 = 30;

impl TerrainConfig {
    /// Construct a config, clamping every value to its documented floor.
    #[must_use]
    pub fn new(
        grid: u32,
        max_level: u8,
        skirt_depth_km: f64,
        max_height_km: f64,
        sse_threshold_px: f64,
        cache_capacity: usize,
    ) -> Self {
        Self {
            grid,
            max_level,
            skirt_depth_km,
            max_height_km,
            sse_threshold_px,
            cache_capacity,
        }
        .clamped()
    }

    /// The default preset: 32×32 tile grids, 7 subdivision levels, a 2 px
    /// error threshold, and room for 256 cached tiles.
    #[must_use]
    pub fn defaults() -> Self {
        Self {
            grid: 32,
            max_level: 7,
            skirt_depth_km: 2.0,
            max_height_km: 10.0,
            sse_threshold_px: 2.0,
            cache_capacity: 256,
        }
    }

    /// Re-apply the clamping floors.
    ///
    /// Non-finite floats (and anything below a floor) land on the floor.
    #[must_use]
    pub fn clamped(self) -> Self {
        Self {
            grid: self.grid.max(8),
            max_level: self.max_level.min(LEVEL_CEILING),
            skirt_depth_km: floor_at(self.skirt_depth_km, 0.0),
            max_height_km: floor_at(self.max_height_km, 0.0),
            sse_threshold_px: floor_at(self.sse_threshold_px, 0.25),
            cache_capacity: self.cache_capacity.max(16),
        }
    }

    /// Load a config from a RON file, clamping the parsed values.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(ConfigError::ReadError)?;
        let config: Self = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
        Ok(config.clamped())
    }

    /// Save this config to a RON file.
    pub fn save(&self, path: &Path) -> Result<(), ConfigError> {
        let contents = ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
            .map_err(ConfigError::SerializeError)?;
        std::fs::write(path, contents).map_err(ConfigError::WriteError)
    }
}

impl Default for TerrainConfig {
    fn default() -> Self {
        Self::defaults()
    }
}

/// `value` if it is a finite number at or above `floor`, else `floor`.
fn floor_at(value: f64, floor: f64) -> f64 {
    if value >= floor && value.is_finite() {
        value
    } else {
        floor
    }
}
