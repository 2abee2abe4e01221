//! Per-frame orchestration of tile selection and the tile cache.

use std::sync::Arc;

use tracing::info;

use tellus_config::TerrainConfig;
use tellus_cubesphere::TileAddress;
use tellus_lod::{Camera, TileSelector};
use tellus_mesh::MeshError;
use tellus_terrain::HeightField;

use crate::{TerrainTile, TileCache};

/// The planetary terrain engine.
///
/// Owns the selector and the tile cache and is driven once per frame from
/// the render loop, on the thread that owns the graphics context:
/// [`update`](Self::update) recomputes the visible tile set for a camera,
/// [`renderables`](Self::renderables) materializes it into renderable tiles.
pub struct PlanetTerrain {
    selector: TileSelector,
    cache: TileCache,
    visible: Vec<TileAddress>,
}

impl PlanetTerrain {
    /// Create a terrain engine without a GPU device; tiles carry CPU meshes
    /// only.
    #[must_use]
    pub fn new(
        planet_radius_km: f64,
        config: TerrainConfig,
        height_field: Arc<dyn HeightField>,
    ) -> Self {
        let cache = TileCache::new(planet_radius_km, config, height_field);
        Self::from_parts(planet_radius_km, config, cache)
    }

    /// Create a terrain engine that uploads every built tile to the GPU.
    #[must_use]
    pub fn with_device(
        planet_radius_km: f64,
        config: TerrainConfig,
        height_field: Arc<dyn HeightField>,
        device: wgpu::Device,
    ) -> Self {
        let cache = TileCache::with_device(planet_radius_km, config, height_field, device);
        Self::from_parts(planet_radius_km, config, cache)
    }

    fn from_parts(planet_radius_km: f64, config: TerrainConfig, cache: TileCache) -> Self {
        info!(
            radius_km = planet_radius_km,
            grid = config.grid,
            max_level = config.max_level,
            cache_capacity = config.cache_capacity,
            "planetary terrain initialized"
        );
        Self {
            selector: TileSelector::new(planet_radius_km, config),
            cache,
            visible: Vec::new(),
        }
    }

    /// Recompute the visible tile set for this camera, replacing the prior
    /// set. Pure per-frame recomputation; no diffing against history.
    pub fn update(&mut self, camera: &Camera) {
        self.visible = self.selector.select(camera);
    }

    /// The tile addresses selected by the last [`update`](Self::update).
    #[must_use]
    pub fn visible(&self) -> &[TileAddress] {
        &self.visible
    }

    /// Materialize the visible set into renderable tiles for submission to
    /// the render backend.
    ///
    /// Meshes are built lazily: only tiles in the current visible set are
    /// constructed, and tiles already resident in the cache are reused.
    pub fn renderables(&mut self) -> Result<Vec<&TerrainTile>, MeshError> {
        for addr in &self.visible {
            self.cache.get_or_build(addr)?;
        }
        Ok(self
            .visible
            .iter()
            .map(|addr| self.cache.peek(addr).expect("tile built above"))
            .collect())
    }

    /// The tile cache, for bounds queries and statistics.
    #[must_use]
    pub fn cache(&self) -> &TileCache {
        &self.cache
    }

    /// Release every cached tile and clear the visible set.
    ///
    /// The engine stays usable afterwards, but calling this before drop makes
    /// GPU teardown explicit.
    pub fn dispose(&mut self) {
        self.visible.clear();
        self.cache.close();
    }
}
