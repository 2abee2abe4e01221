//! LRU cache of renderable terrain tiles.

use std::collections::VecDeque;
use std::sync::Arc;

use rustc_hash::FxHashMap;
use tracing::debug;

use tellus_config::TerrainConfig;
use tellus_cubesphere::{BoundingSphere, TileAddress};
use tellus_mesh::{GpuTileMesh, MeshError, TileMeshParams, build_tile_mesh};
use tellus_terrain::HeightField;

use crate::TerrainTile;

/// Running counters for cache behavior.
#[derive(Debug, Clone, Copy, Default)]
pub struct CacheStats {
    /// Lookups served from the cache.
    pub hits: u64,
    /// Lookups that required a build.
    pub misses: u64,
    /// Tiles built (equals `misses` unless a build failed).
    pub builds: u64,
    /// Tiles evicted and disposed.
    pub evictions: u64,
}

/// Builds, owns, and evicts renderable tile meshes.
///
/// Entries are keyed by [`TileAddress`] with recency tracked in a deque
/// (most-recently-used at the front). The resident count never exceeds the
/// configured capacity after an insertion: overflow synchronously disposes
/// the least-recently-used tile's GPU resources before `get_or_build`
/// returns.
pub struct TileCache {
    planet_radius_km: f64,
    config: TerrainConfig,
    height_field: Arc<dyn HeightField>,
    device: Option<wgpu::Device>,
    tiles: FxHashMap<TileAddress, TerrainTile>,
    recency: VecDeque<TileAddress>,
    stats: CacheStats,
}

impl TileCache {
    /// Create a cache that serves CPU meshes only (headless and test use).
    #[must_use]
    pub fn new(
        planet_radius_km: f64,
        config: TerrainConfig,
        height_field: Arc<dyn HeightField>,
    ) -> Self {
        Self {
            planet_radius_km,
            config,
            height_field,
            device: None,
            tiles: FxHashMap::default(),
            recency: VecDeque::new(),
            stats: CacheStats::default(),
        }
    }

    /// Create a cache that also uploads every built tile to the GPU.
    #[must_use]
    pub fn with_device(
        planet_radius_km: f64,
        config: TerrainConfig,
        height_field: Arc<dyn HeightField>,
        device: wgpu::Device,
    ) -> Self {
        let mut cache = Self::new(planet_radius_km, config, height_field);
        cache.device = Some(device);
        cache
    }

    /// Return the tile for `addr`, building it on a miss.
    ///
    /// A hit marks the tile most-recently-used. A miss samples the height
    /// field, triangulates, uploads (when a device is attached), inserts, and
    /// then evicts the least-recently-used entry while over capacity.
    pub fn get_or_build(&mut self, addr: &TileAddress) -> Result<&TerrainTile, MeshError> {
        if self.tiles.contains_key(addr) {
            self.stats.hits += 1;
            self.touch(addr);
            return Ok(self.tiles.get(addr).expect("hit entry present"));
        }

        self.stats.misses += 1;
        let mesh = build_tile_mesh(
            addr,
            &TileMeshParams {
                planet_radius_km: self.planet_radius_km,
                grid: self.config.grid,
                skirt_depth_km: self.config.skirt_depth_km,
            },
            self.height_field.as_ref(),
        )?;
        let gpu = self
            .device
            .as_ref()
            .map(|device| GpuTileMesh::upload(device, &mesh));
        let tile = TerrainTile::new(*addr, self.compute_bounds(addr), mesh, gpu);

        self.tiles.insert(*addr, tile);
        self.recency.push_front(*addr);
        self.stats.builds += 1;
        self.evict_over_capacity();

        Ok(self.tiles.get(addr).expect("tile just inserted"))
    }

    /// Conservative bounding sphere for a tile, without building its mesh.
    ///
    /// Used for culling before committing to a full build; the same bounds
    /// are stored on the tile when it is built.
    #[must_use]
    pub fn compute_bounds(&self, addr: &TileAddress) -> BoundingSphere {
        BoundingSphere::for_tile(
            addr,
            self.planet_radius_km,
            self.config.max_height_km,
            self.config.skirt_depth_km,
        )
    }

    /// The resident tile for `addr`, if any, without touching recency.
    #[must_use]
    pub fn peek(&self, addr: &TileAddress) -> Option<&TerrainTile> {
        self.tiles.get(addr)
    }

    /// Whether a tile is resident.
    #[must_use]
    pub fn contains(&self, addr: &TileAddress) -> bool {
        self.tiles.contains_key(addr)
    }

    /// Number of resident tiles.
    #[must_use]
    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    /// Whether the cache holds no tiles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }

    /// Running counters.
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.stats
    }

    /// Dispose every cached tile. Idempotent.
    pub fn close(&mut self) {
        let count = self.tiles.len();
        for (_, mut tile) in self.tiles.drain() {
            tile.dispose();
        }
        self.recency.clear();
        if count > 0 {
            debug!(tiles = count, "tile cache closed");
        }
    }

    fn touch(&mut self, addr: &TileAddress) {
        if let Some(pos) = self.recency.iter().position(|a| a == addr) {
            self.recency.remove(pos);
        }
        self.recency.push_front(*addr);
    }

    fn evict_over_capacity(&mut self) {
        while self.tiles.len() > self.config.cache_capacity {
            let Some(lru) = self.recency.pop_back() else {
                break;
            };
            if let Some(mut tile) = self.tiles.remove(&lru) {
                tile.dispose();
                self.stats.evictions += 1;
                debug!(address = %lru, "evicted least-recently-used tile");
            }
        }
    }
}

impl Drop for TileCache {
    fn drop(&mut self) {
        self.close();
    }
}
