//! A renderable terrain tile and its resource lifecycle.

use tellus_cubesphere::{BoundingSphere, TileAddress};
use tellus_mesh::{GpuTileMesh, TileMesh};

/// One renderable terrain tile, created on demand by the cache.
///
/// Owns the CPU mesh, its GPU upload when the cache was built with a device,
/// a conservative bounding sphere, and the address it was built from. A tile
/// is disposed exactly once: on LRU eviction, on cache shutdown, or by the
/// `Drop` guard if neither happened first.
pub struct TerrainTile {
    address: TileAddress,
    bounds: BoundingSphere,
    mesh: TileMesh,
    gpu: Option<GpuTileMesh>,
    disposed: bool,
}

impl TerrainTile {
    pub(crate) fn new(
        address: TileAddress,
        bounds: BoundingSphere,
        mesh: TileMesh,
        gpu: Option<GpuTileMesh>,
    ) -> Self {
        Self {
            address,
            bounds,
            mesh,
            gpu,
            disposed: false,
        }
    }

    /// The address this tile was built from.
    #[must_use]
    pub fn address(&self) -> TileAddress {
        self.address
    }

    /// Conservative bounding sphere around the tile's geometry.
    #[must_use]
    pub fn bounds(&self) -> &BoundingSphere {
        &self.bounds
    }

    /// The CPU-side mesh.
    #[must_use]
    pub fn mesh(&self) -> &TileMesh {
        &self.mesh
    }

    /// The GPU-resident mesh, if the cache uploads to a device.
    #[must_use]
    pub fn gpu(&self) -> Option<&GpuTileMesh> {
        self.gpu.as_ref()
    }

    /// Whether this tile's resources have been released.
    #[must_use]
    pub fn is_disposed(&self) -> bool {
        self.disposed
    }

    /// Release the tile's GPU resources.
    ///
    /// Calling this twice is a logic defect; the second call is a guarded
    /// no-op so a release build never double-frees.
    pub(crate) fn dispose(&mut self) {
        if self.disposed {
            debug_assert!(false, "tile {} disposed twice", self.address);
            return;
        }
        if let Some(gpu) = &self.gpu {
            gpu.destroy();
        }
        self.disposed = true;
    }
}

impl Drop for TerrainTile {
    fn drop(&mut self) {
        if !self.disposed {
            self.dispose();
        }
    }
}
