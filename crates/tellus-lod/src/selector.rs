//! Recursive tile selection against a screen-space error threshold.

use std::f64::consts::FRAC_PI_2;

use tellus_config::TerrainConfig;
use tellus_cubesphere::{BoundingSphere, CubeFace, TileAddress};

use crate::Camera;

/// Floor for the camera-to-tile distance estimate, guarding against division
/// by zero when the camera sits on or inside a tile's bounding sphere.
pub const DISTANCE_EPSILON_KM: f64 = 1e-3;

/// Biases the distance estimate low so tiles near the camera refine a level
/// earlier than the raw metric would demand, avoiding visible LOD popping.
const DISTANCE_BIAS: f64 = 0.8;

/// Empirical safety margin on the per-level geometric error estimate.
const ERROR_MARGIN: f64 = 1.5;

/// Walks the six face quadtrees once per update and emits the minimal set of
/// tile addresses that covers the sphere within the configured screen-space
/// error, skipping subtrees outside the view frustum.
pub struct TileSelector {
    planet_radius_km: f64,
    config: TerrainConfig,
}

impl TileSelector {
    /// Create a selector for a planet of the given radius.
    #[must_use]
    pub fn new(planet_radius_km: f64, config: TerrainConfig) -> Self {
        Self {
            planet_radius_km,
            config,
        }
    }

    /// Geometric error for tiles of the given level, in km.
    ///
    /// A cube face subtends a quarter great circle (`π/2`); each level halves
    /// the angular span, and dividing by the grid density estimates per-cell
    /// deviation from the true surface.
    #[must_use]
    pub fn geometric_error_km(&self, level: u8) -> f64 {
        let span = FRAC_PI_2 / f64::from(TileAddress::grid_size(level));
        ERROR_MARGIN * self.planet_radius_km * span / f64::from(self.config.grid)
    }

    /// Select the visible tile set for this camera.
    ///
    /// The result is a strict partition of the visible surface: no emitted
    /// address is an ancestor or descendant of another, and every emitted
    /// address passed the frustum test.
    #[must_use]
    pub fn select(&self, camera: &Camera) -> Vec<TileAddress> {
        let mut out = Vec::new();
        for face in CubeFace::ALL {
            self.visit(TileAddress::root(face), camera, &mut out);
        }
        out
    }

    fn visit(&self, addr: TileAddress, camera: &Camera, out: &mut Vec<TileAddress>) {
        let bounds = BoundingSphere::for_tile(
            &addr,
            self.planet_radius_km,
            self.config.max_height_km,
            self.config.skirt_depth_km,
        );

        // Culling a node discards its whole subtree; the bounds are
        // conservative supersets of every descendant's bounds.
        if !camera.sphere_in_frustum(bounds.center, bounds.radius) {
            return;
        }

        let dist = (camera.position.distance(bounds.center) - bounds.radius * DISTANCE_BIAS)
            .max(DISTANCE_EPSILON_KM);
        let sse = camera.sse_factor() * self.geometric_error_km(addr.level) / dist;

        if sse > self.config.sse_threshold_px && addr.level < self.config.max_level {
            for child in addr.children() {
                self.visit(child, camera, out);
            }
        } else {
            out.push(addr);
        }
    }
}
