//! Multi-octave fractal Brownian motion height field.
//!
//! Composites octaves of simplex noise sampled in 3D sphere coordinates so
//! terrain is seamless across cube-face boundaries, then maps the result
//! into `[0, max_height_km]`.

use glam::DVec3;
use noise::{NoiseFn, Simplex};

use crate::HeightField;

/// Configuration for the fBm octave stack.
#[derive(Clone, Debug)]
pub struct FbmParams {
    /// Seed for deterministic generation.
    pub seed: u32,
    /// Number of noise octaves to composite. Typical range: 4–8.
    pub octaves: u32,
    /// Frequency multiplier between successive octaves.
    pub lacunarity: f64,
    /// Amplitude multiplier between successive octaves.
    pub persistence: f64,
    /// Frequency of the first octave, in cycles per planet radius.
    pub base_frequency: f64,
}

impl Default for FbmParams {
    fn default() -> Self {
        Self {
            seed: 0,
            octaves: 6,
            lacunarity: 2.0,
            persistence: 0.5,
            base_frequency: 2.0,
        }
    }
}

/// A procedural height field over the unit sphere.
///
/// Raw fBm output in `[-max_amplitude, +max_amplitude]` is normalized to
/// `[0, 1]` and scaled by `max_height_km`, so samples always respect the
/// height bound the bounding-sphere math assumes.
pub struct FbmHeightField {
    noise: Simplex,
    params: FbmParams,
    max_height_km: f64,
}

impl FbmHeightField {
    /// Create a height field whose output stays within `[0, max_height_km]`.
    #[must_use]
    pub fn new(params: FbmParams, max_height_km: f64) -> Self {
        Self {
            noise: Simplex::new(params.seed),
            params,
            max_height_km: max_height_km.max(0.0),
        }
    }

    /// Theoretical maximum absolute amplitude of the raw octave stack
    /// (geometric series sum).
    #[must_use]
    pub fn max_amplitude(&self) -> f64 {
        let mut sum = 0.0;
        let mut amp = 1.0;
        for _ in 0..self.params.octaves {
            sum += amp;
            amp *= self.params.persistence;
        }
        sum
    }

    /// Current parameters.
    #[must_use]
    pub fn params(&self) -> &FbmParams {
        &self.params
    }

    fn sample_raw(&self, dir: DVec3) -> f64 {
        let mut total = 0.0;
        let mut frequency = self.params.base_frequency;
        let mut amplitude = 1.0;

        for _ in 0..self.params.octaves {
            let p = dir * frequency;
            total += self.noise.get([p.x, p.y, p.z]) * amplitude;
            frequency *= self.params.lacunarity;
            amplitude *= self.params.persistence;
        }

        total
    }
}

impl HeightField for FbmHeightField {
    fn sample(&self, unit_dir: DVec3) -> f64 {
        let max_amp = self.max_amplitude();
        if max_amp == 0.0 {
            // Zero-octave stack: midpoint of the height range.
            return self.max_height_km * 0.5;
        }

        let normalized = (self.sample_raw(unit_dir) / max_amp + 1.0) * 0.5;
        (normalized * self.max_height_km).clamp(0.0, self.max_height_km)
    }
}
