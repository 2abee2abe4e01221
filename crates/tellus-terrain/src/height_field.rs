//! The height-field capability consumed by the tile builder.

use glam::DVec3;

/// A source of terrain height offsets over a spherical body.
///
/// Implementations must be pure and deterministic: the tile builder queries
/// `(grid + 1)²` samples per tile build and relies on identical directions
/// producing identical heights so that adjacent tile edges line up. Expensive
/// providers are expected to cache internally.
pub trait HeightField: Send + Sync {
    /// Height offset above the base sphere, in kilometers, at the given unit
    /// direction from the planet center.
    fn sample(&self, unit_dir: DVec3) -> f64;
}

/// A height field with the same offset everywhere.
///
/// `FlatHeightField::default()` is the zero field, i.e. a perfect sphere.
#[derive(Clone, Copy, Debug, Default)]
pub struct FlatHeightField {
    height_km: f64,
}

impl FlatHeightField {
    /// A constant height field at the given offset.
    #[must_use]
    pub fn new(height_km: f64) -> Self {
        Self { height_km }
    }
}

impl HeightField for FlatHeightField {
    fn sample(&self, _unit_dir: DVec3) -> f64 {
        self.height_km
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flat_field_is_constant() {
        let field = FlatHeightField::new(4.2);
        assert_eq!(field.sample(DVec3::X), 4.2);
        assert_eq!(field.sample(DVec3::new(0.6, -0.8, 0.0)), 4.2);
    }

    #[test]
    fn test_default_flat_field_is_zero() {
        assert_eq!(FlatHeightField::default().sample(DVec3::Y), 0.0);
    }

    #[test]
    fn test_trait_object_dispatch() {
        let field: Box<dyn HeightField> = Box::new(FlatHeightField::new(1.0));
        assert_eq!(field.sample(DVec3::Z), 1.0);
    }
}
