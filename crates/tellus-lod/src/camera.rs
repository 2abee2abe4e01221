//! Camera state and frustum tests consumed by the tile selector.

use glam::{DMat4, DVec3, DVec4};

/// A view frustum defined by six inward-pointing planes extracted from a
/// view-projection matrix.
#[derive(Clone, Debug)]
pub struct Frustum {
    /// Six planes: left, right, bottom, top, near, far.
    /// Each `DVec4(a, b, c, d)` where `(a, b, c)` is the normalized inward
    /// normal and `d` is the signed distance term.
    planes: [DVec4; 6],
}

impl Frustum {
    /// Extract frustum planes from a combined view-projection matrix using
    /// the Gribb/Hartmann method.
    ///
    /// Assumes glam's `[0, 1]` depth range: the near plane comes from row 2
    /// alone, the far plane from `row3 - row2`.
    #[must_use]
    pub fn from_view_projection(vp: &DMat4) -> Self {
        let rows = [vp.row(0), vp.row(1), vp.row(2), vp.row(3)];

        let mut planes = [
            rows[3] + rows[0], // left
            rows[3] - rows[0], // right
            rows[3] + rows[1], // bottom
            rows[3] - rows[1], // top
            rows[2],           // near ([0, 1] depth: z' >= 0)
            rows[3] - rows[2], // far  (z' <= w)
        ];

        // Normalize each plane so that (a, b, c) is a unit vector.
        for plane in &mut planes {
            let len = plane.truncate().length();
            if len > 1e-12 {
                *plane /= len;
            }
        }

        Self { planes }
    }

    /// Test whether a sphere is at least partially inside the frustum.
    ///
    /// Conservative: may return `true` for spheres slightly outside a
    /// frustum corner, but never returns `false` for a visible sphere —
    /// the direction that matters for culling correctness.
    #[must_use]
    pub fn intersects_sphere(&self, center: DVec3, radius: f64) -> bool {
        for plane in &self.planes {
            if plane.truncate().dot(center) + plane.w < -radius {
                return false;
            }
        }
        true
    }
}

/// The per-frame camera state the terrain engine consumes: world position,
/// vertical field of view, viewport height, and a frustum for visibility
/// tests.
#[derive(Clone, Debug)]
pub struct Camera {
    /// World position relative to the planet center, in km.
    pub position: DVec3,
    /// Vertical field of view in degrees.
    pub fov_y_deg: f64,
    /// Viewport height in pixels.
    pub viewport_height_px: f64,
    frustum: Frustum,
}

impl Camera {
    /// Build a camera looking from `position` toward `target`.
    ///
    /// `near_km`/`far_km` bound the view frustum; `aspect` is width over
    /// height.
    #[must_use]
    #[allow(clippy::too_many_arguments)]
    pub fn look_at(
        position: DVec3,
        target: DVec3,
        up: DVec3,
        fov_y_deg: f64,
        aspect: f64,
        near_km: f64,
        far_km: f64,
        viewport_height_px: f64,
    ) -> Self {
        let view = DMat4::look_at_rh(position, target, up);
        let proj = DMat4::perspective_rh(fov_y_deg.to_radians(), aspect, near_km, far_km);
        Self::from_view_projection(position, fov_y_deg, viewport_height_px, &(proj * view))
    }

    /// Build a camera from an already-combined view-projection matrix.
    #[must_use]
    pub fn from_view_projection(
        position: DVec3,
        fov_y_deg: f64,
        viewport_height_px: f64,
        view_projection: &DMat4,
    ) -> Self {
        Self {
            position,
            fov_y_deg,
            viewport_height_px,
            frustum: Frustum::from_view_projection(view_projection),
        }
    }

    /// Whether the given bounding sphere intersects the view frustum.
    #[must_use]
    pub fn sphere_in_frustum(&self, center: DVec3, radius: f64) -> bool {
        self.frustum.intersects_sphere(center, radius)
    }

    /// The perspective projection factor that converts an error-over-distance
    /// ratio into on-screen pixels: `viewport_height / (2 tan(fov_y / 2))`.
    #[must_use]
    pub fn sse_factor(&self) -> f64 {
        self.viewport_height_px / (2.0 * (self.fov_y_deg.to_radians() * 0.5).tan())
    }
}
