//! Spherical Mercator projection from longitude/latitude onto the map plane.

use glam::{DVec2, Vec3};

/// Fixed-parameter Mercator projection.
///
/// Output uses the map frame: the projected screen-space `x` and `y` are
/// swapped so that north points along +X, matching the default camera.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MercatorProjection {
    /// Longitude/latitude in degrees that projects to the origin.
    pub center: DVec2,
    pub scale: f64,
    /// Planar rotation in radians applied after projection.
    pub angle: f64,
    pub translate: DVec2,
}

impl Default for MercatorProjection {
    fn default() -> Self {
        Self {
            center: DVec2::new(108.904496, 32.668849),
            scale: 80.0,
            angle: 0.0,
            translate: DVec2::ZERO,
        }
    }
}

impl MercatorProjection {
    pub fn new(center: DVec2, scale: f64) -> Self {
        Self {
            center,
            scale,
            ..Default::default()
        }
    }

    /// Raw Mercator in radians: `(λ, ln tan(π/4 + φ/2))`.
    fn mercator(lon_deg: f64, lat_deg: f64) -> DVec2 {
        let lambda = lon_deg.to_radians();
        let phi = lat_deg.to_radians();
        DVec2::new(lambda, (std::f64::consts::FRAC_PI_4 + phi / 2.0).tan().ln())
    }

    /// Screen-style projected point (y grows southward), before the axis swap.
    pub fn project_screen(&self, lon: f64, lat: f64) -> DVec2 {
        let p = Self::mercator(lon, lat);
        let c = Self::mercator(self.center.x, self.center.y);
        let raw = DVec2::new(self.scale * (p.x - c.x), -self.scale * (p.y - c.y));
        let (sin, cos) = self.angle.sin_cos();
        let rotated = DVec2::new(raw.x * cos - raw.y * sin, raw.x * sin + raw.y * cos);
        rotated + self.translate
    }

    /// Project a coordinate into the map frame at `z = 0`.
    pub fn project(&self, lon: f64, lat: f64) -> Vec3 {
        let s = self.project_screen(lon, lat);
        Vec3::new(s.y as f32, s.x as f32, 0.0)
    }

    pub fn project_point(&self, lnglat: DVec2) -> Vec3 {
        self.project(lnglat.x, lnglat.y)
    }

    /// Project a ring, dropping no points.
    pub fn project_ring(&self, ring: &[DVec2]) -> Vec<Vec3> {
        ring.iter().map(|p| self.project_point(*p)).collect()
    }
}
