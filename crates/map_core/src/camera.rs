//! Perspective camera orbiting the map, plus screen → ray conversion for picking.

use glam::{Mat4, Vec2, Vec3};

/// A half-line used for picking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: Vec3,
    /// Unit direction.
    pub direction: Vec3,
}

impl Ray {
    pub fn new(origin: Vec3, direction: Vec3) -> Self {
        Self {
            origin,
            direction: direction.normalize_or_zero(),
        }
    }

    pub fn at(&self, t: f32) -> Vec3 {
        self.origin + self.direction * t
    }
}

/// Map camera: looks at `target` from `position` with +Z as up.
#[derive(Debug, Clone)]
pub struct Camera {
    pub position: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view in degrees.
    pub fov_degrees: f32,
    /// Near clipping plane.
    pub near: f32,
    /// Far clipping plane.
    pub far: f32,
    /// Aspect ratio (width / height).
    pub aspect: f32,
    /// Radians of orbit per viewport height dragged.
    pub rotate_speed: f32,
    /// Dolly factor per scroll step.
    pub zoom_step: f32,
    pub min_distance: f32,
    pub max_distance: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            position: Vec3::new(150.0, 0.0, 150.0),
            target: Vec3::ZERO,
            up: Vec3::Z,
            fov_degrees: 10.0,
            near: 1.0,
            far: 2000.0,
            aspect: 16.0 / 9.0,
            rotate_speed: std::f32::consts::TAU,
            zoom_step: 0.95,
            min_distance: 10.0,
            max_distance: 1500.0,
        }
    }
}

impl Camera {
    /// Create a camera at `position` looking at the origin.
    pub fn new(position: Vec3) -> Self {
        Self {
            position,
            ..Default::default()
        }
    }

    /// Update aspect ratio (call on window resize).
    pub fn set_aspect(&mut self, width: u32, height: u32) {
        self.aspect = width as f32 / height.max(1) as f32;
    }

    /// Get the view matrix.
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    /// Get the projection matrix.
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov_degrees.to_radians(), self.aspect, self.near, self.far)
    }

    /// Get the combined view-projection matrix.
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Normalize a window position to device coordinates in -1..1 (y up).
    pub fn screen_to_ndc(screen: Vec2, viewport: Vec2) -> Vec2 {
        Vec2::new(
            (screen.x / viewport.x) * 2.0 - 1.0,
            -(screen.y / viewport.y) * 2.0 + 1.0,
        )
    }

    /// Inverse of [`Camera::screen_to_ndc`].
    pub fn ndc_to_screen(ndc: Vec2, viewport: Vec2) -> Vec2 {
        Vec2::new(
            (ndc.x + 1.0) * 0.5 * viewport.x,
            (1.0 - ndc.y) * 0.5 * viewport.y,
        )
    }

    /// Ray from the eye through a device coordinate.
    pub fn ray_from_ndc(&self, ndc: Vec2) -> Ray {
        let inv = self.view_projection_matrix().inverse();
        let through = inv.project_point3(Vec3::new(ndc.x, ndc.y, 0.5));
        Ray::new(self.position, through - self.position)
    }

    /// Project a world point into device coordinates (z is depth 0..1).
    pub fn world_to_ndc(&self, point: Vec3) -> Vec3 {
        self.view_projection_matrix().project_point3(point)
    }

    pub fn distance(&self) -> f32 {
        (self.position - self.target).length()
    }

    /// Orbit around the target. Deltas are in pixels, scaled by viewport height.
    pub fn orbit(&mut self, delta: Vec2, viewport_height: f32) {
        let h = viewport_height.max(1.0);
        let offset = self.position - self.target;
        let radius = offset.length();
        if radius <= f32::EPSILON {
            return;
        }
        let mut theta = offset.y.atan2(offset.x);
        let mut phi = (offset.z / radius).clamp(-1.0, 1.0).acos();

        theta -= self.rotate_speed * delta.x / h;
        phi -= self.rotate_speed * delta.y / h;
        let eps = 1e-3;
        phi = phi.clamp(eps, std::f32::consts::PI - eps);

        let (sin_phi, cos_phi) = phi.sin_cos();
        let (sin_theta, cos_theta) = theta.sin_cos();
        self.position = self.target
            + Vec3::new(
                radius * sin_phi * cos_theta,
                radius * sin_phi * sin_theta,
                radius * cos_phi,
            );
    }

    /// Dolly toward (positive steps) or away from the target.
    pub fn zoom(&mut self, steps: f32) {
        let offset = self.position - self.target;
        let radius = offset.length();
        if radius <= f32::EPSILON {
            return;
        }
        let new_radius = (radius * self.zoom_step.powf(steps)).clamp(self.min_distance, self.max_distance);
        self.position = self.target + offset * (new_radius / radius);
    }
}
