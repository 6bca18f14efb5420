//! Camera and view management.

use glam::{Mat4, Vec2, Vec3, Vec4Swizzles};
use towerscope_core::OrbitOptions;

/// A perspective camera orbiting a look-at point.
#[derive(Debug, Clone)]
pub struct Camera {
    /// Camera position in world space.
    pub position: Vec3,
    /// Point the camera is looking at.
    pub target: Vec3,
    /// Up vector.
    pub up: Vec3,
    /// Field of view in radians.
    pub fov: f32,
    /// Aspect ratio (width / height).
    pub aspect_ratio: f32,
    /// Near clipping plane.
    pub near: f32,
    /// Far clipping plane.
    pub far: f32,
}

impl Camera {
    /// Creates a new camera with default settings.
    #[must_use]
    pub fn new(aspect_ratio: f32) -> Self {
        Self {
            position: Vec3::new(25.0, 18.0, 30.0),
            target: Vec3::new(0.0, 8.0, 0.0),
            up: Vec3::Y,
            fov: std::f32::consts::FRAC_PI_4, // 45 degrees
            aspect_ratio,
            near: 0.1,
            far: 1000.0,
        }
    }

    /// Sets the aspect ratio.
    pub fn set_aspect_ratio(&mut self, aspect_ratio: f32) {
        self.aspect_ratio = aspect_ratio;
    }

    /// Moves the camera to `position`, looking at `target`.
    pub fn set_pose(&mut self, position: Vec3, target: Vec3) {
        self.position = position;
        self.target = target;
    }

    /// Sets FOV from degrees.
    pub fn set_fov_degrees(&mut self, degrees: f32) {
        self.fov = degrees.to_radians().clamp(0.1, std::f32::consts::PI - 0.1);
    }

    /// Returns the view matrix.
    #[must_use]
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_rh(self.position, self.target, self.up)
    }

    /// Returns the projection matrix.
    #[must_use]
    pub fn projection_matrix(&self) -> Mat4 {
        Mat4::perspective_rh(self.fov, self.aspect_ratio, self.near, self.far)
    }

    /// Returns the combined view-projection matrix.
    #[must_use]
    pub fn view_projection_matrix(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }

    /// Returns the camera's forward direction.
    #[must_use]
    pub fn forward(&self) -> Vec3 {
        (self.target - self.position).normalize_or_zero()
    }

    /// Returns the camera's right direction.
    #[must_use]
    pub fn right(&self) -> Vec3 {
        self.forward().cross(self.up).normalize_or_zero()
    }

    /// Distance from the camera to its target.
    #[must_use]
    pub fn distance(&self) -> f32 {
        (self.position - self.target).length()
    }

    /// Orbits the camera around the target, keeping the polar angle and the
    /// distance inside `limits`.
    pub fn orbit(&mut self, delta_x: f32, delta_y: f32, limits: &OrbitOptions) {
        let radius = self
            .distance()
            .clamp(limits.min_distance, limits.max_distance);
        let offset = self.position - self.target;
        let mut theta = offset.x.atan2(offset.z);
        let mut phi = (offset.y / offset.length().max(f32::EPSILON))
            .clamp(-1.0, 1.0)
            .acos();

        theta -= delta_x;
        phi = (phi - delta_y).clamp(limits.min_polar_angle, limits.max_polar_angle);

        self.position = self.target
            + Vec3::new(
                radius * phi.sin() * theta.sin(),
                radius * phi.cos(),
                radius * phi.sin() * theta.cos(),
            );
    }

    /// Rotates the camera around the vertical axis through the target.
    pub fn rotate_around_up(&mut self, angle: f32) {
        let offset = self.position - self.target;
        self.position = self.target + glam::Quat::from_rotation_y(angle) * offset;
    }

    /// Moves toward (`delta > 0`) or away from the target, clamped to the
    /// orbit distance range.
    pub fn zoom(&mut self, delta: f32, limits: &OrbitOptions) {
        let direction = self.forward();
        let new_distance = (self.distance() - delta).clamp(limits.min_distance, limits.max_distance);
        self.position = self.target - direction * new_distance;
    }

    /// World-space ray through pixel `(x, y)` of a `width`×`height` viewport.
    #[must_use]
    pub fn screen_ray(&self, x: f32, y: f32, width: f32, height: f32) -> (Vec3, Vec3) {
        let ndc_x = 2.0 * x / width.max(1.0) - 1.0;
        let ndc_y = 1.0 - 2.0 * y / height.max(1.0);
        let inv = self.view_projection_matrix().inverse();
        let near = inv.project_point3(Vec3::new(ndc_x, ndc_y, 0.0));
        let far = inv.project_point3(Vec3::new(ndc_x, ndc_y, 1.0));
        (near, (far - near).normalize_or_zero())
    }

    /// Pixel position of `world` in a `width`×`height` viewport, or `None` if
    /// it is behind the camera.
    #[must_use]
    pub fn project(&self, world: Vec3, width: f32, height: f32) -> Option<Vec2> {
        let clip = self.view_projection_matrix() * world.extend(1.0);
        if clip.w <= 0.0 {
            return None;
        }
        let ndc = clip.xyz() / clip.w;
        Some(Vec2::new(
            (ndc.x + 1.0) * 0.5 * width,
            (1.0 - ndc.y) * 0.5 * height,
        ))
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(16.0 / 9.0)
    }
}
