use glam::{Mat4, Vec3};

/// Perspective camera looking down -Z from `position`.
///
/// The projection matrix is cached; changing `aspect`, `fov_degrees`,
/// `near` or `far` through the setters marks it dirty until
/// `update_projection_matrix` runs.
#[derive(Debug, Clone)]
pub struct PerspectiveCamera {
    pub position: Vec3,
    fov_degrees: f32,
    aspect: f32,
    near: f32,
    far: f32,
    projection: Mat4,
    projection_dirty: bool,
}

impl PerspectiveCamera {
    pub fn new(fov_degrees: f32, aspect: f32, near: f32, far: f32) -> Self {
        let mut camera = Self {
            position: Vec3::ZERO,
            fov_degrees,
            aspect,
            near,
            far,
            projection: Mat4::IDENTITY,
            projection_dirty: true,
        };
        camera.update_projection_matrix();
        camera
    }

    pub fn fov_degrees(&self) -> f32 {
        self.fov_degrees
    }

    pub fn aspect(&self) -> f32 {
        self.aspect
    }

    pub fn near(&self) -> f32 {
        self.near
    }

    pub fn far(&self) -> f32 {
        self.far
    }

    pub fn set_aspect(&mut self, aspect: f32) {
        self.aspect = aspect;
        self.projection_dirty = true;
    }

    pub fn set_fov_degrees(&mut self, fov_degrees: f32) {
        self.fov_degrees = fov_degrees;
        self.projection_dirty = true;
    }

    pub fn set_clip_planes(&mut self, near: f32, far: f32) {
        self.near = near;
        self.far = far;
        self.projection_dirty = true;
    }

    pub fn is_projection_dirty(&self) -> bool {
        self.projection_dirty
    }

    pub fn update_projection_matrix(&mut self) {
        self.projection = Mat4::perspective_rh(
            self.fov_degrees.to_radians(),
            self.aspect,
            self.near,
            self.far,
        );
        self.projection_dirty = false;
    }

    /// The cached projection. Stale while `is_projection_dirty()`.
    pub fn projection_matrix(&self) -> Mat4 {
        self.projection
    }

    pub fn view_matrix(&self) -> Mat4 {
        Mat4::from_translation(-self.position)
    }

    pub fn view_projection(&self) -> Mat4 {
        self.projection_matrix() * self.view_matrix()
    }
}
