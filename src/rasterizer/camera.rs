//! Free-look camera: pose, view matrix and projection matrix

use std::f32::consts::FRAC_PI_2;

use super::math::{Matrix, Vec3};

/// Movement speed in world units per second
pub const CAMERA_VELOCITY: f32 = 5.0;
/// Look speed, multiplied by the mouse delta in pixels and elapsed seconds
pub const ANGULAR_VELOCITY: f32 = 0.09;
pub const NEAR_PLANE: f32 = 0.1;
pub const FAR_PLANE: f32 = 100.0;

/// Keeps forward off the world up axis
const PITCH_LIMIT: f32 = FRAC_PI_2 - 0.01;

/// Active movement directions for one frame
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MoveInput {
    pub forward: bool,
    pub back: bool,
    pub left: bool,
    pub right: bool,
}

/// Mouse look delta for one frame. Only applied while `active`.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LookInput {
    pub dx: f32,
    pub dy: f32,
    pub active: bool,
}

/// Camera state
#[derive(Debug, Clone)]
pub struct Camera {
    pub origin: Vec3,
    /// tan(fov / 2)
    pub fov: f32,
    pub aspect_ratio: f32,

    // Computed basis vectors
    pub forward: Vec3,
    pub up: Vec3,
    pub right: Vec3,

    pub total_pitch: f32,
    pub total_yaw: f32,

    pub inv_view_matrix: Matrix,
    pub view_matrix: Matrix,
    pub projection_matrix: Matrix,
}

impl Camera {
    pub fn new(aspect_ratio: f32, fov_degrees: f32, origin: Vec3) -> Self {
        let mut cam = Self {
            origin,
            fov: (fov_degrees.to_radians() / 2.0).tan(),
            aspect_ratio,
            forward: Vec3::UNIT_Z,
            up: Vec3::UNIT_Y,
            right: Vec3::UNIT_X,
            total_pitch: 0.0,
            total_yaw: 0.0,
            inv_view_matrix: Matrix::IDENTITY,
            view_matrix: Matrix::IDENTITY,
            projection_matrix: Matrix::IDENTITY,
        };
        cam.update_matrices();
        cam
    }

    /// Apply one frame of movement and look input, then rebuild the matrices
    pub fn update(&mut self, elapsed: f32, movement: MoveInput, look: LookInput) {
        let step = CAMERA_VELOCITY * elapsed;

        if movement.forward {
            self.origin = self.origin + self.forward * step;
        }
        if movement.back {
            self.origin = self.origin - self.forward * step;
        }
        if movement.left {
            self.origin = self.origin - self.right * step;
        }
        if movement.right {
            self.origin = self.origin + self.right * step;
        }

        if look.active {
            self.total_pitch -= look.dy * ANGULAR_VELOCITY * elapsed;
            self.total_yaw += look.dx * ANGULAR_VELOCITY * elapsed;
            self.total_pitch = self.total_pitch.clamp(-PITCH_LIMIT, PITCH_LIMIT);

            self.forward = Matrix::rotation(self.total_pitch, self.total_yaw, 0.0)
                .transform_vector(Vec3::UNIT_Z)
                .normalize();
        }

        self.update_matrices();
    }

    /// Re-derive right/up from forward, then the view and projection matrices
    pub fn update_matrices(&mut self) {
        self.right = Vec3::UNIT_Y.cross(self.forward).normalize();
        self.up = self.forward.cross(self.right).normalize();

        self.inv_view_matrix = Matrix::from_axes(self.right, self.up, self.forward, self.origin);
        // An orthonormal basis is never singular
        self.view_matrix = self.inv_view_matrix.inverse().unwrap_or(Matrix::IDENTITY);

        self.projection_matrix = Matrix::perspective_fov_lh(self.fov, self.aspect_ratio, NEAR_PLANE, FAR_PLANE);
    }

    /// World-space direction of the ray through pixel (px, py)
    pub fn view_ray(&self, px: f32, py: f32, width: usize, height: usize) -> Vec3 {
        let x = (2.0 * px / width as f32 - 1.0) * self.aspect_ratio * self.fov;
        let y = (1.0 - 2.0 * py / height as f32) * self.fov;
        (self.right * x + self.up * y + self.forward).normalize()
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(1.0, 90.0, Vec3::ZERO)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 0.001
    }

    fn assert_orthonormal(cam: &Camera) {
        assert!(approx(cam.forward.len(), 1.0));
        assert!(approx(cam.right.len(), 1.0));
        assert!(approx(cam.up.len(), 1.0));
        assert!(approx(cam.forward.dot(cam.right), 0.0));
        assert!(approx(cam.forward.dot(cam.up), 0.0));
        assert!(approx(cam.right.dot(cam.up), 0.0));
    }

    #[test]
    fn test_initial_basis() {
        let cam = Camera::new(4.0 / 3.0, 60.0, Vec3::new(0.0, 0.0, -10.0));
        assert_orthonormal(&cam);
        assert!(approx(cam.fov, (30.0f32).to_radians().tan()));
        assert!(approx(cam.right.x, 1.0));
    }

    #[test]
    fn test_view_matrix_moves_origin_to_zero() {
        let cam = Camera::new(1.0, 90.0, Vec3::new(1.0, 2.0, 3.0));
        let p = cam.view_matrix.transform_point4(cam.origin);
        assert!(approx(Vec3::new(p.x, p.y, p.z).len(), 0.0));

        let ahead = cam.view_matrix.transform_point4(cam.origin + cam.forward * 4.0);
        assert!(approx(ahead.z, 4.0));
    }

    #[test]
    fn test_forward_movement_scales_with_time() {
        let mut cam = Camera::default();
        let movement = MoveInput { forward: true, ..Default::default() };
        cam.update(0.5, movement, LookInput::default());
        assert!(approx(cam.origin.z, CAMERA_VELOCITY * 0.5));

        let movement = MoveInput { left: true, ..Default::default() };
        cam.update(1.0, movement, LookInput::default());
        assert!(approx(cam.origin.x, -CAMERA_VELOCITY));
    }

    #[test]
    fn test_look_keeps_basis_orthonormal() {
        let mut cam = Camera::default();
        let look = LookInput { dx: 40.0, dy: -25.0, active: true };
        for _ in 0..50 {
            cam.update(0.1, MoveInput::default(), look);
            assert_orthonormal(&cam);
        }
    }

    #[test]
    fn test_inactive_look_is_ignored() {
        let mut cam = Camera::default();
        cam.update(1.0, MoveInput::default(), LookInput { dx: 100.0, dy: 100.0, active: false });
        assert!(approx(cam.forward.z, 1.0));
        assert_eq!(cam.total_yaw, 0.0);
    }

    #[test]
    fn test_pitch_is_clamped_below_vertical() {
        let mut cam = Camera::default();
        cam.update(1.0, MoveInput::default(), LookInput { dx: 0.0, dy: -1000.0, active: true });
        assert!(cam.total_pitch <= PITCH_LIMIT);
        assert!(cam.forward.y > 0.99);
        assert_orthonormal(&cam);
    }

    #[test]
    fn test_view_ray_through_center_is_forward() {
        let cam = Camera::new(1.0, 90.0, Vec3::ZERO);
        let ray = cam.view_ray(50.0, 50.0, 100, 100);
        assert!(approx(ray.z, 1.0));

        // Top-left corner of a 90 degree view
        let corner = cam.view_ray(0.0, 0.0, 100, 100);
        assert!(approx(corner.x, -corner.z) && approx(corner.y, corner.z));
    }
}
