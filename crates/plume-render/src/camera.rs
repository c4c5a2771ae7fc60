//! Orbit camera for viewing an emitter

use plume_core::{mat4_mul, Vec3};
use plume_particles::{CameraParams, ViewParams};

/// A perspective camera orbiting a target point
#[derive(Debug, Clone)]
pub struct Camera {
    /// Camera position, derived from the orbit parameters
    pub position: Vec3,
    /// Target point the camera looks at
    pub target: Vec3,
    pub up: Vec3,
    /// Field of view in degrees
    pub fov: f32,
    pub near: f32,
    pub far: f32,
    /// Aspect ratio (width / height)
    pub aspect: f32,

    /// Distance from target
    pub distance: f32,
    /// Horizontal angle in radians
    pub yaw: f32,
    /// Vertical angle in radians
    pub pitch: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self::from_params(&CameraParams::default(), 16.0 / 9.0)
    }
}

impl Camera {
    pub fn from_params(params: &CameraParams, aspect: f32) -> Self {
        let mut camera = Self {
            position: Vec3::ZERO,
            target: params.target,
            up: Vec3::UP,
            fov: params.fov_deg,
            near: 0.05,
            far: 100.0,
            aspect,
            distance: params.distance,
            yaw: params.yaw_deg.to_radians(),
            pitch: params.pitch_deg.to_radians(),
        };
        camera.update_orbit();
        camera
    }

    /// Update position based on orbit parameters
    pub fn update_orbit(&mut self) {
        let x = self.distance * self.pitch.cos() * self.yaw.sin();
        let y = self.distance * self.pitch.sin();
        let z = self.distance * self.pitch.cos() * self.yaw.cos();

        self.position = self.target + Vec3::new(x, y, z);
    }

    /// Orbit horizontally (rotate around target)
    pub fn orbit_horizontal(&mut self, delta: f32) {
        self.yaw += delta;
        self.update_orbit();
    }

    /// Orbit vertically (tilt up/down)
    pub fn orbit_vertical(&mut self, delta: f32) {
        self.pitch = (self.pitch + delta).clamp(-1.56, 1.56);
        self.update_orbit();
    }

    pub fn zoom(&mut self, delta: f32) {
        self.distance = (self.distance - delta).clamp(0.5, 50.0);
        self.update_orbit();
    }

    fn basis(&self) -> (Vec3, Vec3, Vec3) {
        let f = (self.target - self.position).normalized();
        let s = f.cross(&self.up).normalized();
        let u = s.cross(&f);
        (f, s, u)
    }

    /// Get the view matrix (4x4, column-major)
    pub fn view_matrix(&self) -> [[f32; 4]; 4] {
        let (f, s, u) = self.basis();
        [
            [s.x, u.x, -f.x, 0.0],
            [s.y, u.y, -f.y, 0.0],
            [s.z, u.z, -f.z, 0.0],
            [
                -s.dot(&self.position),
                -u.dot(&self.position),
                f.dot(&self.position),
                1.0,
            ],
        ]
    }

    /// Perspective projection with wgpu's [0, 1] depth range (column-major)
    pub fn projection_matrix(&self) -> [[f32; 4]; 4] {
        let f = 1.0 / (self.fov.to_radians() / 2.0).tan();
        let range = self.near - self.far;

        [
            [f / self.aspect, 0.0, 0.0, 0.0],
            [0.0, f, 0.0, 0.0],
            [0.0, 0.0, self.far / range, -1.0],
            [0.0, 0.0, self.near * self.far / range, 0.0],
        ]
    }

    pub fn view_projection_matrix(&self) -> [[f32; 4]; 4] {
        mat4_mul(&self.projection_matrix(), &self.view_matrix())
    }

    /// Camera right vector (world space)
    pub fn right_vector(&self) -> Vec3 {
        self.basis().1
    }

    /// Camera up vector, perpendicular to forward and right
    pub fn up_vector(&self) -> Vec3 {
        self.basis().2
    }

    /// Per-frame camera inputs for the particle program
    pub fn view_params(&self) -> ViewParams {
        ViewParams {
            view_proj: self.view_projection_matrix(),
            camera_right: self.right_vector(),
            camera_up: self.up_vector(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transform(m: &[[f32; 4]; 4], p: Vec3) -> [f32; 4] {
        let v = [p.x, p.y, p.z, 1.0];
        let mut out = [0.0; 4];
        for (row, value) in out.iter_mut().enumerate() {
            *value = (0..4).map(|col| m[col][row] * v[col]).sum();
        }
        out
    }

    #[test]
    fn orbit_keeps_distance() {
        let mut camera = Camera::from_params(&CameraParams::default(), 1.0);
        camera.orbit_horizontal(1.0);
        camera.orbit_vertical(0.3);
        let d = (camera.position - camera.target).length();
        assert!((d - camera.distance).abs() < 1e-4);
    }

    #[test]
    fn target_projects_to_screen_centre() {
        let camera = Camera::from_params(&CameraParams::default(), 1.5);
        let clip = transform(&camera.view_projection_matrix(), camera.target);
        assert!((clip[0] / clip[3]).abs() < 1e-4);
        assert!((clip[1] / clip[3]).abs() < 1e-4);
        let depth = clip[2] / clip[3];
        assert!((0.0..=1.0).contains(&depth));
    }

    #[test]
    fn basis_is_orthonormal() {
        let camera = Camera::from_params(&CameraParams::default(), 1.0);
        let right = camera.right_vector();
        let up = camera.up_vector();
        assert!((right.length() - 1.0).abs() < 1e-5);
        assert!((up.length() - 1.0).abs() < 1e-5);
        assert!(right.dot(&up).abs() < 1e-5);
    }

    #[test]
    fn zoom_is_clamped() {
        let mut camera = Camera::default();
        camera.zoom(1000.0);
        assert_eq!(camera.distance, 0.5);
        camera.zoom(-1000.0);
        assert_eq!(camera.distance, 50.0);
    }
}
