//! Perspective camera with scene-graph default-camera conventions: the
//! origin is the top-left of the viewport, y points down, and one scene
//! unit equals one logical pixel on the z = 0 plane.

use glam::{Mat4, Vec3};

#[repr(C)]
#[derive(Copy, Clone, Debug, bytemuck::Pod, bytemuck::Zeroable)]
pub struct CameraUniform {
    pub view_proj: [[f32; 4]; 4],
    /// Eye position; the scene's point light sits here too.
    pub eye: [f32; 4],
}

pub struct PerspectiveCamera {
    pub fov_y_deg: f32,
    /// Logical viewport size in scene units.
    pub viewport: (f32, f32),
    pub z_near: f32,
    pub z_far: f32,
}

impl PerspectiveCamera {
    pub fn new(viewport_width: f32, viewport_height: f32) -> Self {
        Self {
            fov_y_deg: 30.0,
            viewport: (viewport_width.max(1.0), viewport_height.max(1.0)),
            z_near: 1.0,
            z_far: 10_000.0,
        }
    }

    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.viewport = (width.max(1.0), height.max(1.0));
    }

    /// Distance from the eye to the z = 0 plane.
    pub fn eye_distance(&self) -> f32 {
        (self.viewport.1 * 0.5) / (self.fov_y_deg.to_radians() * 0.5).tan()
    }

    pub fn eye(&self) -> Vec3 {
        Vec3::new(
            self.viewport.0 * 0.5,
            self.viewport.1 * 0.5,
            -self.eye_distance(),
        )
    }

    pub fn view_proj(&self) -> Mat4 {
        let eye = self.eye();
        let view = Mat4::look_at_rh(eye, eye + Vec3::Z, Vec3::NEG_Y);
        let aspect = self.viewport.0 / self.viewport.1;
        let proj = Mat4::perspective_rh(self.fov_y_deg.to_radians(), aspect, self.z_near, self.z_far);
        proj * view
    }

    /// World ray under a logical cursor position, as (origin, unit direction).
    /// A pixel maps 1:1 onto the z = 0 plane, so the ray runs from the eye
    /// through `(x, y, 0)`.
    pub fn cursor_ray(&self, x: f32, y: f32) -> (Vec3, Vec3) {
        let eye = self.eye();
        (eye, (Vec3::new(x, y, 0.0) - eye).normalize())
    }

    pub fn build_uniform(&self) -> CameraUniform {
        CameraUniform {
            view_proj: self.view_proj().to_cols_array_2d(),
            eye: self.eye().extend(1.0).to_array(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: f32, b: f32) -> bool {
        (a - b).abs() < 1e-4
    }

    #[test]
    fn eye_distance_for_default_window() {
        let camera = PerspectiveCamera::new(800.0, 600.0);
        // 300 / tan(15°)
        assert!((camera.eye_distance() - 1119.6152).abs() < 1e-2);
    }

    #[test]
    fn viewport_centre_projects_to_origin() {
        let camera = PerspectiveCamera::new(800.0, 600.0);
        let ndc = camera.view_proj().project_point3(Vec3::new(400.0, 300.0, 0.0));
        assert!(approx(ndc.x, 0.0));
        assert!(approx(ndc.y, 0.0));
        assert!(ndc.z > 0.0 && ndc.z < 1.0);
    }

    #[test]
    fn scene_units_are_pixels_at_zero_depth() {
        let camera = PerspectiveCamera::new(800.0, 600.0);
        let vp = camera.view_proj();
        let top_left = vp.project_point3(Vec3::ZERO);
        assert!(approx(top_left.x, -1.0));
        assert!(approx(top_left.y, 1.0));
        let bottom_right = vp.project_point3(Vec3::new(800.0, 600.0, 0.0));
        assert!(approx(bottom_right.x, 1.0));
        assert!(approx(bottom_right.y, -1.0));
    }

    #[test]
    fn positive_z_recedes() {
        let camera = PerspectiveCamera::new(800.0, 600.0);
        let vp = camera.view_proj();
        let near = vp.project_point3(Vec3::new(800.0, 300.0, -500.0));
        let flat = vp.project_point3(Vec3::new(800.0, 300.0, 0.0));
        let far = vp.project_point3(Vec3::new(800.0, 300.0, 500.0));
        assert!(near.x > flat.x && flat.x > far.x);
        assert!(near.z < flat.z && flat.z < far.z);
    }

    #[test]
    fn uniform_carries_eye() {
        let camera = PerspectiveCamera::new(800.0, 600.0);
        let uniform = camera.build_uniform();
        assert!(approx(uniform.eye[0], 400.0));
        assert!(approx(uniform.eye[1], 300.0));
        assert!(uniform.eye[2] < 0.0);
        assert!(approx(uniform.eye[3], 1.0));
    }

    #[test]
    fn zero_viewport_is_guarded() {
        let mut camera = PerspectiveCamera::new(0.0, 0.0);
        assert!(camera.eye_distance().is_finite());
        camera.set_viewport(1024.0, 0.0);
        assert!(camera.view_proj().is_finite());
    }

    #[test]
    fn cursor_ray_passes_through_pixel_at_zero_depth() {
        let camera = PerspectiveCamera::new(800.0, 600.0);
        let (origin, dir) = camera.cursor_ray(600.0, 150.0);
        assert!(approx(dir.length(), 1.0));
        assert!(dir.z > 0.0);
        // Walk the ray to the z = 0 plane.
        let t = -origin.z / dir.z;
        let hit = origin + dir * t;
        assert!((hit.x - 600.0).abs() < 0.05);
        assert!((hit.y - 150.0).abs() < 0.05);
    }

    #[test]
    fn cursor_ray_agrees_with_projection() {
        let camera = PerspectiveCamera::new(800.0, 600.0);
        let (origin, dir) = camera.cursor_ray(250.0, 420.0);
        let along = origin + dir * 1500.0;
        let ndc = camera.view_proj().project_point3(along);
        assert!((ndc.x - (250.0 / 400.0 - 1.0)).abs() < 1e-3);
        assert!((ndc.y - (1.0 - 420.0 / 300.0)).abs() < 1e-3);
    }

    #[test]
    fn centre_ray_looks_straight_ahead() {
        let camera = PerspectiveCamera::new(800.0, 600.0);
        let (_, dir) = camera.cursor_ray(400.0, 300.0);
        assert!(approx(dir.x, 0.0));
        assert!(approx(dir.y, 0.0));
        assert!(approx(dir.z, 1.0));
    }
}
