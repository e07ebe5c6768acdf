use crate::coords::{Mat4, Vec3};

/// Perspective camera looking at a fixed target.
#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Camera {
    pub eye: Vec3,
    pub target: Vec3,
    pub up: Vec3,
    /// Vertical field of view, radians.
    pub fov_y: f32,
    pub z_near: f32,
    pub z_far: f32,
}

impl Default for Camera {
    fn default() -> Self {
        Self {
            eye: Vec3::new(0.0, 2.0, 6.0),
            target: Vec3::ZERO,
            up: Vec3::Y,
            fov_y: 45f32.to_radians(),
            z_near: 0.1,
            z_far: 100.0,
        }
    }
}

impl Camera {
    pub fn view(&self) -> Option<Mat4> {
        Mat4::look_at_rh(self.eye, self.target, self.up)
    }

    pub fn projection(&self, aspect: f32) -> Option<Mat4> {
        Mat4::perspective_rh_zo(self.fov_y, aspect, self.z_near, self.z_far)
    }

    /// `None` when the camera or aspect is degenerate.
    pub fn view_projection(&self, aspect: f32) -> Option<Mat4> {
        Some(self.projection(aspect)? * self.view()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn clip(m: &Mat4, p: Vec3) -> [f32; 4] {
        m * [p.x, p.y, p.z, 1.0]
    }

    #[test]
    fn target_projects_to_screen_center() {
        let cam = Camera::default();
        let vp = cam.view_projection(16.0 / 9.0).unwrap();
        let c = clip(&vp, cam.target);
        assert!((c[0] / c[3]).abs() < 1e-5);
        assert!((c[1] / c[3]).abs() < 1e-5);
        let z = c[2] / c[3];
        assert!(z > 0.0 && z < 1.0);
    }

    #[test]
    fn nearer_points_have_smaller_depth() {
        let cam = Camera::default();
        let vp = cam.view_projection(1.0).unwrap();
        let near = clip(&vp, Vec3::new(0.0, 1.0, 3.0));
        let far = clip(&vp, Vec3::new(0.0, -1.0, -3.0));
        assert!(near[2] / near[3] < far[2] / far[3]);
    }

    #[test]
    fn degenerate_camera_has_no_matrix() {
        let cam = Camera { target: Vec3::new(0.0, 2.0, 6.0), ..Camera::default() };
        assert!(cam.view_projection(1.0).is_none());
        assert!(Camera::default().view_projection(0.0).is_none());
    }
}
