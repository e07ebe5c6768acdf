use std::ops::Mul;

use bytemuck::{Pod, Zeroable};

use super::Vec3;

/// 4x4 column-major matrix.
///
/// Layout matches WGSL `mat4x4<f32>`, so values can be uploaded with
/// `bytemuck::bytes_of` without reordering.
#[derive(Debug, Copy, Clone, PartialEq, Pod, Zeroable)]
#[repr(C)]
pub struct Mat4 {
    pub cols: [[f32; 4]; 4],
}

impl Mat4 {
    pub const IDENTITY: Self = Self {
        cols: [
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ],
    };

    #[inline]
    pub const fn from_cols(c0: [f32; 4], c1: [f32; 4], c2: [f32; 4], c3: [f32; 4]) -> Self {
        Self { cols: [c0, c1, c2, c3] }
    }

    #[inline]
    pub fn from_translation(v: Vec3) -> Self {
        Self::from_cols(
            [1.0, 0.0, 0.0, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [0.0, 0.0, 1.0, 0.0],
            [v.x, v.y, v.z, 1.0],
        )
    }

    #[inline]
    pub fn from_scale(s: Vec3) -> Self {
        Self::from_cols(
            [s.x, 0.0, 0.0, 0.0],
            [0.0, s.y, 0.0, 0.0],
            [0.0, 0.0, s.z, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        )
    }

    #[inline]
    pub fn from_uniform_scale(s: f32) -> Self {
        Self::from_scale(Vec3::splat(s))
    }

    /// Right-handed rotation around +Y.
    #[inline]
    pub fn from_rotation_y(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Self::from_cols(
            [c, 0.0, -s, 0.0],
            [0.0, 1.0, 0.0, 0.0],
            [s, 0.0, c, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        )
    }

    /// Right-handed rotation around +X.
    #[inline]
    pub fn from_rotation_x(angle: f32) -> Self {
        let (s, c) = angle.sin_cos();
        Self::from_cols(
            [1.0, 0.0, 0.0, 0.0],
            [0.0, c, s, 0.0],
            [0.0, -s, c, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        )
    }

    /// Right-handed perspective projection with a `[0, 1]` depth range (wgpu clip space).
    ///
    /// Returns `None` for degenerate parameters (non-positive near plane, far <= near,
    /// zero aspect).
    pub fn perspective_rh_zo(fov_y: f32, aspect: f32, z_near: f32, z_far: f32) -> Option<Self> {
        if !(z_near > 0.0 && z_far > z_near && aspect > 0.0 && fov_y > 0.0) {
            return None;
        }
        let f = 1.0 / (fov_y * 0.5).tan();
        let range = z_near - z_far;
        Some(Self::from_cols(
            [f / aspect, 0.0, 0.0, 0.0],
            [0.0, f, 0.0, 0.0],
            [0.0, 0.0, z_far / range, -1.0],
            [0.0, 0.0, (z_near * z_far) / range, 0.0],
        ))
    }

    /// Right-handed view matrix looking from `eye` towards `target`.
    ///
    /// Returns `None` when `eye == target` or `up` is parallel to the view direction.
    pub fn look_at_rh(eye: Vec3, target: Vec3, up: Vec3) -> Option<Self> {
        let f = (target - eye).try_normalize()?;
        let s = f.cross(up).try_normalize()?;
        let u = s.cross(f);
        Some(Self::from_cols(
            [s.x, u.x, -f.x, 0.0],
            [s.y, u.y, -f.y, 0.0],
            [s.z, u.z, -f.z, 0.0],
            [-eye.dot(s), -eye.dot(u), eye.dot(f), 1.0],
        ))
    }

    #[inline]
    pub fn col(&self, i: usize) -> [f32; 4] {
        self.cols[i]
    }

    #[inline]
    fn at(&self, row: usize, col: usize) -> f32 {
        self.cols[col][row]
    }

    /// Transforms a point (w = 1) and drops the w component.
    pub fn transform_point3(&self, p: Vec3) -> Vec3 {
        let v = self * [p.x, p.y, p.z, 1.0];
        Vec3::new(v[0], v[1], v[2])
    }

    /// Transforms a direction (w = 0).
    pub fn transform_vector3(&self, d: Vec3) -> Vec3 {
        let v = self * [d.x, d.y, d.z, 0.0];
        Vec3::new(v[0], v[1], v[2])
    }

    /// Inverse-transpose of the upper 3x3 block, embedded in a 4x4 matrix.
    ///
    /// Used to transform normals. Handles mirroring scales (negative determinant)
    /// correctly. Returns `None` for singular matrices.
    pub fn normal_matrix(&self) -> Option<Self> {
        let m = |r: usize, c: usize| self.at(r, c);

        // Cofactors of the upper 3x3.
        let c00 = m(1, 1) * m(2, 2) - m(1, 2) * m(2, 1);
        let c01 = m(1, 2) * m(2, 0) - m(1, 0) * m(2, 2);
        let c02 = m(1, 0) * m(2, 1) - m(1, 1) * m(2, 0);
        let c10 = m(0, 2) * m(2, 1) - m(0, 1) * m(2, 2);
        let c11 = m(0, 0) * m(2, 2) - m(0, 2) * m(2, 0);
        let c12 = m(0, 1) * m(2, 0) - m(0, 0) * m(2, 1);
        let c20 = m(0, 1) * m(1, 2) - m(0, 2) * m(1, 1);
        let c21 = m(0, 2) * m(1, 0) - m(0, 0) * m(1, 2);
        let c22 = m(0, 0) * m(1, 1) - m(0, 1) * m(1, 0);

        let det = m(0, 0) * c00 + m(0, 1) * c01 + m(0, 2) * c02;
        if det.abs() <= f32::EPSILON || !det.is_finite() {
            return None;
        }
        let inv = 1.0 / det;

        // inverse^T == cofactor / det; stored column-major.
        Some(Self::from_cols(
            [c00 * inv, c10 * inv, c20 * inv, 0.0],
            [c01 * inv, c11 * inv, c21 * inv, 0.0],
            [c02 * inv, c12 * inv, c22 * inv, 0.0],
            [0.0, 0.0, 0.0, 1.0],
        ))
    }
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Mat4 {
    type Output = Mat4;

    fn mul(self, rhs: Mat4) -> Mat4 {
        let mut out = [[0.0f32; 4]; 4];
        for (c, col) in out.iter_mut().enumerate() {
            *col = &self * rhs.cols[c];
        }
        Mat4 { cols: out }
    }
}

impl Mul<[f32; 4]> for &Mat4 {
    type Output = [f32; 4];

    fn mul(self, v: [f32; 4]) -> [f32; 4] {
        let mut out = [0.0f32; 4];
        for (r, o) in out.iter_mut().enumerate() {
            *o = self.at(r, 0) * v[0]
                + self.at(r, 1) * v[1]
                + self.at(r, 2) * v[2]
                + self.at(r, 3) * v[3];
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn approx(a: Vec3, b: Vec3) -> bool {
        (a - b).length() < 1e-5
    }

    #[test]
    fn identity_is_neutral() {
        let m = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        assert_eq!(Mat4::IDENTITY * m, m);
        assert_eq!(m * Mat4::IDENTITY, m);
    }

    #[test]
    fn translation_moves_points_not_vectors() {
        let m = Mat4::from_translation(Vec3::new(1.0, 2.0, 3.0));
        assert!(approx(m.transform_point3(Vec3::ZERO), Vec3::new(1.0, 2.0, 3.0)));
        assert!(approx(m.transform_vector3(Vec3::X), Vec3::X));
    }

    #[test]
    fn multiplication_applies_right_to_left() {
        let s = Mat4::from_uniform_scale(2.0);
        let t = Mat4::from_translation(Vec3::X);
        // scale then translate
        assert!(approx((t * s).transform_point3(Vec3::X), Vec3::new(3.0, 0.0, 0.0)));
        // translate then scale
        assert!(approx((s * t).transform_point3(Vec3::X), Vec3::new(4.0, 0.0, 0.0)));
    }

    #[test]
    fn rotation_y_quarter_turn() {
        let r = Mat4::from_rotation_y(std::f32::consts::FRAC_PI_2);
        assert!(approx(r.transform_vector3(Vec3::X), -Vec3::Z));
        assert!(approx(r.transform_vector3(Vec3::Z), Vec3::X));
    }

    #[test]
    fn look_at_places_target_on_negative_z() {
        let eye = Vec3::new(0.0, 2.0, 6.0);
        let view = Mat4::look_at_rh(eye, Vec3::ZERO, Vec3::Y).unwrap();
        let p = view.transform_point3(Vec3::ZERO);
        assert!(p.x.abs() < 1e-5 && p.y.abs() < 1e-5);
        assert!((p.z + eye.length()).abs() < 1e-5);
    }

    #[test]
    fn look_at_rejects_degenerate_input() {
        assert!(Mat4::look_at_rh(Vec3::ZERO, Vec3::ZERO, Vec3::Y).is_none());
        assert!(Mat4::look_at_rh(Vec3::ZERO, Vec3::Y, Vec3::Y).is_none());
    }

    #[test]
    fn perspective_maps_near_and_far_to_unit_depth_range() {
        let p = Mat4::perspective_rh_zo(1.0, 1.5, 0.1, 100.0).unwrap();
        let near = &p * [0.0, 0.0, -0.1, 1.0];
        let far = &p * [0.0, 0.0, -100.0, 1.0];
        assert!((near[2] / near[3]).abs() < 1e-5);
        assert!((far[2] / far[3] - 1.0).abs() < 1e-4);
    }

    #[test]
    fn perspective_rejects_invalid_planes() {
        assert!(Mat4::perspective_rh_zo(1.0, 1.0, 0.0, 10.0).is_none());
        assert!(Mat4::perspective_rh_zo(1.0, 1.0, 5.0, 1.0).is_none());
        assert!(Mat4::perspective_rh_zo(1.0, 0.0, 0.1, 1.0).is_none());
    }

    #[test]
    fn normal_matrix_keeps_mirrored_normals_outward() {
        // Mirrored scale on Z: a +Z facing normal must map to -Z (same as the surface).
        let m = Mat4::from_scale(Vec3::new(4.0, 4.0, -4.0));
        let n = m.normal_matrix().unwrap().transform_vector3(Vec3::Z);
        assert!(n.z < 0.0);
        assert!(n.x.abs() < 1e-6 && n.y.abs() < 1e-6);
    }

    #[test]
    fn normal_matrix_rejects_singular() {
        assert!(Mat4::from_scale(Vec3::new(1.0, 0.0, 1.0)).normal_matrix().is_none());
    }
}
