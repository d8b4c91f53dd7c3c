// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.
//! Column-major `Mat3` and `Mat4`.

use super::{Vec3, Vec4, EPSILON};
use std::ops::Mul;

/// A 3x3 column-major matrix: the rotation and scale block of a [`Mat4`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[repr(C)]
pub struct Mat3 {
    /// Column vectors.
    pub cols: [Vec3; 3],
}

impl Mat3 {
    /// The identity.
    pub const IDENTITY: Self = Self::from_cols(Vec3::X, Vec3::Y, Vec3::Z);

    /// Builds a matrix from its columns.
    #[inline]
    pub const fn from_cols(x_axis: Vec3, y_axis: Vec3, z_axis: Vec3) -> Self {
        Self {
            cols: [x_axis, y_axis, z_axis],
        }
    }

    /// The upper-left block of `m`, i.e. `m` without its translation.
    #[inline]
    pub fn from_mat4(m: &Mat4) -> Self {
        let [x, y, z, _] = m.cols;
        Self::from_cols(x.truncate(), y.truncate(), z.truncate())
    }

    #[inline]
    pub fn transpose(&self) -> Self {
        let [x, y, z] = self.cols;
        Self::from_cols(
            Vec3::new(x.x, y.x, z.x),
            Vec3::new(x.y, y.y, z.y),
            Vec3::new(x.z, y.z, z.z),
        )
    }

    #[inline]
    pub fn determinant(&self) -> f32 {
        let [x, y, z] = self.cols;
        x.dot(y.cross(z))
    }

    /// The inverse, or `None` for a singular matrix.
    pub fn inverse(&self) -> Option<Self> {
        let [x, y, z] = self.cols;
        let det = self.determinant();
        if det.abs() < EPSILON {
            return None;
        }
        // The rows of the inverse are the pairwise cross products of the columns.
        let rows = Self::from_cols(y.cross(z), z.cross(x), x.cross(y));
        let rcp = 1.0 / det;
        let inverse = rows.transpose();
        Some(Self::from_cols(
            inverse.cols[0] * rcp,
            inverse.cols[1] * rcp,
            inverse.cols[2] * rcp,
        ))
    }

    /// Embeds the matrix into a [`Mat4`] with no translation.
    #[inline]
    pub fn to_mat4(&self) -> Mat4 {
        let [x, y, z] = self.cols;
        Mat4::from_cols(Vec4::from_vec3(x, 0.0), Vec4::from_vec3(y, 0.0), Vec4::from_vec3(z, 0.0), Vec4::W)
    }

    /// The std140 layout of a `mat3`: three columns padded to `vec4`.
    #[inline]
    pub fn to_std140(&self) -> [[f32; 4]; 3] {
        self.cols.map(|c| [c.x, c.y, c.z, 0.0])
    }
}

impl Default for Mat3 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul<Vec3> for Mat3 {
    type Output = Vec3;

    #[inline]
    fn mul(self, v: Vec3) -> Vec3 {
        let [x, y, z] = self.cols;
        x * v.x + y * v.y + z * v.z
    }
}

/// A 4x4 column-major matrix for model, view and projection transforms.
///
/// `Pod`, so a matrix is laid out exactly as a std140 `mat4`.
#[derive(Debug, Clone, Copy, PartialEq, bytemuck::Pod, bytemuck::Zeroable)]
#[repr(C)]
pub struct Mat4 {
    /// Column vectors; the translation lives in `cols[3]`.
    pub cols: [Vec4; 4],
}

impl Mat4 {
    /// The identity.
    pub const IDENTITY: Self = Self::from_cols(Vec4::X, Vec4::Y, Vec4::Z, Vec4::W);

    /// Builds a matrix from its columns.
    #[inline]
    pub const fn from_cols(x_axis: Vec4, y_axis: Vec4, z_axis: Vec4, w_axis: Vec4) -> Self {
        Self {
            cols: [x_axis, y_axis, z_axis, w_axis],
        }
    }

    #[inline]
    fn from_cols_array_2d(m: [[f32; 4]; 4]) -> Self {
        Self {
            cols: m.map(|[x, y, z, w]| Vec4::new(x, y, z, w)),
        }
    }

    #[inline]
    pub fn from_translation(offset: Vec3) -> Self {
        Self::from_cols(Vec4::X, Vec4::Y, Vec4::Z, Vec4::from_vec3(offset, 1.0))
    }

    #[inline]
    pub fn from_scale(scale: Vec3) -> Self {
        Self::from_cols(Vec4::X * scale.x, Vec4::Y * scale.y, Vec4::Z * scale.z, Vec4::W)
    }

    /// Right-handed perspective projection mapping depth to `[0, 1]`.
    ///
    /// # Panics
    ///
    /// Panics unless `0 < z_near < z_far`.
    pub fn perspective_rh_zo(fov_y_radians: f32, aspect_ratio: f32, z_near: f32, z_far: f32) -> Self {
        assert!(
            0.0 < z_near && z_near < z_far,
            "Invalid clip planes: near {z_near}, far {z_far}"
        );
        let focal = 1.0 / (0.5 * fov_y_radians).tan();
        let range = 1.0 / (z_near - z_far);
        Self::from_cols(
            Vec4::X * (focal / aspect_ratio),
            Vec4::Y * focal,
            Vec4::new(0.0, 0.0, z_far * range, -1.0),
            Vec4::new(0.0, 0.0, z_near * z_far * range, 0.0),
        )
    }

    /// Right-handed view matrix of a camera at `eye` looking at `target`.
    ///
    /// `None` when the view direction is degenerate or parallel to `up`.
    pub fn look_at_rh(eye: Vec3, target: Vec3, up: Vec3) -> Option<Self> {
        let to_target = target - eye;
        if to_target.length_squared() < EPSILON * EPSILON {
            return None;
        }
        let forward = to_target.normalize();
        let side = forward.cross(up);
        if side.length_squared() < EPSILON * EPSILON {
            return None;
        }
        let side = side.normalize();
        let up = side.cross(forward);

        let rotation = Mat3::from_cols(side, up, -forward).transpose();
        let mut view = rotation.to_mat4();
        view.cols[3] = Vec4::from_vec3(rotation * -eye, 1.0);
        Some(view)
    }

    pub fn transpose(&self) -> Self {
        let m = self.to_cols_array_2d();
        Self::from_cols_array_2d(std::array::from_fn(|row| std::array::from_fn(|col| m[col][row])))
    }

    /// The inverse, or `None` for a singular matrix.
    ///
    /// Expands the determinant over the 2x2 minors of the first two and the
    /// last two columns.
    pub fn inverse(&self) -> Option<Self> {
        let [[a00, a01, a02, a03], [a10, a11, a12, a13], [a20, a21, a22, a23], [a30, a31, a32, a33]] =
            self.to_cols_array_2d();

        let s0 = a00 * a11 - a10 * a01;
        let s1 = a00 * a12 - a10 * a02;
        let s2 = a00 * a13 - a10 * a03;
        let s3 = a01 * a12 - a11 * a02;
        let s4 = a01 * a13 - a11 * a03;
        let s5 = a02 * a13 - a12 * a03;

        let c0 = a20 * a31 - a30 * a21;
        let c1 = a20 * a32 - a30 * a22;
        let c2 = a20 * a33 - a30 * a23;
        let c3 = a21 * a32 - a31 * a22;
        let c4 = a21 * a33 - a31 * a23;
        let c5 = a22 * a33 - a32 * a23;

        let det = s0 * c5 - s1 * c4 + s2 * c3 + s3 * c2 - s4 * c1 + s5 * c0;
        if det.abs() < EPSILON {
            return None;
        }
        let rcp = 1.0 / det;

        // The array holds columns, so this is the inverse of the transpose
        // written row by row: the columns of the inverse.
        Some(Self::from_cols(
            Vec4::new(
                a11 * c5 - a12 * c4 + a13 * c3,
                -a01 * c5 + a02 * c4 - a03 * c3,
                a31 * s5 - a32 * s4 + a33 * s3,
                -a21 * s5 + a22 * s4 - a23 * s3,
            ) * rcp,
            Vec4::new(
                -a10 * c5 + a12 * c2 - a13 * c1,
                a00 * c5 - a02 * c2 + a03 * c1,
                -a30 * s5 + a32 * s2 - a33 * s1,
                a20 * s5 - a22 * s2 + a23 * s1,
            ) * rcp,
            Vec4::new(
                a10 * c4 - a11 * c2 + a13 * c0,
                -a00 * c4 + a01 * c2 - a03 * c0,
                a30 * s4 - a31 * s2 + a33 * s0,
                -a20 * s4 + a21 * s2 - a23 * s0,
            ) * rcp,
            Vec4::new(
                -a10 * c3 + a11 * c1 - a12 * c0,
                a00 * c3 - a01 * c1 + a02 * c0,
                -a30 * s3 + a31 * s1 - a32 * s0,
                a20 * s3 - a21 * s1 + a22 * s0,
            ) * rcp,
        ))
    }

    /// The translation part.
    #[inline]
    pub fn translation(&self) -> Vec3 {
        self.cols[3].truncate()
    }

    /// Column-major nested arrays, the layout uniform uploads expect.
    #[inline]
    pub fn to_cols_array_2d(&self) -> [[f32; 4]; 4] {
        self.cols.map(Vec4::to_array)
    }
}

impl Default for Mat4 {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl Mul for Mat4 {
    type Output = Self;

    #[inline]
    fn mul(self, rhs: Mat4) -> Self {
        Self {
            cols: rhs.cols.map(|col| self * col),
        }
    }
}

impl Mul<Vec4> for Mat4 {
    type Output = Vec4;

    #[inline]
    fn mul(self, v: Vec4) -> Vec4 {
        let [x, y, z, w] = self.cols;
        x * v.x + y * v.y + z * v.z + w * v.w
    }
}
