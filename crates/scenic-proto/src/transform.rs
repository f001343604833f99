// SPDX-License-Identifier: Apache-2.0
//! Canonical transform representation and boundary normalization.
//!
//! Producers hand transforms to the API either as a ready-made 4×4 matrix
//! or as structured position/rotation/scale components. The wire knows only
//! one form: the column-major 16-element matrix. [`TransformInput`] is the
//! tagged boundary type; [`TransformInput::to_matrix`] is the normalization.

use serde::{Deserialize, Serialize};

/// Column-major 4×4 transform matrix, the canonical wire form.
pub type Matrix4 = [f32; 16];

/// The identity transform.
pub const IDENTITY_MATRIX: Matrix4 = [
    1.0, 0.0, 0.0, 0.0, //
    0.0, 1.0, 0.0, 0.0, //
    0.0, 0.0, 1.0, 0.0, //
    0.0, 0.0, 0.0, 1.0,
];

/// Rotation component of a structured transform.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum Rotation {
    /// Intrinsic XYZ Euler angles in radians, applied as `Rz · Ry · Rx`.
    Euler([f32; 3]),
    /// Unit quaternion `[x, y, z, w]`.
    Quaternion([f32; 4]),
}

impl Default for Rotation {
    fn default() -> Self {
        Self::Euler([0.0, 0.0, 0.0])
    }
}

/// Transform as supplied by the caller, before normalization.
///
/// Both representations are accepted everywhere a transform is taken;
/// they are collapsed to the canonical matrix immediately at the boundary
/// and only the matrix ever reaches the wire.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum TransformInput {
    /// A ready-made column-major 4×4 matrix, passed through unchanged.
    Matrix(Matrix4),
    /// Structured position/rotation/scale, composed into a matrix.
    Components {
        /// Translation.
        position: [f32; 3],
        /// Rotation, Euler or quaternion.
        rotation: Rotation,
        /// Per-axis scale.
        scale: [f32; 3],
    },
}

impl TransformInput {
    /// Translation-only transform (identity rotation, unit scale).
    pub fn at(position: [f32; 3]) -> Self {
        Self::Components {
            position,
            rotation: Rotation::default(),
            scale: [1.0, 1.0, 1.0],
        }
    }

    /// Full structured transform.
    pub fn parts(position: [f32; 3], rotation: Rotation, scale: [f32; 3]) -> Self {
        Self::Components {
            position,
            rotation,
            scale,
        }
    }

    /// Normalize to the canonical column-major matrix.
    pub fn to_matrix(&self) -> Matrix4 {
        match *self {
            Self::Matrix(m) => m,
            Self::Components {
                position,
                rotation,
                scale,
            } => compose(position, rotation, scale),
        }
    }
}

impl Default for TransformInput {
    fn default() -> Self {
        Self::Matrix(IDENTITY_MATRIX)
    }
}

impl From<Matrix4> for TransformInput {
    fn from(m: Matrix4) -> Self {
        Self::Matrix(m)
    }
}

/// Compose position/rotation/scale into a column-major matrix.
///
/// Columns 0–2 are the rotated, scaled basis vectors; column 3 is the
/// translation.
fn compose(position: [f32; 3], rotation: Rotation, scale: [f32; 3]) -> Matrix4 {
    let [bx, by, bz] = rotation_basis(rotation);
    [
        bx[0] * scale[0],
        bx[1] * scale[0],
        bx[2] * scale[0],
        0.0,
        by[0] * scale[1],
        by[1] * scale[1],
        by[2] * scale[1],
        0.0,
        bz[0] * scale[2],
        bz[1] * scale[2],
        bz[2] * scale[2],
        0.0,
        position[0],
        position[1],
        position[2],
        1.0,
    ]
}

/// Rotated basis vectors (the columns of the rotation matrix).
fn rotation_basis(rotation: Rotation) -> [[f32; 3]; 3] {
    match rotation {
        Rotation::Euler([rx, ry, rz]) => {
            let (sx, cx) = rx.sin_cos();
            let (sy, cy) = ry.sin_cos();
            let (sz, cz) = rz.sin_cos();
            // R = Rz · Ry · Rx
            [
                [cy * cz, cy * sz, -sy],
                [sx * sy * cz - cx * sz, sx * sy * sz + cx * cz, sx * cy],
                [cx * sy * cz + sx * sz, cx * sy * sz - sx * cz, cx * cy],
            ]
        }
        Rotation::Quaternion([x, y, z, w]) => [
            [
                1.0 - 2.0 * (y * y + z * z),
                2.0 * (x * y + w * z),
                2.0 * (x * z - w * y),
            ],
            [
                2.0 * (x * y - w * z),
                1.0 - 2.0 * (x * x + z * z),
                2.0 * (y * z + w * x),
            ],
            [
                2.0 * (x * z + w * y),
                2.0 * (y * z - w * x),
                1.0 - 2.0 * (x * x + y * y),
            ],
        ],
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::f32::consts::FRAC_PI_2;

    fn assert_close(a: Matrix4, b: Matrix4) {
        for i in 0..16 {
            assert!((a[i] - b[i]).abs() < 1e-6, "element {i}: {} vs {}", a[i], b[i]);
        }
    }

    #[test]
    fn matrix_input_passes_through_unchanged() {
        let mut m = IDENTITY_MATRIX;
        m[12] = 3.5;
        assert_eq!(TransformInput::Matrix(m).to_matrix(), m);
    }

    #[test]
    fn translation_lands_in_the_fourth_column() {
        let m = TransformInput::at([1.0, 2.0, 3.0]).to_matrix();
        assert_eq!(&m[12..15], &[1.0, 2.0, 3.0]);
        let mut expect = IDENTITY_MATRIX;
        expect[12] = 1.0;
        expect[13] = 2.0;
        expect[14] = 3.0;
        assert_close(m, expect);
    }

    #[test]
    fn quarter_turn_about_z_rotates_the_x_basis() {
        let m = TransformInput::parts(
            [0.0, 0.0, 0.0],
            Rotation::Euler([0.0, 0.0, FRAC_PI_2]),
            [1.0, 1.0, 1.0],
        )
        .to_matrix();
        // X basis vector (column 0) maps to +Y.
        assert!((m[0] - 0.0).abs() < 1e-6);
        assert!((m[1] - 1.0).abs() < 1e-6);
        assert!((m[2] - 0.0).abs() < 1e-6);
    }

    #[test]
    fn identity_quaternion_is_the_identity_matrix() {
        let m = TransformInput::parts(
            [0.0, 0.0, 0.0],
            Rotation::Quaternion([0.0, 0.0, 0.0, 1.0]),
            [1.0, 1.0, 1.0],
        )
        .to_matrix();
        assert_close(m, IDENTITY_MATRIX);
    }

    #[test]
    fn quaternion_and_euler_agree_for_a_z_rotation() {
        let half = FRAC_PI_2 / 2.0;
        let quat = TransformInput::parts(
            [0.0, 0.0, 0.0],
            Rotation::Quaternion([0.0, 0.0, half.sin(), half.cos()]),
            [1.0, 1.0, 1.0],
        )
        .to_matrix();
        let euler = TransformInput::parts(
            [0.0, 0.0, 0.0],
            Rotation::Euler([0.0, 0.0, FRAC_PI_2]),
            [1.0, 1.0, 1.0],
        )
        .to_matrix();
        assert_close(quat, euler);
    }

    #[test]
    fn scale_stretches_the_basis_columns() {
        let m = TransformInput::parts(
            [0.0, 0.0, 0.0],
            Rotation::default(),
            [2.0, 3.0, 4.0],
        )
        .to_matrix();
        assert_eq!(m[0], 2.0);
        assert_eq!(m[5], 3.0);
        assert_eq!(m[10], 4.0);
    }
}
