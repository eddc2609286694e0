//! 末端位姿（齐次变换矩阵）
//!
//! 与控制器通信时使用 4x4 列主序（column-major）齐次变换，共 16 个元素：
//!
//! ```text
//! [ r0 r4 r8  x ]     索引:  0  4  8 12
//! [ r1 r5 r9  y ]            1  5  9 13
//! [ r2 r6 r10 z ]            2  6 10 14
//! [ 0  0  0   1 ]            3  7 11 15
//! ```
//!
//! 平移分量位于索引 12/13/14。

use nalgebra::{Matrix3, Matrix4};

/// 刚体变换校验容差
const RIGID_TOLERANCE: f64 = 1e-5;

/// 平移 x 分量的索引
pub const TRANSLATION_X: usize = 12;
/// 平移 y 分量的索引
pub const TRANSLATION_Y: usize = 13;
/// 平移 z 分量的索引
pub const TRANSLATION_Z: usize = 14;

/// 末端位姿 `O_T_EE`
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Pose {
    elements: [f64; 16],
}

impl Pose {
    /// 单位变换
    pub const IDENTITY: Self = Pose {
        elements: [
            1.0, 0.0, 0.0, 0.0, //
            0.0, 1.0, 0.0, 0.0, //
            0.0, 0.0, 1.0, 0.0, //
            0.0, 0.0, 0.0, 1.0,
        ],
    };

    /// 从列主序数组创建（不做校验，使用 [`Pose::is_rigid_transform`] 检查）
    #[inline]
    pub const fn from_column_major(elements: [f64; 16]) -> Self {
        Pose { elements }
    }

    /// 列主序元素
    #[inline]
    pub fn as_array(&self) -> &[f64; 16] {
        &self.elements
    }

    /// 平移分量 `[x, y, z]`
    #[inline]
    pub fn translation(&self) -> [f64; 3] {
        [
            self.elements[TRANSLATION_X],
            self.elements[TRANSLATION_Y],
            self.elements[TRANSLATION_Z],
        ]
    }

    /// 旋转块（列主序 3x3）
    pub fn rotation(&self) -> Matrix3<f64> {
        self.matrix().fixed_view::<3, 3>(0, 0).into_owned()
    }

    /// 转换为 nalgebra 矩阵
    pub fn matrix(&self) -> Matrix4<f64> {
        Matrix4::from_column_slice(&self.elements)
    }

    /// 返回只平移了 `offset` 的新位姿，旋转块和其余元素保持不变
    #[must_use]
    pub fn translated(mut self, offset: [f64; 3]) -> Self {
        self.elements[TRANSLATION_X] += offset[0];
        self.elements[TRANSLATION_Y] += offset[1];
        self.elements[TRANSLATION_Z] += offset[2];
        self
    }

    /// 是否为合法刚体变换：
    /// - 所有元素有限
    /// - 最后一行为 `[0, 0, 0, 1]`
    /// - 旋转块正交且行列式为 +1
    pub fn is_rigid_transform(&self) -> bool {
        if !self.elements.iter().all(|v| v.is_finite()) {
            return false;
        }

        let e = &self.elements;
        let last_row_ok = e[3].abs() < RIGID_TOLERANCE
            && e[7].abs() < RIGID_TOLERANCE
            && e[11].abs() < RIGID_TOLERANCE
            && (e[15] - 1.0).abs() < RIGID_TOLERANCE;
        if !last_row_ok {
            return false;
        }

        let r = self.rotation();
        let orthogonality_error = (r.transpose() * r - Matrix3::identity()).abs().max();
        orthogonality_error < RIGID_TOLERANCE && (r.determinant() - 1.0).abs() < RIGID_TOLERANCE
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl From<[f64; 16]> for Pose {
    fn from(elements: [f64; 16]) -> Self {
        Pose::from_column_major(elements)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 绕 x 轴旋转 180°，末端朝下（典型的初始位姿）
    fn flange_down() -> Pose {
        Pose::from_column_major([
            1.0, 0.0, 0.0, 0.0, //
            0.0, -1.0, 0.0, 0.0, //
            0.0, 0.0, -1.0, 0.0, //
            0.307, 0.0, 0.487, 1.0,
        ])
    }

    #[test]
    fn test_identity_is_rigid() {
        assert!(Pose::IDENTITY.is_rigid_transform());
        assert!(flange_down().is_rigid_transform());
    }

    #[test]
    fn test_translation_indices() {
        assert_eq!(flange_down().translation(), [0.307, 0.0, 0.487]);
    }

    #[test]
    fn test_translated_keeps_rotation() {
        let pose = flange_down();
        let moved = pose.translated([0.0, 0.1, -0.05]);
        assert_eq!(moved.rotation(), pose.rotation());
        assert!((moved.translation()[1] - 0.1).abs() < 1e-12);
        assert!((moved.translation()[2] - 0.437).abs() < 1e-12);
        assert!(moved.is_rigid_transform());
    }

    #[test]
    fn test_rejects_bad_last_row() {
        let mut e = *Pose::IDENTITY.as_array();
        e[3] = 0.5;
        assert!(!Pose::from_column_major(e).is_rigid_transform());
    }

    #[test]
    fn test_rejects_scaled_rotation() {
        let mut e = *Pose::IDENTITY.as_array();
        e[0] = 2.0;
        assert!(!Pose::from_column_major(e).is_rigid_transform());
    }

    #[test]
    fn test_rejects_reflection() {
        let mut e = *Pose::IDENTITY.as_array();
        e[10] = -1.0;
        assert!(!Pose::from_column_major(e).is_rigid_transform());
    }

    #[test]
    fn test_rejects_nan() {
        let mut e = *Pose::IDENTITY.as_array();
        e[TRANSLATION_Y] = f64::NAN;
        assert!(!Pose::from_column_major(e).is_rigid_transform());
    }
}
