//! 关节索引和数组
//!
//! 提供编译期安全的关节索引，防止越界和索引错误。
//!
//! # 示例
//!
//! ```rust
//! use armloop_types::{Joint, JointArray};
//!
//! let q: JointArray<f64> = JointArray::new([0.0, 0.1, 0.2, 0.3, 0.4, 0.5, 0.6]);
//!
//! // 类型安全的索引访问
//! assert_eq!(q[Joint::J1], 0.0);
//! assert_eq!(q[Joint::J7], 0.6);
//!
//! // 按关节逐元素运算
//! let dq = q.sub(JointArray::splat(0.1));
//! assert!(dq[Joint::J2].abs() < 1e-12);
//!
//! let clamped = q.map_with(JointArray::splat(0.3), f64::min);
//! assert_eq!(clamped[Joint::J7], 0.3);
//! ```

use std::fmt;
use std::ops::{Index, IndexMut};

/// 关节数量
pub const JOINT_COUNT: usize = 7;

/// 关节枚举
///
/// 表示 7 自由度机械臂的关节。J1-J3 为肩/肘关节，J4-J7 为腕部关节。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Joint {
    /// 关节 1（基座旋转）
    J1 = 0,
    /// 关节 2（肩部俯仰）
    J2 = 1,
    /// 关节 3（上臂旋转）
    J3 = 2,
    /// 关节 4（肘部俯仰）
    J4 = 3,
    /// 关节 5（前臂旋转）
    J5 = 4,
    /// 关节 6（腕部俯仰）
    J6 = 5,
    /// 关节 7（法兰旋转）
    J7 = 6,
}

impl Joint {
    /// 所有关节的数组
    pub const ALL: [Joint; JOINT_COUNT] = [
        Joint::J1,
        Joint::J2,
        Joint::J3,
        Joint::J4,
        Joint::J5,
        Joint::J6,
        Joint::J7,
    ];

    /// 获取关节索引（0-6）
    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// 从索引创建关节（范围检查）
    pub fn from_index(index: usize) -> Option<Self> {
        Self::ALL.get(index).copied()
    }

    /// 获取关节名称
    pub const fn name(self) -> &'static str {
        match self {
            Joint::J1 => "J1",
            Joint::J2 => "J2",
            Joint::J3 => "J3",
            Joint::J4 => "J4",
            Joint::J5 => "J5",
            Joint::J6 => "J6",
            Joint::J7 => "J7",
        }
    }
}

impl fmt::Display for Joint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// 关节数组
///
/// 类型安全的 7 关节数组容器，支持索引、迭代和映射操作。
/// 元素为 `Copy` 时整个数组也是 `Copy`，可以在实时循环中按值传递而不分配内存。
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(transparent))]
pub struct JointArray<T> {
    data: [T; JOINT_COUNT],
}

impl<T: Copy> Copy for JointArray<T> {}

impl<T> JointArray<T> {
    /// 创建新的关节数组
    #[inline]
    pub const fn new(data: [T; JOINT_COUNT]) -> Self {
        JointArray { data }
    }

    /// 获取内部数组的引用
    #[inline]
    pub fn as_array(&self) -> &[T; JOINT_COUNT] {
        &self.data
    }

    /// 迭代器
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.data.iter()
    }

    /// 映射转换
    pub fn map<U, F>(self, f: F) -> JointArray<U>
    where
        F: FnMut(T) -> U,
    {
        JointArray::new(self.data.map(f))
    }

    /// 按关节和另一个数组的元素执行映射
    pub fn map_with<U, V, F>(self, other: JointArray<U>, mut f: F) -> JointArray<V>
    where
        F: FnMut(T, U) -> V,
    {
        let [a1, b1, c1, d1, e1, f1, g1] = self.data;
        let [a2, b2, c2, d2, e2, f2, g2] = other.data;
        JointArray::new([
            f(a1, a2),
            f(b1, b2),
            f(c1, c2),
            f(d1, d2),
            f(e1, e2),
            f(f1, f2),
            f(g1, g2),
        ])
    }
}

impl<T: Copy> JointArray<T> {
    /// 创建所有元素相同的数组
    #[inline]
    pub const fn splat(value: T) -> Self {
        JointArray::new([value; JOINT_COUNT])
    }
}

impl JointArray<f64> {
    /// 零向量
    pub const ZERO: Self = JointArray::new([0.0; JOINT_COUNT]);

    /// 所有元素都是有限值（非 NaN、非无穷）
    pub fn is_finite(&self) -> bool {
        self.data.iter().all(|v| v.is_finite())
    }

    /// 所有元素都严格大于零
    pub fn is_strictly_positive(&self) -> bool {
        self.data.iter().all(|v| *v > 0.0)
    }

    /// 逐元素相加
    #[inline]
    pub fn add(self, other: Self) -> Self {
        self.map_with(other, |a, b| a + b)
    }

    /// 逐元素相减
    #[inline]
    pub fn sub(self, other: Self) -> Self {
        self.map_with(other, |a, b| a - b)
    }

    /// 逐元素缩放
    #[inline]
    pub fn scale(self, factor: f64) -> Self {
        self.map(|v| v * factor)
    }
}

impl<T: Default + Copy> Default for JointArray<T> {
    fn default() -> Self {
        JointArray::splat(T::default())
    }
}

// 索引访问
impl<T> Index<Joint> for JointArray<T> {
    type Output = T;

    #[inline]
    fn index(&self, joint: Joint) -> &T {
        &self.data[joint.index()]
    }
}

impl<T> IndexMut<Joint> for JointArray<T> {
    #[inline]
    fn index_mut(&mut self, joint: Joint) -> &mut T {
        &mut self.data[joint.index()]
    }
}

impl<T> Index<usize> for JointArray<T> {
    type Output = T;

    #[inline]
    fn index(&self, index: usize) -> &T {
        &self.data[index]
    }
}

impl<T> IndexMut<usize> for JointArray<T> {
    #[inline]
    fn index_mut(&mut self, index: usize) -> &mut T {
        &mut self.data[index]
    }
}

impl<T> From<[T; JOINT_COUNT]> for JointArray<T> {
    #[inline]
    fn from(data: [T; JOINT_COUNT]) -> Self {
        JointArray::new(data)
    }
}

impl<T> From<JointArray<T>> for [T; JOINT_COUNT] {
    #[inline]
    fn from(arr: JointArray<T>) -> Self {
        arr.data
    }
}

impl<T> AsRef<[T]> for JointArray<T> {
    fn as_ref(&self) -> &[T] {
        &self.data
    }
}

impl<T> IntoIterator for JointArray<T> {
    type Item = T;
    type IntoIter = std::array::IntoIter<T, JOINT_COUNT>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a JointArray<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.data.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_joint_index() {
        assert_eq!(Joint::J1.index(), 0);
        assert_eq!(Joint::J7.index(), 6);
    }

    #[test]
    fn test_joint_from_index() {
        assert_eq!(Joint::from_index(0), Some(Joint::J1));
        assert_eq!(Joint::from_index(6), Some(Joint::J7));
        assert_eq!(Joint::from_index(7), None);
    }

    #[test]
    fn test_joint_name() {
        assert_eq!(Joint::J1.name(), "J1");
        assert_eq!(format!("{}", Joint::J7), "J7");
    }

    #[test]
    fn test_joint_array_indexing() {
        let q = JointArray::new([0.0, 0.1, 0.2, 0.3, 0.4, 0.5, 0.6]);
        assert_eq!(q[Joint::J1], 0.0);
        assert_eq!(q[Joint::J7], 0.6);
        assert_eq!(q[3], 0.3);
    }

    #[test]
    fn test_joint_array_map_with() {
        let q = JointArray::new([0.0, 0.1, 0.2, 0.3, 0.4, 0.5, 0.6]);
        let diff = q.map_with(JointArray::splat(0.1), |a: f64, b: f64| a - b);
        assert!(diff[Joint::J2].abs() < 1e-12);
        assert!((diff[Joint::J7] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_joint_array_arithmetic() {
        let a = JointArray::new([1.0, 2.0, 3.0, 4.0, 5.0, 6.0, 7.0]);
        let b = JointArray::splat(0.5);
        assert_eq!(a.add(b)[Joint::J1], 1.5);
        assert_eq!(a.sub(b)[Joint::J7], 6.5);
        assert_eq!(a.scale(2.0)[Joint::J4], 8.0);
    }

    #[test]
    fn test_joint_array_checks() {
        assert!(JointArray::splat(1.0).is_strictly_positive());
        assert!(!JointArray::ZERO.is_strictly_positive());

        let mut bad = JointArray::splat(0.0);
        bad[Joint::J5] = f64::NAN;
        assert!(!bad.is_finite());
    }
}
