//! 数组格式化
//!
//! 以 `[a,b,c]` 形式输出，支持透传精度（`{:.3}`）。只在非实时路径上使用。

use std::fmt;

/// 方括号包围、逗号分隔的数组显示
///
/// ```rust
/// use armloop_tools::Bracketed;
///
/// assert_eq!(format!("{}", Bracketed(&[1.0, -0.5])), "[1,-0.5]");
/// assert_eq!(format!("{:.2}", Bracketed(&[1.0, -0.5])), "[1.00,-0.50]");
/// ```
pub struct Bracketed<'a, T>(pub &'a [T]);

impl<T: fmt::Display> fmt::Display for Bracketed<'_, T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, value) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            match f.precision() {
                Some(precision) => write!(f, "{:.*}", precision, value)?,
                None => write!(f, "{}", value)?,
            }
        }
        f.write_str("]")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty() {
        let empty: [f64; 0] = [];
        assert_eq!(Bracketed(&empty).to_string(), "[]");
    }

    #[test]
    fn test_joint_array() {
        let q = armloop_types::JointArray::new([0.0, 1.5, -2.0, 0.25, 0.0, 0.0, 3.0]);
        assert_eq!(Bracketed(q.as_array()).to_string(), "[0,1.5,-2,0.25,0,0,3]");
    }
}
