//! # 力矩误差统计
//!
//! 遥测线程在非实时路径上计算：期望总力矩（控制律输出 + 重力）与测量力矩之差，及其均方根。

use crate::format::Bracketed;
use armloop_types::JointArray;
use std::fmt;

/// 均方根，空切片返回 0
pub fn root_mean_square(values: &[f64]) -> f64 {
    if values.is_empty() {
        return 0.0;
    }
    let mean_square = values.iter().map(|v| v * v).sum::<f64>() / values.len() as f64;
    mean_square.sqrt()
}

/// 单次遥测报告
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TorqueErrorReport {
    /// `commanded - measured`（Nm）
    pub error: JointArray<f64>,
    /// 含重力的期望力矩（Nm）
    pub commanded: JointArray<f64>,
    /// 测量力矩（Nm）
    pub measured: JointArray<f64>,
    /// 误差均方根（Nm）
    pub rms: f64,
}

impl TorqueErrorReport {
    /// 由不含重力的控制律输出、重力项和测量力矩计算报告
    pub fn compute(
        tau_command: &JointArray<f64>,
        gravity: &JointArray<f64>,
        tau_measured: &JointArray<f64>,
    ) -> Self {
        let commanded = tau_command.add(*gravity);
        let error = commanded.sub(*tau_measured);
        TorqueErrorReport {
            error,
            commanded,
            measured: *tau_measured,
            rms: root_mean_square(error.as_array()),
        }
    }
}

impl fmt::Display for TorqueErrorReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "tau_error [Nm]: {}", Bracketed(self.error.as_array()))?;
        writeln!(f, "tau_commanded [Nm]: {}", Bracketed(self.commanded.as_array()))?;
        writeln!(f, "tau_measured [Nm]: {}", Bracketed(self.measured.as_array()))?;
        writeln!(f, "root mean square of tau_error [Nm]: {}", self.rms)?;
        write!(f, "-----------------------")
    }
}
