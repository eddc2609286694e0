//! 关节速度振荡生成器
//!
//! J4-J7 以相同速度先正向、后反向各运动一个周期 `T`，J1-J3 保持静止：
//!
//! ```text
//! k     = (t - t mod T) / T
//! ω(t)  = (-1)^k · ω_max / 2 · (1 - cos(2π t / T))
//! dq    = [0, 0, 0, ω, ω, ω, ω]
//! ```
//!
//! `t ≥ 2T` 时输出最后一帧。每一帧（包括最后一帧）都经过关节加速度饱和。

use crate::error::WorkflowError;
use crate::saturation::saturate_joint_acceleration;
use armloop_driver::MotionGenerator;
use armloop_tools::JointVelocityConfig;
use armloop_types::{JointArray, JointVelocities, Motion, RobotState};
use std::f64::consts::PI;
use std::time::Duration;

/// `t` 时刻的振荡速度
pub fn oscillation_velocity(t: f64, period: f64, omega_max: f64) -> f64 {
    let k = ((t - t % period) / period).round() as i64;
    let sign = if k % 2 == 0 { 1.0 } else { -1.0 };
    sign * omega_max / 2.0 * (1.0 - (2.0 * PI * t / period).cos())
}

/// 关节速度振荡运动
#[derive(Debug, Clone)]
pub struct JointVelocityOscillation {
    period: Duration,
    omega_max: f64,
    max_acceleration: JointArray<f64>,
    cycle: Duration,
    elapsed: Duration,
}

impl JointVelocityOscillation {
    /// # 参数
    ///
    /// - `period`: 振荡周期 `T`，总时长 `2T`
    /// - `omega_max`: 峰值角速度（rad/s）
    /// - `max_acceleration`: 各关节最大加速度（rad/s²）
    /// - `cycle`: 名义控制周期，限幅为 `max_acceleration · cycle`
    pub fn new(
        period: Duration,
        omega_max: f64,
        max_acceleration: JointArray<f64>,
        cycle: Duration,
    ) -> Result<Self, WorkflowError> {
        if period.is_zero() {
            return Err(WorkflowError::invalid("period", "must be > 0"));
        }
        if !(omega_max.is_finite() && omega_max >= 0.0) {
            return Err(WorkflowError::invalid(
                "omega_max",
                format!("{} must be finite and >= 0", omega_max),
            ));
        }
        if !(max_acceleration.is_finite() && max_acceleration.is_strictly_positive()) {
            return Err(WorkflowError::invalid(
                "max_joint_acceleration",
                "must be strictly positive",
            ));
        }
        if cycle.is_zero() {
            return Err(WorkflowError::invalid("cycle", "must be > 0"));
        }

        Ok(JointVelocityOscillation {
            period,
            omega_max,
            max_acceleration,
            cycle,
            elapsed: Duration::ZERO,
        })
    }

    pub fn from_config(config: &JointVelocityConfig, cycle: Duration) -> Result<Self, WorkflowError> {
        let period = Duration::try_from_secs_f64(config.period_s)
            .map_err(|e| WorkflowError::invalid("period_s", e.to_string()))?;
        Self::new(period, config.omega_max, config.max_joint_acceleration, cycle)
    }

    /// 累计时间
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// 运动总时长 `2T`
    pub fn total_duration(&self) -> Duration {
        self.period * 2
    }
}

impl MotionGenerator<JointVelocities> for JointVelocityOscillation {
    fn step(&mut self, state: &RobotState, period: Duration) -> Motion<JointVelocities> {
        self.elapsed += period;

        let t = self.elapsed.as_secs_f64();
        let omega = oscillation_velocity(t, self.period.as_secs_f64(), self.omega_max);
        let raw = JointArray::new([0.0, 0.0, 0.0, omega, omega, omega, omega]);
        let dq = saturate_joint_acceleration(&raw, &state.dq_d, &self.max_acceleration, self.cycle);
        let command = JointVelocities::new(dq);

        if self.elapsed >= self.total_duration() {
            Motion::Finished(command)
        } else {
            Motion::Continue(command)
        }
    }
}
