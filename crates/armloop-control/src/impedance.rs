//! 关节阻抗控制律
//!
//! ```text
//! τ_raw = K (q_d - q) - D dq + c
//! τ     = saturate(τ_raw, base = τ_J_d - g, ±Δτ_max)
//! ```
//!
//! `c`/`g` 为模型提供的科氏项和重力项（无末端负载）。输出不含重力，由会话叠加。
//! 与位姿回调配合使用时，`q_d` 是会话对上一周期位姿目标的逆运动学解。

use crate::error::WorkflowError;
use crate::saturation::saturate_torque_rate;
use crate::telemetry::{TelemetrySample, TelemetrySlot};
use armloop_driver::{Load, Model, MotionGenerator};
use armloop_tools::ImpedanceConfig;
use armloop_types::{JointArray, Motion, RobotState, Torques};
use std::time::Duration;

/// 刚度 / 阻尼增益
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImpedanceGains {
    /// Nm/rad
    pub stiffness: JointArray<f64>,
    /// Nm·s/rad
    pub damping: JointArray<f64>,
}

/// 单周期的控制律输出
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImpedanceOutput {
    /// 饱和后的力矩命令（不含重力）
    pub tau: JointArray<f64>,
    /// 本周期重力项
    pub gravity: JointArray<f64>,
}

/// 关节阻抗控制器
///
/// 作为力矩回调使用；设置了遥测槽位时，每周期尝试发布一次（拿不到锁就跳过）。
pub struct JointImpedanceController<'a, M: Model> {
    model: M,
    gains: ImpedanceGains,
    delta_tau_max: f64,
    telemetry: Option<&'a TelemetrySlot>,
}

impl<'a, M: Model> JointImpedanceController<'a, M> {
    pub fn new(model: M, gains: ImpedanceGains, delta_tau_max: f64) -> Result<Self, WorkflowError> {
        let non_negative = |a: &JointArray<f64>| a.is_finite() && a.iter().all(|v| *v >= 0.0);
        if !non_negative(&gains.stiffness) {
            return Err(WorkflowError::invalid("stiffness", "must be finite and non-negative"));
        }
        if !non_negative(&gains.damping) {
            return Err(WorkflowError::invalid("damping", "must be finite and non-negative"));
        }
        if !(delta_tau_max.is_finite() && delta_tau_max > 0.0) {
            return Err(WorkflowError::invalid(
                "delta_tau_max",
                format!("{} must be > 0", delta_tau_max),
            ));
        }

        Ok(JointImpedanceController {
            model,
            gains,
            delta_tau_max,
            telemetry: None,
        })
    }

    pub fn from_config(model: M, config: &ImpedanceConfig) -> Result<Self, WorkflowError> {
        let gains = ImpedanceGains {
            stiffness: config.stiffness,
            damping: config.damping,
        };
        Self::new(model, gains, config.delta_tau_max)
    }

    /// 每周期向 `slot` 发布遥测
    #[must_use]
    pub fn with_telemetry(mut self, slot: &'a TelemetrySlot) -> Self {
        self.telemetry = Some(slot);
        self
    }

    pub fn gains(&self) -> &ImpedanceGains {
        &self.gains
    }

    /// 计算本周期的力矩命令
    pub fn compute(&self, state: &RobotState) -> ImpedanceOutput {
        let coriolis = self.model.coriolis(state, &Load::NONE);
        let gravity = self.model.gravity(state, &Load::NONE);

        let position_error = state.q_d.sub(state.q);
        let spring = self.gains.stiffness.map_with(position_error, |k, e| k * e);
        let damper = self.gains.damping.map_with(state.dq, |d, dq| d * dq);
        let tau_raw = spring.sub(damper).add(coriolis);

        let tau = saturate_torque_rate(&tau_raw, &state.tau_J_d, &gravity, self.delta_tau_max);
        ImpedanceOutput { tau, gravity }
    }
}

impl<M: Model> MotionGenerator<Torques> for JointImpedanceController<'_, M> {
    fn step(&mut self, state: &RobotState, _period: Duration) -> Motion<Torques> {
        let output = self.compute(state);

        if let Some(slot) = self.telemetry {
            slot.try_publish(&TelemetrySample {
                tau_command: output.tau,
                gravity: output.gravity,
                state: *state,
            });
        }

        Motion::Continue(Torques::new(output.tau))
    }
}
