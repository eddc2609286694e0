//! armloop 控制算法层
//!
//! 在 [`armloop_driver`] 的控制循环之上提供：
//!
//! - [`saturation`]：关节加速度 / 力矩变化率饱和
//! - [`joint_velocity`]：关节速度振荡生成器
//! - [`circle`]：圆形笛卡尔轨迹生成器
//! - [`impedance`]：关节阻抗控制律
//! - [`telemetry`]：实时周期与报告线程之间的非阻塞遥测
//! - [`workflow`]：组合以上部分的完整流程
//!
//! # 示例
//!
//! ```rust
//! use armloop_control::workflow::run_joint_velocity_motion;
//! use armloop_driver::Driver;
//! use armloop_driver::sim::{SimConfig, SimulatedArm};
//! use armloop_tools::ControlConfig;
//!
//! let mut driver = Driver::new(SimulatedArm::new(SimConfig::default()));
//! let summary = run_joint_velocity_motion(&mut driver, &ControlConfig::default()).unwrap();
//! assert_eq!(summary.cycles, 2001);
//! ```

pub mod circle;
pub mod error;
pub mod impedance;
pub mod joint_velocity;
pub mod saturation;
pub mod telemetry;
pub mod workflow;

pub use circle::{CircleParams, CircleTrajectory};
pub use error::WorkflowError;
pub use impedance::{ImpedanceGains, ImpedanceOutput, JointImpedanceController};
pub use joint_velocity::{JointVelocityOscillation, oscillation_velocity};
pub use saturation::{saturate, saturate_joint_acceleration, saturate_torque_rate};
pub use telemetry::{
    ReportSink, StdoutSink, TelemetryMetrics, TelemetryMetricsSnapshot, TelemetryReporter,
    TelemetrySample, TelemetrySlot, report_interval,
};
pub use workflow::{
    ImpedanceCircleArgs, ImpedanceCircleSummary, prepare, run_impedance_circle,
    run_joint_velocity_motion,
};
