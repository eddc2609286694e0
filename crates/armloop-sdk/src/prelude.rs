//! Prelude - 常用类型的便捷导入
//!
//! ```rust
//! use armloop_sdk::prelude::*;
//! ```

// 类型层
pub use armloop_types::{
    CartesianPose, CollisionBehavior, Command, ControlMode, Joint, JointArray, JointVelocities,
    Motion, Pose, RobotState, Torques,
};

// 驱动层
pub use armloop_driver::sim::{SimConfig, SimModel, SimulatedArm};
pub use armloop_driver::{
    Driver, DriverConfig, Load, LoopMetricsSnapshot, LoopSummary, Model, MotionGenerator,
    Session, SessionFault,
};

// 控制层
pub use armloop_control::{
    CircleParams, CircleTrajectory, ImpedanceCircleArgs, JointImpedanceController,
    JointVelocityOscillation, ReportSink, StdoutSink, TelemetrySlot, WorkflowError,
    run_impedance_circle, run_joint_velocity_motion,
};

// 工具层
pub use armloop_tools::{ControlConfig, TorqueErrorReport};
