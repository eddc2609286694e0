//! armloop SDK - 7 关节机械臂实时控制循环
//!
//! # 架构设计
//!
//! 从底层到高层：
//!
//! - **类型层** (`types`): 关节数组、位姿、状态快照、命令与结束标记
//! - **驱动层** (`driver`): 会话 / 模型 trait、固定周期控制循环、仿真机械臂
//! - **工具层** (`tools`): TOML 配置、力矩误差统计、数组格式化
//! - **控制层** (`control`): 饱和滤波、轨迹生成器、关节阻抗控制律、遥测
//!
//! # 快速开始
//!
//! ```rust
//! use armloop_sdk::prelude::*;
//!
//! let mut driver = armloop_sdk::connect_with_config("sim:demo", SimConfig::default()).unwrap();
//! let summary = run_joint_velocity_motion(&mut driver, &ControlConfig::default()).unwrap();
//! assert!(summary.final_state.dq_d.is_finite());
//! ```

pub use armloop_control as control;
pub use armloop_driver as driver;
pub use armloop_tools as tools;
pub use armloop_types as types;

pub mod prelude;

use armloop_driver::sim::{SimConfig, SimulatedArm};
use armloop_driver::{Driver, SessionFault};
use tracing::info;

// --- 常用类型 ---

pub use armloop_control::{
    ImpedanceCircleArgs, ImpedanceCircleSummary, StdoutSink, WorkflowError, run_impedance_circle,
    run_joint_velocity_motion,
};
pub use armloop_driver::{LoopSummary, MotionGenerator, Session};
pub use armloop_tools::{ConfigError, ControlConfig};
pub use armloop_types::{JointArray, Motion, Pose, RobotState};

/// 仿真会话的主机名前缀
pub const SIM_HOST: &str = "sim";

/// 连接机械臂
///
/// 目前只提供仿真会话：`sim` 或 `sim:<label>`，按真实时间节拍（1 kHz）运行。
/// 其他主机名返回 [`SessionFault::Network`]。
pub fn connect(hostname: &str) -> Result<Driver<SimulatedArm>, SessionFault> {
    connect_with_config(
        hostname,
        SimConfig {
            realtime: true,
            ..SimConfig::default()
        },
    )
}

/// 使用指定仿真配置连接，`sim:<label>` 中的标签覆盖 `config.label`
pub fn connect_with_config(
    hostname: &str,
    mut config: SimConfig,
) -> Result<Driver<SimulatedArm>, SessionFault> {
    let label = parse_sim_host(hostname).ok_or_else(|| {
        SessionFault::Network(format!(
            "cannot connect to {:?}: no network transport available, use `{}` or `{}:<label>`",
            hostname, SIM_HOST, SIM_HOST
        ))
    })?;
    if let Some(label) = label {
        config.label = label.to_string();
    }

    info!(label = %config.label, realtime = config.realtime, "Connected to simulated arm");
    Ok(Driver::new(SimulatedArm::new(config)))
}

/// `sim` → `Some(None)`，`sim:<label>` → `Some(Some(label))`，其他 → `None`
fn parse_sim_host(hostname: &str) -> Option<Option<&str>> {
    let hostname = hostname.trim();
    if hostname == SIM_HOST {
        return Some(None);
    }
    match hostname.strip_prefix(SIM_HOST)?.strip_prefix(':') {
        Some(label) if !label.is_empty() => Some(Some(label)),
        _ => None,
    }
}
