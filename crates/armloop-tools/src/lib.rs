//! # armloop Tools - 配置与统计
//!
//! **依赖原则**: 只依赖 `armloop-types`，不依赖驱动层和控制层
//!
//! ## 包含模块
//!
//! - `config` - TOML 控制参数（带默认值和校验）
//! - `statistics` - 力矩误差与均方根（纯函数）
//! - `format` - 数组格式化

pub mod config;
pub mod format;
pub mod statistics;

pub use config::{
    CircleConfig, CollisionConfig, ConfigError, ControlConfig, ImpedanceConfig,
    JointVelocityConfig, StartConfig,
};
pub use format::Bracketed;
pub use statistics::{TorqueErrorReport, root_mean_square};
