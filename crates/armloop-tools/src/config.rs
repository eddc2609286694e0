//! # 控制参数配置
//!
//! 所有控制程序共用的参数，TOML 格式，缺省字段使用内置默认值：
//!
//! ```toml
//! [start]
//! q_init = [0.0, -0.785398, 0.0, -2.356194, 0.0, 1.570796, 0.785398]
//! speed_factor = 0.5
//!
//! [joint_velocity]
//! period_s = 1.0
//! omega_max = 1.0
//!
//! [impedance]
//! stiffness = [600.0, 600.0, 600.0, 600.0, 250.0, 150.0, 50.0]
//! damping = [50.0, 50.0, 50.0, 50.0, 30.0, 25.0, 15.0]
//! delta_tau_max = 1.0
//!
//! [circle]
//! acceleration_time = 2.0
//! run_time = 20.0
//! ```

use armloop_types::{CartesianThresholds, CollisionBehavior, JointArray};
use serde::{Deserialize, Serialize};
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};
use std::fs;
use std::io;
use std::path::Path;
use thiserror::Error;

/// 配置错误
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("Invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

fn invalid(field: &'static str, reason: impl Into<String>) -> ConfigError {
    ConfigError::Invalid {
        field,
        reason: reason.into(),
    }
}

/// 完整的控制配置
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ControlConfig {
    /// 控制开始前的准备动作
    pub start: StartConfig,
    /// 碰撞检测阈值
    pub collision: CollisionConfig,
    /// 关节速度振荡运动
    pub joint_velocity: JointVelocityConfig,
    /// 关节阻抗控制律
    pub impedance: ImpedanceConfig,
    /// 圆轨迹
    pub circle: CircleConfig,
}

impl ControlConfig {
    /// 从文件加载并校验
    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = fs::read_to_string(path)?;
        Self::from_toml_str(&content)
    }

    /// 从 TOML 字符串解析并校验
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: ControlConfig = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// 序列化为 TOML
    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// 保存到文件
    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        fs::write(path, self.to_toml_string()?)?;
        Ok(())
    }

    /// 校验所有字段
    ///
    /// 限幅、周期、时间必须严格为正；刚度和阻尼可以为零但不能为负。
    pub fn validate(&self) -> Result<(), ConfigError> {
        let start = &self.start;
        if !start.q_init.is_finite() {
            return Err(invalid("start.q_init", "must be finite"));
        }
        if !(start.speed_factor > 0.0 && start.speed_factor <= 1.0) {
            return Err(invalid(
                "start.speed_factor",
                format!("{} outside (0, 1]", start.speed_factor),
            ));
        }

        if !self.collision.to_behavior().is_valid() {
            return Err(invalid("collision", "thresholds must be strictly positive"));
        }

        let jv = &self.joint_velocity;
        require_positive("joint_velocity.period_s", jv.period_s)?;
        require_positive("joint_velocity.omega_max", jv.omega_max)?;
        if !jv.max_joint_acceleration.is_strictly_positive() || !jv.max_joint_acceleration.is_finite()
        {
            return Err(invalid(
                "joint_velocity.max_joint_acceleration",
                "must be strictly positive",
            ));
        }

        let imp = &self.impedance;
        if imp.stiffness.iter().any(|k| !(*k >= 0.0 && k.is_finite())) {
            return Err(invalid("impedance.stiffness", "must be finite and non-negative"));
        }
        if imp.damping.iter().any(|d| !(*d >= 0.0 && d.is_finite())) {
            return Err(invalid("impedance.damping", "must be finite and non-negative"));
        }
        require_positive("impedance.delta_tau_max", imp.delta_tau_max)?;

        require_positive("circle.acceleration_time", self.circle.acceleration_time)?;
        require_positive("circle.run_time", self.circle.run_time)?;

        Ok(())
    }
}

fn require_positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(invalid(field, format!("{} must be > 0", value)))
    }
}

/// 控制开始前的点到点运动
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StartConfig {
    /// 目标关节位置（rad）
    pub q_init: JointArray<f64>,
    /// 速度比例 (0, 1]
    pub speed_factor: f64,
}

impl Default for StartConfig {
    fn default() -> Self {
        Self {
            q_init: JointArray::new([
                0.0,
                -FRAC_PI_4,
                0.0,
                -3.0 * FRAC_PI_4,
                0.0,
                FRAC_PI_2,
                FRAC_PI_4,
            ]),
            speed_factor: 0.5,
        }
    }
}

/// 碰撞检测阈值（所有阶段使用同一组）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CollisionConfig {
    /// 关节力矩阈值（Nm）
    pub torque_thresholds: JointArray<f64>,
    /// 笛卡尔力 / 力矩阈值（N, Nm）
    pub force_thresholds: CartesianThresholds,
}

impl CollisionConfig {
    pub fn to_behavior(&self) -> CollisionBehavior {
        CollisionBehavior::uniform(self.torque_thresholds, self.force_thresholds)
    }
}

impl Default for CollisionConfig {
    fn default() -> Self {
        let behavior = CollisionBehavior::default();
        Self {
            torque_thresholds: behavior.upper_torque_nominal,
            force_thresholds: behavior.upper_force_nominal,
        }
    }
}

/// 关节速度振荡运动参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct JointVelocityConfig {
    /// 振荡周期 T（s），运动持续 2T
    pub period_s: f64,
    /// 峰值角速度（rad/s）
    pub omega_max: f64,
    /// 最大关节加速度（rad/s²）
    pub max_joint_acceleration: JointArray<f64>,
}

impl Default for JointVelocityConfig {
    fn default() -> Self {
        Self {
            period_s: 1.0,
            omega_max: 1.0,
            max_joint_acceleration: JointArray::new([
                14.25, 7.125, 11.875, 11.875, 14.25, 19.0, 19.0,
            ]),
        }
    }
}

/// 关节阻抗控制律参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ImpedanceConfig {
    /// 刚度（Nm/rad）
    pub stiffness: JointArray<f64>,
    /// 阻尼（Nm·s/rad）
    pub damping: JointArray<f64>,
    /// 每周期最大力矩变化（Nm）
    pub delta_tau_max: f64,
}

impl Default for ImpedanceConfig {
    fn default() -> Self {
        Self {
            stiffness: JointArray::new([600.0, 600.0, 600.0, 600.0, 250.0, 150.0, 50.0]),
            damping: JointArray::new([50.0, 50.0, 50.0, 50.0, 30.0, 25.0, 15.0]),
            delta_tau_max: 1.0,
        }
    }
}

/// 圆轨迹时间参数
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CircleConfig {
    /// 加速 / 减速时间（s）
    pub acceleration_time: f64,
    /// 开始减速的时刻（s）
    pub run_time: f64,
}

impl Default for CircleConfig {
    fn default() -> Self {
        Self {
            acceleration_time: 2.0,
            run_time: 20.0,
        }
    }
}
