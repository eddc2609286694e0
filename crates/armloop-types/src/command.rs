//! 控制命令类型
//!
//! 每个周期回调返回一个命令载荷，并通过 [`Motion`] 标记是否为最后一帧。
//!
//! ```rust
//! use armloop_types::{Motion, Torques, JointArray};
//!
//! let tau = Torques::new(JointArray::splat(0.0));
//! let last = Motion::Finished(tau);
//! assert!(last.is_finished());
//! ```

use crate::joint::JointArray;
use crate::pose::Pose;

/// 关节速度命令（rad/s）
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct JointVelocities {
    /// 期望关节速度
    pub dq: JointArray<f64>,
}

impl JointVelocities {
    pub const fn new(dq: JointArray<f64>) -> Self {
        JointVelocities { dq }
    }
}

/// 笛卡尔位姿命令
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[allow(non_snake_case)]
pub struct CartesianPose {
    /// 期望末端位姿，必须是合法刚体变换
    pub O_T_EE: Pose,
}

impl CartesianPose {
    pub const fn new(pose: Pose) -> Self {
        CartesianPose { O_T_EE: pose }
    }
}

/// 关节力矩命令（Nm）
///
/// 不包含重力项：控制器在执行时自行叠加重力补偿。
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[allow(non_snake_case)]
pub struct Torques {
    /// 期望关节力矩（不含重力）
    pub tau_J: JointArray<f64>,
}

impl Torques {
    pub const fn new(tau_j: JointArray<f64>) -> Self {
        Torques { tau_J: tau_j }
    }
}

/// 回调输出：继续运行，或以该命令结束会话
///
/// 返回 `Finished` 后，驱动会把该命令再下发一次然后结束控制循环，不再调用回调。
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Motion<T> {
    /// 普通命令
    Continue(T),
    /// 最后一帧命令
    Finished(T),
}

impl<T> Motion<T> {
    /// 是否为最后一帧
    #[inline]
    pub fn is_finished(&self) -> bool {
        matches!(self, Motion::Finished(_))
    }

    /// 取出命令载荷
    #[inline]
    pub fn into_inner(self) -> T {
        match self {
            Motion::Continue(value) | Motion::Finished(value) => value,
        }
    }

    /// 命令载荷的引用
    #[inline]
    pub fn get(&self) -> &T {
        match self {
            Motion::Continue(value) | Motion::Finished(value) => value,
        }
    }

    /// 变换载荷，保留结束标记
    pub fn map<U, F>(self, f: F) -> Motion<U>
    where
        F: FnOnce(T) -> U,
    {
        match self {
            Motion::Continue(value) => Motion::Continue(f(value)),
            Motion::Finished(value) => Motion::Finished(f(value)),
        }
    }
}

/// 控制模式
///
/// 一个控制会话只允许一种模式；力矩 + 位姿为唯一的组合模式。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ControlMode {
    JointVelocity,
    CartesianPose,
    Torque,
    TorqueWithCartesianPose,
}

impl ControlMode {
    pub const fn name(self) -> &'static str {
        match self {
            ControlMode::JointVelocity => "joint-velocity",
            ControlMode::CartesianPose => "cartesian-pose",
            ControlMode::Torque => "torque",
            ControlMode::TorqueWithCartesianPose => "torque+cartesian-pose",
        }
    }
}

/// 单个周期下发给会话层的命令
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Command {
    JointVelocities(JointVelocities),
    CartesianPose(CartesianPose),
    Torques(Torques),
    /// 组合模式：力矩负责实际输出，位姿只提供目标
    TorquesWithPose(Torques, CartesianPose),
}

impl Command {
    /// 命令对应的控制模式
    pub fn mode(&self) -> ControlMode {
        match self {
            Command::JointVelocities(_) => ControlMode::JointVelocity,
            Command::CartesianPose(_) => ControlMode::CartesianPose,
            Command::Torques(_) => ControlMode::Torque,
            Command::TorquesWithPose(..) => ControlMode::TorqueWithCartesianPose,
        }
    }

    /// 检查命令数值合法性，返回第一个问题的描述
    pub fn validate(&self) -> Result<(), &'static str> {
        let torques_ok = |t: &Torques| t.tau_J.is_finite();
        let pose_ok = |p: &CartesianPose| p.O_T_EE.is_rigid_transform();

        match self {
            Command::JointVelocities(v) if !v.dq.is_finite() => {
                Err("joint velocity command is not finite")
            },
            Command::CartesianPose(p) if !pose_ok(p) => {
                Err("cartesian pose command is not a rigid transform")
            },
            Command::Torques(t) if !torques_ok(t) => Err("torque command is not finite"),
            Command::TorquesWithPose(t, _) if !torques_ok(t) => Err("torque command is not finite"),
            Command::TorquesWithPose(_, p) if !pose_ok(p) => {
                Err("cartesian pose command is not a rigid transform")
            },
            _ => Ok(()),
        }
    }
}

impl From<JointVelocities> for Command {
    fn from(value: JointVelocities) -> Self {
        Command::JointVelocities(value)
    }
}

impl From<CartesianPose> for Command {
    fn from(value: CartesianPose) -> Self {
        Command::CartesianPose(value)
    }
}

impl From<Torques> for Command {
    fn from(value: Torques) -> Self {
        Command::Torques(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_motion_marker() {
        let cont = Motion::Continue(1);
        let fin = Motion::Finished(2);
        assert!(!cont.is_finished());
        assert!(fin.is_finished());
        assert_eq!(fin.map(|v| v * 10), Motion::Finished(20));
        assert_eq!(*cont.get(), 1);
        assert_eq!(cont.into_inner(), 1);
    }

    #[test]
    fn test_command_mode() {
        let t = Torques::new(JointArray::ZERO);
        let p = CartesianPose::new(Pose::IDENTITY);
        assert_eq!(Command::from(t).mode(), ControlMode::Torque);
        assert_eq!(
            Command::TorquesWithPose(t, p).mode(),
            ControlMode::TorqueWithCartesianPose
        );
    }

    #[test]
    fn test_command_validate() {
        let mut dq = JointArray::ZERO;
        assert!(Command::from(JointVelocities::new(dq)).validate().is_ok());
        dq[2] = f64::INFINITY;
        assert!(Command::from(JointVelocities::new(dq)).validate().is_err());

        let skewed = Pose::from_column_major([2.0; 16]);
        let t = Torques::new(JointArray::ZERO);
        assert!(
            Command::TorquesWithPose(t, CartesianPose::new(skewed))
                .validate()
                .is_err()
        );
    }
}
