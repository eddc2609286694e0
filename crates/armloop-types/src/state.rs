//! 机器人状态
//!
//! 每个控制周期由会话层（Session）提供一次，周期内只读。

use crate::joint::JointArray;
use crate::pose::Pose;

/// 单个控制周期的机器人状态快照
///
/// 所有字段都是定长数组，整个结构体是 `Copy` 的，复制时不会分配内存。
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[allow(non_snake_case)]
pub struct RobotState {
    /// 测量的关节位置（rad）
    pub q: JointArray<f64>,
    /// 期望关节位置（rad）
    ///
    /// 笛卡尔位姿控制下为会话层逆运动学的解，比当前周期滞后一个周期。
    pub q_d: JointArray<f64>,
    /// 测量的关节速度（rad/s）
    pub dq: JointArray<f64>,
    /// 控制器最后收到的关节速度命令（rad/s）
    pub dq_d: JointArray<f64>,
    /// 测量的关节力矩（Nm）
    pub tau_J: JointArray<f64>,
    /// 最后一次期望的关节力矩（Nm）
    ///
    /// 当前控制器在该字段中包含重力项。
    pub tau_J_d: JointArray<f64>,
    /// 测量的末端位姿（基座坐标系）
    pub O_T_EE: Pose,
}

impl Default for RobotState {
    fn default() -> Self {
        RobotState {
            q: JointArray::ZERO,
            q_d: JointArray::ZERO,
            dq: JointArray::ZERO,
            dq_d: JointArray::ZERO,
            tau_J: JointArray::ZERO,
            tau_J_d: JointArray::ZERO,
            O_T_EE: Pose::IDENTITY,
        }
    }
}

impl RobotState {
    /// 以给定关节位置创建静止状态（期望位置与测量位置一致）
    pub fn at_rest(q: JointArray<f64>, pose: Pose) -> Self {
        RobotState {
            q,
            q_d: q,
            O_T_EE: pose,
            ..Default::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::joint::Joint;

    #[test]
    fn test_at_rest() {
        let q = JointArray::new([0.0, -0.78, 0.0, -2.35, 0.0, 1.57, 0.78]);
        let state = RobotState::at_rest(q, Pose::IDENTITY);
        assert_eq!(state.q, state.q_d);
        assert_eq!(state.dq[Joint::J4], 0.0);
        assert!(state.O_T_EE.is_rigid_transform());
    }

    #[test]
    fn test_state_is_copy() {
        fn assert_copy<T: Copy>() {}
        assert_copy::<RobotState>();
    }
}
