//! 碰撞检测阈值
//!
//! 控制循环开始前设置，循环内禁止修改。

use crate::joint::JointArray;

/// 笛卡尔方向阈值（x, y, z, rx, ry, rz）
pub type CartesianThresholds = [f64; 6];

/// 碰撞行为配置
///
/// "acceleration" 阈值在加减速阶段生效，"nominal" 阈值在匀速阶段生效。
/// 超过 lower 阈值记为接触，超过 upper 阈值触发反射（会话故障）。
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CollisionBehavior {
    /// 加减速阶段的关节力矩下限（Nm）
    pub lower_torque_acceleration: JointArray<f64>,
    /// 加减速阶段的关节力矩上限（Nm）
    pub upper_torque_acceleration: JointArray<f64>,
    /// 匀速阶段的关节力矩下限（Nm）
    pub lower_torque_nominal: JointArray<f64>,
    /// 匀速阶段的关节力矩上限（Nm）
    pub upper_torque_nominal: JointArray<f64>,
    /// 加减速阶段的笛卡尔力下限（N / Nm）
    pub lower_force_acceleration: CartesianThresholds,
    /// 加减速阶段的笛卡尔力上限（N / Nm）
    pub upper_force_acceleration: CartesianThresholds,
    /// 匀速阶段的笛卡尔力下限（N / Nm）
    pub lower_force_nominal: CartesianThresholds,
    /// 匀速阶段的笛卡尔力上限（N / Nm）
    pub upper_force_nominal: CartesianThresholds,
}

impl CollisionBehavior {
    /// 所有阶段使用同一组阈值
    pub fn uniform(torque: JointArray<f64>, force: CartesianThresholds) -> Self {
        CollisionBehavior {
            lower_torque_acceleration: torque,
            upper_torque_acceleration: torque,
            lower_torque_nominal: torque,
            upper_torque_nominal: torque,
            lower_force_acceleration: force,
            upper_force_acceleration: force,
            lower_force_nominal: force,
            upper_force_nominal: force,
        }
    }

    /// 所有阈值都严格为正
    pub fn is_valid(&self) -> bool {
        let torques = [
            &self.lower_torque_acceleration,
            &self.upper_torque_acceleration,
            &self.lower_torque_nominal,
            &self.upper_torque_nominal,
        ];
        let forces = [
            &self.lower_force_acceleration,
            &self.upper_force_acceleration,
            &self.lower_force_nominal,
            &self.upper_force_nominal,
        ];
        torques.iter().all(|t| t.is_strictly_positive())
            && forces.iter().all(|f| f.iter().all(|v| *v > 0.0))
    }
}

impl Default for CollisionBehavior {
    fn default() -> Self {
        CollisionBehavior::uniform(
            JointArray::new([20.0, 20.0, 18.0, 18.0, 16.0, 14.0, 12.0]),
            [20.0, 20.0, 20.0, 25.0, 25.0, 25.0],
        )
    }
}
