//! armloop 基础类型
//!
//! 整个控制栈共享的数据类型，不包含任何 IO 或线程逻辑：
//!
//! - `joint` - 关节索引与 7 关节数组
//! - `pose` - 列主序齐次变换与刚体校验
//! - `state` - 每周期的机器人状态快照
//! - `command` - 关节速度 / 笛卡尔位姿 / 力矩命令与结束标记
//! - `collision` - 碰撞检测阈值
//!
//! ## Feature Flags
//!
//! - `serde` - 为所有类型派生 `Serialize` / `Deserialize`

pub mod collision;
pub mod command;
pub mod joint;
pub mod pose;
pub mod state;

pub use collision::{CartesianThresholds, CollisionBehavior};
pub use command::{
    CartesianPose, Command, ControlMode, JointVelocities, Motion, Torques,
};
pub use joint::{JOINT_COUNT, Joint, JointArray};
pub use pose::Pose;
pub use state::RobotState;
