//! 会话与动力学模型接口
//!
//! `Session` 抽象了与机械臂控制器之间的连接：非实时的准备操作（碰撞阈值、点到点运动、
//! 加载模型），以及实时控制模式下每周期一次的状态/命令交换。
//!
//! 驱动（[`crate::Driver`]）只通过这两个 trait 与外部协作者交互，
//! 因此真实硬件和 [`crate::sim::SimulatedArm`] 可以互换。

use crate::error::SessionFault;
use armloop_types::{CollisionBehavior, Command, ControlMode, JointArray, RobotState};
use std::time::Duration;

/// 末端负载参数
///
/// 动力学补偿项均按"无额外负载"计算时使用 [`Load::NONE`]。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Load {
    /// 质量（kg）
    pub mass: f64,
    /// 质心位置，法兰坐标系（m）
    pub com: [f64; 3],
    /// 惯性张量，列主序（kg·m²）
    pub inertia: [f64; 9],
}

impl Load {
    /// 无负载
    pub const NONE: Load = Load {
        mass: 0.0,
        com: [0.0; 3],
        inertia: [0.0; 9],
    };
}

impl Default for Load {
    fn default() -> Self {
        Load::NONE
    }
}

/// 动力学模型
///
/// 由会话加载，在实时周期内调用，不允许阻塞或分配内存。
pub trait Model {
    /// 重力力矩（Nm）
    fn gravity(&self, state: &RobotState, load: &Load) -> JointArray<f64>;

    /// 科氏力 / 离心力力矩（Nm）
    fn coriolis(&self, state: &RobotState, load: &Load) -> JointArray<f64>;
}

impl<M: Model + ?Sized> Model for &M {
    fn gravity(&self, state: &RobotState, load: &Load) -> JointArray<f64> {
        (**self).gravity(state, load)
    }

    fn coriolis(&self, state: &RobotState, load: &Load) -> JointArray<f64> {
        (**self).coriolis(state, load)
    }
}

/// 与机械臂控制器的会话
///
/// # 实时交换
///
/// 1. [`Session::start_control`] 进入指定控制模式，返回第一个周期的状态；
/// 2. 之后每个周期调用一次 [`Session::exchange`] 下发命令，
///    返回下一周期的状态以及距上一周期经过的时间；
/// 3. `finished = true` 的那次交换结束控制模式；驱动拒绝命令时改用 [`Session::abort_control`] 退出。
///
/// 力矩命令不含重力项，会话负责叠加重力补偿，因此 `RobotState::tau_J_d` 包含重力。
/// 任何 `Err` 都表示本次控制调用已经结束。
pub trait Session {
    type Model: Model;

    /// 设置碰撞检测阈值（仅在非控制模式下允许）
    fn set_collision_behavior(&mut self, behavior: &CollisionBehavior) -> Result<(), SessionFault>;

    /// 点到点关节运动（阻塞直到到达）
    ///
    /// `speed_factor` 取值 (0, 1]。
    fn move_to_joint_positions(
        &mut self,
        q_goal: &JointArray<f64>,
        speed_factor: f64,
    ) -> Result<(), SessionFault>;

    /// 加载动力学模型
    fn load_model(&mut self) -> Result<Self::Model, SessionFault>;

    /// 读取一次当前状态（非控制模式）
    fn read_once(&mut self) -> Result<RobotState, SessionFault>;

    /// 进入控制模式，返回第一个周期的状态
    fn start_control(&mut self, mode: ControlMode) -> Result<RobotState, SessionFault>;

    /// 下发本周期的命令，返回下一周期的状态和经过的时间
    ///
    /// `finished = true` 时控制模式结束，返回的状态为结束时的状态，时间为零。
    fn exchange(
        &mut self,
        command: &Command,
        finished: bool,
    ) -> Result<(RobotState, Duration), SessionFault>;

    /// 不下发命令直接退出控制模式
    ///
    /// 驱动在本地拒绝命令时调用，之后会话可以开始新的控制调用。
    /// 会话已经不在控制模式时什么也不做。
    fn abort_control(&mut self) -> Result<(), SessionFault>;
}
