//! 控制循环驱动
//!
//! 固定周期调用用户回调，把回调输出的命令下发给会话，直到回调给出结束标记或会话故障。
//!
//! # 循环状态机
//!
//! ```text
//! Running ──(回调返回 Finished)──▶ Finalizing ──(下发最后一帧)──▶ Stopped
//!    │                                 │
//!    └──────────(SessionFault)─────────┴──▶ 立即返回 Err，不再下发任何命令
//! ```
//!
//! # 示例
//!
//! ```rust
//! use armloop_driver::{Driver, sim::{SimConfig, SimulatedArm}};
//! use armloop_types::{JointArray, JointVelocities, Motion};
//! use std::time::Duration;
//!
//! let mut driver = Driver::new(SimulatedArm::new(SimConfig::default()));
//! let mut elapsed = Duration::ZERO;
//! let summary = driver
//!     .run_velocity_loop(&mut |_state: &armloop_types::RobotState, period: Duration| {
//!         elapsed += period;
//!         let command = JointVelocities::new(JointArray::ZERO);
//!         if elapsed >= Duration::from_millis(10) {
//!             Motion::Finished(command)
//!         } else {
//!             Motion::Continue(command)
//!         }
//!     })
//!     .unwrap();
//! assert_eq!(summary.cycles, 11);
//! ```

use crate::error::SessionFault;
use crate::metrics::LoopMetrics;
use crate::session::Session;
use armloop_types::{
    CartesianPose, CollisionBehavior, Command, ControlMode, JointArray, JointVelocities, Motion,
    RobotState, Torques,
};
use std::sync::Arc;
use std::sync::atomic::Ordering;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, trace, warn};

/// 每周期回调
///
/// 闭包 `FnMut(&RobotState, Duration) -> Motion<T>` 自动实现该 trait。
pub trait MotionGenerator<T> {
    /// 计算本周期的命令
    ///
    /// `period` 为距上一周期经过的时间，第一次调用时为零；丢包时可能是名义周期的整数倍。
    fn step(&mut self, state: &RobotState, period: Duration) -> Motion<T>;
}

impl<T, F> MotionGenerator<T> for F
where
    F: FnMut(&RobotState, Duration) -> Motion<T>,
{
    #[inline]
    fn step(&mut self, state: &RobotState, period: Duration) -> Motion<T> {
        self(state, period)
    }
}

/// 驱动配置
#[derive(Debug, Clone)]
pub struct DriverConfig {
    /// 名义控制周期
    pub nominal_period: Duration,
    /// 回调计算时间预算，超过时记录一次 overrun（`Duration::ZERO` 表示不检查）
    pub compute_budget: Duration,
}

impl Default for DriverConfig {
    fn default() -> Self {
        DriverConfig {
            nominal_period: Duration::from_millis(1),
            compute_budget: Duration::from_micros(300),
        }
    }
}

/// 一次控制调用的统计
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoopSummary {
    pub mode: ControlMode,
    /// 回调被调用的次数
    pub cycles: u64,
    /// 会话报告的总时间（不含最后一帧）
    pub elapsed: Duration,
    /// 结束时的机器人状态
    pub final_state: RobotState,
    /// 本次调用中回调超过计算预算的周期数
    pub budget_overruns: u64,
}

enum LoopState {
    Running,
    Finalizing(Command),
    Stopped,
}

/// 控制循环驱动
///
/// 持有会话，负责非实时准备操作和实时控制循环。
pub struct Driver<S: Session> {
    session: S,
    config: DriverConfig,
    metrics: Arc<LoopMetrics>,
}

impl<S: Session> Driver<S> {
    pub fn new(session: S) -> Self {
        Self::with_config(session, DriverConfig::default())
    }

    pub fn with_config(session: S, config: DriverConfig) -> Self {
        Driver {
            session,
            config,
            metrics: Arc::new(LoopMetrics::new()),
        }
    }

    pub fn session(&self) -> &S {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut S {
        &mut self.session
    }

    pub fn into_session(self) -> S {
        self.session
    }

    /// 共享的循环指标
    pub fn metrics(&self) -> &Arc<LoopMetrics> {
        &self.metrics
    }

    pub fn config(&self) -> &DriverConfig {
        &self.config
    }

    /// 设置碰撞检测阈值
    pub fn set_collision_behavior(
        &mut self,
        behavior: &CollisionBehavior,
    ) -> Result<(), SessionFault> {
        if !behavior.is_valid() {
            return Err(self.fault(SessionFault::invalid_command(
                "collision thresholds must be strictly positive",
            )));
        }
        self.session.set_collision_behavior(behavior).map_err(|e| self.fault(e))
    }

    /// 点到点运动到 `q_goal`
    pub fn move_to_joint_positions(
        &mut self,
        q_goal: &JointArray<f64>,
        speed_factor: f64,
    ) -> Result<(), SessionFault> {
        if !q_goal.is_finite() {
            return Err(self.fault(SessionFault::invalid_command("joint goal is not finite")));
        }
        if !(speed_factor > 0.0 && speed_factor <= 1.0) {
            return Err(self.fault(SessionFault::invalid_command(format!(
                "speed factor {} outside (0, 1]",
                speed_factor
            ))));
        }
        self.session.move_to_joint_positions(q_goal, speed_factor).map_err(|e| self.fault(e))?;
        info!("Finished moving to initial joint configuration");
        Ok(())
    }

    /// 加载动力学模型
    pub fn load_model(&mut self) -> Result<S::Model, SessionFault> {
        self.session.load_model().map_err(|e| self.fault(e))
    }

    /// 读取一次当前状态
    pub fn read_once(&mut self) -> Result<RobotState, SessionFault> {
        self.session.read_once().map_err(|e| self.fault(e))
    }

    /// 关节速度控制
    pub fn run_velocity_loop<G>(&mut self, generator: &mut G) -> Result<LoopSummary, SessionFault>
    where
        G: MotionGenerator<JointVelocities> + ?Sized,
    {
        self.run_loop(ControlMode::JointVelocity, |state, period| {
            generator.step(state, period).map(Command::JointVelocities)
        })
    }

    /// 笛卡尔位姿控制
    pub fn run_pose_loop<G>(&mut self, generator: &mut G) -> Result<LoopSummary, SessionFault>
    where
        G: MotionGenerator<CartesianPose> + ?Sized,
    {
        self.run_loop(ControlMode::CartesianPose, |state, period| {
            generator.step(state, period).map(Command::CartesianPose)
        })
    }

    /// 纯力矩控制
    pub fn run_torque_loop<C>(&mut self, torque_callback: &mut C) -> Result<LoopSummary, SessionFault>
    where
        C: MotionGenerator<Torques> + ?Sized,
    {
        self.run_loop(ControlMode::Torque, |state, period| {
            torque_callback.step(state, period).map(Command::Torques)
        })
    }

    /// 力矩 + 笛卡尔位姿双回调控制
    ///
    /// 每个周期先调用位姿回调，再调用力矩回调，两者看到同一个状态。
    /// 任意一个回调给出结束标记，本周期的组合命令即为最后一帧。
    pub fn run_torque_with_pose_loop<C, G>(
        &mut self,
        torque_callback: &mut C,
        pose_generator: &mut G,
    ) -> Result<LoopSummary, SessionFault>
    where
        C: MotionGenerator<Torques> + ?Sized,
        G: MotionGenerator<CartesianPose> + ?Sized,
    {
        self.run_loop(ControlMode::TorqueWithCartesianPose, |state, period| {
            let pose = pose_generator.step(state, period);
            let torques = torque_callback.step(state, period);
            let finished = pose.is_finished() || torques.is_finished();
            let command = Command::TorquesWithPose(torques.into_inner(), pose.into_inner());
            if finished {
                Motion::Finished(command)
            } else {
                Motion::Continue(command)
            }
        })
    }

    fn run_loop<F>(&mut self, mode: ControlMode, mut step: F) -> Result<LoopSummary, SessionFault>
    where
        F: FnMut(&RobotState, Duration) -> Motion<Command>,
    {
        debug!(mode = mode.name(), "Entering control loop");
        let mut robot_state = self.session.start_control(mode).map_err(|e| self.fault(e))?;

        let stretch_threshold = self.config.nominal_period.mul_f64(1.5);
        let mut period = Duration::ZERO;
        let mut elapsed = Duration::ZERO;
        let mut cycles = 0u64;
        let mut overruns = 0u64;
        let mut loop_state = LoopState::Running;

        loop {
            loop_state = match loop_state {
                LoopState::Running => {
                    let started = Instant::now();
                    let motion = step(&robot_state, period);
                    if self.check_budget(started.elapsed()) {
                        overruns += 1;
                    }

                    cycles += 1;
                    self.metrics.cycles.fetch_add(1, Ordering::Relaxed);

                    let finished = motion.is_finished();
                    let command = motion.into_inner();
                    if let Err(reason) = command.validate() {
                        let fault = self.fault(SessionFault::invalid_command(reason));
                        if let Err(e) = self.session.abort_control() {
                            error!("Failed to leave {} control: {}", mode.name(), e);
                        }
                        return Err(fault);
                    }

                    if finished {
                        LoopState::Finalizing(command)
                    } else {
                        let (next_state, next_period) =
                            self.session.exchange(&command, false).map_err(|e| self.fault(e))?;
                        self.metrics.commands_sent.fetch_add(1, Ordering::Relaxed);

                        if next_period > stretch_threshold {
                            self.metrics.stretched_cycles.fetch_add(1, Ordering::Relaxed);
                            trace!(?next_period, "Cycle stretched, command packet lost");
                        }

                        robot_state = next_state;
                        period = next_period;
                        elapsed += next_period;
                        LoopState::Running
                    }
                },
                LoopState::Finalizing(command) => {
                    let (final_state, _) =
                        self.session.exchange(&command, true).map_err(|e| self.fault(e))?;
                    self.metrics.commands_sent.fetch_add(1, Ordering::Relaxed);
                    self.metrics.final_commands.fetch_add(1, Ordering::Relaxed);
                    robot_state = final_state;
                    LoopState::Stopped
                },
                LoopState::Stopped => break,
            };
        }

        if overruns > 0 {
            warn!(
                mode = mode.name(),
                overruns,
                cycles,
                budget = ?self.config.compute_budget,
                "Control callback exceeded its compute budget"
            );
        }
        debug!(mode = mode.name(), cycles, ?elapsed, "Control loop finished");
        Ok(LoopSummary {
            mode,
            cycles,
            elapsed,
            final_state: robot_state,
            budget_overruns: overruns,
        })
    }

    fn check_budget(&self, spent: Duration) -> bool {
        let budget = self.config.compute_budget;
        if budget.is_zero() || spent <= budget {
            return false;
        }
        self.metrics.budget_overruns.fetch_add(1, Ordering::Relaxed);
        trace!(?spent, ?budget, "Compute budget exceeded");
        true
    }

    fn fault(&self, fault: SessionFault) -> SessionFault {
        self.metrics.faults.fetch_add(1, Ordering::Relaxed);
        error!("{}", fault);
        fault
    }
}
