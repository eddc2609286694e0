//! 仿真机械臂
//!
//! 不连接硬件的 [`Session`] 实现，用于测试和演示：
//!
//! - 固定 1 kHz 周期，可选用 `spin_sleep` 按真实时间节拍运行
//! - 关节速度 / 笛卡尔位姿命令按理想跟踪处理
//! - 力矩命令按单位惯量的双积分模型积分（重力由会话补偿后抵消）
//! - 笛卡尔位姿与关节位置之间使用参考构型附近的线性化映射
//! - 可模拟丢包（每 N 个周期报告一次两倍周期）和在第 N 个周期后注入反射故障
//! - 可选地检查速度跳变和力矩变化率，超限时触发反射

use crate::error::SessionFault;
use crate::session::{Load, Model, Session};
use armloop_types::{
    CollisionBehavior, Command, ControlMode, JointArray, Pose, RobotState, Torques,
};
use nalgebra::{SMatrix, SVector, Vector3};
use std::f64::consts::{FRAC_PI_2, FRAC_PI_4};
use std::time::{Duration, Instant};
use tracing::{debug, trace, warn};

/// 数值比较容差
const LIMIT_TOLERANCE: f64 = 1e-9;

/// 负载重力臂长（m）
const LOAD_LEVER_ARM: f64 = 0.3;

const GRAVITY_ACCELERATION: f64 = 9.81;

/// 参考构型（末端朝下）
pub const READY_JOINT_POSITIONS: JointArray<f64> = JointArray::new([
    0.0,
    -FRAC_PI_4,
    0.0,
    -3.0 * FRAC_PI_4,
    0.0,
    FRAC_PI_2,
    FRAC_PI_4,
]);

/// 参考构型对应的末端位姿
pub const READY_POSE: Pose = Pose::from_column_major([
    1.0, 0.0, 0.0, 0.0, //
    0.0, -1.0, 0.0, 0.0, //
    0.0, 0.0, -1.0, 0.0, //
    0.307, 0.0, 0.487, 1.0,
]);

/// 仿真配置
#[derive(Debug, Clone)]
pub struct SimConfig {
    /// 标签（出现在日志中）
    pub label: String,
    /// 初始关节位置
    pub initial_q: JointArray<f64>,
    /// 名义周期
    pub period: Duration,
    /// 是否按真实时间节拍运行
    pub realtime: bool,
    /// 每 N 个周期丢一个包（报告两倍周期）
    pub packet_loss_every: Option<u64>,
    /// 成功交换 N 个周期后注入反射故障
    pub fault_after: Option<u64>,
    /// 速度命令的最大关节加速度（rad/s²），超过时触发反射
    pub max_joint_acceleration: Option<JointArray<f64>>,
    /// 总力矩（含重力）每周期的最大变化量（Nm），超过时触发反射
    pub max_torque_rate: Option<f64>,
    /// 关节等效惯量（kg·m²）
    pub inertia: JointArray<f64>,
    /// 模型是否可用
    pub model_available: bool,
    /// 记录下发的命令
    pub record_commands: bool,
}

impl Default for SimConfig {
    fn default() -> Self {
        SimConfig {
            label: "sim".to_string(),
            initial_q: READY_JOINT_POSITIONS,
            period: Duration::from_millis(1),
            realtime: false,
            packet_loss_every: None,
            fault_after: None,
            max_joint_acceleration: None,
            max_torque_rate: None,
            inertia: JointArray::splat(1.0),
            model_available: true,
            record_commands: false,
        }
    }
}

/// 一条已下发的命令
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecordedCommand {
    pub command: Command,
    pub finished: bool,
    /// 执行该命令前的机器人状态
    pub state: RobotState,
    /// 该命令被执行的时长
    pub period: Duration,
}

/// 仿真动力学模型
///
/// 俯仰关节（J2/J4/J6）上的正弦重力项，和与速度平方成正比的科氏项。
#[derive(Debug, Clone, PartialEq)]
pub struct SimModel {
    /// 各关节重力幅值（Nm）
    pub gravity_gain: JointArray<f64>,
    /// 科氏项系数
    pub coriolis_gain: JointArray<f64>,
}

impl Default for SimModel {
    fn default() -> Self {
        SimModel {
            gravity_gain: JointArray::new([0.0, 25.0, 0.0, 12.0, 0.0, 2.0, 0.0]),
            coriolis_gain: JointArray::splat(0.05),
        }
    }
}

impl Model for SimModel {
    fn gravity(&self, state: &RobotState, load: &Load) -> JointArray<f64> {
        let load_torque = load.mass * GRAVITY_ACCELERATION * LOAD_LEVER_ARM;
        self.gravity_gain.map_with(state.q, |gain, q| {
            if gain == 0.0 { 0.0 } else { (gain + load_torque) * q.sin() }
        })
    }

    fn coriolis(&self, state: &RobotState, load: &Load) -> JointArray<f64> {
        let scale = 1.0 + load.mass;
        self.coriolis_gain.map_with(state.dq, |gain, dq| scale * gain * dq * dq.abs())
    }
}

/// 参考构型附近的线性化运动学
#[derive(Debug, Clone)]
struct LinearKinematics {
    q_ref: SVector<f64, 7>,
    pose_ref: Pose,
    /// Δp → Δq
    to_joint: SMatrix<f64, 7, 3>,
    /// Δq → Δp（`to_joint` 的伪逆）
    to_cartesian: SMatrix<f64, 3, 7>,
}

impl LinearKinematics {
    fn new(q_ref: JointArray<f64>, pose_ref: Pose) -> Self {
        #[rustfmt::skip]
        let to_joint = SMatrix::<f64, 7, 3>::from_row_slice(&[
            //  x    y     z
            0.0, 2.0,  0.0, // J1
            1.0, 0.0, -1.0, // J2
            0.0, 0.0,  0.0, // J3
            1.0, 0.0,  1.0, // J4
            0.0, 0.0,  0.0, // J5
            0.0, 0.0,  0.0, // J6
            0.0, 0.0,  0.0, // J7
        ]);

        // 各列正交，伪逆即按列范数平方缩放的转置
        let mut to_cartesian = to_joint.transpose();
        for axis in 0..3 {
            let norm_sq = to_joint.column(axis).norm_squared();
            for joint in 0..7 {
                to_cartesian[(axis, joint)] /= norm_sq;
            }
        }

        LinearKinematics {
            q_ref: to_vector(&q_ref),
            pose_ref,
            to_joint,
            to_cartesian,
        }
    }

    fn joint_positions(&self, pose: &Pose) -> JointArray<f64> {
        let [x, y, z] = pose.translation();
        let [x0, y0, z0] = self.pose_ref.translation();
        let dq = self.to_joint * Vector3::new(x - x0, y - y0, z - z0);
        from_vector(&(self.q_ref + dq))
    }

    fn pose(&self, q: &JointArray<f64>) -> Pose {
        let dp = self.to_cartesian * (to_vector(q) - self.q_ref);
        self.pose_ref.translated([dp[0], dp[1], dp[2]])
    }
}

fn to_vector(q: &JointArray<f64>) -> SVector<f64, 7> {
    SVector::<f64, 7>::from_column_slice(q.as_array())
}

fn from_vector(v: &SVector<f64, 7>) -> JointArray<f64> {
    JointArray::new(std::array::from_fn(|i| v[i]))
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Phase {
    Idle,
    Controlling(ControlMode),
    Faulted,
}

/// 仿真机械臂
#[derive(Debug)]
pub struct SimulatedArm {
    config: SimConfig,
    model: SimModel,
    kinematics: LinearKinematics,
    state: RobotState,
    collision: Option<CollisionBehavior>,
    phase: Phase,
    exchanges: u64,
    next_tick: Option<Instant>,
    recorded: Vec<RecordedCommand>,
}

impl SimulatedArm {
    pub fn new(config: SimConfig) -> Self {
        Self::with_model(config, SimModel::default())
    }

    pub fn with_model(config: SimConfig, model: SimModel) -> Self {
        let kinematics = LinearKinematics::new(READY_JOINT_POSITIONS, READY_POSE);
        let mut arm = SimulatedArm {
            state: RobotState::default(),
            kinematics,
            model,
            collision: None,
            phase: Phase::Idle,
            exchanges: 0,
            next_tick: None,
            recorded: Vec::new(),
            config,
        };
        arm.hold(arm.config.initial_q);
        arm
    }

    pub fn config(&self) -> &SimConfig {
        &self.config
    }

    pub fn label(&self) -> &str {
        &self.config.label
    }

    /// 当前状态
    pub fn state(&self) -> &RobotState {
        &self.state
    }

    /// 已设置的碰撞阈值
    pub fn collision_behavior(&self) -> Option<&CollisionBehavior> {
        self.collision.as_ref()
    }

    /// 已下发的命令（需开启 `record_commands`）
    pub fn recorded(&self) -> &[RecordedCommand] {
        &self.recorded
    }

    /// 当前控制调用中成功交换的周期数
    pub fn exchanges(&self) -> u64 {
        self.exchanges
    }

    /// 静止在 `q`，力矩等于重力
    fn hold(&mut self, q: JointArray<f64>) {
        let mut state = RobotState::at_rest(q, self.kinematics.pose(&q));
        let gravity = self.model.gravity(&state, &Load::NONE);
        state.tau_J = gravity;
        state.tau_J_d = gravity;
        self.state = state;
    }

    fn ensure_idle(&self, operation: &str) -> Result<(), SessionFault> {
        match self.phase {
            Phase::Idle => Ok(()),
            Phase::Controlling(mode) => Err(SessionFault::Protocol(format!(
                "{} not allowed while in {} control",
                operation,
                mode.name()
            ))),
            Phase::Faulted => Err(SessionFault::Network(format!(
                "{}: session lost after fault",
                self.config.label
            ))),
        }
    }

    /// 检查命令是否会触发反射
    fn check_limits(&self, command: &Command, period: Duration) -> Result<(), SessionFault> {
        let dt = period.as_secs_f64();

        if let (Command::JointVelocities(v), Some(max_acc)) =
            (command, &self.config.max_joint_acceleration)
        {
            let delta = v.dq.sub(self.state.dq_d);
            for joint in armloop_types::Joint::ALL {
                let allowed = max_acc[joint] * dt + LIMIT_TOLERANCE;
                if delta[joint].abs() > allowed {
                    return Err(SessionFault::reflex(format!(
                        "joint velocity discontinuity on {} ({:.6} rad/s in one cycle)",
                        joint, delta[joint]
                    )));
                }
            }
        }

        if let (Some(torques), Some(max_rate)) = (torque_part(command), self.config.max_torque_rate) {
            let gravity = self.model.gravity(&self.state, &Load::NONE);
            let total = torques.tau_J.add(gravity);
            let delta = total.sub(self.state.tau_J_d);
            if let Some(joint) = armloop_types::Joint::ALL
                .into_iter()
                .find(|j| delta[*j].abs() > max_rate + LIMIT_TOLERANCE)
            {
                return Err(SessionFault::reflex(format!(
                    "torque discontinuity on {} ({:.6} Nm in one cycle)",
                    joint, delta[joint]
                )));
            }
        }

        Ok(())
    }

    /// 按命令推进一个名义周期
    fn integrate(&mut self, command: &Command) {
        let h = self.config.period.as_secs_f64();

        match command {
            Command::JointVelocities(v) => {
                let q = self.state.q.add(v.dq.scale(h));
                let dq = v.dq;
                self.hold(q);
                self.state.dq = dq;
                self.state.dq_d = dq;
            },
            Command::CartesianPose(p) => {
                let q_prev = self.state.q;
                let q = self.kinematics.joint_positions(&p.O_T_EE);
                self.hold(q);
                self.state.O_T_EE = p.O_T_EE;
                self.state.dq = q.sub(q_prev).scale(1.0 / h);
            },
            Command::Torques(t) => self.integrate_torque(t),
            Command::TorquesWithPose(t, p) => {
                self.integrate_torque(t);
                self.state.q_d = self.kinematics.joint_positions(&p.O_T_EE);
            },
        }
    }

    /// 单位惯量双积分（半隐式欧拉），会话叠加的重力与真实重力抵消
    fn integrate_torque(&mut self, torques: &Torques) {
        let h = self.config.period.as_secs_f64();
        let gravity = self.model.gravity(&self.state, &Load::NONE);
        let coriolis = self.model.coriolis(&self.state, &Load::NONE);

        let total = torques.tau_J.add(gravity);
        let ddq = torques
            .tau_J
            .sub(coriolis)
            .map_with(self.config.inertia, |tau, inertia| tau / inertia);
        let dq = self.state.dq.add(ddq.scale(h));
        let q = self.state.q.add(dq.scale(h));

        self.state.q = q;
        self.state.dq = dq;
        self.state.tau_J = total;
        self.state.tau_J_d = total;
        self.state.O_T_EE = self.kinematics.pose(&q);
    }

    fn pace(&mut self, period: Duration) {
        if !self.config.realtime {
            return;
        }
        let now = Instant::now();
        let next_tick = self.next_tick.get_or_insert(now);
        *next_tick += period;
        if *next_tick > now {
            spin_sleep::sleep(*next_tick - now);
        } else {
            trace!("{}: simulation fell behind real time", self.config.label);
            *next_tick = now;
        }
    }
}

fn torque_part(command: &Command) -> Option<&Torques> {
    match command {
        Command::Torques(t) | Command::TorquesWithPose(t, _) => Some(t),
        Command::JointVelocities(_) | Command::CartesianPose(_) => None,
    }
}

impl Session for SimulatedArm {
    type Model = SimModel;

    fn set_collision_behavior(&mut self, behavior: &CollisionBehavior) -> Result<(), SessionFault> {
        self.ensure_idle("set_collision_behavior")?;
        self.collision = Some(*behavior);
        debug!("{}: collision behavior set", self.config.label);
        Ok(())
    }

    fn move_to_joint_positions(
        &mut self,
        q_goal: &JointArray<f64>,
        speed_factor: f64,
    ) -> Result<(), SessionFault> {
        self.ensure_idle("move_to_joint_positions")?;
        debug!(
            "{}: point-to-point move to {:?} at speed factor {}",
            self.config.label,
            q_goal.as_array(),
            speed_factor
        );
        self.hold(*q_goal);
        Ok(())
    }

    fn load_model(&mut self) -> Result<SimModel, SessionFault> {
        if !self.config.model_available {
            return Err(SessionFault::ModelUnavailable(format!(
                "{}: model library not available",
                self.config.label
            )));
        }
        Ok(self.model.clone())
    }

    fn read_once(&mut self) -> Result<RobotState, SessionFault> {
        self.ensure_idle("read_once")?;
        Ok(self.state)
    }

    fn start_control(&mut self, mode: ControlMode) -> Result<RobotState, SessionFault> {
        self.ensure_idle("start_control")?;
        self.phase = Phase::Controlling(mode);
        self.exchanges = 0;
        self.next_tick = None;
        self.recorded.clear();
        self.state.dq = JointArray::ZERO;
        self.state.dq_d = JointArray::ZERO;
        debug!("{}: entered {} control", self.config.label, mode.name());
        Ok(self.state)
    }

    fn exchange(
        &mut self,
        command: &Command,
        finished: bool,
    ) -> Result<(RobotState, Duration), SessionFault> {
        let Phase::Controlling(mode) = self.phase else {
            return Err(SessionFault::Protocol(format!(
                "{}: exchange outside of control mode",
                self.config.label
            )));
        };
        if command.mode() != mode {
            self.phase = Phase::Idle;
            return Err(SessionFault::Protocol(format!(
                "{} command in {} control",
                command.mode().name(),
                mode.name()
            )));
        }

        if let Some(limit) = self.config.fault_after
            && self.exchanges >= limit
        {
            self.phase = Phase::Faulted;
            warn!("{}: injected reflex after {} cycles", self.config.label, limit);
            return Err(SessionFault::reflex(format!(
                "simulated reflex after {} cycles",
                limit
            )));
        }

        let lost_packet = self
            .config
            .packet_loss_every
            .is_some_and(|n| n > 0 && (self.exchanges + 1) % n == 0);
        let substeps = if lost_packet { 2 } else { 1 };
        let period = self.config.period * substeps;

        if let Err(fault) = self.check_limits(command, period) {
            self.phase = Phase::Idle;
            return Err(fault);
        }

        if self.config.record_commands {
            self.recorded.push(RecordedCommand {
                command: *command,
                finished,
                state: self.state,
                period,
            });
        }

        for _ in 0..substeps {
            self.integrate(command);
        }
        self.exchanges += 1;
        self.pace(period);

        if finished {
            self.phase = Phase::Idle;
            debug!(
                "{}: left {} control after {} cycles",
                self.config.label,
                mode.name(),
                self.exchanges
            );
            return Ok((self.state, Duration::ZERO));
        }
        Ok((self.state, period))
    }

    fn abort_control(&mut self) -> Result<(), SessionFault> {
        if let Phase::Controlling(mode) = self.phase {
            self.phase = Phase::Idle;
            self.next_tick = None;
            self.state.dq = JointArray::ZERO;
            debug!(
                "{}: aborted {} control after {} cycles",
                self.config.label,
                mode.name(),
                self.exchanges
            );
        }
        Ok(())
    }
}
