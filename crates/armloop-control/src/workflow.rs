//! 完整的控制流程
//!
//! 每个流程的顺序相同：
//!
//! 1. 校验所有参数（失败时不与机械臂发生任何交互）
//! 2. 点到点运动到起始构型，再设置碰撞阈值
//! 3. 运行实时控制循环
//!
//! 阻抗圆轨迹流程额外启动一个作用域线程输出遥测；控制循环结束（正常或故障）后
//! 清除 `running`、等待报告线程退出，再返回结果。

use crate::circle::{CircleParams, CircleTrajectory};
use crate::error::WorkflowError;
use crate::impedance::JointImpedanceController;
use crate::joint_velocity::JointVelocityOscillation;
use crate::telemetry::{
    ReportSink, TelemetryMetricsSnapshot, TelemetryReporter, TelemetrySlot, report_interval,
};
use armloop_driver::{Driver, LoopSummary, Session};
use armloop_tools::ControlConfig;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;
use tracing::{error, info};

/// 阻抗圆轨迹的命令行参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImpedanceCircleArgs {
    /// 圆半径（m）
    pub radius: f64,
    /// 最大切向速度（m/s）
    pub vel_max: f64,
    /// 遥测输出频率（Hz）
    pub print_rate: f64,
}

/// 阻抗圆轨迹的运行结果
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ImpedanceCircleSummary {
    pub control: LoopSummary,
    pub telemetry: TelemetryMetricsSnapshot,
}

/// 运动到起始构型，然后设置控制循环使用的碰撞阈值
///
/// 点到点运动使用会话当前的阈值，新阈值只对随后的控制循环生效。
pub fn prepare<S: Session>(driver: &mut Driver<S>, config: &ControlConfig) -> Result<(), WorkflowError> {
    driver.move_to_joint_positions(&config.start.q_init, config.start.speed_factor)?;
    driver.set_collision_behavior(&config.collision.to_behavior())?;
    Ok(())
}

/// 关节速度振荡运动
pub fn run_joint_velocity_motion<S: Session>(
    driver: &mut Driver<S>,
    config: &ControlConfig,
) -> Result<LoopSummary, WorkflowError> {
    config.validate()?;
    let mut generator =
        JointVelocityOscillation::from_config(&config.joint_velocity, driver.config().nominal_period)?;

    prepare(driver, config)?;

    let summary = driver.run_velocity_loop(&mut generator)?;
    info!(cycles = summary.cycles, elapsed = ?summary.elapsed, "Joint velocity motion finished");
    Ok(summary)
}

/// 关节阻抗控制跟踪圆形笛卡尔轨迹，并行输出力矩误差
///
/// `running` 在返回前一定被置为 false；外部（例如 Ctrl+C）提前清除它只会停止遥测输出，
/// 运动本身仍按轨迹正常结束。
pub fn run_impedance_circle<S, K>(
    driver: &mut Driver<S>,
    config: &ControlConfig,
    args: &ImpedanceCircleArgs,
    running: &AtomicBool,
    sink: K,
) -> Result<ImpedanceCircleSummary, WorkflowError>
where
    S: Session,
    K: ReportSink + Send,
{
    let result = impedance_circle(driver, config, args, running, sink);
    running.store(false, Ordering::Release);
    result
}

fn impedance_circle<S, K>(
    driver: &mut Driver<S>,
    config: &ControlConfig,
    args: &ImpedanceCircleArgs,
    running: &AtomicBool,
    sink: K,
) -> Result<ImpedanceCircleSummary, WorkflowError>
where
    S: Session,
    K: ReportSink + Send,
{
    config.validate()?;
    let interval = report_interval(args.print_rate).ok_or_else(|| {
        WorkflowError::invalid("print_rate", format!("{} must be a positive rate in Hz", args.print_rate))
    })?;
    let mut circle =
        CircleTrajectory::new(CircleParams::from_config(args.radius, args.vel_max, &config.circle))?;

    prepare(driver, config)?;
    let model = driver.load_model()?;

    let slot = TelemetrySlot::new();
    let mut controller = JointImpedanceController::from_config(model, &config.impedance)?
        .with_telemetry(&slot);

    let (control, reporter) = thread::scope(|scope| {
        let reporter = scope.spawn(|| TelemetryReporter::new(&slot, running, interval, sink).run());

        let control = driver.run_torque_with_pose_loop(&mut controller, &mut circle);
        if let Err(e) = &control {
            error!("Impedance control aborted: {}", e);
        }
        running.store(false, Ordering::Release);

        (control, reporter.join())
    });

    let control = control?;
    if reporter.is_err() {
        return Err(WorkflowError::TelemetryPanicked);
    }

    info!(cycles = control.cycles, elapsed = ?control.elapsed, "Impedance circle finished");
    Ok(ImpedanceCircleSummary {
        control,
        telemetry: slot.metrics().snapshot(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use armloop_driver::SessionFault;
    use armloop_driver::sim::{SimConfig, SimModel, SimulatedArm};
    use armloop_types::{CollisionBehavior, Command, ControlMode, JointArray, RobotState};
    use std::time::Duration;

    /// 记录非实时操作顺序的会话
    struct OrderedSession {
        arm: SimulatedArm,
        calls: Vec<&'static str>,
    }

    impl Session for OrderedSession {
        type Model = SimModel;

        fn set_collision_behavior(&mut self, behavior: &CollisionBehavior) -> Result<(), SessionFault> {
            self.calls.push("set_collision_behavior");
            self.arm.set_collision_behavior(behavior)
        }

        fn move_to_joint_positions(
            &mut self,
            q_goal: &JointArray<f64>,
            speed_factor: f64,
        ) -> Result<(), SessionFault> {
            self.calls.push("move_to_joint_positions");
            self.arm.move_to_joint_positions(q_goal, speed_factor)
        }

        fn load_model(&mut self) -> Result<SimModel, SessionFault> {
            self.calls.push("load_model");
            self.arm.load_model()
        }

        fn read_once(&mut self) -> Result<RobotState, SessionFault> {
            self.arm.read_once()
        }

        fn start_control(&mut self, mode: ControlMode) -> Result<RobotState, SessionFault> {
            self.calls.push("start_control");
            self.arm.start_control(mode)
        }

        fn exchange(
            &mut self,
            command: &Command,
            finished: bool,
        ) -> Result<(RobotState, Duration), SessionFault> {
            self.arm.exchange(command, finished)
        }

        fn abort_control(&mut self) -> Result<(), SessionFault> {
            self.arm.abort_control()
        }
    }

    #[test]
    fn test_prepare_moves_before_setting_collision_behavior() {
        let config = ControlConfig::default();
        let mut driver = Driver::new(OrderedSession {
            arm: SimulatedArm::new(SimConfig::default()),
            calls: Vec::new(),
        });

        run_joint_velocity_motion(&mut driver, &config).unwrap();

        assert_eq!(
            driver.session().calls,
            vec!["move_to_joint_positions", "set_collision_behavior", "start_control"]
        );
        assert_eq!(
            driver.session().arm.collision_behavior(),
            Some(&config.collision.to_behavior())
        );
    }

    #[test]
    fn test_invalid_config_never_touches_session() {
        let mut config = ControlConfig::default();
        config.start.speed_factor = 0.0;
        let mut driver = Driver::new(OrderedSession {
            arm: SimulatedArm::new(SimConfig::default()),
            calls: Vec::new(),
        });

        assert!(run_joint_velocity_motion(&mut driver, &config).is_err());
        assert!(driver.session().calls.is_empty());
    }
}
