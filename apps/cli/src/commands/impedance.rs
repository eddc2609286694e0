//! impedance 命令
//!
//! 关节阻抗控制跟踪 y-z 平面内的圆轨迹，并按 `print_rate` 输出力矩误差。

use anyhow::Result;
use armloop_sdk::control::{CircleParams, report_interval};
use armloop_sdk::{ControlConfig, ImpedanceCircleArgs, StdoutSink, run_impedance_circle};
use clap::Args;

use super::install_interrupt_handler;
use crate::safety::confirm_motion;

/// 阻抗圆轨迹命令参数
#[derive(Args, Debug)]
pub struct ImpedanceCommand {
    /// 机械臂主机名（`sim` 或 `sim:<label>`）
    pub hostname: String,

    /// 圆半径（m），负值反向绕行
    #[arg(allow_negative_numbers = true)]
    pub radius: f64,

    /// 最大切向速度（m/s）
    #[arg(allow_negative_numbers = true)]
    pub vel_max: f64,

    /// 力矩误差输出频率（Hz）
    #[arg(allow_negative_numbers = true)]
    pub print_rate: f64,
}

impl ImpedanceCommand {
    pub fn execute(&self, config: &ControlConfig, assume_yes: bool) -> Result<()> {
        let args = ImpedanceCircleArgs {
            radius: self.radius,
            vel_max: self.vel_max,
            print_rate: self.print_rate,
        };

        // 使用错误在连接和确认之前报告
        config.validate()?;
        if report_interval(args.print_rate).is_none() {
            anyhow::bail!("print_rate must be a positive rate in Hz, got {}", args.print_rate);
        }
        CircleParams::from_config(args.radius, args.vel_max, &config.circle).validate()?;

        let mut driver = armloop_sdk::connect(&self.hostname)?;
        let running = install_interrupt_handler()?;

        confirm_motion(assume_yes)?;
        let summary = run_impedance_circle(&mut driver, config, &args, &running, StdoutSink)?;

        println!(
            "Motion finished after {} cycles ({:.3} s), {} telemetry reports",
            summary.control.cycles,
            summary.control.elapsed.as_secs_f64(),
            summary.telemetry.reported
        );
        Ok(())
    }
}
