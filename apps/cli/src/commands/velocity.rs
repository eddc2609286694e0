//! velocity 命令
//!
//! J4-J7 先正向、后反向各运动一个振荡周期。

use anyhow::Result;
use armloop_sdk::{ControlConfig, run_joint_velocity_motion};
use clap::Args;

use crate::safety::confirm_motion;

/// 关节速度振荡命令参数
#[derive(Args, Debug)]
pub struct VelocityCommand {
    /// 机械臂主机名（`sim` 或 `sim:<label>`）
    pub hostname: String,
}

impl VelocityCommand {
    pub fn execute(&self, config: &ControlConfig, assume_yes: bool) -> Result<()> {
        config.validate()?;
        let mut driver = armloop_sdk::connect(&self.hostname)?;

        confirm_motion(assume_yes)?;
        let summary = run_joint_velocity_motion(&mut driver, config)?;

        println!(
            "Motion finished after {} cycles ({:.3} s)",
            summary.cycles,
            summary.elapsed.as_secs_f64()
        );
        Ok(())
    }
}
