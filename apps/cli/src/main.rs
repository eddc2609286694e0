//! # armloop CLI
//!
//! 两个控制程序，加上一个查看配置的辅助命令：
//!
//! ```bash
//! # 关节速度振荡（J4-J7 往返运动 2 s）
//! armloop-cli velocity sim
//!
//! # 关节阻抗控制跟踪圆轨迹，每秒输出 10 次力矩误差
//! armloop-cli impedance sim 0.05 0.1 10
//!
//! # 打印生效的控制参数（TOML）
//! armloop-cli --config my.toml config
//! ```
//!
//! 运动开始前会提示确认，`--yes` 跳过。日志输出到 stderr，遥测报告输出到 stdout。

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;

mod commands;
mod safety;

use commands::{ImpedanceCommand, VelocityCommand};
use armloop_sdk::ControlConfig;

/// armloop CLI - 7 关节机械臂实时控制程序
#[derive(Parser, Debug)]
#[command(name = "armloop-cli")]
#[command(about = "Real-time control programs for a 7-joint manipulator", long_about = None)]
#[command(version)]
struct Cli {
    /// 控制参数文件（TOML），缺省时使用内置默认值
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// 跳过运动前的确认提示
    #[arg(short, long, global = true)]
    yes: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// 关节速度振荡运动
    Velocity {
        #[command(flatten)]
        args: VelocityCommand,
    },

    /// 关节阻抗控制跟踪圆形笛卡尔轨迹
    Impedance {
        #[command(flatten)]
        args: ImpedanceCommand,
    },

    /// 打印生效的控制参数
    Config,
}

fn main() -> Result<()> {
    // 初始化日志
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("armloop=info".parse()?),
        )
        .init();

    let cli = Cli::parse();
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Velocity { args } => args.execute(&config, cli.yes),
        Commands::Impedance { args } => args.execute(&config, cli.yes),
        Commands::Config => {
            print!("{}", config.to_toml_string()?);
            Ok(())
        },
    }
}

fn load_config(path: Option<&std::path::Path>) -> Result<ControlConfig> {
    match path {
        Some(path) => ControlConfig::load_from_file(path)
            .with_context(|| format!("Failed to load config from {}", path.display())),
        None => Ok(ControlConfig::default()),
    }
}
