//! 命令定义和实现

pub mod impedance;
pub mod velocity;

pub use impedance::ImpedanceCommand;
pub use velocity::VelocityCommand;

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::warn;

/// 安装 Ctrl+C 处理：清除 `running`，只停止遥测输出，运动按轨迹正常结束
pub(crate) fn install_interrupt_handler() -> anyhow::Result<Arc<AtomicBool>> {
    let running = Arc::new(AtomicBool::new(true));
    let flag = Arc::clone(&running);
    ctrlc::set_handler(move || {
        if flag.swap(false, Ordering::AcqRel) {
            warn!("Interrupt received: telemetry stopped, motion continues to its final command");
        }
    })?;
    Ok(running)
}
