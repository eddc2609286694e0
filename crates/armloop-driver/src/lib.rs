//! armloop 控制循环驱动层
//!
//! 负责实时控制循环的执行契约：
//!
//! - 每个周期用最新的机器人状态和经过的时间调用一次回调
//! - 回调给出结束标记后，最后一帧命令恰好下发一次，随后正常返回
//! - 会话故障立即终止循环，不再下发命令，错误原样返回给调用者
//!
//! 与硬件的连接通过 [`Session`] / [`Model`] trait 抽象，[`sim`] 模块提供不依赖硬件的实现。

pub mod control_loop;
pub mod error;
pub mod metrics;
pub mod session;
pub mod sim;

pub use control_loop::{Driver, DriverConfig, LoopSummary, MotionGenerator};
pub use error::SessionFault;
pub use metrics::{LoopMetrics, LoopMetricsSnapshot};
pub use session::{Load, Model, Session};
