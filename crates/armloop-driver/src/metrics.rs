//! 控制循环性能指标
//!
//! 原子计数器，实时线程只做 `fetch_add(Relaxed)`，任何线程都可以随时读取快照。

use std::sync::atomic::{AtomicU64, Ordering};

/// 控制循环实时指标
///
/// # 使用示例
///
/// ```rust
/// use armloop_driver::LoopMetrics;
/// use std::sync::atomic::Ordering;
///
/// let metrics = LoopMetrics::new();
/// metrics.cycles.fetch_add(1, Ordering::Relaxed);
/// assert_eq!(metrics.snapshot().cycles, 1);
/// ```
#[derive(Debug, Default)]
pub struct LoopMetrics {
    /// 回调被调用的周期数
    pub cycles: AtomicU64,

    /// 下发给会话的命令总数（包括最后一帧）
    pub commands_sent: AtomicU64,

    /// 以结束标记下发的命令数
    pub final_commands: AtomicU64,

    /// 会话故障次数（包括非法命令）
    pub faults: AtomicU64,

    /// 回调计算超过周期预算的次数
    ///
    /// 持续增长说明控制律太慢，会话端可能因此丢包。
    pub budget_overruns: AtomicU64,

    /// 会话报告的时间步长超过一个名义周期的次数（丢包）
    pub stretched_cycles: AtomicU64,
}

impl LoopMetrics {
    pub fn new() -> Self {
        Self::default()
    }

    /// 读取所有计数器
    pub fn snapshot(&self) -> LoopMetricsSnapshot {
        LoopMetricsSnapshot {
            cycles: self.cycles.load(Ordering::Relaxed),
            commands_sent: self.commands_sent.load(Ordering::Relaxed),
            final_commands: self.final_commands.load(Ordering::Relaxed),
            faults: self.faults.load(Ordering::Relaxed),
            budget_overruns: self.budget_overruns.load(Ordering::Relaxed),
            stretched_cycles: self.stretched_cycles.load(Ordering::Relaxed),
        }
    }

    /// 重置所有计数器
    pub fn reset(&self) {
        self.cycles.store(0, Ordering::Relaxed);
        self.commands_sent.store(0, Ordering::Relaxed);
        self.final_commands.store(0, Ordering::Relaxed);
        self.faults.store(0, Ordering::Relaxed);
        self.budget_overruns.store(0, Ordering::Relaxed);
        self.stretched_cycles.store(0, Ordering::Relaxed);
    }
}

/// 指标快照
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LoopMetricsSnapshot {
    pub cycles: u64,
    pub commands_sent: u64,
    pub final_commands: u64,
    pub faults: u64,
    pub budget_overruns: u64,
    pub stretched_cycles: u64,
}

impl LoopMetricsSnapshot {
    /// 丢包周期占比（百分比），没有周期时为 0
    pub fn stretched_rate(&self) -> f64 {
        if self.cycles == 0 {
            return 0.0;
        }
        (self.stretched_cycles as f64 / self.cycles as f64) * 100.0
    }
}
