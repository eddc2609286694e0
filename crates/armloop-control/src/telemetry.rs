//! 遥测：实时周期与低优先级报告线程之间的非阻塞数据交换
//!
//! # 设计目标
//!
//! - 实时周期只做 `try_lock` + 定长拷贝，拿不到锁就跳过本次发布
//! - 报告线程按自己的频率睡眠，醒来后同样 `try_lock`，拿不到锁或没有新数据就跳过本次
//! - 两侧都不阻塞，也不在实时路径上分配内存
//! - `running` 置为 false 后，报告线程在当前睡眠结束时退出
//!
//! # 示例
//!
//! ```rust
//! use armloop_control::telemetry::{TelemetrySample, TelemetrySlot};
//! use armloop_types::{JointArray, RobotState};
//!
//! let slot = TelemetrySlot::new();
//! let sample = TelemetrySample {
//!     tau_command: JointArray::ZERO,
//!     gravity: JointArray::ZERO,
//!     state: RobotState::default(),
//! };
//! assert!(slot.try_publish(&sample));
//! assert_eq!(slot.try_take(), Some(sample));
//! assert_eq!(slot.try_take(), None);
//! ```

use armloop_tools::TorqueErrorReport;
use armloop_types::{JointArray, RobotState};
use parking_lot::Mutex;
use std::io::{self, Write};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

/// 实时周期发布的一帧数据
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TelemetrySample {
    /// 饱和后的力矩命令（不含重力）
    pub tau_command: JointArray<f64>,
    /// 本周期的重力项
    pub gravity: JointArray<f64>,
    /// 控制律看到的状态
    pub state: RobotState,
}

impl TelemetrySample {
    /// 计算本帧的力矩误差报告
    pub fn report(&self) -> TorqueErrorReport {
        TorqueErrorReport::compute(&self.tau_command, &self.gravity, &self.state.tau_J)
    }
}

/// 遥测计数器
#[derive(Debug, Default)]
pub struct TelemetryMetrics {
    /// 成功发布的帧数
    pub published: AtomicU64,
    /// 因锁竞争跳过的发布
    pub publish_skipped: AtomicU64,
    /// 输出的报告数
    pub reported: AtomicU64,
    /// 因锁竞争或没有新数据跳过的报告
    pub report_skipped: AtomicU64,
}

impl TelemetryMetrics {
    pub fn snapshot(&self) -> TelemetryMetricsSnapshot {
        TelemetryMetricsSnapshot {
            published: self.published.load(Ordering::Relaxed),
            publish_skipped: self.publish_skipped.load(Ordering::Relaxed),
            reported: self.reported.load(Ordering::Relaxed),
            report_skipped: self.report_skipped.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct TelemetryMetricsSnapshot {
    pub published: u64,
    pub publish_skipped: u64,
    pub reported: u64,
    pub report_skipped: u64,
}

#[derive(Debug, Default)]
struct SlotInner {
    sample: Option<TelemetrySample>,
    fresh: bool,
}

/// 单槽位的共享遥测数据
///
/// 只保留最新一帧；读取后标记为已消费，直到下一次发布。
#[derive(Debug, Default)]
pub struct TelemetrySlot {
    inner: Mutex<SlotInner>,
    metrics: TelemetryMetrics,
}

impl TelemetrySlot {
    pub fn new() -> Self {
        Self::default()
    }

    /// 尝试发布一帧（实时周期调用，从不阻塞）
    ///
    /// 返回 `false` 表示锁被报告线程占用，本帧被丢弃。
    #[inline]
    pub fn try_publish(&self, sample: &TelemetrySample) -> bool {
        match self.inner.try_lock() {
            Some(mut inner) => {
                inner.sample = Some(*sample);
                inner.fresh = true;
                self.metrics.published.fetch_add(1, Ordering::Relaxed);
                true
            },
            None => {
                self.metrics.publish_skipped.fetch_add(1, Ordering::Relaxed);
                false
            },
        }
    }

    /// 尝试取出最新一帧并标记为已消费（从不阻塞）
    ///
    /// 锁被占用或没有新数据时返回 `None`。
    pub fn try_take(&self) -> Option<TelemetrySample> {
        let mut inner = self.inner.try_lock()?;
        if !inner.fresh {
            return None;
        }
        inner.fresh = false;
        inner.sample
    }

    pub fn metrics(&self) -> &TelemetryMetrics {
        &self.metrics
    }

    /// 测试用：持有锁，模拟另一侧正在访问
    #[cfg(test)]
    pub(crate) fn hold_lock(&self) -> parking_lot::MutexGuard<'_, impl Sized> {
        self.inner.lock()
    }
}

/// 报告输出
pub trait ReportSink {
    fn report(&mut self, report: &TorqueErrorReport);
}

impl<F> ReportSink for F
where
    F: FnMut(&TorqueErrorReport),
{
    fn report(&mut self, report: &TorqueErrorReport) {
        self(report)
    }
}

/// 输出到标准输出
#[derive(Debug, Default, Clone, Copy)]
pub struct StdoutSink;

impl ReportSink for StdoutSink {
    fn report(&mut self, report: &TorqueErrorReport) {
        let mut stdout = io::stdout().lock();
        if let Err(e) = writeln!(stdout, "{}", report) {
            warn!("Failed to write telemetry report: {}", e);
        }
    }
}

/// 按输出频率（Hz）计算报告间隔，频率非正或过小时返回 `None`
pub fn report_interval(print_rate: f64) -> Option<Duration> {
    if !(print_rate.is_finite() && print_rate > 0.0) {
        return None;
    }
    Duration::try_from_secs_f64(1.0 / print_rate).ok()
}

/// 报告线程
///
/// 与控制循环并行运行，每 `interval` 醒来一次尝试输出最新一帧。
pub struct TelemetryReporter<'a, K: ReportSink> {
    slot: &'a TelemetrySlot,
    running: &'a AtomicBool,
    interval: Duration,
    sink: K,
}

impl<'a, K: ReportSink> TelemetryReporter<'a, K> {
    pub fn new(slot: &'a TelemetrySlot, running: &'a AtomicBool, interval: Duration, sink: K) -> Self {
        TelemetryReporter {
            slot,
            running,
            interval,
            sink,
        }
    }

    /// 运行直到 `running` 变为 false，返回 sink
    pub fn run(mut self) -> K {
        debug!(interval = ?self.interval, "Telemetry reporter started");
        let metrics = self.slot.metrics();

        while self.running.load(Ordering::Acquire) {
            thread::sleep(self.interval);

            match self.slot.try_take() {
                Some(sample) => {
                    self.sink.report(&sample.report());
                    metrics.reported.fetch_add(1, Ordering::Relaxed);
                },
                None => {
                    metrics.report_skipped.fetch_add(1, Ordering::Relaxed);
                },
            }
        }

        debug!("Telemetry reporter stopped");
        self.sink
    }
}
