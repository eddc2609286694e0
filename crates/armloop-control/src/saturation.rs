//! 变化率饱和
//!
//! 每个关节独立：
//!
//! ```text
//! out[i] = base[i] + clamp(raw[i] - base[i], -limit[i], +limit[i])
//! ```
//!
//! 纯函数，不分配内存，对任何输入都有定义（NaN 原样传播，由驱动层的命令校验拦截）。

use armloop_types::JointArray;
use std::time::Duration;

/// 把 `raw` 相对 `base` 的变化量限制在 `±limit` 以内
#[inline]
pub fn saturate(
    raw: &JointArray<f64>,
    base: &JointArray<f64>,
    limit: &JointArray<f64>,
) -> JointArray<f64> {
    let delta = raw.sub(*base);
    let clamped = delta.map_with(*limit, |d, l| d.max(-l).min(l));
    base.add(clamped)
}

/// 关节加速度饱和
///
/// 基准为控制器最后收到的速度命令 `dq_d`，每周期允许的速度变化为 `max_acceleration · cycle`。
#[inline]
pub fn saturate_joint_acceleration(
    dq_raw: &JointArray<f64>,
    dq_d: &JointArray<f64>,
    max_acceleration: &JointArray<f64>,
    cycle: Duration,
) -> JointArray<f64> {
    let limit = max_acceleration.scale(cycle.as_secs_f64());
    saturate(dq_raw, dq_d, &limit)
}

/// 力矩变化率饱和
///
/// `tau_raw` 与返回值都不含重力。`tau_j_d` 为控制器上一周期的期望力矩（含重力），
/// 因此基准为 `tau_j_d - gravity`。
#[inline]
pub fn saturate_torque_rate(
    tau_raw: &JointArray<f64>,
    tau_j_d: &JointArray<f64>,
    gravity: &JointArray<f64>,
    delta_tau_max: f64,
) -> JointArray<f64> {
    let base = tau_j_d.sub(*gravity);
    saturate(tau_raw, &base, &JointArray::splat(delta_tau_max))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_within_limit_is_unchanged() {
        let base = JointArray::splat(1.0);
        let raw = JointArray::new([1.0, 1.1, 0.9, 1.0, 1.05, 0.95, 1.0]);
        let out = saturate(&raw, &base, &JointArray::splat(0.2));
        assert_eq!(out, raw);
    }

    #[test]
    fn test_clamps_each_joint_independently() {
        let base = JointArray::ZERO;
        let raw = JointArray::new([5.0, -5.0, 0.5, 0.0, 0.0, 0.0, 0.0]);
        let limit = JointArray::new([1.0, 2.0, 1.0, 1.0, 1.0, 1.0, 1.0]);
        let out = saturate(&raw, &base, &limit);
        assert_eq!(out.as_array(), &[1.0, -2.0, 0.5, 0.0, 0.0, 0.0, 0.0]);
    }

    #[test]
    fn test_joint_acceleration_uses_cycle() {
        let max_acc = JointArray::new([14.25, 7.125, 11.875, 11.875, 14.25, 19.0, 19.0]);
        let out = saturate_joint_acceleration(
            &JointArray::splat(1.0),
            &JointArray::ZERO,
            &max_acc,
            Duration::from_millis(1),
        );
        for (o, a) in out.iter().zip(max_acc.iter()) {
            assert!((o - a * 1e-3).abs() < 1e-15);
        }
    }

    #[test]
    fn test_torque_rate_baseline_excludes_gravity() {
        let gravity = JointArray::new([0.0, -17.0, 0.0, 8.0, 0.0, 1.0, 0.0]);
        // 上一周期命令为 0，tau_J_d 仅含重力
        let tau_j_d = gravity;
        let out = saturate_torque_rate(&JointArray::splat(10.0), &tau_j_d, &gravity, 1.0);
        assert_eq!(out, JointArray::splat(1.0));
    }

    proptest! {
        /// 输出与基准之差不超过限幅
        #[test]
        fn saturation_bound(
            raw in prop::array::uniform7(-1e3..1e3f64),
            base in prop::array::uniform7(-1e3..1e3f64),
            limit in prop::array::uniform7(1e-6..10.0f64),
        ) {
            let raw = JointArray::new(raw);
            let base = JointArray::new(base);
            let limit = JointArray::new(limit);
            let out = saturate(&raw, &base, &limit);
            for i in 0..7 {
                prop_assert!((out[i] - base[i]).abs() <= limit[i] + 1e-9);
                // 未超限的关节保持原值，超限的关节停在边界上
                if (raw[i] - base[i]).abs() <= limit[i] {
                    prop_assert!((out[i] - raw[i]).abs() <= 1e-9);
                } else {
                    prop_assert!(((out[i] - base[i]).abs() - limit[i]).abs() <= 1e-9);
                }
            }
        }

        /// 重力往返：重新叠加重力后，总力矩相对 tau_J_d 的变化不超过限幅
        #[test]
        fn torque_rate_total_bound(
            raw in prop::array::uniform7(-100.0..100.0f64),
            tau_j_d in prop::array::uniform7(-80.0..80.0f64),
            gravity in prop::array::uniform7(-40.0..40.0f64),
            delta in 0.01..5.0f64,
        ) {
            let tau_j_d = JointArray::new(tau_j_d);
            let gravity = JointArray::new(gravity);
            let out = saturate_torque_rate(&JointArray::new(raw), &tau_j_d, &gravity, delta);
            let total = out.add(gravity);
            for i in 0..7 {
                prop_assert!((total[i] - tau_j_d[i]).abs() <= delta + 1e-9);
            }
        }
    }
}
