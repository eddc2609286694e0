//! 轨迹生成器的性质测试
//!
//! 使用 proptest 和随机周期序列（模拟丢包）验证：
//! - 圆轨迹的切向速度始终在 `[0, v_max]` 内
//! - 圆轨迹上的每个点到圆心的距离等于半径
//! - 关节速度振荡在累计时间首次达到 `2T` 的那一周期结束

use armloop_sdk::control::{CircleParams, CircleTrajectory, JointVelocityOscillation};
use armloop_sdk::prelude::*;
use armloop_sdk::tools::{CircleConfig, JointVelocityConfig};
use proptest::prelude::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::time::Duration;

const MS: Duration = Duration::from_millis(1);

fn periods_strategy() -> impl Strategy<Value = Vec<Duration>> {
    prop::collection::vec((0u64..=5_000).prop_map(Duration::from_micros), 1..3000)
}

proptest! {
    #[test]
    fn circle_velocity_stays_within_bounds(
        radius in prop_oneof![-0.2..-0.01f64, 0.01..0.2f64],
        vel_max in 0.0..0.5f64,
        periods in periods_strategy(),
    ) {
        let config = CircleConfig { acceleration_time: 0.5, run_time: 2.0 };
        let params = CircleParams::from_config(radius, vel_max, &config);
        let mut circle = CircleTrajectory::new(params).unwrap();
        let state = RobotState::at_rest(JointArray::ZERO, Pose::IDENTITY);

        for period in periods {
            circle.step(&state, period);
            prop_assert!(circle.velocity() >= 0.0);
            prop_assert!(circle.velocity() <= vel_max);
            prop_assert!(circle.angle() >= 0.0);
        }
    }

    #[test]
    fn circle_points_stay_on_circle(
        radius in prop_oneof![-0.2..-0.01f64, 0.01..0.2f64],
        vel_max in 0.0..0.5f64,
        periods in periods_strategy(),
    ) {
        let params = CircleParams::from_config(radius, vel_max, &CircleConfig::default());
        let mut circle = CircleTrajectory::new(params).unwrap();
        let initial = Pose::IDENTITY.translated([0.3, 0.0, 0.5]);
        let state = RobotState::at_rest(JointArray::ZERO, initial);
        let [x0, y0, z0] = initial.translation();

        for period in periods {
            let pose = circle.step(&state, period).into_inner().O_T_EE;
            let [x, y, z] = pose.translation();
            prop_assert_eq!(x, x0);
            let (dy, dz) = (y - (y0 + radius), z - z0);
            prop_assert!(((dy * dy + dz * dz).sqrt() - radius.abs()).abs() < 1e-9);
            prop_assert_eq!(pose.rotation(), initial.rotation());
        }
    }
}

/// 随机周期序列：大多数为 1 ms，偶尔丢包为 2-3 ms
fn random_periods(rng: &mut StdRng, count: usize) -> Vec<Duration> {
    (0..count)
        .map(|_| {
            if rng.gen_bool(0.05) {
                MS * rng.gen_range(2..=3)
            } else {
                MS
            }
        })
        .collect()
}

#[test]
fn test_oscillation_finishes_on_first_cycle_past_two_periods() {
    let mut rng = StdRng::seed_from_u64(0x5eed);
    let config = JointVelocityConfig::default();

    for _ in 0..20 {
        let mut generator = JointVelocityOscillation::from_config(&config, MS).unwrap();
        let mut state = RobotState::default();
        let mut elapsed = Duration::ZERO;

        // 第一次回调周期为零
        let mut periods = vec![Duration::ZERO];
        periods.extend(random_periods(&mut rng, 3000));

        let mut finished_at = None;
        for (index, period) in periods.into_iter().enumerate() {
            elapsed += period;
            let motion = generator.step(&state, period);
            if motion.is_finished() {
                finished_at = Some((index, elapsed));
                break;
            }
            assert!(elapsed < Duration::from_secs(2));
            state.dq_d = motion.into_inner().dq;
        }

        let (_, elapsed) = finished_at.expect("motion never finished");
        assert!(elapsed >= Duration::from_secs(2));
        assert!(elapsed < Duration::from_secs(2) + MS * 3);
    }
}

#[test]
fn test_oscillation_is_acceleration_limited_under_packet_loss() {
    let mut rng = StdRng::seed_from_u64(7);
    let config = JointVelocityConfig::default();
    let mut generator = JointVelocityOscillation::from_config(&config, MS).unwrap();
    let mut state = RobotState::default();

    for period in random_periods(&mut rng, 2500) {
        let motion = generator.step(&state, period);
        let finished = motion.is_finished();
        let dq = motion.into_inner().dq;
        // 限幅始终按名义周期计算，与实际经过的时间无关
        for joint in Joint::ALL {
            let limit = config.max_joint_acceleration[joint] * MS.as_secs_f64();
            assert!((dq[joint] - state.dq_d[joint]).abs() <= limit + 1e-12);
        }
        state.dq_d = dq;
        if finished {
            break;
        }
    }
}
