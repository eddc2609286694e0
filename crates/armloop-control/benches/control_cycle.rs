//! 单周期计算开销基准测试
//!
//! 控制回调必须在 1 ms 周期内远低于计算预算（默认 300 µs）完成：
//! - 饱和滤波
//! - 关节速度振荡 / 圆轨迹单步
//! - 阻抗控制律（含遥测发布）
//! - 仿真会话上的完整控制循环

use armloop_control::{
    CircleParams, CircleTrajectory, JointImpedanceController, JointVelocityOscillation,
    TelemetrySlot, saturate_joint_acceleration, saturate_torque_rate,
};
use armloop_driver::sim::{READY_JOINT_POSITIONS, READY_POSE, SimConfig, SimModel, SimulatedArm};
use armloop_driver::{Driver, Load, Model, MotionGenerator};
use armloop_tools::{CircleConfig, ControlConfig, ImpedanceConfig, JointVelocityConfig};
use armloop_types::{JointArray, RobotState};
use criterion::{Criterion, black_box, criterion_group, criterion_main};
use std::time::Duration;

const CYCLE: Duration = Duration::from_millis(1);

fn resting_state() -> RobotState {
    let mut state = RobotState::at_rest(READY_JOINT_POSITIONS, READY_POSE);
    state.tau_J_d = SimModel::default().gravity(&state, &Load::NONE);
    state
}

fn bench_saturation(c: &mut Criterion) {
    let mut group = c.benchmark_group("saturation");
    let raw = JointArray::new([0.3, -0.2, 0.1, 2.0, -2.0, 0.5, 0.0]);
    let base = JointArray::splat(0.1);
    let max_acc = JointArray::new([15.0, 7.5, 10.0, 12.5, 15.0, 20.0, 20.0]);
    let gravity = JointArray::new([0.0, -17.0, 0.0, -8.4, 0.0, 2.0, 0.0]);

    group.bench_function("joint_acceleration", |b| {
        b.iter(|| black_box(saturate_joint_acceleration(&raw, &base, &max_acc, CYCLE)))
    });

    group.bench_function("torque_rate", |b| {
        b.iter(|| black_box(saturate_torque_rate(&raw, &base, &gravity, 1.0)))
    });

    group.finish();
}

fn bench_generators(c: &mut Criterion) {
    let mut group = c.benchmark_group("generators");
    let state = resting_state();

    group.bench_function("joint_velocity_step", |b| {
        let mut generator =
            JointVelocityOscillation::from_config(&JointVelocityConfig::default(), CYCLE).unwrap();
        b.iter(|| black_box(generator.step(&state, CYCLE)))
    });

    group.bench_function("circle_step", |b| {
        let params = CircleParams::from_config(0.05, 0.1, &CircleConfig::default());
        let mut circle = CircleTrajectory::new(params).unwrap();
        b.iter(|| black_box(circle.step(&state, CYCLE)))
    });

    group.finish();
}

fn bench_impedance(c: &mut Criterion) {
    let mut group = c.benchmark_group("impedance");
    let mut state = resting_state();
    state.q_d = state.q.add(JointArray::splat(0.001));
    state.dq = JointArray::splat(0.05);

    group.bench_function("compute", |b| {
        let controller =
            JointImpedanceController::from_config(SimModel::default(), &ImpedanceConfig::default())
                .unwrap();
        b.iter(|| black_box(controller.compute(&state)))
    });

    group.bench_function("step_with_telemetry", |b| {
        let slot = TelemetrySlot::new();
        let mut controller =
            JointImpedanceController::from_config(SimModel::default(), &ImpedanceConfig::default())
                .unwrap()
                .with_telemetry(&slot);
        b.iter(|| black_box(controller.step(&state, CYCLE)))
    });

    group.finish();
}

fn bench_full_loop(c: &mut Criterion) {
    let mut group = c.benchmark_group("full_loop");
    group.sample_size(10);

    // 2 s 振荡运动，仿真不按真实时间节拍
    group.bench_function("joint_velocity_motion_sim", |b| {
        b.iter(|| {
            let mut driver = Driver::new(SimulatedArm::new(SimConfig::default()));
            black_box(
                armloop_control::run_joint_velocity_motion(&mut driver, &ControlConfig::default())
                    .unwrap(),
            )
        })
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_saturation,
    bench_generators,
    bench_impedance,
    bench_full_loop,
);
criterion_main!(benches);
