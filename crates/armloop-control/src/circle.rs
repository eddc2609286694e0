//! 圆形笛卡尔轨迹生成器
//!
//! 末端在 y-z 平面内画圆，圆经过起始位置：
//!
//! ```text
//! Δy = R (1 - cos θ)
//! Δz = R sin θ
//! ```
//!
//! 切向速度 `v` 在 `acceleration_time` 内线性加速到 `v_max`，`run_time` 之后线性减速到零，
//! `t ≥ run_time + acceleration_time` 时输出最后一帧。旋转块始终等于起始位姿的旋转块。

use crate::error::WorkflowError;
use armloop_driver::MotionGenerator;
use armloop_tools::CircleConfig;
use armloop_types::{CartesianPose, Motion, Pose, RobotState};
use std::f64::consts::TAU;
use std::time::Duration;

/// 圆轨迹参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CircleParams {
    /// 半径（m），符号决定绕行方向
    pub radius: f64,
    /// 最大切向速度（m/s）
    pub vel_max: f64,
    /// 加速 / 减速时间（s）
    pub acceleration_time: f64,
    /// 开始减速的时刻（s）
    pub run_time: f64,
}

impl CircleParams {
    pub fn from_config(radius: f64, vel_max: f64, config: &CircleConfig) -> Self {
        CircleParams {
            radius,
            vel_max,
            acceleration_time: config.acceleration_time,
            run_time: config.run_time,
        }
    }

    pub fn validate(&self) -> Result<(), WorkflowError> {
        if !(self.radius.is_finite() && self.radius != 0.0) {
            return Err(WorkflowError::invalid(
                "radius",
                format!("{} must be finite and non-zero", self.radius),
            ));
        }
        if !(self.vel_max.is_finite() && self.vel_max >= 0.0) {
            return Err(WorkflowError::invalid(
                "vel_max",
                format!("{} must be finite and >= 0", self.vel_max),
            ));
        }
        if !(self.acceleration_time.is_finite() && self.acceleration_time > 0.0) {
            return Err(WorkflowError::invalid("acceleration_time", "must be > 0"));
        }
        if !(self.run_time.is_finite() && self.run_time > 0.0) {
            return Err(WorkflowError::invalid("run_time", "must be > 0"));
        }
        Ok(())
    }
}

/// 圆轨迹生成器
#[derive(Debug, Clone)]
pub struct CircleTrajectory {
    params: CircleParams,
    elapsed: Duration,
    angle: f64,
    velocity: f64,
    initial_pose: Option<Pose>,
}

impl CircleTrajectory {
    pub fn new(params: CircleParams) -> Result<Self, WorkflowError> {
        params.validate()?;
        Ok(CircleTrajectory {
            params,
            elapsed: Duration::ZERO,
            angle: 0.0,
            velocity: 0.0,
            initial_pose: None,
        })
    }

    pub fn params(&self) -> &CircleParams {
        &self.params
    }

    /// 当前切向速度（m/s）
    pub fn velocity(&self) -> f64 {
        self.velocity
    }

    /// 当前圆心角，范围 `[0, 2π]`
    pub fn angle(&self) -> f64 {
        self.angle
    }

    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }

    /// 第一个周期记录的起始位姿
    pub fn initial_pose(&self) -> Option<&Pose> {
        self.initial_pose.as_ref()
    }

    fn update_velocity(&mut self, t: f64, dt: f64) {
        let p = &self.params;
        let ramp = dt * (p.vel_max / p.acceleration_time).abs();
        if self.velocity < p.vel_max && t < p.run_time {
            self.velocity += ramp;
        }
        if self.velocity > 0.0 && t > p.run_time {
            self.velocity -= ramp;
        }
        self.velocity = self.velocity.max(0.0).min(p.vel_max);
    }
}

impl MotionGenerator<CartesianPose> for CircleTrajectory {
    fn step(&mut self, state: &RobotState, period: Duration) -> Motion<CartesianPose> {
        let initial_pose = *self.initial_pose.get_or_insert(state.O_T_EE);

        self.elapsed += period;
        let t = self.elapsed.as_secs_f64();
        let dt = period.as_secs_f64();

        self.update_velocity(t, dt);

        let radius = self.params.radius;
        self.angle += dt * self.velocity / radius.abs();
        if self.angle > TAU {
            self.angle -= TAU;
        }

        let delta_y = radius * (1.0 - self.angle.cos());
        let delta_z = radius * self.angle.sin();
        let command = CartesianPose::new(initial_pose.translated([0.0, delta_y, delta_z]));

        if t >= self.params.run_time + self.params.acceleration_time {
            Motion::Finished(command)
        } else {
            Motion::Continue(command)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flange_down() -> Pose {
        Pose::from_column_major([
            1.0, 0.0, 0.0, 0.0, //
            0.0, -1.0, 0.0, 0.0, //
            0.0, 0.0, -1.0, 0.0, //
            0.307, 0.0, 0.487, 1.0,
        ])
    }

    fn params(radius: f64, vel_max: f64) -> CircleParams {
        CircleParams::from_config(radius, vel_max, &CircleConfig::default())
    }

    #[test]
    fn test_first_cycle_holds_initial_pose() {
        let mut circle = CircleTrajectory::new(params(0.05, 0.1)).unwrap();
        let state = RobotState::at_rest(Default::default(), flange_down());
        let command = circle.step(&state, Duration::ZERO).into_inner();
        assert_eq!(command.O_T_EE, flange_down());
        assert_eq!(circle.initial_pose(), Some(&flange_down()));
    }

    #[test]
    fn test_points_lie_on_circle() {
        let radius = 0.05;
        let mut circle = CircleTrajectory::new(params(radius, 0.1)).unwrap();
        let mut state = RobotState::at_rest(Default::default(), flange_down());
        let initial = flange_down();
        let [x0, y0, z0] = initial.translation();

        loop {
            let motion = circle.step(&state, Duration::from_millis(1));
            let finished = motion.is_finished();
            let pose = motion.into_inner().O_T_EE;

            let [x, y, z] = pose.translation();
            assert_eq!(x, x0);
            // 圆心位于 (y0 + R, z0)
            let dy = y - (y0 + radius);
            let dz = z - z0;
            assert!(((dy * dy + dz * dz).sqrt() - radius).abs() < 1e-9);
            assert_eq!(pose.rotation(), initial.rotation());
            assert!(pose.is_rigid_transform());

            // 测量位姿会变化，但轨迹只依赖起始位姿
            state.O_T_EE = pose;
            if finished {
                break;
            }
        }
        assert_eq!(circle.elapsed(), Duration::from_secs(22));
        assert!(circle.velocity().abs() < 1e-9);
    }

    #[test]
    fn test_ramp_reaches_vel_max() {
        let mut circle = CircleTrajectory::new(params(0.1, 0.2)).unwrap();
        let state = RobotState::at_rest(Default::default(), flange_down());
        for _ in 0..3000 {
            circle.step(&state, Duration::from_millis(1));
        }
        assert_eq!(circle.velocity(), 0.2);
    }

    #[test]
    fn test_negative_radius_mirrors() {
        let mut left = CircleTrajectory::new(params(-0.05, 0.1)).unwrap();
        let mut right = CircleTrajectory::new(params(0.05, 0.1)).unwrap();
        let state = RobotState::at_rest(Default::default(), flange_down());
        for _ in 0..500 {
            let l = left.step(&state, Duration::from_millis(1)).into_inner().O_T_EE;
            let r = right.step(&state, Duration::from_millis(1)).into_inner().O_T_EE;
            let (ly, ry) = (l.translation()[1], r.translation()[1]);
            assert!((ly + ry).abs() < 1e-12);
        }
    }

    #[test]
    fn test_rejects_invalid_params() {
        assert!(CircleTrajectory::new(params(0.0, 0.1)).is_err());
        assert!(CircleTrajectory::new(params(f64::NAN, 0.1)).is_err());
        assert!(CircleTrajectory::new(params(0.05, -0.1)).is_err());
        let mut p = params(0.05, 0.1);
        p.acceleration_time = 0.0;
        assert!(CircleTrajectory::new(p).is_err());
    }
}
