//! Closed-form projectile kinematics
//!
//! The engine is a pure function of time plus a single piece of mutable state,
//! the elapsed time, which the animation loop steps once per frame.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::params::SimulationParameters;
use crate::consts::TRAJECTORY_CAP_SECONDS;
use crate::error::{Result, SimError};

/// A sampled point on the trajectory
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TrajectoryPoint {
    /// Horizontal distance (m)
    pub x: f64,
    /// Height (m)
    pub y: f64,
    /// Seconds since launch
    pub time: f64,
    /// Magnitude of velocity (m/s)
    #[serde(alias = "velocity")]
    pub speed: f64,
}

impl TrajectoryPoint {
    pub const ORIGIN: Self = Self {
        x: 0.0,
        y: 0.0,
        time: 0.0,
        speed: 0.0,
    };

    pub fn new(x: f64, y: f64, time: f64, speed: f64) -> Self {
        Self { x, y, time, speed }
    }

    pub fn pos(&self) -> DVec2 {
        DVec2::new(self.x, self.y)
    }

    /// Hover text shown next to a plotted point
    pub fn tooltip_text(&self) -> String {
        format!(
            "Time: {:.2} s\nVelocity: {:.2} m/s\nRange: {:.2} m\nHeight: {:.2} m",
            self.time, self.speed, self.x, self.y
        )
    }
}

/// Stateful projectile engine
#[derive(Debug, Clone)]
pub struct TrajectoryEngine {
    velocity: f64,
    angle_radians: f64,
    gravity: f64,
    time_step: f64,
    elapsed_time: f64,
}

impl TrajectoryEngine {
    /// Build an engine. Gravity is taken as given; validate it with
    /// [`SimulationParameters`] first.
    pub fn new(velocity: f64, angle_degrees: f64, gravity: f64, fps: u32) -> Result<Self> {
        if fps == 0 {
            return Err(SimError::invalid("fps must be greater than zero"));
        }
        Ok(Self {
            velocity,
            angle_radians: angle_degrees.to_radians(),
            gravity,
            time_step: 1.0 / fps as f64,
            elapsed_time: 0.0,
        })
    }

    pub fn from_params(params: &SimulationParameters) -> Result<Self> {
        Self::new(
            params.initial_velocity,
            params.launch_angle_degrees,
            params.gravity,
            params.fps,
        )
    }

    /// Position (m) at time `t`
    pub fn position_at(&self, t: f64) -> DVec2 {
        let (sin, cos) = self.angle_radians.sin_cos();
        DVec2::new(
            self.velocity * cos * t,
            self.velocity * sin * t - 0.5 * self.gravity * t * t,
        )
    }

    /// Velocity components (m/s) at time `t`
    pub fn velocity_at(&self, t: f64) -> DVec2 {
        let (sin, cos) = self.angle_radians.sin_cos();
        DVec2::new(self.velocity * cos, self.velocity * sin - self.gravity * t)
    }

    pub fn speed_at(&self, t: f64) -> f64 {
        self.velocity_at(t).length()
    }

    /// Apex height, independent of time
    pub fn max_height(&self) -> f64 {
        let vy = self.velocity * self.angle_radians.sin();
        vy * vy / (2.0 * self.gravity)
    }

    /// Horizontal distance covered when returning to launch height
    pub fn range(&self) -> f64 {
        self.velocity * self.velocity * (2.0 * self.angle_radians).sin() / self.gravity
    }

    /// Analytic time of flight back to launch height
    pub fn time_of_flight(&self) -> f64 {
        2.0 * self.velocity * self.angle_radians.sin() / self.gravity
    }

    /// Ground contact. Only meaningful once time has advanced: at t=0 the
    /// projectile sits on the ground by definition.
    pub fn has_landed(&self, t: f64) -> bool {
        t > 0.0 && self.position_at(t).y <= 0.0
    }

    /// Step simulated time by one frame
    pub fn advance(&mut self) {
        self.elapsed_time += self.time_step;
    }

    pub fn elapsed_time(&self) -> f64 {
        self.elapsed_time
    }

    pub fn time_step(&self) -> f64 {
        self.time_step
    }

    /// Sample at the current elapsed time
    pub fn current_point(&self) -> TrajectoryPoint {
        self.point_at(self.elapsed_time)
    }

    pub fn point_at(&self, t: f64) -> TrajectoryPoint {
        let pos = self.position_at(t);
        TrajectoryPoint::new(pos.x, pos.y, t, self.speed_at(t))
    }

    pub fn launch_angle_degrees(&self) -> f64 {
        self.angle_radians.to_degrees()
    }

    pub fn initial_velocity(&self) -> f64 {
        self.velocity
    }

    pub fn gravity(&self) -> f64 {
        self.gravity
    }

    /// Sample the whole flight at the frame step, from launch until the point
    /// drops below ground. Recomputed on every call; does not touch elapsed time.
    ///
    /// A configuration that never lands is cut off at the safety cap with a
    /// warning; use [`Self::checked_trajectory`] to treat that as an error.
    pub fn full_trajectory(&self) -> Vec<TrajectoryPoint> {
        let (points, landed) = self.walk();
        if !landed {
            log::warn!(
                "Trajectory exceeded {} s without landing, aborted after {} points",
                TRAJECTORY_CAP_SECONDS,
                points.len()
            );
        }
        points
    }

    pub fn checked_trajectory(&self) -> Result<Vec<TrajectoryPoint>> {
        match self.walk() {
            (points, true) => Ok(points),
            (_, false) => Err(SimError::NonTerminatingTrajectory {
                cap_seconds: TRAJECTORY_CAP_SECONDS,
            }),
        }
    }

    fn walk(&self) -> (Vec<TrajectoryPoint>, bool) {
        let mut points = Vec::new();
        // Step count instead of accumulated time keeps samples free of drift
        let mut step: u64 = 0;
        loop {
            let t = step as f64 * self.time_step;
            if t > TRAJECTORY_CAP_SECONDS {
                return (points, false);
            }
            let point = self.point_at(t);
            if point.y < 0.0 {
                return (points, true);
            }
            points.push(point);
            step += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    const EPS: f64 = 1e-9;

    fn engine(v: f64, angle: f64, g: f64) -> TrajectoryEngine {
        TrajectoryEngine::new(v, angle, g, 60).unwrap()
    }

    #[test]
    fn test_reference_launch() {
        let e = engine(50.0, 45.0, 9.8);
        assert!((e.range() - 255.102).abs() < 0.01);
        assert!((e.max_height() - 63.776).abs() < 0.01);

        let apex = e.position_at(3.608);
        assert!((apex.x - 127.6).abs() < 0.1);
        assert!((apex.y - 63.78).abs() < 0.01);
    }

    #[test]
    fn test_zero_velocity() {
        let mut e = engine(0.0, 45.0, 9.8);
        assert_eq!(e.range(), 0.0);
        assert_eq!(e.max_height(), 0.0);

        let points = e.full_trajectory();
        assert_eq!(points, vec![TrajectoryPoint::ORIGIN]);

        e.advance();
        assert!(e.has_landed(e.elapsed_time()));
    }

    #[test]
    fn test_zero_fps_fails() {
        let result = TrajectoryEngine::new(50.0, 45.0, 9.8, 0);
        assert!(matches!(result, Err(SimError::InvalidConfiguration(_))));
    }

    #[test]
    fn test_not_landed_at_launch() {
        let e = engine(50.0, 0.0, 9.8);
        assert!(!e.has_landed(0.0));
        assert!(e.has_landed(e.time_step()));
    }

    #[test]
    fn test_velocity_components() {
        let e = engine(10.0, 90.0, 10.0);
        let v = e.velocity_at(1.0);
        assert!(v.x.abs() < EPS);
        assert!(v.y.abs() < EPS);
        assert!((e.speed_at(0.0) - 10.0).abs() < EPS);
    }

    #[test]
    fn test_advance_accumulates() {
        let mut e = TrajectoryEngine::new(20.0, 30.0, 9.8, 30).unwrap();
        for _ in 0..30 {
            e.advance();
        }
        assert!((e.elapsed_time() - 1.0).abs() < 1e-9);
        assert!((e.current_point().x - e.position_at(1.0).x).abs() < 1e-6);
    }

    #[test]
    fn test_full_trajectory_shape() {
        let e = engine(50.0, 45.0, 9.8);
        let points = e.full_trajectory();
        assert_eq!(points[0].pos(), DVec2::ZERO);
        assert!((points[0].speed - 50.0).abs() < EPS);
        assert!(points.windows(2).all(|w| w[0].time <= w[1].time));
        assert!(points.iter().all(|p| p.y >= 0.0));
        let last = points.last().unwrap();
        assert!(last.time <= e.time_of_flight());
        assert!(e.time_of_flight() - last.time < e.time_step());
    }

    #[test]
    fn test_non_terminating_is_capped() {
        // Zero gravity straight up never comes back down
        let e = engine(10.0, 90.0, 0.0);
        let points = e.full_trajectory();
        assert!(!points.is_empty());
        assert!(points.last().unwrap().time <= TRAJECTORY_CAP_SECONDS);
        assert!(matches!(
            e.checked_trajectory(),
            Err(SimError::NonTerminatingTrajectory { .. })
        ));
    }

    #[test]
    fn test_tooltip_text() {
        let p = TrajectoryPoint::new(12.345, 6.0, 1.5, 20.0);
        assert_eq!(
            p.tooltip_text(),
            "Time: 1.50 s\nVelocity: 20.00 m/s\nRange: 12.35 m\nHeight: 6.00 m"
        );
    }

    proptest! {
        #[test]
        fn prop_closed_forms_match_flight(
            v in 0.1f64..200.0,
            angle in 1.0f64..89.0,
            g in 0.5f64..30.0,
        ) {
            let e = engine(v, angle, g);
            let theta = angle.to_radians();
            let expected_h = (v * theta.sin()).powi(2) / (2.0 * g);
            let expected_r = v * v * (2.0 * theta).sin() / g;
            prop_assert!((e.max_height() - expected_h).abs() <= 1e-9 * expected_h.max(1.0));
            prop_assert!((e.range() - expected_r).abs() <= 1e-9 * expected_r.max(1.0));

            let landing = e.position_at(e.time_of_flight());
            let scale = e.range().max(e.max_height()).max(1.0);
            prop_assert!(landing.y.abs() <= 1e-9 * scale);
            prop_assert!((landing.x - e.range()).abs() <= 1e-9 * scale);
        }

        #[test]
        fn prop_full_trajectory_restartable(
            v in 0.0f64..200.0,
            angle in 0.0f64..=90.0,
            g in 0.5f64..30.0,
        ) {
            let e = engine(v, angle, g);
            prop_assert_eq!(e.full_trajectory(), e.full_trajectory());
        }
    }
}
