//! Animation loop state
//!
//! One loop owns one engine (while a launch is active) and the chart mapper.
//! Transitions live in `tick.rs`.

use serde::{Deserialize, Serialize};

use super::engine::{TrajectoryEngine, TrajectoryPoint};
use super::params::SimulationParameters;
use crate::renderer::CoordinateMapper;
use crate::settings::Settings;

/// Current phase of the animation loop
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum SimPhase {
    /// Nothing launched (or reset)
    #[default]
    Idle,
    /// Ticking once per frame
    Running,
    /// Ticks suspended, engine kept as is
    Paused,
    /// Projectile back on the ground
    Landed,
}

impl SimPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            SimPhase::Idle => "Idle",
            SimPhase::Running => "Running",
            SimPhase::Paused => "Paused",
            SimPhase::Landed => "Landed",
        }
    }

    /// Whether a new launch may start from this phase
    pub fn can_launch(&self) -> bool {
        matches!(self, SimPhase::Idle | SimPhase::Landed)
    }
}

/// Statistics shown next to the chart while the projectile flies
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct LiveStats {
    /// Current height (m)
    pub height: f64,
    /// Current speed (m/s)
    pub velocity: f64,
    /// Seconds since launch
    pub time: f64,
}

impl LiveStats {
    pub fn from_point(point: &TrajectoryPoint) -> Self {
        Self {
            height: point.y,
            velocity: point.speed,
            time: point.time,
        }
    }

    pub fn height_text(&self) -> String {
        format!("Height: {:.2} m", self.height)
    }

    pub fn velocity_text(&self) -> String {
        format!("Velocity: {:.2} m/s", self.velocity)
    }

    pub fn time_text(&self) -> String {
        format!("Time: {:.2} s", self.time)
    }
}

/// Outcome of a single tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TickEvent {
    /// Not running; nothing happened
    Idle,
    /// A new point was plotted
    Plotted(TrajectoryPoint),
    /// Ground contact; the chart now shows the full trajectory
    Landed { range: f64, flight_time: f64 },
}

/// The animation loop: phase machine, engine and chart
#[derive(Debug, Clone)]
pub struct AnimationLoop {
    pub(super) phase: SimPhase,
    pub(super) engine: Option<TrajectoryEngine>,
    pub(super) params: Option<SimulationParameters>,
    pub(super) mapper: CoordinateMapper,
    pub(super) stats: LiveStats,
    pub(super) fps: u32,
}

impl AnimationLoop {
    pub fn new(settings: &Settings) -> Self {
        let mut mapper = CoordinateMapper::new(settings.canvas_width, settings.canvas_height);
        mapper.set_visuals(
            settings.show_grid,
            settings.show_axes,
            settings.show_tooltips,
            settings.line_style,
        );
        Self {
            phase: SimPhase::Idle,
            engine: None,
            params: None,
            mapper,
            stats: LiveStats::default(),
            fps: settings.fps,
        }
    }

    pub fn phase(&self) -> SimPhase {
        self.phase
    }

    pub fn stats(&self) -> &LiveStats {
        &self.stats
    }

    pub fn engine(&self) -> Option<&TrajectoryEngine> {
        self.engine.as_ref()
    }

    pub fn params(&self) -> Option<&SimulationParameters> {
        self.params.as_ref()
    }

    pub fn mapper(&self) -> &CoordinateMapper {
        &self.mapper
    }

    /// Mutable chart access for visual toggles
    pub fn mapper_mut(&mut self) -> &mut CoordinateMapper {
        &mut self.mapper
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    /// Frame rate for subsequent launches; the active engine keeps its own
    pub fn set_fps(&mut self, fps: u32) {
        if fps > 0 {
            self.fps = fps;
        }
    }

    pub fn is_running(&self) -> bool {
        self.phase == SimPhase::Running
    }
}
