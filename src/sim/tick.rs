//! Animation loop transitions
//!
//! Idle → Running → (Paused ⇄ Running) → Landed → Idle. Reset returns to Idle
//! from anywhere. Rejected operations leave the loop untouched.

use super::engine::TrajectoryEngine;
use super::params::{LaunchInput, SimulationParameters};
use super::state::{AnimationLoop, LiveStats, SimPhase, TickEvent};
use crate::error::{Result, SimError};
use crate::graphs::SavedGraph;

impl AnimationLoop {
    /// Start a new flight. Only valid from Idle or Landed.
    pub fn launch(&mut self, params: SimulationParameters) -> Result<()> {
        if !self.phase.can_launch() {
            return Err(self.rejected("launch"));
        }
        let engine = TrajectoryEngine::from_params(&params)?;

        self.mapper.clear();
        self.mapper.set_bounds(engine.range(), engine.max_height());
        log::info!(
            "Launch: v={:.2} m/s, angle={:.1}°, g={:.2} m/s² (range {:.2} m, apex {:.2} m)",
            params.initial_velocity,
            params.launch_angle_degrees,
            params.gravity,
            engine.range(),
            engine.max_height()
        );

        self.engine = Some(engine);
        self.params = Some(params);
        self.stats = LiveStats::default();
        self.phase = SimPhase::Running;
        Ok(())
    }

    /// Parse raw form input at the loop's frame rate, then launch
    pub fn launch_from_input(&mut self, input: &LaunchInput) -> Result<()> {
        if !self.phase.can_launch() {
            return Err(self.rejected("launch"));
        }
        let params = SimulationParameters::parse(input, self.fps)?;
        self.launch(params)
    }

    /// Advance one frame. Does nothing unless Running.
    pub fn tick(&mut self) -> TickEvent {
        if self.phase != SimPhase::Running {
            return TickEvent::Idle;
        }
        let Some(engine) = self.engine.as_mut() else {
            self.phase = SimPhase::Idle;
            return TickEvent::Idle;
        };

        engine.advance();
        let t = engine.elapsed_time();

        if engine.has_landed(t) {
            let range = engine.range();
            let flight_time = engine.time_of_flight();
            // Flights past the walk's cap keep the points plotted per tick
            match engine.checked_trajectory() {
                Ok(trajectory) => self.mapper.replace_live(&trajectory),
                Err(e) => log::debug!("Keeping plotted points: {e}"),
            }
            self.phase = SimPhase::Landed;
            log::info!(
                "Landed after {:.2} s at {:.2} m ({} points)",
                flight_time,
                range,
                self.mapper.live_points().len()
            );
            return TickEvent::Landed { range, flight_time };
        }

        let point = engine.current_point();
        self.mapper.plot(point);
        self.stats = LiveStats::from_point(&point);
        TickEvent::Plotted(point)
    }

    pub fn pause(&mut self) -> Result<()> {
        if self.phase != SimPhase::Running {
            return Err(self.rejected("pause"));
        }
        self.phase = SimPhase::Paused;
        log::debug!("Paused at t={:.2}", self.stats.time);
        Ok(())
    }

    pub fn resume(&mut self) -> Result<()> {
        if self.phase != SimPhase::Paused {
            return Err(self.rejected("resume"));
        }
        self.phase = SimPhase::Running;
        log::debug!("Resumed at t={:.2}", self.stats.time);
        Ok(())
    }

    /// Keyboard shortcut: pause when running, resume when paused
    pub fn toggle_pause(&mut self) -> Result<()> {
        match self.phase {
            SimPhase::Running => self.pause(),
            SimPhase::Paused => self.resume(),
            _ => Err(self.rejected("toggle pause")),
        }
    }

    /// Back to Idle from any phase, discarding the flight and the chart
    pub fn reset(&mut self) {
        self.engine = None;
        self.params = None;
        self.mapper.reset_bounds();
        self.mapper.clear();
        self.mapper.redraw();
        self.stats = LiveStats::default();
        self.phase = SimPhase::Idle;
        log::info!("Simulation reset");
    }

    /// The finished flight as a saveable graph
    pub fn current_graph(&self) -> Option<SavedGraph> {
        if self.phase != SimPhase::Landed {
            return None;
        }
        let params = self.params.as_ref()?;
        let points = self.mapper.live_points();
        if points.is_empty() {
            return None;
        }
        let bounds = self.mapper.bounds();
        Some(SavedGraph {
            points,
            max_x: bounds.x,
            max_y: bounds.y,
            launch_angle: params.launch_angle_degrees,
            initial_velocity: params.initial_velocity,
            gravity: params.gravity,
        })
    }

    /// Overlay a saved graph on the chart. Not allowed mid-flight.
    pub fn show_graph(&mut self, graph: &SavedGraph) -> Result<()> {
        if matches!(self.phase, SimPhase::Running | SimPhase::Paused) {
            return Err(self.rejected("load a graph"));
        }
        self.mapper.ensure_bounds(graph.max_x, graph.max_y);
        for point in &graph.points {
            self.mapper.plot_loaded(*point);
        }
        log::info!("Showing saved graph ({} points)", graph.points.len());
        Ok(())
    }

    fn rejected(&self, action: &'static str) -> SimError {
        SimError::InvalidTransition {
            action,
            phase: self.phase,
        }
    }
}
