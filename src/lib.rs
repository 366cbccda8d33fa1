//! Motion Sim - A 2D projectile motion visualizer
//!
//! Core modules:
//! - `sim`: Closed-form trajectory engine and the animation loop
//! - `renderer`: Coordinate mapping and WebGPU rendering pipeline
//! - `graphs`: Saved trajectory graphs (FIFO, capped)
//! - `persistence`: Key/value storage backends (files, LocalStorage, memory)
//! - `settings`: User preferences

pub mod error;
pub mod graphs;
pub mod persistence;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use error::{Result, SimError};
pub use graphs::{SavedGraph, SavedGraphs};
pub use settings::Settings;

/// Simulation configuration constants
pub mod consts {
    /// Default animation frame rate
    pub const DEFAULT_FPS: u32 = 30;

    /// Default viewport extent in meters (both axes)
    pub const DEFAULT_VIEWPORT: f64 = 100.0;
    /// Headroom applied when growing bounds to fit a trajectory
    pub const BOUNDS_HEADROOM: f64 = 1.1;

    /// Simulated seconds after which a trajectory walk is abandoned
    pub const TRAJECTORY_CAP_SECONDS: f64 = 100.0;

    /// Default drawing surface in pixels
    pub const CANVAS_WIDTH: u32 = 850;
    pub const CANVAS_HEIGHT: u32 = 500;

    /// Grid lines and axis labels per axis
    pub const GRID_DIVISIONS: u32 = 20;

    /// Plotted point radius in pixels (also the hover pick radius)
    pub const POINT_RADIUS: f32 = 5.0;

    /// Upper limit of the launch velocity input (m/s)
    pub const MAX_VELOCITY: f64 = 200.0;

    /// Gravity presets (m/s²)
    pub const EARTH_GRAVITY: f64 = 9.8;
    pub const MARS_GRAVITY: f64 = 3.7;
    pub const MOON_GRAVITY: f64 = 1.6;
}

/// Round to two decimals, the precision used for screen coordinates
#[inline]
pub fn round_hundredths(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
