//! Projectile simulation
//!
//! Pure, deterministic computation only:
//! - Closed-form kinematics (no numeric integration)
//! - Fixed timestep of one frame (1 / fps)
//! - No rendering backend or platform dependencies beyond the chart mapper

pub mod engine;
pub mod params;
pub mod state;
pub mod tick;

pub use engine::{TrajectoryEngine, TrajectoryPoint};
pub use params::{Gravity, LaunchInput, Planet, SimulationParameters};
pub use state::{AnimationLoop, LiveStats, SimPhase, TickEvent};
