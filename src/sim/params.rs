//! Launch parameters and gravity selection
//!
//! Raw user input is parsed and validated here so the engine only ever sees
//! resolved, positive gravity and in-range angles.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{Result, SimError};

/// Gravity presets
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Planet {
    #[default]
    Earth,
    Mars,
    Moon,
}

impl Planet {
    pub const ALL: [Planet; 3] = [Planet::Earth, Planet::Mars, Planet::Moon];

    pub fn as_str(&self) -> &'static str {
        match self {
            Planet::Earth => "Earth",
            Planet::Mars => "Mars",
            Planet::Moon => "Moon",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "earth" => Some(Planet::Earth),
            "mars" => Some(Planet::Mars),
            "moon" => Some(Planet::Moon),
            _ => None,
        }
    }

    /// Surface gravity (m/s²)
    pub fn gravity(&self) -> f64 {
        match self {
            Planet::Earth => EARTH_GRAVITY,
            Planet::Mars => MARS_GRAVITY,
            Planet::Moon => MOON_GRAVITY,
        }
    }
}

/// Gravity source: a named preset or a user-supplied value
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Gravity {
    Preset(Planet),
    Custom(f64),
}

impl Default for Gravity {
    fn default() -> Self {
        Gravity::Preset(Planet::default())
    }
}

impl Gravity {
    /// Resolve to a concrete acceleration, rejecting non-positive custom values
    pub fn resolve(&self) -> Result<f64> {
        match *self {
            Gravity::Preset(planet) => Ok(planet.gravity()),
            Gravity::Custom(g) if g.is_finite() && g > 0.0 => Ok(g),
            Gravity::Custom(g) => Err(SimError::invalid(format!(
                "gravity must be a positive number, got {g}"
            ))),
        }
    }

    /// Parse a selector ("Earth", "mars", "Custom") plus the custom text field.
    ///
    /// A bare number is accepted as a custom value so the native CLI can pass
    /// `3.2` directly.
    pub fn parse(selection: &str, custom: &str) -> Result<Self> {
        if let Some(planet) = Planet::from_str(selection) {
            return Ok(Gravity::Preset(planet));
        }
        let text = if selection.trim().eq_ignore_ascii_case("custom") {
            custom
        } else {
            selection
        };
        let value = parse_number("gravity", text)?;
        let gravity = Gravity::Custom(value);
        gravity.resolve()?;
        Ok(gravity)
    }

    pub fn label(&self) -> String {
        match self {
            Gravity::Preset(planet) => planet.as_str().to_string(),
            Gravity::Custom(g) => format!("Custom ({g:.2} m/s²)"),
        }
    }
}

/// Validated launch parameters (immutable once built)
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SimulationParameters {
    /// Launch speed (m/s)
    pub initial_velocity: f64,
    /// Launch angle above the horizon (degrees)
    pub launch_angle_degrees: f64,
    /// Resolved downward acceleration (m/s²)
    pub gravity: f64,
    /// Animation frame rate; one engine step per frame
    pub fps: u32,
}

impl SimulationParameters {
    pub fn new(velocity: f64, angle_degrees: f64, gravity: Gravity, fps: u32) -> Result<Self> {
        if !velocity.is_finite() || !(0.0..=MAX_VELOCITY).contains(&velocity) {
            return Err(SimError::invalid(format!(
                "velocity must be between 0 and {MAX_VELOCITY} m/s, got {velocity}"
            )));
        }
        if !angle_degrees.is_finite() || !(0.0..=90.0).contains(&angle_degrees) {
            return Err(SimError::invalid(format!(
                "launch angle must be between 0 and 90 degrees, got {angle_degrees}"
            )));
        }
        if fps == 0 {
            return Err(SimError::invalid("fps must be greater than zero"));
        }
        let gravity = gravity.resolve()?;

        Ok(Self {
            initial_velocity: velocity,
            launch_angle_degrees: angle_degrees,
            gravity,
            fps,
        })
    }

    /// Build from raw form input
    pub fn parse(input: &LaunchInput, fps: u32) -> Result<Self> {
        let velocity = parse_number("velocity", &input.velocity)?;
        let angle = parse_number("launch angle", &input.angle)?;
        let gravity = Gravity::parse(&input.gravity, &input.custom_gravity)?;
        Self::new(velocity, angle, gravity, fps)
    }

    /// Seconds per animation frame
    pub fn time_step(&self) -> f64 {
        1.0 / self.fps as f64
    }
}

/// Raw text from the launch form, before validation
#[derive(Debug, Clone, Default)]
pub struct LaunchInput {
    pub velocity: String,
    pub angle: String,
    /// Planet name or "Custom"
    pub gravity: String,
    /// Only read when `gravity` is "Custom"
    pub custom_gravity: String,
}

fn parse_number(field: &str, text: &str) -> Result<f64> {
    let value: f64 = text
        .trim()
        .parse()
        .map_err(|_| SimError::invalid(format!("{field} must be a number, got {text:?}")))?;
    if !value.is_finite() {
        return Err(SimError::invalid(format!("{field} must be finite")));
    }
    Ok(value)
}
