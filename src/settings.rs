//! User preferences
//!
//! Persisted separately from saved graphs through the same storage backend.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{Result, SimError};
use crate::persistence::Storage;
use crate::renderer::LineStyle;
use crate::sim::Planet;

/// Preferences that outlive a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Animation frame rate (one engine step per frame)
    pub fps: u32,
    /// Gravity preset selected when the form opens
    pub planet: Planet,

    // === Chart ===
    pub show_grid: bool,
    pub show_axes: bool,
    /// Hover tooltips on plotted points
    pub show_tooltips: bool,
    pub line_style: LineStyle,

    // === Surface ===
    pub canvas_width: u32,
    pub canvas_height: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            fps: DEFAULT_FPS,
            planet: Planet::Earth,

            show_grid: true,
            show_axes: true,
            show_tooltips: true,
            line_style: LineStyle::Dots,

            canvas_width: CANVAS_WIDTH,
            canvas_height: CANVAS_HEIGHT,
        }
    }
}

impl Settings {
    /// Storage key
    const STORAGE_KEY: &'static str = "settings";

    pub fn validate(&self) -> Result<()> {
        if self.fps == 0 {
            return Err(SimError::invalid("fps must be greater than zero"));
        }
        if self.canvas_width == 0 || self.canvas_height == 0 {
            return Err(SimError::invalid(format!(
                "canvas must have a non-zero size, got {}x{}",
                self.canvas_width, self.canvas_height
            )));
        }
        Ok(())
    }

    /// Flip between the two frame rates offered in the UI (30 and 60)
    pub fn toggle_fps(&mut self) {
        self.fps = if self.fps == 60 { 30 } else { 60 };
    }

    pub fn time_step(&self) -> f64 {
        1.0 / self.fps.max(1) as f64
    }

    /// Load settings, falling back to defaults when missing, corrupt or invalid
    pub fn load(storage: &dyn Storage) -> Self {
        let json = match storage.read(Self::STORAGE_KEY) {
            Ok(Some(json)) => json,
            Ok(None) => {
                log::info!("Using default settings");
                return Self::default();
            }
            Err(e) => {
                log::warn!("Could not read settings ({e}), using defaults");
                return Self::default();
            }
        };

        match serde_json::from_str::<Settings>(&json) {
            Ok(settings) => match settings.validate() {
                Ok(()) => {
                    log::info!("Loaded settings");
                    settings
                }
                Err(e) => {
                    log::warn!("Stored settings rejected ({e}), using defaults");
                    Self::default()
                }
            },
            Err(e) => {
                log::warn!("Settings are corrupt ({e}), using defaults");
                if let Err(e) = storage.backup(Self::STORAGE_KEY) {
                    log::warn!("Could not back up settings: {e}");
                }
                Self::default()
            }
        }
    }

    pub fn save(&self, storage: &dyn Storage) -> Result<()> {
        self.validate()?;
        let json = serde_json::to_string(self)?;
        storage.write(Self::STORAGE_KEY, &json)?;
        log::info!("Settings saved");
        Ok(())
    }
}
