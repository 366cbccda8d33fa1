//! Saved trajectory graphs
//!
//! Persisted as a JSON array, keeps the 5 most recent graphs (oldest evicted first).

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::persistence::Storage;
use crate::sim::TrajectoryPoint;

/// Maximum number of graphs to keep
pub const MAX_SAVED_GRAPHS: usize = 5;

/// A finished trajectory plus the launch that produced it
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SavedGraph {
    /// Sampled flight, in time order
    pub points: Vec<TrajectoryPoint>,
    /// Chart bounds when the graph was saved (m)
    pub max_x: f64,
    pub max_y: f64,
    /// Degrees above the horizon
    pub launch_angle: f64,
    /// m/s
    pub initial_velocity: f64,
    /// m/s²
    pub gravity: f64,
}

/// Headline numbers for the load preview
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GraphSummary {
    pub max_height: f64,
    pub range: f64,
    pub launch_angle: f64,
    pub initial_velocity: f64,
    pub gravity: f64,
}

impl SavedGraph {
    /// Highest and farthest sampled values, not the chart bounds
    pub fn summary(&self) -> GraphSummary {
        let max_height = self.points.iter().map(|p| p.y).fold(0.0, f64::max);
        let range = self.points.iter().map(|p| p.x).fold(0.0, f64::max);
        GraphSummary {
            max_height,
            range,
            launch_angle: self.launch_angle,
            initial_velocity: self.initial_velocity,
            gravity: self.gravity,
        }
    }
}

impl GraphSummary {
    /// Preview lines as shown in the load dialog
    pub fn lines(&self) -> [String; 5] {
        [
            format!("Max Height: {:.2} m", self.max_height),
            format!("Total Range: {:.2} m", self.range),
            format!("Launch Angle: {:.1}°", self.launch_angle),
            format!("Initial Velocity: {:.2} m/s", self.initial_velocity),
            format!("Gravity: {:.2} m/s²", self.gravity),
        ]
    }
}

/// Capped, ordered collection of saved graphs (oldest first)
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SavedGraphs {
    pub entries: Vec<SavedGraph>,
}

impl SavedGraphs {
    /// Storage key
    pub const STORAGE_KEY: &'static str = "graphs";

    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
        }
    }

    /// Append a graph, evicting the oldest when full.
    /// Returns the evicted graph, if any.
    pub fn push(&mut self, graph: SavedGraph) -> Option<SavedGraph> {
        let evicted = if self.entries.len() >= MAX_SAVED_GRAPHS {
            Some(self.entries.remove(0))
        } else {
            None
        };
        self.entries.push(graph);
        evicted
    }

    pub fn get(&self, index: usize) -> Option<&SavedGraph> {
        self.entries.get(index)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &SavedGraph> {
        self.entries.iter()
    }

    /// Display names ("Graph 1", "Graph 2", ...) in stored order
    pub fn names(&self) -> Vec<String> {
        (1..=self.entries.len()).map(|i| format!("Graph {i}")).collect()
    }

    /// Load saved graphs. A missing store yields an empty collection; a
    /// corrupt one is backed up and replaced by an empty collection.
    pub fn load(storage: &dyn Storage) -> Result<Self> {
        let Some(json) = storage.read(Self::STORAGE_KEY)? else {
            log::info!("No saved graphs found, starting fresh");
            return Ok(Self::new());
        };

        match serde_json::from_str::<SavedGraphs>(&json) {
            Ok(mut graphs) => {
                if graphs.entries.len() > MAX_SAVED_GRAPHS {
                    let excess = graphs.entries.len() - MAX_SAVED_GRAPHS;
                    graphs.entries.drain(..excess);
                }
                log::info!("Loaded {} saved graphs", graphs.len());
                Ok(graphs)
            }
            Err(e) => {
                log::warn!("Saved graphs are corrupt ({e}), backing up and starting fresh");
                storage.backup(Self::STORAGE_KEY)?;
                Ok(Self::new())
            }
        }
    }

    pub fn save(&self, storage: &dyn Storage) -> Result<()> {
        let json = serde_json::to_string(self)?;
        storage.write(Self::STORAGE_KEY, &json)?;
        log::info!("Saved graphs written ({} entries)", self.len());
        Ok(())
    }

    /// Push and persist in one step
    pub fn save_graph(&mut self, graph: SavedGraph, storage: &dyn Storage) -> Result<()> {
        if self.push(graph).is_some() {
            log::info!("Oldest saved graph evicted");
        }
        self.save(storage)
    }
}
