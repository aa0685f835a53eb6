//! Functions for loading orchestrator settings.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::errors::*;
use crate::math::Vector2;

/// A structure containing configuration data for the orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// The initial size of the canvas, used until the driver reports a resize.
    pub dimensions: Vector2<u32>,
    /// Uses the recording headless backend instead of OpenGL.
    pub headless: bool,
    /// Initial number of slots of every reclamation queue.
    pub reclaim_capacity: usize,
    /// Sets how many frames to average for fps reporting.
    pub time_smooth_step: u32,
}

impl Default for Settings {
    fn default() -> Self {
        Settings {
            dimensions: Vector2::new(640, 480),
            headless: false,
            reclaim_capacity: 16,
            time_smooth_step: 30,
        }
    }
}

impl Settings {
    /// Parses settings from a JSON document. Missing fields keep their defaults.
    pub fn from_json(json: &str) -> Result<Self> {
        let mut settings: Settings = serde_json::from_str(json)?;
        settings.reclaim_capacity = settings.reclaim_capacity.max(1);
        Ok(settings)
    }

    /// Loads settings from a JSON file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let json = fs::read_to_string(path)
            .with_context(|_| format!("Failed to read settings from {}.", path.display()))?;

        Self::from_json(&json)
    }

    /// Returns the settings serialized as pretty JSON.
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
