//! Pitch profile configuration
//!
//! Loaders bind freshly parsed events to the pitch configured here.
//!
//! ## Usage
//!
//! ```rust,ignore
//! // Metric pitch (105 × 68 m)
//! let config = CoreConfig::default();
//!
//! // StatsBomb event data (120 × 80 yards, y grows downward)
//! let statsbomb = CoreConfig::statsbomb();
//!
//! // From environment variable
//! let from_env = CoreConfig::from_env_or_default();
//!
//! // From a JSON file
//! let loaded = CoreConfig::load("pitch.json")?;
//! ```
//!
//! ## Environment Variables
//!
//! - `TG_PITCH_PROFILE`: Select preset (statsbomb, metric)

use std::env;
use std::fs;
use std::path::Path;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::{CoreError, Result};
use crate::models::Pitch;

pub const PROFILE_ENV: &str = "TG_PITCH_PROFILE";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CoreConfig {
    /// Pitch new event collections are bound to
    pub pitch: Pitch,
}

impl CoreConfig {
    pub fn metric() -> Self {
        Self { pitch: Pitch::default() }
    }

    pub fn statsbomb() -> Self {
        Self { pitch: Pitch::statsbomb() }
    }

    /// Preset by name (case-insensitive).
    pub fn from_profile(name: &str) -> Result<Self> {
        match name.to_lowercase().as_str() {
            "metric" => Ok(Self::metric()),
            "statsbomb" => Ok(Self::statsbomb()),
            other => Err(CoreError::Config(format!("unknown pitch profile `{}`", other))),
        }
    }

    /// Load from environment variable TG_PITCH_PROFILE or use default
    pub fn from_env_or_default() -> Self {
        let profile = env::var(PROFILE_ENV).unwrap_or_default();
        Self::from_profile(&profile).unwrap_or_default()
    }

    /// Read a JSON config file. The pitch is validated on deserialization.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = fs::read_to_string(path)?;
        let config: Self = serde_json::from_str(&raw)?;
        debug!(path = %path.display(), pitch = ?config.pitch, "config loaded");
        Ok(config)
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        fs::write(path, serde_json::to_string_pretty(self)?)?;
        Ok(())
    }

    /// The configured pitch behind an `Arc`, ready to bind collections to.
    pub fn shared_pitch(&self) -> Arc<Pitch> {
        Arc::new(self.pitch.clone())
    }
}
