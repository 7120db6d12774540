//! # tg_core - Soccer Event Data Model
//!
//! Typed, pitch-aware collections of soccer match records backed by polars
//! tables.
//!
//! ## Features
//! - Pitch descriptions and coordinate transforms between pitch conventions
//! - Column schemas derived from record field declarations
//! - Immutable, validated collections (`Records`, `Events`, `Shots`, `Part`)
//! - Shot distance/angle features for expected-goals models
//!
//! ## Example
//!
//! ```rust,ignore
//! use tg_core::{CoreConfig, Events};
//!
//! let pitch = CoreConfig::statsbomb().shared_pitch();
//! let events = Events::new(df, pitch)?;
//! let shots = events.shots()?;
//! let features = shots.xg_features()?;
//! ```

pub mod config;
pub mod error;
pub mod geometry;
pub mod models;
pub mod records;
pub mod schema;

pub use config::CoreConfig;
pub use error::{CoreError, Result};
pub use geometry::{shot_angle, shot_distance, shot_features, ShotFeatures, XgInput};
pub use models::{Location, Pitch, ShotDetail};
pub use records::{Collection, Event, Events, Part, Record, Records, Shot, Shots};
pub use schema::{validate_schema, Schema, StorageType};
