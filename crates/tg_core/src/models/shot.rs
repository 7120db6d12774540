//! Object-model shot with full context (end location, nearby players, xG).
//!
//! The tabular `Shot` record only carries event columns; `ShotDetail` is what
//! loaders build when the provider export includes freeze-frame data.

use std::sync::Arc;

use super::location::Location;
use super::pitch::Pitch;
use super::status::{BodyPart, Period, ShotPattern, ShotResult};

/// A player visible around the shot (freeze frame).
#[derive(Debug, Clone)]
pub struct RelatedPlayer {
    pub player_id: String,
    pub teammate: bool,
    pub goalkeeper: bool,
    pub location: Location,
}

#[derive(Debug, Clone)]
pub struct ShotDetail {
    pub id: String,
    pub game_id: String,
    pub player_id: String,
    pub team_id: String,
    pub period: Period,
    /// Seconds since the start of the period.
    pub time: f64,
    pub location: Location,
    pub end_location: Location,
    pub pattern: ShotPattern,
    pub body_part: BodyPart,
    pub result: ShotResult,
    pub xg: Option<f64>,
    pub related_players: Vec<RelatedPlayer>,
}

impl ShotDetail {
    pub fn pitch(&self) -> &Arc<Pitch> {
        self.location.pitch()
    }

    pub fn is_goal(&self) -> bool {
        self.result.is_goal()
    }

    pub fn teammates(&self) -> impl Iterator<Item = &RelatedPlayer> {
        self.related_players.iter().filter(|p| p.teammate)
    }

    pub fn opponents(&self) -> impl Iterator<Item = &RelatedPlayer> {
        self.related_players.iter().filter(|p| !p.teammate)
    }

    /// Re-express every location carried by this shot under `target`.
    pub fn transform(&mut self, target: &Arc<Pitch>) {
        self.location.transform(target);
        self.end_location.transform(target);
        for player in &mut self.related_players {
            player.location.transform(target);
        }
    }
}
