//! Record types
//!
//! Each record declares its columns as static configuration (`FIELDS`,
//! `OVERRIDES`); the required schema is derived from the concrete type,
//! never from an instance.

use std::fmt;
use std::ops::Deref;

use serde::{Deserialize, Serialize};

use super::view::{FieldValue, Row};
use crate::error::Result;
use crate::schema::{FieldDecl, FieldType, Schema, StorageType};

/// Identifier column shared by every record table.
pub const ID_COLUMN: &str = "id_";

const OPT_TEXT: FieldType = FieldType::Optional(&FieldType::Text);
const OPT_INTEGER: FieldType = FieldType::Optional(&FieldType::Integer);

/// A schema-bound entity that can be read from and written to a table row.
pub trait Record: Clone + fmt::Debug + Send + Sync + 'static {
    /// Entity name used in errors and logs.
    const NAME: &'static str;
    const FIELDS: &'static [FieldDecl];
    /// Per-field storage overrides (narrow ints, categorical text).
    const OVERRIDES: &'static [(&'static str, StorageType)] = &[];

    fn id(&self) -> &str;

    fn from_row(row: &Row<'_>) -> Result<Self>;

    /// Cell values in `FIELDS` order.
    fn values(&self) -> Vec<FieldValue>;

    fn schema() -> Result<Schema> {
        Schema::derive(Self::NAME, Self::FIELDS, Self::OVERRIDES)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Competition {
    #[serde(rename = "id_")]
    pub id: String,
    pub name: String,
    pub season_id: String,
    pub season_name: Option<String>,
    pub country: Option<String>,
}

impl Record for Competition {
    const NAME: &'static str = "competition";
    const FIELDS: &'static [FieldDecl] = &[
        FieldDecl::new(ID_COLUMN, FieldType::Text),
        FieldDecl::new("name", FieldType::Text),
        FieldDecl::new("season_id", FieldType::Text),
        FieldDecl::new("season_name", OPT_TEXT),
        FieldDecl::new("country", OPT_TEXT),
    ];

    fn id(&self) -> &str {
        &self.id
    }

    fn from_row(row: &Row<'_>) -> Result<Self> {
        Ok(Self {
            id: row.text(ID_COLUMN)?,
            name: row.text("name")?,
            season_id: row.text("season_id")?,
            season_name: row.opt_text("season_name")?,
            country: row.opt_text("country")?,
        })
    }

    fn values(&self) -> Vec<FieldValue> {
        vec![
            (&self.id).into(),
            (&self.name).into(),
            (&self.season_id).into(),
            self.season_name.clone().into(),
            self.country.clone().into(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Team {
    #[serde(rename = "id_")]
    pub id: String,
    pub name: String,
    /// Kit color, e.g. `#FF0000`.
    pub color: Option<String>,
}

impl Record for Team {
    const NAME: &'static str = "team";
    const FIELDS: &'static [FieldDecl] = &[
        FieldDecl::new(ID_COLUMN, FieldType::Text),
        FieldDecl::new("name", FieldType::Text),
        FieldDecl::new("color", OPT_TEXT),
    ];

    fn id(&self) -> &str {
        &self.id
    }

    fn from_row(row: &Row<'_>) -> Result<Self> {
        Ok(Self { id: row.text(ID_COLUMN)?, name: row.text("name")?, color: row.opt_text("color")? })
    }

    fn values(&self) -> Vec<FieldValue> {
        vec![(&self.id).into(), (&self.name).into(), self.color.clone().into()]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    #[serde(rename = "id_")]
    pub id: String,
    pub name: String,
    pub team_id: String,
    pub position: Option<String>,
    /// Shirt number.
    pub number: Option<i32>,
}

impl Record for Player {
    const NAME: &'static str = "player";
    const FIELDS: &'static [FieldDecl] = &[
        FieldDecl::new(ID_COLUMN, FieldType::Text),
        FieldDecl::new("name", FieldType::Text),
        FieldDecl::new("team_id", FieldType::Text),
        FieldDecl::new("position", OPT_TEXT),
        FieldDecl::new("number", OPT_INTEGER),
    ];
    const OVERRIDES: &'static [(&'static str, StorageType)] = &[("number", StorageType::Int8)];

    fn id(&self) -> &str {
        &self.id
    }

    fn from_row(row: &Row<'_>) -> Result<Self> {
        Ok(Self {
            id: row.text(ID_COLUMN)?,
            name: row.text("name")?,
            team_id: row.text("team_id")?,
            position: row.opt_text("position")?,
            number: row.opt_int32("number")?,
        })
    }

    fn values(&self) -> Vec<FieldValue> {
        vec![
            (&self.id).into(),
            (&self.name).into(),
            (&self.team_id).into(),
            self.position.clone().into(),
            self.number.into(),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GameInfo {
    #[serde(rename = "id_")]
    pub id: String,
    pub date: String,
    pub time: String,
    pub home_team_id: String,
    pub away_team_id: String,
    pub competition_id: String,
    pub season_id: Option<String>,
    pub home_score: Option<i32>,
    pub away_score: Option<i32>,
}

impl Record for GameInfo {
    const NAME: &'static str = "game_info";
    const FIELDS: &'static [FieldDecl] = &[
        FieldDecl::new(ID_COLUMN, FieldType::Text),
        FieldDecl::new("date", FieldType::Text),
        FieldDecl::new("time", FieldType::Text),
        FieldDecl::new("home_team_id", FieldType::Text),
        FieldDecl::new("away_team_id", FieldType::Text),
        FieldDecl::new("competition_id", FieldType::Text),
        FieldDecl::new("season_id", OPT_TEXT),
        FieldDecl::new("home_score", OPT_INTEGER),
        FieldDecl::new("away_score", OPT_INTEGER),
    ];
    const OVERRIDES: &'static [(&'static str, StorageType)] =
        &[("home_score", StorageType::Int8), ("away_score", StorageType::Int8)];

    fn id(&self) -> &str {
        &self.id
    }

    fn from_row(row: &Row<'_>) -> Result<Self> {
        Ok(Self {
            id: row.text(ID_COLUMN)?,
            date: row.text("date")?,
            time: row.text("time")?,
            home_team_id: row.text("home_team_id")?,
            away_team_id: row.text("away_team_id")?,
            competition_id: row.text("competition_id")?,
            season_id: row.opt_text("season_id")?,
            home_score: row.opt_int32("home_score")?,
            away_score: row.opt_int32("away_score")?,
        })
    }

    fn values(&self) -> Vec<FieldValue> {
        vec![
            (&self.id).into(),
            (&self.date).into(),
            (&self.time).into(),
            (&self.home_team_id).into(),
            (&self.away_team_id).into(),
            (&self.competition_id).into(),
            self.season_id.clone().into(),
            self.home_score.into(),
            self.away_score.into(),
        ]
    }
}

/// One on-ball event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Event {
    #[serde(rename = "id_")]
    pub id: String,
    pub game_id: String,
    /// Event type tag, see [`crate::models::EventType`].
    #[serde(rename = "type_")]
    pub event_type: String,
    /// Provider timestamp, e.g. `00:15:02.120`.
    pub time: String,
    pub player_id: String,
    pub team_id: String,
    pub x: f64,
    pub y: f64,
    /// Partition (possession) index.
    pub part: i32,
}

pub const TYPE_COLUMN: &str = "type_";
pub const PART_COLUMN: &str = "part";

impl Record for Event {
    const NAME: &'static str = "event";
    const FIELDS: &'static [FieldDecl] = &[
        FieldDecl::new(ID_COLUMN, FieldType::Text),
        FieldDecl::new("game_id", FieldType::Text),
        FieldDecl::new(TYPE_COLUMN, FieldType::Text),
        FieldDecl::new("time", FieldType::Text),
        FieldDecl::new("player_id", FieldType::Text),
        FieldDecl::new("team_id", FieldType::Text),
        FieldDecl::new("x", FieldType::Float),
        FieldDecl::new("y", FieldType::Float),
        FieldDecl::new(PART_COLUMN, FieldType::Integer),
    ];
    const OVERRIDES: &'static [(&'static str, StorageType)] = &[
        ("game_id", StorageType::Categorical),
        (TYPE_COLUMN, StorageType::Categorical),
        ("team_id", StorageType::Categorical),
        ("player_id", StorageType::Categorical),
    ];

    fn id(&self) -> &str {
        &self.id
    }

    fn from_row(row: &Row<'_>) -> Result<Self> {
        Ok(Self {
            id: row.text(ID_COLUMN)?,
            game_id: row.text("game_id")?,
            event_type: row.text(TYPE_COLUMN)?,
            time: row.text("time")?,
            player_id: row.text("player_id")?,
            team_id: row.text("team_id")?,
            x: row.float("x")?,
            y: row.float("y")?,
            part: row.int32(PART_COLUMN)?,
        })
    }

    fn values(&self) -> Vec<FieldValue> {
        vec![
            (&self.id).into(),
            (&self.game_id).into(),
            (&self.event_type).into(),
            (&self.time).into(),
            (&self.player_id).into(),
            (&self.team_id).into(),
            self.x.into(),
            self.y.into(),
            self.part.into(),
        ]
    }
}

/// An event tagged `"shot"`; same columns as [`Event`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Shot(pub Event);

impl Deref for Shot {
    type Target = Event;

    fn deref(&self) -> &Event {
        &self.0
    }
}

impl Record for Shot {
    const NAME: &'static str = "shot";
    const FIELDS: &'static [FieldDecl] = Event::FIELDS;
    const OVERRIDES: &'static [(&'static str, StorageType)] = Event::OVERRIDES;

    fn id(&self) -> &str {
        &self.0.id
    }

    fn from_row(row: &Row<'_>) -> Result<Self> {
        Event::from_row(row).map(Shot)
    }

    fn values(&self) -> Vec<FieldValue> {
        self.0.values()
    }
}

/// One player's tracked position at an instant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frame {
    #[serde(rename = "id_")]
    pub id: String,
    pub player_id: String,
    pub team_id: String,
    pub x: f64,
    pub y: f64,
    pub time: String,
}

impl Record for Frame {
    const NAME: &'static str = "frame";
    const FIELDS: &'static [FieldDecl] = &[
        FieldDecl::new(ID_COLUMN, FieldType::Text),
        FieldDecl::new("player_id", FieldType::Text),
        FieldDecl::new("team_id", FieldType::Text),
        FieldDecl::new("x", FieldType::Float),
        FieldDecl::new("y", FieldType::Float),
        FieldDecl::new("time", FieldType::Text),
    ];

    fn id(&self) -> &str {
        &self.id
    }

    fn from_row(row: &Row<'_>) -> Result<Self> {
        Ok(Self {
            id: row.text(ID_COLUMN)?,
            player_id: row.text("player_id")?,
            team_id: row.text("team_id")?,
            x: row.float("x")?,
            y: row.float("y")?,
            time: row.text("time")?,
        })
    }

    fn values(&self) -> Vec<FieldValue> {
        vec![
            (&self.id).into(),
            (&self.player_id).into(),
            (&self.team_id).into(),
            self.x.into(),
            self.y.into(),
            (&self.time).into(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use insta::assert_json_snapshot;

    #[test]
    fn test_every_record_schema_derives() {
        Competition::schema().unwrap();
        Team::schema().unwrap();
        Player::schema().unwrap();
        GameInfo::schema().unwrap();
        Event::schema().unwrap();
        Shot::schema().unwrap();
        Frame::schema().unwrap();
    }

    #[test]
    fn test_player_number_is_int8() {
        let schema = Player::schema().unwrap();
        assert_eq!(schema.storage("number"), Some(StorageType::Int8));
        assert_eq!(schema.storage("position"), Some(StorageType::Text));
    }

    #[test]
    fn test_shot_shares_event_columns() {
        let event = Event::schema().unwrap();
        let shot = Shot::schema().unwrap();
        assert_eq!(event.columns(), shot.columns());
        assert_eq!(shot.record(), "shot");
    }

    #[test]
    fn test_values_follow_field_order() {
        let team = Team { id: "team_1".into(), name: "Team A".into(), color: None };
        assert_eq!(team.values().len(), Team::FIELDS.len());
        assert_eq!(team.values()[2], FieldValue::Null);
    }

    #[test]
    fn test_event_schema_snapshot() {
        assert_json_snapshot!(Event::schema().unwrap(), @r###"
        {
          "record": "event",
          "columns": [
            {
              "name": "id_",
              "storage": "text",
              "nullable": false
            },
            {
              "name": "game_id",
              "storage": "categorical",
              "nullable": false
            },
            {
              "name": "type_",
              "storage": "categorical",
              "nullable": false
            },
            {
              "name": "time",
              "storage": "text",
              "nullable": false
            },
            {
              "name": "player_id",
              "storage": "categorical",
              "nullable": false
            },
            {
              "name": "team_id",
              "storage": "categorical",
              "nullable": false
            },
            {
              "name": "x",
              "storage": "float64",
              "nullable": false
            },
            {
              "name": "y",
              "storage": "float64",
              "nullable": false
            },
            {
              "name": "part",
              "storage": "int32",
              "nullable": false
            }
          ]
        }
        "###);
    }
}
