//! `Records<R>`: an immutable, schema-validated table of one record type
//!
//! ## Construction
//!
//! raw table → `validate_schema` → (subtype structural check) → collection
//!
//! A collection is never edited in place; `combine` builds a new instance
//! through the same pipeline.
//!
//! ## Lookups
//!
//! | Operation | Miss | Several matches |
//! |-----------|------|-----------------|
//! | `find(id)` | `Ok(None)` | first row |
//! | `find_one(filters)` | `NotFound` | `Ambiguous` |
//! | `find_all(filters)` | empty `Vec` | all rows |

use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::ops::Add;

use polars::prelude::{BooleanChunked, DataFrame, NewChunkedArray, PlSmallStr};
use rand::Rng;
use tracing::{debug, warn};

use super::entity::{Record, ID_COLUMN};
use super::table::{concat_tables, records_to_table};
use super::view::{describe_filters, Filters, TableView};
use crate::error::{CoreError, Result};
use crate::models::Pitch;
use crate::schema::{validate_schema, Schema};

/// Concrete collection family, used for runtime compatibility checks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionKind {
    Records,
    Events,
    Shots,
    Part,
}

impl fmt::Display for CollectionKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            CollectionKind::Records => "Records",
            CollectionKind::Events => "Events",
            CollectionKind::Shots => "Shots",
            CollectionKind::Part => "Part",
        };
        f.write_str(name)
    }
}

/// Runtime identity shared by every collection type.
pub trait Collection {
    fn kind(&self) -> CollectionKind;

    /// `Record::NAME` of the bound record type.
    fn record_name(&self) -> &'static str;

    fn df(&self) -> &DataFrame;

    /// Pitch the coordinates are expressed in, for pitch-aware collections.
    fn bound_pitch(&self) -> Option<&Pitch> {
        None
    }

    fn len(&self) -> usize {
        self.df().height()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Whether `other` may be concatenated onto `self`: same concrete kind,
    /// same record type, and tolerant-equal pitches.
    fn check_compatible(&self, other: &dyn Collection) -> Result<()> {
        if self.kind() != other.kind() {
            return Err(CoreError::IncompatibleCollection(format!(
                "cannot combine {} with {}",
                self.kind(),
                other.kind()
            )));
        }
        if self.record_name() != other.record_name() {
            return Err(CoreError::IncompatibleCollection(format!(
                "cannot combine {} records with {} records",
                self.record_name(),
                other.record_name()
            )));
        }
        match (self.bound_pitch(), other.bound_pitch()) {
            (None, None) => Ok(()),
            (Some(a), Some(b)) if a.approx_eq(b) => Ok(()),
            _ => Err(CoreError::IncompatibleCollection("pitches differ".to_string())),
        }
    }
}

pub struct Records<R: Record> {
    df: DataFrame,
    schema: Schema,
    _record: PhantomData<fn() -> R>,
}

// Manual impls: derives would require `R: Clone`/`R: Debug` bounds on the marker.
impl<R: Record> Clone for Records<R> {
    fn clone(&self) -> Self {
        Self { df: self.df.clone(), schema: self.schema.clone(), _record: PhantomData }
    }
}

impl<R: Record> fmt::Debug for Records<R> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Records")
            .field("record", &R::NAME)
            .field("rows", &self.df.height())
            .finish()
    }
}

impl<R: Record> Records<R> {
    /// Validate `df` against `R`'s schema and take ownership of it unchanged.
    pub fn new(df: DataFrame) -> Result<Self> {
        let schema = R::schema()?;
        if let Err(err) = validate_schema(&df, &schema) {
            warn!(record = R::NAME, error = %err, "table rejected");
            return Err(err);
        }
        debug!(record = R::NAME, rows = df.height(), "records constructed");
        Ok(Self { df, schema, _record: PhantomData })
    }

    pub fn from_records(records: &[R]) -> Result<Self> {
        Self::new(records_to_table(records)?)
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    pub fn df(&self) -> &DataFrame {
        &self.df
    }

    pub fn into_df(self) -> DataFrame {
        self.df
    }

    pub fn len(&self) -> usize {
        self.df.height()
    }

    pub fn is_empty(&self) -> bool {
        self.df.height() == 0
    }

    pub(crate) fn view(&self) -> Result<TableView> {
        TableView::new(&self.df, &self.schema)
    }

    /// Every row materialized, in table order.
    pub fn to_vec(&self) -> Result<Vec<R>> {
        let view = self.view()?;
        view.rows().map(|row| R::from_row(&row)).collect()
    }

    /// Map from `id_` to record. Duplicate ids are rejected.
    pub fn export(&self) -> Result<HashMap<String, R>> {
        let view = self.view()?;
        let mut out = HashMap::with_capacity(view.height());
        for row in view.rows() {
            let record = R::from_row(&row)?;
            let id = record.id().to_string();
            if out.contains_key(&id) {
                warn!(record = R::NAME, id = %id, "duplicate id in export");
                return Err(CoreError::DuplicateId { record: R::NAME, id });
            }
            out.insert(id, record);
        }
        Ok(out)
    }

    /// Record with `id_ == id`, or `None`.
    pub fn find(&self, id: &str) -> Result<Option<R>> {
        let view = self.view()?;
        let mask = view.mask(&[(ID_COLUMN, id.into())])?;
        match mask.iter().position(|hit| *hit) {
            Some(index) => R::from_row(&view.row(index)).map(Some),
            None => Ok(None),
        }
    }

    /// The single record matching every filter.
    pub fn find_one(&self, filters: &Filters<'_>) -> Result<R> {
        let view = self.view()?;
        let mask = view.mask(filters)?;
        let mut hits = mask.iter().enumerate().filter(|(_, hit)| **hit).map(|(index, _)| index);
        match (hits.next(), hits.next()) {
            (Some(index), None) => R::from_row(&view.row(index)),
            (None, _) => Err(CoreError::NotFound(format!(
                "no {} matches {}",
                R::NAME,
                describe_filters(filters)
            ))),
            (Some(_), Some(_)) => Err(CoreError::Ambiguous {
                count: mask.iter().filter(|hit| **hit).count(),
                filters: describe_filters(filters),
            }),
        }
    }

    /// All records matching every filter, in table order.
    pub fn find_all(&self, filters: &Filters<'_>) -> Result<Vec<R>> {
        let view = self.view()?;
        let mask = view.mask(filters)?;
        mask.iter()
            .enumerate()
            .filter(|(_, hit)| **hit)
            .map(|(index, _)| R::from_row(&view.row(index)))
            .collect()
    }

    /// The backing table restricted to rows matching every filter.
    pub fn filter_df(&self, filters: &Filters<'_>) -> Result<DataFrame> {
        let mask = self.view()?.mask(filters)?;
        filter_rows(&self.df, &mask)
    }

    /// One uniformly random record.
    pub fn sample(&self) -> Result<R> {
        self.sample_with(&mut rand::thread_rng())
    }

    pub fn sample_with<G: Rng + ?Sized>(&self, rng: &mut G) -> Result<R> {
        if self.is_empty() {
            return Err(CoreError::EmptyCollection);
        }
        let index = rng.gen_range(0..self.len());
        R::from_row(&self.view()?.row(index))
    }

    /// New collection holding `self`'s rows followed by `other`'s.
    pub fn combine(&self, other: &Self) -> Result<Self> {
        self.check_compatible(other)?;
        let df = concat_tables(&self.df, &other.df)?;
        debug!(record = R::NAME, rows = df.height(), "records combined");
        Self::new(df)
    }
}

pub(crate) fn filter_rows(df: &DataFrame, mask: &[bool]) -> Result<DataFrame> {
    let mask = BooleanChunked::from_slice(PlSmallStr::from_static("mask"), mask);
    Ok(df.filter(&mask)?)
}

impl<R: Record> Add for &Records<R> {
    type Output = Result<Records<R>>;

    fn add(self, other: &Records<R>) -> Self::Output {
        self.combine(other)
    }
}

impl<R: Record> Collection for Records<R> {
    fn kind(&self) -> CollectionKind {
        CollectionKind::Records
    }

    fn record_name(&self) -> &'static str {
        R::NAME
    }

    fn df(&self) -> &DataFrame {
        &self.df
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::records::entity::{Competition, Frame, GameInfo, Team};
    use crate::records::view::FieldValue;
    use polars::prelude::{DataType, NamedFrom, Series};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn competition(id: &str, name: &str, country: Option<&str>) -> Competition {
        Competition {
            id: id.to_string(),
            name: name.to_string(),
            season_id: "2023".to_string(),
            season_name: Some("2023/24".to_string()),
            country: country.map(str::to_string),
        }
    }

    fn competitions() -> Records<Competition> {
        Records::from_records(&[
            competition("comp_1", "Premier League", Some("England")),
            competition("comp_2", "La Liga", Some("Spain")),
            competition("comp_3", "Champions League", None),
        ])
        .unwrap()
    }

    #[test]
    fn test_new_rejects_missing_column() {
        let df = competitions().into_df().drop("season_id").unwrap();
        let err = Records::<Competition>::new(df).unwrap_err();
        assert!(matches!(err, CoreError::MissingColumn { .. }));
    }

    #[test]
    fn test_new_rejects_wrong_type() {
        let mut df = competitions().into_df();
        df.with_column(Series::new("name".into(), &[1i32, 2, 3])).unwrap();
        let err = Records::<Competition>::new(df).unwrap_err();
        assert!(matches!(err, CoreError::TypeMismatch { .. }));
    }

    #[test]
    fn test_new_keeps_extra_columns() {
        let mut df = competitions().into_df();
        df.with_column(Series::new("tier".into(), &[1i32, 1, 2])).unwrap();
        let records = Records::<Competition>::new(df).unwrap();
        assert_eq!(records.df().width(), 6);
    }

    #[test]
    fn test_combine_is_additive_and_ordered() {
        let records = competitions();
        let combined = (&records + &records).unwrap();
        assert_eq!(combined.len(), 2 * records.len());
        let ids: Vec<String> = combined.to_vec().unwrap().into_iter().map(|c| c.id).collect();
        assert_eq!(ids, vec!["comp_1", "comp_2", "comp_3", "comp_1", "comp_2", "comp_3"]);
        // operands untouched
        assert_eq!(records.len(), 3);
    }

    #[test]
    fn test_check_compatible_across_record_types() {
        let teams = Records::<Team>::from_records(&[Team {
            id: "team_1".into(),
            name: "Team A".into(),
            color: Some("#FF0000".into()),
        }])
        .unwrap();
        let err = competitions().check_compatible(&teams).unwrap_err();
        assert!(matches!(err, CoreError::IncompatibleCollection(_)));
    }

    #[test]
    fn test_export_maps_ids() {
        let exported = competitions().export().unwrap();
        assert_eq!(exported.len(), 3);
        assert_eq!(exported["comp_2"].name, "La Liga");
        assert_eq!(exported["comp_3"].country, None);
    }

    #[test]
    fn test_export_rejects_duplicate_ids() {
        let records = competitions();
        let doubled = records.combine(&records).unwrap();
        let err = doubled.export().unwrap_err();
        assert!(matches!(err, CoreError::DuplicateId { record: "competition", .. }));
    }

    #[test]
    fn test_find() {
        let records = competitions();
        let found = records.find("comp_1").unwrap().unwrap();
        assert_eq!(found.name, "Premier League");
        assert!(records.find("non_existing").unwrap().is_none());
    }

    #[test]
    fn test_find_one_requires_exactly_one_match() {
        let records = competitions();
        let spain = records.find_one(&[("country", "Spain".into())]).unwrap();
        assert_eq!(spain.id, "comp_2");

        let none = records.find_one(&[("country", "France".into())]).unwrap_err();
        assert!(matches!(none, CoreError::NotFound(_)));

        let many = records.find_one(&[("season_id", "2023".into())]).unwrap_err();
        assert!(matches!(many, CoreError::Ambiguous { count: 3, .. }));
    }

    #[test]
    fn test_find_all_and_filter_df() {
        let records = competitions();
        assert_eq!(records.find_all(&[("season_id", "2023".into())]).unwrap().len(), 3);
        assert!(records.find_all(&[("name", "Serie A".into())]).unwrap().is_empty());

        let no_country = records.find_all(&[("country", FieldValue::Null)]).unwrap();
        assert_eq!(no_country.len(), 1);
        assert_eq!(no_country[0].id, "comp_3");

        let df = records
            .filter_df(&[("season_id", "2023".into()), ("country", "England".into())])
            .unwrap();
        assert_eq!(df.height(), 1);
        assert_eq!(df.width(), records.df().width());

        assert!(records.filter_df(&[("unknown", "x".into())]).is_err());
    }

    #[test]
    fn test_sample() {
        let records = competitions();
        let mut rng = StdRng::seed_from_u64(7);
        for _ in 0..10 {
            let sampled = records.sample_with(&mut rng).unwrap();
            assert!(records.find(&sampled.id).unwrap().is_some());
        }

        let single = Records::from_records(&[competition("comp_1", "Premier League", None)]).unwrap();
        assert_eq!(single.sample().unwrap().id, "comp_1");
    }

    #[test]
    fn test_sample_empty_fails() {
        let empty = Records::<Competition>::from_records(&[]).unwrap();
        assert!(empty.is_empty());
        assert!(matches!(empty.sample(), Err(CoreError::EmptyCollection)));
    }

    #[test]
    fn test_combine_accepts_reordered_columns() {
        let records = competitions();
        let reordered = records
            .df()
            .select(["country", "season_name", "season_id", "name", "id_"])
            .unwrap();
        let other = Records::<Competition>::new(reordered).unwrap();

        let combined = records.combine(&other).unwrap();
        assert_eq!(combined.len(), 6);
        let tail = &combined.to_vec().unwrap()[3..];
        assert_eq!(tail[0], competition("comp_1", "Premier League", Some("England")));
        assert_eq!(tail[2].country, None);
    }

    fn game(id: &str, home_score: Option<i32>, away_score: Option<i32>) -> GameInfo {
        GameInfo {
            id: id.to_string(),
            date: "2024-05-19".to_string(),
            time: "16:00".to_string(),
            home_team_id: "team_1".to_string(),
            away_team_id: "team_2".to_string(),
            competition_id: "comp_1".to_string(),
            season_id: None,
            home_score,
            away_score,
        }
    }

    #[test]
    fn test_game_info_round_trip() {
        let games = vec![game("game_1", Some(3), Some(1)), game("game_2", None, None)];
        let records = Records::from_records(&games).unwrap();
        assert_eq!(records.df().column("home_score").unwrap().dtype(), &DataType::Int8);

        let exported = records.export().unwrap();
        assert_eq!(exported["game_1"], games[0]);
        assert_eq!(exported["game_2"].home_score, None);
        assert_eq!(exported["game_2"].away_score, None);

        let found = records.find("game_1").unwrap().unwrap();
        assert_eq!(found.home_score, Some(3));
        assert_eq!(found.season_id, None);
        let unplayed = records.find_all(&[("home_score", FieldValue::Null)]).unwrap();
        assert_eq!(unplayed.len(), 1);
        assert_eq!(unplayed[0].id, "game_2");
    }

    #[test]
    fn test_frame_round_trip() {
        let frames = vec![
            Frame {
                id: "frame_1".into(),
                player_id: "player_1".into(),
                team_id: "team_1".into(),
                x: 52.5,
                y: 34.0,
                time: "00:00:01.000".into(),
            },
            Frame {
                id: "frame_2".into(),
                player_id: "player_2".into(),
                team_id: "team_2".into(),
                x: 10.25,
                y: 60.5,
                time: "00:00:01.000".into(),
            },
        ];
        let records = Records::from_records(&frames).unwrap();
        let exported = records.export().unwrap();
        assert_eq!(exported.len(), 2);
        assert_eq!(exported["frame_2"], frames[1]);
        assert_eq!(records.find("frame_1").unwrap().unwrap(), frames[0]);
        assert_eq!(records.find_one(&[("team_id", "team_2".into())]).unwrap().x, 10.25);
    }
}
