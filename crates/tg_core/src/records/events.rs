//! Pitch-aware event collections
//!
//! - [`Events`]: any event rows, bound to a shared [`Pitch`]
//! - [`Shots`]: every row tagged `"shot"`
//! - [`Part`]: every row in exactly one partition (possession)
//!
//! All three validate the `Event` schema first, then their own structural
//! rule. Combining requires the same concrete type and a tolerant-equal pitch.

use std::collections::HashSet;
use std::ops::{Add, Deref};
use std::sync::Arc;

use polars::prelude::{DataFrame, NamedFrom, Series};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, warn};

use super::collection::{filter_rows, Collection, CollectionKind, Records};
use super::entity::{Event, Record, Shot, PART_COLUMN, TYPE_COLUMN};
use super::table::concat_tables;
use super::view::ColumnValues;
use crate::error::{CoreError, Result};
use crate::geometry::{shot_features, ShotFeatures};
use crate::models::{EventType, Location, Pitch, ShotResult};
use crate::schema::StorageType;

/// Supplementary shot columns read by the derived-feature hooks.
pub const END_X_COLUMN: &str = "end_x";
pub const END_Y_COLUMN: &str = "end_y";
pub const RESULT_COLUMN: &str = "result";

/// Record types stored in event tables (`Event` columns).
pub trait EventRecord: Record {}

impl EventRecord for Event {}
impl EventRecord for Shot {}

/// Records bound to the pitch their `x`/`y` columns are expressed in.
pub struct BaseEvents<E: EventRecord> {
    records: Records<E>,
    pitch: Arc<Pitch>,
}

impl<E: EventRecord> Clone for BaseEvents<E> {
    fn clone(&self) -> Self {
        Self { records: self.records.clone(), pitch: Arc::clone(&self.pitch) }
    }
}

impl<E: EventRecord> std::fmt::Debug for BaseEvents<E> {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        f.debug_struct("BaseEvents")
            .field("records", &self.records)
            .field("pitch", &self.pitch)
            .finish()
    }
}

impl<E: EventRecord> BaseEvents<E> {
    fn new(df: DataFrame, pitch: Arc<Pitch>) -> Result<Self> {
        Ok(Self { records: Records::new(df)?, pitch })
    }

    pub fn pitch(&self) -> &Arc<Pitch> {
        &self.pitch
    }

    pub fn records(&self) -> &Records<E> {
        &self.records
    }

    pub fn df(&self) -> &DataFrame {
        self.records.df()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    fn column(&self, name: &'static str) -> Result<ColumnValues> {
        let storage = self
            .records
            .schema()
            .storage(name)
            .ok_or_else(|| CoreError::MissingColumn { column: name.to_string() })?;
        let column = self
            .df()
            .column(name)
            .map_err(|_| CoreError::MissingColumn { column: name.to_string() })?;
        ColumnValues::from_column(column, storage)
    }

    /// `team_id` per row, in row order.
    pub fn team_ids(&self) -> Result<Vec<String>> {
        self.column("team_id")?.require_texts("team_id")
    }

    pub fn player_ids(&self) -> Result<Vec<String>> {
        self.column("player_id")?.require_texts("player_id")
    }

    pub fn xs(&self) -> Result<Vec<f64>> {
        self.column("x")?.require_floats("x")
    }

    pub fn ys(&self) -> Result<Vec<f64>> {
        self.column("y")?.require_floats("y")
    }

    /// Distinct partition values in first-seen order.
    pub fn partitions(&self) -> Result<Vec<i64>> {
        let values = self.column(PART_COLUMN)?.require_ints(PART_COLUMN)?;
        let mut seen = HashSet::new();
        Ok(values.into_iter().filter(|value| seen.insert(*value)).collect())
    }

    /// Rows whose `type_` equals `tag`.
    pub fn filter_by_type(&self, tag: &str) -> Result<DataFrame> {
        self.records.filter_df(&[(TYPE_COLUMN, tag.into())])
    }

    /// Every row's position as a [`Location`] bound to this collection's pitch.
    pub fn locations(&self) -> Result<Vec<Location>> {
        let xs = self.xs()?;
        let ys = self.ys()?;
        Ok(xs
            .into_iter()
            .zip(ys)
            .map(|(x, y)| Location::new(x, y, Arc::clone(&self.pitch)))
            .collect())
    }

    /// Concatenated table of `self` and `other` after the pitch check.
    fn combined_df(&self, other: &Self) -> Result<DataFrame> {
        if !self.pitch.approx_eq(&other.pitch) {
            warn!(record = E::NAME, "combine rejected: pitches differ");
            return Err(CoreError::IncompatibleCollection("pitches differ".to_string()));
        }
        concat_tables(self.df(), other.df())
    }

    /// Copy of the table with `x`/`y` re-expressed under `target`.
    fn transformed_df(&self, target: &Arc<Pitch>) -> Result<DataFrame> {
        let (xs, ys): (Vec<f64>, Vec<f64>) = self
            .locations()?
            .into_iter()
            .map(|location| {
                let moved = location.transformed(target);
                (moved.x, moved.y)
            })
            .unzip();

        let mut df = self.df().clone();
        df.with_column(Series::new("x".into(), xs))?;
        df.with_column(Series::new("y".into(), ys))?;
        Ok(df)
    }
}

macro_rules! collection_impls {
    ($name:ident, $record:ty, $kind:expr) => {
        impl Deref for $name {
            type Target = BaseEvents<$record>;

            fn deref(&self) -> &BaseEvents<$record> {
                &self.base
            }
        }

        impl Collection for $name {
            fn kind(&self) -> CollectionKind {
                $kind
            }

            fn record_name(&self) -> &'static str {
                <$record as Record>::NAME
            }

            fn df(&self) -> &DataFrame {
                self.base.df()
            }

            fn bound_pitch(&self) -> Option<&Pitch> {
                Some(self.base.pitch.as_ref())
            }
        }

        impl Add for &$name {
            type Output = Result<$name>;

            fn add(self, other: &$name) -> Self::Output {
                self.combine(other)
            }
        }
    };
}

// ============================================================================
// Events
// ============================================================================

#[derive(Debug, Clone)]
pub struct Events {
    base: BaseEvents<Event>,
}

collection_impls!(Events, Event, CollectionKind::Events);

impl Events {
    pub fn new(df: DataFrame, pitch: Arc<Pitch>) -> Result<Self> {
        let base = BaseEvents::new(df, pitch)?;
        debug!(rows = base.len(), "events constructed");
        Ok(Self { base })
    }

    pub fn from_records(events: &[Event], pitch: Arc<Pitch>) -> Result<Self> {
        Self::new(super::table::records_to_table(events)?, pitch)
    }

    pub fn combine(&self, other: &Events) -> Result<Events> {
        Events::new(self.base.combined_df(&other.base)?, Arc::clone(&self.base.pitch))
    }

    /// Shot rows as a [`Shots`] collection.
    pub fn shots(&self) -> Result<Shots> {
        Shots::new(self.filter_by_type(EventType::Shot.as_str())?, Arc::clone(&self.base.pitch))
    }

    /// All rows of partition `value`.
    pub fn part(&self, value: i64) -> Result<Part> {
        let df = self.records().filter_df(&[(PART_COLUMN, value.into())])?;
        Part::new(df, Arc::clone(&self.base.pitch))
    }

    /// The rows of one partition picked uniformly among the distinct values.
    pub fn sample_part(&self) -> Result<Part> {
        self.sample_part_with(&mut rand::thread_rng())
    }

    pub fn sample_part_with<G: Rng + ?Sized>(&self, rng: &mut G) -> Result<Part> {
        let partitions = self.partitions()?;
        let value = *partitions.choose(rng).ok_or(CoreError::EmptyCollection)?;
        self.part(value)
    }

    /// New collection with every location re-expressed under `target`.
    pub fn transform_locations(&self, target: &Arc<Pitch>) -> Result<Events> {
        Events::new(self.base.transformed_df(target)?, Arc::clone(target))
    }
}

// ============================================================================
// Shots
// ============================================================================

#[derive(Debug, Clone)]
pub struct Shots {
    base: BaseEvents<Shot>,
}

collection_impls!(Shots, Shot, CollectionKind::Shots);

impl Shots {
    pub fn new(df: DataFrame, pitch: Arc<Pitch>) -> Result<Self> {
        let base = BaseEvents::<Shot>::new(df, pitch)?;
        let tag = EventType::Shot.as_str();
        let types = base.column(TYPE_COLUMN)?.require_texts(TYPE_COLUMN)?;
        if let Some(row) = types.iter().position(|t| t != tag) {
            warn!(row, found = %types[row], "shots rejected: non-shot row");
            return Err(CoreError::StructuralInvariant(format!(
                "row {} has type `{}`, expected `{}`",
                row, types[row], tag
            )));
        }
        debug!(rows = base.len(), "shots constructed");
        Ok(Self { base })
    }

    pub fn from_records(shots: &[Shot], pitch: Arc<Pitch>) -> Result<Self> {
        Self::new(super::table::records_to_table(shots)?, pitch)
    }

    pub fn combine(&self, other: &Shots) -> Result<Shots> {
        Shots::new(self.base.combined_df(&other.base)?, Arc::clone(&self.base.pitch))
    }

    fn supplementary(&self, name: &'static str, accept: fn(&StorageType) -> bool) -> Result<ColumnValues> {
        let column = self
            .df()
            .column(name)
            .map_err(|_| CoreError::MissingColumn { column: name.to_string() })?;
        let expected = if name == RESULT_COLUMN { StorageType::Text } else { StorageType::Float64 };
        match StorageType::from_dtype(column.dtype()) {
            Some(storage) if accept(&storage) => ColumnValues::from_column(column, storage),
            _ => Err(CoreError::TypeMismatch {
                column: name.to_string(),
                expected,
                found: column.dtype().to_string(),
            }),
        }
    }

    /// `end_x` per row.
    pub fn end_xs(&self) -> Result<Vec<f64>> {
        self.supplementary(END_X_COLUMN, |s| *s == StorageType::Float64)?.require_floats(END_X_COLUMN)
    }

    /// `end_y` per row.
    pub fn end_ys(&self) -> Result<Vec<f64>> {
        self.supplementary(END_Y_COLUMN, |s| *s == StorageType::Float64)?.require_floats(END_Y_COLUMN)
    }

    /// Distance/angle per shot, computed against this collection's pitch.
    pub fn xg_features(&self) -> Result<Vec<ShotFeatures>> {
        let xs = self.xs()?;
        let ys = self.ys()?;
        Ok(xs.into_iter().zip(ys).map(|(x, y)| shot_features(x, y, &self.base.pitch)).collect())
    }

    /// Whether each shot was a goal (`result == "goal"`; null counts as no goal).
    pub fn xg_label(&self) -> Result<Vec<bool>> {
        let goal = ShotResult::Goal.as_str();
        match self.supplementary(RESULT_COLUMN, StorageType::is_textual)? {
            ColumnValues::Text(values) => {
                Ok(values.iter().map(|v| v.as_deref() == Some(goal)).collect())
            }
            _ => Err(CoreError::TypeMismatch {
                column: RESULT_COLUMN.to_string(),
                expected: StorageType::Text,
                found: "non-text".to_string(),
            }),
        }
    }

    /// New collection holding only the goals.
    pub fn filter_goals(&self) -> Result<Shots> {
        let labels = self.xg_label()?;
        Shots::new(filter_rows(self.df(), &labels)?, Arc::clone(&self.base.pitch))
    }

    pub fn to_vec(&self) -> Result<Vec<Shot>> {
        self.records().to_vec()
    }
}

// ============================================================================
// Part
// ============================================================================

/// Events of exactly one partition.
#[derive(Debug, Clone)]
pub struct Part {
    base: BaseEvents<Event>,
    partition: i64,
}

collection_impls!(Part, Event, CollectionKind::Part);

impl Part {
    pub fn new(df: DataFrame, pitch: Arc<Pitch>) -> Result<Self> {
        let base = BaseEvents::new(df, pitch)?;
        let partitions = base.partitions()?;
        match partitions.as_slice() {
            [partition] => {
                debug!(partition, rows = base.len(), "part constructed");
                Ok(Self { base, partition: *partition })
            }
            [] => Err(CoreError::StructuralInvariant("part has no events".to_string())),
            many => {
                warn!(partitions = ?many, "part rejected: several partitions");
                Err(CoreError::StructuralInvariant(format!(
                    "part spans {} partitions: {:?}",
                    many.len(),
                    many
                )))
            }
        }
    }

    pub fn partition(&self) -> i64 {
        self.partition
    }

    /// Both parts must share the partition value; the result is validated again.
    pub fn combine(&self, other: &Part) -> Result<Part> {
        Part::new(self.base.combined_df(&other.base)?, Arc::clone(&self.base.pitch))
    }

    pub fn to_vec(&self) -> Result<Vec<Event>> {
        self.records().to_vec()
    }
}

impl From<Part> for Events {
    fn from(part: Part) -> Self {
        Events { base: part.base }
    }
}
