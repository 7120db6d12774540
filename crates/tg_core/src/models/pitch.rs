//! Pitch: rectangular playing surface + coordinate convention
//!
//! A `Pitch` never changes after construction. Coordinates stored in
//! events and locations are only meaningful together with the pitch they
//! are bound to.
//!
//! ## Conventions
//!
//! - `length` axis: goal line to goal line, `x` coordinate
//! - `width` axis: touchline to touchline, `y` coordinate
//! - `length_direction`: screen side that increasing `x` points toward
//! - `width_direction`: screen side that increasing `y` points toward
//! - `vertical`: the length axis is drawn as the vertical screen axis
//!
//! ## Equality
//!
//! Pitches compare with [`Pitch::approx_eq`] (`|a - b| < 1e-9` on every
//! numeric field). `Pitch` deliberately implements neither `PartialEq` nor
//! `Hash`: tolerant equality is not transitive, so keying a map on a pitch
//! value is unsound.

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result};

/// Absolute tolerance for floating-point pitch fields.
pub const FLOAT_TOLERANCE: f64 = 1e-9;

/// `|a - b| < 1e-9`
#[inline]
pub fn is_float_close(a: f64, b: f64) -> bool {
    (a - b).abs() < FLOAT_TOLERANCE
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LengthDirection {
    Left,
    Right,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WidthDirection {
    Up,
    Down,
}

/// Rectangular, axis-aligned pitch description.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(try_from = "PitchSpec", into = "PitchSpec")]
pub struct Pitch {
    length: f64,
    width: f64,
    length_direction: LengthDirection,
    width_direction: WidthDirection,
    vertical: bool,
    height_scale_to_meter: f64,
    goal_width: f64,
    goal_height: f64,
}

impl Pitch {
    /// FIFA recommended dimensions in meters.
    pub const DEFAULT_LENGTH: f64 = 105.0;
    pub const DEFAULT_WIDTH: f64 = 68.0;
    pub const DEFAULT_GOAL_WIDTH: f64 = 7.32;
    pub const DEFAULT_GOAL_HEIGHT: f64 = 2.44;

    /// Pitch with the given dimensions and default conventions
    /// (length → right, width → up, horizontal, meters, 7.32 × 2.44 goal).
    pub fn new(length: f64, width: f64) -> Result<Self> {
        ensure_positive("length", length)?;
        ensure_positive("width", width)?;
        Ok(Self { length, width, ..Self::default() })
    }

    /// StatsBomb event-data convention: 120 × 80 yards, y grows downward.
    pub fn statsbomb() -> Self {
        Self {
            length: 120.0,
            width: 80.0,
            length_direction: LengthDirection::Right,
            width_direction: WidthDirection::Down,
            vertical: false,
            height_scale_to_meter: 1.0,
            goal_width: 8.0,
            goal_height: 2.67,
        }
    }

    pub fn with_length_direction(mut self, direction: LengthDirection) -> Self {
        self.length_direction = direction;
        self
    }

    pub fn with_width_direction(mut self, direction: WidthDirection) -> Self {
        self.width_direction = direction;
        self
    }

    pub fn with_vertical(mut self, vertical: bool) -> Self {
        self.vertical = vertical;
        self
    }

    /// Stored height units per meter.
    pub fn with_height_scale(mut self, height_scale_to_meter: f64) -> Result<Self> {
        ensure_positive("height_scale_to_meter", height_scale_to_meter)?;
        self.height_scale_to_meter = height_scale_to_meter;
        Ok(self)
    }

    pub fn with_goal(mut self, goal_width: f64, goal_height: f64) -> Result<Self> {
        ensure_positive("goal_width", goal_width)?;
        ensure_positive("goal_height", goal_height)?;
        self.goal_width = goal_width;
        self.goal_height = goal_height;
        Ok(self)
    }

    pub fn length(&self) -> f64 {
        self.length
    }

    pub fn width(&self) -> f64 {
        self.width
    }

    pub fn length_direction(&self) -> LengthDirection {
        self.length_direction
    }

    pub fn width_direction(&self) -> WidthDirection {
        self.width_direction
    }

    pub fn vertical(&self) -> bool {
        self.vertical
    }

    pub fn height_scale_to_meter(&self) -> f64 {
        self.height_scale_to_meter
    }

    pub fn goal_width(&self) -> f64 {
        self.goal_width
    }

    pub fn goal_height(&self) -> f64 {
        self.goal_height
    }

    /// Field-by-field comparison with [`FLOAT_TOLERANCE`] on numeric fields.
    pub fn approx_eq(&self, other: &Pitch) -> bool {
        is_float_close(self.length, other.length)
            && is_float_close(self.width, other.width)
            && self.length_direction == other.length_direction
            && self.width_direction == other.width_direction
            && self.vertical == other.vertical
            && is_float_close(self.height_scale_to_meter, other.height_scale_to_meter)
            && is_float_close(self.goal_width, other.goal_width)
            && is_float_close(self.goal_height, other.goal_height)
    }

    /// Whether `(x, y)` lies within the pitch rectangle (edges included).
    pub fn contains(&self, x: f64, y: f64) -> bool {
        (0.0..=self.length).contains(&x) && (0.0..=self.width).contains(&y)
    }
}

impl Default for Pitch {
    fn default() -> Self {
        Self {
            length: Self::DEFAULT_LENGTH,
            width: Self::DEFAULT_WIDTH,
            length_direction: LengthDirection::Right,
            width_direction: WidthDirection::Up,
            vertical: false,
            height_scale_to_meter: 1.0,
            goal_width: Self::DEFAULT_GOAL_WIDTH,
            goal_height: Self::DEFAULT_GOAL_HEIGHT,
        }
    }
}

fn ensure_positive(field: &str, value: f64) -> Result<()> {
    // NaN fails this check as well
    if value > 0.0 && value.is_finite() {
        Ok(())
    } else {
        Err(CoreError::InvalidPitch(format!("{} must be positive, got {}", field, value)))
    }
}

/// Serialized form of a [`Pitch`]; every field but the dimensions is optional.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct PitchSpec {
    length: f64,
    width: f64,
    #[serde(default = "default_length_direction")]
    length_direction: LengthDirection,
    #[serde(default = "default_width_direction")]
    width_direction: WidthDirection,
    #[serde(default)]
    vertical: bool,
    #[serde(default = "default_one")]
    height_scale_to_meter: f64,
    #[serde(default = "default_goal_width")]
    goal_width: f64,
    #[serde(default = "default_goal_height")]
    goal_height: f64,
}

fn default_length_direction() -> LengthDirection {
    LengthDirection::Right
}
fn default_width_direction() -> WidthDirection {
    WidthDirection::Up
}
fn default_one() -> f64 {
    1.0
}
fn default_goal_width() -> f64 {
    Pitch::DEFAULT_GOAL_WIDTH
}
fn default_goal_height() -> f64 {
    Pitch::DEFAULT_GOAL_HEIGHT
}

impl TryFrom<PitchSpec> for Pitch {
    type Error = CoreError;

    fn try_from(spec: PitchSpec) -> Result<Self> {
        Pitch::new(spec.length, spec.width)?
            .with_length_direction(spec.length_direction)
            .with_width_direction(spec.width_direction)
            .with_vertical(spec.vertical)
            .with_height_scale(spec.height_scale_to_meter)?
            .with_goal(spec.goal_width, spec.goal_height)
    }
}

impl From<Pitch> for PitchSpec {
    fn from(pitch: Pitch) -> Self {
        Self {
            length: pitch.length,
            width: pitch.width,
            length_direction: pitch.length_direction,
            width_direction: pitch.width_direction,
            vertical: pitch.vertical,
            height_scale_to_meter: pitch.height_scale_to_meter,
            goal_width: pitch.goal_width,
            goal_height: pitch.goal_height,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_non_positive_dimensions() {
        assert!(matches!(Pitch::new(0.0, 68.0), Err(CoreError::InvalidPitch(_))));
        assert!(matches!(Pitch::new(105.0, -1.0), Err(CoreError::InvalidPitch(_))));
        assert!(Pitch::new(f64::NAN, 68.0).is_err());
        assert!(Pitch::default().with_goal(0.0, 2.44).is_err());
        assert!(Pitch::default().with_height_scale(-2.0).is_err());
    }

    #[test]
    fn test_approx_eq_tolerates_rounding() {
        let a = Pitch::new(120.0, 80.0).unwrap();
        let b = Pitch::new(120.0 + 1e-12, 80.0 - 1e-12).unwrap();
        assert!(a.approx_eq(&b));
        assert!(b.approx_eq(&a));
    }

    #[test]
    fn test_approx_eq_detects_differences() {
        let a = Pitch::new(120.0, 80.0).unwrap();
        assert!(!a.approx_eq(&Pitch::new(120.0 + 1e-6, 80.0).unwrap()));
        assert!(!a.approx_eq(&a.clone().with_width_direction(WidthDirection::Down)));
        assert!(!a.approx_eq(&a.clone().with_length_direction(LengthDirection::Left)));
        assert!(!a.approx_eq(&a.clone().with_vertical(true)));
        assert!(!a.approx_eq(&a.clone().with_goal(8.0, 2.44).unwrap()));
        assert!(!a.approx_eq(&a.clone().with_height_scale(1.0936).unwrap()));
    }

    #[test]
    fn test_statsbomb_preset() {
        let pitch = Pitch::statsbomb();
        assert_eq!(pitch.length(), 120.0);
        assert_eq!(pitch.width(), 80.0);
        assert_eq!(pitch.width_direction(), WidthDirection::Down);
        assert_eq!(pitch.goal_width(), 8.0);
    }

    #[test]
    fn test_contains() {
        let pitch = Pitch::new(100.0, 60.0).unwrap();
        assert!(pitch.contains(0.0, 0.0));
        assert!(pitch.contains(100.0, 60.0));
        assert!(!pitch.contains(100.1, 30.0));
        assert!(!pitch.contains(50.0, -0.1));
    }

    #[test]
    fn test_deserialize_fills_defaults_and_validates() {
        let pitch: Pitch =
            serde_json::from_str(r#"{"length": 120, "width": 80, "width_direction": "down"}"#)
                .unwrap();
        assert_eq!(pitch.width_direction(), WidthDirection::Down);
        assert_eq!(pitch.length_direction(), LengthDirection::Right);
        assert_eq!(pitch.goal_width(), Pitch::DEFAULT_GOAL_WIDTH);

        let bad = serde_json::from_str::<Pitch>(r#"{"length": -5, "width": 80}"#);
        assert!(bad.is_err());
    }

    #[test]
    fn test_serialize_roundtrip() {
        let pitch = Pitch::statsbomb().with_vertical(true);
        let json = serde_json::to_string(&pitch).unwrap();
        let back: Pitch = serde_json::from_str(&json).unwrap();
        assert!(pitch.approx_eq(&back));
    }
}
