//! Location: a point bound to the pitch its coordinates are expressed in
//!
//! `transform` re-expresses the same physical point under another pitch
//! convention. It mutates in place; callers sharing a `Location` across
//! threads must synchronize externally.

use std::sync::Arc;

use tracing::trace;

use super::pitch::{LengthDirection, Pitch, WidthDirection};

#[derive(Debug, Clone)]
pub struct Location {
    pub x: f64,
    pub y: f64,
    /// Height, in the bound pitch's height unit.
    pub z: Option<f64>,
    pitch: Arc<Pitch>,
}

/// Source axes as seen from the target pitch, after an optional axis swap.
struct EffectiveFrame {
    swapped: bool,
    length: f64,
    width: f64,
    length_direction: LengthDirection,
    width_direction: WidthDirection,
}

impl EffectiveFrame {
    fn resolve(source: &Pitch, target: &Pitch) -> Self {
        if source.vertical() == target.vertical() {
            return Self {
                swapped: false,
                length: source.length(),
                width: source.width(),
                length_direction: source.length_direction(),
                width_direction: source.width_direction(),
            };
        }

        // Horizontal → vertical rotates one way, vertical → horizontal rotates back.
        let (length_direction, width_direction) = if source.vertical() {
            (
                match source.width_direction() {
                    WidthDirection::Up => LengthDirection::Left,
                    WidthDirection::Down => LengthDirection::Right,
                },
                match source.length_direction() {
                    LengthDirection::Right => WidthDirection::Up,
                    LengthDirection::Left => WidthDirection::Down,
                },
            )
        } else {
            (
                match source.width_direction() {
                    WidthDirection::Up => LengthDirection::Right,
                    WidthDirection::Down => LengthDirection::Left,
                },
                match source.length_direction() {
                    LengthDirection::Right => WidthDirection::Down,
                    LengthDirection::Left => WidthDirection::Up,
                },
            )
        };

        Self {
            swapped: true,
            length: source.width(),
            width: source.length(),
            length_direction,
            width_direction,
        }
    }
}

impl Location {
    pub fn new(x: f64, y: f64, pitch: Arc<Pitch>) -> Self {
        Self { x, y, z: None, pitch }
    }

    pub fn with_z(x: f64, y: f64, z: f64, pitch: Arc<Pitch>) -> Self {
        Self { x, y, z: Some(z), pitch }
    }

    pub fn pitch(&self) -> &Arc<Pitch> {
        &self.pitch
    }

    /// Re-express this point under `target` and rebind to it.
    ///
    /// No-op when the current pitch is tolerant-equal to `target`.
    /// Axis swap happens before scaling and mirroring.
    pub fn transform(&mut self, target: &Arc<Pitch>) {
        if self.pitch.approx_eq(target) {
            return;
        }

        let source = Arc::clone(&self.pitch);
        let frame = EffectiveFrame::resolve(&source, target);

        if frame.swapped {
            std::mem::swap(&mut self.x, &mut self.y);
        }

        self.x *= target.length() / frame.length;
        self.y *= target.width() / frame.width;

        if let Some(z) = self.z.as_mut() {
            *z *= target.height_scale_to_meter() / source.height_scale_to_meter();
        }

        if frame.length_direction != target.length_direction() {
            self.x = target.length() - self.x;
        }
        if frame.width_direction != target.width_direction() {
            self.y = target.width() - self.y;
        }

        trace!(x = self.x, y = self.y, swapped = frame.swapped, "location transformed");
        self.pitch = Arc::clone(target);
    }

    /// Copy of this location expressed under `target`.
    pub fn transformed(&self, target: &Arc<Pitch>) -> Self {
        let mut copy = self.clone();
        copy.transform(target);
        copy
    }

    /// Planar distance in this location's pitch units.
    ///
    /// `other` is first re-expressed under this location's pitch.
    pub fn distance_to(&self, other: &Location) -> f64 {
        let other = other.transformed(&self.pitch);
        let dx = other.x - self.x;
        let dy = other.y - self.y;
        (dx * dx + dy * dy).sqrt()
    }
}
