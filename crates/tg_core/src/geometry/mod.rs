//! Shot geometry: distance and goal-mouth angle
//!
//! The attacked goal sits on the far length edge (`x = pitch.length`),
//! centered on the width axis. All values are in the pitch's own units, so
//! they must be computed with the pitch each shot is bound to.
//!
//! ```text
//! cal_x = length - x
//! c     = |width / 2 - y|
//! dist  = sqrt(cal_x² + c²)
//! θ     = atan(goal_width · cal_x / (cal_x² + c² - (goal_width / 2)²))
//! angle = (θ ≥ 0 ? θ : θ + π) · 180 / π
//! ```
//!
//! The denominator goes negative when the shot is between the projections
//! of the two posts and close to the line; adding π keeps the angle on the
//! correct branch.

pub mod xg;

use std::f64::consts::PI;

use serde::Serialize;

use crate::models::Pitch;

pub use xg::XgInput;

/// Model inputs derived from one shot location.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ShotFeatures {
    pub distance: f64,
    /// Degrees.
    pub angle: f64,
}

impl ShotFeatures {
    pub fn as_array(&self) -> [f64; 2] {
        [self.distance, self.angle]
    }
}

#[inline]
fn goal_offsets(x: f64, y: f64, pitch: &Pitch) -> (f64, f64) {
    (pitch.length() - x, (pitch.width() / 2.0 - y).abs())
}

/// Straight-line distance from `(x, y)` to the goal center.
pub fn shot_distance(x: f64, y: f64, pitch: &Pitch) -> f64 {
    let (cal_x, c) = goal_offsets(x, y, pitch);
    (cal_x * cal_x + c * c).sqrt()
}

/// Angle in degrees subtended by the goal mouth, seen from `(x, y)`.
pub fn shot_angle(x: f64, y: f64, pitch: &Pitch) -> f64 {
    let (cal_x, c) = goal_offsets(x, y, pitch);
    let half_goal = pitch.goal_width() / 2.0;
    let theta =
        (pitch.goal_width() * cal_x / (cal_x * cal_x + c * c - half_goal * half_goal)).atan();
    let theta = if theta >= 0.0 { theta } else { theta + PI };
    theta * 180.0 / PI
}

pub fn shot_features(x: f64, y: f64, pitch: &Pitch) -> ShotFeatures {
    ShotFeatures { distance: shot_distance(x, y, pitch), angle: shot_angle(x, y, pitch) }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn statsbomb_like() -> Pitch {
        Pitch::new(120.0, 80.0).unwrap().with_goal(8.0, 2.67).unwrap()
    }

    #[test]
    fn test_reference_shot() {
        let pitch = statsbomb_like();
        let features = shot_features(100.0, 43.2, &pitch);
        assert!((features.distance - 410.24f64.sqrt()).abs() < 1e-9);
        assert!((features.distance - 20.254).abs() < 1e-3);
        assert!((features.angle - 22.0895).abs() < 1e-3);
    }

    #[test]
    fn test_central_shot_from_distance() {
        let pitch = statsbomb_like();
        let features = shot_features(60.0, 40.0, &pitch);
        assert!((features.distance - 60.0).abs() < 1e-9);
        assert!((features.angle - 7.62815).abs() < 1e-4);
    }

    #[test]
    fn test_inside_goal_mouth_uses_obtuse_branch() {
        // one unit from the line, centered: denominator negative
        let pitch = statsbomb_like();
        let angle = shot_angle(119.0, 40.0, &pitch);
        assert!(angle > 90.0);
        assert!((angle - 151.9275).abs() < 1e-3);
    }

    #[test]
    fn test_on_post_circle_is_right_angle() {
        // cal_x² + c² == (goal_width / 2)²: division by zero resolves to 90°
        let pitch = statsbomb_like();
        let angle = shot_angle(116.0, 40.0, &pitch);
        assert!((angle - 90.0).abs() < 1e-9);
    }

    #[test]
    fn test_symmetric_about_center_line() {
        let pitch = statsbomb_like();
        let left = shot_features(95.0, 30.0, &pitch);
        let right = shot_features(95.0, 50.0, &pitch);
        assert!((left.angle - right.angle).abs() < 1e-12);
        assert!((left.distance - right.distance).abs() < 1e-12);
    }

    #[test]
    fn test_units_follow_pitch() {
        let yards = statsbomb_like();
        let meters = Pitch::new(105.0, 68.0).unwrap();
        assert!(shot_distance(100.0, 40.0, &yards) > shot_distance(100.0, 34.0, &meters));
    }

    #[cfg(all(test, feature = "proptest"))]
    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Property: angle is finite and within (0, 180] strictly inside the pitch
            #[test]
            fn prop_angle_well_defined(fx in 0.001f64..0.999, fy in 0.001f64..0.999) {
                let pitch = statsbomb_like();
                let angle = shot_angle(fx * pitch.length(), fy * pitch.width(), &pitch);
                prop_assert!(angle.is_finite());
                prop_assert!(angle > 0.0 && angle <= 180.0);
            }
        }
    }
}
