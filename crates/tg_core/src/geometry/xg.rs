//! Expected-goals model input (distance + angle features, goal labels).
//!
//! Model fitting lives outside this crate; this only prepares the matrix.

use super::{shot_features, ShotFeatures};
use crate::models::ShotDetail;

#[derive(Debug, Clone, Default)]
pub struct XgInput {
    xs: Vec<f64>,
    ys: Vec<f64>,
    features: Vec<ShotFeatures>,
    labels: Vec<bool>,
}

impl XgInput {
    /// Features are computed per shot with the pitch that shot is bound to.
    pub fn from_shots(shots: &[ShotDetail]) -> Self {
        let mut input = Self::default();
        for shot in shots {
            let location = &shot.location;
            input.xs.push(location.x);
            input.ys.push(location.y);
            input.features.push(shot_features(location.x, location.y, location.pitch()));
            input.labels.push(shot.is_goal());
        }
        input
    }

    pub fn xs(&self) -> &[f64] {
        &self.xs
    }

    pub fn ys(&self) -> &[f64] {
        &self.ys
    }

    pub fn features(&self) -> &[ShotFeatures] {
        &self.features
    }

    /// `[distance, angle]` rows.
    pub fn feature_matrix(&self) -> Vec<[f64; 2]> {
        self.features.iter().map(ShotFeatures::as_array).collect()
    }

    pub fn labels(&self) -> &[bool] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Share of shots that were goals; `None` when there are no shots.
    pub fn conversion_rate(&self) -> Option<f64> {
        if self.labels.is_empty() {
            return None;
        }
        let goals = self.labels.iter().filter(|goal| **goal).count();
        Some(goals as f64 / self.labels.len() as f64)
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::models::shot::fixtures::shot_at;
    use crate::models::{Pitch, ShotResult};

    #[test]
    fn test_features_and_labels() {
        let pitch = Arc::new(Pitch::new(120.0, 80.0).unwrap().with_goal(8.0, 2.67).unwrap());
        let shots = vec![
            shot_at(100.0, 43.2, ShotResult::Goal, &pitch),
            shot_at(60.0, 40.0, ShotResult::Missed, &pitch),
        ];
        let input = XgInput::from_shots(&shots);

        assert_eq!(input.len(), 2);
        assert_eq!(input.labels(), &[true, false]);
        assert_eq!(input.xs(), &[100.0, 60.0]);
        let matrix = input.feature_matrix();
        assert!((matrix[0][0] - 20.254).abs() < 1e-3);
        assert!((matrix[1][0] - 60.0).abs() < 1e-9);
        assert_eq!(input.conversion_rate(), Some(0.5));
    }

    #[test]
    fn test_each_shot_uses_its_own_pitch() {
        let yards = Arc::new(Pitch::new(120.0, 80.0).unwrap());
        let meters = Arc::new(Pitch::new(105.0, 68.0).unwrap());
        let shots = vec![
            shot_at(100.0, 40.0, ShotResult::Saved, &yards),
            shot_at(85.0, 34.0, ShotResult::Saved, &meters),
        ];
        let input = XgInput::from_shots(&shots);
        assert!((input.features()[0].distance - 20.0).abs() < 1e-9);
        assert!((input.features()[1].distance - 20.0).abs() < 1e-9);
    }

    #[test]
    fn test_empty_input() {
        let input = XgInput::from_shots(&[]);
        assert!(input.is_empty());
        assert_eq!(input.conversion_rate(), None);
    }
}
