//! Variable density sampling: the field of view the spiral has to support as
//! a function of the normalized k-space radius.

use crate::config::TrajectoryConfig;
use crate::error::ConfigError;

/// Piecewise-linear FOV profile over the normalized radius `[0, 1]`.
#[derive(Debug, Clone, PartialEq)]
pub struct DensityProfile {
    /// `(radius, fov)` with strictly increasing radius from 0 to 1. FOV unit: `mm`
    points: Vec<(f64, f64)>,
}

impl DensityProfile {
    pub fn new(points: Vec<(f64, f64)>) -> Result<Self, ConfigError> {
        if points.len() < 2 {
            return Err(ConfigError::InvalidDensity(format!(
                "need at least two control points, got {}",
                points.len()
            )));
        }
        if points[0].0 != 0.0 || points[points.len() - 1].0 != 1.0 {
            return Err(ConfigError::InvalidDensity(
                "control radii must start at 0 and end at 1".to_owned(),
            ));
        }
        if points.windows(2).any(|w| w[1].0 <= w[0].0) {
            return Err(ConfigError::InvalidDensity(
                "control radii must be strictly increasing".to_owned(),
            ));
        }
        if points.iter().any(|&(_, fov)| !fov.is_finite() || fov <= 0.0) {
            return Err(ConfigError::InvalidDensity(
                "field of view must be positive and finite".to_owned(),
            ));
        }

        Ok(Self { points })
    }

    /// Oversampled center, linear transition, nominal FOV outside.
    pub fn from_config(config: &TrajectoryConfig) -> Result<Self, ConfigError> {
        let inner = config.fov * config.spiral_os;
        let outer = config.fov;
        let begin = config.vd_transition_begin;
        let end = config.vd_transition_end;

        let mut points = vec![(0.0, inner)];
        if begin > 0.0 {
            points.push((begin, inner));
        }
        points.push((end, outer));
        if end < 1.0 {
            points.push((1.0, outer));
        }

        Self::new(points)
    }

    pub fn points(&self) -> &[(f64, f64)] {
        &self.points
    }

    /// Index of the linear piece containing `radius` (clamped to `[0, 1]`)
    fn piece(&self, radius: f64) -> usize {
        let radius = radius.clamp(0.0, 1.0);
        // Number of control points left of or at `radius`, at least one
        let idx = self.points.partition_point(|&(r, _)| r <= radius);
        idx.clamp(1, self.points.len() - 1) - 1
    }

    /// Local field of view. Unit: `mm`
    pub fn fov_at(&self, radius: f64) -> f64 {
        let radius = radius.clamp(0.0, 1.0);
        let i = self.piece(radius);
        let (r0, f0) = self.points[i];
        let (r1, f1) = self.points[i + 1];
        f0 + (f1 - f0) * (radius - r0) / (r1 - r0)
    }

    /// Derivative of `fov_at` with respect to the normalized radius, taken
    /// from the piece right of a control point. Zero outside `[0, 1]`.
    /// Unit: `mm`
    pub fn slope_at(&self, radius: f64) -> f64 {
        if !(0.0..=1.0).contains(&radius) {
            return 0.0;
        }
        let i = self.piece(radius);
        let (r0, f0) = self.points[i];
        let (r1, f1) = self.points[i + 1];
        (f1 - f0) / (r1 - r0)
    }
}
