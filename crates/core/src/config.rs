//! Tracing and placement parameters.

use glam::DVec2;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::FlowError;
use crate::geometry::Point2;
use crate::params::{param_bool, param_f64, param_opt_usize, param_point, param_usize};

/// Default integration step length.
pub const DEFAULT_STEP_SIZE: f64 = 0.1;
/// Default cap on steps per direction of one streamline.
pub const DEFAULT_MAX_STEPS: usize = 1000;
/// Default separation between neighbouring streamlines (d_sep).
pub const DEFAULT_SEPARATION: f64 = 0.8;
/// Default distance a growing streamline keeps from existing ones (d_test).
pub const DEFAULT_SELF_AVOIDANCE: f64 = 0.4;

/// Parameters for a single placement pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TraceConfig {
    /// Integration step length.
    pub step_size: f64,
    /// Maximum number of steps in each direction.
    pub max_steps: usize,
    /// d_sep: offset of candidate seeds and the minimum distance a candidate
    /// must keep from every traced point.
    pub separation_distance: f64,
    /// d_test: minimum distance a newly traced point must keep from other
    /// streamlines.
    pub self_avoidance_distance: f64,
    /// Where the first streamline starts.
    pub initial_seed: Point2,
    /// Keep the accepted candidate seeds and their construction segments.
    pub record_candidates: bool,
    /// Stop seeding once this many streamlines have been accepted.
    pub max_streamlines: Option<usize>,
}

impl Default for TraceConfig {
    fn default() -> Self {
        Self {
            step_size: DEFAULT_STEP_SIZE,
            max_steps: DEFAULT_MAX_STEPS,
            separation_distance: DEFAULT_SEPARATION,
            self_avoidance_distance: DEFAULT_SELF_AVOIDANCE,
            initial_seed: DVec2::ZERO,
            record_candidates: false,
            max_streamlines: None,
        }
    }
}

impl TraceConfig {
    /// Reads a config from a JSON object, using defaults for missing or
    /// mistyped keys. The result is not validated.
    pub fn from_json(params: &Value) -> Self {
        let d = Self::default();
        Self {
            step_size: param_f64(params, "step_size", d.step_size),
            max_steps: param_usize(params, "max_steps", d.max_steps),
            separation_distance: param_f64(params, "separation_distance", d.separation_distance),
            self_avoidance_distance: param_f64(
                params,
                "self_avoidance_distance",
                d.self_avoidance_distance,
            ),
            initial_seed: param_point(params, "initial_seed", d.initial_seed),
            record_candidates: param_bool(params, "record_candidates", d.record_candidates),
            max_streamlines: param_opt_usize(params, "max_streamlines"),
        }
    }

    /// Sets d_sep to `d` and d_test to half of it.
    pub fn with_separation(mut self, d: f64) -> Self {
        self.separation_distance = d;
        self.self_avoidance_distance = d / 2.0;
        self
    }

    /// Checks every value is usable. The first offending field is reported.
    pub fn validate(&self) -> Result<(), FlowError> {
        let positive = |name: &str, v: f64| {
            if v.is_finite() && v > 0.0 {
                Ok(())
            } else {
                Err(invalid(name, format!("must be positive and finite, got {v}")))
            }
        };
        positive("step_size", self.step_size)?;
        positive("separation_distance", self.separation_distance)?;
        positive("self_avoidance_distance", self.self_avoidance_distance)?;
        if self.max_steps == 0 {
            return Err(invalid("max_steps", "must be at least 1".into()));
        }
        if self.self_avoidance_distance > self.separation_distance {
            return Err(invalid(
                "self_avoidance_distance",
                format!(
                    "{} exceeds separation_distance {}",
                    self.self_avoidance_distance, self.separation_distance
                ),
            ));
        }
        if !self.initial_seed.is_finite() {
            return Err(invalid("initial_seed", "must be finite".into()));
        }
        if self.max_streamlines == Some(0) {
            return Err(invalid("max_streamlines", "must be at least 1".into()));
        }
        Ok(())
    }
}

fn invalid(name: &str, reason: String) -> FlowError {
    FlowError::InvalidConfig {
        name: name.to_owned(),
        reason,
    }
}
