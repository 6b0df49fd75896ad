//! Thresholds injected into the measurement pipeline.

use crate::MeasureError;
use harvest_gauge_core::ReferenceCard;
use serde::{Deserialize, Serialize};

/// Stage boundaries on the average leaf length, in centimeters.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MaturityThresholds {
    /// Lower bound (inclusive) of `INTERMEDIATE`.
    pub l1_cm: f64,
    /// Lower bound (inclusive) of `MATURE`.
    pub l2_cm: f64,
}

impl Default for MaturityThresholds {
    fn default() -> Self {
        Self {
            l1_cm: 18.0,
            l2_cm: 25.0,
        }
    }
}

/// Leaf-count and spread requirements for each confidence level.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConfidenceThresholds {
    pub high_min_leaves: usize,
    /// `HIGH` requires `std_dev < high_max_std_cm`.
    pub high_max_std_cm: f64,
    pub medium_min_leaves: usize,
    /// `MEDIUM` requires `std_dev < medium_max_std_cm`.
    pub medium_max_std_cm: f64,
}

impl Default for ConfidenceThresholds {
    fn default() -> Self {
        Self {
            high_min_leaves: 3,
            high_max_std_cm: 2.0,
            medium_min_leaves: 2,
            medium_max_std_cm: 4.0,
        }
    }
}

/// Accepted number of leaves per request and points per leaf.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct LeafLimits {
    pub min_leaves: usize,
    pub max_leaves: usize,
    pub min_points: usize,
    pub max_points: usize,
}

impl LeafLimits {
    pub const DEFAULT: Self = Self {
        min_leaves: 1,
        max_leaves: 3,
        min_points: 3,
        max_points: 4,
    };
}

/// Everything the measurement stage needs besides the per-request inputs.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MeasurementConfig {
    pub card: ReferenceCard,
    pub maturity: MaturityThresholds,
    pub confidence: ConfidenceThresholds,
}

impl MeasurementConfig {
    pub fn validate(&self) -> Result<(), MeasureError> {
        if !self.card.is_valid() {
            return Err(MeasureError::InvalidConfig(
                "card dimensions must be positive and finite",
            ));
        }

        let m = &self.maturity;
        if !(m.l1_cm.is_finite() && m.l2_cm.is_finite() && m.l1_cm > 0.0 && m.l1_cm < m.l2_cm) {
            return Err(MeasureError::InvalidConfig(
                "maturity thresholds must satisfy 0 < l1_cm < l2_cm",
            ));
        }

        let c = &self.confidence;
        if !(c.high_max_std_cm > 0.0 && c.medium_max_std_cm > 0.0) {
            return Err(MeasureError::InvalidConfig(
                "confidence spread limits must be positive",
            ));
        }
        if c.high_min_leaves < c.medium_min_leaves || c.high_max_std_cm > c.medium_max_std_cm {
            return Err(MeasureError::InvalidConfig(
                "HIGH confidence must be at least as strict as MEDIUM",
            ));
        }

        Ok(())
    }
}
