//! From a reference card and user-marked leaf paths to a maturity verdict.
//!
//! 1. [`calibrate`] turns the card's top edge into a pixels-per-millimeter scale.
//! 2. [`measure_leaf`] sums a [`LeafPolyline`] and converts it to millimeters.
//! 3. [`assess_lengths`] combines 1 to 3 lengths into a [`MaturityAssessment`]:
//!    a [`MaturityStage`], a [`ConfidenceStatus`] with an optional retake hint,
//!    summary statistics and a [`HarvestAdvice`].
//!
//! All thresholds come from an injected [`MeasurementConfig`]; the same struct
//! produces the [`MaturityRules`] served to clients.

mod advice;
mod assessment;
mod calibration;
mod confidence;
mod config;
mod error;
mod length;
mod maturity;
mod rules;

pub use advice::HarvestAdvice;
pub use assessment::{assess_lengths, MaturityAssessment, MeasurementSession};
pub use calibration::{calibrate, CalibrationResult, MIN_CARD_WIDTH_PX};
pub use confidence::{evaluate_confidence, ConfidenceStatus, ConfidenceVerdict, LengthStats};
pub use config::{ConfidenceThresholds, LeafLimits, MaturityThresholds, MeasurementConfig};
pub use error::MeasureError;
pub use length::{measure_leaf, straight_trace, LeafMeasurement, LeafPolyline};
pub use maturity::MaturityStage;
pub use rules::{MaturityRules, StageRules};
