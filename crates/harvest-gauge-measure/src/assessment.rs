use crate::{
    calibrate, evaluate_confidence, measure_leaf, CalibrationResult, ConfidenceStatus,
    HarvestAdvice, LeafLimits, LeafMeasurement, LeafPolyline, LengthStats, MaturityStage,
    MeasureError, MeasurementConfig,
};
use harvest_gauge_core::Quadrilateral;
use log::info;
use serde::Serialize;

#[cfg(feature = "tracing")]
use tracing::instrument;

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MaturityAssessment {
    pub leaf_lengths_cm: Vec<f64>,
    pub avg_length_cm: f64,
    pub stage: MaturityStage,
    pub confidence_status: ConfidenceStatus,
    pub retake_message: Option<String>,
    pub stats: LengthStats,
    pub advice: HarvestAdvice,
}

fn check_leaf_count(got: usize) -> Result<(), MeasureError> {
    let limits = LeafLimits::DEFAULT;
    if got < limits.min_leaves || got > limits.max_leaves {
        return Err(MeasureError::InvalidLeafCount {
            min: limits.min_leaves,
            max: limits.max_leaves,
            got,
        });
    }
    Ok(())
}

/// Classify 1 to 3 leaf lengths given directly in centimeters.
pub fn assess_lengths(
    lengths_cm: &[f64],
    config: &MeasurementConfig,
) -> Result<MaturityAssessment, MeasureError> {
    check_leaf_count(lengths_cm.len())?;
    if let Some(&bad) = lengths_cm.iter().find(|l| !(l.is_finite() && **l > 0.0)) {
        return Err(MeasureError::InvalidLength(bad));
    }

    let stats = LengthStats::from_lengths(lengths_cm).ok_or(MeasureError::InvalidLeafCount {
        min: LeafLimits::DEFAULT.min_leaves,
        max: LeafLimits::DEFAULT.max_leaves,
        got: 0,
    })?;
    let verdict = evaluate_confidence(&stats, &config.confidence);
    let stage = config.maturity.classify(stats.mean_cm);

    info!(
        "{} leaves, mean {:.2} cm, std {:.2} cm -> {} / {}",
        stats.count,
        stats.mean_cm,
        stats.std_dev_cm,
        stage.as_str(),
        verdict.status.as_str()
    );

    Ok(MaturityAssessment {
        leaf_lengths_cm: lengths_cm.to_vec(),
        avg_length_cm: stats.mean_cm,
        stage,
        confidence_status: verdict.status,
        retake_message: verdict.retake_message,
        advice: HarvestAdvice::from_stats(&stats),
        stats,
    })
}

/// One card plus the leaves measured against it.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MeasurementSession {
    pub card_quad: Quadrilateral,
    pub calibration: CalibrationResult,
    pub leaves: Vec<LeafMeasurement>,
}

impl MeasurementSession {
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip_all, fields(leaves = polylines.len()))
    )]
    pub fn measure(
        card_quad: Quadrilateral,
        polylines: &[LeafPolyline],
        config: &MeasurementConfig,
    ) -> Result<Self, MeasureError> {
        check_leaf_count(polylines.len())?;
        let calibration = calibrate(&card_quad, &config.card)?;
        let leaves = polylines
            .iter()
            .map(|p| measure_leaf(p, &calibration))
            .collect();

        Ok(Self {
            card_quad,
            calibration,
            leaves,
        })
    }

    pub fn lengths_cm(&self) -> Vec<f64> {
        self.leaves.iter().map(LeafMeasurement::length_cm).collect()
    }

    pub fn assess(&self, config: &MeasurementConfig) -> Result<MaturityAssessment, MeasureError> {
        assess_lengths(&self.lengths_cm(), config)
    }
}
