use crate::ConfidenceThresholds;
use serde::{Deserialize, Serialize};

const RETAKE_TIPS: &str = "Lay the reference card completely flat, keep all four card corners \
     visible in the frame, use even lighting without strong shadows, and measure at least 3 leaves.";

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ConfidenceStatus {
    High,
    Medium,
    Low,
}

impl ConfidenceStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::High => "HIGH",
            Self::Medium => "MEDIUM",
            Self::Low => "LOW",
        }
    }
}

/// Summary of a set of leaf lengths; `std_dev_cm` is the population deviation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct LengthStats {
    pub count: usize,
    pub mean_cm: f64,
    pub min_cm: f64,
    pub max_cm: f64,
    pub std_dev_cm: f64,
}

impl LengthStats {
    /// `None` for an empty slice.
    pub fn from_lengths(lengths_cm: &[f64]) -> Option<Self> {
        if lengths_cm.is_empty() {
            return None;
        }
        let n = lengths_cm.len() as f64;
        let mean = lengths_cm.iter().sum::<f64>() / n;
        let var = lengths_cm.iter().map(|l| (l - mean).powi(2)).sum::<f64>() / n;
        let (min, max) = lengths_cm
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &l| {
                (lo.min(l), hi.max(l))
            });

        Some(Self {
            count: lengths_cm.len(),
            mean_cm: mean,
            min_cm: min,
            max_cm: max,
            std_dev_cm: var.sqrt(),
        })
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ConfidenceVerdict {
    pub status: ConfidenceStatus,
    /// Present exactly when `status` is `LOW`.
    pub retake_message: Option<String>,
}

pub fn evaluate_confidence(
    stats: &LengthStats,
    thresholds: &ConfidenceThresholds,
) -> ConfidenceVerdict {
    let status = if stats.count >= thresholds.high_min_leaves
        && stats.std_dev_cm < thresholds.high_max_std_cm
    {
        ConfidenceStatus::High
    } else if stats.count >= thresholds.medium_min_leaves
        && stats.std_dev_cm < thresholds.medium_max_std_cm
    {
        ConfidenceStatus::Medium
    } else {
        ConfidenceStatus::Low
    };

    let retake_message = (status == ConfidenceStatus::Low).then(|| {
        if stats.count < thresholds.medium_min_leaves {
            let noun = if stats.count == 1 { "leaf" } else { "leaves" };
            format!(
                "Only {} {noun} measured, too few for a reliable estimate. {RETAKE_TIPS}",
                stats.count
            )
        } else {
            format!(
                "Measurements vary too much (standard deviation {:.1} cm). {RETAKE_TIPS}",
                stats.std_dev_cm
            )
        }
    });

    ConfidenceVerdict {
        status,
        retake_message,
    }
}
