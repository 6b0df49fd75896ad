use crate::{ConfidenceThresholds, LeafLimits, MeasurementConfig};
use harvest_gauge_core::ReferenceCard;
use serde::Serialize;

/// Human-readable band per stage.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct StageRules {
    pub not_mature: String,
    pub intermediate: String,
    pub mature: String,
}

/// Answer to the rules query, generated from the active [`MeasurementConfig`].
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MaturityRules {
    #[serde(rename = "L1")]
    pub l1: f64,
    #[serde(rename = "L2")]
    pub l2: f64,
    pub rules: StageRules,
    pub reference_card: ReferenceCard,
    pub confidence: ConfidenceThresholds,
    pub leaf_limits: LeafLimits,
}

impl MeasurementConfig {
    pub fn rules(&self) -> MaturityRules {
        let l1 = self.maturity.l1_cm;
        let l2 = self.maturity.l2_cm;
        MaturityRules {
            l1,
            l2,
            rules: StageRules {
                not_mature: format!("< {} cm", fmt_cm(l1)),
                intermediate: format!("{} - {} cm", fmt_cm(l1), fmt_cm(l2)),
                mature: format!(">= {} cm", fmt_cm(l2)),
            },
            reference_card: self.card,
            confidence: self.confidence,
            leaf_limits: LeafLimits::DEFAULT,
        }
    }
}

/// Whole numbers keep one decimal (`18.0`), everything else prints as is.
fn fmt_cm(v: f64) -> String {
    if v.fract() == 0.0 {
        format!("{v:.1}")
    } else {
        v.to_string()
    }
}
