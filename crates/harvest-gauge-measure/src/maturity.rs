use crate::MaturityThresholds;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum MaturityStage {
    NotMature,
    Intermediate,
    Mature,
}

impl MaturityStage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::NotMature => "NOT_MATURE",
            Self::Intermediate => "INTERMEDIATE",
            Self::Mature => "MATURE",
        }
    }
}

impl MaturityThresholds {
    /// Bands are closed below: `[l1, l2)` is intermediate, `[l2, inf)` mature.
    pub fn classify(&self, avg_length_cm: f64) -> MaturityStage {
        if avg_length_cm < self.l1_cm {
            MaturityStage::NotMature
        } else if avg_length_cm < self.l2_cm {
            MaturityStage::Intermediate
        } else {
            MaturityStage::Mature
        }
    }
}
