//! Rule-based harvest readiness score and recommended action.

use crate::LengthStats;
use serde::{Deserialize, Serialize};

/// `(min average length in cm, base score, action)`, highest band first.
const BANDS: [(f64, u8, &str); 5] = [
    (30.0, 95, "Harvest Now - Optimal Time"),
    (25.0, 85, "Harvest Now - Optimal Time"),
    (20.0, 70, "Wait 2-3 Weeks"),
    (15.0, 50, "Wait 4-6 Weeks"),
    (f64::NEG_INFINITY, 30, "Wait 8-12 Weeks"),
];

const CONSISTENT_STD_CM: f64 = 2.0;
const SCATTERED_STD_CM: f64 = 5.0;

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct HarvestAdvice {
    /// 0 to 100.
    pub readiness_score: u8,
    pub recommended_action: String,
}

impl HarvestAdvice {
    pub fn from_stats(stats: &LengthStats) -> Self {
        let (_, base, action) = BANDS
            .iter()
            .copied()
            .find(|(min, _, _)| stats.mean_cm >= *min)
            .unwrap_or(BANDS[BANDS.len() - 1]);

        let score = if stats.std_dev_cm < CONSISTENT_STD_CM {
            base.saturating_add(5).min(100)
        } else if stats.std_dev_cm > SCATTERED_STD_CM {
            base.saturating_sub(10)
        } else {
            base
        };

        Self {
            readiness_score: score,
            recommended_action: action.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn stats(mean_cm: f64, std_dev_cm: f64) -> LengthStats {
        LengthStats {
            count: 3,
            mean_cm,
            min_cm: mean_cm,
            max_cm: mean_cm,
            std_dev_cm,
        }
    }

    #[test]
    fn bands_follow_average_length() {
        let a = HarvestAdvice::from_stats(&stats(31.0, 3.0));
        assert_eq!(a.readiness_score, 95);
        assert_eq!(a.recommended_action, "Harvest Now - Optimal Time");

        assert_eq!(HarvestAdvice::from_stats(&stats(25.0, 3.0)).readiness_score, 85);
        assert_eq!(
            HarvestAdvice::from_stats(&stats(21.0, 3.0)).recommended_action,
            "Wait 2-3 Weeks"
        );
        assert_eq!(HarvestAdvice::from_stats(&stats(15.0, 3.0)).readiness_score, 50);
        let young = HarvestAdvice::from_stats(&stats(5.0, 3.0));
        assert_eq!(young.readiness_score, 30);
        assert_eq!(young.recommended_action, "Wait 8-12 Weeks");
    }

    #[test]
    fn spread_adjusts_the_score() {
        assert_eq!(HarvestAdvice::from_stats(&stats(31.0, 0.5)).readiness_score, 100);
        assert_eq!(HarvestAdvice::from_stats(&stats(21.0, 6.0)).readiness_score, 60);
        assert_eq!(HarvestAdvice::from_stats(&stats(21.0, 5.0)).readiness_score, 70);
    }
}
