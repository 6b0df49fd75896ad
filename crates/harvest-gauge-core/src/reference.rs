use serde::{Deserialize, Serialize};

/// Physical size of the reference object visible in the photo.
///
/// Defaults to an ISO/IEC 7810 ID-1 card (credit/bank card).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct ReferenceCard {
    /// Length of the long edge in millimeters.
    pub width_mm: f64,
    /// Length of the short edge in millimeters.
    pub height_mm: f64,
}

impl ReferenceCard {
    pub const ID1: Self = Self {
        width_mm: 85.60,
        height_mm: 53.98,
    };

    /// Long side over short side (`≈ 1.586` for ID-1).
    #[inline]
    pub fn aspect_ratio(&self) -> f64 {
        let long = self.width_mm.max(self.height_mm);
        let short = self.width_mm.min(self.height_mm);
        long / short
    }

    pub fn is_valid(&self) -> bool {
        self.width_mm.is_finite()
            && self.height_mm.is_finite()
            && self.width_mm > 0.0
            && self.height_mm > 0.0
    }
}

impl Default for ReferenceCard {
    fn default() -> Self {
        Self::ID1
    }
}
