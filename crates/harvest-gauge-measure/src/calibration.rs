use crate::MeasureError;
use harvest_gauge_core::{Quadrilateral, ReferenceCard};
use log::{debug, warn};
use serde::{Deserialize, Serialize};

/// A card whose top edge is shorter than this cannot produce a usable scale.
pub const MIN_CARD_WIDTH_PX: f64 = 1.0;

/// Image scale derived from the reference card.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct CalibrationResult {
    pub pixels_per_mm: f64,
    pub reference_width_mm: f64,
}

impl CalibrationResult {
    #[inline]
    pub fn px_to_mm(&self, px: f64) -> f64 {
        px / self.pixels_per_mm
    }
}

/// Scale from the card's top edge (`TL -> TR`) and its physical width.
pub fn calibrate(
    card_quad: &Quadrilateral,
    card: &ReferenceCard,
) -> Result<CalibrationResult, MeasureError> {
    if !card.is_valid() {
        return Err(MeasureError::InvalidConfig(
            "card dimensions must be positive and finite",
        ));
    }

    let width_px = card_quad.top_edge();
    if !(width_px >= MIN_CARD_WIDTH_PX) {
        return Err(MeasureError::Calibration { width_px });
    }

    if width_px < card_quad.left_edge().max(card_quad.right_edge()) {
        warn!("card top edge ({width_px:.1} px) is its short side; scale assumes a landscape card");
    }

    let pixels_per_mm = width_px / card.width_mm;
    debug!("card top edge {width_px:.2} px -> {pixels_per_mm:.4} px/mm");

    Ok(CalibrationResult {
        pixels_per_mm,
        reference_width_mm: card.width_mm,
    })
}
