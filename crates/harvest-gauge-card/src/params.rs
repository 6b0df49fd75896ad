use harvest_gauge_core::ReferenceCard;
use serde::{Deserialize, Serialize};

/// Configuration for [`CardDetector`](crate::CardDetector).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardDetectorParams {
    /// Physical card; only its aspect ratio matters for detection.
    pub card: ReferenceCard,
    /// Longest image side used for detection. Larger inputs are downscaled
    /// and the corners mapped back. `None` disables downscaling.
    pub max_image_side: Option<u32>,
    /// Pre-blur sigma in pixels; `0` disables the extra blur.
    pub blur_sigma: f32,
    /// Canny hysteresis thresholds on gradient magnitude.
    pub canny_low: f32,
    pub canny_high: f32,
    /// Edge dilation radius (L-inf) used to close small gaps in the outline.
    pub dilate_radius: u8,
    /// Only the largest `max_candidates` outer contours are examined.
    pub max_candidates: usize,
    /// Douglas-Peucker tolerance as a fraction of the contour perimeter.
    pub approx_epsilon_frac: f64,
    /// Reject quads smaller than this fraction of the image area.
    pub min_area_frac: f64,
    /// Accept `|ratio - target| / target <= aspect_tolerance`.
    pub aspect_tolerance: f64,
}

impl Default for CardDetectorParams {
    fn default() -> Self {
        Self {
            card: ReferenceCard::ID1,
            max_image_side: Some(1280),
            blur_sigma: 1.0,
            canny_low: 50.0,
            canny_high: 150.0,
            dilate_radius: 1,
            max_candidates: 10,
            approx_epsilon_frac: 0.02,
            min_area_frac: 0.01,
            aspect_tolerance: 0.20,
        }
    }
}
