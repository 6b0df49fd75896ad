//! Reference-card detector.
//!
//! Pipeline: optional downscale -> Gaussian blur -> Canny edges -> dilation
//! -> outer border following -> Douglas-Peucker to quadrilaterals -> line-fit
//! corner refinement -> area and aspect-ratio gating against a landscape ID-1
//! card. The best match is reported with a confidence in `[0, 1]`.
//!
//! "Card not found" is an ordinary outcome, not an error: [`CardDetection::NotFound`]
//! carries a message the caller can show before falling back to manual corners.

mod candidate;
mod detector;
mod params;

pub use candidate::CardCandidate;
pub use detector::{CardDetection, CardDetector, CARD_NOT_FOUND_MESSAGE};
pub use params::CardDetectorParams;
