//! High-level facade for the `harvest-gauge-*` workspace.
//!
//! Measure leaves in a photo that also shows a credit-card sized reference
//! object, and turn 1 to 3 measurements into a harvest maturity verdict.
//!
//! ## Quickstart
//!
//! ```no_run
//! use harvest_gauge::{HarvestConfig, HarvestPipeline, LeafMarks, MeasureLeavesInput, WirePoint};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let pipeline = HarvestPipeline::new(HarvestConfig::default())?;
//! let bytes = std::fs::read("plant.jpg")?;
//!
//! let detection = pipeline.detect_card(&bytes, None)?;
//! let Some(card_corners) = detection.card_corners else {
//!     println!("{}", detection.message);
//!     return Ok(());
//! };
//!
//! let p = |x, y| WirePoint { x, y };
//! let input = MeasureLeavesInput {
//!     card_corners: card_corners.to_vec(),
//!     leaves: vec![LeafMarks::Traced { points: vec![p(150.0, 150.0), p(160.0, 300.0), p(150.0, 420.0)] }],
//!     crop: None,
//! };
//! let result = pipeline.measure_leaves(&bytes, &input)?;
//! println!("{:?} ({:?})", result.stage, result.confidence_status);
//! # Ok(())
//! # }
//! ```
//!
//! ## API map
//! - `harvest_gauge::core`: points, quadrilaterals, corner ordering, homographies, rectification.
//! - `harvest_gauge::card`: reference-card detection on `image::GrayImage`.
//! - `harvest_gauge::measure`: calibration, leaf lengths, confidence, maturity, rules.
//! - [`HarvestPipeline`]: the detect-card, measure-leaves and rules operations over raw uploads.

pub use harvest_gauge_card as card;
pub use harvest_gauge_core as core;
pub use harvest_gauge_measure as measure;

pub use harvest_gauge_card::{CardDetection, CardDetector, CardDetectorParams};
pub use harvest_gauge_core::{order_corners, Point, Quadrilateral, ReferenceCard};
pub use harvest_gauge_measure::{
    assess_lengths, ConfidenceStatus, MaturityAssessment, MaturityRules, MaturityStage,
    MeasurementConfig,
};

mod config;
mod error;
mod io;
mod pipeline;
mod upload;

pub use config::{ConfigIoError, HarvestConfig};
pub use error::{ErrorKind, HarvestError};
pub use io::{DetectCardResponse, LeafMarks, MeasureLeavesInput, MeasureLeavesResponse, WirePoint};
pub use pipeline::{gray_view, HarvestPipeline};
pub use upload::{decode_gray, validate_upload, UploadFormat, UploadLimits};
