//! The boundary operations: detect card, measure leaves, rules.

use crate::card::{CardDetection, CardDetector};
use crate::core::{
    order_corners, rectified_size, rectify_quad, GeometryError, GrayImageView, Point,
    Quadrilateral,
};
use crate::io::{
    to_points, DetectCardResponse, LeafMarks, MeasureLeavesInput, MeasureLeavesResponse, WirePoint,
};
use crate::measure::{LeafPolyline, MaturityAssessment, MaturityRules, MeasurementSession};
use crate::{decode_gray, HarvestConfig, HarvestError};
use image::GrayImage;
use log::{debug, info};

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Convert an `image::GrayImage` into the lightweight core view type.
pub fn gray_view(img: &GrayImage) -> GrayImageView<'_> {
    GrayImageView {
        width: img.width() as usize,
        height: img.height() as usize,
        data: img.as_raw(),
    }
}

fn into_image(out: crate::core::GrayImage) -> Result<GrayImage, HarvestError> {
    let width = u32::try_from(out.width).map_err(|e| HarvestError::Processing(e.to_string()))?;
    let height = u32::try_from(out.height).map_err(|e| HarvestError::Processing(e.to_string()))?;
    GrayImage::from_raw(width, height, out.data).ok_or_else(|| {
        HarvestError::Processing(format!("rectified buffer does not match {width}x{height}"))
    })
}

/// Points use continuous coordinates, so the far edges `x == width`, `y == height` are inside.
fn check_in_frame(
    what: &'static str,
    points: &[Point],
    (width, height): (u32, u32),
) -> Result<(), HarvestError> {
    for p in points {
        if !(p.x.is_finite() && p.y.is_finite()) {
            return Err(GeometryError::NonFinite.into());
        }
        if p.x < 0.0 || p.y < 0.0 || p.x > width as f64 || p.y > height as f64 {
            return Err(HarvestError::PointOutOfFrame {
                what,
                x: p.x,
                y: p.y,
                width,
                height,
            });
        }
    }
    Ok(())
}

fn order_in_frame(
    what: &'static str,
    raw: &[WirePoint],
    frame: (u32, u32),
) -> Result<Quadrilateral, HarvestError> {
    let quad = order_corners(&to_points(raw))?;
    check_in_frame(what, quad.corners(), frame)?;
    Ok(quad)
}

/// Stateless per call; share one instance across threads.
#[derive(Clone, Debug)]
pub struct HarvestPipeline {
    config: HarvestConfig,
    detector: CardDetector,
}

impl HarvestPipeline {
    pub fn new(config: HarvestConfig) -> Result<Self, HarvestError> {
        config.validate()?;
        let detector = CardDetector::new(config.detector.clone());
        Ok(Self { config, detector })
    }

    pub fn config(&self) -> &HarvestConfig {
        &self.config
    }

    /// Validate and decode an upload.
    pub fn decode(&self, image_bytes: &[u8]) -> Result<GrayImage, HarvestError> {
        decode_gray(image_bytes, &self.config.upload)
    }

    /// Perspective-corrected view of `quad`.
    pub fn rectify(&self, img: &GrayImage, quad: &Quadrilateral) -> Result<GrayImage, HarvestError> {
        let rect = rectify_quad(&gray_view(img), quad)?;
        into_image(rect.image)
    }

    /// The optional crop applied: the rectified crop, or the image itself.
    pub fn prepare_frame(
        &self,
        img: GrayImage,
        crop: Option<&[WirePoint]>,
    ) -> Result<GrayImage, HarvestError> {
        match crop {
            None => Ok(img),
            Some(raw) => {
                let quad = order_in_frame("crop", raw, img.dimensions())?;
                let out = self.rectify(&img, &quad)?;
                debug!("cropped to {}x{}", out.width(), out.height());
                Ok(out)
            }
        }
    }

    /// Run the card detector on an already decoded frame.
    pub fn detect_in(&self, frame: &GrayImage) -> CardDetection {
        self.detector.detect(frame)
    }

    /// Detect-card boundary operation. "Not found" is a successful call.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip_all, fields(bytes = image_bytes.len(), crop = crop.is_some()))
    )]
    pub fn detect_card(
        &self,
        image_bytes: &[u8],
        crop: Option<&[WirePoint]>,
    ) -> Result<DetectCardResponse, HarvestError> {
        let img = self.decode(image_bytes)?;
        let frame = self.prepare_frame(img, crop)?;
        let detection = self.detect_in(&frame);
        Ok(DetectCardResponse::from(&detection))
    }

    /// Measure-leaves boundary operation.
    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip_all, fields(bytes = image_bytes.len(), leaves = input.leaves.len()))
    )]
    pub fn measure_leaves(
        &self,
        image_bytes: &[u8],
        input: &MeasureLeavesInput,
    ) -> Result<MeasureLeavesResponse, HarvestError> {
        let img = self.decode(image_bytes)?;
        let frame = match input.crop.as_deref() {
            None => img.dimensions(),
            Some(raw) => {
                let quad = order_in_frame("crop", raw, img.dimensions())?;
                let (w, h) = rectified_size(&quad);
                let w = u32::try_from(w).map_err(|e| HarvestError::Processing(e.to_string()))?;
                let h = u32::try_from(h).map_err(|e| HarvestError::Processing(e.to_string()))?;
                (w, h)
            }
        };

        let leaves: Vec<Vec<Point>> = input.leaves.iter().map(LeafMarks::trace).collect();
        let card = to_points(&input.card_corners);
        let assessment = self.assess_frame(frame, &card, &leaves)?;
        Ok(MeasureLeavesResponse::from(&assessment))
    }

    /// Calibrate on `card_corners`, measure every leaf and classify.
    ///
    /// All points must lie inside a frame of size `frame`.
    pub fn assess_frame(
        &self,
        frame: (u32, u32),
        card_corners: &[Point],
        leaves: &[Vec<Point>],
    ) -> Result<MaturityAssessment, HarvestError> {
        let card = order_corners(card_corners)?;
        check_in_frame("card corner", card.corners(), frame)?;

        let polylines = leaves
            .iter()
            .map(|pts| {
                check_in_frame("leaf", pts, frame)?;
                Ok(LeafPolyline::new(pts.clone())?)
            })
            .collect::<Result<Vec<_>, HarvestError>>()?;

        let cfg = &self.config.measurement;
        let session = MeasurementSession::measure(card, &polylines, cfg)?;
        let assessment = session.assess(cfg)?;
        info!(
            "measured {} leaves at {:.3} px/mm: avg {:.2} cm",
            session.leaves.len(),
            session.calibration.pixels_per_mm,
            assessment.avg_length_cm
        );
        Ok(assessment)
    }

    /// Rules query, generated from the active thresholds.
    pub fn rules(&self) -> MaturityRules {
        self.config.measurement.rules()
    }
}
