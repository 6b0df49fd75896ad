use std::borrow::Cow;

use crate::candidate::{approximate_quad, CardCandidate};
use crate::CardDetectorParams;
use harvest_gauge_core::{Point, Quadrilateral};
use image::imageops::{self, FilterType};
use image::GrayImage;
use imageproc::contours::{find_contours, BorderType};
use imageproc::distance_transform::Norm;
use imageproc::edges::canny;
use imageproc::filter::gaussian_blur_f32;
use imageproc::geometry::contour_area;
use imageproc::morphology::dilate;
use log::{debug, info};
use serde::Serialize;

#[cfg(feature = "tracing")]
use tracing::instrument;

/// Shown to the user when no card-like quadrilateral was found.
pub const CARD_NOT_FOUND_MESSAGE: &str = "Unable to detect the reference card automatically. \
     Place the whole card flat in the frame with all four corners visible, \
     or mark the corners manually.";

/// Outcome of [`CardDetector::detect`].
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum CardDetection {
    Found {
        corners: Quadrilateral,
        confidence: f64,
    },
    NotFound {
        message: String,
    },
}

impl CardDetection {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found { .. })
    }

    pub fn corners(&self) -> Option<&Quadrilateral> {
        match self {
            Self::Found { corners, .. } => Some(corners),
            Self::NotFound { .. } => None,
        }
    }

    pub fn confidence(&self) -> Option<f64> {
        match self {
            Self::Found { confidence, .. } => Some(*confidence),
            Self::NotFound { .. } => None,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            Self::Found { .. } => "Card detected",
            Self::NotFound { message } => message,
        }
    }
}

/// Finds an ID-1 shaped quadrilateral in a grayscale photo.
#[derive(Clone, Debug, Default)]
pub struct CardDetector {
    params: CardDetectorParams,
}

impl CardDetector {
    pub fn new(params: CardDetectorParams) -> Self {
        Self { params }
    }

    pub fn params(&self) -> &CardDetectorParams {
        &self.params
    }

    #[cfg_attr(
        feature = "tracing",
        instrument(level = "info", skip(self, img), fields(width = img.width(), height = img.height()))
    )]
    pub fn detect(&self, img: &GrayImage) -> CardDetection {
        match self.candidates(img).into_iter().next() {
            Some(best) => {
                info!(
                    "card found: ratio {:.3}, confidence {:.2}",
                    best.aspect_ratio, best.confidence
                );
                CardDetection::Found {
                    corners: best.corners,
                    confidence: best.confidence,
                }
            }
            None => {
                info!("no card-shaped quadrilateral found");
                CardDetection::NotFound {
                    message: CARD_NOT_FOUND_MESSAGE.to_string(),
                }
            }
        }
    }

    /// Every accepted candidate in input-image coordinates, best first.
    ///
    /// Candidates are ranked by aspect-ratio deviation, ties going to the
    /// larger area.
    pub fn candidates(&self, img: &GrayImage) -> Vec<CardCandidate> {
        let (width, height) = img.dimensions();
        if width < 3 || height < 3 {
            return Vec::new();
        }

        let p = &self.params;
        let (work, sx, sy) = self.working_image(img);
        let edges = self.edge_map(&work);

        let mut outlines: Vec<_> = find_contours::<u32>(&edges)
            .into_iter()
            .filter(|c| c.border_type == BorderType::Outer)
            .map(|c| (contour_area(&c.points), c.points))
            .collect();
        outlines.sort_by(|a, b| b.0.total_cmp(&a.0));
        outlines.truncate(p.max_candidates);
        debug!(
            "examining {} outer contours on a {}x{} edge map",
            outlines.len(),
            edges.width(),
            edges.height()
        );

        let min_area = p.min_area_frac * width as f64 * height as f64;
        let target = p.card.aspect_ratio();
        // The outer contour of the dilated edge map sits this far outside the edge.
        let inset = p.dilate_radius as f64;

        let mut accepted: Vec<CardCandidate> = outlines
            .iter()
            .filter_map(|(_, points)| approximate_quad(points, p.approx_epsilon_frac, inset))
            .map(|quad| quad.map(|q| to_input_frame(q, sx, sy)))
            .filter_map(|quad| CardCandidate::evaluate(quad, target, p.aspect_tolerance, min_area))
            .collect();

        accepted.sort_by(|a, b| {
            a.deviation
                .total_cmp(&b.deviation)
                .then(b.area.total_cmp(&a.area))
        });
        debug!("{} card candidates accepted", accepted.len());
        accepted
    }

    /// Downscale to `max_image_side` if needed; returns the per-axis scale
    /// from input to working coordinates.
    fn working_image<'a>(&self, img: &'a GrayImage) -> (Cow<'a, GrayImage>, f64, f64) {
        let (w, h) = img.dimensions();
        let longest = w.max(h);
        match self.params.max_image_side {
            Some(max_side) if max_side > 0 && longest > max_side => {
                let s = max_side as f64 / longest as f64;
                let nw = ((w as f64 * s).round() as u32).max(1);
                let nh = ((h as f64 * s).round() as u32).max(1);
                debug!("downscaling {w}x{h} to {nw}x{nh} for detection");
                let small = imageops::resize(img, nw, nh, FilterType::Triangle);
                (
                    Cow::Owned(small),
                    nw as f64 / w as f64,
                    nh as f64 / h as f64,
                )
            }
            _ => (Cow::Borrowed(img), 1.0, 1.0),
        }
    }

    fn edge_map(&self, work: &GrayImage) -> GrayImage {
        let p = &self.params;
        let blurred = if p.blur_sigma > 0.0 {
            gaussian_blur_f32(work, p.blur_sigma)
        } else {
            work.clone()
        };
        let (low, high) = (p.canny_low.min(p.canny_high), p.canny_low.max(p.canny_high));
        let edges = canny(&blurred, low, high);
        if p.dilate_radius > 0 {
            dilate(&edges, Norm::LInf, p.dilate_radius)
        } else {
            edges
        }
    }
}

/// Working pixel centers map back to input pixel centers.
fn to_input_frame(p: Point, sx: f64, sy: f64) -> Point {
    Point::new((p.x + 0.5) / sx - 0.5, (p.y + 0.5) / sy - 0.5)
}
