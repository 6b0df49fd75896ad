//! Request and response shapes of the boundary operations.
//!
//! Points travel as `{"x": .., "y": ..}` objects in image pixel coordinates.

use crate::card::CardDetection;
use crate::core::{Point, Quadrilateral};
use crate::measure::{straight_trace, ConfidenceStatus, MaturityAssessment, MaturityStage};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct WirePoint {
    pub x: f64,
    pub y: f64,
}

impl From<WirePoint> for Point {
    fn from(p: WirePoint) -> Self {
        Point::new(p.x, p.y)
    }
}

impl From<Point> for WirePoint {
    fn from(p: Point) -> Self {
        Self { x: p.x, y: p.y }
    }
}

pub(crate) fn to_points(points: &[WirePoint]) -> Vec<Point> {
    points.iter().copied().map(Point::from).collect()
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DetectCardResponse {
    pub success: bool,
    /// `[TL, TR, BR, BL]` when `success`.
    pub card_corners: Option<[WirePoint; 4]>,
    pub confidence: Option<f64>,
    pub message: String,
}

impl From<&CardDetection> for DetectCardResponse {
    fn from(det: &CardDetection) -> Self {
        Self {
            success: det.is_found(),
            card_corners: det
                .corners()
                .map(|q: &Quadrilateral| q.corners().map(WirePoint::from)),
            confidence: det.confidence(),
            message: det.message().to_string(),
        }
    }
}

/// One leaf, base first: a traced `points` path or a straight `base`/`tip` pair.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum LeafMarks {
    Traced { points: Vec<WirePoint> },
    Straight { base: WirePoint, tip: WirePoint },
}

impl LeafMarks {
    /// Points of the polyline to measure. A straight leaf runs through its midpoint.
    pub fn trace(&self) -> Vec<Point> {
        match self {
            Self::Traced { points } => to_points(points),
            Self::Straight { base, tip } => straight_trace((*base).into(), (*tip).into()).to_vec(),
        }
    }
}

/// Everything measure-leaves needs besides the image bytes.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MeasureLeavesInput {
    /// Four card corners in any order.
    pub card_corners: Vec<WirePoint>,
    pub leaves: Vec<LeafMarks>,
    /// When present, all other coordinates refer to the rectified crop.
    #[serde(default)]
    pub crop: Option<Vec<WirePoint>>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MeasureLeavesResponse {
    pub leaf_lengths_cm: Vec<f64>,
    pub avg_leaf_length_cm: f64,
    pub stage: MaturityStage,
    pub confidence_status: ConfidenceStatus,
    pub retake_message: Option<String>,
}

impl From<&MaturityAssessment> for MeasureLeavesResponse {
    fn from(a: &MaturityAssessment) -> Self {
        Self {
            leaf_lengths_cm: a.leaf_lengths_cm.clone(),
            avg_leaf_length_cm: a.avg_length_cm,
            stage: a.stage,
            confidence_status: a.confidence_status,
            retake_message: a.retake_message.clone(),
        }
    }
}
