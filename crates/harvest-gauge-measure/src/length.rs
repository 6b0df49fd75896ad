use crate::{CalibrationResult, LeafLimits, MeasureError};
use harvest_gauge_core::{distance, GeometryError, Point};
use serde::{Deserialize, Serialize};

/// User-marked path along one leaf, base first and tip last.
///
/// Holds 3 or 4 finite points with no zero-length segment.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Vec<Point>", into = "Vec<Point>")]
pub struct LeafPolyline {
    points: Vec<Point>,
}

/// `[base, midpoint, tip]`: a straight leaf as a trace of the same length.
pub fn straight_trace(base: Point, tip: Point) -> [Point; 3] {
    let mid = Point::from((base.coords + tip.coords) * 0.5);
    [base, mid, tip]
}

impl LeafPolyline {
    /// Straight base-to-tip leaf.
    pub fn straight(base: Point, tip: Point) -> Result<Self, MeasureError> {
        Self::new(straight_trace(base, tip).to_vec())
    }

    pub fn new(points: Vec<Point>) -> Result<Self, MeasureError> {
        let limits = LeafLimits::DEFAULT;
        if points.len() < limits.min_points || points.len() > limits.max_points {
            return Err(MeasureError::InvalidPolyline {
                min: limits.min_points,
                max: limits.max_points,
                got: points.len(),
            });
        }
        if points.iter().any(|p| !(p.x.is_finite() && p.y.is_finite())) {
            return Err(GeometryError::NonFinite.into());
        }
        if points.windows(2).any(|w| distance(w[0], w[1]) == 0.0) {
            return Err(GeometryError::DegenerateGeometry("consecutive leaf points coincide").into());
        }
        Ok(Self { points })
    }

    pub fn points(&self) -> &[Point] {
        &self.points
    }

    pub fn base(&self) -> Point {
        self.points[0]
    }

    pub fn tip(&self) -> Point {
        self.points[self.points.len() - 1]
    }

    /// Sum of segment lengths in pixels.
    pub fn length_px(&self) -> f64 {
        self.points.windows(2).map(|w| distance(w[0], w[1])).sum()
    }
}

impl TryFrom<Vec<Point>> for LeafPolyline {
    type Error = MeasureError;

    fn try_from(points: Vec<Point>) -> Result<Self, Self::Error> {
        Self::new(points)
    }
}

impl From<LeafPolyline> for Vec<Point> {
    fn from(p: LeafPolyline) -> Self {
        p.points
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LeafMeasurement {
    pub polyline: LeafPolyline,
    pub length_px: f64,
    pub length_mm: f64,
}

impl LeafMeasurement {
    #[inline]
    pub fn length_cm(&self) -> f64 {
        self.length_mm / 10.0
    }
}

pub fn measure_leaf(polyline: &LeafPolyline, calibration: &CalibrationResult) -> LeafMeasurement {
    let length_px = polyline.length_px();
    LeafMeasurement {
        polyline: polyline.clone(),
        length_px,
        length_mm: calibration.px_to_mm(length_px),
    }
}
