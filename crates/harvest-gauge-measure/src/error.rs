use harvest_gauge_core::GeometryError;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum MeasureError {
    #[error("expected between {min} and {max} leaves, got {got}")]
    InvalidLeafCount { min: usize, max: usize, got: usize },

    #[error("a leaf polyline needs between {min} and {max} points, got {got}")]
    InvalidPolyline { min: usize, max: usize, got: usize },

    #[error("leaf length must be a finite, positive number of centimeters (got {0})")]
    InvalidLength(f64),

    #[error("card top edge is {width_px:.3} px wide; cannot derive a scale")]
    Calibration { width_px: f64 },

    #[error("invalid measurement config: {0}")]
    InvalidConfig(&'static str),

    #[error(transparent)]
    Geometry(#[from] GeometryError),
}
