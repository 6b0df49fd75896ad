use crate::core::{GeometryError, RectifyError};
use crate::measure::MeasureError;
use serde::Serialize;

/// Coarse classification an outer layer can map onto a response status.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// Caller-correctable input problem.
    Validation,
    /// Points that do not describe a usable shape.
    DegenerateGeometry,
    /// Environment-level failure at a library boundary.
    Processing,
}

/// Errors produced by the boundary operations.
#[derive(thiserror::Error, Debug)]
pub enum HarvestError {
    #[error("uploaded image is empty")]
    EmptyUpload,

    #[error("uploaded image is {size} bytes; the limit is {limit} bytes")]
    UploadTooLarge { size: usize, limit: usize },

    #[error("unsupported image format {0}; upload a JPEG or PNG")]
    UnsupportedFormat(String),

    #[error("image could not be decoded: {0}")]
    MalformedImage(String),

    #[error("{what} point ({x:.1}, {y:.1}) lies outside the {width}x{height} frame")]
    PointOutOfFrame {
        what: &'static str,
        x: f64,
        y: f64,
        width: u32,
        height: u32,
    },

    #[error("invalid config: {0}")]
    InvalidConfig(String),

    #[error(transparent)]
    Geometry(#[from] GeometryError),

    #[error(transparent)]
    Rectify(#[from] RectifyError),

    #[error(transparent)]
    Measure(#[from] MeasureError),

    #[error("image processing failed: {0}")]
    Processing(String),
}

fn geometry_kind(err: &GeometryError) -> ErrorKind {
    match err {
        GeometryError::DegenerateGeometry(_) => ErrorKind::DegenerateGeometry,
        GeometryError::WrongPointCount { .. } | GeometryError::NonFinite => ErrorKind::Validation,
    }
}

impl HarvestError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::EmptyUpload
            | Self::UploadTooLarge { .. }
            | Self::UnsupportedFormat(_)
            | Self::MalformedImage(_)
            | Self::PointOutOfFrame { .. }
            | Self::InvalidConfig(_) => ErrorKind::Validation,
            Self::Geometry(e) => geometry_kind(e),
            Self::Rectify(_) => ErrorKind::DegenerateGeometry,
            Self::Measure(e) => match e {
                MeasureError::Geometry(g) => geometry_kind(g),
                MeasureError::Calibration { .. } => ErrorKind::DegenerateGeometry,
                MeasureError::InvalidLeafCount { .. }
                | MeasureError::InvalidPolyline { .. }
                | MeasureError::InvalidLength(_)
                | MeasureError::InvalidConfig(_) => ErrorKind::Validation,
            },
            Self::Processing(_) => ErrorKind::Processing,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_follow_the_taxonomy() {
        assert_eq!(HarvestError::EmptyUpload.kind(), ErrorKind::Validation);
        assert_eq!(
            HarvestError::from(GeometryError::DegenerateGeometry("corners are collinear")).kind(),
            ErrorKind::DegenerateGeometry
        );
        assert_eq!(
            HarvestError::from(MeasureError::InvalidPolyline {
                min: 3,
                max: 4,
                got: 2
            })
            .kind(),
            ErrorKind::Validation
        );
        assert_eq!(
            HarvestError::from(MeasureError::Calibration { width_px: 0.0 }).kind(),
            ErrorKind::DegenerateGeometry
        );
        assert_eq!(
            HarvestError::Processing("boom".into()).kind(),
            ErrorKind::Processing
        );
    }
}
