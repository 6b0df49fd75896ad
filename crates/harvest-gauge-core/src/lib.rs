//! Core geometry for card-calibrated leaf measurement.
//!
//! This crate is intentionally small and purely geometric. It does *not*
//! depend on any concrete image decoder; pixels are read through the
//! lightweight [`GrayImageView`].
//!
//! - [`order_corners`] canonicalizes four points into `[TL, TR, BR, BL]`.
//! - [`homography_from_4pt`] solves the projective map between two quads.
//! - [`rectify_quad`] flattens a quadrilateral image region into an upright
//!   rectangle.

mod homography;
mod image;
mod logger;
mod quad;
mod reference;
mod warp;

pub use homography::{homography_from_4pt, Homography};
pub use image::{sample_bilinear, sample_bilinear_u8, GrayImage, GrayImageView};
pub use quad::{distance, order_corners, GeometryError, Point, Quadrilateral};
pub use reference::ReferenceCard;
pub use warp::{rectified_size, rectify_quad, warp_perspective_gray, RectifiedQuad, RectifyError};

#[cfg(feature = "tracing")]
pub use logger::init_tracing;

pub use logger::init_with_level;
