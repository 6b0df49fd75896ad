//! Perspective rectification of a quadrilateral image region.
//!
//! Quad and rectangle coordinates are continuous: output pixel `(x, y)`
//! covers `[x, x + 1) x [y, y + 1)` and is sampled at its center.

use crate::{
    homography_from_4pt, sample_bilinear_u8, GrayImage, GrayImageView, Homography, Point,
    Quadrilateral,
};
use log::debug;

#[cfg(feature = "tracing")]
use tracing::instrument;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum RectifyError {
    #[error("rectified output would be empty ({width}x{height})")]
    EmptyOutput { width: usize, height: usize },
    #[error("homography estimation failed")]
    HomographyFailed,
    #[error("homography not invertible")]
    NonInvertible,
}

/// Upright view of a quadrilateral region plus the maps between both frames.
#[derive(Clone, Debug)]
pub struct RectifiedQuad {
    pub image: GrayImage,
    pub h_img_from_rect: Homography,
    pub h_rect_from_img: Homography,
}

impl RectifiedQuad {
    #[inline]
    pub fn width(&self) -> usize {
        self.image.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.image.height
    }

    /// Map a source-image point into the rectified frame.
    pub fn to_rect(&self, p_img: Point) -> Point {
        self.h_rect_from_img.apply(p_img)
    }

    /// Map a rectified-frame point back into the source image.
    pub fn to_image(&self, p_rect: Point) -> Point {
        self.h_img_from_rect.apply(p_rect)
    }
}

/// Output size for [`rectify_quad`]: the longer of each pair of opposing edges.
pub fn rectified_size(quad: &Quadrilateral) -> (usize, usize) {
    let w = quad.top_edge().max(quad.bottom_edge()).round();
    let h = quad.left_edge().max(quad.right_edge()).round();
    (w as usize, h as usize)
}

/// Flatten `quad` (ordered `[TL, TR, BR, BL]`) into an upright rectangle.
#[cfg_attr(
    feature = "tracing",
    instrument(level = "info", skip(src, quad), fields(width = src.width, height = src.height))
)]
pub fn rectify_quad(
    src: &GrayImageView<'_>,
    quad: &Quadrilateral,
) -> Result<RectifiedQuad, RectifyError> {
    let (out_w, out_h) = rectified_size(quad);
    if out_w == 0 || out_h == 0 {
        return Err(RectifyError::EmptyOutput {
            width: out_w,
            height: out_h,
        });
    }

    let (w, h) = (out_w as f64, out_h as f64);
    let rect = [
        Point::new(0.0, 0.0),
        Point::new(w, 0.0),
        Point::new(w, h),
        Point::new(0.0, h),
    ];

    let h_img_from_rect =
        homography_from_4pt(&rect, quad.corners()).ok_or(RectifyError::HomographyFailed)?;
    let h_rect_from_img = h_img_from_rect
        .inverse()
        .ok_or(RectifyError::NonInvertible)?;

    debug!("rectifying quad into {out_w}x{out_h}");
    let image = warp_perspective_gray(src, h_img_from_rect, out_w, out_h);

    Ok(RectifiedQuad {
        image,
        h_img_from_rect,
        h_rect_from_img,
    })
}

/// For each output pixel, map its center through `h_img_from_rect` and sample the source.
pub fn warp_perspective_gray(
    src: &GrayImageView<'_>,
    h_img_from_rect: Homography,
    out_w: usize,
    out_h: usize,
) -> GrayImage {
    let mut out = vec![0u8; out_w * out_h];

    for y in 0..out_h {
        for x in 0..out_w {
            let pr = Point::new(x as f64 + 0.5, y as f64 + 0.5);
            let pi = h_img_from_rect.apply(pr);
            out[y * out_w + x] = sample_bilinear_u8(src, pi.x - 0.5, pi.y - 0.5);
        }
    }

    GrayImage {
        width: out_w,
        height: out_h,
        data: out,
    }
}
