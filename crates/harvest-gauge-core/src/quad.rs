use nalgebra::Point2;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;

/// Image-space point in pixel coordinates.
pub type Point = Point2<f64>;

/// Two corners closer than this fraction of the quad extent count as coincident.
const COINCIDENT_REL: f64 = 1e-6;
/// A quad whose area is below this fraction of `extent^2` counts as collinear.
const COLLINEAR_REL: f64 = 1e-6;

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    #[error("expected {expected} points, got {got}")]
    WrongPointCount { expected: &'static str, got: usize },
    #[error("point coordinates must be finite numbers")]
    NonFinite,
    #[error("degenerate geometry: {0}")]
    DegenerateGeometry(&'static str),
}

#[inline]
pub fn distance(a: Point, b: Point) -> f64 {
    (b - a).norm()
}

/// Four corners in canonical `[top-left, top-right, bottom-right, bottom-left]` order.
///
/// Construction always validates: corners are finite, pairwise distinct and
/// not collinear.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[Point; 4]", into = "[Point; 4]")]
pub struct Quadrilateral {
    corners: [Point; 4],
}

impl Quadrilateral {
    /// Wrap corners that are already in `[TL, TR, BR, BL]` order.
    pub fn new(corners: [Point; 4]) -> Result<Self, GeometryError> {
        check_finite(&corners)?;
        check_not_degenerate(&corners)?;
        Ok(Self { corners })
    }

    /// Axis-aligned rectangle with its top-left corner at `(x, y)`.
    pub fn axis_aligned(x: f64, y: f64, width: f64, height: f64) -> Result<Self, GeometryError> {
        Self::new([
            Point::new(x, y),
            Point::new(x + width, y),
            Point::new(x + width, y + height),
            Point::new(x, y + height),
        ])
    }

    #[inline]
    pub fn corners(&self) -> &[Point; 4] {
        &self.corners
    }

    #[inline]
    pub fn top_left(&self) -> Point {
        self.corners[0]
    }

    #[inline]
    pub fn top_right(&self) -> Point {
        self.corners[1]
    }

    #[inline]
    pub fn bottom_right(&self) -> Point {
        self.corners[2]
    }

    #[inline]
    pub fn bottom_left(&self) -> Point {
        self.corners[3]
    }

    pub fn top_edge(&self) -> f64 {
        distance(self.top_left(), self.top_right())
    }

    pub fn bottom_edge(&self) -> f64 {
        distance(self.bottom_left(), self.bottom_right())
    }

    pub fn left_edge(&self) -> f64 {
        distance(self.top_left(), self.bottom_left())
    }

    pub fn right_edge(&self) -> f64 {
        distance(self.top_right(), self.bottom_right())
    }

    /// Unsigned shoelace area in square pixels.
    pub fn area(&self) -> f64 {
        signed_area(&self.corners).abs()
    }
}

impl TryFrom<[Point; 4]> for Quadrilateral {
    type Error = GeometryError;

    fn try_from(corners: [Point; 4]) -> Result<Self, Self::Error> {
        Self::new(corners)
    }
}

impl From<Quadrilateral> for [Point; 4] {
    fn from(q: Quadrilateral) -> Self {
        q.corners
    }
}

/// Order four points into `[TL, TR, BR, BL]` with the sum/difference rule.
///
/// With `s = x + y` and `d = y - x`: TL minimizes `s`, BR maximizes `s`,
/// TR minimizes `d`, BL maximizes `d`. Ties are broken on the other key so the
/// result does not depend on input order. Degeneracy is checked on the ordered
/// quad only.
pub fn order_corners(points: &[Point]) -> Result<Quadrilateral, GeometryError> {
    let pts: &[Point; 4] = points
        .try_into()
        .map_err(|_| GeometryError::WrongPointCount {
            expected: "exactly 4",
            got: points.len(),
        })?;
    check_finite(pts)?;

    let s = |i: usize| pts[i].x + pts[i].y;
    let d = |i: usize| pts[i].y - pts[i].x;

    let tl = argmin(|a, b| s(a).total_cmp(&s(b)).then(d(a).total_cmp(&d(b))));
    let tr = argmin(|a, b| d(a).total_cmp(&d(b)).then(s(b).total_cmp(&s(a))));
    let br = argmin(|a, b| s(b).total_cmp(&s(a)).then(d(b).total_cmp(&d(a))));
    let bl = argmin(|a, b| d(b).total_cmp(&d(a)).then(s(a).total_cmp(&s(b))));

    let idx = [tl, tr, br, bl];
    for i in 0..4 {
        for j in (i + 1)..4 {
            if idx[i] == idx[j] {
                return Err(GeometryError::DegenerateGeometry(
                    "corners cannot be ordered unambiguously",
                ));
            }
        }
    }

    Quadrilateral::new(idx.map(|i| pts[i]))
}

fn argmin(cmp: impl Fn(usize, usize) -> Ordering) -> usize {
    (1..4).fold(0, |best, i| {
        if cmp(i, best) == Ordering::Less {
            i
        } else {
            best
        }
    })
}

pub(crate) fn check_finite(points: &[Point]) -> Result<(), GeometryError> {
    if points.iter().all(|p| p.x.is_finite() && p.y.is_finite()) {
        Ok(())
    } else {
        Err(GeometryError::NonFinite)
    }
}

fn check_not_degenerate(c: &[Point; 4]) -> Result<(), GeometryError> {
    let mut extent = 0.0_f64;
    for i in 0..4 {
        for j in (i + 1)..4 {
            extent = extent.max(distance(c[i], c[j]));
        }
    }
    if extent <= 0.0 {
        return Err(GeometryError::DegenerateGeometry("all corners coincide"));
    }

    for i in 0..4 {
        for j in (i + 1)..4 {
            if distance(c[i], c[j]) <= COINCIDENT_REL * extent {
                return Err(GeometryError::DegenerateGeometry(
                    "two or more corners coincide",
                ));
            }
        }
    }

    if signed_area(c).abs() <= COLLINEAR_REL * extent * extent {
        return Err(GeometryError::DegenerateGeometry("corners are collinear"));
    }

    Ok(())
}

fn signed_area(points: &[Point]) -> f64 {
    let n = points.len();
    let mut acc = 0.0;
    for i in 0..n {
        let a = points[i];
        let b = points[(i + 1) % n];
        acc += a.x * b.y - b.x * a.y;
    }
    0.5 * acc
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn permutations(pts: [Point; 4]) -> Vec<[Point; 4]> {
        let mut out = Vec::with_capacity(24);
        for a in 0..4 {
            for b in 0..4 {
                for c in 0..4 {
                    for d in 0..4 {
                        let idx = [a, b, c, d];
                        let mut seen = [false; 4];
                        idx.iter().for_each(|&i| seen[i] = true);
                        if seen.iter().all(|&s| s) {
                            out.push(idx.map(|i| pts[i]));
                        }
                    }
                }
            }
        }
        out
    }

    #[test]
    fn all_24_permutations_give_the_same_order() {
        let tl = Point::new(112.0, 95.0);
        let tr = Point::new(530.0, 120.0);
        let br = Point::new(515.0, 300.0);
        let bl = Point::new(90.0, 280.0);

        let perms = permutations([br, tl, bl, tr]);
        assert_eq!(perms.len(), 24);

        for p in perms {
            let q = order_corners(&p).expect("orderable");
            assert_eq!(q.corners(), &[tl, tr, br, bl]);
        }
    }

    #[test]
    fn every_order_of_an_axis_aligned_card_is_accepted() {
        let tl = Point::new(100.0, 100.0);
        let tr = Point::new(528.0, 100.0);
        let br = Point::new(528.0, 292.0);
        let bl = Point::new(100.0, 292.0);

        for p in permutations([tl, tr, br, bl]) {
            let q = order_corners(&p).unwrap_or_else(|e| panic!("{p:?}: {e}"));
            assert_eq!(q.corners(), &[tl, tr, br, bl]);
            assert_abs_diff_eq!(q.top_edge(), 428.0);
        }
    }

    #[test]
    fn diamond_ties_are_broken_consistently() {
        let top = Point::new(5.0, 0.0);
        let right = Point::new(10.0, 5.0);
        let bottom = Point::new(5.0, 10.0);
        let left = Point::new(0.0, 5.0);

        for p in permutations([top, right, bottom, left]) {
            let q = order_corners(&p).expect("orderable");
            assert_eq!(q.corners(), &[top, right, bottom, left]);
        }
    }

    #[test]
    fn wrong_point_count_is_rejected() {
        let pts = [Point::new(0.0, 0.0); 3];
        assert_eq!(
            order_corners(&pts),
            Err(GeometryError::WrongPointCount {
                expected: "exactly 4",
                got: 3
            })
        );
    }

    #[test]
    fn collinear_points_are_degenerate() {
        let pts = [
            Point::new(0.0, 0.0),
            Point::new(10.0, 10.0),
            Point::new(20.0, 20.0),
            Point::new(30.0, 30.0),
        ];
        assert!(matches!(
            order_corners(&pts),
            Err(GeometryError::DegenerateGeometry(_))
        ));
    }

    #[test]
    fn coincident_points_are_degenerate() {
        let pts = [
            Point::new(0.0, 0.0),
            Point::new(0.0, 0.0),
            Point::new(0.0, 0.0),
            Point::new(30.0, 10.0),
        ];
        assert!(matches!(
            order_corners(&pts),
            Err(GeometryError::DegenerateGeometry(_))
        ));
    }

    #[test]
    fn non_finite_points_are_rejected() {
        let pts = [
            Point::new(0.0, 0.0),
            Point::new(f64::NAN, 0.0),
            Point::new(10.0, 10.0),
            Point::new(0.0, 10.0),
        ];
        assert_eq!(order_corners(&pts), Err(GeometryError::NonFinite));
    }

    #[test]
    fn edges_and_area_of_axis_aligned_rect() {
        let q = Quadrilateral::axis_aligned(100.0, 100.0, 428.0, 192.0).unwrap();
        assert_abs_diff_eq!(q.top_edge(), 428.0);
        assert_abs_diff_eq!(q.bottom_edge(), 428.0);
        assert_abs_diff_eq!(q.left_edge(), 192.0);
        assert_abs_diff_eq!(q.right_edge(), 192.0);
        assert_abs_diff_eq!(q.area(), 428.0 * 192.0);
    }

    #[test]
    fn deserialization_validates() {
        let ok: Quadrilateral =
            serde_json::from_str("[[0,0],[10,0],[10,5],[0,5]]").expect("valid quad");
        assert_abs_diff_eq!(ok.top_edge(), 10.0);

        let bad = serde_json::from_str::<Quadrilateral>("[[0,0],[0,0],[0,0],[0,0]]");
        assert!(bad.is_err());
    }
}
