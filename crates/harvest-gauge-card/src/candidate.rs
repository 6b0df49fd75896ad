use harvest_gauge_core::{order_corners, Point, Quadrilateral};
use imageproc::geometry::{approximate_polygon_dp, arc_length};
use imageproc::point::Point as PixelPoint;
use nalgebra::Vector2;
use serde::Serialize;

/// Fraction of each side ignored at both ends when fitting its line.
const SIDE_MARGIN: f64 = 0.15;

/// A quadrilateral outline that passed the area and aspect-ratio gates.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CardCandidate {
    pub corners: Quadrilateral,
    /// Area in square pixels of the input image.
    pub area: f64,
    /// Mean horizontal edge over mean vertical edge.
    pub aspect_ratio: f64,
    /// `|aspect_ratio - target| / target`.
    pub deviation: f64,
    pub confidence: f64,
}

impl CardCandidate {
    pub(crate) fn evaluate(
        corners: [Point; 4],
        target_ratio: f64,
        tolerance: f64,
        min_area: f64,
    ) -> Option<Self> {
        let quad = order_corners(&corners).ok()?;
        let area = quad.area();
        if area < min_area {
            return None;
        }

        let ratio = aspect_ratio(&quad);
        let deviation = (ratio - target_ratio).abs() / target_ratio;
        if !(deviation <= tolerance) {
            return None;
        }

        let confidence = if tolerance > 0.0 {
            (1.0 - deviation / tolerance).clamp(0.0, 1.0)
        } else {
            1.0
        };

        Some(Self {
            corners: quad,
            area,
            aspect_ratio: ratio,
            deviation,
            confidence,
        })
    }
}

/// Width over height of the mean opposing edges.
///
/// Only a landscape card reaches the ID-1 ratio, so an accepted candidate
/// always has its long side on the `TL -> TR` edge that calibration reads.
pub(crate) fn aspect_ratio(quad: &Quadrilateral) -> f64 {
    let w = 0.5 * (quad.top_edge() + quad.bottom_edge());
    let h = 0.5 * (quad.left_edge() + quad.right_edge());
    w / h
}

/// Simplify a closed contour and keep it only if it collapses to four vertices.
///
/// The vertices are then snapped to the intersections of lines fitted to the
/// contour between them, each line pulled `inset` pixels towards the inside.
pub(crate) fn approximate_quad(
    points: &[PixelPoint<u32>],
    epsilon_frac: f64,
    inset: f64,
) -> Option<[Point; 4]> {
    if points.len() < 4 {
        return None;
    }
    let epsilon = epsilon_frac * arc_length(points, true);
    if !(epsilon > 0.0) {
        return None;
    }

    let approx = approximate_polygon_dp(points, epsilon, true);
    let quad: [PixelPoint<u32>; 4] = approx.try_into().ok()?;
    let rough = quad.map(|p| Point::new(p.x as f64, p.y as f64));
    Some(refine_corners(points, rough, inset, epsilon))
}

/// Total least squares line through `pts`: centroid and unit direction.
fn fit_line(pts: &[Point]) -> Option<(Point, Vector2<f64>)> {
    if pts.len() < 2 {
        return None;
    }
    let n = pts.len() as f64;
    let c = pts.iter().fold(Vector2::<f64>::zeros(), |acc, p| acc + p.coords) / n;
    let (mut sxx, mut sxy, mut syy) = (0.0_f64, 0.0_f64, 0.0_f64);
    for p in pts {
        let d = p.coords - c;
        sxx += d.x * d.x;
        sxy += d.x * d.y;
        syy += d.y * d.y;
    }
    let theta = 0.5 * (2.0 * sxy).atan2(sxx - syy);
    Some((Point::from(c), Vector2::new(theta.cos(), theta.sin())))
}

fn intersect(a: (Point, Vector2<f64>), b: (Point, Vector2<f64>)) -> Option<Point> {
    let cross = a.1.perp(&b.1);
    if cross.abs() < 1e-9 {
        return None;
    }
    let t = (b.0 - a.0).perp(&b.1) / cross;
    let p = a.0 + a.1 * t;
    (p.x.is_finite() && p.y.is_finite()).then_some(p)
}

/// Replace each rough vertex by the intersection of its two fitted sides.
///
/// Contour points are assigned to the nearest side; the ends of each side are
/// skipped so rounded corners do not bend the fit. Fitted lines move `inset`
/// pixels towards the quad center. A vertex moves at most `max_shift`,
/// otherwise the rough one is kept.
pub(crate) fn refine_corners(
    contour: &[PixelPoint<u32>],
    rough: [Point; 4],
    inset: f64,
    max_shift: f64,
) -> [Point; 4] {
    let mut sides: [Vec<Point>; 4] = Default::default();
    for px in contour {
        let p = Point::new(px.x as f64, px.y as f64);
        let mut best: Option<(usize, f64, f64)> = None;
        for (i, (a, b)) in (0..4).map(|i| (rough[i], rough[(i + 1) % 4])).enumerate() {
            let v = b - a;
            let len2 = v.norm_squared();
            if len2 <= 0.0 {
                continue;
            }
            let t = ((p - a).dot(&v) / len2).clamp(0.0, 1.0);
            let dist = (p - (a + v * t)).norm();
            if best.is_none_or(|(_, d, _)| dist < d) {
                best = Some((i, dist, t));
            }
        }
        if let Some((i, _, t)) = best {
            if (SIDE_MARGIN..=1.0 - SIDE_MARGIN).contains(&t) {
                sides[i].push(p);
            }
        }
    }

    let center = Point::from(rough.iter().fold(Vector2::<f64>::zeros(), |acc, p| acc + p.coords) / 4.0);
    let lines = sides.each_ref().map(|pts| {
        fit_line(pts).map(|(c, d)| {
            let mut normal = Vector2::new(-d.y, d.x);
            if (center - c).dot(&normal) < 0.0 {
                normal = -normal;
            }
            (c + normal * inset, d)
        })
    });
    let mut out = rough;
    for k in 0..4 {
        let refined = match (lines[(k + 3) % 4], lines[k]) {
            (Some(prev), Some(next)) => intersect(prev, next),
            _ => None,
        };
        if let Some(p) = refined {
            if (p - rough[k]).norm() <= max_shift {
                out[k] = p;
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;
    use imageproc::geometry::contour_area;

    fn rect_outline(x0: u32, y0: u32, w: u32, h: u32) -> Vec<PixelPoint<u32>> {
        let mut pts = Vec::new();
        for x in x0..x0 + w {
            pts.push(PixelPoint::new(x, y0));
        }
        for y in y0..y0 + h {
            pts.push(PixelPoint::new(x0 + w, y));
        }
        for x in (x0 + 1..=x0 + w).rev() {
            pts.push(PixelPoint::new(x, y0 + h));
        }
        for y in (y0 + 1..=y0 + h).rev() {
            pts.push(PixelPoint::new(x0, y));
        }
        pts
    }

    /// Closed pixel walk through `vertices`; edges must be axis-aligned or diagonal.
    fn walk(vertices: &[(i64, i64)]) -> Vec<PixelPoint<u32>> {
        let mut pts = Vec::new();
        for (i, &(x0, y0)) in vertices.iter().enumerate() {
            let (x1, y1) = vertices[(i + 1) % vertices.len()];
            let (dx, dy) = ((x1 - x0).signum(), (y1 - y0).signum());
            let (mut x, mut y) = (x0, y0);
            while (x, y) != (x1, y1) {
                pts.push(PixelPoint::new(x as u32, y as u32));
                x += dx;
                y += dy;
            }
        }
        pts
    }

    fn assert_point(actual: Point, x: f64, y: f64) {
        assert_abs_diff_eq!(actual.x, x, epsilon = 1e-6);
        assert_abs_diff_eq!(actual.y, y, epsilon = 1e-6);
    }

    #[test]
    fn larger_outline_has_larger_area() {
        let small = rect_outline(10, 20, 30, 20);
        let large = rect_outline(10, 20, 100, 60);
        assert!(contour_area(&large) > contour_area(&small));
    }

    #[test]
    fn rectangle_outline_simplifies_to_four_corners() {
        let pts = rect_outline(10, 20, 100, 60);
        let quad = approximate_quad(&pts, 0.02, 0.0).expect("quad");
        let ordered = order_corners(&quad).unwrap();
        assert_point(ordered.top_left(), 10.0, 20.0);
        assert_point(ordered.top_right(), 110.0, 20.0);
        assert_point(ordered.bottom_right(), 110.0, 80.0);
        assert_point(ordered.bottom_left(), 10.0, 80.0);
    }

    #[test]
    fn rounded_corners_snap_to_the_side_intersections() {
        let outline = walk(&[
            (15, 20),
            (105, 20),
            (110, 25),
            (110, 75),
            (105, 80),
            (15, 80),
            (10, 75),
            (10, 25),
        ]);
        let rough = [
            Point::new(15.0, 20.0),
            Point::new(110.0, 25.0),
            Point::new(105.0, 80.0),
            Point::new(10.0, 75.0),
        ];
        let refined = refine_corners(&outline, rough, 0.0, 20.0);
        assert_point(refined[0], 10.0, 20.0);
        assert_point(refined[1], 110.0, 20.0);
        assert_point(refined[2], 110.0, 80.0);
        assert_point(refined[3], 10.0, 80.0);
    }

    #[test]
    fn refinement_never_moves_a_vertex_beyond_the_limit() {
        let outline = rect_outline(10, 20, 100, 60);
        let rough = [
            Point::new(14.0, 20.0),
            Point::new(110.0, 20.0),
            Point::new(110.0, 80.0),
            Point::new(10.0, 80.0),
        ];
        let refined = refine_corners(&outline, rough, 0.0, 1.0);
        assert_eq!(refined[0], rough[0]);
        assert_point(refined[2], 110.0, 80.0);
    }

    #[test]
    fn inset_pulls_every_side_inwards() {
        let pts = rect_outline(10, 20, 100, 60);
        let quad = approximate_quad(&pts, 0.02, 1.0).expect("quad");
        let ordered = order_corners(&quad).unwrap();
        assert_point(ordered.top_left(), 11.0, 21.0);
        assert_point(ordered.top_right(), 109.0, 21.0);
        assert_point(ordered.bottom_right(), 109.0, 79.0);
        assert_point(ordered.bottom_left(), 11.0, 79.0);
    }

    #[test]
    fn id1_shaped_quad_is_accepted_with_high_confidence() {
        let corners = [
            Point::new(0.0, 0.0),
            Point::new(428.0, 0.0),
            Point::new(428.0, 270.0),
            Point::new(0.0, 270.0),
        ];
        let c = CardCandidate::evaluate(corners, 85.60 / 53.98, 0.2, 100.0).expect("accepted");
        assert!(c.confidence > 0.95, "confidence {}", c.confidence);
        assert!(c.corners.top_edge() > c.corners.left_edge());
    }

    #[test]
    fn portrait_quad_is_rejected() {
        let corners = [
            Point::new(0.0, 0.0),
            Point::new(270.0, 0.0),
            Point::new(270.0, 428.0),
            Point::new(0.0, 428.0),
        ];
        assert!(CardCandidate::evaluate(corners, 85.60 / 53.98, 0.2, 100.0).is_none());
    }

    #[test]
    fn square_and_tiny_quads_are_rejected() {
        let square = [
            Point::new(0.0, 0.0),
            Point::new(300.0, 0.0),
            Point::new(300.0, 300.0),
            Point::new(0.0, 300.0),
        ];
        assert!(CardCandidate::evaluate(square, 85.60 / 53.98, 0.2, 100.0).is_none());

        let tiny = [
            Point::new(0.0, 0.0),
            Point::new(8.0, 0.0),
            Point::new(8.0, 5.0),
            Point::new(0.0, 5.0),
        ];
        assert!(CardCandidate::evaluate(tiny, 85.60 / 53.98, 0.2, 100.0).is_none());
    }
}
