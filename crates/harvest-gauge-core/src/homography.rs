use crate::Point;
use nalgebra::{Matrix3, SMatrix, SVector, Vector3};

/// Plane-to-plane projective map, `dst ~ m * [x, y, 1]^T`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Homography {
    pub m: Matrix3<f64>,
}

impl Homography {
    pub fn new(m: Matrix3<f64>) -> Self {
        Self { m }
    }

    pub fn identity() -> Self {
        Self::new(Matrix3::identity())
    }

    #[inline]
    pub fn apply(&self, p: Point) -> Point {
        let v = self.m * Vector3::new(p.x, p.y, 1.0);
        Point::new(v.x / v.z, v.y / v.z)
    }

    pub fn inverse(&self) -> Option<Self> {
        self.m.try_inverse().map(Self::new)
    }
}

/// Similarity moving the centroid to the origin with mean radius `sqrt(2)`.
fn conditioning(pts: &[Point; 4]) -> Matrix3<f64> {
    let c = pts.iter().fold(Vector3::<f64>::zeros(), |acc, p| acc + Vector3::new(p.x, p.y, 0.0)) / 4.0;
    let radius = pts.iter().map(|p| (p.x - c.x).hypot(p.y - c.y)).sum::<f64>() / 4.0;
    let s = if radius > 1e-12 {
        std::f64::consts::SQRT_2 / radius
    } else {
        1.0
    };
    Matrix3::new(s, 0.0, -s * c.x, 0.0, s, -s * c.y, 0.0, 0.0, 1.0)
}

fn transform(t: &Matrix3<f64>, p: Point) -> Point {
    Homography::new(*t).apply(p)
}

/// Solve for the homography taking `src[i]` to `dst[i]`, `i = 0..4`.
///
/// Both inputs must list corners in the same order. `None` means the
/// correspondences admit no finite solution (e.g. three collinear points).
pub fn homography_from_4pt(src: &[Point; 4], dst: &[Point; 4]) -> Option<Homography> {
    let t_src = conditioning(src);
    let t_dst = conditioning(dst);

    // With h33 fixed to 1, each pair contributes two rows:
    //   [x y 1 0 0 0 -ux -uy] h = u
    //   [0 0 0 x y 1 -vx -vy] h = v
    let mut rows = [[0.0_f64; 9]; 8];
    for (k, (s, d)) in src.iter().zip(dst.iter()).enumerate() {
        let s = transform(&t_src, *s);
        let d = transform(&t_dst, *d);
        let (x, y, u, v) = (s.x, s.y, d.x, d.y);
        rows[2 * k] = [x, y, 1.0, 0.0, 0.0, 0.0, -u * x, -u * y, u];
        rows[2 * k + 1] = [0.0, 0.0, 0.0, x, y, 1.0, -v * x, -v * y, v];
    }

    let a = SMatrix::<f64, 8, 8>::from_fn(|r, c| rows[r][c]);
    let b = SVector::<f64, 8>::from_fn(|r, _| rows[r][8]);
    let h = a.lu().solve(&b)?;
    if !h.iter().all(|c| c.is_finite()) {
        return None;
    }

    let conditioned = Matrix3::new(h[0], h[1], h[2], h[3], h[4], h[5], h[6], h[7], 1.0);
    let m = t_dst.try_inverse()? * conditioned * t_src;
    let scale = m[(2, 2)];
    if scale.abs() < 1e-12 {
        return None;
    }
    Some(Homography::new(m / scale))
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    fn card_rect() -> [Point; 4] {
        [
            Point::new(0.0, 0.0),
            Point::new(428.0, 0.0),
            Point::new(428.0, 270.0),
            Point::new(0.0, 270.0),
        ]
    }

    #[test]
    fn inverse_undoes_apply() {
        let h = Homography::new(Matrix3::new(
            0.95, -0.12, 40.0, //
            0.08, 1.05, -12.0, //
            0.0004, -0.0007, 1.0,
        ));
        let back = h.inverse().expect("invertible");
        for p in card_rect() {
            let q = back.apply(h.apply(p));
            assert_abs_diff_eq!(q.x, p.x, epsilon = 1e-9);
            assert_abs_diff_eq!(q.y, p.y, epsilon = 1e-9);
        }
    }

    #[test]
    fn recovers_a_known_perspective_map() {
        let truth = Homography::new(Matrix3::new(
            1.1, 0.2, 75.0, //
            -0.05, 0.9, 140.0, //
            0.0006, 0.0009, 1.0,
        ));
        let dst = card_rect().map(|p| truth.apply(p));
        let est = homography_from_4pt(&card_rect(), &dst).expect("solvable");

        for p in [Point::new(214.0, 135.0), Point::new(30.0, 250.0), Point::new(400.0, 12.0)] {
            let (a, b) = (est.apply(p), truth.apply(p));
            assert_abs_diff_eq!(a.x, b.x, epsilon = 1e-6);
            assert_abs_diff_eq!(a.y, b.y, epsilon = 1e-6);
        }
    }

    #[test]
    fn hits_every_target_corner() {
        let dst = [
            Point::new(130.0, 95.0),
            Point::new(540.0, 120.0),
            Point::new(505.0, 330.0),
            Point::new(98.0, 300.0),
        ];
        let h = homography_from_4pt(&card_rect(), &dst).expect("solvable");
        for (s, d) in card_rect().iter().zip(dst) {
            let p = h.apply(*s);
            assert_abs_diff_eq!(p.x, d.x, epsilon = 1e-8);
            assert_abs_diff_eq!(p.y, d.y, epsilon = 1e-8);
        }
    }

    #[test]
    fn same_quad_gives_identity() {
        let quad = card_rect().map(|p| Point::new(p.x + 100.0, p.y + 100.0));
        let h = homography_from_4pt(&quad, &quad).expect("solvable");
        assert_abs_diff_eq!(h.m, Homography::identity().m, epsilon = 1e-9);
    }
}
