use super::core::{Point3, Vec3};

pub trait Curve3 {
    fn point_at(&self, t: f64) -> Point3;

    #[must_use]
    fn domain(&self) -> (f64, f64) {
        (0.0, 1.0)
    }

    fn derivative_at(&self, t: f64) -> Vec3;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum CurveError {
    #[error("bezier sampling requires at least 1 fragment")]
    InvalidFragmentCount,
}

/// Cubic Bezier segment: two anchors (`p0`, `p3`) and two handles (`p1`, `p2`).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicBezier3 {
    pub p0: Point3,
    pub p1: Point3,
    pub p2: Point3,
    pub p3: Point3,
}

impl CubicBezier3 {
    #[must_use]
    pub const fn new(p0: Point3, p1: Point3, p2: Point3, p3: Point3) -> Self {
        Self { p0, p1, p2, p3 }
    }

    /// Samples the curve at `fragments + 1` uniform parameters `t = s / fragments`.
    ///
    /// The first sample is exactly `p0` and the last exactly `p3`.
    pub fn sample(&self, fragments: usize) -> Result<Vec<Point3>, CurveError> {
        if fragments == 0 {
            return Err(CurveError::InvalidFragmentCount);
        }

        let denom = fragments as f64;
        let points = (0..=fragments)
            .map(|step| self.point_at(step as f64 / denom))
            .collect();
        Ok(points)
    }
}

impl Curve3 for CubicBezier3 {
    fn point_at(&self, t: f64) -> Point3 {
        let t = t.clamp(0.0, 1.0);
        let u = 1.0 - t;
        let u2 = u * u;
        let t2 = t * t;
        bernstein_blend(
            [self.p0, self.p1, self.p2, self.p3],
            [u2 * u, 3.0 * u2 * t, 3.0 * u * t2, t2 * t],
        )
    }

    fn derivative_at(&self, t: f64) -> Vec3 {
        let t = t.clamp(0.0, 1.0);
        let u = 1.0 - t;
        let a = self.p1.sub_point(self.p0);
        let b = self.p2.sub_point(self.p1);
        let c = self.p3.sub_point(self.p2);
        a.mul_scalar(3.0 * u * u)
            .add(b.mul_scalar(6.0 * u * t))
            .add(c.mul_scalar(3.0 * t * t))
    }
}

/// Samples the cubic Bezier `(p0, p1, p2, p3)` at `fragments + 1` uniform steps.
pub fn sample_cubic_bezier(
    fragments: usize,
    p0: Point3,
    p1: Point3,
    p2: Point3,
    p3: Point3,
) -> Result<Vec<Point3>, CurveError> {
    CubicBezier3::new(p0, p1, p2, p3).sample(fragments)
}

// Weighted sum of position vectors; exact at the end weights (1,0,0,0) and (0,0,0,1).
fn bernstein_blend(points: [Point3; 4], weights: [f64; 4]) -> Point3 {
    let sum = points
        .iter()
        .zip(weights)
        .fold(Vec3::ZERO, |acc, (p, w)| acc + p.to_vec3().mul_scalar(w));
    Point3::from(sum)
}
