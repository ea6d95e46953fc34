//! Auto-tangent cubic splines through an open sequence of points.
//!
//! A [`Spline`] passes through every input point. Each interior point gets two
//! handles on a straight line through it, parallel to the chord between its
//! neighbours, so consecutive cubic Bezier segments join with a continuous
//! tangent. The end points each get a single handle chained to their neighbour's
//! handle.
//!
//! The sampled output is a flat polyline ([`Spline::spline_line`]) where each
//! segment contributes `interpolation` interior samples between its anchors:
//!
//! ```text
//! len(spline_line) == (points - 1) * interpolation + points
//! ```

use super::core::{Point3, Vec3};
use super::curve::{CubicBezier3, CurveError};
use super::extrusion::{ExtrusionError, extrude_polyline_ribbon};
use super::mesh::GeomMesh;
use super::metrics::{GeomMetrics, TimingBucket};

/// Minimum number of points a spline accepts.
pub const MIN_SPLINE_POINTS: usize = 3;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SplineError {
    #[error("spline requires at least {min} points, got {found}")]
    NotEnoughPoints { min: usize, found: usize },
    #[error("spline interpolation must be at least 1")]
    InvalidInterpolation,
    #[error("spline point {index} is not finite")]
    NonFinitePoint { index: usize },
    #[error("spline point {index} has a zero-length tangent chord (coincident neighbours)")]
    DegenerateTangent { index: usize },
    #[error("spline point index {index} out of range (len {len})")]
    IndexOutOfRange { index: usize, len: usize },
    #[error(transparent)]
    Curve(#[from] CurveError),
}

/// An anchor of a [`Spline`] with its tangent handles.
///
/// Handles are `None` until the owning spline computes them; interior points
/// carry both, the first point only `handle_after`, the last only
/// `handle_before`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplinePoint {
    pub position: Point3,
    handle_before: Option<Point3>,
    handle_after: Option<Point3>,
}

impl SplinePoint {
    #[must_use]
    pub const fn new(position: Point3) -> Self {
        Self {
            position,
            handle_before: None,
            handle_after: None,
        }
    }

    #[must_use]
    pub const fn handle_before(&self) -> Option<Point3> {
        self.handle_before
    }

    #[must_use]
    pub const fn handle_after(&self) -> Option<Point3> {
        self.handle_after
    }

    /// `[handle_before, position, handle_after]`, skipping missing handles.
    #[must_use]
    pub fn handle_line(&self) -> Vec<Point3> {
        let mut line = Vec::with_capacity(3);
        line.extend(self.handle_before);
        line.push(self.position);
        line.extend(self.handle_after);
        line
    }
}

/// One cubic piece of a spline together with its current samples.
#[derive(Debug, Clone, PartialEq)]
pub struct BezierSegment {
    pub curve: CubicBezier3,
    pub samples: Vec<Point3>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Spline {
    points: Vec<SplinePoint>,
    interpolation: usize,
    segments: Vec<BezierSegment>,
    spline_line: Vec<Point3>,
}

impl Spline {
    /// Builds a spline through `points` with `interpolation` interior samples
    /// per segment.
    pub fn new(points: &[Point3], interpolation: usize) -> Result<Self, SplineError> {
        if points.len() < MIN_SPLINE_POINTS {
            return Err(SplineError::NotEnoughPoints {
                min: MIN_SPLINE_POINTS,
                found: points.len(),
            });
        }
        if interpolation < 1 {
            return Err(SplineError::InvalidInterpolation);
        }
        if let Some(index) = points.iter().position(|p| !p.is_finite()) {
            return Err(SplineError::NonFinitePoint { index });
        }

        let mut spline = Self {
            points: points.iter().copied().map(SplinePoint::new).collect(),
            interpolation,
            segments: Vec::with_capacity(points.len() - 1),
            spline_line: Vec::new(),
        };
        spline.build()?;
        Ok(spline)
    }

    #[must_use]
    pub fn points(&self) -> &[SplinePoint] {
        &self.points
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.points.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    #[must_use]
    pub const fn interpolation(&self) -> usize {
        self.interpolation
    }

    #[must_use]
    pub fn segments(&self) -> &[BezierSegment] {
        &self.segments
    }

    /// Flattened polyline through all segments with shared anchors deduplicated.
    #[must_use]
    pub fn spline_line(&self) -> &[Point3] {
        &self.spline_line
    }

    /// Changes the sample density. Values below 1 are ignored.
    ///
    /// Handles depend only on point positions, so only the samples are rebuilt.
    pub fn set_interpolation(&mut self, interpolation: usize) -> Result<(), SplineError> {
        if interpolation < 1 {
            return Ok(());
        }
        self.interpolation = interpolation;
        self.sample_segments()
    }

    /// Moves one anchor and rebuilds handles, segments and the sampled line.
    ///
    /// On failure the anchor keeps its previous position and the spline is left
    /// exactly as it was.
    pub fn move_point(&mut self, index: usize, position: Point3) -> Result<(), SplineError> {
        let len = self.points.len();
        let Some(point) = self.points.get_mut(index) else {
            return Err(SplineError::IndexOutOfRange { index, len });
        };
        if !position.is_finite() {
            return Err(SplineError::NonFinitePoint { index });
        }
        let previous = std::mem::replace(&mut point.position, position);
        if let Err(err) = self.build() {
            self.points[index].position = previous;
            self.build()?;
            return Err(err);
        }
        Ok(())
    }

    /// Ribbon mesh sweeping the sampled line along `direction`.
    pub fn extrude(&self, direction: Vec3) -> Result<GeomMesh, ExtrusionError> {
        let mut metrics = GeomMetrics::default();
        metrics.begin();
        let mesh = metrics.time(TimingBucket::Extrusion, || {
            extrude_polyline_ribbon(&self.spline_line, direction)
        })?;
        if let Some(report) = metrics.end() {
            log::trace!("spline extrusion took {} ns", report.extrusion_ns);
        }
        Ok(mesh)
    }

    fn build(&mut self) -> Result<(), SplineError> {
        self.compute_handles()?;
        self.sample_segments()
    }

    fn compute_handles(&mut self) -> Result<(), SplineError> {
        let last = self.points.len() - 1;

        for idx in 1..last {
            let chord = self.points[idx + 1]
                .position
                .sub_point(self.points[idx - 1].position);
            let dir = chord
                .normalized()
                .ok_or(SplineError::DegenerateTangent { index: idx })?;
            let offset = dir.mul_scalar(chord.length() / 6.0);

            let point = &mut self.points[idx];
            point.handle_before = Some(point.position.sub_vec(offset));
            point.handle_after = Some(point.position.add_vec(offset));
        }

        let first_handle = end_handle(
            self.points[1].handle_before,
            self.points[1].position,
            self.points[0].position,
            0,
        )?;
        self.points[0].handle_before = None;
        self.points[0].handle_after = Some(first_handle);

        let last_handle = end_handle(
            self.points[last - 1].handle_after,
            self.points[last - 1].position,
            self.points[last].position,
            last,
        )?;
        self.points[last].handle_before = Some(last_handle);
        self.points[last].handle_after = None;

        Ok(())
    }

    fn sample_segments(&mut self) -> Result<(), SplineError> {
        let fragments = self.interpolation + 1;
        self.segments.clear();
        for pair in self.points.windows(2) {
            let (prev, curr) = (pair[0], pair[1]);
            let curve = CubicBezier3::new(
                prev.position,
                prev.handle_after.unwrap_or(prev.position),
                curr.handle_before.unwrap_or(curr.position),
                curr.position,
            );
            let samples = curve.sample(fragments)?;
            self.segments.push(BezierSegment { curve, samples });
        }

        self.spline_line.clear();
        self.spline_line
            .reserve((self.points.len() - 1) * self.interpolation + self.points.len());
        for (segment_idx, segment) in self.segments.iter().enumerate() {
            let skip = usize::from(segment_idx != 0);
            self.spline_line.extend(segment.samples.iter().skip(skip));
        }

        log::trace!(
            "spline rebuilt: {} points, interpolation {}, {} samples",
            self.points.len(),
            self.interpolation,
            self.spline_line.len()
        );
        Ok(())
    }
}

// Handle of an end point: the neighbour's facing handle pushed a third of the
// end chord further toward the end point.
fn end_handle(
    neighbour_handle: Option<Point3>,
    neighbour: Point3,
    end: Point3,
    index: usize,
) -> Result<Point3, SplineError> {
    let chord = end.sub_point(neighbour);
    let dir = chord
        .normalized()
        .ok_or(SplineError::DegenerateTangent { index })?;
    let base = neighbour_handle.unwrap_or(neighbour);
    Ok(base.add_vec(dir.mul_scalar(chord.length() / 3.0)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geom::Tolerance;

    fn arc_points() -> Vec<Point3> {
        vec![
            Point3::new(5.0, 0.0, 0.0),
            Point3::new(0.0, 5.0, 0.0),
            Point3::new(-5.0, 0.0, 0.0),
            Point3::new(0.0, -5.0, 0.0),
            Point3::new(5.0, 0.0, 0.0),
        ]
    }

    #[test]
    fn test_rejects_two_points() {
        let err = Spline::new(&[Point3::ORIGIN, Point3::new(1.0, 0.0, 0.0)], 2).unwrap_err();
        assert_eq!(err, SplineError::NotEnoughPoints { min: 3, found: 2 });
    }

    #[test]
    fn test_rejects_zero_interpolation() {
        let err = Spline::new(&arc_points(), 0).unwrap_err();
        assert_eq!(err, SplineError::InvalidInterpolation);
    }

    #[test]
    fn test_rejects_non_finite_points() {
        let mut points = arc_points();
        points[3].z = f64::INFINITY;
        assert_eq!(
            Spline::new(&points, 1).unwrap_err(),
            SplineError::NonFinitePoint { index: 3 }
        );
    }

    #[test]
    fn test_coincident_neighbours_are_degenerate() {
        let points = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 0.0),
        ];
        assert_eq!(
            Spline::new(&points, 1).unwrap_err(),
            SplineError::DegenerateTangent { index: 1 }
        );

        let repeated_end = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
            Point3::new(2.0, 0.0, 0.0),
        ];
        assert!(matches!(
            Spline::new(&repeated_end, 1).unwrap_err(),
            SplineError::DegenerateTangent { .. }
        ));
    }

    #[test]
    fn test_handles_are_assigned_per_position() {
        let spline = Spline::new(&arc_points(), 2).unwrap();
        let points = spline.points();

        assert!(points[0].handle_before().is_none());
        assert!(points[0].handle_after().is_some());
        for point in &points[1..points.len() - 1] {
            assert!(point.handle_before().is_some());
            assert!(point.handle_after().is_some());
            assert_eq!(point.handle_line().len(), 3);
        }
        let last = points.last().unwrap();
        assert!(last.handle_before().is_some());
        assert!(last.handle_after().is_none());
        assert_eq!(last.handle_line().len(), 2);
    }

    #[test]
    fn test_interior_handles_are_symmetric_and_parallel_to_chord() {
        let spline = Spline::new(&arc_points(), 1).unwrap();
        let tol = Tolerance::DEFAULT;

        let p = spline.points()[1];
        let before = p.handle_before().unwrap();
        let after = p.handle_after().unwrap();

        // chord (-5,0,0) -> (5,0,0) has length 10, handles sit 10/6 away
        assert!(tol.approx_eq_point3(before, Point3::new(5.0 / 3.0, 5.0, 0.0)));
        assert!(tol.approx_eq_point3(after, Point3::new(-5.0 / 3.0, 5.0, 0.0)));
        assert!(tol.approx_eq_point3(before.lerp(after, 0.5), p.position));
    }

    #[test]
    fn test_end_handle_is_chained_to_neighbour() {
        let points = [
            Point3::new(-10.0, 0.0, 0.0),
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(10.0, 0.0, 0.0),
        ];
        let spline = Spline::new(&points, 1).unwrap();
        let tol = Tolerance::DEFAULT;

        let first = spline.points()[0].handle_after().unwrap();
        let last = spline.points()[2].handle_before().unwrap();
        assert!(tol.approx_eq_point3(first, Point3::new(-20.0 / 3.0, 0.0, 0.0)));
        assert!(tol.approx_eq_point3(last, Point3::new(20.0 / 3.0, 0.0, 0.0)));
    }

    #[test]
    fn test_spline_line_length_matches_formula() {
        let spline = Spline::new(&arc_points(), 10).unwrap();
        assert_eq!(spline.segments().len(), 4);
        assert_eq!(spline.spline_line().len(), 4 * 10 + 5);
        for segment in spline.segments() {
            assert_eq!(segment.samples.len(), 12);
        }
    }

    #[test]
    fn test_spline_line_passes_through_every_point() {
        let points = arc_points();
        let interpolation = 3;
        let spline = Spline::new(&points, interpolation).unwrap();

        for (i, p) in points.iter().enumerate() {
            assert_eq!(spline.spline_line()[i * (interpolation + 1)], *p);
        }
    }

    #[test]
    fn test_set_interpolation_resamples_without_touching_handles() {
        let mut spline = Spline::new(&arc_points(), 2).unwrap();
        let handles: Vec<_> = spline.points().to_vec();

        spline.set_interpolation(5).unwrap();
        assert_eq!(spline.interpolation(), 5);
        assert_eq!(spline.spline_line().len(), 4 * 5 + 5);
        assert_eq!(spline.segments()[0].samples.len(), 7);
        assert_eq!(spline.points(), handles.as_slice());

        spline.set_interpolation(0).unwrap();
        assert_eq!(spline.interpolation(), 5);
    }

    #[test]
    fn test_move_point_rebuilds_handles() {
        let mut spline = Spline::new(&arc_points(), 2).unwrap();
        let before = spline.points()[2].handle_after();

        spline.move_point(1, Point3::new(0.0, 8.0, 1.0)).unwrap();
        assert_eq!(spline.points()[1].position, Point3::new(0.0, 8.0, 1.0));
        assert_ne!(spline.points()[2].handle_after(), before);
        assert_eq!(spline.spline_line()[3], Point3::new(0.0, 8.0, 1.0));

        assert_eq!(
            spline.move_point(9, Point3::ORIGIN).unwrap_err(),
            SplineError::IndexOutOfRange { index: 9, len: 5 }
        );
    }
}
