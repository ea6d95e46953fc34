//! Spline surface driven by a sparse lattice of control points.
//!
//! A [`ControlledSurface`] owns a dense [`Grid`] and overlays a
//! `control_points_x × control_points_y` lattice on it. Between two adjacent
//! control vertices along either axis sit `interpolation` derived vertices, so
//!
//! ```text
//! segments_x = interpolation * (cpx - 1) + (cpx - 1)
//! segments_y = interpolation * (cpy - 1) + (cpy - 1)
//! ```
//!
//! Control point `k` sits in X band `k / cpy` and control column `k % cpy`.
//! Edits only change the stored control positions; [`ControlledSurface::reconcile`]
//! re-derives every derived vertex with three sweeps of 1D [`Spline`]s:
//!
//! 1. column pass: one spline along Y through each X band of control points,
//! 2. row pass: one spline along X through each control column,
//! 3. interior pass: one spline along X through every sub-column between two
//!    control columns, anchored on the values the column pass wrote,
//!
//! followed by a resync that writes the authoritative control positions back
//! into their grid vertices.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::core::{Point3, Tolerance, Vec3};
use super::diagnostics::ReconcileDiagnostics;
use super::grid::{Grid, GridError};
use super::mesh::{GeomMesh, fits_u32_indices};
use super::metrics::{GeomMetrics, TimingBucket};
use super::spline::{MIN_SPLINE_POINTS, Spline, SplineError};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Axis {
    X,
    Y,
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::X => f.write_str("x"),
            Self::Y => f.write_str("y"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcilePass {
    Column,
    Row,
    Interior,
}

impl fmt::Display for ReconcilePass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Column => f.write_str("column"),
            Self::Row => f.write_str("row"),
            Self::Interior => f.write_str("interior"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SurfaceError {
    #[error("surface needs at least {min} control points along {axis}, got {found}")]
    NotEnoughControlPoints { axis: Axis, min: usize, found: usize },
    #[error("surface interpolation must be at least 1")]
    InvalidInterpolation,
    #[error(
        "{control_points_x}x{control_points_y} control points at interpolation {interpolation} exceed the u32 vertex index range"
    )]
    TooLarge {
        control_points_x: usize,
        control_points_y: usize,
        interpolation: usize,
    },
    #[error("control point {index} out of range (count {count})")]
    ControlIndexOutOfRange { index: usize, count: usize },
    #[error("control point coordinates must be finite")]
    NonFiniteCoordinate,
    #[error("{pass} pass failed on line {line}: {source}")]
    Spline {
        pass: ReconcilePass,
        line: usize,
        #[source]
        source: SplineError,
    },
    #[error(transparent)]
    Grid(#[from] GridError),
}

/// Construction parameters for a [`ControlledSurface`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SurfaceOptions {
    pub size_x: f64,
    pub size_y: f64,
    pub control_points_x: usize,
    pub control_points_y: usize,
    /// Derived vertices between two neighbouring control points.
    pub interpolation: usize,
    /// Resync drift above this raises a diagnostics warning.
    #[serde(skip)]
    pub tolerance: Tolerance,
}

impl Default for SurfaceOptions {
    fn default() -> Self {
        Self {
            size_x: 20.0,
            size_y: 20.0,
            control_points_x: 3,
            control_points_y: 3,
            interpolation: 2,
            tolerance: Tolerance::LOOSE,
        }
    }
}

impl SurfaceOptions {
    #[must_use]
    pub fn with_size(mut self, size_x: f64, size_y: f64) -> Self {
        self.size_x = size_x;
        self.size_y = size_y;
        self
    }

    #[must_use]
    pub fn with_control_points(mut self, control_points_x: usize, control_points_y: usize) -> Self {
        self.control_points_x = control_points_x;
        self.control_points_y = control_points_y;
        self
    }

    #[must_use]
    pub fn with_interpolation(mut self, interpolation: usize) -> Self {
        self.interpolation = interpolation;
        self
    }

    #[must_use]
    pub fn with_tolerance(mut self, tolerance: Tolerance) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn validate(&self) -> Result<(), SurfaceError> {
        if self.control_points_x < MIN_SPLINE_POINTS {
            return Err(SurfaceError::NotEnoughControlPoints {
                axis: Axis::X,
                min: MIN_SPLINE_POINTS,
                found: self.control_points_x,
            });
        }
        if self.control_points_y < MIN_SPLINE_POINTS {
            return Err(SurfaceError::NotEnoughControlPoints {
                axis: Axis::Y,
                min: MIN_SPLINE_POINTS,
                found: self.control_points_y,
            });
        }
        if self.interpolation < 1 {
            return Err(SurfaceError::InvalidInterpolation);
        }
        self.segments().map(|_| ())
    }

    /// Grid segment counts `(segments_x, segments_y)`.
    ///
    /// Fails with [`SurfaceError::TooLarge`] when the counts overflow or the
    /// resulting grid cannot be indexed with `u32`.
    pub fn segments(&self) -> Result<(usize, usize), SurfaceError> {
        let too_large = || SurfaceError::TooLarge {
            control_points_x: self.control_points_x,
            control_points_y: self.control_points_y,
            interpolation: self.interpolation,
        };
        let segments_x =
            segments_for(self.control_points_x, self.interpolation).ok_or_else(too_large)?;
        let segments_y =
            segments_for(self.control_points_y, self.interpolation).ok_or_else(too_large)?;
        segments_x
            .checked_add(1)
            .zip(segments_y.checked_add(1))
            .and_then(|(cols, rows)| cols.checked_mul(rows))
            .filter(|&count| fits_u32_indices(count))
            .ok_or_else(too_large)?;
        Ok((segments_x, segments_y))
    }
}

fn segments_for(control_points: usize, interpolation: usize) -> Option<usize> {
    let spans = control_points.saturating_sub(1);
    interpolation.checked_mul(spans)?.checked_add(spans)
}

#[derive(Debug, Clone, PartialEq)]
pub struct ControlledSurface {
    grid: Grid,
    interpolation: usize,
    control_points_x: usize,
    control_points_y: usize,
    control_indices: Vec<usize>,
    control_points: Vec<Point3>,
    tolerance: Tolerance,
    stale: bool,
}

impl ControlledSurface {
    /// Builds the surface and runs an initial reconciliation.
    pub fn new(options: SurfaceOptions) -> Result<Self, SurfaceError> {
        let mut surface = Self::build(options)?;
        surface.reconcile()?;
        Ok(surface)
    }

    /// Builds the flat grid and control overlay without reconciling.
    ///
    /// Control positions are read from the flat grid, so the result is already
    /// consistent with them.
    pub fn build(options: SurfaceOptions) -> Result<Self, SurfaceError> {
        options.validate()?;
        let (segments_x, segments_y) = options.segments()?;

        let mut metrics = GeomMetrics::default();
        metrics.begin();
        let grid = metrics.time(TimingBucket::GridBuild, || {
            Grid::new(segments_x, segments_y, options.size_x, options.size_y)
        })?;

        let control_indices = control_indices_for(&grid, options.interpolation);
        let control_points = control_indices
            .iter()
            .map(|&index| grid.point(index))
            .collect::<Result<Vec<_>, _>>()?;

        log::debug!(
            "controlled surface: {}x{} control points, interpolation {}, {} vertices",
            options.control_points_x,
            options.control_points_y,
            options.interpolation,
            grid.vertex_count()
        );
        if let Some(report) = metrics.end() {
            log::trace!("grid build took {} ns", report.grid_build_ns);
        }

        Ok(Self {
            grid,
            interpolation: options.interpolation,
            control_points_x: options.control_points_x,
            control_points_y: options.control_points_y,
            control_indices,
            control_points,
            tolerance: options.tolerance,
            stale: false,
        })
    }

    #[must_use]
    pub const fn grid(&self) -> &Grid {
        &self.grid
    }

    #[must_use]
    pub const fn interpolation(&self) -> usize {
        self.interpolation
    }

    #[must_use]
    pub const fn control_points_x(&self) -> usize {
        self.control_points_x
    }

    #[must_use]
    pub const fn control_points_y(&self) -> usize {
        self.control_points_y
    }

    #[must_use]
    pub fn control_point_count(&self) -> usize {
        self.control_points.len()
    }

    /// Grid vertex index of every control point, ordered by control index.
    #[must_use]
    pub fn control_indices(&self) -> &[usize] {
        &self.control_indices
    }

    /// Authoritative control positions, ordered by control index.
    #[must_use]
    pub fn control_points(&self) -> &[Point3] {
        &self.control_points
    }

    pub fn control_index(&self, control: usize) -> Result<usize, SurfaceError> {
        self.check_control(control)?;
        Ok(self.control_indices[control])
    }

    pub fn control_point(&self, control: usize) -> Result<Point3, SurfaceError> {
        self.check_control(control)?;
        Ok(self.control_points[control])
    }

    /// `(band, column)` of a control point in the lattice.
    pub fn control_lattice_position(&self, control: usize) -> Result<(usize, usize), SurfaceError> {
        self.check_control(control)?;
        Ok((control / self.control_points_y, control % self.control_points_y))
    }

    /// Control index of lattice cell `(band, column)`, or `None` outside the lattice.
    #[must_use]
    pub fn control_at(&self, band: usize, column: usize) -> Option<usize> {
        (band < self.control_points_x && column < self.control_points_y)
            .then(|| band * self.control_points_y + column)
    }

    /// True when control positions changed (or the last reconcile failed) and
    /// the derived vertices no longer match them.
    #[must_use]
    pub const fn is_stale(&self) -> bool {
        self.stale
    }

    pub fn move_control_point(&mut self, control: usize, position: Point3) -> Result<(), SurfaceError> {
        self.check_control(control)?;
        if !position.is_finite() {
            return Err(SurfaceError::NonFiniteCoordinate);
        }
        self.control_points[control] = position;
        self.grid.set_point(self.control_indices[control], position)?;
        self.stale = true;
        Ok(())
    }

    pub fn move_control_point_x(&mut self, control: usize, x: f64) -> Result<(), SurfaceError> {
        let current = self.control_point(control)?;
        self.move_control_point(control, Point3::new(x, current.y, current.z))
    }

    pub fn move_control_point_y(&mut self, control: usize, y: f64) -> Result<(), SurfaceError> {
        let current = self.control_point(control)?;
        self.move_control_point(control, Point3::new(current.x, y, current.z))
    }

    pub fn move_control_point_z(&mut self, control: usize, z: f64) -> Result<(), SurfaceError> {
        let current = self.control_point(control)?;
        self.move_control_point(control, Point3::new(current.x, current.y, z))
    }

    pub fn translate_control_point(&mut self, control: usize, offset: Vec3) -> Result<(), SurfaceError> {
        let mut position = self.control_point(control)?;
        position.translate(offset);
        self.move_control_point(control, position)
    }

    /// Re-derives every grid vertex from the current control positions.
    ///
    /// The sweep always runs in full. On error the grid is left partially
    /// updated and [`is_stale`](Self::is_stale) stays true until a later call
    /// succeeds.
    pub fn reconcile(&mut self) -> Result<ReconcileDiagnostics, SurfaceError> {
        self.stale = true;
        let mut diagnostics = ReconcileDiagnostics::new();
        let mut metrics = GeomMetrics::default();
        metrics.begin();

        let result = metrics
            .time(TimingBucket::ColumnPass, || self.column_pass(&mut diagnostics))
            .and_then(|()| metrics.time(TimingBucket::RowPass, || self.row_pass(&mut diagnostics)))
            .and_then(|()| {
                metrics.time(TimingBucket::InteriorPass, || self.interior_pass(&mut diagnostics))
            })
            .and_then(|()| {
                metrics.time(TimingBucket::ControlResync, || self.resync_controls(&mut diagnostics))
            });

        if let Err(err) = result {
            log::warn!("surface reconciliation failed, grid is stale: {err}");
            return Err(err);
        }

        diagnostics.timing = metrics.end();
        self.stale = false;
        log::debug!("surface reconciled: {diagnostics}");
        Ok(diagnostics)
    }

    #[must_use]
    pub fn positions(&self) -> &[[f64; 3]] {
        self.grid.positions()
    }

    #[must_use]
    pub fn positions_flat(&self) -> &[f64] {
        self.grid.positions_flat()
    }

    #[must_use]
    pub fn indices(&self) -> &[u32] {
        self.grid.indices()
    }

    #[must_use]
    pub fn to_mesh(&self) -> GeomMesh {
        self.grid.to_mesh()
    }

    // Vertices between two consecutive X bands of control points.
    fn band_stride(&self) -> usize {
        (self.interpolation + 1) * self.grid.row_len()
    }

    fn check_control(&self, control: usize) -> Result<(), SurfaceError> {
        if control < self.control_points.len() {
            Ok(())
        } else {
            Err(SurfaceError::ControlIndexOutOfRange {
                index: control,
                count: self.control_points.len(),
            })
        }
    }

    fn spline_through(
        &self,
        pass: ReconcilePass,
        line: usize,
        points: &[Point3],
    ) -> Result<Spline, SurfaceError> {
        Spline::new(points, self.interpolation)
            .map_err(|source| SurfaceError::Spline { pass, line, source })
    }

    // Writes `line` into the grid starting at `start`, stepping by `stride`.
    fn write_line(
        &mut self,
        start: usize,
        stride: usize,
        line: &[Point3],
        diagnostics: &mut ReconcileDiagnostics,
    ) -> Result<(), SurfaceError> {
        for (step, point) in line.iter().enumerate() {
            self.grid.set_point(start + step * stride, *point)?;
        }
        diagnostics.spline_count += 1;
        diagnostics.vertices_written += line.len();
        Ok(())
    }

    fn column_pass(&mut self, diagnostics: &mut ReconcileDiagnostics) -> Result<(), SurfaceError> {
        let cpy = self.control_points_y;
        for band in 0..self.control_points_x {
            let points = &self.control_points[band * cpy..(band + 1) * cpy];
            let spline = self.spline_through(ReconcilePass::Column, band, points)?;
            self.write_line(band * self.band_stride(), 1, spline.spline_line(), diagnostics)?;
        }
        Ok(())
    }

    fn row_pass(&mut self, diagnostics: &mut ReconcileDiagnostics) -> Result<(), SurfaceError> {
        let cpy = self.control_points_y;
        let row_len = self.grid.row_len();
        for column in 0..cpy {
            let points: Vec<Point3> = (0..self.control_points_x)
                .map(|band| self.control_points[band * cpy + column])
                .collect();
            let spline = self.spline_through(ReconcilePass::Row, column, &points)?;
            let start = column * (self.interpolation + 1);
            self.write_line(start, row_len, spline.spline_line(), diagnostics)?;
        }
        Ok(())
    }

    fn interior_pass(&mut self, diagnostics: &mut ReconcileDiagnostics) -> Result<(), SurfaceError> {
        let row_len = self.grid.row_len();
        let band_stride = self.band_stride();
        for column in 0..self.control_points_y - 1 {
            for offset in 1..=self.interpolation {
                let sub_column = column * (self.interpolation + 1) + offset;
                let points = (0..self.control_points_x)
                    .map(|band| self.grid.point(band * band_stride + sub_column))
                    .collect::<Result<Vec<_>, _>>()?;
                let spline = self.spline_through(ReconcilePass::Interior, sub_column, &points)?;
                self.write_line(sub_column, row_len, spline.spline_line(), diagnostics)?;
            }
        }
        Ok(())
    }

    fn resync_controls(&mut self, diagnostics: &mut ReconcileDiagnostics) -> Result<(), SurfaceError> {
        let mut max_drift: f64 = 0.0;
        for (&index, &position) in self.control_indices.iter().zip(&self.control_points) {
            let derived = self.grid.point(index)?;
            max_drift = max_drift.max(derived.distance_to(position));
            self.grid.set_point(index, position)?;
        }

        diagnostics.control_points_resynced = self.control_indices.len();
        diagnostics.max_control_drift = max_drift;
        if max_drift > self.tolerance.eps {
            log::warn!("control vertices drifted {max_drift:e} during reconciliation");
            diagnostics.add_warning(format!(
                "control vertices drifted {max_drift:e} before resync (tolerance {:e})",
                self.tolerance.eps
            ));
        }
        Ok(())
    }
}

/// Grid indices of the control lattice: every `interpolation + 1`-th X band,
/// and within it every `interpolation + 1`-th vertex.
fn control_indices_for(grid: &Grid, interpolation: usize) -> Vec<usize> {
    let step = interpolation + 1;
    let mut indices = Vec::new();
    for ix in (0..=grid.segments_x()).step_by(step) {
        for iy in (0..=grid.segments_y()).step_by(step) {
            indices.extend(grid.index_of(ix, iy));
        }
    }
    indices
}
