//! Opt-in timing/profiling hooks for surface reconciliation.
//!
//! Timing is only active when the `surface_engine_metrics` feature is enabled
//! and the target is not WASM (`std::time::Instant` is unavailable there).
//! When disabled, all timing calls compile to no-ops.
//!
//! # Usage
//!
//! ```ignore
//! use spline_surface_engine::geom::{GeomMetrics, TimingBucket};
//!
//! let mut metrics = GeomMetrics::default();
//! metrics.begin();
//!
//! let written = metrics.time(TimingBucket::ColumnPass, || {
//!     run_column_pass()
//! });
//!
//! if let Some(report) = metrics.end() {
//!     println!("column pass: {} ns", report.column_pass_ns);
//! }
//! ```

/// Categories for timing the phases of grid construction and reconciliation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimingBucket {
    /// Flat grid generation and triangulation.
    GridBuild,
    /// Splines along the Y axis through each X band of control points.
    ColumnPass,
    /// Splines along the X axis through each column of control points.
    RowPass,
    /// Splines filling the sub-columns between control columns.
    InteriorPass,
    /// Writing authoritative control positions back into the grid.
    ControlResync,
    /// Ribbon extrusion of spline polylines.
    Extrusion,
}

/// Timing report with nanosecond precision for each bucket.
///
/// All fields are cumulative—multiple calls to the same bucket add to the total.
#[derive(Debug, Default, Clone, PartialEq, Eq, serde::Serialize)]
pub struct GeomTimingReport {
    pub grid_build_ns: u64,
    pub column_pass_ns: u64,
    pub row_pass_ns: u64,
    pub interior_pass_ns: u64,
    pub control_resync_ns: u64,
    pub extrusion_ns: u64,
}

impl GeomTimingReport {
    /// Returns the total time across all buckets in nanoseconds.
    #[must_use]
    pub fn total_ns(&self) -> u64 {
        self.grid_build_ns
            .saturating_add(self.column_pass_ns)
            .saturating_add(self.row_pass_ns)
            .saturating_add(self.interior_pass_ns)
            .saturating_add(self.control_resync_ns)
            .saturating_add(self.extrusion_ns)
    }

    /// Returns the total time in milliseconds (for display purposes).
    #[must_use]
    pub fn total_ms(&self) -> f64 {
        self.total_ns() as f64 / 1_000_000.0
    }
}

/// Accumulator for timing geometry operations.
///
/// Create an instance, call [`begin`](Self::begin) to reset, wrap operations
/// with [`time`](Self::time), and call [`end`](Self::end) to retrieve the report.
#[derive(Debug, Default, Clone)]
pub struct GeomMetrics {
    #[cfg(all(feature = "surface_engine_metrics", not(target_arch = "wasm32")))]
    report: GeomTimingReport,
}

impl GeomMetrics {
    /// Resets all timing counters to zero.
    pub fn begin(&mut self) {
        #[cfg(all(feature = "surface_engine_metrics", not(target_arch = "wasm32")))]
        {
            self.report = GeomTimingReport::default();
        }
    }

    /// Returns the accumulated timing report, or `None` if metrics are disabled.
    #[must_use]
    pub fn end(&self) -> Option<GeomTimingReport> {
        #[cfg(all(feature = "surface_engine_metrics", not(target_arch = "wasm32")))]
        {
            Some(self.report.clone())
        }
        #[cfg(not(all(feature = "surface_engine_metrics", not(target_arch = "wasm32"))))]
        {
            None
        }
    }

    /// Times the execution of `f` and accumulates the elapsed time in `bucket`.
    ///
    /// When metrics are disabled, this simply calls `f()` with no overhead.
    pub fn time<R>(&mut self, bucket: TimingBucket, f: impl FnOnce() -> R) -> R {
        #[cfg(all(feature = "surface_engine_metrics", not(target_arch = "wasm32")))]
        {
            let start = std::time::Instant::now();
            let result = f();
            let elapsed = start.elapsed();
            // Cap at u64::MAX to prevent overflow
            let nanos_u64 = elapsed.as_nanos().min(u128::from(u64::MAX)) as u64;
            self.add_to_bucket(bucket, nanos_u64);
            result
        }

        #[cfg(not(all(feature = "surface_engine_metrics", not(target_arch = "wasm32"))))]
        {
            let _ = bucket;
            f()
        }
    }

    #[cfg(all(feature = "surface_engine_metrics", not(target_arch = "wasm32")))]
    fn add_to_bucket(&mut self, bucket: TimingBucket, nanos: u64) {
        let slot = match bucket {
            TimingBucket::GridBuild => &mut self.report.grid_build_ns,
            TimingBucket::ColumnPass => &mut self.report.column_pass_ns,
            TimingBucket::RowPass => &mut self.report.row_pass_ns,
            TimingBucket::InteriorPass => &mut self.report.interior_pass_ns,
            TimingBucket::ControlResync => &mut self.report.control_resync_ns,
            TimingBucket::Extrusion => &mut self.report.extrusion_ns,
        };
        *slot = slot.saturating_add(nanos);
    }
}
