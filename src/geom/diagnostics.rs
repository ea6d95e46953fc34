//! Diagnostics for surface reconciliation.
//!
//! Every successful [`ControlledSurface::reconcile`](super::ControlledSurface::reconcile)
//! returns a [`ReconcileDiagnostics`] describing how much work the sweep did
//! and how far the spline passes left the control vertices from their
//! authoritative positions before the resync step restored them.
//!
//! # Example
//!
//! ```ignore
//! let diagnostics = surface.reconcile()?;
//! if diagnostics.max_control_drift > Tolerance::LOOSE.eps {
//!     for warning in &diagnostics.warnings {
//!         log::warn!("{warning}");
//!     }
//! }
//! ```

use std::fmt;

use serde::Serialize;

use super::metrics::GeomTimingReport;

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
pub struct ReconcileDiagnostics {
    /// Splines built across all three passes.
    pub spline_count: usize,

    /// Grid vertex writes performed by the spline passes (excluding resync).
    pub vertices_written: usize,

    /// Control vertices restored by the resync step.
    pub control_points_resynced: usize,

    /// Largest distance between a control vertex after the spline passes and
    /// its authoritative position.
    ///
    /// Both the column and the row pass revisit control vertices; this is the
    /// disagreement the resync step removes. Expected to be at floating-point
    /// noise level.
    pub max_control_drift: f64,

    /// Optional timing breakdown.
    ///
    /// Only populated when the `surface_engine_metrics` feature is enabled
    /// and the target is not WASM.
    pub timing: Option<GeomTimingReport>,

    /// Human-readable warnings about the reconciliation.
    pub warnings: Vec<String>,
}

impl ReconcileDiagnostics {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if no warnings were raised.
    #[must_use]
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    pub fn add_warning(&mut self, warning: impl Into<String>) {
        self.warnings.push(warning.into());
    }
}

impl fmt::Display for ReconcileDiagnostics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} splines, {} vertex writes, {} control points resynced, max drift {:.3e}",
            self.spline_count,
            self.vertices_written,
            self.control_points_resynced,
            self.max_control_drift
        )?;
        if !self.warnings.is_empty() {
            write!(f, ", {} warning(s)", self.warnings.len())?;
        }
        Ok(())
    }
}
