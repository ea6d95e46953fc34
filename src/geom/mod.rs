mod core;
mod curve;
mod diagnostics;
mod extrusion;
mod grid;
mod mesh;
mod metrics;
mod spline;
mod surface;
mod triangulation;

pub use self::core::{Point3, Tolerance, Vec3};
pub use curve::{CubicBezier3, Curve3, CurveError, sample_cubic_bezier};
pub use diagnostics::ReconcileDiagnostics;
pub use extrusion::{ExtrusionError, extrude_polyline_ribbon};
pub use grid::{Grid, GridError};
pub use mesh::{GeomMesh, MeshError};
pub use metrics::{GeomMetrics, GeomTimingReport, TimingBucket};
pub use spline::{BezierSegment, MIN_SPLINE_POINTS, Spline, SplineError, SplinePoint};
pub use surface::{
    Axis, ControlledSurface, ReconcilePass, SurfaceError, SurfaceOptions,
};
pub use triangulation::triangulate_grid;

#[cfg(test)]
mod tests;
