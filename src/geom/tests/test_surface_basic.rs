use crate::geom::{
    ControlledSurface, Grid, Point3, ReconcilePass, SurfaceError, SurfaceOptions, Tolerance, Vec3,
};

fn small_surface() -> ControlledSurface {
    // 3x3 control points, one derived vertex between controls: 4x4 segments
    let options = SurfaceOptions::default()
        .with_control_points(3, 3)
        .with_interpolation(1);
    ControlledSurface::new(options).unwrap()
}

fn z_at(surface: &ControlledSurface, ix: usize, iy: usize) -> f64 {
    let index = surface.grid().index_of(ix, iy).unwrap();
    surface.grid().point(index).unwrap().z
}

#[test]
fn default_options_build_a_twenty_unit_surface() {
    let surface = ControlledSurface::new(SurfaceOptions::default()).unwrap();
    assert_eq!(surface.grid().segments_x(), 6);
    assert_eq!(surface.grid().segments_y(), 6);
    assert_eq!(surface.control_point_count(), 9);
    assert_eq!(surface.control_indices().len(), 9);
    assert_eq!(surface.grid().triangle_count(), 6 * 6 * 2);
    assert!(!surface.is_stale());
}

#[test]
fn untouched_lattice_reproduces_the_flat_grid() {
    let options = SurfaceOptions::default()
        .with_size(20.0, 12.0)
        .with_control_points(4, 5)
        .with_interpolation(3);
    let surface = ControlledSurface::new(options).unwrap();
    let (segments_x, segments_y) = options.segments().unwrap();
    let flat = Grid::new(segments_x, segments_y, 20.0, 12.0).unwrap();

    let tol = Tolerance::DEFAULT;
    assert_eq!(surface.grid().vertex_count(), flat.vertex_count());
    for (reconciled, expected) in surface.positions().iter().zip(flat.positions()) {
        assert!(
            tol.approx_eq_point3(Point3::from(*reconciled), Point3::from(*expected)),
            "{reconciled:?} != {expected:?}"
        );
    }
    assert_eq!(surface.indices(), flat.indices());
}

#[test]
fn lifting_the_center_control_raises_a_smooth_bump() {
    let mut surface = small_surface();
    surface.move_control_point_z(4, 5.0).unwrap();
    let diagnostics = surface.reconcile().unwrap();

    let tol = Tolerance::DEFAULT;
    assert_eq!(z_at(&surface, 2, 2), 5.0);

    // boundary splines only see flat controls
    for i in 0..=4 {
        for (ix, iy) in [(0, i), (4, i), (i, 0), (i, 4)] {
            assert!(tol.approx_eq_f64(z_at(&surface, ix, iy), 0.0), "({ix}, {iy}) lifted");
        }
    }

    // monotonic toward the peak, no overshoot
    for path in [[(2, 0), (2, 1), (2, 2)], [(0, 2), (1, 2), (2, 2)]] {
        let heights = path.map(|(ix, iy)| z_at(&surface, ix, iy));
        assert!(heights[0] < heights[1] && heights[1] < heights[2], "{path:?}: {heights:?}");
    }
    assert!(surface.positions().iter().all(|p| p[2] >= -1e-12 && p[2] <= 5.0 + 1e-12));

    // cubic through (0, 5, 0) with chained end handles peaks at 3.75 halfway
    assert!(tol.approx_eq_f64(z_at(&surface, 2, 1), 3.75));
    assert!(tol.approx_eq_f64(z_at(&surface, 1, 2), 3.75));
    assert!(tol.approx_eq_f64(z_at(&surface, 1, 1), 0.75 * 3.75));
    assert!(tol.approx_eq_f64(z_at(&surface, 3, 3), z_at(&surface, 1, 1)));

    assert!(diagnostics.max_control_drift <= Tolerance::ZERO_LENGTH.eps);
    assert!(diagnostics.is_clean());
}

#[test]
fn reconcile_is_idempotent() {
    let mut surface = small_surface();
    surface.move_control_point_z(1, 2.0).unwrap();
    surface.translate_control_point(5, Vec3::new(0.5, -1.0, 3.0)).unwrap();

    surface.reconcile().unwrap();
    let first = surface.positions().to_vec();
    surface.reconcile().unwrap();
    assert_eq!(surface.positions(), first.as_slice());
}

#[test]
fn control_vertices_end_at_their_authoritative_positions() {
    let mut surface = small_surface();
    surface.move_control_point(0, Point3::new(-11.0, -9.0, 1.0)).unwrap();
    surface.move_control_point_z(8, -2.0).unwrap();
    surface.reconcile().unwrap();

    for (k, &index) in surface.control_indices().iter().enumerate() {
        assert_eq!(
            surface.grid().point(index).unwrap(),
            surface.control_point(k).unwrap()
        );
    }
}

#[test]
fn restoring_a_control_restores_the_flat_grid() {
    let mut surface = small_surface();
    let flat = surface.positions().to_vec();

    surface.move_control_point_z(4, 5.0).unwrap();
    surface.reconcile().unwrap();
    surface.move_control_point_z(4, 0.0).unwrap();
    surface.reconcile().unwrap();

    let tol = Tolerance::DEFAULT;
    for (p, q) in surface.positions().iter().zip(&flat) {
        assert!(tol.approx_eq_point3(Point3::from(*p), Point3::from(*q)));
    }
}

#[test]
fn edits_touch_only_the_control_vertex_until_reconcile() {
    let mut surface = small_surface();
    let before = surface.positions().to_vec();

    surface.move_control_point_z(4, 2.0).unwrap();
    let changed: Vec<usize> = surface
        .positions()
        .iter()
        .zip(&before)
        .enumerate()
        .filter_map(|(i, (p, q))| (p != q).then_some(i))
        .collect();
    assert_eq!(changed, vec![surface.control_index(4).unwrap()]);
    assert!(surface.is_stale());
}

#[test]
fn degenerate_edit_fails_then_recovers() {
    let mut surface = small_surface();
    let original = surface.control_point(3).unwrap();

    // control 3 onto control 5 folds X band 1 back on itself
    surface.move_control_point(3, surface.control_point(5).unwrap()).unwrap();
    let err = surface.reconcile().unwrap_err();
    assert!(matches!(err, SurfaceError::Spline { pass: ReconcilePass::Column, line: 1, .. }));
    assert!(surface.is_stale());

    surface.move_control_point(3, original).unwrap();
    surface.reconcile().unwrap();
    assert!(!surface.is_stale());
}

#[test]
fn options_deserialize_with_defaults() {
    use serde::Deserialize;
    use serde::de::value::{Error, MapDeserializer};

    let fields = [("controlPointsX", 5_u64), ("interpolation", 4_u64)];
    let options =
        SurfaceOptions::deserialize(MapDeserializer::<_, Error>::new(fields.into_iter())).unwrap();

    assert_eq!(options.control_points_x, 5);
    assert_eq!(options.control_points_y, 3);
    assert_eq!(options.interpolation, 4);
    assert_eq!(options.size_x, 20.0);
    assert_eq!(options.tolerance, Tolerance::LOOSE);
}
