use crate::geom::{ExtrusionError, Point3, Vec3, extrude_polyline_ribbon};

#[test]
fn extrude_open_polyline_produces_a_quad_strip() {
    let profile = [
        Point3::new(0.0, 0.0, 0.0),
        Point3::new(1.0, 0.0, 0.0),
    ];

    let mesh = extrude_polyline_ribbon(&profile, Vec3::new(0.0, 0.0, 1.0)).unwrap();

    assert_eq!(mesh.vertex_count(), 4);
    assert_eq!(mesh.triangle_count(), 2);
    assert_eq!(mesh.indices, vec![0, 1, 3, 3, 2, 0]);
    assert_eq!(mesh.positions[1], [0.0, 0.0, 1.0]);
    assert_eq!(mesh.positions[3], [1.0, 0.0, 1.0]);
}

#[test]
fn ribbon_triangle_count_tracks_profile_length() {
    let profile: Vec<Point3> = (0..7)
        .map(|i| Point3::new(f64::from(i), f64::from(i % 2), 0.0))
        .collect();

    let mesh = extrude_polyline_ribbon(&profile, Vec3::new(0.0, 0.0, -2.0)).unwrap();

    assert_eq!(mesh.vertex_count(), 14);
    assert_eq!(mesh.triangle_count(), 12);
    assert!(mesh.validate().is_ok());
}

#[test]
fn extrude_rejects_bad_input() {
    let profile = [Point3::ORIGIN, Point3::new(1.0, 0.0, 0.0)];

    assert_eq!(
        extrude_polyline_ribbon(&profile, Vec3::ZERO).unwrap_err(),
        ExtrusionError::InvalidDirection
    );
    assert_eq!(
        extrude_polyline_ribbon(&profile, Vec3::new(f64::NAN, 0.0, 1.0)).unwrap_err(),
        ExtrusionError::InvalidDirection
    );
    assert_eq!(
        extrude_polyline_ribbon(&profile[..1], Vec3::Z).unwrap_err(),
        ExtrusionError::NotEnoughPoints { min: 2, found: 1 }
    );
    assert_eq!(
        extrude_polyline_ribbon(&[Point3::ORIGIN, Point3::new(0.0, f64::INFINITY, 0.0)], Vec3::Z)
            .unwrap_err(),
        ExtrusionError::NonFinitePoint { index: 1 }
    );
}
