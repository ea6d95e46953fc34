use super::mesh::{GeomMesh, fits_u32_indices};
use super::{Point3, Vec3};

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ExtrusionError {
    #[error("extrusion direction must be finite and non-zero")]
    InvalidDirection,
    #[error("profile point {index} is not finite")]
    NonFinitePoint { index: usize },
    #[error("profile requires at least {min} points, got {found}")]
    NotEnoughPoints { min: usize, found: usize },
    #[error("profile of {found} points exceeds the u32 vertex index range")]
    TooManyPoints { found: usize },
}

/// Sweeps an open polyline along `direction` into a single-sided ribbon.
///
/// Vertices are interleaved: even indices are the profile, odd indices the
/// profile displaced by `direction`. Each consecutive pair of profile points
/// contributes one quad as two triangles `(i, i+1, i+3)` and `(i+3, i+2, i)`.
pub fn extrude_polyline_ribbon(
    profile: &[Point3],
    direction: Vec3,
) -> Result<GeomMesh, ExtrusionError> {
    let direction = validate_direction(direction)?;
    if profile.len() < 2 {
        return Err(ExtrusionError::NotEnoughPoints {
            min: 2,
            found: profile.len(),
        });
    }
    if !profile.len().checked_mul(2).is_some_and(fits_u32_indices) {
        return Err(ExtrusionError::TooManyPoints {
            found: profile.len(),
        });
    }
    if let Some(index) = profile.iter().position(|p| !p.is_finite()) {
        return Err(ExtrusionError::NonFinitePoint { index });
    }

    let mut positions: Vec<[f64; 3]> = Vec::with_capacity(profile.len().saturating_mul(2));
    for p in profile {
        positions.push(p.to_array());
        positions.push(p.add_vec(direction).to_array());
    }

    let quad_count = profile.len() - 1;
    let mut indices: Vec<u32> = Vec::with_capacity(quad_count.saturating_mul(6));
    for quad in 0..quad_count {
        let i = (quad * 2) as u32;
        indices.extend_from_slice(&[i, i + 1, i + 3]);
        indices.extend_from_slice(&[i + 3, i + 2, i]);
    }

    log::debug!(
        "ribbon extrusion: {} profile points -> {} triangles",
        profile.len(),
        quad_count * 2
    );
    Ok(GeomMesh::new(positions, indices))
}

fn validate_direction(direction: Vec3) -> Result<Vec3, ExtrusionError> {
    if !direction.is_finite() || direction.normalized().is_none() {
        return Err(ExtrusionError::InvalidDirection);
    }
    Ok(direction)
}
