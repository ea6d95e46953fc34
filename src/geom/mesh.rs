#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MeshError {
    #[error("mesh indices are not a triangle list (len {len})")]
    NotATriangleList { len: usize },
    #[error("mesh vertex {vertex} has non-finite coordinates")]
    NonFiniteVertex { vertex: usize },
    #[error("mesh index {index} out of range (vertex count {vertex_count})")]
    IndexOutOfRange { index: u32, vertex_count: usize },
}

/// Position and triangle-index buffers ready for a renderer.
///
/// Positions are stored per vertex; [`GeomMesh::positions_flat`] exposes them as
/// the packed `[x0, y0, z0, x1, ...]` layout most GPU APIs expect.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GeomMesh {
    pub positions: Vec<[f64; 3]>,
    pub indices: Vec<u32>,
}

impl GeomMesh {
    #[must_use]
    pub fn new(positions: Vec<[f64; 3]>, indices: Vec<u32>) -> Self {
        Self { positions, indices }
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    /// Returns true if any vertex position contains NaN or Inf values.
    #[must_use]
    pub fn has_invalid_vertices(&self) -> bool {
        self.positions.iter().any(|p| {
            !p[0].is_finite() || !p[1].is_finite() || !p[2].is_finite()
        })
    }

    /// Returns true if all vertex indices are within bounds.
    #[must_use]
    pub fn has_valid_indices(&self) -> bool {
        let n = self.positions.len() as u32;
        self.indices.iter().all(|&i| i < n)
    }

    /// Returns true if indices represent a triangle list.
    #[must_use]
    pub fn has_triangle_indices(&self) -> bool {
        self.indices.len() % 3 == 0
    }

    pub fn validate(&self) -> Result<(), MeshError> {
        if !self.has_triangle_indices() {
            return Err(MeshError::NotATriangleList {
                len: self.indices.len(),
            });
        }
        if let Some(vertex) = self
            .positions
            .iter()
            .position(|p| !p.iter().all(|c| c.is_finite()))
        {
            return Err(MeshError::NonFiniteVertex { vertex });
        }
        let vertex_count = self.positions.len();
        if let Some(&index) = self.indices.iter().find(|&&i| i as usize >= vertex_count) {
            return Err(MeshError::IndexOutOfRange {
                index,
                vertex_count,
            });
        }
        Ok(())
    }

    /// Returns the position buffer as a flat slice: `[x0, y0, z0, x1, y1, z1, ...]`.
    ///
    /// This is a zero-copy view over `positions`, useful for wasm/JS adapters that
    /// expect packed numeric buffers.
    #[must_use]
    pub fn positions_flat(&self) -> &[f64] {
        flatten_positions(&self.positions)
    }
}

pub(crate) fn flatten_positions(data: &[[f64; 3]]) -> &[f64] {
    data.as_flattened()
}

/// True when every vertex of a mesh with `vertex_count` vertices is addressable
/// by a `u32` index.
pub(crate) fn fits_u32_indices(vertex_count: usize) -> bool {
    vertex_count == 0 || u32::try_from(vertex_count - 1).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_positions_flat_is_packed_xyz() {
        let mesh = GeomMesh::new(vec![[1.0, 2.0, 3.0], [4.0, 5.0, 6.0]], vec![]);
        assert_eq!(mesh.positions_flat(), &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
    }

    #[test]
    fn test_validate_flags_bad_indices() {
        let mesh = GeomMesh::new(vec![[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]], vec![0, 1, 3]);
        assert_eq!(
            mesh.validate(),
            Err(MeshError::IndexOutOfRange { index: 3, vertex_count: 3 })
        );

        let mesh = GeomMesh::new(vec![[0.0; 3], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]], vec![0, 1]);
        assert_eq!(mesh.validate(), Err(MeshError::NotATriangleList { len: 2 }));

        let mesh = GeomMesh::new(vec![[0.0; 3], [f64::NAN; 3]], vec![]);
        assert!(mesh.has_invalid_vertices());
        assert_eq!(mesh.validate(), Err(MeshError::NonFiniteVertex { vertex: 1 }));
    }

    #[test]
    fn test_u32_index_range() {
        assert!(fits_u32_indices(0));
        assert!(fits_u32_indices(1));
        assert!(fits_u32_indices(u32::MAX as usize));
        if let Some(count) = (u32::MAX as usize).checked_add(1) {
            assert!(fits_u32_indices(count));
            assert!(!fits_u32_indices(count + 1));
        }
    }
}
