//! Regular vertex grid with a quad-as-two-triangles topology.
//!
//! Vertices are laid out row-major with X as the outer (slow) axis and Y as
//! the inner (fast) axis, so vertex `(ix, iy)` lives at flat index
//! `ix * (segments_y + 1) + iy`. A run of `segments_y + 1` vertices sharing
//! the same `ix` is called an X band.

use super::core::{Point3, Vec3};
use super::mesh::{GeomMesh, fits_u32_indices, flatten_positions};
use super::triangulation::triangulate_grid;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum GridError {
    #[error("grid needs at least 1 segment per axis, got {segments_x}x{segments_y}")]
    InvalidSegments { segments_x: usize, segments_y: usize },
    #[error("grid size must be finite and positive, got {size_x}x{size_y}")]
    InvalidSize { size_x: f64, size_y: f64 },
    #[error("grid of {segments_x}x{segments_y} segments exceeds the u32 vertex index range")]
    TooManyVertices { segments_x: usize, segments_y: usize },
    #[error("grid height must be finite")]
    NonFiniteHeight,
    #[error("grid vertex index {index} out of range (vertex count {len})")]
    IndexOutOfRange { index: usize, len: usize },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Grid {
    segments_x: usize,
    segments_y: usize,
    size_x: f64,
    size_y: f64,
    z: f64,
    positions: Vec<[f64; 3]>,
    indices: Vec<u32>,
}

impl Grid {
    /// Flat grid centered on the origin at height 0.
    pub fn new(
        segments_x: usize,
        segments_y: usize,
        size_x: f64,
        size_y: f64,
    ) -> Result<Self, GridError> {
        Self::with_z(segments_x, segments_y, size_x, size_y, 0.0)
    }

    /// Flat grid spanning `[-size_x/2, size_x/2] × [-size_y/2, size_y/2]` at height `z`.
    pub fn with_z(
        segments_x: usize,
        segments_y: usize,
        size_x: f64,
        size_y: f64,
        z: f64,
    ) -> Result<Self, GridError> {
        if segments_x == 0 || segments_y == 0 {
            return Err(GridError::InvalidSegments {
                segments_x,
                segments_y,
            });
        }
        let valid_size = |s: f64| s.is_finite() && s > 0.0;
        if !valid_size(size_x) || !valid_size(size_y) {
            return Err(GridError::InvalidSize { size_x, size_y });
        }
        if !z.is_finite() {
            return Err(GridError::NonFiniteHeight);
        }
        let vertex_count = segments_x
            .checked_add(1)
            .zip(segments_y.checked_add(1))
            .and_then(|(rows, cols)| rows.checked_mul(cols))
            .filter(|&count| fits_u32_indices(count))
            .ok_or(GridError::TooManyVertices {
                segments_x,
                segments_y,
            })?;

        let delta_x = size_x / segments_x as f64;
        let delta_y = size_y / segments_y as f64;
        let half_x = size_x / 2.0;
        let half_y = size_y / 2.0;

        let mut positions = Vec::with_capacity(vertex_count);
        for ix in 0..=segments_x {
            let x = ix as f64 * delta_x - half_x;
            for iy in 0..=segments_y {
                let y = iy as f64 * delta_y - half_y;
                positions.push([x, y, z]);
            }
        }

        let indices = triangulate_grid(segments_x + 1, segments_y + 1);

        log::debug!(
            "grid built: {segments_x}x{segments_y} segments, {} vertices, {} triangles",
            positions.len(),
            indices.len() / 3
        );

        Ok(Self {
            segments_x,
            segments_y,
            size_x,
            size_y,
            z,
            positions,
            indices,
        })
    }

    #[must_use]
    pub const fn segments_x(&self) -> usize {
        self.segments_x
    }

    #[must_use]
    pub const fn segments_y(&self) -> usize {
        self.segments_y
    }

    #[must_use]
    pub const fn size_x(&self) -> f64 {
        self.size_x
    }

    #[must_use]
    pub const fn size_y(&self) -> f64 {
        self.size_y
    }

    /// Height the grid was generated at.
    #[must_use]
    pub const fn base_z(&self) -> f64 {
        self.z
    }

    /// Vertices per X band (`segments_y + 1`).
    #[must_use]
    pub const fn row_len(&self) -> usize {
        self.segments_y + 1
    }

    #[must_use]
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    #[must_use]
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    /// Flat index of vertex `(ix, iy)`, or `None` outside the grid.
    #[must_use]
    pub fn index_of(&self, ix: usize, iy: usize) -> Option<usize> {
        (ix <= self.segments_x && iy <= self.segments_y).then(|| ix * self.row_len() + iy)
    }

    pub fn point(&self, index: usize) -> Result<Point3, GridError> {
        self.positions
            .get(index)
            .map(|p| Point3::from_array(*p))
            .ok_or(GridError::IndexOutOfRange {
                index,
                len: self.positions.len(),
            })
    }

    pub fn set_point(&mut self, index: usize, point: Point3) -> Result<(), GridError> {
        *self.slot_mut(index)? = point.to_array();
        Ok(())
    }

    pub fn set_x(&mut self, index: usize, x: f64) -> Result<(), GridError> {
        self.slot_mut(index)?[0] = x;
        Ok(())
    }

    pub fn set_y(&mut self, index: usize, y: f64) -> Result<(), GridError> {
        self.slot_mut(index)?[1] = y;
        Ok(())
    }

    pub fn set_z(&mut self, index: usize, z: f64) -> Result<(), GridError> {
        self.slot_mut(index)?[2] = z;
        Ok(())
    }

    /// Moves vertex `index` in place by `offset`.
    pub fn translate_point(&mut self, index: usize, offset: Vec3) -> Result<(), GridError> {
        let slot = self.slot_mut(index)?;
        let mut point = Point3::from_array(*slot);
        point.translate(offset);
        *slot = point.to_array();
        Ok(())
    }

    #[must_use]
    pub fn positions(&self) -> &[[f64; 3]] {
        &self.positions
    }

    /// Packed `[x0, y0, z0, x1, ...]` view of the vertex positions.
    #[must_use]
    pub fn positions_flat(&self) -> &[f64] {
        flatten_positions(&self.positions)
    }

    #[must_use]
    pub fn indices(&self) -> &[u32] {
        &self.indices
    }

    #[must_use]
    pub fn to_mesh(&self) -> GeomMesh {
        GeomMesh::new(self.positions.clone(), self.indices.clone())
    }

    fn slot_mut(&mut self, index: usize) -> Result<&mut [f64; 3], GridError> {
        let len = self.positions.len();
        self.positions
            .get_mut(index)
            .ok_or(GridError::IndexOutOfRange { index, len })
    }
}
