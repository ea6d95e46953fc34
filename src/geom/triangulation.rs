use super::mesh::fits_u32_indices;

/// Triangle list for a row-major vertex grid of `rows × cols` vertices.
///
/// Vertex `i = row * cols + col`. Every cell except those in the last row or
/// last column becomes two triangles `(i, i+1, i+cols+1)` and
/// `(i+cols+1, i+cols, i)`; no triangle wraps from the end of one row to the
/// start of the next. Grids too small to hold a cell, or too large for `u32`
/// indices, produce no triangles.
#[must_use]
pub fn triangulate_grid(rows: usize, cols: usize) -> Vec<u32> {
    if rows < 2 || cols < 2 {
        return Vec::new();
    }
    if !rows.checked_mul(cols).is_some_and(fits_u32_indices) {
        log::warn!("grid of {rows}x{cols} vertices exceeds the u32 index range");
        return Vec::new();
    }

    let quad_rows = rows - 1;
    let quad_cols = cols - 1;
    let mut indices = Vec::with_capacity(quad_rows * quad_cols * 6);

    let stride = cols;
    for row in 0..quad_rows {
        for col in 0..quad_cols {
            let i0 = (row * stride + col) as u32;
            let i1 = i0 + 1;
            let i2 = i0 + stride as u32;
            let i3 = i2 + 1;

            indices.extend_from_slice(&[i0, i1, i3]);
            indices.extend_from_slice(&[i3, i2, i0]);
        }
    }

    indices
}
