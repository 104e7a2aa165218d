//! Conversions between linear indices, subscripts, and physical slots
//!
//! Linear indices are zero-based and column-major: the first dimension
//! varies fastest. Subscripts are one-based, one entry per axis. Physical
//! slots are `(row, column)` pairs in the rank-2 view of an array where
//! every combination of the higher axes is a `rows x cols` page stacked
//! below the previous one.
//!
//! Everything else in the crate addresses cells through these functions.

/// Column-major strides for a shape
pub fn compute_strides(shape: &[usize]) -> Vec<usize> {
    let mut strides = Vec::with_capacity(shape.len());
    let mut stride = 1;
    for &dim in shape {
        strides.push(stride);
        stride *= dim;
    }
    strides
}

/// Convert a linear index into a one-based subscript
pub fn linear_to_subscript(shape: &[usize], index: usize) -> Vec<usize> {
    let mut subscript = Vec::with_capacity(shape.len());
    let mut rest = index;
    for &dim in shape {
        let dim = dim.max(1);
        subscript.push(rest % dim + 1);
        rest /= dim;
    }
    subscript
}

/// Convert a one-based subscript into a linear index
///
/// Missing trailing entries are treated as `1`. Entries past the shape's
/// rank must be `1`. Returns `None` if any entry is out of range.
pub fn subscript_to_linear(shape: &[usize], subscript: &[usize]) -> Option<usize> {
    let mut index = 0;
    let mut stride = 1;
    for (axis, &sub) in subscript.iter().enumerate() {
        let dim = shape.get(axis).copied().unwrap_or(1);
        if sub == 0 || sub > dim {
            return None;
        }
        index += (sub - 1) * stride;
        stride *= dim;
    }
    Some(index)
}

/// Convert a linear index into a physical `(row, column)` slot
pub fn linear_to_physical(rows: usize, cols: usize, index: usize) -> (usize, usize) {
    let rows = rows.max(1);
    let page_len = rows * cols.max(1);
    let page = index / page_len;
    let within_page = index % page_len;
    (page * rows + within_page % rows, within_page / rows)
}

/// Convert a physical `(row, column)` slot into a linear index
pub fn physical_to_linear(rows: usize, cols: usize, row: usize, col: usize) -> usize {
    let rows = rows.max(1);
    let page = row / rows;
    page * rows * cols + col * rows + row % rows
}

/// Convert a one-based subscript into a physical `(row, column)` slot
pub fn subscript_to_physical(shape: &[usize], subscript: &[usize]) -> Option<(usize, usize)> {
    let index = subscript_to_linear(shape, subscript)?;
    let rows = shape.first().copied().unwrap_or(1);
    let cols = shape.get(1).copied().unwrap_or(1);
    Some(linear_to_physical(rows, cols, index))
}

/// Decode a linear index into zero-based coordinates using a stride table
pub(crate) fn decode(shape: &[usize], strides: &[usize], index: usize, coords: &mut [usize]) {
    for ((coord, &dim), &stride) in coords.iter_mut().zip(shape).zip(strides) {
        *coord = if dim == 0 { 0 } else { (index / stride) % dim };
    }
}

/// Encode zero-based coordinates into a linear index using a stride table
pub(crate) fn encode(strides: &[usize], coords: &[usize]) -> usize {
    strides.iter().zip(coords).map(|(s, c)| s * c).sum()
}
