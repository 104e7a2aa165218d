use std::fmt;

use ecow::{eco_vec, EcoVec};

use crate::{
    addressing::{linear_to_physical, physical_to_linear, subscript_to_linear},
    cell::text_to_numeric_array,
    ArrayError, ArrayResult, Cell, KindTag, Number, Shape,
};

/// An N-dimensional array of cells
///
/// Cells are stored in a single flat buffer in column-major order, so a
/// cell's buffer offset is its linear index. The buffer is shared between
/// clones until one of them is mutated, which gives arrays value
/// semantics: cloning is the only way to get a second handle to an
/// array's contents, and mutating the clone never affects the original.
#[derive(Clone, PartialEq)]
pub struct Array {
    shape: Shape,
    data: EcoVec<Cell>,
    is_cell: bool,
    kind: KindTag,
}

impl Default for Array {
    fn default() -> Self {
        Array::empty()
    }
}

impl Array {
    /// Create an array of the given shape
    ///
    /// Every cell is a clone of `fill`, or numeric zero if there is none.
    pub fn new(shape: impl Into<Shape>, fill: Option<Cell>) -> Self {
        let shape = shape.into().canonical();
        let fill = fill.unwrap_or_default();
        Array {
            kind: fill.kind_tag(),
            data: eco_vec![fill; shape.elements()],
            shape,
            is_cell: false,
        }
    }
    /// Create an array from cells in column-major order
    pub fn from_cells(shape: impl Into<Shape>, cells: impl Into<EcoVec<Cell>>) -> ArrayResult<Self> {
        let shape = shape.into().canonical();
        let data = cells.into();
        if data.len() != shape.elements() {
            return Err(ArrayError::ReshapeMismatch {
                from: Shape::column(data.len()),
                to: shape,
            });
        }
        Ok(Self::new_unchecked(shape, data, false))
    }
    pub(crate) fn new_unchecked(shape: Shape, data: EcoVec<Cell>, is_cell: bool) -> Self {
        debug_assert_eq!(shape.elements(), data.len());
        let mut arr = Array {
            shape,
            data,
            is_cell,
            kind: KindTag::Real,
        };
        arr.recompute_kind_tag();
        arr
    }
    /// A `1x1` array
    pub fn scalar(cell: impl Into<Cell>) -> Self {
        Self::new_unchecked(Shape::scalar(), eco_vec![cell.into()], false)
    }
    /// The canonical `0x0` empty array
    pub fn empty() -> Self {
        Array {
            shape: Shape::empty(),
            data: EcoVec::new(),
            is_cell: false,
            kind: KindTag::Real,
        }
    }
    /// A `1xN` array
    pub fn row(cells: impl IntoIterator<Item = Cell>) -> Self {
        let data: EcoVec<Cell> = cells.into_iter().collect();
        Self::new_unchecked(Shape::row(data.len()), data, false)
    }
    /// An `Nx1` array
    pub fn column(cells: impl IntoIterator<Item = Cell>) -> Self {
        let data: EcoVec<Cell> = cells.into_iter().collect();
        Self::new_unchecked(Shape::column(data.len()), data, false)
    }
    /// Create an array of real numbers in column-major order
    pub fn from_numbers(shape: impl Into<Shape>, numbers: &[f64]) -> ArrayResult<Self> {
        Self::from_cells(shape, numbers.iter().map(|&n| Cell::from(n)).collect::<EcoVec<_>>())
    }
    /// Mark or unmark this array as a cell array
    pub fn with_cell_flag(mut self, is_cell: bool) -> Self {
        self.is_cell = is_cell;
        self
    }
    /// Start an array literal with its first row
    ///
    /// An empty row gives the `0x0` empty array.
    pub fn first_row(cells: Vec<Cell>, is_cell: bool) -> Self {
        let arr = if cells.is_empty() {
            Array::empty()
        } else {
            Array::row(cells)
        };
        arr.with_cell_flag(is_cell)
    }
    /// Append a row to an array literal
    ///
    /// Appending an empty row does nothing. Appending to the empty array
    /// replaces it.
    pub fn append_row(&mut self, cells: Vec<Cell>) -> ArrayResult {
        if cells.is_empty() {
            return Ok(());
        }
        if self.is_empty() {
            *self = Array::first_row(cells, self.is_cell);
            return Ok(());
        }
        if self.rank() > 2 || self.shape.cols() != cells.len() {
            return Err(ArrayError::DimensionMismatch {
                op: "vertical",
                lhs: self.shape.clone(),
                rhs: Shape::row(cells.len()),
            });
        }
        let rows = self.shape.rows();
        let mut data = EcoVec::with_capacity(self.len() + cells.len());
        for (col, cell) in cells.into_iter().enumerate() {
            data.extend(self.data[col * rows..(col + 1) * rows].iter().cloned());
            data.push(cell);
        }
        self.shape = Shape::from([rows + 1, self.shape.cols()]);
        self.data = data;
        self.recompute_kind_tag();
        Ok(())
    }
    pub fn shape(&self) -> &Shape {
        &self.shape
    }
    pub fn rank(&self) -> usize {
        self.shape.len()
    }
    /// The total number of cells
    pub fn len(&self) -> usize {
        self.data.len()
    }
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
    pub fn is_scalar(&self) -> bool {
        self.data.len() == 1
    }
    pub fn is_cell(&self) -> bool {
        self.is_cell
    }
    pub fn kind_tag(&self) -> KindTag {
        self.kind
    }
    /// Recompute the cached kind tag from the cells
    pub fn recompute_kind_tag(&mut self) {
        self.kind = self
            .data
            .iter()
            .map(Cell::kind_tag)
            .max()
            .unwrap_or(KindTag::Real);
    }
    /// The cells in column-major order
    pub fn cells(&self) -> &[Cell] {
        &self.data
    }
    /// Mutable cells in column-major order
    ///
    /// The kind tag is not updated; call [`Array::recompute_kind_tag`]
    /// after bulk mutation.
    pub fn cells_mut(&mut self) -> &mut [Cell] {
        self.data.make_mut()
    }
    pub fn into_cells(self) -> EcoVec<Cell> {
        self.data
    }
    /// Get the cell at a linear index
    pub fn cell(&self, index: usize) -> Option<&Cell> {
        self.data.get(index)
    }
    /// Get the cell at a one-based subscript
    pub fn get(&self, subscript: &[usize]) -> Option<&Cell> {
        subscript_to_linear(&self.shape, subscript).and_then(|i| self.data.get(i))
    }
    pub(crate) fn set_shape_unchecked(&mut self, shape: Shape) {
        debug_assert_eq!(shape.elements(), self.data.len());
        self.shape = shape;
    }
    /// Get the number at a linear index
    pub(crate) fn number(&self, index: usize, op: impl fmt::Display) -> ArrayResult<Number> {
        match &self.data[index] {
            Cell::Num(n) => Ok(*n),
            cell => Err(ArrayError::TypeMismatch {
                op: op.to_string().into(),
                lhs: cell.type_name(),
                rhs: "double",
            }),
        }
    }
    /// Get an all-numeric version of this array
    ///
    /// A `1x1` array holding text becomes that text's character codes.
    /// Cell arrays are never numeric.
    pub fn to_numeric(&self, op: impl fmt::Display) -> ArrayResult<Array> {
        if self.is_cell {
            return Err(ArrayError::TypeMismatch {
                op: op.to_string().into(),
                lhs: "cell array",
                rhs: "double",
            });
        }
        if let [Cell::Text(s)] = self.cells() {
            return Ok(text_to_numeric_array(s));
        }
        if let Some(cell) = (self.data.iter()).find(|cell| !matches!(cell, Cell::Num(_))) {
            return Err(ArrayError::TypeMismatch {
                op: op.to_string().into(),
                lhs: "matrix",
                rhs: cell.type_name(),
            });
        }
        Ok(self.clone().with_cell_flag(false))
    }
    /// Turn a `1x1` plain array into its only cell
    ///
    /// Other arrays are wrapped as they are.
    pub fn demote(self) -> Cell {
        if self.is_scalar() && !self.is_cell {
            self.data[0].clone()
        } else {
            Cell::Array(self)
        }
    }
    /// The value that fills newly created slots when this array grows
    pub fn blank_cell(&self) -> Cell {
        if self.is_cell {
            return Cell::Array(Array::empty());
        }
        match self.data.iter().find_map(|cell| match cell {
            Cell::Struct(s) => Some(s),
            _ => None,
        }) {
            Some(s) => Cell::Struct(s.clone_field_names()),
            None => Cell::default(),
        }
    }
    /// Replace every cell with the result of a function
    pub fn evaluate(&mut self, mut f: impl FnMut(&Cell) -> ArrayResult<Cell>) -> ArrayResult {
        for cell in self.data.make_mut() {
            *cell = f(cell)?;
        }
        self.recompute_kind_tag();
        Ok(())
    }
    /// Number of physical rows: one block of `rows` per page
    pub fn rows_physical(&self) -> usize {
        self.shape.rows() * self.shape.pages()
    }
    /// Number of physical columns
    pub fn cols_physical(&self) -> usize {
        self.shape.cols()
    }
    fn physical_index(&self, row: usize, col: usize) -> Option<usize> {
        (row < self.rows_physical() && col < self.cols_physical())
            .then(|| physical_to_linear(self.shape.rows(), self.shape.cols(), row, col))
    }
    /// Get the cell at a physical `(row, column)` slot
    pub fn get_physical(&self, row: usize, col: usize) -> Option<&Cell> {
        self.physical_index(row, col).map(|i| &self.data[i])
    }
    /// Set the cell at a physical `(row, column)` slot
    pub fn set_physical(&mut self, row: usize, col: usize, cell: Cell) -> ArrayResult {
        let Some(index) = self.physical_index(row, col) else {
            let (bad, value, bound) = if row >= self.rows_physical() {
                (0, row + 1, self.rows_physical())
            } else {
                (1, col + 1, self.cols_physical())
            };
            return Err(ArrayError::OutOfBound {
                subscript: crate::error::elided_subscript(2, bad, value, usize::MAX),
                position: bad,
                value,
                bound,
                shape: Shape::from([self.rows_physical(), self.cols_physical()]),
            });
        };
        self.data.make_mut()[index] = cell;
        self.recompute_kind_tag();
        Ok(())
    }
    /// The physical slot of a linear index
    pub fn physical_slot(&self, index: usize) -> (usize, usize) {
        linear_to_physical(self.shape.rows(), self.shape.cols(), index)
    }
    /// Number of `rows x cols` pages
    pub fn page_count(&self) -> usize {
        self.shape.pages()
    }
    /// Get a page as a 2-D array
    pub fn page(&self, page: usize) -> Option<Array> {
        if page >= self.page_count() {
            return None;
        }
        let page_len = self.shape.rows() * self.shape.cols();
        let data: EcoVec<Cell> = self.data[page * page_len..(page + 1) * page_len]
            .iter()
            .cloned()
            .collect();
        let shape = Shape::from([self.shape.rows(), self.shape.cols()]);
        Some(Self::new_unchecked(shape, data, self.is_cell))
    }
    /// Replace a page with a 2-D array of the same row and column counts
    pub fn set_page(&mut self, page: usize, value: &Array) -> ArrayResult {
        let page_shape = Shape::from([self.shape.rows(), self.shape.cols()]);
        if value.shape != page_shape {
            return Err(ArrayError::Nonconformant {
                op: "=".into(),
                lhs: page_shape,
                rhs: value.shape.clone(),
            });
        }
        if page >= self.page_count() {
            return Err(ArrayError::OutOfBound {
                subscript: crate::error::elided_subscript(3, 2, page + 1, usize::MAX),
                position: 2,
                value: page + 1,
                bound: self.page_count(),
                shape: self.shape.clone(),
            });
        }
        tracing::debug!(page, shape = %self.shape, "replacing page");
        let page_len = page_shape.elements();
        let start = page * page_len;
        self.data.make_mut()[start..start + page_len].clone_from_slice(value.cells());
        self.recompute_kind_tag();
        Ok(())
    }
}

impl fmt::Debug for Array {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<{}{} ", self.shape, if self.is_cell { " cell" } else { "" })?;
        f.debug_list().entries(self.data.iter()).finish()?;
        write!(f, ">")
    }
}

impl From<Number> for Array {
    fn from(n: Number) -> Self {
        Array::scalar(n)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn nums(arr: &Array) -> Vec<f64> {
        arr.cells()
            .iter()
            .map(|c| c.as_number().unwrap().real_part())
            .collect()
    }

    #[test]
    fn fill_sets_kind_tag() {
        let arr = Array::new([2, 3], None);
        assert_eq!(arr.shape(), &[2, 3]);
        assert_eq!(arr.len(), 6);
        assert_eq!(arr.kind_tag(), KindTag::Real);
        let arr = Array::new([2, 2], Some(Cell::from(true)));
        assert_eq!(arr.kind_tag(), KindTag::Logical);
    }

    #[test]
    fn literal_rows_accrete() {
        let mut arr = Array::first_row(vec![1.0.into(), 2.0.into()], false);
        arr.append_row(vec![3.0.into(), 4.0.into()]).unwrap();
        assert_eq!(arr.shape(), &[2, 2]);
        assert_eq!(nums(&arr), [1.0, 3.0, 2.0, 4.0]);
        assert!(matches!(
            arr.append_row(vec![5.0.into()]),
            Err(ArrayError::DimensionMismatch { .. })
        ));
        let mut empty = Array::first_row(Vec::new(), false);
        assert_eq!(empty.shape(), &[0, 0]);
        empty.append_row(vec![7.0.into()]).unwrap();
        assert_eq!(empty.shape(), &[1, 1]);
    }

    #[test]
    fn clones_do_not_alias() {
        let a = Array::from_numbers([2, 2], &[1.0, 2.0, 3.0, 4.0]).unwrap();
        let mut b = a.clone();
        b.cells_mut()[0] = Cell::from(9.0);
        assert_eq!(nums(&a), [1.0, 2.0, 3.0, 4.0]);
        assert_eq!(nums(&b), [9.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn nested_clones_do_not_alias() {
        let inner = Array::row([Cell::from(1.0)]);
        let a = Array::row([Cell::Array(inner)]).with_cell_flag(true);
        let mut b = a.clone();
        if let Cell::Array(inner) = &mut b.cells_mut()[0] {
            inner.cells_mut()[0] = Cell::from(2.0);
        }
        assert_eq!(a.cells()[0], Cell::Array(Array::row([Cell::from(1.0)])));
    }

    #[test]
    fn pages_are_physical_blocks() {
        let data: Vec<f64> = (1..=12).map(f64::from).collect();
        let mut arr = Array::from_numbers([2, 3, 2], &data).unwrap();
        assert_eq!(arr.rows_physical(), 4);
        assert_eq!(arr.cols_physical(), 3);
        assert_eq!(arr.get_physical(2, 0), Some(&Cell::from(7.0)));
        assert_eq!(arr.physical_slot(7), (3, 0));
        let page = arr.page(1).unwrap();
        assert_eq!(nums(&page), data[6..].to_vec());
        arr.set_page(0, &page).unwrap();
        assert_eq!(arr.get(&[1, 1, 1]), Some(&Cell::from(7.0)));
        assert!(arr.set_page(2, &page).is_err());
        assert!(arr.set_physical(4, 0, Cell::from(0.0)).is_err());
    }

    #[test]
    fn evaluate_replaces_cells() {
        let mut arr = Array::row([Cell::from("x"), Cell::from("y")]);
        assert_eq!(arr.kind_tag(), KindTag::Text);
        arr.evaluate(|cell| Ok(Cell::from(cell.to_string().len() as f64)))
            .unwrap();
        assert_eq!(arr.kind_tag(), KindTag::Real);
        assert_eq!(nums(&arr), [1.0, 1.0]);
    }

    #[test]
    fn demotion() {
        assert_eq!(Array::scalar(3.0).demote(), Cell::from(3.0));
        let cell = Array::scalar(3.0).with_cell_flag(true).demote();
        assert!(matches!(cell, Cell::Array(_)));
    }
}
