//! Reshaping, growing, joining and transposing arrays

use ecow::{eco_vec, EcoVec};

use crate::{
    addressing::{linear_to_subscript, physical_to_linear, subscript_to_linear},
    algorithm::max_shape,
    Array, ArrayError, ArrayResult, Cell, Config, Shape,
};

impl Array {
    /// Give the array a new shape with the same number of cells
    ///
    /// If `wildcard` names an axis, its size is solved from the others.
    /// Storage is column-major, so the cells never move.
    pub fn reshape(&self, new_shape: &[usize], wildcard: Option<usize>) -> ArrayResult<Array> {
        let elements = self.len();
        let mut dims = new_shape.to_vec();
        if let Some(axis) = wildcard {
            if axis >= dims.len() {
                dims.resize(axis + 1, 1);
            }
            let known = (dims.iter().enumerate())
                .filter(|&(i, _)| i != axis)
                .try_fold(1usize, |acc, (_, &d)| acc.checked_mul(d))
                .unwrap_or(usize::MAX);
            if known == 0 || elements % known != 0 {
                return Err(ArrayError::ReshapeWildcard { elements, known });
            }
            dims[axis] = elements / known;
        }
        let requested = dims.iter().try_fold(1usize, |acc, &d| acc.checked_mul(d));
        let to = Shape::new(dims);
        if requested != Some(elements) {
            return Err(ArrayError::ReshapeMismatch {
                from: self.shape().clone(),
                to,
            });
        }
        let mut arr = self.clone();
        arr.set_shape_unchecked(to);
        Ok(arr)
    }
    /// Grow the array so that every axis is at least as long as in `target`
    ///
    /// Existing cells keep their subscripts. New slots get the array's
    /// [blank cell](Array::blank_cell).
    pub fn expand(&mut self, target: &[usize]) -> ArrayResult {
        self.expand_with(target, &Config::default())
    }
    /// [`Array::expand`] with an explicit size limit
    pub fn expand_with(&mut self, target: &[usize], config: &Config) -> ArrayResult {
        let fill = self.blank_cell();
        self.expand_with_fill(target, fill, config)
    }
    pub(crate) fn expand_with_fill(
        &mut self,
        target: &[usize],
        fill: Cell,
        config: &Config,
    ) -> ArrayResult {
        let new_shape = Shape::new(max_shape(self.shape(), target));
        if &new_shape == self.shape() {
            return Ok(());
        }
        config.validate_shape(&new_shape)?;
        tracing::debug!(from = %self.shape(), to = %new_shape, "expanding array");
        let mut data = eco_vec![fill; new_shape.elements()];
        let slots = data.make_mut();
        for (i, cell) in self.cells().iter().enumerate() {
            let sub = linear_to_subscript(self.shape(), i);
            if let Some(j) = subscript_to_linear(&new_shape, &sub) {
                slots[j] = cell.clone();
            }
        }
        *self = Array::new_unchecked(new_shape, data, self.is_cell());
        Ok(())
    }
    /// Join arrays along an axis
    ///
    /// Every other axis must agree. `0x0` empty inputs are skipped.
    pub fn concatenate(axis: usize, inputs: &[Array]) -> ArrayResult<Array> {
        let op = match axis {
            0 => "vertical",
            1 => "horizontal",
            _ => "concatenation",
        };
        let is_cell = inputs.iter().any(Array::is_cell);
        let parts: Vec<&Array> = (inputs.iter())
            .filter(|arr| *arr.shape() != [0, 0])
            .collect();
        let Some(first) = parts.first() else {
            return Ok(Array::empty().with_cell_flag(is_cell));
        };
        let min_rank = (axis.checked_add(1))
            .ok_or(ArrayError::InvalidDimension { function: "cat" })?;
        let rank = (parts.iter().map(|arr| arr.rank()).max())
            .unwrap_or(2)
            .max(min_rank);
        let mut dims = first.shape().with_singleton_tail(rank).to_vec();
        dims[axis] = 0;
        for part in &parts {
            let shape = part.shape().with_singleton_tail(rank);
            let agrees = (0..rank).all(|d| d == axis || shape[d] == dims[d]);
            if !agrees {
                return Err(ArrayError::DimensionMismatch {
                    op,
                    lhs: first.shape().clone(),
                    rhs: part.shape().clone(),
                });
            }
            dims[axis] += shape[axis];
        }

        let mut data = eco_vec![Cell::Absent; dims.iter().product()];
        let slots = data.make_mut();
        let mut offset = 0;
        for part in &parts {
            let shape = part.shape().with_singleton_tail(rank);
            for (i, cell) in part.cells().iter().enumerate() {
                let mut sub = linear_to_subscript(&shape, i);
                sub[axis] += offset;
                if let Some(j) = subscript_to_linear(&dims, &sub) {
                    slots[j] = cell.clone();
                }
            }
            offset += shape[axis];
        }
        Ok(Array::new_unchecked(Shape::new(dims), data, is_cell))
    }
    /// Join arrays side by side
    pub fn horzcat(inputs: &[Array]) -> ArrayResult<Array> {
        Array::concatenate(1, inputs)
    }
    /// Stack arrays on top of each other
    pub fn vertcat(inputs: &[Array]) -> ArrayResult<Array> {
        Array::concatenate(0, inputs)
    }
    /// Swap rows and columns of a 2-D array
    pub fn transpose(&self) -> ArrayResult<Array> {
        if self.rank() > 2 {
            return Err(ArrayError::NotTwoDimensional { op: "transpose" });
        }
        let (rows, cols) = (self.rows_physical(), self.cols_physical());
        let mut data: EcoVec<Cell> = eco_vec![Cell::Absent; self.len()];
        let slots = data.make_mut();
        for row in 0..rows {
            for col in 0..cols {
                if let Some(cell) = self.get_physical(row, col) {
                    slots[physical_to_linear(cols, rows, col, row)] = cell.clone();
                }
            }
        }
        Ok(Array::new_unchecked(
            Shape::from([cols, rows]),
            data,
            self.is_cell(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use crate::{cell::Struct, KindTag};

    use super::*;

    fn arr(shape: &[usize], data: &[f64]) -> Array {
        Array::from_numbers(shape, data).unwrap()
    }

    fn nums(arr: &Array) -> Vec<f64> {
        arr.cells()
            .iter()
            .map(|c| c.as_number().unwrap().real_part())
            .collect()
    }

    #[test]
    fn reshape_keeps_column_major_order() {
        let a = arr(&[2, 3], &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let b = a.reshape(&[3, 2], None).unwrap();
        assert_eq!(b.shape(), &[3, 2]);
        assert_eq!(nums(&b), nums(&a));
        assert_eq!(b.get(&[3, 1]), Some(&Cell::from(3.0)));
        assert_eq!(b.get(&[1, 2]), Some(&Cell::from(4.0)));
    }

    #[test]
    fn reshape_rejects_wrong_counts() {
        let a = Array::new([2, 3], None);
        assert!(matches!(
            a.reshape(&[4, 2], None),
            Err(ArrayError::ReshapeMismatch { .. })
        ));
        assert_eq!(a.reshape(&[0, 2], Some(0)).unwrap().shape(), &[3, 2]);
        assert_eq!(a.reshape(&[1, 1, 0], Some(2)).unwrap().shape(), &[1, 1, 6]);
        assert!(matches!(
            a.reshape(&[4, 0], Some(1)),
            Err(ArrayError::ReshapeWildcard { known: 4, .. })
        ));
    }

    #[test]
    fn reshape_rejects_overflowing_sizes() {
        assert!(matches!(
            Array::empty().reshape(&[1 << 63, 2], None),
            Err(ArrayError::ReshapeMismatch { .. })
        ));
        let a = Array::new([2, 2], None);
        assert!(matches!(
            a.reshape(&[1 << 62, 8, 0], Some(2)),
            Err(ArrayError::ReshapeWildcard { .. })
        ));
        // 2^32 * 2^32 wraps to 0 without checking
        assert!(a.reshape(&[1 << 32, 1 << 32, 0], None).is_err());
    }

    #[test]
    fn expand_preserves_subscripts() {
        let mut a = arr(&[2, 2], &[1.0, 2.0, 3.0, 4.0]);
        a.expand(&[3, 3]).unwrap();
        assert_eq!(a.shape(), &[3, 3]);
        assert_eq!(nums(&a), [1.0, 2.0, 0.0, 3.0, 4.0, 0.0, 0.0, 0.0, 0.0]);
        let before = a.clone();
        a.expand(&[2, 2]).unwrap();
        assert_eq!(a, before);
        a.expand(&[1, 1, 2]).unwrap();
        assert_eq!(a.shape(), &[3, 3, 2]);
        assert_eq!(a.get(&[2, 2, 1]), Some(&Cell::from(4.0)));
    }

    #[test]
    fn expand_fills_structs_with_field_names() {
        let mut s = Struct::new();
        s.insert("name", "x");
        let mut a = Array::scalar(s);
        a.expand(&[1, 2]).unwrap();
        let Some(Cell::Struct(blank)) = a.cell(1) else {
            panic!("expected a struct blank")
        };
        assert_eq!(blank.field("name"), Some(&Cell::Array(Array::empty())));
        assert_eq!(a.kind_tag(), KindTag::Struct);
    }

    #[test]
    fn expand_respects_limit() {
        let config = Config {
            max_elements: 8,
            ..Config::default()
        };
        let mut a = Array::new([2, 2], None);
        assert!(matches!(
            a.expand_with(&[3, 3], &config),
            Err(ArrayError::TooLarge { elements: 9 })
        ));
    }

    #[test]
    fn concatenation_axis_arithmetic() {
        let a = arr(&[2, 2], &[1.0, 2.0, 3.0, 4.0]);
        let b = arr(&[2, 3], &[5.0, 6.0, 7.0, 8.0, 9.0, 10.0]);
        let h = Array::horzcat(&[a.clone(), b.clone()]).unwrap();
        assert_eq!(h.shape(), &[2, 5]);
        assert_eq!(nums(&h), (1..=10).map(f64::from).collect::<Vec<_>>());
        let err = Array::vertcat(&[a, b]).unwrap_err();
        assert_eq!(err.to_string(), "vertical dimensions mismatch (2x2 vs 2x3)");
    }

    #[test]
    fn vertical_concatenation_interleaves_columns() {
        let a = arr(&[1, 2], &[1.0, 2.0]);
        let b = arr(&[1, 2], &[3.0, 4.0]);
        let v = Array::vertcat(&[a, Array::empty(), b]).unwrap();
        assert_eq!(v.shape(), &[2, 2]);
        assert_eq!(nums(&v), [1.0, 3.0, 2.0, 4.0]);
    }

    #[test]
    fn concatenate_along_third_axis() {
        let a = arr(&[1, 2], &[1.0, 2.0]);
        let b = arr(&[1, 2], &[3.0, 4.0]);
        let c = Array::concatenate(2, &[a, b]).unwrap();
        assert_eq!(c.shape(), &[1, 2, 2]);
        assert_eq!(c.get(&[1, 1, 2]), Some(&Cell::from(3.0)));
    }

    #[test]
    fn concatenate_rejects_unaddressable_axis() {
        let a = Array::scalar(1.0);
        assert!(matches!(
            Array::concatenate(usize::MAX, &[a.clone(), a]),
            Err(ArrayError::InvalidDimension { function: "cat" })
        ));
    }

    #[test]
    fn transpose_2d() {
        let a = arr(&[2, 3], &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let t = a.transpose().unwrap();
        assert_eq!(t.shape(), &[3, 2]);
        assert_eq!(nums(&t), [1.0, 3.0, 5.0, 2.0, 4.0, 6.0]);
        assert!(Array::new([2, 2, 2], None).transpose().is_err());
    }
}
