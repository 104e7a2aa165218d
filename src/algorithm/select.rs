//! Reading cells by subscript lists and logical masks

use ecow::EcoVec;

use crate::{
    addressing::subscript_to_linear, error::elided_subscript, Array, ArrayError, ArrayResult,
    Cell, Config, KindTag, Shape,
};

/// One entry of a subscript list
#[derive(Debug, Clone, PartialEq)]
pub enum Subscript {
    /// One-based positions, or a logical mask selecting positions
    Index(Array),
    /// `:`, the whole extent of the axis
    All,
}

impl Subscript {
    /// A single one-based position
    pub fn scalar(position: usize) -> Self {
        Subscript::Index(Array::scalar(position as f64))
    }
    /// The number of positions this subscript selects, if known without an extent
    pub(crate) fn known_len(&self) -> Option<usize> {
        match self {
            Subscript::Index(arr) if arr.kind_tag() == KindTag::Logical => {
                Some(arr.cells().iter().filter(|c| c.to_logical()).count())
            }
            Subscript::Index(arr) => Some(arr.len()),
            Subscript::All => None,
        }
    }
    /// Resolve to one-based positions along an axis
    ///
    /// Positions are checked for being positive integers but not against
    /// the extent.
    pub(crate) fn resolve(
        &self,
        extent: usize,
        position: usize,
        rank: usize,
        config: &Config,
    ) -> ArrayResult<Vec<usize>> {
        let arr = match self {
            Subscript::All => return Ok((1..=extent).collect()),
            Subscript::Index(arr) => arr,
        };
        if arr.kind_tag() == KindTag::Logical {
            return Ok((arr.cells().iter().enumerate())
                .filter(|(_, c)| c.to_logical())
                .map(|(i, _)| i + 1)
                .collect());
        }
        (arr.cells().iter())
            .map(|cell| {
                let real = cell.as_number().and_then(|n| n.as_real());
                match real {
                    Some(n) if n >= 1.0 && n.fract() == 0.0 && n < 2f64.powi(63) => {
                        Ok(n as usize)
                    }
                    _ => Err(ArrayError::InvalidIndex {
                        subscript: elided_subscript(rank, position, cell, config.compact_threshold),
                        position,
                    }),
                }
            })
            .collect()
    }
}

impl From<Array> for Subscript {
    fn from(arr: Array) -> Self {
        Subscript::Index(arr)
    }
}

impl<const N: usize> From<[usize; N]> for Subscript {
    fn from(positions: [usize; N]) -> Self {
        Subscript::Index(Array::row(positions.map(|p| Cell::from(p as f64))))
    }
}

/// Check resolved positions against an axis extent
pub(crate) fn check_bounds(
    positions: &[usize],
    extent: usize,
    position: usize,
    rank: usize,
    shape: &Shape,
    config: &Config,
) -> ArrayResult {
    match positions.iter().find(|&&p| p > extent) {
        Some(&value) => Err(ArrayError::OutOfBound {
            subscript: elided_subscript(rank, position, value, config.compact_threshold),
            position,
            value,
            bound: extent,
            shape: shape.clone(),
        }),
        None => Ok(()),
    }
}

/// The shape a multi-subscript list addresses
///
/// Missing trailing axes are singleton. When there are fewer subscripts
/// than axes, the last subscript spans all remaining axes.
pub(crate) fn addressed_shape(shape: &Shape, count: usize) -> Vec<usize> {
    if count >= shape.len() {
        return shape.with_singleton_tail(count).to_vec();
    }
    let mut dims = shape[..count - 1].to_vec();
    dims.push(shape[count - 1..].iter().product());
    dims
}

/// Call `f` with every combination of positions, first list fastest
pub(crate) fn for_each_combination(
    lists: &[Vec<usize>],
    mut f: impl FnMut(&[usize]) -> ArrayResult,
) -> ArrayResult {
    if lists.iter().any(Vec::is_empty) {
        return Ok(());
    }
    let mut counters = vec![0; lists.len()];
    let mut sub: Vec<usize> = lists.iter().map(|list| list[0]).collect();
    loop {
        f(&sub)?;
        let mut axis = 0;
        loop {
            if axis == lists.len() {
                return Ok(());
            }
            counters[axis] += 1;
            if counters[axis] < lists[axis].len() {
                sub[axis] = lists[axis][counters[axis]];
                break;
            }
            counters[axis] = 0;
            sub[axis] = lists[axis][0];
            axis += 1;
        }
    }
}

impl Array {
    /// Select cells by a subscript list
    pub fn get_elements(&self, subscripts: &[Subscript]) -> ArrayResult<Array> {
        self.get_elements_with(subscripts, &Config::default())
    }
    /// [`Array::get_elements`] with explicit error formatting options
    pub fn get_elements_with(&self, subscripts: &[Subscript], config: &Config) -> ArrayResult<Array> {
        match subscripts {
            [] => Ok(self.clone()),
            [Subscript::Index(mask)] if mask.kind_tag() == KindTag::Logical => {
                self.get_elements_logical_with(mask, config)
            }
            [sub] => self.get_linear(sub, config),
            _ => self.get_cartesian(subscripts, config),
        }
    }
    fn get_linear(&self, sub: &Subscript, config: &Config) -> ArrayResult<Array> {
        let positions = sub.resolve(self.len(), 0, 1, config)?;
        check_bounds(&positions, self.len(), 0, 1, self.shape(), config)?;
        let data: EcoVec<Cell> = positions.iter().map(|&p| self.cells()[p - 1].clone()).collect();
        let shape = match sub {
            Subscript::All => Shape::column(data.len()),
            Subscript::Index(index) => {
                let source_is_vector = self.shape().is_vector() && !self.is_scalar();
                if source_is_vector && index.shape().is_vector() {
                    if self.shape().is_row() {
                        Shape::row(data.len())
                    } else {
                        Shape::column(data.len())
                    }
                } else {
                    index.shape().clone()
                }
            }
        };
        Ok(Array::new_unchecked(shape, data, self.is_cell()))
    }
    fn get_cartesian(&self, subscripts: &[Subscript], config: &Config) -> ArrayResult<Array> {
        let rank = subscripts.len();
        let dims = addressed_shape(self.shape(), rank);
        let mut lists = Vec::with_capacity(rank);
        for (axis, sub) in subscripts.iter().enumerate() {
            let positions = sub.resolve(dims[axis], axis, rank, config)?;
            check_bounds(&positions, dims[axis], axis, rank, self.shape(), config)?;
            lists.push(positions);
        }
        let lens: Vec<usize> = lists.iter().map(Vec::len).collect();
        let mut data = EcoVec::with_capacity(config.validate_size(&lens)?);
        for_each_combination(&lists, |sub| {
            let index = subscript_to_linear(&dims, sub).ok_or_else(|| ArrayError::OutOfBound {
                subscript: sub
                    .iter()
                    .map(ToString::to_string)
                    .collect::<Vec<_>>()
                    .join(",")
                    .into(),
                position: 0,
                value: sub[0],
                bound: dims[0],
                shape: self.shape().clone(),
            })?;
            data.push(self.cells()[index].clone());
            Ok(())
        })?;
        Ok(Array::new_unchecked(Shape::new(lens), data, self.is_cell()))
    }
    /// Select the cells whose corresponding mask cells are true
    ///
    /// The result is a row if the mask is a row, otherwise a column.
    pub fn get_elements_logical(&self, mask: &Array) -> ArrayResult<Array> {
        self.get_elements_logical_with(mask, &Config::default())
    }
    /// [`Array::get_elements_logical`] with explicit error formatting options
    pub fn get_elements_logical_with(&self, mask: &Array, config: &Config) -> ArrayResult<Array> {
        if mask.len() > self.len() {
            return Err(ArrayError::OutOfBound {
                subscript: elided_subscript(1, 0, mask.len(), config.compact_threshold),
                position: 0,
                value: mask.len(),
                bound: self.len(),
                shape: self.shape().clone(),
            });
        }
        let data: EcoVec<Cell> = (self.cells().iter())
            .zip(mask.cells())
            .filter(|(_, m)| m.to_logical())
            .map(|(cell, _)| cell.clone())
            .collect();
        let shape = if mask.shape().is_row() {
            Shape::row(data.len())
        } else {
            Shape::column(data.len())
        };
        Ok(Array::new_unchecked(shape, data, self.is_cell()))
    }
}
