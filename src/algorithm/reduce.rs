//! Folds along an axis, with and without positions

use std::{fmt, str::FromStr};

use ecow::EcoVec;
use enum_iterator::{all, Sequence};
use serde::*;

use crate::{
    addressing::{compute_strides, decode, encode},
    algorithm::pervade::binary_cells,
    Array, ArrayError, ArrayResult, BinaryOp, Cell, Number,
    Shape,
};

/// How a reduction combines the cells along its axis
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Sequence, Serialize, Deserialize,
)]
pub enum Strategy {
    /// Collapse the axis to a single combined value
    Reduce,
    /// Keep the axis, storing the running combination at each position
    Cumulative,
    /// Collapse the axis to its best value and that value's position
    Comparison,
    /// Keep the axis, storing the running best value and its position
    CumComparison,
}

impl Strategy {
    pub fn name(self) -> &'static str {
        match self {
            Strategy::Reduce => "reduce",
            Strategy::Cumulative => "cumulative",
            Strategy::Comparison => "comparison",
            Strategy::CumComparison => "cumcomparison",
        }
    }
    /// Whether the strategy keeps the axis at its original length
    pub fn is_cumulative(self) -> bool {
        matches!(self, Strategy::Cumulative | Strategy::CumComparison)
    }
    /// Whether the strategy also produces positions
    pub fn has_positions(self) -> bool {
        matches!(self, Strategy::Comparison | Strategy::CumComparison)
    }
}

impl FromStr for Strategy {
    type Err = ArrayError;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        all::<Strategy>()
            .find(|strategy| strategy.name() == s)
            .ok_or_else(|| ArrayError::UnknownStrategy(s.into()))
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.name().fmt(f)
    }
}

/// The outputs of a reduction
///
/// Comparison strategies produce a value and a one-based position. Other
/// strategies produce only a value.
#[derive(Debug, Clone, PartialEq)]
pub struct MultiOutput {
    value: Cell,
    index: Option<Cell>,
}

impl MultiOutput {
    pub fn new(value: Cell, index: Option<Cell>) -> Self {
        MultiOutput { value, index }
    }
    pub fn single(value: Cell) -> Self {
        MultiOutput { value, index: None }
    }
    /// The number of outputs available
    pub fn output_count(&self) -> usize {
        1 + self.index.is_some() as usize
    }
    pub fn value(&self) -> &Cell {
        &self.value
    }
    pub fn index(&self) -> Option<&Cell> {
        self.index.as_ref()
    }
    pub fn into_value(self) -> Cell {
        self.value
    }
    /// Get one output when a caller asks for `requested` of them
    ///
    /// Output `0` is the value and output `1` the positions.
    pub fn select(&self, requested: usize, index: usize) -> ArrayResult<&Cell> {
        let available = self.output_count();
        if requested > available {
            return Err(ArrayError::TooManyOutputs {
                requested,
                available,
            });
        }
        match (index, &self.index) {
            (0, _) => Ok(&self.value),
            (1, Some(positions)) => Ok(positions),
            _ => Err(ArrayError::TooManyOutputs {
                requested: index + 1,
                available,
            }),
        }
    }
}

/// A fold of one binary operation along an axis
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reduction {
    pub op: BinaryOp,
    pub strategy: Strategy,
    /// The value the fold starts from; without one, it starts from the
    /// first cell
    pub init: Option<Number>,
}

impl Reduction {
    pub fn new(op: BinaryOp, strategy: Strategy) -> Self {
        Reduction {
            op,
            strategy,
            init: None,
        }
    }
    pub fn with_init(mut self, init: impl Into<Number>) -> Self {
        self.init = Some(init.into());
        self
    }
    /// Reduce a value along a zero-based axis
    ///
    /// Without an axis, the first non-singleton axis is used. Scalars are
    /// promoted and `1x1` results are demoted back to scalars.
    pub fn run(&self, input: &Cell, axis: Option<usize>) -> ArrayResult<MultiOutput> {
        let arr = input.to_numeric_array(self.op)?;
        let (values, positions) = self.run_array(&arr, axis)?;
        Ok(MultiOutput::new(values.demote(), positions.map(Array::demote)))
    }
    /// Reduce an array along a zero-based axis, giving values and positions
    pub fn run_array(&self, arr: &Array, axis: Option<usize>) -> ArrayResult<(Array, Option<Array>)> {
        let arr = arr.to_numeric(self.op)?;
        let with_positions = |values: Array| {
            let positions = self.strategy.has_positions().then(|| {
                let shape = values.shape().clone();
                Array::new(shape, None)
            });
            (values, positions)
        };
        if axis.is_none() && *arr.shape() == [0, 0] {
            return Ok(match (self.strategy, self.init) {
                (Strategy::Reduce, Some(init)) => (Array::scalar(init), None),
                _ => with_positions(Array::empty()),
            });
        }
        let axis = axis.unwrap_or_else(|| arr.shape().first_non_singleton());
        tracing::trace!(strategy = %self.strategy, op = %self.op, axis, shape = %arr.shape(), "reducing");

        // An axis past the rank is a trailing singleton
        let axis = axis.min(arr.rank());
        let shape = arr.shape().with_singleton_tail(axis + 1);
        let len = shape[axis];
        let out_len_axis = if self.strategy.is_cumulative() {
            len
        } else if len == 0 && (self.init.is_none() || self.strategy.has_positions()) {
            0
        } else {
            1
        };
        let mut out_dims = shape.to_vec();
        out_dims[axis] = out_len_axis;
        let mut line_dims = shape.to_vec();
        line_dims[axis] = 1;
        let strides = compute_strides(&shape);
        let out_strides = compute_strides(&out_dims);
        let line_strides = compute_strides(&line_dims);
        let out_size: usize = out_dims.iter().product();
        let line_count: usize = line_dims.iter().product();
        let mut values = vec![Number::default(); out_size];
        let mut positions = vec![0usize; out_size];
        let mut coords = vec![0; shape.len()];

        for line in 0..line_count {
            decode(&line_dims, &line_strides, line, &mut coords);
            let (src_start, dst_start) = (encode(&strides, &coords), encode(&out_strides, &coords));
            let src = |k: usize| src_start + k * strides[axis];
            let dst = |k: usize| dst_start + k * out_strides[axis];
            let mut acc = self.init.filter(|_| !self.strategy.has_positions());
            let mut best: Option<(Number, usize)> = None;
            for k in 0..len {
                let x = arr.number(src(k), self.op)?;
                if self.strategy.has_positions() {
                    let keep = match best {
                        Some((b, _)) => !self.displaces(x, b)?,
                        None => false,
                    };
                    if !keep {
                        best = Some((x, k + 1));
                    }
                    if let (true, Some((b, pos))) = (self.strategy.is_cumulative(), best) {
                        values[dst(k)] = b;
                        positions[dst(k)] = pos;
                    }
                } else {
                    let next = match acc {
                        Some(a) => a.binary(self.op, x)?,
                        None => x,
                    };
                    acc = Some(next);
                    if self.strategy.is_cumulative() {
                        values[dst(k)] = next;
                    }
                }
            }
            if self.strategy.is_cumulative() || out_len_axis == 0 {
                continue;
            }
            if let Some((b, pos)) = best {
                values[dst(0)] = b;
                positions[dst(0)] = pos;
            } else if let Some(a) = acc {
                values[dst(0)] = a;
            }
        }

        let out_shape = Shape::new(out_dims);
        let value_cells: EcoVec<Cell> = values.into_iter().map(Cell::Num).collect();
        let values = Array::new_unchecked(out_shape.clone(), value_cells, false);
        let positions = self.strategy.has_positions().then(|| {
            let cells: EcoVec<Cell> = positions.into_iter().map(|p| Cell::from(p as f64)).collect();
            Array::new_unchecked(out_shape, cells, false)
        });
        Ok((values, positions))
    }
    /// Whether a candidate replaces the current best
    ///
    /// Ties keep the earlier value. NaN never replaces and is always replaced.
    fn displaces(&self, candidate: Number, best: Number) -> ArrayResult<bool> {
        if candidate.is_nan() {
            return Ok(false);
        }
        if best.is_nan() {
            return Ok(true);
        }
        let predicate = match self.op {
            BinaryOp::Min => BinaryOp::Lt,
            BinaryOp::Max => BinaryOp::Gt,
            op => op,
        };
        Ok(candidate.binary(predicate, best)?.to_logical())
    }
}

/// Convert a one-based `dim` argument to a zero-based axis
fn axis_from_dim(function: &'static str, dim: Option<usize>) -> ArrayResult<Option<usize>> {
    match dim {
        Some(0) => Err(ArrayError::InvalidDimension { function }),
        dim => Ok(dim.map(|d| d - 1)),
    }
}

fn axis_from_cell(function: &'static str, dim: &Cell) -> ArrayResult<usize> {
    match dim.as_number().and_then(|n| n.as_real()) {
        Some(d) if d >= 1.0 && d.fract() == 0.0 => Ok(d as usize - 1),
        _ => Err(ArrayError::InvalidDimension { function }),
    }
}

fn fold(
    function: &'static str,
    reduction: Reduction,
    x: &Cell,
    dim: Option<usize>,
) -> ArrayResult<MultiOutput> {
    reduction.run(x, axis_from_dim(function, dim)?)
}

/// Sum along the first non-singleton axis or `dim`
pub fn sum(x: &Cell, dim: Option<usize>) -> ArrayResult<Cell> {
    let r = Reduction::new(BinaryOp::Add, Strategy::Reduce).with_init(0.0);
    fold("sum", r, x, dim).map(MultiOutput::into_value)
}

/// Product along the first non-singleton axis or `dim`
pub fn prod(x: &Cell, dim: Option<usize>) -> ArrayResult<Cell> {
    let r = Reduction::new(BinaryOp::Mul, Strategy::Reduce).with_init(1.0);
    fold("prod", r, x, dim).map(MultiOutput::into_value)
}

pub fn cumsum(x: &Cell, dim: Option<usize>) -> ArrayResult<Cell> {
    let r = Reduction::new(BinaryOp::Add, Strategy::Cumulative).with_init(0.0);
    fold("cumsum", r, x, dim).map(MultiOutput::into_value)
}

pub fn cumprod(x: &Cell, dim: Option<usize>) -> ArrayResult<Cell> {
    let r = Reduction::new(BinaryOp::Mul, Strategy::Cumulative).with_init(1.0);
    fold("cumprod", r, x, dim).map(MultiOutput::into_value)
}

/// Whether every cell along the axis is true
pub fn all_true(x: &Cell, dim: Option<usize>) -> ArrayResult<Cell> {
    let r = Reduction::new(BinaryOp::And, Strategy::Reduce).with_init(true);
    fold("all", r, x, dim).map(MultiOutput::into_value)
}

/// Whether any cell along the axis is true
pub fn any_true(x: &Cell, dim: Option<usize>) -> ArrayResult<Cell> {
    let r = Reduction::new(BinaryOp::Or, Strategy::Reduce).with_init(false);
    fold("any", r, x, dim).map(MultiOutput::into_value)
}

/// `min(x)`, `min(a, b)` or `min(x, [], dim)`
pub fn min(args: &[Cell]) -> ArrayResult<MultiOutput> {
    comparison(BinaryOp::Min, args)
}

/// `max(x)`, `max(a, b)` or `max(x, [], dim)`
pub fn max(args: &[Cell]) -> ArrayResult<MultiOutput> {
    comparison(BinaryOp::Max, args)
}

pub fn cummin(x: &Cell, dim: Option<usize>) -> ArrayResult<MultiOutput> {
    fold("cummin", Reduction::new(BinaryOp::Min, Strategy::CumComparison), x, dim)
}

pub fn cummax(x: &Cell, dim: Option<usize>) -> ArrayResult<MultiOutput> {
    fold("cummax", Reduction::new(BinaryOp::Max, Strategy::CumComparison), x, dim)
}

/// Dispatch the three call forms of a comparison reduction
///
/// The two-argument form compares elementwise and has no positions.
pub fn comparison(op: BinaryOp, args: &[Cell]) -> ArrayResult<MultiOutput> {
    let function = op.name();
    let reduction = Reduction::new(op, Strategy::Comparison);
    match args {
        [x] => reduction.run(x, None),
        [a, b] => binary_cells(op, a, b).map(MultiOutput::single),
        [x, ignored, dim] => {
            if !ignored.is_empty_array() {
                tracing::warn!(function, "second argument is ignored");
            }
            reduction.run(x, Some(axis_from_cell(function, dim)?))
        }
        _ => Err(ArrayError::WrongArgumentCount {
            function,
            given: args.len(),
            expected: "1 to 3",
        }),
    }
}
