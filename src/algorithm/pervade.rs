//! Elementwise operations with broadcasting

use ecow::EcoVec;

use crate::{
    addressing::{compute_strides, decode, encode},
    Array, ArrayError, ArrayResult, BinaryOp, Cell, Config, Shape, UnaryOp,
};

/// The combined shape of two operands, and which axes each broadcasts along
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Broadcast {
    pub shape: Vec<usize>,
    pub lhs: Vec<bool>,
    pub rhs: Vec<bool>,
}

/// Work out how two shapes broadcast against each other
///
/// Axes are compatible if they are equal or one of them is `1`.
pub fn derive_new_shape(op: BinaryOp, ash: &Shape, bsh: &Shape) -> ArrayResult<Broadcast> {
    let rank = ash.len().max(bsh.len());
    let mut bc = Broadcast {
        shape: Vec::with_capacity(rank),
        lhs: vec![false; rank],
        rhs: vec![false; rank],
    };
    for axis in 0..rank {
        let (ad, bd) = (ash.dim(axis), bsh.dim(axis));
        let dim = if ad == bd {
            ad
        } else if ad == 1 {
            bc.lhs[axis] = true;
            bd
        } else if bd == 1 {
            bc.rhs[axis] = true;
            ad
        } else {
            return Err(ArrayError::Nonconformant {
                op: op.to_string().into(),
                lhs: ash.clone(),
                rhs: bsh.clone(),
            });
        };
        bc.shape.push(dim);
    }
    Ok(bc)
}

/// Apply a binary operation elementwise, broadcasting singleton axes
///
/// Text operands are expanded to their character codes first. Every other
/// cell must be numeric.
pub fn elementwise_binary(op: BinaryOp, a: &Array, b: &Array) -> ArrayResult<Array> {
    elementwise_binary_with(op, a, b, &Config::default())
}

/// [`elementwise_binary`] with an explicit size limit
pub fn elementwise_binary_with(
    op: BinaryOp,
    a: &Array,
    b: &Array,
    config: &Config,
) -> ArrayResult<Array> {
    let a = a.to_numeric(op)?;
    let b = b.to_numeric(op)?;
    let bc = derive_new_shape(op, a.shape(), b.shape())?;
    let len = config.validate_size(&bc.shape)?;
    tracing::trace!(%op, lhs = %a.shape(), rhs = %b.shape(), "broadcasting");

    let mut data = EcoVec::with_capacity(len);
    if a.shape() == b.shape() {
        for i in 0..len {
            let x = a.number(i, op)?;
            let y = b.number(i, op)?;
            data.push(Cell::Num(x.binary(op, y)?));
        }
    } else {
        let rank = bc.shape.len();
        let ash = a.shape().with_singleton_tail(rank);
        let bsh = b.shape().with_singleton_tail(rank);
        let strides = compute_strides(&bc.shape);
        let a_strides = compute_strides(&ash);
        let b_strides = compute_strides(&bsh);
        let mut coords = vec![0; rank];
        let mut a_coords = vec![0; rank];
        let mut b_coords = vec![0; rank];
        for n in 0..len {
            decode(&bc.shape, &strides, n, &mut coords);
            for axis in 0..rank {
                a_coords[axis] = if bc.lhs[axis] { 0 } else { coords[axis] };
                b_coords[axis] = if bc.rhs[axis] { 0 } else { coords[axis] };
            }
            let x = a.number(encode(&a_strides, &a_coords), op)?;
            let y = b.number(encode(&b_strides, &b_coords), op)?;
            data.push(Cell::Num(x.binary(op, y)?));
        }
    }
    Ok(Array::new_unchecked(Shape::new(bc.shape), data, false))
}

/// Apply a unary operation to every cell
pub fn elementwise_unary(op: UnaryOp, a: &Array) -> ArrayResult<Array> {
    let a = a.to_numeric(op)?;
    let data: EcoVec<Cell> = (0..a.len())
        .map(|i| a.number(i, op).map(|n| Cell::Num(n.unary(op))))
        .collect::<ArrayResult<_>>()?;
    Ok(Array::new_unchecked(a.shape().clone(), data, false))
}

/// Apply a binary operation to two values of any kind
///
/// Scalars are promoted to `1x1` arrays and a `1x1` result is demoted
/// back to a scalar.
pub fn binary_cells(op: BinaryOp, a: &Cell, b: &Cell) -> ArrayResult<Cell> {
    if let (Cell::Num(x), Cell::Num(y)) = (a, b) {
        return Ok(Cell::Num(x.binary(op, *y)?));
    }
    let a = a.to_numeric_array(op)?;
    let b = b.to_numeric_array(op)?;
    Ok(elementwise_binary(op, &a, &b)?.demote())
}

#[cfg(test)]
mod tests {
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
    fn scalar_times_matrix() {
        let m = arr(&[2, 2], &[1.0, 3.0, 2.0, 4.0]);
        let r = elementwise_binary(BinaryOp::Mul, &Array::scalar(3.0), &m).unwrap();
        assert_eq!(r.shape(), &[2, 2]);
        assert_eq!(nums(&r), [3.0, 9.0, 6.0, 12.0]);
    }

    #[test]
    fn adding_zero_is_identity() {
        let m = arr(&[2, 3], &[1.0, 2.0, 3.0, 4.0, 5.0, 6.0]);
        let r = elementwise_binary(BinaryOp::Add, &m, &Array::scalar(0.0)).unwrap();
        assert_eq!(r, m);
    }

    #[test]
    fn row_against_column() {
        let row = arr(&[1, 3], &[1.0, 2.0, 3.0]);
        let col = arr(&[2, 1], &[10.0, 20.0]);
        let r = elementwise_binary(BinaryOp::Add, &col, &row).unwrap();
        assert_eq!(r.shape(), &[2, 3]);
        assert_eq!(nums(&r), [11.0, 21.0, 12.0, 22.0, 13.0, 23.0]);
    }

    #[test]
    fn broadcast_across_pages() {
        let pages = arr(&[1, 1, 3], &[1.0, 2.0, 3.0]);
        let m = arr(&[2, 1], &[10.0, 20.0]);
        let r = elementwise_binary(BinaryOp::Mul, &m, &pages).unwrap();
        assert_eq!(r.shape(), &[2, 1, 3]);
        assert_eq!(nums(&r), [10.0, 20.0, 20.0, 40.0, 30.0, 60.0]);
    }

    #[test]
    fn nonconformant_shapes() {
        let a = Array::new([2, 3], None);
        let b = Array::new([3, 2], None);
        let err = elementwise_binary(BinaryOp::Add, &a, &b).unwrap_err();
        assert_eq!(
            err.to_string(),
            "operator +: nonconformant arguments (op1 is 2x3, op2 is 3x2)"
        );
        let big = elementwise_binary(BinaryOp::Add, &Array::scalar(1.0), &Array::new([3, 4], None));
        assert_eq!(big.unwrap().shape(), &[3, 4]);
    }

    #[test]
    fn text_operands_use_codes() {
        let r = binary_cells(BinaryOp::Add, &Cell::from("ab"), &Cell::from(1.0)).unwrap();
        let Cell::Array(r) = r else {
            panic!("expected an array")
        };
        assert_eq!(nums(&r), [98.0, 99.0]);
    }

    #[test]
    fn non_numeric_cells_are_rejected() {
        let cells = Array::row([Cell::from(1.0)]).with_cell_flag(true);
        assert!(matches!(
            elementwise_binary(BinaryOp::Add, &cells, &Array::scalar(1.0)),
            Err(ArrayError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn comparisons_give_logical_arrays() {
        let a = arr(&[1, 3], &[1.0, 5.0, 3.0]);
        let r = elementwise_binary(BinaryOp::Gt, &a, &Array::scalar(2.0)).unwrap();
        assert_eq!(r.kind_tag(), crate::KindTag::Logical);
        let r = elementwise_unary(UnaryOp::Not, &r).unwrap();
        assert_eq!(r.cells()[0], Cell::from(true));
    }
}
