use std::fmt;

use ecow::EcoString;

use crate::Shape;

/// An error raised by an array operation
///
/// Every failure is reported at the point of detection and propagated
/// unchanged. Messages follow Octave's diagnostics.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ArrayError {
    /// A subscript was in range of its type but past the array's extent
    #[error(
        "index ({subscript}): out of bound; value {value} out of bound {bound} \
         (dimensions are {shape})"
    )]
    OutOfBound {
        /// The subscript rendered with irrelevant axes elided
        subscript: EcoString,
        /// Zero-based position of the offending axis
        position: usize,
        value: usize,
        bound: usize,
        shape: Shape,
    },
    /// A subscript was not a positive real integer
    #[error(
        "index ({subscript}): subscripts must be either integers 1 to (2^63)-1 or logicals"
    )]
    InvalidIndex {
        subscript: EcoString,
        position: usize,
    },
    /// A single linear subscript tried to grow an existing array
    #[error(
        "Octave:index-out-of-bounds: A(I) = X: X must have the same size as I; \
         cannot resize {shape} array to hold index {index} with a linear subscript"
    )]
    LinearResize { index: usize, shape: Shape },
    /// Operand shapes cannot be broadcast or assigned to each other
    #[error("{op}: nonconformant arguments (op1 is {lhs}, op2 is {rhs})")]
    Nonconformant {
        op: EcoString,
        lhs: Shape,
        rhs: Shape,
    },
    /// Concatenation inputs disagree on a non-concatenated axis
    #[error("{op} dimensions mismatch ({lhs} vs {rhs})")]
    DimensionMismatch {
        op: &'static str,
        lhs: Shape,
        rhs: Shape,
    },
    #[error("{op} not defined for N-D objects")]
    NotTwoDimensional { op: &'static str },
    #[error("reshape: can't reshape {from} array to {to} array")]
    ReshapeMismatch { from: Shape, to: Shape },
    #[error(
        "reshape: SIZE is not divisible by the product of known dimensions (= {known})"
    )]
    ReshapeWildcard { elements: usize, known: usize },
    /// A `.` path reached a value that is not a struct
    #[error("{kind} cannot be indexed with .{field}")]
    NotAStruct {
        kind: &'static str,
        field: EcoString,
    },
    /// A `.` path named a field that does not exist
    #[error("invalid use of undefined value: no field '{field}'")]
    InvalidStructAccess { field: EcoString },
    /// An operand kind is not supported by an operation
    #[error("{op}: not defined for '{lhs}' by '{rhs}' operations")]
    TypeMismatch {
        op: EcoString,
        lhs: &'static str,
        rhs: &'static str,
    },
    #[error("'{0}' undefined")]
    Undefined(EcoString),
    #[error("element number {requested} undefined in return list (at most {available} outputs)")]
    TooManyOutputs { requested: usize, available: usize },
    #[error("{function}: called with {given} arguments, expected {expected}")]
    WrongArgumentCount {
        function: &'static str,
        given: usize,
        expected: &'static str,
    },
    #[error("{function}: DIM must be a valid dimension")]
    InvalidDimension { function: &'static str },
    #[error("out of memory or dimension too large for Octave's index type ({elements} elements)")]
    TooLarge { elements: usize },
    /// A reduction strategy name was not recognized
    #[error("unknown reduction strategy '{0}'")]
    UnknownStrategy(EcoString),
    /// An arithmetic operation name was not recognized
    #[error("unknown operation '{0}'")]
    UnknownOperation(EcoString),
}

/// A result of an array operation
pub type ArrayResult<T = ()> = Result<T, ArrayError>;

/// Render a subscript with every axis except `position` elided
///
/// Irrelevant axes are shown as `_`. When there are more than
/// `compact_threshold` of them, runs of consecutive irrelevant axes are
/// collapsed to `...[xN]...`.
pub fn elided_subscript(
    rank: usize,
    position: usize,
    value: impl fmt::Display,
    compact_threshold: usize,
) -> EcoString {
    let irrelevant = rank.saturating_sub(1);
    let compact = irrelevant > compact_threshold;
    let run = |n: usize| -> Vec<String> {
        if compact && n > 1 {
            vec![format!("...[x{n}]...")]
        } else {
            vec!["_".to_string(); n]
        }
    };
    let mut parts = run(position);
    parts.push(value.to_string());
    parts.extend(run(rank.saturating_sub(position + 1)));
    parts.join(",").into()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elision() {
        assert_eq!(elided_subscript(1, 0, 7, 4), "7");
        assert_eq!(elided_subscript(2, 0, 4, 4), "4,_");
        assert_eq!(elided_subscript(3, 2, 9, 4), "_,_,9");
        assert_eq!(elided_subscript(7, 5, 3, 4), "...[x5]...,3,_");
        assert_eq!(elided_subscript(7, 0, 3, 4), "3,...[x6]...");
    }

    #[test]
    fn bounds_message_names_the_bound() {
        let err = ArrayError::OutOfBound {
            subscript: elided_subscript(2, 0, 4, 4),
            position: 0,
            value: 4,
            bound: 3,
            shape: Shape::from([3, 3]),
        };
        assert_eq!(
            err.to_string(),
            "index (4,_): out of bound; value 4 out of bound 3 (dimensions are 3x3)"
        );
    }
}
