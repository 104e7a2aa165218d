use std::fmt;

use enum_iterator::{all, Sequence};
use serde::*;

use crate::{ArrayError, ArrayResult};

/// Elementwise binary operations
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Sequence, Serialize, Deserialize,
)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    RDiv,
    LDiv,
    Pow,
    Mod,
    Rem,
    Lt,
    Le,
    Eq,
    Ge,
    Gt,
    Ne,
    And,
    Or,
    Min,
    Max,
}

impl BinaryOp {
    /// The name used to select this operation
    pub fn name(self) -> &'static str {
        match self {
            BinaryOp::Add => "add",
            BinaryOp::Sub => "sub",
            BinaryOp::Mul => "mul",
            BinaryOp::RDiv => "rdiv",
            BinaryOp::LDiv => "ldiv",
            BinaryOp::Pow => "power",
            BinaryOp::Mod => "mod",
            BinaryOp::Rem => "rem",
            BinaryOp::Lt => "lt",
            BinaryOp::Le => "le",
            BinaryOp::Eq => "eq",
            BinaryOp::Ge => "ge",
            BinaryOp::Gt => "gt",
            BinaryOp::Ne => "ne",
            BinaryOp::And => "and",
            BinaryOp::Or => "or",
            BinaryOp::Min => "min",
            BinaryOp::Max => "max",
        }
    }
    /// Look up an operation by name
    pub fn from_name(name: &str) -> ArrayResult<Self> {
        all::<BinaryOp>()
            .find(|op| op.name() == name)
            .ok_or_else(|| ArrayError::UnknownOperation(name.into()))
    }
    /// Whether the operation produces logical results
    pub fn is_logical(self) -> bool {
        matches!(
            self,
            BinaryOp::Lt
                | BinaryOp::Le
                | BinaryOp::Eq
                | BinaryOp::Ge
                | BinaryOp::Gt
                | BinaryOp::Ne
                | BinaryOp::And
                | BinaryOp::Or
        )
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BinaryOp::Add => write!(f, "operator +"),
            BinaryOp::Sub => write!(f, "operator -"),
            BinaryOp::Mul => write!(f, "product"),
            BinaryOp::RDiv => write!(f, "quotient"),
            BinaryOp::LDiv => write!(f, "left quotient"),
            BinaryOp::Pow => write!(f, "operator .^"),
            BinaryOp::Lt => write!(f, "operator <"),
            BinaryOp::Le => write!(f, "operator <="),
            BinaryOp::Eq => write!(f, "operator =="),
            BinaryOp::Ge => write!(f, "operator >="),
            BinaryOp::Gt => write!(f, "operator >"),
            BinaryOp::Ne => write!(f, "operator !="),
            BinaryOp::And => write!(f, "operator &"),
            BinaryOp::Or => write!(f, "operator |"),
            op => write!(f, "{}", op.name()),
        }
    }
}

/// Elementwise unary operations
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Sequence)]
pub enum UnaryOp {
    Neg,
    Not,
}

impl UnaryOp {
    pub fn name(self) -> &'static str {
        match self {
            UnaryOp::Neg => "uminus",
            UnaryOp::Not => "not",
        }
    }
    pub fn from_name(name: &str) -> ArrayResult<Self> {
        all::<UnaryOp>()
            .find(|op| op.name() == name)
            .ok_or_else(|| ArrayError::UnknownOperation(name.into()))
    }
}

impl fmt::Display for UnaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOp::Neg => write!(f, "unary operator -"),
            UnaryOp::Not => write!(f, "unary operator !"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn name_collisions() {
        for a in all::<BinaryOp>() {
            for b in all::<BinaryOp>() {
                if a >= b {
                    continue;
                }
                assert_ne!(a.name(), b.name(), "{a:?} and {b:?} have the same name");
            }
        }
    }

    #[test]
    fn lookup_by_name() {
        for op in all::<BinaryOp>() {
            assert_eq!(BinaryOp::from_name(op.name()), Ok(op));
        }
        assert_eq!(UnaryOp::from_name("not"), Ok(UnaryOp::Not));
        assert!(matches!(
            BinaryOp::from_name("frobnicate"),
            Err(ArrayError::UnknownOperation(_))
        ));
    }
}
