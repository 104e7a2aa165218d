use std::fmt;

use serde::*;

use crate::{ArrayError, ArrayResult, BinaryOp, Complex, KindTag, UnaryOp};

/// A numeric element
///
/// Results are narrowed where possible: a complex result with a zero
/// imaginary part becomes real.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum Number {
    Logical(bool),
    Real(f64),
    Complex(Complex),
}

impl Default for Number {
    fn default() -> Self {
        Number::Real(0.0)
    }
}

impl Number {
    /// Build a number from a complex value, narrowing to real if possible
    pub fn from_complex(c: Complex) -> Self {
        if c.im == 0.0 {
            Number::Real(c.re)
        } else {
            Number::Complex(c)
        }
    }
    pub fn kind_tag(&self) -> KindTag {
        match self {
            Number::Logical(_) => KindTag::Logical,
            Number::Real(_) => KindTag::Real,
            Number::Complex(_) => KindTag::Complex,
        }
    }
    pub fn type_name(&self) -> &'static str {
        match self {
            Number::Logical(_) => "bool",
            Number::Real(_) => "double",
            Number::Complex(_) => "complex",
        }
    }
    /// Truthiness: any nonzero part is true
    pub fn to_logical(&self) -> bool {
        match *self {
            Number::Logical(b) => b,
            Number::Real(n) => n != 0.0,
            Number::Complex(c) => c.re != 0.0 || c.im != 0.0,
        }
    }
    /// Get the value as a real number, if it has no imaginary part
    pub fn as_real(&self) -> Option<f64> {
        match *self {
            Number::Logical(b) => Some(b as u8 as f64),
            Number::Real(n) => Some(n),
            Number::Complex(c) if c.im == 0.0 => Some(c.re),
            Number::Complex(_) => None,
        }
    }
    pub fn as_complex(&self) -> Complex {
        match *self {
            Number::Complex(c) => c,
            _ => Complex::from(self.real_part()),
        }
    }
    pub fn real_part(&self) -> f64 {
        match *self {
            Number::Logical(b) => b as u8 as f64,
            Number::Real(n) => n,
            Number::Complex(c) => c.re,
        }
    }
    pub fn is_nan(&self) -> bool {
        match *self {
            Number::Logical(_) => false,
            Number::Real(n) => n.is_nan(),
            Number::Complex(c) => c.is_nan(),
        }
    }
    /// Apply a unary operation
    pub fn unary(self, op: UnaryOp) -> Number {
        match op {
            UnaryOp::Neg => match self {
                Number::Complex(c) => Number::Complex(-c),
                n => Number::Real(-n.real_part()),
            },
            UnaryOp::Not => Number::Logical(!self.to_logical()),
        }
    }
    /// Apply a binary operation
    pub fn binary(self, op: BinaryOp, other: Number) -> ArrayResult<Number> {
        use BinaryOp::*;
        let reals = self.as_real().zip(other.as_real());
        Ok(match op {
            Add => arith(self, other, |a, b| a + b, |a, b| a + b),
            Sub => arith(self, other, |a, b| a - b, |a, b| a - b),
            Mul => arith(self, other, |a, b| a * b, |a, b| a * b),
            RDiv => arith(self, other, |a, b| a / b, |a, b| a / b),
            LDiv => arith(self, other, |a, b| b / a, |a, b| b / a),
            Pow => match reals {
                Some((a, b)) if a >= 0.0 || b.fract() == 0.0 => Number::Real(a.powf(b)),
                _ => Number::from_complex(self.as_complex().powc(other.as_complex())),
            },
            Mod | Rem => {
                let Some((a, b)) = reals else {
                    return Err(ArrayError::TypeMismatch {
                        op: op.name().into(),
                        lhs: self.type_name(),
                        rhs: other.type_name(),
                    });
                };
                Number::Real(if op == Mod {
                    modulus(a, b)
                } else {
                    remainder(a, b)
                })
            }
            Lt => Number::Logical(self.real_part() < other.real_part()),
            Le => Number::Logical(self.real_part() <= other.real_part()),
            Gt => Number::Logical(self.real_part() > other.real_part()),
            Ge => Number::Logical(self.real_part() >= other.real_part()),
            Eq => Number::Logical(self.as_complex() == other.as_complex()),
            Ne => Number::Logical(self.as_complex() != other.as_complex()),
            And => Number::Logical(self.to_logical() && other.to_logical()),
            Or => Number::Logical(self.to_logical() || other.to_logical()),
            Min => extremum(self, other, |a, b| b < a),
            Max => extremum(self, other, |a, b| b > a),
        })
    }
}

fn arith(
    a: Number,
    b: Number,
    real: impl Fn(f64, f64) -> f64,
    complex: impl Fn(Complex, Complex) -> Complex,
) -> Number {
    match (a.as_real(), b.as_real()) {
        (Some(a), Some(b)) => Number::Real(real(a, b)),
        _ => Number::from_complex(complex(a.as_complex(), b.as_complex())),
    }
}

/// Pick between two numbers, ignoring NaN
fn extremum(a: Number, b: Number, replaces: impl Fn(f64, f64) -> bool) -> Number {
    if a.is_nan() {
        b
    } else if b.is_nan() || !replaces(a.real_part(), b.real_part()) {
        a
    } else {
        b
    }
}

/// Floored modulus; `mod(x, 0)` is `x`
fn modulus(a: f64, b: f64) -> f64 {
    if b == 0.0 {
        a
    } else {
        let m = a - (a / b).floor() * b;
        if m != 0.0 && (m < 0.0) != (b < 0.0) {
            m + b
        } else {
            m
        }
    }
}

/// Truncated remainder; `rem(x, 0)` is NaN
fn remainder(a: f64, b: f64) -> f64 {
    if b == 0.0 {
        f64::NAN
    } else {
        a - (a / b).trunc() * b
    }
}

impl From<f64> for Number {
    fn from(n: f64) -> Self {
        Number::Real(n)
    }
}

impl From<bool> for Number {
    fn from(b: bool) -> Self {
        Number::Logical(b)
    }
}

impl From<Complex> for Number {
    fn from(c: Complex) -> Self {
        Number::from_complex(c)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::Logical(b) => write!(f, "{}", *b as u8),
            Number::Real(n) => n.fmt(f),
            Number::Complex(c) => c.fmt(f),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn real(n: f64) -> Number {
        Number::Real(n)
    }

    #[test]
    fn arithmetic_dispatch() {
        assert_eq!(real(3.0).binary(BinaryOp::Add, real(4.0)), Ok(real(7.0)));
        assert_eq!(real(3.0).binary(BinaryOp::RDiv, real(4.0)), Ok(real(0.75)));
        assert_eq!(real(3.0).binary(BinaryOp::LDiv, real(6.0)), Ok(real(2.0)));
        assert_eq!(
            Number::Logical(true).binary(BinaryOp::Add, Number::Logical(true)),
            Ok(real(2.0))
        );
    }

    #[test]
    fn negative_base_fractional_power_is_complex() {
        let n = real(-4.0).binary(BinaryOp::Pow, real(0.5)).unwrap();
        assert_eq!(n.kind_tag(), KindTag::Complex);
        assert!((n.as_complex().im - 2.0).abs() < 1e-12);
        assert_eq!(real(-2.0).binary(BinaryOp::Pow, real(3.0)), Ok(real(-8.0)));
    }

    #[test]
    fn complex_results_narrow() {
        let i = Number::Complex(Complex::I);
        assert_eq!(i.binary(BinaryOp::Mul, i), Ok(real(-1.0)));
    }

    #[test]
    fn modulus_and_remainder() {
        assert_eq!(real(-7.0).binary(BinaryOp::Mod, real(3.0)), Ok(real(2.0)));
        assert_eq!(real(-7.0).binary(BinaryOp::Rem, real(3.0)), Ok(real(-1.0)));
        assert_eq!(real(5.0).binary(BinaryOp::Mod, real(0.0)), Ok(real(5.0)));
        assert!(real(5.0).binary(BinaryOp::Rem, real(0.0)).unwrap().is_nan());
        assert!(matches!(
            Number::Complex(Complex::I).binary(BinaryOp::Mod, real(2.0)),
            Err(ArrayError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn comparisons_are_logical() {
        let lt = real(1.0).binary(BinaryOp::Lt, real(2.0)).unwrap();
        assert_eq!(lt, Number::Logical(true));
        assert_eq!(lt.kind_tag(), KindTag::Logical);
    }

    #[test]
    fn extrema_skip_nan() {
        assert_eq!(real(f64::NAN).binary(BinaryOp::Max, real(1.0)), Ok(real(1.0)));
        assert_eq!(real(1.0).binary(BinaryOp::Min, real(f64::NAN)), Ok(real(1.0)));
        assert_eq!(real(1.0).binary(BinaryOp::Max, real(1.0)), Ok(real(1.0)));
    }
}
