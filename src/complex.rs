use std::{fmt, ops::*};

use serde::*;

/// A complex number backed by a pair of `f64`s
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Complex {
    /// The real part
    pub re: f64,
    /// The imaginary part
    pub im: f64,
}

impl Complex {
    /// The imaginary unit
    pub const I: Self = Self { re: 0.0, im: 1.0 };
    /// Create a new complex number
    pub const fn new(re: f64, im: f64) -> Self {
        Self { re, im }
    }
    /// Get the absolute value of a complex number
    pub fn abs(self) -> f64 {
        self.re.hypot(self.im)
    }
    /// Get the argument of a complex number
    pub fn arg(self) -> f64 {
        self.im.atan2(self.re)
    }
    /// Whether either part is NaN
    pub fn is_nan(self) -> bool {
        self.re.is_nan() || self.im.is_nan()
    }
    /// Get the natural logarithm of a complex number
    pub fn ln(self) -> Self {
        Self::new(self.abs().ln(), self.arg())
    }
    /// Get the exponential of a complex number
    pub fn exp(self) -> Self {
        let r = self.re.exp();
        Self::new(r * self.im.cos(), r * self.im.sin())
    }
    /// Raise a complex number to a complex power
    pub fn powc(self, power: impl Into<Self>) -> Self {
        let power = power.into();
        if power == Self::default() {
            return Self::new(1.0, 0.0);
        }
        if self == Self::default() {
            return if power.re > 0.0 {
                Self::default()
            } else {
                Self::new(f64::INFINITY, 0.0)
            };
        }
        (self.ln() * power).exp()
    }
}

impl From<f64> for Complex {
    fn from(re: f64) -> Self {
        Self { re, im: 0.0 }
    }
}

impl fmt::Display for Complex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.im == 0.0 {
            self.re.fmt(f)
        } else if self.im < 0.0 {
            write!(f, "{} - {}i", self.re, -self.im)
        } else {
            write!(f, "{} + {}i", self.re, self.im)
        }
    }
}

impl Add for Complex {
    type Output = Self;
    fn add(self, rhs: Self) -> Self::Output {
        Self::new(self.re + rhs.re, self.im + rhs.im)
    }
}

impl Sub for Complex {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self::Output {
        Self::new(self.re - rhs.re, self.im - rhs.im)
    }
}

impl Mul for Complex {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self::Output {
        Self::new(
            self.re * rhs.re - self.im * rhs.im,
            self.re * rhs.im + self.im * rhs.re,
        )
    }
}

impl Div for Complex {
    type Output = Self;
    fn div(self, rhs: Self) -> Self::Output {
        let denom = rhs.re * rhs.re + rhs.im * rhs.im;
        Self::new(
            (self.re * rhs.re + self.im * rhs.im) / denom,
            (self.im * rhs.re - self.re * rhs.im) / denom,
        )
    }
}

impl Neg for Complex {
    type Output = Self;
    fn neg(self) -> Self::Output {
        Self::new(-self.re, -self.im)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn close(a: Complex, b: Complex) -> bool {
        (a - b).abs() < 1e-12
    }

    #[test]
    fn arithmetic() {
        let a = Complex::new(1.0, 2.0);
        let b = Complex::new(3.0, -1.0);
        assert_eq!(a * b, Complex::new(5.0, 5.0));
        assert!(close((a * b) / b, a));
        assert_eq!(-a + a, Complex::default());
    }

    #[test]
    fn powers() {
        assert!(close(Complex::I.powc(2.0), Complex::new(-1.0, 0.0)));
        assert!(close(Complex::from(-4.0).powc(0.5), Complex::new(0.0, 2.0)));
        assert_eq!(Complex::default().powc(0.0), Complex::new(1.0, 0.0));
    }

    #[test]
    fn display() {
        assert_eq!(Complex::new(1.0, -2.0).to_string(), "1 - 2i");
        assert_eq!(Complex::from(3.0).to_string(), "3");
    }
}
