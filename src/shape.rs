use std::{
    fmt,
    ops::{Deref, DerefMut},
};

use serde::*;
use tinyvec::{tiny_vec, TinyVec};

/// An array's shape
///
/// A canonical shape has at least two dimensions and no trailing
/// singleton dimensions past the second. Arrays only ever hold canonical
/// shapes, but padded shapes are built transiently while addressing.
#[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Shape {
    dims: TinyVec<[usize; 3]>,
}

impl Shape {
    /// Create a canonical shape from the given dimensions
    pub fn new(dims: impl IntoIterator<Item = usize>) -> Self {
        let mut shape = Shape {
            dims: dims.into_iter().collect(),
        };
        shape.canonicalize();
        shape
    }
    /// The `1x1` shape
    pub fn scalar() -> Self {
        Shape {
            dims: tiny_vec![1, 1],
        }
    }
    /// The `0x0` shape of the canonical empty array
    pub fn empty() -> Self {
        Shape {
            dims: tiny_vec![0, 0],
        }
    }
    /// A `1xn` row shape
    pub fn row(n: usize) -> Self {
        Shape {
            dims: tiny_vec![1, n],
        }
    }
    /// An `nx1` column shape
    pub fn column(n: usize) -> Self {
        Shape {
            dims: tiny_vec![n, 1],
        }
    }
    /// Pad to at least two dimensions, then drop trailing singletons past the second
    pub fn canonicalize(&mut self) {
        while self.dims.len() < 2 {
            self.dims.push(1);
        }
        while self.dims.len() > 2 && self.dims.last() == Some(&1) {
            self.dims.pop();
        }
    }
    /// Get the canonical form of this shape
    pub fn canonical(mut self) -> Self {
        self.canonicalize();
        self
    }
    /// Pad with singleton dimensions up to the given rank
    ///
    /// The result is not canonical if `rank` exceeds the canonical rank.
    pub fn append_singleton_tail(&mut self, rank: usize) {
        while self.dims.len() < rank {
            self.dims.push(1);
        }
    }
    /// Get a copy of this shape padded to the given rank
    pub fn with_singleton_tail(&self, rank: usize) -> Self {
        let mut shape = self.clone();
        shape.append_singleton_tail(rank);
        shape
    }
    /// Get the number of elements
    pub fn elements(&self) -> usize {
        self.dims.iter().product()
    }
    /// Get the dimension along an axis, treating missing axes as singleton
    pub fn dim(&self, axis: usize) -> usize {
        self.dims.get(axis).copied().unwrap_or(1)
    }
    /// Get the number of rows
    pub fn rows(&self) -> usize {
        self.dim(0)
    }
    /// Get the number of columns
    pub fn cols(&self) -> usize {
        self.dim(1)
    }
    /// Get the number of `rows x cols` pages
    pub fn pages(&self) -> usize {
        self.dims.iter().skip(2).product()
    }
    /// Whether the shape is `1x1`
    pub fn is_scalar(&self) -> bool {
        self.elements() == 1
    }
    /// Whether the shape is a row or column vector (or a scalar)
    pub fn is_vector(&self) -> bool {
        self.dims.len() == 2 && (self.dims[0] == 1 || self.dims[1] == 1)
    }
    /// Whether the shape is `1xn`
    pub fn is_row(&self) -> bool {
        self.dims.len() == 2 && self.dims[0] == 1
    }
    /// Index of the first non-singleton axis, or `0` if there is none
    pub fn first_non_singleton(&self) -> usize {
        self.dims.iter().position(|&d| d != 1).unwrap_or(0)
    }
    /// Push a trailing dimension
    pub fn push(&mut self, dim: usize) {
        self.dims.push(dim);
    }
    /// Get a reference to the dimensions
    pub fn dims(&self) -> &[usize] {
        &self.dims
    }
}

impl fmt::Debug for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, dim) in self.dims.iter().enumerate() {
            if i > 0 {
                write!(f, "x")?;
            }
            write!(f, "{dim}")?;
        }
        Ok(())
    }
}

impl fmt::Display for Shape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{self:?}")
    }
}

impl From<&[usize]> for Shape {
    fn from(dims: &[usize]) -> Self {
        Shape::new(dims.iter().copied())
    }
}

impl<const N: usize> From<[usize; N]> for Shape {
    fn from(dims: [usize; N]) -> Self {
        dims.as_slice().into()
    }
}

impl From<Vec<usize>> for Shape {
    fn from(dims: Vec<usize>) -> Self {
        Shape::new(dims)
    }
}

impl Deref for Shape {
    type Target = [usize];
    fn deref(&self) -> &Self::Target {
        &self.dims
    }
}

impl DerefMut for Shape {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.dims
    }
}

impl<'a> IntoIterator for &'a Shape {
    type Item = &'a usize;
    type IntoIter = <&'a [usize] as IntoIterator>::IntoIter;
    fn into_iter(self) -> Self::IntoIter {
        self.dims.iter()
    }
}

impl FromIterator<usize> for Shape {
    fn from_iter<I: IntoIterator<Item = usize>>(iter: I) -> Self {
        Shape::new(iter)
    }
}

impl<const N: usize> PartialEq<[usize; N]> for Shape {
    fn eq(&self, other: &[usize; N]) -> bool {
        self.dims.as_slice() == other.as_slice()
    }
}

impl PartialEq<[usize]> for Shape {
    fn eq(&self, other: &[usize]) -> bool {
        self.dims.as_slice() == other
    }
}
