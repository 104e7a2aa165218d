use serde::*;

use crate::{ArrayError, ArrayResult, Shape};

/// Engine limits and display options
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// The largest number of cells an operation may allocate when growing
    pub max_elements: usize,
    /// Fractional digits shown for non-integer numbers
    pub precision: usize,
    /// Irrelevant subscript count above which bounds errors use `...[xN]...`
    pub compact_threshold: usize,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_elements: 1 << 31,
            precision: 4,
            compact_threshold: 4,
        }
    }
}

impl Config {
    /// Check that a shape fits within the element limit
    pub fn validate_size(&self, shape: &[usize]) -> ArrayResult<usize> {
        let elements = shape
            .iter()
            .try_fold(1usize, |acc, &dim| acc.checked_mul(dim))
            .ok_or(ArrayError::TooLarge {
                elements: usize::MAX,
            })?;
        if elements > self.max_elements {
            return Err(ArrayError::TooLarge { elements });
        }
        Ok(elements)
    }
    pub(crate) fn validate_shape(&self, shape: &Shape) -> ArrayResult<usize> {
        self.validate_size(shape.dims())
    }
}
