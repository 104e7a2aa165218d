/*!
The N-dimensional array engine of a MATLAB/Octave-style numeric language

Arrays are column-major, at least two-dimensional, and hold [`Cell`]s:
numbers, text, structs, function handles, or nested arrays for cell arrays.

```
use mlarray::{algorithm::pervade::elementwise_binary, Array, BinaryOp};

let m = Array::from_numbers([2, 2], &[1.0, 3.0, 2.0, 4.0]).unwrap();
let r = elementwise_binary(BinaryOp::Mul, &Array::scalar(3.0), &m).unwrap();
assert_eq!(r.shape(), &[2, 2]);
```

Named values live in a [`Workspace`], which implements indexed
assignment with auto-creation and growth:

```
use mlarray::{Subscript, Workspace};

let mut ws = Workspace::new();
ws.set_elements("x", &[Subscript::scalar(1), Subscript::scalar(3)], 7.0.into())
    .unwrap();
assert_eq!(ws.get("x").unwrap().to_string(), "[1x3 matrix]");
```
*/

pub mod addressing;
pub mod algorithm;
mod array;
mod cell;
mod complex;
mod config;
mod error;
pub mod grid_fmt;
mod number;
mod ops;
mod shape;
mod workspace;

pub use self::{
    algorithm::{
        reduce::{MultiOutput, Reduction, Strategy},
        select::Subscript,
    },
    array::Array,
    cell::{text_to_numeric_array, Cell, FunctionHandle, KindTag, Struct},
    complex::Complex,
    config::Config,
    error::*,
    number::Number,
    ops::{BinaryOp, UnaryOp},
    shape::Shape,
    workspace::Workspace,
};
