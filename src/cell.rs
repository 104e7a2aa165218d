//! The closed set of values an array cell may hold

use std::fmt;

use ecow::EcoString;
use enum_iterator::Sequence;
use indexmap::IndexMap;
use serde::*;

use crate::{Array, ArrayError, ArrayResult, Number};

/// A ranked classification of element kinds
///
/// An array's kind tag is the maximum of its cells' tags.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Hash,
    Default,
    Sequence,
    Serialize,
    Deserialize,
)]
pub enum KindTag {
    Logical,
    #[default]
    Real,
    Complex,
    Text,
    Struct,
    FunctionHandle,
}

/// A single array element
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Num(Number),
    /// A nested array, as held by cell arrays
    Array(Array),
    Text(EcoString),
    Struct(Struct),
    Func(FunctionHandle),
    /// A slot that has not been filled yet
    Absent,
}

impl Default for Cell {
    fn default() -> Self {
        Cell::Num(Number::default())
    }
}

impl Cell {
    pub fn kind_tag(&self) -> KindTag {
        match self {
            Cell::Num(n) => n.kind_tag(),
            Cell::Array(arr) => arr.kind_tag(),
            Cell::Text(_) => KindTag::Text,
            Cell::Struct(_) => KindTag::Struct,
            Cell::Func(_) => KindTag::FunctionHandle,
            Cell::Absent => KindTag::Logical,
        }
    }
    pub fn type_name(&self) -> &'static str {
        match self {
            Cell::Num(n) => n.type_name(),
            Cell::Array(arr) if arr.is_cell() => "cell array",
            Cell::Array(_) => "matrix",
            Cell::Text(_) => "string",
            Cell::Struct(_) => "scalar struct",
            Cell::Func(_) => "function handle",
            Cell::Absent => "<undefined>",
        }
    }
    /// Truthiness
    ///
    /// Arrays are true when non-empty and every cell is true. Text is true
    /// when non-empty and free of NUL characters. Structs, function
    /// handles and absent cells are false.
    pub fn to_logical(&self) -> bool {
        match self {
            Cell::Num(n) => n.to_logical(),
            Cell::Array(arr) => !arr.is_empty() && arr.cells().iter().all(Cell::to_logical),
            Cell::Text(s) => !s.is_empty() && !s.contains('\0'),
            Cell::Struct(_) | Cell::Func(_) | Cell::Absent => false,
        }
    }
    pub fn as_number(&self) -> Option<Number> {
        match self {
            Cell::Num(n) => Some(*n),
            _ => None,
        }
    }
    pub fn as_array(&self) -> Option<&Array> {
        match self {
            Cell::Array(arr) => Some(arr),
            _ => None,
        }
    }
    /// Promote this cell to an array
    ///
    /// Arrays are returned as-is. Anything else becomes a `1x1` array
    /// holding it.
    pub fn into_array(self) -> Array {
        match self {
            Cell::Array(arr) => arr,
            cell => Array::scalar(cell),
        }
    }
    /// Get an array of numbers suitable for arithmetic
    ///
    /// Text is expanded to its character codes. Cell arrays, structs and
    /// function handles are rejected.
    pub fn to_numeric_array(&self, op: impl fmt::Display) -> ArrayResult<Array> {
        match self {
            Cell::Num(n) => Ok(Array::scalar(Cell::Num(*n))),
            Cell::Text(s) => Ok(text_to_numeric_array(s)),
            Cell::Array(arr) => arr.to_numeric(op),
            cell => Err(ArrayError::TypeMismatch {
                op: op.to_string().into(),
                lhs: cell.type_name(),
                rhs: cell.type_name(),
            }),
        }
    }
    /// Whether this is an empty array
    pub fn is_empty_array(&self) -> bool {
        matches!(self, Cell::Array(arr) if arr.is_empty())
    }
    /// Read a field through a `.` path
    pub fn get_field(&self, path: &[EcoString]) -> ArrayResult<&Cell> {
        let Some((field, rest)) = path.split_first() else {
            return Ok(self);
        };
        match self {
            Cell::Struct(s) => s.get_field(field, rest),
            cell => Err(ArrayError::NotAStruct {
                kind: cell.type_name(),
                field: field.clone(),
            }),
        }
    }
    /// Write a field through a `.` path
    ///
    /// Absent cells and empty arrays along the path become structs.
    pub fn set_field(&mut self, path: &[EcoString], value: Cell) -> ArrayResult {
        let Some((field, rest)) = path.split_first() else {
            *self = value;
            return Ok(());
        };
        if matches!(self, Cell::Absent) || self.is_empty_array() {
            *self = Cell::Struct(Struct::default());
        }
        match self {
            Cell::Struct(s) => s.set_field(field, rest, value),
            cell => Err(ArrayError::NotAStruct {
                kind: cell.type_name(),
                field: field.clone(),
            }),
        }
    }
}

impl From<Number> for Cell {
    fn from(n: Number) -> Self {
        Cell::Num(n)
    }
}

impl From<f64> for Cell {
    fn from(n: f64) -> Self {
        Cell::Num(Number::Real(n))
    }
}

impl From<bool> for Cell {
    fn from(b: bool) -> Self {
        Cell::Num(Number::Logical(b))
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.into())
    }
}

impl From<Array> for Cell {
    fn from(arr: Array) -> Self {
        Cell::Array(arr)
    }
}

impl From<Struct> for Cell {
    fn from(s: Struct) -> Self {
        Cell::Struct(s)
    }
}

impl From<FunctionHandle> for Cell {
    fn from(f: FunctionHandle) -> Self {
        Cell::Func(f)
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Num(n) => n.fmt(f),
            Cell::Array(arr) => write!(f, "[{} {}]", arr.shape(), self.type_name()),
            Cell::Text(s) => s.fmt(f),
            Cell::Struct(_) => write!(f, "1x1 struct"),
            Cell::Func(func) => func.fmt(f),
            Cell::Absent => Ok(()),
        }
    }
}

/// Expand text into a `1xN` array of character codes
pub fn text_to_numeric_array(text: &str) -> Array {
    let codes: Vec<Cell> = text.chars().map(|c| Cell::from(c as u32 as f64)).collect();
    if codes.is_empty() {
        Array::empty()
    } else {
        Array::row(codes)
    }
}

/// A scalar struct with ordered fields
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Struct {
    fields: IndexMap<EcoString, Cell>,
}

impl Struct {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn len(&self) -> usize {
        self.fields.len()
    }
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
    pub fn field(&self, name: &str) -> Option<&Cell> {
        self.fields.get(name)
    }
    pub fn field_names(&self) -> impl Iterator<Item = &EcoString> {
        self.fields.keys()
    }
    pub fn fields(&self) -> impl Iterator<Item = (&EcoString, &Cell)> {
        self.fields.iter()
    }
    pub fn insert(&mut self, name: impl Into<EcoString>, value: impl Into<Cell>) {
        self.fields.insert(name.into(), value.into());
    }
    fn get_field(&self, field: &EcoString, rest: &[EcoString]) -> ArrayResult<&Cell> {
        self.fields
            .get(field)
            .ok_or_else(|| ArrayError::InvalidStructAccess {
                field: field.clone(),
            })?
            .get_field(rest)
    }
    fn set_field(&mut self, field: &EcoString, rest: &[EcoString], value: Cell) -> ArrayResult {
        self.fields
            .entry(field.clone())
            .or_insert(Cell::Absent)
            .set_field(rest, value)
    }
    /// Get a struct with the same field names, each holding an empty array
    ///
    /// Nested structs are not cloned; their fields collapse to `[]` too.
    pub fn clone_field_names(&self) -> Self {
        Struct {
            fields: (self.fields.keys())
                .map(|name| (name.clone(), Cell::Array(Array::empty())))
                .collect(),
        }
    }
}

/// An opaque reference to a callable
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FunctionHandle {
    pub name: EcoString,
}

impl FunctionHandle {
    pub fn new(name: impl Into<EcoString>) -> Self {
        Self { name: name.into() }
    }
}

impl fmt::Display for FunctionHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "@{}", self.name)
    }
}
