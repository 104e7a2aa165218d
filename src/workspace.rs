use ecow::EcoString;
use indexmap::IndexMap;

use crate::{
    addressing::subscript_to_linear,
    algorithm::select::{addressed_shape, check_bounds, for_each_combination},
    cell::text_to_numeric_array,
    Array, ArrayError, ArrayResult, Cell, Config, KindTag, Shape, Subscript,
};

/// A table of named values
///
/// Values are moved in and out. Binding one name's value to another name
/// requires an explicit clone, so no two bindings can observe each
/// other's mutations.
#[derive(Debug, Clone, Default)]
pub struct Workspace {
    bindings: IndexMap<EcoString, Cell>,
    config: Config,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Origin {
    Undefined,
    Scalar,
    Array,
}

impl Workspace {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn with_config(config: Config) -> Self {
        Workspace {
            bindings: IndexMap::new(),
            config,
        }
    }
    pub fn config(&self) -> &Config {
        &self.config
    }
    /// Get the value bound to a name
    pub fn get(&self, name: &str) -> ArrayResult<&Cell> {
        self.bindings
            .get(name)
            .ok_or_else(|| ArrayError::Undefined(name.into()))
    }
    pub fn contains(&self, name: &str) -> bool {
        self.bindings.contains_key(name)
    }
    /// Bind a value to a name, returning the value it replaces
    pub fn bind(&mut self, name: impl Into<EcoString>, value: impl Into<Cell>) -> Option<Cell> {
        self.bindings.insert(name.into(), value.into())
    }
    pub fn remove(&mut self, name: &str) -> Option<Cell> {
        self.bindings.shift_remove(name)
    }
    /// The bound names, in the order they were first bound
    pub fn names(&self) -> impl Iterator<Item = &EcoString> {
        self.bindings.keys()
    }
    /// Read `name(subscripts...)`
    pub fn get_elements(&self, name: &str, subscripts: &[Subscript]) -> ArrayResult<Cell> {
        let arr = binding_array(self.get(name)?.clone());
        Ok(arr.get_elements_with(subscripts, &self.config)?.demote())
    }
    /// Read `name.a.b...`
    pub fn get_field(&self, name: &str, path: &[EcoString]) -> ArrayResult<&Cell> {
        self.get(name)?.get_field(path)
    }
    /// Write `name.a.b... = value`
    ///
    /// An undefined name becomes a struct.
    pub fn set_field(&mut self, name: &str, path: &[EcoString], value: Cell) -> ArrayResult {
        if !self.contains(name) {
            tracing::debug!(name, "creating struct binding");
        }
        let slot = self.bindings.entry(name.into()).or_insert(Cell::Absent);
        let result = slot.set_field(path, value);
        if matches!(slot, Cell::Absent) {
            self.bindings.shift_remove(name);
        }
        result
    }
    /// Write `name(subscripts...) = rhs`
    ///
    /// An undefined name is created just large enough to hold the written
    /// positions. A scalar is promoted to an array first. Arrays grow only
    /// along explicit subscript axes; a single linear subscript may not
    /// grow an existing non-empty array. On error the binding is left as
    /// it was.
    pub fn set_elements(&mut self, name: &str, subscripts: &[Subscript], rhs: Cell) -> ArrayResult {
        let (mut arr, origin) = self.take_target(name, &rhs);
        let result = assign(&mut arr, origin, subscripts, rhs, &self.config);
        self.restore(name, arr, origin, result.is_ok());
        result
    }
    /// Write `name(mask) = rhs`
    ///
    /// Logical assignment never grows the array. The right-hand side must
    /// have one cell or one cell per true mask cell.
    pub fn set_elements_logical(&mut self, name: &str, mask: &Array, rhs: Cell) -> ArrayResult {
        if !self.contains(name) {
            return Err(ArrayError::Undefined(name.into()));
        }
        let (mut arr, origin) = self.take_target(name, &rhs);
        let rhs = rhs_array(rhs, arr.is_cell());
        let result = assign_logical(&mut arr, mask, &rhs, &self.config);
        self.restore(name, arr, origin, result.is_ok());
        result
    }
    fn take_target(&mut self, name: &str, rhs: &Cell) -> (Array, Origin) {
        match self.bindings.get_mut(name).map(std::mem::take) {
            None | Some(Cell::Absent) => {
                let is_cell = matches!(rhs, Cell::Array(arr) if arr.is_cell());
                (Array::empty().with_cell_flag(is_cell), Origin::Undefined)
            }
            Some(Cell::Array(arr)) if arr.is_cell() || arr.len() != 1 => (arr, Origin::Array),
            Some(Cell::Text(text)) => (text_to_numeric_array(&text), Origin::Array),
            Some(cell) => {
                tracing::debug!(name, kind = cell.type_name(), "promoting scalar to array");
                (cell.into_array(), Origin::Scalar)
            }
        }
    }
    fn restore(&mut self, name: &str, arr: Array, origin: Origin, succeeded: bool) {
        let value = match origin {
            Origin::Undefined if !succeeded => {
                self.bindings.shift_remove(name);
                return;
            }
            Origin::Undefined => {
                tracing::debug!(name, shape = %arr.shape(), "created binding");
                arr.demote()
            }
            Origin::Scalar => arr.demote(),
            Origin::Array => Cell::Array(arr),
        };
        self.bindings.insert(name.into(), value);
    }
}

/// View a bound value as an array
///
/// Text is seen as its character codes.
fn binding_array(cell: Cell) -> Array {
    match cell {
        Cell::Text(text) => text_to_numeric_array(&text),
        cell => cell.into_array(),
    }
}

/// Convert a right-hand side to the cells that will be written
///
/// A cell-array target stores a non-cell value as one element. Other
/// targets store text as its character codes.
fn rhs_array(rhs: Cell, target_is_cell: bool) -> Array {
    match rhs {
        Cell::Array(arr) if arr.is_cell() || !target_is_cell => arr,
        Cell::Text(text) if !target_is_cell => text_to_numeric_array(&text),
        cell => Array::scalar(cell),
    }
}

fn check_count(lhs: Shape, rhs: &Array) -> ArrayResult {
    if rhs.len() == 1 || rhs.len() == lhs.elements() {
        Ok(())
    } else {
        Err(ArrayError::Nonconformant {
            op: "=".into(),
            lhs,
            rhs: rhs.shape().clone(),
        })
    }
}

fn rhs_cell(rhs: &Array, n: usize) -> Cell {
    let cells = rhs.cells();
    cells[if cells.len() == 1 { 0 } else { n }].clone()
}

/// Assign into an array
///
/// Every check happens before `arr` is touched.
fn assign(
    arr: &mut Array,
    origin: Origin,
    subscripts: &[Subscript],
    rhs: Cell,
    config: &Config,
) -> ArrayResult {
    let rhs = rhs_array(rhs, arr.is_cell());
    let fill = match origin {
        Origin::Undefined => rhs.blank_cell(),
        _ => arr.blank_cell(),
    };
    match subscripts {
        [] => {
            *arr = rhs;
            Ok(())
        }
        [Subscript::Index(mask)] if mask.kind_tag() == KindTag::Logical => {
            assign_logical(arr, mask, &rhs, config)
        }
        [sub] => assign_linear(arr, origin, sub, &rhs, fill, config),
        _ => assign_cartesian(arr, subscripts, &rhs, fill, config),
    }
}

fn assign_linear(
    arr: &mut Array,
    origin: Origin,
    sub: &Subscript,
    rhs: &Array,
    fill: Cell,
    config: &Config,
) -> ArrayResult {
    let extent = match sub {
        Subscript::All if arr.is_empty() => rhs.len(),
        _ => arr.len(),
    };
    let positions = sub.resolve(extent, 0, 1, config)?;
    let index_shape = match sub {
        Subscript::All => Shape::column(positions.len()),
        Subscript::Index(index) => index.shape().clone(),
    };
    check_count(index_shape, rhs)?;
    let max = positions.iter().copied().max().unwrap_or(0);
    if max > arr.len() {
        if origin == Origin::Array && !arr.is_empty() {
            return Err(ArrayError::LinearResize {
                index: max,
                shape: arr.shape().clone(),
            });
        }
        arr.expand_with_fill(&[1, max], fill, config)?;
    }
    let cells = arr.cells_mut();
    for (n, p) in positions.into_iter().enumerate() {
        cells[p - 1] = rhs_cell(rhs, n);
    }
    arr.recompute_kind_tag();
    Ok(())
}

/// The extent a colon takes on an empty or undefined binding
///
/// A lone colon absorbs whatever the other subscripts leave of the
/// right-hand side. Otherwise each colon takes the right-hand side's
/// extent along its axis.
fn colon_extent(subscripts: &[Subscript], axis: usize, rhs: &Array) -> usize {
    let colons = subscripts.iter().filter(|s| **s == Subscript::All).count();
    let known: usize = subscripts.iter().filter_map(Subscript::known_len).product();
    if colons == 1 && known > 0 && rhs.len() > 1 && rhs.len() % known == 0 {
        rhs.len() / known
    } else {
        rhs.shape().dim(axis)
    }
}

fn assign_cartesian(
    arr: &mut Array,
    subscripts: &[Subscript],
    rhs: &Array,
    fill: Cell,
    config: &Config,
) -> ArrayResult {
    let rank = subscripts.len();
    let folded = rank < arr.rank();
    let dims = addressed_shape(arr.shape(), rank);
    let mut lists = Vec::with_capacity(rank);
    let mut target = dims.clone();
    for (axis, sub) in subscripts.iter().enumerate() {
        let extent = match sub {
            Subscript::All if arr.is_empty() => colon_extent(subscripts, axis, rhs),
            _ => dims[axis],
        };
        let positions = sub.resolve(extent, axis, rank, config)?;
        if folded {
            check_bounds(&positions, dims[axis], axis, rank, arr.shape(), config)?;
        }
        let max = positions.iter().copied().max().unwrap_or(0);
        target[axis] = target[axis].max(max).max(extent);
        lists.push(positions);
    }
    check_count(Shape::new(lists.iter().map(Vec::len)), rhs)?;
    if !folded {
        arr.expand_with_fill(&target, fill, config)?;
    }

    let dims = addressed_shape(arr.shape(), rank);
    let shape = arr.shape().clone();
    let cells = arr.cells_mut();
    let mut n = 0;
    for_each_combination(&lists, |sub| {
        let index = subscript_to_linear(&dims, sub).ok_or_else(|| ArrayError::OutOfBound {
            subscript: sub
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(",")
                .into(),
            position: 0,
            value: sub[0],
            bound: dims[0],
            shape: shape.clone(),
        })?;
        cells[index] = rhs_cell(rhs, n);
        n += 1;
        Ok(())
    })?;
    arr.recompute_kind_tag();
    Ok(())
}

fn assign_logical(arr: &mut Array, mask: &Array, rhs: &Array, config: &Config) -> ArrayResult {
    let selected = arr.get_elements_logical_with(mask, config)?;
    check_count(selected.shape().clone(), rhs)?;
    let positions: Vec<usize> = (mask.cells().iter().enumerate())
        .filter(|(_, m)| m.to_logical())
        .map(|(i, _)| i)
        .collect();
    let cells = arr.cells_mut();
    for (n, i) in positions.into_iter().enumerate() {
        cells[i] = rhs_cell(rhs, n);
    }
    arr.recompute_kind_tag();
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Struct;

    fn nums(cell: &Cell) -> Vec<f64> {
        cell.clone()
            .into_array()
            .cells()
            .iter()
            .map(|c| c.as_number().unwrap().real_part())
            .collect()
    }

    fn shape(cell: &Cell) -> Shape {
        cell.clone().into_array().shape().clone()
    }

    #[test]
    fn undefined_name_is_created() {
        let mut ws = Workspace::new();
        ws.set_elements("x", &[[1].into(), [3].into()], 7.0.into())
            .unwrap();
        let x = ws.get("x").unwrap();
        assert_eq!(shape(x), [1, 3]);
        assert_eq!(nums(x), [0.0, 0.0, 7.0]);
    }

    #[test]
    fn linear_growth_rules() {
        let mut ws = Workspace::new();
        ws.set_elements("v", &[[3].into()], 1.0.into()).unwrap();
        assert_eq!(shape(ws.get("v").unwrap()), [1, 3]);

        ws.bind("s", 5.0);
        ws.set_elements("s", &[[2].into()], 6.0.into()).unwrap();
        assert_eq!(nums(ws.get("s").unwrap()), [5.0, 6.0]);

        let m = Array::new([2, 2], None);
        ws.bind("m", m.clone());
        let err = ws.set_elements("m", &[[5].into()], 1.0.into()).unwrap_err();
        assert!(matches!(err, ArrayError::LinearResize { index: 5, .. }));
        assert_eq!(ws.get("m").unwrap(), &Cell::Array(m));
    }

    #[test]
    fn scalars_grow_however_they_are_stored() {
        let mut ws = Workspace::new();
        ws.bind("a", 5.0);
        ws.bind("b", Array::scalar(5.0));
        for name in ["a", "b"] {
            ws.set_elements(name, &[[3].into()], 1.0.into()).unwrap();
            let value = ws.get(name).unwrap();
            assert_eq!(shape(value), [1, 3], "{name}");
            assert_eq!(nums(value), [5.0, 0.0, 1.0], "{name}");
        }
    }

    #[test]
    fn text_bindings_index_as_codes() {
        let mut ws = Workspace::new();
        ws.bind("s", "abc");
        assert_eq!(ws.get_elements("s", &[[2].into()]), Ok(Cell::from(98.0)));
        ws.set_elements("s", &[[2].into()], "z".into()).unwrap();
        let s = ws.get("s").unwrap();
        assert_eq!(nums(s), [97.0, 122.0, 99.0]);
        let Cell::Array(s) = s else {
            panic!("expected an array")
        };
        assert_eq!(s.kind_tag(), KindTag::Real);
    }

    #[test]
    fn colon_on_empty_array_takes_rhs_extent() {
        let mut ws = Workspace::new();
        ws.bind("x", Array::empty());
        let rhs = Array::from_numbers([3, 1], &[1.0, 2.0, 3.0]).unwrap();
        ws.set_elements("x", &[Subscript::All, [1].into()], rhs.clone().into())
            .unwrap();
        let x = ws.get("x").unwrap();
        assert_eq!(shape(x), [3, 1]);
        assert_eq!(nums(x), [1.0, 2.0, 3.0]);

        ws.bind("y", Array::empty());
        ws.set_elements("y", &[Subscript::All], rhs.into()).unwrap();
        assert_eq!(shape(ws.get("y").unwrap()), [1, 3]);
    }

    #[test]
    fn cartesian_assignment_grows() {
        let mut ws = Workspace::new();
        let m = Array::from_numbers([2, 2], &[1.0, 2.0, 3.0, 4.0]).unwrap();
        ws.bind("m", m);
        ws.set_elements("m", &[[3].into(), Subscript::All], 9.0.into())
            .unwrap();
        let m = ws.get("m").unwrap();
        assert_eq!(shape(m), [3, 2]);
        assert_eq!(nums(m), [1.0, 2.0, 9.0, 3.0, 4.0, 9.0]);
    }

    #[test]
    fn count_mismatch_leaves_binding() {
        let mut ws = Workspace::new();
        let rhs = Array::from_numbers([1, 3], &[1.0, 2.0, 3.0]).unwrap();
        let err = ws
            .set_elements("x", &[[1].into(), [1, 2].into()], rhs.into())
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "=: nonconformant arguments (op1 is 1x2, op2 is 1x3)"
        );
        assert!(!ws.contains("x"));
    }

    #[test]
    fn colon_on_undefined_takes_rhs_extent() {
        let mut ws = Workspace::new();
        let rhs = Array::from_numbers([3, 1], &[1.0, 2.0, 3.0]).unwrap();
        ws.set_elements("x", &[Subscript::All, [2].into()], rhs.into())
            .unwrap();
        let x = ws.get("x").unwrap();
        assert_eq!(shape(x), [3, 2]);
        assert_eq!(nums(x), [0.0, 0.0, 0.0, 1.0, 2.0, 3.0]);
    }

    #[test]
    fn cell_arrays_grow_with_empty_arrays() {
        let mut ws = Workspace::new();
        let c = Array::row([Cell::from(1.0)]).with_cell_flag(true);
        ws.bind("c", c);
        ws.set_elements("c", &[[1].into(), [3].into()], "hi".into())
            .unwrap();
        let Cell::Array(c) = ws.get("c").unwrap() else {
            panic!("expected a cell array")
        };
        assert!(c.is_cell());
        assert_eq!(c.cells()[1], Cell::Array(Array::empty()));
        assert_eq!(c.cells()[2], Cell::from("hi"));
    }

    #[test]
    fn struct_arrays_grow_with_field_names() {
        let mut ws = Workspace::new();
        let mut s = Struct::new();
        s.insert("a", 1.0);
        ws.set_elements("s", &[[1].into(), [2].into()], s.into())
            .unwrap();
        let Cell::Array(arr) = ws.get("s").unwrap() else {
            panic!("expected an array")
        };
        let Cell::Struct(blank) = &arr.cells()[0] else {
            panic!("expected a struct blank")
        };
        assert_eq!(blank.field("a"), Some(&Cell::Array(Array::empty())));
    }

    #[test]
    fn text_is_written_as_codes() {
        let mut ws = Workspace::new();
        ws.bind("x", Array::new([1, 3], None));
        ws.set_elements("x", &[[1, 2].into()], "ab".into()).unwrap();
        assert_eq!(nums(ws.get("x").unwrap()), [97.0, 98.0, 0.0]);
    }

    #[test]
    fn logical_assignment() {
        let mut ws = Workspace::new();
        let x = Array::from_numbers([1, 4], &[1.0, 2.0, 3.0, 4.0]).unwrap();
        ws.bind("x", x);
        let mask = Array::row([true, false, true, false].map(Cell::from));
        ws.set_elements_logical("x", &mask, 0.0.into()).unwrap();
        assert_eq!(nums(ws.get("x").unwrap()), [0.0, 2.0, 0.0, 4.0]);
        let rhs = Array::from_numbers([1, 2], &[8.0, 9.0]).unwrap();
        ws.set_elements_logical("x", &mask, rhs.into()).unwrap();
        assert_eq!(nums(ws.get("x").unwrap()), [8.0, 2.0, 9.0, 4.0]);
        let rhs = Array::from_numbers([1, 3], &[1.0, 1.0, 1.0]).unwrap();
        assert!(ws.set_elements_logical("x", &mask, rhs.into()).is_err());
        assert!(matches!(
            ws.set_elements_logical("y", &mask, 0.0.into()),
            Err(ArrayError::Undefined(_))
        ));
    }

    #[test]
    fn field_paths() {
        let mut ws = Workspace::new();
        let path: Vec<EcoString> = vec!["a".into(), "b".into()];
        ws.set_field("s", &path, 3.0.into()).unwrap();
        assert_eq!(ws.get_field("s", &path), Ok(&Cell::from(3.0)));
        assert!(matches!(
            ws.get_field("s", &["c".into()]),
            Err(ArrayError::InvalidStructAccess { .. })
        ));
        ws.bind("n", 1.0);
        assert_eq!(
            ws.set_field("n", &path, 1.0.into()).unwrap_err().to_string(),
            "double cannot be indexed with .a"
        );
    }

    #[test]
    fn values_are_moved_not_shared() {
        let mut ws = Workspace::new();
        ws.bind("a", Array::new([1, 2], None));
        let copy = ws.get("a").unwrap().clone();
        ws.bind("b", copy);
        ws.set_elements("b", &[[1].into()], 5.0.into()).unwrap();
        assert_eq!(nums(ws.get("a").unwrap()), [0.0, 0.0]);
        assert_eq!(nums(ws.get("b").unwrap()), [5.0, 0.0]);
    }
}
