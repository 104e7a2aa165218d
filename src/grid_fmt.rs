//! Octave-style text rendering of arrays

use std::fmt;

use crate::{addressing::linear_to_subscript, Array, Cell, Complex, Config, Number};

type Grid<T = String> = Vec<Vec<T>>;

/// Render `name = arr` with a caller-supplied cell formatter
///
/// Arrays of rank greater than 2 are shown one `name(:,:,k)` page at a
/// time. Cell arrays list their elements by subscript, rendering nested
/// arrays recursively.
pub fn render(arr: &Array, name: &str, fmt_cell: impl Fn(&Cell) -> String) -> String {
    Rendered {
        arr,
        name,
        indent: 0,
        fmt_cell: &fmt_cell,
    }
    .to_string()
}

/// Render `name = arr` with the default cell formatter
///
/// If any number in the array is not an integer, every number is shown
/// with the configured precision so that columns line up.
pub fn render_default(arr: &Array, name: &str, config: &Config) -> String {
    let all_integers = arr.cells().iter().all(|cell| match cell {
        Cell::Num(n) => is_integral(n),
        _ => true,
    });
    render(arr, name, |cell| match cell {
        Cell::Num(n) if !all_integers => format_number(n, Some(config.precision)),
        cell => format_cell(cell, config),
    })
}

/// Format a single cell
pub fn format_cell(cell: &Cell, config: &Config) -> String {
    match cell {
        Cell::Num(n) if is_integral(n) => format_number(n, None),
        Cell::Num(n) => format_number(n, Some(config.precision)),
        Cell::Array(arr) if arr.is_scalar() && !arr.is_cell() => format_cell(&arr.cells()[0], config),
        Cell::Array(arr) => {
            let (open, close) = if arr.is_cell() { ('{', '}') } else { ('[', ']') };
            format!("{open}{} {}{close}", arr.shape(), if arr.is_cell() { "cell" } else { "double" })
        }
        Cell::Struct(_) => "1x1 struct".into(),
        cell => cell.to_string(),
    }
}

fn is_integral(n: &Number) -> bool {
    match *n {
        Number::Logical(_) => true,
        Number::Real(r) => r.fract() == 0.0 || !r.is_finite(),
        Number::Complex(Complex { re, im }) => {
            (re.fract() == 0.0 || !re.is_finite()) && (im.fract() == 0.0 || !im.is_finite())
        }
    }
}

fn format_real(r: f64, precision: Option<usize>) -> String {
    if r.is_nan() {
        "NaN".into()
    } else if r.is_infinite() {
        if r > 0.0 { "Inf" } else { "-Inf" }.into()
    } else if let Some(precision) = precision {
        format!("{r:.precision$}")
    } else {
        r.to_string()
    }
}

fn format_number(n: &Number, precision: Option<usize>) -> String {
    match *n {
        Number::Logical(b) => (b as u8).to_string(),
        Number::Real(r) => format_real(r, precision),
        Number::Complex(c) => {
            let sign = if c.im < 0.0 { '-' } else { '+' };
            let re = format_real(c.re, precision);
            let im = format_real(c.im.abs(), precision);
            format!("{re} {sign} {im}i")
        }
    }
}

struct Rendered<'a> {
    arr: &'a Array,
    name: &'a str,
    indent: usize,
    fmt_cell: &'a dyn Fn(&Cell) -> String,
}

impl Rendered<'_> {
    fn nested<'b>(&'b self, arr: &'b Array, name: &'b str) -> Rendered<'b> {
        Rendered {
            arr,
            name,
            indent: self.indent + 2,
            fmt_cell: self.fmt_cell,
        }
    }
    /// Format a 2-D page into rows of equally wide cells
    fn fmt_grid(&self, page: &Array) -> Grid {
        (0..page.rows_physical())
            .map(|row| {
                (0..page.cols_physical())
                    .map(|col| page.get_physical(row, col).map_or_else(String::new, self.fmt_cell))
                    .collect()
            })
            .collect()
    }
    fn write_grid(&self, f: &mut fmt::Formatter, grid: Grid) -> fmt::Result {
        let width = (grid.iter().flatten())
            .map(|s| s.chars().count())
            .max()
            .unwrap_or(0);
        for row in grid {
            write!(f, "{:indent$}", "", indent = self.indent)?;
            for cell in row {
                write!(f, "   {cell:>width$}")?;
            }
            writeln!(f)?;
        }
        writeln!(f)
    }
}

impl fmt::Display for Rendered<'_> {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let (arr, name) = (self.arr, self.name);
        let pad = " ".repeat(self.indent);
        if arr.is_empty() {
            let brackets = if arr.is_cell() { "{}" } else { "[]" };
            return writeln!(f, "{pad}{name} = {brackets}({})", arr.shape());
        }
        if arr.is_cell() {
            writeln!(f, "{pad}{name} =")?;
            writeln!(f, "{pad}{{")?;
            for (i, cell) in arr.cells().iter().enumerate() {
                let sub = linear_to_subscript(arr.shape(), i);
                let label = format!(
                    "[{}]",
                    sub.iter().map(ToString::to_string).collect::<Vec<_>>().join(",")
                );
                match cell {
                    Cell::Array(inner) if inner.is_cell() || !inner.is_scalar() => {
                        self.nested(inner, &label).fmt(f)?
                    }
                    cell => writeln!(f, "{pad}  {label} = {}", (self.fmt_cell)(cell))?,
                }
            }
            writeln!(f, "{pad}}}")?;
            return writeln!(f);
        }
        if arr.is_scalar() {
            return writeln!(f, "{pad}{name} = {}", (self.fmt_cell)(&arr.cells()[0]));
        }
        writeln!(f, "{pad}{name} =")?;
        writeln!(f)?;
        if arr.rank() == 2 {
            return self.write_grid(f, self.fmt_grid(arr));
        }
        let higher = &arr.shape()[2..];
        for k in 0..arr.page_count() {
            let Some(page) = arr.page(k) else { break };
            let coords = linear_to_subscript(higher, k);
            let coords: Vec<String> = coords.iter().map(ToString::to_string).collect();
            writeln!(f, "{pad}{name}(:,:,{}) =", coords.join(","))?;
            writeln!(f)?;
            self.write_grid(f, self.fmt_grid(&page))?;
        }
        Ok(())
    }
}

impl fmt::Display for Array {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str(&render_default(self, "ans", &Config::default()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Struct;

    fn arr(shape: &[usize], data: &[f64]) -> Array {
        Array::from_numbers(shape, data).unwrap()
    }

    #[test]
    fn matrix_layout() {
        let m = arr(&[2, 2], &[1.0, 3.0, 2.0, 10.0]);
        assert_eq!(
            render_default(&m, "x", &Config::default()),
            "x =\n\n    1    2\n    3   10\n\n"
        );
    }

    #[test]
    fn fractions_share_precision() {
        let m = arr(&[1, 2], &[1.0, 2.5]);
        assert_eq!(
            render_default(&m, "x", &Config::default()),
            "x =\n\n   1.0000   2.5000\n\n"
        );
        let config = Config {
            precision: 2,
            ..Config::default()
        };
        assert_eq!(format_cell(&Cell::from(0.126), &config), "0.13");
    }

    #[test]
    fn scalars_and_empties() {
        let config = Config::default();
        assert_eq!(render_default(&Array::scalar(5.0), "x", &config), "x = 5\n");
        assert_eq!(
            render_default(&Array::new([0, 3], None), "x", &config),
            "x = [](0x3)\n"
        );
        assert_eq!(format_cell(&Cell::from(f64::NAN), &config), "NaN");
        let c = Number::Complex(Complex::new(1.0, -2.0));
        assert_eq!(format_cell(&Cell::Num(c), &config), "1 - 2i");
    }

    #[test]
    fn pages_are_sectioned() {
        let a = arr(&[1, 2, 2], &[1.0, 2.0, 3.0, 4.0]);
        assert_eq!(
            render_default(&a, "x", &Config::default()),
            "x =\n\nx(:,:,1) =\n\n   1   2\n\nx(:,:,2) =\n\n   3   4\n\n"
        );
    }

    #[test]
    fn cell_arrays_list_elements() {
        let inner = arr(&[1, 2], &[1.0, 2.0]);
        let c = Array::row([Cell::from("ab"), Cell::Array(inner)]).with_cell_flag(true);
        assert_eq!(
            render_default(&c, "c", &Config::default()),
            "c =\n{\n  [1,1] = ab\n  [1,2] =\n\n     1   2\n\n}\n\n"
        );
    }

    #[test]
    fn custom_formatter() {
        let mut s = Struct::new();
        s.insert("a", 1.0);
        let a = Array::row([Cell::from(1.0), Cell::from(s)]);
        let out = render(&a, "v", |cell| match cell {
            Cell::Struct(_) => "S".into(),
            _ => "n".into(),
        });
        assert_eq!(out, "v =\n\n   n   S\n\n");
    }
}
