//! Algorithms over arrays

pub mod pervade;
pub mod reduce;
pub mod select;
pub mod structure;

/// The per-axis maximum of two shapes, padding the shorter with singletons
pub(crate) fn max_shape(a: &[usize], b: &[usize]) -> Vec<usize> {
    let rank = a.len().max(b.len());
    (0..rank)
        .map(|i| {
            let a = a.get(i).copied().unwrap_or(1);
            let b = b.get(i).copied().unwrap_or(1);
            a.max(b)
        })
        .collect()
}
