//! Active-column resolution
//!
//! Determines which original columns each block's rows reference, which
//! columns no block references (master-only), and which are shared by more
//! than one block (linking).

use std::collections::{BTreeMap, BTreeSet};

use crate::matrix::ConstraintMatrix;

/// Columns referenced by any of `rows`, ascending and deduplicated
pub fn active_columns(matrix: &ConstraintMatrix, rows: &[usize]) -> BTreeSet<usize> {
    let a = matrix.matrix();
    rows.iter()
        .flat_map(|&r| a.row_cols(r).iter().copied())
        .collect()
}

/// How many of the given active sets reference each column
pub fn column_reference_counts<'a, I>(n_cols: usize, active_sets: I) -> Vec<usize>
where
    I: IntoIterator<Item = &'a [usize]>,
{
    let mut counts = vec![0; n_cols];
    for set in active_sets {
        for &col in set {
            counts[col] += 1;
        }
    }
    counts
}

/// Columns with a zero reference count, ascending
pub fn master_only_columns(counts: &[usize]) -> Vec<usize> {
    counts
        .iter()
        .enumerate()
        .filter(|&(_, &count)| count == 0)
        .map(|(col, _)| col)
        .collect()
}

/// Columns active in two or more blocks, with the ids of those blocks
///
/// `active_sets[b]` is the active set of block `b`. Each referencing block
/// keeps its own copy of a linking column; nothing is reconciled here.
pub fn linking_columns(active_sets: &[&[usize]]) -> BTreeMap<usize, Vec<usize>> {
    let mut owners: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (block, set) in active_sets.iter().enumerate() {
        for &col in set.iter() {
            owners.entry(col).or_default().push(block);
        }
    }
    owners.retain(|_, blocks| blocks.len() > 1);
    owners
}
