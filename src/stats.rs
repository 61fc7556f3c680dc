//! Decomposition-quality statistics

use std::collections::BTreeMap;
use std::time::Duration;

use crate::matrix::ConstraintMatrix;

/// Summary numbers for judging a decomposition
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DecompositionStats {
    pub num_rows: usize,
    pub num_cols: usize,
    pub nnz: usize,
    /// Blocks that survived separator extraction
    pub num_blocks: usize,
    pub num_coupling_rows: usize,
    /// Nonzeros in coupling rows
    pub coupling_nnz: usize,
    /// Integer-column nonzeros in coupling rows
    pub coupling_integer_nnz: usize,
    /// Integer-column nonzeros in the whole matrix
    pub integer_nnz: usize,
    pub num_master_only: usize,
    pub num_linking_columns: usize,
    /// Cut advertised by the oracle
    pub cut: Option<u64>,
    /// Hyperedges spanning several parts
    pub cut_hyperedges: Option<usize>,
    pub partition_time: Option<Duration>,
}

fn ratio(num: usize, den: usize) -> f64 {
    if den == 0 {
        0.0
    } else {
        num as f64 / den as f64
    }
}

impl DecompositionStats {
    /// Counts the structural quantities of a split; oracle fields stay empty
    pub fn collect(
        matrix: &ConstraintMatrix,
        coupling_rows: &[usize],
        num_blocks: usize,
        num_master_only: usize,
        num_linking_columns: usize,
    ) -> Self {
        let a = matrix.matrix();
        let integer_nnz = a.col_idx.iter().filter(|&&c| matrix.is_integer(c)).count();
        let coupling_nnz = coupling_rows.iter().map(|&r| a.row_nnz(r)).sum();
        let coupling_integer_nnz = coupling_rows
            .iter()
            .map(|&r| matrix.integer_nnz_in_row(r))
            .sum();

        Self {
            num_rows: matrix.n_rows(),
            num_cols: matrix.n_cols(),
            nnz: matrix.nnz(),
            num_blocks,
            num_coupling_rows: coupling_rows.len(),
            coupling_nnz,
            coupling_integer_nnz,
            integer_nnz,
            num_master_only,
            num_linking_columns,
            cut: None,
            cut_hyperedges: None,
            partition_time: None,
        }
    }

    /// Fraction of all nonzeros that sit in coupling rows (alpha)
    pub fn coupling_nnz_fraction(&self) -> f64 {
        ratio(self.coupling_nnz, self.nnz)
    }

    /// Fraction of coupling-row nonzeros that are on integer columns
    pub fn coupling_integer_fraction(&self) -> f64 {
        ratio(self.coupling_integer_nnz, self.coupling_nnz)
    }

    /// Fraction of integer nonzeros that sit in coupling rows (gamma)
    pub fn integer_coupling_sparsity(&self) -> f64 {
        ratio(self.coupling_integer_nnz, self.integer_nnz)
    }

    /// Fraction of columns that are master-only (kappa)
    pub fn master_only_fraction(&self) -> f64 {
        ratio(self.num_master_only, self.num_cols)
    }

    /// Percentage of rows placed in some block
    pub fn relaxed_row_percentage(&self) -> f64 {
        ratio(self.num_rows - self.num_coupling_rows, self.num_rows) * 100.0
    }
}

/// Candidate part counts read off the row-length histogram
///
/// Rows are bucketed by nonzero count. Buckets holding the same number of
/// rows collapse onto the one with the longest rows and single-row buckets
/// are dropped. The row counts of the `max_candidates` buckets with the
/// longest rows are returned, longest first.
pub fn candidate_block_counts(matrix: &ConstraintMatrix, max_candidates: usize) -> Vec<usize> {
    let a = matrix.matrix();
    let mut histogram: BTreeMap<usize, usize> = BTreeMap::new();
    for r in 0..a.n_rows {
        *histogram.entry(a.row_nnz(r)).or_default() += 1;
    }

    // row count -> longest row length seen with that count
    let mut longest: BTreeMap<usize, usize> = BTreeMap::new();
    for (&len, &rows) in &histogram {
        if rows > 1 {
            longest.insert(rows, len);
        }
    }

    let mut buckets: Vec<(usize, usize)> = longest.into_iter().map(|(rows, len)| (len, rows)).collect();
    buckets.sort_unstable_by(|x, y| y.0.cmp(&x.0));

    let candidates: Vec<usize> = buckets
        .into_iter()
        .take(max_candidates)
        .map(|(_, rows)| rows)
        .collect();

    tracing::debug!(
        component = "stats",
        operation = "candidate_block_counts",
        histogram_buckets = histogram.len(),
        candidates = ?candidates,
        "Row-length histogram suggests {} block counts",
        candidates.len()
    );

    candidates
}
