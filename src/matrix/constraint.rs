//! The constraint matrix handed over by the model-loading collaborator.
//!
//! Holds the row-major coefficient matrix together with row bounds, column
//! bounds, integrality flags, objective coefficients and optional names. The
//! pipeline only ever borrows it immutably.

use sprs::CsMat;

use crate::error::{DecompError, DecompResult};
use crate::matrix::SparseMatrixCSR;
use crate::utils::from_sprs_csr;

/// A linear system `row_lb <= A x <= row_ub`, `col_lb <= x <= col_ub`.
#[derive(Debug, Clone)]
pub struct ConstraintMatrix {
    matrix: SparseMatrixCSR<f64>,
    row_lb: Vec<f64>,
    row_ub: Vec<f64>,
    col_lb: Vec<f64>,
    col_ub: Vec<f64>,
    integer: Vec<bool>,
    objective: Vec<f64>,
    row_names: Option<Vec<String>>,
    col_names: Option<Vec<String>>,
}

fn check_len(what: &str, got: usize, expected: usize) -> DecompResult<()> {
    if got != expected {
        return Err(DecompError::Structure(format!(
            "{} has length {}, expected {}",
            what, got, expected
        )));
    }
    Ok(())
}

impl ConstraintMatrix {
    /// Creates a continuous constraint matrix with a zero objective
    pub fn new(
        matrix: SparseMatrixCSR<f64>,
        row_lb: Vec<f64>,
        row_ub: Vec<f64>,
        col_lb: Vec<f64>,
        col_ub: Vec<f64>,
    ) -> DecompResult<Self> {
        check_len("row_lb", row_lb.len(), matrix.n_rows)?;
        check_len("row_ub", row_ub.len(), matrix.n_rows)?;
        check_len("col_lb", col_lb.len(), matrix.n_cols)?;
        check_len("col_ub", col_ub.len(), matrix.n_cols)?;

        let n_cols = matrix.n_cols;
        Ok(Self {
            matrix,
            row_lb,
            row_ub,
            col_lb,
            col_ub,
            integer: vec![false; n_cols],
            objective: vec![0.0; n_cols],
            row_names: None,
            col_names: None,
        })
    }

    /// Builds from an `sprs` matrix in either storage order
    pub fn from_sprs(
        matrix: CsMat<f64>,
        row_lb: Vec<f64>,
        row_ub: Vec<f64>,
        col_lb: Vec<f64>,
        col_ub: Vec<f64>,
    ) -> DecompResult<Self> {
        Self::new(from_sprs_csr(matrix)?, row_lb, row_ub, col_lb, col_ub)
    }

    /// Sets the integrality flag of every column
    pub fn with_integrality(mut self, integer: Vec<bool>) -> DecompResult<Self> {
        check_len("integrality", integer.len(), self.n_cols())?;
        self.integer = integer;
        Ok(self)
    }

    /// Sets the objective coefficients
    pub fn with_objective(mut self, objective: Vec<f64>) -> DecompResult<Self> {
        check_len("objective", objective.len(), self.n_cols())?;
        self.objective = objective;
        Ok(self)
    }

    pub fn with_row_names(mut self, names: Vec<String>) -> DecompResult<Self> {
        check_len("row names", names.len(), self.n_rows())?;
        self.row_names = Some(names);
        Ok(self)
    }

    pub fn with_col_names(mut self, names: Vec<String>) -> DecompResult<Self> {
        check_len("column names", names.len(), self.n_cols())?;
        self.col_names = Some(names);
        Ok(self)
    }

    pub fn matrix(&self) -> &SparseMatrixCSR<f64> {
        &self.matrix
    }

    pub fn n_rows(&self) -> usize {
        self.matrix.n_rows
    }

    pub fn n_cols(&self) -> usize {
        self.matrix.n_cols
    }

    pub fn nnz(&self) -> usize {
        self.matrix.nnz()
    }

    pub fn row_lb(&self) -> &[f64] {
        &self.row_lb
    }

    pub fn row_ub(&self) -> &[f64] {
        &self.row_ub
    }

    pub fn col_lb(&self) -> &[f64] {
        &self.col_lb
    }

    pub fn col_ub(&self) -> &[f64] {
        &self.col_ub
    }

    pub fn objective(&self) -> &[f64] {
        &self.objective
    }

    pub fn is_integer(&self, col: usize) -> bool {
        self.integer[col]
    }

    pub fn integrality(&self) -> &[bool] {
        &self.integer
    }

    pub fn row_name(&self, row: usize) -> Option<&str> {
        self.row_names.as_ref().map(|names| names[row].as_str())
    }

    pub fn col_name(&self, col: usize) -> Option<&str> {
        self.col_names.as_ref().map(|names| names[col].as_str())
    }

    pub fn row_names(&self) -> Option<&[String]> {
        self.row_names.as_deref()
    }

    /// Number of non-zeros of row `row` that sit on integer columns
    pub fn integer_nnz_in_row(&self, row: usize) -> usize {
        self.matrix
            .row_cols(row)
            .iter()
            .filter(|&&col| self.integer[col])
            .count()
    }
}
