//! # Sub-model construction
//!
//! Cuts an index-consistent model out of the constraint matrix for a set of
//! rows: the coefficient sub-matrix, row bounds, column bounds,
//! integrality flags and names, plus the maps between local and original ids.
//!
//! ## Column spaces
//!
//! - **Dense**: the sub-model spans every original column and local column
//!   ids equal original ids.
//! - **Sparse**: the sub-model spans only the given active columns, in the
//!   order given; nonzeros are translated to local ids in one pass over the
//!   row offsets.
//!
//! ## Bound tightening
//!
//! The downstream decomposition method cannot recover from unbounded
//! sub-problems. Column bounds beyond ±1e15 are replaced by the configured
//! override when there is a finite one; otherwise the infinite bound is kept
//! and a [`BoundWarning`] is recorded.

use ndarray::Array2;
use sprs::CsMat;

use crate::config::{BoundOverride, ModelMode};
use crate::constants::INFINITE_BOUND;
use crate::error::{DecompError, DecompResult};
use crate::matrix::{ConstraintMatrix, IndexMap, SparseMatrixCSR};
use crate::utils::to_sprs_csr;

/// Which part of the decomposition a sub-model was built for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ModelOrigin {
    /// The coupling rows
    Core,
    /// Block with this id (real or master-only)
    Block(usize),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundSide {
    Lower,
    Upper,
}

/// An infinite column bound left in place because no override was configured
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundWarning {
    /// Original column id
    pub column: usize,
    pub side: BoundSide,
    /// The bound that was kept
    pub value: f64,
}

/// Settings shared by every sub-model of one decomposition
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SubModelOptions {
    pub mode: ModelMode,
    pub bounds: BoundOverride,
    pub use_names: bool,
}

impl Default for SubModelOptions {
    fn default() -> Self {
        Self {
            mode: ModelMode::Sparse,
            bounds: BoundOverride::default(),
            use_names: true,
        }
    }
}

/// Applies the bound policy to one column
///
/// Returns the corrected `(lower, upper)` pair and pushes a warning for
/// every infinite bound that could not be replaced.
pub fn tighten_bounds(
    column: usize,
    lower: f64,
    upper: f64,
    bounds: &BoundOverride,
    warnings: &mut Vec<BoundWarning>,
) -> (f64, f64) {
    let mut lb = lower;
    let mut ub = upper;

    if ub > INFINITE_BOUND {
        match bounds.active_upper() {
            Some(value) => ub = value,
            None => warnings.push(BoundWarning {
                column,
                side: BoundSide::Upper,
                value: ub,
            }),
        }
    }
    if lb < -INFINITE_BOUND {
        match bounds.active_lower() {
            Some(value) => lb = value,
            None => warnings.push(BoundWarning {
                column,
                side: BoundSide::Lower,
                value: lb,
            }),
        }
    }

    (lb, ub)
}

/// Reserves exactly `n` slots or reports `OutOfMemory`
fn reserve<T>(n: usize, context: &str) -> DecompResult<Vec<T>> {
    let mut v = Vec::new();
    v.try_reserve_exact(n)
        .map_err(|source| DecompError::oom(context, source))?;
    Ok(v)
}

/// A block or core model with its own local index spaces
#[derive(Debug, Clone, PartialEq)]
pub struct SubModel {
    name: String,
    origin: ModelOrigin,
    mode: ModelMode,
    matrix: SparseMatrixCSR<f64>,
    rows: IndexMap,
    columns: IndexMap,
    row_lb: Vec<f64>,
    row_ub: Vec<f64>,
    col_lb: Vec<f64>,
    col_ub: Vec<f64>,
    is_integer: Vec<bool>,
    row_names: Vec<String>,
    col_names: Vec<String>,
    warnings: Vec<BoundWarning>,
}

/// Builds the sub-model of `rows`
///
/// In sparse mode `active` lists the columns to keep, in local order; every
/// nonzero of `rows` must fall in it. In dense mode `active` is ignored.
///
/// # Errors
///
/// - `InvariantViolation` if a row is out of range or repeated, an active
///   column is repeated, or a row references a column outside `active`
/// - `OutOfMemory` if an allocation cannot be satisfied
pub fn build_submodel(
    matrix: &ConstraintMatrix,
    origin: ModelOrigin,
    name: impl Into<String>,
    rows: &[usize],
    active: &[usize],
    options: &SubModelOptions,
) -> DecompResult<SubModel> {
    let model = extract_submodel(matrix, origin, name.into(), rows, active, options)?;
    let warnings = &model.warnings;
    let name = &model.name;

    if let Some(first) = warnings.first() {
        tracing::warn!(
            component = "submodel",
            operation = "build",
            status = "warning",
            model = %name,
            unbounded = warnings.len(),
            first_column = first.column,
            "Model {} keeps {} infinite column bounds; extreme rays are not supported, \
             bound all variables or configure a column bound override",
            name,
            warnings.len()
        );
    }

    Ok(model)
}

/// [`build_submodel`] without the bound warning log line; the warnings are
/// still recorded on the model
pub(crate) fn extract_submodel(
    matrix: &ConstraintMatrix,
    origin: ModelOrigin,
    name: String,
    rows: &[usize],
    active: &[usize],
    options: &SubModelOptions,
) -> DecompResult<SubModel> {
    let a = matrix.matrix();

    if let Some(&bad) = rows.iter().find(|&&r| r >= a.n_rows) {
        return Err(DecompError::InvariantViolation(format!(
            "{}: row {} out of range ({} rows)",
            name, bad, a.n_rows
        )));
    }
    let row_map = IndexMap::from_globals(rows.iter().copied())?;

    let columns = match options.mode {
        ModelMode::Dense => IndexMap::identity(a.n_cols),
        ModelMode::Sparse => {
            if let Some(&bad) = active.iter().find(|&&c| c >= a.n_cols) {
                return Err(DecompError::InvariantViolation(format!(
                    "{}: column {} out of range ({} columns)",
                    name, bad, a.n_cols
                )));
            }
            IndexMap::from_globals(active.iter().copied())?
        }
    };
    let n_local_cols = columns.len();

    // --- coefficient matrix ---
    let nnz: usize = rows.iter().map(|&r| a.row_nnz(r)).sum();
    let mut row_ptr = reserve::<usize>(rows.len() + 1, &name)?;
    let mut col_idx = reserve::<usize>(nnz, &name)?;
    let mut values = reserve::<f64>(nnz, &name)?;

    row_ptr.push(0);
    for &r in rows {
        for (col, &val) in a.row_iter(r) {
            let local = columns.to_local(col).ok_or_else(|| {
                DecompError::InvariantViolation(format!(
                    "{}: row {} references column {} outside the active set",
                    name, r, col
                ))
            })?;
            col_idx.push(local);
            values.push(val);
        }
        row_ptr.push(col_idx.len());
    }

    let sub = SparseMatrixCSR {
        n_rows: rows.len(),
        n_cols: n_local_cols,
        row_ptr,
        col_idx,
        values,
    };

    // --- row data, copied unchanged ---
    let mut row_lb = reserve::<f64>(rows.len(), &name)?;
    let mut row_ub = reserve::<f64>(rows.len(), &name)?;
    for &r in rows {
        row_lb.push(matrix.row_lb()[r]);
        row_ub.push(matrix.row_ub()[r]);
    }

    // --- column data, with bound tightening ---
    let mut col_lb = reserve::<f64>(n_local_cols, &name)?;
    let mut col_ub = reserve::<f64>(n_local_cols, &name)?;
    let mut is_integer = reserve::<bool>(n_local_cols, &name)?;
    let mut warnings = Vec::new();
    for col in columns.globals() {
        let (lb, ub) = tighten_bounds(
            col,
            matrix.col_lb()[col],
            matrix.col_ub()[col],
            &options.bounds,
            &mut warnings,
        );
        col_lb.push(lb);
        col_ub.push(ub);
        is_integer.push(matrix.is_integer(col));
    }

    let (row_names, col_names) = if options.use_names {
        let row_names = rows
            .iter()
            .filter_map(|&r| matrix.row_name(r).map(str::to_owned))
            .collect();
        let col_names = columns
            .globals()
            .filter_map(|c| matrix.col_name(c).map(str::to_owned))
            .collect();
        (row_names, col_names)
    } else {
        (Vec::new(), Vec::new())
    };

    tracing::debug!(
        component = "submodel",
        operation = "build",
        status = "success",
        model = %name,
        mode = ?options.mode,
        rows = sub.n_rows,
        cols = sub.n_cols,
        nnz = sub.nnz(),
        "Built model {}",
        name
    );

    Ok(SubModel {
        name,
        origin,
        mode: options.mode,
        matrix: sub,
        rows: row_map,
        columns,
        row_lb,
        row_ub,
        col_lb,
        col_ub,
        is_integer,
        row_names,
        col_names,
        warnings,
    })
}

impl SubModel {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn origin(&self) -> ModelOrigin {
        self.origin
    }

    pub fn mode(&self) -> ModelMode {
        self.mode
    }

    /// Coefficients over (local rows, local columns)
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

    /// Local row id → original row id
    pub fn row_map(&self) -> &IndexMap {
        &self.rows
    }

    /// Local column id → original column id
    pub fn column_map(&self) -> &IndexMap {
        &self.columns
    }

    /// Original row ids in local order
    pub fn original_rows(&self) -> Vec<usize> {
        self.rows.globals().collect()
    }

    /// Original column ids in local order
    pub fn original_columns(&self) -> Vec<usize> {
        self.columns.globals().collect()
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

    /// Integrality of each local column
    pub fn integrality(&self) -> &[bool] {
        &self.is_integer
    }

    /// Local ids of the integer columns
    pub fn integer_columns(&self) -> Vec<usize> {
        self.is_integer
            .iter()
            .enumerate()
            .filter(|&(_, &int)| int)
            .map(|(local, _)| local)
            .collect()
    }

    pub fn row_names(&self) -> &[String] {
        &self.row_names
    }

    pub fn col_names(&self) -> &[String] {
        &self.col_names
    }

    /// Infinite bounds that were kept
    pub fn bound_warnings(&self) -> &[BoundWarning] {
        &self.warnings
    }

    /// Dense copy of the coefficient matrix
    pub fn to_dense(&self) -> Array2<f64> {
        let mut dense = Array2::zeros((self.n_rows(), self.n_cols()));
        for i in 0..self.n_rows() {
            for (j, &val) in self.matrix.row_iter(i) {
                dense[[i, j]] = val;
            }
        }
        dense
    }

    /// Coefficient matrix as an `sprs` CSR matrix
    pub fn to_sprs(&self) -> CsMat<f64> {
        to_sprs_csr(&self.matrix)
    }
}
