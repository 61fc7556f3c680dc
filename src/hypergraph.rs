//! # Hypergraph construction
//!
//! Converts a constraint matrix into the vertex/hyperedge structure consumed
//! by a partitioning oracle.
//!
//! ## Models
//!
//! - **Singly bordered** (row-net): one hyperedge per row. Its pins are the
//!   row's nonzeros (`VertexModel::Nonzero`) or the row's columns
//!   (`VertexModel::Column`).
//! - **Doubly bordered**: one hyperedge per row followed by one per column;
//!   vertices are always nonzeros, so every nonzero is pinned by exactly one
//!   row net and one column net.
//!
//! Hyperedge spans are stored as a prefix-offset array (`edge_ptr`) over a
//! flat membership array (`edge_ind`), the layout hMETIS and PaToH expect.

use crate::config::{BorderMode, VertexModel, WeightPolicy};
use crate::constants::{INTEGER_WEIGHT_FACTOR, UNIT_WEIGHT};
use crate::error::{DecompError, DecompResult};
use crate::matrix::ConstraintMatrix;
use crate::utils::exclusive_scan;

/// Weighted hypergraph built from a constraint matrix
#[derive(Debug, Clone, PartialEq)]
pub struct Hypergraph {
    border_mode: BorderMode,
    vertex_model: VertexModel,
    num_vertices: usize,
    num_row_edges: usize,
    edge_ptr: Vec<usize>,
    edge_ind: Vec<usize>,
    vertex_weights: Vec<u32>,
    edge_weights: Vec<u32>,
    vertex_column: Vec<usize>,
}

fn biased_edge_weight(len: usize) -> u32 {
    u32::try_from(len)
        .unwrap_or(u32::MAX)
        .saturating_mul(INTEGER_WEIGHT_FACTOR)
}

impl Hypergraph {
    /// Builds the hypergraph of `matrix`
    ///
    /// # Errors
    ///
    /// - `Structure` if the matrix has no rows or no nonzeros
    /// - `InvalidConfig` for the doubly-bordered column-vertex combination
    pub fn build(
        matrix: &ConstraintMatrix,
        policy: WeightPolicy,
        border_mode: BorderMode,
        vertex_model: VertexModel,
    ) -> DecompResult<Self> {
        let a = matrix.matrix();

        if a.n_rows == 0 {
            return Err(DecompError::Structure("matrix has no rows".to_string()));
        }
        if a.nnz() == 0 {
            return Err(DecompError::Structure("matrix has no nonzeros".to_string()));
        }
        if border_mode == BorderMode::Doubly && vertex_model == VertexModel::Column {
            return Err(DecompError::InvalidConfig(
                "doubly-bordered hypergraph needs one vertex per nonzero".to_string(),
            ));
        }

        let (num_vertices, vertex_column) = match vertex_model {
            VertexModel::Nonzero => (a.nnz(), a.col_idx.clone()),
            VertexModel::Column => (a.n_cols, (0..a.n_cols).collect()),
        };

        // Row nets: row r spans row_ptr[r]..row_ptr[r + 1] in both models.
        let mut edge_lengths: Vec<usize> = (0..a.n_rows).map(|r| a.row_nnz(r)).collect();
        let mut edge_ind: Vec<usize> = match vertex_model {
            VertexModel::Nonzero => (0..a.nnz()).collect(),
            VertexModel::Column => a.col_idx.clone(),
        };

        if border_mode == BorderMode::Doubly {
            // Column nets list the nonzero positions of each column, ascending.
            let counts = a.column_counts();
            let col_ptr = exclusive_scan(&counts);
            let mut next = col_ptr.clone();
            let mut col_members = vec![0; a.nnz()];
            for (pos, &col) in a.col_idx.iter().enumerate() {
                col_members[next[col]] = pos;
                next[col] += 1;
            }
            edge_lengths.extend_from_slice(&counts);
            edge_ind.extend_from_slice(&col_members);
        }

        let edge_ptr = exclusive_scan(&edge_lengths);
        let num_hyperedges = edge_lengths.len();

        if edge_ptr[num_hyperedges] != edge_ind.len() {
            return Err(DecompError::InvariantViolation(format!(
                "hyperedge offsets end at {} but membership has {} entries",
                edge_ptr[num_hyperedges],
                edge_ind.len()
            )));
        }

        let vertex_weights: Vec<u32> = match policy {
            WeightPolicy::Uniform => vec![UNIT_WEIGHT; num_vertices],
            WeightPolicy::IntegerBiased => vertex_column
                .iter()
                .map(|&col| {
                    if matrix.is_integer(col) {
                        INTEGER_WEIGHT_FACTOR
                    } else {
                        UNIT_WEIGHT
                    }
                })
                .collect(),
        };

        let edge_weights: Vec<u32> = match policy {
            WeightPolicy::Uniform => vec![UNIT_WEIGHT; num_hyperedges],
            WeightPolicy::IntegerBiased => (0..num_hyperedges)
                .map(|e| {
                    let pins = &edge_ind[edge_ptr[e]..edge_ptr[e + 1]];
                    let touches_integer = pins.iter().any(|&v| matrix.is_integer(vertex_column[v]));
                    if touches_integer {
                        biased_edge_weight(pins.len())
                    } else {
                        UNIT_WEIGHT
                    }
                })
                .collect(),
        };

        tracing::debug!(
            component = "hypergraph",
            operation = "build",
            num_vertices,
            num_hyperedges,
            pins = edge_ind.len(),
            "Built hypergraph with {} vertices and {} hyperedges",
            num_vertices,
            num_hyperedges
        );

        Ok(Self {
            border_mode,
            vertex_model,
            num_vertices,
            num_row_edges: a.n_rows,
            edge_ptr,
            edge_ind,
            vertex_weights,
            edge_weights,
            vertex_column,
        })
    }

    pub fn border_mode(&self) -> BorderMode {
        self.border_mode
    }

    pub fn vertex_model(&self) -> VertexModel {
        self.vertex_model
    }

    pub fn num_vertices(&self) -> usize {
        self.num_vertices
    }

    pub fn num_hyperedges(&self) -> usize {
        self.edge_weights.len()
    }

    /// Number of hyperedges that stand for rows (always the first ones)
    pub fn num_row_edges(&self) -> usize {
        self.num_row_edges
    }

    /// Prefix offsets into [`Hypergraph::edge_ind`]
    pub fn edge_ptr(&self) -> &[usize] {
        &self.edge_ptr
    }

    /// Flat hyperedge membership
    pub fn edge_ind(&self) -> &[usize] {
        &self.edge_ind
    }

    pub fn vertex_weights(&self) -> &[u32] {
        &self.vertex_weights
    }

    pub fn edge_weights(&self) -> &[u32] {
        &self.edge_weights
    }

    /// Pins of hyperedge `e`
    pub fn edge(&self, e: usize) -> &[usize] {
        &self.edge_ind[self.edge_ptr[e]..self.edge_ptr[e + 1]]
    }

    /// Vertices of row `row` (its row net)
    pub fn row_vertices(&self, row: usize) -> &[usize] {
        self.edge(row)
    }

    /// Original column a vertex belongs to
    pub fn vertex_column(&self, v: usize) -> usize {
        self.vertex_column[v]
    }

    /// Number of hyperedges whose pins land in more than one part
    ///
    /// This is a diagnostic computed locally; it never replaces the cut the
    /// oracle itself reports.
    pub fn cut_hyperedges(&self, parts: &[usize]) -> usize {
        (0..self.num_hyperedges())
            .filter(|&e| {
                let pins = self.edge(e);
                match pins.split_first() {
                    Some((&first, rest)) => rest.iter().any(|&v| parts[v] != parts[first]),
                    None => false,
                }
            })
            .count()
    }
}
