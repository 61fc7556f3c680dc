//! # Separator extraction
//!
//! Reads a part assignment back onto the rows of the matrix. A row whose
//! vertices all sit in one part is *pure* and joins that part's block; a row
//! spanning several parts is *coupling* and goes to the core.
//!
//! Parts that receive no pure rows are dropped and the survivors are
//! renumbered `0..true_block_count` in ascending order of part id, so block
//! ids are dense even when the oracle leaves parts empty.

use crate::config::BorderMode;
use crate::error::{DecompError, DecompResult};
use crate::hypergraph::Hypergraph;
use crate::matrix::ConstraintMatrix;
use crate::partition::PartitionAssignment;

/// Classification of one row under a part assignment
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowClass {
    /// Every nonzero of the row lies in this part
    Pure(usize),
    /// Nonzeros span at least two parts
    Coupling,
    /// The row has no nonzeros and so no part
    Empty,
}

/// Rows of one surviving part
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawBlock {
    /// Dense block id
    pub id: usize,
    /// Part id the oracle used
    pub part: usize,
    /// Original row ids, ascending
    pub rows: Vec<usize>,
}

/// Outcome of separator extraction
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Separation {
    /// Rows that go to the core model, ascending. Includes empty rows.
    pub coupling_rows: Vec<usize>,
    /// Rows among `coupling_rows` that were empty rather than cut
    pub empty_rows: Vec<usize>,
    pub blocks: Vec<RawBlock>,
    /// Columns whose column net is cut (doubly-bordered mode only)
    pub coupling_columns: Vec<usize>,
}

impl Separation {
    pub fn true_block_count(&self) -> usize {
        self.blocks.len()
    }
}

/// Classifies row `row` by the parts of its row net
pub fn classify_row(hypergraph: &Hypergraph, assignment: &PartitionAssignment, row: usize) -> RowClass {
    let vertices = hypergraph.row_vertices(row);
    match vertices.split_first() {
        None => RowClass::Empty,
        Some((&first, rest)) => {
            let part = assignment.part_of(first);
            if rest.iter().all(|&v| assignment.part_of(v) == part) {
                RowClass::Pure(part)
            } else {
                RowClass::Coupling
            }
        }
    }
}

/// Splits the rows of `matrix` into coupling rows and per-part blocks
///
/// # Errors
///
/// `InvariantViolation` if the assignment or hypergraph does not line up with
/// the matrix, or if the split loses or duplicates a row.
pub fn extract_separator(
    matrix: &ConstraintMatrix,
    hypergraph: &Hypergraph,
    assignment: &PartitionAssignment,
) -> DecompResult<Separation> {
    if assignment.len() != hypergraph.num_vertices() {
        return Err(DecompError::InvariantViolation(format!(
            "partition covers {} vertices, hypergraph has {}",
            assignment.len(),
            hypergraph.num_vertices()
        )));
    }
    if hypergraph.num_row_edges() != matrix.n_rows() {
        return Err(DecompError::InvariantViolation(format!(
            "hypergraph has {} row nets for {} rows",
            hypergraph.num_row_edges(),
            matrix.n_rows()
        )));
    }

    let mut by_part: Vec<Vec<usize>> = vec![Vec::new(); assignment.num_parts()];
    let mut separation = Separation::default();

    for row in 0..matrix.n_rows() {
        match classify_row(hypergraph, assignment, row) {
            RowClass::Pure(part) => by_part[part].push(row),
            RowClass::Coupling => separation.coupling_rows.push(row),
            RowClass::Empty => {
                separation.coupling_rows.push(row);
                separation.empty_rows.push(row);
            }
        }
    }

    separation.blocks = by_part
        .into_iter()
        .enumerate()
        .filter(|(_, rows)| !rows.is_empty())
        .enumerate()
        .map(|(id, (part, rows))| RawBlock { id, part, rows })
        .collect();

    if hypergraph.border_mode() == BorderMode::Doubly {
        let n_rows = hypergraph.num_row_edges();
        separation.coupling_columns = (n_rows..hypergraph.num_hyperedges())
            .filter(|&e| {
                let pins = hypergraph.edge(e);
                pins.split_first().map_or(false, |(&first, rest)| {
                    rest.iter().any(|&v| assignment.part_of(v) != assignment.part_of(first))
                })
            })
            .map(|e| e - n_rows)
            .collect();
    }

    let block_rows: usize = separation.blocks.iter().map(|b| b.rows.len()).sum();
    if block_rows + separation.coupling_rows.len() != matrix.n_rows() {
        return Err(DecompError::InvariantViolation(format!(
            "{} block rows + {} coupling rows != {} rows",
            block_rows,
            separation.coupling_rows.len(),
            matrix.n_rows()
        )));
    }

    tracing::info!(
        component = "separator",
        operation = "extract",
        status = "success",
        coupling_rows = separation.coupling_rows.len(),
        empty_rows = separation.empty_rows.len(),
        true_blocks = separation.blocks.len(),
        requested_parts = assignment.num_parts(),
        coupling_columns = separation.coupling_columns.len(),
        "Found {} coupling rows and {} blocks",
        separation.coupling_rows.len(),
        separation.blocks.len()
    );

    Ok(separation)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{VertexModel, WeightPolicy};
    use crate::matrix::SparseMatrixCSR;

    // r0: cols(0,1), r1: cols(1,2), r2: cols(3,4), r3: empty, r4: cols(2)
    fn matrix() -> ConstraintMatrix {
        let a = SparseMatrixCSR::new(
            5, 5,
            vec![0, 2, 4, 6, 6, 7],
            vec![0, 1, 1, 2, 3, 4, 2],
            vec![1.0; 7],
        );
        ConstraintMatrix::new(a, vec![0.0; 5], vec![1.0; 5], vec![0.0; 5], vec![1.0; 5]).unwrap()
    }

    fn column_graph(cm: &ConstraintMatrix) -> Hypergraph {
        Hypergraph::build(cm, WeightPolicy::Uniform, BorderMode::Singly, VertexModel::Column).unwrap()
    }

    #[test]
    fn test_classify_rows() {
        let cm = matrix();
        let hg = column_graph(&cm);
        let assignment = PartitionAssignment::new(vec![0, 0, 1, 1, 1], 2, None).unwrap();

        assert_eq!(classify_row(&hg, &assignment, 0), RowClass::Pure(0));
        assert_eq!(classify_row(&hg, &assignment, 1), RowClass::Coupling);
        assert_eq!(classify_row(&hg, &assignment, 3), RowClass::Empty);
        // single nonzero rows are always pure
        assert_eq!(classify_row(&hg, &assignment, 4), RowClass::Pure(1));
    }

    #[test]
    fn test_empty_parts_are_renumbered() {
        let cm = matrix();
        let hg = column_graph(&cm);
        // parts 0 and 2 unused
        let assignment = PartitionAssignment::new(vec![1, 1, 3, 3, 3], 4, None).unwrap();
        let sep = extract_separator(&cm, &hg, &assignment).unwrap();

        assert_eq!(sep.true_block_count(), 2);
        assert_eq!(sep.blocks[0], RawBlock { id: 0, part: 1, rows: vec![0] });
        assert_eq!(sep.blocks[1], RawBlock { id: 1, part: 3, rows: vec![2, 4] });
        assert_eq!(sep.coupling_rows, vec![1, 3]);
        assert_eq!(sep.empty_rows, vec![3]);
    }

    #[test]
    fn test_length_mismatch() {
        let cm = matrix();
        let hg = column_graph(&cm);
        let assignment = PartitionAssignment::new(vec![0, 0, 1], 2, None).unwrap();
        let err = extract_separator(&cm, &hg, &assignment).unwrap_err();
        assert!(matches!(err, DecompError::InvariantViolation(_)));
    }

    #[test]
    fn test_doubly_reports_coupling_columns() {
        let cm = matrix();
        let hg = Hypergraph::build(&cm, WeightPolicy::Uniform, BorderMode::Doubly, VertexModel::Nonzero)
            .unwrap();
        // nonzeros: 0:(r0,c0) 1:(r0,c1) 2:(r1,c1) 3:(r1,c2) 4:(r2,c3) 5:(r2,c4) 6:(r4,c2)
        let assignment = PartitionAssignment::new(vec![0, 0, 1, 1, 1, 1, 1], 2, None).unwrap();
        let sep = extract_separator(&cm, &hg, &assignment).unwrap();

        // row 1 is pure in part 1 now; column 1 is split between r0 and r1
        assert_eq!(sep.coupling_rows, vec![3]);
        assert_eq!(sep.coupling_columns, vec![1]);
        assert_eq!(sep.blocks[0].rows, vec![0]);
        assert_eq!(sep.blocks[1].rows, vec![1, 2, 4]);
    }
}
