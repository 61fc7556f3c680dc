//! Initial solutions split by block
//!
//! A known solution of the full model can seed a decomposition method: each
//! block receives the values of its own columns. Solution text is a header
//! line followed by `<solution id> <column name> <value>` triples.

use std::collections::{BTreeMap, HashMap};

use crate::error::{DecompError, DecompResult};
use crate::matrix::ConstraintMatrix;
use crate::pipeline::Decomposition;

/// Bounds closer than this to a value count as active
const BOUND_TOLERANCE: f64 = 1.0e-5;

/// The part of one solution that lives in one block
#[derive(Debug, Clone, PartialEq)]
pub struct BlockSolution {
    pub block: usize,
    /// Original column ids, in input order
    pub columns: Vec<usize>,
    pub values: Vec<f64>,
    /// Objective contribution, in minimisation form
    pub cost: f64,
}

/// Reads solution text into `(column name, value)` lists per solution id
pub fn parse_initial_solution(text: &str) -> DecompResult<BTreeMap<usize, Vec<(String, f64)>>> {
    let mut solutions: BTreeMap<usize, Vec<(String, f64)>> = BTreeMap::new();

    // first line is a header
    for (i, line) in text.lines().enumerate().skip(1) {
        let line_no = i + 1;
        let fields: Vec<&str> = line.split_whitespace().collect();
        match fields[..] {
            [] => continue,
            [id, name, value] => {
                let id: usize = id.parse().map_err(|_| DecompError::InvalidSolutionFile {
                    line: line_no,
                    message: format!("expected solution id, found {:?}", id),
                })?;
                let value: f64 = value.parse().map_err(|_| DecompError::InvalidSolutionFile {
                    line: line_no,
                    message: format!("expected value, found {:?}", value),
                })?;
                solutions.entry(id).or_default().push((name.to_string(), value));
            }
            _ => {
                return Err(DecompError::InvalidSolutionFile {
                    line: line_no,
                    message: format!("expected 3 fields, found {}", fields.len()),
                })
            }
        }
    }

    Ok(solutions)
}

impl Decomposition {
    /// Splits one solution of `matrix` by the block owning each column
    ///
    /// Names the matrix does not know are skipped with a warning. Blocks with
    /// no listed column are left out; the rest come in ascending block id.
    ///
    /// # Errors
    ///
    /// `InvalidConfig` if `matrix` carries no column names.
    pub fn group_solution_by_block(
        &self,
        matrix: &ConstraintMatrix,
        entries: &[(String, f64)],
    ) -> DecompResult<Vec<BlockSolution>> {
        let lookup: HashMap<&str, usize> = (0..matrix.n_cols())
            .filter_map(|c| matrix.col_name(c).map(|name| (name, c)))
            .collect();
        if lookup.is_empty() && matrix.n_cols() > 0 {
            return Err(DecompError::InvalidConfig(
                "grouping a solution by name needs column names".to_string(),
            ));
        }

        let mut grouped: BTreeMap<usize, BlockSolution> = BTreeMap::new();
        for (name, value) in entries {
            let Some(&col) = lookup.get(name.as_str()) else {
                tracing::warn!(
                    component = "solution",
                    operation = "group",
                    status = "warning",
                    column = %name,
                    "Solution column {} is not in the matrix",
                    name
                );
                continue;
            };
            let block = self.column_owner(col).ok_or_else(|| {
                DecompError::InvariantViolation(format!("column {} is in no block", col))
            })?;

            if self.blocks[block].is_master_only()
                && *value > matrix.col_lb()[col] + BOUND_TOLERANCE
                && *value < matrix.col_ub()[col] - BOUND_TOLERANCE
            {
                tracing::debug!(
                    component = "solution",
                    operation = "group",
                    column = %name,
                    value = *value,
                    "Master-only column {} is strictly between its bounds",
                    name
                );
            }

            let entry = grouped.entry(block).or_insert_with(|| BlockSolution {
                block,
                columns: Vec::new(),
                values: Vec::new(),
                cost: 0.0,
            });
            entry.columns.push(col);
            entry.values.push(*value);
            entry.cost += value * self.objective[col];
        }

        Ok(grouped.into_values().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DecompConfig, VertexModel};
    use crate::matrix::SparseMatrixCSR;
    use crate::partition::FixedPartitioner;
    use crate::pipeline::Decomposer;

    // r0: cols(0,1), r1: cols(1,2), r2: cols(3,4)
    fn matrix() -> ConstraintMatrix {
        let a = SparseMatrixCSR::new(3, 5, vec![0, 2, 4, 6], vec![0, 1, 1, 2, 3, 4], vec![1.0; 6]);
        ConstraintMatrix::new(a, vec![0.0; 3], vec![1.0; 3], vec![0.0; 5], vec![1.0; 5])
            .unwrap()
            .with_objective(vec![1.0, 2.0, 3.0, 4.0, 5.0])
            .unwrap()
            .with_col_names((0..5).map(|j| format!("x{}", j)).collect())
            .unwrap()
    }

    fn decomposition(cm: &ConstraintMatrix) -> Decomposition {
        let config = DecompConfig::with_blocks(2)
            .vertex_model(VertexModel::Column)
            .threads(1);
        Decomposer::new(config)
            .with_partitioner(FixedPartitioner::per_column(vec![0, 0, 1, 1, 1]))
            .decompose(cm)
            .unwrap()
    }

    #[test]
    fn test_parse_initial_solution() {
        let text = "solution column value\n0 x0 1\n\n1 x4 0.5\n0 x3 2\n";
        let solutions = parse_initial_solution(text).unwrap();
        assert_eq!(solutions.len(), 2);
        assert_eq!(solutions[&0], vec![("x0".to_string(), 1.0), ("x3".to_string(), 2.0)]);
        assert_eq!(solutions[&1], vec![("x4".to_string(), 0.5)]);
    }

    #[test]
    fn test_parse_initial_solution_errors() {
        let err = parse_initial_solution("header\n0 x0\n").unwrap_err();
        assert!(matches!(err, DecompError::InvalidSolutionFile { line: 2, .. }));
        let err = parse_initial_solution("header\n0 x0 one\n").unwrap_err();
        assert_eq!(err.kind(), "invalid_solution_file");
    }

    #[test]
    fn test_group_by_owning_block() {
        let cm = matrix();
        let d = decomposition(&cm);
        let entries = vec![
            ("x0".to_string(), 1.0),
            ("x3".to_string(), 2.0),
            ("x2".to_string(), 0.5),
            ("missing".to_string(), 3.0),
            ("x4".to_string(), 1.0),
        ];
        let grouped = d.group_solution_by_block(&cm, &entries).unwrap();

        assert_eq!(grouped.len(), 3);
        assert_eq!(grouped[0].block, 0);
        assert_eq!(grouped[0].columns, vec![0]);
        assert_eq!(grouped[0].cost, 1.0);
        assert_eq!(grouped[1].columns, vec![3, 4]);
        assert_eq!(grouped[1].values, vec![2.0, 1.0]);
        assert_eq!(grouped[1].cost, 13.0);
        // column 2 only appears in the coupling row
        assert_eq!(grouped[2].block, 2);
        assert!(d.blocks[2].is_master_only());
        assert_eq!(grouped[2].cost, 1.5);
    }

    #[test]
    fn test_group_needs_column_names() {
        let a = SparseMatrixCSR::new(1, 1, vec![0, 1], vec![0], vec![1.0]);
        let cm = ConstraintMatrix::new(a, vec![0.0], vec![1.0], vec![0.0], vec![1.0]).unwrap();
        let d = Decomposer::new(DecompConfig::with_blocks(1).threads(1))
            .with_partitioner(FixedPartitioner::per_vertex(vec![0]))
            .decompose(&cm)
            .unwrap();
        let err = d
            .group_solution_by_block(&cm, &[("x0".to_string(), 1.0)])
            .unwrap_err();
        assert!(matches!(err, DecompError::InvalidConfig(_)));
    }
}
