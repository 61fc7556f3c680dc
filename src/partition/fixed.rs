//! Deterministic partitioners
//!
//! These stand in for a real hypergraph partitioning backend when the part
//! assignment is already known: replaying a stored partition, driving the
//! pipeline from a column→part table, or exercising the failure path.

use super::{OracleError, PartitionRequest, Partitioner, RawPartition};

#[derive(Debug, Clone, PartialEq)]
enum Table {
    PerVertex(Vec<usize>),
    PerColumn(Vec<usize>),
}

/// Returns a fixed part assignment regardless of weights or balance
#[derive(Debug, Clone, PartialEq)]
pub struct FixedPartitioner {
    table: Table,
    cut: Option<u64>,
}

impl FixedPartitioner {
    /// One part id per hypergraph vertex, returned verbatim
    pub fn per_vertex(parts: Vec<usize>) -> Self {
        Self {
            table: Table::PerVertex(parts),
            cut: None,
        }
    }

    /// One part id per matrix column; every vertex takes the part of its column
    pub fn per_column(parts: Vec<usize>) -> Self {
        Self {
            table: Table::PerColumn(parts),
            cut: None,
        }
    }

    /// Cut value to advertise alongside the assignment
    pub fn with_cut(mut self, cut: u64) -> Self {
        self.cut = Some(cut);
        self
    }
}

impl Partitioner for FixedPartitioner {
    fn name(&self) -> &str {
        "fixed"
    }

    fn partition(&self, request: &PartitionRequest<'_>) -> Result<RawPartition, OracleError> {
        let parts = match &self.table {
            Table::PerVertex(parts) => parts.clone(),
            Table::PerColumn(columns) => {
                let hypergraph = request.hypergraph;
                let mut parts = Vec::with_capacity(request.num_vertices);
                for v in 0..request.num_vertices {
                    let col = hypergraph.vertex_column(v);
                    let part = columns.get(col).copied().ok_or_else(|| OracleError {
                        code: -2,
                        message: format!("no part given for column {}", col),
                    })?;
                    parts.push(part);
                }
                parts
            }
        };

        Ok(RawPartition {
            parts,
            cut: self.cut,
        })
    }
}

/// Always fails with the configured error code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FailingPartitioner {
    code: i32,
    message: String,
}

impl FailingPartitioner {
    pub fn new(code: i32, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl Partitioner for FailingPartitioner {
    fn name(&self) -> &str {
        "failing"
    }

    fn partition(&self, _request: &PartitionRequest<'_>) -> Result<RawPartition, OracleError> {
        Err(OracleError {
            code: self.code,
            message: self.message.clone(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BorderMode, VertexModel, WeightPolicy};
    use crate::hypergraph::Hypergraph;
    use crate::matrix::{ConstraintMatrix, SparseMatrixCSR};

    #[test]
    fn test_per_column_expands_to_nonzeros() {
        // r0: cols(0,2), r1: cols(1)
        let a = SparseMatrixCSR::new(2, 3, vec![0, 2, 3], vec![0, 2, 1], vec![1.0; 3]);
        let cm = ConstraintMatrix::new(a, vec![0.0; 2], vec![1.0; 2], vec![0.0; 3], vec![1.0; 3]).unwrap();
        let hg = Hypergraph::build(&cm, WeightPolicy::Uniform, BorderMode::Singly, VertexModel::Nonzero)
            .unwrap();

        let oracle = FixedPartitioner::per_column(vec![0, 1, 2]);
        let raw = oracle.partition(&PartitionRequest::new(&hg, 3, 5)).unwrap();
        assert_eq!(raw.parts, vec![0, 2, 1]);
        assert_eq!(raw.cut, None);

        let short = FixedPartitioner::per_column(vec![0]);
        assert_eq!(short.partition(&PartitionRequest::new(&hg, 3, 5)).unwrap_err().code, -2);
    }
}
