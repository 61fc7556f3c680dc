//! Partition oracle adapter
//!
//! The partitioning algorithm itself lives outside this crate. A backend is
//! anything implementing [`Partitioner`]; the adapter marshals the
//! hypergraph into the arrays the backend expects, makes one blocking call,
//! and validates what comes back.

pub mod fixed;

use std::time::{Duration, Instant};

use crate::error::{DecompError, DecompResult};
use crate::hypergraph::Hypergraph;

pub use fixed::{FailingPartitioner, FixedPartitioner};

/// Inputs handed to a partitioning backend
///
/// The slices borrow from the hypergraph and follow the hMETIS layout.
#[derive(Debug, Clone, Copy)]
pub struct PartitionRequest<'a> {
    pub num_vertices: usize,
    pub num_hyperedges: usize,
    pub edge_ptr: &'a [usize],
    pub edge_ind: &'a [usize],
    pub vertex_weights: &'a [u32],
    pub edge_weights: &'a [u32],
    pub num_parts: usize,
    /// Maximum load imbalance in percent
    pub imbalance: u32,
    /// The hypergraph the arrays were taken from
    pub hypergraph: &'a Hypergraph,
}

impl<'a> PartitionRequest<'a> {
    pub fn new(hypergraph: &'a Hypergraph, num_parts: usize, imbalance: u32) -> Self {
        Self {
            num_vertices: hypergraph.num_vertices(),
            num_hyperedges: hypergraph.num_hyperedges(),
            edge_ptr: hypergraph.edge_ptr(),
            edge_ind: hypergraph.edge_ind(),
            vertex_weights: hypergraph.vertex_weights(),
            edge_weights: hypergraph.edge_weights(),
            num_parts,
            imbalance,
            hypergraph,
        }
    }
}

/// What a backend returns on success
#[derive(Debug, Clone, PartialEq)]
pub struct RawPartition {
    /// Part id of every vertex
    pub parts: Vec<usize>,
    /// Cut size as reported by the backend, if any
    pub cut: Option<u64>,
}

/// Error code reported by a backend
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OracleError {
    pub code: i32,
    pub message: String,
}

/// A hypergraph partitioning backend
///
/// Calls are blocking and cannot be cancelled.
pub trait Partitioner: Send + Sync {
    /// Name used in log records
    fn name(&self) -> &str;

    fn partition(&self, request: &PartitionRequest<'_>) -> Result<RawPartition, OracleError>;
}

/// Validated oracle output
#[derive(Debug, Clone, PartialEq)]
pub struct PartitionAssignment {
    parts: Vec<usize>,
    num_parts: usize,
    cut: Option<u64>,
    elapsed: Duration,
}

impl PartitionAssignment {
    /// Wraps a per-vertex part table, checking every id lies in `[0, num_parts)`
    pub fn new(parts: Vec<usize>, num_parts: usize, cut: Option<u64>) -> DecompResult<Self> {
        if let Some(v) = parts.iter().position(|&p| p >= num_parts) {
            return Err(DecompError::OracleFailure {
                code: -1,
                message: format!(
                    "vertex {} assigned to part {} (k = {})",
                    v, parts[v], num_parts
                ),
            });
        }
        Ok(Self {
            parts,
            num_parts,
            cut,
            elapsed: Duration::ZERO,
        })
    }

    pub fn parts(&self) -> &[usize] {
        &self.parts
    }

    pub fn part_of(&self, vertex: usize) -> usize {
        self.parts[vertex]
    }

    pub fn num_parts(&self) -> usize {
        self.num_parts
    }

    pub fn len(&self) -> usize {
        self.parts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    /// Cut advertised by the oracle, kept for diagnostics only
    pub fn cut(&self) -> Option<u64> {
        self.cut
    }

    /// Wall time spent inside the oracle
    pub fn elapsed(&self) -> Duration {
        self.elapsed
    }
}

/// Invokes `partitioner` on `hypergraph` and validates the result
///
/// # Errors
///
/// - `OracleUnavailable` if no backend is configured
/// - `InvalidConfig` if `num_parts` is zero
/// - `OracleFailure` if the backend errors or returns a part id outside `[0, k)`
/// - `InvariantViolation` if the part array does not cover every vertex
pub fn run_partitioner(
    partitioner: Option<&dyn Partitioner>,
    hypergraph: &Hypergraph,
    num_parts: usize,
    imbalance: u32,
) -> DecompResult<PartitionAssignment> {
    let partitioner = partitioner.ok_or(DecompError::OracleUnavailable)?;

    if num_parts == 0 {
        return Err(DecompError::InvalidConfig(
            "requested part count must be at least 1".to_string(),
        ));
    }

    let request = PartitionRequest::new(hypergraph, num_parts, imbalance);

    let start = Instant::now();
    let raw = partitioner.partition(&request).map_err(|err| {
        tracing::error!(
            component = "partition",
            operation = "partition",
            status = "error",
            oracle = partitioner.name(),
            code = err.code,
            "Partitioning oracle failed: {}",
            err.message
        );
        DecompError::OracleFailure {
            code: err.code,
            message: err.message,
        }
    })?;
    let elapsed = start.elapsed();

    if raw.parts.len() != hypergraph.num_vertices() {
        return Err(DecompError::InvariantViolation(format!(
            "oracle returned {} parts for {} vertices",
            raw.parts.len(),
            hypergraph.num_vertices()
        )));
    }

    let mut assignment = PartitionAssignment::new(raw.parts, num_parts, raw.cut)?;
    assignment.elapsed = elapsed;

    tracing::info!(
        component = "partition",
        operation = "partition",
        status = "success",
        oracle = partitioner.name(),
        num_parts,
        cut = ?assignment.cut,
        elapsed_ms = elapsed.as_millis() as u64,
        "Hypergraph partitioned into {} parts",
        num_parts
    );

    Ok(assignment)
}
