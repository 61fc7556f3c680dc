//! # hyperblock: block-angular structure detection for sparse constraint matrices
//!
//! Given the constraint matrix of a mixed-integer program, this crate finds a
//! block-angular layout: independent diagonal blocks of rows, linked only by
//! a small set of coupling rows. The layout is found by modelling the matrix
//! as a hypergraph and handing it to a pluggable partitioning oracle.
//!
//! ## Pipeline
//!
//! 1. **Hypergraph**: one hyperedge per row (and per column when doubly
//!    bordered), one vertex per nonzero or per column.
//! 2. **Partition**: any [`Partitioner`] assigns vertices to `k` parts.
//! 3. **Separator**: rows entirely inside one part become that part's block;
//!    rows spanning parts become coupling rows.
//! 4. **Sub-models**: every block and the core gets an index-consistent
//!    sub-model with its own local column ids and tightened bounds.
//! 5. **Master-only columns**: columns no block references get a synthetic
//!    zero-row block of their own.
//!
//! ## Usage
//!
//! ```
//! use hyperblock::{
//!     ConstraintMatrix, DecompConfig, Decomposer, FixedPartitioner, SparseMatrixCSR,
//!     VertexModel,
//! };
//!
//! // r0: cols(0,1), r1: cols(1,2), r2: cols(3,4)
//! let a = SparseMatrixCSR::new(
//!     3, 5,
//!     vec![0, 2, 4, 6],
//!     vec![0, 1, 1, 2, 3, 4],
//!     vec![1.0; 6],
//! );
//! let matrix = ConstraintMatrix::new(a, vec![0.0; 3], vec![1.0; 3], vec![0.0; 5], vec![1.0; 5])?;
//!
//! let config = DecompConfig::with_blocks(2).vertex_model(VertexModel::Column);
//! let decomposition = Decomposer::new(config)
//!     .with_partitioner(FixedPartitioner::per_column(vec![0, 0, 1, 1, 1]))
//!     .decompose(&matrix)?;
//!
//! assert_eq!(decomposition.coupling_rows, vec![1]);
//! assert_eq!(decomposition.num_real_blocks(), 2);
//! # Ok::<(), hyperblock::DecompError>(())
//! ```

pub mod block;
pub mod blockfile;
pub mod columns;
pub mod config;
pub mod constants;
pub mod core_model;
pub mod error;
pub mod hypergraph;
pub mod matrix;
pub mod partition;
pub mod pipeline;
pub mod separator;
pub mod solution;
pub mod stats;
pub mod submodel;
pub mod utils;

// Re-export primary components
pub use block::{Block, BlockKind};
pub use blockfile::{parse_permutation, BlockDefinition, BlockFileFormat};
pub use config::{
    BorderMode, BoundOverride, DecompConfig, ModelMode, ObjectiveSense, VertexModel, WeightPolicy,
};
pub use core_model::MasterOnlyColumn;
pub use error::{DecompError, DecompResult};
pub use hypergraph::Hypergraph;
pub use matrix::{ConstraintMatrix, IndexMap, SparseMatrixCSR};
pub use partition::{
    FailingPartitioner, FixedPartitioner, OracleError, PartitionAssignment, PartitionRequest,
    Partitioner, RawPartition,
};
pub use pipeline::{Decomposer, Decomposition, RowOwner};
pub use solution::{parse_initial_solution, BlockSolution};
pub use stats::{candidate_block_counts, DecompositionStats};
pub use submodel::{BoundSide, BoundWarning, ModelOrigin, SubModel};
pub use utils::{from_sprs_csr, to_sprs_csr};

/// Version information for the hyperblock library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
