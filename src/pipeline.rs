//! # Decomposition pipeline
//!
//! Drives the stages in order:
//!
//! 1. build the hypergraph of the constraint matrix
//! 2. ask the partitioning oracle for a part assignment
//! 3. split rows into pure blocks and coupling rows
//! 4. resolve active columns and build one sub-model per block
//! 5. find master-only and linking columns, build the core model and the
//!    synthetic master-only blocks
//!
//! Steps 3 to 5 can also be fed from a recorded assignment or from a user
//! block definition. The per-block work of step 4 runs on a rayon pool; each
//! block only reads the shared matrix.

use std::collections::BTreeMap;

use rayon::prelude::*;

use crate::block::{Block, BlockKind};
use crate::blockfile::BlockDefinition;
use crate::columns::{active_columns, column_reference_counts, linking_columns, master_only_columns};
use crate::config::{DecompConfig, ObjectiveSense};
use crate::constants::RELAX_MODEL_PREFIX;
use crate::core_model::{build_core_model, build_master_only_blocks, MasterOnlyColumn};
use crate::error::{DecompError, DecompResult};
use crate::hypergraph::Hypergraph;
use crate::matrix::ConstraintMatrix;
use crate::partition::{run_partitioner, PartitionAssignment, Partitioner};
use crate::separator::extract_separator;
use crate::stats::{candidate_block_counts, DecompositionStats};
use crate::submodel::{build_submodel, ModelOrigin, SubModel, SubModelOptions};

/// Which model a row ended up in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowOwner {
    Core,
    Block(usize),
}

/// A complete block-angular decomposition
#[derive(Debug, Clone, PartialEq)]
pub struct Decomposition {
    /// Real blocks first, then one synthetic block per master-only column
    pub blocks: Vec<Block>,
    pub core: SubModel,
    /// Rows of the core model, ascending
    pub coupling_rows: Vec<usize>,
    /// Coupling rows that had no nonzeros
    pub empty_rows: Vec<usize>,
    pub master_only: Vec<MasterOnlyColumn>,
    /// Columns shared by several real blocks, with the ids of those blocks
    pub linking_columns: BTreeMap<usize, Vec<usize>>,
    /// Columns whose column net was cut; empty unless doubly bordered
    pub coupling_columns: Vec<usize>,
    /// Objective coefficients in minimisation form
    pub objective: Vec<f64>,
    pub stats: DecompositionStats,
    num_real_blocks: usize,
}

impl Decomposition {
    /// Blocks that carry rows of the matrix
    pub fn real_blocks(&self) -> &[Block] {
        &self.blocks[..self.num_real_blocks]
    }

    /// Synthetic zero-row blocks, one per master-only column
    pub fn master_only_blocks(&self) -> &[Block] {
        &self.blocks[self.num_real_blocks..]
    }

    pub fn num_real_blocks(&self) -> usize {
        self.num_real_blocks
    }

    /// The model holding original row `row`, or `None` if out of range
    pub fn row_owner(&self, row: usize) -> Option<RowOwner> {
        if self.coupling_rows.binary_search(&row).is_ok() {
            return Some(RowOwner::Core);
        }
        self.real_blocks()
            .iter()
            .find(|b| b.rows.binary_search(&row).is_ok())
            .map(|b| RowOwner::Block(b.id))
    }

    /// The first block whose model contains original column `col`
    pub fn column_owner(&self, col: usize) -> Option<usize> {
        self.blocks
            .iter()
            .find(|b| b.active_columns.binary_search(&col).is_ok())
            .map(|b| b.id)
    }

    /// Checks the partition and coverage contracts against `matrix`
    ///
    /// - every row is in exactly one of the core and the real blocks
    /// - every column is active in at least one block
    /// - no block row references a column outside its block's active set
    /// - block ids are their positions
    pub fn check_consistency(&self, matrix: &ConstraintMatrix) -> DecompResult<()> {
        let violation = |msg: String| Err(DecompError::InvariantViolation(msg));
        let a = matrix.matrix();

        let mut seen = vec![0usize; a.n_rows];
        for &row in self
            .coupling_rows
            .iter()
            .chain(self.real_blocks().iter().flat_map(|b| b.rows.iter()))
        {
            match seen.get_mut(row) {
                Some(count) => *count += 1,
                None => return violation(format!("row {} out of range", row)),
            }
        }
        if let Some(row) = seen.iter().position(|&count| count != 1) {
            return violation(format!("row {} is owned {} times", row, seen[row]));
        }

        let mut covered = vec![false; a.n_cols];
        for (pos, block) in self.blocks.iter().enumerate() {
            if block.id != pos {
                return violation(format!("block at position {} has id {}", pos, block.id));
            }
            if block.model.n_cols() != block.active_columns.len()
                && block.model.n_cols() != a.n_cols
            {
                return violation(format!(
                    "block {} model has {} columns for {} active columns",
                    block.id,
                    block.model.n_cols(),
                    block.active_columns.len()
                ));
            }
            for &row in &block.rows {
                if let Some(&col) = a
                    .row_cols(row)
                    .iter()
                    .find(|c| block.active_columns.binary_search(c).is_err())
                {
                    return violation(format!(
                        "row {} of block {} references column {} outside the block",
                        row, block.id, col
                    ));
                }
            }
            for &col in &block.active_columns {
                match covered.get_mut(col) {
                    Some(flag) => *flag = true,
                    None => return violation(format!("column {} out of range", col)),
                }
            }
        }
        if let Some(col) = covered.iter().position(|&c| !c) {
            return violation(format!("column {} is in no block", col));
        }

        Ok(())
    }
}

/// Runs decompositions with one configuration and partitioning backend
pub struct Decomposer {
    config: DecompConfig,
    partitioner: Option<Box<dyn Partitioner>>,
}

impl Decomposer {
    /// A decomposer with no partitioning backend
    ///
    /// Only [`Decomposer::decompose_with_assignment`] and
    /// [`Decomposer::decompose_with_blocks`] work until one is attached.
    pub fn new(config: DecompConfig) -> Self {
        Self {
            config,
            partitioner: None,
        }
    }

    pub fn with_partitioner(mut self, partitioner: impl Partitioner + 'static) -> Self {
        self.partitioner = Some(Box::new(partitioner));
        self
    }

    pub fn config(&self) -> &DecompConfig {
        &self.config
    }

    /// The hypergraph `decompose` would hand to the oracle
    pub fn build_hypergraph(&self, matrix: &ConstraintMatrix) -> DecompResult<Hypergraph> {
        self.config.validate()?;
        Hypergraph::build(
            matrix,
            self.config.weight_policy,
            self.config.border_mode,
            self.config.vertex_model,
        )
    }

    /// Detects a block-angular structure in `matrix`
    ///
    /// # Errors
    ///
    /// - `InvalidConfig` if the configuration is rejected
    /// - `Structure` if the matrix has no rows or no nonzeros
    /// - `OracleUnavailable` / `OracleFailure` from the partitioning backend
    /// - `InvariantViolation` or `OutOfMemory` from later stages
    pub fn decompose(&self, matrix: &ConstraintMatrix) -> DecompResult<Decomposition> {
        self.decompose_into(matrix, self.config.num_blocks)
    }

    /// One fresh attempt per candidate part count from the row-length
    /// histogram, candidates in the order [`candidate_block_counts`] gives
    ///
    /// A failed attempt does not stop the others; only a rejected
    /// configuration fails the whole call.
    pub fn decompose_candidates(
        &self,
        matrix: &ConstraintMatrix,
        max_candidates: usize,
    ) -> DecompResult<Vec<(usize, DecompResult<Decomposition>)>> {
        self.config.validate()?;
        let candidates = candidate_block_counts(matrix, max_candidates);
        tracing::info!(
            component = "pipeline",
            operation = "decompose_candidates",
            status = "start",
            candidates = ?candidates,
            "Trying {} block counts",
            candidates.len()
        );

        Ok(candidates
            .into_iter()
            .map(|k| (k, self.decompose_into(matrix, k)))
            .collect())
    }

    fn decompose_into(
        &self,
        matrix: &ConstraintMatrix,
        num_blocks: usize,
    ) -> DecompResult<Decomposition> {
        tracing::info!(
            component = "pipeline",
            operation = "decompose",
            status = "start",
            rows = matrix.n_rows(),
            cols = matrix.n_cols(),
            nnz = matrix.nnz(),
            num_blocks,
            "Starting structure detection"
        );

        let hypergraph = self.build_hypergraph(matrix)?;
        let assignment = run_partitioner(
            self.partitioner.as_deref(),
            &hypergraph,
            num_blocks,
            self.config.imbalance,
        )?;
        self.decompose_with_assignment(matrix, &hypergraph, &assignment)
    }

    /// Builds the decomposition implied by a known part assignment
    ///
    /// The same inputs always give the same decomposition.
    pub fn decompose_with_assignment(
        &self,
        matrix: &ConstraintMatrix,
        hypergraph: &Hypergraph,
        assignment: &PartitionAssignment,
    ) -> DecompResult<Decomposition> {
        self.config.validate()?;
        let separation = extract_separator(matrix, hypergraph, assignment)?;

        let specs = separation
            .blocks
            .into_iter()
            .map(|b| (BlockKind::Partition { part: b.part }, b.rows))
            .collect();
        let mut decomposition = self.assemble(matrix, specs, separation.coupling_rows)?;

        decomposition.empty_rows = separation.empty_rows;
        decomposition.coupling_columns = separation.coupling_columns;
        decomposition.stats.cut = assignment.cut();
        decomposition.stats.cut_hyperedges = Some(hypergraph.cut_hyperedges(assignment.parts()));
        decomposition.stats.partition_time = Some(assignment.elapsed());

        Ok(decomposition)
    }

    /// Builds the decomposition of user-defined blocks
    ///
    /// Rows listed in no block go to the core.
    pub fn decompose_with_blocks(
        &self,
        matrix: &ConstraintMatrix,
        definition: &BlockDefinition,
    ) -> DecompResult<Decomposition> {
        self.config.validate()?;
        if matrix.n_rows() == 0 {
            return Err(DecompError::Structure("matrix has no rows".to_string()));
        }

        let resolved = definition.resolve(matrix.n_rows())?;
        let mut in_block = vec![false; matrix.n_rows()];
        for (_, rows) in &resolved {
            for &row in rows {
                in_block[row] = true;
            }
        }
        let coupling_rows: Vec<usize> = (0..matrix.n_rows()).filter(|&r| !in_block[r]).collect();
        let empty_rows = coupling_rows
            .iter()
            .copied()
            .filter(|&r| matrix.matrix().row_nnz(r) == 0)
            .collect();

        let specs = resolved
            .into_iter()
            .map(|(label, rows)| (BlockKind::Explicit { label }, rows))
            .collect();
        let mut decomposition = self.assemble(matrix, specs, coupling_rows)?;
        decomposition.empty_rows = empty_rows;
        Ok(decomposition)
    }

    fn block_options(&self) -> SubModelOptions {
        SubModelOptions {
            mode: self.config.block_mode,
            bounds: self.config.bounds,
            use_names: self.config.use_names,
        }
    }

    /// Builds the real block sub-models, in parallel when configured
    fn build_blocks(
        &self,
        matrix: &ConstraintMatrix,
        specs: Vec<(BlockKind, Vec<usize>)>,
    ) -> DecompResult<Vec<Block>> {
        let options = self.block_options();
        let build_one = |(id, (kind, rows)): (usize, (BlockKind, Vec<usize>))| -> DecompResult<Block> {
            let active: Vec<usize> = active_columns(matrix, &rows).into_iter().collect();
            let model = build_submodel(
                matrix,
                ModelOrigin::Block(id),
                format!("{}{}", RELAX_MODEL_PREFIX, id),
                &rows,
                &active,
                &options,
            )?;
            tracing::debug!(
                component = "pipeline",
                operation = "build_block",
                status = "success",
                block = id,
                rows = rows.len(),
                active_columns = active.len(),
                "Built block {}",
                id
            );
            Ok(Block {
                id,
                kind,
                rows,
                active_columns: active,
                model,
            })
        };

        let threads = self.config.threads;
        if threads > 1 && specs.len() > 1 {
            let pool = rayon::ThreadPoolBuilder::new()
                .num_threads(threads)
                .build()
                .map_err(|err| {
                    DecompError::InvalidConfig(format!(
                        "cannot start {} worker threads: {}",
                        threads, err
                    ))
                })?;
            pool.install(|| specs.into_par_iter().enumerate().map(build_one).collect())
        } else {
            specs.into_iter().enumerate().map(build_one).collect()
        }
    }

    fn assemble(
        &self,
        matrix: &ConstraintMatrix,
        specs: Vec<(BlockKind, Vec<usize>)>,
        coupling_rows: Vec<usize>,
    ) -> DecompResult<Decomposition> {
        let mut blocks = self.build_blocks(matrix, specs)?;
        let num_real_blocks = blocks.len();

        let (master_ids, linking) = {
            let active_sets: Vec<&[usize]> =
                blocks.iter().map(|b| b.active_columns.as_slice()).collect();
            let counts = column_reference_counts(matrix.n_cols(), active_sets.iter().copied());
            (master_only_columns(&counts), linking_columns(&active_sets))
        };

        let master_only: Vec<MasterOnlyColumn> = master_ids
            .iter()
            .map(|&col| MasterOnlyColumn::new(matrix, col, &self.config.bounds))
            .collect();

        let core_options = SubModelOptions {
            mode: self.config.core_mode,
            ..self.block_options()
        };
        let core = build_core_model(matrix, &coupling_rows, &core_options)?;

        blocks.extend(build_master_only_blocks(
            matrix,
            &master_only,
            num_real_blocks,
            &self.block_options(),
        )?);

        let objective = match self.config.objective_sense {
            ObjectiveSense::Minimize => matrix.objective().to_vec(),
            ObjectiveSense::Maximize => matrix.objective().iter().map(|&c| -c).collect(),
        };

        let stats = DecompositionStats::collect(
            matrix,
            &coupling_rows,
            num_real_blocks,
            master_only.len(),
            linking.len(),
        );

        let decomposition = Decomposition {
            blocks,
            core,
            coupling_rows,
            empty_rows: Vec::new(),
            master_only,
            linking_columns: linking,
            coupling_columns: Vec::new(),
            objective,
            stats,
            num_real_blocks,
        };
        decomposition.check_consistency(matrix)?;

        tracing::info!(
            component = "pipeline",
            operation = "assemble",
            status = "success",
            blocks = num_real_blocks,
            coupling_rows = decomposition.coupling_rows.len(),
            master_only = decomposition.master_only.len(),
            linking_columns = decomposition.linking_columns.len(),
            alpha = decomposition.stats.coupling_nnz_fraction(),
            "Decomposed into {} blocks with {} coupling rows",
            num_real_blocks,
            decomposition.coupling_rows.len()
        );

        Ok(decomposition)
    }
}
