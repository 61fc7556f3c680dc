//! Core and master-only assembly
//!
//! The core model holds the coupling rows. Columns referenced by no block
//! are master-only; each one is also given a synthetic zero-row block so that
//! every column of the original matrix lives in some block.

use crate::block::{Block, BlockKind};
use crate::columns::active_columns;
use crate::config::{BoundOverride, ModelMode};
use crate::constants::{CORE_MODEL_NAME, MASTER_ONLY_PREFIX};
use crate::error::DecompResult;
use crate::matrix::ConstraintMatrix;
use crate::submodel::{
    build_submodel, extract_submodel, tighten_bounds, BoundSide, ModelOrigin, SubModel,
    SubModelOptions,
};

/// A column that belongs to no block's active set
#[derive(Debug, Clone, PartialEq)]
pub struct MasterOnlyColumn {
    /// Original column id
    pub column: usize,
    /// Bound after applying the override policy
    pub lower: f64,
    pub upper: f64,
    pub is_integer: bool,
    pub name: Option<String>,
}

impl MasterOnlyColumn {
    /// Reads column `column` and applies the bound policy, warning about
    /// every infinite bound that stays
    pub fn new(matrix: &ConstraintMatrix, column: usize, bounds: &BoundOverride) -> Self {
        let mut warnings = Vec::new();
        let (lower, upper) = tighten_bounds(
            column,
            matrix.col_lb()[column],
            matrix.col_ub()[column],
            bounds,
            &mut warnings,
        );

        for warning in &warnings {
            let side = match warning.side {
                BoundSide::Lower => "lower",
                BoundSide::Upper => "upper",
            };
            tracing::warn!(
                component = "core_model",
                operation = "master_only",
                status = "warning",
                column,
                side,
                "Master-only column {} has an unbounded {} bound; extreme rays \
                 are not supported, bound the variable or configure a column bound override",
                column,
                side
            );
        }

        Self {
            column,
            lower,
            upper,
            is_integer: matrix.is_integer(column),
            name: matrix.col_name(column).map(str::to_owned),
        }
    }
}

/// Builds the core model over the coupling rows
///
/// Dense mode spans every original column; sparse mode spans only the
/// columns the coupling rows touch.
pub fn build_core_model(
    matrix: &ConstraintMatrix,
    coupling_rows: &[usize],
    options: &SubModelOptions,
) -> DecompResult<SubModel> {
    let active: Vec<usize> = match options.mode {
        ModelMode::Dense => Vec::new(),
        ModelMode::Sparse => active_columns(matrix, coupling_rows).into_iter().collect(),
    };
    build_submodel(
        matrix,
        ModelOrigin::Core,
        CORE_MODEL_NAME,
        coupling_rows,
        &active,
        options,
    )
}

/// One synthetic block per master-only column, ids starting at `first_id`
///
/// Unbounded columns were already reported by [`MasterOnlyColumn::new`]; the
/// synthetic models record the same warnings without logging them again.
pub fn build_master_only_blocks(
    matrix: &ConstraintMatrix,
    columns: &[MasterOnlyColumn],
    first_id: usize,
    options: &SubModelOptions,
) -> DecompResult<Vec<Block>> {
    let options = SubModelOptions {
        mode: ModelMode::Sparse,
        ..*options
    };

    columns
        .iter()
        .enumerate()
        .map(|(offset, master)| {
            let id = first_id + offset;
            let model = extract_submodel(
                matrix,
                ModelOrigin::Block(id),
                format!("{}{}", MASTER_ONLY_PREFIX, master.column),
                &[],
                &[master.column],
                &options,
            )?;
            Ok(Block {
                id,
                kind: BlockKind::MasterOnly {
                    column: master.column,
                },
                rows: Vec::new(),
                active_columns: vec![master.column],
                model,
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::matrix::SparseMatrixCSR;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tracing::{span, Event, Level, Metadata, Subscriber};

    /// Counts WARN events on the current thread
    struct WarnCounter(Arc<AtomicUsize>);

    impl Subscriber for WarnCounter {
        fn enabled(&self, _: &Metadata<'_>) -> bool {
            true
        }
        fn new_span(&self, _: &span::Attributes<'_>) -> span::Id {
            span::Id::from_u64(1)
        }
        fn record(&self, _: &span::Id, _: &span::Record<'_>) {}
        fn record_follows_from(&self, _: &span::Id, _: &span::Id) {}
        fn event(&self, event: &Event<'_>) {
            if *event.metadata().level() == Level::WARN {
                self.0.fetch_add(1, Ordering::SeqCst);
            }
        }
        fn enter(&self, _: &span::Id) {}
        fn exit(&self, _: &span::Id) {}
    }

    // r0: cols(0,1), r1: cols(1,2); column 3 unreferenced
    fn matrix() -> ConstraintMatrix {
        let a = SparseMatrixCSR::new(2, 4, vec![0, 2, 4], vec![0, 1, 1, 2], vec![1.0; 4]);
        ConstraintMatrix::new(
            a,
            vec![0.0; 2],
            vec![1.0; 2],
            vec![0.0, 0.0, 0.0, -1.0e30],
            vec![1.0, 1.0, 1.0, 1.0e30],
        )
        .unwrap()
        .with_integrality(vec![false, false, false, true])
        .unwrap()
    }

    #[test]
    fn test_core_dense_and_sparse() {
        let cm = matrix();
        let dense = SubModelOptions {
            mode: ModelMode::Dense,
            ..SubModelOptions::default()
        };
        let core = build_core_model(&cm, &[1], &dense).unwrap();
        assert_eq!(core.n_cols(), 4);
        assert_eq!(core.name(), "core");
        assert_eq!(core.origin(), ModelOrigin::Core);

        let core = build_core_model(&cm, &[1], &SubModelOptions::default()).unwrap();
        assert_eq!(core.original_columns(), vec![1, 2]);
    }

    #[test]
    fn test_master_only_bounds() {
        let cm = matrix();
        let master = MasterOnlyColumn::new(&cm, 3, &BoundOverride::new(Some(-10.0), Some(10.0)));
        assert_eq!((master.lower, master.upper), (-10.0, 10.0));
        assert!(master.is_integer);

        let master = MasterOnlyColumn::new(&cm, 3, &BoundOverride::default());
        assert_eq!((master.lower, master.upper), (-1.0e30, 1.0e30));
    }

    #[test]
    fn test_master_only_blocks_continue_ids() {
        let cm = matrix();
        let bounds = BoundOverride::new(None, Some(5.0));
        let master = MasterOnlyColumn::new(&cm, 3, &bounds);
        let options = SubModelOptions {
            bounds,
            ..SubModelOptions::default()
        };
        let blocks = build_master_only_blocks(&cm, &[master], 2, &options).unwrap();

        assert_eq!(blocks.len(), 1);
        assert_eq!(blocks[0].id, 2);
        assert!(blocks[0].is_master_only());
        assert_eq!(blocks[0].model.name(), "master_only3");
        assert_eq!(blocks[0].model.n_rows(), 0);
        assert_eq!(blocks[0].model.col_ub(), &[5.0]);
        assert_eq!(blocks[0].model.integrality(), &[true]);
    }

    #[test]
    fn test_unbounded_master_only_column_warns_once() {
        use crate::config::{DecompConfig, VertexModel};
        use crate::partition::FixedPartitioner;
        use crate::pipeline::Decomposer;

        // r0: col 0, r1: col 1; column 2 unreferenced and unbounded above
        let a = SparseMatrixCSR::new(2, 3, vec![0, 1, 2], vec![0, 1], vec![1.0; 2]);
        let cm = ConstraintMatrix::new(a, vec![0.0; 2], vec![1.0; 2], vec![0.0; 3], vec![1.0, 1.0, 1.0e20])
            .unwrap();
        let config = DecompConfig::with_blocks(2)
            .vertex_model(VertexModel::Column)
            .core_mode(ModelMode::Sparse)
            .threads(1);
        let decomposer =
            Decomposer::new(config).with_partitioner(FixedPartitioner::per_column(vec![0, 1, 0]));

        let warnings = Arc::new(AtomicUsize::new(0));
        let d = tracing::subscriber::with_default(WarnCounter(Arc::clone(&warnings)), || {
            decomposer.decompose(&cm).unwrap()
        });

        assert_eq!(d.master_only.iter().map(|m| m.column).collect::<Vec<_>>(), vec![2]);
        assert_eq!(warnings.load(Ordering::SeqCst), 1);
        // still recorded on the synthetic model
        assert_eq!(d.master_only_blocks()[0].model.bound_warnings().len(), 1);
    }
}
