//! End-to-end decomposition tests through the public API

use hyperblock::{
    BlockKind, BorderMode, BoundSide, ConstraintMatrix, DecompConfig, DecompError, Decomposer,
    FailingPartitioner, FixedPartitioner, ModelMode, PartitionAssignment, RowOwner,
    SparseMatrixCSR, VertexModel,
};

/// r0: cols(0,1), r1: cols(1,2), r2: cols(3,4)
fn example_matrix(col_ub: Vec<f64>) -> ConstraintMatrix {
    let a = SparseMatrixCSR::new(
        3,
        5,
        vec![0, 2, 4, 6],
        vec![0, 1, 1, 2, 3, 4],
        vec![1.0, 2.0, 3.0, 4.0, 5.0, 6.0],
    );
    ConstraintMatrix::new(a, vec![0.0; 3], vec![10.0; 3], vec![0.0; 5], col_ub).unwrap()
}

fn column_decomposer(config: DecompConfig, parts: Vec<usize>) -> Decomposer {
    Decomposer::new(config.vertex_model(VertexModel::Column))
        .with_partitioner(FixedPartitioner::per_column(parts))
}

#[test]
fn test_worked_example() {
    let matrix = example_matrix(vec![1.0; 5]);
    let d = column_decomposer(DecompConfig::with_blocks(2), vec![0, 0, 1, 1, 1])
        .decompose(&matrix)
        .unwrap();

    let blocks = d.real_blocks();
    assert_eq!(blocks.len(), 2);
    assert_eq!(blocks[0].rows, vec![0]);
    assert_eq!(blocks[0].active_columns, vec![0, 1]);
    assert_eq!(blocks[0].kind, BlockKind::Partition { part: 0 });
    assert_eq!(blocks[1].rows, vec![2]);
    assert_eq!(blocks[1].active_columns, vec![3, 4]);
    assert_eq!(d.coupling_rows, vec![1]);

    // Column 2 appears only in the coupling row, so no block holds it
    assert_eq!(d.master_only.len(), 1);
    assert_eq!(d.master_only[0].column, 2);
    assert_eq!(d.master_only_blocks()[0].id, 2);

    // Block 1 is re-indexed: original columns 3 and 4 become local 0 and 1
    let model = &blocks[1].model;
    assert_eq!(model.column_map().to_local(3), Some(0));
    assert_eq!(model.column_map().to_global(1), Some(4));
    assert_eq!(model.matrix().col_idx, vec![0, 1]);
    assert_eq!(model.matrix().values, vec![5.0, 6.0]);

    assert!(d.check_consistency(&matrix).is_ok());
}

#[test]
fn test_all_rows_in_one_part() {
    let matrix = example_matrix(vec![1.0; 5]);
    let d = column_decomposer(DecompConfig::with_blocks(2), vec![0; 5])
        .decompose(&matrix)
        .unwrap();

    assert!(d.coupling_rows.is_empty());
    assert_eq!(d.num_real_blocks(), 1);
    assert_eq!(d.real_blocks()[0].rows, vec![0, 1, 2]);
    assert_eq!(d.core.n_rows(), 0);
    assert!(d.master_only.is_empty());
    assert_eq!(d.stats.num_blocks, 1);
    assert_eq!(d.stats.relaxed_row_percentage(), 100.0);
}

#[test]
fn test_every_row_coupling() {
    // Both rows touch both columns
    let a = SparseMatrixCSR::new(2, 2, vec![0, 2, 4], vec![0, 1, 0, 1], vec![1.0, 2.0, 3.0, 4.0]);
    let matrix = ConstraintMatrix::new(a, vec![0.0; 2], vec![1.0; 2], vec![0.0; 2], vec![1.0; 2]).unwrap();

    let d = column_decomposer(DecompConfig::with_blocks(2), vec![0, 1])
        .decompose(&matrix)
        .unwrap();

    assert_eq!(d.num_real_blocks(), 0);
    assert_eq!(d.coupling_rows, vec![0, 1]);
    assert_eq!(d.core.matrix(), matrix.matrix());
    assert_eq!(d.master_only_blocks().len(), 2);
    assert_eq!(d.stats.coupling_nnz_fraction(), 1.0);
    assert_eq!(d.stats.master_only_fraction(), 1.0);
}

#[test]
fn test_bound_override_replaces_infinite_upper_bound() {
    let matrix = example_matrix(vec![1.0, 1.0, 1.0, 1.0e20, 1.0]);
    let config = DecompConfig::with_blocks(2).column_bounds(None, Some(1000.0));
    let d = column_decomposer(config, vec![0, 0, 1, 1, 1])
        .decompose(&matrix)
        .unwrap();

    let model = &d.real_blocks()[1].model;
    assert_eq!(model.col_lb(), &[0.0, 0.0]);
    assert_eq!(model.col_ub(), &[1000.0, 1.0]);
    assert!(model.bound_warnings().is_empty());
}

#[test]
fn test_unbounded_column_without_override_warns() {
    let matrix = example_matrix(vec![1.0, 1.0, 1.0, 1.0e20, 1.0]);
    let d = column_decomposer(DecompConfig::with_blocks(2), vec![0, 0, 1, 1, 1])
        .decompose(&matrix)
        .unwrap();

    let model = &d.real_blocks()[1].model;
    assert_eq!(model.col_ub(), &[1.0e20, 1.0]);
    let warnings = model.bound_warnings();
    assert_eq!(warnings.len(), 1);
    assert_eq!(warnings[0].column, 3);
    assert_eq!(warnings[0].side, BoundSide::Upper);
}

#[test]
fn test_replaying_an_assignment_is_idempotent() {
    let matrix = example_matrix(vec![1.0; 5]);
    let decomposer = Decomposer::new(DecompConfig::with_blocks(2).threads(2));
    let hypergraph = decomposer.build_hypergraph(&matrix).unwrap();
    // One vertex per nonzero; r1 spans vertices 2 and 3
    let assignment = PartitionAssignment::new(vec![0, 0, 0, 1, 1, 1], 2, Some(1)).unwrap();

    let first = decomposer
        .decompose_with_assignment(&matrix, &hypergraph, &assignment)
        .unwrap();
    let second = decomposer
        .decompose_with_assignment(&matrix, &hypergraph, &assignment)
        .unwrap();

    assert_eq!(first, second);
    assert_eq!(first.coupling_rows, vec![1]);
    assert_eq!(first.stats.cut, Some(1));
    assert_eq!(first.stats.cut_hyperedges, Some(1));
}

#[test]
fn test_sparse_core_keeps_coupling_columns_only() {
    let matrix = example_matrix(vec![1.0; 5]);
    let config = DecompConfig::with_blocks(2).core_mode(ModelMode::Sparse);
    let d = column_decomposer(config, vec![0, 0, 1, 1, 1])
        .decompose(&matrix)
        .unwrap();

    assert_eq!(d.core.original_columns(), vec![1, 2]);
    assert_eq!(d.core.matrix().col_idx, vec![0, 1]);
    assert_eq!(d.core.original_rows(), vec![1]);
}

#[test]
fn test_dense_blocks_keep_original_column_ids() {
    let matrix = example_matrix(vec![1.0; 5]);
    let config = DecompConfig::with_blocks(2).block_mode(ModelMode::Dense);
    let d = column_decomposer(config, vec![0, 0, 1, 1, 1])
        .decompose(&matrix)
        .unwrap();

    let model = &d.real_blocks()[1].model;
    assert_eq!(model.n_cols(), 5);
    assert_eq!(model.matrix().col_idx, vec![3, 4]);
    assert!(model.column_map().is_identity());
}

#[test]
fn test_doubly_bordered_reports_cut_columns() {
    let matrix = example_matrix(vec![1.0; 5]);
    // Column 1 has nonzeros at vertex 1 (row 0) and vertex 2 (row 1)
    let config = DecompConfig::with_blocks(2).border_mode(BorderMode::Doubly);
    let d = Decomposer::new(config)
        .with_partitioner(FixedPartitioner::per_vertex(vec![0, 0, 1, 1, 1, 1]))
        .decompose(&matrix)
        .unwrap();

    assert!(d.coupling_rows.is_empty());
    assert_eq!(d.real_blocks()[0].rows, vec![0]);
    assert_eq!(d.real_blocks()[1].rows, vec![1, 2]);
    assert_eq!(d.coupling_columns, vec![1]);
    assert_eq!(d.linking_columns.get(&1), Some(&vec![0, 1]));
    assert_eq!(d.stats.num_linking_columns, 1);
}

#[test]
fn test_names_follow_rows_and_columns() {
    let matrix = example_matrix(vec![1.0; 5])
        .with_row_names(vec!["cap_a".into(), "link".into(), "cap_b".into()])
        .unwrap()
        .with_col_names((0..5).map(|j| format!("x{}", j)).collect())
        .unwrap();
    let d = column_decomposer(DecompConfig::with_blocks(2), vec![0, 0, 1, 1, 1])
        .decompose(&matrix)
        .unwrap();

    let model = &d.real_blocks()[1].model;
    assert_eq!(model.row_names(), &["cap_b".to_string()]);
    assert_eq!(model.col_names(), &["x3".to_string(), "x4".to_string()]);
    assert_eq!(d.master_only[0].name.as_deref(), Some("x2"));
    assert_eq!(d.core.row_names(), &["link".to_string()]);
}

#[test]
fn test_row_and_column_owners() {
    let matrix = example_matrix(vec![1.0; 5]);
    let d = column_decomposer(DecompConfig::with_blocks(2), vec![0, 0, 1, 1, 1])
        .decompose(&matrix)
        .unwrap();

    assert_eq!(d.row_owner(0), Some(RowOwner::Block(0)));
    assert_eq!(d.row_owner(1), Some(RowOwner::Core));
    assert_eq!(d.row_owner(2), Some(RowOwner::Block(1)));
    assert_eq!(d.column_owner(4), Some(1));
    assert_eq!(d.column_owner(2), Some(2));
    assert_eq!(d.column_owner(7), None);
}

#[test]
fn test_advertised_cut_and_timing() {
    let matrix = example_matrix(vec![1.0; 5]);
    let d = Decomposer::new(DecompConfig::with_blocks(2).vertex_model(VertexModel::Column))
        .with_partitioner(FixedPartitioner::per_column(vec![0, 0, 1, 1, 1]).with_cut(3))
        .decompose(&matrix)
        .unwrap();

    // The oracle's own figure is reported as is
    assert_eq!(d.stats.cut, Some(3));
    assert_eq!(d.stats.cut_hyperedges, Some(1));
    assert!(d.stats.partition_time.is_some());
}

#[test]
fn test_structure_errors() {
    let empty = SparseMatrixCSR::<f64>::new(0, 3, vec![0], vec![], vec![]);
    let matrix = ConstraintMatrix::new(empty, vec![], vec![], vec![0.0; 3], vec![1.0; 3]).unwrap();
    let err = column_decomposer(DecompConfig::default(), vec![0; 3])
        .decompose(&matrix)
        .unwrap_err();
    assert!(matches!(err, DecompError::Structure(_)));

    let zeros = SparseMatrixCSR::<f64>::zeros(2, 3);
    let matrix = ConstraintMatrix::new(zeros, vec![0.0; 2], vec![1.0; 2], vec![0.0; 3], vec![1.0; 3]).unwrap();
    let err = column_decomposer(DecompConfig::default(), vec![0; 3])
        .decompose(&matrix)
        .unwrap_err();
    assert!(matches!(err, DecompError::Structure(_)));
}

#[test]
fn test_oracle_errors() {
    let matrix = example_matrix(vec![1.0; 5]);

    let err = Decomposer::new(DecompConfig::default()).decompose(&matrix).unwrap_err();
    assert!(matches!(err, DecompError::OracleUnavailable));

    let err = Decomposer::new(DecompConfig::default())
        .with_partitioner(FailingPartitioner::new(-3, "out of memory in coarsening"))
        .decompose(&matrix)
        .unwrap_err();
    assert!(matches!(err, DecompError::OracleFailure { code: -3, .. }));

    // Part 5 with only two parts requested
    let err = column_decomposer(DecompConfig::with_blocks(2), vec![0, 0, 5, 1, 1])
        .decompose(&matrix)
        .unwrap_err();
    assert!(matches!(err, DecompError::OracleFailure { .. }));

    // Six vertices, two part ids
    let err = Decomposer::new(DecompConfig::with_blocks(2))
        .with_partitioner(FixedPartitioner::per_vertex(vec![0, 1]))
        .decompose(&matrix)
        .unwrap_err();
    assert!(matches!(err, DecompError::InvariantViolation(_)));
}

#[test]
fn test_invalid_config_rejected_before_work() {
    let matrix = example_matrix(vec![1.0; 5]);
    for config in [
        DecompConfig::with_blocks(0),
        DecompConfig::default().threads(0),
        DecompConfig::default()
            .border_mode(BorderMode::Doubly)
            .vertex_model(VertexModel::Column),
        DecompConfig::default().column_bounds(Some(f64::NAN), None),
    ] {
        let err = Decomposer::new(config)
            .with_partitioner(FixedPartitioner::per_column(vec![0; 5]))
            .decompose(&matrix)
            .unwrap_err();
        assert!(matches!(err, DecompError::InvalidConfig(_)), "{:?}", err);
    }
}

#[test]
fn test_candidate_block_counts_drive_decomposition() {
    let matrix = example_matrix(vec![1.0; 5]);
    // every row has two non-zeros, so three rows share one length
    let results = column_decomposer(DecompConfig::default(), vec![0, 0, 1, 1, 1])
        .decompose_candidates(&matrix, 4)
        .unwrap();

    assert_eq!(results.len(), 1);
    let (k, result) = &results[0];
    assert_eq!(*k, 3);
    let d = result.as_ref().unwrap();
    assert_eq!(d.num_real_blocks(), 2);
    assert_eq!(d.coupling_rows, vec![1]);
}
