use hyperblock::{
    ConstraintMatrix, DecompConfig, Decomposer, FixedPartitioner, RowOwner, SparseMatrixCSR,
    VertexModel,
};

fn main() {
    println!("hyperblock {}: block-angular structure detection", hyperblock::VERSION);

    // Two independent row groups joined by one coupling row
    //   r0: x0 + x1        <= 4
    //   r1:      x1 + x2   <= 3
    //   r2:           x3 + x4 <= 5
    let a = SparseMatrixCSR::new(
        3,
        5,
        vec![0, 2, 4, 6],
        vec![0, 1, 1, 2, 3, 4],
        vec![1.0; 6],
    );
    let matrix = match ConstraintMatrix::new(
        a,
        vec![f64::NEG_INFINITY; 3],
        vec![4.0, 3.0, 5.0],
        vec![0.0; 5],
        vec![1.0, 1.0, 1.0e20, 1.0, 1.0],
    )
    .and_then(|m| m.with_integrality(vec![true, true, false, false, true]))
    {
        Ok(matrix) => matrix,
        Err(err) => {
            eprintln!("cannot build matrix: {}", err);
            std::process::exit(1);
        }
    };

    println!("\nConstraint matrix:");
    println!("{:?}", matrix.matrix());

    let config = DecompConfig::with_blocks(2)
        .vertex_model(VertexModel::Column)
        .column_bounds(None, Some(1000.0));
    println!("\nConfiguration:");
    println!("  Blocks requested: {}", config.num_blocks);
    println!("  Imbalance: {}%", config.imbalance);
    println!("  Threads: {}", config.threads);

    let decomposer =
        Decomposer::new(config).with_partitioner(FixedPartitioner::per_column(vec![0, 0, 1, 1, 1]));
    let decomposition = match decomposer.decompose(&matrix) {
        Ok(d) => d,
        Err(err) => {
            eprintln!("decomposition failed ({}): {}", err.kind(), err);
            std::process::exit(1);
        }
    };

    println!("\nRow ownership:");
    for row in 0..matrix.n_rows() {
        match decomposition.row_owner(row) {
            Some(RowOwner::Core) => println!("  Row {}: core", row),
            Some(RowOwner::Block(id)) => println!("  Row {}: block {}", row, id),
            None => println!("  Row {}: unassigned", row),
        }
    }

    println!("\nBlocks:");
    for block in &decomposition.blocks {
        println!(
            "  {}: {} rows, columns {:?}, upper bounds {:?}",
            block.model.name(),
            block.rows.len(),
            block.active_columns,
            block.model.col_ub()
        );
    }

    let stats = &decomposition.stats;
    println!("\nStatistics:");
    println!("  Coupling rows: {}", stats.num_coupling_rows);
    println!("  Coupling nnz fraction: {:.3}", stats.coupling_nnz_fraction());
    println!("  Integer coupling sparsity: {:.3}", stats.integer_coupling_sparsity());
    println!("  Master-only fraction: {:.3}", stats.master_only_fraction());
    println!("  Relaxed rows: {:.1}%", stats.relaxed_row_percentage());
}
