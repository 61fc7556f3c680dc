//! Utilities for converting between our matrix format and `sprs`

use crate::error::DecompResult;
use crate::matrix::SparseMatrixCSR;
use sprs::CsMat;
use num_traits::Num;

/// Converts our CSR matrix format to sprs CsMat format
///
/// sprs requires sorted column indices within each row, so rows are sorted
/// on the way out. The source matrix is left untouched.
pub fn to_sprs_csr<T>(matrix: &SparseMatrixCSR<T>) -> CsMat<T>
where
    T: Copy + Num + Default,
{
    let mut col_idx = Vec::with_capacity(matrix.nnz());
    let mut values = Vec::with_capacity(matrix.nnz());
    let mut row: Vec<(usize, T)> = Vec::new();

    for i in 0..matrix.n_rows {
        row.clear();
        row.extend(matrix.row_iter(i).map(|(col, &val)| (col, val)));
        row.sort_unstable_by_key(|&(col, _)| col);
        for &(col, val) in &row {
            col_idx.push(col);
            values.push(val);
        }
    }

    CsMat::new(
        (matrix.n_rows, matrix.n_cols),
        matrix.row_ptr.clone(),
        col_idx,
        values,
    )
}

/// Converts sprs CsMat (CSR or CSC storage) to our SparseMatrixCSR format
pub fn from_sprs_csr<T>(matrix: CsMat<T>) -> DecompResult<SparseMatrixCSR<T>>
where
    T: Copy + Num + Default,
{
    // Ensure matrix is in CSR format
    let matrix = if matrix.is_csr() {
        matrix
    } else {
        matrix.to_csr()
    };

    let shape = matrix.shape();
    let (indptr, indices, data) = matrix.into_raw_storage();

    SparseMatrixCSR::try_new(shape.0, shape.1, indptr, indices, data)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csr_roundtrip() {
        let original = SparseMatrixCSR::new(
            3, 3,
            vec![0, 2, 3, 5],
            vec![1, 0, 1, 0, 2],
            vec![2.0f64, 1.0, 3.0, 4.0, 5.0],
        );

        let sprs_mat = to_sprs_csr(&original);
        let roundtrip = from_sprs_csr(sprs_mat).unwrap();

        assert_eq!(roundtrip.n_rows, original.n_rows);
        assert_eq!(roundtrip.n_cols, original.n_cols);
        assert_eq!(roundtrip.row_ptr, original.row_ptr);

        // Row 0 comes back sorted by column
        assert_eq!(roundtrip.row_cols(0), &[0, 1]);
        assert_eq!(roundtrip.row_values(0), &[1.0, 2.0]);
    }

    #[test]
    fn test_csc_input_is_converted() {
        //    [1 0]
        //    [2 3]
        let csc = CsMat::new_csc((2, 2), vec![0, 2, 3], vec![0, 1, 1], vec![1.0f64, 2.0, 3.0]);
        let csr = from_sprs_csr(csc).unwrap();

        assert_eq!(csr.row_ptr, vec![0, 1, 3]);
        assert_eq!(csr.row_cols(1), &[0, 1]);
        assert_eq!(csr.row_values(1), &[2.0, 3.0]);
    }
}
