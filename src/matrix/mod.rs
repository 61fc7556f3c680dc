// Matrix data structures: row-major storage, the constraint matrix and index maps

pub mod constraint;
pub mod csr;
pub mod index_map;

pub use constraint::ConstraintMatrix;
pub use csr::SparseMatrixCSR;
pub use index_map::IndexMap;
