mod dense;
mod sparse_lu;

pub use dense::DenseLu;
pub use sparse_lu::SparseLu;
