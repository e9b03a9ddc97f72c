pub use memtier_runtime::*;

#[cfg(feature = "matmul")]
pub use memtier_matmul as matmul;
