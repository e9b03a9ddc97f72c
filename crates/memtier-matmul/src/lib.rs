#![warn(missing_docs)]

//! Matrix multiplication kernels for the memtier runtime.
//!
//! Every kernel computes `C = A × B` for row-major `f32` matrices with the same summation order,
//! so their results are bit-identical. They differ in the memory tier each operand is read from.

#[macro_use]
extern crate derive_new;

/// Problem description, matrices and errors.
pub mod components;
/// Matmul kernels, one module per memory layout.
pub mod kernels;

mod base;
mod benchmark;

pub use base::*;
pub use benchmark::*;

#[cfg(test)]
mod tests;
