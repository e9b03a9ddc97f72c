#![warn(missing_docs)]

//! Memtier runtime crate: an emulated SPMD accelerator executing kernels over groups of units
//! with global, group-shared and private memory tiers.

extern crate alloc;

#[macro_use]
extern crate derive_new;

mod compute;
mod properties;

/// Benchmark module.
pub mod benchmark;
/// Compute client module.
pub mod client;
/// Runtime configuration module.
pub mod config;
/// Runtime error module.
pub mod error;
/// Kernel definition module.
pub mod kernel;
/// Memory tiers module.
pub mod memory;
/// Launch topology module.
pub mod topology;
/// Execution unit module.
pub mod unit;

pub use client::ComputeClient;
pub use properties::*;
