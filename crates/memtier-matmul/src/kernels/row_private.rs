//! Row-private matmul kernel implementation
//!
//! Each unit copies its row of the left operand into private memory once, then reuses it for
//! every output column. The right operand is still read from global memory.
use std::sync::Arc;

use memtier_runtime::{
    ComputeClient,
    error::KernelError,
    kernel::{Kernel, KernelSettings},
    memory::{GlobalRead, GlobalWrite, PrivateArray},
    unit::Unit,
};

use crate::components::{MatmulProblem, MatmulSetupError, MatrixHandle};

use super::{Selection, group_count, row_global::row_launch_shape};

/// Number of elements of the private row cache, the largest supported shared dimension.
pub const ROW_PRIVATE_CAPACITY: usize = 1024;

/// Launched over `M` units; unit `i` computes `C[i, :]` from a private copy of `A[i, :]`.
pub struct RowPrivateMatmul {
    lhs: GlobalRead,
    rhs: GlobalRead,
    out: GlobalWrite,
    shared_size: usize,
    right_width: usize,
}

impl Kernel for RowPrivateMatmul {
    fn name(&self) -> &'static str {
        "row_private_matmul"
    }

    fn settings(&self) -> KernelSettings {
        KernelSettings::independent()
    }

    fn execute(&self, unit: &Unit<'_>) -> Result<(), KernelError> {
        let i = unit.absolute_pos_x() as usize;
        let (k_size, n) = (self.shared_size, self.right_width);

        let mut row = PrivateArray::<ROW_PRIVATE_CAPACITY>::new(k_size)?;
        for k in 0..k_size {
            row[k] = self.lhs.load(i * k_size + k);
        }

        for j in 0..n {
            let mut sum = 0.0f32;
            for k in 0..k_size {
                sum += row[k] * self.rhs.load(k * n + j);
            }
            self.out.store(i * n + j, sum);
        }

        Ok(())
    }
}

/// Matrix multiplication with one unit per output row and a private row cache.
///
/// Fails with [MatmulSetupError::CapacityExceeded] when `K` exceeds [ROW_PRIVATE_CAPACITY].
pub fn launch(
    client: &ComputeClient,
    lhs: &MatrixHandle,
    rhs: &MatrixHandle,
    out: &MatrixHandle,
    selection: &Selection,
) -> Result<(), MatmulSetupError> {
    let problem = MatmulProblem::from_handles(lhs, rhs, out)?;
    check_capacity(&problem, ROW_PRIVATE_CAPACITY)?;
    let (grid, group_dim) = row_launch_shape(&problem, selection)?;
    let count = group_count(grid, group_dim)?;

    let kernel = RowPrivateMatmul {
        lhs: lhs.handle.binding_read(),
        rhs: rhs.handle.binding_read(),
        out: out.handle.binding_write(),
        shared_size: problem.k,
        right_width: problem.n,
    };

    client.launch(Arc::new(kernel), count, group_dim)?;
    Ok(())
}

pub(crate) fn check_capacity(
    problem: &MatmulProblem,
    capacity: usize,
) -> Result<(), MatmulSetupError> {
    match problem.k > capacity {
        true => Err(MatmulSetupError::CapacityExceeded {
            shared_size: problem.k,
            capacity,
        }),
        false => Ok(()),
    }
}
