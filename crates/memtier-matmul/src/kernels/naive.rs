//! Naive matmul kernel implementation
//!
//! Each unit computes a single element of the output matrix, reading every term of its dot
//! product from global memory. It's the baseline every other kernel is checked against.
use std::sync::Arc;

use memtier_runtime::{
    ComputeClient,
    error::KernelError,
    kernel::{Kernel, KernelSettings},
    memory::{GlobalRead, GlobalWrite},
    topology::{GridDim, GroupDim, largest_divisor_up_to},
    unit::Unit,
};

use crate::components::{MatmulProblem, MatmulSetupError, MatrixHandle};

use super::{Selection, group_count};

/// Preferred number of units along each axis of a group.
const PREFERRED_GROUP_AXIS: u32 = 16;

/// Launched over an `M × N` grid; unit `(i, j)` computes `C[i, j]`.
///
/// The output width isn't a scalar of the kernel: it's the extent of the grid along y.
pub struct NaiveMatmul {
    lhs: GlobalRead,
    rhs: GlobalRead,
    out: GlobalWrite,
    shared_size: usize,
}

impl Kernel for NaiveMatmul {
    fn name(&self) -> &'static str {
        "naive_matmul"
    }

    fn settings(&self) -> KernelSettings {
        KernelSettings::independent()
    }

    fn execute(&self, unit: &Unit<'_>) -> Result<(), KernelError> {
        let i = unit.absolute_pos_x() as usize;
        let j = unit.absolute_pos_y() as usize;
        let n = unit.grid_dim().y as usize;
        let k_size = self.shared_size;

        let mut sum = 0.0f32;
        for k in 0..k_size {
            sum += self.lhs.load(i * k_size + k) * self.rhs.load(k * n + j);
        }

        self.out.store(i * n + j, sum);
        Ok(())
    }
}

/// Matrix multiplication with one unit per output element.
pub fn launch(
    client: &ComputeClient,
    lhs: &MatrixHandle,
    rhs: &MatrixHandle,
    out: &MatrixHandle,
    selection: &Selection,
) -> Result<(), MatmulSetupError> {
    let problem = MatmulProblem::from_handles(lhs, rhs, out)?;
    let grid = GridDim::from_extents(problem.m, problem.n)?;
    let group_dim = selection.group_dim(|| {
        GroupDim::new_2d(
            largest_divisor_up_to(grid.x, PREFERRED_GROUP_AXIS),
            largest_divisor_up_to(grid.y, PREFERRED_GROUP_AXIS),
        )
    });
    let count = group_count(grid, group_dim)?;

    let kernel = NaiveMatmul {
        lhs: lhs.handle.binding_read(),
        rhs: rhs.handle.binding_read(),
        out: out.handle.binding_write(),
        shared_size: problem.k,
    };

    client.launch(Arc::new(kernel), count, group_dim)?;
    Ok(())
}
