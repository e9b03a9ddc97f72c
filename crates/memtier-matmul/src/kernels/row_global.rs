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

/// Preferred number of units per group.
const PREFERRED_ROW_GROUP: u32 = 64;

/// Launched over `M` units; unit `i` computes the whole row `C[i, :]`.
pub struct RowGlobalMatmul {
    lhs: GlobalRead,
    rhs: GlobalRead,
    out: GlobalWrite,
    shared_size: usize,
    right_width: usize,
}

impl Kernel for RowGlobalMatmul {
    fn name(&self) -> &'static str {
        "row_global_matmul"
    }

    fn settings(&self) -> KernelSettings {
        KernelSettings::independent()
    }

    fn execute(&self, unit: &Unit<'_>) -> Result<(), KernelError> {
        let i = unit.absolute_pos_x() as usize;
        let (k_size, n) = (self.shared_size, self.right_width);

        for j in 0..n {
            let mut sum = 0.0f32;
            for k in 0..k_size {
                sum += self.lhs.load(i * k_size + k) * self.rhs.load(k * n + j);
            }
            self.out.store(i * n + j, sum);
        }

        Ok(())
    }
}

/// Matrix multiplication with one unit per output row.
pub fn launch(
    client: &ComputeClient,
    lhs: &MatrixHandle,
    rhs: &MatrixHandle,
    out: &MatrixHandle,
    selection: &Selection,
) -> Result<(), MatmulSetupError> {
    let problem = MatmulProblem::from_handles(lhs, rhs, out)?;
    let (grid, group_dim) = row_launch_shape(&problem, selection)?;
    let count = group_count(grid, group_dim)?;

    let kernel = RowGlobalMatmul {
        lhs: lhs.handle.binding_read(),
        rhs: rhs.handle.binding_read(),
        out: out.handle.binding_write(),
        shared_size: problem.k,
        right_width: problem.n,
    };

    client.launch(Arc::new(kernel), count, group_dim)?;
    Ok(())
}

/// Grid and group shape of the kernels running one unit per output row.
pub(crate) fn row_launch_shape(
    problem: &MatmulProblem,
    selection: &Selection,
) -> Result<(GridDim, GroupDim), MatmulSetupError> {
    let grid = GridDim::from_extents(problem.m, 1)?;
    let group_dim = selection.group_dim(|| {
        GroupDim::new_1d(largest_divisor_up_to(grid.x, PREFERRED_ROW_GROUP))
    });

    Ok((grid, group_dim))
}
