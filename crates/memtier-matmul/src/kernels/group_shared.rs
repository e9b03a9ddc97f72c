//! Row-private + group-shared matmul kernel implementation
//!
//! Each unit caches its row of the left operand in private memory. For every output column,
//! the units of a group cooperatively stage that column of the right operand into group-shared
//! memory, then each unit reads the whole column from there.
//!
//! Two barriers guard the shared column:
//! - after staging, so no unit reads a slot another unit hasn't written yet;
//! - after computing, so no unit overwrites the column while another one still reads it.
use std::sync::Arc;

use memtier_runtime::{
    ComputeClient,
    error::KernelError,
    kernel::{Kernel, KernelSettings},
    memory::{GlobalRead, GlobalWrite, PrivateArray},
    unit::Unit,
};

use crate::components::{MatmulProblem, MatmulSetupError, MatrixHandle};

use super::{Selection, group_count, row_global::row_launch_shape, row_private::check_capacity};

/// Number of elements of the private row cache, the largest supported shared dimension.
pub const GROUP_SHARED_CAPACITY: usize = 4096;

/// The synchronization points of [GroupSharedMatmul] around every staged column.
pub trait ColumnSync: Send + Sync + 'static {
    /// Called once the unit has written its share of the column.
    fn after_staging(&self, unit: &Unit<'_>) -> Result<(), KernelError>;

    /// Called once the unit has written its output element for the column.
    fn after_compute(&self, unit: &Unit<'_>) -> Result<(), KernelError>;
}

/// Waits on the group barrier at both points.
#[derive(Debug, Clone, Copy, Default)]
pub struct BarrierSync;

impl ColumnSync for BarrierSync {
    fn after_staging(&self, unit: &Unit<'_>) -> Result<(), KernelError> {
        unit.sync_group()
    }

    fn after_compute(&self, unit: &Unit<'_>) -> Result<(), KernelError> {
        unit.sync_group()
    }
}

/// Launched over `M` units in groups; unit `i` computes `C[i, :]`.
pub struct GroupSharedMatmul<S: ColumnSync = BarrierSync> {
    lhs: GlobalRead,
    rhs: GlobalRead,
    out: GlobalWrite,
    shared_size: usize,
    right_width: usize,
    sync: S,
}

impl<S: ColumnSync> Kernel for GroupSharedMatmul<S> {
    fn name(&self) -> &'static str {
        "group_shared_matmul"
    }

    fn settings(&self) -> KernelSettings {
        KernelSettings::cooperative(self.shared_size)
    }

    fn execute(&self, unit: &Unit<'_>) -> Result<(), KernelError> {
        let i = unit.absolute_pos_x() as usize;
        let (k_size, n) = (self.shared_size, self.right_width);
        let local = unit.unit_pos() as usize;
        let group_size = unit.group_size() as usize;
        let column = unit.shared()?;

        let mut row = PrivateArray::<GROUP_SHARED_CAPACITY>::new(k_size)?;
        for k in 0..k_size {
            row[k] = self.lhs.load(i * k_size + k);
        }

        for j in 0..n {
            for k in (local..k_size).step_by(group_size) {
                column.store(k, self.rhs.load(k * n + j));
            }
            self.sync.after_staging(unit)?;

            let mut sum = 0.0f32;
            for k in 0..k_size {
                sum += row[k] * column.load(k);
            }
            self.out.store(i * n + j, sum);

            self.sync.after_compute(unit)?;
        }

        Ok(())
    }
}

/// Matrix multiplication with a private row cache and a group-shared column.
///
/// Fails with [MatmulSetupError::CapacityExceeded] when `K` exceeds [GROUP_SHARED_CAPACITY], and
/// with [MatmulSetupError::InvalidLaunchConfiguration] when `M` isn't a multiple of the group
/// size.
pub fn launch(
    client: &ComputeClient,
    lhs: &MatrixHandle,
    rhs: &MatrixHandle,
    out: &MatrixHandle,
    selection: &Selection,
) -> Result<(), MatmulSetupError> {
    launch_with_sync(client, lhs, rhs, out, selection, BarrierSync)
}

/// Same as [launch], with custom synchronization points.
pub fn launch_with_sync<S: ColumnSync>(
    client: &ComputeClient,
    lhs: &MatrixHandle,
    rhs: &MatrixHandle,
    out: &MatrixHandle,
    selection: &Selection,
    sync: S,
) -> Result<(), MatmulSetupError> {
    let problem = MatmulProblem::from_handles(lhs, rhs, out)?;
    check_capacity(&problem, GROUP_SHARED_CAPACITY)?;
    let (grid, group_dim) = row_launch_shape(&problem, selection)?;
    let count = group_count(grid, group_dim)?;

    let kernel = GroupSharedMatmul {
        lhs: lhs.handle.binding_read(),
        rhs: rhs.handle.binding_read(),
        out: out.handle.binding_write(),
        shared_size: problem.k,
        right_width: problem.n,
        sync,
    };

    client.launch(Arc::new(kernel), count, group_dim)?;
    Ok(())
}
