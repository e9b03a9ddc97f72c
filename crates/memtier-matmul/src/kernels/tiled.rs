//! Tiled matmul kernel implementation
//!
//! Groups are `T × T` squares computing a `T × T` block of the output. For every step of `T`
//! along the shared dimension, the group stages a tile of each operand in group-shared memory,
//! waits, accumulates, and waits again before the next tiles overwrite them.
//!
//! The last step along `K` may cover fewer than `T` terms; the inner loop stops at `K` instead
//! of summing padding, which keeps the summation order of the naive kernel.
use std::sync::Arc;

use memtier_runtime::{
    ComputeClient,
    error::{InvalidLaunchConfig, KernelError},
    kernel::{Kernel, KernelSettings},
    memory::{GlobalRead, GlobalWrite},
    topology::{GridDim, GroupDim},
    unit::Unit,
};

use crate::components::{MatmulProblem, MatmulSetupError, MatrixHandle};

use super::{Selection, group_count};

/// Tile sizes tried when inferring the group shape, largest first.
const TILE_CANDIDATES: [u32; 5] = [16, 8, 4, 2, 1];

/// Launched over an `M × N` grid of `T × T` groups; unit `(i, j)` computes `C[i, j]`.
pub struct TiledMatmul {
    lhs: GlobalRead,
    rhs: GlobalRead,
    out: GlobalWrite,
    shared_size: usize,
    right_width: usize,
    tile: usize,
}

impl Kernel for TiledMatmul {
    fn name(&self) -> &'static str {
        "tiled_matmul"
    }

    fn settings(&self) -> KernelSettings {
        KernelSettings::cooperative(2 * self.tile * self.tile)
    }

    fn execute(&self, unit: &Unit<'_>) -> Result<(), KernelError> {
        let tile = self.tile;
        let (k_size, n) = (self.shared_size, self.right_width);
        let (row, col) = (unit.unit_pos_x() as usize, unit.unit_pos_y() as usize);
        let i = unit.absolute_pos_x() as usize;
        let j = unit.absolute_pos_y() as usize;

        let shared = unit.shared()?;
        let lhs_tile = 0;
        let rhs_tile = tile * tile;

        let mut sum = 0.0f32;
        for step in 0..k_size.div_ceil(tile) {
            let offset = step * tile;

            // Unit (row, col) stages A[i, offset + col] and B[offset + row, j].
            if offset + col < k_size {
                shared.store(
                    lhs_tile + row * tile + col,
                    self.lhs.load(i * k_size + offset + col),
                );
            }
            if offset + row < k_size {
                shared.store(
                    rhs_tile + row * tile + col,
                    self.rhs.load((offset + row) * n + j),
                );
            }
            unit.sync_group()?;

            let terms = usize::min(tile, k_size - offset);
            for k in 0..terms {
                sum += shared.load(lhs_tile + row * tile + k)
                    * shared.load(rhs_tile + k * tile + col);
            }
            unit.sync_group()?;
        }

        self.out.store(i * n + j, sum);
        Ok(())
    }
}

/// Matrix multiplication with square groups staging tiles of both operands.
///
/// A forced group shape must be square, and `M` and `N` must both be multiples of its side.
pub fn launch(
    client: &ComputeClient,
    lhs: &MatrixHandle,
    rhs: &MatrixHandle,
    out: &MatrixHandle,
    selection: &Selection,
) -> Result<(), MatmulSetupError> {
    let problem = MatmulProblem::from_handles(lhs, rhs, out)?;
    let grid = GridDim::from_extents(problem.m, problem.n)?;
    let group_dim = selection.group_dim(|| infer_tile(grid));

    if group_dim.x != group_dim.y {
        return Err(InvalidLaunchConfig::UnsupportedGroup {
            group: group_dim,
            reason: "tiles must be square".into(),
        }
        .into());
    }
    let count = group_count(grid, group_dim)?;

    let kernel = TiledMatmul {
        lhs: lhs.handle.binding_read(),
        rhs: rhs.handle.binding_read(),
        out: out.handle.binding_write(),
        shared_size: problem.k,
        right_width: problem.n,
        tile: group_dim.x as usize,
    };

    client.launch(Arc::new(kernel), count, group_dim)?;
    Ok(())
}

fn infer_tile(grid: GridDim) -> GroupDim {
    let tile = TILE_CANDIDATES
        .into_iter()
        .find(|tile| grid.x % tile == 0 && grid.y % tile == 0)
        .unwrap_or(1);

    GroupDim::new_2d(tile, tile)
}
