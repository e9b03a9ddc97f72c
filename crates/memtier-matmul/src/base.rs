use memtier_runtime::ComputeClient;

use crate::{
    components::{MatmulProblem, MatmulSetupError, Matrix, MatrixHandle},
    kernels::{Selection, group_shared, naive, row_global, row_private, tiled},
};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
/// The matmul kernel to launch
///
/// Every kernel takes a selection that either forces the group shape or lets it be inferred
/// from the problem.
pub enum Strategy {
    /// One unit per output element, everything read from global memory.
    Naive(Selection),
    /// One unit per output row, everything read from global memory.
    RowGlobal(Selection),
    /// One unit per output row with a private copy of its left row.
    RowPrivate(Selection),
    /// Private left row and a group-shared right column.
    GroupShared(Selection),
    /// Square groups staging tiles of both operands.
    Tiled(Selection),
    #[default]
    /// Tries GroupShared, then RowPrivate, then Naive, using the first whose setup succeeds
    Auto,
}

impl Strategy {
    /// Every concrete strategy with an inferred group shape.
    pub fn all() -> [Strategy; 5] {
        [
            Strategy::Naive(Selection::Inferred),
            Strategy::RowGlobal(Selection::Inferred),
            Strategy::RowPrivate(Selection::Inferred),
            Strategy::GroupShared(Selection::Inferred),
            Strategy::Tiled(Selection::Inferred),
        ]
    }
}

/// Launches `strategy` to compute `out = lhs × rhs` on matrices already on the device.
pub fn launch(
    client: &ComputeClient,
    strategy: &Strategy,
    lhs: &MatrixHandle,
    rhs: &MatrixHandle,
    out: &MatrixHandle,
) -> Result<(), MatmulSetupError> {
    match strategy {
        Strategy::Naive(selection) => naive::launch(client, lhs, rhs, out, selection),
        Strategy::RowGlobal(selection) => row_global::launch(client, lhs, rhs, out, selection),
        Strategy::RowPrivate(selection) => row_private::launch(client, lhs, rhs, out, selection),
        Strategy::GroupShared(selection) => {
            group_shared::launch(client, lhs, rhs, out, selection)
        }
        Strategy::Tiled(selection) => tiled::launch(client, lhs, rhs, out, selection),
        Strategy::Auto => launch_auto(client, lhs, rhs, out).map(|_| ()),
    }
}

/// Launches the first concrete strategy whose setup succeeds and returns it.
pub(crate) fn launch_auto(
    client: &ComputeClient,
    lhs: &MatrixHandle,
    rhs: &MatrixHandle,
    out: &MatrixHandle,
) -> Result<Strategy, MatmulSetupError> {
    MatmulProblem::from_handles(lhs, rhs, out)?;

    let candidates = [
        Strategy::GroupShared(Selection::Inferred),
        Strategy::RowPrivate(Selection::Inferred),
    ];
    for candidate in candidates {
        match launch(client, &candidate, lhs, rhs, out) {
            Err(
                err @ (MatmulSetupError::CapacityExceeded { .. }
                | MatmulSetupError::InvalidLaunchConfiguration(_)),
            ) => {
                log::debug!("Skipping {candidate:?}: {err}");
            }
            result => return result.map(|_| candidate),
        }
    }

    naive::launch(client, lhs, rhs, out, &Selection::Inferred)?;
    Ok(Strategy::Naive(Selection::Inferred))
}

/// Uploads both operands, computes their product with `strategy` and reads it back.
pub fn matmul(
    client: &ComputeClient,
    strategy: &Strategy,
    lhs: &Matrix,
    rhs: &Matrix,
) -> Result<Matrix, MatmulSetupError> {
    let problem =
        MatmulProblem::from_shapes(lhs.shape(), rhs.shape(), (lhs.height(), rhs.width()))?;

    let lhs = MatrixHandle::upload(client, lhs);
    let rhs = MatrixHandle::upload(client, rhs);
    let out = MatrixHandle::empty(client, problem.m, problem.n);

    launch(client, strategy, &lhs, &rhs, &out)?;

    Ok(out.read(client))
}
