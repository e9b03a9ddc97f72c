use memtier_runtime::topology::{GridDim, GroupCount, GroupDim};

use crate::components::MatmulSetupError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
/// How the group shape of a launch is chosen.
pub enum Selection {
    /// Use this group shape, failing if it doesn't tile the grid.
    Forced(GroupDim),
    /// Let the kernel pick a shape that tiles the grid.
    #[default]
    Inferred,
}

impl Selection {
    /// The forced shape, or the one computed by `infer`.
    pub(crate) fn group_dim(&self, infer: impl FnOnce() -> GroupDim) -> GroupDim {
        match self {
            Selection::Forced(dim) => *dim,
            Selection::Inferred => infer(),
        }
    }
}

/// The group count covering `grid` exactly with groups of `dim`.
pub(crate) fn group_count(grid: GridDim, dim: GroupDim) -> Result<GroupCount, MatmulSetupError> {
    Ok(GroupCount::from_grid(grid, dim)?)
}
