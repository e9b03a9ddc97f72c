use crate::{
    compute::GroupBarrier,
    error::KernelError,
    memory::SharedMemory,
    topology::{GridDim, GroupCount, GroupDim},
};

/// Everything a single execution unit knows about where it runs.
///
/// Coordinates follow the usual SPMD conventions: the unit position is local to its group,
/// the group position indexes the group in the launch, and the absolute position is the
/// unit's coordinate in the whole grid.
pub struct Unit<'a> {
    unit_pos: (u32, u32),
    group_pos: (u32, u32),
    group_dim: GroupDim,
    group_count: GroupCount,
    shared: Option<&'a SharedMemory>,
    barrier: Option<&'a GroupBarrier>,
}

impl<'a> Unit<'a> {
    pub(crate) fn new(
        unit_pos: (u32, u32),
        group_pos: (u32, u32),
        group_dim: GroupDim,
        group_count: GroupCount,
        shared: Option<&'a SharedMemory>,
        barrier: Option<&'a GroupBarrier>,
    ) -> Self {
        Self {
            unit_pos,
            group_pos,
            group_dim,
            group_count,
            shared,
            barrier,
        }
    }

    /// Position of the unit in its group along x.
    pub fn unit_pos_x(&self) -> u32 {
        self.unit_pos.0
    }

    /// Position of the unit in its group along y.
    pub fn unit_pos_y(&self) -> u32 {
        self.unit_pos.1
    }

    /// Linear index of the unit in its group, `x + y * group_dim.x`.
    pub fn unit_pos(&self) -> u32 {
        self.unit_pos.0 + self.unit_pos.1 * self.group_dim.x
    }

    /// Shape of every group of the launch.
    pub fn group_dim(&self) -> GroupDim {
        self.group_dim
    }

    /// Number of units in a group.
    pub fn group_size(&self) -> u32 {
        self.group_dim.num_elems()
    }

    /// Number of groups of the launch.
    pub fn group_count(&self) -> GroupCount {
        self.group_count
    }

    /// Units of the whole launch along each axis.
    pub fn grid_dim(&self) -> GridDim {
        GridDim::spanned(self.group_count, self.group_dim)
    }

    /// Coordinate of the unit in the whole grid along x.
    pub fn absolute_pos_x(&self) -> u32 {
        self.group_pos.0 * self.group_dim.x + self.unit_pos.0
    }

    /// Coordinate of the unit in the whole grid along y.
    pub fn absolute_pos_y(&self) -> u32 {
        self.group_pos.1 * self.group_dim.y + self.unit_pos.1
    }

    /// Linear index of the unit in the whole grid, `x + y * grid_dim.x`.
    pub fn absolute_pos(&self) -> u32 {
        self.absolute_pos_x() + self.absolute_pos_y() * self.grid_dim().x
    }

    /// The memory region shared with every unit of the same group.
    pub fn shared(&self) -> Result<&'a SharedMemory, KernelError> {
        self.shared.ok_or(KernelError::SharedMemoryUnavailable)
    }

    /// Waits until every unit of the group reaches this point.
    ///
    /// Writes to shared memory made by any unit of the group before the barrier are visible
    /// to every unit of the group after it. Fails with [KernelError::GroupAborted] when another
    /// unit of the group returned or panicked before reaching it.
    pub fn sync_group(&self) -> Result<(), KernelError> {
        match self.barrier {
            Some(barrier) => barrier.wait(),
            None => Err(KernelError::SyncUnavailable),
        }
    }
}
