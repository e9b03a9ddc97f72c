use alloc::string::String;
use thiserror::Error;

use crate::topology::{GridDim, GroupDim};

/// Kernel launch errors.
#[derive(Error, Clone, PartialEq)]
pub enum LaunchError {
    /// The launch configuration can't be honored by the runtime.
    #[error("An invalid launch configuration was submitted\nCaused by:\n  {0}")]
    InvalidConfiguration(#[from] InvalidLaunchConfig),

    /// A unit of the kernel reported an error while executing.
    #[error("A kernel error happened during execution of {kernel}\nCaused by:\n  {error}")]
    Kernel {
        /// The name of the failing kernel.
        kernel: String,
        /// The first error reported by a unit.
        error: KernelError,
    },

    /// A unit panicked while executing the kernel.
    #[error("A unit panicked during execution of {kernel}")]
    Panicked {
        /// The name of the failing kernel.
        kernel: String,
    },

    /// A worker stopped before reporting the completion of its groups.
    #[error("A worker stopped unexpectedly while executing {kernel}")]
    WorkerLost {
        /// The name of the kernel being executed.
        kernel: String,
    },
}

/// Reasons a launch configuration is rejected before any unit runs.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvalidLaunchConfig {
    /// A group axis is zero.
    #[error("Group dim {0:?} has an empty axis")]
    EmptyGroup(GroupDim),

    /// A grid axis is zero.
    #[error("Grid {0:?} has an empty axis")]
    EmptyGrid(GridDim),

    /// The grid can't be tiled exactly by the group shape.
    #[error("Grid {grid:?} is not a multiple of group dim {group:?}")]
    GridNotMultiple {
        /// Requested grid.
        grid: GridDim,
        /// Requested group shape.
        group: GroupDim,
    },

    /// An axis of the grid doesn't fit the device's coordinate range.
    #[error("Grid extent {extent} exceeds the maximum of {max} units per axis")]
    GridTooLarge {
        /// Requested number of units along the axis.
        extent: usize,
        /// Largest supported number of units along an axis.
        max: u32,
    },

    /// Too many units in a single group.
    #[error("Group dim {requested:?} has more than {max} units")]
    GroupTooLarge {
        /// Requested group shape.
        requested: GroupDim,
        /// Maximum units per group.
        max: u32,
    },

    /// Too much group-shared memory requested.
    #[error("Requested {requested} bytes of shared memory, maximum {max} bytes available")]
    SharedMemory {
        /// Value requested.
        requested: usize,
        /// Maximum value.
        max: usize,
    },

    /// The group shape doesn't fit the kernel's requirements.
    #[error("Group dim {group:?} is not supported: {reason}")]
    UnsupportedGroup {
        /// Requested group shape.
        group: GroupDim,
        /// Why the kernel refuses it.
        reason: String,
    },
}

/// Errors raised by a unit while executing a kernel body.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum KernelError {
    /// A private array was requested beyond its fixed capacity.
    #[error("{0}")]
    Capacity(#[from] CapacityError),

    /// `sync_group` was called in a kernel that didn't declare synchronization.
    #[error("Group synchronization requested by a kernel launched without a barrier")]
    SyncUnavailable,

    /// The kernel accessed group-shared memory without declaring any.
    #[error("Group-shared memory requested by a kernel launched without any")]
    SharedMemoryUnavailable,

    /// Another unit of the group left the kernel, so the barrier can never be completed.
    #[error("Group synchronization aborted: a unit of the group stopped before the barrier")]
    GroupAborted,
}

/// A fixed-capacity buffer was asked to hold more than it can.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Requested {requested} elements from a private array of capacity {capacity}")]
pub struct CapacityError {
    /// Requested number of elements.
    pub requested: usize,
    /// Fixed capacity of the array.
    pub capacity: usize,
}

impl core::fmt::Debug for LaunchError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_fmt(format_args!("{self}"))
    }
}
