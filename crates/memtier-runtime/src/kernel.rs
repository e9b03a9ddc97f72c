use crate::{error::KernelError, unit::Unit};

/// Resources a kernel asks the runtime to provide for every group of a launch.
#[derive(new, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KernelSettings {
    /// Number of `f32` elements of group-shared memory allocated per group.
    pub shared_memory_len: usize,
    /// Whether units of a group synchronize through a barrier.
    ///
    /// Units of a kernel that doesn't synchronize may be executed one after the other on the
    /// same worker; units of a kernel that does each get their own thread.
    pub synchronizes: bool,
}

impl KernelSettings {
    /// Settings of a kernel that neither shares memory nor synchronizes.
    pub const fn independent() -> Self {
        Self {
            shared_memory_len: 0,
            synchronizes: false,
        }
    }

    /// Settings of a kernel sharing `shared_memory_len` elements through a barrier.
    pub const fn cooperative(shared_memory_len: usize) -> Self {
        Self {
            shared_memory_len,
            synchronizes: true,
        }
    }
}

/// A kernel body executed once per unit of the launch grid.
///
/// The kernel owns its bindings (global views and scalars); the runtime provides each unit
/// with its coordinates, its group's shared memory and its group's barrier.
pub trait Kernel: Send + Sync + 'static {
    /// Name of the kernel for debugging.
    fn name(&self) -> &'static str {
        core::any::type_name::<Self>()
    }

    /// Resources required by the kernel.
    fn settings(&self) -> KernelSettings;

    /// Executes the body for a single unit.
    ///
    /// In a synchronizing kernel, a unit that returns or panics early aborts its group: the
    /// other units get [KernelError::GroupAborted] from their next barrier.
    fn execute(&self, unit: &Unit<'_>) -> Result<(), KernelError>;
}
