use memtier_runtime::{
    error::KernelError,
    kernel::{Kernel, KernelSettings},
    memory::{GlobalRead, GlobalWrite, PrivateArray},
    unit::Unit,
};

/// Writes the linear absolute position of every unit at that position.
pub struct AbsolutePosition {
    pub out: GlobalWrite,
}

impl Kernel for AbsolutePosition {
    fn settings(&self) -> KernelSettings {
        KernelSettings::independent()
    }

    fn execute(&self, unit: &Unit<'_>) -> Result<(), KernelError> {
        let pos = unit.absolute_pos() as usize;
        self.out.store(pos, pos as f32);
        Ok(())
    }
}

pub struct ElementwiseAddition {
    pub lhs: GlobalRead,
    pub rhs: GlobalRead,
    pub out: GlobalWrite,
}

impl Kernel for ElementwiseAddition {
    fn settings(&self) -> KernelSettings {
        KernelSettings::independent()
    }

    fn execute(&self, unit: &Unit<'_>) -> Result<(), KernelError> {
        let pos = unit.absolute_pos() as usize;
        self.out.store(pos, self.lhs.load(pos) + self.rhs.load(pos));
        Ok(())
    }
}

/// Reverses the values held by every group, going through shared memory.
pub struct ReverseInGroup {
    pub input: GlobalRead,
    pub out: GlobalWrite,
    pub group_size: usize,
}

impl Kernel for ReverseInGroup {
    fn settings(&self) -> KernelSettings {
        KernelSettings::cooperative(self.group_size)
    }

    fn execute(&self, unit: &Unit<'_>) -> Result<(), KernelError> {
        let shared = unit.shared()?;
        let local = unit.unit_pos() as usize;
        let pos = unit.absolute_pos() as usize;

        shared.store(local, self.input.load(pos));
        unit.sync_group()?;

        let size = unit.group_size() as usize;
        self.out.store(pos, shared.load(size - 1 - local));
        Ok(())
    }
}

/// Asks every unit for a private array bigger than its capacity.
pub struct OversizedPrivateArray;

impl Kernel for OversizedPrivateArray {
    fn settings(&self) -> KernelSettings {
        KernelSettings::independent()
    }

    fn execute(&self, _unit: &Unit<'_>) -> Result<(), KernelError> {
        let _row = PrivateArray::<4>::new(8)?;
        Ok(())
    }
}

/// Synchronizes without having declared a barrier.
pub struct UndeclaredSync;

impl Kernel for UndeclaredSync {
    fn settings(&self) -> KernelSettings {
        KernelSettings::independent()
    }

    fn execute(&self, unit: &Unit<'_>) -> Result<(), KernelError> {
        unit.sync_group()
    }
}

/// Declares more shared memory than any device offers.
pub struct GreedySharedMemory;

impl Kernel for GreedySharedMemory {
    fn settings(&self) -> KernelSettings {
        KernelSettings::cooperative(1 << 20)
    }

    fn execute(&self, _unit: &Unit<'_>) -> Result<(), KernelError> {
        Ok(())
    }
}

pub struct Panicking;

impl Kernel for Panicking {
    fn settings(&self) -> KernelSettings {
        KernelSettings::independent()
    }

    fn execute(&self, unit: &Unit<'_>) -> Result<(), KernelError> {
        if unit.absolute_pos() == 3 {
            panic!("unit 3 gave up");
        }
        Ok(())
    }
}

/// The first unit of every group panics while the others wait on the barrier.
pub struct PanickingBeforeSync;

impl Kernel for PanickingBeforeSync {
    fn settings(&self) -> KernelSettings {
        KernelSettings::cooperative(1)
    }

    fn execute(&self, unit: &Unit<'_>) -> Result<(), KernelError> {
        if unit.unit_pos() == 0 {
            panic!("unit 0 gave up before the barrier");
        }
        unit.sync_group()
    }
}

/// The last unit of every group fails while the others wait on the barrier.
pub struct FailingBeforeSync;

impl Kernel for FailingBeforeSync {
    fn settings(&self) -> KernelSettings {
        KernelSettings::cooperative(1)
    }

    fn execute(&self, unit: &Unit<'_>) -> Result<(), KernelError> {
        if unit.unit_pos() + 1 == unit.group_size() {
            let _row = PrivateArray::<4>::new(8)?;
        }
        unit.sync_group()
    }
}
