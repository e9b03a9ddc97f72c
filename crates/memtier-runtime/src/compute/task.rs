use alloc::sync::Arc;
use alloc::vec::Vec;

use crate::{
    error::KernelError,
    kernel::{Kernel, KernelSettings},
    memory::SharedMemory,
    topology::{GroupCount, GroupDim},
    unit::Unit,
};

use super::barrier::{Departure, GroupBarrier};

/// How a task ended, reported back to the scheduler.
#[derive(Debug, Clone, PartialEq)]
pub enum TaskOutcome {
    /// Every group of the task completed.
    Completed,
    /// A unit returned an error.
    Failed(KernelError),
    /// A unit panicked.
    Panicked,
}

/// A batch of groups of a single launch, executed by one worker.
pub struct GroupTask {
    pub kernel: Arc<dyn Kernel>,
    pub settings: KernelSettings,
    pub group_dim: GroupDim,
    pub group_count: GroupCount,
    pub groups: Vec<(u32, u32)>,
}

impl GroupTask {
    pub fn compute(self) -> Result<(), KernelError> {
        for group_pos in self.groups.iter() {
            self.compute_group(*group_pos)?;
        }

        Ok(())
    }

    fn compute_group(&self, group_pos: (u32, u32)) -> Result<(), KernelError> {
        let shared = match self.settings.shared_memory_len {
            0 => None,
            len => Some(SharedMemory::new(len)),
        };

        let mut unit_pos_vec = Vec::with_capacity(self.group_dim.num_elems() as usize);
        for unit_pos_y in 0..self.group_dim.y {
            for unit_pos_x in 0..self.group_dim.x {
                unit_pos_vec.push((unit_pos_x, unit_pos_y));
            }
        }

        if !self.settings.synchronizes {
            for unit_pos in unit_pos_vec {
                let unit = Unit::new(
                    unit_pos,
                    group_pos,
                    self.group_dim,
                    self.group_count,
                    shared.as_ref(),
                    None,
                );
                self.kernel.execute(&unit)?;
            }

            return Ok(());
        }

        let barrier = GroupBarrier::new(unit_pos_vec.len());
        let kernel = self.kernel.as_ref();
        let shared = shared.as_ref();
        let barrier = &barrier;

        std::thread::scope(|scope| {
            let handles = unit_pos_vec
                .into_iter()
                .map(|unit_pos| {
                    scope.spawn(move || {
                        let _departure = Departure(barrier);
                        let unit = Unit::new(
                            unit_pos,
                            group_pos,
                            self.group_dim,
                            self.group_count,
                            shared,
                            Some(barrier),
                        );
                        kernel.execute(&unit)
                    })
                })
                .collect::<Vec<_>>();

            let mut panic = None;
            let mut result = Ok(());
            for handle in handles {
                match handle.join() {
                    Ok(Ok(())) => {}
                    Ok(Err(err)) => {
                        // Units released by an aborted barrier only echo the first failure.
                        let replaces = match &result {
                            Ok(()) => true,
                            Err(KernelError::GroupAborted) => err != KernelError::GroupAborted,
                            Err(_) => false,
                        };
                        if replaces {
                            result = Err(err);
                        }
                    }
                    Err(payload) => {
                        panic.get_or_insert(payload);
                    }
                }
            }

            if let Some(payload) = panic {
                std::panic::resume_unwind(payload);
            }
            result
        })
    }
}
