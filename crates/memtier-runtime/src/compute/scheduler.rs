use alloc::string::ToString;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt::Debug;
use std::sync::mpsc;

use crate::{
    error::LaunchError,
    kernel::Kernel,
    topology::{GroupCount, GroupDim},
};

use super::{
    task::{GroupTask, TaskOutcome},
    worker::Worker,
};

/// Spreads the groups of a launch over a fixed pool of workers and waits for all of them.
pub struct Scheduler {
    workers: Vec<Worker>,
}

impl Debug for Scheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:?}", &self.workers)
    }
}

impl Scheduler {
    pub fn new(num_workers: usize) -> Self {
        let workers = (0..usize::max(num_workers, 1)).map(Worker::new).collect();

        Scheduler { workers }
    }

    pub fn num_workers(&self) -> usize {
        self.workers.len()
    }

    pub fn dispatch_execute(
        &self,
        kernel: Arc<dyn Kernel>,
        group_count: GroupCount,
        group_dim: GroupDim,
    ) -> Result<(), LaunchError> {
        let settings = kernel.settings();

        let mut group_pos_vec = Vec::with_capacity(group_count.num_elems() as usize);
        for group_pos_y in 0..group_count.y {
            for group_pos_x in 0..group_count.x {
                group_pos_vec.push((group_pos_x, group_pos_y));
            }
        }

        let (send, receive) = mpsc::channel();
        let mut msg_count = 0;
        let mut lost = false;
        for (slice, worker) in group_pos_vec
            .chunks(group_pos_vec.len().div_ceil(self.workers.len()))
            .zip(self.workers.iter())
        {
            let compute_task = GroupTask {
                kernel: kernel.clone(),
                settings,
                group_dim,
                group_count,
                groups: slice.to_vec(),
            };
            if worker.send_task(compute_task, send.clone()) {
                msg_count += 1;
            } else {
                lost = true;
            }
        }
        core::mem::drop(send);

        let mut result = match lost {
            true => Err(LaunchError::WorkerLost {
                kernel: kernel.name().to_string(),
            }),
            false => Ok(()),
        };

        for _ in 0..msg_count {
            let outcome = match receive.recv() {
                Ok(outcome) => outcome,
                Err(_) => {
                    return Err(LaunchError::WorkerLost {
                        kernel: kernel.name().to_string(),
                    });
                }
            };

            let error = match outcome {
                TaskOutcome::Completed => continue,
                TaskOutcome::Failed(error) => LaunchError::Kernel {
                    kernel: kernel.name().to_string(),
                    error,
                },
                TaskOutcome::Panicked => LaunchError::Panicked {
                    kernel: kernel.name().to_string(),
                },
            };

            if result.is_ok() {
                result = Err(error);
            }
        }

        result
    }
}
