use std::sync::{Condvar, Mutex, MutexGuard, PoisonError};

use crate::error::KernelError;

/// A reusable barrier for the units of one group.
///
/// Once a unit leaves the kernel, no later barrier can be completed by the whole group, so
/// every unit waiting on it, or arriving at it afterwards, is released with
/// [KernelError::GroupAborted].
pub struct GroupBarrier {
    num_units: usize,
    state: Mutex<BarrierState>,
    released: Condvar,
}

#[derive(Default)]
struct BarrierState {
    arrived: usize,
    generation: u64,
    departed: usize,
}

impl GroupBarrier {
    pub fn new(num_units: usize) -> Self {
        Self {
            num_units,
            state: Mutex::new(BarrierState::default()),
            released: Condvar::new(),
        }
    }

    /// Blocks until every unit of the group arrives, or until one of them leaves the kernel.
    pub fn wait(&self) -> Result<(), KernelError> {
        let mut state = self.lock();
        if state.departed > 0 {
            return Err(KernelError::GroupAborted);
        }

        let generation = state.generation;
        state.arrived += 1;
        if state.arrived == self.num_units {
            state.arrived = 0;
            state.generation += 1;
            self.released.notify_all();
            return Ok(());
        }

        while state.generation == generation && state.departed == 0 {
            state = self
                .released
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }

        match state.generation == generation {
            true => Err(KernelError::GroupAborted),
            false => Ok(()),
        }
    }

    /// Marks a unit as done with the kernel, whatever the outcome.
    pub fn depart(&self) {
        self.lock().departed += 1;
        self.released.notify_all();
    }

    fn lock(&self) -> MutexGuard<'_, BarrierState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// Departs from the barrier when dropped, including while unwinding from a panic.
pub struct Departure<'a>(pub &'a GroupBarrier);

impl Drop for Departure<'_> {
    fn drop(&mut self) {
        self.0.depart();
    }
}
