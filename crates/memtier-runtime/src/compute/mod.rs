mod barrier;
mod scheduler;
mod task;
mod worker;

pub(crate) use barrier::GroupBarrier;
pub(crate) use scheduler::Scheduler;
