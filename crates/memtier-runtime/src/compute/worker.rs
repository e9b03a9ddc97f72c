use std::panic::AssertUnwindSafe;
use std::sync::mpsc;
use std::thread;

use super::task::{GroupTask, TaskOutcome};

struct Message {
    task: GroupTask,
    reply: mpsc::Sender<TaskOutcome>,
}

/// A long-lived thread executing the group tasks it receives, in order.
#[derive(Debug)]
pub struct Worker {
    // TODO: A work-stealing deque would balance uneven groups better than a dedicated channel per worker.
    tx: mpsc::Sender<Message>,
}

impl Worker {
    pub fn new(thread_id: usize) -> Self {
        let (tx, rx) = mpsc::channel();
        let inner_worker = InnerWorker { thread_id, rx };
        thread::Builder::new()
            .name(format!("memtier-worker-{thread_id}"))
            .spawn(move || inner_worker.work())
            .map(|_| ())
            .unwrap_or_else(|err| log::error!("Can't spawn worker {thread_id}: {err}"));

        Self { tx }
    }

    /// Queues a task; returns `false` when the worker thread is gone.
    pub fn send_task(&self, task: GroupTask, reply: mpsc::Sender<TaskOutcome>) -> bool {
        self.tx.send(Message { task, reply }).is_ok()
    }
}

struct InnerWorker {
    thread_id: usize,
    rx: mpsc::Receiver<Message>,
}

impl InnerWorker {
    fn work(self) {
        log::trace!("Worker {} started", self.thread_id);
        for Message { task, reply } in self.rx.iter() {
            let outcome = match std::panic::catch_unwind(AssertUnwindSafe(|| task.compute())) {
                Ok(Ok(())) => TaskOutcome::Completed,
                Ok(Err(err)) => TaskOutcome::Failed(err),
                Err(_) => TaskOutcome::Panicked,
            };
            // The scheduler may have given up on the launch already.
            let _ = reply.send(outcome);
        }
        log::trace!("Worker {} stopped", self.thread_id);
    }
}
