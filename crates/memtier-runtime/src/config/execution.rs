use serde::{Deserialize, Serialize};

/// Resources of the emulated device.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ExecutionConfig {
    /// Number of worker threads executing groups; `None` uses the available parallelism.
    #[serde(default)]
    pub workers: Option<usize>,

    /// Maximum number of units in a single group.
    #[serde(default = "max_units_per_group_default")]
    pub max_units_per_group: u32,

    /// Maximum group-shared memory per group, in bytes.
    #[serde(default = "max_shared_memory_size_default")]
    pub max_shared_memory_size: usize,
}

impl Default for ExecutionConfig {
    fn default() -> Self {
        Self {
            workers: None,
            max_units_per_group: max_units_per_group_default(),
            max_shared_memory_size: max_shared_memory_size_default(),
        }
    }
}

impl ExecutionConfig {
    /// The number of workers to spawn, resolving `None` to the available parallelism.
    pub fn resolved_workers(&self) -> usize {
        match self.workers {
            Some(workers) => usize::max(workers, 1),
            None => std::thread::available_parallelism()
                .map(|count| count.get())
                .unwrap_or(1),
        }
    }
}

fn max_units_per_group_default() -> u32 {
    1024
}

fn max_shared_memory_size_default() -> usize {
    48 * 1024
}
