use core::fmt::Display;

use crate::config::execution::ExecutionConfig;

/// Properties of the emulated device, as seen by kernels and launchers.
#[derive(new, Debug, Clone, PartialEq, Eq)]
pub struct DeviceProperties {
    /// Human readable name of the device.
    pub name: &'static str,
    /// Number of workers executing groups concurrently.
    pub num_workers: usize,
    /// Maximum number of units in a single group.
    pub max_units_per_group: u32,
    /// Maximum group-shared memory per group, in bytes.
    pub max_shared_memory_size: usize,
}

impl DeviceProperties {
    pub(crate) fn from_config(config: &ExecutionConfig, num_workers: usize) -> Self {
        Self::new(
            "memtier emulated SPMD device",
            num_workers,
            config.max_units_per_group,
            config.max_shared_memory_size,
        )
    }

    /// Maximum number of `f32` elements of group-shared memory per group.
    pub fn max_shared_memory_len(&self) -> usize {
        self.max_shared_memory_size / size_of::<f32>()
    }
}

impl Display for DeviceProperties {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        writeln!(f, "Device: {}", self.name)?;
        writeln!(f, "  Workers:                 {}", self.num_workers)?;
        writeln!(f, "  Max units per group:     {}", self.max_units_per_group)?;
        write!(
            f,
            "  Max shared memory:       {} bytes ({} f32)",
            self.max_shared_memory_size,
            self.max_shared_memory_len()
        )
    }
}
