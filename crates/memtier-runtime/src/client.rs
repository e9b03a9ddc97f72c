use alloc::format;
use alloc::sync::Arc;
use alloc::vec::Vec;
use core::fmt::Debug;
use std::time::Instant;

use crate::{
    DeviceProperties,
    benchmark::{Benchmark, BenchmarkDurations},
    compute::Scheduler,
    config::{GlobalConfig, Logger, launch::LaunchLogLevel, profiling::ProfilingLogLevel},
    error::{InvalidLaunchConfig, LaunchError},
    kernel::Kernel,
    memory::Handle,
    topology::{GridDim, GroupCount, GroupDim},
};

/// The ComputeClient is the entry point to allocate buffers on the emulated device and to
/// launch kernels on it.
///
/// Cloning a client is cheap; clones share the same workers and loggers.
#[derive(Clone)]
pub struct ComputeClient {
    scheduler: Arc<Scheduler>,
    logger: Arc<spin::Mutex<Logger>>,
    properties: Arc<DeviceProperties>,
}

impl Debug for ComputeClient {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ComputeClient")
            .field("properties", &self.properties)
            .finish()
    }
}

impl Default for ComputeClient {
    fn default() -> Self {
        Self::new(GlobalConfig::get())
    }
}

impl ComputeClient {
    /// Create a new client with its own pool of workers.
    pub fn new(config: Arc<GlobalConfig>) -> Self {
        let num_workers = config.execution.resolved_workers();
        let scheduler = Scheduler::new(num_workers);
        let properties = DeviceProperties::from_config(&config.execution, scheduler.num_workers());
        log::debug!(
            "Created compute client with {} workers",
            scheduler.num_workers()
        );

        Self {
            scheduler: Arc::new(scheduler),
            logger: Arc::new(spin::Mutex::new(Logger::new(config))),
            properties: Arc::new(properties),
        }
    }

    /// Properties of the device this client runs on.
    pub fn properties(&self) -> &DeviceProperties {
        &self.properties
    }

    /// Given a slice of values, returns a handle to a new buffer holding them.
    pub fn create(&self, data: &[f32]) -> Handle {
        Handle::from_slice(data)
    }

    /// Reserves `len` zeroed elements of device memory.
    pub fn empty(&self, len: usize) -> Handle {
        Handle::empty(len)
    }

    /// Copies the content of a buffer back to the host.
    pub fn read(&self, handle: &Handle) -> Vec<f32> {
        handle.read()
    }

    /// Executes `kernel` over `count` groups of `dim` units each, blocking until every unit has
    /// completed.
    ///
    /// The launch configuration is validated against the device before any unit runs.
    pub fn launch(
        &self,
        kernel: Arc<dyn Kernel>,
        count: GroupCount,
        dim: GroupDim,
    ) -> Result<(), LaunchError> {
        self.validate(kernel.as_ref(), count, dim)?;

        log::debug!("Launching {} with {count:?} groups of {dim:?}", kernel.name());

        let mut logger = self.logger.lock();
        match logger.log_level_launch() {
            LaunchLogLevel::Disabled => {}
            LaunchLogLevel::Basic => {
                logger.log_launch(&format!("[launch] {} {count:?} x {dim:?}", kernel.name()));
            }
            LaunchLogLevel::Full => {
                let settings = kernel.settings();
                logger.log_launch(&format!(
                    "[launch] {} {count:?} x {dim:?} shared_memory_len={} synchronizes={}",
                    kernel.name(),
                    settings.shared_memory_len,
                    settings.synchronizes,
                ));
            }
        }
        core::mem::drop(logger);

        self.scheduler.dispatch_execute(kernel, count, dim)
    }

    /// Measures the execution time of `func`, logging it to the profiling logger.
    pub fn profile<O>(&self, name: &str, func: impl FnOnce() -> O) -> O {
        let start = Instant::now();
        let out = func();
        let duration = start.elapsed();

        let mut logger = self.logger.lock();
        if logger.log_level_profiling() != ProfilingLogLevel::Disabled {
            logger.log_profiling(&format!("| {duration:<10?} | {name}"));
        }

        out
    }

    /// Runs a benchmark, logging its summary (and each sample with full profiling) to the
    /// profiling logger.
    pub fn benchmark<B: Benchmark>(&self, bench: &B) -> Result<BenchmarkDurations, B::Error> {
        let name = bench.name();
        let level = self.logger.lock().log_level_profiling();
        let mut durations = Vec::with_capacity(bench.num_samples());

        for index in 0..bench.num_samples() {
            let duration = bench.sample()?;
            if level == ProfilingLogLevel::Full {
                self.logger
                    .lock()
                    .log_profiling(&format!("{name} sample {index}: {duration:?}"));
            }
            durations.push(duration);
        }

        let durations = BenchmarkDurations::new(durations);
        if level != ProfilingLogLevel::Disabled {
            self.logger
                .lock()
                .log_profiling(&format!("{name}\n{durations}"));
        }

        Ok(durations)
    }

    fn validate(
        &self,
        kernel: &dyn Kernel,
        count: GroupCount,
        dim: GroupDim,
    ) -> Result<(), LaunchError> {
        if dim.num_elems() == 0 {
            return Err(InvalidLaunchConfig::EmptyGroup(dim).into());
        }

        if count.num_elems() == 0 {
            return Err(InvalidLaunchConfig::EmptyGrid(GridDim::spanned(count, dim)).into());
        }

        let max_units = self.properties.max_units_per_group;
        if dim.num_elems() > max_units {
            return Err(InvalidLaunchConfig::GroupTooLarge {
                requested: dim,
                max: max_units,
            }
            .into());
        }

        let shared_bytes = kernel.settings().shared_memory_len * size_of::<f32>();
        if shared_bytes > self.properties.max_shared_memory_size {
            return Err(InvalidLaunchConfig::SharedMemory {
                requested: shared_bytes,
                max: self.properties.max_shared_memory_size,
            }
            .into());
        }

        Ok(())
    }
}
