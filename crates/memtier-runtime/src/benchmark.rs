use alloc::string::String;
use alloc::vec::Vec;
use core::fmt::Display;
use core::time::Duration;
use std::time::Instant;

/// Benchmark trait.
///
/// Launches on the emulated device block until every group has completed, so the duration of
/// [Benchmark::execute] is the duration of the work itself.
pub trait Benchmark {
    /// Benchmark arguments, built before the timed section.
    type Args;
    /// Error returned by a failing execution.
    type Error;

    /// Prepare the benchmark, run anything that is essential for the benchmark, but shouldn't
    /// count as included in the duration.
    fn prepare(&self) -> Self::Args;

    /// Execute the benchmark.
    fn execute(&self, args: Self::Args) -> Result<(), Self::Error>;

    /// Number of samples per run required to have a statistical significance.
    fn num_samples(&self) -> usize {
        10
    }

    /// Name of the benchmark, should be unique.
    fn name(&self) -> String;

    /// Prepare then time a single execution.
    fn sample(&self) -> Result<Duration, Self::Error> {
        let args = self.prepare();
        let start = Instant::now();
        self.execute(args)?;
        Ok(start.elapsed())
    }

    /// Run the benchmark a number of times.
    fn run(&self) -> Result<BenchmarkDurations, Self::Error> {
        let durations = (0..self.num_samples())
            .map(|_| self.sample())
            .collect::<Result<Vec<_>, _>>()?;

        Ok(BenchmarkDurations::new(durations))
    }
}

/// Durations of the samples of a benchmark run.
#[derive(new, Debug, Clone, Default)]
pub struct BenchmarkDurations {
    /// All durations of the run, in the order they were measured.
    pub durations: Vec<Duration>,
}

impl BenchmarkDurations {
    /// Mean duration, zero for an empty run.
    pub fn mean(&self) -> Duration {
        if self.durations.is_empty() {
            return Duration::ZERO;
        }
        self.durations.iter().sum::<Duration>() / self.durations.len() as u32
    }

    /// Population standard deviation of the durations.
    pub fn std(&self) -> Duration {
        if self.durations.is_empty() {
            return Duration::ZERO;
        }
        let mean = self.mean().as_secs_f64();
        let variance = self
            .durations
            .iter()
            .map(|duration| {
                let diff = duration.as_secs_f64() - mean;
                diff * diff
            })
            .sum::<f64>()
            / self.durations.len() as f64;

        Duration::from_secs_f64(variance.sqrt())
    }

    /// Median duration, zero for an empty run.
    pub fn median(&self) -> Duration {
        let mut sorted = self.durations.clone();
        sorted.sort();
        match sorted.len() {
            0 => Duration::ZERO,
            len if len % 2 == 1 => sorted[len / 2],
            len => (sorted[len / 2 - 1] + sorted[len / 2]) / 2,
        }
    }

    /// Fastest sample.
    pub fn min(&self) -> Duration {
        self.durations.iter().min().copied().unwrap_or_default()
    }

    /// Slowest sample.
    pub fn max(&self) -> Duration {
        self.durations.iter().max().copied().unwrap_or_default()
    }
}

impl Display for BenchmarkDurations {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "―――――――― Result ―――――――――
  Samples     {}
  Mean        {:.3?}
  Std         {:.3?}
  Median      {:.3?}
  Min         {:.3?}
  Max         {:.3?}
―――――――――――――――――――――――――",
            self.durations.len(),
            self.mean(),
            self.std(),
            self.median(),
            self.min(),
            self.max(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;

    fn durations(millis: &[u64]) -> BenchmarkDurations {
        BenchmarkDurations::new(millis.iter().map(|ms| Duration::from_millis(*ms)).collect())
    }

    #[test_log::test]
    fn statistics_of_known_samples() {
        let durations = durations(&[4, 2, 6, 8]);

        assert_eq!(durations.mean(), Duration::from_millis(5));
        assert_eq!(durations.median(), Duration::from_millis(5));
        assert_eq!(durations.min(), Duration::from_millis(2));
        assert_eq!(durations.max(), Duration::from_millis(8));
        let std_ms = durations.std().as_secs_f64() * 1000.0;
        assert!((std_ms - 5.0f64.sqrt()).abs() < 1e-6);
    }

    #[test_log::test]
    fn empty_run_is_zero() {
        let durations = BenchmarkDurations::default();

        assert_eq!(durations.mean(), Duration::ZERO);
        assert_eq!(durations.std(), Duration::ZERO);
        assert_eq!(durations.median(), Duration::ZERO);
    }

    struct Counting {
        executed: Cell<usize>,
        fail_at: Option<usize>,
    }

    impl Benchmark for Counting {
        type Args = ();
        type Error = usize;

        fn prepare(&self) -> Self::Args {}

        fn execute(&self, _args: Self::Args) -> Result<(), Self::Error> {
            let count = self.executed.get();
            self.executed.set(count + 1);
            match self.fail_at {
                Some(index) if index == count => Err(count),
                _ => Ok(()),
            }
        }

        fn num_samples(&self) -> usize {
            4
        }

        fn name(&self) -> String {
            "counting".into()
        }
    }

    #[test_log::test]
    fn run_collects_every_sample() {
        let bench = Counting {
            executed: Cell::new(0),
            fail_at: None,
        };

        let durations = bench.run().unwrap();

        assert_eq!(durations.durations.len(), 4);
        assert_eq!(bench.executed.get(), 4);
    }

    #[test_log::test]
    fn run_stops_at_first_error() {
        let bench = Counting {
            executed: Cell::new(0),
            fail_at: Some(1),
        };

        assert_eq!(bench.run().unwrap_err(), 1);
        assert_eq!(bench.executed.get(), 2);
    }
}
