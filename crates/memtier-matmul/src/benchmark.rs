use std::fmt::Display;

use memtier_runtime::{
    ComputeClient,
    benchmark::{Benchmark, BenchmarkDurations},
};

use crate::{
    Strategy,
    components::{MatmulProblem, MatmulSetupError, Matrix, MatrixHandle},
    launch, matmul,
};

/// Relative tolerance of the check against the host reference.
pub const REFERENCE_RTOL: f32 = 1e-5;

/// Times a matmul strategy on fixed operands.
#[derive(new)]
pub struct MatmulBenchmark {
    client: ComputeClient,
    strategy: Strategy,
    lhs: Matrix,
    rhs: Matrix,
    num_samples: usize,
}

impl Benchmark for MatmulBenchmark {
    type Args = (MatrixHandle, MatrixHandle, MatrixHandle);
    type Error = MatmulSetupError;

    fn prepare(&self) -> Self::Args {
        let lhs = MatrixHandle::upload(&self.client, &self.lhs);
        let rhs = MatrixHandle::upload(&self.client, &self.rhs);
        let out = MatrixHandle::empty(&self.client, self.lhs.height(), self.rhs.width());

        (lhs, rhs, out)
    }

    fn execute(&self, (lhs, rhs, out): Self::Args) -> Result<(), Self::Error> {
        launch(&self.client, &self.strategy, &lhs, &rhs, &out)
    }

    fn num_samples(&self) -> usize {
        self.num_samples
    }

    fn name(&self) -> String {
        format!(
            "matmul-{:?}-{}x{}x{}",
            self.strategy,
            self.lhs.height(),
            self.lhs.width(),
            self.rhs.width()
        )
        .to_lowercase()
    }
}

impl MatmulBenchmark {
    /// Checks the device result against the host reference, then times every sample.
    pub fn report(&self) -> Result<MatmulReport, MatmulSetupError> {
        let problem = MatmulProblem::from_shapes(
            self.lhs.shape(),
            self.rhs.shape(),
            (self.lhs.height(), self.rhs.width()),
        )?;

        let expected = self.lhs.matmul_reference(&self.rhs)?;
        let actual = matmul(&self.client, &self.strategy, &self.lhs, &self.rhs)?;
        let max_relative_error = actual.max_relative_error(&expected);
        let verified = actual.allclose(&expected, REFERENCE_RTOL, 0.0);
        if !verified {
            log::warn!(
                "{} differs from the reference, max relative error {max_relative_error}",
                self.name()
            );
        }

        let durations = self.client.benchmark(self)?;

        Ok(MatmulReport {
            name: self.name(),
            problem,
            durations,
            verified,
            max_relative_error,
        })
    }
}

/// Outcome of a [MatmulBenchmark].
#[derive(Debug, Clone)]
pub struct MatmulReport {
    /// Name of the benchmark.
    pub name: String,
    /// Sizes of the multiplied matrices.
    pub problem: MatmulProblem,
    /// Duration of every sample.
    pub durations: BenchmarkDurations,
    /// Whether the device result matched the host reference.
    pub verified: bool,
    /// Largest relative error against the host reference.
    pub max_relative_error: f32,
}

impl MatmulReport {
    /// Throughput of the mean sample, `2·M·N·K / seconds / 10⁶`.
    pub fn mflops(&self) -> f64 {
        let seconds = self.durations.mean().as_secs_f64();
        match seconds > 0.0 {
            true => self.problem.flops() as f64 / seconds / 1e6,
            false => 0.0,
        }
    }
}

impl Display for MatmulReport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let MatmulProblem { m, k, n } = self.problem;
        writeln!(f, "{} (M={m}, K={k}, N={n})", self.name)?;
        writeln!(
            f,
            "  Check       {} (max relative error {:e})",
            match self.verified {
                true => "passed",
                false => "FAILED",
            },
            self.max_relative_error
        )?;
        writeln!(
            f,
            "  Time        {:.3?} ± {:.3?}",
            self.durations.mean(),
            self.durations.std()
        )?;
        write!(f, "  Throughput  {:.2} MFLOPS", self.mflops())
    }
}
