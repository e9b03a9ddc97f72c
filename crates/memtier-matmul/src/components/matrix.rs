use memtier_runtime::{ComputeClient, memory::Handle};

use super::{DimensionMismatch, MatmulIdent, MatmulProblem, MatmulSetupError};

/// A dense row-major `f32` matrix living on the host.
#[derive(Clone, Debug, PartialEq)]
pub struct Matrix {
    height: usize,
    width: usize,
    data: Vec<f32>,
}

impl Matrix {
    /// Wraps row-major `data` as a `height × width` matrix.
    pub fn new(height: usize, width: usize, data: Vec<f32>) -> Result<Self, MatmulSetupError> {
        if height.checked_mul(width) != Some(data.len()) {
            return Err(DimensionMismatch::HostDataLength {
                shape: (height, width),
                len: data.len(),
            }
            .into());
        }

        Ok(Self {
            height,
            width,
            data,
        })
    }

    /// A matrix filled with zeros.
    pub fn zeros(height: usize, width: usize) -> Self {
        Self {
            height,
            width,
            data: vec![0.0; height * width],
        }
    }

    /// A matrix whose element `(row, col)` is `func(row, col)`.
    pub fn from_fn(height: usize, width: usize, mut func: impl FnMut(usize, usize) -> f32) -> Self {
        let mut data = Vec::with_capacity(height * width);
        for row in 0..height {
            for col in 0..width {
                data.push(func(row, col));
            }
        }

        Self {
            height,
            width,
            data,
        }
    }

    /// Number of rows.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Number of columns.
    pub fn width(&self) -> usize {
        self.width
    }

    /// `(height, width)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }

    /// Row-major elements.
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Element at `(row, col)`.
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.data[row * self.width + col]
    }

    /// Sequential host product, summing terms in increasing `k` with a single accumulator.
    pub fn matmul_reference(&self, rhs: &Matrix) -> Result<Matrix, MatmulSetupError> {
        let problem = MatmulProblem::from_shapes(
            self.shape(),
            rhs.shape(),
            (self.height, rhs.width),
        )?;

        Ok(Matrix::from_fn(problem.m, problem.n, |i, j| {
            let mut sum = 0.0f32;
            for k in 0..problem.k {
                sum += self.data[i * problem.k + k] * rhs.data[k * problem.n + j];
            }
            sum
        }))
    }

    /// Largest element-wise relative error against `reference`.
    ///
    /// The error is absolute where the reference element is zero.
    pub fn max_relative_error(&self, reference: &Matrix) -> f32 {
        self.data
            .iter()
            .zip(reference.data.iter())
            .map(|(actual, expected)| {
                let diff = (actual - expected).abs();
                match *expected == 0.0 {
                    true => diff,
                    false => diff / expected.abs(),
                }
            })
            .fold(0.0, f32::max)
    }

    /// Whether both matrices have the same shape and every element satisfies
    /// `|self - other| <= atol + rtol * |other|`.
    pub fn allclose(&self, other: &Matrix, rtol: f32, atol: f32) -> bool {
        self.shape() == other.shape()
            && self
                .data
                .iter()
                .zip(other.data.iter())
                .all(|(a, b)| (a - b).abs() <= atol + rtol * b.abs())
    }
}

/// A matrix stored in device-global memory.
#[derive(Clone, Debug)]
pub struct MatrixHandle {
    /// Buffer holding the row-major elements.
    pub handle: Handle,
    height: usize,
    width: usize,
}

impl MatrixHandle {
    /// Wraps an existing buffer, checking it holds exactly `height * width` elements.
    pub fn new(
        handle: Handle,
        height: usize,
        width: usize,
        ident: MatmulIdent,
    ) -> Result<Self, MatmulSetupError> {
        if height.checked_mul(width) != Some(handle.len()) {
            return Err(DimensionMismatch::DataLength {
                ident,
                shape: (height, width),
                len: handle.len(),
            }
            .into());
        }

        Ok(Self {
            handle,
            height,
            width,
        })
    }

    /// Copies `matrix` into a new device buffer.
    pub fn upload(client: &ComputeClient, matrix: &Matrix) -> Self {
        Self {
            handle: client.create(matrix.data()),
            height: matrix.height,
            width: matrix.width,
        }
    }

    /// Allocates a zeroed `height × width` matrix on the device.
    pub fn empty(client: &ComputeClient, height: usize, width: usize) -> Self {
        Self {
            handle: client.empty(height * width),
            height,
            width,
        }
    }

    /// Copies the matrix back to the host.
    pub fn read(&self, client: &ComputeClient) -> Matrix {
        Matrix {
            height: self.height,
            width: self.width,
            data: client.read(&self.handle),
        }
    }

    /// `(height, width)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.height, self.width)
    }
}
