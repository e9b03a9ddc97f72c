use memtier_runtime::error::{InvalidLaunchConfig, LaunchError};
use std::fmt::{Debug, Display};

use super::MatmulIdent;

/// Errors that can occur during the setup phase of a matmul operation.
///
/// Every variant except [MatmulSetupError::Launch] is detected before any unit runs.
#[derive(Clone, PartialEq)]
pub enum MatmulSetupError {
    /// The shapes of the operands don't describe a valid product.
    DimensionMismatch(DimensionMismatch),

    /// The shared dimension doesn't fit the private row cache of the kernel.
    CapacityExceeded {
        /// Shared dimension `K` of the problem.
        shared_size: usize,
        /// Capacity of the kernel's private row cache.
        capacity: usize,
    },

    /// The group shape or grid can't be used by the kernel or the device.
    InvalidLaunchConfiguration(InvalidLaunchConfig),

    /// The output buffer is also one of the inputs.
    AliasedOutput(MatmulIdent),

    /// The runtime failed while executing the kernel.
    Launch(LaunchError),
}

/// The way operand shapes disagree.
#[derive(Clone, PartialEq, Eq)]
pub enum DimensionMismatch {
    /// `A.width != B.height`.
    SharedDim {
        /// Width of the left operand.
        lhs_width: usize,
        /// Height of the right operand.
        rhs_height: usize,
    },

    /// The output shape isn't `(A.height, B.width)`.
    OutputShape {
        /// Shape implied by the operands.
        expected: (usize, usize),
        /// Shape of the provided output.
        actual: (usize, usize),
    },

    /// A matrix has a zero-sized dimension.
    Empty {
        /// Which matrix.
        ident: MatmulIdent,
        /// Its `(height, width)`.
        shape: (usize, usize),
    },

    /// A buffer doesn't hold exactly `height * width` elements.
    DataLength {
        /// Which matrix.
        ident: MatmulIdent,
        /// Its `(height, width)`.
        shape: (usize, usize),
        /// Number of elements provided.
        len: usize,
    },

    /// Host data doesn't hold exactly `height * width` elements.
    HostDataLength {
        /// Requested `(height, width)`.
        shape: (usize, usize),
        /// Number of elements provided.
        len: usize,
    },
}

impl From<DimensionMismatch> for MatmulSetupError {
    fn from(value: DimensionMismatch) -> Self {
        Self::DimensionMismatch(value)
    }
}

impl From<InvalidLaunchConfig> for MatmulSetupError {
    fn from(value: InvalidLaunchConfig) -> Self {
        Self::InvalidLaunchConfiguration(value)
    }
}

impl From<LaunchError> for MatmulSetupError {
    fn from(value: LaunchError) -> Self {
        match value {
            LaunchError::InvalidConfiguration(config) => Self::InvalidLaunchConfiguration(config),
            err => Self::Launch(err),
        }
    }
}

impl Display for MatmulSetupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{self:?}")
    }
}

impl std::error::Error for MatmulSetupError {}

impl Debug for MatmulSetupError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MatmulSetupError::DimensionMismatch(err) => {
                writeln!(
                    f,
                    "Unable to launch matmul because the operand shapes mismatch: {err:?}"
                )
            }
            MatmulSetupError::CapacityExceeded {
                shared_size,
                capacity,
            } => {
                writeln!(
                    f,
                    "Unable to launch matmul because the shared dimension {shared_size} exceeds the private capacity {capacity}"
                )
            }
            MatmulSetupError::InvalidLaunchConfiguration(err) => {
                writeln!(
                    f,
                    "Unable to launch matmul because the launch configuration is invalid: {err}"
                )
            }
            MatmulSetupError::AliasedOutput(ident) => {
                writeln!(
                    f,
                    "Unable to launch matmul because the output aliases the {ident:?} operand"
                )
            }
            MatmulSetupError::Launch(err) => {
                writeln!(f, "Matmul failed during execution: {err}")
            }
        }
    }
}

impl Debug for DimensionMismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DimensionMismatch::SharedDim {
                lhs_width,
                rhs_height,
            } => write!(
                f,
                "Lhs width {lhs_width} doesn't match rhs height {rhs_height}"
            ),
            DimensionMismatch::OutputShape { expected, actual } => {
                write!(f, "Output shape {actual:?} should be {expected:?}")
            }
            DimensionMismatch::Empty { ident, shape } => {
                write!(f, "{ident:?} has an empty dimension {shape:?}")
            }
            DimensionMismatch::DataLength { ident, shape, len } => {
                write!(f, "{ident:?} of shape {shape:?} ")?;
                write_expected_len(f, *shape, *len)
            }
            DimensionMismatch::HostDataLength { shape, len } => {
                write!(f, "Host matrix of shape {shape:?} ")?;
                write_expected_len(f, *shape, *len)
            }
        }
    }
}

fn write_expected_len(
    f: &mut std::fmt::Formatter<'_>,
    shape: (usize, usize),
    len: usize,
) -> std::fmt::Result {
    match shape.0.checked_mul(shape.1) {
        Some(expected) => write!(f, "needs {expected} elements, got {len}"),
        None => write!(f, "has more elements than can be addressed, got {len}"),
    }
}
