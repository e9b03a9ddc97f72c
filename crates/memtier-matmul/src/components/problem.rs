use serde::{Deserialize, Serialize};

use super::{DimensionMismatch, MatmulIdent, MatmulSetupError, MatrixHandle};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Description of a matmul problem to solve, regardless of actual data
pub struct MatmulProblem {
    /// Number of rows of the output.
    pub m: usize,
    /// Shared dimension of the operands.
    pub k: usize,
    /// Number of columns of the output.
    pub n: usize,
}

impl MatmulProblem {
    /// Checks that the three shapes describe `(m, k) × (k, n) = (m, n)` with no empty dimension.
    pub fn from_shapes(
        lhs: (usize, usize),
        rhs: (usize, usize),
        out: (usize, usize),
    ) -> Result<Self, MatmulSetupError> {
        for (ident, shape) in [
            (MatmulIdent::Lhs, lhs),
            (MatmulIdent::Rhs, rhs),
            (MatmulIdent::Out, out),
        ] {
            if shape.0 == 0 || shape.1 == 0 {
                return Err(DimensionMismatch::Empty { ident, shape }.into());
            }
        }

        if lhs.1 != rhs.0 {
            return Err(DimensionMismatch::SharedDim {
                lhs_width: lhs.1,
                rhs_height: rhs.0,
            }
            .into());
        }

        let expected = (lhs.0, rhs.1);
        if out != expected {
            return Err(DimensionMismatch::OutputShape {
                expected,
                actual: out,
            }
            .into());
        }

        Ok(Self {
            m: lhs.0,
            k: lhs.1,
            n: rhs.1,
        })
    }

    /// Checks the shapes of device matrices and that the output shares no storage with an input.
    pub fn from_handles(
        lhs: &MatrixHandle,
        rhs: &MatrixHandle,
        out: &MatrixHandle,
    ) -> Result<Self, MatmulSetupError> {
        let problem = Self::from_shapes(lhs.shape(), rhs.shape(), out.shape())?;

        if out.handle.shares_storage(&lhs.handle) {
            return Err(MatmulSetupError::AliasedOutput(MatmulIdent::Lhs));
        }
        if out.handle.shares_storage(&rhs.handle) {
            return Err(MatmulSetupError::AliasedOutput(MatmulIdent::Rhs));
        }

        Ok(problem)
    }

    /// Returns the `(height, width)` of the identified matrix.
    pub fn shape(&self, ident: MatmulIdent) -> (usize, usize) {
        match ident {
            MatmulIdent::Lhs => (self.m, self.k),
            MatmulIdent::Rhs => (self.k, self.n),
            MatmulIdent::Out => (self.m, self.n),
        }
    }

    /// Number of floating point operations, one multiply and one add per term.
    pub fn flops(&self) -> u64 {
        2 * self.m as u64 * self.n as u64 * self.k as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test_log::test]
    fn valid_shapes_give_the_problem() {
        let problem = MatmulProblem::from_shapes((3, 5), (5, 2), (3, 2)).unwrap();

        assert_eq!(problem, MatmulProblem { m: 3, k: 5, n: 2 });
        assert_eq!(problem.shape(MatmulIdent::Rhs), (5, 2));
        assert_eq!(problem.flops(), 60);
    }

    #[test_log::test]
    fn shared_dim_must_match() {
        let err = MatmulProblem::from_shapes((3, 4), (5, 2), (3, 2)).unwrap_err();

        assert_eq!(
            err,
            MatmulSetupError::DimensionMismatch(DimensionMismatch::SharedDim {
                lhs_width: 4,
                rhs_height: 5
            })
        );
    }

    #[test_log::test]
    fn output_shape_must_match() {
        let err = MatmulProblem::from_shapes((3, 4), (4, 2), (2, 3)).unwrap_err();

        assert_eq!(
            err,
            MatmulSetupError::DimensionMismatch(DimensionMismatch::OutputShape {
                expected: (3, 2),
                actual: (2, 3)
            })
        );
    }

    #[test_log::test]
    fn empty_dims_are_rejected() {
        let err = MatmulProblem::from_shapes((3, 0), (0, 2), (3, 2)).unwrap_err();

        assert_eq!(
            err,
            MatmulSetupError::DimensionMismatch(DimensionMismatch::Empty {
                ident: MatmulIdent::Lhs,
                shape: (3, 0)
            })
        );
    }
}
