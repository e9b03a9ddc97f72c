use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
/// Identifies one of the three matrices of a matmul.
pub enum MatmulIdent {
    /// Left operand `A`, `M × K`.
    Lhs,
    /// Right operand `B`, `K × N`.
    Rhs,
    /// Output `C`, `M × N`.
    Out,
}
