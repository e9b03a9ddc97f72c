/// Cache-free matmul with one unit per output element.
pub mod naive;
/// One unit per output row, both operands read from global memory.
pub mod row_global;
/// One unit per output row, caching its row of the left operand in private memory.
pub mod row_private;
/// Private row cache plus a column of the right operand staged in group-shared memory.
pub mod group_shared;
/// Square groups staging tiles of both operands in group-shared memory.
pub mod tiled;

mod selection;

pub use selection::*;
