mod error;
mod ident;
mod matrix;
mod problem;

pub use error::*;
pub use ident::*;
pub use matrix::*;
pub use problem::*;
