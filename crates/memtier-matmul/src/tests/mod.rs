mod auto;
mod boundaries;
mod errors;
