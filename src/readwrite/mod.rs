//! IO for model and count matrix files.

mod counts;
mod model;

pub use counts::read_count_matrix;
pub use model::read_model;
