//! This module contains the core numerical types of the library.

mod counts;
mod eigen;
mod rate_matrix;
mod transition;

pub use counts::CountMatrix;
pub use eigen::Eigen;
pub use rate_matrix::RateMatrix;
pub use transition::transition_matrix;
