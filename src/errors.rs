//! All errors that can occur in the modelmatcher library.

use std::fmt;

pub type Result<T> = std::result::Result<T, ModelMatcherError>;

#[derive(Clone, Debug)]
pub enum ModelMatcherError {
    /// Malformed input stream, e.g. a model file without a frequency line.
    Format(String),
    /// Wrong parameter cardinality or an invalid frequency vector.
    MalformedModel(String),
    /// Unrecognized name in the built-in model registry.
    UnknownModel(String),
    /// Eigendecomposition reconstruction or row-sum check exceeded tolerance.
    NumericalInstability(String),
    /// Degenerate input to scoring, e.g. an all-zero count matrix.
    DegenerateInput(String),
}

impl fmt::Display for ModelMatcherError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ModelMatcherError::Format(message) => {
                write!(f, "FormatError: {}", message)
            }
            ModelMatcherError::MalformedModel(message) => {
                write!(f, "MalformedModelError: {}", message)
            }
            ModelMatcherError::UnknownModel(message) => {
                write!(f, "UnknownModelError: {}", message)
            }
            ModelMatcherError::NumericalInstability(message) => {
                write!(f, "NumericalInstabilityError: {}", message)
            }
            ModelMatcherError::DegenerateInput(message) => {
                write!(f, "DegenerateInputError: {}", message)
            }
        }
    }
}

impl std::error::Error for ModelMatcherError {}
