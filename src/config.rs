//! Configuration data structures for model scoring.

use serde::{Deserialize, Serialize};
use std::fs;

/// Scoring parameters controlling the branch-length search.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Parameters {
    /// Lower bound of the branch-length search bracket.
    pub branch_min: f64,

    /// Upper bound of the branch-length search bracket.
    pub branch_max: f64,

    /// The search terminates once the bracket width falls below this value.
    pub tolerance: f64,

    /// Iteration cap for the branch-length search.
    pub max_iterations: usize,

    /// Score at this fixed branch length instead of searching.
    #[serde(default)]
    pub fixed_branch_length: Option<f64>,
}

impl Default for Parameters {
    fn default() -> Self {
        Self {
            branch_min: 1e-3,
            branch_max: 10.,
            tolerance: 1e-6,
            max_iterations: 100,
            fixed_branch_length: None,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    IoError(std::io::Error),
    YamlError(serde_yaml::Error),
}

impl std::error::Error for ConfigError {}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::IoError(error) => write!(formatter, "IO error: {}", error),
            ConfigError::YamlError(error) => write!(formatter, "YAML error: {}", error),
        }
    }
}

impl Parameters {
    pub fn write(&self, writer: &mut dyn std::io::Write) -> Result<(), ConfigError> {
        serde_yaml::to_writer(writer, self).map_err(ConfigError::YamlError)
    }

    pub fn read(reader: &mut dyn std::io::Read) -> Result<Parameters, ConfigError> {
        serde_yaml::from_reader(reader).map_err(ConfigError::YamlError)
    }

    pub fn write_to_file(&self, filename: &str) -> Result<(), ConfigError> {
        let file = fs::File::create(filename).map_err(ConfigError::IoError)?;
        let mut writer = std::io::BufWriter::new(file);
        self.write(&mut writer)
    }

    pub fn read_from_file(filename: &str) -> Result<Parameters, ConfigError> {
        let file = fs::File::open(filename).map_err(ConfigError::IoError)?;
        let mut reader = std::io::BufReader::new(file);
        Self::read(&mut reader)
    }
}
