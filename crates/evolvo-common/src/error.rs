//! Error types for Evolvo
//!
//! Provides a unified error type and the per-stage error variants raised
//! while building and evaluating individuals.

use thiserror::Error;

/// Result type alias using EvolutionError
pub type Result<T> = std::result::Result<T, EvolutionError>;

/// Unified error type for Evolvo operations
#[derive(Debug, Error)]
pub enum EvolutionError {
    // Genotype to solution failures
    #[error("Mapping error: {0}")]
    Mapping(#[from] MappingError),

    // Fitness computation failures
    #[error("Evaluation error: {0}")]
    Evaluation(#[from] EvaluationError),

    // Run cancelled while work was outstanding
    #[error("Run interrupted while awaiting outstanding evaluations")]
    Interrupted,

    // Invalid parameters
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),
}

/// Failure to map a genotype onto its solution
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{reason}")]
pub struct MappingError {
    pub reason: String,
}

impl MappingError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Failure to compute the fitness of a solution
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("{reason}")]
pub struct EvaluationError {
    pub reason: String,
}

impl EvaluationError {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

/// Invalid configuration, detected at construction time
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ConfigError {
    #[error("Ratio must be finite and positive, got {0}")]
    InvalidRatio(f64),

    #[error("Concurrency limit must be at least 1")]
    InvalidConcurrency,

    #[error("Population size must be at least 1")]
    InvalidPopulationSize,

    #[error("Cache capacity must be at least 1")]
    InvalidCapacity,

    #[error("Invalid value for {key}: {value}")]
    Env { key: String, value: String },
}

impl EvolutionError {
    /// Whether the error came from cancellation rather than a failed unit of work
    pub fn is_interrupted(&self) -> bool {
        matches!(self, EvolutionError::Interrupted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = EvolutionError::from(MappingError::new("empty genotype"));
        assert!(err.to_string().contains("empty genotype"));
        assert!(err.to_string().starts_with("Mapping error"));
    }

    #[test]
    fn test_config_error() {
        let err = EvolutionError::from(ConfigError::InvalidRatio(-1.0));
        assert!(err.to_string().contains("-1"));
        assert!(!err.is_interrupted());
    }

    #[test]
    fn test_interrupted() {
        assert!(EvolutionError::Interrupted.is_interrupted());
    }
}
