//! # Evolvo Common
//!
//! Shared types and errors for the Evolvo optimization core.
//!
//! ## Core Types
//!
//! - [`Individual`]: genotype, solution, fitness and birth iteration
//! - [`State`]: run counters (iterations, births, fitness evaluations, elapsed time)
//!
//! ## Errors
//!
//! - [`EvolutionError`]: unified error, with [`MappingError`], [`EvaluationError`]
//!   and [`ConfigError`] for the individual failure stages

pub mod error;
pub mod types;

// Re-export commonly used types at crate root
pub use error::{ConfigError, EvaluationError, EvolutionError, MappingError, Result};
pub use types::{individual::Individual, state::State};

/// Evolvo version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Nanoseconds per millisecond, used to compare elapsed time with load penalties
pub const NANOS_PER_MILLI: f64 = 1_000_000.0;
