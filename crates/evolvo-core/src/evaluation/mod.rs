//! Evaluation subsystem
//!
//! Provides concurrent construction of individuals with:
//! - Solution mapping and fitness capabilities
//! - A memoizing cache tracking real invocation cost
//! - A tokio-backed task runner with optional concurrency limit and cancellation

pub mod cache;
pub mod evaluator;
pub mod fitness;
pub mod runner;

pub use cache::{CacheStats, CachedFitness};
pub use evaluator::build_individuals;
pub use fitness::{FitnessFunction, IdentityMapper, LoadStats, SolutionMapper};
pub use runner::{CancelHandle, TaskRunner};
