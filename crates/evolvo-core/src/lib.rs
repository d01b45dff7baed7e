//! # Evolvo Core
//!
//! Generic iterative optimization engine.
//!
//! ## Iteration
//!
//! ```text
//! population ─▶ DAG partial order ─▶ event ─▶ listeners
//!      ▲                                 │
//!      └──────── update ◀── stop? ◀──────┘
//! ```
//!
//! Individuals are compared with a partial order; the first layer of the
//! resulting DAG (individuals nobody dominates) is the front returned at the end.
//!
//! ## Evaluation
//!
//! Genotypes are mapped and evaluated concurrently on a [`TaskRunner`],
//! optionally through a [`CachedFitness`] that computes each distinct
//! solution once and tracks the average cost of an evaluation.

pub mod engine;
pub mod evaluation;
pub mod event;
pub mod listener;
pub mod order;
pub mod stop;

pub use engine::{
    EvolutionContext, Evolver, FactoryInit, GenotypeFactory, PopulationInit, PopulationUpdate,
};
pub use evaluation::{CachedFitness, FitnessFunction, SolutionMapper, TaskRunner};
pub use event::{Event, RankedPopulation};
pub use listener::{Deferred, Listener, TracingListener};
pub use order::{DagPartialOrder, FitnessOrder, ParetoDominance, PartialComparator};
pub use stop::{RelativeElapsedTime, StopCondition};

use evolvo_common::ConfigError;
use serde::{Deserialize, Serialize};

/// Engine configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvolverConfig {
    /// Individuals per population
    pub population_size: usize,
    /// Evaluation units running at once, unlimited when `None`
    pub max_concurrency: Option<usize>,
    /// Fitness cache entries, unlimited when `None`
    pub cache_capacity: Option<usize>,
    /// Deferred listener queue, unbounded when `None`
    pub listener_buffer: Option<usize>,
}

impl Default for EvolverConfig {
    fn default() -> Self {
        Self {
            population_size: 100,
            max_concurrency: None,
            cache_capacity: None,
            listener_buffer: Some(1024),
        }
    }
}

impl EvolverConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.population_size == 0 {
            return Err(ConfigError::InvalidPopulationSize);
        }
        if self.max_concurrency == Some(0) {
            return Err(ConfigError::InvalidConcurrency);
        }
        if self.cache_capacity == Some(0) || self.listener_buffer == Some(0) {
            return Err(ConfigError::InvalidCapacity);
        }
        Ok(())
    }
}
