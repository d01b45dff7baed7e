//! Text evolution configuration

use evolvo_common::ConfigError;
use evolvo_core::EvolverConfig;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Text evolution run configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextConfig {
    /// Text the population evolves towards
    pub target: String,
    /// Iteration cap
    pub max_iterations: u64,
    /// Stop once elapsed time exceeds this many average evaluations
    pub elapsed_ratio: f64,
    /// Offspring bred per iteration
    pub offspring: usize,
    /// Log every n-th iteration
    pub log_every: u64,
    /// RNG seed, drawn from entropy when unset
    pub seed: Option<u64>,
    /// Engine settings
    pub evolver: EvolverConfig,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            target: "Hello world!".to_string(),
            max_iterations: 1_000,
            elapsed_ratio: 1e7,
            offspring: 50,
            log_every: 10,
            seed: None,
            evolver: EvolverConfig::default(),
        }
    }
}

impl TextConfig {
    /// Load configuration from `.env` and `EVOLVO_*` environment variables
    pub fn load() -> anyhow::Result<Self> {
        // Try to load .env file
        let _ = dotenvy::dotenv();

        Ok(Self::from_lookup(|key| std::env::var(key).ok())?)
    }

    /// Build from defaults overridden by `lookup`
    pub fn from_lookup<L>(lookup: L) -> Result<Self, ConfigError>
    where
        L: Fn(&str) -> Option<String>,
    {
        let mut cfg = Self::default();

        if let Some(target) = lookup("EVOLVO_TARGET") {
            cfg.target = target;
        }
        if let Some(v) = parsed(&lookup, "EVOLVO_MAX_ITERATIONS")? {
            cfg.max_iterations = v;
        }
        if let Some(v) = parsed(&lookup, "EVOLVO_ELAPSED_RATIO")? {
            cfg.elapsed_ratio = v;
        }
        if let Some(v) = parsed(&lookup, "EVOLVO_OFFSPRING")? {
            cfg.offspring = v;
        }
        if let Some(v) = parsed(&lookup, "EVOLVO_LOG_EVERY")? {
            cfg.log_every = v;
        }
        if let Some(v) = parsed(&lookup, "EVOLVO_SEED")? {
            cfg.seed = Some(v);
        }

        // Engine settings
        if let Some(v) = parsed(&lookup, "EVOLVO_POPULATION_SIZE")? {
            cfg.evolver.population_size = v;
        }
        if let Some(v) = parsed(&lookup, "EVOLVO_MAX_CONCURRENCY")? {
            cfg.evolver.max_concurrency = Some(v);
        }
        if let Some(v) = parsed(&lookup, "EVOLVO_CACHE_CAPACITY")? {
            cfg.evolver.cache_capacity = Some(v);
        }
        if let Some(v) = parsed(&lookup, "EVOLVO_LISTENER_BUFFER")? {
            cfg.evolver.listener_buffer = Some(v);
        }

        cfg.validate()?;
        Ok(cfg)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target.is_empty() {
            return Err(ConfigError::Env {
                key: "EVOLVO_TARGET".to_string(),
                value: String::new(),
            });
        }
        if !self.elapsed_ratio.is_finite() || self.elapsed_ratio <= 0.0 {
            return Err(ConfigError::InvalidRatio(self.elapsed_ratio));
        }
        if self.offspring == 0 {
            return Err(ConfigError::InvalidPopulationSize);
        }
        self.evolver.validate()
    }
}

fn parsed<L, T>(lookup: &L, key: &str) -> Result<Option<T>, ConfigError>
where
    L: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key) {
        None => Ok(None),
        Some(value) => match value.trim().parse() {
            Ok(v) => Ok(Some(v)),
            Err(_) => Err(ConfigError::Env {
                key: key.to_string(),
                value,
            }),
        },
    }
}
