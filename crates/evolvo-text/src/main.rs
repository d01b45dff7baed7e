//! Evolvo Text Binary
//!
//! Evolves random strings towards a target text by point mutation, stopping
//! when the target is matched, the iteration cap is hit, or the run has lasted
//! too many average evaluations.

mod config;
mod problem;

use std::sync::Arc;

use anyhow::Result;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use evolvo_common::VERSION;
use evolvo_core::evaluation::{CachedFitness, FitnessFunction, IdentityMapper, TaskRunner};
use evolvo_core::listener::Deferred;
use evolvo_core::stop::{AnyOf, Iterations, RelativeElapsedTime, StopCondition, TargetFitness};
use evolvo_core::{Evolver, FactoryInit, FitnessOrder, TracingListener};

use config::TextConfig;
use problem::{PointMutation, RandomText, TextFitness};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    info!("Starting Evolvo text evolution v{}", VERSION);

    // Load configuration
    let config = TextConfig::load()?;
    info!("Loaded configuration: {:?}", config);

    let runner = TaskRunner::from_config(&config.evolver)?;
    let cache = Arc::new(CachedFitness::from_config(
        Arc::new(TextFitness::new(config.target.clone())),
        &config.evolver,
    )?);
    let fitness: Arc<dyn FitnessFunction<String, usize>> = cache.clone();

    let stop: AnyOf<String, String, usize> = TargetFitness::at_most(0usize)
        .or(Iterations(config.max_iterations))
        .with(RelativeElapsedTime::new(config.elapsed_ratio, cache.clone())?);

    let (listener, delivery) = Deferred::<String, String, usize>::from_config(
        TracingListener::new("text")
            .every(config.log_every)
            .with_fitness(),
        &config.evolver,
    );

    let target_len = config.target.chars().count();
    let evolver = Evolver::new(
        IdentityMapper,
        FitnessOrder,
        FactoryInit::new(
            RandomText::new(1, target_len * 2),
            config.evolver.population_size,
        ),
        PointMutation::new(config.offspring),
    );

    let mut rng = match config.seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    };

    // Cancel the run on CTRL+C
    let cancel = runner.cancel_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received shutdown signal");
            cancel.cancel();
        }
    });

    let outcome = evolver
        .run(fitness, &stop, &mut rng, &runner, &listener)
        .await;

    // Flush queued progress events
    drop(listener);
    if let Err(e) = delivery.await {
        warn!(error = %e, "Listener task failed");
    }

    let stats = cache.stats();
    info!(
        invocations = stats.invocations,
        hits = stats.hits,
        average_load_penalty_ns = stats.average_load_penalty,
        "Fitness cache"
    );

    match outcome {
        Ok(front) => {
            for solution in &front {
                println!("{solution}");
            }
            Ok(())
        }
        Err(e) if e.is_interrupted() => {
            warn!("Run interrupted before completion");
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
