//! Concurrent construction of individuals
//!
//! Each genotype is mapped and evaluated as one unit of work on the
//! [`TaskRunner`]; results come back in input order.

use super::fitness::{FitnessFunction, SolutionMapper};
use super::runner::TaskRunner;
use evolvo_common::{Individual, Result, State};
use std::sync::Arc;
use tracing::{debug, instrument};

/// Map and evaluate `genotypes` concurrently
///
/// `result[i]` is built from `genotypes[i]` and tagged with the current
/// iteration. On success the birth counter grows by `genotypes.len()` and the
/// evaluation counter is set to the fitness function's invocation count, or
/// to the birth counter when the function does not track invocations. On
/// failure the state is left untouched.
#[instrument(skip_all, fields(genotypes = genotypes.len(), iteration = state.iterations()))]
pub async fn build_individuals<G, S, F>(
    genotypes: Vec<G>,
    mapper: &Arc<dyn SolutionMapper<G, S>>,
    fitness: &Arc<dyn FitnessFunction<S, F>>,
    runner: &TaskRunner,
    state: &mut State,
) -> Result<Vec<Individual<G, S, F>>>
where
    G: Send + 'static,
    S: Send + 'static,
    F: Send + 'static,
{
    let iteration = state.iterations();
    let units: Vec<_> = genotypes
        .into_iter()
        .map(|genotype| {
            let mapper = Arc::clone(mapper);
            let fitness = Arc::clone(fitness);
            move || -> Result<Individual<G, S, F>> {
                let solution = mapper.map(&genotype)?;
                let value = fitness.evaluate(&solution)?;
                Ok(Individual::new(genotype, solution, value, iteration))
            }
        })
        .collect();

    let individuals = runner.invoke_all(units).await?;

    state.inc_births(individuals.len() as u64);
    let evaluations = fitness.invocation_count().unwrap_or_else(|| state.births());
    state.set_fitness_evaluations(evaluations);

    debug!(
        built = individuals.len(),
        births = state.births(),
        fitness_evaluations = state.fitness_evaluations(),
        "Individuals built"
    );
    Ok(individuals)
}
