//! Text matching problem
//!
//! Genotypes are strings over printable ASCII; fitness is the edit distance
//! to a target text, so lower is better and 0 means solved.

use async_trait::async_trait;
use evolvo_common::{EvaluationError, Individual, Result};
use evolvo_core::engine::{EvolutionContext, GenotypeFactory, PopulationUpdate};
use evolvo_core::evaluation::FitnessFunction;
use evolvo_core::RankedPopulation;
use rand::{Rng, RngCore};
use tracing::trace;

/// Printable ASCII, space to tilde
const ALPHABET: std::ops::RangeInclusive<u8> = b' '..=b'~';

pub type TextIndividual = Individual<String, String, usize>;

/// Levenshtein distance over chars
pub fn edit_distance(a: &str, b: &str) -> usize {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    if a.is_empty() {
        return b.len();
    }

    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];
    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != cb);
            current[j + 1] = substitution.min(previous[j + 1] + 1).min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }
    previous[b.len()]
}

/// Distance of a candidate to the target text
#[derive(Debug, Clone)]
pub struct TextFitness {
    target: String,
}

impl TextFitness {
    pub fn new(target: impl Into<String>) -> Self {
        Self {
            target: target.into(),
        }
    }
}

impl FitnessFunction<String, usize> for TextFitness {
    fn evaluate(&self, solution: &String) -> std::result::Result<usize, EvaluationError> {
        Ok(edit_distance(solution, &self.target))
    }
}

fn random_char<R: Rng + ?Sized>(rng: &mut R) -> char {
    char::from(rng.gen_range(ALPHABET))
}

/// Uniformly random strings with lengths in `min_len..=max_len`
#[derive(Debug, Clone, Copy)]
pub struct RandomText {
    min_len: usize,
    max_len: usize,
}

impl RandomText {
    pub fn new(min_len: usize, max_len: usize) -> Self {
        let min_len = min_len.max(1);
        Self {
            min_len,
            max_len: max_len.max(min_len),
        }
    }
}

impl GenotypeFactory<String> for RandomText {
    fn build(&self, n: usize, rng: &mut dyn RngCore) -> Vec<String> {
        (0..n)
            .map(|_| {
                let len = rng.gen_range(self.min_len..=self.max_len);
                (0..len).map(|_| random_char(rng)).collect()
            })
            .collect()
    }
}

/// Replace, insert or delete one random char
pub fn mutate<R: Rng + ?Sized>(text: &str, rng: &mut R) -> String {
    let mut chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        chars.push(random_char(rng));
        return chars.into_iter().collect();
    }

    match rng.gen_range(0..3) {
        0 => {
            let at = rng.gen_range(0..chars.len());
            chars[at] = random_char(rng);
        }
        1 => {
            let at = rng.gen_range(0..=chars.len());
            chars.insert(at, random_char(rng));
        }
        _ if chars.len() > 1 => {
            let at = rng.gen_range(0..chars.len());
            chars.remove(at);
        }
        _ => {
            chars[0] = random_char(rng);
        }
    }
    chars.into_iter().collect()
}

/// (μ+λ) update: breed `offspring` point mutants from the better half of the
/// population, then keep the best μ of parents and offspring together
#[derive(Debug, Clone, Copy)]
pub struct PointMutation {
    offspring: usize,
}

impl PointMutation {
    pub fn new(offspring: usize) -> Self {
        Self { offspring }
    }
}

#[async_trait]
impl PopulationUpdate<String, String, usize> for PointMutation {
    async fn update(
        &self,
        ranked: &RankedPopulation<String, String, usize>,
        ctx: &mut EvolutionContext<'_, String, String, usize>,
    ) -> Result<Vec<TextIndividual>> {
        let mu = ranked.len();
        let parents: Vec<&TextIndividual> = ranked.layers().into_iter().flatten().collect();
        if parents.is_empty() {
            return Ok(Vec::new());
        }

        let pool = parents.len().div_ceil(2);
        let genotypes: Vec<String> = (0..self.offspring)
            .map(|_| {
                let parent = parents[ctx.rng.gen_range(0..pool)];
                mutate(parent.genotype(), &mut *ctx.rng)
            })
            .collect();
        let offspring = ctx.build_individuals(genotypes).await?;

        let mut next: Vec<TextIndividual> = parents.into_iter().cloned().collect();
        next.extend(offspring);
        // Stable: on ties, older individuals keep their place
        next.sort_by_key(|individual| *individual.fitness());
        next.truncate(mu);

        trace!(best = ?next.first().map(|i| *i.fitness()), "Population updated");
        Ok(next)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use evolvo_common::State;
    use evolvo_core::evaluation::{IdentityMapper, SolutionMapper, TaskRunner};
    use evolvo_core::order::FitnessOrder;
    use evolvo_core::DagPartialOrder;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::sync::Arc;

    #[test]
    fn test_edit_distance() {
        assert_eq!(edit_distance("", ""), 0);
        assert_eq!(edit_distance("", "abc"), 3);
        assert_eq!(edit_distance("abc", ""), 3);
        assert_eq!(edit_distance("kitten", "sitting"), 3);
        assert_eq!(edit_distance("flaw", "lawn"), 2);
        assert_eq!(edit_distance("same", "same"), 0);
    }

    #[test]
    fn test_random_text_lengths_and_alphabet() {
        let mut rng = StdRng::seed_from_u64(11);
        let texts = RandomText::new(3, 6).build(50, &mut rng);

        assert_eq!(texts.len(), 50);
        for text in &texts {
            assert!((3..=6).contains(&text.chars().count()));
            assert!(text.bytes().all(|b| ALPHABET.contains(&b)));
        }
    }

    #[test]
    fn test_mutation_is_one_edit() {
        let mut rng = StdRng::seed_from_u64(12);
        for _ in 0..200 {
            let mutant = mutate("evolve", &mut rng);
            assert!(edit_distance("evolve", &mutant) <= 1);
            assert!(!mutant.is_empty());
        }
        assert_eq!(mutate("", &mut rng).chars().count(), 1);
    }

    #[tokio::test]
    async fn test_update_keeps_size_and_never_worsens() {
        let mut rng = StdRng::seed_from_u64(13);
        let mapper: Arc<dyn SolutionMapper<String, String>> = Arc::new(IdentityMapper);
        let fitness: Arc<dyn FitnessFunction<String, usize>> = Arc::new(TextFitness::new("abc"));
        let runner = TaskRunner::unbounded();
        let mut state = State::new();

        let population: Vec<TextIndividual> = ["xyz", "abd", "zzzz", "ab"]
            .iter()
            .map(|s| {
                let distance = edit_distance(s, "abc");
                Individual::new(s.to_string(), s.to_string(), distance, 0)
            })
            .collect();
        let ranked = DagPartialOrder::new(population, &FitnessOrder);

        let mut ctx = EvolutionContext {
            fitness: &fitness,
            mapper: &mapper,
            rng: &mut rng,
            runner: &runner,
            state: &mut state,
        };
        let next = PointMutation::new(8).update(&ranked, &mut ctx).await.unwrap();

        assert_eq!(next.len(), 4);
        assert!(*next[0].fitness() <= 1);
        assert!(next.windows(2).all(|w| w[0].fitness() <= w[1].fitness()));
        assert_eq!(state.births(), 8);
    }
}
