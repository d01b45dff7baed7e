//! Individual: one evaluated candidate
//!
//! Pairs a genotype with the solution it maps to, the fitness of that
//! solution and the iteration in which it was born. Fields are private so an
//! individual cannot change once it has been built.

use serde::{Deserialize, Serialize};

/// One evaluated candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Individual<G, S, F> {
    genotype: G,
    solution: S,
    fitness: F,
    birth_iteration: u64,
}

impl<G, S, F> Individual<G, S, F> {
    pub fn new(genotype: G, solution: S, fitness: F, birth_iteration: u64) -> Self {
        Self {
            genotype,
            solution,
            fitness,
            birth_iteration,
        }
    }

    pub fn genotype(&self) -> &G {
        &self.genotype
    }

    pub fn solution(&self) -> &S {
        &self.solution
    }

    pub fn fitness(&self) -> &F {
        &self.fitness
    }

    /// Iteration counter value at the time of evaluation
    pub fn birth_iteration(&self) -> u64 {
        self.birth_iteration
    }

    /// Consume the individual, returning `(genotype, solution, fitness)`
    pub fn into_parts(self) -> (G, S, F) {
        (self.genotype, self.solution, self.fitness)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_accessors() {
        let individual = Individual::new(vec![1u8, 0, 1], "101".to_string(), 2.5f64, 3);

        assert_eq!(individual.genotype(), &vec![1, 0, 1]);
        assert_eq!(individual.solution(), "101");
        assert_eq!(*individual.fitness(), 2.5);
        assert_eq!(individual.birth_iteration(), 3);

        let (genotype, solution, fitness) = individual.into_parts();
        assert_eq!(genotype.len(), 3);
        assert_eq!(solution, "101");
        assert_eq!(fitness, 2.5);
    }
}
