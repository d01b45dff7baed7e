//! Mapping and fitness capabilities
//!
//! Every fitness function exposes load statistics. Plain functions report no
//! invocation count, so the evaluator falls back to the birth counter; the
//! cache reports its real underlying invocations and load penalty.

use evolvo_common::{EvaluationError, MappingError};

/// Maps a genotype onto the solution it encodes
pub trait SolutionMapper<G, S>: Send + Sync {
    fn map(&self, genotype: &G) -> Result<S, MappingError>;
}

impl<G, S, M> SolutionMapper<G, S> for M
where
    M: Fn(&G) -> Result<S, MappingError> + Send + Sync,
{
    fn map(&self, genotype: &G) -> Result<S, MappingError> {
        self(genotype)
    }
}

/// Mapper returning a clone of the genotype
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityMapper;

impl<G: Clone> SolutionMapper<G, G> for IdentityMapper {
    fn map(&self, genotype: &G) -> Result<G, MappingError> {
        Ok(genotype.clone())
    }
}

/// Statistics about the underlying work of a fitness function
pub trait LoadStats: Send + Sync {
    /// Underlying (non-memoized) invocations, if tracked
    fn invocation_count(&self) -> Option<u64>;

    /// Mean wall-clock cost of one underlying invocation, in nanoseconds
    fn average_load_penalty(&self) -> f64;
}

/// Computes the fitness of a solution
pub trait FitnessFunction<S, F>: Send + Sync {
    fn evaluate(&self, solution: &S) -> Result<F, EvaluationError>;

    /// Underlying invocations; `None` when the function does not track them
    fn invocation_count(&self) -> Option<u64> {
        None
    }

    /// Mean cost of one underlying invocation in nanoseconds, 0 when untracked
    fn average_load_penalty(&self) -> f64 {
        0.0
    }
}

impl<S, F, E> FitnessFunction<S, F> for E
where
    E: Fn(&S) -> Result<F, EvaluationError> + Send + Sync,
{
    fn evaluate(&self, solution: &S) -> Result<F, EvaluationError> {
        self(solution)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_closures_as_capabilities() {
        let parse = |g: &String| {
            g.parse::<i64>()
                .map_err(|e| MappingError::new(format!("not a number: {}", e)))
        };
        let square = |s: &i64| Ok::<_, EvaluationError>(s * s);

        let solution = parse.map(&"12".to_string()).unwrap();
        assert_eq!(square.evaluate(&solution).unwrap(), 144);
        assert!(parse.map(&"x".to_string()).is_err());

        assert_eq!(FitnessFunction::<i64, i64>::invocation_count(&square), None);
        assert_eq!(FitnessFunction::<i64, i64>::average_load_penalty(&square), 0.0);
    }

    #[test]
    fn test_identity_mapper() {
        assert_eq!(IdentityMapper.map(&7u32).unwrap(), 7);
    }
}
