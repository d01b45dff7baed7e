//! Partial ordering of candidates
//!
//! Provides the comparator capability used to rank individuals that may be
//! incomparable, and the dominance DAG built from it:
//! - [`PartialComparator`]: `Some(Less)` when the left operand dominates
//! - [`FitnessOrder`]: lower fitness dominates, through `PartialOrd`
//! - [`ParetoDominance`]: component-wise dominance on objective vectors
//! - [`DagPartialOrder`]: arena of nodes with index-based dominance edges

pub mod dag;

pub use dag::DagPartialOrder;

use evolvo_common::Individual;
use std::cmp::Ordering;

/// Partial comparison between two values
///
/// `Some(Less)` means `a` dominates `b`, `Some(Greater)` means `b` dominates
/// `a`. `Some(Equal)` and `None` (incomparable) leave both undominated by
/// each other. Implementations must be pure: the ranker calls them from no
/// particular order.
pub trait PartialComparator<T>: Send + Sync {
    fn compare(&self, a: &T, b: &T) -> Option<Ordering>;
}

impl<T, C> PartialComparator<T> for C
where
    C: Fn(&T, &T) -> Option<Ordering> + Send + Sync,
{
    fn compare(&self, a: &T, b: &T) -> Option<Ordering> {
        self(a, b)
    }
}

/// Ranks individuals by their fitness' own `PartialOrd`; lower is better
#[derive(Debug, Clone, Copy, Default)]
pub struct FitnessOrder;

impl<G, S, F: PartialOrd> PartialComparator<Individual<G, S, F>> for FitnessOrder {
    fn compare(&self, a: &Individual<G, S, F>, b: &Individual<G, S, F>) -> Option<Ordering> {
        a.fitness().partial_cmp(b.fitness())
    }
}

/// Pareto dominance over objective vectors, every objective minimized
///
/// `a` dominates `b` when it is no worse on every objective and strictly
/// better on at least one. Vectors of different length, or containing NaN,
/// are incomparable.
#[derive(Debug, Clone, Copy, Default)]
pub struct ParetoDominance;

impl ParetoDominance {
    pub fn dominance(a: &[f64], b: &[f64]) -> Option<Ordering> {
        if a.len() != b.len() {
            return None;
        }
        let mut a_better = false;
        let mut b_better = false;
        for (x, y) in a.iter().zip(b) {
            match x.partial_cmp(y)? {
                Ordering::Less => a_better = true,
                Ordering::Greater => b_better = true,
                Ordering::Equal => {}
            }
        }
        match (a_better, b_better) {
            (true, false) => Some(Ordering::Less),
            (false, true) => Some(Ordering::Greater),
            (false, false) => Some(Ordering::Equal),
            (true, true) => None,
        }
    }
}

impl<G, S, F: AsRef<[f64]>> PartialComparator<Individual<G, S, F>> for ParetoDominance {
    fn compare(&self, a: &Individual<G, S, F>, b: &Individual<G, S, F>) -> Option<Ordering> {
        Self::dominance(a.fitness().as_ref(), b.fitness().as_ref())
    }
}
