//! Dominance DAG over a population snapshot
//!
//! Nodes live in an arena (`Vec<T>`); edges are node indices. An edge
//! `a -> b` means "a is dominated by b". The structure is built once from a
//! population and never patched: a new population gets a new DAG.

use super::PartialComparator;
use std::cmp::Ordering;
use tracing::warn;

/// Partially ordered collection backed by an index-based dominance graph
#[derive(Debug, Clone)]
pub struct DagPartialOrder<T> {
    nodes: Vec<T>,
    /// Outgoing edges: indices of the nodes dominating each node
    dominators: Vec<Vec<usize>>,
    /// Incoming edges: indices of the nodes each node dominates
    dominated: Vec<Vec<usize>>,
}

impl<T> DagPartialOrder<T> {
    /// Rank `nodes`, calling `comparator` once per unordered pair
    pub fn new<C>(nodes: Vec<T>, comparator: &C) -> Self
    where
        C: PartialComparator<T> + ?Sized,
    {
        let n = nodes.len();
        let mut dominators = vec![Vec::new(); n];
        let mut dominated = vec![Vec::new(); n];

        for i in 0..n {
            for j in (i + 1)..n {
                match comparator.compare(&nodes[i], &nodes[j]) {
                    Some(Ordering::Less) => {
                        dominators[j].push(i);
                        dominated[i].push(j);
                    }
                    Some(Ordering::Greater) => {
                        dominators[i].push(j);
                        dominated[j].push(i);
                    }
                    Some(Ordering::Equal) | None => {}
                }
            }
        }

        Self {
            nodes,
            dominators,
            dominated,
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&T> {
        self.nodes.get(index)
    }

    /// All nodes, in insertion order
    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.nodes.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.nodes
    }

    pub fn into_inner(self) -> Vec<T> {
        self.nodes
    }

    /// Indices of the non-dominated nodes
    pub fn first_indices(&self) -> Vec<usize> {
        (0..self.nodes.len())
            .filter(|&i| self.dominators[i].is_empty())
            .collect()
    }

    /// The non-dominated nodes (the front)
    pub fn firsts(&self) -> Vec<&T> {
        self.first_indices()
            .into_iter()
            .map(|i| &self.nodes[i])
            .collect()
    }

    /// Nodes that dominate nothing
    pub fn lasts(&self) -> Vec<&T> {
        (0..self.nodes.len())
            .filter(|&i| self.dominated[i].is_empty())
            .map(|i| &self.nodes[i])
            .collect()
    }

    /// Indices of the nodes dominating `index`
    pub fn dominators_of(&self, index: usize) -> &[usize] {
        self.dominators.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Indices of the nodes dominated by `index`
    pub fn dominated_by(&self, index: usize) -> &[usize] {
        self.dominated.get(index).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Number of dominance edges in the graph
    pub fn edge_count(&self) -> usize {
        self.dominators.iter().map(Vec::len).sum()
    }

    /// Successive fronts, as node indices
    ///
    /// Layer 0 is the front; layer k holds the nodes whose dominators all sit
    /// in earlier layers. Every node appears in exactly one layer.
    pub fn layer_indices(&self) -> Vec<Vec<usize>> {
        let n = self.nodes.len();
        let mut remaining: Vec<usize> = self.dominators.iter().map(Vec::len).collect();
        let mut placed = vec![false; n];
        let mut current = self.first_indices();
        let mut layers = Vec::new();
        let mut placed_count = 0;

        while !current.is_empty() {
            let mut next = Vec::new();
            for &i in &current {
                placed[i] = true;
            }
            for &i in &current {
                for &j in &self.dominated[i] {
                    remaining[j] -= 1;
                    if remaining[j] == 0 && !placed[j] {
                        next.push(j);
                    }
                }
            }
            placed_count += current.len();
            layers.push(current);
            current = next;
        }

        if placed_count < n {
            // Only reachable with a comparator that is not a partial order
            warn!(
                unplaced = n - placed_count,
                "Dominance graph contains a cycle, grouping leftovers in a final layer"
            );
            layers.push((0..n).filter(|&i| !placed[i]).collect());
        }

        layers
    }

    /// Successive fronts, as node references
    pub fn layers(&self) -> Vec<Vec<&T>> {
        self.layer_indices()
            .into_iter()
            .map(|layer| layer.into_iter().map(|i| &self.nodes[i]).collect())
            .collect()
    }
}

impl<'a, T> IntoIterator for &'a DagPartialOrder<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.nodes.iter()
    }
}
