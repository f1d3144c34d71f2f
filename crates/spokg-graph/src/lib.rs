//! SPOKG Graph - Knowledge graph construction
//!
//! Folds an ordered triple sequence into a directed multigraph:
//! subjects and objects become nodes (identified by their exact text),
//! each triple becomes one edge labeled with its predicate.

use std::collections::HashMap;

use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;

use spokg_core::Triple;

pub mod export;

pub use export::{EdgeExport, GraphExport};

// ============================================================================
// Graph Builder
// ============================================================================

/// Accumulates triples into a graph; consumed by [`GraphBuilder::build`]
#[derive(Debug, Default)]
pub struct GraphBuilder {
    graph: DiGraph<String, String>,
    /// Node text -> node index
    node_index: HashMap<String, NodeIndex>,
}

impl GraphBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-size for an expected number of triples
    pub fn with_capacity(triples: usize) -> Self {
        Self {
            graph: DiGraph::with_capacity(triples * 2, triples),
            node_index: HashMap::with_capacity(triples * 2),
        }
    }

    /// Add one edge `subject -> object` labeled with the predicate.
    /// Repeated triples produce parallel edges.
    pub fn add_triple(&mut self, triple: &Triple) -> &mut Self {
        let subject = self.get_or_create_node(&triple.subject);
        let object = self.get_or_create_node(&triple.object);
        self.graph.add_edge(subject, object, triple.predicate.clone());
        self
    }

    pub fn extend<'a>(&mut self, triples: impl IntoIterator<Item = &'a Triple>) -> &mut Self {
        for triple in triples {
            self.add_triple(triple);
        }
        self
    }

    fn get_or_create_node(&mut self, text: &str) -> NodeIndex {
        if let Some(&index) = self.node_index.get(text) {
            return index;
        }
        let index = self.graph.add_node(text.to_string());
        self.node_index.insert(text.to_string(), index);
        index
    }

    /// Freeze the graph
    pub fn build(self) -> KnowledgeGraph {
        tracing::debug!(
            nodes = self.graph.node_count(),
            edges = self.graph.edge_count(),
            "Knowledge graph built"
        );
        KnowledgeGraph {
            graph: self.graph,
            node_index: self.node_index,
        }
    }
}

// ============================================================================
// Knowledge Graph
// ============================================================================

/// A read-only directed multigraph of extracted facts.
///
/// # Example
///
/// ```rust
/// use spokg_core::Triple;
/// use spokg_graph::KnowledgeGraph;
///
/// let kg = KnowledgeGraph::from_triples(&[
///     Triple::new("sun", "warm", "Earth"),
///     Triple::new("sun", "light", "Earth"),
/// ]);
///
/// assert_eq!(kg.node_count(), 2);
/// assert_eq!(kg.edge_count(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct KnowledgeGraph {
    graph: DiGraph<String, String>,
    node_index: HashMap<String, NodeIndex>,
}

/// One edge of the graph, borrowed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GraphEdge<'a> {
    pub source: &'a str,
    pub predicate: &'a str,
    pub target: &'a str,
}

impl GraphEdge<'_> {
    pub fn to_triple(&self) -> Triple {
        Triple::new(self.source, self.predicate, self.target)
    }
}

impl KnowledgeGraph {
    /// Build a graph from an ordered triple sequence
    pub fn from_triples<'a>(triples: impl IntoIterator<Item = &'a Triple>) -> Self {
        let mut builder = GraphBuilder::new();
        builder.extend(triples);
        builder.build()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn is_empty(&self) -> bool {
        self.graph.node_count() == 0
    }

    pub fn contains_node(&self, text: &str) -> bool {
        self.node_index.contains_key(text)
    }

    /// Node texts in insertion order
    pub fn nodes(&self) -> impl Iterator<Item = &str> + '_ {
        self.graph.node_weights().map(String::as_str)
    }

    /// Edges in insertion order
    pub fn edges(&self) -> impl Iterator<Item = GraphEdge<'_>> + '_ {
        self.graph.edge_indices().filter_map(move |edge| {
            let (source, target) = self.graph.edge_endpoints(edge)?;
            Some(GraphEdge {
                source: &self.graph[source],
                predicate: &self.graph[edge],
                target: &self.graph[target],
            })
        })
    }

    /// Triples recovered from the edges, in insertion order
    pub fn triples(&self) -> Vec<Triple> {
        self.edges().map(|edge| edge.to_triple()).collect()
    }

    /// Number of outgoing edges of a node (0 for unknown nodes)
    pub fn out_degree(&self, text: &str) -> usize {
        self.node_index
            .get(text)
            .map(|&index| {
                self.graph
                    .edges_directed(index, Direction::Outgoing)
                    .count()
            })
            .unwrap_or(0)
    }

    /// Predicates of all edges from `source` to `target`, in insertion order
    pub fn relations_between<'a>(&'a self, source: &'a str, target: &'a str) -> Vec<&'a str> {
        self.edges()
            .filter(|edge| edge.source == source && edge.target == target)
            .map(|edge| edge.predicate)
            .collect()
    }

    pub(crate) fn inner(&self) -> &DiGraph<String, String> {
        &self.graph
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_graph() {
        let triples: Vec<Triple> = Vec::new();
        let kg = KnowledgeGraph::from_triples(&triples);
        assert!(kg.is_empty());
        assert_eq!(kg.node_count(), 0);
        assert_eq!(kg.edge_count(), 0);
    }

    #[test]
    fn test_nodes_deduplicated_by_literal_text() {
        let kg = KnowledgeGraph::from_triples(&[
            Triple::new("sun", "warm", "Earth"),
            Triple::new("Moon", "orbit", "Earth"),
            Triple::new("moon", "orbit", "the Earth"),
        ]);

        assert_eq!(kg.node_count(), 5);
        assert!(kg.contains_node("Moon"));
        assert!(kg.contains_node("moon"));
        assert!(kg.contains_node("the Earth"));
        assert!(!kg.contains_node("earth"));
    }

    #[test]
    fn test_parallel_edges_preserved() {
        let kg = KnowledgeGraph::from_triples(&[
            Triple::new("sun", "warm", "Earth"),
            Triple::new("sun", "light", "Earth"),
            Triple::new("sun", "warm", "Earth"),
        ]);

        assert_eq!(kg.node_count(), 2);
        assert_eq!(kg.edge_count(), 3);
        assert_eq!(
            kg.relations_between("sun", "Earth"),
            vec!["warm", "light", "warm"]
        );
        assert!(kg.relations_between("Earth", "sun").is_empty());
        assert_eq!(kg.out_degree("sun"), 3);
        assert_eq!(kg.out_degree("Earth"), 0);
        assert_eq!(kg.out_degree("Mars"), 0);
    }

    #[test]
    fn test_self_loop() {
        let kg = KnowledgeGraph::from_triples(&[Triple::new("Narcissus", "love", "Narcissus")]);
        assert_eq!(kg.node_count(), 1);
        assert_eq!(kg.edge_count(), 1);
    }

    #[test]
    fn test_edges_round_trip_in_order() {
        let triples = vec![
            Triple::new("cats", "chase", "mice"),
            Triple::new("dogs", "chase", "cats"),
            Triple::new("cats", "chase", "mice"),
        ];
        let kg = KnowledgeGraph::from_triples(&triples);
        assert_eq!(kg.triples(), triples);

        let nodes: Vec<&str> = kg.nodes().collect();
        assert_eq!(nodes, vec!["cats", "mice", "dogs"]);
    }

    #[test]
    fn test_builder_chaining() {
        let mut builder = GraphBuilder::with_capacity(2);
        builder
            .add_triple(&Triple::new("a", "p", "b"))
            .add_triple(&Triple::new("b", "q", "c"));
        let kg = builder.build();
        assert_eq!(kg.edge_count(), 2);
        assert_eq!(kg.node_count(), 3);
    }
}
