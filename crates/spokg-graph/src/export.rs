//! Graph export for external renderers
//!
//! - Graphviz DOT (`dot -Tsvg graph.dot`)
//! - JSON node/edge lists

use petgraph::dot::Dot;
use serde::{Deserialize, Serialize};

use crate::KnowledgeGraph;
use spokg_core::{Result, Triple};

/// Serializable node and edge lists
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GraphExport {
    pub nodes: Vec<String>,
    pub edges: Vec<EdgeExport>,
}

/// One labeled edge
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeExport {
    pub source: String,
    pub predicate: String,
    pub target: String,
}

impl GraphExport {
    /// Rebuild the graph. Edges recreate nodes; isolated nodes cannot occur.
    pub fn into_graph(self) -> KnowledgeGraph {
        let triples: Vec<Triple> = self
            .edges
            .into_iter()
            .map(|edge| Triple::new(edge.source, edge.predicate, edge.target))
            .collect();
        KnowledgeGraph::from_triples(&triples)
    }
}

impl KnowledgeGraph {
    /// Graphviz DOT source with node names and predicate edge labels
    pub fn to_dot(&self) -> String {
        format!("{}", Dot::new(self.inner()))
    }

    /// Node and edge lists in insertion order
    pub fn to_export(&self) -> GraphExport {
        GraphExport {
            nodes: self.nodes().map(str::to_string).collect(),
            edges: self
                .edges()
                .map(|edge| EdgeExport {
                    source: edge.source.to_string(),
                    predicate: edge.predicate.to_string(),
                    target: edge.target.to_string(),
                })
                .collect(),
        }
    }

    /// Pretty-printed JSON of [`KnowledgeGraph::to_export`]
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.to_export())?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solar() -> KnowledgeGraph {
        KnowledgeGraph::from_triples(&[
            Triple::new("sun", "warm", "Earth"),
            Triple::new("Moon", "orbit", "Earth"),
            Triple::new("sun", "warm", "Earth"),
        ])
    }

    #[test]
    fn test_dot_contains_labels() {
        let dot = solar().to_dot();
        assert!(dot.starts_with("digraph"));
        assert!(dot.contains("\"sun\""));
        assert!(dot.contains("\"Moon\""));
        assert_eq!(dot.matches("\"warm\"").count(), 2);
        assert_eq!(dot.matches("->").count(), 3);
    }

    #[test]
    fn test_dot_escapes_quotes() {
        let kg = KnowledgeGraph::from_triples(&[Triple::new("\"Scrooge\"", "say", "humbug")]);
        let dot = kg.to_dot();
        assert!(dot.contains("\\\"Scrooge\\\""));
    }

    #[test]
    fn test_export_lists() {
        let export = solar().to_export();
        assert_eq!(export.nodes, vec!["sun", "Earth", "Moon"]);
        assert_eq!(export.edges.len(), 3);
        assert_eq!(
            export.edges[1],
            EdgeExport {
                source: "Moon".to_string(),
                predicate: "orbit".to_string(),
                target: "Earth".to_string(),
            }
        );
    }

    #[test]
    fn test_json_round_trip() {
        let kg = solar();
        let json = kg.to_json().unwrap();
        assert!(json.contains("\"predicate\": \"orbit\""));

        let export: GraphExport = serde_json::from_str(&json).unwrap();
        let rebuilt = export.into_graph();
        assert_eq!(rebuilt.triples(), kg.triples());
        assert_eq!(rebuilt.node_count(), kg.node_count());
    }

    #[test]
    fn test_empty_export() {
        let triples: Vec<Triple> = Vec::new();
        let export = KnowledgeGraph::from_triples(&triples).to_export();
        assert!(export.nodes.is_empty());
        assert!(export.edges.is_empty());
    }
}
