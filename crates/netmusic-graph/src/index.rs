//! Dense integer indexing of graph nodes.
//!
//! Sampling strategies and structural features work on vertices numbered
//! `0..N`. [`IndexGraph`] holds that numbering together with both lookup
//! directions. It is a snapshot: if the source graph gains nodes, build a
//! new one.

use std::collections::{HashMap, HashSet};

use petgraph::graph::{DiGraph, NodeIndex, UnGraph};
use petgraph::visit::EdgeRef;

use crate::types::{GraphData, NodeType, Relationship};

/// Integer-indexed copy of a [`GraphData`] with its id bijection.
///
/// Vertex `i` of [`IndexGraph::graph`] is `NodeIndex::new(i)`, and
/// `node_of_index[i]` is its original id. Node weights keep the node type
/// and edge weights keep the relationship; nothing else is copied.
#[derive(Clone, Debug)]
pub struct IndexGraph {
    pub graph: DiGraph<NodeType, Relationship>,
    index_of_node: HashMap<String, usize>,
    node_of_index: Vec<String>,
}

impl IndexGraph {
    /// Number the nodes of `source` in its insertion order.
    pub fn from_graph(source: &GraphData) -> Self {
        let n = source.node_count();
        let mut graph = DiGraph::with_capacity(n, source.edge_count());
        let mut index_of_node = HashMap::with_capacity(n);
        let mut node_of_index = Vec::with_capacity(n);
        let mut dense: HashMap<NodeIndex, NodeIndex> = HashMap::with_capacity(n);

        for idx in source.graph.node_indices() {
            let node = &source.graph[idx];
            let vertex = graph.add_node(node.node_type());
            index_of_node.insert(node.id.clone(), vertex.index());
            node_of_index.push(node.id.clone());
            dense.insert(idx, vertex);
        }
        for edge in source.graph.edge_references() {
            graph.add_edge(
                dense[&edge.source()],
                dense[&edge.target()],
                edge.weight().relationship,
            );
        }

        log::debug!(
            "Indexed graph: {} vertices, {} edges",
            graph.node_count(),
            graph.edge_count()
        );
        Self {
            graph,
            index_of_node,
            node_of_index,
        }
    }

    pub fn len(&self) -> usize {
        self.node_of_index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_of_index.is_empty()
    }

    /// Index assigned to a node id.
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.index_of_node.get(id).copied()
    }

    /// Node id at an index.
    pub fn node_of(&self, index: usize) -> Option<&str> {
        self.node_of_index.get(index).map(String::as_str)
    }

    pub fn index_of_node(&self) -> &HashMap<String, usize> {
        &self.index_of_node
    }

    pub fn node_of_index(&self) -> &[String] {
        &self.node_of_index
    }

    /// Node type at an index.
    pub fn node_type(&self, index: usize) -> Option<NodeType> {
        self.graph.node_weight(NodeIndex::new(index)).copied()
    }

    /// Indices of all nodes of one type, ascending.
    pub fn indices_of_type(&self, node_type: NodeType) -> Vec<usize> {
        self.graph
            .node_indices()
            .filter(|&v| self.graph[v] == node_type)
            .map(NodeIndex::index)
            .collect()
    }

    /// True if there is an edge `from → to`.
    pub fn has_edge(&self, from: usize, to: usize) -> bool {
        if from >= self.len() || to >= self.len() {
            return false;
        }
        self.graph
            .find_edge(NodeIndex::new(from), NodeIndex::new(to))
            .is_some()
    }

    /// Undirected simple view: one edge per adjacent pair, no self-loops,
    /// no attributes. Vertex `i` is still node `node_of_index[i]`.
    pub fn to_undirected(&self) -> UnGraph<(), ()> {
        let mut view = UnGraph::with_capacity(self.len(), self.graph.edge_count());
        for _ in 0..self.len() {
            view.add_node(());
        }
        let mut seen: HashSet<(usize, usize)> = HashSet::new();
        for edge in self.graph.edge_references() {
            let (a, b) = (edge.source().index(), edge.target().index());
            if a == b {
                continue;
            }
            if seen.insert((a.min(b), a.max(b))) {
                view.add_edge(NodeIndex::new(a), NodeIndex::new(b), ());
            }
        }
        view
    }

    /// Splits into `(graph, index_of_node, node_of_index)`.
    pub fn into_parts(
        self,
    ) -> (
        DiGraph<NodeType, Relationship>,
        HashMap<String, usize>,
        Vec<String>,
    ) {
        (self.graph, self.index_of_node, self.node_of_index)
    }
}

/// Build the integer-indexed copy of `graph`.
pub fn to_index_graph(graph: &GraphData) -> IndexGraph {
    IndexGraph::from_graph(graph)
}

// ============================================================================
// Tests
// ============================================================================
