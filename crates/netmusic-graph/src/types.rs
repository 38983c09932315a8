//! Core graph types for the social/music graph.
//!
//! The graph is heterogeneous: every node is either a user or a track, and
//! every edge is either a `follow` (user → user) or a `like` (user → track).
//! Node identity is the prefixed string produced by
//! [`netmusic_core::user_node_id`] / [`netmusic_core::music_node_id`], which
//! keeps both id spaces disjoint inside one graph.

use std::collections::{HashMap, HashSet};
use std::fmt;

use netmusic_core::util::ids::{music_node_id, user_node_id};
use netmusic_core::{Error, Result};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;
use serde::{Deserialize, Serialize};

// ============================================================================
// Relationship enum
// ============================================================================

/// Relationship types for graph edges.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Relationship {
    /// Source user follows target user.
    Follow,
    /// Source user commented on the target track.
    Like,
}

impl Relationship {
    /// Returns the relationship name as a string.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Follow => "follow",
            Self::Like => "like",
        }
    }
}

impl fmt::Display for Relationship {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// NodeType enum
// ============================================================================

/// Type of a graph node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    User,
    Music,
}

impl NodeType {
    /// Returns the type name used in exports.
    pub fn name(&self) -> &'static str {
        match self {
            Self::User => "user",
            Self::Music => "music",
        }
    }
}

impl fmt::Display for NodeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

// ============================================================================
// Node attributes
// ============================================================================

/// Profile fields attached to a user node from the user-info table.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub name: Option<String>,
    pub description: Option<String>,
}

/// Metadata attached to a track node from the music-data table.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackInfo {
    pub singer: Option<String>,
    pub album: Option<String>,
    pub comment_num: Option<i64>,
    pub play_list: Option<String>,
}

impl TrackInfo {
    /// True when no metadata row has been attached.
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// Variant-specific node payload.
///
/// The enum makes "both user and music" unrepresentable.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeKind {
    User(UserProfile),
    Music(TrackInfo),
}

// ============================================================================
// Node struct
// ============================================================================

/// A node in the social/music graph.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Node {
    /// Prefixed identifier (e.g. "user_42", "music_186016").
    pub id: String,
    pub kind: NodeKind,
}

impl Node {
    /// Creates a user node with an empty profile.
    pub fn user(user_id: i64) -> Self {
        Self {
            id: user_node_id(user_id),
            kind: NodeKind::User(UserProfile::default()),
        }
    }

    /// Creates a track node with no metadata.
    pub fn music(music_id: &str) -> Self {
        Self {
            id: music_node_id(music_id),
            kind: NodeKind::Music(TrackInfo::default()),
        }
    }

    /// Creates a node of the given type around an already-prefixed id.
    pub fn with_type(id: impl Into<String>, node_type: NodeType) -> Self {
        let kind = match node_type {
            NodeType::User => NodeKind::User(UserProfile::default()),
            NodeType::Music => NodeKind::Music(TrackInfo::default()),
        };
        Self {
            id: id.into(),
            kind,
        }
    }

    /// Replaces the profile of a user node.
    pub fn with_profile(mut self, profile: UserProfile) -> Self {
        self.kind = NodeKind::User(profile);
        self
    }

    /// Replaces the metadata of a track node.
    pub fn with_track_info(mut self, info: TrackInfo) -> Self {
        self.kind = NodeKind::Music(info);
        self
    }

    pub fn node_type(&self) -> NodeType {
        match self.kind {
            NodeKind::User(_) => NodeType::User,
            NodeKind::Music(_) => NodeType::Music,
        }
    }

    pub fn is_user(&self) -> bool {
        self.node_type() == NodeType::User
    }

    pub fn is_music(&self) -> bool {
        self.node_type() == NodeType::Music
    }

    /// Track metadata, if this is a track node.
    pub fn track_info(&self) -> Option<&TrackInfo> {
        match &self.kind {
            NodeKind::Music(info) => Some(info),
            NodeKind::User(_) => None,
        }
    }

    /// User profile, if this is a user node.
    pub fn profile(&self) -> Option<&UserProfile> {
        match &self.kind {
            NodeKind::User(profile) => Some(profile),
            NodeKind::Music(_) => None,
        }
    }
}

// ============================================================================
// Edge struct
// ============================================================================

/// A directed edge between two nodes.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Edge {
    /// Source node ID.
    pub from: String,
    /// Target node ID.
    pub to: String,
    pub relationship: Relationship,
    pub timestamp: i64,
    /// Like count of the originating comment; `None` for follow edges.
    pub liked_count: Option<i64>,
}

impl Edge {
    /// Creates a follow edge: `from` follows `to`.
    pub fn follow(from: impl Into<String>, to: impl Into<String>, timestamp: i64) -> Self {
        Self {
            from: from.into(),
            to: to.into(),
            relationship: Relationship::Follow,
            timestamp,
            liked_count: None,
        }
    }

    /// Creates a like edge from a user to a track.
    pub fn like(
        user: impl Into<String>,
        track: impl Into<String>,
        timestamp: i64,
        liked_count: i64,
    ) -> Self {
        Self {
            from: user.into(),
            to: track.into(),
            relationship: Relationship::Like,
            timestamp,
            liked_count: Some(liked_count),
        }
    }
}

/// Outcome of inserting an edge.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EdgeInsert {
    /// A new edge was created.
    Added,
    /// An edge between the same ordered pair existed and was overwritten.
    Merged,
}

// ============================================================================
// GraphData struct
// ============================================================================

/// Core graph data structure.
///
/// Wraps a petgraph `DiGraph` with an id → index lookup table. Nodes are
/// never removed, so petgraph indices stay dense and in insertion order.
/// There is at most one edge per ordered pair of nodes.
#[derive(Clone, Debug, Default)]
pub struct GraphData {
    /// The underlying directed graph.
    pub graph: DiGraph<Node, Edge>,
    /// Lookup table: node ID → petgraph NodeIndex.
    pub node_indices: HashMap<String, NodeIndex>,
}

impl GraphData {
    /// Creates an empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of nodes.
    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    /// Returns the number of edges.
    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Gets a node by ID.
    pub fn get_node(&self, id: &str) -> Option<&Node> {
        self.get_index(id).map(|idx| &self.graph[idx])
    }

    /// Gets a mutable node by ID.
    pub fn get_node_mut(&mut self, id: &str) -> Option<&mut Node> {
        let idx = self.get_index(id)?;
        Some(&mut self.graph[idx])
    }

    /// Gets the petgraph NodeIndex for a node ID.
    pub fn get_index(&self, id: &str) -> Option<NodeIndex> {
        self.node_indices.get(id).copied()
    }

    /// Checks if a node exists.
    pub fn contains_node(&self, id: &str) -> bool {
        self.node_indices.contains_key(id)
    }

    /// Returns an iterator over all node IDs, in insertion order.
    pub fn node_ids(&self) -> impl Iterator<Item = &str> {
        self.iter_nodes().map(|n| n.id.as_str())
    }

    /// Returns an iterator over all nodes, in insertion order.
    pub fn iter_nodes(&self) -> impl Iterator<Item = &Node> {
        self.graph.node_weights()
    }

    /// Returns an iterator over all edges.
    pub fn iter_edges(&self) -> impl Iterator<Item = &Edge> {
        self.graph.edge_weights()
    }

    /// Nodes of one type, in insertion order.
    pub fn nodes_of_type(&self, node_type: NodeType) -> impl Iterator<Item = &Node> {
        self.iter_nodes()
            .filter(move |n| n.node_type() == node_type)
    }

    /// Gets the edge from `from` to `to`, if any.
    pub fn get_edge(&self, from: &str, to: &str) -> Option<&Edge> {
        let a = self.get_index(from)?;
        let b = self.get_index(to)?;
        self.graph.find_edge(a, b).map(|e| &self.graph[e])
    }

    /// True if an edge `from → to` exists.
    pub fn has_edge(&self, from: &str, to: &str) -> bool {
        self.get_edge(from, to).is_some()
    }

    /// IDs of the nodes `id` points to.
    pub fn successors<'a>(&'a self, id: &str) -> impl Iterator<Item = &'a str> + 'a {
        let idx = self.get_index(id);
        idx.into_iter().flat_map(move |idx| {
            self.graph
                .neighbors(idx)
                .map(move |n| self.graph[n].id.as_str())
        })
    }

    /// Add a node.
    ///
    /// If a node with the same ID already exists, returns its existing index
    /// and leaves it unchanged.
    pub fn add_node(&mut self, node: Node) -> NodeIndex {
        if let Some(&existing_idx) = self.node_indices.get(&node.id) {
            return existing_idx;
        }
        let id = node.id.clone();
        let idx = self.graph.add_node(node);
        self.node_indices.insert(id, idx);
        idx
    }

    /// Add an edge between two nodes identified by ID.
    ///
    /// Both nodes must already exist. An existing edge between the same
    /// ordered pair is overwritten.
    pub fn add_edge(&mut self, edge: Edge) -> Result<EdgeInsert> {
        let from_idx = self
            .get_index(&edge.from)
            .ok_or_else(|| Error::not_found("node", &edge.from))?;
        let to_idx = self
            .get_index(&edge.to)
            .ok_or_else(|| Error::not_found("node", &edge.to))?;

        match self.graph.find_edge(from_idx, to_idx) {
            Some(existing) => {
                self.graph[existing] = edge;
                Ok(EdgeInsert::Merged)
            }
            None => {
                self.graph.add_edge(from_idx, to_idx, edge);
                Ok(EdgeInsert::Added)
            }
        }
    }

    // ========================================================================
    // Subgraphs
    // ========================================================================

    /// Induced subgraph over the given node IDs.
    ///
    /// Contains exactly the requested nodes that exist here, and every edge
    /// whose endpoints are both among them. Node order follows this graph.
    /// Unknown IDs are skipped.
    pub fn induced_subgraph<I, S>(&self, ids: I) -> GraphData
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut keep: HashSet<NodeIndex> = HashSet::new();
        for id in ids {
            match self.get_index(id.as_ref()) {
                Some(idx) => {
                    keep.insert(idx);
                }
                None => log::debug!("Induced subgraph: skipping unknown node {}", id.as_ref()),
            }
        }

        let mut sub = GraphData::new();
        for idx in self.graph.node_indices().filter(|idx| keep.contains(idx)) {
            sub.add_node(self.graph[idx].clone());
        }
        for edge in self.graph.edge_references() {
            if keep.contains(&edge.source()) && keep.contains(&edge.target()) {
                let from = sub.node_indices[&self.graph[edge.source()].id];
                let to = sub.node_indices[&self.graph[edge.target()].id];
                sub.graph.add_edge(from, to, edge.weight().clone());
            }
        }
        sub
    }

    /// Induced subgraph over user nodes only.
    pub fn social_subgraph(&self) -> GraphData {
        let users: Vec<String> = self
            .nodes_of_type(NodeType::User)
            .map(|n| n.id.clone())
            .collect();
        self.induced_subgraph(users)
    }
}

/// Graphs are equal when they hold the same nodes and the same edges, with
/// identical attributes. Insertion order is irrelevant.
impl PartialEq for GraphData {
    fn eq(&self, other: &Self) -> bool {
        if self.node_count() != other.node_count() || self.edge_count() != other.edge_count() {
            return false;
        }
        let nodes_match = self
            .iter_nodes()
            .all(|n| other.get_node(&n.id) == Some(n));
        nodes_match
            && self
                .iter_edges()
                .all(|e| other.get_edge(&e.from, &e.to) == Some(e))
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn toy_graph() -> GraphData {
        let mut g = GraphData::new();
        for uid in 1..=3 {
            g.add_node(Node::user(uid));
        }
        g.add_node(Node::music("t1"));
        g.add_node(Node::music("t2"));
        g.add_edge(Edge::like("user_1", "music_t1", 10, 0)).unwrap();
        g.add_edge(Edge::like("user_2", "music_t1", 20, 3)).unwrap();
        g.add_edge(Edge::follow("user_1", "user_2", 5)).unwrap();
        g
    }

    // ------------------------------------------------------------------------
    // Relationship / NodeType tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_relationship_names() {
        assert_eq!(Relationship::Follow.name(), "follow");
        assert_eq!(Relationship::Like.to_string(), "like");
    }

    #[test]
    fn test_node_type_names() {
        assert_eq!(NodeType::User.name(), "user");
        assert_eq!(NodeType::Music.to_string(), "music");
    }

    // ------------------------------------------------------------------------
    // Node tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_node_constructors() {
        let user = Node::user(7);
        assert_eq!(user.id, "user_7");
        assert!(user.is_user());
        assert!(!user.is_music());
        assert!(user.track_info().is_none());

        let track = Node::music(" 186016 ");
        assert_eq!(track.id, "music_186016");
        assert_eq!(track.node_type(), NodeType::Music);
        assert!(track.track_info().is_some_and(TrackInfo::is_empty));
    }

    #[test]
    fn test_node_with_type() {
        let node = Node::with_type("music_x", NodeType::Music);
        assert!(node.is_music());
        let node = Node::with_type("user_1", NodeType::User);
        assert_eq!(node.profile(), Some(&UserProfile::default()));
    }

    #[test]
    fn test_node_with_track_info() {
        let info = TrackInfo {
            singer: Some("S".into()),
            ..Default::default()
        };
        let node = Node::music("1").with_track_info(info.clone());
        assert_eq!(node.track_info(), Some(&info));
        assert!(!info.is_empty());
    }

    // ------------------------------------------------------------------------
    // Edge tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_edge_constructors() {
        let f = Edge::follow("user_1", "user_2", 9);
        assert_eq!(f.relationship, Relationship::Follow);
        assert_eq!(f.liked_count, None);

        let l = Edge::like("user_1", "music_1", 9, 4);
        assert_eq!(l.relationship, Relationship::Like);
        assert_eq!(l.liked_count, Some(4));
    }

    // ------------------------------------------------------------------------
    // GraphData tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_graph_data_counts() {
        let g = toy_graph();
        assert_eq!(g.node_count(), 5);
        assert_eq!(g.edge_count(), 3);
        assert_eq!(g.nodes_of_type(NodeType::User).count(), 3);
        assert_eq!(g.nodes_of_type(NodeType::Music).count(), 2);
    }

    #[test]
    fn test_add_node_existing_returns_same_index() {
        let mut g = GraphData::new();
        let a = g.add_node(Node::user(1));
        let b = g.add_node(Node::user(1).with_profile(UserProfile {
            name: Some("ignored".into()),
            description: None,
        }));
        assert_eq!(a, b);
        assert_eq!(g.node_count(), 1);
        assert_eq!(g.get_node("user_1").unwrap().profile().unwrap().name, None);
    }

    #[test]
    fn test_add_edge_missing_node() {
        let mut g = GraphData::new();
        g.add_node(Node::user(1));
        let err = g.add_edge(Edge::follow("user_1", "user_2", 0)).unwrap_err();
        assert!(err.to_string().contains("user_2"));
    }

    #[test]
    fn test_add_edge_overwrites_same_pair() {
        let mut g = toy_graph();
        let outcome = g.add_edge(Edge::like("user_1", "music_t1", 99, 7)).unwrap();
        assert_eq!(outcome, EdgeInsert::Merged);
        assert_eq!(g.edge_count(), 3);
        let edge = g.get_edge("user_1", "music_t1").unwrap();
        assert_eq!(edge.timestamp, 99);
        assert_eq!(edge.liked_count, Some(7));
    }

    #[test]
    fn test_reverse_pair_is_distinct_edge() {
        let mut g = toy_graph();
        let outcome = g.add_edge(Edge::follow("user_2", "user_1", 1)).unwrap();
        assert_eq!(outcome, EdgeInsert::Added);
        assert!(g.has_edge("user_1", "user_2"));
        assert!(g.has_edge("user_2", "user_1"));
    }

    #[test]
    fn test_successors() {
        let g = toy_graph();
        let mut succ: Vec<&str> = g.successors("user_1").collect();
        succ.sort();
        assert_eq!(succ, vec!["music_t1", "user_2"]);
        assert_eq!(g.successors("missing").count(), 0);
    }

    #[test]
    fn test_get_node_mut() {
        let mut g = toy_graph();
        if let Some(node) = g.get_node_mut("music_t2") {
            node.kind = NodeKind::Music(TrackInfo {
                album: Some("A".into()),
                ..Default::default()
            });
        }
        let info = g.get_node("music_t2").unwrap().track_info().unwrap();
        assert_eq!(info.album.as_deref(), Some("A"));
    }

    // ------------------------------------------------------------------------
    // Subgraph tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_induced_subgraph() {
        let g = toy_graph();
        let sub = g.induced_subgraph(["user_1", "music_t1", "user_3", "nope"]);
        assert_eq!(sub.node_count(), 3);
        assert_eq!(sub.edge_count(), 1);
        assert!(sub.has_edge("user_1", "music_t1"));
        assert!(!sub.contains_node("user_2"));
    }

    #[test]
    fn test_induced_subgraph_keeps_attributes() {
        let g = toy_graph();
        let sub = g.induced_subgraph(["user_2", "music_t1"]);
        let edge = sub.get_edge("user_2", "music_t1").unwrap();
        assert_eq!(edge.timestamp, 20);
        assert_eq!(edge.liked_count, Some(3));
    }

    #[test]
    fn test_social_subgraph() {
        let g = toy_graph();
        let social = g.social_subgraph();
        assert_eq!(social.node_count(), 3);
        assert_eq!(social.edge_count(), 1);
        assert!(social.iter_nodes().all(Node::is_user));
    }

    // ------------------------------------------------------------------------
    // Equality tests
    // ------------------------------------------------------------------------

    #[test]
    fn test_equality_ignores_insertion_order() {
        let a = toy_graph();
        let mut b = GraphData::new();
        b.add_node(Node::music("t2"));
        b.add_node(Node::music("t1"));
        for uid in (1..=3).rev() {
            b.add_node(Node::user(uid));
        }
        b.add_edge(Edge::follow("user_1", "user_2", 5)).unwrap();
        b.add_edge(Edge::like("user_2", "music_t1", 20, 3)).unwrap();
        b.add_edge(Edge::like("user_1", "music_t1", 10, 0)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn test_equality_detects_attribute_change() {
        let a = toy_graph();
        let mut b = toy_graph();
        b.add_edge(Edge::like("user_1", "music_t1", 11, 0)).unwrap();
        assert_ne!(a, b);
    }
}
