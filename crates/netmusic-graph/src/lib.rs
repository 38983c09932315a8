//! Social/music interaction graph for Netmusic.
//!
//! This crate provides:
//!
//! - [`GraphData`]: a petgraph `DiGraph` of user and track nodes with an
//!   id lookup table, follow and like edges, and induced subgraphs
//! - [`GraphBuilder`]: assembles the graph from a
//!   [`TableSource`](netmusic_source::TableSource) in a fixed order, with
//!   snapshot caching
//! - [`cache`]: versioned bincode snapshots that tell a missing file from a
//!   corrupt one from a snapshot of the wrong graph variant
//! - [`IndexGraph`]: dense `0..N` vertex numbering with both lookup
//!   directions, plus an undirected simple view for structural algorithms
//! - [`algorithms`]: degree, betweenness, constraint and hierarchy
//! - [`export`]: GEXF output for visualization tools

pub mod algorithms;
pub mod builder;
pub mod cache;
pub mod export;
pub mod index;
mod proptests;
pub mod types;

pub use builder::{BuildStats, CacheOptions, GraphBuilder};
pub use cache::{CacheLookup, GraphVariant};
pub use index::{IndexGraph, to_index_graph};
pub use types::{
    Edge, EdgeInsert, GraphData, Node, NodeKind, NodeType, Relationship, TrackInfo, UserProfile,
};
