//! Subgraph sampling for Netmusic.
//!
//! [`Sampler`] sizes the sample from a ratio and bounds, runs one of the
//! registered [`SamplingStrategy`] implementations on the undirected index
//! view, and returns the induced subgraph of the original graph.
//!
//! ```
//! use netmusic_graph::{Edge, GraphData, Node};
//! use netmusic_sampling::{Sampler, SamplerKind};
//!
//! let mut graph = GraphData::new();
//! for id in 0..10 {
//!     graph.add_node(Node::user(id));
//! }
//! for id in 0..9 {
//!     graph
//!         .add_edge(Edge::follow(format!("user_{id}"), format!("user_{}", id + 1), 0))
//!         .unwrap();
//! }
//!
//! let outcome = Sampler::new(SamplerKind::Diffusion)
//!     .with_ratio(0.5)
//!     .sample(&graph)
//!     .unwrap();
//! assert_eq!(outcome.subgraph.node_count(), 5);
//! ```

pub mod sampler;
pub mod strategies;

mod proptests;

pub use sampler::{SampleOutcome, Sampler, SamplerKind, target_size};
pub use strategies::{
    CommonNeighborAwareRandomWalk, Diffusion, DiffusionTree, ForestFire, SamplingStrategy,
    StructuralGraph,
};
