//! Netmusic, umbrella crate.
//!
//! Re-exports the Netmusic components: the source tables, the social/music
//! graph with its snapshot cache and index mapping, subgraph sampling,
//! link-prediction datasets and the models trained on them. Sampling,
//! datasets and models sit behind feature flags (all on by default).

pub use netmusic_core as core;
pub use netmusic_graph as graph;
pub use netmusic_source as source;

pub use netmusic_core::{Error, NetmusicConfig, Result};

#[cfg(feature = "sampling")]
pub use netmusic_sampling as sampling;

#[cfg(feature = "dataset")]
pub use netmusic_dataset as dataset;

#[cfg(feature = "model")]
pub use netmusic_model as model;
