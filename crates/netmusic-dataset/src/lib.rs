//! Node features and link-prediction training data for Netmusic.
//!
//! - [`table`]: per-node [`FeatureTable`]s and their CSV form
//! - [`features`]: structural features with per-feature caches
//! - [`embedding`]: word2vec text embeddings and seeded random ones
//! - [`labels`]: positive and negative `(track, user)` pairs joined with
//!   endpoint features into [`TrainingData`]

pub mod embedding;
pub mod features;
pub mod labels;
mod proptests;
pub mod table;

pub use embedding::{random_embedding, read_word2vec};
pub use features::{FeatureCache, StructuralFeature, node_features, structural_features};
pub use labels::{LabelGenerator, LabelledPair, TrainingData};
pub use table::FeatureTable;
