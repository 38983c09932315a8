//! Command-line arguments.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use netmusic_sampling::SamplerKind;

/// Netmusic - social/music graphs for link prediction
#[derive(Parser, Debug)]
#[command(name = "netmusic", version)]
#[command(about = "Build, sample and learn from the Netmusic social/music graph", long_about = None)]
pub struct Cli {
    /// Configuration file path (falls back to NETMUSIC_CONFIG, then defaults)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Snapshot cache switches shared by graph-loading commands.
#[derive(Args, Debug, Clone, Copy, Default)]
pub struct CacheArgs {
    /// Ignore existing snapshots and rebuild from the source tables
    #[arg(long)]
    pub no_cache: bool,

    /// Do not write snapshots after a build
    #[arg(long)]
    pub no_save: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build (or load) the graph and print its statistics
    Build {
        /// Build the user-only social subgraph
        #[arg(long)]
        social: bool,

        #[command(flatten)]
        cache: CacheArgs,
    },

    /// Sample a subgraph and export it as GEXF
    Sample {
        /// diffusion, diffusion-tree, forest-fire or common-neighbor-aware-random-walk
        algorithm: SamplerKind,

        /// Share of nodes to keep
        #[arg(long)]
        ratio: Option<f64>,

        /// Upper bound on the sample size
        #[arg(long)]
        max_nodes: Option<usize>,

        /// Lower bound on the sample size
        #[arg(long)]
        min_nodes: Option<usize>,

        /// Random seed
        #[arg(long)]
        seed: Option<u64>,

        /// Output file (default: <Strategy>_subgraph.gexf)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Sample the user-only social subgraph
        #[arg(long)]
        social: bool,

        #[command(flatten)]
        cache: CacheArgs,
    },

    /// Generate labels, fit a decision tree and report test metrics
    Train {
        #[command(flatten)]
        data: TrainingArgs,
    },

    /// Randomized hyper-parameter search for the decision tree
    Search {
        #[command(flatten)]
        data: TrainingArgs,

        /// Parameter combinations to try
        #[arg(long)]
        iterations: Option<usize>,

        /// Cross-validation folds
        #[arg(long)]
        folds: Option<usize>,

        /// Print the full result as JSON
        #[arg(long)]
        json: bool,
    },

    /// Print the effective configuration as TOML
    Config,
}

/// Overrides of the `[training]` section.
#[derive(Args, Debug, Clone, Default)]
pub struct TrainingArgs {
    /// Labelled pairs to generate
    #[arg(long)]
    pub samples: Option<usize>,

    /// Share of positive pairs
    #[arg(long)]
    pub ratio: Option<f64>,

    /// Random seed for labels and the split
    #[arg(long)]
    pub seed: Option<u64>,

    /// Word2vec embedding file to join with the structural features
    #[arg(long)]
    pub embedding: Option<PathBuf>,

    /// Join a seeded random embedding instead of a learned one
    #[arg(long, conflicts_with = "embedding")]
    pub random_embedding: bool,

    #[command(flatten)]
    pub cache: CacheArgs,
}

// ============================================================================
// Tests
// ============================================================================
