//! # netmusic-cli
//!
//! The `netmusic` command-line tool:
//! - `build`: build or load the graph snapshot and print its statistics
//! - `sample`: sample a subgraph with a named strategy and export GEXF
//! - `train`: generate labels and features, fit and evaluate a decision tree
//! - `search`: randomized hyper-parameter search over decision trees
//! - `config`: print the effective configuration

#![warn(clippy::all)]
#![forbid(unsafe_code)]

pub mod cli;
pub mod commands;

pub use cli::{CacheArgs, Cli, Command, TrainingArgs};
pub use commands::run;
