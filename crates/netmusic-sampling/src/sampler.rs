//! Sampler driver.
//!
//! Sampling is two-phase. The strategies see only the undirected,
//! attribute-free index view of the graph; the selected vertices are then
//! mapped back to node ids and the induced subgraph is taken from the
//! original typed, directed graph, so callers get every attribute back.

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use netmusic_core::config::SamplingConfig;
use netmusic_core::{Error, Result};
use netmusic_graph::export::save_gexf;
use netmusic_graph::{GraphData, to_index_graph};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::strategies::{
    CommonNeighborAwareRandomWalk, DEFAULT_BURN_PROBABILITY, Diffusion, DiffusionTree, ForestFire,
    SamplingStrategy,
};

// ============================================================================
// SamplerKind
// ============================================================================

/// Registered sampling algorithms.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SamplerKind {
    Diffusion,
    DiffusionTree,
    ForestFire,
    CommonNeighborAwareRandomWalk,
}

impl SamplerKind {
    pub const ALL: [SamplerKind; 4] = [
        SamplerKind::Diffusion,
        SamplerKind::DiffusionTree,
        SamplerKind::ForestFire,
        SamplerKind::CommonNeighborAwareRandomWalk,
    ];

    /// Name accepted on the command line.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Diffusion => "diffusion",
            Self::DiffusionTree => "diffusion-tree",
            Self::ForestFire => "forest-fire",
            Self::CommonNeighborAwareRandomWalk => "common-neighbor-aware-random-walk",
        }
    }

    /// Instantiate the strategy with its default parameters.
    pub fn strategy(&self) -> Result<Box<dyn SamplingStrategy>> {
        Ok(match self {
            Self::Diffusion => Box::new(Diffusion),
            Self::DiffusionTree => Box::new(DiffusionTree),
            Self::ForestFire => Box::new(ForestFire::new(DEFAULT_BURN_PROBABILITY)?),
            Self::CommonNeighborAwareRandomWalk => Box::new(CommonNeighborAwareRandomWalk),
        })
    }
}

impl fmt::Display for SamplerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SamplerKind {
    type Err = Error;

    /// Case-insensitive; `_` and `-` are interchangeable; `cnarw` is an alias.
    fn from_str(s: &str) -> Result<Self> {
        let normalized = s.trim().to_lowercase().replace('_', "-");
        match normalized.as_str() {
            "diffusion" => Ok(Self::Diffusion),
            "diffusion-tree" => Ok(Self::DiffusionTree),
            "forest-fire" => Ok(Self::ForestFire),
            "common-neighbor-aware-random-walk" | "cnarw" => {
                Ok(Self::CommonNeighborAwareRandomWalk)
            }
            _ => {
                let known: Vec<&str> = Self::ALL.iter().map(SamplerKind::name).collect();
                Err(Error::config(format!(
                    "Unknown sampler '{s}'. Expected one of: {}",
                    known.join(", ")
                )))
            }
        }
    }
}

// ============================================================================
// Sampler
// ============================================================================

/// Number of nodes to sample: `round(ratio × node_count)` clamped to
/// `[min_nodes, max_nodes]`, with `min_nodes` winning when the bounds cross.
pub fn target_size(node_count: usize, ratio: f64, min_nodes: usize, max_nodes: usize) -> usize {
    let scaled = (ratio * node_count as f64).round().max(0.0) as usize;
    scaled.min(max_nodes).max(min_nodes)
}

/// Result of one sampling run.
#[derive(Clone, Debug)]
pub struct SampleOutcome {
    /// Induced subgraph of the original graph over the selected nodes.
    pub subgraph: GraphData,
    /// Selected node ids, in selection order.
    pub selected: Vec<String>,
    pub target: usize,
}

/// Configured sampling run.
#[derive(Clone, Debug)]
pub struct Sampler {
    kind: SamplerKind,
    ratio: f64,
    min_nodes: usize,
    max_nodes: usize,
    seed: u64,
}

impl Sampler {
    /// A sampler with the default ratio and bounds.
    pub fn new(kind: SamplerKind) -> Self {
        Self::from_config(kind, &SamplingConfig::default())
    }

    /// Parse the algorithm name, rejecting unknown ones.
    pub fn from_name(name: &str) -> Result<Self> {
        Ok(Self::new(name.parse()?))
    }

    pub fn from_config(kind: SamplerKind, config: &SamplingConfig) -> Self {
        Self {
            kind,
            ratio: config.ratio,
            min_nodes: config.min_nodes,
            max_nodes: config.max_nodes,
            seed: config.seed,
        }
    }

    pub fn with_ratio(mut self, ratio: f64) -> Self {
        self.ratio = ratio;
        self
    }

    pub fn with_bounds(mut self, min_nodes: usize, max_nodes: usize) -> Self {
        self.min_nodes = min_nodes;
        self.max_nodes = max_nodes;
        self
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn kind(&self) -> SamplerKind {
        self.kind
    }

    /// Default export file name, e.g. `ForestFireSampler_subgraph.gexf`.
    pub fn default_file_name(&self) -> Result<String> {
        Ok(format!("{}_subgraph.gexf", self.kind.strategy()?.name()))
    }

    /// Sample `graph`.
    pub fn sample(&self, graph: &GraphData) -> Result<SampleOutcome> {
        let strategy = self.kind.strategy()?;
        let node_count = graph.node_count();
        let target = target_size(node_count, self.ratio, self.min_nodes, self.max_nodes);
        if target > node_count {
            return Err(Error::config(format!(
                "Cannot sample {target} nodes from a graph of {node_count}"
            )));
        }
        log::info!(
            "Start sampling with {}, {target} of {node_count} nodes",
            strategy.name()
        );

        let index = to_index_graph(graph);
        let view = index.to_undirected();
        let mut rng = StdRng::seed_from_u64(self.seed);
        let vertices = strategy.select(&view, target, &mut rng);

        let selected: Vec<String> = vertices
            .into_iter()
            .map(|v| {
                index
                    .node_of(v)
                    .map(str::to_string)
                    .ok_or_else(|| Error::not_found("node index", v.to_string()))
            })
            .collect::<Result<_>>()?;
        let subgraph = graph.induced_subgraph(&selected);
        log::info!(
            "Sampled subgraph: {} nodes, {} edges",
            subgraph.node_count(),
            subgraph.edge_count()
        );

        Ok(SampleOutcome {
            subgraph,
            selected,
            target,
        })
    }

    /// Sample `graph` and export the subgraph as GEXF to `path`, or to
    /// [`Sampler::default_file_name`] when no path is given.
    pub fn sample_and_export(
        &self,
        graph: &GraphData,
        path: Option<&Path>,
    ) -> Result<(SampleOutcome, PathBuf)> {
        let outcome = self.sample(graph)?;
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => PathBuf::from(self.default_file_name()?),
        };
        save_gexf(&outcome.subgraph, &path)?;
        Ok((outcome, path))
    }
}

// ============================================================================
// Tests
// ============================================================================
