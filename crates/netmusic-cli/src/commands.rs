//! Command handlers.
//!
//! Each handler takes the resolved configuration plus its command-line
//! overrides, runs one pipeline stage and prints a short report to stdout.

use std::fmt;
use std::path::{Path, PathBuf};

use netmusic_core::{Error, NetmusicConfig, Result};
use netmusic_dataset::{FeatureCache, LabelGenerator, TrainingData, node_features, random_embedding};
use netmusic_graph::{CacheOptions, GraphBuilder, GraphData, NodeType, Relationship, to_index_graph};
use netmusic_model::{
    Classifier, DecisionTreeClassifier, Metrics, ParamGrid, RandomizedSearch, SearchResult,
    TrainTestSplit, evaluate, train_test_split,
};
use netmusic_sampling::Sampler;
use netmusic_source::{DataLoader, TableSource};
use rand::SeedableRng;
use rand::rngs::StdRng;

use crate::cli::{CacheArgs, Command, TrainingArgs};

// ============================================================================
// Dispatch
// ============================================================================

/// Run one command against `config`.
pub fn run(config: &NetmusicConfig, command: Command) -> Result<()> {
    match command {
        Command::Build { social, cache } => {
            let summary = cmd_build(config, social, cache)?;
            println!("{summary}");
        }
        Command::Sample {
            algorithm,
            ratio,
            max_nodes,
            min_nodes,
            seed,
            output,
            social,
            cache,
        } => {
            let mut sampler = Sampler::from_config(algorithm, &config.sampling);
            if let Some(ratio) = ratio {
                sampler = sampler.with_ratio(ratio);
            }
            if min_nodes.is_some() || max_nodes.is_some() {
                sampler = sampler.with_bounds(
                    min_nodes.unwrap_or(config.sampling.min_nodes),
                    max_nodes.unwrap_or(config.sampling.max_nodes),
                );
            }
            if let Some(seed) = seed {
                sampler = sampler.with_seed(seed);
            }
            let (summary, path) = cmd_sample(config, &sampler, output.as_deref(), social, cache)?;
            println!("{summary}");
            println!("Wrote {}", path.display());
        }
        Command::Train { data } => {
            let metrics = cmd_train(config, &data)?;
            println!("{metrics}");
        }
        Command::Search {
            data,
            iterations,
            folds,
            json,
        } => {
            let report = cmd_search(config, &data, iterations, folds)?;
            if json {
                let rendered = serde_json::to_string_pretty(&report.result)
                    .map_err(|e| Error::model(format!("rendering search result: {e}")))?;
                println!("{rendered}");
            } else {
                println!("{report}");
            }
        }
        Command::Config => print!("{}", config.to_toml_string()?),
    }
    Ok(())
}

// ============================================================================
// Graph loading
// ============================================================================

/// Node and edge counts by type.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GraphSummary {
    pub users: usize,
    pub tracks: usize,
    pub follows: usize,
    pub likes: usize,
}

impl GraphSummary {
    pub fn of(graph: &GraphData) -> Self {
        let mut summary = Self {
            users: graph.nodes_of_type(NodeType::User).count(),
            tracks: graph.nodes_of_type(NodeType::Music).count(),
            ..Self::default()
        };
        for edge in graph.iter_edges() {
            match edge.relationship {
                Relationship::Follow => summary.follows += 1,
                Relationship::Like => summary.likes += 1,
            }
        }
        summary
    }
}

impl fmt::Display for GraphSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "nodes: {} ({} users, {} tracks)",
            self.users + self.tracks,
            self.users,
            self.tracks
        )?;
        write!(
            f,
            "edges: {} ({} follow, {} like)",
            self.follows + self.likes,
            self.follows,
            self.likes
        )
    }
}

fn builder(config: &NetmusicConfig) -> GraphBuilder<DataLoader> {
    GraphBuilder::new(DataLoader::from_config(config)).with_config(config)
}

fn cache_options(base: CacheOptions, cache: CacheArgs) -> CacheOptions {
    let use_cache = base.use_cache && !cache.no_cache;
    let save_cache = base.save_cache && !cache.no_save;
    base.with_use_cache(use_cache).with_save_cache(save_cache)
}

fn load_graph(
    config: &NetmusicConfig,
    builder: &GraphBuilder<DataLoader>,
    social: bool,
    cache: CacheArgs,
) -> Result<GraphData> {
    let full = cache_options(CacheOptions::full_from_config(config), cache);
    if social {
        let social = cache_options(CacheOptions::social_from_config(config), cache);
        builder.build_social_subgraph(&social, &full)
    } else {
        builder.build_graph(&full)
    }
}

// ============================================================================
// build / sample
// ============================================================================

pub fn cmd_build(config: &NetmusicConfig, social: bool, cache: CacheArgs) -> Result<GraphSummary> {
    let graph = load_graph(config, &builder(config), social, cache)?;
    Ok(GraphSummary::of(&graph))
}

pub fn cmd_sample(
    config: &NetmusicConfig,
    sampler: &Sampler,
    output: Option<&Path>,
    social: bool,
    cache: CacheArgs,
) -> Result<(GraphSummary, PathBuf)> {
    let graph = load_graph(config, &builder(config), social, cache)?;
    let (outcome, path) = sampler.sample_and_export(&graph, output)?;
    Ok((GraphSummary::of(&outcome.subgraph), path))
}

// ============================================================================
// train / search
// ============================================================================

/// Labelled, featurized pairs split into train and test parts.
pub fn prepare_training_data(
    config: &NetmusicConfig,
    args: &TrainingArgs,
) -> Result<(TrainingData, TrainTestSplit)> {
    let builder = builder(config);
    let graph = load_graph(config, &builder, false, args.cache)?;
    let index = to_index_graph(&graph);
    let seed = args.seed.unwrap_or(config.training.seed);
    let mut rng = StdRng::seed_from_u64(seed);

    let mut features_cache = FeatureCache::from_config(config);
    if args.cache.no_cache {
        features_cache = features_cache.with_read(false);
    }
    if args.cache.no_save {
        features_cache = features_cache.with_write(false);
    }
    let embedding = args
        .embedding
        .as_deref()
        .or(config.training.embedding_file.as_deref());
    let mut table = node_features(&index, &features_cache, embedding)?;
    if args.random_embedding {
        let random = random_embedding(&index, config.training.embedding_dimensions, &mut rng);
        table = table.join(&random);
    }

    let comments = builder.source().music_comments()?;
    let samples = args.samples.unwrap_or(config.training.samples);
    let ratio = args.ratio.unwrap_or(config.training.positive_ratio);
    let data = LabelGenerator::new(&index).training_data(&table, &comments, samples, ratio, &mut rng)?;
    if data.is_empty() {
        return Err(Error::config("no labelled pairs were generated"));
    }
    let split = train_test_split(&data.features, &data.labels, config.training.test_size, &mut rng)?;
    Ok((data, split))
}

pub fn cmd_train(config: &NetmusicConfig, args: &TrainingArgs) -> Result<Metrics> {
    let (_data, split) = prepare_training_data(config, args)?;
    let mut model = DecisionTreeClassifier::default();
    model.fit(&split.x_train, &split.y_train)?;
    let predicted = model.predict(&split.x_test)?;
    let metrics = evaluate(&split.y_test, &predicted)?;
    log::info!("{}: {metrics}", model.name());
    Ok(metrics)
}

/// Search outcome with the held-out score of the winning parameters.
#[derive(Clone, Debug)]
pub struct SearchReport {
    pub result: SearchResult,
    pub test_metrics: Metrics,
}

impl fmt::Display for SearchReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let p = &self.result.best_params;
        let depth = p
            .max_depth
            .map_or_else(|| "none".to_string(), |d| d.to_string());
        writeln!(
            f,
            "best: max_depth={depth} min_samples_split={} min_samples_leaf={}",
            p.min_samples_split, p.min_samples_leaf
        )?;
        writeln!(
            f,
            "cross-validated accuracy: {:.4} over {} candidates",
            self.result.best_score,
            self.result.trials.len()
        )?;
        write!(f, "test: {}", self.test_metrics)
    }
}

pub fn cmd_search(
    config: &NetmusicConfig,
    args: &TrainingArgs,
    iterations: Option<usize>,
    folds: Option<usize>,
) -> Result<SearchReport> {
    let (_data, split) = prepare_training_data(config, args)?;
    let search = RandomizedSearch::new(ParamGrid::default())
        .with_iterations(iterations.unwrap_or(RandomizedSearch::DEFAULT_ITERATIONS))
        .with_folds(folds.unwrap_or(RandomizedSearch::DEFAULT_FOLDS))
        .with_seed(args.seed.unwrap_or(config.training.seed));
    let result = search.fit(&split.x_train, &split.y_train)?;

    let mut model = DecisionTreeClassifier::new(result.best_params);
    model.fit(&split.x_train, &split.y_train)?;
    let test_metrics = evaluate(&split.y_test, &model.predict(&split.x_test)?)?;
    Ok(SearchReport {
        result,
        test_metrics,
    })
}

// ============================================================================
// Tests
// ============================================================================
