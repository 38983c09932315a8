//! Structural node features with per-feature caching.
//!
//! Each [`StructuralFeature`] is computed on the index graph and cached in
//! its own CSV file under a features directory. A readable cache file
//! short-circuits the computation; an unreadable one is logged and
//! recomputed.

use std::fmt;
use std::path::{Path, PathBuf};

use netmusic_core::{NetmusicConfig, Result};
use netmusic_graph::IndexGraph;
use netmusic_graph::algorithms::{betweenness_centrality, constraint, degree_centrality, hierarchy};

use crate::embedding::read_word2vec;
use crate::table::FeatureTable;

/// A per-node structural measure.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StructuralFeature {
    Degree,
    Betweenness,
    Constraint,
    Hierarchy,
}

impl StructuralFeature {
    pub const ALL: [StructuralFeature; 4] = [
        StructuralFeature::Degree,
        StructuralFeature::Betweenness,
        StructuralFeature::Constraint,
        StructuralFeature::Hierarchy,
    ];

    /// Column name of the feature.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Degree => "degree",
            Self::Betweenness => "bet_cen",
            Self::Constraint => "cons",
            Self::Hierarchy => "hier",
        }
    }

    /// Cache file name of the feature.
    pub fn file_name(&self) -> String {
        format!("{}.csv", self.name())
    }

    /// Compute the feature for every node of `index`.
    pub fn compute(&self, index: &IndexGraph) -> FeatureTable {
        let values = match self {
            Self::Degree => degree_centrality(&index.graph)
                .into_iter()
                .map(|score| score.degree)
                .collect(),
            Self::Betweenness => betweenness_centrality(&index.graph),
            Self::Constraint => constraint(&index.graph),
            Self::Hierarchy => hierarchy(&index.graph),
        };
        FeatureTable::from_column(self.name(), &values)
    }
}

impl fmt::Display for StructuralFeature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Where feature tables are cached, if anywhere.
#[derive(Clone, Debug)]
pub struct FeatureCache {
    dir: Option<PathBuf>,
    read: bool,
    write: bool,
}

impl FeatureCache {
    /// Read and write cache files under `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: Some(dir.into()),
            read: true,
            write: true,
        }
    }

    /// Always compute, never touch the filesystem.
    pub fn disabled() -> Self {
        Self {
            dir: None,
            read: false,
            write: false,
        }
    }

    /// Cache settings from the `[cache]` section.
    pub fn from_config(config: &NetmusicConfig) -> Self {
        Self::new(&config.cache.features_dir)
            .with_read(config.cache.use_cache)
            .with_write(config.cache.save_cache)
    }

    /// Whether existing cache files are used.
    pub fn with_read(mut self, read: bool) -> Self {
        self.read = read;
        self
    }

    /// Whether computed features are written back.
    pub fn with_write(mut self, write: bool) -> Self {
        self.write = write;
        self
    }

    /// Cache file for a feature.
    pub fn path_for(&self, feature: StructuralFeature) -> Option<PathBuf> {
        self.dir.as_ref().map(|dir| dir.join(feature.file_name()))
    }

    /// Load `feature` from its cache file, or compute and cache it.
    pub fn load_or_compute(
        &self,
        feature: StructuralFeature,
        index: &IndexGraph,
    ) -> Result<FeatureTable> {
        let path = self.path_for(feature);
        if self.read
            && let Some(path) = path.as_deref()
            && path.exists()
        {
            match FeatureTable::read_csv(path, index) {
                Ok(table) if covers(&table, feature, index) => {
                    log::info!("Loaded {feature} from {}", path.display());
                    return Ok(table);
                }
                Ok(table) => log::warn!(
                    "Ignoring stale {feature} cache {}: {} of {} nodes",
                    path.display(),
                    table.len(),
                    index.len()
                ),
                Err(e) => log::warn!("Ignoring unreadable {feature} cache {}: {e}", path.display()),
            }
        }

        log::info!("Computing {feature} for {} nodes", index.len());
        let table = feature.compute(index);
        if self.write
            && let Some(path) = path.as_deref()
        {
            table.write_csv(path, index)?;
            log::debug!("Cached {feature} to {}", path.display());
        }
        Ok(table)
    }
}

/// A cached table is usable only if it holds exactly the feature's column
/// and a row for every node of the current index.
fn covers(table: &FeatureTable, feature: StructuralFeature, index: &IndexGraph) -> bool {
    table.columns() == [feature.name()] && table.len() == index.len()
}

/// All structural features, joined column-wise in [`StructuralFeature::ALL`]
/// order.
pub fn structural_features(index: &IndexGraph, cache: &FeatureCache) -> Result<FeatureTable> {
    let mut features = StructuralFeature::ALL.iter();
    let Some(first) = features.next() else {
        return Ok(FeatureTable::default());
    };
    let mut table = cache.load_or_compute(*first, index)?;
    for feature in features {
        table = table.join(&cache.load_or_compute(*feature, index)?);
    }
    Ok(table)
}

/// Structural features, joined with a word2vec embedding when one is given.
pub fn node_features(
    index: &IndexGraph,
    cache: &FeatureCache,
    embedding: Option<&Path>,
) -> Result<FeatureTable> {
    let structural = structural_features(index, cache)?;
    match embedding {
        Some(path) => Ok(structural.join(&read_word2vec(path, index)?)),
        None => Ok(structural),
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use netmusic_graph::{Edge, GraphData, Node, to_index_graph};
    use tempfile::tempdir;

    /// Star: user_0 follows users 1..=3.
    fn star_index() -> IndexGraph {
        let mut g = GraphData::new();
        for u in 0..4 {
            g.add_node(Node::user(u));
        }
        for u in 1..4 {
            g.add_edge(Edge::follow("user_0", format!("user_{u}"), 0)).unwrap();
        }
        to_index_graph(&g)
    }

    // ------------------------------------------------------------------------
    // Computation
    // ------------------------------------------------------------------------

    #[test]
    fn test_feature_names() {
        let names: Vec<&str> = StructuralFeature::ALL.iter().map(|f| f.name()).collect();
        assert_eq!(names, vec!["degree", "bet_cen", "cons", "hier"]);
        assert_eq!(StructuralFeature::Constraint.file_name(), "cons.csv");
    }

    #[test]
    fn test_compute_degree() {
        let index = star_index();
        let table = StructuralFeature::Degree.compute(&index);
        let centre = index.index_of("user_0").unwrap();
        assert_eq!(table.len(), 4);
        assert!((table.row(centre).unwrap()[0] - 1.0).abs() < 1e-9);
    }

    #[test]
    fn test_structural_features_without_cache() {
        let index = star_index();
        let table = structural_features(&index, &FeatureCache::disabled()).unwrap();
        assert_eq!(table.columns(), &["degree", "bet_cen", "cons", "hier"]);
        assert_eq!(table.len(), 4);
    }

    // ------------------------------------------------------------------------
    // Caching
    // ------------------------------------------------------------------------

    #[test]
    fn test_cache_written_and_reused() {
        let dir = tempdir().unwrap();
        let cache = FeatureCache::new(dir.path());
        let index = star_index();

        let computed = cache
            .load_or_compute(StructuralFeature::Betweenness, &index)
            .unwrap();
        let path = dir.path().join("bet_cen.csv");
        assert!(path.exists());

        // Overwrite the cache with sentinel values; a cache hit returns them.
        let mut sentinel = FeatureTable::new(["bet_cen"]);
        for i in 0..index.len() {
            sentinel.insert(i, vec![42.0]).unwrap();
        }
        sentinel.write_csv(&path, &index).unwrap();
        let loaded = cache
            .load_or_compute(StructuralFeature::Betweenness, &index)
            .unwrap();
        assert_eq!(loaded, sentinel);
        assert_ne!(loaded, computed);
    }

    #[test]
    fn test_cache_read_disabled_recomputes() {
        let dir = tempdir().unwrap();
        let index = star_index();
        let path = dir.path().join("degree.csv");
        std::fs::write(&path, "id,degree\nuser_0,99\n").unwrap();

        let cache = FeatureCache::new(dir.path()).with_read(false);
        let table = cache.load_or_compute(StructuralFeature::Degree, &index).unwrap();
        assert_eq!(table.len(), 4);
        // And the stale file was refreshed.
        let refreshed = FeatureTable::read_csv(&path, &index).unwrap();
        assert_eq!(refreshed, table);
    }

    #[test]
    fn test_cache_write_disabled() {
        let dir = tempdir().unwrap();
        let cache = FeatureCache::new(dir.path()).with_write(false);
        cache
            .load_or_compute(StructuralFeature::Hierarchy, &star_index())
            .unwrap();
        assert!(!dir.path().join("hier.csv").exists());
    }

    #[test]
    fn test_corrupt_cache_recomputed() {
        let dir = tempdir().unwrap();
        let index = star_index();
        std::fs::write(dir.path().join("cons.csv"), "id,cons\nuser_0,oops\n").unwrap();
        let table = FeatureCache::new(dir.path())
            .load_or_compute(StructuralFeature::Constraint, &index)
            .unwrap();
        assert_eq!(table.len(), 4);
    }

    #[test]
    fn test_partial_cache_recomputed() {
        let dir = tempdir().unwrap();
        let index = star_index();
        let path = dir.path().join("degree.csv");
        std::fs::write(&path, "id,degree\nuser_0,1.0\n").unwrap();

        let table = FeatureCache::new(dir.path())
            .load_or_compute(StructuralFeature::Degree, &index)
            .unwrap();
        assert_eq!(table.len(), 4);
        let u1 = index.index_of("user_1").unwrap();
        assert!(table.row(u1).is_ok());
        // The partial file was replaced by a complete one.
        assert_eq!(FeatureTable::read_csv(&path, &index).unwrap().len(), 4);
    }

    #[test]
    fn test_cache_with_wrong_column_recomputed() {
        let dir = tempdir().unwrap();
        let index = star_index();
        std::fs::write(
            dir.path().join("hier.csv"),
            "id,other\nuser_0,1\nuser_1,1\nuser_2,1\nuser_3,1\n",
        )
        .unwrap();
        let table = FeatureCache::new(dir.path())
            .load_or_compute(StructuralFeature::Hierarchy, &index)
            .unwrap();
        assert_eq!(table.columns(), &["hier"]);
    }

    #[test]
    fn test_from_config() {
        let mut config = NetmusicConfig::default();
        config.cache.save_cache = false;
        let cache = FeatureCache::from_config(&config);
        assert_eq!(
            cache.path_for(StructuralFeature::Degree),
            Some(PathBuf::from("features/degree.csv"))
        );
        assert!(cache.read);
        assert!(!cache.write);
    }

    // ------------------------------------------------------------------------
    // Embedding join
    // ------------------------------------------------------------------------

    #[test]
    fn test_node_features_with_embedding() {
        let dir = tempdir().unwrap();
        let emb = dir.path().join("node2vec.txt");
        std::fs::write(
            &emb,
            "4 2\nuser_0 0.1 0.2\nuser_1 0.3 0.4\nuser_2 0.5 0.6\nuser_3 0.7 0.8\n",
        )
        .unwrap();
        let index = star_index();
        let table = node_features(&index, &FeatureCache::disabled(), Some(&emb)).unwrap();
        assert_eq!(table.width(), 6);
        let u1 = index.index_of("user_1").unwrap();
        assert_eq!(&table.row(u1).unwrap()[4..], &[0.3, 0.4]);
    }
}
