//! Pipeline configuration.
//!
//! `NetmusicConfig` is loaded from TOML and carries every tunable of the
//! pipeline: where the source tables live, where caches go, how the graph is
//! built, and the sampling/training defaults. Every section has defaults, so
//! an empty file (or no file at all) yields a working configuration.
//!
//! ```toml
//! [data]
//! root = "./Netease_music_social"
//!
//! [data.files]
//! music_comments = "music_comments_2023.csv"
//!
//! [build]
//! dangling = "auto_create"
//! ```

use std::env;
use std::fmt;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Environment variable naming a config file when none is passed explicitly.
pub const CONFIG_ENV_VAR: &str = "NETMUSIC_CONFIG";

// ============================================================================
// File roles
// ============================================================================

/// Logical role of a source table.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FileRole {
    /// Newline-delimited user ids.
    UserIdList,
    /// `/`-delimited user profiles.
    UserInfo,
    /// Who each user follows.
    UserFollow,
    /// Who follows each user.
    UserFollowed,
    /// Newline-delimited track ids.
    MusicIdList,
    /// Track metadata.
    MusicData,
    /// User comments on tracks.
    MusicComments,
}

impl FileRole {
    /// All roles, in build order.
    pub const ALL: [FileRole; 7] = [
        FileRole::UserIdList,
        FileRole::UserInfo,
        FileRole::UserFollow,
        FileRole::UserFollowed,
        FileRole::MusicIdList,
        FileRole::MusicData,
        FileRole::MusicComments,
    ];

    /// The role's name as used in configuration files.
    pub fn name(&self) -> &'static str {
        match self {
            Self::UserIdList => "user_id_list",
            Self::UserInfo => "userInfo",
            Self::UserFollow => "user_follow",
            Self::UserFollowed => "user_followed",
            Self::MusicIdList => "music_id_list",
            Self::MusicData => "music_data",
            Self::MusicComments => "music_comments",
        }
    }
}

impl fmt::Display for FileRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// File name for each source role, relative to [`DataConfig::root`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileNames {
    pub user_id_list: String,
    #[serde(rename = "userInfo")]
    pub user_info: String,
    pub user_follow: String,
    pub user_followed: String,
    pub music_id_list: String,
    pub music_data: String,
    pub music_comments: String,
}

impl Default for FileNames {
    fn default() -> Self {
        Self {
            user_id_list: "user_id_list.txt".to_string(),
            user_info: "userInfo.txt".to_string(),
            user_follow: "user_follow.csv".to_string(),
            user_followed: "user_followed.csv".to_string(),
            music_id_list: "music_id_list.txt".to_string(),
            music_data: "music_data.csv".to_string(),
            music_comments: "music_comments.csv".to_string(),
        }
    }
}

impl FileNames {
    /// File name configured for a role.
    pub fn get(&self, role: FileRole) -> &str {
        match role {
            FileRole::UserIdList => &self.user_id_list,
            FileRole::UserInfo => &self.user_info,
            FileRole::UserFollow => &self.user_follow,
            FileRole::UserFollowed => &self.user_followed,
            FileRole::MusicIdList => &self.music_id_list,
            FileRole::MusicData => &self.music_data,
            FileRole::MusicComments => &self.music_comments,
        }
    }
}

// ============================================================================
// Sections
// ============================================================================

/// Where the source tables live.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Directory containing every source table.
    pub root: PathBuf,
    /// Per-role file names.
    pub files: FileNames,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("./Netease_music_social"),
            files: FileNames::default(),
        }
    }
}

impl DataConfig {
    /// Path of the file for a source role, under [`DataConfig::root`].
    pub fn source_path(&self, role: FileRole) -> PathBuf {
        self.root.join(self.files.get(role))
    }
}

/// Snapshot and feature cache locations.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Snapshot of the full graph.
    pub graph: PathBuf,
    /// Snapshot of the user-only subgraph.
    pub social_subgraph: PathBuf,
    /// Directory holding one cache file per structural feature.
    pub features_dir: PathBuf,
    /// Load snapshots when present.
    pub use_cache: bool,
    /// Write snapshots after a build.
    pub save_cache: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            graph: PathBuf::from("graph.bin"),
            social_subgraph: PathBuf::from("social_subgraph.bin"),
            features_dir: PathBuf::from("features"),
            use_cache: true,
            save_cache: true,
        }
    }
}

/// What the builder does with an edge whose endpoint was never declared.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DanglingPolicy {
    /// Abort the build with [`Error::DanglingReference`].
    #[default]
    FailFast,
    /// Create the missing endpoint, typed by the role it appears in.
    AutoCreate,
}

/// Graph construction options.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BuildConfig {
    pub dangling: DanglingPolicy,
    /// Attach `name`/`description` from the user-info table to user nodes.
    pub attach_user_info: bool,
}

/// Subgraph sampling defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SamplingConfig {
    pub ratio: f64,
    pub max_nodes: usize,
    pub min_nodes: usize,
    pub seed: u64,
}

impl Default for SamplingConfig {
    fn default() -> Self {
        Self {
            ratio: 0.01,
            max_nodes: 500,
            min_nodes: 0,
            seed: 42,
        }
    }
}

/// Label generation and model training defaults.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrainingConfig {
    /// Total labelled pairs requested.
    pub samples: usize,
    /// Share of `samples` drawn as positives.
    pub positive_ratio: f64,
    /// Share of rows held out for evaluation.
    pub test_size: f64,
    pub seed: u64,
    /// Width of the learned node embedding, when one is loaded.
    pub embedding_dimensions: usize,
    /// Word2vec-format embedding file; omitted means structural features only.
    pub embedding_file: Option<PathBuf>,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            samples: 10_000,
            positive_ratio: 0.5,
            test_size: 0.33,
            seed: 42,
            embedding_dimensions: 16,
            embedding_file: None,
        }
    }
}

// ============================================================================
// NetmusicConfig
// ============================================================================

/// Complete pipeline configuration.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NetmusicConfig {
    pub data: DataConfig,
    pub cache: CacheConfig,
    pub build: BuildConfig,
    pub sampling: SamplingConfig,
    pub training: TrainingConfig,
}

impl NetmusicConfig {
    /// Load configuration.
    ///
    /// Resolution order: the explicit path, then the file named by
    /// `NETMUSIC_CONFIG`, then built-in defaults. A path that was asked for
    /// but does not exist is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let env_path = env::var_os(CONFIG_ENV_VAR).map(PathBuf::from);
        match resolve_config_path(path, env_path) {
            Some(path) => Self::from_file(&path),
            None => {
                log::debug!("No config file given, using defaults");
                Ok(Self::default())
            }
        }
    }

    /// Load configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Err(Error::config(format!(
                "Config file does not exist: {}",
                path.display()
            )));
        }
        let content = std::fs::read_to_string(path).map_err(|e| Error::io_with_path(e, path))?;
        let config = Self::from_toml_str(&content)
            .map_err(|e| Error::config(format!("Failed to parse {}: {e}", path.display())))?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Parse configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content).map_err(|e| Error::config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Render the configuration as TOML.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config(e.to_string()))
    }

    /// Reject values no stage can work with.
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.training.positive_ratio) {
            return Err(Error::config(format!(
                "training.positive_ratio must be within [0, 1], got {}",
                self.training.positive_ratio
            )));
        }
        if !(0.0..1.0).contains(&self.training.test_size) {
            return Err(Error::config(format!(
                "training.test_size must be within [0, 1), got {}",
                self.training.test_size
            )));
        }
        if self.sampling.ratio < 0.0 {
            return Err(Error::config("sampling.ratio must not be negative"));
        }
        Ok(())
    }
}

fn resolve_config_path(explicit: Option<&Path>, env_path: Option<PathBuf>) -> Option<PathBuf> {
    explicit
        .map(Path::to_path_buf)
        .or_else(|| env_path.filter(|p| !p.as_os_str().is_empty()))
}
