//! GraphBuilder for constructing the social/music graph.
//!
//! The builder reads the source tables through a [`TableSource`] and applies
//! them in a fixed order, because later steps refer to nodes created by
//! earlier ones:
//!
//! 1. A user node for every id in the user-id list
//! 2. (optional) profiles from the user-info table
//! 3. `follow` edges `user → followee` from the follow table
//! 4. `follow` edges `follower → user` from the followed table
//! 5. A track node for every id in the music-id list
//! 6. Track metadata from the music-data table
//! 7. `like` edges `user → track` from the comments table
//!
//! Endpoints that were never declared are handled by the configured
//! [`DanglingPolicy`]. Repeated ordered pairs collapse into one edge whose
//! attributes come from the last row applied; each collapse is counted in
//! [`BuildStats::merged_edges`].
//!
//! [`GraphBuilder::build_graph`] and [`GraphBuilder::build_social_subgraph`]
//! wrap the build in the snapshot cache: load when a usable snapshot
//! exists, otherwise build and optionally save.

use std::path::PathBuf;

use netmusic_core::util::ids::{music_node_id, user_node_id};
use netmusic_core::{DanglingPolicy, Error, NetmusicConfig, Result};
use netmusic_source::TableSource;

use crate::cache::{self, GraphVariant};
use crate::types::{
    Edge, EdgeInsert, GraphData, Node, NodeKind, NodeType, Relationship, TrackInfo, UserProfile,
};

// ============================================================================
// Builder configuration types
// ============================================================================

/// Statistics from a graph build operation.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct BuildStats {
    /// User nodes created from the user-id list.
    pub users: usize,
    /// Track nodes created from the music-id list.
    pub tracks: usize,
    /// Follow rows applied (both tables).
    pub follow_edges: usize,
    /// Comment rows applied.
    pub like_edges: usize,
    /// Rows that overwrote an existing edge between the same ordered pair.
    pub merged_edges: usize,
    /// Nodes created for undeclared endpoints.
    pub auto_created: usize,
    /// Tracks that received a metadata row.
    pub tracks_with_metadata: usize,
    /// Users that received a profile.
    pub profiles_attached: usize,
}

/// Snapshot settings for one cached graph.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CacheOptions {
    pub path: PathBuf,
    /// Load the snapshot when it is usable.
    pub use_cache: bool,
    /// Write the snapshot after building from scratch.
    pub save_cache: bool,
}

impl CacheOptions {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            use_cache: true,
            save_cache: true,
        }
    }

    /// Never read or write a snapshot.
    pub fn disabled(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            use_cache: false,
            save_cache: false,
        }
    }

    pub fn with_use_cache(mut self, use_cache: bool) -> Self {
        self.use_cache = use_cache;
        self
    }

    pub fn with_save_cache(mut self, save_cache: bool) -> Self {
        self.save_cache = save_cache;
        self
    }

    /// Options for the full-graph snapshot from configuration.
    pub fn full_from_config(config: &NetmusicConfig) -> Self {
        Self {
            path: config.cache.graph.clone(),
            use_cache: config.cache.use_cache,
            save_cache: config.cache.save_cache,
        }
    }

    /// Options for the social-subgraph snapshot from configuration.
    pub fn social_from_config(config: &NetmusicConfig) -> Self {
        Self {
            path: config.cache.social_subgraph.clone(),
            use_cache: config.cache.use_cache,
            save_cache: config.cache.save_cache,
        }
    }
}

// ============================================================================
// GraphBuilder
// ============================================================================

/// Builder for the social/music graph.
///
/// Generic over `S: TableSource` so files and in-memory tables are built
/// the same way.
pub struct GraphBuilder<S: TableSource> {
    source: S,
    dangling: DanglingPolicy,
    attach_user_info: bool,
}

impl<S: TableSource> GraphBuilder<S> {
    /// Creates a new builder over the given source.
    pub fn new(source: S) -> Self {
        Self {
            source,
            dangling: DanglingPolicy::default(),
            attach_user_info: false,
        }
    }

    /// Sets the policy for undeclared endpoints.
    pub fn with_dangling_policy(mut self, policy: DanglingPolicy) -> Self {
        self.dangling = policy;
        self
    }

    /// Enables attaching user-info profiles to user nodes.
    pub fn with_user_info(mut self, attach: bool) -> Self {
        self.attach_user_info = attach;
        self
    }

    /// Applies the `[build]` section of a configuration.
    pub fn with_config(self, config: &NetmusicConfig) -> Self {
        self.with_dangling_policy(config.build.dangling)
            .with_user_info(config.build.attach_user_info)
    }

    /// The underlying table source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Builds the full graph from scratch, ignoring any snapshot.
    pub fn build(&self) -> Result<(GraphData, BuildStats)> {
        let mut graph = GraphData::new();
        let mut stats = BuildStats::default();

        // Users
        for uid in self.source.user_id_list()? {
            graph.add_node(Node::user(uid));
            stats.users += 1;
        }
        log::info!("Added {} user nodes", stats.users);

        if self.attach_user_info {
            self.attach_profiles(&mut graph, &mut stats)?;
        }

        // Follow edges, both perspectives
        for row in self.source.user_follow()? {
            let from = user_node_id(row.user_id);
            let to = user_node_id(row.follow_id);
            self.add_edge_checked(&mut graph, &mut stats, Edge::follow(from, to, row.timestamp))?;
            stats.follow_edges += 1;
        }
        for row in self.source.user_followed()? {
            let from = user_node_id(row.followed_id);
            let to = user_node_id(row.user_id);
            self.add_edge_checked(&mut graph, &mut stats, Edge::follow(from, to, row.timestamp))?;
            stats.follow_edges += 1;
        }
        log::info!("Applied {} follow rows", stats.follow_edges);

        // Tracks
        for mid in self.source.music_id_list()? {
            graph.add_node(Node::music(&mid));
            stats.tracks += 1;
        }
        log::info!("Added {} track nodes", stats.tracks);

        for row in self.source.music_data()? {
            let id = music_node_id(&row.id);
            if !self.ensure_node(&mut graph, &mut stats, &id, NodeType::Music) {
                return Err(Error::not_found("track", &id));
            }
            if let Some(node) = graph.get_node_mut(&id) {
                node.kind = NodeKind::Music(TrackInfo {
                    singer: row.singer,
                    album: row.album,
                    comment_num: row.comment_num,
                    play_list: row.playlist,
                });
                stats.tracks_with_metadata += 1;
            }
        }
        log::info!("Attached metadata to {} tracks", stats.tracks_with_metadata);

        // Like edges
        for row in self.source.music_comments()? {
            let user = user_node_id(row.user_id);
            let track = music_node_id(&row.music_id);
            let edge = Edge::like(user, track, row.timestamp, row.liked_count);
            self.add_edge_checked(&mut graph, &mut stats, edge)?;
            stats.like_edges += 1;
        }
        log::info!("Applied {} comment rows", stats.like_edges);

        if stats.merged_edges > 0 {
            log::debug!("{} rows overwrote an existing edge", stats.merged_edges);
        }
        if stats.auto_created > 0 {
            log::warn!("Auto-created {} undeclared nodes", stats.auto_created);
        }
        log::info!(
            "Built graph: {} nodes, {} edges",
            graph.node_count(),
            graph.edge_count()
        );
        Ok((graph, stats))
    }

    /// Loads the full graph from its snapshot, or builds and maybe saves it.
    pub fn build_graph(&self, cache_options: &CacheOptions) -> Result<GraphData> {
        if cache_options.use_cache
            && let Some(graph) = cache::try_load(&cache_options.path, GraphVariant::Full).into_graph()
        {
            return Ok(graph);
        }

        let (graph, _stats) = self.build()?;
        if cache_options.save_cache {
            cache::save(&graph, &cache_options.path, GraphVariant::Full)?;
        }
        Ok(graph)
    }

    /// Loads the user-only subgraph from its snapshot, or derives it from
    /// the full graph (itself cached under `full`) and maybe saves it.
    pub fn build_social_subgraph(
        &self,
        social: &CacheOptions,
        full: &CacheOptions,
    ) -> Result<GraphData> {
        if social.use_cache
            && let Some(graph) = cache::try_load(&social.path, GraphVariant::Social).into_graph()
        {
            return Ok(graph);
        }

        let graph = self.build_graph(full)?.social_subgraph();
        log::info!(
            "Derived social subgraph: {} users, {} follow edges",
            graph.node_count(),
            graph.edge_count()
        );
        if social.save_cache {
            cache::save(&graph, &social.path, GraphVariant::Social)?;
        }
        Ok(graph)
    }

    // ------------------------------------------------------------------------
    // Helpers
    // ------------------------------------------------------------------------

    fn attach_profiles(&self, graph: &mut GraphData, stats: &mut BuildStats) -> Result<()> {
        for row in self.source.user_info()? {
            let id = user_node_id(row.id);
            if !self.ensure_node(graph, stats, &id, NodeType::User) {
                return Err(Error::not_found("user", &id));
            }
            if let Some(node) = graph.get_node_mut(&id) {
                node.kind = NodeKind::User(UserProfile {
                    name: Some(row.name).filter(|s| !s.is_empty()),
                    description: Some(row.description).filter(|s| !s.is_empty()),
                });
                stats.profiles_attached += 1;
            }
        }
        log::info!("Attached {} user profiles", stats.profiles_attached);
        Ok(())
    }

    /// Makes sure `id` exists, creating it under `AutoCreate`.
    ///
    /// Returns false when the node is missing and may not be created.
    fn ensure_node(
        &self,
        graph: &mut GraphData,
        stats: &mut BuildStats,
        id: &str,
        node_type: NodeType,
    ) -> bool {
        if graph.contains_node(id) {
            return true;
        }
        match self.dangling {
            DanglingPolicy::FailFast => false,
            DanglingPolicy::AutoCreate => {
                log::debug!("Auto-creating undeclared {node_type} node {id}");
                graph.add_node(Node::with_type(id, node_type));
                stats.auto_created += 1;
                true
            }
        }
    }

    fn add_edge_checked(
        &self,
        graph: &mut GraphData,
        stats: &mut BuildStats,
        edge: Edge,
    ) -> Result<()> {
        let to_type = match edge.relationship {
            Relationship::Follow => NodeType::User,
            Relationship::Like => NodeType::Music,
        };
        if !self.ensure_node(graph, stats, &edge.from, NodeType::User)
            || !self.ensure_node(graph, stats, &edge.to, to_type)
        {
            return Err(Error::DanglingReference {
                from: edge.from,
                to: edge.to,
                relationship: edge.relationship.name().to_string(),
            });
        }

        if graph.add_edge(edge)? == EdgeInsert::Merged {
            stats.merged_edges += 1;
        }
        Ok(())
    }
}

// ============================================================================
// Tests
// ============================================================================
