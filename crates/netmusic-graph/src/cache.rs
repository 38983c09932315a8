//! Binary graph snapshots.
//!
//! A snapshot is a small header (magic, format version, graph variant)
//! followed by the node and edge lists, both bincode-encoded. The header is
//! decoded first so a snapshot of the wrong variant is recognised without
//! decoding the body.
//!
//! Loading never fails hard: [`try_load`] classifies the outcome as a hit, a
//! missing file, a corrupt file, or a snapshot of the wrong variant. Only
//! hits are usable; every other outcome means "rebuild".

use std::fmt;
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use netmusic_core::{Error, Result};
use serde::{Deserialize, Serialize};

use crate::types::{Edge, GraphData, Node};

const SNAPSHOT_MAGIC: [u8; 4] = *b"NMGS";

/// Snapshot format version. Bump when `Node` or `Edge` change shape.
pub const SNAPSHOT_VERSION: u32 = 1;

/// Which graph a snapshot holds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GraphVariant {
    /// Users and tracks with follow and like edges.
    Full,
    /// Users and follow edges only.
    Social,
}

impl fmt::Display for GraphVariant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Full => f.write_str("full"),
            Self::Social => f.write_str("social"),
        }
    }
}

#[derive(Serialize, Deserialize)]
struct SnapshotHeader {
    magic: [u8; 4],
    version: u32,
    variant: GraphVariant,
}

#[derive(Serialize, Deserialize)]
struct SnapshotBody {
    nodes: Vec<Node>,
    edges: Vec<Edge>,
}

/// Outcome of looking up a snapshot.
#[derive(Debug)]
pub enum CacheLookup {
    /// The snapshot was read and holds the requested variant.
    Hit(GraphData),
    /// No file at the path.
    Missing,
    /// The file exists but could not be decoded.
    Corrupt(String),
    /// The file holds a different graph variant.
    WrongVariant {
        expected: GraphVariant,
        found: GraphVariant,
    },
}

impl CacheLookup {
    /// The cached graph, if this was a hit.
    pub fn into_graph(self) -> Option<GraphData> {
        match self {
            Self::Hit(graph) => Some(graph),
            _ => None,
        }
    }

    pub fn is_hit(&self) -> bool {
        matches!(self, Self::Hit(_))
    }
}

/// Look up a snapshot of `variant` at `path`.
///
/// Logs a missing file at debug level and a corrupt file as a warning. A
/// variant mismatch or a file that cannot be read at all is logged as an
/// error, since either points at a misconfigured cache path.
pub fn try_load(path: &Path, variant: GraphVariant) -> CacheLookup {
    if !path.exists() {
        log::debug!("No graph snapshot at {}", path.display());
        return CacheLookup::Missing;
    }

    match read_snapshot(path, variant) {
        Ok(lookup) => {
            match &lookup {
                CacheLookup::Hit(graph) => log::info!(
                    "Loaded {variant} graph snapshot from {} ({} nodes, {} edges)",
                    path.display(),
                    graph.node_count(),
                    graph.edge_count()
                ),
                CacheLookup::WrongVariant { expected, found } => log::error!(
                    "Snapshot {} holds a {found} graph, expected {expected}; rebuilding",
                    path.display()
                ),
                CacheLookup::Missing | CacheLookup::Corrupt(_) => {}
            }
            lookup
        }
        Err(e) => {
            if e.is_cache_miss() {
                log::warn!("Corrupt graph snapshot {}: {e}", path.display());
            } else {
                log::error!("Unreadable graph snapshot {}: {e}", path.display());
            }
            CacheLookup::Corrupt(e.to_string())
        }
    }
}

fn read_snapshot(path: &Path, variant: GraphVariant) -> Result<CacheLookup> {
    let file = File::open(path).map_err(|e| Error::io_with_path(e, path))?;
    let mut reader = BufReader::new(file);

    let header: SnapshotHeader = bincode::deserialize_from(&mut reader)?;
    if header.magic != SNAPSHOT_MAGIC {
        return Err(Error::cache("not a graph snapshot"));
    }
    if header.version != SNAPSHOT_VERSION {
        return Err(Error::cache(format!(
            "snapshot format version {} (expected {SNAPSHOT_VERSION})",
            header.version
        )));
    }
    if header.variant != variant {
        return Ok(CacheLookup::WrongVariant {
            expected: variant,
            found: header.variant,
        });
    }

    let body: SnapshotBody = bincode::deserialize_from(&mut reader)?;
    let mut graph = GraphData::new();
    for node in body.nodes {
        graph.add_node(node);
    }
    for edge in body.edges {
        graph
            .add_edge(edge)
            .map_err(|e| Error::cache(format!("inconsistent snapshot: {e}")))?;
    }
    Ok(CacheLookup::Hit(graph))
}

/// Write a snapshot of `graph` to `path`, replacing any existing file.
///
/// Parent directories are created as needed. The write is not atomic.
pub fn save(graph: &GraphData, path: &Path, variant: GraphVariant) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| Error::io_with_path(e, parent))?;
    }
    let file = File::create(path).map_err(|e| Error::io_with_path(e, path))?;
    let mut writer = BufWriter::new(file);

    let header = SnapshotHeader {
        magic: SNAPSHOT_MAGIC,
        version: SNAPSHOT_VERSION,
        variant,
    };
    let body = SnapshotBody {
        nodes: graph.iter_nodes().cloned().collect(),
        edges: graph.iter_edges().cloned().collect(),
    };
    bincode::serialize_into(&mut writer, &header)?;
    bincode::serialize_into(&mut writer, &body)?;
    writer.flush().map_err(|e| Error::io_with_path(e, path))?;

    log::info!(
        "Saved {variant} graph snapshot to {} ({} nodes, {} edges)",
        path.display(),
        graph.node_count(),
        graph.edge_count()
    );
    Ok(())
}

// ============================================================================
// Tests
// ============================================================================
