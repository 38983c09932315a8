//! Learned and synthetic node embeddings.
//!
//! Learned embeddings (node2vec and similar) are consumed in word2vec text
//! format: a `<count> <dimensions>` header line, then one
//! `<node id> <v1> ... <vd>` line per node.

use std::fs;
use std::path::Path;

use netmusic_core::{Error, Result};
use netmusic_graph::IndexGraph;
use rand::Rng;
use rand::rngs::StdRng;

use crate::table::FeatureTable;

/// Column name of embedding dimension `i`.
pub fn embedding_column(i: usize) -> String {
    format!("emb_{i}")
}

/// Read a word2vec text file into a table keyed by `index`.
///
/// Nodes not present in `index` are skipped. A malformed header or a row
/// whose width differs from the declared dimensions is a parse error; a
/// vector count that differs from the header is only logged.
pub fn read_word2vec(path: &Path, index: &IndexGraph) -> Result<FeatureTable> {
    let content = fs::read_to_string(path).map_err(|e| Error::io_with_path(e, path))?;
    let mut lines = content
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty());

    let (_, header) = lines
        .next()
        .ok_or_else(|| Error::parse(format!("{}: empty embedding file", path.display())))?;
    let (declared, dimensions) = parse_header(header)
        .ok_or_else(|| Error::parse(format!("{}:1: bad header {header:?}", path.display())))?;

    let mut table = FeatureTable::new((0..dimensions).map(embedding_column));
    let mut rows = 0usize;
    for (line_no, line) in lines {
        let mut fields = line.split_whitespace();
        let Some(id) = fields.next() else {
            continue;
        };
        let values = fields
            .map(|raw| {
                raw.parse::<f64>().map_err(|e| {
                    Error::parse(format!("{}:{}: {raw:?}: {e}", path.display(), line_no + 1))
                })
            })
            .collect::<Result<Vec<f64>>>()?;
        if values.len() != dimensions {
            return Err(Error::parse(format!(
                "{}:{}: expected {dimensions} values, found {}",
                path.display(),
                line_no + 1,
                values.len()
            )));
        }
        rows += 1;
        if let Some(i) = index.index_of(id) {
            table.insert(i, values)?;
        }
    }

    if rows != declared {
        log::warn!(
            "{}: header declares {declared} vectors, file holds {rows}",
            path.display()
        );
    }
    log::info!(
        "Loaded {dimensions}-dimensional embedding for {} nodes from {}",
        table.len(),
        path.display()
    );
    Ok(table)
}

fn parse_header(line: &str) -> Option<(usize, usize)> {
    let mut parts = line.split_whitespace();
    let count = parts.next()?.parse().ok()?;
    let dimensions = parts.next()?.parse().ok()?;
    parts.next().is_none().then_some((count, dimensions))
}

/// Uniform `[0, 1)` embedding for every node, for tests and baselines.
pub fn random_embedding(index: &IndexGraph, dimensions: usize, rng: &mut StdRng) -> FeatureTable {
    let mut table = FeatureTable::new((0..dimensions).map(embedding_column));
    for i in 0..index.len() {
        let row: Vec<f64> = (0..dimensions).map(|_| rng.gen_range(0.0..1.0)).collect();
        // Width always matches the column count.
        let _ = table.insert(i, row);
    }
    table
}

// ============================================================================
// Tests
// ============================================================================
