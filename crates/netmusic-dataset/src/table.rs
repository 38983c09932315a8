//! Per-node feature tables.
//!
//! A [`FeatureTable`] holds named columns of `f64` for a set of node
//! indices. On disk it is a CSV with an `id` column of node ids followed by
//! one column per feature; node ids (not indices) are written so a cached
//! table stays valid when the index mapping is rebuilt.

use std::collections::HashMap;
use std::fs;
use std::path::Path;

use netmusic_core::{Error, Result};
use netmusic_graph::IndexGraph;

/// Feature rows keyed by node index.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct FeatureTable {
    columns: Vec<String>,
    rows: HashMap<usize, Vec<f64>>,
}

impl FeatureTable {
    /// Empty table with the given column names.
    pub fn new<S: Into<String>>(columns: impl IntoIterator<Item = S>) -> Self {
        Self {
            columns: columns.into_iter().map(Into::into).collect(),
            rows: HashMap::new(),
        }
    }

    /// Single-column table from one value per index `0..values.len()`.
    pub fn from_column(name: impl Into<String>, values: &[f64]) -> Self {
        let mut table = Self::new([name.into()]);
        for (index, &value) in values.iter().enumerate() {
            table.rows.insert(index, vec![value]);
        }
        table
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Sets the row for a node index, replacing any previous row.
    pub fn insert(&mut self, index: usize, values: Vec<f64>) -> Result<()> {
        if values.len() != self.width() {
            return Err(Error::parse(format!(
                "row for index {index} has {} values, table has {} columns",
                values.len(),
                self.width()
            )));
        }
        self.rows.insert(index, values);
        Ok(())
    }

    /// Row for a node index.
    pub fn row(&self, index: usize) -> Result<&[f64]> {
        self.rows
            .get(&index)
            .map(Vec::as_slice)
            .ok_or(Error::EmbeddingMismatch { index })
    }

    pub fn contains(&self, index: usize) -> bool {
        self.rows.contains_key(&index)
    }

    /// Node indices with a row, ascending.
    pub fn indices(&self) -> Vec<usize> {
        let mut indices: Vec<usize> = self.rows.keys().copied().collect();
        indices.sort_unstable();
        indices
    }

    /// Column-wise concatenation, keeping indices present in both tables.
    pub fn join(&self, other: &FeatureTable) -> FeatureTable {
        let mut columns = self.columns.clone();
        columns.extend(other.columns.iter().cloned());
        let mut rows = HashMap::with_capacity(self.rows.len().min(other.rows.len()));
        for (&index, left) in &self.rows {
            if let Some(right) = other.rows.get(&index) {
                let mut row = left.clone();
                row.extend_from_slice(right);
                rows.insert(index, row);
            }
        }
        let dropped = self.rows.len().max(other.rows.len()) - rows.len();
        if dropped > 0 {
            log::debug!("Feature join dropped {dropped} rows present on one side only");
        }
        FeatureTable { columns, rows }
    }

    // ------------------------------------------------------------------------
    // CSV cache
    // ------------------------------------------------------------------------

    /// Write the table as CSV with node ids resolved through `index`.
    pub fn write_csv(&self, path: &Path, index: &IndexGraph) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| Error::io_with_path(e, parent))?;
        }
        let mut writer = csv::Writer::from_path(path)?;
        let mut header = vec!["id".to_string()];
        header.extend(self.columns.iter().cloned());
        writer.write_record(&header)?;

        for i in self.indices() {
            let id = index
                .node_of(i)
                .ok_or_else(|| Error::not_found("node index", i.to_string()))?;
            let mut record = vec![id.to_string()];
            record.extend(self.rows[&i].iter().map(f64::to_string));
            writer.write_record(&record)?;
        }
        writer.flush().map_err(|e| Error::io_with_path(e, path))?;
        Ok(())
    }

    /// Read a table written by [`FeatureTable::write_csv`].
    ///
    /// Rows whose node id is not in `index` are skipped.
    pub fn read_csv(path: &Path, index: &IndexGraph) -> Result<Self> {
        let mut reader = csv::Reader::from_path(path)?;
        let headers = reader.headers()?.clone();
        if headers.get(0) != Some("id") {
            return Err(Error::parse(format!(
                "{}: first column must be 'id'",
                path.display()
            )));
        }
        let mut table = Self::new(headers.iter().skip(1));
        let mut skipped = 0usize;

        for (line, record) in reader.records().enumerate() {
            let record = record?;
            let Some(node_index) = record.get(0).and_then(|id| index.index_of(id)) else {
                skipped += 1;
                continue;
            };
            let values = record
                .iter()
                .skip(1)
                .map(|raw| {
                    raw.trim().parse::<f64>().map_err(|e| {
                        Error::parse(format!("{}:{}: {raw:?}: {e}", path.display(), line + 2))
                    })
                })
                .collect::<Result<Vec<f64>>>()?;
            table.insert(node_index, values)?;
        }
        if skipped > 0 {
            log::debug!(
                "{}: skipped {skipped} rows for nodes not in the graph",
                path.display()
            );
        }
        Ok(table)
    }
}

// ============================================================================
// Tests
// ============================================================================
