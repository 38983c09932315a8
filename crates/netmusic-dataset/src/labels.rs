//! Link-prediction labels.
//!
//! Positive pairs come from real comments (a user commented on a track);
//! negative pairs are random `(track, user)` combinations with no
//! `user → track` edge in the graph. Pairs are expressed as node indices of
//! an [`IndexGraph`] so they line up with feature tables.

use netmusic_core::util::ids::{music_node_id, user_node_id};
use netmusic_core::{Error, Result};
use netmusic_graph::{IndexGraph, NodeType};
use netmusic_source::MusicComment;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;

use crate::table::FeatureTable;

/// A `(track, user)` pair with its label: `1` linked, `0` not linked.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct LabelledPair {
    pub music: usize,
    pub user: usize,
    pub label: u8,
}

impl LabelledPair {
    pub fn positive(music: usize, user: usize) -> Self {
        Self {
            music,
            user,
            label: 1,
        }
    }

    pub fn negative(music: usize, user: usize) -> Self {
        Self {
            music,
            user,
            label: 0,
        }
    }
}

/// Design matrix for the classifier.
///
/// Row `i` is the track's features followed by the user's features for
/// `pairs[i]`; `labels[i]` is that pair's label.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TrainingData {
    pub feature_names: Vec<String>,
    pub features: Vec<Vec<f64>>,
    pub labels: Vec<u8>,
    pub pairs: Vec<LabelledPair>,
}

impl TrainingData {
    pub fn len(&self) -> usize {
        self.features.len()
    }

    pub fn is_empty(&self) -> bool {
        self.features.is_empty()
    }

    /// Number of positive rows.
    pub fn positives(&self) -> usize {
        self.labels.iter().filter(|&&label| label == 1).count()
    }

    /// Rows with the label appended as the last column.
    pub fn to_rows(&self) -> Vec<Vec<f64>> {
        self.features
            .iter()
            .zip(&self.labels)
            .map(|(row, &label)| {
                let mut row = row.clone();
                row.push(f64::from(label));
                row
            })
            .collect()
    }
}

/// Generates labelled pairs against one index mapping.
#[derive(Debug)]
pub struct LabelGenerator<'a> {
    index: &'a IndexGraph,
    music: Vec<usize>,
    users: Vec<usize>,
}

impl<'a> LabelGenerator<'a> {
    /// Partitions the nodes of `index` into tracks and users.
    pub fn new(index: &'a IndexGraph) -> Self {
        let music = index.indices_of_type(NodeType::Music);
        let users = index.indices_of_type(NodeType::User);
        log::debug!(
            "Label generator over {} tracks and {} users",
            music.len(),
            users.len()
        );
        Self {
            index,
            music,
            users,
        }
    }

    pub fn index(&self) -> &IndexGraph {
        self.index
    }

    /// `n` positive pairs drawn from `comments`.
    ///
    /// `n` is clamped to the number of comments. Comments are ordered by
    /// timestamp (stable, so ties keep table order) and the drawn rows keep
    /// that order. A comment naming a node absent from the index is an
    /// error.
    pub fn positive_labels(
        &self,
        n: usize,
        comments: &[MusicComment],
        rng: &mut StdRng,
    ) -> Result<Vec<LabelledPair>> {
        let n = n.min(comments.len());
        let mut ordered: Vec<&MusicComment> = comments.iter().collect();
        ordered.sort_by_key(|comment| comment.timestamp);

        let mut picks = rand::seq::index::sample(rng, ordered.len(), n).into_vec();
        picks.sort_unstable();

        let pairs = picks
            .into_iter()
            .map(|row| {
                let comment = ordered[row];
                let music_id = music_node_id(&comment.music_id);
                let user_id = user_node_id(comment.user_id);
                let music = self
                    .index
                    .index_of(&music_id)
                    .ok_or_else(|| Error::not_found("node", music_id))?;
                let user = self
                    .index
                    .index_of(&user_id)
                    .ok_or_else(|| Error::not_found("node", user_id))?;
                Ok(LabelledPair::positive(music, user))
            })
            .collect::<Result<Vec<_>>>()?;

        log::info!("Drew {} positive labels", pairs.len());
        Ok(pairs)
    }

    /// Up to `n` negative pairs.
    ///
    /// Makes exactly `n` independent uniform draws of a track and a user and
    /// keeps the pairs with no `user → track` edge. Rejected draws are not
    /// retried, so the result may hold fewer than `n` pairs. Duplicates are
    /// possible.
    pub fn negative_labels(&self, n: usize, rng: &mut StdRng) -> Vec<LabelledPair> {
        let mut pairs = Vec::with_capacity(n);
        for _ in 0..n {
            let (Some(&music), Some(&user)) = (self.music.choose(rng), self.users.choose(rng))
            else {
                break;
            };
            if !self.index.has_edge(user, music) {
                pairs.push(LabelledPair::negative(music, user));
            }
        }
        if pairs.len() < n {
            log::debug!(
                "Negative sampling kept {} of {n} draws",
                pairs.len()
            );
        }
        pairs
    }

    /// `round(n · ratio)` positive and `n − round(n · ratio)` negative pairs
    /// joined with their endpoint features.
    ///
    /// Every endpoint must have a row in `table`; a missing row is
    /// [`Error::EmbeddingMismatch`].
    pub fn training_data(
        &self,
        table: &FeatureTable,
        comments: &[MusicComment],
        n: usize,
        ratio: f64,
        rng: &mut StdRng,
    ) -> Result<TrainingData> {
        if !(0.0..=1.0).contains(&ratio) {
            return Err(Error::config(format!(
                "positive ratio must be within [0, 1], got {ratio}"
            )));
        }
        let wanted_positive = ((n as f64) * ratio).round() as usize;
        let wanted_negative = n.saturating_sub(wanted_positive);

        let mut pairs = self.positive_labels(wanted_positive, comments, rng)?;
        pairs.extend(self.negative_labels(wanted_negative, rng));

        let mut feature_names: Vec<String> = table
            .columns()
            .iter()
            .map(|column| format!("music_{column}"))
            .collect();
        feature_names.extend(table.columns().iter().map(|column| format!("user_{column}")));

        let mut features = Vec::with_capacity(pairs.len());
        let mut labels = Vec::with_capacity(pairs.len());
        for pair in &pairs {
            let mut row = table.row(pair.music)?.to_vec();
            row.extend_from_slice(table.row(pair.user)?);
            features.push(row);
            labels.push(pair.label);
        }

        let data = TrainingData {
            feature_names,
            features,
            labels,
            pairs,
        };
        log::info!(
            "Training data: {} rows ({} positive), {} features",
            data.len(),
            data.positives(),
            data.feature_names.len()
        );
        Ok(data)
    }
}

// ============================================================================
// Tests
// ============================================================================
