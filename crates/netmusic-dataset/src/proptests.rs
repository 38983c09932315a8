//! Property-based tests for label generation.

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use crate::LabelGenerator;
    use netmusic_graph::{Edge, GraphData, Node, to_index_graph};
    use netmusic_source::MusicComment;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    /// `users` users, `tracks` tracks and a set of likes between them.
    fn arb_likes() -> impl Strategy<Value = (GraphData, Vec<(usize, usize)>)> {
        (1usize..8, 1usize..8).prop_flat_map(|(users, tracks)| {
            prop::collection::vec((0..users, 0..tracks), 0..30).prop_map(move |likes| {
                let mut g = GraphData::new();
                for u in 0..users {
                    g.add_node(Node::user(u as i64));
                }
                for t in 0..tracks {
                    g.add_node(Node::music(&t.to_string()));
                }
                for &(u, t) in &likes {
                    g.add_edge(Edge::like(format!("user_{u}"), format!("music_{t}"), 0, 0))
                        .unwrap();
                }
                (g, likes)
            })
        })
    }

    proptest! {
        #[test]
        fn test_negatives_never_hit_edges(
            (graph, _likes) in arb_likes(),
            n in 0usize..100,
            seed in any::<u64>(),
        ) {
            let index = to_index_graph(&graph);
            let generator = LabelGenerator::new(&index);
            let pairs = generator.negative_labels(n, &mut StdRng::seed_from_u64(seed));
            prop_assert!(pairs.len() <= n);
            for pair in pairs {
                prop_assert!(!index.has_edge(pair.user, pair.music));
            }
        }

        #[test]
        fn test_positives_exact_and_traceable(
            (graph, likes) in arb_likes(),
            n in 0usize..40,
            seed in any::<u64>(),
        ) {
            let comments: Vec<MusicComment> = likes
                .iter()
                .enumerate()
                .map(|(row, &(u, t))| MusicComment {
                    music_id: t.to_string(),
                    user_id: u as i64,
                    timestamp: (row as i64 * 7) % 5,
                    comment_id: row as i64,
                    liked_count: 0,
                })
                .collect();
            let index = to_index_graph(&graph);
            let generator = LabelGenerator::new(&index);
            let pairs = generator
                .positive_labels(n, &comments, &mut StdRng::seed_from_u64(seed))
                .unwrap();
            prop_assert_eq!(pairs.len(), n.min(comments.len()));
            for pair in pairs {
                prop_assert_eq!(pair.label, 1);
                prop_assert!(index.has_edge(pair.user, pair.music));
            }
        }
    }
}
