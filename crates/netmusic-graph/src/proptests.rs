//! Property-based tests for graph indexing and subgraphs.

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::collections::HashSet;

    use crate::types::{Edge, GraphData, Node};
    use crate::index::to_index_graph;
    use proptest::prelude::*;

    /// Random graph over `users` users and `tracks` tracks.
    fn arb_graph() -> impl Strategy<Value = GraphData> {
        (1usize..12, 0usize..8).prop_flat_map(|(users, tracks)| {
            let n = users + tracks;
            (
                Just(users),
                Just(tracks),
                prop::collection::vec((0..n, 0..n, any::<i64>()), 0..40),
            )
                .prop_map(|(users, tracks, raw_edges)| {
                    let mut g = GraphData::new();
                    for u in 0..users {
                        g.add_node(Node::user(u as i64));
                    }
                    for t in 0..tracks {
                        g.add_node(Node::music(&t.to_string()));
                    }
                    let ids: Vec<String> = g.node_ids().map(str::to_string).collect();
                    for (a, b, ts) in raw_edges {
                        // Edges always start at a user; like edges end at a track.
                        let from = &ids[a % users];
                        let to = &ids[b];
                        let edge = if b < users {
                            Edge::follow(from.clone(), to.clone(), ts)
                        } else {
                            Edge::like(from.clone(), to.clone(), ts, 0)
                        };
                        g.add_edge(edge).unwrap();
                    }
                    g
                })
        })
    }

    proptest! {
        #[test]
        fn test_index_bijection(g in arb_graph()) {
            let ig = to_index_graph(&g);
            prop_assert_eq!(ig.index_of_node().len(), g.node_count());
            prop_assert_eq!(ig.node_of_index().len(), g.node_count());
            for id in g.node_ids() {
                let i = ig.index_of(id).unwrap();
                prop_assert!(i < g.node_count());
                prop_assert_eq!(ig.node_of(i), Some(id));
            }
        }

        #[test]
        fn test_index_graph_preserves_edges(g in arb_graph()) {
            let ig = to_index_graph(&g);
            prop_assert_eq!(ig.graph.edge_count(), g.edge_count());
            for e in g.iter_edges() {
                let a = ig.index_of(&e.from).unwrap();
                let b = ig.index_of(&e.to).unwrap();
                prop_assert!(ig.has_edge(a, b));
            }
        }

        #[test]
        fn test_induced_subgraph_property(
            g in arb_graph(),
            mask in prop::collection::vec(any::<bool>(), 20),
        ) {
            let selected: HashSet<String> = g
                .node_ids()
                .zip(mask.iter().cycle())
                .filter(|(_, keep)| **keep)
                .map(|(id, _)| id.to_string())
                .collect();
            let sub = g.induced_subgraph(&selected);

            prop_assert_eq!(sub.node_count(), selected.len());
            for e in sub.iter_edges() {
                prop_assert!(selected.contains(&e.from) && selected.contains(&e.to));
                prop_assert_eq!(g.get_edge(&e.from, &e.to), Some(e));
            }
            for e in g.iter_edges() {
                if selected.contains(&e.from) && selected.contains(&e.to) {
                    prop_assert!(sub.has_edge(&e.from, &e.to));
                }
            }
        }
    }
}
