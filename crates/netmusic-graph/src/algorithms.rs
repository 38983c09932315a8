//! Structural node measures.
//!
//! Provides:
//! - Degree centrality (total, in, out)
//! - Betweenness centrality (Brandes, directed, unweighted)
//! - Burt's constraint and hierarchy (structural holes)
//!
//! Every function takes a petgraph `DiGraph` and returns one value per
//! vertex, indexed by `NodeIndex::index()`. Run them on
//! [`IndexGraph::graph`](crate::IndexGraph) to get vectors aligned with the
//! dense node indexing.

use std::collections::{HashSet, VecDeque};

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use serde::{Deserialize, Serialize};

// ============================================================================
// Degree centrality
// ============================================================================

/// Degree centrality scores for one vertex.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DegreeCentrality {
    /// (in + out) / (n - 1).
    pub degree: f64,
    /// in / (n - 1).
    pub in_degree: f64,
    /// out / (n - 1).
    pub out_degree: f64,
}

/// Degree centrality for every vertex. Graphs with fewer than two vertices
/// score zero.
pub fn degree_centrality<N, E>(graph: &DiGraph<N, E>) -> Vec<DegreeCentrality> {
    let n = graph.node_count();
    if n < 2 {
        return vec![DegreeCentrality::default(); n];
    }
    let scale = 1.0 / (n - 1) as f64;

    graph
        .node_indices()
        .map(|v| {
            let in_deg = graph.edges_directed(v, Direction::Incoming).count() as f64;
            let out_deg = graph.edges_directed(v, Direction::Outgoing).count() as f64;
            DegreeCentrality {
                degree: (in_deg + out_deg) * scale,
                in_degree: in_deg * scale,
                out_degree: out_deg * scale,
            }
        })
        .collect()
}

// ============================================================================
// Betweenness centrality
// ============================================================================

/// Betweenness centrality (Brandes) for a directed, unweighted graph.
///
/// Normalised by `1 / ((n - 1)(n - 2))`; graphs with at most two vertices
/// score zero. Unreachable pairs contribute nothing.
pub fn betweenness_centrality<N, E>(graph: &DiGraph<N, E>) -> Vec<f64> {
    let n = graph.node_count();
    if n <= 2 {
        return vec![0.0; n];
    }

    let mut betweenness = vec![0.0; n];
    let mut stack: Vec<NodeIndex> = Vec::with_capacity(n);
    let mut queue: VecDeque<NodeIndex> = VecDeque::new();
    let mut pred: Vec<Vec<NodeIndex>> = vec![Vec::new(); n];
    let mut sigma = vec![0.0f64; n];
    let mut dist: Vec<i64> = vec![-1; n];
    let mut delta = vec![0.0f64; n];

    for s in graph.node_indices() {
        stack.clear();
        queue.clear();
        for i in 0..n {
            pred[i].clear();
            sigma[i] = 0.0;
            dist[i] = -1;
            delta[i] = 0.0;
        }
        sigma[s.index()] = 1.0;
        dist[s.index()] = 0;
        queue.push_back(s);

        while let Some(v) = queue.pop_front() {
            stack.push(v);
            for w in graph.neighbors_directed(v, Direction::Outgoing) {
                if dist[w.index()] < 0 {
                    dist[w.index()] = dist[v.index()] + 1;
                    queue.push_back(w);
                }
                if dist[w.index()] == dist[v.index()] + 1 {
                    sigma[w.index()] += sigma[v.index()];
                    pred[w.index()].push(v);
                }
            }
        }

        while let Some(w) = stack.pop() {
            let sigma_w = sigma[w.index()];
            for &v in &pred[w.index()] {
                if sigma_w > 0.0 {
                    delta[v.index()] += (sigma[v.index()] / sigma_w) * (1.0 + delta[w.index()]);
                }
            }
            if w != s {
                betweenness[w.index()] += delta[w.index()];
            }
        }
    }

    let norm = 1.0 / ((n - 1) * (n - 2)) as f64;
    for b in &mut betweenness {
        *b *= norm;
    }
    betweenness
}

// ============================================================================
// Structural holes
// ============================================================================

/// Neighbourhood data shared by constraint and hierarchy.
///
/// Neighbours ignore direction and self-loops. The tie strength between
/// `u` and `v` is the number of directed edges between them (0, 1 or 2),
/// and `p(u, v)` is that strength over the total strength of `u`.
struct Ties {
    neighbors: Vec<Vec<usize>>,
    successors: Vec<HashSet<usize>>,
    strength: Vec<f64>,
}

impl Ties {
    fn new<N, E>(graph: &DiGraph<N, E>) -> Self {
        let n = graph.node_count();
        let mut successors: Vec<HashSet<usize>> = vec![HashSet::new(); n];
        let mut neighbors: Vec<Vec<usize>> = vec![Vec::new(); n];
        for v in graph.node_indices() {
            for w in graph.neighbors_directed(v, Direction::Outgoing) {
                if w != v {
                    successors[v.index()].insert(w.index());
                }
            }
        }
        for v in 0..n {
            let mut all: Vec<usize> = successors[v].iter().copied().collect();
            all.extend(
                graph
                    .neighbors_directed(NodeIndex::new(v), Direction::Incoming)
                    .map(|w| w.index())
                    .filter(|&w| w != v),
            );
            all.sort_unstable();
            all.dedup();
            neighbors[v] = all;
        }

        let mut ties = Self {
            neighbors,
            successors,
            strength: vec![0.0; n],
        };
        for v in 0..n {
            let total: f64 = ties.neighbors[v].iter().map(|&w| ties.mutual(v, w)).sum();
            ties.strength[v] = total;
        }
        ties
    }

    fn mutual(&self, u: usize, v: usize) -> f64 {
        let forward = self.successors[u].contains(&v) as u8;
        let backward = self.successors[v].contains(&u) as u8;
        f64::from(forward + backward)
    }

    fn proportion(&self, u: usize, v: usize) -> f64 {
        if self.strength[u] == 0.0 {
            return 0.0;
        }
        self.mutual(u, v) / self.strength[u]
    }

    /// Burt's local constraint of `u` on its neighbour `v`.
    fn local_constraint(&self, u: usize, v: usize) -> f64 {
        let indirect: f64 = self.neighbors[u]
            .iter()
            .filter(|&&w| w != v)
            .map(|&w| self.proportion(u, w) * self.proportion(w, v))
            .sum();
        let total = self.proportion(u, v) + indirect;
        total * total
    }

    fn constraint(&self, u: usize) -> f64 {
        self.neighbors[u]
            .iter()
            .map(|&v| self.local_constraint(u, v))
            .sum()
    }
}

/// Burt's constraint for every vertex.
///
/// Isolated vertices score 0.
pub fn constraint<N, E>(graph: &DiGraph<N, E>) -> Vec<f64> {
    let ties = Ties::new(graph);
    (0..graph.node_count()).map(|u| ties.constraint(u)).collect()
}

/// Burt's hierarchy for every vertex: how unevenly a vertex's constraint
/// is spread over its neighbours, in `[0, 1]`.
///
/// Vertices with at most one neighbour score 0.
pub fn hierarchy<N, E>(graph: &DiGraph<N, E>) -> Vec<f64> {
    let ties = Ties::new(graph);
    (0..graph.node_count())
        .map(|u| {
            let degree = ties.neighbors[u].len();
            if degree <= 1 {
                return 0.0;
            }
            let locals: Vec<f64> = ties.neighbors[u]
                .iter()
                .map(|&v| ties.local_constraint(u, v))
                .collect();
            let total: f64 = locals.iter().sum();
            if total == 0.0 {
                return 0.0;
            }
            let n = degree as f64;
            let mean = total / n;
            let entropy: f64 = locals
                .iter()
                .map(|&c| c / mean)
                .filter(|&r| r > 0.0)
                .map(|r| r * r.ln())
                .sum();
            entropy / (n * n.ln())
        })
        .collect()
}

// ============================================================================
// Tests
// ============================================================================
