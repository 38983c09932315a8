//! Structural vertex-selection strategies.
//!
//! Every strategy works on an undirected simple graph with no attributes
//! and returns exactly `target` distinct vertex indices (`target` must not
//! exceed the vertex count). When the walk or crawl has sampled every
//! vertex it can reach, it restarts from a uniformly drawn unsampled
//! vertex, so disconnected graphs still reach the target.

use std::collections::{HashSet, VecDeque};

use netmusic_core::{Error, Result};
use petgraph::graph::{NodeIndex, UnGraph};
use petgraph::unionfind::UnionFind;
use petgraph::visit::EdgeRef;
use rand::Rng;
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand_distr::Geometric;

/// Attribute-free undirected view the strategies run on.
pub type StructuralGraph = UnGraph<(), ()>;

/// A whole-graph vertex sampler.
pub trait SamplingStrategy {
    /// Strategy name used in logs and default export file names.
    fn name(&self) -> &'static str;

    /// Select exactly `target` distinct vertices, in selection order.
    fn select(&self, graph: &StructuralGraph, target: usize, rng: &mut StdRng) -> Vec<usize>;
}

// ============================================================================
// Selection bookkeeping
// ============================================================================

/// Sampled set plus per-component counts of unsampled vertices.
///
/// `pool` holds the unsampled vertices and `slot[v]` is the position of `v`
/// in it, so sampling a vertex and drawing a fresh seed are both O(1).
struct Selection {
    sampled: Vec<bool>,
    order: Vec<usize>,
    component: Vec<usize>,
    open: Vec<usize>,
    pool: Vec<usize>,
    slot: Vec<usize>,
}

impl Selection {
    fn new(graph: &StructuralGraph) -> Self {
        let n = graph.node_count();
        let mut components = UnionFind::<usize>::new(n);
        for edge in graph.edge_references() {
            components.union(edge.source().index(), edge.target().index());
        }
        let component = components.into_labeling();
        let mut open = vec![0; n];
        for &label in &component {
            open[label] += 1;
        }
        Self {
            sampled: vec![false; n],
            order: Vec::new(),
            component,
            open,
            pool: (0..n).collect(),
            slot: (0..n).collect(),
        }
    }

    fn len(&self) -> usize {
        self.order.len()
    }

    fn contains(&self, v: usize) -> bool {
        self.sampled[v]
    }

    /// Adds `v`; false if it was already sampled.
    fn insert(&mut self, v: usize) -> bool {
        if self.sampled[v] {
            return false;
        }
        self.sampled[v] = true;
        self.order.push(v);
        self.open[self.component[v]] -= 1;

        let at = self.slot[v];
        self.pool.swap_remove(at);
        if let Some(&moved) = self.pool.get(at) {
            self.slot[moved] = at;
        }
        true
    }

    /// True when every vertex in `v`'s component is sampled.
    fn component_exhausted(&self, v: usize) -> bool {
        self.open[self.component[v]] == 0
    }

    /// True when `v` has a neighbour that is not sampled yet.
    fn borders_open(&self, graph: &StructuralGraph, v: usize) -> bool {
        graph
            .neighbors(NodeIndex::new(v))
            .any(|w| !self.sampled[w.index()])
    }

    /// Samples and returns a uniformly drawn unsampled vertex.
    fn reseed(&mut self, rng: &mut StdRng) -> Option<usize> {
        let seed = *self.pool.choose(rng)?;
        self.insert(seed);
        Some(seed)
    }

    fn into_order(self) -> Vec<usize> {
        self.order
    }
}

fn neighbors(graph: &StructuralGraph, v: usize) -> Vec<usize> {
    graph
        .neighbors(NodeIndex::new(v))
        .map(NodeIndex::index)
        .collect()
}

// ============================================================================
// Diffusion
// ============================================================================

/// Diffusion sampling: repeatedly pick a sampled vertex at random and add
/// a random neighbour of it.
#[derive(Clone, Copy, Debug, Default)]
pub struct Diffusion;

impl SamplingStrategy for Diffusion {
    fn name(&self) -> &'static str {
        "DiffusionSampler"
    }

    fn select(&self, graph: &StructuralGraph, target: usize, rng: &mut StdRng) -> Vec<usize> {
        let mut selection = Selection::new(graph);
        // Sampled vertices of the component currently being diffused into.
        let mut active: Vec<usize> = Vec::new();

        while selection.len() < target {
            let exhausted = active
                .first()
                .is_none_or(|&v| selection.component_exhausted(v));
            if exhausted {
                let Some(seed) = selection.reseed(rng) else {
                    break;
                };
                active.clear();
                active.push(seed);
                continue;
            }

            let Some(&source) = active.choose(rng) else {
                break;
            };
            if let Some(&next) = neighbors(graph, source).choose(rng)
                && selection.insert(next)
            {
                active.push(next);
            }
        }
        selection.into_order()
    }
}

// ============================================================================
// Diffusion tree
// ============================================================================

/// Diffusion tree sampling: grow a spanning tree by attaching an unsampled
/// neighbour to a random frontier vertex.
#[derive(Clone, Copy, Debug, Default)]
pub struct DiffusionTree;

impl SamplingStrategy for DiffusionTree {
    fn name(&self) -> &'static str {
        "DiffusionTreeSampler"
    }

    fn select(&self, graph: &StructuralGraph, target: usize, rng: &mut StdRng) -> Vec<usize> {
        let mut selection = Selection::new(graph);
        let mut frontier: Vec<usize> = Vec::new();

        while selection.len() < target {
            if frontier.is_empty() {
                let Some(seed) = selection.reseed(rng) else {
                    break;
                };
                frontier.push(seed);
                continue;
            }

            let slot = rng.gen_range(0..frontier.len());
            let open: Vec<usize> = neighbors(graph, frontier[slot])
                .into_iter()
                .filter(|&v| !selection.contains(v))
                .collect();
            match open.choose(rng) {
                Some(&next) => {
                    selection.insert(next);
                    frontier.push(next);
                }
                None => {
                    frontier.swap_remove(slot);
                }
            }
        }
        selection.into_order()
    }
}

// ============================================================================
// Forest fire
// ============================================================================

/// Default burning probability.
pub const DEFAULT_BURN_PROBABILITY: f64 = 0.4;

/// Forest fire sampling: each burning vertex ignites `1 + Geometric(p)`
/// of its unburnt neighbours, breadth first. A fire that dies out is
/// re-ignited at a burnt vertex that still has unburnt neighbours.
#[derive(Clone, Copy, Debug)]
pub struct ForestFire {
    spread: Geometric,
}

impl ForestFire {
    /// `p` must be within `(0, 1]`.
    pub fn new(p: f64) -> Result<Self> {
        if !(p > 0.0 && p <= 1.0) {
            return Err(Error::config(format!(
                "forest fire probability must be within (0, 1], got {p}"
            )));
        }
        let spread = Geometric::new(p).map_err(|e| Error::config(format!("{e:?}")))?;
        Ok(Self { spread })
    }
}

impl SamplingStrategy for ForestFire {
    fn name(&self) -> &'static str {
        "ForestFireSampler"
    }

    fn select(&self, graph: &StructuralGraph, target: usize, rng: &mut StdRng) -> Vec<usize> {
        let mut selection = Selection::new(graph);
        let mut burning: VecDeque<usize> = VecDeque::new();
        // Every vertex burnt by the current fire, for re-ignition.
        let mut burnt: Vec<usize> = Vec::new();

        while selection.len() < target {
            let Some(current) = burning.pop_front() else {
                // Re-ignite a burnt vertex that still borders unburnt ones,
                // or start a new fire elsewhere. A burnt vertex with no
                // unburnt neighbour stays that way, so it is dropped for good.
                let mut ignited = None;
                while !burnt.is_empty() {
                    let at = rng.gen_range(0..burnt.len());
                    if selection.borders_open(graph, burnt[at]) {
                        ignited = Some(burnt[at]);
                        break;
                    }
                    burnt.swap_remove(at);
                }
                match ignited {
                    Some(v) => burning.push_back(v),
                    None => {
                        let Some(seed) = selection.reseed(rng) else {
                            break;
                        };
                        burnt.push(seed);
                        burning.push_back(seed);
                    }
                }
                continue;
            };

            let mut unburnt: Vec<usize> = neighbors(graph, current)
                .into_iter()
                .filter(|&v| !selection.contains(v))
                .collect();
            let spread = usize::try_from(self.spread.sample(rng)).unwrap_or(usize::MAX);
            let count = spread.saturating_add(1).min(unburnt.len());
            unburnt.shuffle(rng);
            for v in unburnt.into_iter().take(count) {
                if selection.len() >= target {
                    break;
                }
                selection.insert(v);
                burnt.push(v);
                burning.push_back(v);
            }
        }
        selection.into_order()
    }
}

// ============================================================================
// Common neighbour aware random walk
// ============================================================================

/// Random walk that prefers neighbours sharing few common neighbours with
/// the current vertex: the weight of `u → v` is
/// `1 - |N(u) ∩ N(v)| / min(deg u, deg v)`. When every weight is zero the
/// step is uniform.
#[derive(Clone, Copy, Debug, Default)]
pub struct CommonNeighborAwareRandomWalk;

impl SamplingStrategy for CommonNeighborAwareRandomWalk {
    fn name(&self) -> &'static str {
        "CommonNeighborAwareRandomWalkSampler"
    }

    fn select(&self, graph: &StructuralGraph, target: usize, rng: &mut StdRng) -> Vec<usize> {
        let mut selection = Selection::new(graph);
        let mut current: Option<usize> = None;

        while selection.len() < target {
            let u = match current {
                Some(u) if !selection.component_exhausted(u) => u,
                _ => {
                    current = selection.reseed(rng);
                    if current.is_none() {
                        break;
                    }
                    continue;
                }
            };

            let around_u = neighbors(graph, u);
            if around_u.is_empty() {
                current = None;
                continue;
            }
            let set_u: HashSet<usize> = around_u.iter().copied().collect();
            let weights: Vec<f64> = around_u
                .iter()
                .map(|&v| {
                    let around_v = neighbors(graph, v);
                    let common = around_v.iter().filter(|w| set_u.contains(w)).count();
                    let min_degree = around_u.len().min(around_v.len()).max(1);
                    1.0 - common as f64 / min_degree as f64
                })
                .collect();

            let next = match WeightedIndex::new(&weights) {
                Ok(dist) => around_u[dist.sample(rng)],
                Err(_) => around_u[rng.gen_range(0..around_u.len())],
            };
            selection.insert(next);
            current = Some(next);
        }
        selection.into_order()
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn graph_from(n: usize, edges: &[(usize, usize)]) -> StructuralGraph {
        let mut g = UnGraph::new_undirected();
        for _ in 0..n {
            g.add_node(());
        }
        for &(a, b) in edges {
            g.add_edge(NodeIndex::new(a), NodeIndex::new(b), ());
        }
        g
    }

    /// Two triangles, a path of three and two isolated vertices.
    fn fragmented() -> StructuralGraph {
        graph_from(
            11,
            &[(0, 1), (1, 2), (2, 0), (3, 4), (4, 5), (5, 3), (6, 7), (7, 8)],
        )
    }

    fn grid(side: usize) -> StructuralGraph {
        let mut edges = Vec::new();
        for r in 0..side {
            for c in 0..side {
                let v = r * side + c;
                if c + 1 < side {
                    edges.push((v, v + 1));
                }
                if r + 1 < side {
                    edges.push((v, v + side));
                }
            }
        }
        graph_from(side * side, &edges)
    }

    fn all_strategies() -> Vec<Box<dyn SamplingStrategy>> {
        vec![
            Box::new(Diffusion),
            Box::new(DiffusionTree),
            Box::new(ForestFire::new(DEFAULT_BURN_PROBABILITY).unwrap()),
            Box::new(CommonNeighborAwareRandomWalk),
        ]
    }

    fn assert_exact_distinct(selected: &[usize], target: usize, n: usize) {
        assert_eq!(selected.len(), target);
        let unique: HashSet<usize> = selected.iter().copied().collect();
        assert_eq!(unique.len(), target);
        assert!(selected.iter().all(|&v| v < n));
    }

    // ------------------------------------------------------------------------
    // Size guarantees
    // ------------------------------------------------------------------------

    #[test]
    fn test_every_strategy_hits_target_on_grid() {
        let g = grid(6);
        for strategy in all_strategies() {
            for target in [0, 1, 10, 36] {
                let mut rng = StdRng::seed_from_u64(7);
                let selected = strategy.select(&g, target, &mut rng);
                assert_exact_distinct(&selected, target, 36);
            }
        }
    }

    #[test]
    fn test_every_strategy_hits_target_on_fragmented_graph() {
        let g = fragmented();
        for strategy in all_strategies() {
            for seed in 0..5 {
                let mut rng = StdRng::seed_from_u64(seed);
                let selected = strategy.select(&g, 11, &mut rng);
                assert_exact_distinct(&selected, 11, 11);
            }
        }
    }

    #[test]
    fn test_edgeless_graph() {
        let g = graph_from(5, &[]);
        for strategy in all_strategies() {
            let mut rng = StdRng::seed_from_u64(1);
            assert_exact_distinct(&strategy.select(&g, 3, &mut rng), 3, 5);
        }
    }

    #[test]
    fn test_empty_graph() {
        let g = graph_from(0, &[]);
        for strategy in all_strategies() {
            let mut rng = StdRng::seed_from_u64(1);
            assert!(strategy.select(&g, 0, &mut rng).is_empty());
        }
    }

    #[test]
    fn test_same_seed_same_selection() {
        let g = grid(5);
        for strategy in all_strategies() {
            let a = strategy.select(&g, 12, &mut StdRng::seed_from_u64(99));
            let b = strategy.select(&g, 12, &mut StdRng::seed_from_u64(99));
            assert_eq!(a, b, "{}", strategy.name());
        }
    }

    #[test]
    fn test_many_small_components_reach_target() {
        // 3000 isolated pairs: every strategy reseeds thousands of times.
        let edges: Vec<(usize, usize)> = (0..3000).map(|i| (2 * i, 2 * i + 1)).collect();
        let g = graph_from(6000, &edges);
        for strategy in all_strategies() {
            let mut rng = StdRng::seed_from_u64(5);
            assert_exact_distinct(&strategy.select(&g, 6000, &mut rng), 6000, 6000);
        }
    }

    // ------------------------------------------------------------------------
    // Selection bookkeeping
    // ------------------------------------------------------------------------

    #[test]
    fn test_selection_pool_tracks_unsampled() {
        let g = fragmented();
        let mut selection = Selection::new(&g);
        for v in [4, 0, 10, 4, 7] {
            selection.insert(v);
        }
        let mut pool = selection.pool.clone();
        pool.sort_unstable();
        assert_eq!(pool, vec![1, 2, 3, 5, 6, 8, 9]);
        for (at, &v) in selection.pool.iter().enumerate() {
            assert_eq!(selection.slot[v], at);
        }

        let mut rng = StdRng::seed_from_u64(2);
        while let Some(seed) = selection.reseed(&mut rng) {
            assert!(!pool.is_empty());
            pool.retain(|&v| v != seed);
        }
        assert!(pool.is_empty());
        assert_eq!(selection.len(), 11);
    }

    #[test]
    fn test_borders_open() {
        let g = fragmented();
        let mut selection = Selection::new(&g);
        selection.insert(6);
        assert!(selection.borders_open(&g, 6));
        selection.insert(7);
        assert!(!selection.borders_open(&g, 6));
        assert!(!selection.borders_open(&g, 10));
    }

    // ------------------------------------------------------------------------
    // Locality
    // ------------------------------------------------------------------------

    #[test]
    fn test_tree_strategies_stay_connected_within_component() {
        // On a connected graph, every vertex after the seed is adjacent to
        // an earlier one.
        let g = grid(5);
        let strategies: Vec<Box<dyn SamplingStrategy>> = vec![
            Box::new(Diffusion),
            Box::new(DiffusionTree),
            Box::new(ForestFire::new(0.4).unwrap()),
            Box::new(CommonNeighborAwareRandomWalk),
        ];
        for strategy in strategies {
            let selected = strategy.select(&g, 15, &mut StdRng::seed_from_u64(3));
            for (i, &v) in selected.iter().enumerate().skip(1) {
                let before: HashSet<usize> = selected[..i].iter().copied().collect();
                assert!(
                    neighbors(&g, v).iter().any(|w| before.contains(w)),
                    "{}: vertex {v} not adjacent to earlier selection",
                    strategy.name()
                );
            }
        }
    }

    // ------------------------------------------------------------------------
    // Forest fire parameters
    // ------------------------------------------------------------------------

    #[test]
    fn test_forest_fire_rejects_bad_probability() {
        assert!(ForestFire::new(0.0).is_err());
        assert!(ForestFire::new(1.5).is_err());
        assert!(ForestFire::new(f64::NAN).is_err());
        assert!(ForestFire::new(1.0).is_ok());
    }

    #[test]
    fn test_strategy_names() {
        let names: Vec<&str> = all_strategies().iter().map(|s| s.name()).collect();
        assert_eq!(
            names,
            vec![
                "DiffusionSampler",
                "DiffusionTreeSampler",
                "ForestFireSampler",
                "CommonNeighborAwareRandomWalkSampler",
            ]
        );
    }
}
