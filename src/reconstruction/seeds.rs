//! Seed selection for projective reconstruction.
//!
//! Every view is scored by the sum of its best 3D motion scores. Seeds are
//! then picked best-first with non-maximum suppression: once a view becomes a
//! seed, all of its direct neighbors are marked and can no longer be seeds,
//! and neither can any view next to a marked one.

use std::cmp::Ordering;
use std::collections::HashMap;

use tracing::debug;

use crate::config::SeedConfig;
use crate::graph::{MotionId, PairwiseGraph, ViewId};
use crate::scoring::{DefaultMotionScore, MotionScore};

/// How good a view would be as the starting point of a reconstruction.
#[derive(Debug, Clone)]
pub struct SeedInfo {
    /// The candidate view.
    pub seed: ViewId,
    /// Sum of the best motion scores. Higher is better.
    pub score: f64,
    /// Motions that contributed to `score`, best first.
    pub motions: Vec<MotionId>,
    /// Set once a direct neighbor has been selected as a seed.
    pub neighbor: bool,
}

/// Score a view as a seed from its `max_motions` best 3D motions.
///
/// Views with fewer 3D motions are scored with what they have; a view with
/// none scores 0.
pub fn score_view_as_seed<M: MotionScore + ?Sized>(
    graph: &PairwiseGraph,
    view: ViewId,
    scorer: &M,
    max_motions: usize,
) -> SeedInfo {
    let mut scored: Vec<(f64, MotionId)> = graph
        .neighbors(view)
        .filter(|(m, _)| m.is_3d)
        .map(|(m, _)| (scorer.score(m), m.id))
        .collect();

    // Sort descending by score; stable so equal scores keep connection order
    scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(Ordering::Equal));
    scored.truncate(max_motions);

    SeedInfo {
        seed: view,
        score: scored.iter().map(|(s, _)| s).sum(),
        motions: scored.into_iter().map(|(_, m)| m).collect(),
        neighbor: false,
    }
}

/// Score every view in the graph as a potential seed, in graph order.
pub fn score_nodes_as_seeds<M: MotionScore + ?Sized>(
    graph: &PairwiseGraph,
    scorer: &M,
    config: &SeedConfig,
) -> Vec<SeedInfo> {
    graph
        .views()
        .map(|v| score_view_as_seed(graph, v.id, scorer, config.max_motions))
        .collect()
}

/// Pick seeds from scored candidates, best first.
///
/// Candidates at or below `min_score_fraction` of the best score are never
/// selected. A candidate is skipped if it, or any view connected to it, is
/// the neighbor of an already selected seed. Ties in score are resolved in
/// favor of the candidate that comes first in `candidates`.
pub fn select_seeds(
    graph: &PairwiseGraph,
    mut candidates: Vec<SeedInfo>,
    min_score_fraction: f64,
) -> Vec<SeedInfo> {
    candidates.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));

    let min_score = match candidates.first() {
        Some(best) => best.score * min_score_fraction,
        None => return Vec::new(),
    };

    let position: HashMap<ViewId, usize> = candidates
        .iter()
        .enumerate()
        .map(|(idx, c)| (c.seed, idx))
        .collect();
    let is_neighbor =
        |candidates: &[SeedInfo], view: ViewId| position.get(&view).is_some_and(|&i| candidates[i].neighbor);

    let mut seeds = Vec::new();
    for idx in 0..candidates.len() {
        if candidates[idx].neighbor {
            continue;
        }

        // Scores are sorted, nothing after this can pass
        if candidates[idx].score <= min_score {
            break;
        }

        let seed = candidates[idx].seed;
        if graph
            .neighbors(seed)
            .any(|(_, other)| is_neighbor(&candidates, other))
        {
            continue;
        }

        seeds.push(candidates[idx].clone());

        // Non-maximum suppression over a one-hop radius
        for (_, other) in graph.neighbors(seed) {
            if let Some(&i) = position.get(&other) {
                candidates[i].neighbor = true;
            }
        }
    }

    seeds
}

/// Scores views and selects seeds with a fixed scorer and configuration.
pub struct SeedSelector<M = DefaultMotionScore> {
    pub config: SeedConfig,
    scorer: M,
}

impl<M: MotionScore> SeedSelector<M> {
    pub fn new(config: SeedConfig, scorer: M) -> Self {
        Self { config, scorer }
    }

    /// Seeds for `graph`, best first. Empty if no view has a 3D motion.
    pub fn select(&self, graph: &PairwiseGraph) -> Vec<SeedInfo> {
        let candidates = score_nodes_as_seeds(graph, &self.scorer, &self.config);
        let seeds = select_seeds(graph, candidates, self.config.min_score_fraction);
        debug!(
            "[Seeds] Selected {} seeds out of {} views",
            seeds.len(),
            graph.num_views()
        );
        seeds
    }
}

impl Default for SeedSelector<DefaultMotionScore> {
    fn default() -> Self {
        Self::new(SeedConfig::default(), DefaultMotionScore)
    }
}
