//! ProjectiveReconstruction - grows a projective scene from a seed view.
//!
//! The reconstruction runs in two phases:
//! 1. **Bootstrap**: pick the best seed, find the features it shares with its
//!    best motions and estimate all of their cameras at once.
//! 2. **Expansion**: keep a frontier of unresolved views reachable through 3D
//!    motions. Each step resolves the open view with the most resolved
//!    neighbors (ties broken by the best triangle of motions), then adds its
//!    unseen neighbors to the frontier.
//!
//! A view is attempted at most once. If its solve fails it is dropped and its
//! neighbors are only reached through other views.

use std::collections::HashSet;

use tracing::{debug, info, warn};

use crate::config::ReconstructionConfig;
use crate::error::{ReconstructionError, SceneError};
use crate::graph::{Motion, PairwiseGraph, ViewId};
use crate::scene::SceneWorkingGraph;
use crate::scoring::{DefaultMotionScore, MotionScore};

use super::seeds::{score_nodes_as_seeds, select_seeds, SeedInfo};
use super::solver::ProjectiveSolver;

/// What a reconstruction run did.
#[derive(Debug, Clone, PartialEq)]
pub struct ExpansionSummary {
    /// Seed the scene was grown from.
    pub seed: ViewId,
    /// Number of views resolved by the bootstrap, seed included.
    pub initial_views: usize,
    /// Views added one at a time after the bootstrap, in order.
    pub expanded: Vec<ViewId>,
    /// Views whose solve failed.
    pub rejected: Vec<ViewId>,
    /// Views still open when no further candidate could be selected.
    pub abandoned: Vec<ViewId>,
}

impl ExpansionSummary {
    /// Total number of views with a camera.
    pub fn num_resolved(&self) -> usize {
        self.initial_views + self.expanded.len()
    }
}

/// Incremental projective reconstruction over a pairwise graph.
pub struct ProjectiveReconstruction<S, M = DefaultMotionScore> {
    pub config: ReconstructionConfig,

    solver: S,
    scorer: M,

    /// Views resolved so far.
    work_graph: SceneWorkingGraph,

    /// Views that have been queued or resolved. Only ever grows during a run.
    explored: HashSet<ViewId>,
}

impl<S: ProjectiveSolver> ProjectiveReconstruction<S, DefaultMotionScore> {
    /// Create with the default motion score and configuration.
    pub fn new(solver: S) -> Self {
        Self::with_scorer(solver, DefaultMotionScore, ReconstructionConfig::default())
    }
}

impl<S: ProjectiveSolver, M: MotionScore> ProjectiveReconstruction<S, M> {
    pub fn with_scorer(solver: S, scorer: M, config: ReconstructionConfig) -> Self {
        Self {
            config,
            solver,
            scorer,
            work_graph: SceneWorkingGraph::new(),
            explored: HashSet::new(),
        }
    }

    /// The scene built by the last call to [`process`](Self::process).
    pub fn work_graph(&self) -> &SceneWorkingGraph {
        &self.work_graph
    }

    /// Views queued or resolved by the last run.
    pub fn explored(&self) -> &HashSet<ViewId> {
        &self.explored
    }

    pub fn solver(&self) -> &S {
        &self.solver
    }

    pub fn solver_mut(&mut self) -> &mut S {
        &mut self.solver
    }

    /// Reconstruct as much of `graph` as possible from its best seed.
    ///
    /// Any previous result is discarded. An error means no scene could be
    /// started and leaves the working graph empty; once the bootstrap
    /// succeeds, failures of individual views only show up in the returned
    /// summary.
    pub fn process(
        &mut self,
        db: &S::Lookup,
        graph: &PairwiseGraph,
    ) -> Result<ExpansionSummary, ReconstructionError> {
        self.work_graph.reset();
        self.explored.clear();

        let result = self.run(db, graph);
        if result.is_err() {
            self.work_graph.reset();
            self.explored.clear();
        }
        result
    }

    fn run(
        &mut self,
        db: &S::Lookup,
        graph: &PairwiseGraph,
    ) -> Result<ExpansionSummary, ReconstructionError> {
        let candidates = score_nodes_as_seeds(graph, &self.scorer, &self.config.seed);
        let seeds = select_seeds(graph, candidates, self.config.seed.min_score_fraction);
        let seed = seeds.first().ok_or(ReconstructionError::NoSeeds)?;
        info!(
            "[Reconstruction] {} seeds, starting from {} (score {:.1})",
            seeds.len(),
            seed.seed,
            seed.score
        );

        self.initialize_from_seed(db, graph, seed)?;

        let mut summary = ExpansionSummary {
            seed: seed.seed,
            initial_views: self.work_graph.num_views(),
            expanded: Vec::new(),
            rejected: Vec::new(),
            abandoned: Vec::new(),
        };

        let mut open = Vec::new();
        for view in self.work_graph.view_ids() {
            self.add_open_for_view(graph, view, &mut open);
        }

        self.expand(db, graph, open, &mut summary)?;

        info!(
            "[Reconstruction] Resolved {} of {} views ({} rejected)",
            self.work_graph.num_views(),
            graph.num_views(),
            summary.rejected.len()
        );
        Ok(summary)
    }

    /// Estimate the cameras of the seed and its best neighbors.
    fn initialize_from_seed(
        &mut self,
        db: &S::Lookup,
        graph: &PairwiseGraph,
        seed: &SeedInfo,
    ) -> Result<(), ReconstructionError> {
        let common = self
            .solver
            .find_common_features(graph, seed.seed, &seed.motions);
        debug!(
            "[Reconstruction] Seed {} shares {} features with {} motions",
            seed.seed,
            common.len(),
            seed.motions.len()
        );

        let required = self.config.expansion.min_common_features;
        if common.len() < required {
            return Err(ReconstructionError::TooFewCommonFeatures {
                seed: seed.seed,
                found: common.len(),
                required,
            });
        }

        let cameras = self
            .solver
            .initialize_scene(db, graph, seed.seed, &common, &seed.motions)
            .ok_or(ReconstructionError::SeedInitialization { seed: seed.seed })?;

        for (view, camera) in cameras {
            self.work_graph.add_view(view, camera)?;
            self.explored.insert(view);
        }

        let entry = self
            .work_graph
            .lookup_view_mut(seed.seed)
            .ok_or(SceneError::UnknownView(seed.seed))?;
        self.solver.save_inliers(entry);

        Ok(())
    }

    /// Resolve open views one at a time until none can be selected.
    fn expand(
        &mut self,
        db: &S::Lookup,
        graph: &PairwiseGraph,
        mut open: Vec<ViewId>,
        summary: &mut ExpansionSummary,
    ) -> Result<(), ReconstructionError> {
        while !open.is_empty() {
            let Some(idx) = select_next_to_process(
                graph,
                &self.work_graph,
                &open,
                &self.scorer,
                self.config.expansion.max_valid_neighbors,
            ) else {
                debug!(
                    "[Reconstruction] No open view has a resolved neighbor, {} left",
                    open.len()
                );
                break;
            };

            // Frontier order must be kept for tie breaking
            let view = open.remove(idx);

            let Some(camera) = self
                .solver
                .expand_by_one_view(db, graph, &self.work_graph, view)
            else {
                warn!("[Reconstruction] Failed to expand to view {}", view);
                summary.rejected.push(view);
                continue;
            };

            let entry = self.work_graph.add_view(view, camera)?;
            self.solver.save_inliers(entry);
            summary.expanded.push(view);

            self.add_open_for_view(graph, view, &mut open);
        }

        summary.abandoned = open;
        Ok(())
    }

    /// Queue every unexplored view joined to `view` by a 3D motion.
    fn add_open_for_view(&mut self, graph: &PairwiseGraph, view: ViewId, open: &mut Vec<ViewId>) {
        for (motion, other) in graph.neighbors(view) {
            if !motion.is_3d || !self.explored.insert(other) {
                continue;
            }
            debug!("[Reconstruction] Open {} via {}", other, view);
            open.push(other);
        }
    }
}

/// Index of the open view to resolve next, or `None` if no open view has a
/// resolved 3D neighbor.
///
/// Views are ranked by the number of resolved 3D neighbors, capped at
/// `max_valid_neighbors`, then by their best triangle: for two resolved
/// neighbors joined by a 3D motion, the minimum score of the three motions.
/// Views without such a triangle score 0 but can still be picked. Equal
/// candidates keep the first one in `open`.
pub fn select_next_to_process<M: MotionScore + ?Sized>(
    graph: &PairwiseGraph,
    working: &SceneWorkingGraph,
    open: &[ViewId],
    scorer: &M,
    max_valid_neighbors: usize,
) -> Option<usize> {
    // (index in open, capped valid count, triangle score)
    let mut best: Option<(usize, usize, f64)> = None;

    for (idx, &view) in open.iter().enumerate() {
        let valid: Vec<(ViewId, &Motion)> = graph
            .neighbors(view)
            .filter(|(m, other)| m.is_3d && working.is_known(*other))
            .map(|(m, other)| (other, m))
            .collect();
        if valid.is_empty() {
            continue;
        }

        let score = best_triangle_score(graph, scorer, &valid);
        let count = valid.len().min(max_valid_neighbors);

        let better = match best {
            None => true,
            Some((_, best_count, best_score)) => {
                count > best_count || (count == best_count && score > best_score)
            }
        };
        if better {
            best = Some((idx, count, score));
        }
    }

    let (idx, count, score) = best?;
    debug!(
        "[Reconstruction] Selected {} with {} valid neighbors, score {:.1}",
        open[idx], count, score
    );
    Some(idx)
}

/// Best minimum score over triangles formed by `valid` neighbors.
fn best_triangle_score<M: MotionScore + ?Sized>(
    graph: &PairwiseGraph,
    scorer: &M,
    valid: &[(ViewId, &Motion)],
) -> f64 {
    let mut best = 0.0f64;
    for (i, &(view_a, motion_a)) in valid.iter().enumerate() {
        for &(view_b, motion_b) in &valid[i + 1..] {
            let Some(between) = graph.find_motion_3d(view_a, view_b) else {
                continue;
            };
            let score = scorer
                .score(motion_a)
                .min(scorer.score(motion_b))
                .min(scorer.score(between));
            best = best.max(score);
        }
    }
    best
}
