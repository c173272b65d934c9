//! Local neighborhood selection around a target view.
//!
//! Local refinement only needs the views that constrain the target, but the
//! radius-2 neighborhood of a well connected view can be large. The selector
//! starts from that neighborhood and greedily prunes it:
//!
//! 1. Collect the target's resolved neighbors, then their resolved neighbors.
//! 2. Score every motion between members of the neighborhood once.
//! 3. While too many views remain, find the weakest motion. If it touches the
//!    target, drop the neighbor on its other end. Otherwise drop the endpoint
//!    whose remaining connections are weaker. Views left without any motion
//!    into the neighborhood are dropped with it.
//!
//! Direct neighbors of the target are protected once only `min_neighbors` of
//! them remain.

use std::collections::HashSet;

use tracing::{debug, trace};

use crate::config::LocalSelectConfig;
use crate::error::{SceneError, SelectError};
use crate::graph::{MotionId, PairwiseGraph, ViewId};
use crate::scene::SceneWorkingGraph;
use crate::scoring::{DefaultMotionScore, MotionScore};

/// A motion inside the neighborhood with its score.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeScore {
    pub motion: MotionId,
    /// Endpoints, in the motion's `src`, `dst` order.
    pub src: ViewId,
    pub dst: ViewId,
    pub score: f64,
}

impl EdgeScore {
    pub fn touches(&self, view: ViewId) -> bool {
        self.src == view || self.dst == view
    }

    fn other(&self, view: ViewId) -> ViewId {
        if self.src == view {
            self.dst
        } else {
            self.src
        }
    }
}

/// Selects a bounded set of views around a target.
pub struct LocalNeighborhoodSelector<M = DefaultMotionScore> {
    pub config: LocalSelectConfig,
    scorer: M,
}

impl Default for LocalNeighborhoodSelector<DefaultMotionScore> {
    fn default() -> Self {
        Self::new(LocalSelectConfig::default(), DefaultMotionScore)
    }
}

impl<M: MotionScore> LocalNeighborhoodSelector<M> {
    pub fn new(config: LocalSelectConfig, scorer: M) -> Self {
        Self { config, scorer }
    }

    /// Build a working graph with `target` and at most `max_views - 1` of
    /// its neighbors and neighbors of neighbors.
    ///
    /// Entries are copied from `working`, so cameras and inliers are those of
    /// the full scene. The target comes first, followed by the surviving views
    /// in discovery order. Equal scores always resolve the same way.
    pub fn select(
        &self,
        graph: &PairwiseGraph,
        working: &SceneWorkingGraph,
        target: ViewId,
    ) -> Result<SceneWorkingGraph, SelectError> {
        self.validate()?;
        if graph.get_view(target).is_none() || !working.is_known(target) {
            return Err(SelectError::TargetNotInScene(target));
        }

        let mut local = Neighborhood::collect(graph, working, target, &self.scorer);
        let initial = local.candidates.len();

        let max_candidates = self.config.max_views - 1;
        while local.candidates.len() > max_candidates {
            self.prune_one(&mut local)?;
        }

        debug!(
            "[LocalSelect] {}: kept {} of {} candidates, {} direct neighbors",
            target,
            local.candidates.len(),
            initial,
            local.remaining_direct
        );

        let mut selected = SceneWorkingGraph::new();
        for view in std::iter::once(target).chain(local.candidates.iter().copied()) {
            let entry = working
                .lookup_view(view)
                .ok_or(SceneError::UnknownView(view))?;
            selected.add_copy(entry)?;
        }
        Ok(selected)
    }

    fn validate(&self) -> Result<(), SelectError> {
        if self.config.max_views == 0 {
            return Err(SelectError::InvalidConfig(
                "max_views must be at least 1".to_string(),
            ));
        }
        if self.config.worst_of_top == 0 {
            return Err(SelectError::InvalidConfig(
                "worst_of_top must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Remove the weaker end of the weakest removable edge.
    fn prune_one(&self, local: &mut Neighborhood) -> Result<(), SelectError> {
        let protect = local.remaining_direct <= self.config.min_neighbors;

        let Some(edge) = local.weakest_edge(protect) else {
            return Err(SelectError::NoRemovableEdge {
                candidates: local.candidates.len(),
                max_views: self.config.max_views,
                min_neighbors: self.config.min_neighbors,
            });
        };

        let victim = if edge.touches(local.target) {
            edge.other(local.target)
        } else if protect && local.is_direct(edge.src) != local.is_direct(edge.dst) {
            // Only one end can go without dropping below the floor
            if local.is_direct(edge.src) {
                edge.dst
            } else {
                edge.src
            }
        } else {
            let k = self.config.worst_of_top;
            let score_src = local.score_for_removal(edge.src, edge.motion, k);
            let score_dst = local.score_for_removal(edge.dst, edge.motion, k);
            trace!(
                "[LocalSelect] edge {} scores {}={:.1} {}={:.1}",
                edge.motion,
                edge.src,
                score_src,
                edge.dst,
                score_dst
            );
            if score_src < score_dst {
                edge.src
            } else {
                edge.dst
            }
        };

        debug!(
            "[LocalSelect] Removing {} (edge {} score {:.1})",
            victim, edge.motion, edge.score
        );
        local.remove(victim)
    }
}

/// Per-call pruning state.
struct Neighborhood {
    target: ViewId,

    /// Surviving candidates in discovery order. Never contains the target.
    candidates: Vec<ViewId>,
    members: HashSet<ViewId>,

    /// Candidates that are directly connected to the target.
    direct: HashSet<ViewId>,
    remaining_direct: usize,

    /// Motions between surviving members (target included), in discovery order.
    edges: Vec<EdgeScore>,
}

impl Neighborhood {
    fn collect<M: MotionScore + ?Sized>(
        graph: &PairwiseGraph,
        working: &SceneWorkingGraph,
        target: ViewId,
        scorer: &M,
    ) -> Self {
        let mut candidates = Vec::new();
        let mut members = HashSet::new();

        let mut add = |view: ViewId, candidates: &mut Vec<ViewId>| {
            if view != target && working.is_known(view) && members.insert(view) {
                candidates.push(view);
            }
        };

        for (_, other) in graph.neighbors(target) {
            add(other, &mut candidates);
        }
        let num_direct = candidates.len();
        for idx in 0..num_direct {
            for (_, other) in graph.neighbors(candidates[idx]) {
                add(other, &mut candidates);
            }
        }

        let direct: HashSet<ViewId> = candidates[..num_direct].iter().copied().collect();

        let mut seen = HashSet::new();
        let mut edges = Vec::new();
        for &view in std::iter::once(&target).chain(candidates.iter()) {
            for (motion, other) in graph.neighbors(view) {
                let inside = other == target || members.contains(&other);
                if inside && seen.insert(motion.id) {
                    edges.push(EdgeScore {
                        motion: motion.id,
                        src: motion.src,
                        dst: motion.dst,
                        score: scorer.score(motion),
                    });
                }
            }
        }

        Self {
            target,
            candidates,
            members,
            remaining_direct: direct.len(),
            direct,
            edges,
        }
    }

    fn is_direct(&self, view: ViewId) -> bool {
        self.direct.contains(&view)
    }

    /// Lowest scoring edge, first one on ties.
    ///
    /// With `protect` set, edges whose removal would cost a direct neighbor
    /// are skipped: edges to the target and edges between two direct
    /// neighbors.
    fn weakest_edge(&self, protect: bool) -> Option<EdgeScore> {
        let mut best: Option<EdgeScore> = None;
        for edge in &self.edges {
            if protect
                && (edge.touches(self.target)
                    || (self.is_direct(edge.src) && self.is_direct(edge.dst)))
            {
                continue;
            }
            if best.map_or(true, |b| edge.score < b.score) {
                best = Some(*edge);
            }
        }
        best
    }

    /// Score of `view` as the `k`-th best of its edges to other candidates,
    /// not counting `skip`. Falls back to the worst edge when there are fewer
    /// than `k`, and to 0 when there are none.
    fn score_for_removal(&self, view: ViewId, skip: MotionId, k: usize) -> f64 {
        let mut scores: Vec<f64> = self
            .edges
            .iter()
            .filter(|e| e.motion != skip && e.touches(view) && !e.touches(self.target))
            .map(|e| e.score)
            .collect();
        if scores.is_empty() {
            return 0.0;
        }
        scores.sort_by(|a, b| a.total_cmp(b));
        scores[scores.len().saturating_sub(k)]
    }

    /// Remove `view`, its edges, and any candidate left without edges.
    fn remove(&mut self, view: ViewId) -> Result<(), SelectError> {
        self.drop_candidate(view)?;

        let orphans: Vec<ViewId> = self
            .candidates
            .iter()
            .copied()
            .filter(|&c| !self.edges.iter().any(|e| e.touches(c)))
            .collect();
        for orphan in orphans {
            debug!("[LocalSelect] Removing orphan {}", orphan);
            self.drop_candidate(orphan)?;
        }
        Ok(())
    }

    fn drop_candidate(&mut self, view: ViewId) -> Result<(), SelectError> {
        if !self.members.remove(&view) {
            return Err(SelectError::MissingCandidate(view));
        }
        self.candidates.retain(|&c| c != view);
        self.edges.retain(|e| !e.touches(view));
        if self.direct.contains(&view) {
            self.remaining_direct -= 1;
        }
        Ok(())
    }
}
