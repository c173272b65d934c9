//! Error types.
//!
//! - [`GraphError`] - building a pairwise graph
//! - [`SceneError`] - working scene invariants (a view added twice, a view
//!   expected in the scene but missing)
//! - [`ReconstructionError`] - whole-run failures of the scene expander
//! - [`SelectError`] - local neighborhood selection failures

use thiserror::Error;

use crate::graph::{MotionId, ViewId};

#[derive(Debug, Error)]
pub enum GraphError {
    #[error("a view named `{0}` already exists")]
    DuplicateViewName(String),
    #[error("view {0} does not belong to this graph")]
    UnknownView(ViewId),
    #[error("motion {0} does not belong to this graph")]
    UnknownMotion(MotionId),
    #[error("cannot connect view {0} to itself")]
    SelfLoop(ViewId),
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SceneError {
    #[error("view {0} already has a camera matrix")]
    DuplicateView(ViewId),
    #[error("view {0} is not in the working scene")]
    UnknownView(ViewId),
}

/// Failures which make the result of a reconstruction run unusable.
#[derive(Debug, Error)]
pub enum ReconstructionError {
    #[error("no view has a 3D motion, no seed could be selected")]
    NoSeeds,
    #[error("seed {seed} has {found} common features, need at least {required}")]
    TooFewCommonFeatures {
        seed: ViewId,
        found: usize,
        required: usize,
    },
    #[error("projective initialization failed at seed {seed}")]
    SeedInitialization { seed: ViewId },
    #[error(transparent)]
    Scene(#[from] SceneError),
}

#[derive(Debug, Error)]
pub enum SelectError {
    #[error("invalid local selection config: {0}")]
    InvalidConfig(String),
    #[error("target view {0} is not in the working scene")]
    TargetNotInScene(ViewId),
    /// No edge can be removed while too many candidates remain. Almost always
    /// means `min_neighbors >= max_views - 1`.
    #[error(
        "no removable edge with {candidates} candidates left (max_views={max_views}, \
         min_neighbors={min_neighbors}); is min_neighbors >= max_views - 1?"
    )]
    NoRemovableEdge {
        candidates: usize,
        max_views: usize,
        min_neighbors: usize,
    },
    #[error("view {0} was scheduled for removal but is not a candidate")]
    MissingCandidate(ViewId),
    #[error(transparent)]
    Scene(#[from] SceneError),
}
