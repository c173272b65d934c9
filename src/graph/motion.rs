//! Motion - a pairwise relationship between two views.
//!
//! A Motion is produced upstream by matching features between two images and
//! fitting a fundamental matrix and a homography to the matches. The core only
//! reads it: `is_3d` gates whether the pair can be used for reconstruction and
//! the inlier counts feed the motion score.

use nalgebra::Matrix3;

use super::types::{MotionId, ViewId};

/// A pair of associated feature indices, one in each view of a motion.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct AssociatedIndex {
    /// Feature index in the motion's `src` view.
    pub src: usize,
    /// Feature index in the motion's `dst` view.
    pub dst: usize,
}

impl AssociatedIndex {
    pub fn new(src: usize, dst: usize) -> Self {
        Self { src, dst }
    }
}

/// An edge of the pairwise graph.
#[derive(Debug, Clone)]
pub struct Motion {
    /// Handle of this motion.
    pub id: MotionId,

    /// First endpoint. Direction only matters for interpreting `fundamental`
    /// and `inliers`; traversal treats the edge as undirected.
    pub src: ViewId,

    /// Second endpoint.
    pub dst: ViewId,

    /// Whether the pair admits a reliable 3D relationship.
    pub is_3d: bool,

    /// Number of matches consistent with the fundamental matrix.
    pub count_f: usize,

    /// Number of matches consistent with a homography.
    pub count_h: usize,

    /// Fundamental matrix from `src` to `dst`.
    pub fundamental: Matrix3<f64>,

    /// Inlier feature associations between `src` and `dst`.
    pub inliers: Vec<AssociatedIndex>,
}

impl Motion {
    /// The endpoint opposite `view`.
    ///
    /// `view` is expected to be one of the endpoints; any other view yields `src`.
    pub fn other(&self, view: ViewId) -> ViewId {
        if view == self.src {
            self.dst
        } else {
            self.src
        }
    }

    /// Check if `view` is one of the endpoints.
    pub fn is_connected(&self, view: ViewId) -> bool {
        self.src == view || self.dst == view
    }

    /// Feature index in `view` for an association, or None if `view` is not an endpoint.
    pub fn feature_in(&self, view: ViewId, assoc: &AssociatedIndex) -> Option<usize> {
        if view == self.src {
            Some(assoc.src)
        } else if view == self.dst {
            Some(assoc.dst)
        } else {
            None
        }
    }
}
