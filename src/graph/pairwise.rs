//! PairwiseGraph - arena of Views and Motions.
//!
//! The graph is built once upstream (from feature matching) and is read-only
//! for reconstruction and local selection. Views and Motions live in two
//! `Vec`s and refer to each other through [`ViewId`] / [`MotionId`] handles.
//!
//! It provides:
//! - Construction (`create_view`, `connect`)
//! - Lookup by handle or by image name
//! - Adjacency queries (`find_motion`, `neighbors`)
//! - Reachability through 3D motions

use std::collections::{HashMap, HashSet, VecDeque};

use nalgebra::Matrix3;

use crate::error::GraphError;

use super::motion::{AssociatedIndex, Motion};
use super::types::{MotionId, ViewId};
use super::view::View;

/// The pairwise relationship graph of one dataset.
#[derive(Default)]
pub struct PairwiseGraph {
    /// All views, indexed by `ViewId`.
    views: Vec<View>,

    /// All motions, indexed by `MotionId`.
    motions: Vec<Motion>,

    /// Image name → view handle.
    name_lookup: HashMap<String, ViewId>,
}

impl PairwiseGraph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self::default()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Construction
    // ─────────────────────────────────────────────────────────────────────────

    /// Create and add a new View.
    ///
    /// Returns the handle of the created View. Image names must be unique.
    pub fn create_view(
        &mut self,
        name: impl Into<String>,
        total_observations: usize,
    ) -> Result<ViewId, GraphError> {
        let name = name.into();
        if self.name_lookup.contains_key(&name) {
            return Err(GraphError::DuplicateViewName(name));
        }
        let id = ViewId::new(self.views.len() as u32);
        self.name_lookup.insert(name.clone(), id);
        self.views.push(View::new(id, name, total_observations));
        Ok(id)
    }

    /// Connect two views with a new Motion.
    ///
    /// The motion is appended to the connection list of both endpoints. Its
    /// fundamental matrix starts as zero and it has no inliers; fill those in
    /// through [`motion_mut`](Self::motion_mut).
    ///
    /// # Arguments
    /// * `src`, `dst` - Endpoints (must differ)
    /// * `is_3d` - Whether the pair has a reliable 3D relationship
    /// * `count_f` - Matches consistent with the fundamental matrix
    /// * `count_h` - Matches consistent with a homography
    pub fn connect(
        &mut self,
        src: ViewId,
        dst: ViewId,
        is_3d: bool,
        count_f: usize,
        count_h: usize,
    ) -> Result<MotionId, GraphError> {
        if src == dst {
            return Err(GraphError::SelfLoop(src));
        }
        for endpoint in [src, dst] {
            if endpoint.index() >= self.views.len() {
                return Err(GraphError::UnknownView(endpoint));
            }
        }

        let id = MotionId::new(self.motions.len() as u32);
        self.motions.push(Motion {
            id,
            src,
            dst,
            is_3d,
            count_f,
            count_h,
            fundamental: Matrix3::zeros(),
            inliers: Vec::new(),
        });
        self.views[src.index()].connections.push(id);
        self.views[dst.index()].connections.push(id);
        Ok(id)
    }

    /// Replace the inlier associations of a motion.
    pub fn set_inliers(
        &mut self,
        motion: MotionId,
        inliers: Vec<AssociatedIndex>,
    ) -> Result<(), GraphError> {
        let m = self
            .motion_mut(motion)
            .ok_or(GraphError::UnknownMotion(motion))?;
        m.inliers = inliers;
        Ok(())
    }

    /// Get a mutable reference to a Motion (construction only).
    pub fn motion_mut(&mut self, id: MotionId) -> Option<&mut Motion> {
        self.motions.get_mut(id.index())
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Lookup
    // ─────────────────────────────────────────────────────────────────────────

    /// Get a View by handle.
    pub fn get_view(&self, id: ViewId) -> Option<&View> {
        self.views.get(id.index())
    }

    /// Get a View by handle.
    ///
    /// Panics if the handle does not belong to this graph.
    pub fn view(&self, id: ViewId) -> &View {
        &self.views[id.index()]
    }

    /// Get a Motion by handle.
    pub fn get_motion(&self, id: MotionId) -> Option<&Motion> {
        self.motions.get(id.index())
    }

    /// Get a Motion by handle.
    ///
    /// Panics if the handle does not belong to this graph.
    pub fn motion(&self, id: MotionId) -> &Motion {
        &self.motions[id.index()]
    }

    /// Find a View by its image name.
    pub fn lookup(&self, name: &str) -> Option<ViewId> {
        self.name_lookup.get(name).copied()
    }

    /// All views in creation order.
    pub fn views(&self) -> impl Iterator<Item = &View> {
        self.views.iter()
    }

    /// All motions in creation order.
    pub fn motions(&self) -> impl Iterator<Item = &Motion> {
        self.motions.iter()
    }

    /// Get the number of Views.
    pub fn num_views(&self) -> usize {
        self.views.len()
    }

    /// Get the number of Motions.
    pub fn num_motions(&self) -> usize {
        self.motions.len()
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Adjacency
    // ─────────────────────────────────────────────────────────────────────────

    /// Motions touching `view` paired with the view on the other end.
    pub fn neighbors(&self, view: ViewId) -> impl Iterator<Item = (&Motion, ViewId)> + '_ {
        self.view(view).connections.iter().map(move |&m| {
            let motion = self.motion(m);
            (motion, motion.other(view))
        })
    }

    /// Find the motion joining `a` and `b`, if any.
    pub fn find_motion(&self, a: ViewId, b: ViewId) -> Option<&Motion> {
        self.neighbors(a)
            .find(|(_, other)| *other == b)
            .map(|(m, _)| m)
    }

    /// Find a 3D motion joining `a` and `b`, skipping any parallel motion
    /// without 3D structure.
    pub fn find_motion_3d(&self, a: ViewId, b: ViewId) -> Option<&Motion> {
        self.neighbors(a)
            .find(|(m, other)| *other == b && m.is_3d)
            .map(|(m, _)| m)
    }

    /// Views reachable from `start` through `is_3d` motions, `start` included.
    ///
    /// Breadth-first order. This is an upper bound on what expansion from a
    /// seed at `start` can resolve.
    pub fn reachable_3d(&self, start: ViewId) -> Vec<ViewId> {
        let mut visited = HashSet::new();
        let mut order = Vec::new();
        let mut queue = VecDeque::new();

        visited.insert(start);
        queue.push_back(start);
        while let Some(view) = queue.pop_front() {
            order.push(view);
            for (motion, other) in self.neighbors(view) {
                if motion.is_3d && visited.insert(other) {
                    queue.push_back(other);
                }
            }
        }

        order
    }
}

impl std::fmt::Debug for PairwiseGraph {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PairwiseGraph")
            .field("num_views", &self.views.len())
            .field("num_motions", &self.motions.len())
            .finish()
    }
}
