//! SceneWorkingGraph - views with a known projective camera matrix.
//!
//! The working graph is the accumulating output of reconstruction. It is
//! append-only: a view is added at most once and its camera matrix is fixed
//! when it is added. Only the inlier bookkeeping can be filled in afterwards.

use std::collections::HashMap;

use nalgebra::Matrix3x4;

use crate::error::SceneError;
use crate::graph::ViewId;

/// 3×4 projective camera matrix mapping world points to image coordinates.
pub type CameraMatrix = Matrix3x4<f64>;

/// Which feature observations were used to estimate a view's camera.
///
/// `observations[i]` holds feature indices in `views[i]`; entry `j` of every
/// list belongs to the same track.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct InlierInfo {
    /// Views the inlier tracks were observed in.
    pub views: Vec<ViewId>,
    /// Per-view feature indices, parallel to `views`.
    pub observations: Vec<Vec<usize>>,
}

impl InlierInfo {
    /// True if no inliers were recorded.
    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }

    /// Number of tracks (0 if empty).
    pub fn num_tracks(&self) -> usize {
        self.observations.first().map_or(0, Vec::len)
    }

    pub fn clear(&mut self) {
        self.views.clear();
        self.observations.clear();
    }
}

/// A resolved view.
#[derive(Debug, Clone)]
pub struct SceneView {
    /// The pairwise-graph view this entry belongs to.
    pub view: ViewId,

    /// Camera matrix, set once on insertion.
    projective: CameraMatrix,

    /// Inliers used to estimate `projective`.
    pub inliers: InlierInfo,
}

impl SceneView {
    /// The projective camera matrix of this view.
    pub fn projective(&self) -> &CameraMatrix {
        &self.projective
    }
}

/// Set of views with an assigned camera matrix.
#[derive(Debug, Default, Clone)]
pub struct SceneWorkingGraph {
    /// Entries in insertion order.
    views: Vec<SceneView>,

    /// ViewId → position in `views`.
    lookup: HashMap<ViewId, usize>,
}

impl SceneWorkingGraph {
    /// Create an empty working graph.
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove every view.
    pub fn reset(&mut self) {
        self.views.clear();
        self.lookup.clear();
    }

    /// Add a view with its camera matrix.
    ///
    /// Returns the new entry so inliers can be recorded. Fails if the view
    /// already has a camera matrix.
    pub fn add_view(
        &mut self,
        view: ViewId,
        projective: CameraMatrix,
    ) -> Result<&mut SceneView, SceneError> {
        self.insert(SceneView {
            view,
            projective,
            inliers: InlierInfo::default(),
        })
    }

    /// Add a copy of an entry from another working graph.
    pub fn add_copy(&mut self, entry: &SceneView) -> Result<&mut SceneView, SceneError> {
        self.insert(entry.clone())
    }

    fn insert(&mut self, entry: SceneView) -> Result<&mut SceneView, SceneError> {
        if self.lookup.contains_key(&entry.view) {
            return Err(SceneError::DuplicateView(entry.view));
        }
        let idx = self.views.len();
        self.lookup.insert(entry.view, idx);
        self.views.push(entry);
        Ok(&mut self.views[idx])
    }

    /// Check if a view has a camera matrix.
    pub fn is_known(&self, view: ViewId) -> bool {
        self.lookup.contains_key(&view)
    }

    /// Get the entry for a view.
    pub fn lookup_view(&self, view: ViewId) -> Option<&SceneView> {
        self.lookup.get(&view).map(|&idx| &self.views[idx])
    }

    /// Get the mutable entry for a view.
    pub fn lookup_view_mut(&mut self, view: ViewId) -> Option<&mut SceneView> {
        match self.lookup.get(&view) {
            Some(&idx) => Some(&mut self.views[idx]),
            None => None,
        }
    }

    /// All entries in insertion order.
    pub fn views(&self) -> impl Iterator<Item = &SceneView> {
        self.views.iter()
    }

    /// Handles of all views in insertion order.
    pub fn view_ids(&self) -> Vec<ViewId> {
        self.views.iter().map(|v| v.view).collect()
    }

    /// Get the number of views.
    pub fn num_views(&self) -> usize {
        self.views.len()
    }

    pub fn is_empty(&self) -> bool {
        self.views.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn camera(tx: f64) -> CameraMatrix {
        let mut p = CameraMatrix::identity();
        p[(0, 3)] = tx;
        p
    }

    #[test]
    fn test_add_and_lookup() {
        let mut scene = SceneWorkingGraph::new();
        scene.add_view(ViewId::new(3), camera(1.0)).unwrap();

        assert!(scene.is_known(ViewId::new(3)));
        assert!(!scene.is_known(ViewId::new(4)));
        assert_eq!(
            scene.lookup_view(ViewId::new(3)).unwrap().projective()[(0, 3)],
            1.0
        );
    }

    #[test]
    fn test_camera_is_never_overwritten() {
        let mut scene = SceneWorkingGraph::new();
        scene.add_view(ViewId::new(0), camera(1.0)).unwrap();

        let err = scene.add_view(ViewId::new(0), camera(2.0)).unwrap_err();
        assert_eq!(err, SceneError::DuplicateView(ViewId::new(0)));
        assert_eq!(scene.num_views(), 1);
        assert_eq!(
            scene.lookup_view(ViewId::new(0)).unwrap().projective()[(0, 3)],
            1.0
        );
    }

    #[test]
    fn test_insertion_order_and_reset() {
        let mut scene = SceneWorkingGraph::new();
        for id in [5, 1, 3] {
            scene.add_view(ViewId::new(id), camera(0.0)).unwrap();
        }
        assert_eq!(
            scene.view_ids(),
            vec![ViewId::new(5), ViewId::new(1), ViewId::new(3)]
        );

        scene.reset();
        assert!(scene.is_empty());
        assert!(scene.lookup_view(ViewId::new(5)).is_none());
    }

    #[test]
    fn test_copy_keeps_inliers() {
        let mut source = SceneWorkingGraph::new();
        let entry = source.add_view(ViewId::new(2), camera(4.0)).unwrap();
        entry.inliers.views = vec![ViewId::new(2), ViewId::new(0)];
        entry.inliers.observations = vec![vec![1, 2, 3], vec![7, 8, 9]];

        let mut local = SceneWorkingGraph::new();
        local
            .add_copy(source.lookup_view(ViewId::new(2)).unwrap())
            .unwrap();

        let copied = local.lookup_view(ViewId::new(2)).unwrap();
        assert_eq!(copied.inliers.num_tracks(), 3);
        assert_eq!(copied.projective(), source.lookup_view(ViewId::new(2)).unwrap().projective());
    }
}
