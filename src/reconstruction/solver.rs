//! Geometric solvers the reconstruction delegates to.

use crate::graph::{self, MotionId, PairwiseGraph, ViewId};
use crate::scene::{CameraMatrix, SceneView, SceneWorkingGraph};

/// Projective estimation steps used by [`ProjectiveReconstruction`].
///
/// Implementations own whatever state the last solve produced, so
/// [`save_inliers`](Self::save_inliers) always refers to the most recent
/// successful call of [`initialize_scene`](Self::initialize_scene) or
/// [`expand_by_one_view`](Self::expand_by_one_view).
///
/// `Lookup` is the database of image observations. Reconstruction never looks
/// inside it and only forwards it.
///
/// [`ProjectiveReconstruction`]: super::ProjectiveReconstruction
pub trait ProjectiveSolver {
    type Lookup: ?Sized;

    /// Seed features that are observed in every view across `motions`.
    fn find_common_features(
        &mut self,
        graph: &PairwiseGraph,
        seed: ViewId,
        motions: &[MotionId],
    ) -> Vec<usize> {
        graph::find_common_features(graph, seed, motions)
    }

    /// Estimate cameras for the seed and the views on the other end of
    /// `motions` from the `common` tracks.
    ///
    /// Returns `None` if no consistent solution was found.
    fn initialize_scene(
        &mut self,
        db: &Self::Lookup,
        graph: &PairwiseGraph,
        seed: ViewId,
        common: &[usize],
        motions: &[MotionId],
    ) -> Option<Vec<(ViewId, CameraMatrix)>>;

    /// Estimate the camera of `view` against the views already in `working`.
    fn expand_by_one_view(
        &mut self,
        db: &Self::Lookup,
        graph: &PairwiseGraph,
        working: &SceneWorkingGraph,
        view: ViewId,
    ) -> Option<CameraMatrix>;

    /// Record the inliers of the last successful solve in `entry`.
    fn save_inliers(&mut self, entry: &mut SceneView);
}
