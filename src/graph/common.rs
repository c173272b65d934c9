//! Features shared by a view and several of its motions.

use std::collections::HashSet;

use super::pairwise::PairwiseGraph;
use super::types::{MotionId, ViewId};

/// Feature indices of `seed` that are inliers in every one of `motions`.
///
/// These are the tracks visible in the seed and in all the views on the other
/// end of `motions`, which is what an N-view projective initialization needs.
/// Returned in ascending order. Motions that do not touch `seed` contribute no
/// features, so the result is empty if any of them is passed.
pub fn find_common_features(graph: &PairwiseGraph, seed: ViewId, motions: &[MotionId]) -> Vec<usize> {
    let mut common: Option<HashSet<usize>> = None;

    for &motion_id in motions {
        let motion = graph.motion(motion_id);
        let in_motion: HashSet<usize> = motion
            .inliers
            .iter()
            .filter_map(|a| motion.feature_in(seed, a))
            .collect();

        common = Some(match common {
            None => in_motion,
            Some(prev) => prev.intersection(&in_motion).copied().collect(),
        });
    }

    let mut found: Vec<usize> = common.unwrap_or_default().into_iter().collect();
    found.sort_unstable();
    found
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::AssociatedIndex;

    #[test]
    fn test_intersection_across_motions() {
        let mut graph = PairwiseGraph::new();
        let seed = graph.create_view("seed", 20).unwrap();
        let a = graph.create_view("a", 20).unwrap();
        let b = graph.create_view("b", 20).unwrap();
        let ma = graph.connect(seed, a, true, 10, 1).unwrap();
        // seed is dst here, features must be read from the dst side
        let mb = graph.connect(b, seed, true, 10, 1).unwrap();

        graph
            .set_inliers(
                ma,
                (0..8).map(|i| AssociatedIndex::new(i, i + 100)).collect(),
            )
            .unwrap();
        graph
            .set_inliers(
                mb,
                (4..12).map(|i| AssociatedIndex::new(i + 200, i)).collect(),
            )
            .unwrap();

        let common = find_common_features(&graph, seed, &[ma, mb]);
        assert_eq!(common, vec![4, 5, 6, 7]);
    }

    #[test]
    fn test_no_motions_gives_nothing() {
        let mut graph = PairwiseGraph::new();
        let seed = graph.create_view("seed", 20).unwrap();
        assert!(find_common_features(&graph, seed, &[]).is_empty());
    }
}
