//! Motion scoring.
//!
//! Seed selection, candidate selection during expansion, and local view
//! selection all rank motions by a scalar quality score. The score is a
//! strategy injected by the caller: anything implementing [`MotionScore`],
//! including plain closures.

use crate::graph::Motion;

/// Scores the quality of a motion. Higher is better.
///
/// Implementations must be pure: the same motion always gets the same score
/// during a run.
pub trait MotionScore {
    fn score(&self, motion: &Motion) -> f64;
}

impl<F> MotionScore for F
where
    F: Fn(&Motion) -> f64,
{
    fn score(&self, motion: &Motion) -> f64 {
        self(motion)
    }
}

/// Upper bound on the fundamental/homography inlier ratio used by [`DefaultMotionScore`].
const MAX_F_TO_H_RATIO: f64 = 5.0;

/// Default score: `min(5, count_f / (count_h + 1)) * count_f`.
///
/// Pairs whose matches are explained much better by a fundamental matrix than
/// by a homography have 3D structure rather than a plane or pure rotation.
/// Among those, more matches is better.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultMotionScore;

impl MotionScore for DefaultMotionScore {
    fn score(&self, motion: &Motion) -> f64 {
        let count_f = motion.count_f as f64;
        let ratio = (count_f / (motion.count_h as f64 + 1.0)).min(MAX_F_TO_H_RATIO);
        ratio * count_f
    }
}
