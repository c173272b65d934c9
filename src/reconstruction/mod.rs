//! Incremental projective reconstruction.
//!
//! - [`seeds`] - scoring views as starting points, non-maximum suppression
//! - [`expander`] - bootstrap from a seed and grow the scene view by view
//! - [`solver`] - the geometric estimation steps, supplied by the caller

pub mod expander;
pub mod seeds;
pub mod solver;

pub use expander::{select_next_to_process, ExpansionSummary, ProjectiveReconstruction};
pub use seeds::{score_nodes_as_seeds, score_view_as_seed, select_seeds, SeedInfo, SeedSelector};
pub use solver::ProjectiveSolver;
