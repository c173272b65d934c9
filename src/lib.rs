pub mod config;
pub mod error;
pub mod graph;
pub mod io;
pub mod local;
pub mod reconstruction;
pub mod scene;
pub mod scoring;

pub use config::ReconstructionConfig;
pub use error::{GraphError, ReconstructionError, SceneError, SelectError};
pub use graph::{Motion, MotionId, PairwiseGraph, View, ViewId};
pub use local::LocalNeighborhoodSelector;
pub use reconstruction::{ExpansionSummary, ProjectiveReconstruction, ProjectiveSolver, SeedSelector};
pub use scene::{CameraMatrix, SceneWorkingGraph};
pub use scoring::{DefaultMotionScore, MotionScore};
