//! Working scene - the views resolved so far and their camera matrices.

pub mod working;

pub use working::{CameraMatrix, InlierInfo, SceneView, SceneWorkingGraph};
