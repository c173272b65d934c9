//! Pairwise image graph - the read-only input of reconstruction.
//!
//! This module contains:
//! - [`View`] - One image, with the ordered list of its motions
//! - [`Motion`] - A pairwise relationship between two views
//! - [`PairwiseGraph`] - Arena owning all views and motions
//!
//! # Architecture
//!
//! Views and motions reference each other through [`ViewId`] / [`MotionId`]
//! handles resolved by the graph:
//! - View → Motion via `View::connections()`
//! - Motion → View via `Motion::src` / `Motion::dst` / `Motion::other()`
//!
//! # Example
//!
//! ```
//! use rust_projective_sfm::graph::PairwiseGraph;
//!
//! let mut graph = PairwiseGraph::new();
//! let a = graph.create_view("a.png", 500).unwrap();
//! let b = graph.create_view("b.png", 480).unwrap();
//! let m = graph.connect(a, b, true, 120, 30).unwrap();
//!
//! assert_eq!(graph.motion(m).other(a), b);
//! ```

pub mod common;
pub mod motion;
pub mod pairwise;
pub mod types;
pub mod view;

pub use common::find_common_features;
pub use motion::{AssociatedIndex, Motion};
pub use pairwise::PairwiseGraph;
pub use types::{MotionId, ViewId};
pub use view::View;
