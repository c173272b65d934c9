//! Bounded local neighborhoods for local refinement.

pub mod selector;

pub use selector::{EdgeScore, LocalNeighborhoodSelector};
