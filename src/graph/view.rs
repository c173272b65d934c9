//! View - one image's node in the pairwise graph.

use super::types::{MotionId, ViewId};

/// A View in the pairwise graph.
///
/// The view owns the ordered list of its motions (edges), referenced by
/// handle. The far endpoint of each motion is resolved through the graph,
/// never stored here.
#[derive(Debug, Clone)]
pub struct View {
    /// Handle of this view.
    pub id: ViewId,

    /// Stable image identifier supplied by the caller (e.g. file name).
    pub name: String,

    /// Number of features observed in the image.
    pub total_observations: usize,

    /// Motions touching this view, in insertion order.
    pub(crate) connections: Vec<MotionId>,
}

impl View {
    pub(crate) fn new(id: ViewId, name: impl Into<String>, total_observations: usize) -> Self {
        Self {
            id,
            name: name.into(),
            total_observations,
            connections: Vec::new(),
        }
    }

    /// Motions touching this view, in the order they were connected.
    pub fn connections(&self) -> &[MotionId] {
        &self.connections
    }

    /// Number of motions touching this view.
    pub fn num_connections(&self) -> usize {
        self.connections.len()
    }
}
