//! Handle types for the pairwise image graph.

/// Handle of a View (image) inside a [`PairwiseGraph`](super::PairwiseGraph).
///
/// ViewIds are assigned sequentially as views are created and double as the
/// view's index in the graph arena. Motions and scene entries refer to views
/// through this handle instead of holding references, which keeps the cyclic
/// View ↔ Motion structure free of ownership cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct ViewId(pub u32);

impl ViewId {
    /// Create a new ViewId with the given value.
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Position of the view in the graph arena.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for ViewId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "V{}", self.0)
    }
}

/// Handle of a Motion (edge between two views).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct MotionId(pub u32);

impl MotionId {
    /// Create a new MotionId with the given value.
    pub fn new(id: u32) -> Self {
        Self(id)
    }

    /// Position of the motion in the graph arena.
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for MotionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "M{}", self.0)
    }
}
