use index_vec::Idx;

index_vec::define_index_type! {
    /// The identity of a node in a [`crate::WordGraph`] or
    /// [`crate::SchutzenbergerGraph`].
    ///
    /// Node ids are never reused or renumbered within the lifetime of a
    /// graph: `merge` retires the larger of two ids but leaves its row in
    /// the edge table in place, so stale ids held in the pending-merge
    /// queue stay valid until they are rewritten.
    pub struct NodeId = u32;
}

/// The root node every graph is constructed around.
pub fn root() -> NodeId {
    NodeId::from_usize(0)
}
