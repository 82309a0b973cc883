//! Graph storage walked by renderers

use super::Result;

/// A directed graph of labelled nodes with ordered outgoing edges
///
/// Insertion order is significant: it decides the entry node and the
/// top-to-bottom order of sibling branches.
pub trait Database: Send + Sync {
    type Node: Clone + Send + Sync;
    type Edge: Clone + Send + Sync;

    /// Insert or replace a node
    fn add_node(&mut self, node: Self::Node) -> Result<()>;

    /// Append an edge, creating missing endpoints
    fn add_edge(&mut self, edge: Self::Edge) -> Result<()>;

    fn get_node(&self, id: &str) -> Option<&Self::Node>;

    fn nodes(&self) -> impl Iterator<Item = &Self::Node>;

    /// Outgoing edges of `id` in insertion order
    fn outgoing(&self, id: &str) -> impl Iterator<Item = &Self::Edge>;

    /// Node a walk over the whole graph starts from
    fn entry(&self) -> Option<&str>;

    fn node_count(&self) -> usize;

    fn edge_count(&self) -> usize;

    fn is_leaf(&self, id: &str) -> bool {
        self.outgoing(id).next().is_none()
    }
}
