//! Resolved links.
//!
//! A link is a directed (source, target) pair resolved to node slots at load
//! time. Links never outlive the graph that resolved them.

use super::node::NodeId;

/// Position of a link among the resolved links, in document order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EdgeId(pub u32);

/// A resolved link.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Link {
    pub id: EdgeId,
    pub source: NodeId,
    pub target: NodeId,
}
