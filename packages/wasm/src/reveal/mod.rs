//! Layer reveal state.
//!
//! A scoping graph is revealed one layer at a time. The cursor holds the
//! current layer, starting at [`NOTHING_REVEALED`], and every change is
//! followed by a full reclassification of the nodes: visibility depends on the
//! layer, isolation only on the structure of the graph.

mod cursor;

pub use cursor::{LayerCursor, NOTHING_REVEALED};

use tracing::debug;

use crate::graph::GraphEngine;

/// Direction of the scoping pass that produced the graph.
///
/// Decides which canvas edge holds the first layer and which the staging
/// cluster.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PassDirection {
    /// Reachability from the initial state; layers grow rightwards.
    Forward,
    /// Relevance from the goal; layers grow leftwards.
    Backward,
}

impl PassDirection {
    pub fn from_flag(is_forward: bool) -> Self {
        if is_forward { Self::Forward } else { Self::Backward }
    }

    pub fn is_forward(self) -> bool {
        self == Self::Forward
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Forward => "Forward",
            Self::Backward => "Backward",
        }
    }
}

/// Whether a node of `group` is revealed at `layer`.
#[inline]
pub fn is_visible(group: u32, layer: i32) -> bool {
    i64::from(group) <= i64::from(layer)
}

/// Counts produced by a reclassification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Classification {
    pub visible: usize,
    pub isolated: usize,
}

/// Recompute the visible and isolated flags of every node for `layer`.
///
/// Isolation comes from the degree map built at load, so this is
/// O(nodes) and yields the same flags however often it runs.
pub fn classify(engine: &mut GraphEngine, layer: i32) -> Classification {
    let mut summary = Classification::default();
    for id in engine.node_ids() {
        let group = engine.node(id).map_or(u32::MAX, |n| n.group);
        let visible = is_visible(group, layer);
        let isolated = engine.is_isolated(id);
        if let Some(state) = engine.state_mut(id) {
            state.set_visible(visible);
            state.set_isolated(isolated);
        }
        summary.visible += usize::from(visible);
        summary.isolated += usize::from(isolated);
    }
    debug!(
        "layer {layer}: {} visible, {} isolated of {} nodes",
        summary.visible,
        summary.isolated,
        engine.node_count()
    );
    summary
}
