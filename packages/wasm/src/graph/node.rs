//! Node type and related structures.
//!
//! Every loaded node has:
//! - A dense slot identifier (index into the position/velocity buffers)
//! - Its layer (`group`) and precondition/effect facts, fixed at load
//! - Derived state flags (visible, isolated, selected), recomputed per step

use std::fmt;

use super::model::{Fact, RawNode};

/// Slot identifier of a loaded node.
///
/// Nodes are never removed from a loaded graph, so the id doubles as the
/// index into the SoA buffers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    /// Index into per-node buffers.
    #[inline]
    pub fn slot(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Node({})", self.0)
    }
}

/// Immutable description of a node as loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct ScopingNode {
    /// Unique name from the document.
    pub name: String,
    /// Reveal layer.
    pub group: u32,
    pub precondition: Vec<Fact>,
    pub effect: Vec<Fact>,
}

impl From<RawNode> for ScopingNode {
    fn from(raw: RawNode) -> Self {
        Self {
            name: raw.id,
            group: raw.group,
            precondition: raw.precondition,
            effect: raw.effect,
        }
    }
}

/// Derived node flags packed into a single byte.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct NodeState {
    flags: u8,
}

impl NodeState {
    const VISIBLE: u8 = 0b0000_0001;
    const ISOLATED: u8 = 0b0000_0010;
    const SELECTED: u8 = 0b0000_0100;

    #[inline]
    pub fn new() -> Self {
        Self { flags: 0 }
    }

    /// Revealed at the current layer.
    #[inline]
    pub fn is_visible(self) -> bool {
        self.flags & Self::VISIBLE != 0
    }

    #[inline]
    pub fn set_visible(&mut self, visible: bool) {
        self.set(Self::VISIBLE, visible);
    }

    /// No link anywhere in the graph touches the node.
    #[inline]
    pub fn is_isolated(self) -> bool {
        self.flags & Self::ISOLATED != 0
    }

    #[inline]
    pub fn set_isolated(&mut self, isolated: bool) {
        self.set(Self::ISOLATED, isolated);
    }

    #[inline]
    pub fn is_selected(self) -> bool {
        self.flags & Self::SELECTED != 0
    }

    #[inline]
    pub fn set_selected(&mut self, selected: bool) {
        self.set(Self::SELECTED, selected);
    }

    /// Visible and connected: the node takes part in the layered layout.
    #[inline]
    pub fn is_laid_out(self) -> bool {
        self.is_visible() && !self.is_isolated()
    }

    #[inline]
    fn set(&mut self, bit: u8, on: bool) {
        if on {
            self.flags |= bit;
        } else {
            self.flags &= !bit;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_node_id_slot() {
        let id = NodeId(42);
        assert_eq!(id.slot(), 42);
        assert_eq!(id.to_string(), "Node(42)");
    }

    #[test]
    fn test_node_state_default() {
        let state = NodeState::new();
        assert!(!state.is_visible());
        assert!(!state.is_isolated());
        assert!(!state.is_selected());
        assert!(!state.is_laid_out());
    }

    #[test]
    fn test_node_state_flags_are_independent() {
        let mut state = NodeState::new();
        state.set_visible(true);
        state.set_selected(true);
        assert!(state.is_laid_out());

        state.set_isolated(true);
        assert!(state.is_visible());
        assert!(state.is_selected());
        assert!(!state.is_laid_out());

        state.set_visible(false);
        assert!(state.is_isolated());
        assert!(state.is_selected());
    }
}
