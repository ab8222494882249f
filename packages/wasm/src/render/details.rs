//! Details of a selected node.

use serde::Serialize;

use crate::graph::{Fact, ScopingNode};

/// Text for the node details panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct NodeDetails {
    pub id: String,
    pub layer: u32,
    pub preconditions: String,
    pub effects: String,
}

impl NodeDetails {
    pub fn of(node: &ScopingNode) -> Self {
        Self {
            id: node.name.clone(),
            layer: node.group,
            preconditions: join_facts(&node.precondition),
            effects: join_facts(&node.effect),
        }
    }
}

/// Comma-joined facts, or `None` when there are none.
pub fn join_facts(facts: &[Fact]) -> String {
    if facts.is_empty() {
        return "None".to_string();
    }
    facts
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
