//! Per-node and per-link force parameters.
//!
//! The configuration is derived wholesale from the current node flags on
//! every layer step. Nothing is patched incrementally: a step may flip the
//! visibility of any number of nodes and links at once.

use crate::config::{ForceTuning, ViewerConfig};
use crate::graph::{GraphEngine, NodeId, NodeState};

use super::anchors::LayerLayout;

/// Forces acting on a single node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeForce {
    /// Many-body strength; negative values repel.
    pub charge: f32,
    pub target_x: f32,
    pub x_strength: f32,
    pub target_y: f32,
    pub y_strength: f32,
    pub collide_radius: f32,
    /// Layer, for same-layer repulsion.
    pub group: u32,
    /// Whether the node takes part in same-layer repulsion.
    pub repels_same_layer: bool,
}

/// Spring along a link.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinkForce {
    pub source: NodeId,
    pub target: NodeId,
    pub strength: f32,
    pub distance: f32,
}

/// Everything the simulation needs for one layer step.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ForceConfig {
    /// Indexed by node slot.
    pub nodes: Vec<NodeForce>,
    pub links: Vec<LinkForce>,
}

impl ForceConfig {
    /// Derive the forces from the node flags currently set on `engine`.
    pub fn derive(engine: &GraphEngine, layout: &LayerLayout, config: &ViewerConfig) -> Self {
        let tuning = &config.forces;
        let nodes = engine
            .node_ids()
            .map(|id| {
                let group = engine.node(id).map_or(0, |n| n.group);
                node_force(engine.state(id), group, layout, config.node_radius, tuning)
            })
            .collect();

        let links = engine
            .links()
            .iter()
            .map(|link| {
                let shown = engine.state(link.source).is_visible()
                    && engine.state(link.target).is_visible();
                LinkForce {
                    source: link.source,
                    target: link.target,
                    strength: if shown {
                        tuning.link_strength_visible
                    } else {
                        tuning.link_strength_staged
                    },
                    distance: if shown {
                        tuning.link_distance_visible
                    } else {
                        tuning.link_distance_staged
                    },
                }
            })
            .collect();

        Self { nodes, links }
    }
}

fn node_force(
    state: NodeState,
    group: u32,
    layout: &LayerLayout,
    node_radius: f32,
    tuning: &ForceTuning,
) -> NodeForce {
    let laid_out = state.is_laid_out();
    let target_x = if laid_out {
        layout.layer_x(group)
    } else {
        layout.cluster_anchor().0
    };

    let (x_strength, y_strength, collide_pad) = if state.is_isolated() {
        (
            tuning.x_strength_isolated,
            tuning.y_strength_isolated,
            tuning.collide_pad_isolated,
        )
    } else if state.is_visible() {
        (
            tuning.x_strength_visible,
            tuning.y_strength_visible,
            tuning.collide_pad_visible,
        )
    } else {
        (
            tuning.x_strength_invisible,
            tuning.y_strength_invisible,
            tuning.collide_pad_invisible,
        )
    };

    NodeForce {
        charge: if laid_out {
            tuning.charge_visible
        } else {
            tuning.charge_staged
        },
        target_x,
        x_strength,
        target_y: layout.center_y(),
        y_strength,
        collide_radius: node_radius + collide_pad,
        group,
        repels_same_layer: laid_out,
    }
}
