//! GraphEngine - the loaded scoping graph.
//!
//! The GraphEngine stores the topology in petgraph's StableGraph, the node
//! descriptions as loaded, and SoA (Structure of Arrays) buffers for the
//! positions and velocities the physics simulation owns while it runs.
//! Raw document data is never mutated after load; only the derived state
//! flags and the SoA buffers change.

use std::collections::HashMap;

use tracing::{info, warn};
use petgraph::stable_graph::{NodeIndex, StableGraph};
use petgraph::{Directed, Direction};

use super::edge::{EdgeId, Link};
use super::model::GraphData;
use super::node::{NodeId, NodeState, ScopingNode};
use crate::error::{Result, ScopingError};
use crate::layout::Bodies;
use crate::spatial::SpatialIndex;

/// The loaded graph plus its mutable simulation state.
pub struct GraphEngine {
    /// Topology. Node weights are their slot ids, edge weights their link ids.
    graph: StableGraph<NodeId, EdgeId, Directed>,

    /// Node descriptions, indexed by slot
    nodes: Vec<ScopingNode>,

    /// Resolved links in document order
    links: Vec<Link>,

    /// Largest group over all nodes
    max_group: u32,

    /// Direction of the scoping pass that produced the graph
    is_forward: bool,

    /// Links dropped at load for referencing unknown ids
    dropped_links: usize,

    /// X positions (SoA layout)
    pos_x: Vec<f32>,

    /// Y positions (SoA layout)
    pos_y: Vec<f32>,

    /// X velocities (SoA layout)
    vel_x: Vec<f32>,

    /// Y velocities (SoA layout)
    vel_y: Vec<f32>,

    /// Derived node flags
    states: Vec<NodeState>,

    /// Spatial index for picking
    spatial: SpatialIndex,

    /// Whether positions moved since the spatial index was built
    spatial_dirty: bool,
}

impl GraphEngine {
    /// Build the engine from a parsed document.
    ///
    /// Node ids must be unique and the graph must not be empty. Links whose
    /// endpoints do not resolve are dropped, not reported as errors.
    pub fn from_data(data: GraphData) -> Result<Self> {
        if data.nodes.is_empty() {
            return Err(ScopingError::EmptyGraph);
        }

        let node_count = data.nodes.len();
        let mut graph = StableGraph::with_capacity(node_count, data.links.len());
        let mut nodes = Vec::with_capacity(node_count);
        let mut name_to_id = HashMap::with_capacity(node_count);

        for (slot, raw) in data.nodes.into_iter().enumerate() {
            let id = NodeId(slot as u32);
            if name_to_id.insert(raw.id.clone(), id).is_some() {
                return Err(ScopingError::DuplicateNode(raw.id));
            }
            graph.add_node(id);
            nodes.push(ScopingNode::from(raw));
        }

        let mut links = Vec::with_capacity(data.links.len());
        let mut dropped_links = 0;
        for raw in &data.links {
            let (Some(&source), Some(&target)) =
                (name_to_id.get(&raw.source), name_to_id.get(&raw.target))
            else {
                warn!("dropping link {} -> {}: unknown endpoint", raw.source, raw.target);
                dropped_links += 1;
                continue;
            };
            let id = EdgeId(links.len() as u32);
            graph.add_edge(NodeIndex::new(source.slot()), NodeIndex::new(target.slot()), id);
            links.push(Link { id, source, target });
        }

        let max_group = nodes.iter().map(|n| n.group).max().unwrap_or(0);

        info!(
            "loaded scoping graph: {} nodes, {} links ({} dropped), max layer {}, {} pass",
            node_count,
            links.len(),
            dropped_links,
            max_group,
            if data.is_forward { "forward" } else { "backward" }
        );

        Ok(Self {
            graph,
            nodes,
            links,
            max_group,
            is_forward: data.is_forward,
            dropped_links,
            pos_x: vec![0.0; node_count],
            pos_y: vec![0.0; node_count],
            vel_x: vec![0.0; node_count],
            vel_y: vec![0.0; node_count],
            states: vec![NodeState::new(); node_count],
            spatial: SpatialIndex::new(),
            spatial_dirty: true,
        })
    }

    // =========================================================================
    // Nodes
    // =========================================================================

    /// Number of nodes.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// All node ids in slot order.
    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + use<> {
        (0..self.nodes.len() as u32).map(NodeId)
    }

    /// Node description by id.
    pub fn node(&self, id: NodeId) -> Option<&ScopingNode> {
        self.nodes.get(id.slot())
    }

    /// Largest layer index present.
    pub fn max_group(&self) -> u32 {
        self.max_group
    }

    pub fn is_forward(&self) -> bool {
        self.is_forward
    }

    /// Derived flags of a node.
    pub fn state(&self, id: NodeId) -> NodeState {
        self.states.get(id.slot()).copied().unwrap_or_default()
    }

    /// Mutable derived flags of a node.
    pub fn state_mut(&mut self, id: NodeId) -> Option<&mut NodeState> {
        self.states.get_mut(id.slot())
    }

    /// Number of links touching the node, counting both directions.
    ///
    /// Read from the adjacency lists, so classifying every node costs
    /// O(nodes + links) overall.
    pub fn degree(&self, id: NodeId) -> u32 {
        let index = NodeIndex::new(id.slot());
        if !self.graph.contains_node(index) {
            return 0;
        }
        (self.graph.edges_directed(index, Direction::Outgoing).count()
            + self.graph.edges_directed(index, Direction::Incoming).count()) as u32
    }

    /// Whether no link in the full link set touches the node.
    pub fn is_isolated(&self, id: NodeId) -> bool {
        self.degree(id) == 0
    }

    // =========================================================================
    // Links
    // =========================================================================

    /// Resolved links in document order.
    pub fn links(&self) -> &[Link] {
        &self.links
    }

    pub fn link_count(&self) -> usize {
        self.links.len()
    }

    /// Links dropped at load for referencing unknown node ids.
    pub fn dropped_links(&self) -> usize {
        self.dropped_links
    }

    // =========================================================================
    // Positions
    // =========================================================================

    pub fn get_node_position(&self, id: NodeId) -> Option<(f32, f32)> {
        let i = id.slot();
        (i < self.pos_x.len()).then(|| (self.pos_x[i], self.pos_y[i]))
    }

    pub fn set_node_position(&mut self, id: NodeId, x: f32, y: f32) {
        let i = id.slot();
        if i < self.pos_x.len() {
            self.pos_x[i] = x;
            self.pos_y[i] = y;
            self.spatial_dirty = true;
        }
    }

    /// Positions interleaved as [x0, y0, x1, y1, ...].
    pub fn positions_interleaved(&self) -> Vec<f32> {
        self.pos_x
            .iter()
            .zip(&self.pos_y)
            .flat_map(|(&x, &y)| [x, y])
            .collect()
    }

    /// Mutable view of the position/velocity buffers for the simulation.
    pub fn bodies_mut(&mut self) -> Bodies<'_> {
        self.spatial_dirty = true;
        Bodies::new(&mut self.pos_x, &mut self.pos_y, &mut self.vel_x, &mut self.vel_y)
    }

    // =========================================================================
    // Spatial Queries
    // =========================================================================

    /// Find the nearest node within `max_distance` of a graph-space point.
    ///
    /// Rebuilds the spatial index first if positions moved.
    pub fn find_nearest_node_within(
        &mut self,
        x: f32,
        y: f32,
        max_distance: f32,
    ) -> Option<NodeId> {
        if self.spatial_dirty {
            self.rebuild_spatial_index();
        }
        self.spatial.pick([x, y], max_distance)
    }

    /// Rebuild the spatial index from the current positions.
    pub fn rebuild_spatial_index(&mut self) {
        let centers = self
            .pos_x
            .iter()
            .zip(&self.pos_y)
            .enumerate()
            .map(|(slot, (&x, &y))| (NodeId(slot as u32), x, y));
        self.spatial.rebuild(centers);
        self.spatial_dirty = false;
    }
}
