//! Graph data structures and operations.
//!
//! This module holds the loaded scoping graph: the serialized input model,
//! petgraph's StableGraph for topology, and Structure of Arrays (SoA) buffers
//! for positions and velocities that the force simulation integrates.

mod edge;
mod engine;
pub mod model;
mod node;

pub use edge::{EdgeId, Link};
pub use engine::GraphEngine;
pub use model::{Fact, FactValue, GraphData, RawLink, RawNode};
pub use node::{NodeId, NodeState, ScopingNode};
