//! Layered force layout.
//!
//! This module turns the current reveal state into target positions and force
//! parameters, and runs the CPU force simulation that animates nodes towards
//! them. Positions live in the graph engine's SoA buffers; the simulation
//! borrows them once per tick.

pub mod anchors;
pub mod forces;
pub mod simulation;

pub use anchors::LayerLayout;
pub use forces::{ForceConfig, LinkForce, NodeForce};
pub use simulation::{Bodies, Force, SameLayerRepulsion, Simulation};
