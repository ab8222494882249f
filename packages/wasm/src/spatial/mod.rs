//! Spatial indexing for node picking.
//!
//! Clicks are resolved against an R-tree of node centers so picking stays
//! O(log n) however many nodes sit in the staging cluster.

mod rtree;

pub use rtree::SpatialIndex;
