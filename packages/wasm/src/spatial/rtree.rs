//! R-tree of node centers.

use rstar::RTree;
use rstar::primitives::GeomWithData;

use crate::graph::NodeId;

type Center = GeomWithData<[f32; 2], NodeId>;

/// Node centers in graph space.
///
/// The simulation moves every node on every tick, so the tree is bulk loaded
/// from scratch when it is queried after a move instead of being patched.
#[derive(Default)]
pub struct SpatialIndex {
    tree: RTree<Center>,
}

impl SpatialIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the contents with `(id, x, y)` centers.
    pub fn rebuild(&mut self, centers: impl IntoIterator<Item = (NodeId, f32, f32)>) {
        let centers = centers
            .into_iter()
            .map(|(id, x, y)| Center::new([x, y], id))
            .collect();
        self.tree = RTree::bulk_load(centers);
    }

    /// The node closest to `point`, provided its center lies within `radius`.
    ///
    /// The radius is inclusive.
    pub fn pick(&self, point: [f32; 2], radius: f32) -> Option<NodeId> {
        self.tree
            .nearest_neighbor_iter_with_distance_2(&point)
            .next()
            .filter(|&(_, distance_2)| distance_2 <= radius * radius)
            .map(|(center, _)| center.data)
    }

    pub fn len(&self) -> usize {
        self.tree.size()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cluster() -> SpatialIndex {
        let mut index = SpatialIndex::new();
        index.rebuild([
            (NodeId(0), 920.0, 300.0),
            (NodeId(1), 930.0, 300.0),
            (NodeId(2), 100.0, 300.0),
        ]);
        index
    }

    #[test]
    fn test_pick_prefers_closest() {
        let index = cluster();
        assert_eq!(index.pick([924.0, 300.0], 11.0), Some(NodeId(0)));
        assert_eq!(index.pick([926.0, 301.0], 11.0), Some(NodeId(1)));
        assert_eq!(index.pick([100.0, 310.0], 11.0), Some(NodeId(2)));
    }

    #[test]
    fn test_pick_radius_is_inclusive() {
        let index = cluster();
        assert_eq!(index.pick([111.0, 300.0], 11.0), Some(NodeId(2)));
        assert_eq!(index.pick([112.0, 300.0], 11.0), None);
        assert_eq!(index.pick([500.0, 300.0], 11.0), None);
    }

    #[test]
    fn test_rebuild_replaces_contents() {
        let mut index = cluster();
        assert_eq!(index.len(), 3);
        index.rebuild([(NodeId(7), 0.0, 0.0)]);
        assert_eq!(index.len(), 1);
        assert_eq!(index.pick([920.0, 300.0], 11.0), None);
        assert_eq!(index.pick([3.0, 4.0], 5.0), Some(NodeId(7)));

        index.rebuild(std::iter::empty());
        assert!(index.is_empty());
        assert_eq!(index.pick([0.0, 0.0], 11.0), None);
    }
}
