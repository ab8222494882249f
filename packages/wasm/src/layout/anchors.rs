//! Screen anchors for the layered layout.
//!
//! Revealed, connected nodes are pulled to an x anchor interpolated across
//! the canvas by layer. Everything else waits at a single clustering anchor
//! on the edge the layers grow towards.

use crate::config::ViewerConfig;
use crate::reveal::PassDirection;

/// Golden angle in radians, for deterministic staging spreads.
const GOLDEN_ANGLE: f32 = 2.399_963_2;

/// Per-graph anchor geometry.
#[derive(Debug, Clone, PartialEq)]
pub struct LayerLayout {
    width: f32,
    height: f32,
    span_start: f32,
    span_end: f32,
    cluster_margin: f32,
    staging_jitter: f32,
    max_layer: u32,
    direction: PassDirection,
}

impl LayerLayout {
    pub fn new(config: &ViewerConfig, max_layer: u32, direction: PassDirection) -> Self {
        Self {
            width: config.width,
            height: config.height,
            span_start: config.layer_span_start,
            span_end: config.layer_span_end,
            cluster_margin: config.cluster_margin,
            staging_jitter: config.staging_jitter,
            max_layer,
            direction,
        }
    }

    pub fn direction(&self) -> PassDirection {
        self.direction
    }

    /// `group / max_layer`, or 0 for single-layer graphs.
    pub fn layer_fraction(&self, group: u32) -> f32 {
        if self.max_layer == 0 {
            return 0.0;
        }
        (group as f32 / self.max_layer as f32).clamp(0.0, 1.0)
    }

    /// X anchor of a revealed, connected node in `group`.
    ///
    /// Forward passes run left to right, backward passes right to left, so
    /// the pass's starting point always sits on the same side as layer 0.
    pub fn layer_x(&self, group: u32) -> f32 {
        let span = self.span_end - self.span_start;
        let f = self.layer_fraction(group);
        match self.direction {
            PassDirection::Forward => self.width * (self.span_start + span * f),
            PassDirection::Backward => self.width * (self.span_end - span * f),
        }
    }

    /// Vertical center every node is pulled towards.
    pub fn center_y(&self) -> f32 {
        self.height / 2.0
    }

    /// Where invisible and isolated nodes are staged.
    pub fn cluster_anchor(&self) -> (f32, f32) {
        let x = match self.direction {
            PassDirection::Forward => self.width - self.cluster_margin,
            PassDirection::Backward => self.cluster_margin,
        };
        (x, self.center_y())
    }

    /// Initial position of node `index` out of `count`, spread around the
    /// clustering anchor on a sunflower spiral.
    pub fn staging_position(&self, index: usize, count: usize) -> (f32, f32) {
        let (cx, cy) = self.cluster_anchor();
        let t = (index as f32 + 0.5) / count.max(1) as f32;
        let r = t.sqrt();
        let theta = index as f32 * GOLDEN_ANGLE;
        (
            cx + theta.cos() * r * self.staging_jitter / 2.0,
            cy + theta.sin() * r * self.height * 0.3,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use float_cmp::approx_eq;

    fn layout(max_layer: u32, direction: PassDirection) -> LayerLayout {
        LayerLayout::new(&ViewerConfig::default(), max_layer, direction)
    }

    #[test]
    fn test_forward_runs_left_to_right() {
        let l = layout(4, PassDirection::Forward);
        assert!(approx_eq!(f32, l.layer_x(0), 100.0, epsilon = 1e-3));
        assert!(approx_eq!(f32, l.layer_x(4), 900.0, epsilon = 1e-3));
        assert!(l.layer_x(1) < l.layer_x(2));
        assert_eq!(l.cluster_anchor(), (920.0, 300.0));
    }

    #[test]
    fn test_backward_mirrors_forward() {
        let forward = layout(4, PassDirection::Forward);
        let backward = layout(4, PassDirection::Backward);
        for group in 0..=4 {
            let sum = forward.layer_x(group) + backward.layer_x(group);
            assert!(approx_eq!(f32, sum, 1000.0, epsilon = 1e-3));
        }
        assert!(backward.layer_x(1) > backward.layer_x(2));
        assert_eq!(backward.cluster_anchor(), (80.0, 300.0));
    }

    #[test]
    fn test_layer_zero_on_opposite_edges() {
        let forward = layout(2, PassDirection::Forward);
        let backward = layout(2, PassDirection::Backward);
        let mid = 500.0;
        assert!((forward.layer_x(0) - mid).signum() < 0.0);
        assert!((backward.layer_x(0) - mid).signum() > 0.0);
    }

    #[test]
    fn test_single_layer_has_no_division_by_zero() {
        let l = layout(0, PassDirection::Forward);
        assert_eq!(l.layer_fraction(0), 0.0);
        assert!(l.layer_x(0).is_finite());
    }

    #[test]
    fn test_staging_positions_stay_in_box() {
        let l = layout(3, PassDirection::Backward);
        let (cx, cy) = l.cluster_anchor();
        for i in 0..50 {
            let (x, y) = l.staging_position(i, 50);
            assert!((x - cx).abs() <= 30.0 + 1e-3);
            assert!((y - cy).abs() <= 180.0 + 1e-3);
        }
        assert_ne!(l.staging_position(0, 50), l.staging_position(1, 50));
    }
}
