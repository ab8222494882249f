//! Painter: turns the graph state into an ordered draw list.
//!
//! Draw order per frame:
//! 1. clear and apply the view transform
//! 2. links between two visible nodes
//! 3. arrowheads on those links, tip on the target's boundary
//! 4. every node, styled by visibility and isolation
//! 5. every node label
//!
//! The list is backend-neutral; [`super::canvas::CanvasRenderer`] executes it
//! on a 2D canvas, and it serializes for JavaScript-side renderers.

use serde::Serialize;

use crate::config::ViewerConfig;
use crate::graph::{GraphEngine, NodeId, NodeState};

use super::view::ViewTransform;

/// Node colors, keyed by `group % PALETTE.len()`.
pub const PALETTE: [&str; 7] = [
    "#ff6b6b", "#4ecdc4", "#45b7d1", "#96ceb4", "#feca57", "#ff9ff3", "#54a0ff",
];

const ISOLATED_FILL: &str = "#888";
const LINK_COLOR: &str = "#999";
const LINK_WIDTH: f32 = 1.5;
const ARROW_COLOR: &str = "#666";
const ARROW_LENGTH: f32 = 10.0;
const ARROW_SPREAD: f32 = 0.4;
const LABEL_COLOR: &str = "#333";
const LABEL_FONT: &str = "11px Arial";
const LABEL_GAP: f32 = 5.0;
const SELECTED_STROKE: &str = "#000";

/// Deterministic fill for a layer.
pub fn node_color(group: u32) -> &'static str {
    PALETTE[group as usize % PALETTE.len()]
}

/// One drawing primitive, in graph coordinates unless noted.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase", rename_all_fields = "camelCase")]
pub enum DrawCommand {
    /// Clear the canvas (screen coordinates) and save the context.
    Clear { width: f32, height: f32 },
    /// Apply the pan/zoom transform.
    Transform(ViewTransform),
    /// Stroke independent segments `[x1, y1, x2, y2]`.
    Lines {
        segments: Vec<[f32; 4]>,
        color: &'static str,
        width: f32,
    },
    /// Filled arrowhead triangle.
    Arrow {
        tip: (f32, f32),
        left: (f32, f32),
        right: (f32, f32),
        color: &'static str,
    },
    /// Filled and stroked node circle.
    Circle {
        x: f32,
        y: f32,
        radius: f32,
        fill: &'static str,
        alpha: f32,
        stroke: &'static str,
        stroke_width: f32,
    },
    /// Centered text.
    Label {
        text: String,
        x: f32,
        y: f32,
        alpha: f32,
        color: &'static str,
        font: &'static str,
    },
    /// Reset alpha and restore the saved context.
    Restore,
}

/// An ordered frame of draw commands.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct DrawList {
    pub commands: Vec<DrawCommand>,
}

impl DrawList {
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DrawCommand> {
        self.commands.iter()
    }
}

/// Arrowhead triangle geometry.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Arrowhead {
    pub tip: (f32, f32),
    pub left: (f32, f32),
    pub right: (f32, f32),
}

/// Arrowhead for the edge `source -> target`.
///
/// The tip sits on the target's boundary, pulled back by `node_radius` along
/// the edge; the wings trail by `length` at `±spread` radians. A zero-length
/// edge collapses the triangle onto the target.
pub fn arrowhead(
    source: (f32, f32),
    target: (f32, f32),
    node_radius: f32,
    length: f32,
    spread: f32,
) -> Arrowhead {
    let dx = target.0 - source.0;
    let dy = target.1 - source.1;
    let edge = (dx * dx + dy * dy).sqrt();
    if edge < f32::EPSILON {
        return Arrowhead {
            tip: target,
            left: target,
            right: target,
        };
    }

    let angle = dy.atan2(dx);
    let tip = (target.0 - dx * node_radius / edge, target.1 - dy * node_radius / edge);
    let wing = |theta: f32| (tip.0 - length * theta.cos(), tip.1 - length * theta.sin());
    Arrowhead {
        tip,
        left: wing(angle - spread),
        right: wing(angle + spread),
    }
}

/// Fill, opacity and outline of a node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NodeStyle {
    pub fill: &'static str,
    pub alpha: f32,
    pub stroke: &'static str,
    pub stroke_width: f32,
    pub label_alpha: f32,
}

pub fn node_style(state: NodeState, group: u32) -> NodeStyle {
    let visible = state.is_visible();
    let (fill, alpha) = if state.is_isolated() {
        (ISOLATED_FILL, if visible { 0.8 } else { 0.6 })
    } else if visible {
        (node_color(group), 1.0)
    } else {
        (node_color(group), 0.7)
    };
    let (stroke, stroke_width) = if state.is_selected() {
        (SELECTED_STROKE, 3.0)
    } else if visible {
        ("#333", 2.0)
    } else {
        ("#555", 1.5)
    };
    NodeStyle {
        fill,
        alpha,
        stroke,
        stroke_width,
        label_alpha: if visible { 1.0 } else { 0.8 },
    }
}

/// Paint the current frame.
pub fn paint(engine: &GraphEngine, view: &ViewTransform, config: &ViewerConfig) -> DrawList {
    let radius = config.node_radius;
    let position = |id: NodeId| engine.get_node_position(id).unwrap_or_default();

    let shown: Vec<_> = engine
        .links()
        .iter()
        .filter(|link| {
            engine.state(link.source).is_visible() && engine.state(link.target).is_visible()
        })
        .map(|link| (position(link.source), position(link.target)))
        .collect();

    let mut commands = Vec::with_capacity(4 + shown.len() + engine.node_count() * 2);
    commands.push(DrawCommand::Clear {
        width: config.width,
        height: config.height,
    });
    commands.push(DrawCommand::Transform(*view));

    commands.push(DrawCommand::Lines {
        segments: shown.iter().map(|&(s, t)| [s.0, s.1, t.0, t.1]).collect(),
        color: LINK_COLOR,
        width: LINK_WIDTH,
    });

    for &(source, target) in &shown {
        let head = arrowhead(source, target, radius, ARROW_LENGTH, ARROW_SPREAD);
        commands.push(DrawCommand::Arrow {
            tip: head.tip,
            left: head.left,
            right: head.right,
            color: ARROW_COLOR,
        });
    }

    for id in engine.node_ids() {
        let Some(node) = engine.node(id) else {
            continue;
        };
        let (x, y) = position(id);
        let style = node_style(engine.state(id), node.group);
        commands.push(DrawCommand::Circle {
            x,
            y,
            radius,
            fill: style.fill,
            alpha: style.alpha,
            stroke: style.stroke,
            stroke_width: style.stroke_width,
        });
        commands.push(DrawCommand::Label {
            text: node.name.clone(),
            x,
            y: y - radius - LABEL_GAP,
            alpha: style.label_alpha,
            color: LABEL_COLOR,
            font: LABEL_FONT,
        });
    }

    commands.push(DrawCommand::Restore);
    DrawList { commands }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graph::{GraphData, NodeId, RawLink, RawNode};
    use crate::reveal::{self, NOTHING_REVEALED};
    use float_cmp::approx_eq;

    fn engine() -> GraphEngine {
        let node = |id: &str, group| RawNode {
            id: id.to_string(),
            group,
            precondition: Vec::new(),
            effect: Vec::new(),
        };
        let mut engine = GraphEngine::from_data(GraphData {
            nodes: vec![node("A", 0), node("B", 1), node("C", 2)],
            links: vec![RawLink {
                source: "A".into(),
                target: "B".into(),
            }],
            is_forward: true,
        })
        .unwrap();
        engine.set_node_position(NodeId(0), 100.0, 300.0);
        engine.set_node_position(NodeId(1), 200.0, 300.0);
        engine.set_node_position(NodeId(2), 900.0, 300.0);
        engine
    }

    fn arrows(list: &DrawList) -> usize {
        list.iter()
            .filter(|c| matches!(c, DrawCommand::Arrow { .. }))
            .count()
    }

    #[test]
    fn test_palette_wraps() {
        assert_eq!(node_color(0), "#ff6b6b");
        assert_eq!(node_color(7), "#ff6b6b");
        assert_eq!(node_color(9), "#45b7d1");
    }

    #[test]
    fn test_arrowhead_geometry() {
        let head = arrowhead((0.0, 0.0), (100.0, 0.0), 6.0, 10.0, 0.4);
        assert_eq!(head.tip, (94.0, 0.0));
        assert!(head.left.0 < 94.0 && head.right.0 < 94.0);
        assert!(approx_eq!(f32, head.left.1, -head.right.1, epsilon = 1e-4));
        assert!(approx_eq!(f32, head.left.1, 10.0 * 0.4f32.sin(), epsilon = 1e-4));
    }

    #[test]
    fn test_zero_length_edge() {
        let head = arrowhead((5.0, 5.0), (5.0, 5.0), 6.0, 10.0, 0.4);
        assert_eq!(head.tip, (5.0, 5.0));
        assert_eq!(head.left, (5.0, 5.0));
        assert_eq!(head.right, (5.0, 5.0));
    }

    #[test]
    fn test_draw_order() {
        let mut engine = engine();
        reveal::classify(&mut engine, 1);
        let list = paint(&engine, &ViewTransform::IDENTITY, &ViewerConfig::default());

        assert!(matches!(list.commands[0], DrawCommand::Clear { .. }));
        assert!(matches!(list.commands[1], DrawCommand::Transform(_)));
        assert!(matches!(list.commands[2], DrawCommand::Lines { .. }));
        assert!(matches!(list.commands[3], DrawCommand::Arrow { .. }));
        assert!(matches!(list.commands.last(), Some(DrawCommand::Restore)));
        // one circle and one label per node
        let circles = list
            .iter()
            .filter(|c| matches!(c, DrawCommand::Circle { .. }))
            .count();
        assert_eq!(circles, 3);
        assert_eq!(list.len(), 2 + 1 + 1 + 6 + 1);
    }

    #[test]
    fn test_hidden_links_are_not_drawn() {
        let mut engine = engine();
        reveal::classify(&mut engine, 0);
        let list = paint(&engine, &ViewTransform::IDENTITY, &ViewerConfig::default());
        assert_eq!(arrows(&list), 0);
        match &list.commands[2] {
            DrawCommand::Lines { segments, .. } => assert!(segments.is_empty()),
            other => panic!("expected lines, got {other:?}"),
        }
    }

    #[test]
    fn test_node_styles() {
        let mut engine = engine();
        reveal::classify(&mut engine, 0);

        let a = node_style(engine.state(NodeId(0)), 0);
        assert_eq!((a.fill, a.alpha, a.stroke_width), ("#ff6b6b", 1.0, 2.0));

        let b = node_style(engine.state(NodeId(1)), 1);
        assert_eq!((b.fill, b.alpha, b.label_alpha), ("#4ecdc4", 0.7, 0.8));

        let c = node_style(engine.state(NodeId(2)), 2);
        assert_eq!((c.fill, c.alpha), ("#888", 0.6));

        reveal::classify(&mut engine, 2);
        let c = node_style(engine.state(NodeId(2)), 2);
        assert_eq!((c.fill, c.alpha, c.label_alpha), ("#888", 0.8, 1.0));
    }

    #[test]
    fn test_selected_node_is_outlined() {
        let mut engine = engine();
        reveal::classify(&mut engine, NOTHING_REVEALED);
        if let Some(state) = engine.state_mut(NodeId(1)) {
            state.set_selected(true);
        }
        let b = node_style(engine.state(NodeId(1)), 1);
        assert_eq!((b.stroke, b.stroke_width, b.alpha), ("#000", 3.0, 0.7));
    }

    #[test]
    fn test_labels_above_every_node() {
        let mut engine = engine();
        reveal::classify(&mut engine, -1);
        let list = paint(&engine, &ViewTransform::IDENTITY, &ViewerConfig::default());
        let labels: Vec<_> = list
            .iter()
            .filter_map(|c| match c {
                DrawCommand::Label { text, y, .. } => Some((text.as_str(), *y)),
                _ => None,
            })
            .collect();
        assert_eq!(labels, vec![("A", 289.0), ("B", 289.0), ("C", 289.0)]);
    }

    #[test]
    fn test_draw_list_serializes_for_js() {
        let engine = engine();
        let list = paint(&engine, &ViewTransform::IDENTITY, &ViewerConfig::default());
        let json = serde_json::to_value(&list).unwrap();
        assert_eq!(json["commands"][0]["kind"], "clear");
        assert_eq!(json["commands"][1]["kind"], "transform");
        assert_eq!(json["commands"][1]["k"], 1.0);

        let circle = json["commands"]
            .as_array()
            .unwrap()
            .iter()
            .find(|command| command["kind"] == "circle")
            .unwrap();
        assert!(circle.get("strokeWidth").is_some());
        assert!(circle.get("stroke_width").is_none());
    }
}
