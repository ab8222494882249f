//! Viewer session: one loaded graph and everything derived from it.
//!
//! Control flow for every step action:
//! stop the simulation, move the layer cursor, reclassify every node, derive
//! a fresh force configuration, restart the simulation with a raised alpha.
//! Ticks then integrate positions and the caller repaints.

use std::fmt;

use serde::Serialize;
use tracing::{debug, error, warn};

use crate::config::ViewerConfig;
use crate::error::{Result, ScopingError};
use crate::graph::{GraphData, GraphEngine, NodeId};
use crate::layout::{ForceConfig, LayerLayout, Simulation};
use crate::render::{self, DrawList, NodeDetails, Renderer, ViewTransform};
use crate::reveal::{self, LayerCursor, PassDirection};

/// Summary shown next to the step controls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerStatus {
    /// 1-based; 0 while nothing is revealed.
    pub current_layer: i32,
    pub layer_count: i32,
    pub visible_nodes: usize,
    pub total_nodes: usize,
    pub isolated_nodes: usize,
    /// Links dropped at load for referencing unknown node ids.
    pub dropped_links: usize,
    pub direction: &'static str,
}

impl fmt::Display for LayerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Current Layer: {} / {}", self.current_layer, self.layer_count)?;
        writeln!(f, "Visible Nodes: {} / {}", self.visible_nodes, self.total_nodes)?;
        writeln!(f, "Isolated Nodes: {}", self.isolated_nodes)?;
        if self.dropped_links > 0 {
            writeln!(f, "Dropped Links: {}", self.dropped_links)?;
        }
        write!(f, "Direction: {}", self.direction)
    }
}

/// Which step buttons are enabled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepControls {
    pub can_advance: bool,
    pub can_retreat: bool,
}

/// A loaded graph with its reveal, layout and view state.
pub struct ScopingSession {
    engine: GraphEngine,
    cursor: LayerCursor,
    layout: LayerLayout,
    simulation: Simulation,
    view: ViewTransform,
    selected: Option<NodeId>,
    config: ViewerConfig,
}

impl ScopingSession {
    /// Load a graph and start the initial (nothing revealed) layout.
    pub fn load(data: GraphData, config: ViewerConfig) -> Result<Self> {
        config.validate()?;
        let mut engine = GraphEngine::from_data(data)?;
        let direction = PassDirection::from_flag(engine.is_forward());
        let layout = LayerLayout::new(&config, engine.max_group(), direction);

        let count = engine.node_count();
        for id in engine.node_ids() {
            let (x, y) = layout.staging_position(id.slot(), count);
            engine.set_node_position(id, x, y);
        }

        let mut session = Self {
            cursor: LayerCursor::new(engine.max_group()),
            simulation: Simulation::new(&config.forces),
            engine,
            layout,
            view: ViewTransform::IDENTITY,
            selected: None,
            config,
        };
        session.relayout();
        Ok(session)
    }

    /// Parse and load a JSON graph document.
    pub fn from_json(text: &str, config: ViewerConfig) -> Result<Self> {
        Self::load(GraphData::from_json(text)?, config)
    }

    /// Recompute classification and forces from scratch and restart.
    fn relayout(&mut self) {
        self.simulation.stop();
        reveal::classify(&mut self.engine, self.cursor.current());
        let forces = ForceConfig::derive(&self.engine, &self.layout, &self.config);
        self.simulation.configure(&forces, &self.config.forces);
        self.simulation.restart(self.config.restart_alpha);
    }

    fn apply(&mut self, changed: bool) -> bool {
        if changed {
            self.relayout();
        }
        changed
    }

    // =========================================================================
    // Step Controls
    // =========================================================================

    /// Reveal the next layer. Returns false at the last layer.
    pub fn step_forward(&mut self) -> bool {
        let changed = self.cursor.step_forward();
        self.apply(changed)
    }

    /// Hide the last revealed layer. Returns false when nothing is revealed.
    pub fn step_back(&mut self) -> bool {
        let changed = self.cursor.step_back();
        self.apply(changed)
    }

    /// Return to the nothing-revealed state without reloading.
    pub fn reset(&mut self) -> bool {
        let changed = self.cursor.reset();
        self.apply(changed)
    }

    /// Jump to a layer, clamped to the graph's bounds.
    pub fn set_layer(&mut self, layer: i32) -> bool {
        let changed = self.cursor.set_layer(layer);
        self.apply(changed)
    }

    pub fn controls(&self) -> StepControls {
        StepControls {
            can_advance: self.cursor.can_advance(),
            can_retreat: self.cursor.can_retreat(),
        }
    }

    // =========================================================================
    // Simulation
    // =========================================================================

    /// Advance the simulation one frame. Returns whether it is still running.
    pub fn tick(&mut self) -> bool {
        let mut bodies = self.engine.bodies_mut();
        self.simulation.tick(&mut bodies)
    }

    /// Tick until the simulation settles or `max_ticks` ran. Returns the
    /// number of ticks taken.
    pub fn settle(&mut self, max_ticks: usize) -> usize {
        let mut ticks = 0;
        while ticks < max_ticks && self.tick() {
            ticks += 1;
        }
        ticks
    }

    pub fn is_running(&self) -> bool {
        self.simulation.is_running()
    }

    pub fn alpha(&self) -> f32 {
        self.simulation.alpha()
    }

    // =========================================================================
    // Rendering and Interaction
    // =========================================================================

    /// Build the current frame.
    pub fn paint(&self) -> DrawList {
        render::paint(&self.engine, &self.view, &self.config)
    }

    /// Paint the current frame on `renderer`.
    pub fn render(&self, renderer: &mut dyn Renderer) -> Result<()> {
        renderer.draw(&self.paint())
    }

    /// Update the pan/zoom transform, clamping the scale.
    pub fn set_view(&mut self, x: f32, y: f32, k: f32) -> ViewTransform {
        self.view = ViewTransform::clamped(x, y, k, self.config.min_zoom, self.config.max_zoom);
        self.view
    }

    pub fn view(&self) -> ViewTransform {
        self.view
    }

    /// Node under a screen point, visible or not.
    pub fn pick(&mut self, screen_x: f32, screen_y: f32) -> Option<NodeId> {
        let (x, y) = self.view.invert((screen_x, screen_y));
        self.engine
            .find_nearest_node_within(x, y, self.config.pick_radius())
    }

    /// Select the node under a screen point and return its details.
    ///
    /// Clicking empty space keeps the current selection.
    pub fn click(&mut self, screen_x: f32, screen_y: f32) -> Option<NodeDetails> {
        let id = self.pick(screen_x, screen_y)?;
        self.select(id);
        self.selected_details()
    }

    fn select(&mut self, id: NodeId) {
        if let Some(previous) = self.selected.replace(id) {
            if let Some(state) = self.engine.state_mut(previous) {
                state.set_selected(false);
            }
        }
        if let Some(state) = self.engine.state_mut(id) {
            state.set_selected(true);
        }
        debug!("selected {id}");
    }

    pub fn selected(&self) -> Option<NodeId> {
        self.selected
    }

    pub fn selected_details(&self) -> Option<NodeDetails> {
        self.selected
            .and_then(|id| self.engine.node(id))
            .map(NodeDetails::of)
    }

    // =========================================================================
    // Status
    // =========================================================================

    pub fn status(&self) -> LayerStatus {
        let states: Vec<_> = self.engine.node_ids().map(|id| self.engine.state(id)).collect();
        LayerStatus {
            current_layer: self.cursor.current() + 1,
            layer_count: self.cursor.max() + 1,
            visible_nodes: states.iter().filter(|s| s.is_visible()).count(),
            total_nodes: states.len(),
            isolated_nodes: states.iter().filter(|s| s.is_isolated()).count(),
            dropped_links: self.engine.dropped_links(),
            direction: self.layout.direction().label(),
        }
    }

    pub fn layer(&self) -> i32 {
        self.cursor.current()
    }

    pub fn max_layer(&self) -> i32 {
        self.cursor.max()
    }

    pub fn direction(&self) -> PassDirection {
        self.layout.direction()
    }

    pub fn layout(&self) -> &LayerLayout {
        &self.layout
    }

    pub fn engine(&self) -> &GraphEngine {
        &self.engine
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }
}

/// The viewer as the page sees it: possibly without any graph.
///
/// Load failures never propagate as panics; they leave the viewer empty with
/// the step controls disabled.
pub struct ScopingViewer {
    config: ViewerConfig,
    session: Option<ScopingSession>,
}

impl ScopingViewer {
    pub fn new(config: ViewerConfig) -> Self {
        Self {
            config,
            session: None,
        }
    }

    /// Load a graph document. `None` means nothing was stored.
    ///
    /// On failure any previously loaded graph is discarded.
    pub fn load_json(&mut self, text: Option<&str>) -> Result<()> {
        let result = text
            .ok_or(ScopingError::NoData)
            .and_then(|text| ScopingSession::from_json(text, self.config.clone()));
        self.install(result)
    }

    fn install(&mut self, result: Result<ScopingSession>) -> Result<()> {
        match result {
            Ok(session) => {
                self.session = Some(session);
                Ok(())
            }
            Err(err) if err.is_load_failure() => {
                warn!("no scoping graph loaded: {err}");
                self.session = None;
                Err(err)
            }
            Err(err) => {
                error!("could not load scoping graph: {err}");
                self.session = None;
                Err(err)
            }
        }
    }

    /// Replace the configuration. Takes effect on the next load.
    pub fn set_config(&mut self, config: ViewerConfig) -> Result<()> {
        config.validate()?;
        self.config = config;
        Ok(())
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn is_loaded(&self) -> bool {
        self.session.is_some()
    }

    pub fn session(&self) -> Option<&ScopingSession> {
        self.session.as_ref()
    }

    pub fn session_mut(&mut self) -> Option<&mut ScopingSession> {
        self.session.as_mut()
    }

    /// Step controls; both disabled without data.
    pub fn controls(&self) -> StepControls {
        self.session
            .as_ref()
            .map(ScopingSession::controls)
            .unwrap_or_default()
    }

    pub fn status(&self) -> Option<LayerStatus> {
        self.session.as_ref().map(ScopingSession::status)
    }

    pub fn status_text(&self) -> String {
        self.status()
            .map_or_else(|| "No data loaded".to_string(), |status| status.to_string())
    }
}
