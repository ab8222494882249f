//! Scoping Graph - WASM Module
//!
//! Interactive viewer for layered scoping graphs. A scoping graph is a DAG of
//! steps, each assigned to a layer; the viewer reveals it one layer at a time
//! while a force simulation keeps revealed layers in left-to-right (or
//! right-to-left) columns and parks everything else at a clustering anchor.
//!
//! # Architecture
//!
//! - `graph`: Graph data model and engine using petgraph's StableGraph
//! - `reveal`: Layer cursor and visibility/isolation classification
//! - `layout`: Layer anchors, per-node force parameters and the simulation
//! - `spatial`: R-tree spatial indexing for click picking
//! - `render`: Backend-neutral draw lists and the 2D canvas backend
//! - `session`: One loaded graph with its reveal, layout and view state

use js_sys::Float32Array;
use tracing::{info, warn};
use wasm_bindgen::prelude::*;

pub mod config;
pub mod error;
pub mod graph;
pub mod layout;
pub mod logging;
pub mod render;
pub mod reveal;
pub mod session;
pub mod spatial;

use config::ViewerConfig;
use error::{Result, ScopingError};
use render::CanvasRenderer;
use session::ScopingViewer;

/// Initialize the WASM module.
#[wasm_bindgen(start)]
pub fn init() {
    console_error_panic_hook::set_once();
    logging::install(tracing::level_filters::LevelFilter::INFO);
}

/// Main entry point for the scoping viewer.
///
/// Wraps a [`ScopingViewer`] and an optional canvas; every frame-changing
/// call repaints the canvas when one is attached.
#[wasm_bindgen]
pub struct ScopingGraphWasm {
    viewer: ScopingViewer,
    renderer: Option<CanvasRenderer>,
}

#[wasm_bindgen]
impl ScopingGraphWasm {
    /// Create a viewer with the default configuration and no data.
    #[wasm_bindgen(constructor)]
    pub fn new() -> Self {
        Self {
            viewer: ScopingViewer::new(ViewerConfig::default()),
            renderer: None,
        }
    }

    // =========================================================================
    // Setup
    // =========================================================================

    /// Draw on this canvas from now on.
    #[wasm_bindgen(js_name = attachCanvas)]
    pub fn attach_canvas(
        &mut self,
        canvas: &web_sys::HtmlCanvasElement,
    ) -> std::result::Result<(), JsValue> {
        self.renderer = Some(CanvasRenderer::from_canvas(canvas)?);
        self.redraw()
    }

    /// Replace the configuration from a (possibly partial) JS object.
    ///
    /// Applies to the next load.
    #[wasm_bindgen(js_name = setConfig)]
    pub fn set_config(&mut self, config: JsValue) -> std::result::Result<(), JsValue> {
        let config: ViewerConfig = serde_wasm_bindgen::from_value(config)?;
        self.viewer.set_config(config)?;
        Ok(())
    }

    /// Set the maximum log level by name (`off`, `error` through `trace`).
    ///
    /// Returns false if the console subscriber is not installed.
    #[wasm_bindgen(js_name = setLogLevel)]
    pub fn set_log_level(&self, level: &str) -> bool {
        logging::set_level(logging::parse_level(level))
    }

    // =========================================================================
    // Loading
    // =========================================================================

    /// Load a graph document. Never throws.
    ///
    /// Returns false (and leaves the viewer empty) if the document is invalid.
    #[wasm_bindgen(js_name = loadJson)]
    pub fn load_json(&mut self, text: &str) -> bool {
        let loaded = self.viewer.load_json(Some(text)).is_ok();
        self.repaint();
        loaded
    }

    /// Load the graph stored under the configured local storage key.
    ///
    /// Returns false (and leaves the viewer empty) if nothing usable is stored.
    #[wasm_bindgen(js_name = loadFromStorage)]
    pub fn load_from_storage(&mut self) -> bool {
        let text = read_storage(&self.viewer.config().storage_key).unwrap_or_else(|err| {
            warn!("{err}");
            None
        });
        let loaded = self.viewer.load_json(text.as_deref()).is_ok();
        if loaded {
            info!("loaded scoping graph from storage");
        }
        self.repaint();
        loaded
    }

    #[wasm_bindgen(js_name = isLoaded)]
    pub fn is_loaded(&self) -> bool {
        self.viewer.is_loaded()
    }

    #[wasm_bindgen(js_name = nodeCount)]
    pub fn node_count(&self) -> u32 {
        self.viewer
            .session()
            .map_or(0, |s| s.engine().node_count() as u32)
    }

    // =========================================================================
    // Step Controls
    // =========================================================================

    /// Reveal the next layer. Returns false if nothing changed.
    #[wasm_bindgen(js_name = stepForward)]
    pub fn step_forward(&mut self) -> bool {
        let changed = self
            .viewer
            .session_mut()
            .is_some_and(|s| s.step_forward());
        self.repaint();
        changed
    }

    /// Hide the last revealed layer. Returns false if nothing changed.
    #[wasm_bindgen(js_name = stepBack)]
    pub fn step_back(&mut self) -> bool {
        let changed = self.viewer.session_mut().is_some_and(|s| s.step_back());
        self.repaint();
        changed
    }

    /// Return to the nothing-revealed state.
    #[wasm_bindgen(js_name = resetPass)]
    pub fn reset_pass(&mut self) -> bool {
        let changed = self.viewer.session_mut().is_some_and(|s| s.reset());
        self.repaint();
        changed
    }

    /// Jump to a layer; -1 hides everything.
    #[wasm_bindgen(js_name = setLayer)]
    pub fn set_layer(&mut self, layer: i32) -> bool {
        let changed = self
            .viewer
            .session_mut()
            .is_some_and(|s| s.set_layer(layer));
        self.repaint();
        changed
    }

    #[wasm_bindgen(js_name = canStepForward)]
    pub fn can_step_forward(&self) -> bool {
        self.viewer.controls().can_advance
    }

    #[wasm_bindgen(js_name = canStepBack)]
    pub fn can_step_back(&self) -> bool {
        self.viewer.controls().can_retreat
    }

    // =========================================================================
    // Animation
    // =========================================================================

    /// Advance the simulation one frame and repaint.
    ///
    /// Returns whether further ticks are needed; drive this from
    /// `requestAnimationFrame` until it returns false.
    pub fn tick(&mut self) -> bool {
        let running = self.viewer.session_mut().is_some_and(|s| s.tick());
        self.repaint();
        running
    }

    /// Repaint the attached canvas.
    pub fn redraw(&mut self) -> std::result::Result<(), JsValue> {
        self.draw()?;
        Ok(())
    }

    // =========================================================================
    // Interaction
    // =========================================================================

    /// Update pan/zoom from a zoom behavior. Returns the applied scale.
    #[wasm_bindgen(js_name = setTransform)]
    pub fn set_transform(&mut self, x: f32, y: f32, k: f32) -> f32 {
        let applied = self
            .viewer
            .session_mut()
            .map(|s| s.set_view(x, y, k).k);
        self.repaint();
        applied.unwrap_or(1.0)
    }

    /// Select the node under a canvas point.
    ///
    /// Returns `{id, layer, preconditions, effects}`, or null if no node is
    /// within reach.
    pub fn click(&mut self, x: f32, y: f32) -> std::result::Result<JsValue, JsValue> {
        let details = self.viewer.session_mut().and_then(|s| s.click(x, y));
        let Some(details) = details else {
            return Ok(JsValue::NULL);
        };
        self.repaint();
        Ok(serde_wasm_bindgen::to_value(&details)?)
    }

    // =========================================================================
    // Status and Export
    // =========================================================================

    /// Layer status as an object, or null without data.
    pub fn status(&self) -> std::result::Result<JsValue, JsValue> {
        match self.viewer.status() {
            Some(status) => Ok(serde_wasm_bindgen::to_value(&status)?),
            None => Ok(JsValue::NULL),
        }
    }

    /// Layer status as display text.
    #[wasm_bindgen(js_name = statusText)]
    pub fn status_text(&self) -> String {
        self.viewer.status_text()
    }

    /// Node positions as [x0, y0, x1, y1, ...] in load order.
    #[wasm_bindgen(js_name = getPositions)]
    pub fn get_positions(&self) -> Float32Array {
        let positions = self
            .viewer
            .session()
            .map(|s| s.engine().positions_interleaved())
            .unwrap_or_default();
        Float32Array::from(&positions[..])
    }

    /// The current frame as a list of draw commands, for custom renderers.
    #[wasm_bindgen(js_name = drawList)]
    pub fn draw_list(&self) -> std::result::Result<JsValue, JsValue> {
        let list = self.viewer.session().map(|s| s.paint()).unwrap_or_default();
        Ok(serde_wasm_bindgen::to_value(&list)?)
    }
}

impl ScopingGraphWasm {
    fn draw(&mut self) -> Result<()> {
        match (self.renderer.as_mut(), self.viewer.session()) {
            (Some(renderer), Some(session)) => session.render(renderer),
            _ => Ok(()),
        }
    }

    fn repaint(&mut self) {
        if let Err(err) = self.draw() {
            warn!("{err}");
        }
    }
}

impl Default for ScopingGraphWasm {
    fn default() -> Self {
        Self::new()
    }
}

fn read_storage(key: &str) -> Result<Option<String>> {
    let storage = web_sys::window()
        .ok_or_else(|| ScopingError::Storage("no window".into()))?
        .local_storage()
        .map_err(|_| ScopingError::Storage("local storage is not accessible".into()))?
        .ok_or_else(|| ScopingError::Storage("local storage is unavailable".into()))?;
    storage
        .get_item(key)
        .map_err(|_| ScopingError::Storage(format!("could not read `{key}`")))
}
