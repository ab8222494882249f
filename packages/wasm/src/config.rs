//! Viewer configuration.
//!
//! Every field has a default matching the stock scoping viewer, so a partial
//! object from JavaScript (or none at all) is always a valid configuration.

use serde::{Deserialize, Serialize};

use crate::error::{Result, ScopingError};

/// Canvas geometry, interaction and simulation settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ViewerConfig {
    /// Canvas width in graph units.
    pub width: f32,
    /// Canvas height in graph units.
    pub height: f32,
    /// Radius of a drawn node.
    pub node_radius: f32,
    /// Distance of the clustering anchor from its canvas edge.
    pub cluster_margin: f32,
    /// Fraction of the width where the first layer anchors.
    pub layer_span_start: f32,
    /// Fraction of the width where the last layer anchors.
    pub layer_span_end: f32,
    /// Extra pick distance beyond the node radius.
    pub pick_slop: f32,
    /// Smallest allowed zoom factor.
    pub min_zoom: f32,
    /// Largest allowed zoom factor.
    pub max_zoom: f32,
    /// Local storage key holding the serialized graph.
    pub storage_key: String,
    /// Alpha the simulation is restarted with after every layer step.
    pub restart_alpha: f32,
    /// Width of the box nodes are initially spread over around the anchor.
    pub staging_jitter: f32,
    /// Force constants.
    pub forces: ForceTuning,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            width: 1000.0,
            height: 600.0,
            node_radius: 6.0,
            cluster_margin: 80.0,
            layer_span_start: 0.1,
            layer_span_end: 0.9,
            pick_slop: 5.0,
            min_zoom: 0.1,
            max_zoom: 4.0,
            storage_key: "scoping_data".to_string(),
            restart_alpha: 0.8,
            staging_jitter: 60.0,
            forces: ForceTuning::default(),
        }
    }
}

impl ViewerConfig {
    /// Reject configurations the layout cannot work with.
    pub fn validate(&self) -> Result<()> {
        require_finite(&[
            ("width", self.width),
            ("height", self.height),
            ("nodeRadius", self.node_radius),
            ("clusterMargin", self.cluster_margin),
            ("layerSpanStart", self.layer_span_start),
            ("layerSpanEnd", self.layer_span_end),
            ("pickSlop", self.pick_slop),
            ("minZoom", self.min_zoom),
            ("maxZoom", self.max_zoom),
            ("restartAlpha", self.restart_alpha),
            ("stagingJitter", self.staging_jitter),
        ])?;
        require(self.width > 0.0 && self.height > 0.0, || {
            format!("canvas size must be positive, got {}x{}", self.width, self.height)
        })?;
        require(self.node_radius > 0.0, || "node radius must be positive".into())?;
        require(self.pick_slop >= 0.0, || "pick slop must not be negative".into())?;
        require(
            0.0 <= self.layer_span_start
                && self.layer_span_start <= self.layer_span_end
                && self.layer_span_end <= 1.0,
            || {
                format!(
                    "layer span [{}, {}] must lie within [0, 1]",
                    self.layer_span_start, self.layer_span_end
                )
            },
        )?;
        require(self.min_zoom > 0.0 && self.min_zoom <= self.max_zoom, || {
            format!("zoom extent [{}, {}] is empty", self.min_zoom, self.max_zoom)
        })?;
        require((0.0..=1.0).contains(&self.restart_alpha), || {
            "restart alpha must lie in [0, 1]".into()
        })?;
        require(self.staging_jitter >= 0.0, || {
            "staging jitter must not be negative".into()
        })?;
        self.forces.validate()
    }

    /// Radius around a node center that still selects it.
    #[inline]
    pub fn pick_radius(&self) -> f32 {
        self.node_radius + self.pick_slop
    }
}

/// Strengths and distances handed to the physics simulation.
///
/// Values come in pairs: the first applies to the visible, connected part of
/// the graph, the other to staged (invisible or isolated) entities.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ForceTuning {
    pub link_strength_visible: f32,
    pub link_strength_staged: f32,
    pub link_distance_visible: f32,
    pub link_distance_staged: f32,
    pub charge_visible: f32,
    pub charge_staged: f32,
    pub x_strength_isolated: f32,
    pub x_strength_visible: f32,
    pub x_strength_invisible: f32,
    pub y_strength_isolated: f32,
    pub y_strength_visible: f32,
    pub y_strength_invisible: f32,
    /// Added to the node radius for the collision radius.
    pub collide_pad_isolated: f32,
    pub collide_pad_visible: f32,
    pub collide_pad_invisible: f32,
    /// Same-layer nodes closer than this are pushed apart.
    pub same_layer_threshold: f32,
    pub same_layer_gain: f32,
    pub alpha_min: f32,
    /// Fraction of velocity lost per tick.
    pub velocity_decay: f32,
}

impl Default for ForceTuning {
    fn default() -> Self {
        Self {
            link_strength_visible: 0.6,
            link_strength_staged: 0.1,
            link_distance_visible: 80.0,
            link_distance_staged: 20.0,
            charge_visible: -200.0,
            charge_staged: -50.0,
            x_strength_isolated: 3.0,
            x_strength_visible: 2.5,
            x_strength_invisible: 2.0,
            y_strength_isolated: 1.0,
            y_strength_visible: 0.1,
            y_strength_invisible: 0.8,
            collide_pad_isolated: 2.0,
            collide_pad_visible: 8.0,
            collide_pad_invisible: 1.0,
            same_layer_threshold: 150.0,
            same_layer_gain: 0.3,
            alpha_min: 0.001,
            velocity_decay: 0.4,
        }
    }
}

impl ForceTuning {
    /// Reject tunings that would never settle or would produce NaN positions.
    pub fn validate(&self) -> Result<()> {
        require_finite(&[
            ("linkStrengthVisible", self.link_strength_visible),
            ("linkStrengthStaged", self.link_strength_staged),
            ("linkDistanceVisible", self.link_distance_visible),
            ("linkDistanceStaged", self.link_distance_staged),
            ("chargeVisible", self.charge_visible),
            ("chargeStaged", self.charge_staged),
            ("xStrengthIsolated", self.x_strength_isolated),
            ("xStrengthVisible", self.x_strength_visible),
            ("xStrengthInvisible", self.x_strength_invisible),
            ("yStrengthIsolated", self.y_strength_isolated),
            ("yStrengthVisible", self.y_strength_visible),
            ("yStrengthInvisible", self.y_strength_invisible),
            ("collidePadIsolated", self.collide_pad_isolated),
            ("collidePadVisible", self.collide_pad_visible),
            ("collidePadInvisible", self.collide_pad_invisible),
            ("sameLayerThreshold", self.same_layer_threshold),
            ("sameLayerGain", self.same_layer_gain),
            ("alphaMin", self.alpha_min),
            ("velocityDecay", self.velocity_decay),
        ])?;
        require(self.alpha_min > 0.0 && self.alpha_min < 1.0, || {
            format!("alpha min must lie in (0, 1), got {}", self.alpha_min)
        })?;
        require((0.0..=1.0).contains(&self.velocity_decay), || {
            format!("velocity decay must lie in [0, 1], got {}", self.velocity_decay)
        })?;
        require(self.same_layer_threshold > 0.0, || {
            "same-layer threshold must be positive".into()
        })?;
        require(self.same_layer_gain >= 0.0, || {
            "same-layer gain must not be negative".into()
        })?;
        require(
            self.link_distance_visible >= 0.0 && self.link_distance_staged >= 0.0,
            || "link distances must not be negative".into(),
        )?;
        require(
            [
                self.collide_pad_isolated,
                self.collide_pad_visible,
                self.collide_pad_invisible,
            ]
            .iter()
            .all(|&pad| pad >= 0.0),
            || "collision padding must not be negative".into(),
        )
    }

    /// Per-tick alpha decay so that alpha reaches `alpha_min` in ~300 ticks.
    pub fn alpha_decay(&self) -> f32 {
        1.0 - self.alpha_min.powf(1.0 / 300.0)
    }
}

fn require(ok: bool, message: impl FnOnce() -> String) -> Result<()> {
    if ok {
        Ok(())
    } else {
        Err(ScopingError::Config(message()))
    }
}

fn require_finite(values: &[(&str, f32)]) -> Result<()> {
    match values.iter().find(|(_, value)| !value.is_finite()) {
        Some((name, value)) => Err(ScopingError::Config(format!(
            "{name} must be finite, got {value}"
        ))),
        None => Ok(()),
    }
}
