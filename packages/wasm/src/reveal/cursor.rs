//! The current revealed layer.

use tracing::debug;

/// Layer value before anything is revealed.
pub const NOTHING_REVEALED: i32 = -1;

/// Current revealed layer, bounded to `[NOTHING_REVEALED, max_layer]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LayerCursor {
    current: i32,
    max: i32,
}

impl LayerCursor {
    /// A cursor over layers `0..=max_layer`, with nothing revealed.
    pub fn new(max_layer: u32) -> Self {
        Self {
            current: NOTHING_REVEALED,
            max: i32::try_from(max_layer).unwrap_or(i32::MAX),
        }
    }

    pub fn current(&self) -> i32 {
        self.current
    }

    pub fn max(&self) -> i32 {
        self.max
    }

    /// Move to `layer`, clamped to the valid range.
    ///
    /// Returns whether the layer changed.
    pub fn set_layer(&mut self, layer: i32) -> bool {
        let clamped = layer.clamp(NOTHING_REVEALED, self.max);
        if clamped == self.current {
            return false;
        }
        debug!("layer {} -> {}", self.current, clamped);
        self.current = clamped;
        true
    }

    /// Reveal the next layer. No-op at the last layer.
    pub fn step_forward(&mut self) -> bool {
        self.set_layer(self.current.saturating_add(1))
    }

    /// Hide the last revealed layer. No-op when nothing is revealed.
    pub fn step_back(&mut self) -> bool {
        self.set_layer(self.current.saturating_sub(1))
    }

    /// Back to the initial, nothing-revealed state.
    pub fn reset(&mut self) -> bool {
        self.set_layer(NOTHING_REVEALED)
    }

    pub fn can_advance(&self) -> bool {
        self.current < self.max
    }

    pub fn can_retreat(&self) -> bool {
        self.current > NOTHING_REVEALED
    }
}
