//! Pan/zoom transform.

use serde::{Deserialize, Serialize};

/// Affine view transform: `screen = graph * k + (x, y)`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewTransform {
    pub x: f32,
    pub y: f32,
    pub k: f32,
}

impl ViewTransform {
    pub const IDENTITY: Self = Self {
        x: 0.0,
        y: 0.0,
        k: 1.0,
    };

    /// A transform with the scale clamped to `[min_zoom, max_zoom]`.
    pub fn clamped(x: f32, y: f32, k: f32, min_zoom: f32, max_zoom: f32) -> Self {
        let k = if k.is_finite() { k.clamp(min_zoom, max_zoom) } else { 1.0 };
        Self { x, y, k }
    }

    /// Graph space to screen space.
    pub fn apply(&self, point: (f32, f32)) -> (f32, f32) {
        (point.0 * self.k + self.x, point.1 * self.k + self.y)
    }

    /// Screen space to graph space.
    pub fn invert(&self, point: (f32, f32)) -> (f32, f32) {
        ((point.0 - self.x) / self.k, (point.1 - self.y) / self.k)
    }
}

impl Default for ViewTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}
