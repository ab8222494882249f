//! Renderer adapter.
//!
//! Painting is split in two: [`scene::paint`] builds a backend-neutral draw
//! list from the graph state, and a [`Renderer`] executes it.

pub mod canvas;
pub mod details;
pub mod scene;
pub mod view;

pub use canvas::CanvasRenderer;
pub use details::NodeDetails;
pub use scene::{DrawCommand, DrawList, arrowhead, node_color, paint};
pub use view::ViewTransform;

use crate::error::Result;

/// A drawing backend.
pub trait Renderer {
    fn draw(&mut self, list: &DrawList) -> Result<()>;
}
