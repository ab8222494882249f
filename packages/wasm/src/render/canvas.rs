//! 2D canvas backend.

use std::f64::consts::TAU;

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::error::{Result, ScopingError};

use super::scene::{DrawCommand, DrawList};
use super::Renderer;

/// Executes draw lists on a `CanvasRenderingContext2d`.
pub struct CanvasRenderer {
    ctx: CanvasRenderingContext2d,
}

fn js_err(err: JsValue) -> ScopingError {
    ScopingError::Render(err.as_string().unwrap_or_else(|| format!("{err:?}")))
}

impl CanvasRenderer {
    pub fn new(ctx: CanvasRenderingContext2d) -> Self {
        Self { ctx }
    }

    /// Acquire the 2D context of a canvas element.
    pub fn from_canvas(canvas: &HtmlCanvasElement) -> Result<Self> {
        let ctx = canvas
            .get_context("2d")
            .map_err(js_err)?
            .ok_or_else(|| ScopingError::Render("canvas has no 2d context".into()))?
            .dyn_into::<CanvasRenderingContext2d>()
            .map_err(|_| ScopingError::Render("context is not a 2d context".into()))?;
        Ok(Self::new(ctx))
    }

    fn execute(&self, command: &DrawCommand) -> std::result::Result<(), JsValue> {
        let ctx = &self.ctx;
        match command {
            DrawCommand::Clear { width, height } => {
                ctx.save();
                ctx.clear_rect(0.0, 0.0, f64::from(*width), f64::from(*height));
            }
            DrawCommand::Transform(view) => {
                ctx.translate(f64::from(view.x), f64::from(view.y))?;
                ctx.scale(f64::from(view.k), f64::from(view.k))?;
            }
            DrawCommand::Lines {
                segments,
                color,
                width,
            } => {
                ctx.begin_path();
                ctx.set_stroke_style_str(color);
                ctx.set_line_width(f64::from(*width));
                for [x1, y1, x2, y2] in segments {
                    ctx.move_to(f64::from(*x1), f64::from(*y1));
                    ctx.line_to(f64::from(*x2), f64::from(*y2));
                }
                ctx.stroke();
            }
            DrawCommand::Arrow {
                tip,
                left,
                right,
                color,
            } => {
                ctx.set_fill_style_str(color);
                ctx.begin_path();
                ctx.move_to(f64::from(tip.0), f64::from(tip.1));
                ctx.line_to(f64::from(left.0), f64::from(left.1));
                ctx.line_to(f64::from(right.0), f64::from(right.1));
                ctx.close_path();
                ctx.fill();
            }
            DrawCommand::Circle {
                x,
                y,
                radius,
                fill,
                alpha,
                stroke,
                stroke_width,
            } => {
                ctx.begin_path();
                ctx.arc(f64::from(*x), f64::from(*y), f64::from(*radius), 0.0, TAU)?;
                ctx.set_fill_style_str(fill);
                ctx.set_global_alpha(f64::from(*alpha));
                ctx.fill();
                ctx.set_stroke_style_str(stroke);
                ctx.set_line_width(f64::from(*stroke_width));
                ctx.stroke();
            }
            DrawCommand::Label {
                text,
                x,
                y,
                alpha,
                color,
                font,
            } => {
                ctx.set_global_alpha(f64::from(*alpha));
                ctx.set_fill_style_str(color);
                ctx.set_font(font);
                ctx.set_text_align("center");
                ctx.fill_text(text, f64::from(*x), f64::from(*y))?;
            }
            DrawCommand::Restore => {
                ctx.set_global_alpha(1.0);
                ctx.restore();
            }
        }
        Ok(())
    }
}

impl Renderer for CanvasRenderer {
    fn draw(&mut self, list: &DrawList) -> Result<()> {
        for command in list.iter() {
            self.execute(command).map_err(js_err)?;
        }
        Ok(())
    }
}
