//! Rendering: draws a [`Scene`] and the selection UI to a 2D context.
//!
//! This module is the only place that touches [`web_sys::CanvasRenderingContext2d`].
//! It paints the same scene the export backends consume, so the preview
//! matches the exported file. It does not mutate any application state.
//!
//! All fallible `Canvas2D` calls propagate errors via `Result<(), JsValue>`.
//! The top-level caller ([`crate::engine::Engine::render`]) handles the result.

use std::collections::HashMap;
use std::f64::consts::PI;

use wasm_bindgen::JsValue;
use web_sys::{CanvasRenderingContext2d, HtmlImageElement};

use crate::consts::{HANDLE_RADIUS_PX, SELECTION_DASH_PX, SELECTION_PAD_PX};
use crate::doc::Element;
use crate::geometry::{self, Rect};
use crate::hit;
use crate::scene::{PaintOp, Scene};

const SELECTION_COLOR: &str = "#1E90FF";
const IMAGE_PLACEHOLDER: &str = "rgba(128, 128, 128, 0.25)";

/// Draw the full scene, then the selection outline and resize handle.
///
/// `scale` is CSS pixels per canvas pixel; selection chrome is sized in
/// screen pixels and divided by it.
///
/// # Errors
///
/// Returns `Err` if any `Canvas2D` call fails (e.g. invalid context state).
pub fn draw(
    ctx: &CanvasRenderingContext2d,
    scene: &Scene,
    images: &HashMap<String, HtmlImageElement>,
    selection: Option<&Element>,
    scale: f64,
) -> Result<(), JsValue> {
    let w = f64::from(scene.width);
    let h = f64::from(scene.height);

    // Layer 1: background.
    ctx.set_transform(1.0, 0.0, 0.0, 1.0, 0.0, 0.0)?;
    ctx.clear_rect(0.0, 0.0, w, h);
    ctx.set_fill_style_str(&scene.background.to_css());
    ctx.fill_rect(0.0, 0.0, w, h);

    // Layer 2: elements in render order.
    for op in scene.items.iter().flat_map(|item| &item.ops) {
        draw_op(ctx, op, images)?;
    }

    // Layer 3: selection UI.
    if let Some(el) = selection {
        draw_selection(ctx, el, scale)?;
    }

    Ok(())
}

fn draw_op(
    ctx: &CanvasRenderingContext2d,
    op: &PaintOp,
    images: &HashMap<String, HtmlImageElement>,
) -> Result<(), JsValue> {
    match op {
        PaintOp::FillRect { rect, color } => {
            ctx.set_fill_style_str(&color.to_css());
            ctx.fill_rect(rect.x, rect.y, rect.w, rect.h);
        }
        PaintOp::StrokeRect { rect, color, width } => {
            ctx.set_stroke_style_str(&color.to_css());
            ctx.set_line_width(*width);
            ctx.stroke_rect(rect.x, rect.y, rect.w, rect.h);
        }
        PaintOp::FillCircle { center, radius, color } => {
            ctx.begin_path();
            ctx.arc(center.x, center.y, *radius, 0.0, 2.0 * PI)?;
            ctx.set_fill_style_str(&color.to_css());
            ctx.fill();
        }
        PaintOp::StrokeCircle { center, radius, color, width } => {
            ctx.begin_path();
            ctx.arc(center.x, center.y, *radius, 0.0, 2.0 * PI)?;
            ctx.set_stroke_style_str(&color.to_css());
            ctx.set_line_width(*width);
            ctx.stroke();
        }
        PaintOp::Text { baseline, text, size, font, color } => {
            ctx.set_fill_style_str(&color.to_css());
            ctx.set_font(&format!("{size}px {font}"));
            ctx.set_text_align("left");
            ctx.set_text_baseline("alphabetic");
            ctx.fill_text(text, baseline.x, baseline.y)?;
        }
        PaintOp::Image { rect, src } => draw_image(ctx, *rect, images.get(src))?,
    }
    Ok(())
}

/// Draw a loaded image, or a translucent placeholder until it arrives.
fn draw_image(ctx: &CanvasRenderingContext2d, rect: Rect, image: Option<&HtmlImageElement>) -> Result<(), JsValue> {
    match image {
        Some(img) if img.complete() && img.natural_width() > 0 => {
            ctx.draw_image_with_html_image_element_and_dw_and_dh(img, rect.x, rect.y, rect.w, rect.h)
        }
        _ => {
            ctx.set_fill_style_str(IMAGE_PLACEHOLDER);
            ctx.fill_rect(rect.x, rect.y, rect.w, rect.h);
            Ok(())
        }
    }
}

// =============================================================
// Selection UI
// =============================================================

fn draw_selection(ctx: &CanvasRenderingContext2d, el: &Element, scale: f64) -> Result<(), JsValue> {
    let b = geometry::bounding_box(el);
    let pad = SELECTION_PAD_PX / scale;
    let dash = SELECTION_DASH_PX / scale;

    ctx.save();
    ctx.set_stroke_style_str(SELECTION_COLOR);
    ctx.set_line_width(1.0 / scale);
    let dash_array = js_sys::Array::new();
    dash_array.push(&dash.into());
    dash_array.push(&dash.into());
    ctx.set_line_dash(&dash_array)?;
    ctx.stroke_rect(b.x - pad, b.y - pad, b.w + pad * 2.0, b.h + pad * 2.0);
    ctx.set_line_dash(&js_sys::Array::new())?;

    // Resize handle.
    let handle = hit::resize_handle(el);
    let half = HANDLE_RADIUS_PX / 2.0 / scale;
    ctx.set_fill_style_str("#fff");
    ctx.fill_rect(handle.x - half, handle.y - half, half * 2.0, half * 2.0);
    ctx.stroke_rect(handle.x - half, handle.y - half, half * 2.0, half * 2.0);

    ctx.restore();
    Ok(())
}
