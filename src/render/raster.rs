//! Raster backend: scene to PNG or JPEG via `tiny-skia`.
//!
//! Paths are filled with anti-aliasing on a premultiplied RGBA surface, then
//! handed to `image` for encoding. JPEG has no alpha, so the surface is
//! composited over white first.

#[cfg(test)]
#[path = "raster_test.rs"]
mod raster_test;

use std::io::Cursor;

use canvas::color::Rgba;
use canvas::scene::{PaintOp, Scene};
use image::codecs::jpeg::JpegEncoder;
use image::{RgbImage, RgbaImage};
use tiny_skia::{
    Color, ColorU8, FillRule, FilterQuality, Paint, PathBuilder, Pixmap, PixmapPaint, Rect, Stroke, Transform,
};

use super::{ElementFailure, ExportFormat, ImageSet, RenderError, Rendered, check_page, decode_image, fonts};

/// Render a scene to PNG or JPEG bytes.
///
/// # Errors
///
/// Returns [`RenderError::Fatal`] for an unusable page size or a non-raster
/// format, and [`RenderError::Encode`] if the encoder fails.
pub fn render_raster(
    scene: &Scene,
    images: &ImageSet,
    format: ExportFormat,
    jpeg_quality: u8,
) -> Result<Rendered, RenderError> {
    if format == ExportFormat::Pdf {
        return Err(RenderError::Fatal("pdf is not a raster format".into()));
    }
    let (w, h) = check_page(scene)?;
    let mut pixmap = Pixmap::new(w, h).ok_or_else(|| RenderError::Fatal(format!("cannot allocate {w}x{h} surface")))?;
    pixmap.fill(skia_color(scene.background));

    let mut skipped: Vec<_> = scene.skipped.iter().map(|(id, e)| (*id, ElementFailure::from(e.clone()))).collect();
    for item in &scene.items {
        for op in &item.ops {
            if let Err(failure) = draw_op(&mut pixmap, op, images) {
                skipped.push((item.element_id, failure));
                break;
            }
        }
    }

    let bytes = match format {
        ExportFormat::Jpeg => encode_jpeg(&pixmap, jpeg_quality)?,
        ExportFormat::Png | ExportFormat::Pdf => encode_png(&pixmap)?,
    };
    Ok(Rendered { bytes, skipped })
}

// =============================================================================
// DRAWING
// =============================================================================

#[allow(clippy::cast_possible_truncation, clippy::cast_precision_loss)]
fn draw_op(pixmap: &mut Pixmap, op: &PaintOp, images: &ImageSet) -> Result<(), ElementFailure> {
    match op {
        PaintOp::FillRect { rect, color } => {
            if let Some(r) = Rect::from_xywh(rect.x as f32, rect.y as f32, rect.w as f32, rect.h as f32) {
                pixmap.fill_rect(r, &paint(*color), Transform::identity(), None);
            }
        }
        PaintOp::StrokeRect { rect, color, width } => {
            if let Some(r) = Rect::from_xywh(rect.x as f32, rect.y as f32, rect.w as f32, rect.h as f32) {
                let path = PathBuilder::from_rect(r);
                pixmap.stroke_path(&path, &paint(*color), &stroke(*width), Transform::identity(), None);
            }
        }
        PaintOp::FillCircle { center, radius, color } => {
            if let Some(path) = PathBuilder::from_circle(center.x as f32, center.y as f32, *radius as f32) {
                pixmap.fill_path(&path, &paint(*color), FillRule::Winding, Transform::identity(), None);
            }
        }
        PaintOp::StrokeCircle { center, radius, color, width } => {
            if let Some(path) = PathBuilder::from_circle(center.x as f32, center.y as f32, *radius as f32) {
                pixmap.stroke_path(&path, &paint(*color), &stroke(*width), Transform::identity(), None);
            }
        }
        PaintOp::Text { baseline, text, size, font, color } => {
            let face = fonts::lookup(font).ok_or_else(|| ElementFailure::Font(font.clone()))?;
            // Whitespace-only strings have no outline.
            if let Some(path) = fonts::text_path(&face, text, *size as f32, baseline.x as f32, baseline.y as f32) {
                pixmap.fill_path(&path, &paint(*color), FillRule::Winding, Transform::identity(), None);
            }
        }
        PaintOp::Image { rect, src } => {
            let decoded = decode_image(images, src)?;
            let source = to_pixmap(&decoded)
                .ok_or_else(|| ElementFailure::ImageDecode { src: src.clone(), reason: "empty image".into() })?;
            let sx = rect.w as f32 / source.width() as f32;
            let sy = rect.h as f32 / source.height() as f32;
            let transform = Transform::from_row(sx, 0.0, 0.0, sy, rect.x as f32, rect.y as f32);
            let quality = PixmapPaint { quality: FilterQuality::Bilinear, ..PixmapPaint::default() };
            pixmap.draw_pixmap(0, 0, source.as_ref(), &quality, transform, None);
        }
    }
    Ok(())
}

fn skia_color(c: Rgba) -> Color {
    Color::from_rgba8(c.r, c.g, c.b, c.a)
}

fn paint(c: Rgba) -> Paint<'static> {
    let mut p = Paint::default();
    p.set_color_rgba8(c.r, c.g, c.b, c.a);
    p.anti_alias = true;
    p
}

#[allow(clippy::cast_possible_truncation)]
fn stroke(width: f64) -> Stroke {
    Stroke { width: width as f32, ..Stroke::default() }
}

fn to_pixmap(img: &RgbaImage) -> Option<Pixmap> {
    let mut pixmap = Pixmap::new(img.width(), img.height())?;
    for (dst, px) in pixmap.pixels_mut().iter_mut().zip(img.pixels()) {
        let [r, g, b, a] = px.0;
        *dst = ColorU8::from_rgba(r, g, b, a).premultiply();
    }
    Some(pixmap)
}

// =============================================================================
// ENCODING
// =============================================================================

fn encode_png(pixmap: &Pixmap) -> Result<Vec<u8>, RenderError> {
    let rgba: Vec<u8> = pixmap
        .pixels()
        .iter()
        .flat_map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect();
    let img = RgbaImage::from_raw(pixmap.width(), pixmap.height(), rgba)
        .ok_or_else(|| RenderError::Encode("pixel buffer size mismatch".into()))?;

    let mut out = Vec::new();
    img.write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
        .map_err(|e| RenderError::Encode(e.to_string()))?;
    Ok(out)
}

fn encode_jpeg(pixmap: &Pixmap, quality: u8) -> Result<Vec<u8>, RenderError> {
    // Premultiplied over white: c + (255 - a).
    let rgb: Vec<u8> = pixmap
        .pixels()
        .iter()
        .flat_map(|p| {
            let lift = 255 - p.alpha();
            [p.red().saturating_add(lift), p.green().saturating_add(lift), p.blue().saturating_add(lift)]
        })
        .collect();
    let img = RgbImage::from_raw(pixmap.width(), pixmap.height(), rgb)
        .ok_or_else(|| RenderError::Encode("pixel buffer size mismatch".into()))?;

    let mut out = Vec::new();
    JpegEncoder::new_with_quality(&mut out, quality.clamp(1, 100))
        .encode_image(&img)
        .map_err(|e| RenderError::Encode(e.to_string()))?;
    Ok(out)
}
