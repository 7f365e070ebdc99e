//! Vector backend: scene to a one-page PDF via `lopdf`.
//!
//! The page is `width x height` points, one point per canvas pixel. Canvas
//! coordinates grow downward, PDF user space grows upward, so every y is
//! flipped against the page height. Text uses the standard 14 fonts with
//! WinAnsi encoding; images are embedded as RGB XObjects with a grayscale
//! soft mask when they carry alpha. Color alpha is not modelled: a fully
//! transparent fill or stroke is dropped, anything else paints opaque.

#[cfg(test)]
#[path = "pdf_test.rs"]
mod pdf_test;

use std::collections::HashMap;

use canvas::color::Rgba;
use canvas::geometry::{Point, Rect};
use canvas::scene::{PaintOp, Scene};
use lopdf::content::{Content, Operation};
use lopdf::{Dictionary, Document, Object, ObjectId, Stream, dictionary};

use super::{ElementFailure, ImageSet, RenderError, Rendered, check_page, decode_image};

/// Control-point offset for approximating a quarter circle with one cubic.
const KAPPA: f64 = 0.552_284_749_8;

/// Render a scene to PDF bytes.
///
/// # Errors
///
/// Returns [`RenderError::Fatal`] for an unusable page size and
/// [`RenderError::Encode`] if the document cannot be serialized.
pub fn render_pdf(scene: &Scene, images: &ImageSet) -> Result<Rendered, RenderError> {
    let (w, h) = check_page(scene)?;
    let mut page = PageBuilder::new(f64::from(h), images);
    let mut skipped: Vec<_> = scene.skipped.iter().map(|(id, e)| (*id, ElementFailure::from(e.clone()))).collect();

    page.fill_rect(Rect::new(0.0, 0.0, f64::from(w), f64::from(h)), scene.background);
    for item in &scene.items {
        let mut ops = Vec::new();
        let drawn = item.ops.iter().try_for_each(|op| page.paint(op, &mut ops));
        match drawn {
            Ok(()) => page.ops.extend(ops),
            Err(failure) => skipped.push((item.element_id, failure)),
        }
    }

    let bytes = page.finish(w, h)?;
    Ok(Rendered { bytes, skipped })
}

// =============================================================================
// FONTS
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum StandardFont {
    Helvetica,
    Times,
    Courier,
}

impl StandardFont {
    /// Closest standard-14 face for a CSS family name.
    fn for_family(family: &str) -> Self {
        let lower = family.to_ascii_lowercase();
        if ["courier", "mono", "consolas", "menlo"].iter().any(|k| lower.contains(k)) {
            Self::Courier
        } else if lower.contains("times") || lower.contains("georgia") || (lower.contains("serif") && !lower.contains("sans")) {
            Self::Times
        } else {
            Self::Helvetica
        }
    }

    fn base_font(self) -> &'static str {
        match self {
            Self::Helvetica => "Helvetica",
            Self::Times => "Times-Roman",
            Self::Courier => "Courier",
        }
    }
}

/// Encode text for a WinAnsi simple font. Characters outside Latin-1 become `?`.
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars().map(|c| u8::try_from(u32::from(c)).unwrap_or(b'?')).collect()
}

// =============================================================================
// PAGE BUILDER
// =============================================================================

struct PageBuilder<'a> {
    doc: Document,
    height: f64,
    images: &'a ImageSet,
    ops: Vec<Operation>,
    /// Fonts in first-use order; index `i` is resource `/F{i+1}`.
    fonts: Vec<StandardFont>,
    /// Embedded images; index `i` is resource `/Im{i+1}`.
    xobjects: Vec<ObjectId>,
    embedded: HashMap<String, usize>,
}

#[allow(clippy::cast_possible_truncation)]
fn num(v: f64) -> Object {
    Object::Real(v as f32)
}

impl<'a> PageBuilder<'a> {
    fn new(height: f64, images: &'a ImageSet) -> Self {
        Self {
            doc: Document::with_version("1.5"),
            height,
            images,
            ops: Vec::new(),
            fonts: Vec::new(),
            xobjects: Vec::new(),
            embedded: HashMap::new(),
        }
    }

    fn flip(&self, y: f64) -> f64 {
        self.height - y
    }

    fn fill_rect(&mut self, rect: Rect, color: Rgba) {
        if color.a == 0 {
            return;
        }
        let mut ops = Vec::new();
        set_fill(&mut ops, color);
        ops.push(self.re(rect));
        ops.push(Operation::new("f", vec![]));
        self.ops.extend(ops);
    }

    fn re(&self, rect: Rect) -> Operation {
        Operation::new("re", vec![num(rect.x), num(self.flip(rect.y + rect.h)), num(rect.w), num(rect.h)])
    }

    fn circle_path(&self, ops: &mut Vec<Operation>, center: Point, r: f64) {
        let cx = center.x;
        let cy = self.flip(center.y);
        let k = r * KAPPA;
        ops.push(Operation::new("m", vec![num(cx + r), num(cy)]));
        let quarters = [
            [cx + r, cy + k, cx + k, cy + r, cx, cy + r],
            [cx - k, cy + r, cx - r, cy + k, cx - r, cy],
            [cx - r, cy - k, cx - k, cy - r, cx, cy - r],
            [cx + k, cy - r, cx + r, cy - k, cx + r, cy],
        ];
        for q in quarters {
            ops.push(Operation::new("c", q.into_iter().map(num).collect()));
        }
        ops.push(Operation::new("h", vec![]));
    }

    fn paint(&mut self, op: &PaintOp, ops: &mut Vec<Operation>) -> Result<(), ElementFailure> {
        match op {
            PaintOp::FillRect { rect, color } => {
                if color.a > 0 {
                    set_fill(ops, *color);
                    ops.push(self.re(*rect));
                    ops.push(Operation::new("f", vec![]));
                }
            }
            PaintOp::StrokeRect { rect, color, width } => {
                if color.a > 0 {
                    set_stroke(ops, *color, *width);
                    ops.push(self.re(*rect));
                    ops.push(Operation::new("S", vec![]));
                }
            }
            PaintOp::FillCircle { center, radius, color } => {
                if color.a > 0 {
                    set_fill(ops, *color);
                    self.circle_path(ops, *center, *radius);
                    ops.push(Operation::new("f", vec![]));
                }
            }
            PaintOp::StrokeCircle { center, radius, color, width } => {
                if color.a > 0 {
                    set_stroke(ops, *color, *width);
                    self.circle_path(ops, *center, *radius);
                    ops.push(Operation::new("S", vec![]));
                }
            }
            PaintOp::Text { baseline, text, size, font, color } => {
                let resource = self.font_resource(StandardFont::for_family(font));
                set_fill(ops, *color);
                ops.push(Operation::new("BT", vec![]));
                ops.push(Operation::new("Tf", vec![Object::Name(resource.into_bytes()), num(*size)]));
                ops.push(Operation::new("Td", vec![num(baseline.x), num(self.flip(baseline.y))]));
                ops.push(Operation::new("Tj", vec![Object::string_literal(win_ansi(text))]));
                ops.push(Operation::new("ET", vec![]));
            }
            PaintOp::Image { rect, src } => {
                let resource = self.image_resource(src)?;
                ops.push(Operation::new("q", vec![]));
                ops.push(Operation::new(
                    "cm",
                    vec![num(rect.w), num(0.0), num(0.0), num(rect.h), num(rect.x), num(self.flip(rect.y + rect.h))],
                ));
                ops.push(Operation::new("Do", vec![Object::Name(resource.into_bytes())]));
                ops.push(Operation::new("Q", vec![]));
            }
        }
        Ok(())
    }

    fn font_resource(&mut self, font: StandardFont) -> String {
        let idx = match self.fonts.iter().position(|f| *f == font) {
            Some(idx) => idx,
            None => {
                self.fonts.push(font);
                self.fonts.len() - 1
            }
        };
        format!("F{}", idx + 1)
    }

    fn image_resource(&mut self, src: &str) -> Result<String, ElementFailure> {
        if let Some(idx) = self.embedded.get(src) {
            return Ok(format!("Im{}", idx + 1));
        }
        let decoded = decode_image(self.images, src)?;
        let (w, h) = decoded.dimensions();
        if w == 0 || h == 0 {
            return Err(ElementFailure::ImageDecode { src: src.to_owned(), reason: "empty image".into() });
        }

        let mut rgb = Vec::with_capacity(decoded.as_raw().len() / 4 * 3);
        let mut alpha = Vec::with_capacity(decoded.as_raw().len() / 4);
        for px in decoded.pixels() {
            let [r, g, b, a] = px.0;
            rgb.extend_from_slice(&[r, g, b]);
            alpha.push(a);
        }

        let mut dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => i64::from(w),
            "Height" => i64::from(h),
            "ColorSpace" => "DeviceRGB",
            "BitsPerComponent" => 8,
        };
        if alpha.iter().any(|a| *a < 255) {
            let mask = dictionary! {
                "Type" => "XObject",
                "Subtype" => "Image",
                "Width" => i64::from(w),
                "Height" => i64::from(h),
                "ColorSpace" => "DeviceGray",
                "BitsPerComponent" => 8,
            };
            let mask_id = self.doc.add_object(Stream::new(mask, alpha));
            dict.set("SMask", mask_id);
        }
        let image_id = self.doc.add_object(Stream::new(dict, rgb));

        self.xobjects.push(image_id);
        let idx = self.xobjects.len() - 1;
        self.embedded.insert(src.to_owned(), idx);
        Ok(format!("Im{}", idx + 1))
    }

    fn finish(mut self, width: u32, height: u32) -> Result<Vec<u8>, RenderError> {
        let pages_id = self.doc.new_object_id();

        let mut font_dict = Dictionary::new();
        for (i, font) in self.fonts.iter().enumerate() {
            let font_id = self.doc.add_object(dictionary! {
                "Type" => "Font",
                "Subtype" => "Type1",
                "BaseFont" => font.base_font(),
                "Encoding" => "WinAnsiEncoding",
            });
            font_dict.set(format!("F{}", i + 1), font_id);
        }
        let mut xobject_dict = Dictionary::new();
        for (i, id) in self.xobjects.iter().enumerate() {
            xobject_dict.set(format!("Im{}", i + 1), *id);
        }
        let resources_id = self.doc.add_object(dictionary! {
            "Font" => font_dict,
            "XObject" => xobject_dict,
        });

        let content = Content { operations: self.ops };
        let encoded = content.encode().map_err(|e| RenderError::Encode(e.to_string()))?;
        let content_id = self.doc.add_object(Stream::new(dictionary! {}, encoded));

        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), i64::from(width).into(), i64::from(height).into()],
        });
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        };
        self.doc.objects.insert(pages_id, Object::Dictionary(pages));
        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);
        self.doc.compress();

        let mut bytes = Vec::new();
        self.doc.save_to(&mut bytes).map_err(|e| RenderError::Encode(e.to_string()))?;
        Ok(bytes)
    }
}

fn set_fill(ops: &mut Vec<Operation>, color: Rgba) {
    let (r, g, b) = color.unit_rgb();
    ops.push(Operation::new("rg", vec![Object::Real(r), Object::Real(g), Object::Real(b)]));
}

fn set_stroke(ops: &mut Vec<Operation>, color: Rgba, width: f64) {
    let (r, g, b) = color.unit_rgb();
    ops.push(Operation::new("RG", vec![Object::Real(r), Object::Real(g), Object::Real(b)]));
    ops.push(Operation::new("w", vec![num(width)]));
}
