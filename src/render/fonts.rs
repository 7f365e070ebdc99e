//! System font lookup and glyph outlines for raster text.
//!
//! Fonts are discovered once through `fontdb` and cached per CSS family
//! string. A family list is tried in order and always ends with the generic
//! sans-serif face, so an unknown family still draws when the host has any
//! fonts at all.

#[cfg(test)]
#[path = "fonts_test.rs"]
mod fonts_test;

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use fontdb::{Database, Family, Query, Stretch, Style, Weight};
use once_cell::sync::Lazy;
use tiny_skia::{Path, PathBuilder};
use ttf_parser::{Face, GlyphId, OutlineBuilder};

static FONT_BOOK: Lazy<Mutex<FontBook>> = Lazy::new(|| Mutex::new(FontBook::new()));

/// Raw face data for one resolved family.
#[derive(Debug)]
pub struct FontData {
    bytes: Vec<u8>,
    index: u32,
}

impl FontData {
    fn face(&self) -> Option<Face<'_>> {
        Face::parse(&self.bytes, self.index).ok()
    }
}

/// Resolve a CSS font-family string to a loaded face.
#[must_use]
pub fn lookup(family: &str) -> Option<Arc<FontData>> {
    let mut book = FONT_BOOK.lock().ok()?;
    book.lookup(family)
}

struct FontBook {
    db: Database,
    loaded_system_fonts: bool,
    cache: HashMap<String, Option<Arc<FontData>>>,
}

impl FontBook {
    fn new() -> Self {
        Self { db: Database::new(), loaded_system_fonts: false, cache: HashMap::new() }
    }

    fn lookup(&mut self, family: &str) -> Option<Arc<FontData>> {
        let key = family.trim().to_ascii_lowercase();
        if let Some(hit) = self.cache.get(&key) {
            return hit.clone();
        }
        let loaded = self.load(family).map(Arc::new);
        if loaded.is_none() {
            tracing::debug!(family, "no system font matched");
        }
        self.cache.insert(key, loaded.clone());
        loaded
    }

    fn load(&mut self, family: &str) -> Option<FontData> {
        if !self.loaded_system_fonts {
            self.db.load_system_fonts();
            self.loaded_system_fonts = true;
            tracing::info!(faces = self.db.len(), "system fonts loaded");
        }

        let tokens = family_chain(family);
        let families: Vec<Family<'_>> = tokens.iter().map(FamilyToken::as_family).collect();
        let query = Query { families: &families, weight: Weight::NORMAL, stretch: Stretch::Normal, style: Style::Normal };
        let id = self.db.query(&query)?;

        self.db
            .with_face_data(id, |data, index| {
                Face::parse(data, index).is_ok().then(|| FontData { bytes: data.to_vec(), index })
            })
            .flatten()
    }
}

// =============================================================================
// FAMILY PARSING
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
enum FamilyToken {
    Serif,
    SansSerif,
    Monospace,
    Cursive,
    Fantasy,
    Name(String),
}

impl FamilyToken {
    fn as_family(&self) -> Family<'_> {
        match self {
            Self::Serif => Family::Serif,
            Self::SansSerif => Family::SansSerif,
            Self::Monospace => Family::Monospace,
            Self::Cursive => Family::Cursive,
            Self::Fantasy => Family::Fantasy,
            Self::Name(name) => Family::Name(name),
        }
    }
}

/// Split a CSS family list into query tokens, ending with sans-serif.
fn family_chain(family: &str) -> Vec<FamilyToken> {
    let mut out = Vec::new();
    for part in family.split(',') {
        let raw = part.trim().trim_matches('"').trim_matches('\'');
        if raw.is_empty() {
            continue;
        }
        let token = match raw.to_ascii_lowercase().as_str() {
            "serif" => FamilyToken::Serif,
            "sans-serif" | "system-ui" | "ui-sans-serif" => FamilyToken::SansSerif,
            "monospace" | "ui-monospace" => FamilyToken::Monospace,
            "cursive" => FamilyToken::Cursive,
            "fantasy" => FamilyToken::Fantasy,
            _ => FamilyToken::Name(raw.to_owned()),
        };
        if !out.contains(&token) {
            out.push(token);
        }
    }
    if !out.contains(&FamilyToken::SansSerif) {
        out.push(FamilyToken::SansSerif);
    }
    out
}

// =============================================================================
// OUTLINES
// =============================================================================

/// Maps font units (y up) onto canvas pixels (y down) at a pen position.
struct PenBuilder {
    path: PathBuilder,
    scale: f32,
    x: f32,
    baseline: f32,
}

impl PenBuilder {
    fn point(&self, x: f32, y: f32) -> (f32, f32) {
        (self.x + x * self.scale, self.baseline - y * self.scale)
    }
}

impl OutlineBuilder for PenBuilder {
    fn move_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.point(x, y);
        self.path.move_to(x, y);
    }

    fn line_to(&mut self, x: f32, y: f32) {
        let (x, y) = self.point(x, y);
        self.path.line_to(x, y);
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let (x1, y1) = self.point(x1, y1);
        let (x, y) = self.point(x, y);
        self.path.quad_to(x1, y1, x, y);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        let (x1, y1) = self.point(x1, y1);
        let (x2, y2) = self.point(x2, y2);
        let (x, y) = self.point(x, y);
        self.path.cubic_to(x1, y1, x2, y2, x, y);
    }

    fn close(&mut self) {
        self.path.close();
    }
}

/// Outline a single line of text with its left baseline at `(x, baseline)`.
///
/// Returns `None` when the face cannot be parsed or the text has no inked
/// glyphs (e.g. only spaces).
#[must_use]
pub fn text_path(font: &FontData, text: &str, size: f32, x: f32, baseline: f32) -> Option<Path> {
    let face = font.face()?;
    let scale = size / f32::from(face.units_per_em().max(1));
    let mut pen = PenBuilder { path: PathBuilder::new(), scale, x, baseline };

    for ch in text.chars() {
        let glyph = face.glyph_index(ch).unwrap_or(GlyphId(0));
        face.outline_glyph(glyph, &mut pen);
        let advance = face.glyph_hor_advance(glyph).unwrap_or(0);
        pen.x += f32::from(advance) * scale;
    }

    pen.path.finish()
}
