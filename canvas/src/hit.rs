//! Hit-testing: which element, and which part of it, is under a point.
//!
//! Elements are scanned in reverse render order so the topmost one wins.
//! The selected element's bottom-right resize handle is checked before any
//! body, since it may overlap an element drawn above the selection.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::doc::{Element, ElementId};
use crate::geometry::{self, Point};

/// Which part of an element was hit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitPart {
    Body,
    /// The bottom-right resize handle of the selected element.
    ResizeHandle,
}

/// Result of a hit test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub element_id: ElementId,
    pub part: HitPart,
}

/// Topmost element containing `pt`, if any.
#[must_use]
pub fn pick(elements: &[Element], pt: Point) -> Option<&Element> {
    if !pt.is_finite() {
        return None;
    }
    elements.iter().rev().find(|el| geometry::contains(el, pt))
}

/// Canvas position of an element's resize handle: its bounding box's
/// bottom-right corner.
#[must_use]
pub fn resize_handle(el: &Element) -> Point {
    let b = geometry::bounding_box(el);
    Point::new(b.right(), b.bottom())
}

/// Test what is under `pt`, checking the selected element's resize handle
/// first. `slop` is the handle half-size in canvas units.
#[must_use]
pub fn hit_test(elements: &[Element], pt: Point, selected: Option<ElementId>, slop: f64) -> Option<Hit> {
    if !pt.is_finite() {
        return None;
    }

    if let Some(sel) = selected.and_then(|id| elements.iter().find(|e| e.id == id)) {
        let handle = resize_handle(sel);
        if (pt.x - handle.x).abs() <= slop && (pt.y - handle.y).abs() <= slop {
            return Some(Hit { element_id: sel.id, part: HitPart::ResizeHandle });
        }
    }

    pick(elements, pt).map(|el| Hit { element_id: el.id, part: HitPart::Body })
}
