use std::collections::HashMap;

use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement};

use crate::commit::CommitQueue;
use crate::consts::{HANDLE_RADIUS_PX, MIN_ELEMENT_SIZE};
use crate::doc::{CanvasState, DocStore, Element, ElementId, ElementPatch, Shape};
use crate::geometry::{self, Point};
use crate::hit::{self, HitPart};
use crate::input::{Button, InputState, Key, UiState};
use crate::render;
use crate::scene;
use crate::viewport::Viewport;

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Persist these fields for the element (`PUT /element/{id}`).
    Commit { id: ElementId, patch: ElementPatch },
    /// Delete the element on the server.
    Delete { id: ElementId },
    SelectionChanged(Option<ElementId>),
    RenderNeeded,
}

/// Core engine state: all logic that doesn't depend on the canvas element.
///
/// Separated from `Engine` so it can be tested without WASM/browser dependencies.
#[derive(Debug, Default)]
pub struct EngineCore {
    pub doc: DocStore,
    pub viewport: Viewport,
    pub ui: UiState,
    pub input: InputState,
    pub commits: CommitQueue,
}

impl EngineCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Data inputs ---

    /// Hydrate the document from a server snapshot. A gesture or selection
    /// whose element vanished is dropped.
    pub fn load_state(&mut self, state: CanvasState) {
        self.doc.load(state);
        if let Some(id) = self.input.active_id()
            && self.doc.get(&id).is_none()
        {
            self.input = InputState::Idle;
        }
        if let Some(id) = self.ui.selected_id
            && self.doc.get(&id).is_none()
        {
            self.ui.selected_id = None;
        }
    }

    /// Apply a server response carrying a full element (add or update).
    /// Ignored for the element currently under a gesture.
    pub fn apply_upsert(&mut self, element: Element) {
        if self.input.active_id() == Some(element.id) {
            return;
        }
        self.doc.insert(element);
    }

    /// Apply a server-confirmed delete.
    pub fn apply_delete(&mut self, id: &ElementId) {
        self.doc.remove(id);
        self.commits.forget(id);
        if self.input.active_id() == Some(*id) {
            self.input = InputState::Idle;
        }
        if self.ui.selected_id.as_ref() == Some(id) {
            self.ui.selected_id = None;
        }
    }

    /// Update where the canvas element sits on screen.
    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// The host finished sending a commit for `id`. Returns the next commit
    /// for that element, if one was waiting.
    pub fn commit_finished(&mut self, id: &ElementId) -> Vec<Action> {
        match self.commits.complete(id) {
            Some(patch) => vec![Action::Commit { id: *id, patch }],
            None => Vec::new(),
        }
    }

    // --- Queries ---

    /// The currently selected element, if any.
    #[must_use]
    pub fn selection(&self) -> Option<ElementId> {
        self.ui.selected_id
    }

    /// Look up an element by id.
    #[must_use]
    pub fn element(&self, id: &ElementId) -> Option<&Element> {
        self.doc.get(id)
    }

    // --- Input events ---

    pub fn on_pointer_down(&mut self, screen_pt: Point, button: Button) -> Vec<Action> {
        if button != Button::Primary || !self.input.is_idle() || !screen_pt.is_finite() {
            return Vec::new();
        }
        let pt = self.viewport.screen_to_canvas(screen_pt);
        let slop = self.viewport.screen_dist_to_canvas(HANDLE_RADIUS_PX);
        let hit = hit::hit_test(self.doc.elements(), pt, self.ui.selected_id, slop);

        match hit {
            Some(h) if self.ui.selected_id == Some(h.element_id) => {
                let Some(el) = self.doc.get(&h.element_id) else {
                    return Vec::new();
                };
                let before = el.clone();
                self.input = match h.part {
                    HitPart::ResizeHandle => {
                        let b = geometry::bounding_box(el);
                        InputState::Resizing {
                            id: h.element_id,
                            origin: Point::new(b.x, b.y),
                            patch: ElementPatch::default(),
                            before,
                        }
                    }
                    HitPart::Body => {
                        let o = geometry::origin(el);
                        InputState::Dragging {
                            id: h.element_id,
                            offset: Point::new(pt.x - o.x, pt.y - o.y),
                            start: pt,
                            moved: false,
                            before,
                        }
                    }
                };
                Vec::new()
            }
            Some(h) => self.select(Some(h.element_id)),
            None => self.select(None),
        }
    }

    pub fn on_pointer_move(&mut self, screen_pt: Point) -> Vec<Action> {
        if self.input.is_idle() || !screen_pt.is_finite() {
            return Vec::new();
        }
        let pt = self.viewport.screen_to_canvas(screen_pt);
        let (canvas_w, canvas_h) = self.doc.size();

        match &mut self.input {
            InputState::Idle => Vec::new(),
            InputState::Dragging { id, offset, start, moved, .. } => {
                let Some(el) = self.doc.get_mut(id) else {
                    return Vec::new();
                };
                *moved |= pt != *start;
                let (w, h) = geometry::extent(el);
                el.x = geometry::clamp_to_canvas(pt.x - offset.x, canvas_w - w);
                el.y = geometry::clamp_to_canvas(pt.y - offset.y, canvas_h - h);
                vec![Action::RenderNeeded]
            }
            InputState::Resizing { id, origin, patch, before } => {
                let next = resize_patch(before, *origin, pt, (canvas_w, canvas_h));
                if self.doc.apply_patch(id, &next) {
                    *patch = next;
                    vec![Action::RenderNeeded]
                } else {
                    Vec::new()
                }
            }
        }
    }

    /// End the gesture. A drag whose pointer moved always commits its final
    /// position, even when clamping put the element back where it started.
    /// A resize commits only when the element changed. Non-finite values
    /// never commit.
    pub fn on_pointer_up(&mut self, screen_pt: Point, button: Button) -> Vec<Action> {
        if button != Button::Primary || self.input.is_idle() {
            return Vec::new();
        }
        let mut actions = self.on_pointer_move(screen_pt);

        let (id, patch, before, always) = match std::mem::take(&mut self.input) {
            InputState::Idle => return actions,
            InputState::Dragging { moved: false, .. } => return actions,
            InputState::Dragging { id, before, .. } => {
                let Some(el) = self.doc.get(&id) else {
                    return actions;
                };
                (id, ElementPatch::position(el.x, el.y), before, true)
            }
            InputState::Resizing { id, patch, before, .. } => (id, patch, before, false),
        };

        let unchanged = !always && self.doc.get(&id).is_none_or(|el| *el == before);
        let finite = patch.numeric_fields().iter().all(|(_, v)| v.is_finite());
        if unchanged || patch.is_empty() {
            return actions;
        }
        if !finite {
            self.doc.insert(before);
            actions.push(Action::RenderNeeded);
            return actions;
        }
        if let Some(patch) = self.commits.submit(id, patch) {
            actions.push(Action::Commit { id, patch });
        }
        actions
    }

    /// Abort the gesture and put the element back. Never commits.
    pub fn on_pointer_cancel(&mut self) -> Vec<Action> {
        match std::mem::take(&mut self.input) {
            InputState::Idle => Vec::new(),
            InputState::Dragging { before, .. } | InputState::Resizing { before, .. } => {
                self.doc.insert(before);
                vec![Action::RenderNeeded]
            }
        }
    }

    pub fn on_key_down(&mut self, key: &Key) -> Vec<Action> {
        if key.is_escape() {
            return self.on_pointer_cancel();
        }
        if !key.is_delete() || !self.input.is_idle() {
            return Vec::new();
        }
        let Some(id) = self.ui.selected_id else {
            return Vec::new();
        };
        self.doc.remove(&id);
        self.commits.forget(&id);
        self.ui.selected_id = None;
        vec![Action::Delete { id }, Action::SelectionChanged(None), Action::RenderNeeded]
    }

    fn select(&mut self, id: Option<ElementId>) -> Vec<Action> {
        if self.ui.selected_id == id {
            return Vec::new();
        }
        self.ui.selected_id = id;
        vec![Action::SelectionChanged(id), Action::RenderNeeded]
    }
}

/// Size fields for a resize from the fixed top-left `origin` to `pt`.
///
/// Each extent is clamped to `[MIN_ELEMENT_SIZE, canvas - origin]`, the
/// lower bound winning. Circles take half the smaller extent as radius.
/// Text scales its font size and moves its anchor so the box top stays put.
fn resize_patch(el: &Element, origin: Point, pt: Point, canvas: (f64, f64)) -> ElementPatch {
    let w = (pt.x - origin.x).min(canvas.0 - origin.x).max(MIN_ELEMENT_SIZE);
    let h = (pt.y - origin.y).min(canvas.1 - origin.y).max(MIN_ELEMENT_SIZE);
    match &el.shape {
        Shape::Rectangle(_) | Shape::Image(_) => {
            ElementPatch { width: Some(w), height: Some(h), ..Default::default() }
        }
        Shape::Circle(_) => ElementPatch { radius: Some(w.min(h) / 2.0), ..Default::default() },
        Shape::Text(_) => ElementPatch { size: Some(h), y: Some(origin.y + h), ..Default::default() },
    }
}

/// The full canvas engine. Wraps `EngineCore` and owns the browser canvas element.
pub struct Engine {
    canvas: HtmlCanvasElement,
    images: HashMap<String, HtmlImageElement>,
    pub core: EngineCore,
}

impl Engine {
    /// Create a new engine bound to the given canvas element.
    #[must_use]
    pub fn new(canvas: HtmlCanvasElement) -> Self {
        Self { canvas, images: HashMap::new(), core: EngineCore::new() }
    }

    // --- Delegated data inputs ---

    /// Load a server snapshot and size the backing store to the canvas.
    pub fn load_state(&mut self, state: CanvasState) {
        self.canvas.set_width(state.width);
        self.canvas.set_height(state.height);
        self.core.load_state(state);
    }

    pub fn apply_upsert(&mut self, element: Element) {
        self.core.apply_upsert(element);
    }

    pub fn apply_delete(&mut self, id: &ElementId) {
        self.core.apply_delete(id);
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.core.set_viewport(viewport);
    }

    pub fn commit_finished(&mut self, id: &ElementId) -> Vec<Action> {
        self.core.commit_finished(id)
    }

    /// Image sources the preview needs that the host has not loaded yet.
    #[must_use]
    pub fn missing_images(&self) -> Vec<String> {
        let scene = scene::build_scene(self.core.doc.state());
        scene
            .image_sources()
            .into_iter()
            .filter(|src| !self.images.contains_key(*src))
            .map(str::to_owned)
            .collect()
    }

    /// Hand the engine a loaded image element for `src`.
    pub fn register_image(&mut self, src: String, image: HtmlImageElement) {
        self.images.insert(src, image);
    }

    // --- Input events ---

    pub fn on_pointer_down(&mut self, screen_pt: Point, button: Button) -> Vec<Action> {
        self.core.on_pointer_down(screen_pt, button)
    }

    pub fn on_pointer_move(&mut self, screen_pt: Point) -> Vec<Action> {
        self.core.on_pointer_move(screen_pt)
    }

    pub fn on_pointer_up(&mut self, screen_pt: Point, button: Button) -> Vec<Action> {
        self.core.on_pointer_up(screen_pt, button)
    }

    pub fn on_pointer_cancel(&mut self) -> Vec<Action> {
        self.core.on_pointer_cancel()
    }

    pub fn on_key_down(&mut self, key: &Key) -> Vec<Action> {
        self.core.on_key_down(key)
    }

    // --- Render ---

    /// Draw the current state to the canvas.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the 2D context is unavailable or a draw call fails.
    pub fn render(&self) -> Result<(), JsValue> {
        let Some(ctx) = self.canvas.get_context("2d")? else {
            return Err(JsValue::from_str("2d context unavailable"));
        };
        let ctx = ctx.dyn_into::<CanvasRenderingContext2d>()?;
        let scene = scene::build_scene(self.core.doc.state());
        let selection = self.core.ui.selected_id.and_then(|id| self.core.doc.get(&id));
        render::draw(&ctx, &scene, &self.images, selection, self.core.viewport.effective_scale())
    }

    // --- Delegated queries ---

    #[must_use]
    pub fn selection(&self) -> Option<ElementId> {
        self.core.selection()
    }

    #[must_use]
    pub fn element(&self, id: &ElementId) -> Option<&Element> {
        self.core.element(id)
    }
}
