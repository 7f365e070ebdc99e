//! Canvas document, geometry, and interaction engine for the canvas editor.
//!
//! This crate is shared by the export server and the browser client. The
//! server uses the document model, geometry, and [`scene`] paint instructions
//! to drive its raster and PDF backends. The browser build (WebAssembly) adds
//! hit-testing, the drag/resize gesture machine, and a live preview renderer
//! on top of the same paint instructions, so every backend agrees on where an
//! element sits and what color it is.
//!
//! The browser host is not part of this workspace. A host page owns an
//! [`engine::Engine`] bound to its `<canvas>`, forwards pointer and key
//! events to it, performs the returned [`engine::Action`]s against the
//! `/api/canvas` HTTP API, and calls [`engine::Engine::render`] when asked.
//! All gesture logic lives in [`engine::EngineCore`], which is tested
//! natively without a browser.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`doc`] | Canvas and element types, sparse patches, client-side store |
//! | [`color`] | CSS color parsing |
//! | [`geometry`] | Field defaults, bounding boxes, point containment |
//! | [`scene`] | Backend-neutral paint instructions built from a canvas |
//! | [`hit`] | Topmost-element picking and resize-handle hits |
//! | [`input`] | Pointer/key types and the gesture state machine |
//! | [`commit`] | Per-element ordering of client commits |
//! | [`engine`] | Top-level engine and testable [`engine::EngineCore`] |
//! | [`viewport`] | Screen to canvas coordinate conversion |
//! | [`render`] | Live preview onto a browser 2D context |
//! | [`consts`] | Shared numeric constants |

pub mod color;
pub mod commit;
pub mod consts;
pub mod doc;
pub mod engine;
pub mod geometry;
pub mod hit;
pub mod input;
pub mod render;
pub mod scene;
pub mod viewport;
