use super::*;
use crate::error::ErrorCode;
use crate::store::MemoryStore;
use async_trait::async_trait;

fn service() -> (CanvasService, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    (CanvasService::new(store.clone()), store)
}

fn rect_fields(x: f64, y: f64) -> ElementPatch {
    ElementPatch { width: Some(40.0), height: Some(20.0), ..ElementPatch::position(x, y) }
}

/// Fails every call, for storage error paths.
struct BrokenStore;

#[async_trait]
impl DocumentStore for BrokenStore {
    async fn get_canvas(&self) -> Result<Option<Canvas>, StoreError> {
        Err(StoreError::Database(sqlx::Error::PoolTimedOut))
    }
    async fn put_canvas(&self, _canvas: &Canvas) -> Result<(), StoreError> {
        Err(StoreError::Database(sqlx::Error::PoolTimedOut))
    }
    async fn get_element(&self, _id: ElementId) -> Result<Option<Element>, StoreError> {
        Err(StoreError::Database(sqlx::Error::PoolTimedOut))
    }
    async fn get_elements(&self, _ids: &[ElementId]) -> Result<Vec<Element>, StoreError> {
        Err(StoreError::Database(sqlx::Error::PoolTimedOut))
    }
    async fn put_element(&self, _element: &Element) -> Result<(), StoreError> {
        Err(StoreError::Database(sqlx::Error::PoolTimedOut))
    }
    async fn delete_element(&self, _id: ElementId) -> Result<bool, StoreError> {
        Err(StoreError::Database(sqlx::Error::PoolTimedOut))
    }
    async fn delete_all_elements(&self) -> Result<(), StoreError> {
        Err(StoreError::Database(sqlx::Error::PoolTimedOut))
    }
}

// =============================================================================
// INITIALIZE + STATE
// =============================================================================

#[tokio::test]
async fn state_creates_default_canvas_once() {
    let (svc, store) = service();
    let state = svc.state().await.expect("state");
    assert_eq!((state.width, state.height), (800, 600));
    assert_eq!(state.background_color, "#FFFFFF");
    assert!(state.elements.is_empty());
    assert!(store.get_canvas().await.expect("get").is_some());
}

#[tokio::test]
async fn snapshot_does_not_create_canvas() {
    let (svc, store) = service();
    let snap = svc.snapshot().await.expect("snapshot");
    assert_eq!((snap.width, snap.height), (800, 600));
    assert!(store.get_canvas().await.expect("get").is_none());
}

#[tokio::test]
async fn initialize_sets_size_and_keeps_elements() {
    let (svc, _) = service();
    let el = svc.add_shape(ElementKind::Rectangle, &rect_fields(1.0, 2.0)).await.expect("add");

    let canvas = svc
        .initialize(InitializeCanvas { width: Some(1024.0), height: Some(768.0), background_color: Some("#112233".into()) })
        .await
        .expect("initialize");
    assert_eq!((canvas.width, canvas.height), (1024, 768));
    assert_eq!(canvas.elements, vec![el.id]);

    let state = svc.state().await.expect("state");
    assert_eq!(state.background_color, "#112233");
    assert_eq!(state.elements.len(), 1);
}

#[tokio::test]
async fn initialize_defaults_omitted_fields() {
    let (svc, _) = service();
    let canvas = svc.initialize(InitializeCanvas::default()).await.expect("initialize");
    assert_eq!((canvas.width, canvas.height), (800, 600));
    assert_eq!(canvas.background_color, "#FFFFFF");
}

#[tokio::test]
async fn initialize_rejects_out_of_range_sizes() {
    let (svc, store) = service();
    for (w, h) in [(99.0, 600.0), (800.0, 5001.0), (800.5, 600.0), (f64::NAN, 600.0)] {
        let req = InitializeCanvas { width: Some(w), height: Some(h), background_color: None };
        let err = svc.initialize(req).await.expect_err("out of range");
        assert_eq!(err.error_code(), "E_VALIDATION");
    }
    assert!(store.get_canvas().await.expect("get").is_none());
}

#[tokio::test]
async fn initialize_accepts_bounds() {
    let (svc, _) = service();
    let req = InitializeCanvas { width: Some(100.0), height: Some(5000.0), background_color: None };
    let canvas = svc.initialize(req).await.expect("bounds are inclusive");
    assert_eq!((canvas.width, canvas.height), (100, 5000));
}

#[tokio::test]
async fn initialize_rejects_bad_background() {
    let (svc, _) = service();
    let req = InitializeCanvas { background_color: Some("not-a-color".into()), ..InitializeCanvas::default() };
    let err = svc.initialize(req).await.expect_err("bad color");
    assert!(matches!(err, CanvasError::Validation { field: "backgroundColor", .. }));
}

// =============================================================================
// ADD
// =============================================================================

#[tokio::test]
async fn add_rectangle_fills_defaults() {
    let (svc, _) = service();
    let el = svc.add_shape(ElementKind::Rectangle, &ElementPatch::default()).await.expect("add");
    assert!((el.x, el.y) == (0.0, 0.0));
    let Shape::Rectangle(r) = &el.shape else { panic!("expected rectangle") };
    assert_eq!(r.width, Some(100.0));
    assert_eq!(r.height, Some(100.0));
    assert_eq!(r.color.as_deref(), Some("#000000"));
    assert_eq!(r.fill_color.as_deref(), Some("#000000"));
    assert_eq!(r.border_width, Some(0.0));
}

#[tokio::test]
async fn add_circle_fill_follows_color() {
    let (svc, _) = service();
    let fields = ElementPatch { color: Some("#ff0000".into()), ..ElementPatch::position(10.0, 10.0) };
    let el = svc.add_shape(ElementKind::Circle, &fields).await.expect("add");
    let Shape::Circle(c) = &el.shape else { panic!("expected circle") };
    assert_eq!(c.radius, Some(50.0));
    assert_eq!(c.fill_color.as_deref(), Some("#ff0000"));
}

#[tokio::test]
async fn add_text_fills_defaults() {
    let (svc, _) = service();
    let el = svc.add_shape(ElementKind::Text, &ElementPatch::position(5.0, 6.0)).await.expect("add");
    let Shape::Text(t) = &el.shape else { panic!("expected text") };
    assert_eq!(t.text.as_deref(), Some("Sample Text"));
    assert_eq!(t.size, Some(16.0));
    assert_eq!(t.font.as_deref(), Some("Arial"));
}

#[tokio::test]
async fn add_appends_in_order() {
    let (svc, _) = service();
    let a = svc.add_shape(ElementKind::Rectangle, &rect_fields(0.0, 0.0)).await.expect("a");
    let b = svc.add_shape(ElementKind::Circle, &ElementPatch::default()).await.expect("b");
    let c = svc.add_image("/uploads/x.png", &ElementPatch::default()).await.expect("c");

    let state = svc.state().await.expect("state");
    let ids: Vec<_> = state.elements.iter().map(|e| e.id).collect();
    assert_eq!(ids, vec![a.id, b.id, c.id]);
}

#[tokio::test]
async fn add_image_records_src_and_size() {
    let (svc, _) = service();
    let fields = ElementPatch { width: Some(64.0), ..ElementPatch::position(1.0, 1.0) };
    let el = svc.add_image("/uploads/cat.png", &fields).await.expect("add");
    let Shape::Image(i) = &el.shape else { panic!("expected image") };
    assert_eq!(i.src.as_deref(), Some("/uploads/cat.png"));
    assert_eq!(i.width, Some(64.0));
    assert_eq!(i.height, Some(100.0));
}

#[tokio::test]
async fn add_shape_rejects_image_kind() {
    let (svc, store) = service();
    let err = svc.add_shape(ElementKind::Image, &ElementPatch::default()).await.expect_err("image");
    assert_eq!(err.error_code(), "E_VALIDATION");
    assert_eq!(store.element_count().await, 0);
}

#[tokio::test]
async fn add_rejects_bad_values_without_writing() {
    let (svc, store) = service();
    let cases = [
        ElementPatch { x: Some(-1.0), ..ElementPatch::default() },
        ElementPatch { width: Some(0.0), ..ElementPatch::default() },
        ElementPatch { border_width: Some(-2.0), ..ElementPatch::default() },
        ElementPatch { color: Some("#GGGGGG".into()), ..ElementPatch::default() },
        ElementPatch { height: Some(f64::INFINITY), ..ElementPatch::default() },
    ];
    for fields in cases {
        let err = svc.add_shape(ElementKind::Rectangle, &fields).await.expect_err("invalid");
        assert_eq!(err.error_code(), "E_VALIDATION", "{fields:?}");
    }
    assert_eq!(store.element_count().await, 0);
    assert!(store.get_canvas().await.expect("get").is_none());
}

#[tokio::test]
async fn add_rejects_empty_font() {
    let (svc, _) = service();
    let fields = ElementPatch { font: Some("  ".into()), ..ElementPatch::default() };
    let err = svc.add_shape(ElementKind::Text, &fields).await.expect_err("empty font");
    assert!(matches!(err, CanvasError::Validation { field: "font", .. }));
}

// =============================================================================
// UPDATE
// =============================================================================

#[tokio::test]
async fn update_moves_and_recolors() {
    let (svc, _) = service();
    let el = svc.add_shape(ElementKind::Rectangle, &rect_fields(0.0, 0.0)).await.expect("add");
    let patch = ElementPatch { color: Some("#00ff00".into()), ..ElementPatch::position(30.0, 40.0) };
    let updated = svc.update_element(el.id, &patch).await.expect("update");
    assert!((updated.x, updated.y) == (30.0, 40.0));

    let state = svc.state().await.expect("state");
    assert_eq!(state.elements[0], updated);
}

#[tokio::test]
async fn update_unknown_is_not_found() {
    let (svc, _) = service();
    let err = svc.update_element(ElementId::new_v4(), &ElementPatch::position(1.0, 1.0)).await.expect_err("missing");
    assert_eq!(err.error_code(), "E_ELEMENT_NOT_FOUND");
}

#[tokio::test]
async fn update_foreign_field_is_rejected_and_leaves_element() {
    let (svc, _) = service();
    let el = svc.add_shape(ElementKind::Circle, &ElementPatch::default()).await.expect("add");
    let patch = ElementPatch { text: Some("nope".into()), ..ElementPatch::position(9.0, 9.0) };
    let err = svc.update_element(el.id, &patch).await.expect_err("foreign field");
    assert!(matches!(err, CanvasError::Validation { field: "text", .. }));

    let state = svc.state().await.expect("state");
    assert_eq!(state.elements[0], el);
}

#[tokio::test]
async fn update_validates_before_lookup() {
    let (svc, _) = service();
    let patch = ElementPatch { radius: Some(-5.0), ..ElementPatch::default() };
    let err = svc.update_element(ElementId::new_v4(), &patch).await.expect_err("invalid");
    assert_eq!(err.error_code(), "E_VALIDATION");
}

// =============================================================================
// DELETE + CLEAR
// =============================================================================

#[tokio::test]
async fn delete_removes_from_list_and_store() {
    let (svc, store) = service();
    let a = svc.add_shape(ElementKind::Rectangle, &rect_fields(0.0, 0.0)).await.expect("a");
    let b = svc.add_shape(ElementKind::Text, &ElementPatch::default()).await.expect("b");

    svc.delete_element(a.id).await.expect("delete");
    let state = svc.state().await.expect("state");
    assert_eq!(state.elements, vec![b]);
    assert_eq!(store.element_count().await, 1);

    let err = svc.delete_element(a.id).await.expect_err("already gone");
    assert_eq!(err.error_code(), "E_ELEMENT_NOT_FOUND");
}

#[tokio::test]
async fn delete_unlists_dangling_reference() {
    let (svc, store) = service();
    let id = ElementId::new_v4();
    let canvas = Canvas { elements: vec![id], ..Canvas::default() };
    store.put_canvas(&canvas).await.expect("seed");

    svc.delete_element(id).await.expect("dangling id is still deletable");
    assert!(store.get_canvas().await.expect("get").expect("canvas").elements.is_empty());
}

#[tokio::test]
async fn clear_keeps_canvas_settings() {
    let (svc, store) = service();
    svc.initialize(InitializeCanvas { width: Some(300.0), height: Some(200.0), background_color: Some("#000".into()) })
        .await
        .expect("initialize");
    for _ in 0..3 {
        svc.add_shape(ElementKind::Circle, &ElementPatch::default()).await.expect("add");
    }

    svc.clear().await.expect("clear");
    let state = svc.state().await.expect("state");
    assert!(state.elements.is_empty());
    assert_eq!((state.width, state.height), (300, 200));
    assert_eq!(store.element_count().await, 0);
}

#[tokio::test]
async fn clear_on_fresh_document_succeeds() {
    let (svc, _) = service();
    svc.clear().await.expect("clear");
}

#[tokio::test]
async fn concurrent_adds_and_clear_leave_no_dangling_ids() {
    let (svc, store) = service();
    let svc = Arc::new(svc);

    let mut tasks = Vec::new();
    for i in 0..20 {
        let svc = svc.clone();
        tasks.push(tokio::spawn(async move {
            if i % 7 == 3 {
                svc.clear().await.expect("clear");
            } else {
                svc.add_shape(ElementKind::Rectangle, &ElementPatch::default()).await.expect("add");
            }
        }));
    }
    for task in tasks {
        task.await.expect("task");
    }

    let canvas = store.get_canvas().await.expect("get").expect("canvas");
    for id in &canvas.elements {
        assert!(store.get_element(*id).await.expect("get").is_some(), "dangling {id}");
    }
    assert_eq!(canvas.elements.len(), store.element_count().await);
}

// =============================================================================
// ERRORS
// =============================================================================

#[tokio::test]
async fn storage_failure_is_retryable() {
    let svc = CanvasService::new(Arc::new(BrokenStore));
    let err = svc.state().await.expect_err("store down");
    assert_eq!(err.error_code(), "E_STORAGE");
    assert!(err.retryable());

    let err = svc.add_shape(ElementKind::Rectangle, &ElementPatch::default()).await.expect_err("store down");
    assert!(matches!(err, CanvasError::Storage(_)));
}

#[tokio::test]
async fn validation_beats_storage_failure() {
    let svc = CanvasService::new(Arc::new(BrokenStore));
    let fields = ElementPatch { y: Some(-1.0), ..ElementPatch::default() };
    let err = svc.add_shape(ElementKind::Rectangle, &fields).await.expect_err("invalid");
    assert!(matches!(err, CanvasError::Validation { field: "y", .. }));
}
