use super::*;
use crate::error::ErrorCode;

fn temp_dir() -> PathBuf {
    std::env::temp_dir().join(format!("canvas-editor-images-{}", Uuid::new_v4()))
}

// =============================================================================
// NAMES
// =============================================================================

#[test]
fn sanitize_keeps_safe_basename() {
    assert_eq!(sanitize_filename("photo-1_a.PNG"), "photo-1_a.PNG");
}

#[test]
fn sanitize_strips_directories_and_odd_chars() {
    assert_eq!(sanitize_filename("../../etc/passwd"), "passwd");
    assert_eq!(sanitize_filename("C:\\Users\\me\\my pic!.jpg"), "my_pic_.jpg");
}

#[test]
fn sanitize_never_returns_hidden_or_empty() {
    assert_eq!(sanitize_filename(".htaccess"), "htaccess");
    assert_eq!(sanitize_filename(""), "image");
    assert_eq!(sanitize_filename("dir/"), "image");
    assert_eq!(sanitize_filename("..."), "image");
}

#[test]
fn sanitize_truncates_long_names() {
    let long = "a".repeat(500);
    assert_eq!(sanitize_filename(&long).len(), MAX_NAME_LEN);
}

#[test]
fn reference_name_accepts_basename_only() {
    assert_eq!(reference_name("/uploads/abc-cat.png").expect("valid"), "abc-cat.png");
    for bad in [
        "/uploads/",
        "/uploads/../secret",
        "/uploads/a/b.png",
        "/uploads/a\\b.png",
        "/uploads/.hidden",
        "uploads/cat.png",
        "/etc/passwd",
        "https://example.com/cat.png",
    ] {
        assert!(matches!(reference_name(bad), Err(ImageStoreError::Invalid(_))), "{bad} should be rejected");
    }
}

#[test]
fn sniff_accepts_png_jpeg_gif_only() {
    assert_eq!(sniff_format(b"\x89PNG\r\n\x1a\n0000"), Some(image::ImageFormat::Png));
    assert_eq!(sniff_format(b"\xFF\xD8\xFF\xE0rest"), Some(image::ImageFormat::Jpeg));
    assert_eq!(sniff_format(b"GIF89a...."), Some(image::ImageFormat::Gif));
    assert_eq!(sniff_format(b"BM........"), None);
    assert_eq!(sniff_format(b"hello world"), None);
}

#[test]
fn error_codes() {
    assert_eq!(ImageStoreError::NotFound("x".into()).error_code(), "E_IMAGE_NOT_FOUND");
    assert_eq!(ImageStoreError::Invalid("x".into()).error_code(), "E_VALIDATION");
    let io = ImageStoreError::Io(std::io::Error::other("boom"));
    assert_eq!(io.error_code(), "E_STORAGE");
    assert!(io.retryable());
}

// =============================================================================
// MEMORY
// =============================================================================

#[tokio::test]
async fn memory_store_round_trips_upload() {
    let store = MemoryImageStore::new();
    let reference = store.store_upload(b"bytes", "cat.png").await.expect("store");
    assert!(reference.starts_with(UPLOAD_PREFIX));
    assert!(reference.ends_with("-cat.png"));
    assert_eq!(store.resolve(&reference).await.expect("resolve"), b"bytes");
}

#[tokio::test]
async fn memory_store_uploads_never_collide() {
    let store = MemoryImageStore::new();
    let a = store.store_upload(b"a", "same.png").await.expect("a");
    let b = store.store_upload(b"b", "same.png").await.expect("b");
    assert_ne!(a, b);
    assert_eq!(store.resolve(&a).await.expect("a"), b"a");
}

#[tokio::test]
async fn memory_store_unknown_reference_is_not_found() {
    let store = MemoryImageStore::new();
    assert!(matches!(store.resolve("/uploads/nope.png").await, Err(ImageStoreError::NotFound(_))));
    assert!(matches!(store.resolve("/uploads/../nope.png").await, Err(ImageStoreError::Invalid(_))));
}

// =============================================================================
// DISK
// =============================================================================

#[tokio::test]
async fn disk_store_writes_into_its_directory() {
    let dir = temp_dir();
    let store = DiskImageStore::open(&dir).await.expect("open");
    let reference = store.store_upload(b"png-bytes", "../evil/cat.png").await.expect("store");

    let name = reference_name(&reference).expect("valid reference");
    assert!(dir.join(name).is_file());
    assert_eq!(store.resolve(&reference).await.expect("resolve"), b"png-bytes");

    tokio::fs::remove_dir_all(&dir).await.expect("cleanup");
}

#[tokio::test]
async fn disk_store_missing_file_is_not_found() {
    let dir = temp_dir();
    let store = DiskImageStore::open(&dir).await.expect("open");
    assert!(matches!(store.resolve("/uploads/missing.png").await, Err(ImageStoreError::NotFound(_))));
    tokio::fs::remove_dir_all(&dir).await.expect("cleanup");
}

#[tokio::test]
async fn disk_store_rejects_traversal() {
    let dir = temp_dir();
    let store = DiskImageStore::open(&dir).await.expect("open");
    assert!(matches!(store.resolve("/uploads/../../etc/passwd").await, Err(ImageStoreError::Invalid(_))));
    tokio::fs::remove_dir_all(&dir).await.expect("cleanup");
}
