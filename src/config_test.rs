use super::*;

// =============================================================================
// env_parse
// =============================================================================

#[test]
fn env_parse_missing_returns_default() {
    let val: usize = env_parse("__CANVAS_TEST_NONEXISTENT_KEY__", 42);
    assert_eq!(val, 42);
}

#[test]
fn env_parse_present_valid() {
    unsafe { std::env::set_var("__CANVAS_TEST_EP_VALID__", " 99 ") };
    let val: u64 = env_parse("__CANVAS_TEST_EP_VALID__", 0);
    assert_eq!(val, 99);
    unsafe { std::env::remove_var("__CANVAS_TEST_EP_VALID__") };
}

#[test]
fn env_parse_present_invalid_returns_default() {
    unsafe { std::env::set_var("__CANVAS_TEST_EP_INVALID__", "notanumber") };
    let val: u16 = env_parse("__CANVAS_TEST_EP_INVALID__", 7);
    assert_eq!(val, 7);
    unsafe { std::env::remove_var("__CANVAS_TEST_EP_INVALID__") };
}

#[test]
fn env_parse_out_of_range_returns_default() {
    unsafe { std::env::set_var("__CANVAS_TEST_EP_RANGE__", "300") };
    let val: u8 = env_parse("__CANVAS_TEST_EP_RANGE__", 80);
    assert_eq!(val, 80);
    unsafe { std::env::remove_var("__CANVAS_TEST_EP_RANGE__") };
}

// =============================================================================
// Config
// =============================================================================

#[test]
fn default_config_matches_constants() {
    let config = Config::default();
    assert_eq!(config.port, DEFAULT_PORT);
    assert_eq!(config.database_url, None);
    assert_eq!(config.upload_dir, PathBuf::from("uploads"));
    assert_eq!(config.max_upload_bytes, 5 * 1024 * 1024);
    assert_eq!(config.image_resolve_timeout, Duration::from_millis(5_000));
    assert_eq!(config.jpeg_quality, 80);
}
