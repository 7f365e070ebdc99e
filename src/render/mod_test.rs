use super::*;
use crate::error::ErrorCode;
use canvas::doc::CanvasState;
use canvas::scene::build_scene;

fn sized(width: u32, height: u32) -> Scene {
    build_scene(&CanvasState { width, height, background_color: "#FFFFFF".into(), elements: Vec::new() })
}

#[test]
fn image_param_accepts_png_jpg_jpeg() {
    assert_eq!(ExportFormat::from_image_param("png"), Some(ExportFormat::Png));
    assert_eq!(ExportFormat::from_image_param("jpg"), Some(ExportFormat::Jpeg));
    assert_eq!(ExportFormat::from_image_param("JPEG"), Some(ExportFormat::Jpeg));
    assert_eq!(ExportFormat::from_image_param("gif"), None);
    assert_eq!(ExportFormat::from_image_param("pdf"), None);
}

#[test]
fn content_types() {
    assert_eq!(ExportFormat::Pdf.content_type(), "application/pdf");
    assert_eq!(ExportFormat::Png.content_type(), "image/png");
    assert_eq!(ExportFormat::Jpeg.content_type(), "image/jpeg");
}

#[test]
fn check_page_accepts_normal_canvas() {
    assert_eq!(check_page(&sized(800, 600)).expect("valid"), (800, 600));
}

#[test]
fn check_page_rejects_zero_and_oversized() {
    assert!(matches!(check_page(&sized(0, 600)), Err(RenderError::Fatal(_))));
    assert!(matches!(check_page(&sized(800, 0)), Err(RenderError::Fatal(_))));
    assert!(matches!(check_page(&sized(MAX_PAGE_EDGE + 1, 10)), Err(RenderError::Fatal(_))));
}

#[test]
fn render_error_codes() {
    assert_eq!(RenderError::Fatal("x".into()).error_code(), "E_RENDER_FATAL");
    assert_eq!(RenderError::Encode("x".into()).error_code(), "E_RENDER_ENCODE");
    assert!(!RenderError::Fatal("x".into()).retryable());
}

#[test]
fn decode_image_reports_unresolved_reference() {
    let images = ImageSet::new();
    let err = decode_image(&images, "/uploads/a.png").expect_err("missing");
    assert_eq!(err, ElementFailure::ImageUnavailable { src: "/uploads/a.png".into(), reason: "not resolved".into() });
}

#[test]
fn decode_image_reads_png() {
    let img = image::RgbaImage::from_pixel(3, 2, image::Rgba([1, 2, 3, 255]));
    let mut bytes = Vec::new();
    img.write_to(&mut std::io::Cursor::new(&mut bytes), image::ImageFormat::Png).expect("encode");
    let mut images = ImageSet::new();
    images.insert("/uploads/a.png".into(), Ok(bytes));
    let decoded = decode_image(&images, "/uploads/a.png").expect("decodes");
    assert_eq!(decoded.dimensions(), (3, 2));
    assert_eq!(decoded.get_pixel(0, 0).0, [1, 2, 3, 255]);
}

#[test]
fn element_failure_messages_name_the_source() {
    let err = ElementFailure::ImageDecode { src: "/uploads/x.png".into(), reason: "bad header".into() };
    assert_eq!(err.to_string(), "image /uploads/x.png could not be decoded: bad header");
    assert_eq!(ElementFailure::Font("Comic".into()).to_string(), "no usable font for family `Comic`");
}
