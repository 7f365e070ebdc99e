use super::*;

#[test]
fn parse_short_hex() {
    assert_eq!(Rgba::parse("#f00"), Some(Rgba::opaque(255, 0, 0)));
    assert_eq!(Rgba::parse("#FFF"), Some(Rgba::WHITE));
}

#[test]
fn parse_long_hex() {
    assert_eq!(Rgba::parse("#3B82F6"), Some(Rgba::opaque(0x3b, 0x82, 0xf6)));
    assert_eq!(Rgba::parse("  #000000 "), Some(Rgba::BLACK));
}

#[test]
fn parse_hex_with_alpha() {
    assert_eq!(Rgba::parse("#ff000080"), Some(Rgba { r: 255, g: 0, b: 0, a: 0x80 }));
    assert_eq!(Rgba::parse("#f008"), Some(Rgba { r: 255, g: 0, b: 0, a: 0x88 }));
}

#[test]
fn parse_hex_rejects_bad_input() {
    assert_eq!(Rgba::parse("#ff"), None);
    assert_eq!(Rgba::parse("#gggggg"), None);
    assert_eq!(Rgba::parse("#1234567"), None);
    assert_eq!(Rgba::parse("#é12"), None);
}

#[test]
fn parse_functional_forms() {
    assert_eq!(Rgba::parse("rgb(10, 20, 30)"), Some(Rgba::opaque(10, 20, 30)));
    assert_eq!(Rgba::parse("RGBA(255,0,0,0.5)"), Some(Rgba { r: 255, g: 0, b: 0, a: 128 }));
    assert_eq!(Rgba::parse("rgb(300, 0, 0)"), None);
    assert_eq!(Rgba::parse("rgba(0, 0, 0)"), None);
    assert_eq!(Rgba::parse("rgba(0, 0, 0, 2)"), None);
}

#[test]
fn parse_named_colors() {
    assert_eq!(Rgba::parse("red"), Some(Rgba::opaque(255, 0, 0)));
    assert_eq!(Rgba::parse("Grey"), Some(Rgba::opaque(128, 128, 128)));
    assert_eq!(Rgba::parse("transparent").map(|c| c.a), Some(0));
    assert_eq!(Rgba::parse("not-a-color"), None);
    assert!(!is_valid(""));
}

#[test]
fn display_is_lowercase_hex() {
    assert_eq!(Rgba::opaque(0xAB, 0xCD, 0xEF).to_string(), "#abcdef");
    assert_eq!(Rgba { r: 1, g: 2, b: 3, a: 4 }.to_string(), "#01020304");
}

#[test]
fn unit_rgb_scales_channels() {
    let (r, g, b) = Rgba::opaque(255, 0, 51).unit_rgb();
    assert!((r - 1.0).abs() < f32::EPSILON);
    assert!(g.abs() < f32::EPSILON);
    assert!((b - 0.2).abs() < 1e-6);
}

#[test]
fn css_form_carries_alpha() {
    assert_eq!(Rgba::WHITE.to_css(), "rgba(255, 255, 255, 1.000)");
}
