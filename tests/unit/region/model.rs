use super::*;

#[test]
fn bounds_validation() {
    assert!(RegionBounds::from_size(320.0, 180.0).validate().is_ok());
    assert!(RegionBounds::from_size(0.0, 180.0).validate().is_err());
    assert!(RegionBounds::from_size(320.0, -1.0).validate().is_err());
    assert!(
        RegionBounds {
            x: f32::INFINITY,
            ..RegionBounds::from_size(10.0, 10.0)
        }
        .validate()
        .is_err()
    );
}

#[test]
fn style_validation() {
    assert!(StyleSnapshot::default().validate().is_ok());
    let bad = StyleSnapshot {
        size_px: 0.0,
        ..StyleSnapshot::default()
    };
    assert!(bad.validate().is_err());
    let bad = StyleSnapshot {
        line_height: f32::NAN,
        ..StyleSnapshot::default()
    };
    assert!(bad.validate().is_err());
}

#[test]
fn fragment_builders() {
    let f = Fragment::visible("a")
        .with_opacity(1.7)
        .with_offset_em(0.0, 0.25)
        .with_scale(0.5, 1.0)
        .with_line_break();
    assert_eq!(f.opacity, 1.0);
    assert_eq!(f.offset_em, Vec2::new(0.0, 0.25));
    assert_eq!(f.scale_x, 0.5);
    assert!(f.line_break_after);
    assert!(!f.is_invisible());

    assert!(Fragment::hidden("a").is_invisible());
    assert!(Fragment::visible(" ").is_invisible());
}

#[test]
fn style_deserializes_with_defaults() {
    let style: StyleSnapshot = serde_json::from_str(
        r##"{ "size_px": 48, "color": "#ffffff", "background": "#000000" }"##,
    )
    .unwrap();
    assert_eq!(style.line_height, 1.3);
    assert_eq!(style.font, FontSource::default());
    assert_eq!(style.overlay, Some(Overlay::corner_darken()));

    let bare: StyleSnapshot = serde_json::from_str(r#"{ "overlay": null }"#).unwrap();
    assert!(bare.overlay.is_none());
    assert_eq!(bare.size_px, StyleSnapshot::default().size_px);
}
