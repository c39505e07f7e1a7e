use super::*;
use crate::region::color::Color;

#[test]
fn minimal_json_fills_defaults() {
    let cfg = ClipConfig::from_reader(r#"{"text": "hi"}"#.as_bytes()).unwrap();
    assert_eq!(cfg, ClipConfig::new("hi"));
    cfg.validate().unwrap();
    assert_eq!(cfg.canvas().unwrap(), Canvas { width: 1920, height: 1080 });
}

#[test]
fn full_json_round_trips_into_runtime_types() {
    let json = r##"{
        "text": "Hello,\nworld",
        "style": "fluid",
        "speed": 2.0,
        "theme": { "size_px": 72, "color": "#ff0000", "background": "#102030", "overlay": null },
        "width": 640,
        "height": 360,
        "fps": 24,
        "scale": 1.0,
        "bitrate_bps": 2000000,
        "timings": { "fluid_char_secs": 0.4 }
    }"##;
    let cfg = ClipConfig::from_reader(json.as_bytes()).unwrap();
    cfg.validate().unwrap();

    assert_eq!(cfg.style, RevealStyle::Fluid);
    assert_eq!(cfg.theme.color, Color::rgba8(0xff, 0, 0, 0xff));
    assert_eq!(cfg.theme.overlay, None);
    assert_eq!(cfg.timings.fluid_char_secs, 0.4);
    assert_eq!(cfg.timings.fluid_stagger_secs, RevealTimings::default().fluid_stagger_secs);

    let opts = cfg.recorder_opts().unwrap();
    assert_eq!(opts.fps, Fps::per_second(24).unwrap());
    assert_eq!(opts.bitrate_bps, 2_000_000);
    assert_eq!(opts.scale, 1.0);
    assert_eq!(opts.clear_rgba, [0x10, 0x20, 0x30, 255]);

    let region = cfg.reveal_region().unwrap();
    use crate::region::VisualRegion as _;
    assert_eq!(region.bounds(), Some(RegionBounds::from_size(640.0, 360.0)));
}

#[test]
fn rejects_unknown_fields_and_bad_json() {
    let err = ClipConfig::from_reader(r#"{"text": "a", "colour": 1}"#.as_bytes()).unwrap_err();
    assert!(matches!(err, GlyphreelError::Serde(_)));
    let err = ClipConfig::from_reader("{".as_bytes()).unwrap_err();
    assert!(matches!(err, GlyphreelError::Serde(_)));
}

#[test]
fn validate_catches_bad_values() {
    let cases: Vec<Box<dyn Fn(&mut ClipConfig)>> = vec![
        Box::new(|c| c.text = "  ".into()),
        Box::new(|c| c.speed = 0.0),
        Box::new(|c| c.speed = f64::NAN),
        Box::new(|c| c.width = 0.0),
        Box::new(|c| c.fps = 0),
        Box::new(|c| c.scale = -1.0),
        Box::new(|c| c.duration_secs = Some(0.0)),
        Box::new(|c| c.duration_secs = Some(1e30)),
        Box::new(|c| c.timings.max_recording_secs = 1e20),
        Box::new(|c| c.bitrate_bps = Some(0)),
        Box::new(|c| c.theme.size_px = 0.0),
    ];
    for (i, mutate) in cases.iter().enumerate() {
        let mut cfg = ClipConfig::new("text");
        mutate(&mut cfg);
        assert!(
            matches!(cfg.validate(), Err(GlyphreelError::Validation(_))),
            "case {i}"
        );
    }
}

#[test]
fn recording_duration_prefers_explicit_length() {
    let mut cfg = ClipConfig::new("Hello");
    assert_eq!(
        cfg.recording_duration().unwrap(),
        crate::reveal::timing::estimate_duration("Hello", RevealStyle::Typewriter, 1.0).unwrap()
    );
    cfg.duration_secs = Some(4.0);
    assert_eq!(cfg.recording_duration().unwrap(), Duration::from_secs(4));
}

#[test]
fn from_path_reports_missing_file() {
    let missing = std::env::temp_dir().join("glyphreel-no-such-config.json");
    assert!(matches!(
        ClipConfig::from_path(&missing),
        Err(GlyphreelError::Validation(_))
    ));

    let path = std::env::temp_dir().join(format!("glyphreel-config-{}.json", std::process::id()));
    std::fs::write(&path, r#"{"text": "from disk", "style": "shimmer"}"#).unwrap();
    let cfg = ClipConfig::from_path(&path).unwrap();
    assert_eq!(cfg.style, RevealStyle::Shimmer);
    let _ = std::fs::remove_file(&path);
}

#[test]
fn oversized_duration_secs_fails_validation_and_conversion() {
    let json = r#"{"text": "hi", "duration_secs": 1e30}"#;
    let cfg = ClipConfig::from_reader(json.as_bytes()).unwrap();
    assert!(matches!(cfg.validate(), Err(GlyphreelError::Validation(_))));
    assert!(matches!(
        cfg.recording_duration(),
        Err(GlyphreelError::Validation(_))
    ));
}

#[test]
fn oversized_timings_fail_validation_and_conversion() {
    let json = r#"{
        "text": "hi",
        "timings": { "min_recording_secs": 1e20, "max_recording_secs": 1e20 }
    }"#;
    let cfg = ClipConfig::from_reader(json.as_bytes()).unwrap();
    assert!(matches!(cfg.validate(), Err(GlyphreelError::Validation(_))));
    assert!(matches!(
        cfg.recording_duration(),
        Err(GlyphreelError::Validation(_))
    ));
}

#[test]
fn longest_allowed_duration_is_accepted() {
    let mut cfg = ClipConfig::new("hi");
    cfg.duration_secs = Some(crate::reveal::timing::MAX_RECORDING_SECS);
    cfg.validate().unwrap();
    assert_eq!(cfg.recording_duration().unwrap(), Duration::from_secs(3600));
}
