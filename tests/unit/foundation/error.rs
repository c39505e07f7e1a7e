use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        GlyphreelError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        GlyphreelError::capture_setup("x")
            .to_string()
            .contains("capture setup error:")
    );
    assert!(
        GlyphreelError::encode("x")
            .to_string()
            .contains("encode error:")
    );
    assert!(
        GlyphreelError::render("x")
            .to_string()
            .contains("render error:")
    );
    assert!(
        GlyphreelError::serde("x")
            .to_string()
            .contains("serialization error:")
    );
    assert!(
        GlyphreelError::AlreadyRecording
            .to_string()
            .contains("already recording")
    );
}

#[test]
fn transcode_keeps_cause_as_source() {
    let err = GlyphreelError::transcode("engine load failed", std::io::Error::other("no ffmpeg"));
    assert!(err.is_transcode());
    assert!(err.to_string().contains("engine load failed"));

    let source = std::error::Error::source(&err).expect("source");
    assert!(source.to_string().contains("no ffmpeg"));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = GlyphreelError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
    assert!(!err.is_transcode());
}
