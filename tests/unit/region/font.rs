use super::*;

#[test]
fn missing_file_fails_to_resolve() {
    let src = FontSource::File(PathBuf::from("tests/data/fonts/does-not-exist.ttf"));
    let err = src.resolve().unwrap_err();
    assert!(err.to_string().contains("does-not-exist.ttf"));
}

#[test]
fn empty_bytes_fail_to_resolve() {
    let src = FontSource::Bytes(Arc::from(Vec::<u8>::new()));
    assert!(src.resolve().is_err());
}

#[test]
fn in_memory_bytes_resolve_without_io() {
    let src = FontSource::Bytes(Arc::from(vec![0u8, 1, 0, 0]));
    let font = src.resolve().unwrap();
    assert_eq!(font.bytes.len(), 4);
    assert_eq!(font.index, 0);
}

#[test]
fn blank_family_is_rejected() {
    let src = FontSource::System {
        family: "  ".to_owned(),
    };
    assert!(src.resolve().is_err());
}

#[test]
fn serde_shape_is_snake_case() {
    let src: FontSource = serde_json::from_str(r#"{"system":{"family":"serif"}}"#).unwrap();
    assert_eq!(
        src,
        FontSource::System {
            family: "serif".to_owned()
        }
    );
    let src: FontSource = serde_json::from_str(r#"{"file":"fonts/a.ttf"}"#).unwrap();
    assert_eq!(src, FontSource::File(PathBuf::from("fonts/a.ttf")));
}
