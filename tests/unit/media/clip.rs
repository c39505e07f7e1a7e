use super::*;

#[test]
fn media_type_tags() {
    assert_eq!(MediaType::WEBM_VP9.to_string(), "webm/vp9");
    assert_eq!(MediaType::MP4_H264.to_string(), "mp4/h264");
    assert_eq!(MediaType::WEBM_VP9.extension(), "webm");
    assert_eq!(MediaType::MP4_H264.mime(), "video/mp4;codecs=avc1");
}

#[test]
fn media_type_from_extension() {
    assert_eq!(MediaType::from_extension("WebM"), Some(MediaType::WEBM_VP9));
    assert_eq!(MediaType::from_extension("mp4"), Some(MediaType::MP4_H264));
    assert_eq!(MediaType::from_extension("gif"), None);
}

#[test]
fn clip_accessors() {
    let clip = EncodedClip::new(vec![1, 2, 3], MediaType::WEBM_VP9)
        .with_duration(Duration::from_secs(2));
    assert_eq!(clip.len(), 3);
    assert!(!clip.is_empty());
    assert_eq!(clip.bytes(), &[1, 2, 3]);
    assert_eq!(clip.duration(), Some(Duration::from_secs(2)));

    let copy = clip.clone();
    assert_eq!(copy.bytes().as_ptr(), clip.bytes().as_ptr());
}

#[test]
fn from_path_rejects_unknown_extension() {
    let err = EncodedClip::from_path(Path::new("clip.avi")).unwrap_err();
    assert!(err.to_string().contains("cannot infer media type"));
}
