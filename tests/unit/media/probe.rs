use super::*;

#[test]
fn container_duration_wins() {
    let json = br#"{
        "streams": [{ "codec_type": "video", "duration": "9.0" }],
        "format": { "duration": "2.500000" }
    }"#;
    assert_eq!(parse_probe_duration(json).unwrap(), Duration::from_millis(2500));
}

#[test]
fn stream_duration_when_container_has_none() {
    let json = br#"{
        "streams": [
            { "codec_type": "audio", "duration": "7.0" },
            { "codec_type": "video", "duration": "1.25" }
        ],
        "format": { "duration": "N/A" }
    }"#;
    assert_eq!(parse_probe_duration(json).unwrap(), Duration::from_millis(1250));
}

#[test]
fn counted_packets_cover_streamed_webm() {
    let json = br#"{
        "streams": [{
            "codec_type": "video",
            "nb_read_packets": "60",
            "avg_frame_rate": "0/0",
            "r_frame_rate": "30/1"
        }],
        "format": {}
    }"#;
    assert_eq!(parse_probe_duration(json).unwrap(), Duration::from_secs(2));
}

#[test]
fn missing_information_is_an_error() {
    assert!(parse_probe_duration(br#"{"streams": [], "format": {}}"#).is_err());
    let no_rate = br#"{"streams": [{ "codec_type": "video", "nb_read_packets": "10" }]}"#;
    assert!(parse_probe_duration(no_rate).is_err());
    assert!(matches!(
        parse_probe_duration(b"not json"),
        Err(GlyphreelError::Serde(_))
    ));
}
