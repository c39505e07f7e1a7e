use super::*;

#[test]
fn collector_keeps_arrival_order() {
    let (tx, mut collector) = ChunkCollector::channel();
    tx.send(b"ab".to_vec()).unwrap();
    tx.send(Vec::new()).unwrap();
    tx.send(b"cde".to_vec()).unwrap();
    collector.poll();
    assert_eq!(collector.chunk_count(), 2);
    assert!(!collector.is_closed());

    tx.send(b"f".to_vec()).unwrap();
    drop(tx);
    collector.drain(Duration::from_secs(1)).unwrap();
    assert!(collector.is_closed());
    assert_eq!(collector.byte_len(), 6);
    assert_eq!(collector.concat(), b"abcdef".to_vec());
}

#[test]
fn drain_waits_for_late_chunks_from_other_threads() {
    let (tx, mut collector) = ChunkCollector::channel();
    let worker = std::thread::spawn(move || {
        for i in 0u8..5 {
            std::thread::sleep(Duration::from_millis(5));
            tx.send(vec![i]).unwrap();
        }
    });
    collector.drain(Duration::from_secs(5)).unwrap();
    worker.join().unwrap();
    assert_eq!(collector.concat(), vec![0, 1, 2, 3, 4]);
}

#[test]
fn drain_times_out_when_sender_stays_open() {
    let (tx, mut collector) = ChunkCollector::channel();
    tx.send(vec![1]).unwrap();
    let err = collector.drain(Duration::from_millis(20)).unwrap_err();
    assert!(matches!(err, GlyphreelError::Encode(_)));
    assert_eq!(collector.concat(), vec![1]);
    drop(tx);
}

#[test]
fn config_requires_even_dimensions() {
    let fps = Fps::default();
    assert!(EncoderConfig::webm(640, 360, fps).validate().is_ok());
    assert!(EncoderConfig::webm(641, 360, fps).validate().is_err());
    assert!(EncoderConfig::webm(0, 360, fps).validate().is_err());
    assert!(
        EncoderConfig::webm(640, 360, fps)
            .with_bitrate(0)
            .validate()
            .is_err()
    );
}

#[test]
fn webm_config_defaults() {
    let cfg = EncoderConfig::webm(2, 2, Fps::default());
    assert_eq!(cfg.media_type, MediaType::WEBM_VP9);
    assert_eq!(cfg.bitrate_bps, DEFAULT_BITRATE_BPS);
}
