use super::*;

fn collect(values: &[f64]) -> Vec<f64> {
    let mut out = Vec::new();
    let mut sink = |p: f64| out.push(p);
    let mut tracker = ProgressTracker::new(&mut sink);
    for v in values {
        tracker.update(*v);
    }
    out
}

#[test]
fn tracker_emits_only_increasing_values() {
    let out = collect(&[0.1, 0.1, 0.4, 0.2, 0.9]);
    assert_eq!(out, vec![0.1, 0.4, 0.9]);
}

#[test]
fn tracker_clamps_and_skips_non_finite() {
    let out = collect(&[-1.0, f64::NAN, 0.5, f64::INFINITY, 3.0, 1.0]);
    assert_eq!(out, vec![0.0, 0.5, 1.0]);
}

#[test]
fn parser_scales_out_time_by_duration() {
    let p = FfmpegProgressParser::new(Some(Duration::from_secs(2)));
    assert_eq!(p.parse_line("out_time_us=500000"), Some(0.25));
    assert_eq!(p.parse_line("out_time_ms=1000000"), Some(0.5));
    assert_eq!(p.parse_line("out_time_us=N/A"), None);
    assert_eq!(p.parse_line("frame=12"), None);
    assert_eq!(p.parse_line("progress=continue"), None);
    assert_eq!(p.parse_line("progress=end"), Some(1.0));
}

#[test]
fn parser_without_duration_only_reports_end() {
    let p = FfmpegProgressParser::new(None);
    assert_eq!(p.parse_line("out_time_us=500000"), None);
    assert_eq!(p.parse_line("progress=end"), Some(1.0));

    let zero = FfmpegProgressParser::new(Some(Duration::ZERO));
    assert_eq!(zero.parse_line("out_time_us=5"), None);
}
