use super::*;

fn anim(text: &str, style: RevealStyle) -> RevealAnimation {
    RevealAnimation::new(text, style, 1.0, RevealTimings::default()).unwrap()
}

fn secs(s: f64) -> Duration {
    Duration::from_secs_f64(s)
}

fn visible_text(frags: &[Fragment]) -> String {
    frags
        .iter()
        .filter(|f| f.opacity > 0.0 && f.text != CARET)
        .map(|f| f.text.as_str())
        .collect()
}

#[test]
fn rejects_bad_speed() {
    for speed in [0.0, -1.0, f64::NAN, f64::INFINITY] {
        assert!(RevealAnimation::new("x", RevealStyle::Fluid, speed, RevealTimings::default()).is_err());
    }
}

#[test]
fn newlines_become_line_breaks() {
    let units = split_units("ab\n\nc");
    let texts: Vec<&str> = units.iter().map(|u| u.text.as_str()).collect();
    assert_eq!(texts, vec!["a", "b", "", "c"]);
    assert!(units[1].line_break_after);
    assert!(units[2].line_break_after);
    assert!(!units[3].line_break_after);
}

#[test]
fn typewriter_reveals_prefixes_with_caret() {
    let a = anim("hello", RevealStyle::Typewriter);
    let step = RevealTimings::default().typewriter_char_secs;

    let start = a.state_at(Duration::ZERO);
    assert_eq!(visible_text(&start), "");
    assert_eq!(start[0].text, CARET);

    let mid = a.state_at(secs(step * 3.5));
    assert_eq!(visible_text(&mid), "hel");
    let caret_at = mid.iter().position(|f| f.text == CARET).unwrap();
    assert_eq!(caret_at, 3);
    // hidden characters keep their slots
    assert_eq!(mid.len(), 6);

    let done = a.state_at(secs(10.0));
    assert_eq!(visible_text(&done), "hello");
}

#[test]
fn typewriter_caret_blinks() {
    let a = anim("hi", RevealStyle::Typewriter);
    let blink = RevealTimings::default().caret_blink_secs;
    let caret = |t: f64| {
        a.state_at(secs(t))
            .into_iter()
            .find(|f| f.text == CARET)
            .unwrap()
            .opacity
    };
    assert_eq!(caret(10.0 * blink + 0.1 * blink), 1.0);
    assert_eq!(caret(10.0 * blink + 0.6 * blink), 0.0);
}

#[test]
fn typewriter_caret_keeps_line_break_position() {
    let a = anim("a\nb", RevealStyle::Typewriter);
    let step = RevealTimings::default().typewriter_char_secs;
    let frags = a.state_at(secs(step * 1.2));
    assert_eq!(frags[0].text, "a");
    assert!(!frags[0].line_break_after);
    assert_eq!(frags[1].text, CARET);
    assert!(frags[1].line_break_after);
}

#[test]
fn shimmer_fades_in_then_settles_to_base() {
    let a = anim("shine", RevealStyle::Shimmer);
    let t = RevealTimings::default();

    assert!(a.state_at(Duration::ZERO).iter().all(|f| f.opacity == 0.0));
    let half = a.state_at(secs(t.shimmer_fade_secs / 2.0));
    assert!(half.iter().all(|f| f.opacity > 0.0 && f.opacity < 1.0));

    let during = a.state_at(secs(t.shimmer_fade_secs + t.shimmer_sweep_secs / 2.0));
    assert!(during.iter().any(|f| f.color.is_some()));

    let after = a.state_at(secs(t.shimmer_fade_secs + t.shimmer_sweep_secs + 0.1));
    assert!(after.iter().all(|f| f.opacity == 1.0 && f.color.is_none()));
}

#[test]
fn fluid_staggers_and_rises() {
    let a = anim("abc", RevealStyle::Fluid);
    let t = RevealTimings::default();
    let frags = a.state_at(secs(t.fluid_stagger_secs * 1.5));
    assert!(frags[0].opacity > frags[1].opacity);
    assert_eq!(frags[2].opacity, 0.0);
    assert!(frags[2].offset_em.y > frags[0].offset_em.y);

    let done = a.state_at(a.reveal_duration().unwrap() + secs(0.01));
    for f in done {
        assert_eq!(f.opacity, 1.0);
        assert!(f.offset_em.y.abs() < 1e-9);
    }
}

#[test]
fn handwriting_strokes_in_sequentially() {
    let a = anim("ab", RevealStyle::Handwriting);
    let step = RevealTimings::default().handwriting_char_secs;
    let frags = a.state_at(secs(step * 0.5));
    assert!(frags[0].opacity > 0.0);
    assert!(frags[0].scale_x < 1.0 && frags[0].scale_x > 0.6);
    assert_eq!(frags[1].opacity, 0.0);

    let done = a.state_at(secs(step * 2.0));
    assert!(done.iter().all(|f| f.opacity == 1.0 && f.scale_x == 1.0));
}

#[test]
fn speed_compresses_time() {
    let slow = RevealAnimation::new("abcd", RevealStyle::Typewriter, 1.0, RevealTimings::default())
        .unwrap();
    let fast = RevealAnimation::new("abcd", RevealStyle::Typewriter, 2.0, RevealTimings::default())
        .unwrap();
    let diff = (fast.reveal_duration().unwrap().as_secs_f64() * 2.0
        - slow.reveal_duration().unwrap().as_secs_f64())
    .abs();
    assert!(diff < 1e-6);
    let step = RevealTimings::default().typewriter_char_secs;
    assert_eq!(
        visible_text(&fast.state_at(secs(step * 1.1))),
        visible_text(&slow.state_at(secs(step * 2.2)))
    );
}

#[test]
fn typewriter_skips_blank_lines_within_reveal_duration() {
    let a = anim("a\n\n\nb", RevealStyle::Typewriter);
    let step = RevealTimings::default().typewriter_char_secs;
    assert!((a.reveal_duration().unwrap().as_secs_f64() - 2.0 * step).abs() < 1e-6);

    let done = a.state_at(a.reveal_duration().unwrap() + secs(1e-3));
    assert_eq!(visible_text(&done), "ab");
    let breaks = done.iter().filter(|f| f.line_break_after).count();
    assert_eq!(breaks, 3);

    let estimate = RevealTimings::default()
        .estimate_duration("a\n\n\nb", RevealStyle::Typewriter, 1.0)
        .unwrap();
    assert!(a.reveal_duration().unwrap() <= estimate);
}

#[test]
fn reveal_duration_overflow_is_an_error() {
    let timings = RevealTimings {
        handwriting_char_secs: 1e300,
        ..RevealTimings::default()
    };
    let a = RevealAnimation::new("ab", RevealStyle::Handwriting, 1.0, timings).unwrap();
    assert!(matches!(a.reveal_duration(), Err(GlyphreelError::Validation(_))));
}
