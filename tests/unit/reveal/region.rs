use super::*;
use crate::reveal::RevealStyle;
use crate::reveal::timing::RevealTimings;

fn region() -> RevealRegion {
    let anim = RevealAnimation::new("hey", RevealStyle::Typewriter, 1.0, RevealTimings::default())
        .unwrap();
    RevealRegion::new(
        anim,
        StyleSnapshot::default(),
        RegionBounds::from_size(320.0, 120.0),
    )
}

#[test]
fn always_reports_bounds() {
    assert_eq!(region().bounds(), Some(RegionBounds::from_size(320.0, 120.0)));
}

#[test]
fn clock_is_frozen_until_begin() {
    let r = region();
    assert_eq!(r.elapsed(), Duration::ZERO);
    let before = r.current_visible_state().unwrap();
    assert_eq!(before, r.state_at(Duration::ZERO));

    r.begin();
    std::thread::sleep(Duration::from_millis(30));
    assert!(r.elapsed() >= Duration::from_millis(30));
}

#[test]
fn state_carries_style_and_fragments() {
    let r = region();
    let state = r.state_at(Duration::from_secs(5));
    assert_eq!(state.style, StyleSnapshot::default());
    let text: String = state
        .fragments
        .iter()
        .filter(|f| f.opacity > 0.0 && f.text != "|")
        .map(|f| f.text.as_str())
        .collect();
    assert_eq!(text, "hey");
}

#[test]
fn clones_share_the_clock() {
    let r = region();
    let c = r.clone();
    assert!(r.started.lock().unwrap().is_none());
    c.begin();
    assert!(r.started.lock().unwrap().is_some());
}
