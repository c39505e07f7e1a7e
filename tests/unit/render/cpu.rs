use super::*;
use crate::region::model::RegionBounds;

fn frags(texts: &[&str]) -> Vec<Fragment> {
    texts.iter().map(|t| Fragment::visible(*t)).collect()
}

fn system_font_available() -> bool {
    FontSource::default().resolve().is_ok()
}

fn backend(width: f32, height: f32) -> CpuSurfaceBackend {
    let settings =
        SurfaceSettings::for_region(RegionBounds::from_size(width, height), 1.0).unwrap();
    CpuSurfaceBackend::new(settings).unwrap()
}

fn plain_style() -> StyleSnapshot {
    StyleSnapshot {
        size_px: 20.0,
        background: Color::rgba8(0, 0, 255, 255),
        overlay: None,
        ..StyleSnapshot::default()
    }
}

#[test]
fn flow_keeps_single_line_when_it_fits() {
    let f = frags(&["a", "b", " ", "c"]);
    let flow = flow_fragments(&f, &[10.0, 10.0, 5.0, 10.0], 100.0);
    assert_eq!(flow.line_widths, vec![35.0]);
    let xs: Vec<f32> = flow.slots.iter().map(|s| s.x).collect();
    assert_eq!(xs, vec![0.0, 10.0, 20.0, 25.0]);
}

#[test]
fn flow_moves_whole_words_to_next_line() {
    let f = frags(&["a", "b", " ", "c", "d"]);
    let flow = flow_fragments(&f, &[10.0, 10.0, 5.0, 10.0, 10.0], 30.0);
    assert_eq!(flow.line_widths, vec![20.0, 20.0]);
    assert_eq!(flow.slots[3].line, 1);
    assert_eq!(flow.slots[3].x, 0.0);
    assert_eq!(flow.slots[4].x, 10.0);
}

#[test]
fn flow_honors_line_breaks() {
    let mut f = frags(&["a", "b"]);
    f[0].line_break_after = true;
    let flow = flow_fragments(&f, &[10.0, 10.0], 1000.0);
    assert_eq!(flow.line_widths.len(), 2);
    assert_eq!(flow.slots[1].line, 1);
}

#[test]
fn flow_of_nothing_is_one_empty_line() {
    let flow = flow_fragments(&[], &[], 100.0);
    assert!(flow.slots.is_empty());
    assert_eq!(flow.line_widths, vec![0.0]);
}

#[test]
fn gradient_runs_corner_to_corner() {
    let bytes = diagonal_gradient_premul(Color::TRANSPARENT, Color::BLACK, 3, 3);
    assert_eq!(&bytes[0..4], &[0, 0, 0, 0]);
    let last = bytes.len() - 4;
    assert_eq!(&bytes[last..], &[0, 0, 0, 255]);
    // center is halfway
    let mid = (3 + 1) * 4;
    assert!((120..=135).contains(&bytes[mid + 3]));
}

#[test]
fn empty_state_draws_background() {
    if !system_font_available() {
        return;
    }
    let mut b = backend(16.0, 8.0);
    let frame = b.draw(&VisibleState::empty(plain_style())).unwrap();
    assert_eq!(frame.width, 16);
    assert_eq!(frame.height, 8);
    assert!(frame.premultiplied);
    for px in frame.data.chunks_exact(4) {
        assert_eq!(px, &[0, 0, 255, 255]);
    }
}

#[test]
fn hidden_fragments_leave_surface_unchanged() {
    if !system_font_available() {
        return;
    }
    let mut b = backend(200.0, 60.0);
    let empty = b.draw(&VisibleState::empty(plain_style())).unwrap();

    let mut hidden = VisibleState::empty(plain_style());
    hidden.fragments = vec![Fragment::hidden("H"), Fragment::hidden("i")];
    let frame = b.draw(&hidden).unwrap();
    assert_eq!(frame.data, empty.data);

    let mut shown = hidden.clone();
    shown.fragments[0].opacity = 1.0;
    let frame = b.draw(&shown).unwrap();
    assert_ne!(frame.data, empty.data);
}

#[test]
fn overlay_darkens_bottom_right() {
    if !system_font_available() {
        return;
    }
    let mut b = backend(20.0, 20.0);
    let style = StyleSnapshot {
        background: Color::WHITE,
        overlay: Some(Overlay::corner_darken()),
        ..plain_style()
    };
    let frame = b.draw(&VisibleState::empty(style)).unwrap();
    let first = &frame.data[0..4];
    let last = &frame.data[frame.data.len() - 4..];
    assert!(first[0] > last[0]);
    assert_eq!(last[3], 255);
}

#[test]
fn canvas_reports_settings() {
    let b = backend(30.0, 10.0);
    assert_eq!(
        b.canvas(),
        Canvas {
            width: 30,
            height: 10
        }
    );
}
