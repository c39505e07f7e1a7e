use super::*;
use crate::region::model::Fragment;

#[test]
fn unmounted_region_has_no_bounds() {
    let region = SharedRegion::new(StyleSnapshot::default());
    assert!(region.bounds().is_none());

    region.mount(RegionBounds::from_size(200.0, 100.0));
    assert_eq!(region.bounds(), Some(RegionBounds::from_size(200.0, 100.0)));

    region.unmount();
    assert!(region.bounds().is_none());
}

#[test]
fn clones_share_state() {
    let region = SharedRegion::new(StyleSnapshot::default());
    let driver = region.clone();

    driver.update(|s| s.fragments.push(Fragment::visible("h")));
    driver.update(|s| s.fragments.push(Fragment::hidden("i")));

    let state = region.current_visible_state().unwrap();
    assert_eq!(state.fragments.len(), 2);
    assert_eq!(state.fragments[0].text, "h");
    assert_eq!(state.fragments[1].opacity, 0.0);

    driver.set_state(VisibleState::empty(StyleSnapshot::default()));
    assert!(region.current_visible_state().unwrap().fragments.is_empty());
}
