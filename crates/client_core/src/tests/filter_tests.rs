use super::*;
use crate::gazetteer::Run8Territories;

#[test]
fn everything_is_visible_by_default() {
    let filter = TerritoryFilter::default();
    assert!(filter.is_visible(Some(TerritoryId(150)), &Run8Territories));
    assert!(filter.is_visible(Some(TerritoryId(999)), &Run8Territories));
    assert!(filter.is_visible(None, &Run8Territories));
}

#[test]
fn disabling_a_known_territory_hides_only_that_territory() {
    let mut filter = TerritoryFilter::default();
    assert!(filter.set_enabled(TerritoryId(100), false, &Run8Territories));
    assert!(!filter.set_enabled(TerritoryId(100), false, &Run8Territories));

    assert!(!filter.is_visible(Some(TerritoryId(100)), &Run8Territories));
    assert!(filter.is_visible(Some(TerritoryId(110)), &Run8Territories));
    assert!(!filter.is_enabled(TerritoryId(100)));

    assert!(filter.set_enabled(TerritoryId(100), true, &Run8Territories));
    assert!(filter.is_visible(Some(TerritoryId(100)), &Run8Territories));
}

#[test]
fn unknown_flag_covers_unknown_ids_and_unsignalled_track() {
    let mut filter = TerritoryFilter::new([TerritoryId(999)], true);
    // A disabled unknown id is still governed by the unknown flag.
    assert!(filter.is_visible(Some(TerritoryId(999)), &Run8Territories));

    assert!(filter.set_unknown_enabled(false));
    assert!(!filter.set_unknown_enabled(false));
    assert!(!filter.unknown_enabled());
    assert!(!filter.is_visible(Some(TerritoryId(999)), &Run8Territories));
    assert!(!filter.is_visible(None, &Run8Territories));
    assert!(filter.is_visible(Some(TerritoryId(250)), &Run8Territories));
}

#[test]
fn unknown_ids_cannot_be_toggled_individually() {
    let mut filter = TerritoryFilter::default();
    assert!(!filter.set_enabled(TerritoryId(999), false, &Run8Territories));
    assert!(filter.is_enabled(TerritoryId(999)));
    assert_eq!(filter, TerritoryFilter::default());
}
