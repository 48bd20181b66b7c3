use chrono::{TimeZone, Utc};
use jobtrack_core::{
    ApplicationPatch, ApplicationStatus, FixedClock, NewApplication, Tracker, TrackerConfig,
};
use std::cell::Cell;
use std::rc::Rc;

fn open_pair(path: &std::path::Path) -> (Tracker, Tracker) {
    let config = TrackerConfig::default().with_db_path(path);
    let clock = FixedClock::new(Utc.with_ymd_and_hms(2025, 4, 1, 8, 0, 0).unwrap());
    let first = Tracker::open_with_clock(&config, Box::new(clock.clone())).unwrap();
    let second = Tracker::open_with_clock(&config, Box::new(clock)).unwrap();
    (first, second)
}

#[test]
fn writes_from_one_context_are_visible_to_another() {
    let dir = tempfile::tempdir().unwrap();
    let (first, second) = open_pair(&dir.path().join("tracker.db"));

    let created = first
        .service()
        .add(NewApplication::new("Acme", "Engineer"))
        .unwrap();

    assert_eq!(second.service().list(), vec![created]);
}

#[test]
fn polling_reports_foreign_writes_once() {
    let dir = tempfile::tempdir().unwrap();
    let (first, second) = open_pair(&dir.path().join("tracker.db"));
    let count = Rc::new(Cell::new(0));
    let handle = Rc::clone(&count);
    let _subscription = second.subscribe("dashboard", move || handle.set(handle.get() + 1));

    assert!(!second.service().poll_external_changes());

    let created = first
        .service()
        .add(NewApplication::new("Acme", "Engineer"))
        .unwrap();
    assert!(second.service().poll_external_changes());
    assert!(!second.service().poll_external_changes());
    assert_eq!(count.get(), 1);

    first
        .service()
        .update(
            &created.id,
            &ApplicationPatch::new().status(ApplicationStatus::Submitted),
        )
        .unwrap();
    assert!(second.service().poll_external_changes());
    assert_eq!(count.get(), 2);
    assert_eq!(
        second.service().statistics().get(ApplicationStatus::Submitted),
        1
    );
}

#[test]
fn own_writes_are_not_reported_as_foreign() {
    let dir = tempfile::tempdir().unwrap();
    let (first, _second) = open_pair(&dir.path().join("tracker.db"));
    let count = Rc::new(Cell::new(0));
    let handle = Rc::clone(&count);
    let _subscription = first.subscribe("dashboard", move || handle.set(handle.get() + 1));

    first
        .service()
        .add(NewApplication::new("Acme", "Engineer"))
        .unwrap();

    assert_eq!(count.get(), 1);
    assert!(!first.service().poll_external_changes());
    assert_eq!(count.get(), 1);
}

#[test]
fn reopened_tracker_sees_persisted_collection() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tracker.db");
    let config = TrackerConfig::default().with_db_path(&path);

    let created = {
        let tracker = Tracker::open(&config).unwrap();
        tracker
            .service()
            .add(NewApplication::new("Acme", "Engineer"))
            .unwrap()
    };

    let reopened = Tracker::open(&config).unwrap();
    assert_eq!(reopened.service().list(), vec![created]);
}

#[test]
fn trackers_with_different_keys_do_not_share_collections() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("tracker.db");
    let default_tracker = Tracker::open(&TrackerConfig::default().with_db_path(&path)).unwrap();
    let other_tracker = Tracker::open(
        &TrackerConfig::default()
            .with_db_path(&path)
            .with_storage_key("archivedApplications"),
    )
    .unwrap();

    default_tracker
        .service()
        .add(NewApplication::new("Acme", "Engineer"))
        .unwrap();

    assert!(other_tracker.service().list().is_empty());
    assert!(!other_tracker.service().poll_external_changes());
}
