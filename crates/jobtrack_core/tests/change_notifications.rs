use chrono::{TimeZone, Utc};
use jobtrack_core::{
    ApplicationId, ApplicationPatch, ApplicationService, ApplicationStatus, ChangeChannel,
    FixedClock, MemorySlotStorage, NewApplication, SlotApplicationStore, Tracker, TrackerConfig,
};
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

type MemoryService = ApplicationService<SlotApplicationStore<MemorySlotStorage>>;

fn service_with(storage: MemorySlotStorage) -> MemoryService {
    ApplicationService::with_clock(
        SlotApplicationStore::new(storage),
        ChangeChannel::new(),
        Box::new(FixedClock::new(
            Utc.with_ymd_and_hms(2025, 3, 1, 12, 0, 0).unwrap(),
        )),
    )
}

fn counting_listener(count: &Rc<Cell<usize>>) -> impl Fn() + 'static {
    let count = Rc::clone(count);
    move || count.set(count.get() + 1)
}

#[test]
fn each_successful_mutation_notifies_exactly_once() {
    let service = service_with(MemorySlotStorage::new());
    let count = Rc::new(Cell::new(0));
    let _subscription = service
        .channel()
        .subscribe("dashboard", counting_listener(&count));

    let created = service.add(NewApplication::new("Acme", "Engineer")).unwrap();
    assert_eq!(count.get(), 1);

    service
        .update(
            &created.id,
            &ApplicationPatch::new().status(ApplicationStatus::Accepted),
        )
        .unwrap();
    assert_eq!(count.get(), 2);

    service.delete(&created.id).unwrap();
    assert_eq!(count.get(), 3);
}

#[test]
fn reads_and_no_op_mutations_do_not_notify() {
    let service = service_with(MemorySlotStorage::new());
    let count = Rc::new(Cell::new(0));
    let _subscription = service
        .channel()
        .subscribe("dashboard", counting_listener(&count));

    service.list();
    service.statistics();
    service.dashboard();
    service
        .update(
            &ApplicationId::new("missing"),
            &ApplicationPatch::new().job_title("Lead"),
        )
        .unwrap();
    service.delete(&ApplicationId::new("missing")).unwrap();

    assert_eq!(count.get(), 0);
}

#[test]
fn failed_write_does_not_notify() {
    let service = service_with(MemorySlotStorage::with_quota(16));
    let count = Rc::new(Cell::new(0));
    let _subscription = service
        .channel()
        .subscribe("dashboard", counting_listener(&count));

    assert!(service.add(NewApplication::new("Acme", "Engineer")).is_err());
    assert_eq!(count.get(), 0);
}

#[test]
fn unsubscribed_listener_is_not_called() {
    let service = service_with(MemorySlotStorage::new());
    let count = Rc::new(Cell::new(0));
    let subscription = service
        .channel()
        .subscribe("dashboard", counting_listener(&count));

    service.add(NewApplication::new("Acme", "Engineer")).unwrap();
    subscription.unsubscribe();
    service.add(NewApplication::new("Globex", "Analyst")).unwrap();

    assert_eq!(count.get(), 1);
    assert_eq!(service.channel().listener_count(), 0);
}

#[test]
fn listener_can_requery_statistics_from_callback() {
    let tracker = Rc::new(Tracker::open(&TrackerConfig::default()).unwrap());
    let observed = Rc::new(RefCell::new(Vec::new()));

    let weak: Weak<Tracker> = Rc::downgrade(&tracker);
    let sink = Rc::clone(&observed);
    let _subscription = tracker.subscribe("dashboard", move || {
        if let Some(tracker) = weak.upgrade() {
            sink.borrow_mut()
                .push(tracker.service().statistics().total());
        }
    });

    let service = tracker.service();
    let first = service.add(NewApplication::new("Acme", "Engineer")).unwrap();
    service.add(NewApplication::new("Globex", "Analyst")).unwrap();
    service.delete(&first.id).unwrap();

    assert_eq!(*observed.borrow(), vec![1, 2, 1]);
}
