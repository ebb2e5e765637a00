use carehouse::clock::FixedClock;
use carehouse::facility::Facility;
use carehouse::models::{HouseDraft, MaintenanceDraft};
use carehouse::schedule::{classify_status, next_due_date, DueStatus, Frequency, TaskStatus};
use carehouse::storage::MemoryStore;
use chrono::{DateTime, NaiveDate, TimeZone, Utc};

fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
}

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

#[test]
fn test_periods_advance_by_calendar_units() {
    let last = at(2024, 3, 15, 9);
    assert_eq!(next_due_date(last, Frequency::Weekly), at(2024, 3, 22, 9));
    assert_eq!(next_due_date(last, Frequency::Monthly), at(2024, 4, 15, 9));
    assert_eq!(next_due_date(last, Frequency::Quarterly), at(2024, 6, 15, 9));
    assert_eq!(next_due_date(last, Frequency::SemiAnnually), at(2024, 9, 15, 9));
    assert_eq!(next_due_date(last, Frequency::Annually), at(2025, 3, 15, 9));
}

#[test]
fn test_month_end_clamps() {
    assert_eq!(next_due_date(at(2024, 1, 31, 0), Frequency::Monthly), at(2024, 2, 29, 0));
    assert_eq!(next_due_date(at(2023, 1, 31, 0), Frequency::Monthly), at(2023, 2, 28, 0));
    assert_eq!(next_due_date(at(2024, 2, 29, 0), Frequency::Annually), at(2025, 2, 28, 0));
    assert_eq!(next_due_date(at(2024, 8, 31, 0), Frequency::Quarterly), at(2024, 11, 30, 0));
}

#[test]
fn test_due_is_always_after_last_completed() {
    let last = at(2024, 12, 31, 23);
    for f in Frequency::ALL {
        assert!(next_due_date(last, *f) > last, "{} did not advance", f);
    }
}

#[test]
fn test_classification_boundaries() {
    let today = day(2024, 5, 10);
    assert_eq!(classify_status(at(2024, 5, 9, 23), today), DueStatus::Overdue);
    assert_eq!(classify_status(at(2024, 5, 10, 0), today), DueStatus::DueToday);
    assert_eq!(classify_status(at(2024, 5, 10, 23), today), DueStatus::DueToday);
    assert_eq!(classify_status(at(2024, 5, 11, 0), today), DueStatus::DueSoon);
    assert_eq!(classify_status(at(2024, 5, 17, 12), today), DueStatus::DueSoon);
    assert_eq!(classify_status(at(2024, 5, 18, 0), today), DueStatus::Upcoming);
}

#[test]
fn test_weekly_task_lifecycle() {
    let store = MemoryStore::new();
    let mut facility = Facility::with_clock(store, FixedClock::utc(at(2024, 1, 5, 10))).unwrap();
    let house = facility.add_house(HouseDraft::new("Oakwood", 4)).unwrap();
    let task = facility
        .add_maintenance_task(MaintenanceDraft {
            house_id: house.id.clone(),
            task_name: "Take out recycling".into(),
            description: String::new(),
            frequency: Frequency::Weekly,
            last_completed_date: at(2024, 1, 1, 8),
        })
        .unwrap();
    assert_eq!(task.next_due_date(), at(2024, 1, 8, 8));

    let status = |f: &Facility<MemoryStore, FixedClock>| f.maintenance_tasks()[0].status;
    assert_eq!(status(&facility), TaskStatus::DueSoon);

    facility.clock_mut().now = at(2024, 1, 8, 18);
    assert_eq!(status(&facility), TaskStatus::DueToday);

    facility.clock_mut().now = at(2024, 1, 9, 7);
    assert_eq!(status(&facility), TaskStatus::Overdue);

    let done = facility.complete_maintenance_task(&task.id).unwrap();
    assert_eq!(done.last_completed_date(), at(2024, 1, 9, 7));
    assert_eq!(done.next_due_date(), at(2024, 1, 16, 7));
    assert_eq!(status(&facility), TaskStatus::Completed);

    // Completed sticks even once the new due date has passed.
    facility.clock_mut().now = at(2024, 2, 1, 0);
    assert_eq!(status(&facility), TaskStatus::Completed);

    facility.revert_maintenance_task(&task.id).unwrap();
    assert_eq!(status(&facility), TaskStatus::Overdue);
    let reverted = facility.maintenance_task(&task.id).unwrap();
    assert_eq!(reverted.next_due_date(), at(2024, 1, 16, 7));
}

#[test]
fn test_editing_schedule_keeps_completion() {
    let mut facility = Facility::with_clock(MemoryStore::new(), FixedClock::utc(at(2024, 6, 1, 12))).unwrap();
    let house = facility.add_house(HouseDraft::new("Maple", 6)).unwrap();
    let task = facility
        .add_maintenance_task(MaintenanceDraft {
            house_id: house.id,
            task_name: "Gutter Cleaning".into(),
            description: String::new(),
            frequency: Frequency::SemiAnnually,
            last_completed_date: at(2023, 1, 1, 0),
        })
        .unwrap();
    facility.complete_maintenance_task(&task.id).unwrap();

    let mut draft = MaintenanceDraft::from(facility.maintenance_task(&task.id).unwrap());
    draft.frequency = Frequency::Monthly;
    let edited = facility.update_maintenance_task(&task.id, draft).unwrap();
    assert!(edited.is_completed());
    assert_eq!(edited.next_due_date(), at(2024, 7, 1, 12));
}

#[test]
fn test_reference_dates() {
    assert_eq!(next_due_date(at(2024, 1, 15, 0), Frequency::Monthly), at(2024, 2, 15, 0));
    assert_eq!(next_due_date(at(2024, 2, 1, 0), Frequency::Quarterly), at(2024, 5, 1, 0));
    assert_eq!(next_due_date(at(2023, 1, 10, 0), Frequency::Annually), at(2024, 1, 10, 0));
}

#[test]
fn test_classification_is_stable() {
    let today = day(2024, 5, 10);
    let due = at(2024, 5, 14, 6);
    assert_eq!(classify_status(due, today), classify_status(due, today));
}

#[test]
fn test_stale_weekly_task_round_trip() {
    let now = at(2024, 4, 20, 15);
    let mut facility = Facility::with_clock(MemoryStore::new(), FixedClock::utc(now)).unwrap();
    let house = facility.add_house(HouseDraft::new("Pine", 10)).unwrap();
    let task = facility
        .add_maintenance_task(MaintenanceDraft {
            house_id: house.id,
            task_name: "Sweep porch".into(),
            description: String::new(),
            frequency: Frequency::Weekly,
            last_completed_date: now - chrono::Duration::days(30),
        })
        .unwrap();
    assert_eq!(facility.maintenance_tasks()[0].status, TaskStatus::Overdue);

    let done = facility.complete_maintenance_task(&task.id).unwrap();
    assert_eq!(done.next_due_date(), now + chrono::Duration::days(7));
    assert_eq!(facility.maintenance_tasks()[0].status, TaskStatus::Completed);

    facility.revert_maintenance_task(&task.id).unwrap();
    assert_eq!(facility.maintenance_tasks()[0].status, TaskStatus::DueSoon);
}
