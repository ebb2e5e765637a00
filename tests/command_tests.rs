use carehouse::clock::FixedClock;
use carehouse::commands::*;
use carehouse::error::Error;
use carehouse::facility::Facility;
use carehouse::models::*;
use carehouse::schedule::Frequency;
use carehouse::seed::demo_dataset;
use carehouse::schedule::TaskStatus;
use carehouse::storage::{JsonFileStore, MemoryStore};
use chrono::{DateTime, FixedOffset, NaiveDate, TimeZone, Utc};
use std::fs;

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 9, 10, 12, 0, 0).unwrap()
}

fn with_facility<F>(seed: bool, f: F)
where
    F: FnOnce(&mut Facility<MemoryStore, FixedClock>),
{
    let store = if seed {
        MemoryStore::with_data(demo_dataset(now()))
    } else {
        MemoryStore::new()
    };
    let mut facility = Facility::with_clock(store, FixedClock::utc(now())).unwrap();
    f(&mut facility);
}

#[test]
fn test_parse_instant_formats() {
    let utc = FixedClock::utc(now());
    assert_eq!(parse_instant("2024-03-05", &utc).unwrap(), Utc.with_ymd_and_hms(2024, 3, 5, 0, 0, 0).unwrap());
    assert_eq!(parse_instant("2024-03-05 14:30", &utc).unwrap(), Utc.with_ymd_and_hms(2024, 3, 5, 14, 30, 0).unwrap());
    assert_eq!(parse_instant("2024-03-05T16:30:00+02:00", &utc).unwrap(), Utc.with_ymd_and_hms(2024, 3, 5, 14, 30, 0).unwrap());
    assert!(matches!(parse_instant("03/05/2024", &utc), Err(Error::InvalidDate(_))));
}

#[test]
fn test_parse_instant_reads_wall_clock_in_local_zone() {
    let berlin = FixedClock::with_offset(now(), FixedOffset::east_opt(2 * 3600).unwrap());
    assert_eq!(parse_instant("2024-03-05", &berlin).unwrap(), Utc.with_ymd_and_hms(2024, 3, 4, 22, 0, 0).unwrap());
    assert_eq!(parse_instant("2024-03-05 14:30", &berlin).unwrap(), Utc.with_ymd_and_hms(2024, 3, 5, 12, 30, 0).unwrap());
    // An explicit offset wins over the local zone.
    assert_eq!(parse_instant("2024-03-05T14:30:00Z", &berlin).unwrap(), Utc.with_ymd_and_hms(2024, 3, 5, 14, 30, 0).unwrap());
}

#[test]
fn test_due_today_follows_local_calendar_day() {
    // 12:00 UTC on Oct 18 is already 02:00 on Oct 19 at UTC+14.
    let instant = Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap();
    let clock = FixedClock::with_offset(instant, FixedOffset::east_opt(14 * 3600).unwrap());
    let mut f = Facility::with_clock(MemoryStore::new(), clock).unwrap();
    assert_eq!(f.today(), NaiveDate::from_ymd_opt(2026, 10, 19).unwrap());

    cmd_house_add(&mut f, "Line Islands House".into(), 4, &HouseFields::default()).unwrap();
    // Due 20:00 local on Oct 19, which is still Oct 19 06:00 in UTC.
    cmd_maintenance_add(&mut f, "Generator Check".into(), "house-1".into(), "weekly", Some("2026-10-12 20:00"), None).unwrap();
    cmd_maintenance_add(&mut f, "Roof Check".into(), "house-1".into(), "weekly", None, None).unwrap();

    let rows = f.maintenance_tasks();
    assert_eq!(rows[0].status, TaskStatus::DueToday);
    // Defaulted to local midnight today, so due a week from the local date.
    assert_eq!(rows[1].task.last_completed_date(), Utc.with_ymd_and_hms(2026, 10, 18, 10, 0, 0).unwrap());
    assert_eq!(rows[1].status, TaskStatus::DueSoon);
    cmd_maintenance_list(&f, None, "").unwrap();
}

#[test]
fn test_house_add_and_edit() {
    with_facility(false, |f| {
        let fields = HouseFields {
            city: Some("Metropolis".into()),
            tags: vec!["Veteran".into()],
            ..HouseFields::default()
        };
        cmd_house_add(f, "Cedar House".into(), 6, &fields).unwrap();
        let house = &f.houses()[0];
        assert_eq!(house.id, "house-1");
        assert_eq!(house.address.city, "Metropolis");
        assert_eq!(house.status, HouseStatus::Active);

        let archive = HouseFields { status: Some("archived".into()), ..HouseFields::default() };
        cmd_house_edit(f, "house-1", None, Some(8), &archive).unwrap();
        let house = &f.houses()[0];
        assert_eq!(house.capacity, 8);
        assert_eq!(house.status, HouseStatus::Archived);
        assert_eq!(house.tags, vec!["Veteran".to_string()]);
        cmd_house_list(f, Some("all"), "cedar").unwrap();
    });
}

#[test]
fn test_member_add_with_branch_marks_veteran() {
    with_facility(true, |f| {
        let fields = MemberFields {
            house: Some("house-3".into()),
            branch: Some("navy".into()),
            dob: Some("1970-04-01".into()),
            ..MemberFields::default()
        };
        cmd_member_add(f, "Sam Carter".into(), &fields).unwrap();
        let m = f.member("member-8").unwrap();
        assert_eq!(m.veteran_status, VeteranStatus::Veteran);
        assert_eq!(m.branch_of_service, Some(BranchOfService::Navy));
        assert_eq!(m.house_id.as_deref(), Some("house-3"));

        let civilian = MemberFields { civilian: true, ..MemberFields::default() };
        cmd_member_edit(f, "member-8", None, &civilian).unwrap();
        let m = f.member("member-8").unwrap();
        assert_eq!(m.veteran_status, VeteranStatus::Civilian);
        assert_eq!(m.branch_of_service, None);
        assert_eq!(m.dob, chrono::NaiveDate::from_ymd_opt(1970, 4, 1));
    });
}

#[test]
fn test_bad_enum_value_lists_choices() {
    with_facility(true, |f| {
        let fields = MemberFields { label: Some("chef".into()), ..MemberFields::default() };
        let err = cmd_member_add(f, "Cook".into(), &fields).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("invalid label 'chef'"));
        assert!(msg.contains("house_lead"));
        assert_eq!(f.members().len(), 7);
    });
}

#[test]
fn test_assign_and_unassign() {
    with_facility(true, |f| {
        cmd_assign(f, "member-7", Some("house-1")).unwrap();
        assert_eq!(f.member("member-7").unwrap().house_id.as_deref(), Some("house-1"));
        cmd_assign(f, "member-7", None).unwrap();
        assert_eq!(f.member("member-7").unwrap().house_id, None);
        assert!(cmd_assign(f, "member-7", Some("house-4")).is_err());
        cmd_member_archive(f, "member-7").unwrap();
        assert!(cmd_board(f, &MemberQuery::default()).is_ok());
    });
}

#[test]
fn test_maintenance_commands() {
    with_facility(true, |f| {
        cmd_maintenance_add(f, "Water Heater Flush".into(), "house-2".into(), "annually", Some("2024-02-29"), None).unwrap();
        let task = f.maintenance_task("mt-7").unwrap();
        assert_eq!(task.next_due_date(), Utc.with_ymd_and_hms(2025, 2, 28, 0, 0, 0).unwrap());

        let edit = MaintenanceEdit { frequency: Some("semi-annually".into()), ..MaintenanceEdit::default() };
        cmd_maintenance_edit(f, "mt-7", &edit).unwrap();
        let task = f.maintenance_task("mt-7").unwrap();
        assert_eq!(task.frequency(), Frequency::SemiAnnually);
        assert_eq!(task.next_due_date(), Utc.with_ymd_and_hms(2024, 8, 29, 0, 0, 0).unwrap());

        cmd_maintenance_complete(f, "mt-7").unwrap();
        assert!(f.maintenance_task("mt-7").unwrap().is_completed());
        cmd_maintenance_revert(f, "mt-7").unwrap();
        assert!(!f.maintenance_task("mt-7").unwrap().is_completed());
        cmd_maintenance_list(f, Some("house-2".into()), "").unwrap();
        cmd_maintenance_summary(f).unwrap();

        let err = cmd_maintenance_add(f, "Bad".into(), "house-2".into(), "daily", None, None).unwrap_err();
        assert!(matches!(err, Error::InvalidValue { field: "frequency", .. }));
        assert!(cmd_maintenance_complete(f, "mt-99").is_err());
    });
}

#[test]
fn test_maintenance_add_defaults_to_today() {
    with_facility(true, |f| {
        cmd_maintenance_add(f, "Vacuum Vents".into(), "house-1".into(), "weekly", None, None).unwrap();
        let task = f.maintenance_task("mt-7").unwrap();
        assert_eq!(task.last_completed_date(), Utc.with_ymd_and_hms(2024, 9, 10, 0, 0, 0).unwrap());
        assert_eq!(task.next_due_date(), Utc.with_ymd_and_hms(2024, 9, 17, 0, 0, 0).unwrap());
    });
}

#[test]
fn test_work_order_and_inventory_commands() {
    with_facility(true, |f| {
        let fields = WorkOrderFields { priority: Some("high".into()), ..WorkOrderFields::default() };
        cmd_work_order_add(f, "Broken window".into(), "house-3".into(), "David Brown".into(), &fields).unwrap();
        let wo = f.work_orders().iter().find(|w| w.id == "wo-5").unwrap();
        assert_eq!(wo.priority, WorkOrderPriority::High);
        assert_eq!(wo.status, WorkOrderStatus::Open);

        let progress = WorkOrderFields { status: Some("in_progress".into()), assign: Some("John Doe".into()), ..WorkOrderFields::default() };
        cmd_work_order_edit(f, "wo-5", None, None, &progress).unwrap();
        let wo = f.work_orders().iter().find(|w| w.id == "wo-5").unwrap();
        assert_eq!(wo.status, WorkOrderStatus::InProgress);
        assert_eq!(wo.assigned_to.as_deref(), Some("John Doe"));
        cmd_work_order_list(f, Some("all"), Some("high"), None, "").unwrap();

        cmd_inventory_add(f, "Batteries".into(), "house-3".into(), 3, Some("low_stock")).unwrap();
        cmd_inventory_edit(f, "inv-6", None, None, Some(0), Some("out_of_stock")).unwrap();
        let item = f.inventory_items().iter().find(|i| i.id == "inv-6").unwrap();
        assert_eq!(item.status, StockStatus::OutOfStock);
        assert_eq!(item.quantity, 0);
        cmd_inventory_list(f, None, "batt").unwrap();
        cmd_inventory_summary(f).unwrap();
        cmd_dashboard(f).unwrap();
    });
}

#[test]
fn test_appointment_commands() {
    with_facility(true, |f| {
        cmd_appointment_add(f, "Check-in".into(), "member-2".into(), "2024-09-12 09:00", "2024-09-12 09:30", None).unwrap();
        let edit = AppointmentEdit { status: Some("no_show".into()), ..AppointmentEdit::default() };
        cmd_appointment_edit(f, "appt-4", &edit).unwrap();
        let appt = f.appointments().iter().find(|a| a.id == "appt-4").unwrap();
        assert_eq!(appt.status, AppointmentStatus::NoShow);

        let backwards = AppointmentEdit { end: Some("2024-09-12 08:00".into()), ..AppointmentEdit::default() };
        assert!(cmd_appointment_edit(f, "appt-4", &backwards).is_err());
        cmd_appointment_list(f, "check").unwrap();
        cmd_calendar(f, Some("2024-09"), "").unwrap();
        assert!(matches!(cmd_calendar(f, Some("Sept"), ""), Err(Error::InvalidDate(_))));
    });
}

#[test]
fn test_seed_and_reset() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("carehouse.json");
    let mut f = Facility::with_clock(JsonFileStore::new(&path), FixedClock::utc(now())).unwrap();
    cmd_seed(&mut f, false).unwrap();
    assert_eq!(f.houses().len(), 4);
    assert!(matches!(cmd_seed(&mut f, false), Err(Error::Validation(_))));
    cmd_seed(&mut f, true).unwrap();

    cmd_reset(&mut f, true).unwrap();
    assert!(f.data().is_empty());
    let reopened = Facility::with_clock(JsonFileStore::new(&path), FixedClock::utc(now())).unwrap();
    assert!(reopened.data().is_empty());
}

#[test]
fn test_reset_recovers_unreadable_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("carehouse.json");
    fs::write(&path, "{ not json").unwrap();
    assert!(matches!(
        Facility::with_clock(JsonFileStore::new(&path), FixedClock::utc(now())),
        Err(Error::Json(_))
    ));

    let mut f = Facility::detached(JsonFileStore::new(&path), FixedClock::utc(now()));
    cmd_reset(&mut f, true).unwrap();
    assert!(!path.exists());
    let reopened = Facility::with_clock(JsonFileStore::new(&path), FixedClock::utc(now())).unwrap();
    assert!(reopened.data().is_empty());
}

#[test]
fn test_forced_seed_replaces_unreadable_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("carehouse.json");
    fs::write(&path, "{ not json").unwrap();

    let mut f = Facility::detached(JsonFileStore::new(&path), FixedClock::utc(now()));
    cmd_seed(&mut f, true).unwrap();
    let reopened = Facility::with_clock(JsonFileStore::new(&path), FixedClock::utc(now())).unwrap();
    assert_eq!(reopened.houses().len(), 4);
    assert_eq!(reopened.maintenance_tasks().len(), 6);
}
