use carehouse::clock::FixedClock;
use carehouse::error::Error;
use carehouse::facility::Facility;
use carehouse::models::*;
use carehouse::schedule::TaskStatus;
use carehouse::seed::demo_dataset;
use carehouse::storage::MemoryStore;
use chrono::{DateTime, Duration, TimeZone, Utc};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 9, 10, 12, 0, 0).unwrap()
}

fn seeded() -> Facility<MemoryStore, FixedClock> {
    let store = MemoryStore::with_data(demo_dataset(now()));
    Facility::with_clock(store, FixedClock::utc(now())).unwrap()
}

fn empty() -> Facility<MemoryStore, FixedClock> {
    Facility::with_clock(MemoryStore::new(), FixedClock::utc(now())).unwrap()
}

#[test]
fn test_add_house_assigns_next_id() {
    let mut f = seeded();
    let house = f.add_house(HouseDraft::new("Birch House", 5)).unwrap();
    assert_eq!(house.id, "house-5");
    assert_eq!(house.created_at, now());
    assert_eq!(f.houses().len(), 5);
}

#[test]
fn test_blank_names_are_rejected() {
    let mut f = empty();
    let err = f.add_house(HouseDraft::new("   ", 5)).unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert!(f.houses().is_empty());

    let err = f.add_member(MemberDraft::new("")).unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}

#[test]
fn test_member_needs_existing_house() {
    let mut f = seeded();
    let mut draft = MemberDraft::new("New Resident");
    draft.house_id = Some("house-99".into());
    let err = f.add_member(draft).unwrap_err();
    assert!(matches!(err, Error::NotFound { kind: "house", .. }));
}

#[test]
fn test_member_cannot_join_archived_house() {
    let mut f = seeded();
    let mut draft = MemberDraft::new("New Resident");
    draft.house_id = Some("house-4".into());
    let err = f.add_member(draft).unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert_eq!(f.members().len(), 7);

    let mut draft = MemberDraft::from(f.member("member-7").unwrap());
    draft.house_id = Some("house-4".into());
    let err = f.update_member("member-7", draft).unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert_eq!(f.member("member-7").unwrap().house_id, None);
}

#[test]
fn test_member_in_since_archived_house_can_still_be_edited() {
    let mut f = seeded();
    let mut house = HouseDraft::from(f.house("house-2").unwrap());
    house.status = HouseStatus::Archived;
    f.update_house("house-2", house).unwrap();

    let resident = f
        .members()
        .iter()
        .find(|m| m.house_id.as_deref() == Some("house-2"))
        .unwrap()
        .id
        .clone();
    let mut draft = MemberDraft::from(f.member(&resident).unwrap());
    draft.phone = "555-0199".into();
    let updated = f.update_member(&resident, draft).unwrap();
    assert_eq!(updated.house_id.as_deref(), Some("house-2"));
    assert_eq!(updated.phone, "555-0199");
}

#[test]
fn test_id_space_exhaustion_is_an_error() {
    let mut data = Dataset { houses: demo_dataset(now()).houses, ..Dataset::default() };
    data.houses[0].id = format!("house-{}", u64::MAX);
    let mut f = Facility::with_clock(MemoryStore::with_data(data), FixedClock::utc(now())).unwrap();
    let err = f.add_house(HouseDraft::new("Overflow House", 2)).unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
    assert_eq!(f.houses().len(), 4);
}

#[test]
fn test_update_unknown_record_is_not_found() {
    let mut f = seeded();
    let err = f.update_house("house-42", HouseDraft::new("Ghost", 1)).unwrap_err();
    assert_eq!(err.to_string(), "house 'house-42' not found");
}

#[test]
fn test_archiving_member_unassigns() {
    let mut f = seeded();
    let member = f.archive_member("member-1").unwrap();
    assert_eq!(member.status, MemberStatus::Archived);
    assert_eq!(member.house_id, None);
    assert_eq!(f.member_count("house-1"), 1);

    let mut draft = MemberDraft::from(f.member("member-3").unwrap());
    draft.status = MemberStatus::Archived;
    let updated = f.update_member("member-3", draft).unwrap();
    assert_eq!(updated.house_id, None);
}

#[test]
fn test_move_member_rules() {
    let mut f = seeded();
    assert!(!f.move_member("member-1", Some("house-1")).unwrap());
    assert!(f.move_member("member-7", Some("house-2")).unwrap());
    assert_eq!(f.member("member-7").unwrap().house_id.as_deref(), Some("house-2"));
    assert!(f.move_member("member-7", None).unwrap());
    assert_eq!(f.member("member-7").unwrap().house_id, None);

    let err = f.move_member("member-7", Some("house-4")).unwrap_err();
    assert!(matches!(err, Error::Validation(_)));

    f.archive_member("member-2").unwrap();
    let err = f.move_member("member-2", Some("house-1")).unwrap_err();
    assert!(matches!(err, Error::Validation(_)));
}

#[test]
fn test_move_over_capacity_is_allowed() {
    let mut f = seeded();
    let mut draft = HouseDraft::from(f.house("house-1").unwrap());
    draft.capacity = 2;
    f.update_house("house-1", draft).unwrap();
    assert!(f.move_member("member-7", Some("house-1")).unwrap());
    assert_eq!(f.member_count("house-1"), 3);
}

#[test]
fn test_work_order_update() {
    let mut f = seeded();
    let mut draft = WorkOrderDraft::from(f.work_orders().iter().find(|w| w.id == "wo-1").unwrap());
    draft.status = WorkOrderStatus::Completed;
    draft.assigned_to = Some("Peter Jones".into());
    let wo = f.update_work_order("wo-1", draft).unwrap();
    assert_eq!(wo.status, WorkOrderStatus::Completed);
    assert_eq!(wo.updated_at, now());
    assert!(wo.created_at < wo.updated_at);
}

#[test]
fn test_appointment_validation() {
    let mut f = seeded();
    let draft = AppointmentDraft {
        member_id: "member-1".into(),
        title: "Dentist".into(),
        description: None,
        start: now() + Duration::hours(2),
        end: now() + Duration::hours(1),
        status: AppointmentStatus::Scheduled,
    };
    let err = f.add_appointment(draft.clone()).unwrap_err();
    assert!(matches!(err, Error::Validation(_)));

    let err = f
        .add_appointment(AppointmentDraft { member_id: "member-99".into(), end: now() + Duration::hours(3), ..draft.clone() })
        .unwrap_err();
    assert!(matches!(err, Error::NotFound { kind: "member", .. }));

    let appt = f
        .add_appointment(AppointmentDraft { end: now() + Duration::hours(3), ..draft })
        .unwrap();
    assert_eq!(appt.id, "appt-4");
}

#[test]
fn test_inventory_update_stamps_time() {
    let mut f = seeded();
    f.clock_mut().now = now() + Duration::days(1);
    let mut draft = InventoryDraft::from(f.inventory_items().iter().find(|i| i.id == "inv-4").unwrap());
    draft.quantity = 12;
    draft.status = StockStatus::InStock;
    let item = f.update_inventory_item("inv-4", draft).unwrap();
    assert_eq!(item.last_updated, now() + Duration::days(1));
}

#[test]
fn test_maintenance_needs_existing_house() {
    let mut f = seeded();
    let mut draft = MaintenanceDraft::from(f.maintenance_task("mt-1").unwrap());
    draft.house_id = "house-99".into();
    assert!(f.add_maintenance_task(draft).is_err());
}

#[test]
fn test_dashboard_from_demo_data() {
    let f = seeded();
    let d = f.dashboard();
    assert_eq!(d.active_members, 6);

    let urgent: Vec<&str> = d.urgent_maintenance.iter().map(|r| r.task.id.as_str()).collect();
    assert_eq!(urgent, vec!["mt-6"]);
    assert_eq!(d.urgent_maintenance[0].status, TaskStatus::Overdue);

    let soon: Vec<&str> = d.due_soon_maintenance.iter().map(|r| r.task.id.as_str()).collect();
    assert_eq!(soon, vec!["mt-2", "mt-5"]);

    assert_eq!(d.open_work_orders.len(), 2);
    assert_eq!(d.high_priority_work_orders.len(), 1);
    assert_eq!(d.high_priority_work_orders[0].id, "wo-1");
    assert_eq!(d.low_stock.len(), 1);
    assert_eq!(d.out_of_stock[0].id, "inv-4");
}

#[test]
fn test_maintenance_summary_per_active_house() {
    let f = seeded();
    let summary = f.maintenance_summary();
    let houses: Vec<&str> = summary.iter().map(|s| s.house.id.as_str()).collect();
    assert_eq!(houses, vec!["house-1", "house-2", "house-3"]);

    let oakwood = &summary[0];
    assert_eq!((oakwood.total, oakwood.overdue, oakwood.due_today, oakwood.due_soon), (3, 1, 0, 1));
    assert_eq!(oakwood.headline(), "2 tasks due or overdue");
    assert_eq!(summary[1].total, 2);
    assert_eq!(summary[1].headline(), "All tasks are up to date");
    assert_eq!(summary[2].headline(), "1 task due or overdue");
}

#[test]
fn test_completed_tasks_leave_the_summary_count() {
    let mut f = seeded();
    f.complete_maintenance_task("mt-6").unwrap();
    let summary = f.maintenance_summary();
    assert_eq!(summary[0].total, 3);
    assert_eq!(summary[0].needs_attention(), 1);
}

#[test]
fn test_inventory_summary_per_active_house() {
    let f = seeded();
    let summary = f.inventory_summary();
    let counts: Vec<(&str, usize, usize)> = summary
        .iter()
        .map(|s| (s.house.id.as_str(), s.total, s.short))
        .collect();
    assert_eq!(counts, vec![("house-1", 2, 1), ("house-2", 2, 1), ("house-3", 1, 0)]);
    assert_eq!(summary[0].headline(), "1 item running low or out of stock");
    assert_eq!(summary[2].headline(), "All items are in stock");
}
