//! Sample records for trying the application out.

use chrono::{DateTime, Duration, Months, NaiveDate, TimeZone, Utc};
use crate::models::*;
use crate::schedule::Frequency;

fn fixed(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, 0, 0)
        .single()
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

fn house(n: u32, name: &str, street: &str, zip: &str, capacity: u32, status: HouseStatus, tags: &[&str], now: DateTime<Utc>) -> House {
    House {
        id: format!("house-{}", n),
        name: name.into(),
        address: Address {
            street: street.into(),
            city: "Metropolis".into(),
            state: "NY".into(),
            zip: zip.into(),
        },
        geo: None,
        capacity,
        status,
        tags: tags.iter().map(|t| t.to_string()).collect(),
        created_at: now,
        updated_at: now,
    }
}

struct MemberSeed<'a> {
    n: u32,
    name: &'a str,
    dob: (i32, u32, u32),
    insurer: &'a str,
    status: MemberStatus,
    branch: Option<BranchOfService>,
    label: MemberLabel,
    description: &'a str,
    house: Option<u32>,
    media_release: bool,
    medications: Option<&'a str>,
}

fn member(s: MemberSeed<'_>, now: DateTime<Utc>) -> Member {
    let email = format!("{}@email.com", s.name.to_lowercase().replace(' ', "."));
    Member {
        id: format!("member-{}", s.n),
        full_name: s.name.into(),
        dob: NaiveDate::from_ymd_opt(s.dob.0, s.dob.1, s.dob.2),
        insurance_provider: s.insurer.into(),
        phone: format!("555-01{:02}", s.n),
        email,
        status: s.status,
        veteran_status: if s.branch.is_some() { VeteranStatus::Veteran } else { VeteranStatus::Civilian },
        branch_of_service: s.branch,
        label: s.label,
        description: s.description.into(),
        house_id: s.house.map(|h| format!("house-{}", h)),
        photo_url: format!("https://picsum.photos/seed/member-{}/100", s.n),
        finances: Finances::default(),
        care: CareDetails {
            media_release_completed: s.media_release,
            on_medication: s.medications.is_some(),
            medications: s.medications.map(str::to_string),
            ..CareDetails::default()
        },
        created_at: now,
        updated_at: now,
    }
}

/// The demo facility: four houses, seven members, and a handful of work
/// orders, appointments, maintenance tasks and inventory items. Relative
/// dates (appointments, recently serviced tasks) are computed from `now`.
pub fn demo_dataset(now: DateTime<Utc>) -> Dataset {
    let day = Duration::days(1);

    let houses = vec![
        house(1, "Oakwood Residence", "123 Oak Ave", "10001", 8, HouseStatus::Active, &["Sober Living", "Male"], now),
        house(2, "Maple Creek Manor", "456 Maple Dr", "10002", 6, HouseStatus::Active, &["Transitional", "Female"], now),
        house(3, "Pine Ridge Place", "789 Pine St", "10003", 10, HouseStatus::Active, &["Veteran", "Male"], now),
        house(4, "Willow Creek Cottage", "101 Willow Ln", "10004", 4, HouseStatus::Archived, &["Sober Living"], now),
    ];

    let seeds = [
        MemberSeed { n: 1, name: "John Doe", dob: (1985, 5, 15), insurer: "Blue Cross", status: MemberStatus::Active, branch: Some(BranchOfService::Army), label: MemberLabel::HouseLead, description: "Lead at Oakwood.", house: Some(1), media_release: true, medications: Some("Lisinopril 10mg, Metformin 500mg") },
        MemberSeed { n: 2, name: "Jane Smith", dob: (1990, 8, 22), insurer: "Aetna", status: MemberStatus::Active, branch: None, label: MemberLabel::Member, description: "New resident.", house: Some(2), media_release: false, medications: None },
        MemberSeed { n: 3, name: "Peter Jones", dob: (1978, 11, 30), insurer: "Cigna", status: MemberStatus::Active, branch: Some(BranchOfService::MarineCorps), label: MemberLabel::Member, description: "", house: Some(1), media_release: true, medications: Some("Aspirin 81mg daily") },
        MemberSeed { n: 4, name: "Mary Williams", dob: (1992, 2, 10), insurer: "UnitedHealth", status: MemberStatus::Active, branch: None, label: MemberLabel::Member, description: "", house: Some(2), media_release: false, medications: None },
        MemberSeed { n: 5, name: "David Brown", dob: (1988, 7, 19), insurer: "Humana", status: MemberStatus::Active, branch: Some(BranchOfService::AirForce), label: MemberLabel::Member, description: "", house: Some(3), media_release: true, medications: Some("Ibuprofen as needed") },
        MemberSeed { n: 6, name: "Susan Garcia", dob: (1995, 1, 5), insurer: "Kaiser", status: MemberStatus::Inactive, branch: None, label: MemberLabel::Staff, description: "On leave.", house: Some(3), media_release: false, medications: None },
        MemberSeed { n: 7, name: "Unassigned Patient", dob: (2000, 1, 1), insurer: "None", status: MemberStatus::Active, branch: None, label: MemberLabel::Patient, description: "Waiting for assignment.", house: None, media_release: true, medications: None },
    ];
    let mut members: Vec<Member> = seeds.into_iter().map(|s| member(s, now)).collect();
    if let Some(john) = members.first_mut() {
        john.finances = Finances {
            monthly_bedspace_fee: Some(750.0),
            income_amount: Some(1200.0),
            income_source: Some("VA Disability".into()),
            payment_type: Some(PaymentType::SelfPay),
            ..Finances::default()
        };
        john.care.emergency_contact_name = Some("Sarah Doe".into());
        john.care.emergency_contact_phone = Some("555-0111".into());
    }
    if let Some(jane) = members.get_mut(1) {
        jane.finances = Finances {
            monthly_bedspace_fee: Some(700.0),
            income_amount: Some(800.0),
            income_source: Some("Part-time job".into()),
            payment_type: Some(PaymentType::Sponsored),
            sponsor_name: Some("Local Charity Foundation".into()),
            sponsorship_length: Some("6 months".into()),
        };
        jane.care.emergency_contact_name = Some("Robert Smith".into());
        jane.care.emergency_contact_phone = Some("555-0112".into());
    }

    let work_order = |n: u32, title: &str, description: &str, house: u32, status: WorkOrderStatus, priority: WorkOrderPriority, by: &str, to: Option<&str>, created: DateTime<Utc>, updated: DateTime<Utc>| WorkOrder {
        id: format!("wo-{}", n),
        title: title.into(),
        description: description.into(),
        house_id: format!("house-{}", house),
        status,
        priority,
        created_by: by.into(),
        assigned_to: to.map(str::to_string),
        created_at: created,
        updated_at: updated,
    };
    let work_orders = vec![
        work_order(1, "Fix leaky faucet in kitchen", "The main kitchen sink has a constant drip.", 1, WorkOrderStatus::Open, WorkOrderPriority::High, "John Doe", None, fixed(2023, 10, 26, 10), fixed(2023, 10, 26, 10)),
        work_order(2, "Replace porch lightbulb", "", 2, WorkOrderStatus::InProgress, WorkOrderPriority::Low, "Susan Garcia", Some("John Doe"), fixed(2023, 10, 25, 14), fixed(2023, 10, 26, 11)),
        work_order(3, "Mow the lawn", "Front and back yards need mowing.", 1, WorkOrderStatus::Completed, WorkOrderPriority::Medium, "John Doe", Some("Peter Jones"), fixed(2023, 10, 24, 9), fixed(2023, 10, 25, 16)),
        work_order(4, "Test smoke detectors", "Test all smoke and CO detectors in the house.", 3, WorkOrderStatus::Cancelled, WorkOrderPriority::Medium, "David Brown", None, fixed(2023, 10, 23, 11), fixed(2023, 10, 23, 12)),
    ];

    let appointment = |n: u32, member: u32, title: &str, start: DateTime<Utc>, minutes: i64, status: AppointmentStatus| Appointment {
        id: format!("appt-{}", n),
        member_id: format!("member-{}", member),
        title: title.into(),
        description: None,
        start,
        end: start + Duration::minutes(minutes),
        status,
        created_at: now,
        updated_at: now,
    };
    let appointments = vec![
        appointment(1, 1, "Therapy Session", now + day * 2, 60, AppointmentStatus::Scheduled),
        appointment(2, 2, "Doctor's Appointment", now - day, 45, AppointmentStatus::Completed),
        appointment(3, 3, "VA Follow-up", now + day, 60, AppointmentStatus::Scheduled),
    ];

    // Serviced so that the next visit falls three days from now.
    let pest_control_done = (now + day * 3)
        .checked_sub_months(Months::new(3))
        .unwrap_or(now);
    let maintenance_tasks = vec![
        MaintenanceTask::new("mt-1", "house-1", "HVAC Filter Replacement", "", Frequency::Quarterly, fixed(2024, 7, 1, 10)),
        MaintenanceTask::new("mt-2", "house-1", "Smoke Detector Test", "", Frequency::Monthly, now - day * 30),
        MaintenanceTask::new("mt-3", "house-2", "Gutter Cleaning", "", Frequency::SemiAnnually, fixed(2024, 3, 20, 10)),
        MaintenanceTask::new("mt-4", "house-2", "Fire Extinguisher Check", "", Frequency::Annually, fixed(2024, 1, 10, 10)),
        MaintenanceTask::new("mt-5", "house-3", "Yard Pest Control", "", Frequency::Quarterly, pest_control_done),
        MaintenanceTask::new("mt-6", "house-1", "Plumbing Inspection", "", Frequency::Annually, fixed(2023, 5, 1, 10)),
    ];

    let item = |n: u32, house: u32, name: &str, quantity: u32, status: StockStatus| InventoryItem {
        id: format!("inv-{}", n),
        house_id: format!("house-{}", house),
        name: name.into(),
        quantity,
        status,
        last_updated: now,
    };
    let inventory_items = vec![
        item(1, 1, "Paper Towels", 10, StockStatus::InStock),
        item(2, 1, "Toilet Paper", 2, StockStatus::LowStock),
        item(3, 2, "Cleaning Spray", 5, StockStatus::InStock),
        item(4, 2, "Trash Bags", 0, StockStatus::OutOfStock),
        item(5, 3, "Light Bulbs", 20, StockStatus::InStock),
    ];

    Dataset {
        houses,
        members,
        work_orders,
        appointments,
        maintenance_tasks,
        inventory_items,
    }
}
