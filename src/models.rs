use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;
use crate::clock::Clock;
use crate::error::{Error, Result};
use crate::schedule::{classify_status, next_due_date, Frequency, ScheduleState, TaskStatus};

/// A stored record with a prefixed string id (`house-3`, `mt-12`, ...).
pub trait Record {
    /// Id prefix for newly created records.
    const PREFIX: &'static str;
    /// Name used in error messages.
    const KIND: &'static str;

    fn id(&self) -> &str;
}

macro_rules! impl_record {
    ($ty:ty, $prefix:literal, $kind:literal) => {
        impl Record for $ty {
            const PREFIX: &'static str = $prefix;
            const KIND: &'static str = $kind;

            fn id(&self) -> &str {
                &self.id
            }
        }
    };
}

labelled_enum! {
    pub enum HouseStatus ("house status") {
        Active => "active",
        Archived => "archived",
    }
}

/// Street address of a house.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Address {
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip: String,
}

#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    pub lat: f64,
    pub lng: f64,
}

/// A property that members live in.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct House {
    pub id: String,
    pub name: String,
    pub address: Address,
    #[serde(default)]
    pub geo: Option<GeoPoint>,
    /// Number of beds.
    pub capacity: u32,
    pub status: HouseStatus,
    #[serde(default)]
    pub tags: Vec<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Editable fields of a house.
#[derive(Debug, Clone, PartialEq)]
pub struct HouseDraft {
    pub name: String,
    pub address: Address,
    pub geo: Option<GeoPoint>,
    pub capacity: u32,
    pub status: HouseStatus,
    pub tags: Vec<String>,
}

impl HouseDraft {
    pub fn new(name: impl Into<String>, capacity: u32) -> Self {
        HouseDraft {
            name: name.into(),
            address: Address::default(),
            geo: None,
            capacity,
            status: HouseStatus::Active,
            tags: Vec::new(),
        }
    }
}

impl From<&House> for HouseDraft {
    fn from(h: &House) -> Self {
        HouseDraft {
            name: h.name.clone(),
            address: h.address.clone(),
            geo: h.geo,
            capacity: h.capacity,
            status: h.status,
            tags: h.tags.clone(),
        }
    }
}

labelled_enum! {
    pub enum MemberStatus ("member status") {
        Active => "active",
        Inactive => "inactive",
        Archived => "archived",
    }
}

labelled_enum! {
    pub enum VeteranStatus ("veteran status") {
        Veteran => "veteran",
        Civilian => "civilian",
    }
}

labelled_enum! {
    pub enum BranchOfService ("branch of service") {
        Army => "army",
        Navy => "navy",
        AirForce => "air_force",
        MarineCorps => "marine_corps",
        CoastGuard => "coast_guard",
        SpaceForce => "space_force",
    }
}

labelled_enum! {
    pub enum MemberLabel ("label") {
        HouseLead => "house_lead",
        Member => "member",
        Staff => "staff",
        Patient => "patient",
        Other => "other",
    }
}

labelled_enum! {
    pub enum PaymentType ("payment type") {
        SelfPay => "self_pay",
        Sponsored => "sponsored",
    }
}

/// Financial and sponsorship details of a member.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Finances {
    pub monthly_bedspace_fee: Option<f64>,
    pub income_amount: Option<f64>,
    pub income_source: Option<String>,
    pub payment_type: Option<PaymentType>,
    pub sponsor_name: Option<String>,
    pub sponsorship_length: Option<String>,
}

/// Emergency contact, medication and consent details of a member.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct CareDetails {
    pub emergency_contact_name: Option<String>,
    pub emergency_contact_phone: Option<String>,
    #[serde(default)]
    pub media_release_completed: bool,
    #[serde(default)]
    pub on_medication: bool,
    pub medications: Option<String>,
}

/// A resident, patient or staff member.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Member {
    pub id: String,
    pub full_name: String,
    pub dob: Option<NaiveDate>,
    #[serde(default)]
    pub insurance_provider: String,
    #[serde(default)]
    pub phone: String,
    #[serde(default)]
    pub email: String,
    pub status: MemberStatus,
    pub veteran_status: VeteranStatus,
    #[serde(default)]
    pub branch_of_service: Option<BranchOfService>,
    pub label: MemberLabel,
    #[serde(default)]
    pub description: String,
    /// House the member is assigned to, `None` when unassigned.
    pub house_id: Option<String>,
    #[serde(default)]
    pub photo_url: String,
    #[serde(default)]
    pub finances: Finances,
    #[serde(default)]
    pub care: CareDetails,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Editable fields of a member.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberDraft {
    pub full_name: String,
    pub dob: Option<NaiveDate>,
    pub insurance_provider: String,
    pub phone: String,
    pub email: String,
    pub status: MemberStatus,
    pub veteran_status: VeteranStatus,
    pub branch_of_service: Option<BranchOfService>,
    pub label: MemberLabel,
    pub description: String,
    pub house_id: Option<String>,
    pub photo_url: String,
    pub finances: Finances,
    pub care: CareDetails,
}

impl MemberDraft {
    pub fn new(full_name: impl Into<String>) -> Self {
        MemberDraft {
            full_name: full_name.into(),
            dob: None,
            insurance_provider: String::new(),
            phone: String::new(),
            email: String::new(),
            status: MemberStatus::Active,
            veteran_status: VeteranStatus::Civilian,
            branch_of_service: None,
            label: MemberLabel::Member,
            description: String::new(),
            house_id: None,
            photo_url: String::new(),
            finances: Finances::default(),
            care: CareDetails::default(),
        }
    }
}

impl From<&Member> for MemberDraft {
    fn from(m: &Member) -> Self {
        MemberDraft {
            full_name: m.full_name.clone(),
            dob: m.dob,
            insurance_provider: m.insurance_provider.clone(),
            phone: m.phone.clone(),
            email: m.email.clone(),
            status: m.status,
            veteran_status: m.veteran_status,
            branch_of_service: m.branch_of_service,
            label: m.label,
            description: m.description.clone(),
            house_id: m.house_id.clone(),
            photo_url: m.photo_url.clone(),
            finances: m.finances.clone(),
            care: m.care.clone(),
        }
    }
}

labelled_enum! {
    pub enum WorkOrderStatus ("work order status") {
        Open => "open",
        InProgress => "in_progress",
        Completed => "completed",
        Cancelled => "cancelled",
    }
}

impl WorkOrderStatus {
    /// Open or in progress.
    pub fn is_open(&self) -> bool {
        matches!(self, WorkOrderStatus::Open | WorkOrderStatus::InProgress)
    }
}

labelled_enum! {
    pub enum WorkOrderPriority ("priority") {
        Low => "low",
        Medium => "medium",
        High => "high",
    }
}

/// A repair or chore request for a house.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct WorkOrder {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub description: String,
    pub house_id: String,
    pub status: WorkOrderStatus,
    pub priority: WorkOrderPriority,
    pub created_by: String,
    #[serde(default)]
    pub assigned_to: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Editable fields of a work order.
#[derive(Debug, Clone, PartialEq)]
pub struct WorkOrderDraft {
    pub title: String,
    pub description: String,
    pub house_id: String,
    pub status: WorkOrderStatus,
    pub priority: WorkOrderPriority,
    pub created_by: String,
    pub assigned_to: Option<String>,
}

impl From<&WorkOrder> for WorkOrderDraft {
    fn from(w: &WorkOrder) -> Self {
        WorkOrderDraft {
            title: w.title.clone(),
            description: w.description.clone(),
            house_id: w.house_id.clone(),
            status: w.status,
            priority: w.priority,
            created_by: w.created_by.clone(),
            assigned_to: w.assigned_to.clone(),
        }
    }
}

labelled_enum! {
    pub enum AppointmentStatus ("appointment status") {
        Scheduled => "scheduled",
        Completed => "completed",
        Cancelled => "cancelled",
        NoShow => "no_show",
    }
}

/// A member's appointment.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct Appointment {
    pub id: String,
    pub member_id: String,
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub status: AppointmentStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Editable fields of an appointment.
#[derive(Debug, Clone, PartialEq)]
pub struct AppointmentDraft {
    pub member_id: String,
    pub title: String,
    pub description: Option<String>,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub status: AppointmentStatus,
}

impl From<&Appointment> for AppointmentDraft {
    fn from(a: &Appointment) -> Self {
        AppointmentDraft {
            member_id: a.member_id.clone(),
            title: a.title.clone(),
            description: a.description.clone(),
            start: a.start,
            end: a.end,
            status: a.status,
        }
    }
}

/// A recurring upkeep task for a house.
///
/// `next_due_date` is always `last_completed_date` plus one `frequency`
/// period; the only way to change either is through [`MaintenanceTask::new`],
/// [`MaintenanceTask::reschedule`] or [`MaintenanceTask::complete`]. A stored
/// `next_due_date` is recomputed on load.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(from = "StoredTask")]
pub struct MaintenanceTask {
    pub id: String,
    pub house_id: String,
    pub task_name: String,
    #[serde(default)]
    pub description: String,
    frequency: Frequency,
    last_completed_date: DateTime<Utc>,
    next_due_date: DateTime<Utc>,
    #[serde(default)]
    state: ScheduleState,
}

impl MaintenanceTask {
    pub fn new(
        id: impl Into<String>,
        house_id: impl Into<String>,
        task_name: impl Into<String>,
        description: impl Into<String>,
        frequency: Frequency,
        last_completed_date: DateTime<Utc>,
    ) -> Self {
        MaintenanceTask {
            id: id.into(),
            house_id: house_id.into(),
            task_name: task_name.into(),
            description: description.into(),
            frequency,
            last_completed_date,
            next_due_date: next_due_date(last_completed_date, frequency),
            state: ScheduleState::Derived,
        }
    }

    pub fn frequency(&self) -> Frequency {
        self.frequency
    }

    pub fn last_completed_date(&self) -> DateTime<Utc> {
        self.last_completed_date
    }

    pub fn next_due_date(&self) -> DateTime<Utc> {
        self.next_due_date
    }

    pub fn state(&self) -> ScheduleState {
        self.state
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.state, ScheduleState::Completed { .. })
    }

    /// Status on the clock's current day: sticky `Completed`, otherwise
    /// derived from the due date's calendar day in the clock's zone.
    pub fn status_on<C: Clock + ?Sized>(&self, clock: &C) -> TaskStatus {
        match self.state {
            ScheduleState::Completed { .. } => TaskStatus::Completed,
            ScheduleState::Derived => classify_status(clock.local(self.next_due_date), clock.today()).into(),
        }
    }

    /// Changes the schedule inputs and recomputes the due date. The completion
    /// state is left alone.
    pub fn reschedule(&mut self, last_completed_date: DateTime<Utc>, frequency: Frequency) {
        self.last_completed_date = last_completed_date;
        self.frequency = frequency;
        self.next_due_date = next_due_date(last_completed_date, frequency);
    }

    /// Records the task as done at `now`. Completing an already completed
    /// task restarts the period from `now`.
    pub fn complete(&mut self, now: DateTime<Utc>) {
        self.reschedule(now, self.frequency);
        self.state = ScheduleState::Completed { completed_at: now };
    }

    /// Drops the completed state; the due date is kept as is.
    pub fn revert(&mut self) {
        self.state = ScheduleState::Derived;
    }
}

/// On-disk shape of a maintenance task. The due date is derived, so whatever
/// the file says is only compared against the recomputed value.
#[derive(Deserialize)]
struct StoredTask {
    id: String,
    house_id: String,
    task_name: String,
    #[serde(default)]
    description: String,
    frequency: Frequency,
    last_completed_date: DateTime<Utc>,
    #[serde(default)]
    next_due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    state: ScheduleState,
}

impl From<StoredTask> for MaintenanceTask {
    fn from(s: StoredTask) -> Self {
        let mut task = MaintenanceTask::new(
            s.id,
            s.house_id,
            s.task_name,
            s.description,
            s.frequency,
            s.last_completed_date,
        );
        task.state = s.state;
        if let Some(stored) = s.next_due_date {
            if stored != task.next_due_date {
                warn!(id = %task.id, %stored, recomputed = %task.next_due_date, "stored due date disagrees with schedule; using recomputed");
            }
        }
        task
    }
}

/// Editable fields of a maintenance task.
#[derive(Debug, Clone, PartialEq)]
pub struct MaintenanceDraft {
    pub house_id: String,
    pub task_name: String,
    pub description: String,
    pub frequency: Frequency,
    pub last_completed_date: DateTime<Utc>,
}

impl From<&MaintenanceTask> for MaintenanceDraft {
    fn from(t: &MaintenanceTask) -> Self {
        MaintenanceDraft {
            house_id: t.house_id.clone(),
            task_name: t.task_name.clone(),
            description: t.description.clone(),
            frequency: t.frequency,
            last_completed_date: t.last_completed_date,
        }
    }
}

labelled_enum! {
    pub enum StockStatus ("stock status") {
        InStock => "in_stock",
        LowStock => "low_stock",
        OutOfStock => "out_of_stock",
    }
}

impl StockStatus {
    pub fn display_name(&self) -> &'static str {
        match self {
            StockStatus::InStock => "In Stock",
            StockStatus::LowStock => "Low Stock",
            StockStatus::OutOfStock => "Out of Stock",
        }
    }
}

/// A consumable kept at a house.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct InventoryItem {
    pub id: String,
    pub house_id: String,
    pub name: String,
    pub quantity: u32,
    pub status: StockStatus,
    pub last_updated: DateTime<Utc>,
}

/// Editable fields of an inventory item.
#[derive(Debug, Clone, PartialEq)]
pub struct InventoryDraft {
    pub house_id: String,
    pub name: String,
    pub quantity: u32,
    pub status: StockStatus,
}

impl From<&InventoryItem> for InventoryDraft {
    fn from(i: &InventoryItem) -> Self {
        InventoryDraft {
            house_id: i.house_id.clone(),
            name: i.name.clone(),
            quantity: i.quantity,
            status: i.status,
        }
    }
}

impl_record!(House, "house", "house");
impl_record!(Member, "member", "member");
impl_record!(WorkOrder, "wo", "work order");
impl_record!(Appointment, "appt", "appointment");
impl_record!(MaintenanceTask, "mt", "maintenance task");
impl_record!(InventoryItem, "inv", "inventory item");

/// Every record kept by the application.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq)]
pub struct Dataset {
    #[serde(default)]
    pub houses: Vec<House>,
    #[serde(default)]
    pub members: Vec<Member>,
    #[serde(default)]
    pub work_orders: Vec<WorkOrder>,
    #[serde(default)]
    pub appointments: Vec<Appointment>,
    #[serde(default)]
    pub maintenance_tasks: Vec<MaintenanceTask>,
    #[serde(default)]
    pub inventory_items: Vec<InventoryItem>,
}

impl Dataset {
    pub fn is_empty(&self) -> bool {
        self.houses.is_empty()
            && self.members.is_empty()
            && self.work_orders.is_empty()
            && self.appointments.is_empty()
            && self.maintenance_tasks.is_empty()
            && self.inventory_items.is_empty()
    }
}

/// Next free id for a collection: `<prefix>-<largest numeric suffix + 1>`.
///
/// Fails when the largest suffix is already `u64::MAX`.
pub fn next_id<T: Record>(items: &[T]) -> Result<String> {
    let prefix = format!("{}-", T::PREFIX);
    let max = items
        .iter()
        .filter_map(|r| r.id().strip_prefix(&prefix))
        .filter_map(|n| n.parse::<u64>().ok())
        .max()
        .unwrap_or(0);
    let next = max.checked_add(1).ok_or_else(|| {
        Error::Validation(format!("no {} ids left after '{}{}'", T::KIND, prefix, max))
    })?;
    Ok(format!("{}{}", prefix, next))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn task(id: &str) -> MaintenanceTask {
        let t = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        MaintenanceTask::new(id, "house-1", "Filter", "", Frequency::Monthly, t)
    }

    #[test]
    fn next_id_follows_largest_suffix() {
        let items = vec![task("mt-2"), task("mt-10"), task("custom")];
        assert_eq!(next_id(&items).unwrap(), "mt-11");
        assert_eq!(next_id::<MaintenanceTask>(&[]).unwrap(), "mt-1");
    }

    #[test]
    fn next_id_refuses_to_wrap() {
        let items = vec![task(&format!("mt-{}", u64::MAX))];
        assert!(matches!(next_id(&items), Err(Error::Validation(_))));
    }

    #[test]
    fn loading_recomputes_next_due_date() {
        let json = r#"{
            "id": "mt-1",
            "house_id": "house-1",
            "task_name": "Filter",
            "frequency": "monthly",
            "last_completed_date": "2024-01-15T09:00:00Z",
            "next_due_date": "2030-01-01T00:00:00Z",
            "state": {"state": "derived"}
        }"#;
        let t: MaintenanceTask = serde_json::from_str(json).unwrap();
        assert_eq!(t.next_due_date(), Utc.with_ymd_and_hms(2024, 2, 15, 9, 0, 0).unwrap());
        assert!(!t.is_completed());
    }

    #[test]
    fn reschedule_keeps_completed_state() {
        let mut t = task("mt-1");
        let now = Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap();
        t.complete(now);
        t.reschedule(now, Frequency::Weekly);
        assert!(t.is_completed());
        assert_eq!(t.next_due_date(), Utc.with_ymd_and_hms(2024, 3, 8, 9, 0, 0).unwrap());
    }
}
