use std::io::{self, Write};
use std::str::FromStr;
use chrono::{DateTime, Datelike, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use clap::Args;
use comfy_table::presets::UTF8_FULL;
use comfy_table::{Attribute, Cell, Color, ContentArrangement, Table};
use crate::board;
use crate::calendar::{appointments_by_day, month_grid, month_start, shift_month};
use crate::clock::Clock;
use crate::error::{Error, Result};
use crate::facility::Facility;
use crate::filter::{search_appointments, HouseFilter, HouseItemFilter, MemberFilter, SearchTerm, WorkOrderFilter};
use crate::models::*;
use crate::schedule::{days_until, TaskStatus};
use crate::seed::demo_dataset;
use crate::storage::Repository;

/// Parses an RFC 3339 timestamp, or a `YYYY-MM-DD HH:MM` / `YYYY-MM-DD`
/// wall-clock time in the clock's zone (a bare date is local midnight).
pub fn parse_instant<C: Clock + ?Sized>(s: &str, clock: &C) -> Result<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.with_timezone(&Utc));
    }
    let local = ["%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .map(|d| d.and_time(NaiveTime::MIN))
        });
    local
        .and_then(|dt| clock.from_local(dt))
        .ok_or_else(|| Error::InvalidDate(s.to_string()))
}

fn parse_date(s: &str) -> Result<NaiveDate> {
    NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d").map_err(|_| Error::InvalidDate(s.to_string()))
}

/// Parses an optional field value.
fn parse_field<T: FromStr<Err = Error>>(value: Option<&str>) -> Result<Option<T>> {
    value.map(|v| v.parse::<T>()).transpose()
}

/// Parses a list filter; `all` (or no value) means no filtering.
fn parse_filter<T: FromStr<Err = Error>>(value: Option<&str>) -> Result<Option<T>> {
    match value {
        Some(v) if v.trim().eq_ignore_ascii_case("all") => Ok(None),
        other => parse_field(other),
    }
}

fn header(cols: &[&str]) -> Vec<Cell> {
    cols.iter()
        .map(|c| Cell::new(c).add_attribute(Attribute::Bold))
        .collect()
}

fn new_table(cols: &[&str]) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header(cols));
    table
}

fn status_color(status: TaskStatus) -> Color {
    match status {
        TaskStatus::Overdue => Color::Red,
        TaskStatus::DueToday | TaskStatus::DueSoon => Color::Yellow,
        TaskStatus::Upcoming => Color::Blue,
        TaskStatus::Completed => Color::Green,
    }
}

fn title_case(label: &str) -> String {
    label
        .split([' ', '_', '-'])
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(c) => c.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

fn fmt_date<C: Clock>(clock: &C, dt: DateTime<Utc>) -> String {
    clock.local(dt).format("%b %-d, %Y").to_string()
}

fn fmt_time<C: Clock>(clock: &C, dt: DateTime<Utc>, fmt: &str) -> String {
    clock.local(dt).format(fmt).to_string()
}

fn house_name<R: Repository, C: Clock>(f: &Facility<R, C>, id: Option<&str>) -> String {
    match id {
        Some(id) => f.house(id).map(|h| h.name.clone()).unwrap_or_else(|| id.to_string()),
        None => "-".into(),
    }
}

// Houses

#[derive(Args, Debug, Clone, Default)]
pub struct HouseFields {
    /// Street address
    #[arg(long)]
    pub street: Option<String>,
    #[arg(long)]
    pub city: Option<String>,
    /// State or region
    #[arg(long)]
    pub state: Option<String>,
    #[arg(long)]
    pub zip: Option<String>,
    /// Tag (repeatable); replaces all tags when given
    #[arg(short, long = "tag")]
    pub tags: Vec<String>,
    /// active or archived
    #[arg(long)]
    pub status: Option<String>,
}

impl HouseFields {
    fn apply(&self, draft: &mut HouseDraft) -> Result<()> {
        if let Some(v) = &self.street { draft.address.street = v.clone(); }
        if let Some(v) = &self.city { draft.address.city = v.clone(); }
        if let Some(v) = &self.state { draft.address.state = v.clone(); }
        if let Some(v) = &self.zip { draft.address.zip = v.clone(); }
        if !self.tags.is_empty() { draft.tags = self.tags.clone(); }
        if let Some(s) = parse_field(self.status.as_deref())? { draft.status = s; }
        Ok(())
    }
}

/// Adds a new house.
pub fn cmd_house_add<R: Repository, C: Clock>(f: &mut Facility<R, C>, name: String, capacity: u32, fields: &HouseFields) -> Result<()> {
    let mut draft = HouseDraft::new(name, capacity);
    fields.apply(&mut draft)?;
    let house = f.add_house(draft)?;
    println!("House added (id = {})", house.id);
    Ok(())
}

/// Edits an existing house; only given fields change.
pub fn cmd_house_edit<R: Repository, C: Clock>(f: &mut Facility<R, C>, id: &str, name: Option<String>, capacity: Option<u32>, fields: &HouseFields) -> Result<()> {
    let current = f.house(id).ok_or_else(|| Error::not_found(House::KIND, id))?;
    let mut draft = HouseDraft::from(current);
    if let Some(n) = name { draft.name = n; }
    if let Some(c) = capacity { draft.capacity = c; }
    fields.apply(&mut draft)?;
    f.update_house(id, draft)?;
    println!("House {} updated.", id);
    Ok(())
}

/// Lists houses with occupancy. Defaults to active houses.
pub fn cmd_house_list<R: Repository, C: Clock>(f: &Facility<R, C>, status: Option<&str>, search: &str) -> Result<()> {
    let filter = HouseFilter {
        status: match status {
            None => Some(HouseStatus::Active),
            s => parse_filter(s)?,
        },
        term: SearchTerm::new(search),
    };
    let houses = filter.apply(f.data());
    if houses.is_empty() {
        println!("No houses found.");
        return Ok(());
    }
    let mut table = new_table(&["ID", "Name", "Address", "Residents", "Status", "Tags"]);
    for h in houses {
        let occupants = f.member_count(&h.id);
        let full = occupants as u32 >= h.capacity;
        table.add_row(vec![
            Cell::new(&h.id),
            Cell::new(&h.name),
            Cell::new(format!("{}, {} {} {}", h.address.street, h.address.city, h.address.state, h.address.zip)),
            Cell::new(format!("{} / {}", occupants, h.capacity)).fg(if full { Color::Yellow } else { Color::Reset }),
            Cell::new(title_case(h.status.as_str())),
            Cell::new(h.tags.join(", ")),
        ]);
    }
    println!("{table}");
    Ok(())
}

// Members

#[derive(Args, Debug, Clone, Default)]
pub struct MemberFields {
    /// House id to assign to
    #[arg(long)]
    pub house: Option<String>,
    /// house_lead, member, staff, patient or other
    #[arg(short, long)]
    pub label: Option<String>,
    /// active, inactive or archived
    #[arg(long)]
    pub status: Option<String>,
    /// Branch of service; marks the member as a veteran
    #[arg(long)]
    pub branch: Option<String>,
    /// Mark the member as a civilian (clears branch)
    #[arg(long, conflicts_with = "branch")]
    pub civilian: bool,
    /// Date of birth, YYYY-MM-DD
    #[arg(long)]
    pub dob: Option<String>,
    #[arg(long)]
    pub phone: Option<String>,
    #[arg(long)]
    pub email: Option<String>,
    #[arg(long)]
    pub insurance: Option<String>,
    #[arg(short, long)]
    pub description: Option<String>,
    /// Current medications; marks the member as on medication
    #[arg(long)]
    pub medications: Option<String>,
    #[arg(long)]
    pub emergency_contact: Option<String>,
    #[arg(long)]
    pub emergency_phone: Option<String>,
}

impl MemberFields {
    fn apply(&self, draft: &mut MemberDraft) -> Result<()> {
        if let Some(h) = &self.house { draft.house_id = Some(h.clone()); }
        if let Some(l) = parse_field(self.label.as_deref())? { draft.label = l; }
        if let Some(s) = parse_field(self.status.as_deref())? { draft.status = s; }
        if let Some(b) = parse_field::<BranchOfService>(self.branch.as_deref())? {
            draft.branch_of_service = Some(b);
            draft.veteran_status = VeteranStatus::Veteran;
        }
        if self.civilian {
            draft.branch_of_service = None;
            draft.veteran_status = VeteranStatus::Civilian;
        }
        if let Some(d) = &self.dob { draft.dob = Some(parse_date(d)?); }
        if let Some(v) = &self.phone { draft.phone = v.clone(); }
        if let Some(v) = &self.email { draft.email = v.clone(); }
        if let Some(v) = &self.insurance { draft.insurance_provider = v.clone(); }
        if let Some(v) = &self.description { draft.description = v.clone(); }
        if let Some(v) = &self.medications {
            draft.care.on_medication = !v.trim().is_empty();
            draft.care.medications = Some(v.clone()).filter(|m| !m.trim().is_empty());
        }
        if let Some(v) = &self.emergency_contact { draft.care.emergency_contact_name = Some(v.clone()); }
        if let Some(v) = &self.emergency_phone { draft.care.emergency_contact_phone = Some(v.clone()); }
        Ok(())
    }
}

#[derive(Args, Debug, Clone, Default)]
pub struct MemberQuery {
    /// Filter by status (or "all")
    #[arg(long)]
    pub status: Option<String>,
    /// Filter by veteran status (veteran, civilian or "all")
    #[arg(long)]
    pub veteran: Option<String>,
    /// Filter by label (or "all")
    #[arg(short, long)]
    pub label: Option<String>,
    /// Search name, email, phone, description or house name
    #[arg(short, long, default_value = "")]
    pub search: String,
}

impl MemberQuery {
    fn to_filter(&self) -> Result<MemberFilter> {
        Ok(MemberFilter {
            status: parse_filter(self.status.as_deref())?,
            veteran_status: parse_filter(self.veteran.as_deref())?,
            label: parse_filter(self.label.as_deref())?,
            term: SearchTerm::new(&self.search),
        })
    }
}

pub fn cmd_member_add<R: Repository, C: Clock>(f: &mut Facility<R, C>, name: String, fields: &MemberFields) -> Result<()> {
    let mut draft = MemberDraft::new(name);
    fields.apply(&mut draft)?;
    let member = f.add_member(draft)?;
    println!("Member added (id = {})", member.id);
    Ok(())
}

pub fn cmd_member_edit<R: Repository, C: Clock>(f: &mut Facility<R, C>, id: &str, name: Option<String>, fields: &MemberFields) -> Result<()> {
    let current = f.member(id).ok_or_else(|| Error::not_found(Member::KIND, id))?;
    let mut draft = MemberDraft::from(current);
    if let Some(n) = name { draft.full_name = n; }
    fields.apply(&mut draft)?;
    f.update_member(id, draft)?;
    println!("Member {} updated.", id);
    Ok(())
}

pub fn cmd_member_archive<R: Repository, C: Clock>(f: &mut Facility<R, C>, id: &str) -> Result<()> {
    f.archive_member(id)?;
    println!("Member {} archived.", id);
    Ok(())
}

pub fn cmd_member_list<R: Repository, C: Clock>(f: &Facility<R, C>, query: &MemberQuery) -> Result<()> {
    let members = query.to_filter()?.apply(f.data());
    if members.is_empty() {
        println!("No members found.");
        return Ok(());
    }
    let mut table = new_table(&["ID", "Name", "Label", "House", "Veteran", "Phone", "Email", "Status"]);
    for m in members {
        let veteran = match m.branch_of_service {
            Some(b) => title_case(b.as_str()),
            None => title_case(m.veteran_status.as_str()),
        };
        let member_color = match m.status {
            MemberStatus::Active => Color::Green,
            MemberStatus::Inactive => Color::Yellow,
            MemberStatus::Archived => Color::Grey,
        };
        table.add_row(vec![
            Cell::new(&m.id),
            Cell::new(&m.full_name),
            Cell::new(title_case(m.label.as_str())),
            Cell::new(house_name(f, m.house_id.as_deref())),
            Cell::new(veteran),
            Cell::new(&m.phone),
            Cell::new(&m.email),
            Cell::new(title_case(m.status.as_str())).fg(member_color),
        ]);
    }
    println!("{table}");
    Ok(())
}

/// Moves a member to a house, or unassigns them when `house` is `None`.
pub fn cmd_assign<R: Repository, C: Clock>(f: &mut Facility<R, C>, member_id: &str, house: Option<&str>) -> Result<()> {
    if f.move_member(member_id, house)? {
        let target = match house {
            Some(_) => house_name(f, house),
            None => "Unassigned".to_string(),
        };
        println!("Member {} moved to {}.", member_id, target);
    } else {
        println!("Member {} is already there.", member_id);
    }
    Ok(())
}

/// Prints the assignment board, one column per active house.
pub fn cmd_board<R: Repository, C: Clock>(f: &Facility<R, C>, query: &MemberQuery) -> Result<()> {
    let filter = query.to_filter()?;
    let columns = board::build(f.data(), &filter);
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(columns.iter().map(|c| {
            Cell::new(format!("{}\n{}", c.column.title(), c.headline())).add_attribute(Attribute::Bold)
        }));
    let depth = columns.iter().map(|c| c.members.len()).max().unwrap_or(0);
    for row in 0..depth {
        table.add_row(columns.iter().map(|c| match c.members.get(row) {
            Some(m) => Cell::new(format!("{} ({})\n{}", m.full_name, m.id, title_case(m.label.as_str()))),
            None => Cell::new(""),
        }));
    }
    println!("{table}");
    Ok(())
}

// Work orders

#[derive(Args, Debug, Clone, Default)]
pub struct WorkOrderFields {
    #[arg(short, long)]
    pub description: Option<String>,
    /// low, medium or high
    #[arg(short, long)]
    pub priority: Option<String>,
    /// open, in_progress, completed or cancelled
    #[arg(long)]
    pub status: Option<String>,
    /// Person responsible
    #[arg(short, long)]
    pub assign: Option<String>,
}

impl WorkOrderFields {
    fn apply(&self, draft: &mut WorkOrderDraft) -> Result<()> {
        if let Some(v) = &self.description { draft.description = v.clone(); }
        if let Some(p) = parse_field(self.priority.as_deref())? { draft.priority = p; }
        if let Some(s) = parse_field(self.status.as_deref())? { draft.status = s; }
        if let Some(a) = &self.assign {
            draft.assigned_to = Some(a.clone()).filter(|a| !a.trim().is_empty());
        }
        Ok(())
    }
}

pub fn cmd_work_order_add<R: Repository, C: Clock>(f: &mut Facility<R, C>, title: String, house: String, created_by: String, fields: &WorkOrderFields) -> Result<()> {
    let mut draft = WorkOrderDraft {
        title,
        description: String::new(),
        house_id: house,
        status: WorkOrderStatus::Open,
        priority: WorkOrderPriority::Medium,
        created_by,
        assigned_to: None,
    };
    fields.apply(&mut draft)?;
    let wo = f.add_work_order(draft)?;
    println!("Work order added (id = {})", wo.id);
    Ok(())
}

pub fn cmd_work_order_edit<R: Repository, C: Clock>(f: &mut Facility<R, C>, id: &str, title: Option<String>, house: Option<String>, fields: &WorkOrderFields) -> Result<()> {
    let current = f
        .work_orders()
        .iter()
        .find(|w| w.id == id)
        .ok_or_else(|| Error::not_found(WorkOrder::KIND, id))?;
    let mut draft = WorkOrderDraft::from(current);
    if let Some(t) = title { draft.title = t; }
    if let Some(h) = house { draft.house_id = h; }
    fields.apply(&mut draft)?;
    f.update_work_order(id, draft)?;
    println!("Work order {} updated.", id);
    Ok(())
}

pub fn cmd_work_order_list<R: Repository, C: Clock>(f: &Facility<R, C>, status: Option<&str>, priority: Option<&str>, house: Option<String>, search: &str) -> Result<()> {
    let filter = WorkOrderFilter {
        status: parse_filter(status)?,
        priority: parse_filter(priority)?,
        house_id: house.filter(|h| !h.eq_ignore_ascii_case("all")),
        term: SearchTerm::new(search),
    };
    let orders = filter.apply(f.data());
    if orders.is_empty() {
        println!("No work orders found.");
        return Ok(());
    }
    let mut table = new_table(&["ID", "Title", "House", "Priority", "Status", "Created By", "Assigned To", "Created"]);
    for wo in orders {
        let priority_color = match wo.priority {
            WorkOrderPriority::High => Color::Red,
            WorkOrderPriority::Medium => Color::Yellow,
            WorkOrderPriority::Low => Color::Grey,
        };
        let wo_color = match wo.status {
            WorkOrderStatus::Open => Color::Blue,
            WorkOrderStatus::InProgress => Color::Yellow,
            WorkOrderStatus::Completed => Color::Green,
            WorkOrderStatus::Cancelled => Color::Grey,
        };
        table.add_row(vec![
            Cell::new(&wo.id),
            Cell::new(&wo.title),
            Cell::new(house_name(f, Some(&wo.house_id))),
            Cell::new(title_case(wo.priority.as_str())).fg(priority_color),
            Cell::new(title_case(wo.status.as_str())).fg(wo_color),
            Cell::new(&wo.created_by),
            Cell::new(wo.assigned_to.as_deref().unwrap_or("-")),
            Cell::new(fmt_date(f.clock(), wo.created_at)),
        ]);
    }
    println!("{table}");
    Ok(())
}

// Appointments

pub fn cmd_appointment_add<R: Repository, C: Clock>(f: &mut Facility<R, C>, title: String, member: String, start: &str, end: &str, description: Option<String>) -> Result<()> {
    let draft = AppointmentDraft {
        member_id: member,
        title,
        description: description.filter(|d| !d.trim().is_empty()),
        start: parse_instant(start, f.clock())?,
        end: parse_instant(end, f.clock())?,
        status: AppointmentStatus::Scheduled,
    };
    let appt = f.add_appointment(draft)?;
    println!("Appointment added (id = {})", appt.id);
    Ok(())
}

#[derive(Args, Debug, Clone, Default)]
pub struct AppointmentEdit {
    #[arg(short, long)]
    pub title: Option<String>,
    #[arg(short, long)]
    pub member: Option<String>,
    #[arg(long)]
    pub start: Option<String>,
    #[arg(long)]
    pub end: Option<String>,
    #[arg(short, long)]
    pub description: Option<String>,
    /// scheduled, completed, cancelled or no_show
    #[arg(long)]
    pub status: Option<String>,
}

pub fn cmd_appointment_edit<R: Repository, C: Clock>(f: &mut Facility<R, C>, id: &str, edit: &AppointmentEdit) -> Result<()> {
    let current = f
        .appointments()
        .iter()
        .find(|a| a.id == id)
        .ok_or_else(|| Error::not_found(Appointment::KIND, id))?;
    let mut draft = AppointmentDraft::from(current);
    if let Some(t) = &edit.title { draft.title = t.clone(); }
    if let Some(m) = &edit.member { draft.member_id = m.clone(); }
    if let Some(s) = &edit.start { draft.start = parse_instant(s, f.clock())?; }
    if let Some(e) = &edit.end { draft.end = parse_instant(e, f.clock())?; }
    if let Some(d) = &edit.description { draft.description = Some(d.clone()).filter(|d| !d.trim().is_empty()); }
    if let Some(s) = parse_field(edit.status.as_deref())? { draft.status = s; }
    f.update_appointment(id, draft)?;
    println!("Appointment {} updated.", id);
    Ok(())
}

fn member_name<R: Repository, C: Clock>(f: &Facility<R, C>, id: &str) -> String {
    f.member(id).map(|m| m.full_name.clone()).unwrap_or_else(|| id.to_string())
}

pub fn cmd_appointment_list<R: Repository, C: Clock>(f: &Facility<R, C>, search: &str) -> Result<()> {
    let mut appts = search_appointments(f.data(), &SearchTerm::new(search));
    if appts.is_empty() {
        println!("No appointments found.");
        return Ok(());
    }
    appts.sort_by_key(|a| a.start);
    let mut table = new_table(&["ID", "Title", "Member", "Start", "End", "Status"]);
    for a in appts {
        table.add_row(vec![
            Cell::new(&a.id),
            Cell::new(&a.title),
            Cell::new(member_name(f, &a.member_id)),
            Cell::new(fmt_time(f.clock(), a.start, "%Y-%m-%d %H:%M")),
            Cell::new(fmt_time(f.clock(), a.end, "%Y-%m-%d %H:%M")),
            Cell::new(title_case(a.status.as_str())),
        ]);
    }
    println!("{table}");
    Ok(())
}

/// Prints a month grid with appointment counts, then the month's appointments.
///
/// `month` is `YYYY-MM`; the current month is used when absent.
pub fn cmd_calendar<R: Repository, C: Clock>(f: &Facility<R, C>, month: Option<&str>, search: &str) -> Result<()> {
    let today = f.today();
    let anchor = match month {
        Some(m) => parse_date(&format!("{}-01", m.trim()))?,
        None => month_start(today),
    };
    let appts = search_appointments(f.data(), &SearchTerm::new(search));
    let by_day = appointments_by_day(appts, f.clock());
    let grid = month_grid(anchor, today);

    println!("{}", anchor.format("%B %Y"));
    let mut table = new_table(&["Sun", "Mon", "Tue", "Wed", "Thu", "Fri", "Sat"]);
    for week in grid.chunks(7) {
        table.add_row(week.iter().map(|day| {
            let count = by_day.get(&day.date).map_or(0, |v| v.len());
            let text = if count > 0 {
                format!("{}\n{} appt", day.date.day(), count)
            } else {
                day.date.day().to_string()
            };
            let cell = Cell::new(text);
            if day.is_today {
                cell.add_attribute(Attribute::Bold).fg(Color::Cyan)
            } else if !day.in_month {
                cell.fg(Color::Grey)
            } else {
                cell
            }
        }));
    }
    println!("{table}");

    for (date, day_appts) in by_day.range(anchor..shift_month(anchor, 1)) {
        for a in day_appts {
            println!(
                "{} {}  {} ({})",
                date,
                fmt_time(f.clock(), a.start, "%H:%M"),
                a.title,
                member_name(f, &a.member_id)
            );
        }
    }
    Ok(())
}

// Maintenance

pub fn cmd_maintenance_add<R: Repository, C: Clock>(f: &mut Facility<R, C>, name: String, house: String, frequency: &str, last_completed: Option<&str>, description: Option<String>) -> Result<()> {
    let last_completed_date = match last_completed {
        Some(s) => parse_instant(s, f.clock())?,
        None => f
            .clock()
            .local_midnight(f.today())
            .unwrap_or_else(|| f.now()),
    };
    let draft = MaintenanceDraft {
        house_id: house,
        task_name: name,
        description: description.unwrap_or_default(),
        frequency: frequency.parse()?,
        last_completed_date,
    };
    let task = f.add_maintenance_task(draft)?;
    println!("Maintenance task added (id = {}), next due {}", task.id, fmt_date(f.clock(), task.next_due_date()));
    Ok(())
}

#[derive(Args, Debug, Clone, Default)]
pub struct MaintenanceEdit {
    #[arg(short, long)]
    pub name: Option<String>,
    #[arg(long)]
    pub house: Option<String>,
    /// weekly, monthly, quarterly, semi-annually or annually
    #[arg(short, long)]
    pub frequency: Option<String>,
    /// Date last completed, YYYY-MM-DD
    #[arg(short, long)]
    pub last_completed: Option<String>,
    #[arg(short, long)]
    pub description: Option<String>,
}

pub fn cmd_maintenance_edit<R: Repository, C: Clock>(f: &mut Facility<R, C>, id: &str, edit: &MaintenanceEdit) -> Result<()> {
    let current = f
        .maintenance_task(id)
        .ok_or_else(|| Error::not_found(MaintenanceTask::KIND, id))?;
    let mut draft = MaintenanceDraft::from(current);
    if let Some(n) = &edit.name { draft.task_name = n.clone(); }
    if let Some(h) = &edit.house { draft.house_id = h.clone(); }
    if let Some(fr) = parse_field(edit.frequency.as_deref())? { draft.frequency = fr; }
    if let Some(lc) = &edit.last_completed { draft.last_completed_date = parse_instant(lc, f.clock())?; }
    if let Some(d) = &edit.description { draft.description = d.clone(); }
    let task = f.update_maintenance_task(id, draft)?;
    println!("Maintenance task {} updated, next due {}", id, fmt_date(f.clock(), task.next_due_date()));
    Ok(())
}

pub fn cmd_maintenance_complete<R: Repository, C: Clock>(f: &mut Facility<R, C>, id: &str) -> Result<()> {
    let task = f.complete_maintenance_task(id)?;
    println!("Task {} marked as complete. Next due {}", id, fmt_date(f.clock(), task.next_due_date()));
    Ok(())
}

pub fn cmd_maintenance_revert<R: Repository, C: Clock>(f: &mut Facility<R, C>, id: &str) -> Result<()> {
    let task = f.revert_maintenance_task(id)?;
    let status = task.status_on(f.clock());
    println!("Task {} reverted; now {}.", id, status.display_name());
    Ok(())
}

/// Lists maintenance tasks with fresh statuses, most urgent first.
pub fn cmd_maintenance_list<R: Repository, C: Clock>(f: &Facility<R, C>, house: Option<String>, search: &str) -> Result<()> {
    let filter = HouseItemFilter { house_id: house, term: SearchTerm::new(search) };
    let today = f.today();
    let mut rows: Vec<_> = f
        .maintenance_tasks()
        .into_iter()
        .filter(|r| filter.matches(&r.task.house_id, &r.task.task_name))
        .collect();
    if rows.is_empty() {
        println!("No maintenance tasks found.");
        return Ok(());
    }
    rows.sort_by_key(|r| (r.status == TaskStatus::Completed, r.task.next_due_date()));

    let mut table = new_table(&["ID", "Task", "House", "Frequency", "Last Completed", "Next Due", "Due In", "Status"]);
    for r in rows {
        let t = r.task;
        let days = days_until(f.clock().local(t.next_due_date()), today);
        let due_in = if days < 0 {
            format!("{}d overdue", days.abs())
        } else if days == 0 {
            "Today".to_string()
        } else {
            format!("{}d", days)
        };
        table.add_row(vec![
            Cell::new(&t.id),
            Cell::new(&t.task_name),
            Cell::new(house_name(f, Some(&t.house_id))),
            Cell::new(title_case(t.frequency().as_str())),
            Cell::new(fmt_date(f.clock(), t.last_completed_date())),
            Cell::new(fmt_date(f.clock(), t.next_due_date())),
            Cell::new(due_in),
            Cell::new(r.status.display_name()).fg(status_color(r.status)),
        ]);
    }
    println!("{table}");
    Ok(())
}

/// Shows each active house's task count and how many need attention.
pub fn cmd_maintenance_summary<R: Repository, C: Clock>(f: &Facility<R, C>) -> Result<()> {
    let summary = f.maintenance_summary();
    if summary.is_empty() {
        println!("No active houses.");
        return Ok(());
    }
    let mut table = new_table(&["House", "Tasks", "Overdue", "Due Today", "Due Soon", "Summary"]);
    for s in summary {
        let color = if s.overdue > 0 {
            Color::Red
        } else if s.needs_attention() > 0 {
            Color::Yellow
        } else {
            Color::Green
        };
        table.add_row(vec![
            Cell::new(format!("{} ({})", s.house.name, s.house.id)),
            Cell::new(s.total),
            Cell::new(s.overdue),
            Cell::new(s.due_today),
            Cell::new(s.due_soon),
            Cell::new(s.headline()).fg(color),
        ]);
    }
    println!("{table}");
    Ok(())
}

// Inventory

pub fn cmd_inventory_add<R: Repository, C: Clock>(f: &mut Facility<R, C>, name: String, house: String, quantity: u32, status: Option<&str>) -> Result<()> {
    let draft = InventoryDraft {
        house_id: house,
        name,
        quantity,
        status: parse_field(status)?.unwrap_or(StockStatus::InStock),
    };
    let item = f.add_inventory_item(draft)?;
    println!("Inventory item added (id = {})", item.id);
    Ok(())
}

pub fn cmd_inventory_edit<R: Repository, C: Clock>(f: &mut Facility<R, C>, id: &str, name: Option<String>, house: Option<String>, quantity: Option<u32>, status: Option<&str>) -> Result<()> {
    let current = f
        .inventory_items()
        .iter()
        .find(|i| i.id == id)
        .ok_or_else(|| Error::not_found(InventoryItem::KIND, id))?;
    let mut draft = InventoryDraft::from(current);
    if let Some(n) = name { draft.name = n; }
    if let Some(h) = house { draft.house_id = h; }
    if let Some(q) = quantity { draft.quantity = q; }
    if let Some(s) = parse_field(status)? { draft.status = s; }
    f.update_inventory_item(id, draft)?;
    println!("Inventory item {} updated.", id);
    Ok(())
}

pub fn cmd_inventory_list<R: Repository, C: Clock>(f: &Facility<R, C>, house: Option<String>, search: &str) -> Result<()> {
    let filter = HouseItemFilter { house_id: house, term: SearchTerm::new(search) };
    let items = filter.inventory(f.inventory_items());
    if items.is_empty() {
        println!("No inventory items found.");
        return Ok(());
    }
    let mut table = new_table(&["ID", "Item", "House", "Quantity", "Status", "Last Updated"]);
    for i in items {
        let color = match i.status {
            StockStatus::InStock => Color::Green,
            StockStatus::LowStock => Color::Yellow,
            StockStatus::OutOfStock => Color::Red,
        };
        table.add_row(vec![
            Cell::new(&i.id),
            Cell::new(&i.name),
            Cell::new(house_name(f, Some(&i.house_id))),
            Cell::new(i.quantity),
            Cell::new(i.status.display_name()).fg(color),
            Cell::new(fmt_date(f.clock(), i.last_updated)),
        ]);
    }
    println!("{table}");
    Ok(())
}

/// Shows each active house's item count and stock alerts.
pub fn cmd_inventory_summary<R: Repository, C: Clock>(f: &Facility<R, C>) -> Result<()> {
    let summary = f.inventory_summary();
    if summary.is_empty() {
        println!("No active houses.");
        return Ok(());
    }
    let mut table = new_table(&["House", "Items", "Low or Out", "Summary"]);
    for s in summary {
        let color = if s.short > 0 { Color::Yellow } else { Color::Green };
        table.add_row(vec![
            Cell::new(format!("{} ({})", s.house.name, s.house.id)),
            Cell::new(s.total),
            Cell::new(s.short),
            Cell::new(s.headline()).fg(color),
        ]);
    }
    println!("{table}");
    Ok(())
}

// Dashboard and data management

pub fn cmd_dashboard<R: Repository, C: Clock>(f: &Facility<R, C>) -> Result<()> {
    let d = f.dashboard();
    let mut table = new_table(&["Active Members", "Urgent Maintenance", "Due Soon", "Open Work Orders", "Out of Stock"]);
    table.add_row(vec![
        Cell::new(d.active_members),
        Cell::new(d.urgent_maintenance.len()).fg(if d.urgent_maintenance.is_empty() { Color::Reset } else { Color::Red }),
        Cell::new(d.due_soon_maintenance.len()),
        Cell::new(d.open_work_orders.len()),
        Cell::new(d.out_of_stock.len()),
    ]);
    println!("{table}");

    println!("High Priority Work Orders");
    if d.high_priority_work_orders.is_empty() {
        println!("  No high priority work orders.");
    }
    for wo in d.high_priority_work_orders.iter().take(5) {
        println!("  {} - {} ({})", wo.id, wo.title, house_name(f, Some(&wo.house_id)));
    }

    println!("Inventory Alerts");
    if d.out_of_stock.is_empty() && d.low_stock.is_empty() {
        println!("  Inventory levels look good.");
    }
    for i in d.out_of_stock.iter().take(3).chain(d.low_stock.iter().take(2)) {
        println!("  {} - {} ({}) {}", i.id, i.name, house_name(f, Some(&i.house_id)), i.status.display_name());
    }

    println!("Urgent Maintenance");
    if d.urgent_maintenance.is_empty() {
        println!("  Nothing overdue.");
    }
    for r in &d.urgent_maintenance {
        println!("  {} - {} ({}) {}", r.task.id, r.task.task_name, house_name(f, Some(&r.task.house_id)), r.status.display_name());
    }
    Ok(())
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N] ", prompt);
    io::stdout().flush()?;
    let mut input = String::new();
    io::stdin().read_line(&mut input)?;
    Ok(input.trim().eq_ignore_ascii_case("y"))
}

/// Loads the demo records. Refuses to overwrite existing data unless forced.
pub fn cmd_seed<R: Repository, C: Clock>(f: &mut Facility<R, C>, force: bool) -> Result<()> {
    if !f.data().is_empty() && !force {
        return Err(Error::Validation("data already exists; use --force to replace it".into()));
    }
    let now = f.now();
    f.replace_all(demo_dataset(now))?;
    println!("Demo data loaded.");
    Ok(())
}

/// Deletes every record.
pub fn cmd_reset<R: Repository, C: Clock>(f: &mut Facility<R, C>, force: bool) -> Result<()> {
    if !force && !confirm("Are you sure you want to delete all records? This cannot be undone.")? {
        println!("Aborted.");
        return Ok(());
    }
    f.clear_all()?;
    println!("Database reset successfully.");
    Ok(())
}
