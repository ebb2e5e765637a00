//! Record keeping for houses, members and everything attached to them.
//!
//! A [`Facility`] holds the session's [`Dataset`] in memory and writes it
//! through its [`Repository`] once per mutating call. Timestamps and the
//! maintenance "today" come from the injected [`Clock`].

use chrono::{DateTime, NaiveDate, Utc};
use tracing::{info, warn};
use crate::clock::{Clock, SystemClock};
use crate::error::{Error, Result};
use crate::models::{
    next_id, Appointment, AppointmentDraft, Dataset, House, HouseDraft, HouseStatus,
    InventoryDraft, InventoryItem, MaintenanceDraft, MaintenanceTask, Member, MemberDraft,
    MemberStatus, Record, StockStatus, WorkOrder, WorkOrderDraft, WorkOrderPriority,
};
use crate::schedule::TaskStatus;
use crate::storage::Repository;

/// A maintenance task paired with its status as of the facility's today.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TaskRow<'a> {
    pub task: &'a MaintenanceTask,
    pub status: TaskStatus,
}

/// Headline numbers and alert lists for the dashboard.
#[derive(Debug, Clone, PartialEq)]
pub struct Dashboard<'a> {
    pub active_members: usize,
    /// Overdue or due today.
    pub urgent_maintenance: Vec<TaskRow<'a>>,
    pub due_soon_maintenance: Vec<TaskRow<'a>>,
    /// Open or in progress.
    pub open_work_orders: Vec<&'a WorkOrder>,
    pub high_priority_work_orders: Vec<&'a WorkOrder>,
    pub low_stock: Vec<&'a InventoryItem>,
    pub out_of_stock: Vec<&'a InventoryItem>,
}

/// Per-house maintenance counts for the maintenance landing view.
#[derive(Debug, Clone, PartialEq)]
pub struct MaintenanceSummary<'a> {
    pub house: &'a House,
    pub total: usize,
    pub overdue: usize,
    pub due_today: usize,
    pub due_soon: usize,
}

impl MaintenanceSummary<'_> {
    /// Overdue, due today or due within the week.
    pub fn needs_attention(&self) -> usize {
        self.overdue + self.due_today + self.due_soon
    }

    pub fn headline(&self) -> String {
        match self.needs_attention() {
            0 => "All tasks are up to date".to_string(),
            1 => "1 task due or overdue".to_string(),
            n => format!("{} tasks due or overdue", n),
        }
    }
}

/// Per-house stock counts for the inventory landing view.
#[derive(Debug, Clone, PartialEq)]
pub struct InventorySummary<'a> {
    pub house: &'a House,
    pub total: usize,
    /// Low or out of stock.
    pub short: usize,
}

impl InventorySummary<'_> {
    pub fn headline(&self) -> String {
        match self.short {
            0 => "All items are in stock".to_string(),
            1 => "1 item running low or out of stock".to_string(),
            n => format!("{} items running low or out of stock", n),
        }
    }
}

pub struct Facility<R: Repository, C: Clock = SystemClock> {
    repo: R,
    clock: C,
    data: Dataset,
}

fn find<'a, T: Record>(items: &'a [T], id: &str) -> Option<&'a T> {
    items.iter().find(|r| r.id() == id)
}

fn find_mut<'a, T: Record>(items: &'a mut [T], id: &str) -> Result<&'a mut T> {
    items
        .iter_mut()
        .find(|r| r.id() == id)
        .ok_or_else(|| Error::not_found(T::KIND, id))
}

fn require_text(value: &str, what: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::Validation(format!("{} must not be empty", what)));
    }
    Ok(())
}

impl<R: Repository> Facility<R, SystemClock> {
    /// Opens the facility on the wall clock.
    pub fn open(repo: R) -> Result<Self> {
        Facility::with_clock(repo, SystemClock)
    }
}

impl<R: Repository, C: Clock> Facility<R, C> {
    pub fn with_clock(repo: R, clock: C) -> Result<Self> {
        let data = repo.load()?;
        Ok(Facility { repo, clock, data })
    }

    /// Starts from no records without reading the store. For commands that
    /// overwrite everything, so they work even when the store is unreadable.
    pub fn detached(repo: R, clock: C) -> Self {
        Facility { repo, clock, data: Dataset::default() }
    }

    pub fn data(&self) -> &Dataset {
        &self.data
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut C {
        &mut self.clock
    }

    pub fn now(&self) -> DateTime<Utc> {
        self.clock.now()
    }

    pub fn today(&self) -> NaiveDate {
        self.clock.today()
    }

    fn persist(&mut self) -> Result<()> {
        self.repo.save(&self.data)
    }

    /// Swaps in a whole dataset, e.g. demo data.
    pub fn replace_all(&mut self, data: Dataset) -> Result<()> {
        self.data = data;
        info!("dataset replaced");
        self.persist()
    }

    /// Drops every record and clears the store.
    pub fn clear_all(&mut self) -> Result<()> {
        self.data = Dataset::default();
        info!("all records deleted");
        self.repo.clear()
    }

    fn require_house(&self, house_id: &str) -> Result<&House> {
        self.house(house_id)
            .ok_or_else(|| Error::not_found(House::KIND, house_id))
    }

    /// A house members can be assigned to.
    fn require_open_house(&self, house_id: &str) -> Result<&House> {
        let house = self.require_house(house_id)?;
        if house.status != HouseStatus::Active {
            return Err(Error::Validation(format!("house '{}' is archived", house_id)));
        }
        Ok(house)
    }

    // Houses

    pub fn houses(&self) -> &[House] {
        &self.data.houses
    }

    pub fn house(&self, id: &str) -> Option<&House> {
        find(&self.data.houses, id)
    }

    /// Members living in a house, archived members excluded.
    pub fn member_count(&self, house_id: &str) -> usize {
        self.data
            .members
            .iter()
            .filter(|m| m.house_id.as_deref() == Some(house_id) && m.status != MemberStatus::Archived)
            .count()
    }

    pub fn add_house(&mut self, draft: HouseDraft) -> Result<House> {
        require_text(&draft.name, "house name")?;
        let now = self.now();
        let house = House {
            id: next_id(&self.data.houses)?,
            name: draft.name,
            address: draft.address,
            geo: draft.geo,
            capacity: draft.capacity,
            status: draft.status,
            tags: draft.tags,
            created_at: now,
            updated_at: now,
        };
        self.data.houses.push(house.clone());
        self.persist()?;
        info!(id = %house.id, "house created");
        Ok(house)
    }

    pub fn update_house(&mut self, id: &str, draft: HouseDraft) -> Result<House> {
        require_text(&draft.name, "house name")?;
        let now = self.now();
        let house = find_mut(&mut self.data.houses, id)?;
        house.name = draft.name;
        house.address = draft.address;
        house.geo = draft.geo;
        house.capacity = draft.capacity;
        house.status = draft.status;
        house.tags = draft.tags;
        house.updated_at = now;
        let house = house.clone();
        self.persist()?;
        info!(id = %house.id, "house updated");
        Ok(house)
    }

    // Members

    pub fn members(&self) -> &[Member] {
        &self.data.members
    }

    pub fn member(&self, id: &str) -> Option<&Member> {
        find(&self.data.members, id)
    }

    /// `current_house` is where the member lives now; staying there is
    /// allowed even if that house has since been archived.
    fn check_member_draft(&self, draft: &MemberDraft, current_house: Option<&str>) -> Result<()> {
        require_text(&draft.full_name, "member name")?;
        match draft.house_id.as_deref() {
            Some(house_id) if draft.status != MemberStatus::Archived && Some(house_id) != current_house => {
                self.require_open_house(house_id)?;
            }
            Some(house_id) => {
                self.require_house(house_id)?;
            }
            None => {}
        }
        Ok(())
    }

    pub fn add_member(&mut self, mut draft: MemberDraft) -> Result<Member> {
        self.check_member_draft(&draft, None)?;
        if draft.status == MemberStatus::Archived {
            draft.house_id = None;
        }
        let now = self.now();
        let member = Member {
            id: next_id(&self.data.members)?,
            full_name: draft.full_name,
            dob: draft.dob,
            insurance_provider: draft.insurance_provider,
            phone: draft.phone,
            email: draft.email,
            status: draft.status,
            veteran_status: draft.veteran_status,
            branch_of_service: draft.branch_of_service,
            label: draft.label,
            description: draft.description,
            house_id: draft.house_id,
            photo_url: draft.photo_url,
            finances: draft.finances,
            care: draft.care,
            created_at: now,
            updated_at: now,
        };
        self.data.members.push(member.clone());
        self.persist()?;
        info!(id = %member.id, "member created");
        Ok(member)
    }

    /// Replaces a member's editable fields. Archived members are unassigned.
    pub fn update_member(&mut self, id: &str, mut draft: MemberDraft) -> Result<Member> {
        let current = self
            .member(id)
            .ok_or_else(|| Error::not_found(Member::KIND, id))?;
        self.check_member_draft(&draft, current.house_id.as_deref())?;
        if draft.status == MemberStatus::Archived {
            draft.house_id = None;
        }
        let now = self.now();
        let member = find_mut(&mut self.data.members, id)?;
        member.full_name = draft.full_name;
        member.dob = draft.dob;
        member.insurance_provider = draft.insurance_provider;
        member.phone = draft.phone;
        member.email = draft.email;
        member.status = draft.status;
        member.veteran_status = draft.veteran_status;
        member.branch_of_service = draft.branch_of_service;
        member.label = draft.label;
        member.description = draft.description;
        member.house_id = draft.house_id;
        member.photo_url = draft.photo_url;
        member.finances = draft.finances;
        member.care = draft.care;
        member.updated_at = now;
        let member = member.clone();
        self.persist()?;
        info!(id = %member.id, "member updated");
        Ok(member)
    }

    /// Marks a member archived and removes them from their house.
    pub fn archive_member(&mut self, id: &str) -> Result<Member> {
        let now = self.now();
        let member = find_mut(&mut self.data.members, id)?;
        member.status = MemberStatus::Archived;
        member.house_id = None;
        member.updated_at = now;
        let member = member.clone();
        self.persist()?;
        info!(id = %member.id, "member archived");
        Ok(member)
    }

    /// Assigns a member to an active house, or unassigns with `None`.
    ///
    /// Returns `false` without writing when the member is already there.
    pub fn move_member(&mut self, member_id: &str, house_id: Option<&str>) -> Result<bool> {
        let member = self
            .member(member_id)
            .ok_or_else(|| Error::not_found(Member::KIND, member_id))?;
        if member.status == MemberStatus::Archived {
            return Err(Error::Validation(format!(
                "member '{}' is archived and cannot be assigned",
                member_id
            )));
        }
        if member.house_id.as_deref() == house_id {
            return Ok(false);
        }
        if let Some(hid) = house_id {
            let house = self.require_open_house(hid)?;
            let occupants = self.member_count(hid);
            if occupants as u32 >= house.capacity {
                warn!(house = hid, occupants, capacity = house.capacity, "house is at or over capacity");
            }
        }
        let now = self.now();
        let member = find_mut(&mut self.data.members, member_id)?;
        let from = member.house_id.take();
        member.house_id = house_id.map(str::to_string);
        member.updated_at = now;
        self.persist()?;
        info!(member = member_id, from = ?from, to = ?house_id, "member moved");
        Ok(true)
    }

    // Work orders

    pub fn work_orders(&self) -> &[WorkOrder] {
        &self.data.work_orders
    }

    fn check_work_order_draft(&self, draft: &WorkOrderDraft) -> Result<()> {
        require_text(&draft.title, "work order title")?;
        require_text(&draft.created_by, "work order creator")?;
        self.require_house(&draft.house_id)?;
        Ok(())
    }

    pub fn add_work_order(&mut self, draft: WorkOrderDraft) -> Result<WorkOrder> {
        self.check_work_order_draft(&draft)?;
        let now = self.now();
        let wo = WorkOrder {
            id: next_id(&self.data.work_orders)?,
            title: draft.title,
            description: draft.description,
            house_id: draft.house_id,
            status: draft.status,
            priority: draft.priority,
            created_by: draft.created_by,
            assigned_to: draft.assigned_to,
            created_at: now,
            updated_at: now,
        };
        self.data.work_orders.push(wo.clone());
        self.persist()?;
        info!(id = %wo.id, house = %wo.house_id, "work order created");
        Ok(wo)
    }

    pub fn update_work_order(&mut self, id: &str, draft: WorkOrderDraft) -> Result<WorkOrder> {
        self.check_work_order_draft(&draft)?;
        let now = self.now();
        let wo = find_mut(&mut self.data.work_orders, id)?;
        wo.title = draft.title;
        wo.description = draft.description;
        wo.house_id = draft.house_id;
        wo.status = draft.status;
        wo.priority = draft.priority;
        wo.created_by = draft.created_by;
        wo.assigned_to = draft.assigned_to;
        wo.updated_at = now;
        let wo = wo.clone();
        self.persist()?;
        info!(id = %wo.id, "work order updated");
        Ok(wo)
    }

    // Appointments

    pub fn appointments(&self) -> &[Appointment] {
        &self.data.appointments
    }

    fn check_appointment_draft(&self, draft: &AppointmentDraft) -> Result<()> {
        require_text(&draft.title, "appointment title")?;
        if self.member(&draft.member_id).is_none() {
            return Err(Error::not_found(Member::KIND, draft.member_id.clone()));
        }
        if draft.end < draft.start {
            return Err(Error::Validation("appointment ends before it starts".into()));
        }
        Ok(())
    }

    pub fn add_appointment(&mut self, draft: AppointmentDraft) -> Result<Appointment> {
        self.check_appointment_draft(&draft)?;
        let now = self.now();
        let appt = Appointment {
            id: next_id(&self.data.appointments)?,
            member_id: draft.member_id,
            title: draft.title,
            description: draft.description,
            start: draft.start,
            end: draft.end,
            status: draft.status,
            created_at: now,
            updated_at: now,
        };
        self.data.appointments.push(appt.clone());
        self.persist()?;
        info!(id = %appt.id, member = %appt.member_id, "appointment created");
        Ok(appt)
    }

    pub fn update_appointment(&mut self, id: &str, draft: AppointmentDraft) -> Result<Appointment> {
        self.check_appointment_draft(&draft)?;
        let now = self.now();
        let appt = find_mut(&mut self.data.appointments, id)?;
        appt.member_id = draft.member_id;
        appt.title = draft.title;
        appt.description = draft.description;
        appt.start = draft.start;
        appt.end = draft.end;
        appt.status = draft.status;
        appt.updated_at = now;
        let appt = appt.clone();
        self.persist()?;
        info!(id = %appt.id, "appointment updated");
        Ok(appt)
    }

    // Maintenance

    pub fn maintenance_task(&self, id: &str) -> Option<&MaintenanceTask> {
        find(&self.data.maintenance_tasks, id)
    }

    /// Every maintenance task with its status recomputed for today.
    pub fn maintenance_tasks(&self) -> Vec<TaskRow<'_>> {
        self.data
            .maintenance_tasks
            .iter()
            .map(|task| TaskRow { task, status: task.status_on(&self.clock) })
            .collect()
    }

    fn check_maintenance_draft(&self, draft: &MaintenanceDraft) -> Result<()> {
        require_text(&draft.task_name, "task name")?;
        self.require_house(&draft.house_id)?;
        Ok(())
    }

    /// Schedules a new recurring task; its due date follows from the draft.
    pub fn add_maintenance_task(&mut self, draft: MaintenanceDraft) -> Result<MaintenanceTask> {
        self.check_maintenance_draft(&draft)?;
        let task = MaintenanceTask::new(
            next_id(&self.data.maintenance_tasks)?,
            draft.house_id,
            draft.task_name,
            draft.description,
            draft.frequency,
            draft.last_completed_date,
        );
        self.data.maintenance_tasks.push(task.clone());
        self.persist()?;
        info!(id = %task.id, due = %task.next_due_date(), "maintenance task scheduled");
        Ok(task)
    }

    /// Edits a task and recomputes its due date; completion state is kept.
    pub fn update_maintenance_task(&mut self, id: &str, draft: MaintenanceDraft) -> Result<MaintenanceTask> {
        self.check_maintenance_draft(&draft)?;
        let task = find_mut(&mut self.data.maintenance_tasks, id)?;
        task.house_id = draft.house_id;
        task.task_name = draft.task_name;
        task.description = draft.description;
        task.reschedule(draft.last_completed_date, draft.frequency);
        let task = task.clone();
        self.persist()?;
        info!(id = %task.id, due = %task.next_due_date(), "maintenance task updated");
        Ok(task)
    }

    /// Marks a task done now and starts its next period.
    pub fn complete_maintenance_task(&mut self, id: &str) -> Result<MaintenanceTask> {
        let now = self.now();
        let task = find_mut(&mut self.data.maintenance_tasks, id)?;
        task.complete(now);
        let task = task.clone();
        self.persist()?;
        info!(id = %task.id, due = %task.next_due_date(), "maintenance task completed");
        Ok(task)
    }

    /// Returns a completed task to derived status.
    pub fn revert_maintenance_task(&mut self, id: &str) -> Result<MaintenanceTask> {
        let task = find_mut(&mut self.data.maintenance_tasks, id)?;
        if !task.is_completed() {
            warn!(id, "revert requested for a task that is not completed");
        }
        task.revert();
        let task = task.clone();
        self.persist()?;
        info!(id = %task.id, "maintenance task reverted");
        Ok(task)
    }

    /// Task counts for each active house, in house order.
    pub fn maintenance_summary(&self) -> Vec<MaintenanceSummary<'_>> {
        let rows = self.maintenance_tasks();
        self.active_houses()
            .map(|house| {
                let mut summary = MaintenanceSummary { house, total: 0, overdue: 0, due_today: 0, due_soon: 0 };
                for r in rows.iter().filter(|r| r.task.house_id == house.id) {
                    summary.total += 1;
                    match r.status {
                        TaskStatus::Overdue => summary.overdue += 1,
                        TaskStatus::DueToday => summary.due_today += 1,
                        TaskStatus::DueSoon => summary.due_soon += 1,
                        TaskStatus::Upcoming | TaskStatus::Completed => {}
                    }
                }
                summary
            })
            .collect()
    }

    fn active_houses(&self) -> impl Iterator<Item = &House> {
        self.data.houses.iter().filter(|h| h.status == HouseStatus::Active)
    }

    // Inventory

    /// Item counts for each active house, in house order.
    pub fn inventory_summary(&self) -> Vec<InventorySummary<'_>> {
        self.active_houses()
            .map(|house| {
                let items = self.data.inventory_items.iter().filter(|i| i.house_id == house.id);
                let (total, short) = items.fold((0, 0), |(total, short), i| {
                    (total + 1, short + usize::from(i.status != StockStatus::InStock))
                });
                InventorySummary { house, total, short }
            })
            .collect()
    }

    pub fn inventory_items(&self) -> &[InventoryItem] {
        &self.data.inventory_items
    }

    fn check_inventory_draft(&self, draft: &InventoryDraft) -> Result<()> {
        require_text(&draft.name, "item name")?;
        self.require_house(&draft.house_id)?;
        Ok(())
    }

    pub fn add_inventory_item(&mut self, draft: InventoryDraft) -> Result<InventoryItem> {
        self.check_inventory_draft(&draft)?;
        let item = InventoryItem {
            id: next_id(&self.data.inventory_items)?,
            house_id: draft.house_id,
            name: draft.name,
            quantity: draft.quantity,
            status: draft.status,
            last_updated: self.now(),
        };
        self.data.inventory_items.push(item.clone());
        self.persist()?;
        info!(id = %item.id, house = %item.house_id, "inventory item added");
        Ok(item)
    }

    pub fn update_inventory_item(&mut self, id: &str, draft: InventoryDraft) -> Result<InventoryItem> {
        self.check_inventory_draft(&draft)?;
        let now = self.now();
        let item = find_mut(&mut self.data.inventory_items, id)?;
        item.house_id = draft.house_id;
        item.name = draft.name;
        item.quantity = draft.quantity;
        item.status = draft.status;
        item.last_updated = now;
        let item = item.clone();
        self.persist()?;
        info!(id = %item.id, "inventory item updated");
        Ok(item)
    }

    // Dashboard

    pub fn dashboard(&self) -> Dashboard<'_> {
        let tasks = self.maintenance_tasks();
        let open_work_orders: Vec<&WorkOrder> = self
            .data
            .work_orders
            .iter()
            .filter(|wo| wo.status.is_open())
            .collect();
        let high_priority_work_orders = open_work_orders
            .iter()
            .copied()
            .filter(|wo| wo.priority == WorkOrderPriority::High)
            .collect();
        let stock = |status: StockStatus| {
            self.data
                .inventory_items
                .iter()
                .filter(|i| i.status == status)
                .collect::<Vec<_>>()
        };
        Dashboard {
            active_members: self
                .data
                .members
                .iter()
                .filter(|m| m.status == MemberStatus::Active)
                .count(),
            urgent_maintenance: tasks.iter().copied().filter(|r| r.status.is_urgent()).collect(),
            due_soon_maintenance: tasks
                .iter()
                .copied()
                .filter(|r| r.status == TaskStatus::DueSoon)
                .collect(),
            open_work_orders,
            high_priority_work_orders,
            low_stock: stock(StockStatus::LowStock),
            out_of_stock: stock(StockStatus::OutOfStock),
        }
    }
}
