//! Search and filter rules for the list views.
//!
//! Every filter field is optional; `None` means "all". Search terms match
//! case-insensitively as substrings, and an empty term matches everything.

use crate::models::{
    Appointment, Dataset, House, HouseStatus, InventoryItem, MaintenanceTask, Member, MemberLabel,
    MemberStatus, VeteranStatus, WorkOrder, WorkOrderPriority, WorkOrderStatus,
};

/// A lowercased search term.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SearchTerm(String);

impl SearchTerm {
    pub fn new(term: &str) -> Self {
        SearchTerm(term.trim().to_lowercase())
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True when the term is empty or appears in any of `fields`.
    pub fn matches_any<'a, I>(&self, fields: I) -> bool
    where
        I: IntoIterator<Item = &'a str>,
    {
        self.is_empty() || fields.into_iter().any(|f| f.to_lowercase().contains(&self.0))
    }
}

fn house_name<'a>(data: &'a Dataset, house_id: Option<&str>) -> &'a str {
    house_id
        .and_then(|id| data.houses.iter().find(|h| h.id == id))
        .map(|h| h.name.as_str())
        .unwrap_or("")
}

fn member_name<'a>(data: &'a Dataset, member_id: &str) -> &'a str {
    data.members
        .iter()
        .find(|m| m.id == member_id)
        .map(|m| m.full_name.as_str())
        .unwrap_or("")
}

#[derive(Debug, Clone, Default)]
pub struct HouseFilter {
    pub status: Option<HouseStatus>,
    pub term: SearchTerm,
}

impl HouseFilter {
    pub fn matches(&self, h: &House) -> bool {
        self.status.map_or(true, |s| h.status == s)
            && self.term.matches_any(
                [
                    h.name.as_str(),
                    h.address.street.as_str(),
                    h.address.city.as_str(),
                    h.address.zip.as_str(),
                ]
                .into_iter()
                .chain(h.tags.iter().map(String::as_str)),
            )
    }

    pub fn apply<'a>(&self, data: &'a Dataset) -> Vec<&'a House> {
        data.houses.iter().filter(|h| self.matches(h)).collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct MemberFilter {
    pub status: Option<MemberStatus>,
    pub veteran_status: Option<VeteranStatus>,
    pub label: Option<MemberLabel>,
    pub term: SearchTerm,
}

impl MemberFilter {
    pub fn matches(&self, data: &Dataset, m: &Member) -> bool {
        self.status.map_or(true, |s| m.status == s)
            && self.veteran_status.map_or(true, |v| m.veteran_status == v)
            && self.label.map_or(true, |l| m.label == l)
            && self.term.matches_any([
                m.full_name.as_str(),
                m.email.as_str(),
                m.phone.as_str(),
                m.description.as_str(),
                house_name(data, m.house_id.as_deref()),
            ])
    }

    pub fn apply<'a>(&self, data: &'a Dataset) -> Vec<&'a Member> {
        data.members.iter().filter(|m| self.matches(data, m)).collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct WorkOrderFilter {
    pub status: Option<WorkOrderStatus>,
    pub priority: Option<WorkOrderPriority>,
    pub house_id: Option<String>,
    pub term: SearchTerm,
}

impl WorkOrderFilter {
    pub fn matches(&self, data: &Dataset, wo: &WorkOrder) -> bool {
        self.status.map_or(true, |s| wo.status == s)
            && self.priority.map_or(true, |p| wo.priority == p)
            && self.house_id.as_ref().map_or(true, |h| &wo.house_id == h)
            && self.term.matches_any([
                wo.title.as_str(),
                wo.description.as_str(),
                house_name(data, Some(wo.house_id.as_str())),
                wo.assigned_to.as_deref().unwrap_or(""),
                wo.created_by.as_str(),
            ])
    }

    pub fn apply<'a>(&self, data: &'a Dataset) -> Vec<&'a WorkOrder> {
        data.work_orders.iter().filter(|wo| self.matches(data, wo)).collect()
    }
}

/// Narrows maintenance tasks or inventory items to one house and a name term.
#[derive(Debug, Clone, Default)]
pub struct HouseItemFilter {
    pub house_id: Option<String>,
    pub term: SearchTerm,
}

impl HouseItemFilter {
    pub fn matches(&self, house_id: &str, name: &str) -> bool {
        self.house_id.as_deref().map_or(true, |h| h == house_id) && self.term.matches_any([name])
    }

    pub fn maintenance<'a>(&self, tasks: &'a [MaintenanceTask]) -> Vec<&'a MaintenanceTask> {
        tasks
            .iter()
            .filter(|t| self.matches(&t.house_id, &t.task_name))
            .collect()
    }

    pub fn inventory<'a>(&self, items: &'a [InventoryItem]) -> Vec<&'a InventoryItem> {
        items.iter().filter(|i| self.matches(&i.house_id, &i.name)).collect()
    }
}

/// Appointments whose title, description or member name contain `term`.
pub fn search_appointments<'a>(data: &'a Dataset, term: &SearchTerm) -> Vec<&'a Appointment> {
    data.appointments
        .iter()
        .filter(|a| {
            term.matches_any([
                a.title.as_str(),
                a.description.as_deref().unwrap_or(""),
                member_name(data, &a.member_id),
            ])
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_term_matches_everything() {
        let t = SearchTerm::new("   ");
        assert!(t.matches_any(std::iter::empty()));
    }

    #[test]
    fn term_is_case_insensitive() {
        let t = SearchTerm::new("OAK");
        assert!(t.matches_any(["Oakwood Residence"]));
        assert!(!t.matches_any(["Maple Creek"]));
    }
}
