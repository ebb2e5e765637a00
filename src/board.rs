//! Assignment board: members grouped into one column per active house plus
//! an "Unassigned" column. Dropping a member on a column turns into a
//! [`Facility::move_member`](crate::facility::Facility::move_member) call.

use crate::filter::MemberFilter;
use crate::models::{Dataset, House, HouseStatus, Member, MemberStatus};

/// A board column's identity.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Column<'a> {
    House(&'a House),
    Unassigned,
}

impl<'a> Column<'a> {
    /// House id the column assigns to, `None` for the unassigned column.
    pub fn house_id(&self) -> Option<&'a str> {
        match self {
            Column::House(h) => Some(h.id.as_str()),
            Column::Unassigned => None,
        }
    }

    pub fn title(&self) -> &'a str {
        match self {
            Column::House(h) => h.name.as_str(),
            Column::Unassigned => "Unassigned",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct BoardColumn<'a> {
    pub column: Column<'a>,
    /// Members shown in the column after filtering.
    pub members: Vec<&'a Member>,
    /// Every non-archived member in the column, ignoring filters.
    pub occupants: usize,
}

impl BoardColumn<'_> {
    /// "3 / 8 Residents" for houses, "2 Members" for the unassigned column.
    pub fn headline(&self) -> String {
        match self.column {
            Column::House(h) => format!("{} / {} Residents", self.occupants, h.capacity),
            Column::Unassigned => format!("{} Members", self.occupants),
        }
    }
}

/// Builds the board. Archived members never appear; `filter` narrows the
/// cards but not the occupancy counts.
pub fn build<'a>(data: &'a Dataset, filter: &MemberFilter) -> Vec<BoardColumn<'a>> {
    let visible: Vec<&Member> = data
        .members
        .iter()
        .filter(|m| m.status != MemberStatus::Archived)
        .collect();

    let column_for = |column: Column<'a>| {
        let hid = column.house_id();
        let occupants = visible.iter().filter(|m| m.house_id.as_deref() == hid).count();
        let members = visible
            .iter()
            .copied()
            .filter(|m| m.house_id.as_deref() == hid && filter.matches(data, m))
            .collect();
        BoardColumn { column, members, occupants }
    };

    data.houses
        .iter()
        .filter(|h| h.status == HouseStatus::Active)
        .map(|h| column_for(Column::House(h)))
        .chain(std::iter::once(column_for(Column::Unassigned)))
        .collect()
}

/// A move produced by dropping a member on a column.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Move {
    pub member_id: String,
    pub to: Option<String>,
}

/// Resolves a drop. Returns `None` when the member is already in `target`.
pub fn drop_on(member: &Member, target: Column<'_>) -> Option<Move> {
    let to = target.house_id();
    if member.house_id.as_deref() == to {
        return None;
    }
    Some(Move {
        member_id: member.id.clone(),
        to: to.map(str::to_string),
    })
}
