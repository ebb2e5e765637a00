//! Maintenance recurrence engine.
//!
//! Two pure functions drive every maintenance task:
//! - [`next_due_date`] advances a last-completed instant by one period.
//! - [`classify_status`] buckets a due date relative to an injected `today`.
//!
//! Month arithmetic clamps to the last valid day of the target month, so
//! `2024-01-31 + 1 month` is `2024-02-29` and `2024-02-29 + 1 year` is
//! `2025-02-28`.

use chrono::{DateTime, Duration, Months, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

labelled_enum! {
    /// How often a maintenance task recurs.
    pub enum Frequency ("frequency") {
        Weekly => "weekly",
        Monthly => "monthly",
        Quarterly => "quarterly",
        SemiAnnually => "semi-annually",
        Annually => "annually",
    }
}

impl Frequency {
    /// Calendar months in one period, or `None` for day-based periods.
    fn months(self) -> Option<u32> {
        match self {
            Frequency::Weekly => None,
            Frequency::Monthly => Some(1),
            Frequency::Quarterly => Some(3),
            Frequency::SemiAnnually => Some(6),
            Frequency::Annually => Some(12),
        }
    }

    /// Human form used in tables ("semi annually").
    pub fn display_name(&self) -> String {
        self.as_str().replace('-', " ")
    }
}

labelled_enum! {
    /// Urgency derived from a due date; recomputed on every read.
    pub enum DueStatus ("due status") {
        Overdue => "overdue",
        DueToday => "due_today",
        DueSoon => "due_soon",
        Upcoming => "upcoming",
    }
}

labelled_enum! {
    /// Status shown for a maintenance task: a derived urgency or the sticky
    /// completed state.
    pub enum TaskStatus ("status") {
        Overdue => "overdue",
        DueToday => "due_today",
        DueSoon => "due_soon",
        Upcoming => "upcoming",
        Completed => "completed",
    }
}

impl From<DueStatus> for TaskStatus {
    fn from(s: DueStatus) -> Self {
        match s {
            DueStatus::Overdue => TaskStatus::Overdue,
            DueStatus::DueToday => TaskStatus::DueToday,
            DueStatus::DueSoon => TaskStatus::DueSoon,
            DueStatus::Upcoming => TaskStatus::Upcoming,
        }
    }
}

impl TaskStatus {
    pub fn display_name(&self) -> &'static str {
        match self {
            TaskStatus::Overdue => "Overdue",
            TaskStatus::DueToday => "Due Today",
            TaskStatus::DueSoon => "Due Soon",
            TaskStatus::Upcoming => "Upcoming",
            TaskStatus::Completed => "Completed",
        }
    }

    /// Overdue or due today.
    pub fn is_urgent(&self) -> bool {
        matches!(self, TaskStatus::Overdue | TaskStatus::DueToday)
    }
}

/// The persisted part of a task's status.
///
/// Only completion is stored; everything else is derived from the due date.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ScheduleState {
    #[default]
    Derived,
    Completed { completed_at: DateTime<Utc> },
}

/// Returns `last_completed` advanced by one period of `frequency`.
///
/// Time of day is preserved. If the result would leave chrono's supported
/// range the input is returned unchanged.
pub fn next_due_date(last_completed: DateTime<Utc>, frequency: Frequency) -> DateTime<Utc> {
    let next = match frequency.months() {
        None => last_completed.checked_add_signed(Duration::days(7)),
        Some(n) => last_completed.checked_add_months(Months::new(n)),
    };
    next.unwrap_or_else(|| {
        warn!(%last_completed, %frequency, "next due date out of range; keeping last completed date");
        last_completed
    })
}

/// Classifies a due date against `today` at calendar-day granularity.
///
/// `next_due` is compared by its calendar date in its own zone, so pass it
/// in the same zone `today` was taken in. Time of day is ignored.
pub fn classify_status<Tz: TimeZone>(next_due: DateTime<Tz>, today: NaiveDate) -> DueStatus {
    match days_until(next_due, today) {
        d if d < 0 => DueStatus::Overdue,
        0 => DueStatus::DueToday,
        1..=7 => DueStatus::DueSoon,
        _ => DueStatus::Upcoming,
    }
}

/// Days from `today` until `next_due`, negative when overdue.
pub fn days_until<Tz: TimeZone>(next_due: DateTime<Tz>, today: NaiveDate) -> i64 {
    (next_due.date_naive() - today).num_days()
}
