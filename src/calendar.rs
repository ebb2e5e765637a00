use std::collections::BTreeMap;
use chrono::{Datelike, Duration, NaiveDate};
use crate::clock::Clock;
use crate::models::Appointment;

/// One cell of a month grid.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub in_month: bool,
    pub is_today: bool,
}

/// First day of the month containing `date`.
pub fn month_start(date: NaiveDate) -> NaiveDate {
    date.with_day(1).unwrap_or(date)
}

/// Shifts a month anchor by `delta` months, landing on the 1st.
pub fn shift_month(anchor: NaiveDate, delta: i32) -> NaiveDate {
    let index = anchor.year() * 12 + anchor.month0() as i32 + delta;
    NaiveDate::from_ymd_opt(index.div_euclid(12), index.rem_euclid(12) as u32 + 1, 1)
        .unwrap_or(anchor)
}

/// Sunday-first weeks covering the month of `anchor`.
///
/// Leading cells come from the previous month and trailing cells fill out the
/// last week, so the length is always a multiple of seven.
pub fn month_grid(anchor: NaiveDate, today: NaiveDate) -> Vec<CalendarDay> {
    let first = month_start(anchor);
    let next_first = shift_month(first, 1);
    let lead = first.weekday().num_days_from_sunday() as i64;
    let days_in_month = (next_first - first).num_days();
    let total = lead + days_in_month;
    let cells = (total + 6) / 7 * 7;

    (0..cells)
        .map(|i| {
            let date = first + Duration::days(i - lead);
            let in_month = date.month() == first.month() && date.year() == first.year();
            CalendarDay {
                date,
                in_month,
                is_today: in_month && date == today,
            }
        })
        .collect()
}

/// Groups appointments by the local calendar day they start on, each day
/// sorted by start time.
pub fn appointments_by_day<'a, I, C>(appointments: I, clock: &C) -> BTreeMap<NaiveDate, Vec<&'a Appointment>>
where
    I: IntoIterator<Item = &'a Appointment>,
    C: Clock + ?Sized,
{
    let mut grouped: BTreeMap<NaiveDate, Vec<&Appointment>> = BTreeMap::new();
    for appt in appointments {
        grouped.entry(clock.local(appt.start).date_naive()).or_default().push(appt);
    }
    for day in grouped.values_mut() {
        day.sort_by_key(|a| a.start);
    }
    grouped
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{FixedOffset, TimeZone, Utc};
    use crate::clock::FixedClock;
    use crate::models::AppointmentStatus;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn grid_pads_to_whole_weeks() {
        // March 2024 starts on a Friday and has 31 days.
        let grid = month_grid(d(2024, 3, 15), d(2024, 3, 15));
        assert_eq!(grid.len(), 42);
        assert_eq!(grid[0].date, d(2024, 2, 25));
        assert!(!grid[0].in_month);
        assert_eq!(grid[5].date, d(2024, 3, 1));
        assert!(grid[5].in_month);
        assert_eq!(grid.iter().filter(|c| c.is_today).count(), 1);
        assert_eq!(grid[41].date, d(2024, 4, 6));
    }

    #[test]
    fn grid_without_padding() {
        // September 2024 starts on a Sunday; October 2024 starts on a Tuesday.
        let grid = month_grid(d(2024, 9, 1), d(2000, 1, 1));
        assert_eq!(grid[0].date, d(2024, 9, 1));
        assert_eq!(grid.len(), 35);
        assert_eq!(grid[34].date, d(2024, 10, 5));
    }

    #[test]
    fn shift_month_wraps_years() {
        assert_eq!(shift_month(d(2024, 12, 31), 1), d(2025, 1, 1));
        assert_eq!(shift_month(d(2024, 1, 10), -1), d(2023, 12, 1));
    }

    #[test]
    fn appointments_group_by_local_start_day() {
        let start = Utc.with_ymd_and_hms(2024, 3, 1, 3, 0, 0).unwrap();
        let appt = Appointment {
            id: "appt-1".into(),
            member_id: "member-1".into(),
            title: "Dentist".into(),
            description: None,
            start,
            end: start,
            status: AppointmentStatus::Scheduled,
            created_at: start,
            updated_at: start,
        };
        let pacific = FixedClock::with_offset(start, FixedOffset::west_opt(8 * 3600).unwrap());
        let by_day = appointments_by_day([&appt], &pacific);
        assert_eq!(by_day.keys().copied().collect::<Vec<_>>(), vec![d(2024, 2, 29)]);
        let by_day = appointments_by_day([&appt], &FixedClock::utc(start));
        assert_eq!(by_day.keys().copied().collect::<Vec<_>>(), vec![d(2024, 3, 1)]);
    }
}
