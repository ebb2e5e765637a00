use chrono::{DateTime, FixedOffset, Local, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc};

/// Source of "now" and of the user's calendar day.
///
/// Instants are stored in UTC. Calendar days (today, due today, a typed
/// `YYYY-MM-DD`) are read in the user's zone, as given by [`Clock::offset_at`].
pub trait Clock {
    fn now(&self) -> DateTime<Utc>;

    /// UTC offset of the user's zone at `at`.
    fn offset_at(&self, at: DateTime<Utc>) -> FixedOffset;

    /// Resolves a wall-clock time in the user's zone. `None` when the time
    /// does not exist there (skipped by a DST change).
    fn from_local(&self, local: NaiveDateTime) -> Option<DateTime<Utc>>;

    /// `at` as seen on the user's wall clock.
    fn local(&self, at: DateTime<Utc>) -> DateTime<FixedOffset> {
        at.with_timezone(&self.offset_at(at))
    }

    /// The user's current calendar day.
    fn today(&self) -> NaiveDate {
        self.local(self.now()).date_naive()
    }

    /// Start of `day` in the user's zone.
    fn local_midnight(&self, day: NaiveDate) -> Option<DateTime<Utc>> {
        self.from_local(day.and_time(NaiveTime::MIN))
    }
}

/// The wall clock in the system time zone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }

    fn offset_at(&self, at: DateTime<Utc>) -> FixedOffset {
        *at.with_timezone(&Local).offset()
    }

    fn from_local(&self, local: NaiveDateTime) -> Option<DateTime<Utc>> {
        Local
            .from_local_datetime(&local)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
    }
}

/// A clock stuck at one instant in a fixed zone; used by tests and
/// reproducible runs.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    pub now: DateTime<Utc>,
    pub offset: FixedOffset,
}

impl FixedClock {
    /// Pinned at `now`, with UTC as the user's zone.
    pub fn utc(now: DateTime<Utc>) -> Self {
        FixedClock { now, offset: Utc.fix() }
    }

    pub fn with_offset(now: DateTime<Utc>, offset: FixedOffset) -> Self {
        FixedClock { now, offset }
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<Utc> {
        self.now
    }

    fn offset_at(&self, _at: DateTime<Utc>) -> FixedOffset {
        self.offset
    }

    fn from_local(&self, local: NaiveDateTime) -> Option<DateTime<Utc>> {
        self.offset
            .from_local_datetime(&local)
            .single()
            .map(|dt| dt.with_timezone(&Utc))
    }
}
