use chrono::{
    DateTime, Datelike, FixedOffset, NaiveDateTime, Offset, TimeZone, Timelike, Utc, Weekday,
};

const LOCAL_INPUT_FORMAT: &str = "%Y-%m-%dT%H:%M";

/// Single timezone rule for every timestamp the app shows or accepts.
///
/// Instants are stored in UTC. `datetime-local` input values are read in this offset,
/// and stored instants are rendered back in the same offset.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) struct TimePolicy {
    offset: FixedOffset,
}

impl TimePolicy {
    pub fn new(offset_minutes: i32) -> Self {
        let offset = FixedOffset::east_opt(offset_minutes.saturating_mul(60))
            .unwrap_or_else(|| Utc.fix());
        Self { offset }
    }

    pub fn utc() -> Self {
        Self { offset: Utc.fix() }
    }

    /// Offset the browser reports right now.
    pub fn browser() -> Self {
        Self::new(browser_offset_minutes())
    }

    pub fn offset_minutes(&self) -> i32 {
        self.offset.local_minus_utc() / 60
    }

    /// Parse a `datetime-local` value (`YYYY-MM-DDTHH:MM`, seconds optional).
    pub fn parse_local_input(&self, raw: &str) -> Option<DateTime<Utc>> {
        let raw = raw.trim();
        let naive = NaiveDateTime::parse_from_str(raw, LOCAL_INPUT_FORMAT)
            .or_else(|_| NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S"))
            .ok()?;
        self.offset
            .from_local_datetime(&naive)
            .single()
            .map(|dt| dt.with_timezone(&Utc))
    }

    pub fn to_local_input(&self, at: DateTime<Utc>) -> String {
        at.with_timezone(&self.offset)
            .format(LOCAL_INPUT_FORMAT)
            .to_string()
    }

    pub fn format_time(&self, at: DateTime<Utc>) -> String {
        at.with_timezone(&self.offset).format("%H:%M").to_string()
    }

    pub fn format_date(&self, at: DateTime<Utc>) -> String {
        at.with_timezone(&self.offset).format("%d/%m/%Y").to_string()
    }

    pub fn format_date_time(&self, at: DateTime<Utc>) -> String {
        at.with_timezone(&self.offset)
            .format("%d/%m/%Y %H:%M")
            .to_string()
    }

    /// Short pt-BR weekday of `at` in this offset.
    pub fn weekday_label(&self, at: DateTime<Utc>) -> &'static str {
        match at.with_timezone(&self.offset).weekday() {
            Weekday::Mon => "seg",
            Weekday::Tue => "ter",
            Weekday::Wed => "qua",
            Weekday::Thu => "qui",
            Weekday::Fri => "sex",
            Weekday::Sat => "sáb",
            Weekday::Sun => "dom",
        }
    }

    /// Minutes past local midnight.
    pub fn minute_of_day(&self, at: DateTime<Utc>) -> u32 {
        let local = at.with_timezone(&self.offset);
        local.hour() * 60 + local.minute()
    }
}

impl Default for TimePolicy {
    fn default() -> Self {
        Self::utc()
    }
}

pub(crate) fn duration_hours(start: DateTime<Utc>, end: DateTime<Utc>) -> f64 {
    (end - start).num_seconds() as f64 / 3600.0
}

/// `Xh Ym`, clamped at zero.
pub(crate) fn format_duration(start: DateTime<Utc>, end: DateTime<Utc>) -> String {
    let minutes = (end - start).num_minutes().max(0);
    format!("{}h {}m", minutes / 60, minutes % 60)
}

/// `HH:MM` for a minute-of-day value.
pub(crate) fn format_minute_of_day(minutes: u32) -> String {
    let minutes = minutes % (24 * 60);
    format!("{:02}:{:02}", minutes / 60, minutes % 60)
}

pub(crate) fn browser_offset_minutes() -> i32 {
    // getTimezoneOffset is positive west of UTC.
    -(js_sys::Date::new_0().get_timezone_offset().round() as i32)
}

pub(crate) fn now_secs() -> i64 {
    Utc::now().timestamp()
}
