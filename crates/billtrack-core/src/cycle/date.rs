use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Recurrence {
    #[serde(alias = "once", alias = "one_time", alias = "onetime")]
    OneTime,
    Weekly,
    #[serde(alias = "biweekly", alias = "bi_weekly")]
    BiWeekly,
    Monthly,
    Quarterly,
    #[serde(alias = "yearly", alias = "annual")]
    Annually,
}

impl Recurrence {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OneTime => "one-time",
            Self::Weekly => "weekly",
            Self::BiWeekly => "bi-weekly",
            Self::Monthly => "monthly",
            Self::Quarterly => "quarterly",
            Self::Annually => "annually",
        }
    }

    pub const fn is_recurring(self) -> bool {
        !matches!(self, Self::OneTime)
    }

    /// Advances `date` by one step. Month-based steps clamp to the shorter of
    /// `anchor_day` and the target month's length, so a bill anchored on the
    /// 31st lands on Feb 28 and then back on Mar 31.
    pub fn advance_anchored(self, date: NaiveDate, anchor_day: u32) -> NaiveDate {
        match self {
            Self::OneTime => date,
            Self::Weekly => date + Duration::days(7),
            Self::BiWeekly => date + Duration::days(14),
            Self::Monthly => add_months_anchored(date, 1, anchor_day),
            Self::Quarterly => add_months_anchored(date, 3, anchor_day),
            Self::Annually => add_months_anchored(date, 12, anchor_day),
        }
    }
}

/// Returns the due date of the cycle that is active on `reference`.
///
/// Starting at `last_due`, the date advances one step at a time while it is
/// strictly before `reference`. A bill due on `reference` itself stays put.
pub fn next_due_date(last_due: NaiveDate, recurrence: Recurrence, reference: NaiveDate) -> NaiveDate {
    next_due_date_anchored(last_due, last_due.day(), recurrence, reference)
}

pub fn next_due_date_anchored(
    last_due: NaiveDate,
    anchor_day: u32,
    recurrence: Recurrence,
    reference: NaiveDate,
) -> NaiveDate {
    if !recurrence.is_recurring() {
        return last_due;
    }

    let mut candidate = last_due;
    while candidate < reference {
        let advanced = recurrence.advance_anchored(candidate, anchor_day);
        if advanced <= candidate {
            break;
        }
        candidate = advanced;
    }
    candidate
}

/// Parses a stored bill or transaction date, dropping any time-of-day.
///
/// Accepts `YYYY-MM-DD` plus ISO date-times with an optional fractional part
/// and offset. The calendar date written in the value is kept as-is; offsets
/// are not applied, so `2025-03-01T23:30:00-05:00` is March 1st.
pub fn parse_bill_date(value: &str) -> Option<NaiveDate> {
    let trimmed = value.trim();
    if trimmed.len() < 10 || !trimmed.is_char_boundary(10) {
        return None;
    }
    let (date_part, rest) = trimmed.split_at(10);
    if !looks_like_iso_date(date_part) {
        return None;
    }
    let date = NaiveDate::parse_from_str(date_part, "%Y-%m-%d").ok()?;
    if rest.is_empty() {
        return Some(date);
    }
    if !(rest.starts_with('T') || rest.starts_with(' ')) {
        return None;
    }

    let time_part = strip_offset(&rest[1..]);
    let joined = format!("{date_part}T{time_part}");
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%dT%H:%M"] {
        if NaiveDateTime::parse_from_str(&joined, format).is_ok() {
            return Some(date);
        }
    }
    None
}

pub fn format_iso_date(date: &NaiveDate) -> String {
    date.format("%Y-%m-%d").to_string()
}

pub fn add_months_clamped(date: NaiveDate, months: i32) -> NaiveDate {
    add_months_anchored(date, months, date.day())
}

pub fn add_months_anchored(date: NaiveDate, months: i32, anchor_day: u32) -> NaiveDate {
    let current_month = i32::try_from(date.month()).unwrap_or(1);
    let mut raw_month = current_month + months;
    let mut year = date.year();

    while raw_month > 12 {
        raw_month -= 12;
        year += 1;
    }
    while raw_month < 1 {
        raw_month += 12;
        year -= 1;
    }

    let month_u32 = u32::try_from(raw_month).unwrap_or(1);
    let day = anchor_day.clamp(1, 31).min(days_in_month(year, month_u32));
    if let Some(result) = NaiveDate::from_ymd_opt(year, month_u32, day) {
        return result;
    }
    date
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if is_leap_year(year) {
                29
            } else {
                28
            }
        }
        _ => 31,
    }
}

pub fn days_between(from: NaiveDate, to: NaiveDate) -> i64 {
    (to - from).num_days()
}

fn strip_offset(time: &str) -> &str {
    if let Some(stripped) = time.strip_suffix('Z') {
        return stripped;
    }
    if let Some(position) = time.rfind(['+', '-']) {
        return &time[..position];
    }
    time
}

fn looks_like_iso_date(value: &str) -> bool {
    if value.len() != 10 {
        return false;
    }
    let bytes = value.as_bytes();
    if bytes[4] != b'-' || bytes[7] != b'-' {
        return false;
    }

    for index in [0usize, 1, 2, 3, 5, 6, 8, 9] {
        if !bytes[index].is_ascii_digit() {
            return false;
        }
    }
    true
}

fn is_leap_year(year: i32) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}
