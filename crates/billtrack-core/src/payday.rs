use chrono::{Datelike, Duration, NaiveDate, TimeDelta, Weekday};
use serde::Serialize;
use tracing::warn;

use crate::cycle::date::{add_months_clamped, days_between, days_in_month, parse_bill_date};
use crate::model::{IntervalSchedule, MonthlySchedule, PaySchedules};
use crate::{CoreError, CoreResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
pub enum PaydaySource {
    /// Fixed-interval schedule.
    #[serde(rename = "A")]
    Interval,
    /// Fixed days of the month.
    #[serde(rename = "B")]
    Monthly,
}

impl PaydaySource {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Interval => "A",
            Self::Monthly => "B",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Interval => "interval schedule",
            Self::Monthly => "day-of-month schedule",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Payday {
    pub date: NaiveDate,
    pub days_until: i64,
    pub source: PaydaySource,
    pub amount: f64,
}

/// Saturday moves back to Friday, Sunday back two days to Friday.
pub fn adjust_for_weekend(date: NaiveDate) -> NaiveDate {
    match date.weekday() {
        Weekday::Sat => date - Duration::days(1),
        Weekday::Sun => date - Duration::days(2),
        _ => date,
    }
}

/// First `last_paid + k * interval` on or after `today`.
pub fn next_interval_payday(schedule: &IntervalSchedule, today: NaiveDate) -> Option<NaiveDate> {
    if schedule.interval_days <= 0 {
        return None;
    }
    let last_paid = parse_bill_date(&schedule.last_paid_date)?;
    if last_paid >= today {
        return Some(last_paid);
    }
    let behind = days_between(last_paid, today);
    let steps = (behind - 1) / schedule.interval_days + 1;
    let offset = TimeDelta::try_days(steps.checked_mul(schedule.interval_days)?)?;
    last_paid.checked_add_signed(offset)
}

/// Earliest weekend-adjusted configured day in `today`'s month that has not
/// passed; otherwise the smallest configured day of next month.
pub fn next_monthly_payday(schedule: &MonthlySchedule, today: NaiveDate) -> Option<NaiveDate> {
    let mut days = schedule
        .days_of_month
        .iter()
        .copied()
        .filter(|day| (1..=31).contains(day))
        .collect::<Vec<u32>>();
    days.sort_unstable();
    days.dedup();
    let first_day = *days.first()?;

    let this_month = days
        .iter()
        .filter_map(|day| payday_in_month(today.year(), today.month(), *day))
        .filter(|candidate| *candidate >= today)
        .min();
    if this_month.is_some() {
        return this_month;
    }

    let next_month = add_months_clamped(today.with_day(1)?, 1);
    payday_in_month(next_month.year(), next_month.month(), first_day)
}

fn payday_in_month(year: i32, month: u32, day: u32) -> Option<NaiveDate> {
    let clamped = day.min(days_in_month(year, month));
    NaiveDate::from_ymd_opt(year, month, clamped).map(adjust_for_weekend)
}

/// Picks the earliest payday across configured schedules.
///
/// A schedule whose amount is zero or negative is ignored. Equal dates
/// resolve to the interval schedule.
pub fn next_payday(schedules: &PaySchedules, today: NaiveDate) -> CoreResult<Payday> {
    let mut candidates: Vec<(NaiveDate, PaydaySource, f64)> = Vec::new();

    if let Some(schedule) = schedules.interval.as_ref() {
        if schedule.amount <= 0.0 {
            warn!(amount = schedule.amount, "interval pay schedule has no amount; ignoring");
        } else {
            match next_interval_payday(schedule, today) {
                Some(date) => candidates.push((date, PaydaySource::Interval, schedule.amount)),
                None => warn!(
                    last_paid_date = %schedule.last_paid_date,
                    interval_days = schedule.interval_days,
                    "unusable interval pay schedule; ignoring"
                ),
            }
        }
    }

    if let Some(schedule) = schedules.monthly.as_ref() {
        if schedule.amount <= 0.0 {
            warn!(amount = schedule.amount, "monthly pay schedule has no amount; ignoring");
        } else {
            match next_monthly_payday(schedule, today) {
                Some(date) => candidates.push((date, PaydaySource::Monthly, schedule.amount)),
                None => warn!(
                    days_of_month = ?schedule.days_of_month,
                    "unusable monthly pay schedule; ignoring"
                ),
            }
        }
    }

    candidates
        .into_iter()
        .min_by(|left, right| left.0.cmp(&right.0).then_with(|| left.1.cmp(&right.1)))
        .map(|(date, source, amount)| Payday {
            date,
            days_until: days_between(today, date),
            source,
            amount,
        })
        .ok_or_else(CoreError::no_payday_information)
}
