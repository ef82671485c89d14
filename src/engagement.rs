//! Engagement time series.
//!
//! Alerts are folded into a sparse `key -> count` map first, and the series is
//! then materialized by walking the canonical bucket keys for the period. The
//! output shape never depends on which keys happen to appear in the data.

use crate::models::{Alert, Bucket, Period};
use crate::state::Clock;
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime};
use std::collections::HashMap;

/// Anything carrying the instant an alert went out.
pub trait Event {
    fn sent_at(&self) -> NaiveDateTime;
}

impl Event for Alert {
    fn sent_at(&self) -> NaiveDateTime {
        self.sent_at
    }
}

impl Event for NaiveDateTime {
    fn sent_at(&self) -> NaiveDateTime {
        *self
    }
}

/// Same as [`aggregate_at`], with `now` read from `clock`.
pub fn aggregate<'a, E, I>(events: I, period: Period, clock: &Clock) -> Vec<Bucket>
where
    E: Event + 'a,
    I: IntoIterator<Item = &'a E>,
{
    aggregate_at(events, period, clock.now())
}

/// Builds the series for `period` ending at the bucket containing `now`.
///
/// Only events in `[window_start(period, now), now]` are counted; anything
/// outside is dropped rather than clipped into an edge bucket.
pub fn aggregate_at<'a, E, I>(events: I, period: Period, now: NaiveDateTime) -> Vec<Bucket>
where
    E: Event + 'a,
    I: IntoIterator<Item = &'a E>,
{
    let start = window_start(period, now);

    let mut grouped: HashMap<String, u64> = HashMap::new();
    for sent_at in events
        .into_iter()
        .map(|event| event.sent_at())
        .filter(|sent_at| *sent_at >= start && *sent_at <= now)
    {
        let count = grouped.entry(bucket_key(period, sent_at)).or_default();
        *count = count.saturating_add(1);
    }

    bucket_days(period, now.date())
        .into_iter()
        .map(|day| {
            let key = day_key(period, day);
            let count = grouped.get(&key).copied().unwrap_or(0);
            Bucket {
                label: day.format(short_format(period)).to_string(),
                full_label: day.format(long_format(period)).to_string(),
                key,
                count,
            }
        })
        .collect()
}

/// First instant counted for `period`: midnight of the oldest bucket.
pub fn window_start(period: Period, now: NaiveDateTime) -> NaiveDateTime {
    first_bucket_day(period, now.date()).and_time(NaiveTime::MIN)
}

/// Sortable key of the bucket that `instant` falls into.
pub fn bucket_key(period: Period, instant: NaiveDateTime) -> String {
    let day = match period {
        Period::Week | Period::Month => instant.date(),
        Period::Year => month_start(instant.date()),
    };
    day_key(period, day)
}

/// Representative day of every bucket, oldest first.
fn bucket_days(period: Period, today: NaiveDate) -> Vec<NaiveDate> {
    let first = first_bucket_day(period, today);
    let mut days = Vec::with_capacity(period.bucket_count());
    match period {
        Period::Week | Period::Month => {
            for offset in 0..period.bucket_count() {
                days.push(first + Duration::days(offset as i64));
            }
        }
        Period::Year => {
            let mut month = first;
            days.push(month);
            for _ in 1..period.bucket_count() {
                // the 1st plus 31 days always lands in the following month
                month = month_start(month + Duration::days(31));
                days.push(month);
            }
        }
    }
    days
}

fn first_bucket_day(period: Period, today: NaiveDate) -> NaiveDate {
    let span = period.bucket_count() - 1;
    match period {
        Period::Week | Period::Month => today - Duration::days(span as i64),
        Period::Year => {
            let mut month = month_start(today);
            for _ in 0..span {
                month = month_start(month - Duration::days(1));
            }
            month
        }
    }
}

fn month_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.day0()))
}

fn day_key(period: Period, day: NaiveDate) -> String {
    match period {
        Period::Week | Period::Month => day.format("%Y-%m-%d").to_string(),
        Period::Year => day.format("%Y-%m").to_string(),
    }
}

const fn short_format(period: Period) -> &'static str {
    match period {
        Period::Week => "%a",
        Period::Month => "%b %-d",
        Period::Year => "%b",
    }
}

const fn long_format(period: Period) -> &'static str {
    match period {
        Period::Week => "%A, %b %-d, %Y",
        Period::Month => "%b %-d, %Y",
        Period::Year => "%B %Y",
    }
}
