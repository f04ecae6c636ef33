//! ISO 8601 date / date-time checking.
//!
//! Accepted shapes:
//!
//! ```text
//! YYYY-MM-DD
//! YYYY-MM-DDTHH:MM[:SS[.f{1,3}]][Z|(+|-)HH:MM]
//! ```
//!
//! A value must first match this grammar exactly and then name a real
//! instant: `2026-13-40` has the right shape but is rejected.

use chrono::{FixedOffset, NaiveDate, NaiveTime, TimeZone};
use regex::Regex;
use std::sync::LazyLock;

/// Returns true when `value` is a well-formed and real ISO 8601 date or
/// date-time.
pub fn is_valid_date_time(value: &str) -> bool {
    scan(value).map(|parts| parts.is_real()).unwrap_or(false)
}

#[derive(Debug, Default, PartialEq)]
struct Components {
    year: u32,
    month: u32,
    day: u32,
    time: Option<TimeOfDay>,
    offset: Option<Offset>,
}

#[derive(Debug, Default, PartialEq)]
struct TimeOfDay {
    hour: u32,
    minute: u32,
    second: u32,
    millis: u32,
}

#[derive(Debug, PartialEq)]
struct Offset {
    negative: bool,
    hours: u32,
    minutes: u32,
}

impl Components {
    fn is_real(&self) -> bool {
        let Some(date) = NaiveDate::from_ymd_opt(self.year as i32, self.month, self.day) else {
            return false;
        };
        let Some(time) = &self.time else {
            return true;
        };
        let Some(clock) =
            NaiveTime::from_hms_milli_opt(time.hour, time.minute, time.second, time.millis)
        else {
            return false;
        };

        let offset = match &self.offset {
            None => FixedOffset::east_opt(0),
            Some(offset) if offset.hours > 23 || offset.minutes > 59 => None,
            Some(offset) => {
                let seconds = (offset.hours * 3600 + offset.minutes * 60) as i32;
                FixedOffset::east_opt(if offset.negative { -seconds } else { seconds })
            }
        };

        offset
            .and_then(|tz| tz.from_local_datetime(&date.and_time(clock)).single())
            .is_some()
    }
}

static SURFACE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"^([0-9]{4})-([0-9]{2})-([0-9]{2})(?:T([0-9]{2}):([0-9]{2})(?::([0-9]{2})(?:\.([0-9]{1,3}))?)?(Z|[+-][0-9]{2}:[0-9]{2})?)?$",
    )
    .expect("valid date-time pattern")
});

fn scan(value: &str) -> Option<Components> {
    let caps = SURFACE.captures(value)?;
    let number = |i: usize| caps.get(i).and_then(|m| m.as_str().parse::<u32>().ok());

    let mut parts = Components {
        year: number(1)?,
        month: number(2)?,
        day: number(3)?,
        ..Default::default()
    };

    if caps.get(4).is_some() {
        let millis = caps.get(7).map_or(0, |m| {
            let digits = m.as_str();
            let fraction = digits.parse::<u32>().unwrap_or(0);
            fraction * 10u32.pow(3 - digits.len() as u32)
        });
        parts.time = Some(TimeOfDay {
            hour: number(4)?,
            minute: number(5)?,
            second: number(6).unwrap_or(0),
            millis,
        });

        parts.offset = caps.get(8).map(|m| match m.as_str() {
            "Z" => Offset {
                negative: false,
                hours: 0,
                minutes: 0,
            },
            signed => Offset {
                negative: signed.starts_with('-'),
                hours: signed[1..3].parse().unwrap_or(0),
                minutes: signed[4..6].parse().unwrap_or(0),
            },
        });
    }

    Some(parts)
}
