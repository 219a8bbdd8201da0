// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Leap-second-aware proleptic Gregorian calendar.
//!
//! [`GregorianCalendar`] splits a clock reading into [`CalendarFields`] and
//! back.  The Gregorian rules are applied proleptically (no 1582 cutover)
//! through `chrono`, whose supported range (about ±262 000 years) bounds
//! the calendar.
//!
//! Two modes exist:
//!
//! - **uniform**: the reading is a leap-free clock (TAI, TT, TDB), every day
//!   has 86 400 s;
//! - **UTC**: the input is a TAI instant and the [`LeapSecondTable`] is
//!   consulted to subtract TAI − UTC.  In leap-aware mode an instant inside
//!   an inserted second decomposes to `23:59:60.ffffff`.

use crate::error::{Result, TimeError};
use crate::instant::{AbsoluteTime, MICROS_PER_SECOND};
use crate::leap_seconds::{LeapSecondTable, UnixAliasing, UNIX_EPOCH_OFFSET_SECONDS};
use crate::scales::TimeScale;
use chrono::{DateTime, Datelike, NaiveDate, Timelike};
use std::fmt;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

const UNIX_EPOCH_OFFSET_MICROS: i64 = UNIX_EPOCH_OFFSET_SECONDS * MICROS_PER_SECOND;

/// Broken-down calendar reading.
///
/// `second == 60` only denotes a real leap second in leap-aware UTC mode.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CalendarFields {
    pub year: i32,
    /// 1–12
    pub month: u32,
    /// 1–31
    pub day: u32,
    /// 0–23
    pub hour: u32,
    /// 0–59
    pub minute: u32,
    /// 0–60
    pub second: u32,
    /// 0–999 999
    pub microsecond: u32,
}

impl CalendarFields {
    pub const fn new(
        year: i32,
        month: u32,
        day: u32,
        hour: u32,
        minute: u32,
        second: u32,
        microsecond: u32,
    ) -> Self {
        Self {
            year,
            month,
            day,
            hour,
            minute,
            second,
            microsecond,
        }
    }

    /// Midnight at the start of the given date.
    pub const fn date(year: i32, month: u32, day: u32) -> Self {
        Self::new(year, month, day, 0, 0, 0, 0)
    }

    /// Whether the reading is `hh:mm:60`.
    #[inline]
    pub const fn is_leap_second(&self) -> bool {
        self.second == 60
    }
}

impl fmt::Display for CalendarFields {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}.{:06}",
            self.year, self.month, self.day, self.hour, self.minute, self.second, self.microsecond
        )
    }
}

#[derive(Debug, Copy, Clone)]
enum Mode<'a> {
    Uniform,
    Utc {
        table: &'a LeapSecondTable,
        leap_aware: bool,
    },
}

/// Converter between clock readings and [`CalendarFields`].
#[derive(Debug, Copy, Clone)]
pub struct GregorianCalendar<'a> {
    mode: Mode<'a>,
}

impl<'a> GregorianCalendar<'a> {
    /// Calendar for a leap-free reading (TAI, TT, TDB).
    pub const fn uniform() -> Self {
        Self {
            mode: Mode::Uniform,
        }
    }

    /// Leap-aware UTC calendar over TAI instants.
    pub const fn utc(table: &'a LeapSecondTable) -> Self {
        Self {
            mode: Mode::Utc {
                table,
                leap_aware: true,
            },
        }
    }

    /// The calendar matching `scale`: UTC for [`TimeScale::Utc`], uniform
    /// otherwise.
    pub const fn for_scale(scale: TimeScale, table: &'a LeapSecondTable) -> Self {
        match scale {
            TimeScale::Utc => Self::utc(table),
            _ => Self::uniform(),
        }
    }

    /// Toggle `23:59:60` display.  When disabled, an instant inside a leap
    /// second decomposes POSIX-style into the first second of the next day.
    /// Has no effect on a uniform calendar.
    pub const fn leap_aware(self, enabled: bool) -> Self {
        match self.mode {
            Mode::Utc { table, .. } => Self {
                mode: Mode::Utc {
                    table,
                    leap_aware: enabled,
                },
            },
            Mode::Uniform => self,
        }
    }

    /// Split a reading into calendar fields.
    pub fn decompose(&self, t: AbsoluteTime) -> Result<CalendarFields> {
        match self.mode {
            Mode::Uniform => fields_from_leap_free(t.micros()),
            Mode::Utc { table, leap_aware } => {
                let within_leap = leap_aware && table.is_leap_second(t.floor_to_second());
                let working = if within_leap { t.sub_seconds(1) } else { t };
                let unix = table.tai_to_unix(working, UnixAliasing::Posix)?;
                let mut fields = fields_from_leap_free(unix + UNIX_EPOCH_OFFSET_MICROS)?;
                if within_leap {
                    fields.second = 60;
                }
                Ok(fields)
            }
        }
    }

    /// Assemble calendar fields into a reading; the exact inverse of
    /// [`decompose`](Self::decompose).
    pub fn compose(&self, fields: &CalendarFields) -> Result<AbsoluteTime> {
        match self.mode {
            Mode::Uniform => {
                if fields.is_leap_second() {
                    return Err(TimeError::range(format!(
                        "{fields}: second 60 on a scale without leap seconds"
                    )));
                }
                Ok(AbsoluteTime::from_micros(leap_free_from_fields(fields)?))
            }
            Mode::Utc { table, leap_aware } => {
                if fields.is_leap_second() && !leap_aware {
                    return Err(TimeError::range(format!(
                        "{fields}: second 60 while leap seconds are disabled"
                    )));
                }
                let utc = leap_free_from_fields(fields)?;
                let t = table.unix_to_tai(utc - UNIX_EPOCH_OFFSET_MICROS)?;
                if !fields.is_leap_second() {
                    return Ok(t);
                }
                let t = t.add_seconds(1);
                if table.is_leap_second(t) {
                    Ok(t)
                } else {
                    Err(TimeError::range(format!("{fields} is not a leap second")))
                }
            }
        }
    }
}

/// Decompose µs since 1958-01-01 on a leap-free clock.
fn fields_from_leap_free(micros: i64) -> Result<CalendarFields> {
    let seconds = micros.div_euclid(MICROS_PER_SECOND);
    let microsecond = micros.rem_euclid(MICROS_PER_SECOND) as u32;
    let dt = DateTime::from_timestamp(seconds - UNIX_EPOCH_OFFSET_SECONDS, 0).ok_or_else(|| {
        TimeError::range(format!("{micros} µs is outside the supported calendar range"))
    })?;
    Ok(CalendarFields {
        year: dt.year(),
        month: dt.month(),
        day: dt.day(),
        hour: dt.hour(),
        minute: dt.minute(),
        second: dt.second(),
        microsecond,
    })
}

/// Compose fields into µs since 1958-01-01 on a leap-free clock, reading
/// second 60 as 59.
fn leap_free_from_fields(fields: &CalendarFields) -> Result<i64> {
    let invalid = || TimeError::range(format!("invalid calendar fields {fields}"));
    if fields.hour > 23
        || fields.minute > 59
        || fields.second > 60
        || fields.microsecond >= MICROS_PER_SECOND as u32
    {
        return Err(invalid());
    }
    let second = fields.second.min(59);
    let dt = NaiveDate::from_ymd_opt(fields.year, fields.month, fields.day)
        .and_then(|date| date.and_hms_opt(fields.hour, fields.minute, second))
        .ok_or_else(invalid)?
        .and_utc();
    assert_eq!(
        dt.timestamp_subsec_nanos(),
        0,
        "calendar composition left a sub-second remainder"
    );
    Ok((dt.timestamp() + UNIX_EPOCH_OFFSET_SECONDS) * MICROS_PER_SECOND
        + i64::from(fields.microsecond))
}
