// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! # Leap-second table: TAI↔UTC bookkeeping
//!
//! UTC differs from TAI by an integer number of seconds that changes only
//! when a leap second is inserted at the end of June or December.  When leap
//! seconds began (1972-01-01T00:00:00 UTC) the offset was fixed at
//! **10 s**; every table entry adds one.
//!
//! The table stores, for each entry, the **boundary instant**: the TAI
//! instant at which the inserted second `23:59:60` ends and the new offset
//! takes effect.  All lookups are binary searches over that sorted array.
//!
//! ## Table grammar
//!
//! ```text
//! # comment
//! 1972-06            one entry per line
//! 2016-12   # note   trailing comments after whitespace are allowed
//! ```
//!
//! `YYYY-MM` names the month whose last day ends with the inserted second.
//! Only `06` and `12` are valid and entries must be strictly increasing.
//! Negative leap seconds cannot be expressed and are not supported.
//!
//! ## Unix time aliasing
//!
//! Unix time has no `23:59:60`, so the leap second must alias onto some
//! other reading.  [`UnixAliasing`] selects the policy used by
//! [`LeapSecondTable::tai_to_unix`]; the inverse
//! [`LeapSecondTable::unix_to_tai`] always resolves an ambiguous Unix value
//! to the instant *after* the leap second.

use crate::error::{Result, TimeError};
use crate::instant::{AbsoluteTime, MICROS_PER_SECOND};
use chrono::{Datelike, NaiveDate};
use std::fmt;
use std::path::Path;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// TAI − UTC when leap seconds were introduced.
pub const INITIAL_OFFSET_SECONDS: i64 = 10;

/// Days from 1958-01-01 to the Unix epoch 1970-01-01.
pub const DAYS_EPOCH_TO_UNIX: i64 = 4_383;

/// Seconds from 1958-01-01 to 1970-01-01, both read on the same clock.
pub const UNIX_EPOCH_OFFSET_SECONDS: i64 = DAYS_EPOCH_TO_UNIX * 86_400;

/// 1972-01-01T00:00:00 read on a leap-free clock counted from 1958-01-01.
const UTC_START_SECONDS: i64 = 5_113 * 86_400;

/// 1972-01-01T00:00:00 UTC expressed as TAI (`1972-01-01T00:00:10 TAI`).
///
/// Every leap-second-aware operation rejects instants before this one.
pub const UTC_START: AbsoluteTime =
    AbsoluteTime::from_seconds(UTC_START_SECONDS + INITIAL_OFFSET_SECONDS);

/// Table bundled with the crate.
const EMBEDDED_TABLE: &str = include_str!("../data/leap_seconds.txt");

/// How [`LeapSecondTable::tai_to_unix`] maps instants inside a leap second.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum UnixAliasing {
    /// The Unix clock stops at the start of the leap second and stays there
    /// until the leap second is over; it never runs backwards.
    #[default]
    Freeze,
    /// POSIX behaviour: the Unix clock keeps running through the leap
    /// second and jumps back by one second when it ends.
    Posix,
}

/// One announced leap second: inserted at the end of `month` of `year`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct LeapSecondEntry {
    pub year: i32,
    pub month: u32,
}

impl LeapSecondEntry {
    /// Midnight following the inserted second, in leap-free seconds since
    /// 1958-01-01 (i.e. on a UTC clock that ignores leap seconds).
    fn utc_midnight_seconds(&self) -> Result<i64> {
        let (year, month) = match self.month {
            6 => (self.year, 7),
            12 => (self.year + 1, 1),
            other => {
                return Err(TimeError::format(format!(
                    "leap seconds are only inserted in June or December, got month {other}"
                )))
            }
        };
        let date = NaiveDate::from_ymd_opt(year, month, 1)
            .ok_or_else(|| TimeError::range(format!("leap-second entry {self} out of range")))?;
        Ok(days_since_epoch(date) * 86_400)
    }
}

impl fmt::Display for LeapSecondEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}", self.year, self.month)
    }
}

/// `Datelike::num_days_from_ce` of 1958-01-01.
const EPOCH_DAYS_FROM_CE: i64 = 714_780;

fn days_since_epoch(date: NaiveDate) -> i64 {
    i64::from(date.num_days_from_ce()) - EPOCH_DAYS_FROM_CE
}

/// Immutable, sorted table of leap-second boundaries.
///
/// Build one with [`LeapSecondTable::embedded`], [`LeapSecondTable::from_path`]
/// or by parsing text; share it through a [`TimeContext`](crate::TimeContext).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LeapSecondTable {
    entries: Vec<LeapSecondEntry>,
    /// TAI instants at which each inserted second ends.
    boundaries: Vec<AbsoluteTime>,
    /// The same boundaries read on a leap-free UTC clock (µs since 1958).
    utc_boundaries: Vec<i64>,
}

impl LeapSecondTable {
    // ── loading ───────────────────────────────────────────────────────

    /// Table bundled with the crate.
    pub fn embedded() -> Result<Self> {
        EMBEDDED_TABLE.parse()
    }

    /// Load a table file.
    ///
    /// A missing or unreadable file is a [`TimeError::Configuration`]; a
    /// malformed line is a [`TimeError::Format`].
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|e| {
            tracing::warn!(path = %path.display(), error = %e, "leap-second table unavailable");
            TimeError::configuration(format!(
                "cannot read leap-second table {}: {e}",
                path.display()
            ))
        })?;
        text.parse().inspect_err(|e| {
            tracing::warn!(path = %path.display(), error = %e, "leap-second table rejected");
        })
    }

    /// Build a table from entries, which must be strictly increasing.
    pub fn from_entries(entries: impl IntoIterator<Item = LeapSecondEntry>) -> Result<Self> {
        let mut table = Self {
            entries: Vec::new(),
            boundaries: Vec::new(),
            utc_boundaries: Vec::new(),
        };
        for entry in entries {
            table.push(entry)?;
        }
        Ok(table)
    }

    fn push(&mut self, entry: LeapSecondEntry) -> Result<()> {
        if entry.year < 1972 {
            return Err(TimeError::format(format!(
                "leap-second entry {entry} predates 1972"
            )));
        }
        if let Some(last) = self.entries.last() {
            if entry <= *last {
                return Err(TimeError::format(format!(
                    "leap-second entry {entry} does not follow {last}"
                )));
            }
        }
        let midnight = entry.utc_midnight_seconds()?;
        // Offset in force once this entry's leap second is over.
        let offset = INITIAL_OFFSET_SECONDS + self.entries.len() as i64 + 1;
        self.entries.push(entry);
        self.boundaries
            .push(AbsoluteTime::from_seconds(midnight + offset));
        self.utc_boundaries.push(midnight * MICROS_PER_SECOND);
        Ok(())
    }

    // ── accessors ─────────────────────────────────────────────────────

    /// Number of leap seconds in the table.
    #[inline]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Announcements in chronological order.
    #[inline]
    pub fn entries(&self) -> &[LeapSecondEntry] {
        &self.entries
    }

    /// TAI instants at which each leap second ends, in increasing order.
    #[inline]
    pub fn boundaries(&self) -> &[AbsoluteTime] {
        &self.boundaries
    }

    /// End of the most recent leap second, if any.
    #[inline]
    pub fn last_boundary(&self) -> Option<AbsoluteTime> {
        self.boundaries.last().copied()
    }

    // ── lookups ───────────────────────────────────────────────────────

    /// Number of boundaries at or before `t`.
    #[inline]
    fn boundaries_passed(&self, t: AbsoluteTime) -> usize {
        self.boundaries.partition_point(|b| *b <= t)
    }

    /// `true` iff `t` lies inside an inserted second, i.e. in
    /// `[boundary − 1 s, boundary)` for some boundary.
    pub fn is_leap_second(&self, t: AbsoluteTime) -> bool {
        let next = self.boundaries_passed(t);
        self.boundaries
            .get(next)
            .is_some_and(|b| t >= b.sub_seconds(1))
    }

    /// TAI − UTC in whole seconds at `t`.
    ///
    /// Fails with [`TimeError::Range`] before 1972-01-01T00:00:00 UTC.
    pub fn leap_seconds(&self, t: AbsoluteTime) -> Result<i64> {
        if t < UTC_START {
            return Err(TimeError::range(format!(
                "{t} precedes 1972-01-01T00:00:00Z, where leap seconds are undefined"
            )));
        }
        Ok(INITIAL_OFFSET_SECONDS + self.boundaries_passed(t) as i64)
    }

    // ── Unix bridge ───────────────────────────────────────────────────

    /// Unix time (µs since 1970-01-01T00:00:00, leap seconds not counted)
    /// corresponding to the TAI instant `t`.
    pub fn tai_to_unix(&self, t: AbsoluteTime, aliasing: UnixAliasing) -> Result<i64> {
        let offset = self.leap_seconds(t)?;
        let reading = match aliasing {
            UnixAliasing::Freeze if self.is_leap_second(t) => t.floor_to_second(),
            _ => t,
        };
        Ok(reading.sub_seconds(offset + UNIX_EPOCH_OFFSET_SECONDS).micros())
    }

    /// TAI instant for a Unix time in µs.
    ///
    /// Unix readings that occur both during and after a leap second resolve
    /// to the later instant, so the result is never inside a leap second.
    pub fn unix_to_tai(&self, unix_micros: i64) -> Result<AbsoluteTime> {
        let utc = unix_micros + UNIX_EPOCH_OFFSET_SECONDS * MICROS_PER_SECOND;
        if utc < UTC_START_SECONDS * MICROS_PER_SECOND {
            return Err(TimeError::range(format!(
                "Unix time {unix_micros} µs precedes 1972-01-01T00:00:00Z"
            )));
        }
        let passed = self.utc_boundaries.partition_point(|b| *b <= utc) as i64;
        Ok(AbsoluteTime::from_micros(utc).add_seconds(INITIAL_OFFSET_SECONDS + passed))
    }
}

impl FromStr for LeapSecondTable {
    type Err = TimeError;

    fn from_str(text: &str) -> Result<Self> {
        let mut table = Self::from_entries(Vec::new())?;
        for (index, raw) in text.lines().enumerate() {
            let line_no = index + 1;
            let line = raw.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let entry = parse_entry(line)
                .map_err(|e| TimeError::format(format!("line {line_no}: {e}")))?;
            table
                .push(entry)
                .map_err(|e| TimeError::format(format!("line {line_no}: {e}")))?;
        }
        tracing::debug!(
            entries = table.len(),
            last = ?table.entries.last().map(ToString::to_string),
            "parsed leap-second table"
        );
        Ok(table)
    }
}

fn parse_entry(line: &str) -> std::result::Result<LeapSecondEntry, String> {
    let (token, rest) = match line.find(char::is_whitespace) {
        Some(split) => line.split_at(split),
        None => (line, ""),
    };
    let rest = rest.trim_start();
    if !rest.is_empty() && !rest.starts_with('#') {
        return Err(format!("unexpected text after entry: {rest:?}"));
    }
    let bytes = token.as_bytes();
    let well_formed = bytes.len() == 7
        && bytes[4] == b'-'
        && bytes[..4].iter().all(u8::is_ascii_digit)
        && bytes[5..].iter().all(u8::is_ascii_digit);
    if !well_formed {
        return Err(format!("expected YYYY-MM, got {token:?}"));
    }
    let year = token[..4].parse().map_err(|e| format!("{e}"))?;
    let month = token[5..].parse().map_err(|e| format!("{e}"))?;
    Ok(LeapSecondEntry { year, month })
}

#[cfg(test)]
mod tests {
    use super::*;

    /// 2006-01-01T00:00:00Z as TAI: 17 532 days after 1958 plus 33 s.
    const NEW_YEAR_2006: AbsoluteTime = AbsoluteTime::from_seconds(17_532 * 86_400 + 33);

    fn table() -> LeapSecondTable {
        LeapSecondTable::embedded().expect("embedded table")
    }

    #[test]
    fn embedded_table_has_all_announcements() {
        let t = table();
        assert_eq!(t.len(), 27);
        assert_eq!(t.entries()[0], LeapSecondEntry { year: 1972, month: 6 });
        assert_eq!(
            t.entries().last(),
            Some(&LeapSecondEntry { year: 2016, month: 12 })
        );
    }

    #[test]
    fn boundaries_are_strictly_increasing() {
        let t = table();
        assert!(t.boundaries().windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn leap_second_around_2006() {
        let t = table();
        let before = NEW_YEAR_2006.sub_micros(1);
        assert!(t.is_leap_second(before));
        assert!(!t.is_leap_second(NEW_YEAR_2006));
        assert_eq!(t.leap_seconds(before).unwrap(), 32);
        assert_eq!(t.leap_seconds(NEW_YEAR_2006).unwrap(), 33);

        let start = NEW_YEAR_2006.sub_seconds(1);
        assert!(t.is_leap_second(start));
        assert!(!t.is_leap_second(start.sub_micros(1)));
    }

    #[test]
    fn leap_seconds_steps_by_one_at_each_boundary() {
        let t = table();
        for (i, b) in t.boundaries().iter().enumerate() {
            let before = t.leap_seconds(b.sub_micros(1)).unwrap();
            let after = t.leap_seconds(*b).unwrap();
            assert_eq!(before, 10 + i as i64);
            assert_eq!(after, before + 1);
        }
    }

    #[test]
    fn leap_seconds_rejects_pre_1972() {
        let t = table();
        assert_eq!(t.leap_seconds(UTC_START).unwrap(), 10);
        assert!(matches!(
            t.leap_seconds(UTC_START.sub_micros(1)),
            Err(TimeError::Range(_))
        ));
    }

    #[test]
    fn tai_to_unix_outside_leap_second() {
        let t = table();
        // 2006-01-01T00:00:00Z = 1 136 073 600 Unix seconds.
        let unix = t.tai_to_unix(NEW_YEAR_2006, UnixAliasing::Freeze).unwrap();
        assert_eq!(unix, 1_136_073_600 * MICROS_PER_SECOND);
        let unix = t.tai_to_unix(NEW_YEAR_2006, UnixAliasing::Posix).unwrap();
        assert_eq!(unix, 1_136_073_600 * MICROS_PER_SECOND);
    }

    #[test]
    fn freeze_stalls_unix_clock_during_leap_second() {
        let t = table();
        let inside = NEW_YEAR_2006.sub_micros(250_000);
        let frozen = t.tai_to_unix(inside, UnixAliasing::Freeze).unwrap();
        assert_eq!(frozen, 1_136_073_600 * MICROS_PER_SECOND);

        let just_before = NEW_YEAR_2006.sub_seconds(1).sub_micros(1);
        let unix_before = t.tai_to_unix(just_before, UnixAliasing::Freeze).unwrap();
        assert_eq!(unix_before, 1_136_073_600 * MICROS_PER_SECOND - 1);
    }

    #[test]
    fn posix_runs_through_leap_second_and_jumps_back() {
        let t = table();
        let inside = NEW_YEAR_2006.sub_micros(250_000);
        let posix = t.tai_to_unix(inside, UnixAliasing::Posix).unwrap();
        assert_eq!(posix, 1_136_073_600 * MICROS_PER_SECOND + 750_000);
        let after = t.tai_to_unix(NEW_YEAR_2006, UnixAliasing::Posix).unwrap();
        assert!(after < posix);
    }

    #[test]
    fn unix_to_tai_resolves_after_leap_second() {
        let t = table();
        let midnight = 1_136_073_600 * MICROS_PER_SECOND;
        assert_eq!(t.unix_to_tai(midnight).unwrap(), NEW_YEAR_2006);
        assert_eq!(
            t.unix_to_tai(midnight + 750_000).unwrap(),
            NEW_YEAR_2006.add_micros(750_000)
        );
        assert_eq!(
            t.unix_to_tai(midnight - 1).unwrap(),
            NEW_YEAR_2006.sub_seconds(1).sub_micros(1)
        );
    }

    #[test]
    fn unix_to_tai_never_lands_in_leap_second() {
        let t = table();
        for b in t.boundaries() {
            for delta in [-2_000_000, -1_000_001, -1_000_000, -500_000, -1, 0, 1] {
                let instant = b.add_micros(delta);
                for aliasing in [UnixAliasing::Freeze, UnixAliasing::Posix] {
                    let unix = t.tai_to_unix(instant, aliasing).unwrap();
                    let back = t.unix_to_tai(unix).unwrap();
                    assert!(!t.is_leap_second(back), "{instant:?} -> {back:?}");
                }
            }
        }
    }

    #[test]
    fn unix_to_tai_inverts_outside_leap_seconds() {
        let t = table();
        let instant = NEW_YEAR_2006.add_seconds(12_345).add_micros(678);
        let unix = t.tai_to_unix(instant, UnixAliasing::Posix).unwrap();
        assert_eq!(t.unix_to_tai(unix).unwrap(), instant);
    }

    #[test]
    fn unix_to_tai_rejects_pre_1972() {
        let t = table();
        // 1971-12-31T23:59:59Z
        assert!(matches!(
            t.unix_to_tai(63_071_999 * MICROS_PER_SECOND),
            Err(TimeError::Range(_))
        ));
        assert_eq!(
            t.unix_to_tai(63_072_000 * MICROS_PER_SECOND).unwrap(),
            UTC_START
        );
    }

    #[test]
    fn parser_skips_blanks_and_comments() {
        let t: LeapSecondTable = "# header\n\n1972-06\n  1972-12   # comment\n"
            .parse()
            .unwrap();
        assert_eq!(t.len(), 2);
    }

    #[test]
    fn parser_rejects_malformed_lines() {
        for bad in ["1972-6", "72-06", "1972/06", "1972-06 trailing", "1972-03"] {
            let err = bad.parse::<LeapSecondTable>().unwrap_err();
            assert!(matches!(err, TimeError::Format(_)), "{bad}: {err}");
            assert!(err.to_string().contains("line 1"), "{err}");
        }
    }

    #[test]
    fn parser_rejects_unordered_and_early_entries() {
        assert!(matches!(
            "1973-12\n1972-06".parse::<LeapSecondTable>(),
            Err(TimeError::Format(_))
        ));
        assert!(matches!(
            "1972-06\n1972-06".parse::<LeapSecondTable>(),
            Err(TimeError::Format(_))
        ));
        assert!(matches!(
            "1971-12".parse::<LeapSecondTable>(),
            Err(TimeError::Format(_))
        ));
    }

    #[test]
    fn missing_file_is_a_configuration_error() {
        let err = LeapSecondTable::from_path("/nonexistent/leap_seconds.txt").unwrap_err();
        assert!(matches!(err, TimeError::Configuration(_)));
    }

    #[test]
    fn empty_table_keeps_initial_offset() {
        let t = LeapSecondTable::from_entries(Vec::new()).unwrap();
        assert!(t.is_empty());
        assert_eq!(t.leap_seconds(NEW_YEAR_2006).unwrap(), 10);
        assert!(!t.is_leap_second(NEW_YEAR_2006));
        assert_eq!(t.last_boundary(), None);
    }
}
