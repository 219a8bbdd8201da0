// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Precision time for flight dynamics
//!
//! This crate provides a single absolute time representation, a leap-second
//! table, the TAI/UTC/TT/TDB time scales, and the codecs that turn instants
//! into calendar text, Modified Julian Dates and CCSDS binary time codes.
//!
//! # Core types
//!
//! - [`AbsoluteTime`]: signed microseconds since `1958-01-01T00:00:00 TAI`.
//! - [`LeapSecondTable`]: TAI − UTC bookkeeping and the Unix bridge.
//! - [`TimeContext`]: shared, hot-swappable leap-second table snapshot.
//! - [`TimeScale`]: closed set of scales with offset functions.
//! - [`GregorianCalendar`]: instant ↔ [`CalendarFields`], leap-aware in UTC.
//!
//! # Codecs
//!
//! | Codec | Form | Example |
//! |-------|------|---------|
//! | [`TextFormat`] | ISO-8601-like text | `2005-12-31T23:59:60.500Z` |
//! | [`JulianDateFormat`] | MJD / MJD2000 day count | `53 736.0` |
//! | [`CucCodec`] | CCSDS Unsegmented Time Code | `5A 49 7A 24 00 00` |
//!
//! # Leap seconds
//!
//! UTC operations need a [`LeapSecondTable`].  The crate embeds a copy of
//! the announced leap seconds ([`LeapSecondTable::embedded`]); a table file
//! in the same grammar can be loaded with [`LeapSecondTable::from_path`].
//! Leap-second-aware operations reject instants before
//! 1972-01-01T00:00:00 UTC with [`TimeError::Range`].
//!
//! ```
//! use fdtime::{LeapSecondTable, TextFormat, TimeScale};
//!
//! let table = LeapSecondTable::embedded().unwrap();
//! let utc = TextFormat::new(TimeScale::Utc, 1).unwrap();
//! let t = utc.parse("2016-12-31T23:59:60.5Z", &table).unwrap();
//! assert!(table.is_leap_second(t));
//! assert_eq!(utc.format(t, &table).unwrap(), "2016-12-31T23:59:60.5Z");
//! ```

pub mod calendar;
pub mod context;
pub mod cuc;
pub mod error;
pub(crate) mod instant;
pub mod julian_date;
pub mod leap_seconds;
pub(crate) mod scales;
pub mod text;

// ── Re-exports ────────────────────────────────────────────────────────────

pub use calendar::{CalendarFields, GregorianCalendar};
pub use context::TimeContext;
pub use cuc::CucCodec;
pub use error::{Result, TimeError};
pub use instant::{AbsoluteTime, MICROS_PER_DAY, MICROS_PER_SECOND};
pub use julian_date::{JulianDateFormat, JulianEpoch};
pub use leap_seconds::{LeapSecondEntry, LeapSecondTable, UnixAliasing, UTC_START};
pub use scales::{tdb_minus_tt, TimeScale, TT_MINUS_TAI_MICROS};
pub use text::{FractionWidth, Rounding, TextFormat};
