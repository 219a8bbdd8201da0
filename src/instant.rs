// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Absolute instant on the TAI axis.
//!
//! [`AbsoluteTime`] is the hub type of the crate.  It stores a single `i64`
//! count of microseconds elapsed since **1958-01-01T00:00:00 TAI** and knows
//! nothing about leap seconds, calendars, or time scales: those are layered
//! on top by [`TimeScale`](crate::TimeScale), the
//! [`LeapSecondTable`](crate::LeapSecondTable) and the codecs.
//!
//! The representable range is roughly ±290 000 years around the epoch.
//! Arithmetic is plain integer arithmetic; overflow at the extremes of the
//! range is not checked.

use qtty::Seconds;
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Microseconds in one SI second.
pub const MICROS_PER_SECOND: i64 = 1_000_000;

/// Microseconds in one 86 400 s day.
pub const MICROS_PER_DAY: i64 = 86_400 * MICROS_PER_SECOND;

/// An instant, counted in TAI microseconds since 1958-01-01T00:00:00 TAI.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct AbsoluteTime {
    micros: i64,
}

impl AbsoluteTime {
    /// 1958-01-01T00:00:00 TAI.
    pub const EPOCH: Self = Self::from_micros(0);

    /// Earliest representable instant.
    pub const MIN: Self = Self::from_micros(i64::MIN);

    /// Latest representable instant.
    pub const MAX: Self = Self::from_micros(i64::MAX);

    // ── constructors ──────────────────────────────────────────────────

    /// Create from microseconds since the epoch.
    #[inline]
    pub const fn from_micros(micros: i64) -> Self {
        Self { micros }
    }

    /// Create from whole seconds since the epoch.
    #[inline]
    pub const fn from_seconds(seconds: i64) -> Self {
        Self::from_micros(seconds * MICROS_PER_SECOND)
    }

    // ── accessors ─────────────────────────────────────────────────────

    /// Microseconds since the epoch.
    #[inline]
    pub const fn micros(&self) -> i64 {
        self.micros
    }

    /// Whole seconds since the epoch, rounded towards negative infinity.
    #[inline]
    pub const fn whole_seconds(&self) -> i64 {
        self.micros.div_euclid(MICROS_PER_SECOND)
    }

    /// Microseconds past [`whole_seconds`](Self::whole_seconds), in `0..1_000_000`.
    #[inline]
    pub const fn subsec_micros(&self) -> i64 {
        self.micros.rem_euclid(MICROS_PER_SECOND)
    }

    /// This instant with its sub-second part dropped (towards the past).
    #[inline]
    pub const fn floor_to_second(&self) -> Self {
        Self::from_seconds(self.whole_seconds())
    }

    // ── arithmetic ────────────────────────────────────────────────────

    #[inline]
    pub const fn add_micros(self, micros: i64) -> Self {
        Self::from_micros(self.micros + micros)
    }

    #[inline]
    pub const fn sub_micros(self, micros: i64) -> Self {
        Self::from_micros(self.micros - micros)
    }

    #[inline]
    pub const fn add_seconds(self, seconds: i64) -> Self {
        self.add_micros(seconds * MICROS_PER_SECOND)
    }

    #[inline]
    pub const fn sub_seconds(self, seconds: i64) -> Self {
        self.sub_micros(seconds * MICROS_PER_SECOND)
    }

    /// Signed elapsed time from `earlier` to `self`, in microseconds.
    #[inline]
    pub const fn micros_since(&self, earlier: Self) -> i64 {
        self.micros - earlier.micros
    }

    /// Signed elapsed time from `earlier` to `self` as a [`Seconds`] quantity.
    #[inline]
    pub fn elapsed_since(&self, earlier: Self) -> Seconds {
        Seconds::new(self.micros_since(earlier) as f64 / MICROS_PER_SECOND as f64)
    }

    // ── min / max ─────────────────────────────────────────────────────

    /// Element-wise minimum.
    #[inline]
    pub const fn min(self, other: Self) -> Self {
        if self.micros <= other.micros {
            self
        } else {
            other
        }
    }

    /// Element-wise maximum.
    #[inline]
    pub const fn max(self, other: Self) -> Self {
        if self.micros >= other.micros {
            self
        } else {
            other
        }
    }

    /// Midpoint between two instants, rounded towards the past.
    #[inline]
    pub const fn mean(self, other: Self) -> Self {
        let a = self.micros;
        let b = other.micros;
        // Overflow-free midpoint.
        Self::from_micros((a >> 1) + (b >> 1) + (a & b & 1))
    }
}

// ── Display / FromStr ─────────────────────────────────────────────────────

/// Renders the instant as TAI text with microsecond resolution,
/// e.g. `1993-06-30T23:59:59.000000 TAI`.
impl fmt::Display for AbsoluteTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match crate::text::TextFormat::tai_display().format_uniform(*self) {
            Ok(text) => f.write_str(&text),
            Err(_) => write!(f, "{} µs TAI", self.micros),
        }
    }
}

/// Parses TAI text (`YYYY-MM-DDThh:mm:ss[.f…] TAI`, up to six decimals).
impl FromStr for AbsoluteTime {
    type Err = crate::TimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        crate::text::TextFormat::tai_display().parse_uniform(s)
    }
}

// ── Serde ─────────────────────────────────────────────────────────────────

#[cfg(feature = "serde")]
impl Serialize for AbsoluteTime {
    fn serialize<Ser>(&self, serializer: Ser) -> Result<Ser::Ok, Ser::Error>
    where
        Ser: Serializer,
    {
        serializer.serialize_i64(self.micros)
    }
}

#[cfg(feature = "serde")]
impl<'de> Deserialize<'de> for AbsoluteTime {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let v = i64::deserialize(deserializer)?;
        Ok(Self::from_micros(v))
    }
}

// ── Arithmetic ────────────────────────────────────────────────────────────

/// `AbsoluteTime + micros`.
impl Add<i64> for AbsoluteTime {
    type Output = Self;
    #[inline]
    fn add(self, rhs: i64) -> Self::Output {
        self.add_micros(rhs)
    }
}

impl AddAssign<i64> for AbsoluteTime {
    #[inline]
    fn add_assign(&mut self, rhs: i64) {
        self.micros += rhs;
    }
}

/// `AbsoluteTime - micros`.
impl Sub<i64> for AbsoluteTime {
    type Output = Self;
    #[inline]
    fn sub(self, rhs: i64) -> Self::Output {
        self.sub_micros(rhs)
    }
}

impl SubAssign<i64> for AbsoluteTime {
    #[inline]
    fn sub_assign(&mut self, rhs: i64) {
        self.micros -= rhs;
    }
}

/// The difference of two instants is a microsecond count, not an instant.
impl Sub for AbsoluteTime {
    type Output = i64;
    #[inline]
    fn sub(self, rhs: Self) -> Self::Output {
        self.micros_since(rhs)
    }
}

// ── From/Into i64 ─────────────────────────────────────────────────────────

impl From<i64> for AbsoluteTime {
    #[inline]
    fn from(micros: i64) -> Self {
        Self::from_micros(micros)
    }
}

impl From<AbsoluteTime> for i64 {
    #[inline]
    fn from(time: AbsoluteTime) -> Self {
        time.micros
    }
}
