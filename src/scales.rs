// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Time scales.
//!
//! A [`TimeScale`] maps an [`AbsoluteTime`] (TAI) to the clock reading of
//! that scale and back.  Readings are expressed with the same type: the
//! number of microseconds since `1958-01-01T00:00:00` *read on that scale's
//! clock*.
//!
//! | Variant | Reading | `tai_to_scale(t)` |
//! |---------|---------|-------------------|
//! | [`TimeScale::Tai`] | International Atomic Time | `t` |
//! | [`TimeScale::Utc`] | Coordinated Universal Time | `t` (see below) |
//! | [`TimeScale::Tt`]  | Terrestrial Time | `t + 32.184 s` |
//! | [`TimeScale::Tdb`] | Barycentric Dynamical Time | `t + 32.184 s + Δ(t)` |
//!
//! # UTC is the identity
//!
//! UTC differs from TAI by a piecewise-constant number of leap seconds, and
//! a leap second produces a clock reading (`23:59:60`) that no offset
//! function can express.  The UTC scale therefore leaves the instant
//! untouched; the leap-second adjustment is applied by the codecs that need
//! it ([`GregorianCalendar`](crate::GregorianCalendar) and
//! [`JulianDateFormat`](crate::JulianDateFormat)), which consult the
//! [`LeapSecondTable`](crate::LeapSecondTable) explicitly.

use crate::error::TimeError;
use crate::instant::{AbsoluteTime, MICROS_PER_DAY, MICROS_PER_SECOND};
use qtty::Seconds;
use std::fmt;
use std::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// `TT = TAI + 32.184 s`, in microseconds.
pub const TT_MINUS_TAI_MICROS: i64 = 32_184_000;

/// Day zero of the TDB series, 2000-01-01T00:00:00 TT, as a TT reading:
/// 15 340 days after 1958.
const TDB_SERIES_EPOCH_TT_MICROS: i64 = 15_340 * MICROS_PER_DAY;

/// The four supported time scales.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TimeScale {
    /// International Atomic Time.
    Tai,
    /// Coordinated Universal Time.
    Utc,
    /// Terrestrial Time.
    Tt,
    /// Barycentric Dynamical Time.
    Tdb,
}

impl TimeScale {
    /// Every scale, in declaration order.
    pub const ALL: [Self; 4] = [Self::Tai, Self::Utc, Self::Tt, Self::Tdb];

    /// Short name, e.g. `"TAI"`.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Tai => "TAI",
            Self::Utc => "UTC",
            Self::Tt => "TT",
            Self::Tdb => "TDB",
        }
    }

    /// Suffix appended by the text codec: `Z` for UTC, `" <name>"` otherwise.
    pub const fn suffix(self) -> &'static str {
        match self {
            Self::Tai => " TAI",
            Self::Utc => "Z",
            Self::Tt => " TT",
            Self::Tdb => " TDB",
        }
    }

    /// Whether readings on this scale are subject to leap seconds.
    #[inline]
    pub const fn has_leap_seconds(self) -> bool {
        matches!(self, Self::Utc)
    }

    /// Reading of this scale at the TAI instant `t`.
    pub fn tai_to_scale(self, t: AbsoluteTime) -> AbsoluteTime {
        match self {
            Self::Tai | Self::Utc => t,
            Self::Tt => t.add_micros(TT_MINUS_TAI_MICROS),
            Self::Tdb => t.add_micros(TT_MINUS_TAI_MICROS + tdb_minus_tt_micros(t)),
        }
    }

    /// TAI instant at which this scale reads `value`.
    ///
    /// For TDB the correction is evaluated once at `value − 32.184 s`, a
    /// single fixed-point step; the residual is below one microsecond.
    pub fn scale_to_tai(self, value: AbsoluteTime) -> AbsoluteTime {
        match self {
            Self::Tai | Self::Utc => value,
            Self::Tt => value.sub_micros(TT_MINUS_TAI_MICROS),
            Self::Tdb => {
                let approx = value.sub_micros(TT_MINUS_TAI_MICROS);
                approx.sub_micros(tdb_minus_tt_micros(approx))
            }
        }
    }
}

/// Compute TDB − TT at the TAI instant `t`.
///
/// Single periodic term driven by the eccentric anomaly of the Earth–Moon
/// barycentre.  The amplitude is 1.6567 ms.
pub fn tdb_minus_tt(t: AbsoluteTime) -> Seconds {
    const ECCENTRICITY: f64 = 0.01671;
    const AMPLITUDE_S: f64 = 0.001_656_7;

    // Days since 2000-01-01T00:00:00 on the TT axis.
    let tt = t.micros() + TT_MINUS_TAI_MICROS;
    let d = (tt - TDB_SERIES_EPOCH_TT_MICROS) as f64 / MICROS_PER_DAY as f64;

    // Mean anomaly (radians)
    let m = 6.231_435 + 0.017_201_97 * d;
    // Eccentric anomaly, second order in e
    let e = m + ECCENTRICITY * (m.sin() + 0.5 * ECCENTRICITY * (2.0 * m).sin());

    Seconds::new(AMPLITUDE_S * e.sin())
}

#[inline]
fn tdb_minus_tt_micros(t: AbsoluteTime) -> i64 {
    (tdb_minus_tt(t).value() * MICROS_PER_SECOND as f64).round() as i64
}

impl fmt::Display for TimeScale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for TimeScale {
    type Err = TimeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|scale| scale.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| TimeError::format(format!("unknown time scale {s:?}")))
    }
}
