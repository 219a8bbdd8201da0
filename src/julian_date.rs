// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Modified Julian Date codecs.
//!
//! | Epoch | Day zero |
//! |-------|----------|
//! | [`JulianEpoch::Mjd`] | 1858-11-17T00:00:00 (JD 2 400 000.5) |
//! | [`JulianEpoch::Mjd2000`] | 2000-01-01T00:00:00 (MJD 51 544) |
//!
//! The day count is read on the codec's [`TimeScale`].  For UTC the
//! leap-second table is consulted and the leap second is **frozen**: every
//! instant inside it, and the instant right after it, yield the same day
//! count, and decoding that count returns the instant after the leap second.
//!
//! An `f64` day count near MJD 60 000 resolves about 0.6 µs, so a decode of
//! an encode may differ from the original instant by one microsecond.

use crate::error::{Result, TimeError};
use crate::instant::{AbsoluteTime, MICROS_PER_DAY};
use crate::leap_seconds::{LeapSecondTable, UnixAliasing};
use crate::scales::TimeScale;
use qtty::Days;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// MJD of 1958-01-01, the [`AbsoluteTime`] epoch.
pub const MJD_OF_TAI_EPOCH: i64 = 36_204;

/// MJD of 1970-01-01, the Unix epoch.
pub const MJD_OF_UNIX_EPOCH: i64 = 40_587;

/// MJD of 2000-01-01.
pub const MJD_OF_MJD2000_EPOCH: i64 = 51_544;

/// Largest magnitude of day count accepted by the decoder (≈ ±270 000 years).
const MAX_ABS_DAYS: f64 = 1.0e8;

/// Day zero of a Julian-date representation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum JulianEpoch {
    /// Modified Julian Date.
    Mjd,
    /// Days since 2000-01-01T00:00:00.
    Mjd2000,
}

impl JulianEpoch {
    /// MJD of day zero.
    #[inline]
    pub const fn mjd(self) -> i64 {
        match self {
            Self::Mjd => 0,
            Self::Mjd2000 => MJD_OF_MJD2000_EPOCH,
        }
    }
}

/// Julian-date codec: an epoch plus the scale the days are counted on.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct JulianDateFormat {
    epoch: JulianEpoch,
    scale: TimeScale,
}

impl JulianDateFormat {
    pub const fn new(epoch: JulianEpoch, scale: TimeScale) -> Self {
        Self { epoch, scale }
    }

    /// Modified Julian Date on `scale`.
    pub const fn mjd(scale: TimeScale) -> Self {
        Self::new(JulianEpoch::Mjd, scale)
    }

    /// Days since 2000-01-01 on `scale`.
    pub const fn mjd2000(scale: TimeScale) -> Self {
        Self::new(JulianEpoch::Mjd2000, scale)
    }

    #[inline]
    pub const fn epoch(&self) -> JulianEpoch {
        self.epoch
    }

    #[inline]
    pub const fn scale(&self) -> TimeScale {
        self.scale
    }

    /// Reading in µs and the MJD of its day zero.
    fn reading(&self, t: AbsoluteTime, table: &LeapSecondTable) -> Result<(i64, i64)> {
        match self.scale {
            TimeScale::Utc => Ok((
                table.tai_to_unix(t, UnixAliasing::Freeze)?,
                MJD_OF_UNIX_EPOCH,
            )),
            scale => Ok((scale.tai_to_scale(t).micros(), MJD_OF_TAI_EPOCH)),
        }
    }

    /// Day count of `t`.
    pub fn to_days(&self, t: AbsoluteTime, table: &LeapSecondTable) -> Result<Days> {
        let (micros, base_mjd) = self.reading(t, table)?;
        let day = micros.div_euclid(MICROS_PER_DAY) + base_mjd - self.epoch.mjd();
        let fraction = micros.rem_euclid(MICROS_PER_DAY) as f64 / MICROS_PER_DAY as f64;
        Ok(Days::new(day as f64 + fraction))
    }

    /// Instant whose day count is `days`, to the nearest microsecond.
    pub fn from_days(&self, days: Days, table: &LeapSecondTable) -> Result<AbsoluteTime> {
        let value = days.value();
        if !value.is_finite() || value.abs() > MAX_ABS_DAYS {
            return Err(TimeError::range(format!(
                "day count {value} is outside the supported range"
            )));
        }
        let whole = value.floor();
        let fraction = ((value - whole) * MICROS_PER_DAY as f64).round() as i64;
        let mjd = whole as i64 + self.epoch.mjd();
        match self.scale {
            TimeScale::Utc => {
                let unix = (mjd - MJD_OF_UNIX_EPOCH) * MICROS_PER_DAY + fraction;
                table.unix_to_tai(unix)
            }
            scale => {
                let reading = (mjd - MJD_OF_TAI_EPOCH) * MICROS_PER_DAY + fraction;
                Ok(scale.scale_to_tai(AbsoluteTime::from_micros(reading)))
            }
        }
    }
}
