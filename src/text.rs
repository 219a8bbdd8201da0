// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! ISO-8601-like text codec.
//!
//! ```text
//! YYYY-MM-DDThh:mm:ss[.ffffff]<suffix>
//! ```
//!
//! The suffix is `Z` for UTC and a space followed by the scale name for
//! every other scale (`" TAI"`, `" TT"`, `" TDB"`).  A [`TextFormat`] is an
//! immutable configuration value: the scale, the number of decimals (0–6),
//! whether the instant is rounded or truncated to that many decimals, and
//! whether the parser insists on exactly that many fractional digits.
//!
//! Formatting runs `TimeScale::tai_to_scale` → rounding →
//! [`GregorianCalendar::decompose`] → zero-padded assembly; parsing is the
//! exact inverse.

use crate::calendar::{CalendarFields, GregorianCalendar};
use crate::error::{Result, TimeError};
use crate::instant::AbsoluteTime;
use crate::leap_seconds::LeapSecondTable;
use crate::scales::TimeScale;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Largest supported number of decimals (microsecond resolution).
pub const MAX_DECIMALS: u8 = 6;

/// How an instant is brought to the configured number of decimals.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Rounding {
    /// Round half up to the nearest representable value.
    #[default]
    Round,
    /// Drop the extra digits (towards the past).
    Truncate,
}

/// How many fractional digits the parser accepts.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum FractionWidth {
    /// Exactly the configured number of decimals (none when it is zero).
    Strict,
    /// Anything from no fraction at all up to six digits.
    #[default]
    Lenient,
}

/// Text codec configuration.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TextFormat {
    scale: TimeScale,
    decimals: u8,
    rounding: Rounding,
    fraction_width: FractionWidth,
}

impl TextFormat {
    /// Codec for `scale` with `decimals` fractional digits, rounding and a
    /// lenient parser.
    pub fn new(scale: TimeScale, decimals: u8) -> Result<Self> {
        if decimals > MAX_DECIMALS {
            return Err(TimeError::range(format!(
                "{decimals} decimals requested, at most {MAX_DECIMALS} are supported"
            )));
        }
        Ok(Self {
            scale,
            decimals,
            rounding: Rounding::Round,
            fraction_width: FractionWidth::Lenient,
        })
    }

    /// Microsecond TAI text used by `AbsoluteTime`'s `Display`/`FromStr`.
    pub(crate) const fn tai_display() -> Self {
        Self {
            scale: TimeScale::Tai,
            decimals: MAX_DECIMALS,
            rounding: Rounding::Truncate,
            fraction_width: FractionWidth::Lenient,
        }
    }

    pub const fn with_rounding(self, rounding: Rounding) -> Self {
        Self { rounding, ..self }
    }

    pub const fn with_fraction_width(self, fraction_width: FractionWidth) -> Self {
        Self {
            fraction_width,
            ..self
        }
    }

    // ── accessors ─────────────────────────────────────────────────────

    #[inline]
    pub const fn scale(&self) -> TimeScale {
        self.scale
    }

    #[inline]
    pub const fn decimals(&self) -> u8 {
        self.decimals
    }

    #[inline]
    pub const fn rounding(&self) -> Rounding {
        self.rounding
    }

    #[inline]
    pub const fn fraction_width(&self) -> FractionWidth {
        self.fraction_width
    }

    /// Microseconds per last printed digit.
    #[inline]
    fn unit(&self) -> i64 {
        10_i64.pow(u32::from(MAX_DECIMALS - self.decimals))
    }

    fn quantize_reading(&self, reading: AbsoluteTime) -> AbsoluteTime {
        let unit = self.unit();
        let micros = match self.rounding {
            Rounding::Round => (reading.micros() + unit / 2).div_euclid(unit) * unit,
            Rounding::Truncate => reading.micros().div_euclid(unit) * unit,
        };
        AbsoluteTime::from_micros(micros)
    }

    /// The TAI instant that [`format`](Self::format) actually represents,
    /// i.e. `t` rounded or truncated on this codec's scale.
    pub fn quantize(&self, t: AbsoluteTime) -> AbsoluteTime {
        self.scale
            .scale_to_tai(self.quantize_reading(self.scale.tai_to_scale(t)))
    }

    // ── formatting ────────────────────────────────────────────────────

    /// Render `t`.  The table is only consulted for UTC.
    pub fn format(&self, t: AbsoluteTime, table: &LeapSecondTable) -> Result<String> {
        self.format_with(t, GregorianCalendar::for_scale(self.scale, table))
    }

    /// Render `t` on a leap-free scale, without a leap-second table.
    pub fn format_uniform(&self, t: AbsoluteTime) -> Result<String> {
        self.require_uniform()?;
        self.format_with(t, GregorianCalendar::uniform())
    }

    fn format_with(&self, t: AbsoluteTime, calendar: GregorianCalendar<'_>) -> Result<String> {
        let reading = self.quantize_reading(self.scale.tai_to_scale(t));
        let fields = calendar.decompose(reading)?;
        if !(0..=9999).contains(&fields.year) {
            return Err(TimeError::range(format!(
                "year {} cannot be written with four digits",
                fields.year
            )));
        }

        let mut out = format!(
            "{:04}-{:02}-{:02}T{:02}:{:02}:{:02}",
            fields.year, fields.month, fields.day, fields.hour, fields.minute, fields.second
        );
        if self.decimals > 0 {
            let digits = format!("{:06}", fields.microsecond);
            out.push('.');
            out.push_str(&digits[..usize::from(self.decimals)]);
        }
        out.push_str(self.scale.suffix());
        Ok(out)
    }

    // ── parsing ───────────────────────────────────────────────────────

    /// Parse text produced by [`format`](Self::format).
    pub fn parse(&self, text: &str, table: &LeapSecondTable) -> Result<AbsoluteTime> {
        self.parse_with(text, GregorianCalendar::for_scale(self.scale, table))
    }

    /// Parse text on a leap-free scale, without a leap-second table.
    pub fn parse_uniform(&self, text: &str) -> Result<AbsoluteTime> {
        self.require_uniform()?;
        self.parse_with(text, GregorianCalendar::uniform())
    }

    fn parse_with(&self, text: &str, calendar: GregorianCalendar<'_>) -> Result<AbsoluteTime> {
        let fields = self.parse_fields(text)?;
        let reading = calendar.compose(&fields)?;
        Ok(self.scale.scale_to_tai(reading))
    }

    /// Parse the text into raw calendar fields, validating only the grammar
    /// and the suffix.
    pub fn parse_fields(&self, text: &str) -> Result<CalendarFields> {
        let mut cur = Cursor::new(text);
        let year = cur.digits(4)? as i32;
        cur.expect(b'-')?;
        let month = cur.digits(2)?;
        cur.expect(b'-')?;
        let day = cur.digits(2)?;
        cur.expect(b'T')?;
        let hour = cur.digits(2)?;
        cur.expect(b':')?;
        let minute = cur.digits(2)?;
        cur.expect(b':')?;
        let second = cur.digits(2)?;
        let microsecond = self.fraction(&mut cur)?;

        let rest = cur.rest();
        if rest != self.scale.suffix() {
            return Err(TimeError::format(format!(
                "{text:?}: expected suffix {:?}, found {rest:?}",
                self.scale.suffix()
            )));
        }
        Ok(CalendarFields::new(
            year,
            month,
            day,
            hour,
            minute,
            second,
            microsecond,
        ))
    }

    fn fraction(&self, cur: &mut Cursor<'_>) -> Result<u32> {
        let digits = if cur.peek() == Some(b'.') {
            cur.advance();
            let digits = cur.digit_run();
            if digits.is_empty() {
                return Err(TimeError::format(format!(
                    "{:?}: decimal point without digits",
                    cur.text
                )));
            }
            digits
        } else {
            ""
        };
        let width = digits.len();
        let accepted = match self.fraction_width {
            FractionWidth::Strict => width == usize::from(self.decimals),
            FractionWidth::Lenient => width <= usize::from(MAX_DECIMALS),
        };
        if !accepted {
            let expected = match self.fraction_width {
                FractionWidth::Strict => format!("exactly {}", self.decimals),
                FractionWidth::Lenient => format!("at most {MAX_DECIMALS}"),
            };
            return Err(TimeError::format(format!(
                "{:?}: {width} fractional digits, expected {expected}",
                cur.text
            )));
        }
        let value: u32 = if digits.is_empty() {
            0
        } else {
            digits
                .parse()
                .map_err(|e| TimeError::format(format!("{:?}: {e}", cur.text)))?
        };
        Ok(value * 10_u32.pow((usize::from(MAX_DECIMALS) - width) as u32))
    }

    fn require_uniform(&self) -> Result<()> {
        if self.scale.has_leap_seconds() {
            Err(TimeError::configuration(
                "UTC text conversion needs a leap-second table",
            ))
        } else {
            Ok(())
        }
    }
}

/// Byte cursor over ASCII input.
struct Cursor<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Cursor<'a> {
    fn new(text: &'a str) -> Self {
        Self {
            text,
            bytes: text.as_bytes(),
            pos: 0,
        }
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn advance(&mut self) {
        self.pos += 1;
    }

    fn expect(&mut self, want: u8) -> Result<()> {
        match self.peek() {
            Some(b) if b == want => {
                self.advance();
                Ok(())
            }
            _ => Err(TimeError::format(format!(
                "{:?}: expected {:?} at offset {}",
                self.text, want as char, self.pos
            ))),
        }
    }

    /// Exactly `n` ASCII digits.
    fn digits(&mut self, n: usize) -> Result<u32> {
        let mut value = 0_u32;
        for _ in 0..n {
            match self.peek() {
                Some(b) if b.is_ascii_digit() => {
                    value = value * 10 + u32::from(b - b'0');
                    self.advance();
                }
                _ => {
                    return Err(TimeError::format(format!(
                        "{:?}: expected {n} digits at offset {}",
                        self.text, self.pos
                    )))
                }
            }
        }
        Ok(value)
    }

    /// Consume a run of ASCII digits.
    fn digit_run(&mut self) -> &'a str {
        let start = self.pos;
        while self.peek().is_some_and(|b| b.is_ascii_digit()) {
            self.advance();
        }
        &self.text[start..self.pos]
    }

    fn rest(&self) -> &'a str {
        // Only ASCII has been consumed, so `pos` is a char boundary.
        &self.text[self.pos..]
    }
}
