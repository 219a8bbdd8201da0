// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! CCSDS Unsegmented Time Code (CUC).
//!
//! Layout, 48 bits big-endian:
//!
//! ```text
//! | coarse: u32 (whole seconds since epoch) | fine: u16 (1/65 536 s) |
//! ```
//!
//! The optional one-byte preamble (P-field) [`CUC_PFIELD`] announces this
//! exact layout with the CCSDS epoch 1958-01-01 TAI.
//!
//! Fine ticks are converted to and from microseconds with round-half-up, so
//! every `(coarse, fine)` pair survives [`CucCodec::to_time`] followed by
//! [`CucCodec::coarse`] / [`CucCodec::fine`] unchanged.

use crate::error::{Result, TimeError};
use crate::instant::{AbsoluteTime, MICROS_PER_SECOND};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Fine ticks per second.
pub const FINE_MOD: i64 = 1 << 16;

/// Encoded length without preamble.
pub const CUC_LEN: usize = 6;

/// Level-1 preamble: CCSDS epoch, 4 coarse octets, 2 fine octets.
pub const CUC_PFIELD: u8 = 0b0001_1110;

/// Time code identifier of a CUC with the CCSDS 1958 epoch (P-field bits 1–3).
const CUC_CCSDS_EPOCH_ID: u8 = 0b001;

/// Number of distinct coarse values.
const COARSE_MOD: i64 = 1 << 32;

/// Encoder/decoder for a CUC anchored at `epoch`.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct CucCodec {
    epoch: AbsoluteTime,
}

impl Default for CucCodec {
    fn default() -> Self {
        Self::new(AbsoluteTime::EPOCH)
    }
}

impl CucCodec {
    pub const fn new(epoch: AbsoluteTime) -> Self {
        Self { epoch }
    }

    #[inline]
    pub const fn epoch(&self) -> AbsoluteTime {
        self.epoch
    }

    /// Whether the epoch is the CCSDS 1958-01-01 TAI epoch.
    #[inline]
    pub fn has_ccsds_epoch(&self) -> bool {
        self.epoch == AbsoluteTime::EPOCH
    }

    /// Coarse and fine fields of `t`, with the microsecond remainder rounded
    /// half-up to the nearest fine tick.
    pub fn split(&self, t: AbsoluteTime) -> Result<(u32, u16)> {
        if t < self.epoch {
            return Err(TimeError::range(format!(
                "{t} precedes the CUC epoch {}",
                self.epoch
            )));
        }
        let elapsed = t.micros_since(self.epoch);
        let mut coarse = elapsed.div_euclid(MICROS_PER_SECOND);
        let remainder = elapsed.rem_euclid(MICROS_PER_SECOND);
        let mut fine = (remainder * FINE_MOD + MICROS_PER_SECOND / 2) / MICROS_PER_SECOND;
        if fine == FINE_MOD {
            coarse += 1;
            fine = 0;
        }
        if coarse >= COARSE_MOD {
            return Err(TimeError::range(format!(
                "{t} is beyond the 32-bit coarse range of the CUC epoch"
            )));
        }
        Ok((coarse as u32, fine as u16))
    }

    /// Whole seconds since the epoch.
    pub fn coarse(&self, t: AbsoluteTime) -> Result<u32> {
        self.split(t).map(|(coarse, _)| coarse)
    }

    /// Sub-second part in 1/65 536 s.
    pub fn fine(&self, t: AbsoluteTime) -> Result<u16> {
        self.split(t).map(|(_, fine)| fine)
    }

    /// Instant named by `(coarse, fine)`, rounded half-up to the microsecond.
    pub fn to_time(&self, coarse: u32, fine: u16) -> Result<AbsoluteTime> {
        let micros = (i64::from(fine) * MICROS_PER_SECOND + FINE_MOD / 2) / FINE_MOD;
        i64::from(coarse)
            .checked_mul(MICROS_PER_SECOND)
            .and_then(|c| c.checked_add(micros))
            .and_then(|elapsed| self.epoch.micros().checked_add(elapsed))
            .map(AbsoluteTime::from_micros)
            .ok_or_else(|| {
                TimeError::range(format!(
                    "CUC ({coarse}, {fine}) overflows the time range of epoch {}",
                    self.epoch
                ))
            })
    }

    // ── binary form ───────────────────────────────────────────────────

    pub fn encode(&self, t: AbsoluteTime) -> Result<[u8; CUC_LEN]> {
        let (coarse, fine) = self.split(t)?;
        let mut out = [0u8; CUC_LEN];
        out[..4].copy_from_slice(&coarse.to_be_bytes());
        out[4..].copy_from_slice(&fine.to_be_bytes());
        Ok(out)
    }

    /// Decode the first [`CUC_LEN`] bytes of `bytes`.
    pub fn decode(&self, bytes: &[u8]) -> Result<AbsoluteTime> {
        let Some(field) = bytes.get(..CUC_LEN) else {
            return Err(TimeError::format(format!(
                "CUC needs {CUC_LEN} bytes, got {}",
                bytes.len()
            )));
        };
        let coarse = u32::from_be_bytes([field[0], field[1], field[2], field[3]]);
        let fine = u16::from_be_bytes([field[4], field[5]]);
        self.to_time(coarse, fine)
    }

    /// [`CucCodec::encode`] preceded by [`CUC_PFIELD`].
    ///
    /// The preamble can only describe the CCSDS epoch; any other epoch is a
    /// configuration error.
    pub fn encode_with_pfield(&self, t: AbsoluteTime) -> Result<[u8; CUC_LEN + 1]> {
        self.require_ccsds_epoch()?;
        let body = self.encode(t)?;
        let mut out = [0u8; CUC_LEN + 1];
        out[0] = CUC_PFIELD;
        out[1..].copy_from_slice(&body);
        Ok(out)
    }

    /// Decode a preamble followed by the 6-byte CUC body.
    pub fn decode_with_pfield(&self, bytes: &[u8]) -> Result<AbsoluteTime> {
        self.require_ccsds_epoch()?;
        let Some((&pfield, body)) = bytes.split_first() else {
            return Err(TimeError::format("CUC preamble missing"));
        };
        if pfield != CUC_PFIELD {
            let id = (pfield >> 4) & 0b111;
            let detail = if id == CUC_CCSDS_EPOCH_ID {
                "unsupported field widths"
            } else {
                "not a CUC with the CCSDS epoch"
            };
            return Err(TimeError::format(format!(
                "CUC preamble {pfield:#010b}: {detail}"
            )));
        }
        self.decode(body)
    }

    fn require_ccsds_epoch(&self) -> Result<()> {
        if self.has_ccsds_epoch() {
            Ok(())
        } else {
            Err(TimeError::configuration(format!(
                "the CUC preamble implies the 1958 epoch, codec epoch is {}",
                self.epoch
            )))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coarse_and_fine_survive_to_time() {
        let codec = CucCodec::default();
        let coarses = [0u32, 1, 59, 1_514_764_836, u32::MAX / 2, u32::MAX];
        for coarse in coarses {
            for fine in (0..=u16::MAX).step_by(97).chain([u16::MAX, 32_768]) {
                let t = codec.to_time(coarse, fine).unwrap();
                assert_eq!(codec.split(t).unwrap(), (coarse, fine), "{coarse}/{fine}");
            }
        }
    }

    #[test]
    fn whole_second_has_no_remainder() {
        let codec = CucCodec::default();
        let t = codec.to_time(1_514_764_836, 0).unwrap();
        assert_eq!(t.subsec_micros(), 0);
        assert_eq!(t.whole_seconds(), 1_514_764_836);
    }

    #[test]
    fn fine_rounds_half_up() {
        let codec = CucCodec::default();
        // 1/65 536 s = 15.2587890625 µs
        assert_eq!(codec.fine(AbsoluteTime::from_micros(15)).unwrap(), 1);
        assert_eq!(codec.fine(AbsoluteTime::from_micros(7)).unwrap(), 0);
        assert_eq!(codec.fine(AbsoluteTime::from_micros(8)).unwrap(), 1);
        assert_eq!(codec.to_time(0, 1).unwrap().micros(), 15);
        assert_eq!(codec.to_time(0, 32_768).unwrap().micros(), 500_000);
    }

    #[test]
    fn fine_carries_into_coarse() {
        let codec = CucCodec::default();
        let t = AbsoluteTime::from_micros(4 * MICROS_PER_SECOND + 999_999);
        assert_eq!(codec.split(t).unwrap(), (5, 0));
    }

    #[test]
    fn out_of_range_instants_are_rejected() {
        let codec = CucCodec::default();
        assert!(matches!(
            codec.coarse(AbsoluteTime::from_micros(-1)),
            Err(TimeError::Range(_))
        ));
        let past_end = AbsoluteTime::from_seconds(1 << 32);
        assert!(matches!(codec.fine(past_end), Err(TimeError::Range(_))));
        let last_tick = AbsoluteTime::from_micros((1_i64 << 32) * MICROS_PER_SECOND - 1);
        assert!(matches!(codec.encode(last_tick), Err(TimeError::Range(_))));
    }

    #[test]
    fn custom_epoch() {
        let epoch = AbsoluteTime::from_seconds(1_000);
        let codec = CucCodec::new(epoch);
        assert_eq!(codec.coarse(epoch.add_seconds(42)).unwrap(), 42);
        assert!(codec.coarse(epoch.sub_micros(1)).is_err());
        assert_eq!(codec.to_time(0, 0).unwrap(), epoch);
    }

    #[test]
    fn encode_is_big_endian() {
        let codec = CucCodec::default();
        let t = codec.to_time(0x0102_0304, 0x8000).unwrap();
        assert_eq!(codec.encode(t).unwrap(), [0x01, 0x02, 0x03, 0x04, 0x80, 0x00]);
        assert_eq!(codec.decode(&[0x01, 0x02, 0x03, 0x04, 0x80, 0x00]).unwrap(), t);
    }

    #[test]
    fn decode_ignores_trailing_bytes_and_rejects_short_input() {
        let codec = CucCodec::default();
        let bytes = [0, 0, 0, 10, 0, 0, 0xFF, 0xFF];
        assert_eq!(codec.decode(&bytes).unwrap(), AbsoluteTime::from_seconds(10));
        assert!(matches!(codec.decode(&bytes[..5]), Err(TimeError::Format(_))));
    }

    #[test]
    fn pfield_roundtrip() {
        let codec = CucCodec::default();
        let t = AbsoluteTime::from_micros(1_514_764_836_250_000);
        let bytes = codec.encode_with_pfield(t).unwrap();
        assert_eq!(bytes[0], CUC_PFIELD);
        assert_eq!(codec.decode_with_pfield(&bytes).unwrap(), t);
    }

    #[test]
    fn pfield_errors() {
        let codec = CucCodec::default();
        assert!(matches!(
            codec.decode_with_pfield(&[0b0010_1110, 0, 0, 0, 0, 0, 0]),
            Err(TimeError::Format(_))
        ));
        assert!(matches!(
            codec.decode_with_pfield(&[]),
            Err(TimeError::Format(_))
        ));
        let agency = CucCodec::new(AbsoluteTime::from_seconds(1));
        assert!(matches!(
            agency.encode_with_pfield(AbsoluteTime::from_seconds(5)),
            Err(TimeError::Configuration(_))
        ));
    }
}
