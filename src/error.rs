// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Error taxonomy shared by every conversion in the crate.
//!
//! All failures are synchronous and final: nothing is retried, nothing is
//! clamped, and no partial result is returned.

use thiserror::Error;

/// Errors produced by time conversions, codecs and leap-second loading.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TimeError {
    /// Malformed text, table or binary input, or a wrong scale suffix.
    #[error("format error: {0}")]
    Format(String),

    /// Input outside the domain of the operation (pre-1972 UTC, CUC fields
    /// before the epoch, impossible calendar fields, …).
    #[error("range error: {0}")]
    Range(String),

    /// The leap-second resource is missing or unusable.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl TimeError {
    pub(crate) fn format(msg: impl Into<String>) -> Self {
        Self::Format(msg.into())
    }

    pub(crate) fn range(msg: impl Into<String>) -> Self {
        Self::Range(msg.into())
    }

    pub(crate) fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }
}

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, TimeError>;
