// SPDX-License-Identifier: AGPL-3.0-or-later
// Copyright (C) 2026 Vallés Puig, Ramon

//! Shared leap-second state.
//!
//! A [`TimeContext`] owns the process's current [`LeapSecondTable`] as an
//! immutable snapshot behind an `Arc`.  Readers take a snapshot and work on
//! it for the whole conversion; [`TimeContext::reload`] builds a new table
//! and swaps the pointer in one store, so a conversion never observes a
//! half-updated table.

use crate::error::Result;
use crate::instant::AbsoluteTime;
use crate::leap_seconds::LeapSecondTable;
use crate::text::TextFormat;
use parking_lot::RwLock;
use std::path::Path;
use std::sync::Arc;

/// Holder of the current leap-second table snapshot.
#[derive(Debug)]
pub struct TimeContext {
    table: RwLock<Arc<LeapSecondTable>>,
}

impl TimeContext {
    pub fn new(table: LeapSecondTable) -> Self {
        Self {
            table: RwLock::new(Arc::new(table)),
        }
    }

    /// Context over the table bundled with the crate.
    pub fn embedded() -> Result<Self> {
        LeapSecondTable::embedded().map(Self::new)
    }

    /// Context over a table file.  Fails with a configuration error when the
    /// file cannot be read, since no UTC conversion is meaningful without it.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        LeapSecondTable::from_path(path).map(Self::new)
    }

    /// The table currently in force.
    #[inline]
    pub fn snapshot(&self) -> Arc<LeapSecondTable> {
        Arc::clone(&self.table.read())
    }

    /// Install `table`, returning the snapshot it replaces.
    pub fn reload(&self, table: LeapSecondTable) -> Arc<LeapSecondTable> {
        let next = Arc::new(table);
        let previous = std::mem::replace(&mut *self.table.write(), Arc::clone(&next));
        tracing::info!(
            previous_entries = previous.len(),
            entries = next.len(),
            "leap-second table swapped"
        );
        previous
    }

    /// Reload from a file.  On failure the current table stays in force.
    pub fn reload_from_path(&self, path: impl AsRef<Path>) -> Result<Arc<LeapSecondTable>> {
        let table = LeapSecondTable::from_path(path)?;
        Ok(self.reload(table))
    }

    // ── conveniences over the current snapshot ────────────────────────

    /// TAI − UTC in seconds at `t`.
    pub fn leap_seconds(&self, t: AbsoluteTime) -> Result<i64> {
        self.snapshot().leap_seconds(t)
    }

    pub fn is_leap_second(&self, t: AbsoluteTime) -> bool {
        self.snapshot().is_leap_second(t)
    }

    /// Render `t` with `format`.
    pub fn format(&self, format: &TextFormat, t: AbsoluteTime) -> Result<String> {
        format.format(t, &self.snapshot())
    }

    /// Parse `text` with `format`.
    pub fn parse(&self, format: &TextFormat, text: &str) -> Result<AbsoluteTime> {
        format.parse(text, &self.snapshot())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::leap_seconds::LeapSecondEntry;
    use crate::TimeError;
    use crate::TimeScale;
    use std::thread;

    /// 2017-01-01T00:00:00Z as TAI.
    const NEW_YEAR_2017: AbsoluteTime = AbsoluteTime::from_seconds(21_550 * 86_400 + 37);

    #[test]
    fn snapshot_outlives_reload() {
        let ctx = TimeContext::embedded().unwrap();
        let before = ctx.snapshot();
        assert_eq!(before.len(), 27);

        let shorter = LeapSecondTable::from_entries([LeapSecondEntry { year: 1972, month: 6 }])
            .unwrap();
        let previous = ctx.reload(shorter);
        assert!(Arc::ptr_eq(&previous, &before));
        assert_eq!(before.len(), 27);
        assert_eq!(ctx.snapshot().len(), 1);
        assert_eq!(ctx.leap_seconds(NEW_YEAR_2017).unwrap(), 11);
    }

    #[test]
    fn failed_reload_keeps_current_table() {
        let ctx = TimeContext::embedded().unwrap();
        assert!(ctx.reload_from_path("/nonexistent/leap_seconds.txt").is_err());
        assert_eq!(ctx.snapshot().len(), 27);
        assert_eq!(ctx.leap_seconds(NEW_YEAR_2017).unwrap(), 37);
        assert!(ctx.is_leap_second(NEW_YEAR_2017.sub_micros(1)));
    }

    #[test]
    fn malformed_reload_keeps_current_table() {
        let path = std::env::temp_dir().join(format!(
            "fdtime-malformed-{}.txt",
            std::process::id()
        ));
        std::fs::write(&path, "1972-06
1972-13
").unwrap();

        let ctx = TimeContext::embedded().unwrap();
        let before = ctx.snapshot();
        let result = ctx.reload_from_path(&path);
        std::fs::remove_file(&path).unwrap();

        assert!(matches!(result, Err(TimeError::Format(_))), "{result:?}");
        assert!(Arc::ptr_eq(&ctx.snapshot(), &before));
        assert_eq!(ctx.leap_seconds(NEW_YEAR_2017).unwrap(), 37);
    }

    #[test]
    fn readers_see_whole_tables_during_reloads() {
        let ctx = Arc::new(TimeContext::embedded().unwrap());
        let full = (*ctx.snapshot()).clone();
        let empty = LeapSecondTable::from_entries(Vec::new()).unwrap();

        let reader = {
            let ctx = Arc::clone(&ctx);
            thread::spawn(move || {
                for _ in 0..1_000 {
                    let n = ctx.leap_seconds(NEW_YEAR_2017).unwrap();
                    assert!(n == 37 || n == 10, "torn table: {n}");
                }
            })
        };
        for i in 0..200 {
            if i % 2 == 0 {
                ctx.reload(empty.clone());
            } else {
                ctx.reload(full.clone());
            }
        }
        reader.join().unwrap();
    }

    #[test]
    fn text_conveniences_use_current_table() {
        let ctx = TimeContext::embedded().unwrap();
        let fmt = TextFormat::new(TimeScale::Utc, 0).unwrap();
        assert_eq!(
            ctx.format(&fmt, NEW_YEAR_2017).unwrap(),
            "2017-01-01T00:00:00Z"
        );
        assert_eq!(
            ctx.parse(&fmt, "2016-12-31T23:59:60Z").unwrap(),
            NEW_YEAR_2017.sub_seconds(1)
        );
    }
}
