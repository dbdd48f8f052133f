//! File-backed daily counter for model invocations.
//!
//! The counter is advisory: it informs tiered logging in the report pipeline
//! but never blocks a call. State lives in a two-line text file (date, then
//! count) so the count survives process restarts and resets implicitly when
//! the date rolls over. Anything unreadable is treated as "no calls today".

use std::io;
use std::path::{Path, PathBuf};

use chrono::{NaiveDate, Utc};

/// Per-day call count at which usage logging turns cautionary.
pub const WARN_THRESHOLD: u32 = 15;
/// Per-day call count at which usage logging turns urgent.
pub const CRITICAL_THRESHOLD: u32 = 18;
/// The provider's free-tier daily request limit.
pub const DAILY_LIMIT: u32 = 20;

/// Tracks how many model calls have been made today, persisted to a file.
#[derive(Debug, Clone)]
pub struct UsageCounter {
    path: PathBuf,
}

impl UsageCounter {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Today's count. A missing, corrupt, or stale-dated file reads as zero.
    pub fn read(&self) -> u32 {
        self.read_on(Utc::now().date_naive())
    }

    /// Increments today's count and returns the new value.
    ///
    /// # Errors
    ///
    /// Returns the underlying I/O error if the counter file cannot be
    /// written. Callers treat this as non-fatal.
    pub fn increment(&self) -> io::Result<u32> {
        self.increment_on(Utc::now().date_naive())
    }

    fn read_on(&self, today: NaiveDate) -> u32 {
        let Ok(contents) = std::fs::read_to_string(&self.path) else {
            return 0;
        };
        parse_usage_file(&contents, today).unwrap_or(0)
    }

    fn increment_on(&self, today: NaiveDate) -> io::Result<u32> {
        let count = self.read_on(today) + 1;
        std::fs::write(&self.path, format!("{today}\n{count}\n"))?;
        Ok(count)
    }
}

/// Parses the two-line counter file; `None` for any deviation, including a
/// recorded date other than `today`.
fn parse_usage_file(contents: &str, today: NaiveDate) -> Option<u32> {
    let mut lines = contents.lines();
    let recorded: NaiveDate = lines.next()?.trim().parse().ok()?;
    if recorded != today {
        return None;
    }
    lines.next()?.trim().parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn counter_in(dir: &tempfile::TempDir) -> UsageCounter {
        UsageCounter::new(dir.path().join("usage"))
    }

    #[test]
    fn missing_file_reads_as_zero() {
        let dir = tempfile::tempdir().expect("tempdir");
        assert_eq!(counter_in(&dir).read(), 0);
    }

    #[test]
    fn n_increments_read_back_as_n() {
        let dir = tempfile::tempdir().expect("tempdir");
        let counter = counter_in(&dir);
        let today = NaiveDate::from_ymd_opt(2026, 8, 26).expect("valid date");

        for expected in 1..=5 {
            let count = counter.increment_on(today).expect("increment");
            assert_eq!(count, expected);
        }
        assert_eq!(counter.read_on(today), 5);
    }

    #[test]
    fn date_rollover_resets_to_one() {
        let dir = tempfile::tempdir().expect("tempdir");
        let counter = counter_in(&dir);
        let monday = NaiveDate::from_ymd_opt(2026, 8, 24).expect("valid date");
        let tuesday = NaiveDate::from_ymd_opt(2026, 8, 25).expect("valid date");

        counter.increment_on(monday).expect("increment");
        counter.increment_on(monday).expect("increment");
        assert_eq!(counter.read_on(tuesday), 0);
        assert_eq!(counter.increment_on(tuesday).expect("increment"), 1);
    }

    #[test]
    fn corrupt_file_reads_as_zero() {
        let dir = tempfile::tempdir().expect("tempdir");
        let counter = counter_in(&dir);
        let today = NaiveDate::from_ymd_opt(2026, 8, 26).expect("valid date");

        std::fs::write(counter.path(), "not a date\nnot a count\n").expect("write");
        assert_eq!(counter.read_on(today), 0);

        std::fs::write(counter.path(), "2026-08-26\ntwelve\n").expect("write");
        assert_eq!(counter.read_on(today), 0);

        // A corrupt file still increments cleanly to one.
        assert_eq!(counter.increment_on(today).expect("increment"), 1);
    }

    #[test]
    fn missing_count_line_reads_as_zero() {
        let dir = tempfile::tempdir().expect("tempdir");
        let counter = counter_in(&dir);
        let today = NaiveDate::from_ymd_opt(2026, 8, 26).expect("valid date");

        std::fs::write(counter.path(), "2026-08-26\n").expect("write");
        assert_eq!(counter.read_on(today), 0);
    }
}
