use chrono::{Days, NaiveDate};
use tracing::debug;

use super::entities::LogArchive;

/// Amount of days of history kept around.
pub const DEFAULT_RETENTION_DAYS: u64 = 7;

/// Whether a date exactly `days` before today is still kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum WindowBoundary {
    #[default]
    Inclusive,
    Exclusive,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetentionPolicy {
    pub days: u64,
    pub boundary: WindowBoundary,
}

impl Default for RetentionPolicy {
    fn default() -> Self {
        Self {
            days: DEFAULT_RETENTION_DAYS,
            boundary: WindowBoundary::default(),
        }
    }
}

impl RetentionPolicy {
    pub fn cutoff(&self, today: NaiveDate) -> NaiveDate {
        today
            .checked_sub_days(Days::new(self.days))
            .unwrap_or(NaiveDate::MIN)
    }

    /// Today is always retained. Dates after today are too, they can show up when the clock moves
    /// backwards.
    pub fn retains(&self, date: NaiveDate, today: NaiveDate) -> bool {
        let cutoff = self.cutoff(today);
        date == today
            || match self.boundary {
                WindowBoundary::Inclusive => date >= cutoff,
                WindowBoundary::Exclusive => date > cutoff,
            }
    }

    /// Drops every day that's out of the window. Returns the dropped dates.
    pub fn prune(&self, archive: &mut LogArchive, today: NaiveDate) -> Vec<NaiveDate> {
        let stale = archive
            .keys()
            .copied()
            .filter(|date| !self.retains(*date, today))
            .collect::<Vec<_>>();
        for date in &stale {
            archive.remove(date);
        }
        if !stale.is_empty() {
            debug!("Pruned {} stale days: {stale:?}", stale.len());
        }
        stale
    }
}
