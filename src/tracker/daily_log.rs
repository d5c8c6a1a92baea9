use std::sync::Arc;

use chrono::NaiveDate;
use tracing::{debug, info, instrument, warn};

use crate::{
    store::{KeyValueStore, StorageError, LOGS_KEY},
    utils::clock::Clock,
};

use super::{
    config::{RecomputeTrigger, TrackerConfig},
    entities::{total_points, DailySummary, LogArchive, LogEntry},
    error::TrackerError,
};

/// Keeps the log of the active day in memory and the history of previous days in the store.
///
/// Every mutation is a full read-modify-write of the archive: the stored archive is read, the
/// active log replaces the entry for the active date, stale days are pruned and the result is
/// written back. Nothing guards against another writer between the read and the write.
pub struct DailyLogStore<S> {
    store: S,
    clock: Arc<dyn Clock>,
    config: TrackerConfig,
    active_date: NaiveDate,
    active: Vec<LogEntry>,
    history: Vec<DailySummary>,
}

impl<S: KeyValueStore> DailyLogStore<S> {
    /// Creates an empty store attached to the current date. Nothing is read until
    /// [DailyLogStore::load] is called.
    pub fn new(store: S, clock: Arc<dyn Clock>, config: TrackerConfig) -> Self {
        let active_date = config.zone.date_of(clock.time());
        Self {
            store,
            clock,
            config,
            active_date,
            active: vec![],
            history: vec![],
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.config.zone.date_of(self.clock.time())
    }

    pub fn active_date(&self) -> NaiveDate {
        self.active_date
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.active
    }

    pub fn total_for_today(&self) -> u64 {
        total_points(&self.active)
    }

    /// Totals of the retained previous days, most recent first. Only recomputed by
    /// [DailyLogStore::load], logging doesn't change them.
    pub fn historical_summaries(&self) -> &[DailySummary] {
        &self.history
    }

    /// Attaches the store to the current date, reads its log, recomputes the history and writes
    /// back the archive without stale days.
    ///
    /// In-memory state is updated before the pruned archive is written, so a failed write still
    /// leaves a usable store.
    #[instrument(skip(self))]
    pub async fn load(&mut self) -> Result<(), TrackerError> {
        let today = self.today();
        let archive = match self.read_archive().await? {
            Some(archive) => archive,
            None => {
                info!("No logs stored yet, initializing");
                let archive = LogArchive::new();
                self.write_archive(&archive).await?;
                archive
            }
        };

        self.active_date = today;
        self.active = archive.get(&today).cloned().unwrap_or_default();
        self.history = summarize(&archive, today, &self.config);
        debug!(
            "Active day {today} has {} entries, {} previous days retained",
            self.active.len(),
            self.history.len()
        );

        self.persist_pruned(archive).await
    }

    /// Rolls over to the current date if it differs from the active one and the configuration
    /// asks for it. Returns whether a rollover happened.
    pub async fn refresh(&mut self) -> Result<bool, TrackerError> {
        if self.config.recompute != RecomputeTrigger::OnDateChange {
            return Ok(false);
        }
        let today = self.today();
        if today == self.active_date {
            return Ok(false);
        }
        info!("Date changed from {} to {today}", self.active_date);
        self.load().await?;
        Ok(true)
    }

    /// Appends an entry to the active day. When the write fails the entry stays in memory.
    pub async fn log_entry(&mut self, entry: LogEntry) -> Result<(), TrackerError> {
        self.roll_over_before_mutation().await;
        info!("Logging {entry:?} for {}", self.active_date);
        self.active.push(entry);
        self.commit().await
    }

    /// Removes the entry at `index`. An index outside of the active log is ignored and nothing is
    /// written.
    pub async fn remove_entry(&mut self, index: usize) -> Result<Option<LogEntry>, TrackerError> {
        let rollover = self.roll_over_before_mutation().await;
        if index >= self.active.len() {
            warn!(
                "Ignoring removal of entry {index}, log for {} has {} entries",
                self.active_date,
                self.active.len()
            );
            return rollover.map_or(Ok(None), Err);
        }
        let removed = self.active.remove(index);
        info!("Removed {removed:?} from {}", self.active_date);
        self.commit().await?;
        Ok(Some(removed))
    }

    /// A mutation always lands on the current day. If the day changed but the archive can't be
    /// read, the store still moves to the new day with an empty log and the error is handed back.
    async fn roll_over_before_mutation(&mut self) -> Option<TrackerError> {
        let error = self.refresh().await.err()?;
        let today = self.today();
        warn!("Rollover to {today} failed: {error:?}");
        if self.config.recompute == RecomputeTrigger::OnDateChange && self.active_date != today {
            self.active_date = today;
            self.active.clear();
        }
        Some(error)
    }

    async fn commit(&self) -> Result<(), TrackerError> {
        let mut archive = self.read_archive().await?.unwrap_or_default();
        archive.insert(self.active_date, self.active.clone());
        self.persist_pruned(archive).await
    }

    async fn persist_pruned(&self, mut archive: LogArchive) -> Result<(), TrackerError> {
        self.config.retention.prune(&mut archive, self.active_date);
        self.write_archive(&archive).await
    }

    async fn read_archive(&self) -> Result<Option<LogArchive>, TrackerError> {
        let Some(raw) = self.store.get(LOGS_KEY).await? else {
            return Ok(None);
        };
        let archive = serde_json::from_str(&raw).map_err(|source| StorageError::Corrupt {
            key: LOGS_KEY.into(),
            source,
        })?;
        Ok(Some(archive))
    }

    async fn write_archive(&self, archive: &LogArchive) -> Result<(), TrackerError> {
        let raw = serde_json::to_string(archive).map_err(|source| StorageError::Encode {
            key: LOGS_KEY.into(),
            source,
        })?;
        self.store.set(LOGS_KEY, &raw).await?;
        Ok(())
    }
}

/// Totals of every retained day except `today`, most recent first.
fn summarize(archive: &LogArchive, today: NaiveDate, config: &TrackerConfig) -> Vec<DailySummary> {
    archive
        .iter()
        .rev()
        .filter(|(date, _)| **date != today && config.retention.retains(**date, today))
        .map(|(date, entries)| DailySummary {
            date: *date,
            total_points: total_points(entries),
        })
        .collect()
}
