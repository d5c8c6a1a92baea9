//! Application state of the tracker. [Tracker] owns the recipe catalog, the daily log and the goal,
//! and decides what happens when the store fails underneath them.

pub mod config;
pub mod daily_log;
pub mod entities;
pub mod error;
pub mod goal;
pub mod recipes;
pub mod retention;

use std::sync::Arc;

use chrono::NaiveDate;
use tracing::error;

use crate::{store::KeyValueStore, utils::clock::Clock};

use config::TrackerConfig;
use daily_log::DailyLogStore;
use entities::LogEntry;
use error::TrackerError;
use goal::{status_color, GoalSetting, GoalStatus};
use recipes::RecipeCatalog;

/// Everything needed to render today's log.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TodaySummary {
    pub date: NaiveDate,
    pub entries: Vec<LogEntry>,
    pub total_points: u64,
    pub goal: i64,
    /// The goal as it was entered, `None` when it was never set.
    pub raw_goal: Option<String>,
    pub status: GoalStatus,
}

/// Single owner of the application state.
///
/// Validation and lookup errors are returned to the caller. Storage errors are logged and
/// swallowed: the in-memory change stays and will be missing after the next start.
pub struct Tracker<S> {
    recipes: RecipeCatalog<Arc<S>>,
    logs: DailyLogStore<Arc<S>>,
    goal: GoalSetting<Arc<S>>,
}

impl<S: KeyValueStore> Tracker<S> {
    /// Loads recipes, logs and the goal. Whatever fails to load starts out empty.
    pub async fn open(store: S, clock: Arc<dyn Clock>, config: TrackerConfig) -> Self {
        let store = Arc::new(store);
        let mut tracker = Self {
            recipes: RecipeCatalog::new(store.clone(), clock.clone()),
            logs: DailyLogStore::new(store.clone(), clock, config),
            goal: GoalSetting::new(store),
        };

        let (recipes, logs, goal) = futures::join!(
            tracker.recipes.load(),
            tracker.logs.load(),
            tracker.goal.load()
        );
        for (action, result) in [
            ("loading recipes", recipes),
            ("loading logs", logs),
            ("loading goal", goal),
        ] {
            if let Err(e) = result {
                error!("Error {action}: {e:?}");
            }
        }
        tracker
    }

    pub fn recipes(&self) -> &RecipeCatalog<Arc<S>> {
        &self.recipes
    }

    pub fn logs(&self) -> &DailyLogStore<Arc<S>> {
        &self.logs
    }

    pub fn goal(&self) -> &GoalSetting<Arc<S>> {
        &self.goal
    }

    pub async fn add_recipe(&mut self, name: &str, points: &str) -> Result<(), TrackerError> {
        settle("saving recipes", self.recipes.add(name, points).await)
    }

    pub async fn remove_recipe(&mut self, id: &str) -> Result<(), TrackerError> {
        settle("saving recipes", self.recipes.remove(id).await)
    }

    /// Logs a copy of the recipe with `id` for the active day.
    pub async fn log_recipe(&mut self, id: &str) -> Result<(), TrackerError> {
        let entry = self
            .recipes
            .find(id)
            .map(LogEntry::from)
            .ok_or_else(|| TrackerError::RecipeNotFound(id.to_owned()))?;
        settle("saving daily log", self.logs.log_entry(entry).await)
    }

    pub async fn remove_log_entry(&mut self, index: usize) -> Result<(), TrackerError> {
        settle("saving daily log", self.logs.remove_entry(index).await)
    }

    pub async fn set_goal(&mut self, value: &str) -> Result<(), TrackerError> {
        settle("saving daily goal", self.goal.set_goal(value).await)
    }

    pub async fn refresh(&mut self) -> Result<(), TrackerError> {
        settle("refreshing daily log", self.logs.refresh().await)
    }

    pub fn today_summary(&self) -> TodaySummary {
        let total_points = self.logs.total_for_today();
        let goal = self.goal.get_goal();
        TodaySummary {
            date: self.logs.active_date(),
            entries: self.logs.entries().to_vec(),
            total_points,
            goal,
            raw_goal: self.goal.raw().map(str::to_owned),
            status: status_color(total_points, goal),
        }
    }
}

fn settle<T>(action: &str, result: Result<T, TrackerError>) -> Result<(), TrackerError> {
    match result {
        Ok(_) => Ok(()),
        Err(TrackerError::Storage(e)) => {
            error!("Error {action}: {e:?}");
            Ok(())
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use anyhow::Result;
    use chrono::{DateTime, NaiveDate, TimeZone, Utc};

    use super::Tracker;
    use crate::{
        store::{
            memory::MemoryStore, KeyValueStore, MockKeyValueStore, StorageError, DAILY_GOAL_KEY,
            LOGS_KEY, RECIPES_KEY,
        },
        tracker::{
            config::{RecomputeTrigger, TrackerConfig},
            entities::DailySummary,
            error::TrackerError,
            goal::GoalStatus,
        },
        utils::{clock::Clock, time::CalendarZone},
    };

    struct FrozenClock(DateTime<Utc>);

    impl Clock for FrozenClock {
        fn time(&self) -> DateTime<Utc> {
            self.0
        }
    }

    fn clock() -> Arc<dyn Clock> {
        Arc::new(FrozenClock(
            Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap(),
        ))
    }

    #[derive(Clone)]
    struct SteppingClock(Arc<Mutex<DateTime<Utc>>>);

    impl Clock for SteppingClock {
        fn time(&self) -> DateTime<Utc> {
            *self.0.lock().unwrap()
        }
    }

    fn config() -> TrackerConfig {
        TrackerConfig {
            zone: CalendarZone::Utc,
            ..Default::default()
        }
    }

    #[tokio::test]
    async fn test_fresh_install() -> Result<()> {
        let store = Arc::new(MemoryStore::new());
        let tracker = Tracker::open(store.clone(), clock(), config()).await;

        assert!(tracker.recipes().list().is_empty());
        assert_eq!(tracker.goal().get_goal(), 0);
        assert_eq!(store.get(LOGS_KEY).await?.as_deref(), Some("{}"));
        assert_eq!(store.get(RECIPES_KEY).await?, None);
        assert_eq!(store.get(DAILY_GOAL_KEY).await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_goal_status_follows_logged_points() -> Result<()> {
        let mut tracker = Tracker::open(MemoryStore::new(), clock(), config()).await;
        tracker.set_goal("10").await?;
        tracker.add_recipe("Soup", "9").await?;
        tracker.add_recipe("Snack", "3").await?;
        tracker.add_recipe("Treat", "2").await?;
        let ids = tracker
            .recipes()
            .list()
            .iter()
            .map(|v| v.id.clone())
            .collect::<Vec<_>>();

        tracker.log_recipe(&ids[0]).await?;
        assert_eq!(tracker.today_summary().status, GoalStatus::Ok);

        tracker.log_recipe(&ids[1]).await?;
        assert_eq!(tracker.today_summary().status, GoalStatus::Warning);

        tracker.log_recipe(&ids[2]).await?;
        let summary = tracker.today_summary();
        assert_eq!(summary.total_points, 14);
        assert_eq!(summary.status, GoalStatus::Over);
        assert_eq!(summary.raw_goal.as_deref(), Some("10"));

        tracker.remove_log_entry(2).await?;
        assert_eq!(tracker.today_summary().total_points, 12);
        Ok(())
    }

    #[tokio::test]
    async fn test_logged_entries_outlive_their_recipe() -> Result<()> {
        let mut tracker = Tracker::open(MemoryStore::new(), clock(), config()).await;
        tracker.add_recipe("Soup", "4").await?;
        let id = tracker.recipes().list()[0].id.clone();
        tracker.log_recipe(&id).await?;
        tracker.remove_recipe(&id).await?;

        assert!(matches!(
            tracker.log_recipe(&id).await,
            Err(TrackerError::RecipeNotFound(_))
        ));
        assert_eq!(tracker.today_summary().total_points, 4);
        Ok(())
    }

    #[tokio::test]
    async fn test_storage_errors_are_swallowed() -> Result<()> {
        let mut store = MockKeyValueStore::new();
        store.expect_get().returning(|key| {
            Err(StorageError::io(key, std::io::Error::other("unavailable")))
        });
        store.expect_set().returning(|key, _| {
            Err(StorageError::io(key, std::io::Error::other("unavailable")))
        });
        let mut tracker = Tracker::open(store, clock(), config()).await;

        tracker.add_recipe("Soup", "4").await?;
        let id = tracker.recipes().list()[0].id.clone();
        tracker.log_recipe(&id).await?;
        tracker.set_goal("3").await?;

        let summary = tracker.today_summary();
        assert_eq!(summary.total_points, 4);
        assert_eq!(summary.goal, 3);
        assert_eq!(summary.status, GoalStatus::Warning);
        Ok(())
    }

    #[tokio::test]
    async fn test_refresh_moves_to_new_day() -> Result<()> {
        let now = Arc::new(Mutex::new(
            Utc.with_ymd_and_hms(2024, 3, 15, 12, 0, 0).unwrap(),
        ));
        let config = TrackerConfig {
            recompute: RecomputeTrigger::OnDateChange,
            ..config()
        };
        let mut tracker = Tracker::open(
            MemoryStore::new(),
            Arc::new(SteppingClock(now.clone())),
            config,
        )
        .await;
        tracker.add_recipe("Soup", "4").await?;
        let id = tracker.recipes().list()[0].id.clone();
        tracker.log_recipe(&id).await?;

        tracker.refresh().await?;
        assert_eq!(tracker.today_summary().total_points, 4);

        *now.lock().unwrap() = Utc.with_ymd_and_hms(2024, 3, 16, 8, 0, 0).unwrap();
        tracker.refresh().await?;

        let summary = tracker.today_summary();
        assert_eq!(summary.date, NaiveDate::from_ymd_opt(2024, 3, 16).unwrap());
        assert!(summary.entries.is_empty());
        assert_eq!(
            tracker.logs().historical_summaries(),
            &[DailySummary {
                date: NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(),
                total_points: 4
            }]
        );
        Ok(())
    }

    #[tokio::test]
    async fn test_summary_keeps_goal_as_entered() -> Result<()> {
        let mut tracker = Tracker::open(MemoryStore::new(), clock(), config()).await;
        assert_eq!(tracker.today_summary().raw_goal, None);

        tracker.set_goal("lots").await?;

        let summary = tracker.today_summary();
        assert_eq!(summary.raw_goal.as_deref(), Some("lots"));
        assert_eq!(summary.goal, 0);
        Ok(())
    }

    #[tokio::test]
    async fn test_validation_errors_are_returned() {
        let mut tracker = Tracker::open(MemoryStore::new(), clock(), config()).await;
        assert!(matches!(
            tracker.add_recipe("Soup", "four").await,
            Err(TrackerError::Validation(_))
        ));
        assert!(tracker.recipes().list().is_empty());
    }
}
