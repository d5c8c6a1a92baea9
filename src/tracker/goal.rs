use tracing::{debug, info};

use crate::store::{KeyValueStore, DAILY_GOAL_KEY};

use super::error::TrackerError;

/// Amount of points above the goal that is still considered a near miss.
pub const WARNING_TOLERANCE: i64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GoalStatus {
    Ok,
    Warning,
    Over,
}

/// Classifies a daily total against the goal.
pub fn status_color(total: u64, goal: i64) -> GoalStatus {
    let total = i64::try_from(total).unwrap_or(i64::MAX);
    if total <= goal {
        GoalStatus::Ok
    } else if total <= goal.saturating_add(WARNING_TOLERANCE) {
        GoalStatus::Warning
    } else {
        GoalStatus::Over
    }
}

/// The daily goal. Stored exactly as entered, it's only interpreted when read.
pub struct GoalSetting<S> {
    store: S,
    raw: Option<String>,
}

impl<S: KeyValueStore> GoalSetting<S> {
    pub fn new(store: S) -> Self {
        Self { store, raw: None }
    }

    pub async fn load(&mut self) -> Result<(), TrackerError> {
        self.raw = self.store.get(DAILY_GOAL_KEY).await?;
        debug!("Loaded goal {:?}", self.raw);
        Ok(())
    }

    pub fn raw(&self) -> Option<&str> {
        self.raw.as_deref().filter(|v| !v.is_empty())
    }

    /// Unset or unparsable goals count as 0.
    pub fn get_goal(&self) -> i64 {
        self.raw.as_deref().and_then(parse_leading_int).unwrap_or(0)
    }

    pub async fn set_goal(&mut self, value: &str) -> Result<(), TrackerError> {
        info!("Setting goal to {value:?}");
        self.raw = Some(value.to_owned());
        self.store.set(DAILY_GOAL_KEY, value).await?;
        Ok(())
    }
}

/// Reads an optionally signed integer from the start of `value`, ignoring whatever follows it.
/// "12 points" is 12, "points" is nothing.
fn parse_leading_int(value: &str) -> Option<i64> {
    let value = value.trim_start();
    let (negative, rest) = match value.as_bytes().first() {
        Some(b'-') => (true, &value[1..]),
        Some(b'+') => (false, &value[1..]),
        _ => (false, value),
    };
    let digits = rest.bytes().take_while(u8::is_ascii_digit).count();
    if digits == 0 {
        return None;
    }
    let magnitude = rest[..digits].parse::<i64>().ok()?;
    Some(if negative { -magnitude } else { magnitude })
}
