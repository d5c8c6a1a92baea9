use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// A reusable food item. Recipes are never edited, only created and removed.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
pub struct Recipe {
    pub id: String,
    pub name: String,
    #[serde(rename = "calories")]
    pub points: u32,
}

/// A copy of a recipe taken at the moment it was logged. Removing the recipe later doesn't affect
/// already logged entries.
#[derive(PartialEq, Eq, Debug, Serialize, Deserialize, Clone)]
pub struct LogEntry {
    pub name: String,
    #[serde(rename = "calories")]
    pub points: u32,
}

impl From<&Recipe> for LogEntry {
    fn from(recipe: &Recipe) -> Self {
        LogEntry {
            name: recipe.name.clone(),
            points: recipe.points,
        }
    }
}

/// Everything that was logged, by day. Serialized as a JSON object with `YYYY-MM-DD` keys.
pub type LogArchive = BTreeMap<NaiveDate, Vec<LogEntry>>;

#[derive(PartialEq, Eq, Debug, Clone, Copy)]
pub struct DailySummary {
    pub date: NaiveDate,
    pub total_points: u64,
}

pub fn total_points<'a>(entries: impl IntoIterator<Item = &'a LogEntry>) -> u64 {
    entries.into_iter().map(|v| u64::from(v.points)).sum()
}
