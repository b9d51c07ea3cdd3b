use serde::{Deserialize, Serialize};
use time::Date;

use crate::recipes::repo::Recipe;

time::serde::format_description!(history_date, Date, "[year]-[month]-[day]");

/// The engine's single recommendation for the current slot and day.
/// Serialized verbatim into the cache and the history; never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Suggestion {
    pub icon: String,
    pub dish: String,
    pub reason: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipe: Option<Recipe>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryItem {
    #[serde(with = "history_date")]
    pub date: Date,
    pub suggestion: Suggestion,
}

#[derive(Debug, Deserialize)]
pub struct TodayQuery {
    pub lat: Option<f64>,
    pub lon: Option<f64>,
}
