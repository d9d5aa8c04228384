//! Represents an event — a named occasion photos are grouped under.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

pub type EventId = Uuid;

/// A stored event.
#[derive(Serialize, Deserialize, Clone, FromRow, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    pub id: EventId,

    /// Display name; never blank.
    pub name: String,

    /// Free-form date text, stored exactly as supplied.
    pub date: String,

    pub description: String,
}

/// Arguments of `createEvent`.
///
/// `date` may be omitted (or sent blank) and then defaults to the current
/// UTC day as `YYYY-MM-DD`.
#[derive(Serialize, Deserialize, Clone, Debug, Default)]
#[serde(rename_all = "camelCase")]
pub struct NewEvent {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default)]
    pub description: String,
}

impl NewEvent {
    /// The date to store: the supplied text untouched, or today if blank.
    pub fn date_or_today(&self) -> String {
        match self.date.as_deref() {
            Some(date) if !date.trim().is_empty() => date.to_string(),
            _ => today(),
        }
    }
}

/// Current UTC day as `YYYY-MM-DD`.
pub fn today() -> String {
    Utc::now().format("%Y-%m-%d").to_string()
}
