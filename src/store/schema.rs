use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};

/// Fixed storage key holding every lesson's record.
pub const STORAGE_KEY: &str = "quillTypingData";

/// Everything persisted on this device. Lessons are sibling fields; fields
/// this build does not know about are carried through untouched.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct StoredData {
    #[serde(
        default,
        deserialize_with = "lenient",
        skip_serializing_if = "Option::is_none"
    )]
    pub lesson1: Option<Lesson1StoredData>,
    #[serde(flatten)]
    pub other: Map<String, Value>,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lesson1StoredData {
    #[serde(default, deserialize_with = "lenient_flag")]
    pub completed: bool,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub best_accuracy: Option<f64>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub best_stars: Option<u8>,
    /// Reserved; nothing records a speed yet.
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub best_speed: Option<f64>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub best_game_score: Option<u32>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub last_accuracy: Option<f64>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub last_stars: Option<u8>,
    #[serde(default, deserialize_with = "lenient", skip_serializing_if = "Option::is_none")]
    pub last_played: Option<DateTime<Utc>>,
}

/// Reads any JSON value and keeps it only if it has the expected shape, so
/// one bad field never costs the rest of the record.
fn lenient<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned,
{
    let value = Value::deserialize(deserializer)?;
    Ok(serde_json::from_value(value).ok())
}

fn lenient_flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(lenient(deserializer)?.unwrap_or(false))
}

/// Partial lesson-1 record; `None` fields keep whatever is stored.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Lesson1Update {
    pub completed: Option<bool>,
    pub best_accuracy: Option<f64>,
    pub best_stars: Option<u8>,
    pub best_speed: Option<f64>,
    pub best_game_score: Option<u32>,
    pub last_accuracy: Option<f64>,
    pub last_stars: Option<u8>,
    pub last_played: Option<DateTime<Utc>>,
}

impl Lesson1StoredData {
    pub fn merged(existing: Option<&Lesson1StoredData>, update: &Lesson1Update) -> Self {
        let base = existing.cloned().unwrap_or_default();
        Self {
            completed: update.completed.unwrap_or(base.completed),
            best_accuracy: update.best_accuracy.or(base.best_accuracy),
            best_stars: update.best_stars.or(base.best_stars),
            best_speed: update.best_speed.or(base.best_speed),
            best_game_score: update.best_game_score.or(base.best_game_score),
            last_accuracy: update.last_accuracy.or(base.last_accuracy),
            last_stars: update.last_stars.or(base.last_stars),
            last_played: update.last_played.or(base.last_played),
        }
    }
}
