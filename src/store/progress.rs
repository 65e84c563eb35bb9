use chrono::{DateTime, Utc};
use serde_json::Value;
use tracing::{info, warn};

use crate::session::result::SessionSummary;
use crate::store::schema::{Lesson1StoredData, Lesson1Update, STORAGE_KEY, StoredData};
use crate::store::storage::{Storage, StoreError};

/// Reads and writes the device's progress record through a [`Storage`].
pub struct ProgressStore<S: Storage> {
    storage: S,
}

impl<S: Storage> ProgressStore<S> {
    pub fn new(storage: S) -> Self {
        Self { storage }
    }

    /// Never fails: missing, unreadable, corrupt or non-object data all read
    /// as an empty record.
    pub fn read(&self) -> StoredData {
        let raw = match self.storage.get(STORAGE_KEY) {
            Ok(Some(raw)) => raw,
            Ok(None) => return StoredData::default(),
            Err(e) => {
                warn!("Unable to read progress: {e}");
                return StoredData::default();
            }
        };

        match serde_json::from_str::<Value>(&raw) {
            Ok(value @ Value::Object(_)) => serde_json::from_value(value).unwrap_or_else(|e| {
                warn!("Ignoring malformed progress record: {e}");
                StoredData::default()
            }),
            Ok(_) => StoredData::default(),
            Err(e) => {
                warn!("Ignoring unparsable progress record: {e}");
                StoredData::default()
            }
        }
    }

    pub fn lesson1(&self) -> Option<Lesson1StoredData> {
        self.read().lesson1
    }

    /// Merges `update` into the stored lesson-1 record and writes the whole
    /// record back. Returns the merged lesson record.
    pub fn upsert_lesson1(
        &mut self,
        update: &Lesson1Update,
    ) -> Result<Lesson1StoredData, StoreError> {
        let mut data = self.read();
        let merged = Lesson1StoredData::merged(data.lesson1.as_ref(), update);
        data.lesson1 = Some(merged.clone());

        let json = serde_json::to_string(&data)?;
        self.storage.set(STORAGE_KEY, &json).inspect_err(|e| {
            warn!("Unable to save progress: {e}");
        })?;
        Ok(merged)
    }

    /// Records a finished session: last-* fields are overwritten, best-*
    /// fields only ever go up.
    pub fn record_session(
        &mut self,
        summary: &SessionSummary,
        played_at: DateTime<Utc>,
    ) -> Result<Lesson1StoredData, StoreError> {
        let previous = self.lesson1();
        let update = session_update(previous.as_ref(), summary, played_at);
        let saved = self.upsert_lesson1(&update)?;
        info!(
            best_stars = ?saved.best_stars,
            best_accuracy = ?saved.best_accuracy,
            "progress saved"
        );
        Ok(saved)
    }

    /// Deletes the whole record.
    pub fn reset_progress(&mut self) -> Result<(), StoreError> {
        self.storage.remove(STORAGE_KEY).inspect_err(|e| {
            warn!("Unable to reset progress: {e}");
        })?;
        info!("progress reset");
        Ok(())
    }
}

pub fn session_update(
    previous: Option<&Lesson1StoredData>,
    summary: &SessionSummary,
    played_at: DateTime<Utc>,
) -> Lesson1Update {
    let prev = previous.cloned().unwrap_or_default();
    Lesson1Update {
        completed: Some(true),
        last_accuracy: Some(summary.accuracy),
        last_stars: Some(summary.stars),
        best_accuracy: Some(
            prev.best_accuracy
                .map_or(summary.accuracy, |best| best.max(summary.accuracy)),
        ),
        best_stars: Some(prev.best_stars.map_or(summary.stars, |best| best.max(summary.stars))),
        best_game_score: Some(
            prev.best_game_score
                .map_or(summary.game.score, |best| best.max(summary.game.score)),
        ),
        best_speed: None,
        last_played: Some(played_at),
    }
}
