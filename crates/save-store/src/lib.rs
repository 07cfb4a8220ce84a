//! Persistence boundary: a key-value blob store for game snapshots keyed by
//! (player id, save slot). Saves carry a SHA-256 checksum over the canonical
//! JSON payload; loads verify it, and restoring a snapshot always runs the
//! season-cycle repair so out-of-range state from older or hand-edited saves
//! never reaches the engines.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use sim_core::{GameSnapshot, Season, SimError, SimResult};

pub const SAVE_FORMAT_VERSION: &str = "1.0.0";

/// A persisted save as stored: opaque JSON payload plus integrity metadata.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoredSave {
    pub player_id: String,
    pub slot: String,
    pub payload: String,
    pub checksum: String,
    pub saved_at: DateTime<Utc>,
    pub version: String,
}

/// Returned from a successful save.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveReceipt {
    pub slot: String,
    pub checksum: String,
    pub saved_at: DateTime<Utc>,
}

/// Listing entry: enough to render a save-slot picker without deserializing
/// the whole snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveSummary {
    pub slot: String,
    pub season: Season,
    pub day: u32,
    pub money: i64,
    pub saved_at: DateTime<Utc>,
}

/// Blob-store seam. The in-memory implementation ships here; a durable
/// backend only needs to implement these four calls.
#[async_trait]
pub trait SnapshotStore: Send + Sync {
    async fn save(&self, snapshot: &GameSnapshot, slot: &str) -> SimResult<SaveReceipt>;
    async fn load(&self, player_id: &str, slot: &str) -> SimResult<StoredSave>;
    async fn list(&self, player_id: &str) -> SimResult<Vec<SaveSummary>>;
    async fn delete(&self, player_id: &str, slot: &str) -> SimResult<()>;
}

/// SHA-256 hex digest of a payload.
pub fn checksum(payload: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(payload.as_bytes());
    hex::encode(hasher.finalize())
}

/// Verify integrity, deserialize, and repair the season cycle before the
/// snapshot is handed back to the engines.
pub fn restore_snapshot(save: &StoredSave) -> SimResult<GameSnapshot> {
    let computed = checksum(&save.payload);
    if computed != save.checksum {
        return Err(SimError::CorruptSave(format!(
            "checksum mismatch on slot {} (stored {}, computed {})",
            save.slot, save.checksum, computed
        )));
    }

    let mut snapshot: GameSnapshot = serde_json::from_str(&save.payload)
        .map_err(|e| SimError::CorruptSave(format!("undecodable payload: {e}")))?;

    let repairs = season_clock::repair(&mut snapshot.season);
    if !repairs.is_empty() {
        tracing::warn!(
            slot = %save.slot,
            repairs = repairs.len(),
            "season state repaired while restoring save"
        );
    }

    Ok(snapshot)
}

/// In-memory snapshot store.
#[derive(Default)]
pub struct InMemoryStore {
    saves: DashMap<(String, String), StoredSave>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl SnapshotStore for InMemoryStore {
    async fn save(&self, snapshot: &GameSnapshot, slot: &str) -> SimResult<SaveReceipt> {
        let mut stamped = snapshot.clone();
        stamped.last_saved = Some(Utc::now());

        let payload = serde_json::to_string(&stamped)
            .map_err(|e| SimError::Serialization(e.to_string()))?;
        let checksum = checksum(&payload);
        let saved_at = stamped.last_saved.unwrap_or_else(Utc::now);

        let stored = StoredSave {
            player_id: stamped.player_id.clone(),
            slot: slot.to_string(),
            payload,
            checksum: checksum.clone(),
            saved_at,
            version: SAVE_FORMAT_VERSION.to_string(),
        };
        self.saves
            .insert((stamped.player_id.clone(), slot.to_string()), stored);

        tracing::debug!(player = %stamped.player_id, slot, "snapshot saved");
        Ok(SaveReceipt {
            slot: slot.to_string(),
            checksum,
            saved_at,
        })
    }

    async fn load(&self, player_id: &str, slot: &str) -> SimResult<StoredSave> {
        self.saves
            .get(&(player_id.to_string(), slot.to_string()))
            .map(|entry| entry.value().clone())
            .ok_or_else(|| SimError::NotFound(format!("no save in slot {slot}")))
    }

    async fn list(&self, player_id: &str) -> SimResult<Vec<SaveSummary>> {
        let mut summaries = Vec::new();
        for entry in self.saves.iter() {
            if entry.key().0 != player_id {
                continue;
            }
            let save = entry.value();
            // A summary is best-effort: undecodable saves still show up so
            // the player can delete them.
            let (season, day, money) = serde_json::from_str::<GameSnapshot>(&save.payload)
                .map(|s| (s.season.current, s.season.day, s.farm.money))
                .unwrap_or((Season::Kharif, 1, 0));
            summaries.push(SaveSummary {
                slot: save.slot.clone(),
                season,
                day,
                money,
                saved_at: save.saved_at,
            });
        }
        summaries.sort_by(|a, b| a.slot.cmp(&b.slot));
        Ok(summaries)
    }

    async fn delete(&self, player_id: &str, slot: &str) -> SimResult<()> {
        self.saves
            .remove(&(player_id.to_string(), slot.to_string()))
            .map(|_| ())
            .ok_or_else(|| SimError::NotFound(format!("no save in slot {slot}")))
    }
}
