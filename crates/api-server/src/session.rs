use std::sync::Arc;

use content_client::ContentProvider;
use event_engine::EventEngine;
use sim_core::GameSnapshot;

/// Per-player mutable state: the snapshot plus the event engine that carries
/// the player's active events and resolution history. One session lives
/// behind one mutex, so every mutation of a player's world is serialized.
pub struct Session {
    pub snapshot: GameSnapshot,
    pub events: EventEngine,
}

impl Session {
    pub fn new(player_id: &str, provider: Arc<dyn ContentProvider>) -> Self {
        Self {
            snapshot: GameSnapshot::new_game(player_id),
            events: EventEngine::new(provider),
        }
    }

    /// Replace the world with a restored snapshot. Active events do not
    /// survive a load; resolution history is rebuilt empty and mastery lives
    /// in the snapshot itself.
    pub fn replace_snapshot(&mut self, snapshot: GameSnapshot) {
        self.snapshot = snapshot;
        self.events.restore(Vec::new(), Vec::new());
    }
}
