//! Per-player state kept between requests.
//!
//! Story progress lives in the progress store; what stays here is the
//! player's reward state and which story they are playing right now.

use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use mechdeck_core::error::DomainError;
use mechdeck_rewards::domain::aggregates::PlayerState;
use uuid::Uuid;

#[derive(Debug)]
struct PlayerSession {
    active_story: Option<String>,
    player: PlayerState,
}

/// In-memory player sessions. Locked only for synchronous reads and writes.
#[derive(Debug, Default)]
pub struct PlayerSessions {
    sessions: Mutex<HashMap<Uuid, PlayerSession>>,
}

impl PlayerSessions {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, HashMap<Uuid, PlayerSession>>, DomainError> {
        self.sessions
            .lock()
            .map_err(|e| DomainError::Infrastructure(format!("session mutex poisoned: {e}")))
    }

    /// Records which story the player opened last.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the lock is poisoned.
    pub fn set_active_story(&self, user_id: Uuid, story_id: &str) -> Result<(), DomainError> {
        let mut sessions = self.lock()?;
        let session = sessions.entry(user_id).or_insert_with(|| PlayerSession {
            active_story: None,
            player: PlayerState::new(user_id),
        });
        session.active_story = Some(story_id.to_owned());
        Ok(())
    }

    /// The story the player opened last, if any.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the lock is poisoned.
    pub fn active_story(&self, user_id: Uuid) -> Result<Option<String>, DomainError> {
        Ok(self
            .lock()?
            .get(&user_id)
            .and_then(|session| session.active_story.clone()))
    }

    /// A snapshot of the player's reward state; a new player starts empty.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the lock is poisoned.
    pub fn player(&self, user_id: Uuid) -> Result<PlayerState, DomainError> {
        Ok(self
            .lock()?
            .get(&user_id)
            .map_or_else(|| PlayerState::new(user_id), |session| session.player.clone()))
    }

    /// Stores the player's reward state. Last write wins.
    ///
    /// # Errors
    ///
    /// Returns `DomainError::Infrastructure` if the lock is poisoned.
    pub fn store_player(&self, player: PlayerState) -> Result<(), DomainError> {
        let mut sessions = self.lock()?;
        match sessions.get_mut(&player.user_id) {
            Some(session) => session.player = player,
            None => {
                sessions.insert(
                    player.user_id,
                    PlayerSession {
                        active_story: None,
                        player,
                    },
                );
            }
        }
        Ok(())
    }
}
