//! Queue-end state machine
//!
//! Session state is explicit composition: a map from player id to
//! [`AutoplaySessionState`], owned here, instead of patching fields
//! onto the host's player type.

use super::selector::ContinuationSelector;
use crate::error::{Error, Result};
use crate::events::{Manager, PlayerEvent, TrackEndPayload};
use crate::player::{Identity, Player};
use crate::track::Track;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info};
use uuid::Uuid;

/// Per-player autoplay state; created on first toggle, dropped with the
/// player
#[derive(Debug, Clone, Default)]
pub struct AutoplaySessionState {
    pub enabled: bool,
    /// Identity of the caller that last toggled autoplay; forwarded to
    /// the host on fallback searches
    pub identity: Option<Identity>,
}

/// Queue-end state machine over per-player autoplay flags
pub struct AutoplayController {
    selector: ContinuationSelector,
    sessions: RwLock<HashMap<Uuid, AutoplaySessionState>>,
}

impl AutoplayController {
    pub fn new(selector: ContinuationSelector) -> Self {
        Self {
            selector,
            sessions: RwLock::new(HashMap::new()),
        }
    }

    /// The only external mutator of the autoplay flag
    pub async fn set_autoplay(
        &self,
        player_id: Uuid,
        enabled: bool,
        identity: &Identity,
    ) -> Result<()> {
        if !identity.is_well_formed() {
            return Err(Error::Validation(
                "identity must carry a non-empty id".to_string(),
            ));
        }

        let mut sessions = self.sessions.write().await;
        let session = sessions.entry(player_id).or_default();
        session.enabled = enabled;
        session.identity = Some(identity.clone());

        info!(%player_id, enabled, "autoplay toggled");
        Ok(())
    }

    /// Current flag for a player; false when no session exists
    pub async fn is_enabled(&self, player_id: Uuid) -> bool {
        self.sessions
            .read()
            .await
            .get(&player_id)
            .map(|session| session.enabled)
            .unwrap_or(false)
    }

    /// Forget a player's session (host destroyed the player)
    pub async fn drop_session(&self, player_id: Uuid) {
        self.sessions.write().await.remove(&player_id);
        debug!(%player_id, "autoplay session dropped");
    }

    /// Handle a queue-end signal to completion
    pub async fn handle_queue_end(
        &self,
        manager: &Manager,
        player: Arc<dyn Player>,
        finished: Track,
        payload: TrackEndPayload,
    ) {
        let queue = player.queue();
        queue.set_previous(queue.current());
        queue.set_current(None);

        let session = {
            let sessions = self.sessions.read().await;
            sessions.get(&player.id()).cloned().unwrap_or_default()
        };

        if !session.enabled {
            // Terminal state: hand the signal back to host subscribers
            player.set_playing(false);
            manager.emit(PlayerEvent::QueueEnd {
                player,
                track: finished,
                payload,
            });
            return;
        }

        let previous = queue.previous();
        let next = self
            .selector
            .select_next(
                player.as_ref(),
                previous.as_ref(),
                &finished,
                session.identity.as_ref(),
            )
            .await;

        match next {
            Some(track) => {
                info!(uri = %track.uri, source = ?track.source, "autoplay continuation selected");
                queue.add(track);
                player.play();
            }
            None => {
                // Queue stays drained; the host notices through its own
                // polling, no re-emit on this path
                debug!(player_id = %player.id(), "no continuation available");
            }
        }
    }
}
