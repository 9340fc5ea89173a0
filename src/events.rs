//! Player events and the host event bus seam
//!
//! The host delivers queue-end signals to the plugin through a
//! dedicated handler slot on [`Manager`], while ordinary subscribers
//! listen on a broadcast [`EventBus`]. Keeping the two apart means the
//! plugin can re-emit a queue-end for host subscribers without feeding
//! the event back into its own handler.

use crate::player::Player;
use crate::track::Track;
use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use tokio::sync::{broadcast, RwLock};

/// Why a track stopped playing, carried on queue-end signals
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackEndReason {
    Finished,
    Stopped,
    Replaced,
    LoadFailed,
    Cleanup,
}

/// Payload attached to a queue-end signal
#[derive(Debug, Clone)]
pub struct TrackEndPayload {
    pub reason: TrackEndReason,
}

impl TrackEndPayload {
    pub fn finished() -> Self {
        Self {
            reason: TrackEndReason::Finished,
        }
    }
}

/// Events exchanged with the host
#[derive(Clone)]
pub enum PlayerEvent {
    /// The playback queue drained with no further entries
    QueueEnd {
        player: Arc<dyn Player>,
        track: Track,
        payload: TrackEndPayload,
    },
}

impl fmt::Debug for PlayerEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PlayerEvent::QueueEnd { player, track, payload } => f
                .debug_struct("QueueEnd")
                .field("player", &player.id())
                .field("track", &track.uri)
                .field("payload", payload)
                .finish(),
        }
    }
}

/// Handler slot for queue-end signals
#[async_trait]
pub trait QueueEndHandler: Send + Sync {
    async fn on_queue_end(
        &self,
        player: Arc<dyn Player>,
        track: Track,
        payload: TrackEndPayload,
    );
}

/// Broadcast bus for host subscribers
pub struct EventBus {
    tx: broadcast::Sender<PlayerEvent>,
}

impl EventBus {
    /// Creates a new EventBus with the given channel capacity
    pub fn new(capacity: usize) -> Self {
        let (tx, _) = broadcast::channel(capacity);
        Self { tx }
    }

    /// Subscribe to all future events
    pub fn subscribe(&self) -> broadcast::Receiver<PlayerEvent> {
        self.tx.subscribe()
    }

    /// Emit an event, ignoring if no subscribers are listening
    pub fn emit_lossy(&self, event: PlayerEvent) {
        let _ = self.tx.send(event);
    }

    /// Current number of active subscribers
    pub fn subscriber_count(&self) -> usize {
        self.tx.receiver_count()
    }
}

/// Host manager seam: broadcast bus plus the plugin's handler slot
pub struct Manager {
    bus: EventBus,
    queue_end_handler: RwLock<Option<Arc<dyn QueueEndHandler>>>,
}

impl Manager {
    pub fn new(capacity: usize) -> Self {
        Self {
            bus: EventBus::new(capacity),
            queue_end_handler: RwLock::new(None),
        }
    }

    pub fn events(&self) -> &EventBus {
        &self.bus
    }

    /// Register the queue-end handler; only one handler is held
    pub async fn set_queue_end_handler(&self, handler: Arc<dyn QueueEndHandler>) {
        *self.queue_end_handler.write().await = Some(handler);
    }

    /// Host-side entry point: deliver a queue-end signal
    ///
    /// Handled to completion before the host emits the next signal for
    /// the same player, so continuation selections never overlap per
    /// player. Falls through to the bus when no plugin is loaded.
    pub async fn notify_queue_end(
        &self,
        player: Arc<dyn Player>,
        track: Track,
        payload: TrackEndPayload,
    ) {
        let handler = self.queue_end_handler.read().await.clone();
        match handler {
            Some(handler) => handler.on_queue_end(player, track, payload).await,
            None => self.bus.emit_lossy(PlayerEvent::QueueEnd {
                player,
                track,
                payload,
            }),
        }
    }

    /// Re-emit an event to bus subscribers (never to the handler slot)
    pub fn emit(&self, event: PlayerEvent) {
        self.bus.emit_lossy(event);
    }
}

impl Default for Manager {
    fn default() -> Self {
        Self::new(1000)
    }
}
