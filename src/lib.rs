//! # Encore
//!
//! Autoplay continuation engine for a music player host: when the
//! playback queue drains, pick a plausible next track and keep playing.
//!
//! The engine combines two sources. A session anchored to Spotify uses
//! the recommendations endpoint (seeded from the previous track) and
//! stays there; every other session falls back to a YouTube mix-list
//! search through the host's own resolver. Anti-repetition excludes the
//! track that just finished, by uri.
//!
//! Queue/player primitives, the event bus, and caller identities belong
//! to the host and are consumed through the traits in [`player`] and
//! [`events`]. Source failures never crash the queue-end path: they
//! degrade to "no continuation" and playback simply stops.

pub mod autoplay;
pub mod config;
pub mod error;
pub mod events;
pub mod player;
pub mod plugin;
pub mod spotify;
pub mod track;

pub use config::AutoplayConfig;
pub use error::{Error, Result};
pub use plugin::AutoplayPlugin;
pub use track::{Track, TrackSource};
