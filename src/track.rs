//! Track value objects shared across the engine

use serde::{Deserialize, Serialize};

/// Which source produced a track
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackSource {
    /// Queued by a user through the host
    UserQueued,
    /// Returned by the Spotify recommendations endpoint
    SpotifyRecommendation,
    /// Found through the related-media fallback search
    RelatedSearch,
}

/// A reference to a playable item
///
/// Tracks are immutable value objects. Anti-repetition checks compare
/// uris only, never title/author (see [`Track::same_uri`]).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub uri: String,
    pub title: String,
    pub author: String,
    pub source: TrackSource,
}

impl Track {
    pub fn new(
        uri: impl Into<String>,
        title: impl Into<String>,
        author: impl Into<String>,
        source: TrackSource,
    ) -> Self {
        Self {
            uri: uri.into(),
            title: title.into(),
            author: author.into(),
            source,
        }
    }

    /// Anti-repetition equality: two tracks repeat when their uris match
    pub fn same_uri(&self, other: &Track) -> bool {
        self.uri == other.uri
    }
}
