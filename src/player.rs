//! Host collaborator interfaces
//!
//! The queue/player primitives, the HTTP transport behind `search`, and
//! the caller identity type all live in the host framework. The engine
//! only sees the traits in this module; tests substitute fakes.

use crate::error::Result;
use crate::track::Track;
use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

/// Opaque caller identity supplied by the host
///
/// The engine never inspects the identity beyond a well-formedness
/// check; it is passed back to the host on fallback searches so the
/// host can attribute the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Identity {
    id: String,
}

impl Identity {
    pub fn new(id: impl Into<String>) -> Self {
        Self { id: id.into() }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// A well-formed identity carries a non-empty id
    pub fn is_well_formed(&self) -> bool {
        !self.id.is_empty()
    }
}

/// How the host's search resolved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadType {
    /// Nothing matched
    Empty,
    /// The search itself failed
    Error,
    /// A single track resolved directly
    Track,
    /// Ranked search results
    Search,
    /// A playlist-like collection resolved
    Playlist,
}

/// Track list carried by a playlist-shaped search result
#[derive(Debug, Clone, Default)]
pub struct PlaylistData {
    pub tracks: Vec<Track>,
}

/// Result of the host's search capability
#[derive(Debug, Clone)]
pub struct SearchResult {
    pub load_type: LoadType,
    pub tracks: Vec<Track>,
    pub playlist: Option<PlaylistData>,
}

impl SearchResult {
    pub fn empty() -> Self {
        Self {
            load_type: LoadType::Empty,
            tracks: Vec::new(),
            playlist: None,
        }
    }
}

/// Mutable queue slots owned by the host
///
/// The host keeps the underlying container; the engine only shifts the
/// `current`/`previous` pointers and appends continuations. Interior
/// mutability sits on the host side, so every method takes `&self`.
pub trait PlayerQueue: Send + Sync {
    fn current(&self) -> Option<Track>;
    fn previous(&self) -> Option<Track>;
    fn set_current(&self, track: Option<Track>);
    fn set_previous(&self, track: Option<Track>);
    fn add(&self, track: Track);
}

/// Host player surface consumed by the engine
#[async_trait]
pub trait Player: Send + Sync {
    /// Stable id for the player instance; session state is keyed on it
    fn id(&self) -> Uuid;

    fn queue(&self) -> Arc<dyn PlayerQueue>;

    /// Search through the host's resolver (text query or direct url)
    async fn search(
        &self,
        query: &str,
        requester: Option<&Identity>,
    ) -> Result<SearchResult>;

    /// Start (or resume) playback of the queue head
    fn play(&self);

    fn set_playing(&self, playing: bool);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_well_formedness() {
        assert!(Identity::new("bot-user").is_well_formed());
        assert!(!Identity::new("").is_well_formed());
    }
}
