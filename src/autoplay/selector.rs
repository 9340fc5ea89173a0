//! Continuation source selection
//!
//! Two-branch decision: a Spotify-anchored session stays on Spotify
//! recommendations (source stickiness), everything else goes through
//! the related-media fallback.

use super::fallback::FallbackSearch;
use crate::player::{Identity, Player};
use crate::spotify::{is_spotify_uri, track_id_from_uri, RecommendationSource};
use crate::track::Track;
use std::sync::Arc;
use tracing::debug;

/// Picks a single continuation track, or none
pub struct ContinuationSelector {
    /// Present only when Spotify recommendations are configured
    spotify: Option<Arc<dyn RecommendationSource>>,
    fallback: FallbackSearch,
}

impl ContinuationSelector {
    pub fn new(spotify: Option<Arc<dyn RecommendationSource>>) -> Self {
        Self {
            spotify,
            fallback: FallbackSearch::new(),
        }
    }

    /// Select the next track after `finished`, seeded from `previous`
    ///
    /// `None` means "no continuation possible" and is an expected
    /// outcome, not an error.
    pub async fn select_next(
        &self,
        player: &dyn Player,
        previous: Option<&Track>,
        finished: &Track,
        requester: Option<&Identity>,
    ) -> Option<Track> {
        let Some(previous) = previous else {
            debug!("no previous track, nothing to continue from");
            return None;
        };

        if let Some(spotify) = &self.spotify {
            if is_spotify_uri(&previous.uri) {
                let seed = track_id_from_uri(&previous.uri);
                let candidates = spotify.fetch_recommendations(seed.as_deref()).await;
                // Source affinity is sticky: when the recommendation
                // lookup yields nothing usable, the session ends here
                // instead of silently switching to the fallback host.
                return candidates
                    .into_iter()
                    .find(|candidate| !candidate.same_uri(finished));
            }
        }

        self.fallback
            .find_next(player, previous, &finished.uri, requester)
            .await
    }
}
