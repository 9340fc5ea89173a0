//! Related-media fallback search
//!
//! When Spotify recommendations do not apply, the engine asks the host
//! to resolve a YouTube mix list seeded from the previous track and
//! picks a random entry that is not the track that just finished.

use crate::player::{Identity, LoadType, Player};
use crate::track::{Track, TrackSource};
use rand::seq::SliceRandom;
use rand::Rng;
use tracing::{debug, warn};

const YOUTUBE_HOSTS: &[&str] = &["youtube.com", "youtu.be"];

const MIX_INDEX_MIN: u32 = 2;
const MIX_INDEX_MAX: u32 = 24;

/// Redraw cap when the generated mix query collides with the uri we are
/// trying to avoid; exhaustion degrades to "no continuation"
const MAX_QUERY_ATTEMPTS: usize = 10;

/// True when a uri points at the fallback media host
pub fn is_youtube_uri(uri: &str) -> bool {
    YOUTUBE_HOSTS.iter().any(|host| uri.contains(host))
}

/// Substring after the last `=` of the uri; `None` when no `=` exists
fn video_id_from_uri(uri: &str) -> Option<String> {
    uri.rsplit_once('=')
        .map(|(_, id)| id.to_string())
        .filter(|id| !id.is_empty())
}

/// Build a mix query avoiding `avoid_uri`, redrawing the index up to
/// [`MAX_QUERY_ATTEMPTS`] times
fn pick_mix_query(
    video_id: &str,
    avoid_uri: &str,
    draw: &mut dyn FnMut() -> u32,
) -> Option<String> {
    for _ in 0..MAX_QUERY_ATTEMPTS {
        let index = draw();
        let query = format!(
            "https://www.youtube.com/watch?v={video_id}&list=RD{video_id}&index={index}"
        );
        if query != avoid_uri {
            return Some(query);
        }
    }
    None
}

/// Shuffle candidates and take the first whose uri is not excluded
fn choose_candidate(mut candidates: Vec<Track>, exclude_uri: &str) -> Option<Track> {
    candidates.shuffle(&mut rand::thread_rng());
    candidates.into_iter().find(|track| track.uri != exclude_uri)
}

/// Related-media fallback over the host's search capability
pub struct FallbackSearch;

impl FallbackSearch {
    pub fn new() -> Self {
        Self
    }

    /// Find a continuation related to `previous`, never returning a
    /// track whose uri equals `exclude_uri`
    pub async fn find_next(
        &self,
        player: &dyn Player,
        previous: &Track,
        exclude_uri: &str,
        requester: Option<&Identity>,
    ) -> Option<Track> {
        let video_id = self.resolve_video_id(player, previous, requester).await?;

        let mix_query = pick_mix_query(&video_id, exclude_uri, &mut || {
            rand::thread_rng().gen_range(MIX_INDEX_MIN..=MIX_INDEX_MAX)
        })?;

        debug!(query = %mix_query, "searching related mix list");

        let result = match player.search(&mix_query, requester).await {
            Ok(result) => result,
            Err(e) => {
                warn!(error = %e, "related mix search failed");
                return None;
            }
        };

        if matches!(result.load_type, LoadType::Empty | LoadType::Error) {
            debug!(load_type = ?result.load_type, "related mix search found nothing");
            return None;
        }

        let candidates = match (result.load_type, result.playlist) {
            (LoadType::Playlist, Some(playlist)) => playlist.tracks,
            (_, _) => result.tracks,
        };

        choose_candidate(candidates, exclude_uri).map(|chosen| Track {
            source: TrackSource::RelatedSearch,
            ..chosen
        })
    }

    /// Seed video id: taken from the previous track's uri when it is
    /// already a YouTube url, otherwise from a text search on the
    /// previous track's metadata
    async fn resolve_video_id(
        &self,
        player: &dyn Player,
        previous: &Track,
        requester: Option<&Identity>,
    ) -> Option<String> {
        if is_youtube_uri(&previous.uri) {
            return video_id_from_uri(&previous.uri);
        }

        let query = format!("{} - {}", previous.author, previous.title);
        debug!(query = %query, "resolving seed video via text search");

        let result = match player.search(&query, requester).await {
            Ok(result) => result,
            Err(e) => {
                warn!(error = %e, "seed video search failed");
                return None;
            }
        };

        let first = result.tracks.first()?;
        video_id_from_uri(&first.uri)
    }
}

impl Default for FallbackSearch {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn track(uri: &str) -> Track {
        Track::new(uri, "title", "author", TrackSource::UserQueued)
    }

    #[test]
    fn detects_youtube_hosts() {
        assert!(is_youtube_uri("https://www.youtube.com/watch?v=XYZ"));
        assert!(is_youtube_uri("https://youtu.be/XYZ?t=1"));
        assert!(!is_youtube_uri("https://open.spotify.com/track/abc"));
    }

    #[test]
    fn video_id_is_substring_after_last_equals() {
        assert_eq!(
            video_id_from_uri("https://www.youtube.com/watch?v=XYZ"),
            Some("XYZ".to_string())
        );
        // Multiple parameters: the last one wins
        assert_eq!(
            video_id_from_uri("https://www.youtube.com/watch?v=XYZ&t=42"),
            Some("42".to_string())
        );
    }

    #[test]
    fn video_id_extraction_fails_without_equals() {
        assert_eq!(video_id_from_uri("https://youtu.be/XYZ"), None);
        assert_eq!(video_id_from_uri("https://www.youtube.com/watch?v="), None);
    }

    #[test]
    fn mix_query_has_expected_shape() {
        let query = pick_mix_query("XYZ", "something-else", &mut || 7).unwrap();
        assert_eq!(
            query,
            "https://www.youtube.com/watch?v=XYZ&list=RDXYZ&index=7"
        );
    }

    #[test]
    fn mix_query_redraws_past_a_collision() {
        let colliding = "https://www.youtube.com/watch?v=XYZ&list=RDXYZ&index=2";
        let mut indexes = vec![3u32, 2].into_iter();
        let query = pick_mix_query("XYZ", colliding, &mut || indexes.next().unwrap()).unwrap();
        assert_eq!(
            query,
            "https://www.youtube.com/watch?v=XYZ&list=RDXYZ&index=3"
        );
    }

    #[test]
    fn mix_query_gives_up_after_bounded_attempts() {
        let colliding = "https://www.youtube.com/watch?v=XYZ&list=RDXYZ&index=5";
        let mut draws = 0usize;
        let result = pick_mix_query("XYZ", colliding, &mut || {
            draws += 1;
            5
        });
        assert_eq!(result, None);
        assert_eq!(draws, MAX_QUERY_ATTEMPTS);
    }

    #[test]
    fn candidate_selection_never_returns_excluded_uri() {
        let excluded = "https://www.youtube.com/watch?v=AAA";
        for _ in 0..50 {
            let candidates = vec![track(excluded), track("uri-b"), track("uri-c")];
            let chosen = choose_candidate(candidates, excluded).unwrap();
            assert_ne!(chosen.uri, excluded);
        }
    }

    #[test]
    fn candidate_selection_fails_when_all_excluded() {
        let excluded = "uri-a";
        let candidates = vec![track(excluded), track(excluded)];
        assert_eq!(choose_candidate(candidates, excluded), None);
    }

    #[test]
    fn candidate_selection_fails_on_empty_list() {
        assert_eq!(choose_candidate(Vec::new(), "uri"), None);
    }
}
