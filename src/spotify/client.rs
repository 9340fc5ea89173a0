//! Spotify recommendations client
//!
//! Recommendation failures must never reach the queue-end path as
//! errors: every transport, auth, or parse problem degrades to an empty
//! candidate list and a log line.

use super::token::TokenCache;
use crate::error::{Error, Result};
use crate::track::{Track, TrackSource};
use async_trait::async_trait;
use serde::Deserialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

const API_BASE_URL: &str = "https://api.spotify.com/v1";
const USER_AGENT: &str = concat!("encore/", env!("CARGO_PKG_VERSION"));

const SPOTIFY_HOSTS: &[&str] = &["spotify.com", "open.spotify.com"];
const TRACK_URL_PREFIX: &str = "https://open.spotify.com/track/";

/// Response body of the recommendations endpoint
#[derive(Debug, Clone, Deserialize)]
pub struct RecommendationsResponse {
    pub tracks: Vec<RecommendedTrack>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecommendedTrack {
    pub name: String,
    pub external_urls: ExternalUrls,
    #[serde(default)]
    pub artists: Vec<RecommendedArtist>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ExternalUrls {
    pub spotify: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct RecommendedArtist {
    pub name: String,
}

/// True when a uri points at the Spotify web player
pub fn is_spotify_uri(uri: &str) -> bool {
    SPOTIFY_HOSTS.iter().any(|host| uri.contains(host))
}

/// Extract the track id from an `https://open.spotify.com/track/{id}` url
///
/// Returns `None` for any other shape; the caller treats that as
/// "no seed" and skips the recommendation lookup entirely.
pub fn track_id_from_uri(uri: &str) -> Option<String> {
    let rest = uri.strip_prefix(TRACK_URL_PREFIX)?;
    let id: String = rest
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric())
        .collect();
    if id.is_empty() {
        None
    } else {
        Some(id)
    }
}

/// Map the endpoint's candidates into engine tracks
///
/// uri = public share url, author = comma-joined artist names.
fn map_tracks(body: RecommendationsResponse) -> Vec<Track> {
    body.tracks
        .into_iter()
        .map(|candidate| {
            let author = candidate
                .artists
                .iter()
                .map(|artist| artist.name.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            Track::new(
                candidate.external_urls.spotify,
                candidate.name,
                author,
                TrackSource::SpotifyRecommendation,
            )
        })
        .collect()
}

/// Source of continuation candidates for a seed track
#[async_trait]
pub trait RecommendationSource: Send + Sync {
    /// Candidates for the seed, or empty; never an error
    async fn fetch_recommendations(&self, seed_track_id: Option<&str>) -> Vec<Track>;
}

/// Recommendations client backed by the Spotify Web API
pub struct RecommendationClient {
    http: reqwest::Client,
    tokens: Arc<TokenCache>,
    base_url: String,
}

impl RecommendationClient {
    pub fn new(tokens: Arc<TokenCache>) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| Error::SourceUnavailable(format!("failed to build http client: {e}")))?;

        Ok(Self {
            http,
            tokens,
            base_url: API_BASE_URL.to_string(),
        })
    }

    async fn try_fetch(&self, seed_track_id: &str) -> Result<Vec<Track>> {
        let token = self.tokens.get_token().await?;
        let bearer = token
            .token
            .ok_or_else(|| Error::Auth("token cache returned no token".to_string()))?;

        let url = format!(
            "{}/recommendations?seed_tracks={}",
            self.base_url, seed_track_id
        );

        let response = self
            .http
            .get(&url)
            .bearer_auth(bearer)
            .send()
            .await
            .map_err(|e| Error::SourceUnavailable(format!("recommendations request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            return Err(Error::SourceUnavailable(format!(
                "recommendations endpoint returned {status}"
            )));
        }

        let body: RecommendationsResponse = response
            .json()
            .await
            .map_err(|e| Error::SourceUnavailable(format!("malformed recommendations body: {e}")))?;

        Ok(map_tracks(body))
    }
}

#[async_trait]
impl RecommendationSource for RecommendationClient {
    async fn fetch_recommendations(&self, seed_track_id: Option<&str>) -> Vec<Track> {
        // No seed, no network call
        let Some(seed) = seed_track_id else {
            debug!("no seed track id, skipping recommendation lookup");
            return Vec::new();
        };

        match self.try_fetch(seed).await {
            Ok(tracks) => {
                debug!(seed, count = tracks.len(), "fetched spotify recommendations");
                tracks
            }
            Err(e) => {
                warn!(seed, error = %e, "spotify recommendations unavailable");
                Vec::new()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_track_id_from_share_url() {
        assert_eq!(
            track_id_from_uri("https://open.spotify.com/track/abc123"),
            Some("abc123".to_string())
        );
    }

    #[test]
    fn extracts_track_id_ignoring_query_suffix() {
        assert_eq!(
            track_id_from_uri("https://open.spotify.com/track/abc123?si=xyz"),
            Some("abc123".to_string())
        );
    }

    #[test]
    fn rejects_non_track_urls() {
        assert_eq!(track_id_from_uri("https://open.spotify.com/album/abc123"), None);
        assert_eq!(track_id_from_uri("https://www.youtube.com/watch?v=XYZ"), None);
        assert_eq!(track_id_from_uri("https://open.spotify.com/track/"), None);
    }

    #[test]
    fn detects_spotify_hosts() {
        assert!(is_spotify_uri("https://open.spotify.com/track/abc"));
        assert!(is_spotify_uri("https://spotify.com/track/abc"));
        assert!(!is_spotify_uri("https://www.youtube.com/watch?v=abc"));
    }

    #[test]
    fn maps_candidates_to_tracks() {
        let body: RecommendationsResponse = serde_json::from_str(
            r#"{
                "tracks": [{
                    "name": "Song",
                    "external_urls": { "spotify": "https://open.spotify.com/track/xyz" },
                    "artists": [{ "name": "A" }, { "name": "B" }]
                }]
            }"#,
        )
        .unwrap();

        let tracks = map_tracks(body);
        assert_eq!(tracks.len(), 1);
        assert_eq!(tracks[0].uri, "https://open.spotify.com/track/xyz");
        assert_eq!(tracks[0].title, "Song");
        assert_eq!(tracks[0].author, "A, B");
        assert_eq!(tracks[0].source, TrackSource::SpotifyRecommendation);
    }

    #[test]
    fn maps_missing_artists_to_empty_author() {
        let body: RecommendationsResponse = serde_json::from_str(
            r#"{
                "tracks": [{
                    "name": "Song",
                    "external_urls": { "spotify": "https://open.spotify.com/track/xyz" }
                }]
            }"#,
        )
        .unwrap();

        let tracks = map_tracks(body);
        assert_eq!(tracks[0].author, "");
    }
}
