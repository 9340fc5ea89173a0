//! Spotify Web API integration: token lifecycle and recommendations

pub mod client;
pub mod token;

pub use client::{is_spotify_uri, track_id_from_uri, RecommendationClient, RecommendationSource};
pub use token::{CachedToken, Clock, SystemClock, TokenCache, TokenExchange, TokenResponse};
