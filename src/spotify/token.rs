//! Spotify client-credentials token cache
//!
//! One cache instance is shared across all players using the same
//! credential pair. Concurrent refreshes during an expired window are
//! harmless (the exchange is idempotent, last writer wins), but the
//! internal mutex serializes them anyway so at most one round-trip
//! happens per expiry.

use crate::error::{Error, Result};
use async_trait::async_trait;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use serde::Deserialize;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;
use tracing::debug;

const TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
const USER_AGENT: &str = concat!("encore/", env!("CARGO_PKG_VERSION"));

/// Tokens closer than this to expiry are refreshed before use
const EXPIRY_MARGIN_MS: i64 = 30_000;

/// Body of a successful client-credentials exchange
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    /// Lifetime in seconds
    pub expires_in: i64,
    pub token_type: String,
}

/// Cached bearer credential
#[derive(Debug, Clone, Default)]
pub struct CachedToken {
    pub token: Option<String>,
    /// Unix epoch milliseconds
    pub expires_at_ms: i64,
    pub token_type: Option<String>,
}

impl CachedToken {
    /// Valid only while expiry is more than the safety margin away
    fn is_valid_at(&self, now_ms: i64) -> bool {
        self.token.is_some() && self.expires_at_ms > now_ms + EXPIRY_MARGIN_MS
    }
}

/// Clock seam so tests can control expiry
pub trait Clock: Send + Sync {
    fn now_ms(&self) -> i64;
}

/// Wall clock
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as i64)
            .unwrap_or(0)
    }
}

/// Transport seam for the client-credentials exchange
#[async_trait]
pub trait TokenExchange: Send + Sync {
    async fn exchange(&self, client_id: &str, client_secret: &str) -> Result<TokenResponse>;
}

/// reqwest-backed exchange against the Spotify accounts service
pub struct HttpTokenExchange {
    http: reqwest::Client,
    token_url: String,
}

impl HttpTokenExchange {
    pub fn new() -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| Error::Auth(format!("failed to build http client: {e}")))?;

        Ok(Self {
            http,
            token_url: TOKEN_URL.to_string(),
        })
    }
}

#[async_trait]
impl TokenExchange for HttpTokenExchange {
    async fn exchange(&self, client_id: &str, client_secret: &str) -> Result<TokenResponse> {
        let basic = BASE64.encode(format!("{client_id}:{client_secret}"));

        let response = self
            .http
            .post(&self.token_url)
            .header("Authorization", format!("Basic {basic}"))
            .header("Content-Type", "application/x-www-form-urlencoded")
            .body("grant_type=client_credentials")
            .send()
            .await
            .map_err(|e| Error::Auth(format!("token request failed: {e}")))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Error::Auth(format!(
                "token endpoint returned {status}: {body}"
            )));
        }

        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| Error::Auth(format!("malformed token response: {e}")))
    }
}

/// Shared bearer-token cache, one instance per credential pair
///
/// Exchange failures surface as [`Error::Auth`] to the caller; retry
/// policy belongs to the caller, not here.
pub struct TokenCache {
    client_id: String,
    client_secret: String,
    exchange: Arc<dyn TokenExchange>,
    clock: Arc<dyn Clock>,
    state: Mutex<CachedToken>,
}

impl TokenCache {
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Result<Self> {
        Ok(Self::with_parts(
            client_id,
            client_secret,
            Arc::new(HttpTokenExchange::new()?),
            Arc::new(SystemClock),
        ))
    }

    /// Constructor with injected transport and clock
    pub fn with_parts(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        exchange: Arc<dyn TokenExchange>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            exchange,
            clock,
            state: Mutex::new(CachedToken::default()),
        }
    }

    /// Returns a valid token, refreshing only when absent or near expiry
    pub async fn get_token(&self) -> Result<CachedToken> {
        let mut state = self.state.lock().await;
        let now_ms = self.clock.now_ms();

        if state.is_valid_at(now_ms) {
            debug!(expires_at_ms = state.expires_at_ms, "using cached spotify token");
            return Ok(state.clone());
        }

        let fresh = self
            .exchange
            .exchange(&self.client_id, &self.client_secret)
            .await?;

        state.token = Some(fresh.access_token);
        state.expires_at_ms = now_ms + fresh.expires_in * 1000;
        state.token_type = Some(fresh.token_type);

        debug!(expires_at_ms = state.expires_at_ms, "refreshed spotify token");
        Ok(state.clone())
    }
}
