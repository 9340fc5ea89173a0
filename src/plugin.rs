//! Plugin entry point wiring the engine into a host manager

use crate::autoplay::{AutoplayController, ContinuationSelector};
use crate::config::AutoplayConfig;
use crate::error::Result;
use crate::events::{Manager, QueueEndHandler, TrackEndPayload};
use crate::player::{Identity, Player};
use crate::spotify::{RecommendationClient, RecommendationSource, TokenCache};
use crate::track::Track;
use async_trait::async_trait;
use std::sync::{Arc, Weak};
use tracing::{info, warn};
use uuid::Uuid;

/// Autoplay continuation plugin
///
/// Construct once per process, then [`AutoplayPlugin::load`] it into
/// the host manager. One token cache is shared by every player using
/// the configured credential pair.
pub struct AutoplayPlugin {
    config: AutoplayConfig,
    controller: Arc<AutoplayController>,
    tokens: Option<Arc<TokenCache>>,
}

impl std::fmt::Debug for AutoplayPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AutoplayPlugin")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl AutoplayPlugin {
    /// Validates configuration eagerly; missing Spotify credentials
    /// while recommendations are enabled fail here, not on first use
    pub fn new(config: AutoplayConfig) -> Result<Self> {
        config.validate()?;

        let (tokens, source) = match config
            .spotify_recommendations
            .then(|| config.credentials())
            .flatten()
        {
            Some((id, secret)) => {
                let tokens = Arc::new(TokenCache::new(id, secret)?);
                let client: Arc<dyn RecommendationSource> =
                    Arc::new(RecommendationClient::new(tokens.clone())?);
                (Some(tokens), Some(client))
            }
            None => (None, None),
        };

        Ok(Self::from_parts(config, source, tokens))
    }

    /// Constructor with an injected recommendation source (tests, or a
    /// host that brings its own client)
    pub fn with_recommendation_source(
        config: AutoplayConfig,
        source: Arc<dyn RecommendationSource>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_parts(config, Some(source), None))
    }

    /// Constructor with an injected source and token cache; the cache
    /// seam exists so tests can count exchanges through a fake transport
    pub fn with_token_cache(
        config: AutoplayConfig,
        source: Arc<dyn RecommendationSource>,
        tokens: Arc<TokenCache>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self::from_parts(config, Some(source), Some(tokens)))
    }

    fn from_parts(
        config: AutoplayConfig,
        source: Option<Arc<dyn RecommendationSource>>,
        tokens: Option<Arc<TokenCache>>,
    ) -> Self {
        // The recommendation branch is keyed on source presence, so an
        // injected source must still respect a disabled config
        let source = config.spotify_recommendations.then_some(source).flatten();
        let selector = ContinuationSelector::new(source);
        Self {
            config,
            controller: Arc::new(AutoplayController::new(selector)),
            tokens,
        }
    }

    /// Registration entry point, invoked once by the host at startup
    pub async fn load(&self, manager: &Arc<Manager>) {
        info!(
            spotify_recommendations = self.config.spotify_recommendations,
            "autoplay plugin loaded"
        );

        let handler = Arc::new(QueueEndRelay {
            controller: self.controller.clone(),
            manager: Arc::downgrade(manager),
        });
        manager.set_queue_end_handler(handler).await;
    }

    /// Toggle autoplay for a player
    ///
    /// Enabling with Spotify recommendations configured warms the token
    /// cache; warm-up failure is logged and non-fatal, the cache simply
    /// refreshes again on first use.
    pub async fn set_autoplay(
        &self,
        player: &dyn Player,
        enabled: bool,
        identity: &Identity,
    ) -> Result<()> {
        self.controller
            .set_autoplay(player.id(), enabled, identity)
            .await?;

        if enabled {
            if let Some(tokens) = &self.tokens {
                if let Err(e) = tokens.get_token().await {
                    warn!(error = %e, "spotify token warm-up failed");
                }
            }
        }

        Ok(())
    }

    /// Whether autoplay is currently enabled for a player
    pub async fn autoplay_enabled(&self, player_id: Uuid) -> bool {
        self.controller.is_enabled(player_id).await
    }

    /// Host notification that a player was destroyed
    pub async fn player_destroyed(&self, player_id: Uuid) {
        self.controller.drop_session(player_id).await;
    }
}

/// Bridges the manager's handler slot to the controller
///
/// Holds the manager weakly: the manager owns the handler, and the
/// handler only needs the manager back for the disabled-path re-emit.
struct QueueEndRelay {
    controller: Arc<AutoplayController>,
    manager: Weak<Manager>,
}

#[async_trait]
impl QueueEndHandler for QueueEndRelay {
    async fn on_queue_end(
        &self,
        player: Arc<dyn Player>,
        track: Track,
        payload: TrackEndPayload,
    ) {
        let Some(manager) = self.manager.upgrade() else {
            return;
        };
        self.controller
            .handle_queue_end(&manager, player, track, payload)
            .await;
    }
}
