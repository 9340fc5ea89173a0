//! Autoplay configuration and validation

use crate::{Error, Result};
use serde::Deserialize;

/// Per-session autoplay configuration
///
/// Deserializable so hosts can embed it in their own config file.
/// Validated eagerly at plugin construction: enabling Spotify
/// recommendations without both credentials is a startup-time failure,
/// never deferred to the first continuation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AutoplayConfig {
    /// Use Spotify recommendations when the previous track is a Spotify uri
    #[serde(default)]
    pub spotify_recommendations: bool,

    /// Spotify application client id (required when recommendations are on)
    pub spotify_client_id: Option<String>,

    /// Spotify application client secret (required when recommendations are on)
    pub spotify_client_secret: Option<String>,
}

impl AutoplayConfig {
    /// Configuration with Spotify recommendations off (fallback search only)
    pub fn disabled() -> Self {
        Self::default()
    }

    /// Validate credential completeness
    pub fn validate(&self) -> Result<()> {
        if !self.spotify_recommendations {
            return Ok(());
        }

        match self.credentials() {
            Some(_) => Ok(()),
            None => Err(Error::Config(
                "spotify_recommendations is enabled but spotify_client_id \
                 or spotify_client_secret is missing"
                    .to_string(),
            )),
        }
    }

    /// Credential pair, present and non-empty, or `None`
    pub fn credentials(&self) -> Option<(&str, &str)> {
        match (&self.spotify_client_id, &self.spotify_client_secret) {
            (Some(id), Some(secret)) if !id.is_empty() && !secret.is_empty() => {
                Some((id.as_str(), secret.as_str()))
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(
        enabled: bool,
        id: Option<&str>,
        secret: Option<&str>,
    ) -> AutoplayConfig {
        AutoplayConfig {
            spotify_recommendations: enabled,
            spotify_client_id: id.map(String::from),
            spotify_client_secret: secret.map(String::from),
        }
    }

    #[test]
    fn disabled_needs_no_credentials() {
        assert!(config(false, None, None).validate().is_ok());
    }

    #[test]
    fn enabled_with_both_credentials_is_valid() {
        assert!(config(true, Some("id"), Some("secret")).validate().is_ok());
    }

    #[test]
    fn enabled_without_id_fails() {
        let err = config(true, None, Some("secret")).validate().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn enabled_without_secret_fails() {
        let err = config(true, Some("id"), None).validate().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn empty_credentials_count_as_missing() {
        let err = config(true, Some(""), Some("secret")).validate().unwrap_err();
        assert!(matches!(err, Error::Config(_)));
    }

    #[test]
    fn deserializes_from_toml_fragment() {
        let parsed: AutoplayConfig = serde_json::from_str(
            r#"{"spotify_recommendations": true,
                "spotify_client_id": "id",
                "spotify_client_secret": "secret"}"#,
        )
        .unwrap();
        assert!(parsed.validate().is_ok());
        assert_eq!(parsed.credentials(), Some(("id", "secret")));
    }
}
