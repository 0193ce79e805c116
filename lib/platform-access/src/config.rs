//! Identity provider and session credential configuration.
//!
//! Both types are deserialized once at startup by the server and handed to
//! the components that need them; nothing here is read from globals.

use crate::error::ConfigError;
use chrono::Duration;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Configuration for the external OAuth2 identity provider.
///
/// Fields with defaults can be omitted when loading from environment variables.
#[derive(Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// The OAuth2 client ID registered with the provider.
    client_id: String,
    /// The OAuth2 client secret.
    client_secret: String,
    /// Where the browser is sent to authorize.
    #[serde(default = "default_authorize_url")]
    authorize_url: String,
    /// Code-for-token exchange endpoint.
    #[serde(default = "default_token_url")]
    token_url: String,
    /// Profile endpoint, called with the access token.
    #[serde(default = "default_userinfo_url")]
    userinfo_url: String,
    /// OAuth2 scopes to request as a comma-separated string.
    /// Default: "openid,profile,email"
    #[serde(default = "default_scopes")]
    scopes: String,
    /// Timeout for the token exchange, in seconds.
    #[serde(default = "default_exchange_timeout_seconds")]
    exchange_timeout_seconds: u64,
    /// Timeout for the profile fetch, in seconds.
    #[serde(default = "default_profile_timeout_seconds")]
    profile_timeout_seconds: u64,
}

fn default_authorize_url() -> String {
    "https://connect.czl.net/oauth2/authorize".to_string()
}

fn default_token_url() -> String {
    "https://connect.czl.net/api/oauth2/token".to_string()
}

fn default_userinfo_url() -> String {
    "https://connect.czl.net/api/oauth2/userinfo".to_string()
}

fn default_scopes() -> String {
    "openid,profile,email".to_string()
}

fn default_exchange_timeout_seconds() -> u64 {
    20
}

fn default_profile_timeout_seconds() -> u64 {
    10
}

impl ProviderConfig {
    /// Creates a new provider configuration with defaults for optional fields.
    #[must_use]
    pub fn new(client_id: String, client_secret: String) -> Self {
        Self {
            client_id,
            client_secret,
            authorize_url: default_authorize_url(),
            token_url: default_token_url(),
            userinfo_url: default_userinfo_url(),
            scopes: default_scopes(),
            exchange_timeout_seconds: default_exchange_timeout_seconds(),
            profile_timeout_seconds: default_profile_timeout_seconds(),
        }
    }

    /// Creates a configuration builder for more customization.
    #[must_use]
    pub fn builder(client_id: String, client_secret: String) -> ProviderConfigBuilder {
        ProviderConfigBuilder::new(client_id, client_secret)
    }

    /// Returns the OAuth2 client ID.
    #[must_use]
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Returns the OAuth2 client secret.
    #[must_use]
    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }

    /// Returns the authorization endpoint URL.
    #[must_use]
    pub fn authorize_url(&self) -> &str {
        &self.authorize_url
    }

    /// Returns the token endpoint URL.
    #[must_use]
    pub fn token_url(&self) -> &str {
        &self.token_url
    }

    /// Returns the profile endpoint URL.
    #[must_use]
    pub fn userinfo_url(&self) -> &str {
        &self.userinfo_url
    }

    /// Returns the OAuth2 scopes to request, parsed from comma-separated string.
    #[must_use]
    pub fn scopes(&self) -> Vec<&str> {
        self.scopes
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .collect()
    }

    /// Returns the token exchange timeout.
    #[must_use]
    pub fn exchange_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.exchange_timeout_seconds)
    }

    /// Returns the profile fetch timeout.
    #[must_use]
    pub fn profile_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.profile_timeout_seconds)
    }

    /// Checks that the client credentials are present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingValue` naming the first empty field.
    pub fn check(&self) -> Result<(), ConfigError> {
        if self.client_id.trim().is_empty() {
            return Err(ConfigError::MissingValue {
                field: "provider.client_id",
            });
        }
        if self.client_secret.is_empty() {
            return Err(ConfigError::MissingValue {
                field: "provider.client_secret",
            });
        }
        Ok(())
    }
}

impl fmt::Debug for ProviderConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderConfig")
            .field("client_id", &self.client_id)
            .field("client_secret", &"<redacted>")
            .field("authorize_url", &self.authorize_url)
            .field("token_url", &self.token_url)
            .field("userinfo_url", &self.userinfo_url)
            .field("scopes", &self.scopes)
            .field("exchange_timeout_seconds", &self.exchange_timeout_seconds)
            .field("profile_timeout_seconds", &self.profile_timeout_seconds)
            .finish()
    }
}

/// Builder for `ProviderConfig`.
#[derive(Debug)]
pub struct ProviderConfigBuilder {
    config: ProviderConfig,
}

impl ProviderConfigBuilder {
    /// Creates a new builder with required fields.
    #[must_use]
    pub fn new(client_id: String, client_secret: String) -> Self {
        Self {
            config: ProviderConfig::new(client_id, client_secret),
        }
    }

    /// Sets all three provider endpoints relative to one base URL.
    ///
    /// Uses the same paths as the default provider: `/oauth2/authorize`,
    /// `/api/oauth2/token`, and `/api/oauth2/userinfo`.
    #[must_use]
    pub fn base_url(mut self, base_url: &str) -> Self {
        let base = base_url.trim_end_matches('/');
        self.config.authorize_url = format!("{base}/oauth2/authorize");
        self.config.token_url = format!("{base}/api/oauth2/token");
        self.config.userinfo_url = format!("{base}/api/oauth2/userinfo");
        self
    }

    /// Sets the authorization endpoint URL.
    #[must_use]
    pub fn authorize_url(mut self, url: String) -> Self {
        self.config.authorize_url = url;
        self
    }

    /// Sets the token endpoint URL.
    #[must_use]
    pub fn token_url(mut self, url: String) -> Self {
        self.config.token_url = url;
        self
    }

    /// Sets the profile endpoint URL.
    #[must_use]
    pub fn userinfo_url(mut self, url: String) -> Self {
        self.config.userinfo_url = url;
        self
    }

    /// Sets the token exchange timeout in seconds.
    #[must_use]
    pub fn exchange_timeout_seconds(mut self, seconds: u64) -> Self {
        self.config.exchange_timeout_seconds = seconds;
        self
    }

    /// Sets the profile fetch timeout in seconds.
    #[must_use]
    pub fn profile_timeout_seconds(mut self, seconds: u64) -> Self {
        self.config.profile_timeout_seconds = seconds;
        self
    }

    /// Builds the `ProviderConfig`.
    #[must_use]
    pub fn build(self) -> ProviderConfig {
        self.config
    }
}

/// Configuration for signing session credentials.
#[derive(Clone, Serialize, Deserialize)]
pub struct CredentialConfig {
    /// HMAC secret shared by minting and validation.
    signing_secret: String,
    /// How long a minted credential stays valid, in days.
    #[serde(default = "default_validity_days")]
    validity_days: i64,
}

fn default_validity_days() -> i64 {
    30
}

impl CredentialConfig {
    /// Creates a credential configuration with the default validity window.
    #[must_use]
    pub fn new(signing_secret: String) -> Self {
        Self {
            signing_secret,
            validity_days: default_validity_days(),
        }
    }

    /// Overrides the validity window.
    #[must_use]
    pub fn with_validity_days(mut self, days: i64) -> Self {
        self.validity_days = days;
        self
    }

    /// Returns the signing secret.
    #[must_use]
    pub fn signing_secret(&self) -> &str {
        &self.signing_secret
    }

    /// Returns the validity window.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::OutOfRange` if the day count does not fit in a
    /// `chrono::Duration`.
    pub fn validity(&self) -> Result<Duration, ConfigError> {
        Duration::try_days(self.validity_days).ok_or_else(|| ConfigError::OutOfRange {
            field: "credential.validity_days",
            reason: format!("{} days", self.validity_days),
        })
    }
}

impl fmt::Debug for CredentialConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialConfig")
            .field("signing_secret", &"<redacted>")
            .field("validity_days", &self.validity_days)
            .finish()
    }
}
