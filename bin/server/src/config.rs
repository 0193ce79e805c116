//! Centralized server configuration.
//!
//! This module provides strongly-typed configuration for the server,
//! loaded via the `config` crate from environment variables.
//!
//! See [`ProviderConfig`](gatehouse_platform_access::ProviderConfig) and
//! [`CredentialConfig`](gatehouse_platform_access::CredentialConfig) for the
//! identity provider and session credential sections.

use gatehouse_platform_access::{CredentialConfig, ProviderConfig};
use serde::Deserialize;
use std::collections::HashMap;

/// Server configuration composed from library configs.
#[derive(Debug, Deserialize)]
pub struct ServerConfig {
    /// Address the HTTP listener binds to.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    /// Base URL of the frontend that receives login results.
    #[serde(default = "default_system_url")]
    pub system_url: String,

    /// Externally visible base URL of this service.
    /// Falls back to `system_url` when unset.
    #[serde(default)]
    pub public_url: Option<String>,

    /// Session credential configuration.
    pub credential: CredentialConfig,

    /// Identity provider configuration.
    pub provider: ProviderConfig,
}

fn default_bind_address() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_system_url() -> String {
    "http://localhost:3000".to_string()
}

impl ServerConfig {
    /// Loads configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration is missing or invalid.
    pub fn from_env() -> Result<Self, config::ConfigError> {
        Self::load(config::Environment::default())
    }

    /// Loads configuration from an explicit variable map instead of the
    /// process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if required configuration is missing or invalid.
    pub fn from_vars(vars: HashMap<String, String>) -> Result<Self, config::ConfigError> {
        Self::load(config::Environment::default().source(Some(vars)))
    }

    fn load(environment: config::Environment) -> Result<Self, config::ConfigError> {
        config::Config::builder()
            .add_source(environment.separator("__").try_parsing(true))
            .build()?
            .try_deserialize()
    }

    /// Returns the base URL used to build the provider callback URI.
    #[must_use]
    pub fn public_base_url(&self) -> &str {
        self.public_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .unwrap_or(&self.system_url)
    }

    /// Returns the fixed callback URI registered with the provider.
    #[must_use]
    pub fn redirect_uri(&self) -> String {
        format!(
            "{}/api/auth/callback",
            self.public_base_url().trim_end_matches('/')
        )
    }

    /// Returns the frontend page that receives login results.
    #[must_use]
    pub fn frontend_callback_url(&self) -> String {
        format!("{}/auth/callback", self.system_url.trim_end_matches('/'))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn required_vars() -> HashMap<String, String> {
        HashMap::from([
            ("CREDENTIAL__SIGNING_SECRET".to_string(), "s3cret".to_string()),
            ("PROVIDER__CLIENT_ID".to_string(), "client".to_string()),
            ("PROVIDER__CLIENT_SECRET".to_string(), "shh".to_string()),
        ])
    }

    #[test]
    fn defaults_apply_when_only_required_values_are_set() {
        let config = ServerConfig::from_vars(required_vars()).expect("config");

        assert_eq!(config.bind_address, "0.0.0.0:8080");
        assert_eq!(config.system_url, "http://localhost:3000");
        assert_eq!(config.public_base_url(), "http://localhost:3000");
        assert_eq!(config.credential.signing_secret(), "s3cret");
        assert_eq!(config.credential.validity(), Ok(chrono::Duration::days(30)));
        assert_eq!(config.provider.client_id(), "client");
        assert_eq!(
            config.provider.token_url(),
            "https://connect.czl.net/api/oauth2/token"
        );
        assert_eq!(config.provider.scopes(), vec!["openid", "profile", "email"]);
    }

    #[test]
    fn overrides_are_read_from_nested_keys() {
        let mut vars = required_vars();
        vars.insert("SYSTEM_URL".to_string(), "https://app.example.com/".to_string());
        vars.insert("PUBLIC_URL".to_string(), "https://api.example.com".to_string());
        vars.insert("CREDENTIAL__VALIDITY_DAYS".to_string(), "7".to_string());
        vars.insert(
            "PROVIDER__PROFILE_TIMEOUT_SECONDS".to_string(),
            "3".to_string(),
        );

        let config = ServerConfig::from_vars(vars).expect("config");

        assert_eq!(config.credential.validity(), Ok(chrono::Duration::days(7)));
        assert_eq!(
            config.provider.profile_timeout(),
            std::time::Duration::from_secs(3)
        );
        assert_eq!(
            config.redirect_uri(),
            "https://api.example.com/api/auth/callback"
        );
        assert_eq!(
            config.frontend_callback_url(),
            "https://app.example.com/auth/callback"
        );
    }

    #[test]
    fn missing_signing_secret_fails_to_load() {
        let mut vars = required_vars();
        vars.remove("CREDENTIAL__SIGNING_SECRET");

        assert!(ServerConfig::from_vars(vars).is_err());
    }
}
