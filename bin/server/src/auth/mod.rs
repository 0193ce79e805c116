//! Authentication module for the gatehouse server.
//!
//! This module provides:
//! - The HTTP client for the external identity provider
//! - Login, callback, and current-user routes
//! - Authentication extractors for Axum routes
//!
//! # Authorization Model
//!
//! Anyone who completes the provider handshake is issued a self-contained
//! `admin` credential valid for the configured window. Protected routes
//! validate that credential on every request; nothing is stored server-side.

pub mod middleware;
pub mod provider;
pub mod routes;

use gatehouse_platform_access::{Authenticator, CredentialCodec, LoginFlow, RedirectUrl};
use reqwest::Url;

use crate::config::ServerConfig;
use crate::error::StartupError;

pub use middleware::{AuthRejection, RequireAdmin, RequireAuth};
pub use provider::HttpIdentityProvider;
pub use routes::{callback, deals, login, logout, me};

/// Shared application state.
pub struct AppState {
    /// Login flow against the configured identity provider.
    pub login: LoginFlow<HttpIdentityProvider>,
    /// Validates bearer credentials on protected routes.
    pub authenticator: Authenticator,
    /// Frontend page that receives login results.
    pub frontend_callback: Url,
}

impl AppState {
    /// Creates a new application state.
    pub fn new(
        login: LoginFlow<HttpIdentityProvider>,
        authenticator: Authenticator,
        frontend_callback: Url,
    ) -> Self {
        Self {
            login,
            authenticator,
            frontend_callback,
        }
    }

    /// Builds the application state from loaded configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configured value is unusable. These are
    /// startup failures; the server should not run without a valid state.
    pub fn from_config(config: &ServerConfig) -> gatehouse_core::Result<Self, StartupError> {
        let validity = config
            .credential
            .validity()
            .map_err(|e| StartupError::Config {
                details: e.to_string(),
            })?;
        let codec = CredentialCodec::new(config.credential.signing_secret(), validity).map_err(
            |e| StartupError::Credential {
                details: e.to_string(),
            },
        )?;

        let redirect_uri =
            RedirectUrl::new(config.redirect_uri()).map_err(|e| StartupError::InvalidUrl {
                field: "public_url",
                reason: e.to_string(),
            })?;
        let frontend_callback = Url::parse(&config.frontend_callback_url()).map_err(|e| {
            StartupError::InvalidUrl {
                field: "system_url",
                reason: e.to_string(),
            }
        })?;

        let provider = HttpIdentityProvider::new(&config.provider)?;
        let login = LoginFlow::new(provider, codec.clone(), &config.provider, redirect_uri)
            .map_err(|e| StartupError::Config {
                details: e.to_string(),
            })?;

        tracing::info!(
            redirect_uri = %login.redirect_uri().as_str(),
            frontend_callback = %frontend_callback,
            "authentication configured"
        );

        Ok(Self::new(login, Authenticator::new(codec), frontend_callback))
    }

    /// Origin of the frontend, for CORS.
    #[must_use]
    pub fn frontend_origin(&self) -> String {
        self.frontend_callback.origin().ascii_serialization()
    }
}
