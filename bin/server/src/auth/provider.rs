//! reqwest-backed client for the external identity provider.
//!
//! Two calls per login, each with its own timeout and no retries: the
//! code-for-token exchange and the profile fetch.

use async_trait::async_trait;
use gatehouse_platform_access::{
    ExternalProfile, IdentityProvider, ProviderConfig, ProviderError, ProviderTokenResponse,
    RedirectUrl,
};
use oauth2::TokenUrl;
use reqwest::{StatusCode, Url, header::ACCEPT, redirect::Policy};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, instrument, warn};

use crate::error::StartupError;

/// Non-success bodies are kept for diagnostics up to this many characters.
const MAX_ERROR_BODY_CHARS: usize = 512;

/// Identity provider reached over HTTP.
#[derive(Debug, Clone)]
pub struct HttpIdentityProvider {
    client: reqwest::Client,
    client_id: String,
    client_secret: String,
    token_url: TokenUrl,
    userinfo_url: Url,
    exchange_timeout: Duration,
    profile_timeout: Duration,
}

impl HttpIdentityProvider {
    /// Creates a provider client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if an endpoint URL is invalid or the HTTP client
    /// cannot be built.
    pub fn new(config: &ProviderConfig) -> gatehouse_core::Result<Self, StartupError> {
        let token_url = TokenUrl::new(config.token_url().to_string()).map_err(|e| {
            StartupError::InvalidUrl {
                field: "provider.token_url",
                reason: e.to_string(),
            }
        })?;
        let userinfo_url =
            Url::parse(config.userinfo_url()).map_err(|e| StartupError::InvalidUrl {
                field: "provider.userinfo_url",
                reason: e.to_string(),
            })?;

        let client = reqwest::Client::builder()
            .redirect(Policy::none())
            .build()
            .map_err(|e| StartupError::HttpClient {
                details: e.to_string(),
            })?;

        Ok(Self {
            client,
            client_id: config.client_id().to_string(),
            client_secret: config.client_secret().to_string(),
            token_url,
            userinfo_url,
            exchange_timeout: config.exchange_timeout(),
            profile_timeout: config.profile_timeout(),
        })
    }
}

#[async_trait]
impl IdentityProvider for HttpIdentityProvider {
    #[instrument(skip_all, fields(code_len = code.len()))]
    async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &RedirectUrl,
    ) -> Result<ProviderTokenResponse, ProviderError> {
        let response = self
            .client
            .post(self.token_url.as_str())
            .timeout(self.exchange_timeout)
            .header(ACCEPT, "application/json")
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", redirect_uri.as_str()),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.as_str()),
            ])
            .send()
            .await
            .map_err(transport_error)?;

        let token: ProviderTokenResponse = read_json(response).await?;
        if token.access_token.is_empty() {
            warn!("token endpoint answered without an access token");
            return Err(ProviderError::EmptyAccessToken);
        }

        debug!(
            token_len = token.access_token.len(),
            has_refresh_token = token.refresh_token.is_some(),
            "exchanged authorization code"
        );
        Ok(token)
    }

    #[instrument(skip_all)]
    async fn fetch_profile(&self, access_token: &str) -> Result<ExternalProfile, ProviderError> {
        let response = self
            .client
            .get(self.userinfo_url.clone())
            .timeout(self.profile_timeout)
            .bearer_auth(access_token)
            .send()
            .await
            .map_err(transport_error)?;

        let profile: ExternalProfile = read_json(response).await?;
        if profile.id.is_zero() {
            warn!("profile endpoint answered without a user identity");
            return Err(ProviderError::MissingIdentity);
        }

        debug!(external_id = %profile.id, "fetched profile");
        Ok(profile)
    }
}

fn transport_error(e: reqwest::Error) -> ProviderError {
    warn!(error = %e, timeout = e.is_timeout(), "provider request failed");
    ProviderError::Transport {
        reason: e.to_string(),
    }
}

/// Reads a 200 response as JSON; anything else keeps status and body.
async fn read_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, ProviderError> {
    let status = response.status();
    let body = response.text().await.map_err(transport_error)?;

    if status != StatusCode::OK {
        warn!(status = status.as_u16(), "provider returned non-success status");
        return Err(ProviderError::Status {
            status: status.as_u16(),
            body: body.chars().take(MAX_ERROR_BODY_CHARS).collect(),
        });
    }

    serde_json::from_str(&body).map_err(|e| ProviderError::MalformedBody {
        reason: e.to_string(),
    })
}
