//! The login flow: authorization URL construction and callback handling.
//!
//! A callback moves through the stages below in order and stops at the first
//! failure. No credential is minted unless both provider calls succeeded.
//!
//! ```text
//! Start -> CodeValidated -> TokenExchanged -> ProfileFetched -> CredentialMinted
//! ```

use oauth2::{AuthUrl, RedirectUrl};
use std::fmt;
use tracing::{debug, info, instrument, warn};

use crate::config::ProviderConfig;
use crate::credential::CredentialCodec;
use crate::error::{ConfigError, LoginError};
use crate::provider::IdentityProvider;

/// Progress of a single callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoginStage {
    /// Callback received; nothing checked yet.
    Start,
    /// An authorization code was present.
    CodeValidated,
    /// The provider issued an access token.
    TokenExchanged,
    /// The provider returned a profile with an identity.
    ProfileFetched,
    /// A session credential was signed.
    CredentialMinted,
}

impl fmt::Display for LoginStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Start => "start",
            Self::CodeValidated => "code_validated",
            Self::TokenExchanged => "token_exchanged",
            Self::ProfileFetched => "profile_fetched",
            Self::CredentialMinted => "credential_minted",
        };
        f.write_str(name)
    }
}

impl LoginError {
    /// Returns the last stage reached before this error stopped the flow.
    #[must_use]
    pub fn stage(&self) -> LoginStage {
        match self {
            Self::BadRequest => LoginStage::Start,
            Self::ExchangeFailed { .. } => LoginStage::CodeValidated,
            Self::ProfileFailed { .. } => LoginStage::TokenExchanged,
            Self::MintFailed { .. } => LoginStage::ProfileFetched,
        }
    }
}

/// Drives the authorization-code handshake with one identity provider.
pub struct LoginFlow<P> {
    provider: P,
    codec: CredentialCodec,
    authorize_url: AuthUrl,
    client_id: String,
    scopes: Vec<String>,
    redirect_uri: RedirectUrl,
}

impl<P: IdentityProvider> LoginFlow<P> {
    /// Creates a login flow.
    ///
    /// `redirect_uri` is the fixed callback URI registered with the provider.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the client ID is missing or the authorization
    /// endpoint is not a valid URL.
    pub fn new(
        provider: P,
        codec: CredentialCodec,
        config: &ProviderConfig,
        redirect_uri: RedirectUrl,
    ) -> Result<Self, ConfigError> {
        config.check()?;
        let authorize_url = AuthUrl::new(config.authorize_url().to_string()).map_err(|e| {
            ConfigError::InvalidUrl {
                field: "provider.authorize_url",
                reason: e.to_string(),
            }
        })?;

        Ok(Self {
            provider,
            codec,
            authorize_url,
            client_id: config.client_id().to_string(),
            scopes: config.scopes().into_iter().map(str::to_string).collect(),
            redirect_uri,
        })
    }

    /// Returns the fixed callback URI.
    #[must_use]
    pub fn redirect_uri(&self) -> &RedirectUrl {
        &self.redirect_uri
    }

    /// Builds the provider URL the browser is sent to for authorization.
    ///
    /// `state` is passed through untouched (beyond query encoding) and is
    /// omitted when absent or empty.
    #[must_use]
    pub fn authorization_url(&self, redirect_uri: &RedirectUrl, state: Option<&str>) -> String {
        let mut url = self.authorize_url.url().clone();
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("client_id", &self.client_id)
                .append_pair("response_type", "code")
                .append_pair("redirect_uri", redirect_uri.as_str())
                .append_pair("scope", &self.scopes.join(" "));
            if let Some(state) = state.filter(|s| !s.is_empty()) {
                query.append_pair("state", state);
            }
        }

        debug!(has_state = state.is_some_and(|s| !s.is_empty()), "built authorization URL");
        url.to_string()
    }

    /// Completes a login: code → access token → profile → session credential.
    ///
    /// # Errors
    ///
    /// - `LoginError::BadRequest` if `code` is empty (no provider call is made)
    /// - `LoginError::ExchangeFailed` if the token exchange fails or yields no token
    /// - `LoginError::ProfileFailed` if the profile fetch fails or yields no identity
    /// - `LoginError::MintFailed` if the credential cannot be issued
    #[instrument(skip_all, fields(code_len = code.len()))]
    pub async fn handle_callback(
        &self,
        code: &str,
        redirect_uri: &RedirectUrl,
    ) -> Result<String, LoginError> {
        if code.is_empty() {
            warn!(stage = %LoginStage::Start, "callback without authorization code");
            return Err(LoginError::BadRequest);
        }
        debug!(stage = %LoginStage::CodeValidated);

        let token = self
            .provider
            .exchange_code(code, redirect_uri)
            .await
            .map_err(|e| LoginError::ExchangeFailed {
                reason: e.to_string(),
            })?;
        if token.access_token.is_empty() {
            return Err(LoginError::ExchangeFailed {
                reason: "access token was empty".to_string(),
            });
        }
        debug!(
            stage = %LoginStage::TokenExchanged,
            token_type = %token.token_type,
            expires_in = token.expires_in
        );

        let profile = self
            .provider
            .fetch_profile(&token.access_token)
            .await
            .map_err(|e| LoginError::ProfileFailed {
                reason: e.to_string(),
            })?;
        if profile.id.is_zero() {
            return Err(LoginError::ProfileFailed {
                reason: "profile had no user identity".to_string(),
            });
        }
        debug!(stage = %LoginStage::ProfileFetched, external_id = %profile.id);

        let credential = self
            .codec
            .mint(&profile)
            .map_err(|e| LoginError::MintFailed {
                reason: e.to_string(),
            })?;
        if credential.is_empty() {
            return Err(LoginError::MintFailed {
                reason: "minted credential was empty".to_string(),
            });
        }

        info!(
            stage = %LoginStage::CredentialMinted,
            subject = %profile.id,
            username = %profile.username,
            "login completed"
        );
        Ok(credential)
    }
}

impl<P> fmt::Debug for LoginFlow<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoginFlow")
            .field("authorize_url", &self.authorize_url.as_str())
            .field("client_id", &self.client_id)
            .field("scopes", &self.scopes)
            .field("redirect_uri", &self.redirect_uri.as_str())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProviderError;
    use crate::profile::{ExternalProfile, ProviderTokenResponse};
    use crate::role::Role;
    use async_trait::async_trait;
    use chrono::Duration;
    use gatehouse_core::ExternalId;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct FakeProvider {
        token: Result<ProviderTokenResponse, ProviderError>,
        profile: Result<ExternalProfile, ProviderError>,
        exchange_calls: AtomicUsize,
        profile_calls: AtomicUsize,
    }

    impl FakeProvider {
        fn new(
            token: Result<ProviderTokenResponse, ProviderError>,
            profile: Result<ExternalProfile, ProviderError>,
        ) -> Self {
            Self {
                token,
                profile,
                exchange_calls: AtomicUsize::new(0),
                profile_calls: AtomicUsize::new(0),
            }
        }

        fn happy() -> Self {
            Self::new(Ok(token("at_good")), Ok(profile(1001)))
        }
    }

    #[async_trait]
    impl IdentityProvider for FakeProvider {
        async fn exchange_code(
            &self,
            _code: &str,
            _redirect_uri: &RedirectUrl,
        ) -> Result<ProviderTokenResponse, ProviderError> {
            self.exchange_calls.fetch_add(1, Ordering::SeqCst);
            self.token.clone()
        }

        async fn fetch_profile(
            &self,
            _access_token: &str,
        ) -> Result<ExternalProfile, ProviderError> {
            self.profile_calls.fetch_add(1, Ordering::SeqCst);
            self.profile.clone()
        }
    }

    fn token(access_token: &str) -> ProviderTokenResponse {
        serde_json::from_value(serde_json::json!({
            "access_token": access_token,
            "token_type": "Bearer",
            "expires_in": 3600
        }))
        .expect("token")
    }

    fn profile(id: u64) -> ExternalProfile {
        ExternalProfile {
            id: ExternalId::new(id),
            username: "alice".to_string(),
            nickname: "Alice".to_string(),
            email: "alice@example.com".to_string(),
            avatar: String::new(),
        }
    }

    fn codec() -> CredentialCodec {
        CredentialCodec::new("login-test-secret", Duration::days(30)).expect("codec")
    }

    fn redirect() -> RedirectUrl {
        RedirectUrl::new("https://app.example.com/api/auth/callback".to_string())
            .expect("redirect")
    }

    fn flow(provider: FakeProvider) -> LoginFlow<FakeProvider> {
        let config = ProviderConfig::builder("client_abc".to_string(), "secret".to_string())
            .authorize_url("https://idp.example.com/oauth2/authorize".to_string())
            .build();
        LoginFlow::new(provider, codec(), &config, redirect()).expect("flow")
    }

    fn query_of(url: &str) -> HashMap<String, String> {
        oauth2::url::Url::parse(url)
            .expect("url")
            .query_pairs()
            .into_owned()
            .collect()
    }

    #[test]
    fn authorization_url_carries_client_and_state() {
        let flow = flow(FakeProvider::happy());
        let url = flow.authorization_url(flow.redirect_uri(), Some("xyz"));

        assert!(url.starts_with("https://idp.example.com/oauth2/authorize?"));
        assert!(url.contains("state=xyz"));
        assert!(url.contains("scope=openid+profile+email"));

        let query = query_of(&url);
        assert_eq!(query["client_id"], "client_abc");
        assert_eq!(query["response_type"], "code");
        assert_eq!(
            query["redirect_uri"],
            "https://app.example.com/api/auth/callback"
        );
        assert_eq!(query["state"], "xyz");
    }

    #[test]
    fn authorization_url_omits_missing_state() {
        let flow = flow(FakeProvider::happy());

        let without = flow.authorization_url(flow.redirect_uri(), None);
        assert!(!query_of(&without).contains_key("state"));

        let empty = flow.authorization_url(flow.redirect_uri(), Some(""));
        assert!(!query_of(&empty).contains_key("state"));
    }

    #[test]
    fn new_rejects_bad_authorize_url() {
        let config = ProviderConfig::builder("client".to_string(), "secret".to_string())
            .authorize_url("not a url".to_string())
            .build();
        let result = LoginFlow::new(FakeProvider::happy(), codec(), &config, redirect());
        assert!(matches!(
            result,
            Err(ConfigError::InvalidUrl {
                field: "provider.authorize_url",
                ..
            })
        ));
    }

    #[tokio::test]
    async fn successful_callback_mints_admin_credential() {
        let flow = flow(FakeProvider::happy());

        let credential = flow
            .handle_callback("code-123", flow.redirect_uri())
            .await
            .expect("login");

        let claims = codec().validate(&credential).expect("valid credential");
        assert_eq!(claims.subject(), "1001");
        assert_eq!(claims.role(), Role::Admin);
        assert_eq!(flow.provider.exchange_calls.load(Ordering::SeqCst), 1);
        assert_eq!(flow.provider.profile_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn empty_code_is_rejected_before_any_provider_call() {
        let flow = flow(FakeProvider::happy());

        let err = flow
            .handle_callback("", flow.redirect_uri())
            .await
            .unwrap_err();

        assert_eq!(err, LoginError::BadRequest);
        assert_eq!(err.stage(), LoginStage::Start);
        assert_eq!(flow.provider.exchange_calls.load(Ordering::SeqCst), 0);
        assert_eq!(flow.provider.profile_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn exchange_failure_skips_profile_fetch() {
        let flow = flow(FakeProvider::new(
            Err(ProviderError::Status {
                status: 500,
                body: "boom".to_string(),
            }),
            Ok(profile(1001)),
        ));

        let err = flow
            .handle_callback("code-123", flow.redirect_uri())
            .await
            .unwrap_err();

        assert!(matches!(err, LoginError::ExchangeFailed { .. }));
        assert!(err.to_string().contains("500"));
        assert_eq!(flow.provider.profile_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn empty_access_token_is_an_exchange_failure() {
        let flow = flow(FakeProvider::new(Ok(token("")), Ok(profile(1001))));

        let err = flow
            .handle_callback("code-123", flow.redirect_uri())
            .await
            .unwrap_err();

        assert!(matches!(err, LoginError::ExchangeFailed { .. }));
        assert_eq!(flow.provider.profile_calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn zero_identity_is_a_profile_failure() {
        let flow = flow(FakeProvider::new(Ok(token("at_good")), Ok(profile(0))));

        let err = flow
            .handle_callback("code-123", flow.redirect_uri())
            .await
            .unwrap_err();

        assert!(matches!(err, LoginError::ProfileFailed { .. }));
        assert_eq!(err.stage(), LoginStage::TokenExchanged);
    }

    #[tokio::test]
    async fn profile_transport_error_is_a_profile_failure() {
        let flow = flow(FakeProvider::new(
            Ok(token("at_good")),
            Err(ProviderError::Transport {
                reason: "timed out".to_string(),
            }),
        ));

        let err = flow
            .handle_callback("code-123", flow.redirect_uri())
            .await
            .unwrap_err();

        assert!(matches!(err, LoginError::ProfileFailed { .. }));
        assert!(err.to_string().contains("timed out"));
    }
}
