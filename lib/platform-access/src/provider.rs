//! Abstraction over the external identity provider.
//!
//! The login flow only depends on this trait; the server supplies an HTTP
//! implementation and tests supply in-memory fakes.

use async_trait::async_trait;
use oauth2::RedirectUrl;

use crate::error::ProviderError;
use crate::profile::{ExternalProfile, ProviderTokenResponse};

/// The two round trips made to the identity provider during a login.
///
/// Implementations must not retry; a failure is reported immediately so the
/// user can start the login again.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Exchanges an authorization code for an access token.
    ///
    /// `redirect_uri` must be the same URI the authorization request used.
    async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &RedirectUrl,
    ) -> Result<ProviderTokenResponse, ProviderError>;

    /// Fetches the profile of the user the access token was issued to.
    async fn fetch_profile(&self, access_token: &str) -> Result<ExternalProfile, ProviderError>;
}
