//! Transient data returned by the external identity provider.
//!
//! Neither type outlives the callback that fetched it.

use gatehouse_core::ExternalId;
use serde::{Deserialize, Deserializer};
use std::fmt;

/// Reads an explicit JSON `null` the same as a missing field.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de> + Default,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Body of a successful token endpoint response.
#[derive(Clone, Deserialize)]
pub struct ProviderTokenResponse {
    /// Bearer token for the profile endpoint. Empty when the provider omitted it.
    #[serde(default, deserialize_with = "null_as_default")]
    pub access_token: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub token_type: String,
    /// Lifetime of the access token in seconds.
    #[serde(default, deserialize_with = "null_as_default")]
    pub expires_in: u64,
    #[serde(default)]
    pub refresh_token: Option<String>,
}

impl fmt::Debug for ProviderTokenResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderTokenResponse")
            .field("access_token", &format_args!("<{} bytes>", self.access_token.len()))
            .field("token_type", &self.token_type)
            .field("expires_in", &self.expires_in)
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

/// A user's profile as reported by the identity provider.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct ExternalProfile {
    /// Provider-assigned identity; zero means "nobody".
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: ExternalId,
    #[serde(default, deserialize_with = "null_as_default")]
    pub username: String,
    /// Display name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub nickname: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub email: String,
    /// Avatar image URL.
    #[serde(default, deserialize_with = "null_as_default")]
    pub avatar: String,
}

impl ExternalProfile {
    /// Returns the email address, treating an empty string as absent.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        Some(self.email.as_str()).filter(|e| !e.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn token_response_parses_full_body() {
        let json = r#"{
            "access_token": "at_123",
            "token_type": "Bearer",
            "expires_in": 3600,
            "refresh_token": "rt_456"
        }"#;
        let token: ProviderTokenResponse = serde_json::from_str(json).expect("deserialize");
        assert_eq!(token.access_token, "at_123");
        assert_eq!(token.token_type, "Bearer");
        assert_eq!(token.expires_in, 3600);
        assert_eq!(token.refresh_token.as_deref(), Some("rt_456"));
    }

    #[test]
    fn token_response_missing_access_token_is_empty() {
        let token: ProviderTokenResponse =
            serde_json::from_str(r#"{"token_type": "Bearer"}"#).expect("deserialize");
        assert!(token.access_token.is_empty());
    }

    #[test]
    fn token_response_debug_redacts_secrets() {
        let token: ProviderTokenResponse = serde_json::from_str(
            r#"{"access_token": "super-secret-token", "refresh_token": "also-secret"}"#,
        )
        .expect("deserialize");
        let debug = format!("{token:?}");
        assert!(!debug.contains("super-secret-token"));
        assert!(!debug.contains("also-secret"));
    }

    #[test]
    fn profile_parses_provider_body() {
        let json = r#"{
            "id": 1001,
            "username": "alice",
            "nickname": "Alice",
            "email": "alice@example.com",
            "avatar": "https://cdn.example.com/alice.png"
        }"#;
        let profile: ExternalProfile = serde_json::from_str(json).expect("deserialize");
        assert_eq!(profile.id, ExternalId::new(1001));
        assert_eq!(profile.username, "alice");
        assert_eq!(profile.email(), Some("alice@example.com"));
    }

    #[test]
    fn null_fields_read_as_empty() {
        let profile: ExternalProfile = serde_json::from_str(
            r#"{"id": 5, "username": "a", "nickname": null, "email": null, "avatar": null}"#,
        )
        .expect("deserialize");
        assert_eq!(profile.id, ExternalId::new(5));
        assert_eq!(profile.username, "a");
        assert!(profile.nickname.is_empty());
        assert_eq!(profile.email(), None);
        assert!(profile.avatar.is_empty());

        let token: ProviderTokenResponse = serde_json::from_str(
            r#"{"access_token": "x", "token_type": null, "expires_in": null, "refresh_token": null}"#,
        )
        .expect("deserialize");
        assert_eq!(token.access_token, "x");
        assert!(token.token_type.is_empty());
        assert_eq!(token.expires_in, 0);
        assert_eq!(token.refresh_token, None);
    }

    #[test]
    fn profile_without_id_is_zero() {
        let profile: ExternalProfile =
            serde_json::from_str(r#"{"username": "ghost"}"#).expect("deserialize");
        assert!(profile.id.is_zero());
        assert_eq!(profile.email(), None);
    }
}
