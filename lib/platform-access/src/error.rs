//! Error types for the platform-access crate.
//!
//! - `CredentialError`: minting or validating session credentials
//! - `ProviderError`: calls to the external identity provider
//! - `LoginError`: the outcome of a failed login callback
//! - `AuthorizationError`: rejection of a protected request
//! - `ConfigError`: invalid provider or credential configuration

use crate::role::Role;
use std::fmt;

/// Errors from the session credential codec.
///
/// Validation reports every failure as `Invalid`; the cause is only logged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialError {
    /// The credential failed signature, structure, or expiry checks.
    Invalid,
    /// Serializing or signing a new credential failed.
    MintFailed { reason: String },
    /// The signing key or validity window is unusable.
    InvalidKey { reason: String },
}

impl fmt::Display for CredentialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Invalid => write!(f, "invalid credential"),
            Self::MintFailed { reason } => write!(f, "failed to mint credential: {reason}"),
            Self::InvalidKey { reason } => write!(f, "invalid credential key: {reason}"),
        }
    }
}

impl std::error::Error for CredentialError {}

/// Errors from a single call to the external identity provider.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ProviderError {
    /// The request could not be sent or timed out.
    Transport { reason: String },
    /// The provider answered with something other than 200 OK.
    Status { status: u16, body: String },
    /// The response body was not the expected JSON document.
    MalformedBody { reason: String },
    /// The token endpoint answered without an access token.
    EmptyAccessToken,
    /// The profile endpoint answered without a usable identity.
    MissingIdentity,
}

impl fmt::Display for ProviderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport { reason } => write!(f, "request failed: {reason}"),
            Self::Status { status, body } => {
                write!(f, "provider returned status {status}: {body}")
            }
            Self::MalformedBody { reason } => write!(f, "malformed response: {reason}"),
            Self::EmptyAccessToken => write!(f, "provider returned an empty access token"),
            Self::MissingIdentity => write!(f, "provider returned no user identity"),
        }
    }
}

impl std::error::Error for ProviderError {}

/// Errors from handling a login callback.
///
/// `summary()` is the browser-facing text; `Display` appends the
/// provider-supplied cause for logs.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoginError {
    /// The callback arrived without an authorization code.
    BadRequest,
    /// Exchanging the authorization code for an access token failed.
    ExchangeFailed { reason: String },
    /// Fetching the user's profile failed.
    ProfileFailed { reason: String },
    /// Minting the session credential failed.
    MintFailed { reason: String },
}

impl LoginError {
    /// Returns the failure class without provider-supplied detail.
    ///
    /// This is the text shown to browsers; `Display` adds the reason.
    #[must_use]
    pub fn summary(&self) -> &'static str {
        match self {
            Self::BadRequest => "authorization code was not provided",
            Self::ExchangeFailed { .. } => "failed to obtain access token",
            Self::ProfileFailed { .. } => "failed to fetch user profile",
            Self::MintFailed { .. } => "failed to issue session credential",
        }
    }
}

impl fmt::Display for LoginError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::BadRequest => f.write_str(self.summary()),
            Self::ExchangeFailed { reason }
            | Self::ProfileFailed { reason }
            | Self::MintFailed { reason } => write!(f, "{}: {reason}", self.summary()),
        }
    }
}

impl std::error::Error for LoginError {}

/// Errors from authorization checks on protected requests.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthorizationError {
    /// No usable credential accompanied the request.
    NotAuthenticated,
    /// The credential is valid but its role is insufficient.
    Forbidden { subject: String, required: Role },
}

impl fmt::Display for AuthorizationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotAuthenticated => write!(f, "user is not authenticated"),
            Self::Forbidden { subject, required } => {
                write!(f, "user {subject} lacks the {required} role")
            }
        }
    }
}

impl std::error::Error for AuthorizationError {}

/// Errors from validating configuration at startup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A required value is empty.
    MissingValue { field: &'static str },
    /// A URL could not be parsed.
    InvalidUrl { field: &'static str, reason: String },
    /// A value is outside the range the system can represent.
    OutOfRange { field: &'static str, reason: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingValue { field } => write!(f, "missing required value: {field}"),
            Self::InvalidUrl { field, reason } => write!(f, "invalid URL for {field}: {reason}"),
            Self::OutOfRange { field, reason } => write!(f, "{field} is out of range: {reason}"),
        }
    }
}

impl std::error::Error for ConfigError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn credential_error_invalid_hides_reason() {
        let err = CredentialError::Invalid;
        assert_eq!(err.to_string(), "invalid credential");
    }

    #[test]
    fn provider_error_status_includes_body() {
        let err = ProviderError::Status {
            status: 500,
            body: "upstream exploded".to_string(),
        };
        assert!(err.to_string().contains("500"));
        assert!(err.to_string().contains("upstream exploded"));
    }

    #[test]
    fn login_error_wraps_provider_reason() {
        let err = LoginError::ExchangeFailed {
            reason: ProviderError::EmptyAccessToken.to_string(),
        };
        assert!(err.to_string().contains("access token"));
        assert!(err.to_string().contains("empty"));
    }

    #[test]
    fn login_error_summary_omits_reason() {
        let err = LoginError::ExchangeFailed {
            reason: "provider returned status 500: internal trace".to_string(),
        };
        assert_eq!(err.summary(), "failed to obtain access token");
        assert!(err.to_string().contains("internal trace"));
        assert_eq!(LoginError::BadRequest.to_string(), LoginError::BadRequest.summary());
    }

    #[test]
    fn authorization_error_forbidden_display() {
        let err = AuthorizationError::Forbidden {
            subject: "42".to_string(),
            required: Role::Admin,
        };
        assert!(err.to_string().contains("42"));
        assert!(err.to_string().contains("admin"));
    }

    #[test]
    fn config_error_names_field() {
        let err = ConfigError::InvalidUrl {
            field: "token_url",
            reason: "relative URL without a base".to_string(),
        };
        assert!(err.to_string().contains("token_url"));
    }
}
