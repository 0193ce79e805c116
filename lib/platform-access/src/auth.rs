//! Per-request authentication from a bearer credential.
//!
//! The authenticator is stateless across requests: everything it needs is in
//! the credential itself and the process-wide codec.

use serde::Serialize;

use crate::credential::{CredentialCodec, SessionClaims};
use crate::error::AuthorizationError;
use crate::role::Role;

/// The only accepted `Authorization` scheme.
pub const BEARER_SCHEME: &str = "Bearer";

/// Extracts the credential from an `Authorization` header value.
///
/// The value must split on single spaces into exactly two parts, the first
/// being `Bearer`. Anything else (other schemes, extra spaces, a bare token)
/// yields `None`.
#[must_use]
pub fn parse_bearer(header: &str) -> Option<&str> {
    let mut parts = header.split(' ');
    let scheme = parts.next()?;
    let credential = parts.next()?;
    if parts.next().is_some() || scheme != BEARER_SCHEME {
        return None;
    }
    Some(credential)
}

/// Identity of the caller behind a validated credential.
///
/// Handlers receive this as request-scoped context.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AuthenticatedUser {
    #[serde(rename = "id")]
    subject: String,
    email: Option<String>,
    role: Role,
}

impl AuthenticatedUser {
    /// Creates an authenticated user context.
    #[must_use]
    pub fn new(subject: String, email: Option<String>, role: Role) -> Self {
        Self {
            subject,
            email,
            role,
        }
    }

    /// Returns the subject identifier.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Returns the email address, if known.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Returns the role.
    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Returns true if the user has admin access.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.role.is_admin()
    }

    /// Requires the user to hold exactly `role`.
    ///
    /// # Errors
    ///
    /// Returns `AuthorizationError::Forbidden` on a mismatch.
    pub fn require_role(&self, role: Role) -> Result<(), AuthorizationError> {
        if self.role != role {
            return Err(AuthorizationError::Forbidden {
                subject: self.subject.clone(),
                required: role,
            });
        }
        Ok(())
    }

    /// Requires the user to be an admin.
    ///
    /// # Errors
    ///
    /// Returns `AuthorizationError::Forbidden` if the user is not an admin.
    pub fn require_admin(&self) -> Result<(), AuthorizationError> {
        if !self.is_admin() {
            return Err(AuthorizationError::Forbidden {
                subject: self.subject.clone(),
                required: Role::Admin,
            });
        }
        Ok(())
    }
}

impl From<SessionClaims> for AuthenticatedUser {
    fn from(claims: SessionClaims) -> Self {
        Self::new(
            claims.subject().to_string(),
            claims.email().map(str::to_string),
            claims.role(),
        )
    }
}

/// Validates bearer credentials on protected requests.
#[derive(Debug, Clone)]
pub struct Authenticator {
    codec: CredentialCodec,
}

impl Authenticator {
    /// Creates an authenticator sharing the login flow's codec configuration.
    #[must_use]
    pub fn new(codec: CredentialCodec) -> Self {
        Self { codec }
    }

    /// Authenticates a request from its `Authorization` header, if any.
    ///
    /// # Errors
    ///
    /// Returns `AuthorizationError::NotAuthenticated` when the header is
    /// missing, malformed, or carries an invalid credential. The three cases
    /// are indistinguishable to the caller.
    pub fn authenticate(&self, header: Option<&str>) -> Result<AuthenticatedUser, AuthorizationError> {
        let Some(header) = header else {
            tracing::debug!("request without authorization header");
            return Err(AuthorizationError::NotAuthenticated);
        };
        let Some(credential) = parse_bearer(header) else {
            tracing::debug!("malformed authorization header");
            return Err(AuthorizationError::NotAuthenticated);
        };

        let claims = self
            .codec
            .validate(credential)
            .map_err(|_| AuthorizationError::NotAuthenticated)?;

        Ok(AuthenticatedUser::from(claims))
    }
}
