//! Self-contained session credentials.
//!
//! A credential is an HS256-signed JWT carrying the subject, email, role and
//! validity window. There is no server-side session store and no revocation:
//! a credential is good until its `exp`, and rotating the signing secret
//! invalidates every credential minted with the old one.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::CredentialError;
use crate::profile::ExternalProfile;
use crate::role::Role;

/// Claims carried by a session credential.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionClaims {
    /// Internal subject; the stringified external identity.
    #[serde(rename = "user_id")]
    subject: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    email: Option<String>,
    role: Role,
    /// Issued-at, unix seconds.
    iat: i64,
    /// Expiry, unix seconds.
    exp: i64,
}

impl SessionClaims {
    /// Creates claims valid from `issued_at` for `validity`.
    ///
    /// # Errors
    ///
    /// Returns `CredentialError::MintFailed` if the expiry is not a
    /// representable time.
    pub fn new(
        subject: String,
        email: Option<String>,
        role: Role,
        issued_at: DateTime<Utc>,
        validity: Duration,
    ) -> Result<Self, CredentialError> {
        let expires_at =
            issued_at
                .checked_add_signed(validity)
                .ok_or_else(|| CredentialError::MintFailed {
                    reason: format!("expiry overflows: {issued_at} + {validity}"),
                })?;

        Ok(Self {
            subject,
            email,
            role,
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        })
    }

    /// Maps an external profile onto internal claims.
    ///
    /// # Errors
    ///
    /// Returns `CredentialError::MintFailed` if the expiry overflows.
    pub fn for_profile(
        profile: &ExternalProfile,
        role: Role,
        issued_at: DateTime<Utc>,
        validity: Duration,
    ) -> Result<Self, CredentialError> {
        Self::new(
            profile.id.to_string(),
            profile.email().map(str::to_string),
            role,
            issued_at,
            validity,
        )
    }

    /// Returns the subject identifier.
    #[must_use]
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Returns the email address, if one was known at mint time.
    #[must_use]
    pub fn email(&self) -> Option<&str> {
        self.email.as_deref()
    }

    /// Returns the role.
    #[must_use]
    pub fn role(&self) -> Role {
        self.role
    }

    /// Returns the issued-at time as unix seconds.
    #[must_use]
    pub fn issued_at(&self) -> i64 {
        self.iat
    }

    /// Returns the expiry time as unix seconds.
    #[must_use]
    pub fn expires_at(&self) -> i64 {
        self.exp
    }

    /// Returns true unless the expiry is strictly after `now`.
    #[must_use]
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.exp <= now.timestamp()
    }
}

/// Mints and validates session credentials with one process-wide secret.
#[derive(Clone)]
pub struct CredentialCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    header: Header,
    validation: Validation,
    validity: Duration,
}

impl CredentialCodec {
    /// Creates a codec for the given HMAC secret and validity window.
    ///
    /// # Errors
    ///
    /// Returns `CredentialError::InvalidKey` if the secret is empty or the
    /// validity window is not positive or would push expiry past the
    /// representable range.
    pub fn new(secret: &str, validity: Duration) -> Result<Self, CredentialError> {
        if secret.is_empty() {
            return Err(CredentialError::InvalidKey {
                reason: "signing secret is empty".to_string(),
            });
        }
        if validity <= Duration::zero() {
            return Err(CredentialError::InvalidKey {
                reason: format!("validity window must be positive, got {validity}"),
            });
        }
        if Utc::now().checked_add_signed(validity).is_none() {
            return Err(CredentialError::InvalidKey {
                reason: format!("validity window is too large: {validity}"),
            });
        }

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            header: Header::new(Algorithm::HS256),
            validation,
            validity,
        })
    }

    /// Returns the validity window applied at mint time.
    #[must_use]
    pub fn validity(&self) -> Duration {
        self.validity
    }

    /// Mints an admin credential for an authenticated external profile.
    ///
    /// # Errors
    ///
    /// Returns `CredentialError::MintFailed` if signing fails.
    pub fn mint(&self, profile: &ExternalProfile) -> Result<String, CredentialError> {
        self.mint_at(profile, Utc::now())
    }

    /// Mints an admin credential as if issued at `issued_at`.
    ///
    /// # Errors
    ///
    /// Returns `CredentialError::MintFailed` if signing fails.
    pub fn mint_at(
        &self,
        profile: &ExternalProfile,
        issued_at: DateTime<Utc>,
    ) -> Result<String, CredentialError> {
        let claims = SessionClaims::for_profile(profile, Role::Admin, issued_at, self.validity)?;
        self.sign(&claims)
    }

    /// Signs an arbitrary claims set.
    ///
    /// # Errors
    ///
    /// Returns `CredentialError::MintFailed` if signing fails.
    pub fn sign(&self, claims: &SessionClaims) -> Result<String, CredentialError> {
        encode(&self.header, claims, &self.encoding_key).map_err(|e| {
            CredentialError::MintFailed {
                reason: e.to_string(),
            }
        })
    }

    /// Verifies a credential and returns its claims.
    ///
    /// # Errors
    ///
    /// Returns `CredentialError::Invalid` for any bad signature, malformed
    /// structure, missing subject, or expiry that is not strictly in the future.
    pub fn validate(&self, token: &str) -> Result<SessionClaims, CredentialError> {
        let data = decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map_err(|e| {
                tracing::debug!(error = %e, "credential rejected");
                CredentialError::Invalid
            })?;
        let claims = data.claims;

        if claims.is_expired_at(Utc::now()) {
            tracing::debug!(subject = %claims.subject, "credential expired");
            return Err(CredentialError::Invalid);
        }
        if claims.subject.is_empty() {
            tracing::debug!("credential has no subject");
            return Err(CredentialError::Invalid);
        }

        Ok(claims)
    }
}

impl fmt::Debug for CredentialCodec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialCodec")
            .field("algorithm", &self.header.alg)
            .field("validity", &self.validity)
            .finish_non_exhaustive()
    }
}
