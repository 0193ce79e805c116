//! Identity federation and session credentials for gatehouse.
//!
//! This crate provides:
//! - Provider and credential configuration (`ProviderConfig`, `CredentialConfig`)
//! - The session credential codec (`CredentialCodec`, `SessionClaims`)
//! - The login flow against an external identity provider (`LoginFlow`)
//! - Bearer authentication of protected requests (`Authenticator`)
//!
//! # Access Control Model
//!
//! Everyone who completes the provider handshake receives an `admin`
//! credential. Credentials are self-contained and expire after a fixed
//! window; there is no revocation.
//!
//! # Example
//!
//! ```
//! use gatehouse_core::ExternalId;
//! use gatehouse_platform_access::{Authenticator, CredentialCodec, ExternalProfile, Role};
//! use chrono::Duration;
//!
//! let codec = CredentialCodec::new("change-me", Duration::days(30)).unwrap();
//! let profile = ExternalProfile {
//!     id: ExternalId::new(1001),
//!     username: "alice".to_string(),
//!     nickname: "Alice".to_string(),
//!     email: "alice@example.com".to_string(),
//!     avatar: String::new(),
//! };
//!
//! let credential = codec.mint(&profile).unwrap();
//! let header = format!("Bearer {credential}");
//!
//! let user = Authenticator::new(codec).authenticate(Some(&header)).unwrap();
//! assert_eq!(user.subject(), "1001");
//! assert_eq!(user.role(), Role::Admin);
//! ```

pub mod auth;
pub mod config;
pub mod credential;
pub mod error;
pub mod login;
pub mod profile;
pub mod provider;
pub mod role;

// Re-export main types at crate root
pub use auth::{AuthenticatedUser, Authenticator, parse_bearer};
pub use config::{CredentialConfig, ProviderConfig, ProviderConfigBuilder};
pub use credential::{CredentialCodec, SessionClaims};
pub use error::{AuthorizationError, ConfigError, CredentialError, LoginError, ProviderError};
pub use login::{LoginFlow, LoginStage};
pub use profile::{ExternalProfile, ProviderTokenResponse};
pub use provider::IdentityProvider;
pub use role::Role;

// The provider-facing URL types are part of this crate's API.
pub use oauth2::RedirectUrl;
