//! Domain error types for server startup.
//!
//! Request handling never fails the process; only building the application
//! state and running the listener can. Those failures are wrapped in a
//! `rootcause::Report` so `main` can print the full context.

use std::fmt;

/// Fatal errors raised while starting or running the server.
#[derive(Debug)]
pub enum StartupError {
    /// Configuration could not be loaded or failed validation.
    Config { details: String },
    /// A configured URL could not be parsed.
    InvalidUrl { field: &'static str, reason: String },
    /// The credential codec rejected its key material.
    Credential { details: String },
    /// The outbound HTTP client could not be built.
    HttpClient { details: String },
    /// The listener could not bind to its address.
    Bind { address: String, reason: String },
    /// The server stopped with an I/O error.
    Serve { details: String },
}

impl fmt::Display for StartupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Config { details } => write!(f, "invalid configuration: {}", details),
            Self::InvalidUrl { field, reason } => {
                write!(f, "invalid URL for '{}': {}", field, reason)
            }
            Self::Credential { details } => {
                write!(f, "credential codec setup failed: {}", details)
            }
            Self::HttpClient { details } => {
                write!(f, "failed to build HTTP client: {}", details)
            }
            Self::Bind { address, reason } => {
                write!(f, "failed to bind to '{}': {}", address, reason)
            }
            Self::Serve { details } => write!(f, "server error: {}", details),
        }
    }
}

impl std::error::Error for StartupError {}
