//! Core domain types and utilities for gatehouse.
//!
//! This crate provides the foundational types and error handling shared by
//! the platform-access library and the server binary.

pub mod error;
pub mod id;

pub use error::Result;
pub use id::{ExternalId, ParseIdError};
