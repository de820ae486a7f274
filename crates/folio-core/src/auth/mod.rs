//! Authentication module for sessions and remembered credentials.
//!
//! This module provides:
//! - `Session`: bearer-token session persisted to disk with a fixed lifetime
//! - `CredentialStore`: optional OS-level password storage via keyring
//!
//! Tokens are issued by `/auth/login` and treated as expired after 24 hours.

pub mod credentials;
pub mod session;

pub use credentials::CredentialStore;
pub use session::{Session, SessionData};
