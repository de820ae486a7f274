//! REST API client module.
//!
//! This module provides the `ApiClient` for talking to the portfolio and
//! storefront backends. Requests carry an optional bearer token obtained
//! from the `/auth/login` endpoint.

pub mod client;
pub mod error;

pub use client::{ApiClient, Envelope};
pub use error::ApiError;
