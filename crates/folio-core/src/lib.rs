//! Core library for folio.
//!
//! Folio is a back office for two REST backends: a portfolio site
//! (services, plans, projects, testimonials, contact messages) and an
//! electronics store (products, customers, sales, finance ledger).
//!
//! The heart of the crate is [`cache::ResourceCache`], a per-resource cache
//! that shares one in-flight request among concurrent readers and applies
//! confirmed mutations to the cached collection. A [`store::Store`] owns one
//! cache per resource plus the login session.

pub mod api;
pub mod auth;
pub mod cache;
pub mod config;
pub mod models;
pub mod store;
pub mod utils;

pub use api::{ApiClient, ApiError};
pub use cache::{CacheError, ErrorKind, ListQuery, Page, Resource, ResourceCache, Searchable};
pub use config::Config;
pub use store::Store;
