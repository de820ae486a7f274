//! In-memory resource caches.
//!
//! This module provides the generic `ResourceCache`, which holds the last
//! fetched collection for one REST resource, collapses concurrent fetches
//! into a single request, and applies successful create/update/delete calls
//! to the cached collection without a round trip.
//!
//! List views page and filter cached collections with `ListQuery`.

pub mod cached;
pub mod error;
pub mod query;
pub mod resource;
pub mod resource_cache;

pub use cached::CachedData;
pub use error::{CacheError, ErrorKind, Operation};
pub use query::{ListQuery, Page, Searchable, DEFAULT_PER_PAGE};
pub use resource::Resource;
pub use resource_cache::{FetchResult, ResourceCache};
