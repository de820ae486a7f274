use std::fmt;

use serde::{de::DeserializeOwned, Serialize};

/// A record type served as a collection by one REST endpoint.
///
/// Implementing this is all it takes to get a [`ResourceCache`](super::ResourceCache)
/// for a new record type: the endpoint names the collection and `id` names
/// the identifier field the server assigns.
pub trait Resource: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {
    type Id: Clone + PartialEq + fmt::Display + fmt::Debug + Send + Sync + 'static;

    /// Collection path relative to the API base URL, e.g. `/services`
    const ENDPOINT: &'static str;

    /// Singular, human-readable name used in log lines and error messages
    const LABEL: &'static str;

    fn id(&self) -> &Self::Id;

    /// Path of a single record, e.g. `/services/42`
    fn item_path(id: &Self::Id) -> String {
        format!("{}/{}", Self::ENDPOINT, id)
    }
}
