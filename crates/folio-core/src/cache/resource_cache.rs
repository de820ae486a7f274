//! Generic request-deduplicating cache for one resource collection.

use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared};
use serde::Serialize;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::api::ApiClient;

use super::{CacheError, CachedData, ErrorKind, Operation, Resource};

/// Result every waiter on a fetch receives.
pub type FetchResult<R> = Result<Arc<Vec<R>>, CacheError>;

type SharedFetch<R> = Shared<BoxFuture<'static, FetchResult<R>>>;

enum Entry<R> {
    Absent,
    /// A stale fetch was invalidated while running: it still answers everyone
    /// who joins it, but its result is dropped instead of cached.
    Pending { fetch: SharedFetch<R>, stale: bool },
    Present(CachedData<Arc<Vec<R>>>),
}

struct Inner<R> {
    client: ApiClient,
    entry: Mutex<Entry<R>>,
}

/// Cache for the collection behind `R::ENDPOINT`.
///
/// At most one GET for the collection is in flight at a time; callers that
/// ask while it runs share its result. Successful mutations edit the cached
/// collection in place before returning, trusting the server's response
/// without re-fetching.
///
/// Clones share the same underlying cache.
pub struct ResourceCache<R: Resource> {
    inner: Arc<Inner<R>>,
}

impl<R: Resource> Clone for ResourceCache<R> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<R: Resource> ResourceCache<R> {
    pub fn new(client: ApiClient) -> Self {
        Self {
            inner: Arc::new(Inner {
                client,
                entry: Mutex::new(Entry::Absent),
            }),
        }
    }

    /// Return the collection, going to the network only if nothing is
    /// cached and no fetch is already running.
    ///
    /// The GET runs on a spawned task, so it completes (and populates the
    /// cache) even if every caller stops waiting. Must be called from within
    /// a tokio runtime.
    pub async fn fetch(&self) -> FetchResult<R> {
        let fetch = {
            let mut entry = self.inner.entry.lock().await;
            match &*entry {
                Entry::Present(cached) => {
                    debug!(resource = R::LABEL, "Cache hit");
                    return Ok(Arc::clone(&cached.data));
                }
                Entry::Pending { fetch, .. } => {
                    debug!(resource = R::LABEL, "Joining in-flight fetch");
                    fetch.clone()
                }
                Entry::Absent => {
                    let fetch = Self::spawn_fetch(Arc::clone(&self.inner));
                    *entry = Entry::Pending {
                        fetch: fetch.clone(),
                        stale: false,
                    };
                    fetch
                }
            }
        };
        fetch.await
    }

    fn spawn_fetch(inner: Arc<Inner<R>>) -> SharedFetch<R> {
        info!(resource = R::LABEL, endpoint = R::ENDPOINT, "Fetching collection");

        let task = tokio::spawn(async move {
            let result = inner
                .client
                .get::<Vec<R>>(R::ENDPOINT)
                .await
                .map(Arc::new)
                .map_err(|e| CacheError::from_api(&e, Operation::Fetch.fallback_message(R::LABEL)));

            // Only this task replaces a Pending entry, so it is still ours
            let mut entry = inner.entry.lock().await;
            if let Entry::Pending { stale, .. } = *entry {
                *entry = match result {
                    Ok(ref items) if !stale => Entry::Present(CachedData::new(Arc::clone(items))),
                    _ => Entry::Absent,
                };
                if stale {
                    debug!(resource = R::LABEL, "Fetch finished after invalidation, result not cached");
                }
            }

            match result {
                Ok(ref items) => debug!(resource = R::LABEL, count = items.len(), "Fetch complete"),
                Err(ref e) => warn!(resource = R::LABEL, kind = %e.kind, error = %e, "Fetch failed"),
            }
            result
        });

        async move {
            task.await.unwrap_or_else(|e| {
                Err(CacheError::new(
                    ErrorKind::Internal,
                    format!("Fetch task for {} failed: {}", R::LABEL, e),
                ))
            })
        }
        .boxed()
        .shared()
    }

    /// Create a record. The server's version of it is appended to the
    /// cached collection and returned.
    pub async fn create<B>(&self, record: &B) -> Result<R, CacheError>
    where
        B: Serialize + ?Sized + Sync,
    {
        let created: R = self
            .inner
            .client
            .post(R::ENDPOINT, record)
            .await
            .map_err(|e| self.mutation_error(&e, Operation::Create))?;

        info!(resource = R::LABEL, id = %created.id(), "Created");
        self.modify(|items| items.push(created.clone())).await;
        Ok(created)
    }

    /// Patch the record with `id`. The cached entry with that id is replaced
    /// by the server's response; other entries and their order are untouched.
    pub async fn update<B>(&self, id: &R::Id, patch: &B) -> Result<R, CacheError>
    where
        B: Serialize + ?Sized + Sync,
    {
        let updated: R = self
            .inner
            .client
            .patch(&R::item_path(id), patch)
            .await
            .map_err(|e| self.mutation_error(&e, Operation::Update))?;

        info!(resource = R::LABEL, id = %id, "Updated");
        self.modify(|items| {
            if let Some(slot) = items.iter_mut().find(|item| item.id() == id) {
                *slot = updated.clone();
            }
        })
        .await;
        Ok(updated)
    }

    /// Delete the record with `id` and drop it from the cached collection.
    pub async fn delete(&self, id: &R::Id) -> Result<(), CacheError> {
        self.inner
            .client
            .delete(&R::item_path(id))
            .await
            .map_err(|e| self.mutation_error(&e, Operation::Delete))?;

        info!(resource = R::LABEL, id = %id, "Deleted");
        self.modify(|items| items.retain(|item| item.id() != id)).await;
        Ok(())
    }

    fn mutation_error(&self, err: &crate::api::ApiError, op: Operation) -> CacheError {
        let err = CacheError::from_api(err, op.fallback_message(R::LABEL));
        warn!(resource = R::LABEL, operation = ?op, kind = %err.kind, error = %err, "Mutation failed");
        err
    }

    /// Apply `f` to the present collection. Absent and pending entries are
    /// left alone; a running fetch installs whatever the server returns.
    async fn modify(&self, f: impl FnOnce(&mut Vec<R>)) -> bool {
        let mut entry = self.inner.entry.lock().await;
        match &mut *entry {
            Entry::Present(cached) => {
                // Readers holding the previous Arc keep their snapshot
                f(Arc::make_mut(&mut cached.data));
                true
            }
            Entry::Pending { .. } | Entry::Absent => {
                debug!(resource = R::LABEL, "No cached collection to update");
                false
            }
        }
    }

    /// The cached collection, without touching the network.
    pub async fn cached(&self) -> Option<Arc<Vec<R>>> {
        match &*self.inner.entry.lock().await {
            Entry::Present(cached) => Some(Arc::clone(&cached.data)),
            _ => None,
        }
    }

    /// The cached collection along with when it was fetched.
    pub async fn snapshot(&self) -> Option<CachedData<Arc<Vec<R>>>> {
        match &*self.inner.entry.lock().await {
            Entry::Present(cached) => Some(cached.clone()),
            _ => None,
        }
    }

    /// Look up one record in the cached collection.
    pub async fn find(&self, id: &R::Id) -> Option<R> {
        self.cached()
            .await
            .and_then(|items| items.iter().find(|item| item.id() == id).cloned())
    }

    pub async fn is_pending(&self) -> bool {
        matches!(*self.inner.entry.lock().await, Entry::Pending { .. })
    }

    /// Forget the cached collection so the next `fetch()` hits the network.
    ///
    /// A fetch already in flight is not restarted: callers keep joining it
    /// until it finishes, but its result is not cached. The following
    /// `fetch()` then issues a new request.
    pub async fn invalidate(&self) {
        let mut entry = self.inner.entry.lock().await;
        if let Entry::Pending { ref mut stale, .. } = *entry {
            debug!(resource = R::LABEL, "Invalidated while fetching");
            *stale = true;
        } else if let Entry::Present(_) = *entry {
            debug!(resource = R::LABEL, "Invalidated");
            *entry = Entry::Absent;
        }
    }

    /// Re-fetch from the server, replacing whatever is cached.
    ///
    /// When a fetch is already running its result is as fresh as a new one
    /// would be, so `refresh()` joins it instead of issuing a second GET.
    pub async fn refresh(&self) -> FetchResult<R> {
        {
            let mut entry = self.inner.entry.lock().await;
            if let Entry::Present(_) = *entry {
                debug!(resource = R::LABEL, "Refreshing");
                *entry = Entry::Absent;
            }
        }
        self.fetch().await
    }
}
