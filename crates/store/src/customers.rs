use std::sync::Arc;

use thiserror::Error;
use tokio::sync::watch;
use tracing::warn;

use trackline_core::{Customer, CustomerId, CustomerPatch, NewCustomer, UserId};
use trackline_remote::{CustomerService, ServiceError};

#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("search term must not be empty")]
    EmptyQuery,
    #[error(transparent)]
    Service(#[from] ServiceError),
}

/// The store's published state: the cached customer collection ordered by
/// `created_at` descending, plus whether the initial load is still
/// outstanding.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreSnapshot {
    pub items: Vec<Customer>,
    pub is_loading: bool,
}

/// Local cache of the customer collection, kept consistent with the remote
/// service after each call.
///
/// The snapshot is the single source of truth for consumers: every successful
/// mutation rewrites it before the operation's future resolves, and watchers
/// obtained through [`subscribe`](Self::subscribe) are notified on each
/// rewrite. Failures never touch the snapshot; they are logged here and
/// returned as structured errors for the caller to surface.
///
/// Overlapping mutations on the same row are not serialized: the cache
/// reflects whichever remote response resolves last.
pub struct CustomerStore<S> {
    service: Arc<S>,
    state: watch::Sender<StoreSnapshot>,
}

impl<S: CustomerService> CustomerStore<S> {
    pub fn new(service: Arc<S>) -> Self {
        let (state, _) = watch::channel(StoreSnapshot { items: Vec::new(), is_loading: true });
        Self { service, state }
    }

    /// The current snapshot, cloned; consumers never hold a live reference
    /// into the cache.
    pub fn snapshot(&self) -> StoreSnapshot {
        self.state.borrow().clone()
    }

    /// A watcher notified after every snapshot rewrite.
    pub fn subscribe(&self) -> watch::Receiver<StoreSnapshot> {
        self.state.subscribe()
    }

    /// Fetches the full collection, newest first, and replaces the cache
    /// wholesale. On failure the previous items survive; `is_loading` clears
    /// on both paths and no retry is scheduled.
    pub async fn load(&self) -> Result<(), StoreError> {
        match self.service.list().await {
            Ok(items) => {
                self.state.send_modify(|snapshot| {
                    snapshot.items = items;
                    snapshot.is_loading = false;
                });
                Ok(())
            }
            Err(error) => {
                warn!(%error, "failed to load customers");
                self.state.send_modify(|snapshot| snapshot.is_loading = false);
                Err(error.into())
            }
        }
    }

    /// Inserts a row stamped with `created_by` and prepends the returned row.
    /// The new row is newest by construction, so prepending preserves order.
    pub async fn create(
        &self,
        new: NewCustomer,
        created_by: UserId,
    ) -> Result<Customer, StoreError> {
        match self.service.insert(new, created_by).await {
            Ok(row) => {
                self.state.send_modify(|snapshot| snapshot.items.insert(0, row.clone()));
                Ok(row)
            }
            Err(error) => {
                warn!(%error, "failed to create customer");
                Err(error.into())
            }
        }
    }

    /// Updates the remote row and replaces the cached entry in place, keeping
    /// its position. A row the remote side does not know surfaces as
    /// [`ServiceError::NotFound`]; the cache is untouched on any failure.
    pub async fn update(
        &self,
        id: CustomerId,
        patch: CustomerPatch,
    ) -> Result<Customer, StoreError> {
        match self.service.update(id, patch).await {
            Ok(row) => {
                self.state.send_modify(|snapshot| {
                    if let Some(entry) =
                        snapshot.items.iter_mut().find(|entry| entry.id == row.id)
                    {
                        *entry = row.clone();
                    }
                });
                Ok(row)
            }
            Err(error) => {
                warn!(%id, %error, "failed to update customer");
                Err(error.into())
            }
        }
    }

    /// Deletes the remote row and drops the cached entry.
    pub async fn remove(&self, id: CustomerId) -> Result<(), StoreError> {
        match self.service.delete(id).await {
            Ok(()) => {
                self.state.send_modify(|snapshot| snapshot.items.retain(|entry| entry.id != id));
                Ok(())
            }
            Err(error) => {
                warn!(%id, %error, "failed to delete customer");
                Err(error.into())
            }
        }
    }

    /// Read-only keyword search; results are independent of the cache and the
    /// cache is never mutated. Callers are expected to reject empty input
    /// before invoking this; a blank term is refused here without a remote
    /// call.
    pub async fn search(&self, term: &str) -> Result<Vec<Customer>, StoreError> {
        if term.trim().is_empty() {
            return Err(StoreError::EmptyQuery);
        }

        self.service.search(term).await.map_err(|error| {
            warn!(%error, "failed to search customers");
            error.into()
        })
    }
}
