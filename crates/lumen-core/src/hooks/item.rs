//! Single-record hook.

use std::sync::{Arc, Mutex};

use serde::de::DeserializeOwned;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, instrument};

use crate::error::Error;
use crate::service::{DEFAULT_ID_COLUMN, RecordService};
use crate::store::RemoteStore;
use crate::types::{RecordId, TableName};

use super::state::{Deps, QueryState};
use super::tracker::FetchTracker;
use super::{lock, replace_key};

/// Keeps one record, looked up by id, in observable state.
///
/// Same lifecycle as [`QueryHook`](super::QueryHook). Without an id there
/// is nothing to look up: the hook settles at once with no data and no
/// request is made.
pub struct ItemHook<S, T> {
    inner: Arc<ItemInner<S, T>>,
}

struct ItemInner<S, T> {
    service: RecordService<S>,
    key: Mutex<ItemKey>,
    tracker: FetchTracker<Option<T>>,
}

#[derive(Debug, Clone, PartialEq)]
struct ItemKey {
    table: TableName,
    id: Option<RecordId>,
    id_column: String,
    deps: Deps,
}

impl<S, T> ItemInner<S, T>
where
    S: RemoteStore + 'static,
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    #[instrument(skip(self))]
    async fn run(&self) {
        let (key, id, seq) = {
            let key = lock(&self.key);
            let Some(id) = key.id.clone() else {
                self.tracker.settle_idle(None);
                return;
            };
            let Some(seq) = self.tracker.begin() else {
                debug!("Hook unmounted; skipping fetch");
                return;
            };
            (key.clone(), id, seq)
        };

        debug!(seq, table = %key.table, %id, "Fetching item");
        let outcome = self
            .service
            .fetch_by::<T>(&key.table, &key.id_column, &id)
            .await;
        self.tracker.settle(seq, outcome);
    }
}

impl<S, T> ItemHook<S, T>
where
    S: RemoteStore + 'static,
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    /// Create a hook looking records up by the `id` column.
    ///
    /// Nothing is fetched until [`mount`](Self::mount).
    pub fn new(
        service: RecordService<S>,
        table: TableName,
        id: Option<RecordId>,
        deps: Deps,
    ) -> Self {
        Self {
            inner: Arc::new(ItemInner {
                service,
                key: Mutex::new(ItemKey {
                    table,
                    id,
                    id_column: DEFAULT_ID_COLUMN.to_string(),
                    deps,
                }),
                tracker: FetchTracker::new(QueryState::default()),
            }),
        }
    }

    /// Look records up by `column` instead of `id`.
    pub fn with_id_column(self, column: impl Into<String>) -> Self {
        lock(&self.inner.key).id_column = column.into();
        self
    }

    /// Run the initial fetch and wait for it to settle.
    pub async fn mount(&self) {
        self.inner.run().await;
    }

    /// Fetch again with the current id.
    pub async fn refetch(&self) {
        self.inner.run().await;
    }

    /// Fetch again on the runtime without waiting for it.
    pub fn spawn_refetch(&self) -> JoinHandle<()> {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move { inner.run().await })
    }

    /// Look up another record. Re-fetches if the id changed.
    pub async fn set_id(&self, id: Option<RecordId>) -> bool {
        self.rerun_if(|key| key.id = id).await
    }

    pub async fn set_id_column(&self, column: impl Into<String>) -> bool {
        let column = column.into();
        self.rerun_if(|key| key.id_column = column).await
    }

    pub async fn set_table(&self, table: TableName) -> bool {
        self.rerun_if(|key| key.table = table).await
    }

    pub async fn set_deps(&self, deps: Deps) -> bool {
        self.rerun_if(|key| key.deps = deps).await
    }

    async fn rerun_if(&self, change: impl FnOnce(&mut ItemKey)) -> bool {
        if !replace_key(&self.inner.key, change) {
            return false;
        }
        self.inner.run().await;
        true
    }

    pub fn state(&self) -> QueryState<Option<T>> {
        self.inner.tracker.sender().borrow().clone()
    }

    pub fn data(&self) -> Option<T> {
        self.inner.tracker.sender().borrow().data.clone()
    }

    pub fn loading(&self) -> bool {
        self.inner.tracker.sender().borrow().loading
    }

    pub fn error(&self) -> Option<Error> {
        self.inner.tracker.sender().borrow().error.clone()
    }

    pub fn subscribe(&self) -> watch::Receiver<QueryState<Option<T>>> {
        self.inner.tracker.sender().subscribe()
    }

    /// Tear the hook down. In-flight results are dropped from here on.
    pub fn unmount(&self) {
        self.inner.tracker.close();
    }
}

impl<S, T> Drop for ItemHook<S, T> {
    fn drop(&mut self) {
        self.inner.tracker.close();
    }
}
