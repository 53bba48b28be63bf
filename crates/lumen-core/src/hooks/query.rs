//! List query hook.

use std::sync::{Arc, Mutex};

use serde::de::DeserializeOwned;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, instrument};

use crate::error::Error;
use crate::query::QuerySpec;
use crate::service::RecordService;
use crate::store::RemoteStore;
use crate::types::TableName;

use super::state::{Deps, QueryState};
use super::tracker::FetchTracker;
use super::{lock, replace_key};

/// Keeps the rows of one table, filtered by one query, in observable state.
///
/// The fetch re-runs whenever the table, the query or the extra triggers
/// change, and on demand through [`refetch`](Self::refetch). Overlapping
/// fetches all run to completion, but only the most recently started one
/// may write its result.
///
/// # Example
///
/// ```
/// use lumen_core::{Deps, MemoryStore, QueryHook, RecordService, Row, TableName};
///
/// # async fn example() -> Result<(), lumen_core::Error> {
/// let store = MemoryStore::new();
/// let issues = TableName::new("issues")?;
/// store.create_table(&issues);
///
/// let hook: QueryHook<_, Row> =
///     QueryHook::new(RecordService::new(store), issues, None, Deps::new());
/// hook.mount().await;
///
/// let state = hook.state();
/// assert!(!state.loading);
/// assert!(state.data.is_empty());
/// # Ok(())
/// # }
/// ```
pub struct QueryHook<S, T> {
    inner: Arc<QueryInner<S, T>>,
}

struct QueryInner<S, T> {
    service: RecordService<S>,
    key: Mutex<QueryKey>,
    tracker: FetchTracker<Vec<T>>,
}

#[derive(Debug, Clone, PartialEq)]
struct QueryKey {
    table: TableName,
    spec: Option<QuerySpec>,
    deps: Deps,
}

impl<S, T> QueryInner<S, T>
where
    S: RemoteStore + 'static,
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    #[instrument(skip(self))]
    async fn run(&self) {
        let (key, seq) = {
            let key = lock(&self.key);
            let Some(seq) = self.tracker.begin() else {
                debug!("Hook unmounted; skipping fetch");
                return;
            };
            (key.clone(), seq)
        };

        debug!(seq, table = %key.table, "Fetching");
        let outcome = self
            .service
            .fetch_many::<T>(&key.table, key.spec.as_ref())
            .await;
        self.tracker.settle(seq, outcome);
    }
}

impl<S, T> QueryHook<S, T>
where
    S: RemoteStore + 'static,
    T: DeserializeOwned + Clone + Send + Sync + 'static,
{
    /// Create a hook. Nothing is fetched until [`mount`](Self::mount).
    ///
    /// Starts out loading with no rows.
    pub fn new(
        service: RecordService<S>,
        table: TableName,
        spec: Option<QuerySpec>,
        deps: Deps,
    ) -> Self {
        Self {
            inner: Arc::new(QueryInner {
                service,
                key: Mutex::new(QueryKey { table, spec, deps }),
                tracker: FetchTracker::new(QueryState::default()),
            }),
        }
    }

    /// Run the initial fetch and wait for it to settle.
    pub async fn mount(&self) {
        self.inner.run().await;
    }

    /// Fetch again with the current table and query.
    pub async fn refetch(&self) {
        self.inner.run().await;
    }

    /// Fetch again on the runtime without waiting for it.
    pub fn spawn_refetch(&self) -> JoinHandle<()> {
        let inner = Arc::clone(&self.inner);
        tokio::spawn(async move { inner.run().await })
    }

    /// Point the hook at another table. Re-fetches if it changed.
    pub async fn set_table(&self, table: TableName) -> bool {
        self.rerun_if(|key| key.table = table).await
    }

    /// Replace the query. Re-fetches if it differs from the current one.
    pub async fn set_query(&self, spec: Option<QuerySpec>) -> bool {
        self.rerun_if(|key| key.spec = spec).await
    }

    /// Replace the extra triggers. Re-fetches if any of them changed.
    pub async fn set_deps(&self, deps: Deps) -> bool {
        self.rerun_if(|key| key.deps = deps).await
    }

    async fn rerun_if(&self, change: impl FnOnce(&mut QueryKey)) -> bool {
        if !replace_key(&self.inner.key, change) {
            return false;
        }
        self.inner.run().await;
        true
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> QueryState<Vec<T>> {
        self.inner.tracker.sender().borrow().clone()
    }

    pub fn data(&self) -> Vec<T> {
        self.inner.tracker.sender().borrow().data.clone()
    }

    pub fn loading(&self) -> bool {
        self.inner.tracker.sender().borrow().loading
    }

    pub fn error(&self) -> Option<Error> {
        self.inner.tracker.sender().borrow().error.clone()
    }

    /// Follow state changes.
    pub fn subscribe(&self) -> watch::Receiver<QueryState<Vec<T>>> {
        self.inner.tracker.sender().subscribe()
    }

    /// Tear the hook down. In-flight results are dropped from here on.
    pub fn unmount(&self) {
        self.inner.tracker.close();
    }
}

impl<S, T> Drop for QueryHook<S, T> {
    fn drop(&mut self) {
        self.inner.tracker.close();
    }
}
