//! Mutation hook.

use std::future::Future;
use std::marker::PhantomData;

use serde::de::DeserializeOwned;
use tokio::sync::watch;
use tracing::debug;

use crate::Result;
use crate::error::Error;
use crate::record::Payload;
use crate::service::{DEFAULT_ID_COLUMN, RecordService};
use crate::store::RemoteStore;
use crate::types::{RecordId, TableName};

use super::state::MutationState;

/// Insert, update and remove records of one table, with local
/// `loading`/`error` tracking.
///
/// Failures are reported twice: written to `error` for whoever renders the
/// state, and returned to the caller, who must handle the `Err`. Neither
/// channel stands in for the other.
///
/// # Example
///
/// ```
/// use lumen_core::{MemoryStore, MutationHook, Payload, RecordService, Row, TableName};
///
/// # async fn example() -> Result<(), lumen_core::Error> {
/// let store = MemoryStore::new();
/// let issues = TableName::new("issues")?;
/// store.create_table(&issues);
///
/// let hook: MutationHook<_, Row> = MutationHook::new(RecordService::new(store), issues);
/// let written = hook.insert(&Payload::new().set("status", "open")).await?;
/// assert!(written.is_some());
/// assert!(hook.error().is_none());
/// # Ok(())
/// # }
/// ```
pub struct MutationHook<S, T> {
    service: RecordService<S>,
    table: TableName,
    state: watch::Sender<MutationState>,
    _record: PhantomData<fn() -> T>,
}

/// Counts one mutation as outstanding until dropped.
struct Pending<'a> {
    state: &'a watch::Sender<MutationState>,
}

impl<'a> Pending<'a> {
    fn start(state: &'a watch::Sender<MutationState>) -> Self {
        state.send_modify(|s| {
            s.pending += 1;
            s.loading = true;
        });
        Self { state }
    }
}

impl Drop for Pending<'_> {
    fn drop(&mut self) {
        self.state.send_modify(|s| {
            s.pending = s.pending.saturating_sub(1);
            s.loading = s.pending > 0;
        });
    }
}

impl<S, T> MutationHook<S, T>
where
    S: RemoteStore,
    T: DeserializeOwned,
{
    pub fn new(service: RecordService<S>, table: TableName) -> Self {
        let (state, _) = watch::channel(MutationState::default());
        Self {
            service,
            table,
            state,
            _record: PhantomData,
        }
    }

    pub fn table(&self) -> &TableName {
        &self.table
    }

    /// Insert a record.
    pub async fn insert(&self, payload: &Payload) -> Result<Option<T>> {
        self.track(self.service.insert(&self.table, payload)).await
    }

    /// Update the record whose `id` column equals `id`.
    pub async fn update(&self, id: impl Into<RecordId>, payload: &Payload) -> Result<Option<T>> {
        self.update_by(DEFAULT_ID_COLUMN, id, payload).await
    }

    /// Update the record whose `id_column` equals `id`.
    pub async fn update_by(
        &self,
        id_column: &str,
        id: impl Into<RecordId>,
        payload: &Payload,
    ) -> Result<Option<T>> {
        let id = id.into();
        self.track(self.service.update_by(&self.table, id_column, &id, payload))
            .await
    }

    /// Remove the record whose `id` column equals `id`.
    pub async fn remove(&self, id: impl Into<RecordId>) -> Result<()> {
        self.remove_by(DEFAULT_ID_COLUMN, id).await
    }

    /// Remove the record whose `id_column` equals `id`.
    pub async fn remove_by(&self, id_column: &str, id: impl Into<RecordId>) -> Result<()> {
        let id = id.into();
        self.track(self.service.remove_by(&self.table, id_column, &id))
            .await
    }

    async fn track<R>(&self, call: impl Future<Output = Result<R>>) -> Result<R> {
        let _pending = Pending::start(&self.state);
        let outcome = call.await;

        let error = outcome.as_ref().err().cloned();
        if let Some(ref e) = error {
            debug!(table = %self.table, error = %e, "Mutation failed");
        }
        self.state.send_modify(|s| s.error = error);

        outcome
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> MutationState {
        self.state.borrow().clone()
    }

    pub fn loading(&self) -> bool {
        self.state.borrow().loading
    }

    pub fn error(&self) -> Option<Error> {
        self.state.borrow().error.clone()
    }

    /// Follow state changes.
    pub fn subscribe(&self) -> watch::Receiver<MutationState> {
        self.state.subscribe()
    }
}
