//! Stateful wrappers over the record service.
//!
//! A hook binds one data need (a table plus a query, an id, or a set of
//! writes) to observable `{data, loading, error}` state. State lives in a
//! [`tokio::sync::watch`] channel so any number of views can follow it.
//!
//! Query and item hooks turn failures into state and never return them.
//! Mutation hooks do both: the failure is stored in `error` *and* returned
//! to the caller, who has to handle it.
//!
//! Teardown is explicit: once a hook is unmounted (or dropped), results of
//! fetches still in flight are discarded and further fetches do nothing.

mod item;
mod mutation;
mod query;
mod state;
mod tracker;

use std::sync::{Mutex, MutexGuard, PoisonError};

pub use item::ItemHook;
pub use mutation::MutationHook;
pub use query::QueryHook;
pub use state::{Deps, MutationState, QueryState};

fn lock<K>(mutex: &Mutex<K>) -> MutexGuard<'_, K> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

/// Apply `change` to the key and report whether it actually changed.
fn replace_key<K: Clone + PartialEq>(mutex: &Mutex<K>, change: impl FnOnce(&mut K)) -> bool {
    let mut key = lock(mutex);
    let mut next = key.clone();
    change(&mut next);
    if *key == next {
        return false;
    }
    *key = next;
    true
}
