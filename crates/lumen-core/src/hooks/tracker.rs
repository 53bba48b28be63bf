//! Sequencing for fetch-style hooks.
//!
//! Each fetch is numbered when it starts. Only the most recently started
//! fetch may write its outcome; anything older settles into the void. The
//! number is bumped and checked while holding the watch channel's lock, so
//! starts and settlements cannot interleave.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

use tokio::sync::watch;
use tracing::debug;

use crate::Result;

use super::state::QueryState;

pub(crate) struct FetchTracker<D> {
    state: watch::Sender<QueryState<D>>,
    issued: AtomicU64,
    closed: AtomicBool,
}

impl<D> FetchTracker<D> {
    pub(crate) fn new(initial: QueryState<D>) -> Self {
        let (state, _) = watch::channel(initial);
        Self {
            state,
            issued: AtomicU64::new(0),
            closed: AtomicBool::new(false),
        }
    }

    pub(crate) fn sender(&self) -> &watch::Sender<QueryState<D>> {
        &self.state
    }

    /// Start a fetch, flipping `loading` on.
    ///
    /// Returns `None` once the hook has been torn down.
    pub(crate) fn begin(&self) -> Option<u64> {
        if self.is_closed() {
            return None;
        }
        let mut seq = 0;
        self.state.send_modify(|state| {
            seq = self.issued.fetch_add(1, Ordering::SeqCst) + 1;
            state.loading = true;
        });
        Some(seq)
    }

    /// Record the outcome of fetch `seq`.
    ///
    /// Success replaces `data` and clears `error`; failure sets `error` and
    /// leaves `data` alone. Returns false if the outcome was discarded.
    pub(crate) fn settle(&self, seq: u64, outcome: Result<D>) -> bool {
        let applied = self.state.send_if_modified(|state| {
            if self.is_closed() || self.issued.load(Ordering::SeqCst) != seq {
                return false;
            }
            match outcome {
                Ok(data) => {
                    state.data = data;
                    state.error = None;
                }
                Err(e) => state.error = Some(e),
            }
            state.loading = false;
            true
        });

        if !applied {
            debug!(seq, "Discarding superseded fetch result");
        }
        applied
    }

    /// Settle immediately with `data` and no request, superseding any fetch
    /// still in flight.
    pub(crate) fn settle_idle(&self, data: D) {
        if self.is_closed() {
            return;
        }
        self.state.send_modify(|state| {
            self.issued.fetch_add(1, Ordering::SeqCst);
            state.data = data;
            state.error = None;
            state.loading = false;
        });
    }

    pub(crate) fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
    }

    pub(crate) fn is_closed(&self) -> bool {
        self.closed.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{Error, InvalidInputError};

    fn failure() -> Error {
        InvalidInputError::Other {
            message: "boom".to_string(),
        }
        .into()
    }

    #[test]
    fn only_latest_fetch_lands() {
        let tracker = FetchTracker::new(QueryState::<Vec<u32>>::default());

        let first = tracker.begin().unwrap();
        let second = tracker.begin().unwrap();

        assert!(tracker.settle(second, Ok(vec![2])));
        assert!(!tracker.settle(first, Ok(vec![1])));

        let state = tracker.sender().borrow();
        assert_eq!(state.data, vec![2]);
        assert!(!state.loading);
    }

    #[test]
    fn stale_settlement_keeps_loading() {
        let tracker = FetchTracker::new(QueryState::<Vec<u32>>::default());

        let first = tracker.begin().unwrap();
        let _second = tracker.begin().unwrap();
        tracker.settle(first, Ok(vec![1]));

        assert!(tracker.sender().borrow().loading);
    }

    #[test]
    fn failure_keeps_previous_data() {
        let tracker = FetchTracker::new(QueryState::<Vec<u32>>::default());

        let seq = tracker.begin().unwrap();
        tracker.settle(seq, Ok(vec![7]));
        let seq = tracker.begin().unwrap();
        tracker.settle(seq, Err(failure()));

        let state = tracker.sender().borrow();
        assert_eq!(state.data, vec![7]);
        assert!(state.error.is_some());
        assert!(!state.loading);
    }

    #[test]
    fn closed_tracker_ignores_everything() {
        let tracker = FetchTracker::new(QueryState::<Vec<u32>>::default());

        let seq = tracker.begin().unwrap();
        tracker.close();

        assert!(!tracker.settle(seq, Ok(vec![1])));
        assert!(tracker.begin().is_none());
    }
}
