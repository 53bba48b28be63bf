//! Observable hook state.

use serde_json::Value;

use crate::error::Error;

/// State of a query or item hook.
///
/// Replaced wholesale on every settlement; `data` keeps its previous value
/// when a fetch fails.
#[derive(Debug, Clone)]
pub struct QueryState<D> {
    pub data: D,
    pub loading: bool,
    pub error: Option<Error>,
}

impl<D: Default> Default for QueryState<D> {
    fn default() -> Self {
        Self {
            data: D::default(),
            loading: true,
            error: None,
        }
    }
}

/// State of a mutation hook.
#[derive(Debug, Clone, Default)]
pub struct MutationState {
    /// True while at least one mutation is outstanding.
    pub loading: bool,
    /// The failure of the most recently settled mutation.
    pub error: Option<Error>,
    pub(crate) pending: usize,
}

/// Extra reactivity triggers for a hook.
///
/// A caller-controlled list of values. Changing any of them re-runs the
/// hook's fetch, the same way a change of table or query does.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Deps(Vec<Value>);

impl Deps {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a trigger value.
    pub fn with(mut self, value: impl Into<Value>) -> Self {
        self.0.push(value.into());
        self
    }

    pub fn values(&self) -> &[Value] {
        &self.0
    }
}

impl From<Vec<Value>> for Deps {
    fn from(values: Vec<Value>) -> Self {
        Self(values)
    }
}
