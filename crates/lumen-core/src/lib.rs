//! lumen-core - Generic record access for the streetlight-outage dashboard.
//!
//! Everything the dashboard reads or writes goes through one table-agnostic
//! [`RecordService`] over a [`RemoteStore`]. On top of it sit hooks that keep
//! query results, single records and mutation status in observable state.
//!
//! # Example
//!
//! ```
//! use lumen_core::{MemoryStore, Payload, QuerySpec, RecordService, Row, TableName};
//!
//! # async fn example() -> Result<(), lumen_core::Error> {
//! let store = MemoryStore::new();
//! let issues = TableName::new("issues")?;
//! store.create_table(&issues);
//!
//! let service = RecordService::new(store);
//! service
//!     .insert::<Row>(&issues, &Payload::new().set("id", "ISS-1001").set("status", "open"))
//!     .await?;
//!
//! let open: Vec<Row> = service
//!     .fetch_many(&issues, Some(&QuerySpec::new().filter("status", "open")))
//!     .await?;
//! assert_eq!(open.len(), 1);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod hooks;
pub mod memory;
pub mod profiles;
pub mod query;
pub mod record;
pub mod service;
pub mod store;
pub mod types;

pub use error::{Error, RemoteQueryError, RemoteWriteError, StoreError, WriteOp};
pub use hooks::{Deps, ItemHook, MutationHook, MutationState, QueryHook, QueryState};
pub use memory::MemoryStore;
pub use profiles::{Profile, ProfilePatch, ProfileService, Role};
pub use query::{Order, QuerySpec, Range, SelectQuery};
pub use record::{Payload, Row};
pub use service::{DEFAULT_ID_COLUMN, RecordService};
pub use store::{RemoteStore, StoreResult};
pub use types::{RecordId, StoreKind, StoreUrl, TableName};

/// Result type alias using the crate's Error type.
pub type Result<T> = std::result::Result<T, Error>;
