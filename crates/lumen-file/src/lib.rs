//! lumen-file - Filesystem-backed record store.
//!
//! Lets the dashboard run against a directory of JSON files instead of the
//! hosted backend, and gives tests a store they can inspect on disk.

mod store;

pub use store::FileStore;
