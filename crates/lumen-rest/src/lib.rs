//! lumen-rest - Hosted record store over PostgREST.
//!
//! Talks to the dashboard's hosted backend through its REST interface:
//! one endpoint per table under `/rest/v1/`, filters and ordering as query
//! parameters, writes echoed back with `Prefer: return=representation`.

mod client;
mod config;
mod store;

pub use config::RestConfig;
pub use store::RestStore;
