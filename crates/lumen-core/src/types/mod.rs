//! Validated identifier types.

mod record_id;
mod store_url;
mod table_name;

pub use record_id::RecordId;
pub use store_url::{StoreKind, StoreUrl};
pub use table_name::{TableName, validate_column};
