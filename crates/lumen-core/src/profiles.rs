//! Typed access to the `profiles` table.
//!
//! Administrator accounts for the dashboard. The user-management views
//! list them, look them up, and flip their role or active flag.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::Result;
use crate::record::Payload;
use crate::service::RecordService;
use crate::store::RemoteStore;
use crate::types::{RecordId, TableName};

/// Name of the table profiles live in.
pub const PROFILES_TABLE: &str = "profiles";

/// A dashboard administrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Profile {
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    pub role: Role,
    pub is_active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Administrative role.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Admin,
    SuperAdmin,
}

/// Fields of a profile to change. Unset fields are left alone.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ProfilePatch {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub full_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub role: Option<Role>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub is_active: Option<bool>,
}

impl ProfilePatch {
    pub fn role(role: Role) -> Self {
        Self {
            role: Some(role),
            ..Self::default()
        }
    }

    pub fn active(is_active: bool) -> Self {
        Self {
            is_active: Some(is_active),
            ..Self::default()
        }
    }
}

/// Record service bound to the `profiles` table.
#[derive(Debug, Clone)]
pub struct ProfileService<S> {
    records: RecordService<S>,
    table: TableName,
}

impl<S: RemoteStore> ProfileService<S> {
    pub fn new(records: RecordService<S>) -> Result<Self> {
        Ok(Self {
            records,
            table: TableName::new(PROFILES_TABLE)?,
        })
    }

    /// Every profile, in store order.
    pub async fn all_profiles(&self) -> Result<Vec<Profile>> {
        self.records.fetch_many(&self.table, None).await
    }

    pub async fn profile_by_id(&self, id: &str) -> Result<Option<Profile>> {
        self.records
            .fetch_by_id(&self.table, &RecordId::from(id))
            .await
    }

    /// Apply `patch` and return the profile as written.
    pub async fn update_profile(&self, id: &str, patch: &ProfilePatch) -> Result<Option<Profile>> {
        let payload = Payload::from_serialize(patch)?;
        self.records
            .update(&self.table, &RecordId::from(id), &payload)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryStore;
    use crate::record::Row;
    use serde_json::{Value, json};

    fn row(value: Value) -> Row {
        value.as_object().unwrap().clone()
    }

    fn service() -> ProfileService<MemoryStore> {
        let store = MemoryStore::new();
        store.seed(
            &TableName::new(PROFILES_TABLE).unwrap(),
            [
                row(json!({
                    "id": "a1",
                    "email": "dispatch@city.example",
                    "full_name": "Dana Whitfield",
                    "role": "admin",
                    "is_active": true,
                    "created_at": "2024-03-01T09:00:00Z",
                    "updated_at": "2024-03-01T09:00:00Z"
                })),
                row(json!({
                    "id": "a2",
                    "email": "ops@city.example",
                    "full_name": null,
                    "role": "super_admin",
                    "is_active": false,
                    "created_at": "2024-04-11T16:30:00Z",
                    "updated_at": "2024-05-02T08:15:00Z"
                })),
            ],
        );
        ProfileService::new(RecordService::new(store)).unwrap()
    }

    #[tokio::test]
    async fn lists_profiles() {
        let profiles = service().all_profiles().await.unwrap();
        assert_eq!(profiles.len(), 2);
        assert_eq!(profiles[1].role, Role::SuperAdmin);
        assert!(profiles[1].full_name.is_none());
    }

    #[tokio::test]
    async fn toggles_active_flag() {
        let service = service();

        let updated = service
            .update_profile("a1", &ProfilePatch::active(false))
            .await
            .unwrap()
            .unwrap();

        assert!(!updated.is_active);
        assert_eq!(updated.role, Role::Admin);
        assert_eq!(updated.full_name.as_deref(), Some("Dana Whitfield"));
    }

    #[tokio::test]
    async fn unknown_profile_is_none() {
        assert!(service().profile_by_id("zz").await.unwrap().is_none());
    }

    #[test]
    fn patch_serializes_only_set_fields() {
        let payload = Payload::from_serialize(&ProfilePatch::role(Role::SuperAdmin)).unwrap();
        assert_eq!(payload.as_row().len(), 1);
        assert_eq!(payload.get("role"), Some(&json!("super_admin")));
    }
}
