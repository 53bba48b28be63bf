//! Store connection: which store to talk to and how to open it.

pub mod storage;
mod store;

use std::env;
use std::fmt;

use anyhow::{Context, Result};
use tracing::debug;

use lumen_core::{RecordService, StoreKind, StoreUrl};
use lumen_file::FileStore;
use lumen_rest::{RestConfig, RestStore};

use crate::cli::StoreArgs;

pub use store::CliStore;

/// Environment variable naming the store URL.
pub const STORE_URL_ENV: &str = "LUMEN_STORE_URL";
/// Environment variable holding the API key for a hosted store.
pub const API_KEY_ENV: &str = "LUMEN_API_KEY";

/// Where a connection's store URL came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Source {
    Flag,
    Env,
    Saved,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Flag => write!(f, "--store flag"),
            Source::Env => write!(f, "{}", STORE_URL_ENV),
            Source::Saved => write!(f, "saved connection"),
        }
    }
}

/// A resolved store connection.
#[derive(Clone)]
pub struct Connection {
    pub url: StoreUrl,
    pub api_key: Option<String>,
    pub source: Source,
}

fn env_var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.is_empty())
}

impl Connection {
    /// Resolve flags, then the environment, then the saved connection.
    pub fn resolve(args: &StoreArgs) -> Result<Option<Self>> {
        Self::resolve_with(args, storage::load_connection()?)
    }

    /// Resolve from flags and the environment only.
    pub fn resolve_unsaved(args: &StoreArgs) -> Result<Option<Self>> {
        Self::resolve_with(args, None)
    }

    fn resolve_with(
        args: &StoreArgs,
        saved: Option<storage::SavedConnection>,
    ) -> Result<Option<Self>> {
        let (raw, source) = if let Some(ref url) = args.store {
            (url.clone(), Source::Flag)
        } else if let Some(url) = env_var(STORE_URL_ENV) {
            (url, Source::Env)
        } else if let Some(ref saved) = saved {
            (saved.store.clone(), Source::Saved)
        } else {
            return Ok(None);
        };

        let url = StoreUrl::new(&raw)
            .with_context(|| format!("Invalid store URL from {}", source))?;

        let api_key = args
            .api_key
            .clone()
            .or_else(|| env_var(API_KEY_ENV))
            .or_else(|| {
                saved
                    .filter(|s| s.store == url.as_str())
                    .and_then(|s| s.api_key)
            });

        debug!(store = %url, %source, "Resolved store connection");
        Ok(Some(Self {
            url,
            api_key,
            source,
        }))
    }

    /// Resolve a connection or explain how to configure one.
    pub fn require(args: &StoreArgs) -> Result<Self> {
        Self::resolve(args)?.context(format!(
            "No store configured. Pass --store, set {} or run 'lumen connect'.",
            STORE_URL_ENV
        ))
    }

    pub fn kind(&self) -> StoreKind {
        self.url.kind()
    }

    /// Open the store this connection points at.
    pub fn open(&self) -> Result<CliStore> {
        if self.url.is_local() {
            let store = FileStore::from_url(&self.url)
                .context("Failed to convert file:// URL to path")?;
            Ok(CliStore::File(store))
        } else {
            let api_key = self.api_key.clone().context(format!(
                "A hosted store needs an API key. Pass --api-key or set {}.",
                API_KEY_ENV
            ))?;
            let store = RestStore::new(RestConfig::new(self.url.clone(), api_key))
                .context("Invalid REST store configuration")?;
            Ok(CliStore::Rest(store))
        }
    }

    /// Open a record service over this connection's store.
    pub fn service(&self) -> Result<RecordService<CliStore>> {
        Ok(RecordService::new(self.open()?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn saved(store: &str, api_key: Option<&str>) -> storage::SavedConnection {
        storage::SavedConnection {
            store: store.to_string(),
            api_key: api_key.map(str::to_string),
        }
    }

    #[test]
    fn flag_beats_saved_connection() {
        let args = StoreArgs {
            store: Some("file:///tmp/lumen-flag/".to_string()),
            api_key: None,
        };
        let conn = Connection::resolve_with(&args, Some(saved("file:///tmp/lumen-saved/", None)))
            .unwrap()
            .unwrap();
        assert_eq!(conn.source, Source::Flag);
        assert_eq!(conn.url.as_str(), "file:///tmp/lumen-flag/");
        assert_eq!(conn.kind(), StoreKind::File);
    }

    #[test]
    fn saved_key_only_applies_to_its_own_store() {
        let args = StoreArgs {
            store: Some("https://other.example.org/".to_string()),
            api_key: None,
        };
        let conn = Connection::resolve_with(
            &args,
            Some(saved("https://lights.example.org/", Some("saved-key"))),
        )
        .unwrap()
        .unwrap();
        assert_ne!(conn.api_key.as_deref(), Some("saved-key"));
    }

    #[test]
    fn hosted_store_without_key_fails_to_open() {
        let conn = Connection {
            url: StoreUrl::new("https://lights.example.org").unwrap(),
            api_key: None,
            source: Source::Flag,
        };
        assert!(conn.open().is_err());
    }

    #[test]
    fn invalid_url_is_reported() {
        let args = StoreArgs {
            store: Some("ftp://lights.example.org".to_string()),
            api_key: None,
        };
        assert!(Connection::resolve_with(&args, None).is_err());
    }
}
