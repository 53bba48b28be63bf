//! Store URL type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;
use url::Url;

use crate::error::{Error, InvalidInputError};
use crate::types::TableName;

/// Which kind of store a URL points at.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StoreKind {
    /// Hosted backend reached over its REST interface.
    Rest,
    /// Directory of JSON record files.
    File,
}

impl fmt::Display for StoreKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreKind::Rest => write!(f, "rest"),
            StoreKind::File => write!(f, "file"),
        }
    }
}

/// Where the dashboard's records live.
///
/// `https://` selects the hosted backend, whose tables sit under
/// `/rest/v1/<table>`; plain `http://` is only accepted for a backend on
/// the loopback interface. `file://` selects a local record directory.
///
/// ```
/// use lumen_core::{StoreUrl, TableName};
/// use lumen_core::types::StoreKind;
///
/// let hosted = StoreUrl::new("https://lights.example.org").unwrap();
/// let issues = TableName::new("issues").unwrap();
/// assert_eq!(hosted.table_url(&issues), "https://lights.example.org/rest/v1/issues");
///
/// assert_eq!(StoreUrl::new("file:///tmp/lumen").unwrap().kind(), StoreKind::File);
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct StoreUrl {
    url: Url,
    kind: StoreKind,
}

impl StoreUrl {
    /// Parse and check a store URL.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidInputError::StoreUrl`] for unparsable URLs, unknown
    /// schemes, plain HTTP to a remote host, and hostless or pathless URLs.
    pub fn new(s: impl AsRef<str>) -> Result<Self, Error> {
        let raw = s.as_ref();
        let reject = |reason: String| -> Error {
            InvalidInputError::StoreUrl {
                value: raw.to_string(),
                reason,
            }
            .into()
        };

        let url = Url::parse(raw).map_err(|e| reject(e.to_string()))?;
        if url.cannot_be_a_base() {
            return Err(reject("must be an absolute URL".to_string()));
        }

        let kind = match url.scheme() {
            "file" if url.path().is_empty() => {
                return Err(reject("file store needs a directory path".to_string()));
            }
            "file" => StoreKind::File,
            "https" | "http" if url.host_str().is_none() => {
                return Err(reject("hosted store needs a host".to_string()));
            }
            "https" => StoreKind::Rest,
            "http" if is_loopback(&url) => StoreKind::Rest,
            "http" => {
                return Err(reject(
                    "plain http is only allowed for a loopback backend".to_string(),
                ));
            }
            other => return Err(reject(format!("unsupported scheme '{}'", other))),
        };

        Ok(Self { url, kind })
    }

    pub fn kind(&self) -> StoreKind {
        self.kind
    }

    pub fn is_local(&self) -> bool {
        self.kind == StoreKind::File
    }

    /// Endpoint for one table on a hosted store.
    pub fn table_url(&self, table: &TableName) -> String {
        format!(
            "{}/rest/v1/{}",
            self.url.as_str().trim_end_matches('/'),
            table
        )
    }

    pub fn as_str(&self) -> &str {
        self.url.as_str()
    }

    /// Directory of a `file://` store; `None` for hosted stores.
    pub fn to_file_path(&self) -> Option<PathBuf> {
        match self.kind {
            StoreKind::File => self.url.to_file_path().ok(),
            StoreKind::Rest => None,
        }
    }
}

fn is_loopback(url: &Url) -> bool {
    matches!(url.host_str(), Some("localhost" | "127.0.0.1" | "[::1]"))
}

impl fmt::Display for StoreUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.url.as_str())
    }
}

impl FromStr for StoreUrl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl AsRef<str> for StoreUrl {
    fn as_ref(&self) -> &str {
        self.url.as_str()
    }
}

impl Serialize for StoreUrl {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl<'de> Deserialize<'de> for StoreUrl {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        StoreUrl::new(&raw).map_err(serde::de::Error::custom)
    }
}
