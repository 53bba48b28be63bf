//! Connection settings for the hosted store.

use lumen_core::StoreUrl;

/// Where the hosted store lives and how to authenticate against it.
#[derive(Clone)]
pub struct RestConfig {
    /// Base URL of the project (without `/rest/v1`).
    pub url: StoreUrl,
    /// Project API key, sent as `apikey` and as the bearer token.
    pub api_key: String,
    /// Database schema to address, when not the default `public`.
    pub schema: Option<String>,
}

impl RestConfig {
    pub fn new(url: StoreUrl, api_key: impl Into<String>) -> Self {
        Self {
            url,
            api_key: api_key.into(),
            schema: None,
        }
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = Some(schema.into());
        self
    }
}

impl std::fmt::Debug for RestConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RestConfig")
            .field("url", &self.url)
            .field("api_key", &"[REDACTED]")
            .field("schema", &self.schema)
            .finish()
    }
}
