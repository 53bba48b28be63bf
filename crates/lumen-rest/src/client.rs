//! PostgREST HTTP client.

use reqwest::header::{ACCEPT, AUTHORIZATION, CONTENT_TYPE, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Method, RequestBuilder};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, trace};

use lumen_core::error::{Error, InvalidInputError, StoreError};
use lumen_core::store::StoreResult;
use lumen_core::types::TableName;

use crate::config::RestConfig;

const APIKEY: HeaderName = HeaderName::from_static("apikey");
pub(crate) const PREFER: HeaderName = HeaderName::from_static("prefer");
const ACCEPT_PROFILE: HeaderName = HeaderName::from_static("accept-profile");
const CONTENT_PROFILE: HeaderName = HeaderName::from_static("content-profile");

/// Ask the server to echo written rows back.
pub(crate) const RETURN_REPRESENTATION: &str = "return=representation";

const JSON: &str = "application/json";
/// Singular responses; the server rolls the write back unless exactly one row is affected.
const SINGLE_OBJECT: &str = "application/vnd.pgrst.object+json";

/// Error body PostgREST sends with non-2xx responses.
#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
    code: Option<String>,
    details: Option<String>,
    hint: Option<String>,
}

/// HTTP client bound to one project.
#[derive(Debug, Clone)]
pub(crate) struct RestClient {
    client: reqwest::Client,
    config: RestConfig,
    headers: HeaderMap,
}

impl RestClient {
    pub(crate) fn new(config: RestConfig) -> Result<Self, Error> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("lumen/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| InvalidInputError::Other {
                message: format!("failed to build HTTP client: {}", e),
            })?;

        let headers = Self::default_headers(&config)?;

        Ok(Self {
            client,
            config,
            headers,
        })
    }

    pub(crate) fn config(&self) -> &RestConfig {
        &self.config
    }

    fn default_headers(config: &RestConfig) -> Result<HeaderMap, Error> {
        let invalid = |what: &str| -> Error {
            InvalidInputError::Other {
                message: format!("{} contains characters not allowed in a header", what),
            }
            .into()
        };

        let mut apikey = HeaderValue::from_str(&config.api_key).map_err(|_| invalid("API key"))?;
        apikey.set_sensitive(true);
        let mut bearer = HeaderValue::from_str(&format!("Bearer {}", config.api_key))
            .map_err(|_| invalid("API key"))?;
        bearer.set_sensitive(true);

        let mut headers = HeaderMap::new();
        headers.insert(APIKEY, apikey);
        headers.insert(AUTHORIZATION, bearer);
        headers.insert(CONTENT_TYPE, HeaderValue::from_static(JSON));

        if let Some(ref schema) = config.schema {
            let value = HeaderValue::from_str(schema).map_err(|_| invalid("schema"))?;
            headers.insert(ACCEPT_PROFILE, value.clone());
            headers.insert(CONTENT_PROFILE, value);
        }

        Ok(headers)
    }

    /// Start a request against a table endpoint.
    pub(crate) fn request(&self, method: Method, table: &TableName) -> RequestBuilder {
        self.build(method, table, JSON)
    }

    /// Start a request whose response must be exactly one row.
    pub(crate) fn request_single(&self, method: Method, table: &TableName) -> RequestBuilder {
        self.build(method, table, SINGLE_OBJECT)
    }

    fn build(&self, method: Method, table: &TableName, accept: &'static str) -> RequestBuilder {
        let url = self.config.url.table_url(table);
        debug!(%method, %url, accept, "REST request");
        self.client
            .request(method, &url)
            .headers(self.headers.clone())
            .header(ACCEPT, accept)
    }

    /// Send a request and decode a JSON body.
    #[instrument(skip(self, request))]
    pub(crate) async fn send_json<R: DeserializeOwned>(
        &self,
        request: RequestBuilder,
    ) -> StoreResult<R> {
        let response = request.send().await.map_err(transport)?;
        let status = response.status();
        trace!(status = %status, "REST response");

        if status.is_success() {
            response.json::<R>().await.map_err(|e| {
                StoreError::new(format!("invalid response body: {}", e))
                    .with_status(status.as_u16())
            })
        } else {
            Err(parse_error_response(response).await)
        }
    }

    /// Send a request whose response body is irrelevant.
    #[instrument(skip(self, request))]
    pub(crate) async fn send_empty(&self, request: RequestBuilder) -> StoreResult<()> {
        let response = request.send().await.map_err(transport)?;
        let status = response.status();
        trace!(status = %status, "REST response");

        if status.is_success() {
            Ok(())
        } else {
            Err(parse_error_response(response).await)
        }
    }
}

fn transport(err: reqwest::Error) -> StoreError {
    if err.is_timeout() {
        StoreError::transport(format!("request timed out: {}", err))
    } else if err.is_connect() {
        StoreError::transport(format!("connection failed: {}", err))
    } else {
        StoreError::transport(err.to_string())
    }
}

/// Turn a non-2xx response into a store error, keeping the server's words.
async fn parse_error_response(response: reqwest::Response) -> StoreError {
    let status = response.status();

    match response.json::<ErrorBody>().await {
        Ok(body) => {
            let message = body.message.unwrap_or_else(|| status.to_string());
            let mut error = StoreError::new(message).with_status(status.as_u16());
            error.code = body.code;
            error.details = body.details;
            error.hint = body.hint;
            error
        }
        Err(_) => StoreError::new(status.to_string()).with_status(status.as_u16()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_core::StoreUrl;

    #[test]
    fn client_creation() {
        let url = StoreUrl::new("https://lights.example.org").unwrap();
        let client = RestClient::new(RestConfig::new(url.clone(), "anon-key")).unwrap();
        assert_eq!(client.config().url, url);
    }

    #[test]
    fn debug_output_hides_api_key() {
        let url = StoreUrl::new("https://lights.example.org").unwrap();
        let client = RestClient::new(RestConfig::new(url, "secret-anon-key")).unwrap();
        assert!(!format!("{:?}", client).contains("secret-anon-key"));
    }

    #[test]
    fn api_key_with_newline_rejected() {
        let url = StoreUrl::new("https://lights.example.org").unwrap();
        assert!(RestClient::new(RestConfig::new(url, "bad\nkey")).is_err());
    }
}
