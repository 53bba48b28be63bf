//! PostgREST-backed remote store.

use async_trait::async_trait;
use reqwest::Method;
use serde_json::Value;
use tracing::{debug, instrument};

use lumen_core::error::{Error, MULTIPLE_ROWS, StoreError};
use lumen_core::query::SelectQuery;
use lumen_core::record::Row;
use lumen_core::store::{RemoteStore, StoreResult};
use lumen_core::types::TableName;

use crate::client::{PREFER, RETURN_REPRESENTATION, RestClient};
use crate::config::RestConfig;

/// Remote store that speaks the hosted backend's REST dialect.
#[derive(Debug, Clone)]
pub struct RestStore {
    client: RestClient,
}

impl RestStore {
    /// Create a store for the given project.
    ///
    /// # Errors
    ///
    /// Returns an error if the API key or schema cannot be sent as a header.
    pub fn new(config: RestConfig) -> Result<Self, Error> {
        Ok(Self {
            client: RestClient::new(config)?,
        })
    }

    pub fn config(&self) -> &RestConfig {
        self.client.config()
    }
}

/// Render an equality filter as a PostgREST operator expression.
fn eq_operand(value: &Value) -> String {
    match value {
        Value::Null => "is.null".to_string(),
        Value::String(s) => format!("eq.{}", s),
        other => format!("eq.{}", other),
    }
}

/// A singular request that was refused because no row matched.
///
/// The server reports this as `PGRST116` with the row count in `details`
/// ("The result contains 0 rows").
fn matched_nothing(err: &StoreError) -> bool {
    err.code.as_deref() == Some(MULTIPLE_ROWS)
        && err
            .details
            .as_deref()
            .and_then(|d| d.split_whitespace().find_map(|w| w.parse::<usize>().ok()))
            == Some(0)
}

/// Query parameters for a select.
fn select_params(query: &SelectQuery) -> Vec<(String, String)> {
    let mut params = vec![("select".to_string(), "*".to_string())];

    for (column, value) in query.filters() {
        params.push((column.clone(), eq_operand(value)));
    }

    if let Some(order) = query.order_clause() {
        let direction = if order.ascending { "asc" } else { "desc" };
        params.push(("order".to_string(), format!("{}.{}", order.column, direction)));
    }

    if let Some(range) = query.range_clause() {
        params.push(("offset".to_string(), range.from().to_string()));
        // Row counts are bigint on the server side.
        let limit = range.span().min(i64::MAX as u64);
        params.push(("limit".to_string(), limit.to_string()));
    }

    params
}

#[async_trait]
impl RemoteStore for RestStore {
    #[instrument(skip(self, query), fields(table = %query.table()))]
    async fn select(&self, query: &SelectQuery) -> StoreResult<Vec<Row>> {
        let request = self
            .client
            .request(Method::GET, query.table())
            .query(&select_params(query));

        let rows: Vec<Row> = self.client.send_json(request).await?;
        debug!(count = rows.len(), "Selected rows");
        Ok(rows)
    }

    #[instrument(skip(self, row), fields(table = %table))]
    async fn insert(&self, table: &TableName, row: &Row) -> StoreResult<Option<Row>> {
        let request = self
            .client
            .request(Method::POST, table)
            .header(PREFER, RETURN_REPRESENTATION)
            .json(row);

        let rows: Vec<Row> = self.client.send_json(request).await?;
        Ok(rows.into_iter().next())
    }

    #[instrument(skip(self, value, patch), fields(table = %table))]
    async fn update(
        &self,
        table: &TableName,
        column: &str,
        value: &Value,
        patch: &Row,
    ) -> StoreResult<Option<Row>> {
        let request = self
            .client
            .request_single(Method::PATCH, table)
            .query(&[(column, eq_operand(value))])
            .header(PREFER, RETURN_REPRESENTATION)
            .json(patch);

        match self.client.send_json::<Row>(request).await {
            Ok(row) => Ok(Some(row)),
            Err(e) if matched_nothing(&e) => {
                debug!("No row matched");
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }

    #[instrument(skip(self, value), fields(table = %table))]
    async fn delete(&self, table: &TableName, column: &str, value: &Value) -> StoreResult<()> {
        let request = self
            .client
            .request(Method::DELETE, table)
            .query(&[(column, eq_operand(value))]);

        self.client.send_empty(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lumen_core::query::{Order, Range};
    use serde_json::json;

    fn outages() -> TableName {
        TableName::new("outages").unwrap()
    }

    #[test]
    fn eq_operand_renders_scalars() {
        assert_eq!(eq_operand(&json!("open")), "eq.open");
        assert_eq!(eq_operand(&json!(4)), "eq.4");
        assert_eq!(eq_operand(&json!(true)), "eq.true");
        assert_eq!(eq_operand(&Value::Null), "is.null");
    }

    #[test]
    fn select_params_cover_every_clause() {
        let query = SelectQuery::new(outages())
            .eq("status", "open")
            .order(Order::desc("reported_at"))
            .range(Range::new(10, 19).unwrap());

        let params = select_params(&query);
        let has = |k: &str, v: &str| params.iter().any(|(pk, pv)| pk == k && pv == v);

        assert!(has("select", "*"));
        assert!(has("status", "eq.open"));
        assert!(has("order", "reported_at.desc"));
        assert!(has("offset", "10"));
        assert!(has("limit", "10"));
    }

    #[test]
    fn widest_range_limit_fits_server_integer() {
        let query = SelectQuery::new(outages()).range(Range::new(0, u64::MAX).unwrap());
        let params = select_params(&query);
        assert!(params.contains(&("limit".to_string(), i64::MAX.to_string())));
    }

    #[test]
    fn zero_row_refusal_is_recognised() {
        let none = StoreError::new("JSON object requested, multiple (or no) rows returned")
            .with_status(406)
            .with_code(MULTIPLE_ROWS)
            .with_details("The result contains 0 rows");
        assert!(matched_nothing(&none));
        assert!(!matched_nothing(&StoreError::multiple_rows(2)));
        assert!(!matched_nothing(&StoreError::new("boom").with_details("0 rows")));
    }

    #[test]
    fn bare_select_only_asks_for_columns() {
        let params = select_params(&SelectQuery::new(outages()));
        assert_eq!(params, vec![("select".to_string(), "*".to_string())]);
    }
}
