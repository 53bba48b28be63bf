//! Query specifications and the store-facing select request.
//!
//! A [`QuerySpec`] is what callers and hooks hold: equality filters, one
//! sort directive and an inclusive pagination window, each optional. The
//! record service turns it into a [`SelectQuery`], applying filters, then
//! the order clause, then the range, in that order.

use std::cmp::Ordering;
use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{Error, InvalidInputError};
use crate::record::Row;
use crate::types::{TableName, validate_column};

/// Filters, ordering and pagination for a read.
///
/// Filters are conjunctive equality matches; there is no OR and no range
/// comparison. Compared structurally, so two specs built in a different
/// order but with the same content are equal.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuerySpec {
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub filters: BTreeMap<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<Order>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub range: Option<Range>,
}

impl QuerySpec {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `column` to equal `value`.
    pub fn filter(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.insert(column.into(), value.into());
        self
    }

    /// Sort by `column`.
    pub fn order_by(mut self, column: impl Into<String>, ascending: bool) -> Self {
        self.order = Some(Order {
            column: column.into(),
            ascending,
        });
        self
    }

    /// Only return rows `from..=to` of the filtered, ordered result.
    pub fn range(mut self, range: Range) -> Self {
        self.range = Some(range);
        self
    }

    /// Returns true if the spec places no constraint at all.
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty() && self.order.is_none() && self.range.is_none()
    }

    /// Check every column name the spec refers to.
    pub fn validate(&self) -> Result<(), Error> {
        for column in self.filters.keys() {
            validate_column(column)?;
        }
        if let Some(ref order) = self.order {
            validate_column(&order.column)?;
        }
        Ok(())
    }
}

/// A single sort directive.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

impl Order {
    pub fn asc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: true,
        }
    }

    pub fn desc(column: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            ascending: false,
        }
    }
}

/// An inclusive pagination window over result offsets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawRange")]
pub struct Range {
    from: u64,
    to: u64,
}

#[derive(Deserialize)]
struct RawRange {
    from: u64,
    to: u64,
}

impl TryFrom<RawRange> for Range {
    type Error = Error;

    fn try_from(raw: RawRange) -> Result<Self, Self::Error> {
        Range::new(raw.from, raw.to)
    }
}

impl Range {
    /// Create a window covering offsets `from..=to`.
    ///
    /// # Errors
    ///
    /// Returns an error if `from` is greater than `to`.
    pub fn new(from: u64, to: u64) -> Result<Self, Error> {
        if from > to {
            return Err(InvalidInputError::Range { from, to }.into());
        }
        Ok(Self { from, to })
    }

    pub fn from(&self) -> u64 {
        self.from
    }

    pub fn to(&self) -> u64 {
        self.to
    }

    /// Number of rows the window can hold, saturating at `u64::MAX`.
    pub fn span(&self) -> u64 {
        (self.to - self.from).saturating_add(1)
    }
}

/// A read request as handed to a [`RemoteStore`](crate::RemoteStore).
#[derive(Debug, Clone, PartialEq)]
pub struct SelectQuery {
    table: TableName,
    filters: Vec<(String, Value)>,
    order: Option<Order>,
    range: Option<Range>,
}

impl SelectQuery {
    /// Select every row of `table`.
    pub fn new(table: TableName) -> Self {
        Self {
            table,
            filters: Vec::new(),
            order: None,
            range: None,
        }
    }

    /// Build the request for a spec: filters, then order, then range.
    pub fn from_spec(table: TableName, spec: &QuerySpec) -> Self {
        let mut query = Self::new(table);
        for (column, value) in &spec.filters {
            query = query.eq(column.clone(), value.clone());
        }
        if let Some(ref order) = spec.order {
            query = query.order(order.clone());
        }
        if let Some(range) = spec.range {
            query = query.range(range);
        }
        query
    }

    pub fn eq(mut self, column: impl Into<String>, value: impl Into<Value>) -> Self {
        self.filters.push((column.into(), value.into()));
        self
    }

    pub fn order(mut self, order: Order) -> Self {
        self.order = Some(order);
        self
    }

    pub fn range(mut self, range: Range) -> Self {
        self.range = Some(range);
        self
    }

    pub fn table(&self) -> &TableName {
        &self.table
    }

    pub fn filters(&self) -> &[(String, Value)] {
        &self.filters
    }

    pub fn order_clause(&self) -> Option<&Order> {
        self.order.as_ref()
    }

    pub fn range_clause(&self) -> Option<Range> {
        self.range
    }

    /// Returns true if `row` satisfies every equality filter.
    ///
    /// A missing field only matches a `null` filter value.
    pub fn matches(&self, row: &Row) -> bool {
        self.filters
            .iter()
            .all(|(column, value)| row.get(column).unwrap_or(&Value::Null) == value)
    }

    /// Evaluate the query over rows held in process.
    ///
    /// Used by stores that have no query engine of their own. Sorting is
    /// stable, so rows that compare equal keep their input order.
    pub fn apply(&self, rows: impl IntoIterator<Item = Row>) -> Vec<Row> {
        let mut rows: Vec<Row> = rows.into_iter().filter(|row| self.matches(row)).collect();

        if let Some(ref order) = self.order {
            rows.sort_by(|a, b| {
                let ordering = compare_values(a.get(&order.column), b.get(&order.column));
                if order.ascending {
                    ordering
                } else {
                    ordering.reverse()
                }
            });
        }

        match self.range {
            Some(range) => rows
                .into_iter()
                .skip(usize::try_from(range.from()).unwrap_or(usize::MAX))
                .take(usize::try_from(range.span()).unwrap_or(usize::MAX))
                .collect(),
            None => rows,
        }
    }
}

/// Total order over JSON values for sorting.
///
/// Nulls (and missing fields) sort after everything else, so they come
/// last ascending and first descending.
fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    let a = a.unwrap_or(&Value::Null);
    let b = b.unwrap_or(&Value::Null);

    match (a, b) {
        (Value::Bool(x), Value::Bool(y)) => x.cmp(y),
        (Value::Number(x), Value::Number(y)) => match (x.as_i64(), y.as_i64()) {
            (Some(x), Some(y)) => x.cmp(&y),
            _ => {
                let x = x.as_f64().unwrap_or(f64::NAN);
                let y = y.as_f64().unwrap_or(f64::NAN);
                x.partial_cmp(&y).unwrap_or(Ordering::Equal)
            }
        },
        (Value::String(x), Value::String(y)) => x.cmp(y),
        _ => kind_rank(a).cmp(&kind_rank(b)),
    }
}

fn kind_rank(value: &Value) -> u8 {
    match value {
        Value::Bool(_) => 0,
        Value::Number(_) => 1,
        Value::String(_) => 2,
        Value::Array(_) => 3,
        Value::Object(_) => 4,
        Value::Null => 5,
    }
}
