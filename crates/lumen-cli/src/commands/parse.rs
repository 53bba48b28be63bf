//! Argument parsers shared by the record commands.

use std::io::{self, Read};

use anyhow::{Context, Result};
use serde_json::Value;

use lumen_core::{Order, Payload, Range, RecordId, TableName};

/// Parse a table name argument.
pub fn table(raw: &str) -> Result<TableName> {
    TableName::new(raw).with_context(|| format!("Invalid table name '{}'", raw))
}

/// Read a value the way a user typed it: JSON scalars keep their type,
/// anything else is text.
fn loose_value(raw: &str) -> Value {
    match serde_json::from_str::<Value>(raw) {
        Ok(value @ (Value::Number(_) | Value::Bool(_) | Value::Null)) => value,
        _ => Value::String(raw.to_string()),
    }
}

/// `column=value`.
pub fn filter(raw: &str) -> Result<(String, Value), String> {
    let (column, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected column=value, got '{}'", raw))?;
    if column.is_empty() {
        return Err("filter column is empty".to_string());
    }
    Ok((column.to_string(), loose_value(value)))
}

/// `column`, `column:asc` or `column:desc`.
pub fn order(raw: &str) -> Result<Order, String> {
    let (column, direction) = raw.split_once(':').unwrap_or((raw, "asc"));
    if column.is_empty() {
        return Err("order column is empty".to_string());
    }
    match direction {
        "asc" => Ok(Order::asc(column)),
        "desc" => Ok(Order::desc(column)),
        other => Err(format!("unknown sort direction '{}' (use asc or desc)", other)),
    }
}

/// `from..to`, both ends inclusive.
pub fn range(raw: &str) -> Result<Range, String> {
    let (from, to) = raw
        .split_once("..")
        .ok_or_else(|| format!("expected from..to, got '{}'", raw))?;
    let from: u64 = from.parse().map_err(|_| format!("invalid range start '{}'", from))?;
    let to: u64 = to.parse().map_err(|_| format!("invalid range end '{}'", to))?;
    Range::new(from, to).map_err(|e| e.to_string())
}

/// Integer ids are only recognised in canonical form, so `0042` stays text.
pub fn record_id(raw: &str) -> RecordId {
    match raw.parse::<i64>() {
        Ok(n) if n.to_string() == raw => RecordId::Integer(n),
        _ => RecordId::Text(raw.to_string()),
    }
}

/// Read a JSON object from a file, or from stdin for `-`.
pub fn payload(source: &str) -> Result<Payload> {
    let value: Value = if source == "-" {
        let mut buf = String::new();
        io::stdin()
            .read_to_string(&mut buf)
            .context("Failed to read from stdin")?;
        serde_json::from_str(&buf).context("Invalid JSON from stdin")?
    } else {
        let content = std::fs::read_to_string(source)
            .with_context(|| format!("Failed to read JSON file '{}'", source))?;
        serde_json::from_str(&content).context("Invalid JSON in file")?
    };

    Payload::try_from(value).context("Record data must be a JSON object")
}
