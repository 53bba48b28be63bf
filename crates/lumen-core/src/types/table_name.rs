//! Table name type.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, InvalidInputError};

/// Longest identifier the backend accepts without truncation.
const MAX_IDENTIFIER_LEN: usize = 63;

/// Query parameter names the REST dialect keeps for itself. A filter on a
/// column with one of these names would be read as the parameter instead.
const RESERVED_COLUMNS: &[&str] = &[
    "select",
    "order",
    "limit",
    "offset",
    "columns",
    "on_conflict",
    "and",
    "or",
];

/// A validated table name.
///
/// Table names are opaque to lumen: nothing about the table's columns is
/// known here. They are validated only so they can be used safely as URL
/// path segments and directory names.
///
/// # Example
///
/// ```
/// use lumen_core::TableName;
///
/// let table = TableName::new("issues").unwrap();
/// assert_eq!(table.as_str(), "issues");
/// assert!(TableName::new("issues; drop").is_err());
/// ```
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TableName(String);

impl TableName {
    /// Create a new table name, validating the format.
    ///
    /// # Errors
    ///
    /// Returns an error if the name is empty, too long, or contains
    /// characters other than ASCII letters, digits and underscores.
    pub fn new(s: impl Into<String>) -> Result<Self, Error> {
        let s = s.into();
        validate_identifier(&s).map_err(|reason| InvalidInputError::TableName {
            value: s.clone(),
            reason,
        })?;
        Ok(Self(s))
    }

    /// Returns the table name string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Validate a column name using the same rules as table names.
///
/// Names the REST dialect reserves as query parameters (`select`, `order`,
/// `limit`, `offset` and a few more) are rejected as well.
pub fn validate_column(column: &str) -> Result<(), Error> {
    let checked = validate_identifier(column).and_then(|()| {
        if RESERVED_COLUMNS.contains(&column) {
            Err("is a reserved query parameter name".to_string())
        } else {
            Ok(())
        }
    });

    checked.map_err(|reason| {
        InvalidInputError::Column {
            value: column.to_string(),
            reason,
        }
        .into()
    })
}

fn validate_identifier(s: &str) -> Result<(), String> {
    if s.is_empty() {
        return Err("cannot be empty".to_string());
    }

    if s.len() > MAX_IDENTIFIER_LEN {
        return Err(format!(
            "exceeds maximum length of {} characters",
            MAX_IDENTIFIER_LEN
        ));
    }

    let mut chars = s.chars();
    if let Some(first) = chars.next()
        && !(first.is_ascii_alphabetic() || first == '_')
    {
        return Err("must start with a letter or underscore".to_string());
    }

    for c in chars {
        if !c.is_ascii_alphanumeric() && c != '_' {
            return Err(format!("contains invalid character '{}'", c));
        }
    }

    Ok(())
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TableName {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for TableName {
    type Error = Error;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl TryFrom<&str> for TableName {
    type Error = Error;

    fn try_from(s: &str) -> Result<Self, Self::Error> {
        Self::new(s)
    }
}

impl From<TableName> for String {
    fn from(table: TableName) -> Self {
        table.0
    }
}

impl AsRef<str> for TableName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_names() {
        assert!(TableName::new("issues").is_ok());
        assert!(TableName::new("_private").is_ok());
        assert!(TableName::new("issue_categories2").is_ok());
    }

    #[test]
    fn invalid_empty() {
        assert!(TableName::new("").is_err());
    }

    #[test]
    fn invalid_leading_digit() {
        assert!(TableName::new("1issues").is_err());
    }

    #[test]
    fn invalid_characters() {
        assert!(TableName::new("issues-2024").is_err());
        assert!(TableName::new("public.issues").is_err());
        assert!(TableName::new("../etc").is_err());
    }

    #[test]
    fn invalid_too_long() {
        let name = "a".repeat(64);
        assert!(TableName::new(name).is_err());
    }

    #[test]
    fn column_rules_match_table_rules() {
        assert!(validate_column("full_name").is_ok());
        assert!(validate_column("full name").is_err());
    }

    #[test]
    fn reserved_parameter_names_rejected_as_columns() {
        for name in ["select", "order", "limit", "offset"] {
            assert!(validate_column(name).is_err(), "{name} accepted");
        }
        assert!(validate_column("order_id").is_ok());
        assert!(TableName::new("order").is_ok());
    }

    #[test]
    fn serde_rejects_invalid() {
        let ok: TableName = serde_json::from_str("\"profiles\"").unwrap();
        assert_eq!(ok.as_str(), "profiles");
        assert!(serde_json::from_str::<TableName>("\"no way\"").is_err());
    }
}
