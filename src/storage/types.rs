//! core type-safe wrappers for the tree storage layer.

use std::fmt;
use std::path::{Path, PathBuf};

use rusqlite::types::{FromSql, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

/// Identifier of one row in the `tree_items` table.
///
/// Assigned by SQLite on insert and never reused within one store lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(i64);

impl NodeId {
    pub fn new(raw: i64) -> Self {
        Self(raw)
    }

    /// raw integer value
    pub fn get(self) -> i64 {
        self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for NodeId {
    fn from(raw: i64) -> Self {
        Self(raw)
    }
}

impl ToSql for NodeId {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        self.0.to_sql()
    }
}

impl FromSql for NodeId {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        i64::column_result(value).map(NodeId)
    }
}

/// A validated node name.
///
/// Names are free text but must not be empty. Deserialization goes through
/// [`NodeName::new`], so an empty name in a request body is rejected before
/// anything reaches the store.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct NodeName(String);

impl NodeName {
    /// create a new NodeName, validating the input
    pub fn new(name: impl Into<String>) -> Result<Self, InvalidNameError> {
        let name = name.into();
        if name.is_empty() {
            return Err(InvalidNameError::Empty);
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for NodeName {
    type Error = InvalidNameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<NodeName> for String {
    fn from(name: NodeName) -> Self {
        name.0
    }
}

impl fmt::Display for NodeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for NodeName {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// error for invalid node names
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum InvalidNameError {
    #[error("name must not be empty")]
    Empty,
}

/// Where the SQLite database lives.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StoreLocation {
    /// private in-memory database, gone when the store is dropped
    Memory,
    /// database file on disk
    File(PathBuf),
}

impl StoreLocation {
    pub fn file(path: impl Into<PathBuf>) -> Self {
        Self::File(path.into())
    }

    /// path of the database file, `None` for in-memory stores
    pub fn path(&self) -> Option<&Path> {
        match self {
            StoreLocation::Memory => None,
            StoreLocation::File(path) => Some(path),
        }
    }
}

impl fmt::Display for StoreLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreLocation::Memory => f.write_str(":memory:"),
            StoreLocation::File(path) => write!(f, "{}", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_names() {
        assert!(NodeName::new("root").is_ok());
        assert!(NodeName::new("a b c").is_ok());
        assert!(NodeName::new("ünïcødé").is_ok());
    }

    #[test]
    fn test_empty_name_rejected() {
        assert_eq!(NodeName::new(""), Err(InvalidNameError::Empty));
    }

    #[test]
    fn test_name_deserialization_validates() {
        let ok: NodeName = serde_json::from_str("\"leaf\"").unwrap();
        assert_eq!(ok.as_str(), "leaf");

        let err = serde_json::from_str::<NodeName>("\"\"").unwrap_err();
        assert!(err.to_string().contains("must not be empty"));
    }

    #[test]
    fn test_node_id_is_transparent_in_json() {
        let id = NodeId::new(42);
        assert_eq!(serde_json::to_string(&id).unwrap(), "42");
        assert_eq!(serde_json::from_str::<NodeId>("7").unwrap(), NodeId::new(7));
    }

    #[test]
    fn test_store_location_display() {
        assert_eq!(StoreLocation::Memory.to_string(), ":memory:");
        assert_eq!(StoreLocation::file("./test.db").to_string(), "./test.db");
        assert!(StoreLocation::Memory.path().is_none());
    }
}
