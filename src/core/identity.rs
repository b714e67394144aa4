//! Synthetic product identifiers
//!
//! Ids are not user-meaningful: the sku is the join key. An id only has to be
//! unique among the products currently in the store, so a bulk load derives
//! every row id from one batch ULID plus the row index.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use ulid::Ulid;

/// Prefix carried by every generated id
pub const ID_PREFIX: &str = "PRD";

/// Identifier assigned to a product at ingestion or creation time
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ProductId(String);

impl ProductId {
    /// Generate a fresh, globally unique id (`PRD-<ULID>`)
    pub fn new() -> Self {
        Self(format!("{}-{}", ID_PREFIX, Ulid::new()))
    }

    /// Id for row `row` of the ingestion batch stamped `batch`
    ///
    /// Unique within one batch only.
    pub fn for_row(batch: Ulid, row: usize) -> Self {
        Self(format!("{}-{}-{}", ID_PREFIX, batch, row))
    }

    /// Wrap an id supplied by an external source as-is
    pub fn from_external(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The batch ULID this id was generated from, if it is one of ours
    pub fn ulid(&self) -> Option<Ulid> {
        let rest = self.0.strip_prefix(ID_PREFIX)?.strip_prefix('-')?;
        let ulid_part = rest.split('-').next()?;
        Ulid::from_string(ulid_part).ok()
    }
}

impl Default for ProductId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for ProductId {
    type Err = IdParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(IdParseError::Empty);
        }
        Ok(Self(trimmed.to_string()))
    }
}

impl Serialize for ProductId {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.0)
    }
}

/// Catalog exports written by other tools carry numeric ids (epoch millis)
#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Text(String),
    Unsigned(u64),
    Signed(i64),
    Float(f64),
}

impl<'de> Deserialize<'de> for ProductId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        match RawId::deserialize(deserializer)? {
            RawId::Text(s) if s.trim().is_empty() => Ok(Self::new()),
            RawId::Text(s) => s.parse().map_err(serde::de::Error::custom),
            RawId::Unsigned(n) => Ok(Self(n.to_string())),
            RawId::Signed(n) => Ok(Self(n.to_string())),
            RawId::Float(n) => Ok(Self(n.to_string())),
        }
    }
}

/// Errors that can occur when parsing product ids
#[derive(Debug, Error)]
pub enum IdParseError {
    #[error("product id must not be empty")]
    Empty,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_product_id_generation() {
        let id = ProductId::new();
        assert!(id.as_str().starts_with("PRD-"));
        assert_eq!(id.as_str().len(), 30); // PRD- (4) + ULID (26)
        assert!(id.ulid().is_some());
    }

    #[test]
    fn test_fresh_ids_differ() {
        assert_ne!(ProductId::new(), ProductId::new());
    }

    #[test]
    fn test_row_ids_unique_within_batch() {
        let batch = Ulid::new();
        let a = ProductId::for_row(batch, 1);
        let b = ProductId::for_row(batch, 2);
        assert_ne!(a, b);
        assert_eq!(a.ulid(), Some(batch));
        assert!(b.as_str().ends_with("-2"));
    }

    #[test]
    fn test_external_id_has_no_ulid() {
        let id = ProductId::from_external("1718900000000");
        assert_eq!(id.ulid(), None);
    }

    #[test]
    fn test_empty_id_rejected() {
        let err = "  ".parse::<ProductId>().unwrap_err();
        assert!(matches!(err, IdParseError::Empty));
    }

    #[test]
    fn test_deserialize_numeric_id() {
        let id: ProductId = serde_json::from_str("1718900000001").unwrap();
        assert_eq!(id.as_str(), "1718900000001");

        let id: ProductId = serde_json::from_str("\"PRD-abc\"").unwrap();
        assert_eq!(id.as_str(), "PRD-abc");
    }
}
