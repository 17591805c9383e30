//! Hierarchical names for addressing entities.
//!
//! A schema is addressed as `metalake.catalog.schema` and a table as
//! `metalake.catalog.schema.table`. The namespace is every level except the
//! last; containment is expressed only through these names.

use crate::error::{Error, Result};
use serde::Serialize;
use std::fmt;

/// Namespace levels of a schema identifier (`metalake`, `catalog`).
pub const SCHEMA_NAMESPACE_LEVELS: usize = 2;

/// Namespace levels of a table identifier (`metalake`, `catalog`, `schema`).
pub const TABLE_NAMESPACE_LEVELS: usize = 3;

/// Characters that separate name parts in dotted identifiers and storage keys.
const RESERVED: [char; 2] = ['.', '/'];

/// Check a single namespace level or name: non-empty, no separator characters.
pub(crate) fn check_name_part(part: &str) -> Result<()> {
    if part.is_empty() || part.contains(RESERVED) {
        return Err(Error::InvalidArgument(format!("invalid name: {:?}", part)));
    }
    Ok(())
}

/// An ordered list of name levels.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct Namespace {
    levels: Vec<String>,
}

impl Namespace {
    /// Create a namespace from levels. Levels must be non-empty and contain
    /// neither `.` nor `/`.
    pub fn of<I, S>(levels: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let levels: Vec<String> = levels.into_iter().map(Into::into).collect();
        for level in &levels {
            check_name_part(level)?;
        }
        Ok(Self { levels })
    }

    /// The empty namespace.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn levels(&self) -> &[String] {
        &self.levels
    }

    pub fn len(&self) -> usize {
        self.levels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// The level at `index`, if any.
    pub fn level(&self, index: usize) -> Option<&str> {
        self.levels.get(index).map(String::as_str)
    }

    /// The last level, if any.
    pub fn last(&self) -> Option<&str> {
        self.levels.last().map(String::as_str)
    }

    /// Fail unless the namespace has exactly `expected` levels.
    pub fn check_levels(&self, expected: usize) -> Result<()> {
        if self.levels.len() != expected {
            return Err(Error::InvalidArgument(format!(
                "namespace `{}` must have {} levels, found {}",
                self,
                expected,
                self.levels.len()
            )));
        }
        Ok(())
    }

    /// Append a level, producing a child namespace.
    pub fn child(&self, level: impl Into<String>) -> Result<Self> {
        let mut levels = self.levels.clone();
        levels.push(level.into());
        Self::of(levels)
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.levels.join("."))
    }
}

/// A namespace plus a name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct NameIdentifier {
    namespace: Namespace,
    name: String,
}

impl NameIdentifier {
    pub fn new(namespace: Namespace, name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        check_name_part(&name)?;
        Ok(Self { namespace, name })
    }

    /// Build an identifier from dotted parts, the last one being the name.
    pub fn of<I, S>(parts: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut levels: Vec<String> = parts.into_iter().map(Into::into).collect();
        let name = levels
            .pop()
            .ok_or_else(|| Error::InvalidArgument("identifier has no parts".to_string()))?;
        Self::new(Namespace::of(levels)?, name)
    }

    /// Parse `a.b.c` into namespace `a.b` and name `c`.
    pub fn parse(s: &str) -> Result<Self> {
        Self::of(s.split('.'))
    }

    pub fn namespace(&self) -> &Namespace {
        &self.namespace
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Namespace that contains this identifier's children.
    pub fn as_namespace(&self) -> Result<Namespace> {
        self.namespace.child(self.name.clone())
    }

    /// Same namespace, different name.
    pub fn with_name(&self, name: impl Into<String>) -> Result<Self> {
        Self::new(self.namespace.clone(), name)
    }
}

impl fmt::Display for NameIdentifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            f.write_str(&self.name)
        } else {
            write!(f, "{}.{}", self.namespace, self.name)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_identifier() {
        let ident = NameIdentifier::parse("lake.hive.sales.orders").unwrap();
        assert_eq!(ident.name(), "orders");
        assert_eq!(ident.namespace().len(), TABLE_NAMESPACE_LEVELS);
        assert_eq!(ident.namespace().last(), Some("sales"));
        assert_eq!(ident.to_string(), "lake.hive.sales.orders");
    }

    #[test]
    fn test_invalid_levels() {
        assert!(Namespace::of(["lake", ""]).is_err());
        assert!(Namespace::of(["la.ke"]).is_err());
        assert!(NameIdentifier::parse("lake..orders").is_err());
        assert!(NameIdentifier::of(Vec::<String>::new()).is_err());
    }

    #[test]
    fn test_separators_rejected_in_names() {
        let ns = Namespace::of(["lake", "hive"]).unwrap();
        assert!(Namespace::of(["lake", "a/x"]).is_err());
        assert!(NameIdentifier::new(ns.clone(), "a/x").is_err());
        assert!(NameIdentifier::new(ns.clone(), "a.x").is_err());
        assert!(NameIdentifier::new(ns.clone(), "").is_err());
        assert!(NameIdentifier::parse("lake.hive.a/x.t").is_err());
        assert!(ns.child("sales").is_ok());
    }

    #[test]
    fn test_as_namespace() {
        let schema = NameIdentifier::parse("lake.hive.sales").unwrap();
        let ns = schema.as_namespace().unwrap();
        assert_eq!(ns.to_string(), "lake.hive.sales");
        assert!(ns.check_levels(TABLE_NAMESPACE_LEVELS).is_ok());
        assert!(ns.check_levels(SCHEMA_NAMESPACE_LEVELS).is_err());
    }
}
