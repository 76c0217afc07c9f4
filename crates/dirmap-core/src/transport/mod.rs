//! Transport seam
//!
//! The wire-level directory client lives behind [`Transport`]. The mapping
//! layer never speaks the store's protocol itself. [`MemoryTransport`] is
//! the in-process implementation used by tests and the CLI.

pub mod filter;
pub mod memory;

pub use memory::MemoryTransport;

use serde::{Deserialize, Serialize};

use crate::errors::Result;
use crate::model::value::values_are_empty;
use crate::model::{RawEntry, RawMap};

/// Search depth below the base
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    /// The base entry only
    Base,
    /// Direct children of the base
    One,
    /// The base and everything below it
    #[default]
    Sub,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchOptions {
    pub scope: Scope,
    /// Attribute projection; `None` returns every attribute
    pub attributes: Option<Vec<String>>,
}

impl SearchOptions {
    pub fn with_scope(mut self, scope: Scope) -> Self {
        self.scope = scope;
        self
    }

    pub fn with_attributes(mut self, attributes: Vec<String>) -> Self {
        self.attributes = Some(attributes);
        self
    }
}

/// One search hit
pub type SearchHit = (String, RawEntry);

/// Modification - the payload of a modify call
///
/// A field is never in both lists.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Modification {
    pub delete: Vec<String>,
    pub replace: RawMap,
}

impl Modification {
    /// Split changes: fields whose every value is empty move to `delete`
    pub fn from_changes(changes: RawMap) -> Self {
        let mut modification = Modification::default();
        for (name, values) in changes {
            if values_are_empty(&values) {
                modification.delete.push(name);
            } else {
                modification.replace.insert(name, values);
            }
        }
        modification
    }

    pub fn is_empty(&self) -> bool {
        self.delete.is_empty() && self.replace.is_empty()
    }
}

/// Kind of a schema element
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SchemaKind {
    ObjectClass,
    AttributeType,
}

/// One schema element as reported by the store
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SchemaDefinition {
    pub name: String,
    #[serde(default)]
    pub sup: Vec<String>,
    #[serde(default)]
    pub must: Vec<String>,
    #[serde(default)]
    pub may: Vec<String>,
    #[serde(default)]
    pub single_value: bool,
}

/// Transport - the narrow interface to the backing store
///
/// Failures surface as `DirError::Transport` with the store's message
/// unmodified, or `DirError::NotFound` for missing entries.
pub trait Transport {
    /// # Errors
    ///
    /// Returns `DirError::Transport` when the store rejects the search.
    fn search(&self, base: &str, filter: &str, options: &SearchOptions) -> Result<Vec<SearchHit>>;

    /// # Errors
    ///
    /// Returns `DirError::NotFound` if no entry exists at `path`.
    fn read(&self, path: &str, attributes: Option<&[String]>) -> Result<RawEntry>;

    /// # Errors
    ///
    /// Returns `DirError::Transport` when the store rejects the entry.
    fn add(&mut self, path: &str, entry: &RawEntry) -> Result<()>;

    /// # Errors
    ///
    /// Returns `DirError::NotFound` if no entry exists at `path`.
    fn modify(&mut self, path: &str, modification: &Modification) -> Result<()>;

    /// # Errors
    ///
    /// Returns `DirError::NotFound` for unknown schema elements.
    fn schema(&self, kind: SchemaKind, name: &str) -> Result<SchemaDefinition>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_modify_split_moves_empty_fields_to_delete() {
        let mut changes = RawMap::new();
        changes.insert("mail".to_string(), vec![String::new()]);
        changes.insert("sn".to_string(), vec!["Doe".to_string()]);
        changes.insert("alias".to_string(), Vec::new());

        let modification = Modification::from_changes(changes);
        assert_eq!(modification.delete, vec!["alias".to_string(), "mail".to_string()]);
        assert_eq!(modification.replace.len(), 1);
        assert!(modification.replace.contains_key("sn"));
    }
}
