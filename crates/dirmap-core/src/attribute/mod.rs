//! Attribute abstraction
//!
//! An [`Attribute`] is one named value accessor bound to a
//! [`DirectoryObject`]. Pending changes are keyed by external
//! (domain-facing) names; the raw map returned by [`Attribute::update`] is
//! keyed by internal (store-native) names.
//!
//! Decorators wrap exactly one inner attribute, override a subset of the
//! methods and delegate the rest. They are assembled from an
//! [`AttributeSpec`] innermost-first.

pub mod decorators;
pub mod spec;

pub use decorators::{Defaulted, Derived, Integer, ReadOnly, TimestampDate};
pub use spec::{AttributeSpec, Decoration, DeriveRule};

use crate::errors::Result;
use crate::model::value::{values_are_empty, Value};
use crate::model::RawMap;
use crate::object::DirectoryObject;

/// Capability interface for a single named value
pub trait Attribute {
    /// Current value given the bound entry's stored state
    ///
    /// # Errors
    ///
    /// Returns `DirError::Attribute` when a stored value cannot be coerced.
    fn value(&self) -> Result<Value>;

    /// Raw (internal-name keyed) state this attribute contributes for `changes`
    ///
    /// The input is never modified. An attribute not mentioned in `changes`
    /// usually contributes nothing.
    ///
    /// # Errors
    ///
    /// Returns `DirError::Attribute` when a changed value is rejected.
    fn update(&self, changes: &RawMap) -> Result<RawMap>;

    /// Whether `changes` carries no usable value for this attribute
    fn is_empty(&self, changes: &RawMap) -> bool;

    /// Remove this attribute's keys from `changes` once incorporated
    fn consume(&self, changes: &mut RawMap);

    fn object(&self) -> &DirectoryObject;

    fn internal_name(&self) -> &str;

    fn external_name(&self) -> &str;
}

/// Plain - the undecorated base attribute
///
/// Reads the internal key of the bound entry and writes the external key of
/// the change map through to it unchanged.
pub struct Plain<'a> {
    object: &'a DirectoryObject,
    internal: String,
    external: String,
}

impl<'a> Plain<'a> {
    pub fn new(
        object: &'a DirectoryObject,
        internal: impl Into<String>,
        external: impl Into<String>,
    ) -> Self {
        Self {
            object,
            internal: internal.into().to_lowercase(),
            external: external.into().to_lowercase(),
        }
    }
}

impl Attribute for Plain<'_> {
    fn value(&self) -> Result<Value> {
        let stored = self.object.entry().get(&self.internal).unwrap_or_default();
        Ok(Value::from_raw(stored))
    }

    fn update(&self, changes: &RawMap) -> Result<RawMap> {
        let mut raw = RawMap::new();
        if let Some(values) = changes.get(&self.external) {
            raw.insert(self.internal.clone(), values.clone());
        }
        Ok(raw)
    }

    fn is_empty(&self, changes: &RawMap) -> bool {
        changes
            .get(&self.external)
            .map(|values| values_are_empty(values))
            .unwrap_or(true)
    }

    fn consume(&self, changes: &mut RawMap) {
        changes.remove(&self.external);
    }

    fn object(&self) -> &DirectoryObject {
        self.object
    }

    fn internal_name(&self) -> &str {
        &self.internal
    }

    fn external_name(&self) -> &str {
        &self.external
    }
}
