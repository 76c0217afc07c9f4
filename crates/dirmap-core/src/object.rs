//! Directory record facade
//!
//! A [`DirectoryObject`] is a typed view over one raw entry. Reads and
//! writes go through the attribute chains declared by the object's
//! [`VariantDef`]; persistence is left to [`crate::server::Server`].

use std::rc::Rc;

use crate::attribute::{Attribute, Decoration};
use crate::criteria::Criteria;
use crate::errors::{DirError, Result};
use crate::model::value::{values_are_empty, Value};
use crate::model::{path, RawEntry, RawMap, ATTRIBUTE_OC};
use crate::resolver::{Variant, VariantDef};

/// Attribute listing the members of a group
pub const ATTRIBUTE_MEMBER: &str = "member";

#[derive(Debug, Clone)]
pub struct DirectoryObject {
    path: String,
    def: Rc<VariantDef>,
    entry: RawEntry,
    exists: bool,
    changes: RawMap,
}

impl DirectoryObject {
    /// View over an entry that exists in the store
    pub fn new(def: Rc<VariantDef>, path: impl Into<String>, entry: RawEntry) -> Self {
        Self {
            path: path.into(),
            def,
            entry,
            exists: true,
            changes: RawMap::new(),
        }
    }

    /// A new object, not yet written; `changes` are keyed by external names
    pub fn create(def: Rc<VariantDef>, path: impl Into<String>, changes: RawMap) -> Self {
        Self {
            path: path.into(),
            def,
            entry: RawEntry::new(),
            exists: false,
            changes: lowercase_keys(changes),
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn variant(&self) -> Variant {
        self.def.variant
    }

    pub fn def(&self) -> &VariantDef {
        &self.def
    }

    pub fn entry(&self) -> &RawEntry {
        &self.entry
    }

    /// Whether the object has been written to the store
    pub fn exists(&self) -> bool {
        self.exists
    }

    /// Pending changes, keyed by external name
    pub fn changes(&self) -> &RawMap {
        &self.changes
    }

    /// Lower-cased class markers of the entry
    pub fn object_classes(&self) -> Vec<String> {
        self.entry.object_classes()
    }

    /// Bind the decorator chain of a declared attribute
    ///
    /// # Errors
    ///
    /// Returns `DirError::Attribute` for attributes the variant does not declare.
    pub fn attribute(&self, external: &str) -> Result<Box<dyn Attribute + '_>> {
        self.def
            .attribute(external)
            .map(|spec| spec.bind(self))
            .ok_or_else(|| unsupported(external, self.def.variant))
    }

    /// Value of a declared attribute
    ///
    /// # Errors
    ///
    /// Returns `DirError::Attribute` for undeclared attributes and coercion failures.
    pub fn get(&self, external: &str) -> Result<Value> {
        self.attribute(external)?.value()
    }

    /// Record a pending write; nothing is stored until the object is saved
    ///
    /// # Errors
    ///
    /// Returns `DirError::Attribute` for undeclared attributes.
    pub fn set<I, S>(&mut self, external: &str, values: I) -> Result<()>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let spec = self
            .def
            .attribute(external)
            .ok_or_else(|| unsupported(external, self.def.variant))?;
        let name = spec.external.clone();
        self.changes
            .insert(name, values.into_iter().map(Into::into).collect());
        Ok(())
    }

    /// Mark an attribute for deletion
    ///
    /// # Errors
    ///
    /// Returns `DirError::Attribute` for undeclared attributes.
    pub fn clear(&mut self, external: &str) -> Result<()> {
        self.set(external, Vec::<String>::new())
    }

    /// Run the pending changes through every declared attribute
    ///
    /// Returns the store-native map to write. New objects get the variant's
    /// object classes and are checked for required attributes.
    ///
    /// # Errors
    ///
    /// Returns `DirError::Attribute` for rejected values, unsupported
    /// leftovers, or missing required attributes.
    pub fn prepare_changes(&self) -> Result<RawMap> {
        let bound: Vec<Box<dyn Attribute + '_>> =
            self.def.attributes.iter().map(|spec| spec.bind(self)).collect();

        let mut raw = RawMap::new();
        for attribute in &bound {
            for (name, values) in attribute.update(&self.changes)? {
                raw.insert(name, values);
            }
        }

        let mut leftovers = self.changes.clone();
        for attribute in &bound {
            attribute.consume(&mut leftovers);
        }
        if let Some(name) = leftovers.keys().next() {
            return Err(unsupported(name, self.def.variant));
        }

        if !self.exists {
            raw.insert(ATTRIBUTE_OC.to_string(), self.def.object_classes.clone());
            for required in &self.def.required_attributes {
                let present = raw
                    .get(required)
                    .map(|values| !values_are_empty(values))
                    .unwrap_or(false);
                if !present {
                    return Err(DirError::attribute(
                        required.as_str(),
                        "required attribute is missing",
                    ));
                }
            }
        }
        Ok(raw)
    }

    /// Fold a successful write back into the cached entry
    pub fn apply_saved(&mut self, written: &RawMap) {
        for (name, values) in written {
            if values_are_empty(values) {
                self.entry.remove(name);
            } else {
                self.entry.set(name, values.clone());
            }
        }
        self.exists = true;
        self.changes.clear();
    }

    /// Listing filter of a variant: its class marker AND-ed with the caller's predicate
    pub fn list_filter(def: &VariantDef, predicate: Option<Criteria>) -> Criteria {
        let mut parts = vec![Criteria::equals(ATTRIBUTE_OC, &def.filter_class)];
        parts.extend(def.extra_filter.clone());
        parts.extend(predicate.filter(|p| !p.is_empty()));
        Criteria::and(parts)
    }

    /// Attributes to fetch for a variant, or the caller's override
    pub fn projection(def: &VariantDef, requested: Option<&[String]>) -> Vec<String> {
        match requested {
            Some(names) if !names.is_empty() => names.iter().map(|n| n.to_lowercase()).collect(),
            _ => def.internal_names(),
        }
    }

    /// Identifier for a new object: `<id attribute>=<value>`
    ///
    /// Falls back to composing derived attributes stored under the id
    /// attribute, e.g. a full name from given name and surname.
    ///
    /// # Errors
    ///
    /// Returns `DirError::Attribute` if no value for the id attribute can be found.
    pub fn generate_id(def: &VariantDef, changes: &RawMap) -> Result<String> {
        let key = def.id_attribute.as_str();
        let lookup = |name: &str| {
            changes
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(name))
                .and_then(|(_, values)| values.iter().find(|v| !v.is_empty()).cloned())
        };
        let direct = def
            .attributes
            .iter()
            .filter(|spec| spec.internal == key)
            .find_map(|spec| lookup(&spec.external));
        let composed = || {
            def.attributes
                .iter()
                .filter(|spec| spec.internal == key)
                .flat_map(|spec| spec.decorations.iter())
                .find_map(|decoration| match decoration {
                    Decoration::Derive(rule) => rule.compose(lookup),
                    _ => None,
                })
        };
        direct
            .or_else(composed)
            .map(|value| format!("{}={}", key, escape_rdn_value(&value)))
            .ok_or_else(|| DirError::attribute(key, "cannot derive an identifier"))
    }

    /// Member paths of a group entry
    pub fn members(&self) -> Vec<String> {
        self.entry
            .get(ATTRIBUTE_MEMBER)
            .unwrap_or_default()
            .iter()
            .filter(|m| !m.is_empty())
            .cloned()
            .collect()
    }

    pub fn is_member(&self, member: &str) -> bool {
        self.entry
            .get(ATTRIBUTE_MEMBER)
            .unwrap_or_default()
            .iter()
            .any(|m| path::same(m, member))
    }
}

fn unsupported(name: &str, variant: Variant) -> DirError {
    DirError::attribute(name, format!("not supported by object type '{}'", variant))
}

fn lowercase_keys(changes: RawMap) -> RawMap {
    changes
        .into_iter()
        .map(|(name, values)| (name.to_lowercase(), values))
        .collect()
}

/// Escape the characters that would split a path segment
fn escape_rdn_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, ',' | '+' | '"' | '\\' | '<' | '>' | ';' | '=') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}
