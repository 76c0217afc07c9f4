use std::collections::HashMap;
use std::rc::Rc;

use super::Variant;
use crate::attribute::AttributeSpec;
use crate::criteria::Criteria;
use crate::errors::{DirError, Result};

/// VariantDef - everything the mapping layer knows about one variant
#[derive(Debug, Clone)]
pub struct VariantDef {
    pub variant: Variant,
    /// Class marker that selects this variant in the generic walk
    pub marker: Option<String>,
    /// Classes written to new entries, in declaration order
    pub object_classes: Vec<String>,
    /// Class used in this variant's listing filter
    pub filter_class: String,
    /// Additional listing predicate
    pub extra_filter: Option<Criteria>,
    pub sort_by: Option<String>,
    pub required_attributes: Vec<String>,
    pub attributes: Vec<AttributeSpec>,
    /// Group (relative to the base) whose members are dropped from listings
    pub required_group: Option<String>,
    /// Attribute whose value names new objects (`<id_attribute>=<value>`)
    pub id_attribute: String,
}

impl VariantDef {
    /// A definition with the given object classes; the last one is the filter class
    pub fn new(variant: Variant, object_classes: &[&str]) -> Self {
        let object_classes: Vec<String> = object_classes.iter().map(|c| c.to_string()).collect();
        let filter_class = object_classes
            .last()
            .map(|c| c.to_lowercase())
            .unwrap_or_else(|| "top".to_string());
        Self {
            variant,
            marker: None,
            object_classes,
            filter_class,
            extra_filter: None,
            sort_by: None,
            required_attributes: Vec::new(),
            attributes: Vec::new(),
            required_group: None,
            id_attribute: "cn".to_string(),
        }
    }

    pub fn with_marker(mut self, marker: &str) -> Self {
        self.marker = Some(marker.to_lowercase());
        self
    }

    pub fn with_extra_filter(mut self, filter: Criteria) -> Self {
        self.extra_filter = Some(filter);
        self
    }

    pub fn with_sort_by(mut self, attribute: &str) -> Self {
        self.sort_by = Some(attribute.to_lowercase());
        self
    }

    pub fn with_required(mut self, attributes: &[&str]) -> Self {
        self.required_attributes = attributes.iter().map(|a| a.to_lowercase()).collect();
        self
    }

    pub fn with_attributes(mut self, attributes: Vec<AttributeSpec>) -> Self {
        self.attributes = attributes;
        self
    }

    pub fn with_required_group(mut self, group: &str) -> Self {
        self.required_group = Some(group.to_string());
        self
    }

    pub fn with_id_attribute(mut self, attribute: &str) -> Self {
        self.id_attribute = attribute.to_lowercase();
        self
    }

    /// Declared attribute by external name
    pub fn attribute(&self, external: &str) -> Option<&AttributeSpec> {
        let external = external.to_lowercase();
        self.attributes.iter().find(|spec| spec.external == external)
    }

    /// Internal names of all declared attributes, deduplicated
    pub fn internal_names(&self) -> Vec<String> {
        let mut names: Vec<String> = Vec::new();
        for spec in &self.attributes {
            if !names.contains(&spec.internal) {
                names.push(spec.internal.clone());
            }
        }
        names
    }
}

/// VariantRegistry - variant tag → definition, plus a marker index
#[derive(Debug, Clone, Default)]
pub struct VariantRegistry {
    defs: HashMap<Variant, Rc<VariantDef>>,
    by_marker: HashMap<String, Variant>,
}

impl VariantRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a definition
    pub fn register(&mut self, def: VariantDef) {
        if let Some(marker) = &def.marker {
            self.by_marker.insert(marker.clone(), def.variant);
        }
        self.defs.insert(def.variant, Rc::new(def));
    }

    /// Builder-style [`VariantRegistry::register`]
    pub fn with(mut self, def: VariantDef) -> Self {
        self.register(def);
        self
    }

    /// Definition of a variant
    ///
    /// # Errors
    ///
    /// Returns `DirError::InvalidInput` if the variant is not registered.
    pub fn get(&self, variant: Variant) -> Result<Rc<VariantDef>> {
        self.defs
            .get(&variant)
            .cloned()
            .ok_or_else(|| DirError::InvalidInput {
                message: format!("object type '{}' is not registered", variant),
            })
    }

    pub fn contains(&self, variant: Variant) -> bool {
        self.defs.contains_key(&variant)
    }

    /// Probe one class marker
    ///
    /// # Errors
    ///
    /// Returns `DirError::InvalidInput` when no variant claims the marker.
    pub fn lookup_marker(&self, marker: &str) -> Result<Variant> {
        self.by_marker
            .get(&marker.to_lowercase())
            .copied()
            .ok_or_else(|| DirError::InvalidInput {
                message: format!("no object type registered for class '{}'", marker),
            })
    }

    /// Registered variants in declaration order of [`Variant::ALL`]
    pub fn variants(&self) -> Vec<Variant> {
        Variant::ALL
            .into_iter()
            .filter(|v| self.defs.contains_key(v))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_class_is_most_specific_class() {
        let def = VariantDef::new(Variant::Person, &["top", "Person"]);
        assert_eq!(def.filter_class, "person");
    }

    #[test]
    fn test_marker_lookup() {
        let registry = VariantRegistry::new()
            .with(VariantDef::new(Variant::Person, &["top", "person"]).with_marker("Person"));
        assert_eq!(registry.lookup_marker("PERSON").unwrap(), Variant::Person);
        assert!(registry.lookup_marker("organizationalperson").is_err());
        assert!(registry.get(Variant::User).is_err());
    }
}
