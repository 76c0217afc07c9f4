//! Attribute-definition cache
//!
//! [`SchemaCache`] lives as long as the [`crate::server::Server`] that owns
//! it. Definitions are computed on first use per variant and never
//! invalidated.

use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use crate::errors::Result;
use crate::resolver::{Variant, VariantDef};
use crate::transport::{SchemaKind, Transport};

/// Required and supported attribute names of one variant
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeDefinitions {
    pub required: Vec<String>,
    pub supported: Vec<String>,
}

impl AttributeDefinitions {
    fn add_required(&mut self, name: &str) {
        let name = name.to_lowercase();
        if !self.required.contains(&name) {
            self.required.push(name.clone());
        }
        self.add_supported(&name);
    }

    fn add_supported(&mut self, name: &str) {
        let name = name.to_lowercase();
        if !self.supported.contains(&name) {
            self.supported.push(name);
        }
    }

    pub fn is_supported(&self, name: &str) -> bool {
        self.supported.contains(&name.to_lowercase())
    }
}

#[derive(Debug, Default)]
pub struct SchemaCache {
    definitions: RefCell<HashMap<Variant, Rc<AttributeDefinitions>>>,
}

impl SchemaCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Definitions of `def`'s variant, computing them on first use
    ///
    /// With a transport, the `must`/`may` lists of each object class are
    /// merged in.
    ///
    /// # Errors
    ///
    /// Propagates schema lookup failures from the transport.
    pub fn definitions(
        &self,
        def: &VariantDef,
        transport: Option<&dyn Transport>,
    ) -> Result<Rc<AttributeDefinitions>> {
        if let Some(cached) = self.definitions.borrow().get(&def.variant) {
            return Ok(cached.clone());
        }

        let mut computed = AttributeDefinitions::default();
        for name in &def.required_attributes {
            computed.add_required(name);
        }
        for name in def.internal_names() {
            computed.add_supported(&name);
        }
        if let Some(transport) = transport {
            for class in &def.object_classes {
                let schema = transport.schema(SchemaKind::ObjectClass, class)?;
                for name in &schema.must {
                    computed.add_required(name);
                }
                for name in &schema.may {
                    computed.add_supported(name);
                }
            }
        }

        let computed = Rc::new(computed);
        self.definitions
            .borrow_mut()
            .insert(def.variant, computed.clone());
        Ok(computed)
    }

    /// Number of cached variants
    pub fn len(&self) -> usize {
        self.definitions.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.definitions.borrow().is_empty()
    }
}
