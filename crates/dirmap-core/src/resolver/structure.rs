use tracing::debug;

use super::{CreationInfo, ResolveInput, Structure, Variant, VariantRegistry};
use crate::errors::{DirError, Result};
use crate::model::path;

/// The universal base marker
pub const MARKER_TOP: &str = "top";

/// Generic marker walk shared by every structure
///
/// Markers are tried most-specific first (reverse declaration order); the
/// first registered one wins. Failed probes are skipped. Falls back to the
/// base variant when `top` is present.
///
/// # Errors
///
/// Returns `DirError::UnknownType` when no marker is registered and `top`
/// is absent (or the base variant is not registered).
pub fn walk(registry: &VariantRegistry, input: &ResolveInput<'_>) -> Result<Variant> {
    let markers = input.entry.object_classes();
    for marker in markers.iter().rev() {
        match registry.lookup_marker(marker) {
            Ok(variant) => return Ok(variant),
            Err(err) => debug!(path = input.path, marker = %marker, error = %err, "skipping class"),
        }
    }
    if markers.iter().any(|m| m == MARKER_TOP) && registry.contains(Variant::Object) {
        return Ok(Variant::Object);
    }
    Err(DirError::UnknownType {
        path: input.path.to_string(),
    })
}

/// LdapStructure - plain marker walk, flat path layout
#[derive(Debug, Clone, Copy, Default)]
pub struct LdapStructure;

impl Structure for LdapStructure {
    fn name(&self) -> &'static str {
        "ldap"
    }

    fn determine_type(
        &self,
        registry: &VariantRegistry,
        input: &ResolveInput<'_>,
    ) -> Result<Variant> {
        walk(registry, input)
    }

    fn generate_uid(&self, _variant: Variant, id: &str, base: &str, _info: &CreationInfo) -> String {
        path::join(id, base)
    }
}
