use super::catalogue::{GROUP_ADMIN, GROUP_DOMAIN_MAINTAINER, GROUP_MAINTAINER};
use super::structure::walk;
use super::{CreationInfo, ResolveInput, Structure, UserKind, Variant, VariantRegistry};
use crate::errors::Result;
use crate::model::path;

/// Container of external addresses
pub const CONTAINER_EXTERNAL: &str = "cn=external";
pub const CONTAINER_INTERNAL: &str = "cn=internal";
pub const CONTAINER_GROUPS: &str = "cn=groups";
pub const CONTAINER_RESOURCES: &str = "cn=resources";

const MARKER_KOLAB_PERSON: &str = "kolabinetorgperson";
const MARKER_INET_PERSON: &str = "inetorgperson";
const MARKER_KOLAB_GROUP: &str = "kolabgroupofnames";
const MARKER_POP3: &str = "kolabexternalpop3account";
const MARKER_SHARED_FOLDER: &str = "kolabsharedfolder";

/// KolabStructure - Kolab tree layout
///
/// Refines the generic walk. Rules are checked in this order:
/// 1. a person living below `cn=external` is an [`Variant::Address`]
/// 2. membership in a role group selects the role variant
/// 3. Kolab class markers
/// 4. the generic walk
#[derive(Debug, Clone, Copy, Default)]
pub struct KolabStructure;

impl KolabStructure {
    fn role_by_group(input: &ResolveInput<'_>) -> Option<Variant> {
        let roles = [
            (GROUP_ADMIN, Variant::Administrator),
            (GROUP_MAINTAINER, Variant::Maintainer),
            (GROUP_DOMAIN_MAINTAINER, Variant::DomainMaintainer),
        ];
        roles.into_iter().find_map(|(group, variant)| {
            let group = path::join(group, input.base);
            input
                .groups
                .iter()
                .any(|g| path::same(g, &group))
                .then_some(variant)
        })
    }

    fn is_external(input: &ResolveInput<'_>, markers: &[String]) -> bool {
        let person = markers
            .iter()
            .any(|m| m == MARKER_KOLAB_PERSON || m == MARKER_INET_PERSON);
        let container = path::parent(input.path).unwrap_or_default();
        person && path::has_segment(&path::relative_to(&container, input.base), CONTAINER_EXTERNAL)
    }
}

impl Structure for KolabStructure {
    fn name(&self) -> &'static str {
        "kolab"
    }

    fn determine_type(
        &self,
        registry: &VariantRegistry,
        input: &ResolveInput<'_>,
    ) -> Result<Variant> {
        let markers = input.entry.object_classes();
        let has = |marker: &str| markers.iter().any(|m| m == marker);

        let refined = if Self::is_external(input, &markers) {
            Some(Variant::Address)
        } else if let Some(role) = Self::role_by_group(input) {
            Some(role)
        } else if has(MARKER_KOLAB_PERSON) {
            Some(Variant::User)
        } else if has(MARKER_KOLAB_GROUP) {
            if input.entry.first("mail").is_some() {
                Some(Variant::DistList)
            } else {
                Some(Variant::KolabGroupOfNames)
            }
        } else if has(MARKER_POP3) {
            Some(Variant::KolabPop3Account)
        } else if has(MARKER_SHARED_FOLDER) {
            Some(Variant::KolabSharedFolder)
        } else {
            None
        };

        match refined {
            Some(variant) if registry.contains(variant) => Ok(variant),
            _ => walk(registry, input),
        }
    }

    fn generate_uid(&self, variant: Variant, id: &str, base: &str, info: &CreationInfo) -> String {
        let container = match variant {
            Variant::User => match info.kind {
                Some(UserKind::Internal) => Some(CONTAINER_INTERNAL),
                Some(UserKind::Group) => Some(CONTAINER_GROUPS),
                Some(UserKind::Resource) => Some(CONTAINER_RESOURCES),
                Some(UserKind::Standard) | None => None,
            },
            Variant::Address => Some(CONTAINER_EXTERNAL),
            Variant::KolabGroupOfNames | Variant::DistList if info.visible == Some(false) => {
                Some(CONTAINER_INTERNAL)
            }
            _ => None,
        };
        match container {
            Some(container) => path::join(&path::join(id, container), base),
            None => path::join(id, base),
        }
    }

    fn needs_groups(&self) -> bool {
        true
    }
}
