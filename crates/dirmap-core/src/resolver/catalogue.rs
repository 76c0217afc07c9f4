//! The standard variant catalogue of a Kolab directory

use super::{Variant, VariantDef, VariantRegistry};
use crate::attribute::{AttributeSpec, Decoration, DeriveRule};
use crate::criteria::Criteria;

/// Paths of the well-known role groups, relative to the base
pub const GROUP_ADMIN: &str = "cn=admin,cn=internal";
pub const GROUP_MAINTAINER: &str = "cn=maintainer,cn=internal";
pub const GROUP_DOMAIN_MAINTAINER: &str = "cn=domain-maintainer,cn=internal";

const PERSON_CLASSES: [&str; 2] = ["top", "person"];
const ORG_PERSON_CLASSES: [&str; 3] = ["top", "person", "organizationalPerson"];
const INET_PERSON_CLASSES: [&str; 4] = ["top", "person", "organizationalPerson", "inetOrgPerson"];
const KOLAB_PERSON_CLASSES: [&str; 5] = [
    "top",
    "person",
    "organizationalPerson",
    "inetOrgPerson",
    "kolabInetOrgPerson",
];

fn read_only(name: &str) -> AttributeSpec {
    AttributeSpec::new(name).decorate(Decoration::ReadOnly)
}

fn object_attributes() -> Vec<AttributeSpec> {
    vec![
        read_only("objectclass"),
        read_only("createtimestamp"),
        AttributeSpec::new("createtimestampdate")
            .stored_as("createtimestamp")
            .decorate(Decoration::TimestampDate)
            .decorate(Decoration::ReadOnly),
        read_only("modifytimestamp"),
    ]
}

fn person_attributes() -> Vec<AttributeSpec> {
    let mut attributes = object_attributes();
    attributes.extend([
        AttributeSpec::new("cn"),
        AttributeSpec::new("sn"),
        AttributeSpec::new("userpassword"),
        AttributeSpec::new("fn")
            .stored_as("cn")
            .decorate(Decoration::Derive(DeriveRule::strip_surname("sn")))
            .decorate(Decoration::ReadOnly),
    ]);
    attributes
}

fn org_person_attributes() -> Vec<AttributeSpec> {
    let mut attributes = person_attributes();
    attributes.extend([
        AttributeSpec::new("telephonenumber"),
        AttributeSpec::new("postaladdress"),
    ]);
    attributes
}

fn inet_person_attributes() -> Vec<AttributeSpec> {
    let mut attributes = org_person_attributes();
    attributes.extend([
        AttributeSpec::new("givenname"),
        AttributeSpec::new("mail"),
        AttributeSpec::new("uid"),
        AttributeSpec::new("fullname")
            .stored_as("cn")
            .decorate(Decoration::Derive(DeriveRule::join(&["givenname", "sn"], " "))),
    ]);
    attributes
}

fn kolab_person_attributes() -> Vec<AttributeSpec> {
    let mut attributes = inet_person_attributes();
    attributes.extend([
        AttributeSpec::new("alias"),
        AttributeSpec::new("kolabhomeserver"),
        AttributeSpec::new("cyrus-userquota").decorate(Decoration::Integer),
        AttributeSpec::new("kolabdelegate"),
        AttributeSpec::new("kolabinvitationpolicy"),
    ]);
    attributes
}

fn user_attributes() -> Vec<AttributeSpec> {
    let mut attributes = kolab_person_attributes();
    if let Some(policy) = attributes
        .iter_mut()
        .find(|spec| spec.external == "kolabinvitationpolicy")
    {
        policy
            .decorations
            .push(Decoration::Default(vec!["ACT_MANUAL".to_string()]));
    }
    attributes
}

fn group_attributes() -> Vec<AttributeSpec> {
    let mut attributes = object_attributes();
    attributes.extend([AttributeSpec::new("cn"), AttributeSpec::new("member")]);
    attributes
}

fn kolab_group_attributes() -> Vec<AttributeSpec> {
    let mut attributes = group_attributes();
    attributes.push(AttributeSpec::new("mail"));
    attributes
}

/// The catalogue entry of one variant
pub fn definition(variant: Variant) -> VariantDef {
    match variant {
        Variant::Object => VariantDef::new(variant, &["top"])
            .with_marker("top")
            .with_attributes(object_attributes()),
        Variant::GroupOfNames => VariantDef::new(variant, &["top", "groupOfNames"])
            .with_marker("groupofnames")
            .with_sort_by("cn")
            .with_required(&["cn"])
            .with_attributes(group_attributes()),
        Variant::Person => VariantDef::new(variant, &PERSON_CLASSES)
            .with_marker("person")
            .with_sort_by("cn")
            .with_required(&["cn", "sn"])
            .with_attributes(person_attributes()),
        Variant::OrganizationalPerson => VariantDef::new(variant, &ORG_PERSON_CLASSES)
            .with_marker("organizationalperson")
            .with_sort_by("cn")
            .with_required(&["cn", "sn"])
            .with_attributes(org_person_attributes()),
        Variant::InetOrgPerson => VariantDef::new(variant, &INET_PERSON_CLASSES)
            .with_marker("inetorgperson")
            .with_sort_by("cn")
            .with_required(&["cn", "sn"])
            .with_attributes(inet_person_attributes()),
        Variant::KolabServer => VariantDef::new(variant, &["top", "kolab"])
            .with_marker("kolab")
            .with_sort_by("k")
            .with_required(&["k"])
            .with_id_attribute("k")
            .with_attributes({
                let mut attributes = object_attributes();
                attributes.extend([AttributeSpec::new("k"), AttributeSpec::new("kolabhost")]);
                attributes
            }),
        Variant::KolabInetOrgPerson => VariantDef::new(variant, &KOLAB_PERSON_CLASSES)
            .with_marker("kolabinetorgperson")
            .with_sort_by("cn")
            .with_required(&["cn", "sn"])
            .with_attributes(kolab_person_attributes()),
        Variant::KolabGermanBankArrangement => {
            VariantDef::new(variant, &["top", "kolabGermanBankArrangement"])
                .with_marker("kolabgermanbankarrangement")
                .with_required(&["uid", "kolabbankaccountnumber", "kolabbankcode"])
                .with_id_attribute("kolabbankaccountnumber")
                .with_attributes({
                    let mut attributes = object_attributes();
                    attributes.extend([
                        AttributeSpec::new("uid"),
                        AttributeSpec::new("kolabbankaccountnumber"),
                        AttributeSpec::new("kolabbankcode"),
                        AttributeSpec::new("kolabbankname"),
                    ]);
                    attributes
                })
        }
        Variant::KolabPop3Account => VariantDef::new(variant, &["top", "kolabExternalPop3Account"])
            .with_marker("kolabexternalpop3account")
            .with_required(&["mail", "externalpop3accountserver"])
            .with_id_attribute("mail")
            .with_attributes({
                let mut attributes = object_attributes();
                attributes.extend([
                    AttributeSpec::new("mail"),
                    AttributeSpec::new("externalpop3accountserver"),
                    AttributeSpec::new("externalpop3accountport").decorate(Decoration::Integer),
                    AttributeSpec::new("externalpop3accountlogin"),
                    AttributeSpec::new("externalpop3accountpassword"),
                ]);
                attributes
            }),
        Variant::KolabGroupOfNames => VariantDef::new(variant, &["top", "kolabGroupOfNames"])
            .with_marker("kolabgroupofnames")
            .with_sort_by("cn")
            .with_required(&["cn"])
            .with_attributes(kolab_group_attributes()),
        Variant::KolabSharedFolder => VariantDef::new(variant, &["top", "kolabSharedFolder"])
            .with_marker("kolabsharedfolder")
            .with_sort_by("cn")
            .with_required(&["cn"])
            .with_attributes({
                let mut attributes = object_attributes();
                attributes.extend([
                    AttributeSpec::new("cn"),
                    AttributeSpec::new("kolabhomeserver"),
                    AttributeSpec::new("kolabfoldertype"),
                    AttributeSpec::new("acl"),
                ]);
                attributes
            }),
        Variant::Address => VariantDef::new(variant, &KOLAB_PERSON_CLASSES)
            .with_sort_by("sn")
            .with_required(&["cn", "sn"])
            .with_attributes(inet_person_attributes()),
        Variant::Administrator => VariantDef::new(variant, &KOLAB_PERSON_CLASSES)
            .with_sort_by("cn")
            .with_required(&["cn", "sn"])
            .with_attributes(kolab_person_attributes()),
        Variant::Maintainer => VariantDef::new(variant, &KOLAB_PERSON_CLASSES)
            .with_sort_by("cn")
            .with_required(&["cn", "sn"])
            .with_attributes(kolab_person_attributes()),
        Variant::DomainMaintainer => VariantDef::new(variant, &KOLAB_PERSON_CLASSES)
            .with_sort_by("cn")
            .with_required(&["cn", "sn"])
            .with_attributes({
                let mut attributes = kolab_person_attributes();
                attributes.push(AttributeSpec::new("domain"));
                attributes
            }),
        Variant::DistList => VariantDef::new(variant, &["top", "kolabGroupOfNames"])
            .with_extra_filter(Criteria::contains("mail", "@"))
            .with_sort_by("mail")
            .with_required(&["cn", "mail"])
            .with_attributes(kolab_group_attributes()),
        // Same markers as the other Kolab persons: a user listing also
        // yields addresses and maintainers, tagged as users
        Variant::User => VariantDef::new(variant, &KOLAB_PERSON_CLASSES)
            .with_sort_by("cn")
            .with_required(&["cn", "sn"])
            .with_required_group(GROUP_ADMIN)
            .with_attributes(user_attributes()),
    }
}

/// Registry with every catalogued variant
pub fn standard() -> VariantRegistry {
    Variant::ALL
        .into_iter()
        .fold(VariantRegistry::new(), |registry, variant| {
            registry.with(definition(variant))
        })
}

impl VariantRegistry {
    /// Shorthand for [`standard`]
    pub fn standard() -> Self {
        standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_structure_only_variants_have_no_marker() {
        for variant in [
            Variant::Address,
            Variant::Administrator,
            Variant::DistList,
            Variant::DomainMaintainer,
            Variant::Maintainer,
            Variant::User,
        ] {
            assert!(definition(variant).marker.is_none(), "{}", variant);
        }
    }

    #[test]
    fn test_every_variant_is_registered() {
        let registry = standard();
        assert_eq!(registry.variants().len(), Variant::ALL.len());
        assert_eq!(
            registry.lookup_marker("kolabexternalpop3account").unwrap(),
            Variant::KolabPop3Account
        );
    }

    #[test]
    fn test_person_sorts_by_cn_and_requires_surname() {
        let def = definition(Variant::Person);
        assert_eq!(def.sort_by.as_deref(), Some("cn"));
        assert_eq!(def.required_attributes, vec!["cn", "sn"]);
        assert_eq!(definition(Variant::KolabServer).sort_by.as_deref(), Some("k"));
    }

    #[test]
    fn test_derived_attributes_store_into_cn() {
        let def = definition(Variant::InetOrgPerson);
        assert_eq!(def.attribute("fullname").map(|a| a.internal.as_str()), Some("cn"));
        assert_eq!(def.attribute("fn").map(|a| a.internal.as_str()), Some("cn"));
        assert!(def.internal_names().iter().filter(|n| *n == "cn").count() == 1);
    }
}
