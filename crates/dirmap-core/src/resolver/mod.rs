//! Object-type resolution
//!
//! Maps a raw entry (class markers, group memberships, tree position) to a
//! registered [`Variant`], and generates the path a new object of a given
//! variant should occupy. Dispatch goes through an explicit
//! [`VariantRegistry`]; structure-specific rules live behind the
//! [`Structure`] trait.

pub mod catalogue;
pub mod kolab;
pub mod registry;
pub mod structure;

pub use kolab::KolabStructure;
pub use registry::{VariantDef, VariantRegistry};
pub use structure::LdapStructure;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::errors::{DirError, Result};
use crate::model::RawEntry;

/// Variant - the domain type tag of a directory object
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Variant {
    Object,
    GroupOfNames,
    Person,
    OrganizationalPerson,
    InetOrgPerson,
    KolabServer,
    KolabInetOrgPerson,
    KolabGermanBankArrangement,
    KolabPop3Account,
    KolabGroupOfNames,
    KolabSharedFolder,
    Address,
    Administrator,
    DistList,
    DomainMaintainer,
    Maintainer,
    /// A Kolab person outside the admin group
    ///
    /// Listing users filters on class markers only, so addresses,
    /// maintainers and domain maintainers come back tagged `User` too;
    /// only members of the admin group are left out. Use
    /// [`crate::Server::determine_type`] for a hit's own variant.
    User,
}

impl Variant {
    pub const ALL: [Variant; 17] = [
        Variant::Object,
        Variant::GroupOfNames,
        Variant::Person,
        Variant::OrganizationalPerson,
        Variant::InetOrgPerson,
        Variant::KolabServer,
        Variant::KolabInetOrgPerson,
        Variant::KolabGermanBankArrangement,
        Variant::KolabPop3Account,
        Variant::KolabGroupOfNames,
        Variant::KolabSharedFolder,
        Variant::Address,
        Variant::Administrator,
        Variant::DistList,
        Variant::DomainMaintainer,
        Variant::Maintainer,
        Variant::User,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Variant::Object => "object",
            Variant::GroupOfNames => "groupofnames",
            Variant::Person => "person",
            Variant::OrganizationalPerson => "organizationalperson",
            Variant::InetOrgPerson => "inetorgperson",
            Variant::KolabServer => "kolab",
            Variant::KolabInetOrgPerson => "kolabinetorgperson",
            Variant::KolabGermanBankArrangement => "kolabgermanbankarrangement",
            Variant::KolabPop3Account => "kolabpop3account",
            Variant::KolabGroupOfNames => "kolabgroupofnames",
            Variant::KolabSharedFolder => "kolabsharedfolder",
            Variant::Address => "address",
            Variant::Administrator => "administrator",
            Variant::DistList => "distlist",
            Variant::DomainMaintainer => "domainmaintainer",
            Variant::Maintainer => "maintainer",
            Variant::User => "user",
        }
    }

    /// Parse a variant name, ignoring case, `-` and `_`
    ///
    /// # Errors
    ///
    /// Returns `DirError::InvalidInput` for unknown names.
    pub fn parse(name: &str) -> Result<Variant> {
        let wanted: String = name
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect::<String>()
            .to_lowercase();
        Variant::ALL
            .into_iter()
            .find(|v| v.name() == wanted)
            .ok_or_else(|| DirError::InvalidInput {
                message: format!("unknown object type '{}'", name),
            })
    }
}

impl fmt::Display for Variant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Variant {
    type Err = DirError;

    fn from_str(s: &str) -> Result<Self> {
        Variant::parse(s)
    }
}

/// What the resolver gets to look at
#[derive(Debug, Clone, Copy)]
pub struct ResolveInput<'a> {
    pub path: &'a str,
    pub base: &'a str,
    pub entry: &'a RawEntry,
    /// Paths of the groups the entry is a member of
    pub groups: &'a [String],
}

/// Kind flag of user-like variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UserKind {
    Standard,
    Internal,
    Group,
    Resource,
}

impl FromStr for UserKind {
    type Err = DirError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "standard" | "" => Ok(UserKind::Standard),
            "internal" => Ok(UserKind::Internal),
            "group" => Ok(UserKind::Group),
            "resource" => Ok(UserKind::Resource),
            other => Err(DirError::InvalidInput {
                message: format!("unknown user kind '{}'", other),
            }),
        }
    }
}

/// Creation info steering path generation
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreationInfo {
    pub kind: Option<UserKind>,
    /// List-like variants only; `None` counts as visible
    pub visible: Option<bool>,
}

/// Structure - tree layout rules of one directory flavour
pub trait Structure {
    fn name(&self) -> &'static str;

    /// Resolve the variant of an entry
    ///
    /// # Errors
    ///
    /// Returns `DirError::UnknownType` when nothing matches.
    fn determine_type(&self, registry: &VariantRegistry, input: &ResolveInput<'_>)
        -> Result<Variant>;

    /// Path a new object of `variant` with identifier `id` should occupy
    fn generate_uid(&self, variant: Variant, id: &str, base: &str, info: &CreationInfo) -> String;

    /// Whether [`Structure::determine_type`] looks at group memberships
    fn needs_groups(&self) -> bool {
        false
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_variant_parse_round_trips_names() {
        for variant in Variant::ALL {
            assert_eq!(Variant::parse(variant.name()).unwrap(), variant);
        }
        assert_eq!(Variant::parse("Dist_List").unwrap(), Variant::DistList);
        assert_eq!(
            "domain-maintainer".parse::<Variant>().unwrap(),
            Variant::DomainMaintainer
        );
        assert!(Variant::parse("printer").is_err());
    }

    #[test]
    fn test_user_kind_from_str() {
        assert_eq!("Resource".parse::<UserKind>().unwrap(), UserKind::Resource);
        assert!("robot".parse::<UserKind>().is_err());
    }
}
