use super::decorators::{Defaulted, Derived, Integer, ReadOnly, TimestampDate};
use super::{Attribute, Plain};
use crate::object::DirectoryObject;

/// How a derived attribute computes its value
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeriveRule {
    /// Join the first value of each source attribute
    Join {
        sources: Vec<String>,
        separator: String,
    },
    /// The stored value minus a trailing surname
    StripSurname { surname: String },
}

impl DeriveRule {
    pub fn join(sources: &[&str], separator: &str) -> Self {
        DeriveRule::Join {
            sources: sources.iter().map(|s| s.to_lowercase()).collect(),
            separator: separator.to_string(),
        }
    }

    pub fn strip_surname(surname: &str) -> Self {
        DeriveRule::StripSurname {
            surname: surname.to_lowercase(),
        }
    }

    /// Compose a value from named inputs; `None` unless every source is present
    pub fn compose<F>(&self, lookup: F) -> Option<String>
    where
        F: Fn(&str) -> Option<String>,
    {
        match self {
            DeriveRule::Join { sources, separator } => {
                let parts = sources
                    .iter()
                    .map(|source| lookup(source))
                    .collect::<Option<Vec<String>>>()?;
                Some(parts.join(separator))
            }
            DeriveRule::StripSurname { .. } => None,
        }
    }
}

/// One layer of an attribute's decorator chain
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Decoration {
    TimestampDate,
    Integer,
    Default(Vec<String>),
    ReadOnly,
    Derive(DeriveRule),
}

/// AttributeSpec - declaration of one attribute of a variant
///
/// Decorations are applied innermost-first: the first entry wraps the plain
/// attribute, the last one is the outermost layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttributeSpec {
    pub external: String,
    pub internal: String,
    pub decorations: Vec<Decoration>,
}

impl AttributeSpec {
    /// An attribute whose external and internal names coincide
    pub fn new(name: &str) -> Self {
        Self {
            external: name.to_lowercase(),
            internal: name.to_lowercase(),
            decorations: Vec::new(),
        }
    }

    /// Store under a different internal key
    pub fn stored_as(mut self, internal: &str) -> Self {
        self.internal = internal.to_lowercase();
        self
    }

    pub fn decorate(mut self, decoration: Decoration) -> Self {
        self.decorations.push(decoration);
        self
    }

    pub fn is_read_only(&self) -> bool {
        self.decorations.contains(&Decoration::ReadOnly)
    }

    /// Build the decorator chain over `object`
    pub fn bind<'a>(&self, object: &'a DirectoryObject) -> Box<dyn Attribute + 'a> {
        let mut attribute: Box<dyn Attribute + 'a> =
            Box::new(Plain::new(object, &self.internal, &self.external));
        for decoration in &self.decorations {
            attribute = match decoration {
                Decoration::TimestampDate => Box::new(TimestampDate::new(attribute)),
                Decoration::Integer => Box::new(Integer::new(attribute)),
                Decoration::Default(values) => Box::new(Defaulted::new(attribute, values.clone())),
                Decoration::ReadOnly => Box::new(ReadOnly::new(attribute)),
                Decoration::Derive(rule) => Box::new(Derived::new(attribute, rule.clone())),
            };
        }
        attribute
    }
}
