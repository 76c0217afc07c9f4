//! Criteria model
//!
//! An immutable tree of search predicates, independent of any backing-store
//! syntax. Trees are built bottom-up through the constructor functions and
//! compiled by a [`translator::Translator`].

pub mod legacy;
pub mod translator;

pub use translator::{LdapTranslator, Translator};

use serde::{Deserialize, Serialize};

/// Comparison operator of a single-field test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Operator {
    Equals,
    Begins,
    Ends,
    Contains,
    Less,
    Greater,
    Approx,
}

/// Criteria - a search predicate tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Criteria {
    Single {
        field: String,
        operator: Operator,
        value: String,
        /// Prefix (`true`) or substring (`false`) semantics for `Begins`
        match_at_start: bool,
    },
    Not(Box<Criteria>),
    And(Vec<Criteria>),
    Or(Vec<Criteria>),
}

impl Criteria {
    pub fn single(field: &str, operator: Operator, value: &str) -> Self {
        Criteria::Single {
            field: field.to_string(),
            operator,
            value: value.to_string(),
            match_at_start: operator == Operator::Begins,
        }
    }

    pub fn equals(field: &str, value: &str) -> Self {
        Self::single(field, Operator::Equals, value)
    }

    /// Prefix match
    pub fn begins(field: &str, value: &str) -> Self {
        Self::single(field, Operator::Begins, value)
    }

    /// `Begins` with substring semantics
    pub fn begins_anywhere(field: &str, value: &str) -> Self {
        Criteria::Single {
            field: field.to_string(),
            operator: Operator::Begins,
            value: value.to_string(),
            match_at_start: false,
        }
    }

    pub fn ends(field: &str, value: &str) -> Self {
        Self::single(field, Operator::Ends, value)
    }

    pub fn contains(field: &str, value: &str) -> Self {
        Self::single(field, Operator::Contains, value)
    }

    pub fn less(field: &str, value: &str) -> Self {
        Self::single(field, Operator::Less, value)
    }

    pub fn greater(field: &str, value: &str) -> Self {
        Self::single(field, Operator::Greater, value)
    }

    pub fn approx(field: &str, value: &str) -> Self {
        Self::single(field, Operator::Approx, value)
    }

    pub fn negate(child: Criteria) -> Self {
        Criteria::Not(Box::new(child))
    }

    pub fn and(children: Vec<Criteria>) -> Self {
        Criteria::And(children)
    }

    pub fn or(children: Vec<Criteria>) -> Self {
        Criteria::Or(children)
    }

    /// The empty tree; compiles to match-all
    pub fn all() -> Self {
        Criteria::And(Vec::new())
    }

    /// Whether the tree holds no test at all
    pub fn is_empty(&self) -> bool {
        match self {
            Criteria::Single { .. } => false,
            Criteria::Not(child) => child.is_empty(),
            Criteria::And(children) | Criteria::Or(children) => {
                children.iter().all(Criteria::is_empty)
            }
        }
    }
}

impl Default for Criteria {
    fn default() -> Self {
        Criteria::all()
    }
}
