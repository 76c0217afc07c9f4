//! Criteria → native filter compilation
//!
//! One [`Translator`] per backing-store dialect. [`LdapTranslator`] produces
//! RFC 4515 filter strings.

use super::{Criteria, Operator};
use crate::errors::{DirError, Result};

/// A compiler from [`Criteria`] to one dialect's filter syntax
pub trait Translator {
    /// Compile `criteria`, AND-ing the source-wide mandatory filter if any
    ///
    /// # Errors
    ///
    /// Returns `DirError::Query` when the tree cannot be expressed.
    fn translate(&self, criteria: &Criteria) -> Result<String>;
}

/// LDAP filter compiler
#[derive(Debug, Clone, Default)]
pub struct LdapTranslator {
    mandatory: Option<String>,
}

impl LdapTranslator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the filter every compiled query is AND-ed with
    pub fn with_mandatory(mut self, filter: Option<&str>) -> Self {
        self.mandatory = filter
            .map(str::trim)
            .filter(|f| !f.is_empty())
            .map(parenthesize);
        self
    }

    /// Compile without the mandatory filter; the empty tree yields ""
    ///
    /// # Errors
    ///
    /// Returns `DirError::Query` for invalid attribute names or a negated
    /// empty group.
    pub fn compile(&self, criteria: &Criteria) -> Result<String> {
        match criteria {
            Criteria::Single {
                field,
                operator,
                value,
                match_at_start,
            } => self.convert_single(field, *operator, value, *match_at_start),
            Criteria::Not(child) => self.convert_not(child),
            Criteria::And(children) => self.convert_group('&', children),
            Criteria::Or(children) => self.convert_group('|', children),
        }
    }

    fn convert_single(
        &self,
        field: &str,
        operator: Operator,
        value: &str,
        match_at_start: bool,
    ) -> Result<String> {
        check_descriptor(field)?;
        let v = escape_value(value);
        let filter = match operator {
            Operator::Equals => format!("({}={})", field, v),
            Operator::Begins if match_at_start => format!("({}={}*)", field, v),
            Operator::Begins | Operator::Contains => format!("({}=*{}*)", field, v),
            Operator::Ends => format!("({}=*{})", field, v),
            Operator::Less => format!("(&({f}<={v})(!({f}={v})))", f = field, v = v),
            Operator::Greater => format!("(&({f}>={v})(!({f}={v})))", f = field, v = v),
            Operator::Approx => format!("({}~={})", field, v),
        };
        Ok(filter)
    }

    fn convert_not(&self, child: &Criteria) -> Result<String> {
        let inner = self.compile(child)?;
        if inner.is_empty() {
            return Err(DirError::query("cannot negate an empty group"));
        }
        Ok(format!("(!{})", inner))
    }

    fn convert_group(&self, connective: char, children: &[Criteria]) -> Result<String> {
        let mut parts = Vec::with_capacity(children.len());
        for child in children {
            let compiled = self.compile(child)?;
            if !compiled.is_empty() {
                parts.push(compiled);
            }
        }
        if parts.is_empty() {
            return Ok(String::new());
        }
        Ok(format!("({}{})", connective, parts.concat()))
    }
}

impl Translator for LdapTranslator {
    fn translate(&self, criteria: &Criteria) -> Result<String> {
        let compiled = self.compile(criteria)?;
        Ok(match (&self.mandatory, compiled.is_empty()) {
            (None, _) => compiled,
            (Some(mandatory), true) => mandatory.clone(),
            (Some(mandatory), false) => format!("(&{}{})", mandatory, compiled),
        })
    }
}

/// A bare item gets parentheses; a run of complete filters is AND-ed
fn parenthesize(filter: &str) -> String {
    match top_level_filters(filter) {
        Some(1) => filter.to_string(),
        Some(_) => format!("(&{})", filter),
        None => format!("({})", filter),
    }
}

/// Number of balanced top-level `(...)` groups making up all of `filter`
fn top_level_filters(filter: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut groups = 0;
    let mut escaped = false;
    for c in filter.chars() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '(' => {
                if depth == 0 {
                    groups += 1;
                }
                depth += 1;
            }
            ')' => depth = depth.checked_sub(1)?,
            _ if depth == 0 => return None,
            _ => {}
        }
    }
    (depth == 0 && groups > 0).then_some(groups)
}

/// Escape an assertion value (RFC 4515 section 3)
pub fn escape_value(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '*' => escaped.push_str("\\2a"),
            '(' => escaped.push_str("\\28"),
            ')' => escaped.push_str("\\29"),
            '\\' => escaped.push_str("\\5c"),
            '\0' => escaped.push_str("\\00"),
            c => escaped.push(c),
        }
    }
    escaped
}

/// Attribute descriptor: a name or numeric OID, with optional `;options`
fn check_descriptor(field: &str) -> Result<()> {
    let starts_well = field.chars().next().is_some_and(|c| c.is_ascii_alphanumeric());
    let valid = starts_well
        && field.split(';').all(|part| {
            !part.is_empty()
                && part
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '.')
        });
    if valid {
        Ok(())
    } else {
        Err(DirError::query(format!("invalid attribute name '{}'", field)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_operators() {
        let t = LdapTranslator::new();
        let cases = [
            (Criteria::equals("cn", "a"), "(cn=a)"),
            (Criteria::begins("cn", "a"), "(cn=a*)"),
            (Criteria::begins_anywhere("cn", "a"), "(cn=*a*)"),
            (Criteria::ends("cn", "a"), "(cn=*a)"),
            (Criteria::contains("cn", "a"), "(cn=*a*)"),
            (Criteria::approx("cn", "a"), "(cn~=a)"),
            (Criteria::less("uidnumber", "5"), "(&(uidnumber<=5)(!(uidnumber=5)))"),
            (Criteria::greater("uidnumber", "5"), "(&(uidnumber>=5)(!(uidnumber=5)))"),
        ];
        for (criteria, expected) in cases {
            assert_eq!(t.compile(&criteria).unwrap(), expected);
        }
    }

    #[test]
    fn test_values_are_escaped() {
        let t = LdapTranslator::new();
        assert_eq!(
            t.compile(&Criteria::equals("cn", "a*(b)\\")).unwrap(),
            "(cn=a\\2a\\28b\\29\\5c)"
        );
    }

    #[test]
    fn test_invalid_descriptor_is_query_error() {
        let t = LdapTranslator::new();
        for field in ["", "c n", "cn)(", "-cn", "cn;"] {
            let err = t.compile(&Criteria::equals(field, "x")).unwrap_err();
            assert!(matches!(err, DirError::Query { .. }), "field {:?}", field);
        }
        assert!(t.compile(&Criteria::equals("cn;lang-de", "x")).is_ok());
        assert!(t.compile(&Criteria::equals("2.5.4.3", "x")).is_ok());
    }

    #[test]
    fn test_mandatory_filter_is_parenthesized() {
        let t = LdapTranslator::new().with_mandatory(Some("objectclass=kolabInetOrgPerson"));
        assert_eq!(
            t.translate(&Criteria::all()).unwrap(),
            "(objectclass=kolabInetOrgPerson)"
        );
        let blank = LdapTranslator::new().with_mandatory(Some("  "));
        assert_eq!(blank.translate(&Criteria::all()).unwrap(), "");
    }

    #[test]
    fn test_mandatory_filter_checks_balance_across_the_whole_string() {
        let mandatory = |f: &str| {
            LdapTranslator::new()
                .with_mandatory(Some(f))
                .translate(&Criteria::all())
                .unwrap()
        };
        assert_eq!(mandatory("(sn=a)(sn=b)"), "(&(sn=a)(sn=b))");
        assert_eq!(mandatory("(|(sn=a)(sn=b))"), "(|(sn=a)(sn=b))");
        assert_eq!(mandatory("sn=a"), "(sn=a)");
    }
}
