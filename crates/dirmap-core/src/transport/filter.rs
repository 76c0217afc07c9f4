//! Filter parser and evaluator for the in-memory transport
//!
//! Parses the RFC 4515 subset the translator emits (`&`, `|`, `!`,
//! equality, presence, substrings, `>=`, `<=`, `~=`) with nom and evaluates
//! it against a [`RawEntry`]. Comparisons ignore case; ordering is numeric
//! when both sides are integers.

use nom::{
    branch::alt,
    bytes::complete::{tag, take_while, take_while1},
    character::complete::{char, multispace0},
    combinator::map,
    multi::many0,
    sequence::{delimited, preceded, tuple},
    IResult,
};
use std::cmp::Ordering;

use crate::errors::{DirError, Result};
use crate::model::RawEntry;

/// Parsed filter
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Filter {
    And(Vec<Filter>),
    Or(Vec<Filter>),
    Not(Box<Filter>),
    Equal(String, String),
    Present(String),
    Substrings {
        attribute: String,
        initial: Option<String>,
        any: Vec<String>,
        last: Option<String>,
    },
    GreaterOrEqual(String, String),
    LessOrEqual(String, String),
    Approx(String, String),
}

/// Parse a filter string; blank input matches everything
///
/// # Errors
///
/// Returns `DirError::Transport` for malformed filters, as a directory
/// server would.
pub fn parse(input: &str) -> Result<Filter> {
    if input.trim().is_empty() {
        return Ok(Filter::And(Vec::new()));
    }
    match delimited(multispace0, filter, multispace0)(input) {
        Ok(("", parsed)) => Ok(parsed),
        Ok((rest, _)) => Err(DirError::transport(format!(
            "Bad search filter: unexpected '{}'",
            rest
        ))),
        Err(e) => Err(DirError::transport(format!("Bad search filter: {:?}", e))),
    }
}

fn filter(input: &str) -> IResult<&str, Filter> {
    delimited(char('('), filter_comp, char(')'))(input)
}

fn filter_comp(input: &str) -> IResult<&str, Filter> {
    alt((
        map(preceded(char('&'), many0(filter)), Filter::And),
        map(preceded(char('|'), many0(filter)), Filter::Or),
        map(preceded(char('!'), filter), |f| Filter::Not(Box::new(f))),
        item,
    ))(input)
}

fn is_attribute_char(c: char) -> bool {
    c.is_ascii_alphanumeric() || c == '-' || c == '.' || c == ';'
}

fn item(input: &str) -> IResult<&str, Filter> {
    let (input, (attribute, op, raw)) = tuple((
        take_while1(is_attribute_char),
        alt((tag("~="), tag(">="), tag("<="), tag("="))),
        take_while(|c: char| c != '(' && c != ')'),
    ))(input)?;
    let attribute = attribute.to_lowercase();
    let parsed = match op {
        "~=" => Filter::Approx(attribute, unescape(raw)),
        ">=" => Filter::GreaterOrEqual(attribute, unescape(raw)),
        "<=" => Filter::LessOrEqual(attribute, unescape(raw)),
        _ if raw == "*" => Filter::Present(attribute),
        _ if raw.contains('*') => substrings(attribute, raw),
        _ => Filter::Equal(attribute, unescape(raw)),
    };
    Ok((input, parsed))
}

fn substrings(attribute: String, raw: &str) -> Filter {
    let parts: Vec<&str> = raw.split('*').collect();
    let initial = parts.first().copied().filter(|s| !s.is_empty()).map(unescape);
    let last = parts.last().copied().filter(|s| !s.is_empty()).map(unescape);
    // raw contains at least one '*', so there are at least two parts
    let any = parts[1..parts.len() - 1]
        .iter()
        .filter(|s| !s.is_empty())
        .map(|s| unescape(s))
        .collect();
    Filter::Substrings {
        attribute,
        initial,
        any,
        last,
    }
}

/// Decode `\XX` escapes
fn unescape(raw: &str) -> String {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' && i + 2 < bytes.len() {
            let decoded = std::str::from_utf8(&bytes[i + 1..i + 3])
                .ok()
                .and_then(|hex| u8::from_str_radix(hex, 16).ok());
            if let Some(b) = decoded {
                out.push(b);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn values<'e>(entry: &'e RawEntry, attribute: &str) -> impl Iterator<Item = &'e String> {
    let base = attribute.split(';').next().unwrap_or(attribute);
    entry.get(base).unwrap_or_default().iter()
}

fn compare(stored: &str, wanted: &str) -> Ordering {
    match (stored.trim().parse::<i64>(), wanted.trim().parse::<i64>()) {
        (Ok(a), Ok(b)) => a.cmp(&b),
        _ => stored.to_lowercase().cmp(&wanted.to_lowercase()),
    }
}

fn squash(s: &str) -> String {
    s.chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_lowercase()
}

impl Filter {
    /// Evaluate against one entry
    pub fn matches(&self, entry: &RawEntry) -> bool {
        match self {
            Filter::And(children) => children.iter().all(|f| f.matches(entry)),
            Filter::Or(children) => children.iter().any(|f| f.matches(entry)),
            Filter::Not(child) => !child.matches(entry),
            Filter::Equal(attribute, wanted) => {
                values(entry, attribute).any(|v| v.to_lowercase() == wanted.to_lowercase())
            }
            Filter::Present(attribute) => values(entry, attribute).any(|v| !v.is_empty()),
            Filter::Substrings {
                attribute,
                initial,
                any,
                last,
            } => values(entry, attribute).any(|v| substring_match(v, initial, any, last)),
            Filter::GreaterOrEqual(attribute, wanted) => {
                values(entry, attribute).any(|v| compare(v, wanted) != Ordering::Less)
            }
            Filter::LessOrEqual(attribute, wanted) => {
                values(entry, attribute).any(|v| compare(v, wanted) != Ordering::Greater)
            }
            Filter::Approx(attribute, wanted) => {
                values(entry, attribute).any(|v| squash(v) == squash(wanted))
            }
        }
    }
}

fn substring_match(
    value: &str,
    initial: &Option<String>,
    any: &[String],
    last: &Option<String>,
) -> bool {
    let value = value.to_lowercase();
    let mut rest = value.as_str();
    if let Some(initial) = initial {
        match rest.strip_prefix(initial.to_lowercase().as_str()) {
            Some(r) => rest = r,
            None => return false,
        }
    }
    for part in any {
        let part = part.to_lowercase();
        match rest.find(part.as_str()) {
            Some(pos) => rest = &rest[pos + part.len()..],
            None => return false,
        }
    }
    match last {
        Some(last) => rest.ends_with(last.to_lowercase().as_str()),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person() -> RawEntry {
        RawEntry::new()
            .with("objectClass", ["top", "kolabInetOrgPerson"])
            .with("cn", ["Frank Mustermann"])
            .with("mail", ["frank@example.com"])
            .with("cyrus-userquota", ["100"])
    }

    fn check(filter: &str) -> bool {
        parse(filter).unwrap().matches(&person())
    }

    #[test]
    fn test_equality_ignores_case() {
        assert!(check("(objectclass=kolabinetorgperson)"));
        assert!(check("(CN=frank mustermann)"));
        assert!(!check("(cn=Frank)"));
    }

    #[test]
    fn test_presence_and_substrings() {
        assert!(check("(mail=*)"));
        assert!(!check("(sn=*)"));
        assert!(check("(cn=Fra*)"));
        assert!(check("(cn=*mann)"));
        assert!(check("(cn=*ust*)"));
        assert!(check("(cn=F*Must*n)"));
        assert!(!check("(cn=*Doe*)"));
    }

    #[test]
    fn test_ordering_is_numeric_for_integers() {
        assert!(check("(cyrus-userquota>=20)"));
        assert!(check("(cyrus-userquota<=100)"));
        assert!(check("(&(cyrus-userquota<=200)(!(cyrus-userquota=200)))"));
        assert!(!check("(&(cyrus-userquota>=100)(!(cyrus-userquota=100)))"));
    }

    #[test]
    fn test_boolean_connectives() {
        assert!(check("(&(mail=*)(|(cn=nobody)(cn=Frank*)))"));
        assert!(check("(&)"));
        assert!(!check("(|)"));
        assert!(check("(!(cn=nobody))"));
    }

    #[test]
    fn test_escaped_values() {
        let entry = RawEntry::new().with("cn", ["a*(b)"]);
        let filter = parse("(cn=a\\2a\\28b\\29)").unwrap();
        assert!(filter.matches(&entry));
    }

    #[test]
    fn test_malformed_filter_is_transport_error() {
        for bad in ["(cn=a", "cn=a)", "(&(cn=a)", "(cn=a))"] {
            assert!(
                matches!(parse(bad), Err(DirError::Transport { .. })),
                "{}",
                bad
            );
        }
    }

    #[test]
    fn test_blank_filter_matches_everything() {
        assert!(parse("").unwrap().matches(&RawEntry::new()));
    }
}
