//! Adapter for the loose AND/OR map format
//!
//! ```json
//! {"AND": [{"field": "mail", "op": "=", "test": "a@example.com"},
//!          {"OR": [{"field": "cn", "op": "LIKE", "test": "Fr", "begin": true}]}]}
//! ```
//!
//! Only used at the boundary; everything past it works on [`Criteria`].

use serde_json::Value as Json;

use super::Criteria;
use crate::errors::{DirError, Result};

/// Convert the legacy map format into a criteria tree
///
/// # Errors
///
/// Returns `DirError::Query` for unknown operators or malformed input.
pub fn from_legacy(input: &Json) -> Result<Criteria> {
    let Some(map) = input.as_object() else {
        return Err(DirError::query("criteria must be an object"));
    };
    if map.is_empty() {
        return Ok(Criteria::all());
    }
    if map.contains_key("field") {
        return convert_leaf(input);
    }
    if map.len() != 1 {
        return Err(DirError::query(
            "a criteria group must have exactly one connective",
        ));
    }
    let Some((connective, body)) = map.iter().next() else {
        return Ok(Criteria::all());
    };
    match connective.to_uppercase().as_str() {
        "AND" => Ok(Criteria::and(convert_list(body)?)),
        "OR" => Ok(Criteria::or(convert_list(body)?)),
        "NOT" => Ok(Criteria::negate(from_legacy(body)?)),
        other => Err(DirError::query(format!("unknown connective '{}'", other))),
    }
}

fn convert_list(body: &Json) -> Result<Vec<Criteria>> {
    match body {
        Json::Array(items) => items.iter().map(from_legacy).collect(),
        Json::Object(_) => Ok(vec![from_legacy(body)?]),
        _ => Err(DirError::query("a criteria group must hold a list")),
    }
}

fn convert_leaf(leaf: &Json) -> Result<Criteria> {
    let field = text(leaf, "field")?;
    let op = text(leaf, "op")?;
    let test = match leaf.get("test") {
        Some(Json::String(s)) => s.clone(),
        Some(Json::Number(n)) => n.to_string(),
        Some(Json::Bool(b)) => b.to_string(),
        _ => return Err(DirError::query(format!("criteria on '{}' has no test value", field))),
    };
    let begin = leaf.get("begin").and_then(Json::as_bool).unwrap_or(false);

    let criteria = match op.as_str() {
        "=" => Criteria::equals(&field, &test),
        "LIKE" | "like" if begin => Criteria::begins(&field, &test),
        "LIKE" | "like" => Criteria::contains(&field, &test),
        "<" => Criteria::less(&field, &test),
        "<=" => Criteria::negate(Criteria::greater(&field, &test)),
        ">" => Criteria::greater(&field, &test),
        ">=" => Criteria::negate(Criteria::less(&field, &test)),
        "~=" => Criteria::approx(&field, &test),
        other => {
            return Err(DirError::query(format!(
                "unsupported operator '{}' on '{}'",
                other, field
            )))
        }
    };
    Ok(criteria)
}

fn text(leaf: &Json, key: &str) -> Result<String> {
    leaf.get(key)
        .and_then(Json::as_str)
        .map(str::to_string)
        .ok_or_else(|| DirError::query(format!("criteria leaf is missing '{}'", key)))
}
