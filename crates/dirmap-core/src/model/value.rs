use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Value - what an attribute yields once its decorator chain has run
///
/// Plain attributes produce `Empty`, `Text` or `List`; coercing decorators
/// produce the typed variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "value", rename_all = "snake_case")]
pub enum Value {
    Empty,
    Text(String),
    List(Vec<String>),
    Integer(i64),
    Timestamp(DateTime<Utc>),
}

impl Value {
    /// Interpret stored values; empty strings count as absent
    pub fn from_raw(values: &[String]) -> Value {
        let mut present: Vec<String> = values.iter().filter(|v| !v.is_empty()).cloned().collect();
        match present.len() {
            0 => Value::Empty,
            1 => Value::Text(present.remove(0)),
            _ => Value::List(present),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, Value::Empty)
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Back to the store-native representation
    pub fn into_raw(self) -> Vec<String> {
        match self {
            Value::Empty => Vec::new(),
            Value::Text(s) => vec![s],
            Value::List(values) => values,
            Value::Integer(n) => vec![n.to_string()],
            Value::Timestamp(ts) => vec![ts.format("%Y%m%d%H%M%SZ").to_string()],
        }
    }
}

impl std::fmt::Display for Value {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Value::Empty => Ok(()),
            Value::Text(s) => write!(f, "{}", s),
            Value::List(values) => write!(f, "{}", values.join(", ")),
            Value::Integer(n) => write!(f, "{}", n),
            Value::Timestamp(ts) => write!(f, "{}", ts.to_rfc3339()),
        }
    }
}

/// Whether a list of stored values means "absent"
pub fn values_are_empty(values: &[String]) -> bool {
    values.iter().all(|v| v.is_empty())
}
