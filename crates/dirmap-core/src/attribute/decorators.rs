//! The fixed set of attribute decorators
//!
//! Each decorator owns exactly one inner attribute. Identity getters are
//! always delegated; errors from the inner attribute pass through as-is.

use chrono::{DateTime, NaiveDateTime, TimeZone, Utc};

use super::spec::DeriveRule;
use super::Attribute;
use crate::errors::{DirError, Result};
use crate::model::value::{values_are_empty, Value};
use crate::model::RawMap;
use crate::object::DirectoryObject;

/// Forwards the identity getters to `self.inner`
macro_rules! delegate_identity {
    () => {
        fn object(&self) -> &DirectoryObject {
            self.inner.object()
        }

        fn internal_name(&self) -> &str {
            self.inner.internal_name()
        }

        fn external_name(&self) -> &str {
            self.inner.external_name()
        }
    };
}

/// Generalized time formats accepted by [`TimestampDate`]
const GENERALIZED_TIME: [&str; 2] = ["%Y%m%d%H%M%SZ", "%Y%m%d%H%M%S%.fZ"];

fn parse_generalized_time(attribute: &str, raw: &str) -> Result<DateTime<Utc>> {
    GENERALIZED_TIME
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(raw, format).ok())
        .map(|naive| Utc.from_utc_datetime(&naive))
        .ok_or_else(|| {
            DirError::attribute(attribute, format!("'{}' is not a generalized time", raw))
        })
}

fn single_text(attribute: &str, value: Value) -> Result<Option<String>> {
    match value {
        Value::Empty => Ok(None),
        Value::Text(s) => Ok(Some(s)),
        Value::List(_) => Err(DirError::attribute(
            attribute,
            "expected a single value, found several",
        )),
        other => Ok(Some(other.to_string())),
    }
}

/// Coerces a generalized-time string into [`Value::Timestamp`]
pub struct TimestampDate<'a> {
    inner: Box<dyn Attribute + 'a>,
}

impl<'a> TimestampDate<'a> {
    pub fn new(inner: Box<dyn Attribute + 'a>) -> Self {
        Self { inner }
    }
}

impl Attribute for TimestampDate<'_> {
    fn value(&self) -> Result<Value> {
        let raw = single_text(self.external_name(), self.inner.value()?)?;
        match raw {
            None => Ok(Value::Empty),
            Some(raw) => Ok(Value::Timestamp(parse_generalized_time(
                self.external_name(),
                &raw,
            )?)),
        }
    }

    fn update(&self, changes: &RawMap) -> Result<RawMap> {
        self.inner.update(changes)
    }

    fn is_empty(&self, changes: &RawMap) -> bool {
        self.inner.is_empty(changes)
    }

    fn consume(&self, changes: &mut RawMap) {
        self.inner.consume(changes)
    }

    delegate_identity!();
}

/// Coerces the stored value into [`Value::Integer`] and validates writes
pub struct Integer<'a> {
    inner: Box<dyn Attribute + 'a>,
}

impl<'a> Integer<'a> {
    pub fn new(inner: Box<dyn Attribute + 'a>) -> Self {
        Self { inner }
    }

    fn parse(&self, raw: &str) -> Result<i64> {
        raw.trim().parse::<i64>().map_err(|_| {
            DirError::attribute(self.external_name(), format!("'{}' is not an integer", raw))
        })
    }
}

impl Attribute for Integer<'_> {
    fn value(&self) -> Result<Value> {
        match single_text(self.external_name(), self.inner.value()?)? {
            None => Ok(Value::Empty),
            Some(raw) => Ok(Value::Integer(self.parse(&raw)?)),
        }
    }

    fn update(&self, changes: &RawMap) -> Result<RawMap> {
        let raw = self.inner.update(changes)?;
        for value in raw.values().flatten().filter(|v| !v.is_empty()) {
            self.parse(value)?;
        }
        Ok(raw)
    }

    fn is_empty(&self, changes: &RawMap) -> bool {
        self.inner.is_empty(changes)
    }

    fn consume(&self, changes: &mut RawMap) {
        self.inner.consume(changes)
    }

    delegate_identity!();
}

/// Supplies a default when nothing is stored, and on creation when nothing is set
pub struct Defaulted<'a> {
    inner: Box<dyn Attribute + 'a>,
    default: Vec<String>,
}

impl<'a> Defaulted<'a> {
    pub fn new(inner: Box<dyn Attribute + 'a>, default: Vec<String>) -> Self {
        Self { inner, default }
    }
}

impl Attribute for Defaulted<'_> {
    fn value(&self) -> Result<Value> {
        match self.inner.value()? {
            Value::Empty => Ok(Value::from_raw(&self.default)),
            value => Ok(value),
        }
    }

    fn update(&self, changes: &RawMap) -> Result<RawMap> {
        if !self.object().exists() && self.inner.is_empty(changes) {
            let mut raw = RawMap::new();
            raw.insert(self.internal_name().to_string(), self.default.clone());
            return Ok(raw);
        }
        self.inner.update(changes)
    }

    fn is_empty(&self, changes: &RawMap) -> bool {
        self.inner.is_empty(changes) && values_are_empty(&self.default)
    }

    fn consume(&self, changes: &mut RawMap) {
        self.inner.consume(changes)
    }

    delegate_identity!();
}

/// Rejects any write naming this attribute
pub struct ReadOnly<'a> {
    inner: Box<dyn Attribute + 'a>,
}

impl<'a> ReadOnly<'a> {
    pub fn new(inner: Box<dyn Attribute + 'a>) -> Self {
        Self { inner }
    }
}

impl Attribute for ReadOnly<'_> {
    fn value(&self) -> Result<Value> {
        self.inner.value()
    }

    fn update(&self, changes: &RawMap) -> Result<RawMap> {
        if changes.contains_key(self.external_name()) {
            return Err(DirError::attribute(
                self.external_name(),
                "attribute is read-only",
            ));
        }
        Ok(RawMap::new())
    }

    fn is_empty(&self, changes: &RawMap) -> bool {
        self.inner.is_empty(changes)
    }

    fn consume(&self, changes: &mut RawMap) {
        self.inner.consume(changes)
    }

    delegate_identity!();
}

/// Computes its value from other attributes of the same entry
pub struct Derived<'a> {
    inner: Box<dyn Attribute + 'a>,
    rule: DeriveRule,
}

impl<'a> Derived<'a> {
    pub fn new(inner: Box<dyn Attribute + 'a>, rule: DeriveRule) -> Self {
        Self { inner, rule }
    }

    fn stored(&self, name: &str) -> Option<String> {
        self.object().entry().first(name).map(str::to_string)
    }
}

impl Attribute for Derived<'_> {
    fn value(&self) -> Result<Value> {
        match &self.rule {
            DeriveRule::Join { .. } => match self.rule.compose(|name| self.stored(name)) {
                Some(joined) => Ok(Value::Text(joined)),
                None => self.inner.value(),
            },
            DeriveRule::StripSurname { surname } => {
                let value = self.inner.value()?;
                let (Some(full), Some(sn)) = (value.as_text(), self.stored(surname)) else {
                    return Ok(value);
                };
                match full.strip_suffix(sn.as_str()) {
                    Some(rest) if !rest.trim().is_empty() => {
                        Ok(Value::Text(rest.trim_end().to_string()))
                    }
                    _ => Ok(value),
                }
            }
        }
    }

    fn update(&self, changes: &RawMap) -> Result<RawMap> {
        let DeriveRule::Join { sources, .. } = &self.rule else {
            return self.inner.update(changes);
        };
        // An explicit write to the stored key wins over composition
        if changes.contains_key(self.internal_name()) {
            return Ok(RawMap::new());
        }
        if !changes.contains_key(self.external_name())
            && !sources.iter().any(|s| changes.contains_key(s))
        {
            return Ok(RawMap::new());
        }
        if changes.contains_key(self.external_name()) {
            return self.inner.update(changes);
        }
        let lookup = |name: &str| match changes.get(name) {
            Some(values) => values.iter().find(|v| !v.is_empty()).cloned(),
            None => self.stored(name),
        };
        let mut raw = RawMap::new();
        if let Some(joined) = self.rule.compose(lookup) {
            raw.insert(self.internal_name().to_string(), vec![joined]);
        }
        Ok(raw)
    }

    fn is_empty(&self, changes: &RawMap) -> bool {
        match &self.rule {
            DeriveRule::Join { sources, .. } => {
                self.inner.is_empty(changes)
                    && sources.iter().all(|s| {
                        changes
                            .get(s)
                            .map(|values| values_are_empty(values))
                            .unwrap_or(true)
                    })
            }
            DeriveRule::StripSurname { .. } => self.inner.is_empty(changes),
        }
    }

    fn consume(&self, changes: &mut RawMap) {
        self.inner.consume(changes)
    }

    delegate_identity!();
}
