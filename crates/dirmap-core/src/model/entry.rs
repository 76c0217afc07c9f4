use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Attribute name → ordered values
pub type RawMap = BTreeMap<String, Vec<String>>;

/// The attribute holding an entry's structural class markers
pub const ATTRIBUTE_OC: &str = "objectclass";

/// RawEntry - the store-native view of one directory entry
///
/// Attribute names are case-insensitive in the directory, so keys are
/// lower-cased on the way in. Values keep their stored order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "RawMap", into = "RawMap")]
pub struct RawEntry {
    attributes: RawMap,
}

impl RawEntry {
    /// Create an empty entry
    pub fn new() -> Self {
        Self::default()
    }

    /// Build an entry from a map, merging keys that differ only in case
    pub fn from_map(map: RawMap) -> Self {
        let mut entry = Self::new();
        for (name, values) in map {
            entry
                .attributes
                .entry(name.to_lowercase())
                .or_default()
                .extend(values);
        }
        entry
    }

    /// Builder-style setter used by fixtures and tests
    pub fn with<I, S>(mut self, name: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.set(name, values.into_iter().map(Into::into).collect());
        self
    }

    pub fn get(&self, name: &str) -> Option<&[String]> {
        self.attributes
            .get(&name.to_lowercase())
            .map(|values| values.as_slice())
    }

    /// First non-empty value of an attribute
    pub fn first(&self, name: &str) -> Option<&str> {
        self.get(name)?
            .iter()
            .find(|v| !v.is_empty())
            .map(String::as_str)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.attributes.contains_key(&name.to_lowercase())
    }

    pub fn set(&mut self, name: &str, values: Vec<String>) {
        self.attributes.insert(name.to_lowercase(), values);
    }

    pub fn remove(&mut self, name: &str) -> Option<Vec<String>> {
        self.attributes.remove(&name.to_lowercase())
    }

    /// Lower-cased class markers with duplicates removed, in stored order
    pub fn object_classes(&self) -> Vec<String> {
        let mut markers: Vec<String> = Vec::new();
        for marker in self.get(ATTRIBUTE_OC).unwrap_or_default() {
            let marker = marker.trim().to_lowercase();
            if !marker.is_empty() && !markers.contains(&marker) {
                markers.push(marker);
            }
        }
        markers
    }

    /// Keep only the named attributes
    pub fn project(&self, names: &[String]) -> RawEntry {
        let wanted: Vec<String> = names.iter().map(|n| n.to_lowercase()).collect();
        RawEntry {
            attributes: self
                .attributes
                .iter()
                .filter(|(name, _)| wanted.contains(name))
                .map(|(name, values)| (name.clone(), values.clone()))
                .collect(),
        }
    }

    pub fn attributes(&self) -> &RawMap {
        &self.attributes
    }

    pub fn into_map(self) -> RawMap {
        self.attributes
    }

    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}

impl From<RawMap> for RawEntry {
    fn from(map: RawMap) -> Self {
        RawEntry::from_map(map)
    }
}

impl From<RawEntry> for RawMap {
    fn from(entry: RawEntry) -> Self {
        entry.attributes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_keys_are_case_insensitive() {
        let entry = RawEntry::new().with("objectClass", ["top", "person"]);
        assert!(entry.contains("OBJECTCLASS"));
        assert_eq!(entry.get("objectclass").map(|v| v.len()), Some(2));
    }

    #[test]
    fn test_from_map_merges_case_variants() {
        let mut map = RawMap::new();
        map.insert("cn".to_string(), vec!["a".to_string()]);
        map.insert("CN".to_string(), vec!["b".to_string()]);
        let entry = RawEntry::from_map(map);
        assert_eq!(entry.get("cn").map(|v| v.len()), Some(2));
    }

    #[test]
    fn test_object_classes_lowercased_and_deduplicated() {
        let entry =
            RawEntry::new().with("objectClass", ["top", "Person", "person", "inetOrgPerson"]);
        assert_eq!(
            entry.object_classes(),
            vec!["top".to_string(), "person".to_string(), "inetorgperson".to_string()]
        );
    }

    #[test]
    fn test_first_skips_empty_values() {
        let entry = RawEntry::new().with("mail", ["", "a@example.com"]);
        assert_eq!(entry.first("mail"), Some("a@example.com"));
        assert_eq!(entry.first("cn"), None);
    }

    #[test]
    fn test_project_keeps_requested_names_only() {
        let entry = RawEntry::new()
            .with("cn", ["Frank"])
            .with("sn", ["Mustermann"])
            .with("mail", ["f@example.com"]);
        let projected = entry.project(&["CN".to_string(), "mail".to_string()]);
        assert!(projected.contains("cn"));
        assert!(projected.contains("mail"));
        assert!(!projected.contains("sn"));
    }
}
