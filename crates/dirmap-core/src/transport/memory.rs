use serde::Deserialize;
use std::collections::{BTreeMap, HashMap};
use std::path::Path;

use super::filter;
use super::{Modification, Scope, SchemaDefinition, SchemaKind, SearchHit, SearchOptions, Transport};
use crate::errors::{DirError, Result};
use crate::model::{path, RawEntry, RawMap};

/// MemoryTransport - an in-process directory
///
/// Entries are keyed by normalized path; the path as first written is kept
/// for results. A failure message can be armed to make every call fail the
/// way an unreachable server would.
#[derive(Debug, Clone, Default)]
pub struct MemoryTransport {
    entries: BTreeMap<String, (String, RawEntry)>,
    schema: HashMap<(SchemaKind, String), SchemaDefinition>,
    failure: Option<String>,
}

impl MemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an entry
    pub fn insert(&mut self, entry_path: &str, entry: RawEntry) {
        self.entries
            .insert(path::normalize(entry_path), (entry_path.trim().to_string(), entry));
    }

    /// Builder-style [`MemoryTransport::insert`]
    pub fn with_entry(mut self, entry_path: &str, entry: RawEntry) -> Self {
        self.insert(entry_path, entry);
        self
    }

    pub fn add_schema(&mut self, kind: SchemaKind, definition: SchemaDefinition) {
        self.schema
            .insert((kind, definition.name.to_lowercase()), definition);
    }

    /// Make every subsequent call fail with `message` (or recover with `None`)
    pub fn set_failure(&mut self, message: Option<&str>) {
        self.failure = message.map(str::to_string);
    }

    pub fn get(&self, entry_path: &str) -> Option<&RawEntry> {
        self.entries
            .get(&path::normalize(entry_path))
            .map(|(_, entry)| entry)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Load a YAML fixture
    ///
    /// ```yaml
    /// entries:
    ///   - path: cn=admin,cn=internal,dc=example,dc=com
    ///     attributes:
    ///       objectClass: [top, kolabGroupOfNames]
    ///       member: cn=jdoe,dc=example,dc=com
    /// schema:
    ///   - kind: object_class
    ///     name: kolabInetOrgPerson
    ///     must: [cn, sn]
    /// ```
    ///
    /// # Errors
    ///
    /// Returns `DirError::Config` for malformed YAML.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let fixture: Fixture = serde_yaml::from_str(yaml)?;
        let mut transport = MemoryTransport::new();
        for entry in fixture.entries {
            let attributes: RawMap = entry
                .attributes
                .into_iter()
                .map(|(name, values)| (name, values.into_strings()))
                .collect();
            transport.insert(&entry.path, RawEntry::from_map(attributes));
        }
        for element in fixture.schema {
            transport.add_schema(element.kind, element.definition);
        }
        Ok(transport)
    }

    /// Load a YAML fixture from a file
    ///
    /// # Errors
    ///
    /// Returns `DirError::Config` if the file cannot be read or parsed.
    pub fn load(file: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(file).map_err(|e| DirError::Config {
            message: format!("cannot read fixture {}: {}", file.display(), e),
        })?;
        Self::from_yaml(&yaml)
    }

    fn check_online(&self) -> Result<()> {
        match &self.failure {
            Some(message) => Err(DirError::transport(message.clone())),
            None => Ok(()),
        }
    }

    fn in_scope(entry_path: &str, base: &str, scope: Scope) -> bool {
        match scope {
            Scope::Base => path::same(entry_path, base),
            Scope::One => path::parent(entry_path).is_some_and(|p| path::same(&p, base)),
            Scope::Sub => path::is_within(entry_path, base),
        }
    }
}

fn project(entry: &RawEntry, attributes: Option<&[String]>) -> RawEntry {
    match attributes {
        Some(names) if !names.is_empty() => entry.project(names),
        _ => entry.clone(),
    }
}

impl Transport for MemoryTransport {
    fn search(&self, base: &str, filter: &str, options: &SearchOptions) -> Result<Vec<SearchHit>> {
        self.check_online()?;
        let parsed = filter::parse(filter)?;
        Ok(self
            .entries
            .values()
            .filter(|(entry_path, _)| Self::in_scope(entry_path, base, options.scope))
            .filter(|(_, entry)| parsed.matches(entry))
            .map(|(entry_path, entry)| {
                (
                    entry_path.clone(),
                    project(entry, options.attributes.as_deref()),
                )
            })
            .collect())
    }

    fn read(&self, entry_path: &str, attributes: Option<&[String]>) -> Result<RawEntry> {
        self.check_online()?;
        self.get(entry_path)
            .map(|entry| project(entry, attributes))
            .ok_or_else(|| DirError::not_found(entry_path))
    }

    fn add(&mut self, entry_path: &str, entry: &RawEntry) -> Result<()> {
        self.check_online()?;
        if self.get(entry_path).is_some() {
            return Err(DirError::transport(format!(
                "Already exists: {}",
                entry_path
            )));
        }
        self.insert(entry_path, entry.clone());
        Ok(())
    }

    fn modify(&mut self, entry_path: &str, modification: &Modification) -> Result<()> {
        self.check_online()?;
        let Some((_, entry)) = self.entries.get_mut(&path::normalize(entry_path)) else {
            return Err(DirError::not_found(entry_path));
        };
        for name in &modification.delete {
            entry.remove(name);
        }
        for (name, values) in &modification.replace {
            entry.set(name, values.clone());
        }
        Ok(())
    }

    fn schema(&self, kind: SchemaKind, name: &str) -> Result<SchemaDefinition> {
        self.check_online()?;
        self.schema
            .get(&(kind, name.to_lowercase()))
            .cloned()
            .ok_or_else(|| DirError::not_found(format!("schema {:?} {}", kind, name)))
    }
}

#[derive(Debug, Deserialize)]
struct Fixture {
    #[serde(default)]
    entries: Vec<FixtureEntry>,
    #[serde(default)]
    schema: Vec<FixtureSchema>,
}

#[derive(Debug, Deserialize)]
struct FixtureEntry {
    path: String,
    #[serde(default)]
    attributes: BTreeMap<String, OneOrMany>,
}

#[derive(Debug, Deserialize)]
struct FixtureSchema {
    kind: SchemaKind,
    #[serde(flatten)]
    definition: SchemaDefinition,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum Scalar {
    Text(String),
    Integer(i64),
    Float(f64),
    Bool(bool),
}

impl Scalar {
    fn into_string(self) -> String {
        match self {
            Scalar::Text(s) => s,
            Scalar::Integer(n) => n.to_string(),
            Scalar::Float(f) => f.to_string(),
            Scalar::Bool(b) => b.to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OneOrMany {
    Many(Vec<Scalar>),
    One(Scalar),
}

impl OneOrMany {
    fn into_strings(self) -> Vec<String> {
        match self {
            OneOrMany::Many(values) => values.into_iter().map(Scalar::into_string).collect(),
            OneOrMany::One(value) => vec![value.into_string()],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const FIXTURE: &str = r#"
entries:
  - path: dc=example,dc=com
    attributes:
      objectClass: [top, domain]
  - path: cn=Frank Mustermann,dc=example,dc=com
    attributes:
      objectClass: [top, person]
      cn: Frank Mustermann
      sn: Mustermann
  - path: cn=internal,dc=example,dc=com
    attributes:
      objectClass: [top, kolabNamedObject]
  - path: cn=admin,cn=internal,dc=example,dc=com
    attributes:
      objectClass: [top, kolabGroupOfNames]
      member: cn=Frank Mustermann,dc=example,dc=com
      gidnumber: 42
schema:
  - kind: object_class
    name: person
    must: [cn, sn]
    may: [userPassword]
"#;

    fn transport() -> MemoryTransport {
        MemoryTransport::from_yaml(FIXTURE).unwrap()
    }

    #[test]
    fn test_fixture_loads_scalars_and_lists() {
        let t = transport();
        assert_eq!(t.len(), 4);
        let admin = t.get("CN=admin, cn=internal,dc=example,dc=com").unwrap();
        assert_eq!(admin.first("gidnumber"), Some("42"));
        assert_eq!(admin.get("member").map(|m| m.len()), Some(1));
    }

    #[test]
    fn test_scopes() {
        let t = transport();
        let base = "dc=example,dc=com";
        let count = |scope| {
            t.search(base, "", &SearchOptions::default().with_scope(scope))
                .unwrap()
                .len()
        };
        assert_eq!(count(Scope::Base), 1);
        assert_eq!(count(Scope::One), 2);
        assert_eq!(count(Scope::Sub), 4);
    }

    #[test]
    fn test_search_projects_attributes() {
        let t = transport();
        let hits = t
            .search(
                "dc=example,dc=com",
                "(objectclass=person)",
                &SearchOptions::default().with_attributes(vec!["sn".to_string()]),
            )
            .unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].0, "cn=Frank Mustermann,dc=example,dc=com");
        assert!(hits[0].1.contains("sn"));
        assert!(!hits[0].1.contains("cn"));
    }

    #[test]
    fn test_escaped_separators_keep_paths_apart() {
        let mut t = MemoryTransport::new();
        t.insert(r"cn=Doe\, John,dc=example,dc=com", RawEntry::new().with("sn", ["spaced"]));
        t.insert(r"cn=Doe\,John,dc=example,dc=com", RawEntry::new().with("sn", ["tight"]));

        assert_eq!(t.len(), 2);
        let spaced = t.get(r"CN=doe\, john, dc=example,dc=com").unwrap();
        assert_eq!(spaced.first("sn"), Some("spaced"));

        let children = t
            .search(
                "dc=example,dc=com",
                "",
                &SearchOptions::default().with_scope(Scope::One),
            )
            .unwrap();
        assert_eq!(children.len(), 2);
    }

    #[test]
    fn test_read_missing_is_not_found() {
        let err = transport().read("cn=nobody,dc=example,dc=com", None).unwrap_err();
        assert!(matches!(err, DirError::NotFound { .. }));
    }

    #[test]
    fn test_modify_and_add() {
        let mut t = transport();
        let path = "cn=Frank Mustermann,dc=example,dc=com";
        let mut replace = RawMap::new();
        replace.insert("mail".to_string(), vec!["frank@example.com".to_string()]);
        t.modify(
            path,
            &Modification {
                delete: vec!["sn".to_string()],
                replace,
            },
        )
        .unwrap();
        let entry = t.read(path, None).unwrap();
        assert!(!entry.contains("sn"));
        assert_eq!(entry.first("mail"), Some("frank@example.com"));

        let err = t.add(path, &entry).unwrap_err();
        assert!(matches!(err, DirError::Transport { .. }));
    }

    #[test]
    fn test_failure_message_passes_through() {
        let mut t = transport();
        t.set_failure(Some("Can't contact LDAP server"));
        let err = t.read("dc=example,dc=com", None).unwrap_err();
        assert_eq!(err.to_string(), "Can't contact LDAP server");
    }

    #[test]
    fn test_schema_lookup() {
        let t = transport();
        let person = t.schema(SchemaKind::ObjectClass, "Person").unwrap();
        assert_eq!(person.must, vec!["cn".to_string(), "sn".to_string()]);
        assert!(t.schema(SchemaKind::ObjectClass, "kolab").is_err());
    }
}
