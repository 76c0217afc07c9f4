//! Server - the entry point of the mapping layer
//!
//! Owns the configuration, the transport, the variant registry, the
//! structure rules and the attribute-definition cache. Every public
//! operation that reaches the transport is bracketed with start/end/error
//! log events:
//! - `log_op_start!` at entry
//! - `log_op_end!` on success
//! - `log_op_error!` on failure

use std::cmp::Ordering;
use std::rc::Rc;
use std::time::Instant;

use crate::config::ServerConfig;
use crate::criteria::{Criteria, LdapTranslator, Translator};
use crate::errors::Result;
use crate::model::{path, RawEntry, RawMap, ATTRIBUTE_OC};
use crate::object::{DirectoryObject, ATTRIBUTE_MEMBER};
use crate::resolver::{CreationInfo, ResolveInput, Structure, Variant, VariantRegistry};
use crate::schema::{AttributeDefinitions, SchemaCache};
use crate::transport::{Modification, Scope, SearchOptions, Transport};
use crate::{log_op_end, log_op_error, log_op_start};

/// Filter used when nothing restricts a search
pub const MATCH_ALL: &str = "(objectclass=*)";

/// Class marking groups that can hold role members
const GROUP_CLASS: &str = "kolabgroupofnames";

/// Parameters of [`Server::list_objects`]
#[derive(Debug, Clone, Default)]
pub struct ListParams {
    /// Search base; defaults to the configured base
    pub base: Option<String>,
    /// Caller predicate AND-ed with the variant filter
    pub criteria: Option<Criteria>,
    /// Projection override
    pub attributes: Option<Vec<String>>,
    /// Sort attribute override
    pub sort: Option<String>,
    /// Paging hint, `from` inclusive; not applied to the result
    pub from: Option<usize>,
    /// Paging hint, `to` exclusive; not applied to the result
    pub to: Option<usize>,
    /// Group (relative to the base) overriding the variant's required group
    pub required_group: Option<String>,
}

pub struct Server<T: Transport> {
    config: ServerConfig,
    transport: T,
    registry: VariantRegistry,
    structure: Box<dyn Structure>,
    schema: SchemaCache,
    translator: LdapTranslator,
}

impl<T: Transport> Server<T> {
    /// Server with the standard catalogue and the configured structure
    ///
    /// # Errors
    ///
    /// Returns `DirError::Config` if the configuration is invalid.
    pub fn new(config: ServerConfig, transport: T) -> Result<Self> {
        config.validate()?;
        let translator = LdapTranslator::new().with_mandatory(config.filter.as_deref());
        Ok(Self {
            structure: config.structure.build(),
            registry: VariantRegistry::standard(),
            schema: SchemaCache::new(),
            translator,
            config,
            transport,
        })
    }

    pub fn with_registry(mut self, registry: VariantRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn with_structure(mut self, structure: Box<dyn Structure>) -> Self {
        self.structure = structure;
        self
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    pub fn base(&self) -> &str {
        &self.config.base_dn
    }

    pub fn registry(&self) -> &VariantRegistry {
        &self.registry
    }

    pub fn structure(&self) -> &dyn Structure {
        self.structure.as_ref()
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Read the raw entry at `path`
    ///
    /// # Errors
    ///
    /// Returns `DirError::NotFound` if there is no entry, or the transport's error.
    pub fn read(&self, path: &str, attributes: Option<&[String]>) -> Result<RawEntry> {
        log_op_start!("read", path = path);
        let start = Instant::now();

        let entry = self.transport.read(path, attributes).map_err(|e| {
            log_op_error!("read", &e, start, path = path);
            e
        })?;

        log_op_end!("read", start, path = path);
        Ok(entry)
    }

    /// Lower-cased class markers of the entry at `path`
    ///
    /// # Errors
    ///
    /// Returns `DirError::NotFound` if there is no entry.
    pub fn object_classes(&self, path: &str) -> Result<Vec<String>> {
        let entry = self.read(path, Some(&[ATTRIBUTE_OC.to_string()]))?;
        Ok(entry.object_classes())
    }

    /// Paths of the groups `path` is a member of
    ///
    /// # Errors
    ///
    /// Returns the transport's error if the search fails.
    pub fn groups_of(&self, path: &str) -> Result<Vec<String>> {
        log_op_start!("groups_of", path = path);
        let start = Instant::now();

        let groups = self.groups_of_impl(path).map_err(|e| {
            log_op_error!("groups_of", &e, start, path = path);
            e
        })?;

        log_op_end!("groups_of", start, result_len = groups.len());
        Ok(groups)
    }

    fn groups_of_impl(&self, path: &str) -> Result<Vec<String>> {
        let criteria = Criteria::and(vec![
            Criteria::equals(ATTRIBUTE_OC, GROUP_CLASS),
            Criteria::equals(ATTRIBUTE_MEMBER, path),
        ]);
        let filter = self.translator.compile(&criteria)?;
        let options = SearchOptions::default()
            .with_scope(Scope::Sub)
            .with_attributes(vec![ATTRIBUTE_OC.to_string()]);
        let hits = self.transport.search(self.base(), &filter, &options)?;
        Ok(hits.into_iter().map(|(group, _)| group).collect())
    }

    /// Determine the variant of the entry at `path`
    ///
    /// # Errors
    ///
    /// Returns `DirError::NotFound` for a missing entry and
    /// `DirError::UnknownType` when no variant matches.
    pub fn determine_type(&self, path: &str) -> Result<Variant> {
        log_op_start!("determine_type", path = path);
        let start = Instant::now();

        let variant = self
            .read(path, None)
            .and_then(|entry| self.resolve_entry(path, &entry))
            .map_err(|e| {
                log_op_error!("determine_type", &e, start, path = path);
                e
            })?;

        log_op_end!("determine_type", start, variant = variant.name());
        Ok(variant)
    }

    /// Determine the variant of an entry already in hand
    ///
    /// # Errors
    ///
    /// Returns `DirError::UnknownType` when no variant matches.
    pub fn resolve_entry(&self, path: &str, entry: &RawEntry) -> Result<Variant> {
        let groups = if self.structure.needs_groups() {
            self.groups_of(path)?
        } else {
            Vec::new()
        };
        let input = ResolveInput {
            path,
            base: self.base(),
            entry,
            groups: &groups,
        };
        self.structure.determine_type(&self.registry, &input)
    }

    /// Typed object at `path`, its variant determined from the entry
    ///
    /// # Errors
    ///
    /// Returns `DirError::NotFound` or `DirError::UnknownType`.
    pub fn fetch(&self, path: &str) -> Result<DirectoryObject> {
        let entry = self.read(path, None)?;
        let variant = self.resolve_entry(path, &entry)?;
        Ok(DirectoryObject::new(self.registry.get(variant)?, path, entry))
    }

    /// Typed object at `path` with a variant chosen by the caller
    ///
    /// # Errors
    ///
    /// Returns `DirError::NotFound` or `DirError::InvalidInput` for unregistered variants.
    pub fn fetch_as(&self, path: &str, variant: Variant) -> Result<DirectoryObject> {
        let def = self.registry.get(variant)?;
        let entry = self.read(path, None)?;
        Ok(DirectoryObject::new(def, path, entry))
    }

    /// Native filter for `criteria`, including the mandatory filter
    ///
    /// # Errors
    ///
    /// Returns `DirError::Query` if the criteria cannot be compiled.
    pub fn search_filter(&self, criteria: &Criteria) -> Result<String> {
        let filter = self.translator.translate(criteria)?;
        if filter.is_empty() {
            Ok(MATCH_ALL.to_string())
        } else {
            Ok(filter)
        }
    }

    /// Search below the base and resolve every hit to a typed object
    ///
    /// # Errors
    ///
    /// Returns `DirError::Query`, the transport's error, or
    /// `DirError::UnknownType` for a hit no variant matches.
    pub fn search(
        &self,
        criteria: &Criteria,
        options: &SearchOptions,
    ) -> Result<Vec<DirectoryObject>> {
        log_op_start!("search", base = self.base());
        let start = Instant::now();

        let objects = self.search_impl(criteria, options).map_err(|e| {
            log_op_error!("search", &e, start);
            e
        })?;

        log_op_end!("search", start, result_len = objects.len());
        Ok(objects)
    }

    fn search_impl(
        &self,
        criteria: &Criteria,
        options: &SearchOptions,
    ) -> Result<Vec<DirectoryObject>> {
        let filter = self.search_filter(criteria)?;
        tracing::debug!(filter = %filter, "compiled search filter");

        // Resolution needs the class markers even under a projection
        let mut options = options.clone();
        if let Some(attributes) = options.attributes.as_mut() {
            if !attributes.iter().any(|a| a.eq_ignore_ascii_case(ATTRIBUTE_OC)) {
                attributes.push(ATTRIBUTE_OC.to_string());
            }
        }

        let hits = self.transport.search(self.base(), &filter, &options)?;
        let mut objects = Vec::with_capacity(hits.len());
        for (hit_path, entry) in hits {
            let variant = self.resolve_entry(&hit_path, &entry)?;
            objects.push(DirectoryObject::new(
                self.registry.get(variant)?,
                hit_path,
                entry,
            ));
        }
        Ok(objects)
    }

    /// All objects of one variant
    ///
    /// Results are sorted by the sort attribute and members of the required
    /// group are dropped. `from`/`to` are hints for the caller's paging and
    /// never cut the result.
    ///
    /// # Errors
    ///
    /// Returns `DirError::Query`, the transport's error, or
    /// `DirError::NotFound` if the required group does not exist.
    pub fn list_objects(
        &self,
        variant: Variant,
        params: &ListParams,
    ) -> Result<Vec<DirectoryObject>> {
        log_op_start!("list_objects", variant = variant.name());
        let start = Instant::now();

        let objects = self.list_objects_impl(variant, params).map_err(|e| {
            log_op_error!("list_objects", &e, start, variant = variant.name());
            e
        })?;

        log_op_end!("list_objects", start, result_len = objects.len());
        Ok(objects)
    }

    fn list_objects_impl(
        &self,
        variant: Variant,
        params: &ListParams,
    ) -> Result<Vec<DirectoryObject>> {
        let def = self.registry.get(variant)?;
        let criteria = DirectoryObject::list_filter(&def, params.criteria.clone());
        let filter = self.search_filter(&criteria)?;
        let options = SearchOptions::default()
            .with_scope(Scope::Sub)
            .with_attributes(DirectoryObject::projection(&def, params.attributes.as_deref()));
        let base = params.base.as_deref().unwrap_or(self.base());
        let mut hits = self.transport.search(base, &filter, &options)?;

        if let Some(sort) = params.sort.as_deref().or(def.sort_by.as_deref()) {
            let key = |entry: &RawEntry| entry.first(sort).map(str::to_lowercase);
            hits.sort_by(|(a_path, a), (b_path, b)| match key(a).cmp(&key(b)) {
                Ordering::Equal => path::normalize(a_path).cmp(&path::normalize(b_path)),
                other => other,
            });
        }

        // Paging is left to the caller; the hints are only recorded
        if params.from.is_some() || params.to.is_some() {
            tracing::debug!(
                from = ?params.from,
                to = ?params.to,
                hits = hits.len(),
                "window hints not applied"
            );
        }

        // Membership is fetched once per listing
        let group_path = params
            .required_group
            .as_deref()
            .or(def.required_group.as_deref())
            .map(|group| path::join(group, self.base()));
        let required_group = match group_path {
            Some(group_path) => Some(self.fetch_as(&group_path, Variant::KolabGroupOfNames)?),
            None => None,
        };

        let mut objects = Vec::with_capacity(hits.len());
        for (hit_path, entry) in hits {
            if required_group.as_ref().is_some_and(|g| g.is_member(&hit_path)) {
                tracing::debug!(path = %hit_path, "dropping member of required group");
                continue;
            }
            objects.push(DirectoryObject::new(def.clone(), hit_path, entry));
        }
        Ok(objects)
    }

    /// Path a new object of `variant` should occupy
    pub fn generate_uid(&self, variant: Variant, id: &str, info: &CreationInfo) -> String {
        self.structure.generate_uid(variant, id, self.base(), info)
    }

    /// A new, unsaved object; its path is derived from `changes`
    ///
    /// # Errors
    ///
    /// Returns `DirError::InvalidInput` for unregistered variants and
    /// `DirError::Attribute` if no identifier can be derived.
    pub fn create_object(
        &self,
        variant: Variant,
        changes: RawMap,
        info: &CreationInfo,
    ) -> Result<DirectoryObject> {
        let def = self.registry.get(variant)?;
        let id = DirectoryObject::generate_id(&def, &changes)?;
        let uid = self.generate_uid(variant, &id, info);
        Ok(DirectoryObject::create(def, uid, changes))
    }

    /// Write pending changes: `add` for new objects, `modify` otherwise
    ///
    /// # Errors
    ///
    /// Returns `DirError::Attribute` for rejected changes, or the transport's error.
    pub fn save(&mut self, object: &mut DirectoryObject) -> Result<()> {
        log_op_start!("save", path = object.path());
        let start = Instant::now();

        self.save_impl(object).map_err(|e| {
            log_op_error!("save", &e, start, path = object.path());
            e
        })?;

        log_op_end!("save", start, path = object.path());
        Ok(())
    }

    fn save_impl(&mut self, object: &mut DirectoryObject) -> Result<()> {
        let raw = object.prepare_changes()?;
        if object.exists() {
            let modification = Modification::from_changes(raw.clone());
            if !modification.is_empty() {
                self.transport.modify(object.path(), &modification)?;
            }
        } else {
            let entry = RawEntry::from_map(raw.clone());
            self.transport.add(object.path(), &entry)?;
        }
        object.apply_saved(&raw);
        Ok(())
    }

    /// Required and supported attributes of a variant
    ///
    /// # Errors
    ///
    /// Returns `DirError::InvalidInput` for unregistered variants, or the
    /// transport's schema error when schema support is enabled.
    pub fn attribute_definitions(&self, variant: Variant) -> Result<Rc<AttributeDefinitions>> {
        let def = self.registry.get(variant)?;
        let transport: Option<&dyn Transport> = if self.config.schema_support {
            Some(&self.transport)
        } else {
            None
        };
        self.schema.definitions(&def, transport)
    }
}
