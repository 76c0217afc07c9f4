//! Connection configuration
//!
//! Loaded from YAML. Only `base_dn` is mandatory:
//!
//! ```yaml
//! base_dn: dc=example,dc=com
//! host: ldap.example.com
//! bind_dn: cn=manager,cn=internal,dc=example,dc=com
//! bind_password: secret
//! filter: (objectclass=*)
//! structure: kolab
//! ```

use dirmap_core_types::Sensitive;
use serde::Deserialize;
use std::path::Path;

use crate::errors::{DirError, Result};
use crate::resolver::{KolabStructure, LdapStructure, Structure};

/// Which tree layout rules apply
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StructureKind {
    Ldap,
    #[default]
    Kolab,
}

impl StructureKind {
    pub fn build(&self) -> Box<dyn Structure> {
        match self {
            StructureKind::Ldap => Box::new(LdapStructure),
            StructureKind::Kolab => Box::new(KolabStructure),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub version: u8,
    pub starttls: bool,
    pub bind_dn: String,
    pub bind_password: Sensitive<String>,
    pub base_dn: String,
    pub charset: String,
    /// Source-wide filter AND-ed with every search
    pub filter: Option<String>,
    pub schema_support: bool,
    pub auto_reconnect: bool,
    pub structure: StructureKind,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "localhost".to_string(),
            port: 389,
            version: 3,
            starttls: false,
            bind_dn: String::new(),
            bind_password: Sensitive::default(),
            base_dn: String::new(),
            charset: "UTF-8".to_string(),
            filter: None,
            schema_support: false,
            auto_reconnect: true,
            structure: StructureKind::default(),
        }
    }
}

impl ServerConfig {
    /// Minimal configuration for a base
    pub fn new(base_dn: impl Into<String>) -> Self {
        Self {
            base_dn: base_dn.into(),
            ..Self::default()
        }
    }

    pub fn with_filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = Some(filter.into());
        self
    }

    pub fn with_structure(mut self, structure: StructureKind) -> Self {
        self.structure = structure;
        self
    }

    pub fn with_schema_support(mut self, enabled: bool) -> Self {
        self.schema_support = enabled;
        self
    }

    /// Parse and validate YAML
    ///
    /// # Errors
    ///
    /// Returns `DirError::Config` for malformed YAML or invalid settings.
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        let config: ServerConfig = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML file
    ///
    /// # Errors
    ///
    /// Returns `DirError::Config` if the file cannot be read or is invalid.
    pub fn load(file: &Path) -> Result<Self> {
        let yaml = std::fs::read_to_string(file)?;
        Self::from_yaml(&yaml)
    }

    /// # Errors
    ///
    /// Returns `DirError::Config` for an empty base or an unsupported protocol version.
    pub fn validate(&self) -> Result<()> {
        if self.base_dn.trim().is_empty() {
            return Err(DirError::Config {
                message: "base_dn must not be empty".to_string(),
            });
        }
        if !matches!(self.version, 2 | 3) {
            return Err(DirError::Config {
                message: format!("unsupported protocol version {}", self.version),
            });
        }
        Ok(())
    }
}
