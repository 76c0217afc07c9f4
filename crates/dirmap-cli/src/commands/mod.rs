//! Subcommands and the setup they share

pub mod filter;
pub mod list;
pub mod resolve;
pub mod show;
pub mod uid;

use dirmap_core::{DirError, MemoryTransport, Server, ServerConfig, StructureKind};
use std::path::PathBuf;

/// Global options, resolved into a server on demand
#[derive(Debug, Default)]
pub struct Context {
    pub config: Option<PathBuf>,
    pub base: Option<String>,
    pub structure: Option<String>,
    pub fixture: Option<PathBuf>,
}

impl Context {
    /// Configuration file if given, otherwise `--base` with defaults
    pub fn server_config(&self) -> Result<ServerConfig, DirError> {
        let mut config = match (&self.config, &self.base) {
            (Some(file), _) => ServerConfig::load(file)?,
            (None, Some(base)) => ServerConfig::new(base.as_str()),
            (None, None) => {
                return Err(DirError::Config {
                    message: "either --config or --base is required".to_string(),
                })
            }
        };
        if let Some(base) = &self.base {
            config.base_dn = base.clone();
        }
        if let Some(structure) = &self.structure {
            config.structure = parse_structure(structure)?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Server over the fixture; an empty tree when no fixture is given
    pub fn server(&self) -> Result<Server<MemoryTransport>, DirError> {
        let transport = match &self.fixture {
            Some(file) => MemoryTransport::load(file)?,
            None => MemoryTransport::new(),
        };
        Server::new(self.server_config()?, transport)
    }

    /// Like [`Context::server`], but the fixture is mandatory
    pub fn populated_server(&self) -> Result<Server<MemoryTransport>, DirError> {
        if self.fixture.is_none() {
            return Err(DirError::Config {
                message: "--fixture is required for this command".to_string(),
            });
        }
        self.server()
    }
}

fn parse_structure(name: &str) -> Result<StructureKind, DirError> {
    match name.to_lowercase().as_str() {
        "ldap" => Ok(StructureKind::Ldap),
        "kolab" => Ok(StructureKind::Kolab),
        other => Err(DirError::Config {
            message: format!("unknown structure '{}'", other),
        }),
    }
}

/// Split `name=value` pairs into a change map; repeated names collect values
pub fn parse_assignments(pairs: &[String]) -> Result<dirmap_core::RawMap, DirError> {
    let mut changes = dirmap_core::RawMap::new();
    for pair in pairs {
        let Some((name, value)) = pair.split_once('=') else {
            return Err(DirError::InvalidInput {
                message: format!("expected name=value, got '{}'", pair),
            });
        };
        changes
            .entry(name.trim().to_lowercase())
            .or_default()
            .push(value.to_string());
    }
    Ok(changes)
}
