//! dirmap-core: directory-object mapping layer
//!
//! Presents entries of a hierarchical directory store as typed domain
//! objects:
//! - [`resolver`] decides which [`resolver::Variant`] an entry represents
//!   from its class markers, group memberships and tree position, and
//!   generates paths for new objects
//! - [`attribute`] binds declared attributes through decorator chains
//! - [`criteria`] models search predicates and compiles them to filters
//! - [`server::Server`] ties these to a [`transport::Transport`]

pub mod attribute;
pub mod config;
pub mod criteria;
pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod object;
pub mod resolver;
pub mod schema;
pub mod server;
pub mod transport;

// Re-exported for the logging macros
pub use dirmap_core_types;

pub use config::{ServerConfig, StructureKind};
pub use criteria::Criteria;
pub use errors::{DirError, ExError, ExErrorKind, Result};
pub use model::{RawEntry, RawMap, Value};
pub use object::DirectoryObject;
pub use resolver::{CreationInfo, UserKind, Variant};
pub use server::{ListParams, Server};
pub use transport::{MemoryTransport, Transport};
