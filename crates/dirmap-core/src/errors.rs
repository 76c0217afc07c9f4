use thiserror::Error;

/// Result type alias using DirError
pub type Result<T> = std::result::Result<T, DirError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that callers above the mapping
/// layer can match on without parsing messages.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    /// A value could not be coerced to or stored as its declared type
    Attribute,
    /// Criteria could not be compiled into a filter
    Query,
    /// No registered variant matches an entry
    UnknownType,
    /// No entry at a path, or an empty result where one entry was expected
    NotFound,
    /// Opaque failure reported by the backing store
    Transport,
    /// Configuration could not be loaded or is inconsistent
    Config,
    InvalidInput,
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::Attribute => "ERR_ATTRIBUTE",
            ExErrorKind::Query => "ERR_QUERY",
            ExErrorKind::UnknownType => "ERR_UNKNOWN_TYPE",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::Transport => "ERR_TRANSPORT",
            ExErrorKind::Config => "ERR_CONFIG",
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }
}

/// Canonical structured error type
///
/// Carries classification fields for programmatic handling plus the
/// directory context (operation, path, attribute) the failure occurred in.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    path: Option<String>,
    attribute: Option<String>,
    message: String,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            path: None,
            attribute: None,
            message: String::new(),
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add entry path context
    pub fn with_path(mut self, path: impl Into<String>) -> Self {
        self.path = Some(path.into());
        self
    }

    /// Add attribute name context
    pub fn with_attribute(mut self, attribute: impl Into<String>) -> Self {
        self.attribute = Some(attribute.into());
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    pub fn attribute(&self) -> Option<&str> {
        self.attribute.as_deref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(path) = &self.path {
            write!(f, " (path: {})", path)?;
        }
        if let Some(attribute) = &self.attribute {
            write!(f, " (attribute: {})", attribute)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {}

// ========== End Error Facility ==========

/// Error taxonomy for directory mapping operations
///
/// Every variant is terminal for the operation that raised it; nothing in
/// this crate retries.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DirError {
    /// Value coercion or storage failure within one attribute
    #[error("Attribute {attribute}: {message}")]
    Attribute { attribute: String, message: String },

    /// Criteria cannot be compiled, or filter construction failed
    #[error("Invalid query: {message}")]
    Query { message: String },

    /// No variant matches the entry's markers
    #[error("Unknown object type for UID {path}")]
    UnknownType { path: String },

    /// No entry at the given path
    #[error("No result found for {path}")]
    NotFound { path: String },

    /// Opaque backing store failure, message passed through unmodified
    #[error("{message}")]
    Transport { message: String },

    #[error("Configuration error: {message}")]
    Config { message: String },

    #[error("Invalid input: {message}")]
    InvalidInput { message: String },
}

impl DirError {
    /// Shorthand for an attribute failure
    pub fn attribute(attribute: impl Into<String>, message: impl Into<String>) -> Self {
        DirError::Attribute {
            attribute: attribute.into(),
            message: message.into(),
        }
    }

    /// Shorthand for a query compilation failure
    pub fn query(message: impl Into<String>) -> Self {
        DirError::Query {
            message: message.into(),
        }
    }

    /// Shorthand for a transport failure
    pub fn transport(message: impl Into<String>) -> Self {
        DirError::Transport {
            message: message.into(),
        }
    }

    /// Shorthand for a missing entry
    pub fn not_found(path: impl Into<String>) -> Self {
        DirError::NotFound { path: path.into() }
    }

    /// Get the canonical kind of this error
    pub fn kind(&self) -> ExErrorKind {
        match self {
            DirError::Attribute { .. } => ExErrorKind::Attribute,
            DirError::Query { .. } => ExErrorKind::Query,
            DirError::UnknownType { .. } => ExErrorKind::UnknownType,
            DirError::NotFound { .. } => ExErrorKind::NotFound,
            DirError::Transport { .. } => ExErrorKind::Transport,
            DirError::Config { .. } => ExErrorKind::Config,
            DirError::InvalidInput { .. } => ExErrorKind::InvalidInput,
        }
    }
}

/// Conversion from DirError to ExError
impl From<DirError> for ExError {
    fn from(err: DirError) -> Self {
        let kind = err.kind();
        match err {
            DirError::Attribute { attribute, message } => ExError::new(kind)
                .with_attribute(attribute)
                .with_message(message),

            DirError::Query { message } => ExError::new(kind)
                .with_op("translate")
                .with_message(message),

            DirError::UnknownType { path } => ExError::new(kind)
                .with_op("determine_type")
                .with_path(path)
                .with_message("Unknown object type"),

            DirError::NotFound { path } => ExError::new(kind)
                .with_path(path)
                .with_message("No entry found"),

            DirError::Transport { message } => ExError::new(kind).with_message(message),

            DirError::Config { message } => ExError::new(kind)
                .with_op("load_config")
                .with_message(message),

            DirError::InvalidInput { message } => ExError::new(kind).with_message(message),
        }
    }
}

/// Conversion from serde_yaml::Error to DirError
impl From<serde_yaml::Error> for DirError {
    fn from(err: serde_yaml::Error) -> Self {
        DirError::Config {
            message: format!("YAML parse error: {}", err),
        }
    }
}

/// Conversion from std::io::Error to DirError
impl From<std::io::Error> for DirError {
    fn from(err: std::io::Error) -> Self {
        DirError::Config {
            message: err.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_codes() {
        let cases = [
            (ExErrorKind::Attribute, "ERR_ATTRIBUTE"),
            (ExErrorKind::Query, "ERR_QUERY"),
            (ExErrorKind::UnknownType, "ERR_UNKNOWN_TYPE"),
            (ExErrorKind::NotFound, "ERR_NOT_FOUND"),
            (ExErrorKind::Transport, "ERR_TRANSPORT"),
            (ExErrorKind::Config, "ERR_CONFIG"),
        ];
        for (kind, expected_code) in cases {
            assert_eq!(kind.code(), expected_code, "Wrong code for {:?}", kind);
        }
    }

    #[test]
    fn test_transport_message_passes_through() {
        let err = DirError::transport("LDAP_SERVER_DOWN: Can't contact LDAP server");
        assert_eq!(err.to_string(), "LDAP_SERVER_DOWN: Can't contact LDAP server");

        let ex: ExError = err.into();
        assert_eq!(ex.message(), "LDAP_SERVER_DOWN: Can't contact LDAP server");
    }

    #[test]
    fn test_unknown_type_carries_path() {
        let ex: ExError = DirError::UnknownType {
            path: "cn=x,dc=example,dc=com".to_string(),
        }
        .into();
        assert_eq!(ex.kind(), ExErrorKind::UnknownType);
        assert_eq!(ex.path(), Some("cn=x,dc=example,dc=com"));
        assert_eq!(ex.op(), Some("determine_type"));
    }

    #[test]
    fn test_display_includes_context() {
        let ex = ExError::new(ExErrorKind::Attribute)
            .with_op("save")
            .with_attribute("createtimestamp")
            .with_message("read-only");
        let rendered = ex.to_string();
        assert!(rendered.starts_with("[ERR_ATTRIBUTE] in operation 'save': read-only"));
        assert!(rendered.contains("(attribute: createtimestamp)"));
    }
}
