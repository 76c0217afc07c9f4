//! Canonical schema constants for structured logging and events
//!
//! These constants ensure consistency across all logging and error reporting.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";

// Directory identifiers
pub const FIELD_PATH: &str = "path";
pub const FIELD_BASE: &str = "base";
pub const FIELD_VARIANT: &str = "variant";
pub const FIELD_FILTER: &str = "filter";

// Collection sizes
pub const FIELD_RESULT_LEN: &str = "result_len";
pub const FIELD_DROPPED_LEN: &str = "dropped_len";

// Error fields
pub const FIELD_ERR_KIND: &str = "err.kind";
pub const FIELD_ERR_CODE: &str = "err.code";
pub const FIELD_ERR_PATH: &str = "err.path";
pub const FIELD_ERR_ATTRIBUTE: &str = "err.attribute";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
