//! Operation logging macros
//!
//! A directory operation is bracketed by one `start` event and exactly one
//! of `end` or `end_error`. The closing macros take the `Instant` captured
//! at start and compute `duration_ms` themselves. Failures carry the error's
//! stable code plus the path and attribute it names, so a reader can tell
//! which entry or field went wrong without the message text.

use std::time::Instant;

#[doc(hidden)]
pub fn elapsed_ms(start: Instant) -> u64 {
    u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX)
}

/// Log the start of an operation
///
/// ```
/// # use dirmap_core::log_op_start;
/// log_op_start!("determine_type", path = "cn=a,dc=example,dc=com");
/// log_op_start!("list_objects", variant = "user");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::dirmap_core_types::schema::EVENT_START,
        );
    };
    ($op:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::dirmap_core_types::schema::EVENT_START,
            $($field)*
        );
    };
}

/// Log the successful end of an operation started at `$start`
///
/// ```
/// # use dirmap_core::log_op_end;
/// let start = std::time::Instant::now();
/// log_op_end!("search", start, result_len = 3);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, $start:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::dirmap_core_types::schema::EVENT_END,
            duration_ms = $crate::logging_facility::macros::elapsed_ms($start),
        );
    };
    ($op:expr, $start:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::dirmap_core_types::schema::EVENT_END,
            duration_ms = $crate::logging_facility::macros::elapsed_ms($start),
            $($field)*
        );
    };
}

/// Log the failure of an operation started at `$start`
///
/// `$err` is a `&DirError`; the caller keeps ownership and returns it.
///
/// ```
/// # use dirmap_core::{log_op_error, errors::DirError};
/// let start = std::time::Instant::now();
/// let err = DirError::not_found("cn=missing,dc=example,dc=com");
/// log_op_error!("read", &err, start);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, $start:expr) => {
        $crate::log_op_error!($op, $err, $start,)
    };
    ($op:expr, $err:expr, $start:expr, $($field:tt)*) => {{
        let ex_err = $crate::errors::ExError::from(::std::clone::Clone::clone($err));
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = $crate::dirmap_core_types::schema::EVENT_END_ERROR,
            duration_ms = $crate::logging_facility::macros::elapsed_ms($start),
            err.kind = ?ex_err.kind(),
            err.code = ex_err.code(),
            err.path = ex_err.path().unwrap_or_default(),
            err.attribute = ex_err.attribute().unwrap_or_default(),
            $($field)*
        );
    }};
}
