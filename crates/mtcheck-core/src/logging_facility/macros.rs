//! Canonical logging macros
//!
//! These macros provide a structured, consistent way to log operations.

/// Log the start of an operation
///
/// # Example
///
/// ```
/// # use mtcheck_core::log_op_start;
/// log_op_start!("parse_snapshot");
/// log_op_start!("parse_snapshot", snapshot = "old.json");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = mtcheck_core_types::schema::EVENT_START,
        );
    };
    ($op:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = mtcheck_core_types::schema::EVENT_START,
            $($field)*
        );
    };
}

/// Log the successful end of an operation
///
/// # Example
///
/// ```
/// # use mtcheck_core::log_op_end;
/// log_op_end!("validate_sequence", duration_ms = 42);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = mtcheck_core_types::schema::EVENT_END,
            duration_ms = $duration,
        );
    };
    ($op:expr, duration_ms = $duration:expr, $($field:tt)*) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = mtcheck_core_types::schema::EVENT_END,
            duration_ms = $duration,
            $($field)*
        );
    };
}

/// Log an operation error
///
/// # Example
///
/// ```
/// # use mtcheck_core::log_op_error;
/// # use mtcheck_core::errors::{CheckError, CheckErrorKind};
/// let err = CheckError::new(CheckErrorKind::InvalidSnapshot);
/// log_op_error!("parse_snapshot", err, duration_ms = 10);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr) => {{
        use $crate::errors::CheckError;
        let check_err: CheckError = $err.into();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = mtcheck_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?check_err.kind(),
            err_code = check_err.code(),
        );
    }};
    ($op:expr, $err:expr, duration_ms = $duration:expr, $($field:tt)*) => {{
        use $crate::errors::CheckError;
        let check_err: CheckError = $err.into();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = mtcheck_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?check_err.kind(),
            err_code = check_err.code(),
            $($field)*
        );
    }};
}
