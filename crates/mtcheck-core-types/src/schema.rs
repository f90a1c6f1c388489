//! Canonical schema constants for structured logging and events
//!
//! These constants ensure consistency across all logging and error reporting.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";

// Entity identifiers
pub const FIELD_SNAPSHOT: &str = "snapshot";
pub const FIELD_SNAPSHOT_DIGEST: &str = "snapshot_digest";
pub const FIELD_MACHINE: &str = "machine";
pub const FIELD_DEVICE_TYPE: &str = "device_type";

// Collection sizes
pub const FIELD_SNAPSHOT_COUNT: &str = "snapshot_count";
pub const FIELD_MACHINE_COUNT: &str = "machine_count";
pub const FIELD_DIAGNOSTIC_COUNT: &str = "diagnostic_count";

// Error fields
pub const FIELD_ERR_KIND: &str = "err_kind";
pub const FIELD_ERR_CODE: &str = "err_code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";
