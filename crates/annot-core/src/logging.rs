//! Structured logging field names for annot.
//!
//! All crates use these constants for consistent structured logging fields,
//! so log aggregation can query by the same names across subsystems.
//!
//! ## Log Level Contract
//!
//! | Level | Usage |
//! |-------|-------|
//! | ERROR | Storage failures, anything that surfaces as a 500 |
//! | WARN  | Authorization denials |
//! | INFO  | Lifecycle events (startup, shutdown), audited note mutations |
//! | DEBUG | Decision points, query shapes, config choices |
//! | TRACE | Per-request listing detail |

// ─── Identity fields ───────────────────────────────────────────────────────

/// Correlation ID propagated from the HTTP layer.
/// Format: UUIDv7 (time-ordered).
pub const REQUEST_ID: &str = "request_id";

/// Subsystem originating the log event.
/// Values: "api", "core", "db"
pub const SUBSYSTEM: &str = "subsystem";

/// Component within a subsystem.
/// Examples: "note_service", "policy", "pool", "notes"
pub const COMPONENT: &str = "component";

/// Logical operation name.
/// Examples: "list", "read", "create", "update", "delete"
pub const OPERATION: &str = "op";

// ─── Entity fields ─────────────────────────────────────────────────────────

/// Note id being operated on.
pub const NOTE_ID: &str = "note_id";

/// Calling user id.
pub const USER_ID: &str = "user_id";

/// Tenant (organization) id.
pub const ORG_ID: &str = "org_id";

/// Resource type tag a note is attached to.
pub const RESOURCE_TYPE: &str = "resource_type";

/// Resource id a note is attached to.
pub const RESOURCE_ID: &str = "resource_id";

// ─── Measurement fields ────────────────────────────────────────────────────

/// Wall-clock duration in milliseconds.
pub const DURATION_MS: &str = "duration_ms";

/// Number of results returned by a query.
pub const RESULT_COUNT: &str = "result_count";

/// Rows touched by a write.
pub const ROWS_AFFECTED: &str = "rows_affected";

// ─── Database fields ───────────────────────────────────────────────────────

/// Number of active connections in the pool.
pub const POOL_SIZE: &str = "pool_size";

/// Number of idle connections in the pool.
pub const POOL_IDLE: &str = "pool_idle";

// ─── Outcome fields ────────────────────────────────────────────────────────

/// Permission that was required for a denied operation.
pub const PERMISSION: &str = "permission";

/// Error message when an operation fails.
pub const ERROR_MSG: &str = "error";

/// Every field name above, for log-schema checks.
pub const ALL_FIELDS: &[&str] = &[
    REQUEST_ID,
    SUBSYSTEM,
    COMPONENT,
    OPERATION,
    NOTE_ID,
    USER_ID,
    ORG_ID,
    RESOURCE_TYPE,
    RESOURCE_ID,
    DURATION_MS,
    RESULT_COUNT,
    ROWS_AFFECTED,
    POOL_SIZE,
    POOL_IDLE,
    PERMISSION,
    ERROR_MSG,
];
