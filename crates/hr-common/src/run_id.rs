//! Process and snapshot identifiers.
//!
//! The process id is a ULID generated on first access and shared for the
//! lifetime of the process; it is logged at startup so log lines from one
//! server instance can be grouped. Record store snapshots get their own ULID
//! from [`generate`], which makes reloads visible in logs and responses.

use once_cell::sync::Lazy;
use ulid::Ulid;

static RUN_ID: Lazy<String> = Lazy::new(|| Ulid::new().to_string());

/// Returns the process-level run ID.
#[inline]
pub fn get() -> &'static str {
    &RUN_ID
}

/// Generates a fresh, time-ordered ULID.
#[inline]
pub fn generate() -> String {
    Ulid::new().to_string()
}
