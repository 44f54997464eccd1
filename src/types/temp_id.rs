//! Placeholder identifiers for entities the server has not confirmed yet.
//!
//! Optimistic rows live in the same lists as server rows, so the distinction
//! is carried by a reserved prefix rather than by the type system.

use uuid::Uuid;

/// Prefix reserved for client-generated ids.
pub const TEMP_ID_PREFIX: &str = "temp-";

/// Generates a fresh placeholder id.
pub fn new_temp_id() -> String {
    format!("{}{}", TEMP_ID_PREFIX, Uuid::new_v4())
}

/// Returns true when `id` was generated on the client and never reached the server.
pub fn is_temp_id(id: &str) -> bool {
    id.starts_with(TEMP_ID_PREFIX)
}

/// Keeps only the ids the server knows about, preserving order.
pub fn server_ids(ids: &[String]) -> Vec<String> {
    ids.iter().filter(|id| !is_temp_id(id)).cloned().collect()
}
