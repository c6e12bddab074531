//! UUID utilities

use uuid::Uuid;

/// Generate a new UUIDv4
pub fn generate() -> Uuid {
    Uuid::new_v4()
}

/// Generate a short opaque identifier (first 8 hex digits of a UUIDv4)
///
/// Used for display-level ids such as mock user ids. Snap ids use the full
/// UUID so they stay unique for the whole session.
pub fn short_id() -> String {
    let simple = Uuid::new_v4().simple().to_string();
    simple[..8].to_string()
}
