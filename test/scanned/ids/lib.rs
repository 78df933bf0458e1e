//! Declarations scanned by `build.rs`.

/// Identifies a user account.
#[prefixed_id("usr")]
pub struct UserId;
