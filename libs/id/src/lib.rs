//! # prefixid
//!
//! Typed, prefixed ULID identifiers.
//!
//! ## Design Principles
//!
//! - Each entity gets its own ID type, so a `UserId` cannot be passed where
//!   an `OrgId` is expected
//! - All IDs share one canonical string representation with strict parsing
//! - IDs support roundtrip serialization (parse → format → parse)
//! - Generated types are discovered at runtime without a central list
//!
//! ## ID Format
//!
//! All IDs use a prefixed format: `{prefix}_{ulid}`, always lowercase.
//!
//! Examples:
//! - `usr_01hv4z2wqxkjnm8gpqy6vbkc3d`
//! - `org_01hv4z3mxnkpqr9hstz7wcld4e`
//! - `usr_00000000000000000000000000` (the empty ID)
//!
//! IDs sort by creation time because the ULID's high bits are a millisecond
//! timestamp, and IDs created on one thread in the same millisecond still
//! sort in creation order. Parsing accepts any letter case; formatting
//! always produces lowercase.
//!
//! ## Declaring an ID
//!
//! ```ignore
//! use prefixid::prefixed_id;
//!
//! /// Identifies a user account.
//! #[prefixed_id("usr")]
//! pub struct UserId;
//!
//! let id = UserId::new();
//! let parsed: UserId = id.to_string().parse()?;
//! ```

extern crate self as prefixid;

pub mod codec;
pub mod convert;
mod error;
mod id;
mod macros;
pub mod registry;
mod serialize;

pub use convert::{StringConverter, ValueConverter};
pub use error::IdError;
pub use id::PrefixedId;
pub use registry::{configure, ConverterSet, IdConverter, JsonConverter, ModuleSet, Registration};

/// Declares a typed ID. See the crate documentation.
pub use prefixid_macros::prefixed_id;

/// Re-export ulid for consumers that need raw ULID operations
pub use ulid::Ulid;

#[doc(hidden)]
pub mod __private {
    pub use crate::serialize::{deserialize, serialize};
    pub use inventory;
    pub use serde;
    #[cfg(feature = "sqlx")]
    pub use sqlx;
}
