//! The capability trait implemented by every generated ID type.

use std::any::{type_name, Any};
use std::cmp::Ordering;
use std::fmt;
use std::hash::Hash;
use std::str::FromStr;

use serde::de::DeserializeOwned;
use serde::Serialize;
use ulid::Ulid;

use crate::{codec, IdError};

/// A typed, prefixed ULID.
///
/// Implemented by `#[prefixed_id("...")]`. Generic code (converters, the
/// registry, persistence adapters) works against this trait and never needs
/// to know how a particular type was generated.
pub trait PrefixedId:
    Copy
    + Eq
    + Ord
    + Hash
    + fmt::Debug
    + fmt::Display
    + FromStr<Err = IdError>
    + Serialize
    + DeserializeOwned
    + Send
    + Sync
    + 'static
{
    /// The prefix for this ID type. Lowercase, no separator.
    const PREFIX: &'static str;

    /// The empty sentinel: the nil ULID with this type's prefix.
    const EMPTY: Self;

    /// Wraps a raw ULID.
    fn from_ulid(ulid: Ulid) -> Self;

    /// Returns the underlying ULID.
    fn ulid(&self) -> Ulid;

    /// Creates a new ID with a fresh, time-ordered ULID.
    #[must_use]
    fn new() -> Self {
        Self::from_ulid(codec::generate())
    }

    /// Parses an ID from `{prefix}_{ulid}`.
    fn parse(s: &str) -> Result<Self, IdError> {
        codec::parse(Self::PREFIX, s).map(Self::from_ulid)
    }

    /// Parses an ID, returning `None` on any malformed input.
    fn try_parse(s: &str) -> Option<Self> {
        Self::parse(s).ok()
    }

    /// Parses an ID, returning [`PrefixedId::EMPTY`] on any malformed input.
    fn parse_or_empty(s: &str) -> Self {
        Self::try_parse(s).unwrap_or(Self::EMPTY)
    }

    /// Formats the ID in canonical lowercase form.
    fn format(&self) -> String {
        codec::format(Self::PREFIX, self.ulid())
    }

    /// Returns true if this is the empty sentinel.
    fn is_empty(&self) -> bool {
        codec::is_empty(self.ulid())
    }

    /// Compares against a value whose type is only known at runtime.
    ///
    /// Returns [`IdError::IncompatibleType`] if `other` is not a `Self`;
    /// that is a caller bug, not an ordering.
    fn compare_any(&self, other: &dyn Any) -> Result<Ordering, IdError> {
        other
            .downcast_ref::<Self>()
            .map(|other| self.cmp(other))
            .ok_or(IdError::IncompatibleType {
                expected: type_name::<Self>(),
            })
    }
}
