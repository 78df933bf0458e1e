//! Bidirectional value converters for persistence layers.
//!
//! A persistence layer stores IDs as text. [`StringConverter`] is generic over
//! every [`PrefixedId`], so one converter definition covers all generated
//! types. With the `sqlx` feature, generated types also implement sqlx's
//! `Type`, `Encode`, and `Decode` through this converter.

use std::fmt;
use std::marker::PhantomData;

use crate::{IdError, PrefixedId};

/// Maps a model value to and from its stored representation.
pub trait ValueConverter {
    /// The in-memory type.
    type Model;
    /// The stored type.
    type Provider;

    /// Converts a model value for storage. Infallible.
    fn to_provider(&self, model: &Self::Model) -> Self::Provider;

    /// Converts a stored value back. Fails on malformed input.
    fn from_provider(&self, provider: &Self::Provider) -> Result<Self::Model, IdError>;
}

/// Stores any [`PrefixedId`] as its canonical string.
pub struct StringConverter<T>(PhantomData<fn() -> T>);

impl<T> StringConverter<T> {
    /// Creates a converter for `T`.
    #[must_use]
    pub const fn new() -> Self {
        Self(PhantomData)
    }
}

impl<T> Default for StringConverter<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for StringConverter<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for StringConverter<T> {}

impl<T> fmt::Debug for StringConverter<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("StringConverter")
            .field(&std::any::type_name::<T>())
            .finish()
    }
}

impl<T: PrefixedId> ValueConverter for StringConverter<T> {
    type Model = T;
    type Provider = String;

    fn to_provider(&self, model: &T) -> String {
        model.format()
    }

    fn from_provider(&self, provider: &String) -> Result<T, IdError> {
        T::parse(provider)
    }
}

impl<T: PrefixedId> StringConverter<T> {
    /// Parses a borrowed stored value without allocating.
    pub fn from_provider_str(&self, provider: &str) -> Result<T, IdError> {
        T::parse(provider)
    }
}
