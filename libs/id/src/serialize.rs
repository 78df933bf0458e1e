//! Shared serde plumbing for generated ID types.
//!
//! IDs serialize as their canonical string. Deserialization accepts only
//! strings; `null` and unit are rejected through the deserializer's own error
//! type so callers see a normal serde error.

use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;

use serde::de::{self, Unexpected, Visitor};
use serde::{Deserializer, Serializer};

use crate::IdError;

/// Serializes an ID as its `Display` form.
pub fn serialize<T, S>(id: &T, serializer: S) -> Result<S::Ok, S::Error>
where
    T: fmt::Display,
    S: Serializer,
{
    serializer.collect_str(id)
}

/// Deserializes an ID with the given prefix from a string.
pub fn deserialize<'de, T, D>(prefix: &'static str, deserializer: D) -> Result<T, D::Error>
where
    T: FromStr<Err = IdError>,
    D: Deserializer<'de>,
{
    deserializer.deserialize_str(IdVisitor {
        prefix,
        marker: PhantomData,
    })
}

struct IdVisitor<T> {
    prefix: &'static str,
    marker: PhantomData<fn() -> T>,
}

impl<T> Visitor<'_> for IdVisitor<T>
where
    T: FromStr<Err = IdError>,
{
    type Value = T;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "an ID string of the form `{}_<ulid>`", self.prefix)
    }

    fn visit_str<E>(self, v: &str) -> Result<T, E>
    where
        E: de::Error,
    {
        v.parse().map_err(E::custom)
    }

    fn visit_none<E>(self) -> Result<T, E>
    where
        E: de::Error,
    {
        Err(E::invalid_type(Unexpected::Option, &self))
    }

    fn visit_unit<E>(self) -> Result<T, E>
    where
        E: de::Error,
    {
        Err(E::invalid_type(Unexpected::Unit, &self))
    }
}
