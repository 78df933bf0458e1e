//! Declaration contexts and generation requests.

use std::fmt;
use std::path::PathBuf;

use syn::{Attribute, Ident, Visibility};

use crate::error::PrefixError;

/// Longest prefix accepted.
pub const MAX_PREFIX_LEN: usize = 32;

/// A validated ID prefix.
///
/// Non-empty, ASCII alphanumeric, at most [`MAX_PREFIX_LEN`] characters,
/// stored lowercase. The alphabet excludes the `_` separator and whitespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Prefix(String);

impl Prefix {
    /// Validates and canonicalizes `raw`.
    pub fn new(raw: &str) -> Result<Self, PrefixError> {
        if raw.is_empty() {
            return Err(PrefixError::Empty);
        }
        if raw.len() > MAX_PREFIX_LEN {
            return Err(PrefixError::TooLong { len: raw.len() });
        }
        if let Some(c) = raw.chars().find(|c| !c.is_ascii_alphanumeric()) {
            return Err(PrefixError::InvalidChar(c));
        }
        Ok(Self(raw.to_ascii_lowercase()))
    }

    #[cfg(test)]
    pub(crate) fn unchecked(raw: &str) -> Self {
        Self(raw.to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// True if the stored value satisfies every prefix rule.
    pub fn is_canonical(&self) -> bool {
        Self::new(&self.0).is_ok_and(|p| p.0 == self.0)
    }
}

impl fmt::Display for Prefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// What the extractor learns from one annotated declaration.
///
/// Two contexts are the same generation request exactly when all three
/// fields are equal.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct DeclarationContext {
    namespace: Option<String>,
    type_name: String,
    prefix: Prefix,
}

impl DeclarationContext {
    /// Builds a context. An empty namespace means top level.
    pub fn new(namespace: Option<String>, type_name: impl Into<String>, prefix: Prefix) -> Self {
        Self {
            namespace: namespace.filter(|ns| !ns.is_empty()),
            type_name: type_name.into(),
            prefix,
        }
    }

    /// The module path the type lives in, `None` at top level.
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn prefix(&self) -> &Prefix {
        &self.prefix
    }

    /// `namespace::TypeName`, or just `TypeName` at top level.
    pub fn qualified_name(&self) -> String {
        match &self.namespace {
            Some(ns) => format!("{ns}::{}", self.type_name),
            None => self.type_name.clone(),
        }
    }
}

/// Where a declaration was found.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct SourceLocation {
    pub file: Option<PathBuf>,
    pub line: usize,
}

impl fmt::Display for SourceLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.file {
            Some(file) => write!(f, "{}:{}", file.display(), self.line),
            None => write!(f, "<input>:{}", self.line),
        }
    }
}

/// A deduplicated request to synthesize one ID type.
#[derive(Debug, Clone)]
pub struct GenerationRequest {
    pub context: DeclarationContext,
    /// The declared type name, carrying its source span.
    pub ident: Ident,
    pub vis: Visibility,
    /// Outer attributes of the declaration, minus the ID attribute itself.
    pub attrs: Vec<Attribute>,
    /// Every declaration that collapsed into this request.
    pub sources: Vec<SourceLocation>,
}
