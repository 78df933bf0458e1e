//! Error types for the build-time pipeline.

use std::path::PathBuf;

use thiserror::Error;

use crate::context::SourceLocation;

/// Why a prefix string was rejected.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PrefixError {
    #[error("prefix cannot be empty")]
    Empty,

    #[error("prefix is {len} characters long; the limit is 32")]
    TooLong { len: usize },

    #[error("prefix may only contain ASCII letters and digits, found {0:?}")]
    InvalidChar(char),
}

/// Errors found while reading one annotated declaration.
///
/// An extraction error is fatal to that declaration only.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ExtractionError {
    /// The attribute has no positional string argument.
    #[error("missing prefix: expected `#[prefixed_id(\"prefix\")]` on `{type_name}`")]
    MissingPrefix { type_name: String },

    /// The prefix argument is not a valid prefix.
    #[error("invalid prefix {prefix:?} on `{type_name}`: {reason}")]
    InvalidPrefix {
        type_name: String,
        prefix: String,
        #[source]
        reason: PrefixError,
    },

    /// The attribute has more than the single prefix argument.
    #[error("unexpected argument on `{type_name}`: the attribute takes a single prefix string")]
    UnexpectedArgument { type_name: String },

    /// The struct declares fields; the ID payload is supplied by generation.
    #[error("`{type_name}` must be a unit struct (`struct {type_name};`)")]
    NotUnitStruct { type_name: String },

    /// The struct declares generic parameters.
    #[error("`{type_name}` cannot have generic parameters")]
    Generic { type_name: String },

    /// A passthrough derive names a trait the generated type implements.
    #[error("`{type_name}` cannot derive `{derive}`: it is implemented by `#[prefixed_id]`")]
    ReservedDerive { type_name: String, derive: String },
}

impl ExtractionError {
    /// Name of the offending type.
    pub fn type_name(&self) -> &str {
        match self {
            ExtractionError::MissingPrefix { type_name }
            | ExtractionError::InvalidPrefix { type_name, .. }
            | ExtractionError::UnexpectedArgument { type_name }
            | ExtractionError::NotUnitStruct { type_name }
            | ExtractionError::Generic { type_name }
            | ExtractionError::ReservedDerive { type_name, .. } => type_name,
        }
    }
}

/// Errors from collapsing declarations into requests.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DedupError {
    /// One type was declared with two different prefixes.
    #[error("conflicting prefixes for `{qualified_name}`: '{first}' and '{second}'")]
    ConflictingPrefix {
        qualified_name: String,
        first: String,
        second: String,
    },
}

/// An extraction error tied to where it was found.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{location}: {error}")]
pub struct DeclarationError {
    pub location: SourceLocation,
    #[source]
    pub error: ExtractionError,
}

/// Errors from scanning sources and generating output.
#[derive(Debug, Error)]
pub enum ScanError {
    /// Failed to read or write a file.
    #[error("I/O error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A source file is not valid Rust.
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: syn::Error,
    },

    /// One or more declarations could not be extracted.
    #[error("{} invalid declaration(s); first: {}", .0.len(), .0[0])]
    Extraction(Vec<DeclarationError>),

    /// Declarations conflict.
    #[error(transparent)]
    Dedup(#[from] DedupError),

    /// A file name cannot be used as a module name.
    #[error("{path}: {segment:?} is not a valid module name")]
    InvalidModuleName { path: PathBuf, segment: String },

    /// The configured crate path does not parse as a Rust path.
    #[error("invalid crate path {0:?}")]
    InvalidCratePath(String),

    /// No output file was configured and `OUT_DIR` is not set.
    #[error("no output file configured and OUT_DIR is not set")]
    MissingOutDir,

    /// The scan was cancelled between declarations.
    #[error("scan cancelled")]
    Cancelled,
}
