//! # prefixid-codegen
//!
//! The build-time half of prefixid: turns `#[prefixed_id("...")]`
//! declarations into ID types.
//!
//! The pipeline is a chain of pure steps, independent of any particular
//! macro API:
//!
//! 1. [`extract`] reads one [`Declaration`] into a [`DeclarationContext`]
//! 2. [`dedup`] collapses repeated declarations into one [`GenerationRequest`]
//!    per type, rejecting conflicting prefixes by default
//! 3. [`synth`] emits the type and its adapters as a token stream
//!
//! The `prefixid-macros` attribute macro runs steps 1 and 3 in place. The
//! [`Builder`] runs all three over source directories from a build script,
//! and the `prefixid-gen` CLI does the same from the command line.

pub mod builder;
mod context;
pub mod dedup;
mod error;
pub mod extract;
pub mod scan;
pub mod synth;

pub use builder::{Builder, Discovery, Generated};
pub use context::{DeclarationContext, GenerationRequest, Prefix, SourceLocation, MAX_PREFIX_LEN};
pub use dedup::{ConflictPolicy, Deduplicator};
pub use error::{DeclarationError, DedupError, ExtractionError, PrefixError, ScanError};
pub use extract::{extract, Declaration};
pub use scan::{scan_file, Cancellation, ScanOutput};
pub use synth::{Adapter, SynthesisContext, Synthesizer};
