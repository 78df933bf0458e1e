//! Attribute macro for declaring typed IDs.
//!
//! Use it through the `prefixid` crate, which re-exports it and provides the
//! runtime the generated code calls into.

use proc_macro::TokenStream;
use prefixid_codegen::{extract, Declaration, SourceLocation, Synthesizer};
use syn::{parse_macro_input, ItemStruct};

/// Turns a unit struct into a typed, prefixed ULID.
///
/// ```ignore
/// use prefixid::prefixed_id;
///
/// /// Identifies a user account.
/// #[prefixed_id("usr")]
/// pub struct UserId;
/// ```
///
/// Generates:
/// * `struct UserId(Ulid)` deriving `Clone`, `Copy`, `Eq`, `Ord`, `Hash`
/// * `PREFIX` and `EMPTY` constants, `new`, `parse`, `try_parse`, `parse_or_empty`,
///   `timestamp_ms`, `datetime`
/// * `Display`, `FromStr`, `Debug`, `Default` (the empty ID)
/// * conversions to and from `Ulid`, `u128`, and `String`
/// * `PrefixedId`, serde, and (with the `sqlx` feature) sqlx impls
/// * a registration picked up by `prefixid::configure`
///
/// The prefix must be 1 to 32 ASCII letters or digits. It is stored
/// lowercase.
#[proc_macro_attribute]
pub fn prefixed_id(attr: TokenStream, item: TokenStream) -> TokenStream {
    let item = parse_macro_input!(item as ItemStruct);
    let decl = Declaration::new(None, attr.into(), item);

    match extract::request(&decl, SourceLocation { file: None, line: 0 }) {
        Ok(request) => Synthesizer::new().synthesize(&request).into(),
        Err(error) => decl.to_syn_error(&error).to_compile_error().into(),
    }
}
