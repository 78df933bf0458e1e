//! Turns one annotated struct into a [`DeclarationContext`].
//!
//! Extraction is a pure function of the declaration. It does not know which
//! macro facility handed it the tokens: the attribute macro and the source
//! scanner both build a [`Declaration`] and call [`extract`].

use proc_macro2::{Span, TokenStream};
use syn::parse::Parser;
use syn::punctuated::Punctuated;
use syn::spanned::Spanned;
use syn::{Attribute, Expr, ExprLit, Fields, ItemStruct, Lit, Meta, Path, Token};

use crate::context::{DeclarationContext, GenerationRequest, Prefix, SourceLocation};
use crate::error::ExtractionError;

/// Name of the attribute that marks an ID declaration.
pub const ATTRIBUTE: &str = "prefixed_id";

/// Traits every generated type implements.
const GENERATED_TRAITS: &[&str] = &[
    "Debug",
    "Default",
    "Clone",
    "Copy",
    "PartialEq",
    "Eq",
    "PartialOrd",
    "Ord",
    "Hash",
    "Serialize",
    "Deserialize",
];

/// One annotated struct, as seen by a macro or by the scanner.
#[derive(Debug, Clone)]
pub struct Declaration {
    /// The effective module path, `None` at top level.
    pub namespace: Option<String>,
    /// Tokens inside the attribute's parentheses.
    pub args: TokenStream,
    /// The struct, without the ID attribute.
    pub item: ItemStruct,
}

impl Declaration {
    pub fn new(namespace: Option<String>, args: TokenStream, item: ItemStruct) -> Self {
        Self {
            namespace,
            args,
            item,
        }
    }

    /// Splits the ID attribute off `item`. Returns `None` if it has none.
    pub fn from_annotated(namespace: Option<String>, mut item: ItemStruct) -> Option<Self> {
        let index = item.attrs.iter().position(is_id_attribute)?;
        let attr = item.attrs.remove(index);
        let args = match attr.meta {
            Meta::List(list) => list.tokens,
            Meta::Path(_) | Meta::NameValue(_) => TokenStream::new(),
        };
        Some(Self::new(namespace, args, item))
    }

    /// Best span to report `error` at.
    pub fn span_of(&self, error: &ExtractionError) -> Span {
        match error {
            ExtractionError::InvalidPrefix { .. } | ExtractionError::UnexpectedArgument { .. } => {
                if self.args.is_empty() {
                    self.item.ident.span()
                } else {
                    self.args.span()
                }
            }
            ExtractionError::NotUnitStruct { .. } => self.item.fields.span(),
            ExtractionError::Generic { .. } => self.item.generics.span(),
            ExtractionError::MissingPrefix { .. } => self.item.ident.span(),
            ExtractionError::ReservedDerive { .. } => reserved_derive(&self.item.attrs)
                .map_or_else(|| self.item.ident.span(), |path| path.span()),
        }
    }

    /// Converts `error` into a spanned compiler diagnostic.
    pub fn to_syn_error(&self, error: &ExtractionError) -> syn::Error {
        syn::Error::new(self.span_of(error), error)
    }
}

/// Returns true for `#[prefixed_id(..)]` and `#[prefixid::prefixed_id(..)]`.
pub fn is_id_attribute(attr: &Attribute) -> bool {
    let path = attr.path();
    match path.segments.len() {
        1 => path.is_ident(ATTRIBUTE),
        2 => path.segments[0].ident == "prefixid" && path.segments[1].ident == ATTRIBUTE,
        _ => false,
    }
}

/// Extracts the context of one declaration.
pub fn extract(decl: &Declaration) -> Result<DeclarationContext, ExtractionError> {
    let type_name = decl.item.ident.to_string();

    let raw = prefix_argument(&decl.args, &type_name)?;
    let prefix = Prefix::new(&raw).map_err(|reason| ExtractionError::InvalidPrefix {
        type_name: type_name.clone(),
        prefix: raw,
        reason,
    })?;

    if !matches!(decl.item.fields, Fields::Unit) {
        return Err(ExtractionError::NotUnitStruct { type_name });
    }

    if !decl.item.generics.params.is_empty() || decl.item.generics.where_clause.is_some() {
        return Err(ExtractionError::Generic { type_name });
    }

    if let Some(path) = reserved_derive(&decl.item.attrs) {
        let derive = path
            .segments
            .last()
            .map(|segment| segment.ident.to_string())
            .unwrap_or_default();
        return Err(ExtractionError::ReservedDerive { type_name, derive });
    }

    Ok(DeclarationContext::new(
        decl.namespace.clone(),
        type_name,
        prefix,
    ))
}

/// Extracts a declaration into a generation request.
pub fn request(
    decl: &Declaration,
    location: SourceLocation,
) -> Result<GenerationRequest, ExtractionError> {
    let context = extract(decl)?;
    Ok(GenerationRequest {
        context,
        ident: decl.item.ident.clone(),
        vis: decl.item.vis.clone(),
        attrs: decl.item.attrs.clone(),
        sources: vec![location],
    })
}

fn prefix_argument(args: &TokenStream, type_name: &str) -> Result<String, ExtractionError> {
    let missing = || ExtractionError::MissingPrefix {
        type_name: type_name.to_string(),
    };
    let unexpected = || ExtractionError::UnexpectedArgument {
        type_name: type_name.to_string(),
    };

    let parsed = Punctuated::<Expr, Token![,]>::parse_terminated
        .parse2(args.clone())
        .map_err(|_| unexpected())?;

    let mut exprs = parsed.into_iter();
    let first = exprs.next().ok_or_else(missing)?;
    let Expr::Lit(ExprLit {
        lit: Lit::Str(lit), ..
    }) = first
    else {
        return Err(missing());
    };

    if exprs.next().is_some() {
        return Err(unexpected());
    }

    Ok(lit.value())
}

/// First derived trait that collides with a generated impl.
fn reserved_derive(attrs: &[Attribute]) -> Option<Path> {
    attrs
        .iter()
        .filter(|attr| attr.path().is_ident("derive"))
        .find_map(|attr| {
            let paths = attr
                .parse_args_with(Punctuated::<Path, Token![,]>::parse_terminated)
                .ok()?;
            paths.into_iter().find(|path| {
                path.segments
                    .last()
                    .is_some_and(|last| GENERATED_TRAITS.iter().any(|name| last.ident == *name))
            })
        })
}
