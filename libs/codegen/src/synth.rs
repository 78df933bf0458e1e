//! Emits ID types from generation requests.
//!
//! The struct itself is always emitted by [`Synthesizer`]; everything else
//! comes from a list of [`Adapter`]s. Each adapter receives the same
//! [`SynthesisContext`], so the prefix literal and crate path are computed
//! once per type and every adapter delegates to the shared codec in the
//! runtime crate.

use std::collections::BTreeMap;

use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::{parse_quote, Ident, LitStr, Path, Visibility};

use crate::context::GenerationRequest;

/// Default path of the runtime crate in generated code.
pub const DEFAULT_CRATE_PATH: &str = "::prefixid";

/// Per-type inputs shared by every adapter.
pub struct SynthesisContext<'a> {
    pub request: &'a GenerationRequest,
    /// Path of the runtime crate, e.g. `::prefixid`.
    pub krate: &'a Path,
    pub ident: &'a Ident,
    /// The prefix as a string literal.
    pub prefix: LitStr,
}

/// Emits one group of impls for a generated type.
pub trait Adapter {
    /// Short name, used in logs.
    fn name(&self) -> &'static str;

    fn emit(&self, cx: &SynthesisContext<'_>) -> TokenStream;
}

/// Inherent methods, `Display`/`FromStr`/`Debug`/`Default`, and conversions.
pub struct CoreAdapter;

/// `PrefixedId` and the link-time registration.
pub struct CapabilityAdapter;

/// serde `Serialize`/`Deserialize`.
pub struct SerdeAdapter;

/// sqlx `Type`/`Encode`/`Decode`, active when the runtime crate's `sqlx`
/// feature is on.
pub struct SqlxAdapter;

impl Adapter for CoreAdapter {
    fn name(&self) -> &'static str {
        "core"
    }

    fn emit(&self, cx: &SynthesisContext<'_>) -> TokenStream {
        let SynthesisContext {
            krate,
            ident,
            prefix,
            ..
        } = cx;

        quote! {
            #[allow(dead_code)]
            impl #ident {
                /// The prefix for this ID type.
                pub const PREFIX: &'static str = #prefix;

                /// The empty ID: the nil ULID with this type's prefix.
                pub const EMPTY: Self = Self(#krate::Ulid(0));

                /// Creates a new ID with a fresh, time-ordered ULID.
                #[must_use]
                pub fn new() -> Self {
                    Self(#krate::codec::generate())
                }

                /// Creates an ID from a raw ULID.
                #[must_use]
                pub const fn from_ulid(ulid: #krate::Ulid) -> Self {
                    Self(ulid)
                }

                /// Returns the underlying ULID.
                #[must_use]
                pub const fn ulid(&self) -> #krate::Ulid {
                    self.0
                }

                /// Returns true if this is the empty ID.
                #[must_use]
                pub const fn is_empty(&self) -> bool {
                    #krate::codec::is_empty(self.0)
                }

                /// Returns the timestamp portion of the ULID in milliseconds.
                #[must_use]
                pub fn timestamp_ms(&self) -> u64 {
                    self.0.timestamp_ms()
                }

                /// Returns the creation time encoded in the ULID.
                #[must_use]
                pub fn datetime(&self) -> ::std::time::SystemTime {
                    self.0.datetime()
                }

                /// Parses an ID from `{prefix}_{ulid}`.
                pub fn parse(s: &str) -> ::core::result::Result<Self, #krate::IdError> {
                    #krate::codec::parse(Self::PREFIX, s).map(Self)
                }

                /// Parses an ID, returning `None` on malformed input.
                #[must_use]
                pub fn try_parse(s: &str) -> ::core::option::Option<Self> {
                    Self::parse(s).ok()
                }

                /// Parses an ID, returning the empty ID on malformed input.
                #[must_use]
                pub fn parse_or_empty(s: &str) -> Self {
                    match Self::parse(s) {
                        ::core::result::Result::Ok(id) => id,
                        ::core::result::Result::Err(_) => Self::EMPTY,
                    }
                }
            }

            impl ::core::default::Default for #ident {
                fn default() -> Self {
                    Self::EMPTY
                }
            }

            impl ::core::fmt::Display for #ident {
                fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                    #krate::codec::write(f, Self::PREFIX, self.0)
                }
            }

            impl ::core::fmt::Debug for #ident {
                fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                    f.debug_tuple(::core::stringify!(#ident))
                        .field(&::core::format_args!("{}", self))
                        .finish()
                }
            }

            impl ::core::str::FromStr for #ident {
                type Err = #krate::IdError;

                fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                    Self::parse(s)
                }
            }

            impl ::core::convert::From<#krate::Ulid> for #ident {
                fn from(ulid: #krate::Ulid) -> Self {
                    Self(ulid)
                }
            }

            impl ::core::convert::From<#ident> for #krate::Ulid {
                fn from(id: #ident) -> Self {
                    id.0
                }
            }

            impl ::core::convert::From<u128> for #ident {
                fn from(value: u128) -> Self {
                    Self(#krate::Ulid(value))
                }
            }

            impl ::core::convert::From<#ident> for u128 {
                fn from(id: #ident) -> Self {
                    id.0 .0
                }
            }

            impl ::core::convert::From<#ident> for ::std::string::String {
                fn from(id: #ident) -> Self {
                    ::std::string::ToString::to_string(&id)
                }
            }

            impl ::core::convert::TryFrom<&str> for #ident {
                type Error = #krate::IdError;

                fn try_from(s: &str) -> ::core::result::Result<Self, Self::Error> {
                    Self::parse(s)
                }
            }

            impl ::core::convert::TryFrom<::std::string::String> for #ident {
                type Error = #krate::IdError;

                fn try_from(s: ::std::string::String) -> ::core::result::Result<Self, Self::Error> {
                    Self::parse(&s)
                }
            }

            impl ::core::convert::AsRef<#krate::Ulid> for #ident {
                fn as_ref(&self) -> &#krate::Ulid {
                    &self.0
                }
            }
        }
    }
}

impl Adapter for CapabilityAdapter {
    fn name(&self) -> &'static str {
        "capability"
    }

    fn emit(&self, cx: &SynthesisContext<'_>) -> TokenStream {
        let SynthesisContext {
            krate,
            ident,
            prefix,
            ..
        } = cx;

        quote! {
            impl #krate::PrefixedId for #ident {
                const PREFIX: &'static str = #prefix;
                const EMPTY: Self = Self(#krate::Ulid(0));

                fn from_ulid(ulid: #krate::Ulid) -> Self {
                    Self(ulid)
                }

                fn ulid(&self) -> #krate::Ulid {
                    self.0
                }
            }

            #krate::__private::inventory::submit! {
                #krate::registry::Registration::of::<#ident>(::core::module_path!())
            }
        }
    }
}

impl Adapter for SerdeAdapter {
    fn name(&self) -> &'static str {
        "serde"
    }

    fn emit(&self, cx: &SynthesisContext<'_>) -> TokenStream {
        let SynthesisContext { krate, ident, .. } = cx;

        quote! {
            impl #krate::__private::serde::Serialize for #ident {
                fn serialize<S>(&self, serializer: S) -> ::core::result::Result<S::Ok, S::Error>
                where
                    S: #krate::__private::serde::Serializer,
                {
                    #krate::__private::serialize(self, serializer)
                }
            }

            impl<'de> #krate::__private::serde::Deserialize<'de> for #ident {
                fn deserialize<D>(deserializer: D) -> ::core::result::Result<Self, D::Error>
                where
                    D: #krate::__private::serde::Deserializer<'de>,
                {
                    #krate::__private::deserialize(Self::PREFIX, deserializer)
                }
            }
        }
    }
}

impl Adapter for SqlxAdapter {
    fn name(&self) -> &'static str {
        "sqlx"
    }

    fn emit(&self, cx: &SynthesisContext<'_>) -> TokenStream {
        let SynthesisContext { krate, ident, .. } = cx;
        quote! {
            #krate::__impl_sqlx!(#ident);
        }
    }
}

/// Builds ID types from requests.
pub struct Synthesizer {
    krate: Path,
    adapters: Vec<Box<dyn Adapter>>,
}

impl Default for Synthesizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Synthesizer {
    /// A synthesizer targeting `::prefixid` with every built-in adapter.
    pub fn new() -> Self {
        Self::with_crate_path(syn::parse_quote!(::prefixid))
    }

    /// Like [`Synthesizer::new`], with a different runtime crate path.
    pub fn with_crate_path(krate: Path) -> Self {
        Self::bare(krate)
            .with_adapter(CoreAdapter)
            .with_adapter(CapabilityAdapter)
            .with_adapter(SerdeAdapter)
            .with_adapter(SqlxAdapter)
    }

    /// A synthesizer that emits only the struct until adapters are added.
    pub fn bare(krate: Path) -> Self {
        Self {
            krate,
            adapters: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_adapter(mut self, adapter: impl Adapter + 'static) -> Self {
        self.adapters.push(Box::new(adapter));
        self
    }

    /// Names of the configured adapters, in emission order.
    pub fn adapter_names(&self) -> Vec<&'static str> {
        self.adapters.iter().map(|a| a.name()).collect()
    }

    /// Emits the complete type for one request.
    ///
    /// # Panics
    ///
    /// If the request's prefix is not canonical. Prefixes are validated on
    /// extraction, so this indicates a bug in the caller.
    pub fn synthesize(&self, request: &GenerationRequest) -> TokenStream {
        self.emit(request, &request.vis)
    }

    fn emit(&self, request: &GenerationRequest, vis: &Visibility) -> TokenStream {
        let prefix = request.context.prefix();
        assert!(
            prefix.is_canonical(),
            "prefix {prefix:?} reached synthesis without validation"
        );

        let cx = SynthesisContext {
            request,
            krate: &self.krate,
            ident: &request.ident,
            prefix: LitStr::new(prefix.as_str(), Span::call_site()),
        };

        let krate = &self.krate;
        let ident = &request.ident;
        let attrs = &request.attrs;

        let adapters = self.adapters.iter().map(|adapter| {
            tracing::trace!(adapter = adapter.name(), type_name = %ident, "emitting adapter");
            adapter.emit(&cx)
        });

        quote! {
            #(#attrs)*
            #[derive(Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
            #vis struct #ident(#krate::Ulid);

            #(#adapters)*
        }
    }

    /// Emits every request, nesting each type in `pub mod` blocks that
    /// mirror its namespace.
    ///
    /// A private nested type is emitted as `pub(crate)`, since nothing else
    /// lives in its generated module.
    pub fn synthesize_all(&self, requests: &[GenerationRequest]) -> TokenStream {
        let mut root = ModuleTree::default();
        for request in requests {
            let mut node = &mut root;
            let tokens = match request.context.namespace() {
                Some(namespace) => {
                    for segment in namespace.split("::") {
                        node = node.children.entry(segment.to_string()).or_default();
                    }
                    self.emit(request, &nested_visibility(&request.vis))
                }
                None => self.synthesize(request),
            };
            node.items.push(tokens);
        }
        root.into_tokens()
    }
}

fn nested_visibility(vis: &Visibility) -> Visibility {
    match vis {
        Visibility::Inherited => parse_quote!(pub(crate)),
        Visibility::Restricted(restricted)
            if restricted.in_token.is_none() && restricted.path.is_ident("self") =>
        {
            parse_quote!(pub(crate))
        }
        _ => vis.clone(),
    }
}

/// Module name for a namespace segment. Raw identifiers keep their `r#`.
fn module_ident(segment: &str) -> Ident {
    match segment.strip_prefix("r#") {
        Some(raw) => Ident::new_raw(raw, Span::call_site()),
        None => Ident::new(segment, Span::call_site()),
    }
}

#[derive(Default)]
struct ModuleTree {
    items: Vec<TokenStream>,
    children: BTreeMap<String, ModuleTree>,
}

impl ModuleTree {
    fn into_tokens(self) -> TokenStream {
        let items = self.items;
        let children = self.children.into_iter().map(|(name, child)| {
            let name = module_ident(&name);
            let body = child.into_tokens();
            quote! {
                pub mod #name {
                    #body
                }
            }
        });
        quote! {
            #(#items)*
            #(#children)*
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use quote::ToTokens;
    use crate::context::{DeclarationContext, Prefix, SourceLocation};

    fn req(namespace: Option<&str>, name: &str, prefix: &str) -> GenerationRequest {
        GenerationRequest {
            context: DeclarationContext::new(
                namespace.map(str::to_string),
                name,
                Prefix::new(prefix).unwrap(),
            ),
            ident: Ident::new(name, Span::call_site()),
            vis: parse_quote!(pub),
            attrs: vec![parse_quote!(#[doc = " A user."])],
            sources: vec![SourceLocation { file: None, line: 1 }],
        }
    }

    #[test]
    fn test_synthesize_parses_as_items() {
        let tokens = Synthesizer::new().synthesize(&req(None, "UserId", "usr"));
        let file: syn::File = syn::parse2(tokens).unwrap();

        let structs: Vec<_> = file
            .items
            .iter()
            .filter_map(|item| match item {
                syn::Item::Struct(s) => Some(s.ident.to_string()),
                _ => None,
            })
            .collect();
        assert_eq!(structs, vec!["UserId"]);
    }

    fn compact(tokens: TokenStream) -> String {
        tokens
            .to_string()
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect()
    }

    #[test]
    fn test_synthesize_emits_every_adapter() {
        let text = compact(Synthesizer::new().synthesize(&req(None, "UserId", "usr")));
        assert!(text.contains("pubconstPREFIX:&'staticstr=\"usr\""));
        assert!(text.contains("impl::prefixid::PrefixedIdforUserId"));
        assert!(text.contains("inventory::submit!"));
        assert!(text.contains("::prefixid::__impl_sqlx!(UserId)"));
        assert!(text.contains("#[doc=\"Auser.\"]"));
    }

    #[test]
    fn test_bare_synthesizer_emits_struct_only() {
        let synth = Synthesizer::bare(parse_quote!(crate::ids));
        assert!(synth.adapter_names().is_empty());
        let text = compact(synth.synthesize(&req(None, "UserId", "usr")));
        assert!(text.contains("pubstructUserId(crate::ids::Ulid);"));
        assert!(!text.contains("PREFIX"));
    }

    #[test]
    fn test_custom_crate_path() {
        let synth = Synthesizer::with_crate_path(parse_quote!(my_ids));
        assert_eq!(synth.adapter_names(), vec!["core", "capability", "serde", "sqlx"]);
        let text = compact(synth.synthesize(&req(None, "UserId", "usr")));
        assert!(text.contains("my_ids::codec::parse"));
        assert!(!text.contains("::prefixid"));
    }

    #[test]
    #[should_panic(expected = "reached synthesis without validation")]
    fn test_synthesize_rejects_unvalidated_prefix() {
        let mut request = req(None, "UserId", "usr");
        request.context = DeclarationContext::new(None, "UserId", Prefix::unchecked("us_r"));
        Synthesizer::new().synthesize(&request);
    }

    #[test]
    fn test_synthesize_all_nests_namespaces() {
        let requests = vec![
            req(None, "UserId", "usr"),
            req(Some("billing"), "InvoiceId", "inv"),
            req(Some("billing::ledger"), "EntryId", "ent"),
        ];
        let tokens = Synthesizer::new().synthesize_all(&requests);
        let file: syn::File = syn::parse2(tokens).unwrap();

        let billing = file
            .items
            .iter()
            .find_map(|item| match item {
                syn::Item::Mod(m) if m.ident == "billing" => Some(m),
                _ => None,
            })
            .unwrap();
        let (_, items) = billing.content.as_ref().unwrap();
        assert!(items
            .iter()
            .any(|item| matches!(item, syn::Item::Mod(m) if m.ident == "ledger")));
        assert!(items
            .iter()
            .any(|item| matches!(item, syn::Item::Struct(s) if s.ident == "InvoiceId")));
    }

    fn find_mod<'a>(items: &'a [syn::Item], name: &str) -> &'a [syn::Item] {
        items
            .iter()
            .find_map(|item| match item {
                syn::Item::Mod(m) if m.ident == name => m.content.as_ref(),
                _ => None,
            })
            .map(|(_, items)| items.as_slice())
            .unwrap()
    }

    #[test]
    fn test_synthesize_all_keeps_raw_module_names() {
        let requests = vec![
            req(Some("r#type"), "KindId", "knd"),
            req(Some("catalog::r#match"), "RuleId", "rul"),
        ];
        let tokens = Synthesizer::new().synthesize_all(&requests);
        assert!(compact(tokens.clone()).contains("pubmodr#type{"));

        let file: syn::File = syn::parse2(tokens).unwrap();
        let kinds = find_mod(&file.items, "r#type");
        assert!(kinds
            .iter()
            .any(|item| matches!(item, syn::Item::Struct(s) if s.ident == "KindId")));
        let rules = find_mod(find_mod(&file.items, "catalog"), "r#match");
        assert!(rules
            .iter()
            .any(|item| matches!(item, syn::Item::Struct(s) if s.ident == "RuleId")));
    }

    fn visibility_of(items: &[syn::Item], name: &str) -> String {
        items
            .iter()
            .find_map(|item| match item {
                syn::Item::Struct(s) if s.ident == name => Some(compact(s.vis.to_token_stream())),
                _ => None,
            })
            .unwrap()
    }

    #[test]
    fn test_synthesize_all_raises_private_nested_types() {
        let mut private = req(Some("billing"), "InvoiceId", "inv");
        private.vis = Visibility::Inherited;
        let mut scoped = req(Some("billing"), "RefundId", "ref");
        scoped.vis = parse_quote!(pub(self));
        let mut parent = req(Some("billing"), "CreditId", "crd");
        parent.vis = parse_quote!(pub(super));
        let mut top = req(None, "SessionId", "ses");
        top.vis = Visibility::Inherited;

        let tokens = Synthesizer::new().synthesize_all(&[private, scoped, parent, top]);
        let file: syn::File = syn::parse2(tokens).unwrap();
        let billing = find_mod(&file.items, "billing");

        assert_eq!(visibility_of(billing, "InvoiceId"), "pub(crate)");
        assert_eq!(visibility_of(billing, "RefundId"), "pub(crate)");
        assert_eq!(visibility_of(billing, "CreditId"), "pub(super)");
        assert_eq!(visibility_of(&file.items, "SessionId"), "");
    }
}
