//! Finds annotated declarations in parsed source files.

use std::path::Path;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use syn::{File, Item};

use crate::context::{GenerationRequest, SourceLocation};
use crate::error::{DeclarationError, ScanError};
use crate::extract::{self, Declaration};

/// A cooperative cancellation flag, checked between declarations.
#[derive(Debug, Clone, Default)]
pub struct Cancellation(Arc<AtomicBool>);

impl Cancellation {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cancel(&self) {
        self.0.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }

    fn check(&self) -> Result<(), ScanError> {
        if self.is_cancelled() {
            Err(ScanError::Cancelled)
        } else {
            Ok(())
        }
    }
}

/// Everything found in one file.
#[derive(Debug, Default)]
pub struct ScanOutput {
    pub requests: Vec<GenerationRequest>,
    /// Declarations that failed extraction. Others are unaffected.
    pub errors: Vec<DeclarationError>,
}

impl ScanOutput {
    pub fn extend(&mut self, other: ScanOutput) {
        self.requests.extend(other.requests);
        self.errors.extend(other.errors);
    }
}

/// Scans `file`, whose items live in module `namespace`.
///
/// Inline `mod` blocks extend the namespace. Out-of-line `mod foo;`
/// declarations are skipped; their files are scanned on their own.
pub fn scan_file(
    namespace: Option<&str>,
    file: &File,
    path: Option<&Path>,
    cancel: &Cancellation,
) -> Result<ScanOutput, ScanError> {
    let mut segments: Vec<String> = namespace
        .into_iter()
        .flat_map(|ns| ns.split("::"))
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    let mut output = ScanOutput::default();
    scan_items(&file.items, &mut segments, path, cancel, &mut output)?;
    Ok(output)
}

fn scan_items(
    items: &[Item],
    segments: &mut Vec<String>,
    path: Option<&Path>,
    cancel: &Cancellation,
    output: &mut ScanOutput,
) -> Result<(), ScanError> {
    for item in items {
        match item {
            Item::Struct(item) => {
                let namespace = (!segments.is_empty()).then(|| segments.join("::"));
                let Some(decl) = Declaration::from_annotated(namespace, item.clone()) else {
                    continue;
                };
                cancel.check()?;

                let location = SourceLocation {
                    file: path.map(Path::to_path_buf),
                    line: decl.item.ident.span().start().line,
                };
                match extract::request(&decl, location.clone()) {
                    Ok(request) => output.requests.push(request),
                    Err(error) => output.errors.push(DeclarationError { location, error }),
                }
            }
            Item::Mod(module) => {
                if let Some((_, items)) = &module.content {
                    segments.push(module.ident.to_string());
                    let result = scan_items(items, segments, path, cancel, output);
                    segments.pop();
                    result?;
                }
            }
            _ => {}
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ExtractionError;

    fn parse(src: &str) -> File {
        syn::parse_file(src).unwrap()
    }

    #[test]
    fn test_scan_finds_nested_declarations() {
        let file = parse(
            r#"
            use prefixid::prefixed_id;

            #[prefixed_id("usr")]
            pub struct UserId;

            pub struct NotAnId;

            pub mod billing {
                #[prefixid::prefixed_id("inv")]
                pub struct InvoiceId;

                mod ledger {
                    #[prefixed_id("ent")]
                    pub(crate) struct EntryId;
                }
            }

            mod external;
            "#,
        );

        let out = scan_file(Some("app"), &file, None, &Cancellation::new()).unwrap();
        assert!(out.errors.is_empty());

        let names: Vec<_> = out
            .requests
            .iter()
            .map(|r| r.context.qualified_name())
            .collect();
        assert_eq!(
            names,
            vec!["app::UserId", "app::billing::InvoiceId", "app::billing::ledger::EntryId"]
        );
    }

    #[test]
    fn test_scan_reports_bad_declaration_and_continues() {
        let file = parse(
            r#"
            #[prefixed_id]
            pub struct Broken;

            #[prefixed_id("ok")]
            pub struct Fine;
            "#,
        );

        let out = scan_file(None, &file, Some(Path::new("ids.rs")), &Cancellation::new()).unwrap();
        assert_eq!(out.requests.len(), 1);
        assert_eq!(out.requests[0].context.type_name(), "Fine");
        assert_eq!(out.errors.len(), 1);
        assert_eq!(
            out.errors[0].error,
            ExtractionError::MissingPrefix {
                type_name: "Broken".into()
            }
        );
        assert_eq!(out.errors[0].location.line, 3);
        assert_eq!(out.errors[0].to_string(), format!(
            "ids.rs:3: {}",
            out.errors[0].error
        ));
    }

    #[test]
    fn test_scan_top_level_has_no_namespace() {
        let file = parse(r#"#[prefixed_id("usr")] struct UserId;"#);
        let out = scan_file(None, &file, None, &Cancellation::new()).unwrap();
        assert_eq!(out.requests[0].context.namespace(), None);
    }

    #[test]
    fn test_scan_cancelled() {
        let file = parse(r#"#[prefixed_id("usr")] struct UserId;"#);
        let cancel = Cancellation::new();
        cancel.cancel();
        assert!(matches!(
            scan_file(None, &file, None, &cancel),
            Err(ScanError::Cancelled)
        ));
    }

    #[test]
    fn test_scan_without_declarations_ignores_cancellation() {
        let file = parse("pub struct Plain; fn main() {}");
        let cancel = Cancellation::new();
        cancel.cancel();
        let out = scan_file(None, &file, None, &cancel).unwrap();
        assert!(out.requests.is_empty());
    }
}
