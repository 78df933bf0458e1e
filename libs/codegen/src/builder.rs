//! Build-script driver: scan source directories and write generated IDs.
//!
//! ```ignore
//! // build.rs
//! fn main() {
//!     prefixid_codegen::Builder::new()
//!         .source("ids")
//!         .generate()
//!         .expect("failed to generate IDs");
//! }
//!
//! // src/lib.rs
//! include!(concat!(env!("OUT_DIR"), "/prefixed_ids.rs"));
//! ```
//!
//! Files under a source root map to modules the way Cargo maps `src/`:
//! `billing.rs` and `billing/mod.rs` become `billing`, `billing/ledger.rs`
//! becomes `billing::ledger`, and `lib.rs`/`main.rs`/`mod.rs` at the root are
//! top level. The same type declared in several files of the same module is
//! generated once.

use std::path::{Path, PathBuf};

use tracing::{debug, info};
use walkdir::WalkDir;

use crate::context::GenerationRequest;
use crate::dedup::{ConflictPolicy, Deduplicator};
use crate::error::{DeclarationError, ScanError};
use crate::scan::{self, Cancellation, ScanOutput};
use crate::synth::{Synthesizer, DEFAULT_CRATE_PATH};

/// Default output file name inside `OUT_DIR`.
pub const DEFAULT_OUT_FILE: &str = "prefixed_ids.rs";

const HEADER: &str = "// @generated by prefixid-codegen. Do not edit.\n";

/// Result of scanning without failing on bad declarations.
#[derive(Debug, Default)]
pub struct Discovery {
    /// Deduplicated requests.
    pub requests: Vec<GenerationRequest>,
    pub errors: Vec<DeclarationError>,
    /// Every file that was read.
    pub files: Vec<PathBuf>,
}

/// What [`Builder::generate`] produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generated {
    pub path: PathBuf,
    /// Number of ID types emitted.
    pub types: usize,
    /// False when the existing file already had the same content.
    pub written: bool,
}

/// Configures and runs the scan → dedup → synthesize pipeline.
#[derive(Debug, Clone)]
pub struct Builder {
    sources: Vec<PathBuf>,
    out_file: Option<PathBuf>,
    policy: ConflictPolicy,
    crate_path: String,
    cancellation: Cancellation,
    cargo_directives: bool,
}

impl Default for Builder {
    fn default() -> Self {
        Self::new()
    }
}

impl Builder {
    pub fn new() -> Self {
        Self {
            sources: Vec::new(),
            out_file: None,
            policy: ConflictPolicy::default(),
            crate_path: DEFAULT_CRATE_PATH.to_string(),
            cancellation: Cancellation::new(),
            cargo_directives: std::env::var_os("CARGO_MANIFEST_DIR").is_some()
                && std::env::var_os("OUT_DIR").is_some(),
        }
    }

    /// Adds a file or directory to scan.
    #[must_use]
    pub fn source(mut self, path: impl Into<PathBuf>) -> Self {
        self.sources.push(path.into());
        self
    }

    /// Writes output to `path` instead of `$OUT_DIR/prefixed_ids.rs`.
    #[must_use]
    pub fn out_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.out_file = Some(path.into());
        self
    }

    #[must_use]
    pub fn conflict_policy(mut self, policy: ConflictPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Path of the runtime crate in generated code. Defaults to `::prefixid`.
    #[must_use]
    pub fn crate_path(mut self, path: impl Into<String>) -> Self {
        self.crate_path = path.into();
        self
    }

    #[must_use]
    pub fn cancellation(mut self, cancellation: Cancellation) -> Self {
        self.cancellation = cancellation;
        self
    }

    /// Whether to print `cargo:rerun-if-changed` lines. On by default when
    /// running inside a build script.
    #[must_use]
    pub fn cargo_directives(mut self, enabled: bool) -> Self {
        self.cargo_directives = enabled;
        self
    }

    /// Scans every source, keeping bad declarations as errors.
    pub fn discover(&self) -> Result<Discovery, ScanError> {
        let mut output = ScanOutput::default();
        let mut files = Vec::new();

        for root in &self.sources {
            for (path, namespace) in source_files(root)? {
                if self.cancellation.is_cancelled() {
                    return Err(ScanError::Cancelled);
                }
                debug!(path = %path.display(), namespace = ?namespace, "scanning source file");

                let text = std::fs::read_to_string(&path).map_err(|source| ScanError::Io {
                    path: path.clone(),
                    source,
                })?;
                let file = syn::parse_file(&text).map_err(|source| ScanError::Parse {
                    path: path.clone(),
                    source,
                })?;

                output.extend(scan::scan_file(
                    namespace.as_deref(),
                    &file,
                    Some(&path),
                    &self.cancellation,
                )?);
                files.push(path);
            }
        }

        let mut dedup = Deduplicator::new(self.policy);
        for request in output.requests {
            dedup.push(request)?;
        }

        Ok(Discovery {
            requests: dedup.finish(),
            errors: output.errors,
            files,
        })
    }

    /// Scans every source; fails if any declaration is invalid.
    pub fn scan(&self) -> Result<Vec<GenerationRequest>, ScanError> {
        let discovery = self.discover()?;
        if !discovery.errors.is_empty() {
            return Err(ScanError::Extraction(discovery.errors));
        }
        Ok(discovery.requests)
    }

    /// Renders generated source for `requests`.
    pub fn render(&self, requests: &[GenerationRequest]) -> Result<String, ScanError> {
        let krate: syn::Path = syn::parse_str(&self.crate_path)
            .map_err(|_| ScanError::InvalidCratePath(self.crate_path.clone()))?;
        let tokens = Synthesizer::with_crate_path(krate).synthesize_all(requests);
        Ok(format!("{HEADER}{tokens}\n"))
    }

    /// Runs the whole pipeline and writes the output file.
    ///
    /// The file is rewritten only when its content changes, so unchanged
    /// inputs do not trigger recompilation.
    pub fn generate(&self) -> Result<Generated, ScanError> {
        let out_file = match &self.out_file {
            Some(path) => path.clone(),
            None => std::env::var_os("OUT_DIR")
                .map(|dir| PathBuf::from(dir).join(DEFAULT_OUT_FILE))
                .ok_or(ScanError::MissingOutDir)?,
        };

        let discovery = self.discover()?;
        if self.cargo_directives {
            for source in &self.sources {
                println!("cargo:rerun-if-changed={}", source.display());
            }
            for file in &discovery.files {
                println!("cargo:rerun-if-changed={}", file.display());
            }
        }
        if !discovery.errors.is_empty() {
            return Err(ScanError::Extraction(discovery.errors));
        }

        let rendered = self.render(&discovery.requests)?;
        let unchanged = std::fs::read_to_string(&out_file).is_ok_and(|existing| existing == rendered);
        if unchanged {
            debug!(path = %out_file.display(), "generated IDs unchanged");
        } else {
            if let Some(parent) = out_file.parent() {
                std::fs::create_dir_all(parent).map_err(|source| ScanError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
            std::fs::write(&out_file, &rendered).map_err(|source| ScanError::Io {
                path: out_file.clone(),
                source,
            })?;
        }

        info!(
            path = %out_file.display(),
            types = discovery.requests.len(),
            "generated ID types"
        );
        Ok(Generated {
            path: out_file,
            types: discovery.requests.len(),
            written: !unchanged,
        })
    }
}

/// Lists `.rs` files under `root` with the module each one defines.
fn source_files(root: &Path) -> Result<Vec<(PathBuf, Option<String>)>, ScanError> {
    if root.is_file() {
        return Ok(vec![(root.to_path_buf(), None)]);
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(root).sort_by_file_name() {
        let entry = entry.map_err(|err| ScanError::Io {
            path: err.path().unwrap_or(root).to_path_buf(),
            source: err.into(),
        })?;
        let path = entry.path();
        if !entry.file_type().is_file() || path.extension().and_then(|e| e.to_str()) != Some("rs") {
            continue;
        }

        let relative = path.strip_prefix(root).unwrap_or(path);
        let namespace = module_path_of(relative, path)?;
        files.push((path.to_path_buf(), namespace));
    }
    Ok(files)
}

/// Maps a path relative to a source root to its module path.
fn module_path_of(relative: &Path, full: &Path) -> Result<Option<String>, ScanError> {
    let mut segments: Vec<String> = relative
        .parent()
        .into_iter()
        .flat_map(Path::components)
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();

    let stem = relative
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let is_root_file = segments.is_empty() && matches!(stem.as_str(), "lib" | "main");
    if stem != "mod" && !is_root_file {
        segments.push(stem);
    }

    let segments = segments
        .into_iter()
        .map(|segment| {
            module_segment(&segment).ok_or_else(|| ScanError::InvalidModuleName {
                path: full.to_path_buf(),
                segment,
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok((!segments.is_empty()).then(|| segments.join("::")))
}

/// The module name a file or directory is declared under. Keywords such as
/// `type` become raw identifiers.
fn module_segment(name: &str) -> Option<String> {
    if syn::parse_str::<syn::Ident>(name).is_ok() {
        return Some(name.to_string());
    }
    let raw = format!("r#{name}");
    syn::parse_str::<syn::Ident>(&raw).is_ok().then_some(raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn write(dir: &Path, name: &str, contents: &str) {
        let path = dir.join(name);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, contents).unwrap();
    }

    fn builder(dir: &Path) -> Builder {
        Builder::new()
            .source(dir)
            .cargo_directives(false)
            .out_file(dir.join("out/ids.rs"))
    }

    #[test]
    fn test_module_path_mapping() {
        let check = |rel: &str| module_path_of(Path::new(rel), Path::new(rel)).unwrap();
        assert_eq!(check("lib.rs"), None);
        assert_eq!(check("mod.rs"), None);
        assert_eq!(check("users.rs"), Some("users".to_string()));
        assert_eq!(check("billing/mod.rs"), Some("billing".to_string()));
        assert_eq!(check("billing/ledger.rs"), Some("billing::ledger".to_string()));
        assert_eq!(check("billing/lib.rs"), Some("billing::lib".to_string()));
        assert_eq!(check("type.rs"), Some("r#type".to_string()));
        assert_eq!(check("catalog/match.rs"), Some("catalog::r#match".to_string()));
        assert!(module_path_of(Path::new("my-ids.rs"), Path::new("my-ids.rs")).is_err());
        assert!(module_path_of(Path::new("self.rs"), Path::new("self.rs")).is_err());
    }

    #[test]
    fn test_render_raw_module_names() {
        let dir = tempfile::tempdir().unwrap();
        write(
            dir.path(),
            "catalog.rs",
            r#"
            pub mod r#type {
                #[prefixed_id("knd")]
                pub struct KindId;
            }
            "#,
        );
        write(dir.path(), "type.rs", r#"#[prefixed_id("tag")] pub struct TagId;"#);

        let requests = builder(dir.path()).scan().unwrap();
        let names: Vec<_> = requests.iter().map(|r| r.context.qualified_name()).collect();
        assert_eq!(names, vec!["catalog::r#type::KindId", "r#type::TagId"]);

        let rendered = builder(dir.path()).render(&requests).unwrap();
        let file = syn::parse_file(rendered.trim_start_matches(HEADER)).unwrap();
        let modules: Vec<_> = file
            .items
            .iter()
            .filter_map(|item| match item {
                syn::Item::Mod(m) => Some(m.ident.to_string()),
                _ => None,
            })
            .collect();
        assert_eq!(modules, vec!["catalog", "r#type"]);
    }

    #[test]
    fn test_render_raises_private_nested_types() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "billing.rs", r#"#[prefixed_id("inv")] struct InvoiceId;"#);

        let requests = builder(dir.path()).scan().unwrap();
        let rendered = builder(dir.path()).render(&requests).unwrap();
        let compact: String = rendered.chars().filter(|c| !c.is_whitespace()).collect();
        assert!(compact.contains("pubmodbilling{"));
        assert!(compact.contains("pub(crate)structInvoiceId("));
    }

    #[test]
    fn test_discover_dedups_across_files() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "billing.rs", r#"#[prefixed_id("inv")] pub struct InvoiceId;"#);
        write(
            dir.path(),
            "billing/mod.rs",
            r#"
            #[prefixed_id("inv")] pub struct InvoiceId;
            #[prefixed_id("pay")] pub struct PaymentId;
            "#,
        );
        write(dir.path(), "lib.rs", r#"#[prefixed_id("usr")] pub struct UserId;"#);

        let discovery = builder(dir.path()).discover().unwrap();
        assert!(discovery.errors.is_empty());
        assert_eq!(discovery.files.len(), 3);

        let names: Vec<_> = discovery
            .requests
            .iter()
            .map(|r| r.context.qualified_name())
            .collect();
        assert_eq!(names, vec!["UserId", "billing::InvoiceId", "billing::PaymentId"]);
        assert_eq!(discovery.requests[1].sources.len(), 2);
    }

    #[test]
    fn test_discover_conflict() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a/mod.rs", r#"#[prefixed_id("usr")] pub struct UserId;"#);
        write(dir.path(), "a.rs", r#"#[prefixed_id("user")] pub struct UserId;"#);

        let err = builder(dir.path()).discover().unwrap_err();
        assert!(matches!(err, ScanError::Dedup(_)));

        let discovery = builder(dir.path())
            .conflict_policy(ConflictPolicy::LastWins)
            .discover()
            .unwrap();
        assert_eq!(discovery.requests.len(), 1);
    }

    #[test]
    fn test_scan_fails_on_invalid_declaration() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "lib.rs", r#"#[prefixed_id("bad prefix")] pub struct UserId;"#);

        let err = builder(dir.path()).scan().unwrap_err();
        let ScanError::Extraction(errors) = err else {
            panic!("expected extraction error");
        };
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].location.file.as_deref(), Some(dir.path().join("lib.rs").as_path()));
    }

    #[test]
    fn test_parse_error_names_file() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "lib.rs", "pub struct {");
        let err = builder(dir.path()).discover().unwrap_err();
        assert!(matches!(err, ScanError::Parse { ref path, .. } if path.ends_with("lib.rs")));
    }

    #[test]
    fn test_generate_writes_once() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "ids.rs", r#"#[prefixed_id("usr")] pub struct UserId;"#);
        let builder = Builder::new()
            .source(dir.path().join("ids.rs"))
            .cargo_directives(false)
            .out_file(dir.path().join("gen/ids.rs"));

        let generated = builder.generate().unwrap();
        assert!(generated.written);
        assert_eq!(generated.types, 1);
        let out = generated.path;
        let first = fs::read_to_string(&out).unwrap();
        assert!(first.starts_with(HEADER));
        assert!(first.contains("UserId"));
        syn::parse_file(first.trim_start_matches(HEADER)).unwrap();

        let modified = fs::metadata(&out).unwrap().modified().unwrap();
        assert!(!builder.generate().unwrap().written);
        assert_eq!(fs::metadata(&out).unwrap().modified().unwrap(), modified);
    }

    #[test]
    fn test_render_rejects_bad_crate_path() {
        let err = Builder::new().crate_path("not a path").render(&[]).unwrap_err();
        assert!(matches!(err, ScanError::InvalidCratePath(_)));
    }

    #[test]
    fn test_discover_cancelled() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "lib.rs", r#"#[prefixed_id("usr")] pub struct UserId;"#);
        let cancel = Cancellation::new();
        cancel.cancel();
        let err = builder(dir.path()).cancellation(cancel).discover().unwrap_err();
        assert!(matches!(err, ScanError::Cancelled));
    }
}
