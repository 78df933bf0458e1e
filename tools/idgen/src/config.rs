//! Project configuration.
//!
//! Settings come from, in increasing precedence:
//! - built-in defaults
//! - `prefixid.toml` in the working directory, or the file named by `--config`
//! - command-line flags and their `PREFIXID_*` environment variables

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use prefixid_codegen::{Builder, Cancellation, ConflictPolicy};
use serde::Deserialize;

/// Configuration file looked up when `--config` is not given.
pub const CONFIG_FILE: &str = "prefixid.toml";

/// Source directory scanned when nothing else is configured.
const DEFAULT_SOURCE: &str = "src";

/// Contents of `prefixid.toml`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Files or directories to scan.
    pub sources: Vec<PathBuf>,

    /// Output file for `generate`.
    pub out: Option<PathBuf>,

    /// `reject` or `last-wins`.
    pub conflict: Option<String>,

    /// Path of the runtime crate in generated code.
    pub crate_path: Option<String>,
}

impl Config {
    /// Load config from `path`, or from `prefixid.toml` if present.
    ///
    /// An explicit path must exist. Relative paths inside the file are
    /// resolved against the file's directory.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let path = match path {
            Some(path) => path.to_path_buf(),
            None => {
                let default = PathBuf::from(CONFIG_FILE);
                if !default.exists() {
                    return Ok(Self::default());
                }
                default
            }
        };

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read config from {}", path.display()))?;
        let config = Self::from_toml_str(&contents)
            .with_context(|| format!("Failed to parse config from {}", path.display()))?;

        let base = path.parent().unwrap_or_else(|| Path::new(""));
        Ok(config.relative_to(base))
    }

    pub fn from_toml_str(contents: &str) -> Result<Self> {
        Ok(toml::from_str(contents)?)
    }

    fn relative_to(mut self, base: &Path) -> Self {
        for source in &mut self.sources {
            if source.is_relative() {
                *source = base.join(&*source);
            }
        }
        if let Some(out) = &mut self.out {
            if out.is_relative() {
                *out = base.join(&*out);
            }
        }
        self
    }
}

/// Command-line values that take precedence over the file.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub sources: Vec<PathBuf>,
    pub out: Option<PathBuf>,
    pub conflict: Option<ConflictPolicy>,
    pub crate_path: Option<String>,
}

/// Effective settings after merging every layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub sources: Vec<PathBuf>,
    pub out: Option<PathBuf>,
    pub conflict: ConflictPolicy,
    pub crate_path: Option<String>,
}

impl Settings {
    pub fn resolve(config: Config, overrides: Overrides) -> Result<Self> {
        let file_conflict = config
            .conflict
            .as_deref()
            .map(str::parse::<ConflictPolicy>)
            .transpose()
            .map_err(|e| anyhow::anyhow!("Invalid `conflict` in config: {e}"))?;

        let sources = if !overrides.sources.is_empty() {
            overrides.sources
        } else if !config.sources.is_empty() {
            config.sources
        } else {
            vec![PathBuf::from(DEFAULT_SOURCE)]
        };

        Ok(Self {
            sources,
            out: overrides.out.or(config.out),
            conflict: overrides.conflict.or(file_conflict).unwrap_or_default(),
            crate_path: overrides.crate_path.or(config.crate_path),
        })
    }

    /// A codegen builder over these settings.
    pub fn builder(&self, cancellation: &Cancellation) -> Builder {
        let mut builder = Builder::new()
            .conflict_policy(self.conflict)
            .cancellation(cancellation.clone())
            .cargo_directives(false);
        for source in &self.sources {
            builder = builder.source(source);
        }
        if let Some(crate_path) = &self.crate_path {
            builder = builder.crate_path(crate_path);
        }
        builder
    }
}
