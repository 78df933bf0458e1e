//! Collapses repeated declarations into one request per type.

use std::collections::{BTreeSet, HashMap};

use tracing::{debug, warn};

use crate::context::{DeclarationContext, GenerationRequest};
use crate::error::DedupError;

/// What to do when one type is declared with two different prefixes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum ConflictPolicy {
    /// Fail generation.
    #[default]
    Reject,
    /// Keep the declaration seen last.
    LastWins,
}

impl std::str::FromStr for ConflictPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reject" => Ok(Self::Reject),
            "last-wins" | "last_wins" => Ok(Self::LastWins),
            other => Err(format!(
                "unknown conflict policy {other:?} (expected \"reject\" or \"last-wins\")"
            )),
        }
    }
}

/// Accumulates requests, keyed by `(namespace, type_name)`.
#[derive(Debug, Default)]
pub struct Deduplicator {
    policy: ConflictPolicy,
    requests: Vec<GenerationRequest>,
    index: HashMap<(Option<String>, String), usize>,
}

impl Deduplicator {
    pub fn new(policy: ConflictPolicy) -> Self {
        Self {
            policy,
            ..Self::default()
        }
    }

    /// Adds a request.
    ///
    /// A request whose context equals an earlier one is merged into it. A
    /// request for the same type with a different prefix is handled per the
    /// [`ConflictPolicy`].
    pub fn push(&mut self, request: GenerationRequest) -> Result<(), DedupError> {
        let key = (
            request.context.namespace().map(str::to_string),
            request.context.type_name().to_string(),
        );

        let Some(&i) = self.index.get(&key) else {
            self.index.insert(key, self.requests.len());
            self.requests.push(request);
            return Ok(());
        };

        let existing = &mut self.requests[i];
        if existing.context == request.context {
            debug!(
                type_name = %request.context.qualified_name(),
                "merging duplicate declaration"
            );
            existing.sources.extend(request.sources);
            return Ok(());
        }

        match self.policy {
            ConflictPolicy::Reject => Err(DedupError::ConflictingPrefix {
                qualified_name: request.context.qualified_name(),
                first: existing.context.prefix().to_string(),
                second: request.context.prefix().to_string(),
            }),
            ConflictPolicy::LastWins => {
                warn!(
                    type_name = %request.context.qualified_name(),
                    replaced = %existing.context.prefix(),
                    prefix = %request.context.prefix(),
                    "conflicting prefix; keeping the last declaration"
                );
                *existing = request;
                Ok(())
            }
        }
    }

    /// Returns the requests, sorted by namespace then type name.
    pub fn finish(self) -> Vec<GenerationRequest> {
        let mut requests = self.requests;
        requests.sort_by(|a, b| a.context.cmp(&b.context));
        requests
    }
}

/// Deduplicates `requests` in one go.
pub fn dedup(
    requests: impl IntoIterator<Item = GenerationRequest>,
    policy: ConflictPolicy,
) -> Result<Vec<GenerationRequest>, DedupError> {
    let mut dedup = Deduplicator::new(policy);
    for request in requests {
        dedup.push(request)?;
    }
    Ok(dedup.finish())
}

/// The distinct contexts in `contexts`, sorted.
///
/// Contexts that differ only in prefix are both kept.
pub fn unique_contexts(
    contexts: impl IntoIterator<Item = DeclarationContext>,
) -> Vec<DeclarationContext> {
    contexts
        .into_iter()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}
