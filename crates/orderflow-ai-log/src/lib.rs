// SPDX-License-Identifier: MIT OR Apache-2.0
//! AI Call Log / Cache (C7): canonicalizes provider call inputs into a
//! stable hash, and gives cache short-circuiting over successful calls for
//! the same (tenant, call-type, input-hash) (§4.7).
#![deny(unsafe_code)]
#![warn(missing_docs)]

use std::collections::HashMap;

use orderflow_core::{sha256_hex, TenantId};
use serde::{Deserialize, Serialize};

/// The kind of provider call being logged, part of the cache key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CallType {
    /// Text-prompted extraction.
    LlmExtractText,
    /// Vision-prompted extraction.
    LlmExtractVision,
    /// JSON repair of a prior malformed output.
    LlmRepairJson,
    /// Embedding of a query or catalog text.
    Embedding,
}

/// Maximum characters retained from the prompt content before hashing, per
/// §4.7: "truncates to 1000 chars for hash stability."
const CANONICAL_TRUNCATE_LEN: usize = 1000;

/// Canonicalize a prompt for hashing: normalize whitespace (collapse runs,
/// trim), then truncate to [`CANONICAL_TRUNCATE_LEN`] characters. The
/// caller is responsible for stripping any tenant-specific prelude before
/// calling this — canonicalization itself is content-agnostic.
#[must_use]
pub fn canonicalize_prompt(raw: &str) -> String {
    let normalized: String = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    normalized.chars().take(CANONICAL_TRUNCATE_LEN).collect()
}

/// Compute the deterministic input-hash for an AI call: SHA-256 over the
/// `(template_id, canonicalized_prompt)` tuple (§4.7, GLOSSARY).
///
/// Never pass raw, un-canonicalized, PII-laden content here directly;
/// always canonicalize first.
#[must_use]
pub fn input_hash(template_id: &str, canonical_prompt: &str) -> String {
    let tuple = format!("{template_id}\u{1}{canonical_prompt}");
    sha256_hex(tuple.as_bytes())
}

/// Cache key for a successful AI call: (tenant, call-type, input-hash).
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CacheKey {
    /// Tenant the call was made for.
    pub tenant_id: TenantId,
    /// Which kind of call.
    pub call_type: CallType,
    /// The deterministic input-hash.
    pub input_hash: String,
}

/// Outcome of a cache lookup-or-reserve.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheLookup<T> {
    /// A prior successful call for this key exists; its output is reused
    /// and no new provider call is made.
    Hit(T),
    /// No prior successful call exists; the caller must dispatch one and
    /// then call [`AiCallCache::record_success`] or
    /// [`AiCallCache::record_failure`].
    Miss,
}

/// An in-process cache over successful AI calls, keyed by
/// (tenant, call-type, input-hash). Failed calls are never cached (§4.7,
/// §5 idempotence invariant iii).
#[derive(Debug, Default)]
pub struct AiCallCache<T> {
    successes: HashMap<CacheKey, T>,
}

impl<T: Clone> AiCallCache<T> {
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self {
        Self {
            successes: HashMap::new(),
        }
    }

    /// Look up a cached successful output for `key`.
    #[must_use]
    pub fn lookup(&self, key: &CacheKey) -> CacheLookup<T> {
        match self.successes.get(key) {
            Some(value) => CacheLookup::Hit(value.clone()),
            None => CacheLookup::Miss,
        }
    }

    /// Record a successful call's output under `key`, making it available
    /// to future lookups.
    pub fn record_success(&mut self, key: CacheKey, output: T) {
        self.successes.insert(key, output);
    }

    /// A failed call is a deliberate no-op: nothing is recorded, so the
    /// next attempt for the same key is still a cache miss.
    pub fn record_failure(&self, _key: &CacheKey) {}

    /// Number of distinct successful calls cached.
    #[must_use]
    pub fn len(&self) -> usize {
        self.successes.len()
    }

    /// `true` if no successful calls are cached.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.successes.is_empty()
    }
}
