//! Trait definition for pluggable indexer adapters.
//!
//! Each indexer protocol (Newznab, Torznab, Nyaa, plain RSS) implements
//! [`IndexerAdapter`] to turn a search into a tiered request chain. Adapters
//! only build requests; fetching and parsing happen elsewhere.

use std::collections::HashMap;

use crate::adapters::{NewznabAdapter, NyaaAdapter, TorrentRssAdapter, TorznabAdapter};
use crate::config::SearchConfig;
use crate::criteria::SearchCriteria;
use crate::normalize::normalize;
use crate::request::TierChain;
use crate::types::{Capabilities, IndexerDescriptor, IndexerKind};

/// A pluggable indexer backend.
///
/// Implementors inspect the indexer's declared [`Capabilities`] and build
/// tiers from the most specific request (exact external identifier) to the
/// least specific (free-text title). A tier whose capability is missing is
/// left out entirely. When nothing is usable the chain is empty; that is
/// never an error.
///
/// All implementations must be `Send + Sync` so one registry can serve
/// concurrent searches.
pub trait IndexerAdapter: Send + Sync {
    /// Returns which [`IndexerKind`] this adapter serves.
    fn kind(&self) -> IndexerKind;

    /// Requests for the indexer's feed of recent releases.
    fn build_recent_requests(&self, indexer: &IndexerDescriptor, config: &SearchConfig) -> TierChain;

    /// Requests for a targeted search.
    ///
    /// Catalogue criteria produce an empty chain; catalogue fetches go
    /// through [`build_recent_requests`](Self::build_recent_requests).
    fn build_search_requests(
        &self,
        indexer: &IndexerDescriptor,
        criteria: &SearchCriteria,
        config: &SearchConfig,
    ) -> TierChain;
}

/// Lookup of adapters by indexer kind.
///
/// Adding a protocol means registering one more adapter; nothing else
/// branches on the kind.
pub struct AdapterRegistry {
    adapters: HashMap<IndexerKind, Box<dyn IndexerAdapter>>,
}

impl AdapterRegistry {
    /// An empty registry.
    pub fn new() -> Self {
        Self {
            adapters: HashMap::new(),
        }
    }

    /// A registry holding the built-in adapter of every [`IndexerKind`].
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(NewznabAdapter);
        registry.register(TorznabAdapter);
        registry.register(NyaaAdapter);
        registry.register(TorrentRssAdapter);
        registry
    }

    /// Register an adapter, replacing any previous one for the same kind.
    pub fn register(&mut self, adapter: impl IndexerAdapter + 'static) {
        self.adapters.insert(adapter.kind(), Box::new(adapter));
    }

    pub fn get(&self, kind: IndexerKind) -> Option<&dyn IndexerAdapter> {
        self.adapters.get(&kind).map(Box::as_ref)
    }

    pub fn len(&self) -> usize {
        self.adapters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.adapters.is_empty()
    }
}

impl Default for AdapterRegistry {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// Turn human-readable query text into what goes on the wire.
///
/// Indexers that take raw text get it percent-escaped but otherwise
/// untouched. Everyone else gets the normalised title, the same key the
/// matcher compares against. Returns `None` when the text normalises to
/// nothing.
pub fn query_text(text: &str, capabilities: &Capabilities) -> Option<String> {
    if capabilities.raw_text_search {
        let trimmed = text.trim();
        return (!trimmed.is_empty()).then(|| urlencoding::encode(trimmed).into_owned());
    }
    match normalize(text) {
        Ok(key) => Some(key),
        Err(err) => {
            tracing::trace!(error = %err, "query text skipped");
            None
        }
    }
}

/// Join categories for a request, dropping duplicates but keeping the
/// first-seen order.
pub fn join_categories(categories: &[u32]) -> String {
    let mut seen: Vec<u32> = Vec::with_capacity(categories.len());
    for category in categories {
        if !seen.contains(category) {
            seen.push(*category);
        }
    }
    seen.iter()
        .map(u32::to_string)
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_cover_every_kind() {
        let registry = AdapterRegistry::with_defaults();
        assert_eq!(registry.len(), IndexerKind::all().len());
        for kind in IndexerKind::all() {
            let adapter = registry.get(*kind).expect("adapter registered");
            assert_eq!(adapter.kind(), *kind);
        }
    }

    #[test]
    fn empty_registry() {
        let registry = AdapterRegistry::new();
        assert!(registry.is_empty());
        assert!(registry.get(IndexerKind::Newznab).is_none());
    }

    #[test]
    fn registry_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<AdapterRegistry>();
    }

    #[test]
    fn query_text_normalises_by_default() {
        let caps = Capabilities::text_only();
        assert_eq!(query_text("Monkey Island", &caps).as_deref(), Some("monkey+island"));
    }

    #[test]
    fn query_text_escapes_raw() {
        let caps = Capabilities {
            raw_text_search: true,
            ..Capabilities::text_only()
        };
        assert_eq!(
            query_text("Monkey Island", &caps).as_deref(),
            Some("Monkey%20Island")
        );
    }

    #[test]
    fn apostrophe_and_ampersand_deterministic() {
        let normalised = Capabilities::text_only();
        let raw = Capabilities {
            raw_text_search: true,
            ..Capabilities::text_only()
        };
        for _ in 0..3 {
            assert_eq!(
                query_text("Mike & Molly's", &normalised).as_deref(),
                Some("mike+and+mollys")
            );
            assert_eq!(
                query_text("Mike & Molly's", &raw).as_deref(),
                Some("Mike%20%26%20Molly%27s")
            );
        }
    }

    #[test]
    fn query_text_none_for_blank() {
        assert!(query_text("  ", &Capabilities::text_only()).is_none());
        let raw = Capabilities {
            raw_text_search: true,
            ..Default::default()
        };
        assert!(query_text("", &raw).is_none());
    }

    #[test]
    fn categories_deduplicated_in_order() {
        assert_eq!(join_categories(&[5030, 5040, 5030, 5000]), "5030,5040,5000");
        assert_eq!(join_categories(&[]), "");
    }
}
