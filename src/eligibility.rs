//! Selection of the indexers allowed to serve a search.
//!
//! Pure and order-preserving: the output keeps the catalogue's order.
//! Misconfigured indexers (missing API key or categories) are excluded
//! here, so the dispatcher never sees them.

use crate::types::{IndexerDescriptor, TagId};

/// Which request chain the selected indexers will run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchMode {
    /// Targeted search; requires automatic-search support.
    Search,
    /// Catalogue-wide recent fetch; requires RSS support.
    Recent,
}

/// Select the indexers usable for an entity with the given tags.
///
/// An indexer is eligible when it:
///
/// 1. supports the requested [`FetchMode`],
/// 2. is fully configured for its kind (API key, categories), and
/// 3. declares no tags, or shares at least one tag with the entity.
///
/// Tags are not checked for [`FetchMode::Recent`]: a catalogue fetch has no
/// entity, so every RSS-capable indexer takes part.
pub fn eligible_indexers<'a>(
    catalogue: &'a [IndexerDescriptor],
    entity_tags: &[TagId],
    mode: FetchMode,
) -> Vec<&'a IndexerDescriptor> {
    catalogue
        .iter()
        .filter(|indexer| supports_mode(indexer, mode))
        .filter(|indexer| is_configured(indexer))
        .filter(|indexer| mode == FetchMode::Recent || tags_allow(&indexer.tags, entity_tags))
        .collect()
}

/// Tag rule on its own: untagged indexers serve everyone, tagged indexers
/// serve entities sharing at least one tag.
pub fn tags_allow(indexer_tags: &[TagId], entity_tags: &[TagId]) -> bool {
    indexer_tags.is_empty() || indexer_tags.iter().any(|tag| entity_tags.contains(tag))
}

fn supports_mode(indexer: &IndexerDescriptor, mode: FetchMode) -> bool {
    match mode {
        FetchMode::Search => indexer.supports_automatic_search,
        FetchMode::Recent => indexer.supports_rss,
    }
}

fn is_configured(indexer: &IndexerDescriptor) -> bool {
    let has_key = indexer
        .api_key
        .as_deref()
        .is_some_and(|key| !key.trim().is_empty());
    if indexer.kind.requires_api_key() && !has_key {
        tracing::warn!(indexer = %indexer.name, "indexer has no API key, skipping");
        return false;
    }
    if indexer.kind.requires_categories() && indexer.categories.is_empty() {
        tracing::warn!(indexer = %indexer.name, "indexer has no categories, skipping");
        return false;
    }
    true
}
