//! Nyaa-style trackers: free-text RSS search, no identifiers.
//!
//! Requests look like `{base}/?page=rss{additional}&q={term}&p={page}`.
//! Nyaa takes human-readable search terms, so by default queries are
//! escaped rather than normalised.

use crate::adapter::{query_text, IndexerAdapter};
use crate::config::SearchConfig;
use crate::criteria::{SearchCriteria, SearchKind};
use crate::request::{IndexerRequest, PagedRequest, TierChain};
use crate::types::{IndexerDescriptor, IndexerKind};

/// Nyaa request builder.
pub struct NyaaAdapter;

impl NyaaAdapter {
    fn base_url(indexer: &IndexerDescriptor) -> String {
        format!(
            "{}/?page=rss{}",
            indexer.base_url.as_str().trim_end_matches('/'),
            indexer.additional_parameters.as_deref().unwrap_or_default()
        )
    }

    fn search_term(title: &str, kind: SearchKind) -> String {
        match kind {
            SearchKind::Season { season } => format!("{title} S{season:02}"),
            SearchKind::Date { air_date } => format!("{title} {}", air_date.format("%Y.%m.%d")),
            SearchKind::Entity | SearchKind::Catalogue => title.to_string(),
        }
    }

    fn paged(indexer: &IndexerDescriptor, max_pages: u32, term: &str) -> PagedRequest {
        let base = format!("{}&q={term}", Self::base_url(indexer));
        if indexer.page_size == 0 {
            return PagedRequest::new(vec![IndexerRequest::rss(base)]);
        }
        PagedRequest::new(
            (1..=max_pages)
                .map(|page| IndexerRequest::rss(format!("{base}&p={page}")))
                .collect(),
        )
    }
}

impl IndexerAdapter for NyaaAdapter {
    fn kind(&self) -> IndexerKind {
        IndexerKind::Nyaa
    }

    fn build_recent_requests(&self, indexer: &IndexerDescriptor, _config: &SearchConfig) -> TierChain {
        let mut chain = TierChain::new();
        chain.add(PagedRequest::new(vec![IndexerRequest::rss(Self::base_url(indexer))]));
        chain
    }

    fn build_search_requests(
        &self,
        indexer: &IndexerDescriptor,
        criteria: &SearchCriteria,
        config: &SearchConfig,
    ) -> TierChain {
        let mut chain = TierChain::new();
        if criteria.kind() == SearchKind::Catalogue || !indexer.capabilities.supports_search() {
            return chain;
        }

        chain.add_tier();
        for title in criteria.query_titles() {
            let term = Self::search_term(title, criteria.kind());
            if let Some(q) = query_text(&term, &indexer.capabilities) {
                chain.add(Self::paged(indexer, config.max_pages, &q));
            }
        }
        chain
    }
}
