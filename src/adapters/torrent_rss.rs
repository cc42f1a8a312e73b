//! Plain torrent RSS feeds: recent releases only.
//!
//! The configured base URL is the feed itself. There is no search
//! function, so targeted searches always produce an empty chain and the
//! indexer simply contributes nothing to them.

use crate::adapter::IndexerAdapter;
use crate::config::SearchConfig;
use crate::criteria::SearchCriteria;
use crate::request::{IndexerRequest, PagedRequest, TierChain};
use crate::types::{IndexerDescriptor, IndexerKind};

/// Torrent RSS feed request builder.
pub struct TorrentRssAdapter;

impl IndexerAdapter for TorrentRssAdapter {
    fn kind(&self) -> IndexerKind {
        IndexerKind::TorrentRss
    }

    fn build_recent_requests(&self, indexer: &IndexerDescriptor, _config: &SearchConfig) -> TierChain {
        let mut chain = TierChain::new();
        chain.add(PagedRequest::new(vec![IndexerRequest::rss(
            indexer.base_url.as_str(),
        )]));
        chain
    }

    fn build_search_requests(
        &self,
        _indexer: &IndexerDescriptor,
        _criteria: &SearchCriteria,
        _config: &SearchConfig,
    ) -> TierChain {
        TierChain::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::{SearchKind, TargetEntity};
    use url::Url;

    fn indexer() -> IndexerDescriptor {
        IndexerDescriptor::new(
            4,
            "Feed",
            IndexerKind::TorrentRss,
            Url::parse("https://tracker.example/rss?passkey=abc").expect("valid url"),
        )
    }

    #[test]
    fn recent_fetches_feed_url() {
        let chain = TorrentRssAdapter.build_recent_requests(&indexer(), &SearchConfig::default());
        assert_eq!(chain.tier_count(), 1);
        let request = chain.tiers()[0].requests().next().expect("one request");
        assert_eq!(request.url, "https://tracker.example/rss?passkey=abc");
    }

    #[test]
    fn search_is_empty() {
        let criteria = SearchCriteria::builder(TargetEntity::new(1, "Show"), SearchKind::Entity)
            .build()
            .expect("valid criteria");
        let chain = TorrentRssAdapter.build_search_requests(&indexer(), &criteria, &SearchConfig::default());
        assert!(chain.is_empty());
    }
}
