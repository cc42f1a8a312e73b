//! Torznab indexers: the Newznab API extended for torrent trackers.
//!
//! Request shapes are identical to Newznab, so this adapter delegates to the
//! Newznab builders and only differs in the kind it registers under.

use crate::adapter::IndexerAdapter;
use crate::adapters::newznab;
use crate::config::SearchConfig;
use crate::criteria::SearchCriteria;
use crate::request::TierChain;
use crate::types::{IndexerDescriptor, IndexerKind};

/// Torznab request builder.
pub struct TorznabAdapter;

impl IndexerAdapter for TorznabAdapter {
    fn kind(&self) -> IndexerKind {
        IndexerKind::Torznab
    }

    fn build_recent_requests(&self, indexer: &IndexerDescriptor, config: &SearchConfig) -> TierChain {
        newznab::recent_requests(indexer, config)
    }

    fn build_search_requests(
        &self,
        indexer: &IndexerDescriptor,
        criteria: &SearchCriteria,
        config: &SearchConfig,
    ) -> TierChain {
        newznab::search_requests(indexer, criteria, config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::criteria::{SearchKind, TargetEntity};
    use crate::types::{Capabilities, ExternalIds, SearchParam};
    use url::Url;

    fn indexer() -> IndexerDescriptor {
        let mut indexer = IndexerDescriptor::new(
            9,
            "Jackett",
            IndexerKind::Torznab,
            Url::parse("http://localhost:9117/api/v2.0/indexers/all/results/torznab")
                .expect("valid url"),
        );
        indexer.api_path = String::new();
        indexer.api_key = Some("key".into());
        indexer.categories = vec![5000, 5070];
        indexer.page_size = 0;
        indexer.capabilities = Capabilities {
            tv_search_params: vec![SearchParam::Q, SearchParam::Season, SearchParam::TvdbId],
            ..Capabilities::text_only()
        };
        indexer
    }

    #[test]
    fn engine_type_is_torznab() {
        assert_eq!(TorznabAdapter.kind(), IndexerKind::Torznab);
    }

    #[test]
    fn recent_request_uses_indexer_path() {
        let chain = TorznabAdapter.build_recent_requests(&indexer(), &SearchConfig::default());
        let url = &chain.tiers()[0].requests().next().expect("one request").url;
        assert_eq!(
            url,
            "http://localhost:9117/api/v2.0/indexers/all/results/torznab?t=search&cat=5000,5070&extended=1&apikey=key"
        );
    }

    #[test]
    fn season_search_matches_newznab_shape() {
        let criteria = SearchCriteria::builder(
            TargetEntity::new(5, "Frieren").with_ids(ExternalIds {
                tvdb: Some(424536),
                ..Default::default()
            }),
            SearchKind::Season { season: 1 },
        )
        .build()
        .expect("valid criteria");
        let chain = TorznabAdapter.build_search_requests(&indexer(), &criteria, &SearchConfig::default());
        assert_eq!(chain.tier_count(), 2);
        let first = &chain.tiers()[0].requests().next().expect("id request").url;
        assert!(first.contains("t=tvsearch"));
        assert!(first.ends_with("&tvdbid=424536&season=1"));
    }
}
