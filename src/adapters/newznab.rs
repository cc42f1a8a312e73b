//! Newznab indexers: the reference API for Usenet search.
//!
//! Requests look like
//! `{base}{api_path}?t={function}&cat={categories}&extended=1&apikey={key}&offset={n}&limit={size}{params}`.
//! Torznab indexers speak the same dialect, so the request building here is
//! shared with [`crate::adapters::torznab`].

use crate::adapter::{join_categories, query_text, IndexerAdapter};
use crate::config::SearchConfig;
use crate::criteria::{SearchCriteria, SearchKind, TargetEntity};
use crate::request::{IndexerRequest, PagedRequest, TierChain};
use crate::types::{Capabilities, IndexerDescriptor, IndexerKind, SearchParam};

/// Newznab request builder.
pub struct NewznabAdapter;

impl IndexerAdapter for NewznabAdapter {
    fn kind(&self) -> IndexerKind {
        IndexerKind::Newznab
    }

    fn build_recent_requests(&self, indexer: &IndexerDescriptor, config: &SearchConfig) -> TierChain {
        recent_requests(indexer, config)
    }

    fn build_search_requests(
        &self,
        indexer: &IndexerDescriptor,
        criteria: &SearchCriteria,
        config: &SearchConfig,
    ) -> TierChain {
        search_requests(indexer, criteria, config)
    }
}

/// Recent releases: one generic search over the configured categories.
pub(crate) fn recent_requests(indexer: &IndexerDescriptor, config: &SearchConfig) -> TierChain {
    let mut chain = TierChain::new();
    chain.add(paged_requests(indexer, config.max_pages, "search", ""));
    chain
}

/// Targeted search: identifier tier first, then free-text titles.
pub(crate) fn search_requests(
    indexer: &IndexerDescriptor,
    criteria: &SearchCriteria,
    config: &SearchConfig,
) -> TierChain {
    let mut chain = TierChain::new();
    let Some(target) = criteria.target() else {
        return chain;
    };
    let caps = &indexer.capabilities;
    let titles = criteria.query_titles();

    let (function, id_parameter, suffix) = match criteria.kind() {
        SearchKind::Catalogue => return chain,
        SearchKind::Entity => ("movie", movie_id_parameter(target, caps), String::new()),
        SearchKind::Season { season } => (
            "tvsearch",
            tv_id_parameter(target, caps),
            format!("&season={season}"),
        ),
        SearchKind::Date { air_date } => (
            "tvsearch",
            tv_id_parameter(target, caps),
            format!(
                "&season={}&ep={}",
                air_date.format("%Y"),
                air_date.format("%m/%d")
            ),
        ),
    };

    let supports_text = match function {
        "movie" => caps.supports_movie_text_search(),
        _ => caps.supports_tv_text_search(),
    };

    if let Some(id) = id_parameter {
        chain.add_tier();
        chain.add(paged_requests(
            indexer,
            config.max_pages,
            function,
            &format!("{id}{suffix}"),
        ));
    }

    if supports_text {
        chain.add_tier();
        for title in &titles {
            if let Some(q) = query_text(title, caps) {
                chain.add(paged_requests(
                    indexer,
                    config.max_pages,
                    function,
                    &format!("&q={q}{suffix}"),
                ));
            }
        }
    } else if caps.supports_search() {
        chain.add_tier();
        for title in &titles {
            if let Some(q) = query_text(&generic_query(title, criteria.kind()), caps) {
                chain.add(paged_requests(
                    indexer,
                    config.max_pages,
                    "search",
                    &format!("&q={q}"),
                ));
            }
        }
    }

    tracing::trace!(
        indexer = %indexer.name,
        tiers = chain.tier_count(),
        "newznab request chain built"
    );
    chain
}

/// Free text for indexers without a dedicated search function: the
/// season or date travels inside the query.
fn generic_query(title: &str, kind: SearchKind) -> String {
    match kind {
        SearchKind::Season { season } => format!("{title} S{season:02}"),
        SearchKind::Date { air_date } => format!("{title} {}", air_date.format("%Y %m %d")),
        SearchKind::Entity | SearchKind::Catalogue => title.to_string(),
    }
}

/// Build the pages of one query.
///
/// Indexers without categories get no requests at all. A page size of zero
/// yields a single unpaged request; otherwise one request per page up to
/// `max_pages`.
pub(crate) fn paged_requests(
    indexer: &IndexerDescriptor,
    max_pages: u32,
    function: &str,
    parameters: &str,
) -> PagedRequest {
    if indexer.categories.is_empty() {
        return PagedRequest::default();
    }

    let mut base = format!(
        "{}{}?t={}&cat={}&extended=1{}",
        indexer.base_url.as_str().trim_end_matches('/'),
        indexer.api_path.trim_end_matches('/'),
        function,
        join_categories(&indexer.categories),
        indexer.additional_parameters.as_deref().unwrap_or_default(),
    );
    if let Some(key) = indexer.api_key.as_deref().filter(|k| !k.trim().is_empty()) {
        base.push_str("&apikey=");
        base.push_str(&urlencoding::encode(key));
    }

    let size = indexer.page_size;
    if size == 0 {
        return PagedRequest::new(vec![IndexerRequest::rss(format!("{base}{parameters}"))]);
    }
    PagedRequest::new(
        (0..max_pages)
            .map(|page| {
                IndexerRequest::rss(format!(
                    "{base}&offset={}&limit={size}{parameters}",
                    u64::from(page) * u64::from(size)
                ))
            })
            .collect(),
    )
}

/// Most specific TV identifier both sides know: TVDB, then TVmaze, then IMDb.
fn tv_id_parameter(target: &TargetEntity, caps: &Capabilities) -> Option<String> {
    if let Some(id) = target.ids.tvdb.filter(|_| caps.supports_tv(SearchParam::TvdbId)) {
        return Some(format!("&tvdbid={id}"));
    }
    if let Some(id) = target.ids.tvmaze.filter(|_| caps.supports_tv(SearchParam::TvmazeId)) {
        return Some(format!("&tvmazeid={id}"));
    }
    target
        .ids
        .imdb
        .as_deref()
        .filter(|_| caps.supports_tv(SearchParam::ImdbId))
        .map(|id| format!("&imdbid={}", strip_imdb_prefix(id)))
}

/// Most specific movie identifier both sides know: IMDb, then TMDb.
fn movie_id_parameter(target: &TargetEntity, caps: &Capabilities) -> Option<String> {
    if let Some(id) = target
        .ids
        .imdb
        .as_deref()
        .filter(|_| caps.supports_movie(SearchParam::ImdbId))
    {
        return Some(format!("&imdbid={}", strip_imdb_prefix(id)));
    }
    target
        .ids
        .tmdb
        .filter(|_| caps.supports_movie(SearchParam::TmdbId))
        .map(|id| format!("&tmdbid={id}"))
}

fn strip_imdb_prefix(id: &str) -> &str {
    id.strip_prefix("tt").unwrap_or(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ExternalIds;
    use chrono::NaiveDate;
    use url::Url;

    fn indexer(caps: Capabilities) -> IndexerDescriptor {
        let mut indexer = IndexerDescriptor::new(
            1,
            "Newznab",
            IndexerKind::Newznab,
            Url::parse("https://indexer.example/").expect("valid url"),
        );
        indexer.api_key = Some("secret".into());
        indexer.categories = vec![5030, 5040, 5030];
        indexer.capabilities = caps;
        indexer.page_size = 0;
        indexer
    }

    fn monkey_island(kind: SearchKind) -> SearchCriteria {
        SearchCriteria::builder(
            TargetEntity::new(1, "Monkey Island").with_ids(ExternalIds {
                imdb: Some("tt0100000".into()),
                tvdb: Some(42),
                ..Default::default()
            }),
            kind,
        )
        .build()
        .expect("valid criteria")
    }

    fn urls(chain: &TierChain, tier: usize) -> Vec<String> {
        chain.tiers()[tier].requests().map(|r| r.url.clone()).collect()
    }

    #[test]
    fn engine_type_is_newznab() {
        assert_eq!(NewznabAdapter.kind(), IndexerKind::Newznab);
    }

    #[test]
    fn is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<NewznabAdapter>();
    }

    #[test]
    fn text_only_single_normalised_tier() {
        let chain = NewznabAdapter.build_search_requests(
            &indexer(Capabilities::text_only()),
            &monkey_island(SearchKind::Entity),
            &SearchConfig::default(),
        );
        assert_eq!(chain.tier_count(), 1);
        let urls = urls(&chain, 0);
        assert_eq!(
            urls,
            vec!["https://indexer.example/api?t=search&cat=5030,5040&extended=1&apikey=secret&q=monkey+island"]
        );
        assert!(!urls[0].contains("imdbid"));
    }

    #[test]
    fn identifier_tier_precedes_text_tier() {
        let caps = Capabilities {
            movie_search_params: vec![SearchParam::Q, SearchParam::ImdbId],
            ..Default::default()
        };
        let chain = NewznabAdapter.build_search_requests(
            &indexer(caps),
            &monkey_island(SearchKind::Entity),
            &SearchConfig::default(),
        );
        assert_eq!(chain.tier_count(), 2);
        assert_eq!(
            urls(&chain, 0),
            vec!["https://indexer.example/api?t=movie&cat=5030,5040&extended=1&apikey=secret&imdbid=0100000"]
        );
        assert!(urls(&chain, 1)[0].contains("t=movie"));
        assert!(urls(&chain, 1)[0].ends_with("&q=monkey+island"));
    }

    #[test]
    fn no_capabilities_yields_empty_chain() {
        let chain = NewznabAdapter.build_search_requests(
            &indexer(Capabilities::default()),
            &monkey_island(SearchKind::Season { season: 1 }),
            &SearchConfig::default(),
        );
        assert!(chain.is_empty());
    }

    #[test]
    fn season_search_tiers() {
        let caps = Capabilities {
            tv_search_params: vec![SearchParam::Q, SearchParam::Season, SearchParam::TvdbId],
            ..Default::default()
        };
        let chain = NewznabAdapter.build_search_requests(
            &indexer(caps),
            &monkey_island(SearchKind::Season { season: 3 }),
            &SearchConfig::default(),
        );
        assert_eq!(chain.tier_count(), 2);
        assert!(urls(&chain, 0)[0].ends_with("&tvdbid=42&season=3"));
        assert!(urls(&chain, 1)[0].ends_with("&q=monkey+island&season=3"));
    }

    #[test]
    fn season_search_falls_back_to_generic_text() {
        let chain = NewznabAdapter.build_search_requests(
            &indexer(Capabilities::text_only()),
            &monkey_island(SearchKind::Season { season: 3 }),
            &SearchConfig::default(),
        );
        assert_eq!(chain.tier_count(), 1);
        assert!(urls(&chain, 0)[0].contains("t=search"));
        assert!(urls(&chain, 0)[0].ends_with("&q=monkey+island+s03"));
    }

    #[test]
    fn daily_search_parameters() {
        let air_date = NaiveDate::from_ymd_opt(2012, 10, 5).expect("valid date");
        let caps = Capabilities {
            tv_search_params: vec![SearchParam::Q, SearchParam::TvmazeId],
            ..Default::default()
        };
        let criteria = SearchCriteria::builder(
            TargetEntity::new(1, "The Daily Show").with_ids(ExternalIds {
                tvmaze: Some(249),
                ..Default::default()
            }),
            SearchKind::Date { air_date },
        )
        .build()
        .expect("valid criteria");
        let chain = NewznabAdapter.build_search_requests(&indexer(caps), &criteria, &SearchConfig::default());
        assert_eq!(chain.tier_count(), 2);
        assert!(urls(&chain, 0)[0].ends_with("&tvmazeid=249&season=2012&ep=10/05"));
        assert!(urls(&chain, 1)[0].ends_with("&q=daily+show&season=2012&ep=10/05"));
    }

    #[test]
    fn daily_generic_text_includes_date() {
        let air_date = NaiveDate::from_ymd_opt(2012, 10, 5).expect("valid date");
        let criteria = SearchCriteria::builder(
            TargetEntity::new(1, "The Daily Show"),
            SearchKind::Date { air_date },
        )
        .build()
        .expect("valid criteria");
        let chain = NewznabAdapter.build_search_requests(
            &indexer(Capabilities::text_only()),
            &criteria,
            &SearchConfig::default(),
        );
        assert!(urls(&chain, 0)[0].ends_with("&q=daily+show+2012+10+05"));
    }

    #[test]
    fn one_request_per_alternate_title() {
        let criteria = SearchCriteria::builder(TargetEntity::new(1, "Monkey Island"), SearchKind::Entity)
            .alternate_titles(["The Secret of Monkey Island", "Monkey-Island"])
            .build()
            .expect("valid criteria");
        let chain = NewznabAdapter.build_search_requests(
            &indexer(Capabilities::text_only()),
            &criteria,
            &SearchConfig::default(),
        );
        assert_eq!(chain.tier_count(), 1);
        assert_eq!(chain.tiers()[0].queries().len(), 2);
    }

    #[test]
    fn paging_emits_offsets_up_to_max_pages() {
        let mut paged_indexer = indexer(Capabilities::text_only());
        paged_indexer.page_size = 100;
        let config = SearchConfig {
            max_pages: 3,
            ..Default::default()
        };
        let chain = NewznabAdapter.build_recent_requests(&paged_indexer, &config);
        let urls = urls(&chain, 0);
        assert_eq!(urls.len(), 3);
        assert!(urls[0].ends_with("&offset=0&limit=100"));
        assert!(urls[1].ends_with("&offset=100&limit=100"));
        assert!(urls[2].ends_with("&offset=200&limit=100"));
    }

    #[test]
    fn huge_page_size_offsets_do_not_wrap() {
        let mut paged_indexer = indexer(Capabilities::text_only());
        paged_indexer.page_size = 3_000_000_000;
        let config = SearchConfig {
            max_pages: 3,
            ..Default::default()
        };
        let chain = NewznabAdapter.build_recent_requests(&paged_indexer, &config);
        let urls = urls(&chain, 0);
        assert!(urls[2].ends_with("&offset=6000000000&limit=3000000000"));
    }

    #[test]
    fn zero_page_size_single_request() {
        let chain = NewznabAdapter.build_recent_requests(
            &indexer(Capabilities::text_only()),
            &SearchConfig::default(),
        );
        let urls = urls(&chain, 0);
        assert_eq!(
            urls,
            vec!["https://indexer.example/api?t=search&cat=5030,5040&extended=1&apikey=secret"]
        );
    }

    #[test]
    fn additional_parameters_appended() {
        let mut custom = indexer(Capabilities::text_only());
        custom.additional_parameters = Some("&attrs=poster".into());
        let chain = NewznabAdapter.build_recent_requests(&custom, &SearchConfig::default());
        assert!(urls(&chain, 0)[0].contains("&extended=1&attrs=poster&apikey="));
    }

    #[test]
    fn missing_categories_yield_no_requests() {
        let mut uncategorised = indexer(Capabilities::text_only());
        uncategorised.categories.clear();
        let chain = NewznabAdapter.build_recent_requests(&uncategorised, &SearchConfig::default());
        assert!(chain.is_empty());
    }

    #[test]
    fn catalogue_criteria_yield_empty_search_chain() {
        let chain = NewznabAdapter.build_search_requests(
            &indexer(Capabilities::text_only()),
            &SearchCriteria::catalogue(),
            &SearchConfig::default(),
        );
        assert!(chain.is_empty());
    }

    #[test]
    fn raw_text_indexer_escapes_without_normalising() {
        let caps = Capabilities {
            raw_text_search: true,
            ..Capabilities::text_only()
        };
        let criteria = SearchCriteria::builder(TargetEntity::new(1, "Mike & Molly's"), SearchKind::Entity)
            .build()
            .expect("valid criteria");
        let chain = NewznabAdapter.build_search_requests(&indexer(caps), &criteria, &SearchConfig::default());
        assert!(urls(&chain, 0)[0].ends_with("&q=Mike%20%26%20Molly%27s"));
    }
}
