//! Core types: indexer descriptors, candidates, match results and decisions.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use url::Url;

/// Identifier of a configured indexer.
pub type IndexerId = u32;

/// Identifier of a library entity (series, movie, ...).
pub type EntityId = u64;

/// Identifier of a tag shared between entities and indexers.
pub type TagId = u32;

/// Supported indexer protocols. Each has exactly one adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum IndexerKind {
    /// Usenet indexer speaking the Newznab API.
    Newznab,
    /// Torrent indexer speaking the Newznab-derived Torznab API.
    Torznab,
    /// Nyaa-style tracker: free-text RSS search, no identifiers.
    Nyaa,
    /// Plain torrent RSS feed: recent releases only, no search.
    TorrentRss,
}

impl IndexerKind {
    /// Returns the human-readable name of this kind.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Newznab => "Newznab",
            Self::Torznab => "Torznab",
            Self::Nyaa => "Nyaa",
            Self::TorrentRss => "TorrentRss",
        }
    }

    /// Whether requests to this kind carry an API key.
    pub fn requires_api_key(&self) -> bool {
        matches!(self, Self::Newznab | Self::Torznab)
    }

    /// Whether requests to this kind need at least one category.
    pub fn requires_categories(&self) -> bool {
        matches!(self, Self::Newznab | Self::Torznab)
    }

    /// Items per page the provider serves by default. Zero means unpaged.
    pub fn default_page_size(&self) -> u32 {
        match self {
            Self::Newznab | Self::Torznab => 100,
            Self::Nyaa => 75,
            Self::TorrentRss => 0,
        }
    }

    /// Returns all available kinds.
    pub fn all() -> &'static [IndexerKind] {
        &[Self::Newznab, Self::Torznab, Self::Nyaa, Self::TorrentRss]
    }
}

impl fmt::Display for IndexerKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A query parameter a provider declares support for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchParam {
    /// Free-text query.
    Q,
    Season,
    Ep,
    TvdbId,
    TvmazeId,
    ImdbId,
    TmdbId,
}

/// The query capabilities a provider declares.
///
/// Mirrors the Newznab `caps` document: one parameter list per search
/// function. An empty list means the function is unavailable.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Capabilities {
    /// Parameters of the generic `t=search` function.
    pub search_params: Vec<SearchParam>,
    /// Parameters of the `t=tvsearch` function.
    pub tv_search_params: Vec<SearchParam>,
    /// Parameters of the `t=movie` function.
    pub movie_search_params: Vec<SearchParam>,
    /// The provider takes human-readable text as-is. Queries are escaped
    /// but not normalised.
    pub raw_text_search: bool,
}

impl Capabilities {
    /// Capabilities of a provider that only offers generic free-text search.
    pub fn text_only() -> Self {
        Self {
            search_params: vec![SearchParam::Q],
            ..Default::default()
        }
    }

    pub fn supports_search(&self) -> bool {
        self.search_params.contains(&SearchParam::Q)
    }

    pub fn supports_tv_text_search(&self) -> bool {
        self.tv_search_params.contains(&SearchParam::Q)
    }

    pub fn supports_movie_text_search(&self) -> bool {
        self.movie_search_params.contains(&SearchParam::Q)
    }

    pub fn supports_tv(&self, param: SearchParam) -> bool {
        self.tv_search_params.contains(&param)
    }

    pub fn supports_movie(&self, param: SearchParam) -> bool {
        self.movie_search_params.contains(&param)
    }
}

/// Read-only description of a configured indexer.
///
/// Owned by an external configuration store and handed to the engine
/// as part of a per-invocation snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexerDescriptor {
    pub id: IndexerId,
    pub name: String,
    pub kind: IndexerKind,
    /// Base address of the provider, e.g. `https://indexer.example`.
    pub base_url: Url,
    /// API path appended to the base address (Newznab/Torznab only).
    #[serde(default = "default_api_path")]
    pub api_path: String,
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default)]
    pub categories: Vec<u32>,
    /// Empty means the indexer serves every entity.
    #[serde(default)]
    pub tags: Vec<TagId>,
    #[serde(default)]
    pub capabilities: Capabilities,
    /// Items per page. Zero requests a single unpaged response.
    #[serde(default)]
    pub page_size: u32,
    #[serde(default = "default_true")]
    pub supports_automatic_search: bool,
    #[serde(default = "default_true")]
    pub supports_rss: bool,
    /// Raw query-string suffix appended verbatim, e.g. `&c=1_2&f=0`.
    #[serde(default)]
    pub additional_parameters: Option<String>,
}

fn default_api_path() -> String {
    "/api".into()
}

fn default_true() -> bool {
    true
}

impl IndexerDescriptor {
    /// Create a descriptor with the defaults of its kind: `/api` path,
    /// the kind's page size, automatic search and RSS enabled, no tags.
    pub fn new(id: IndexerId, name: impl Into<String>, kind: IndexerKind, base_url: Url) -> Self {
        let capabilities = match kind {
            IndexerKind::Nyaa => Capabilities {
                raw_text_search: true,
                ..Capabilities::text_only()
            },
            IndexerKind::TorrentRss => Capabilities::default(),
            IndexerKind::Newznab | IndexerKind::Torznab => Capabilities::text_only(),
        };
        Self {
            id,
            name: name.into(),
            kind,
            base_url,
            api_path: default_api_path(),
            api_key: None,
            categories: Vec::new(),
            tags: Vec::new(),
            capabilities,
            page_size: kind.default_page_size(),
            supports_automatic_search: true,
            supports_rss: true,
            additional_parameters: None,
        }
    }
}

/// Identifiers an entity is known by at external metadata sources.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExternalIds {
    pub tvdb: Option<u32>,
    pub tmdb: Option<u32>,
    /// IMDb identifier including its `tt` prefix.
    pub imdb: Option<String>,
    pub tvmaze: Option<u32>,
}

impl ExternalIds {
    pub fn is_empty(&self) -> bool {
        self.tvdb.is_none() && self.tmdb.is_none() && self.imdb.is_none() && self.tvmaze.is_none()
    }
}

/// Structured information extracted from a release by the response parser.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParsedInfo {
    /// Entity title as it appears in the release name.
    pub title: String,
    /// Release year, zero when absent.
    pub year: u16,
    pub season: Option<u32>,
    pub episodes: Vec<u32>,
    pub air_date: Option<NaiveDate>,
    pub ids: ExternalIds,
}

/// One search result returned by a provider, before it is judged.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateRelease {
    pub raw_title: String,
    pub parsed: ParsedInfo,
    pub indexer_id: IndexerId,
    pub download_url: Option<String>,
    pub size: Option<u64>,
}

/// How a candidate was bound to the target entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchMethod {
    /// An external identifier carried by the release equals the target's.
    Identifier,
    /// The release title equals one of the target's clean titles.
    Title,
}

/// Outcome of reconciling one candidate against the search target.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchResult {
    pub candidate: CandidateRelease,
    /// `None` when the candidate could not be bound to the target.
    pub matched_entity: Option<EntityId>,
    pub method: Option<MatchMethod>,
    /// Free-form diagnostics gathered while matching.
    pub notes: Vec<String>,
}

/// Machine-readable reason a candidate was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rejection {
    /// The candidate could not be bound to the searched entity.
    UnknownEntity,
    /// The candidate belongs to a different entity.
    WrongEntity,
    /// Season search, but the candidate is for another season.
    WrongSeason,
    /// Date search, but the candidate's release date differs.
    WrongRelease,
    /// Reason produced by a caller-registered rule.
    Other(String),
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownEntity => f.write_str("unknown entity"),
            Self::WrongEntity => f.write_str("wrong entity"),
            Self::WrongSeason => f.write_str("wrong season"),
            Self::WrongRelease => f.write_str("wrong release"),
            Self::Other(reason) => f.write_str(reason),
        }
    }
}

/// The accept/reject verdict for one candidate.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Decision {
    pub candidate: CandidateRelease,
    pub accepted: bool,
    pub rejection: Option<Rejection>,
}

impl Decision {
    pub fn accept(candidate: CandidateRelease) -> Self {
        Self {
            candidate,
            accepted: true,
            rejection: None,
        }
    }

    pub fn reject(candidate: CandidateRelease, reason: Rejection) -> Self {
        Self {
            candidate,
            accepted: false,
            rejection: Some(reason),
        }
    }
}
