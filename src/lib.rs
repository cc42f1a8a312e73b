//! # release-search
//!
//! Release search and matching engine.
//!
//! Given a library entity (or none, for a catalogue-wide fetch), the engine
//! queries many independent indexers, parses the releases they return,
//! binds each release to the entity the search was for, and yields an
//! accept/reject decision per release.
//!
//! ## Design
//!
//! - One adapter per indexer protocol builds a tiered request chain, from
//!   exact identifier lookups down to free-text title queries
//! - Indexers are queried concurrently; within one indexer, tiers run in
//!   order and stop at the first tier that returns anything
//! - A failing indexer is logged and contributes nothing; the search as a
//!   whole never fails because of one
//! - Title comparison uses the same normalisation that built the queries
//! - Decisions come from an ordered list of independent rules
//!
//! ## Security
//!
//! - API keys are masked in every logged or embedded URL
//! - Query text is logged only at trace level
//! - No network listeners; this is a library, not a server

pub mod adapter;
pub mod adapters;
pub mod config;
pub mod criteria;
pub mod decision;
pub mod eligibility;
pub mod error;
pub mod matching;
pub mod normalize;
pub mod orchestrator;
pub mod parser;
pub mod request;
pub mod transport;
pub mod types;

pub use adapter::{AdapterRegistry, IndexerAdapter};
pub use config::SearchConfig;
pub use criteria::{SearchCriteria, SearchCriteriaBuilder, SearchKind, TargetEntity};
pub use decision::{DecisionPipeline, Verdict};
pub use error::{Result, SearchError};
pub use orchestrator::{ProviderPlan, ReleaseSearch};
pub use parser::{FeedParser, ReleaseParser};
pub use transport::{HttpTransport, RawPayload, Transport};
pub use types::{
    Capabilities, CandidateRelease, Decision, EntityId, ExternalIds, IndexerDescriptor, IndexerId,
    IndexerKind, MatchMethod, MatchResult, ParsedInfo, Rejection, SearchParam, TagId,
};

pub use tokio_util::sync::CancellationToken;

/// Search the given indexers for the criteria's target and judge every
/// release found.
///
/// Builds a [`ReleaseSearch`] with the HTTP transport, the RSS feed parser,
/// every built-in adapter and the default decision rules. For repeated
/// searches, build one [`ReleaseSearch`] and reuse it.
///
/// # Errors
///
/// Returns [`SearchError::Config`] if `config` is invalid and
/// [`SearchError::Http`] if the HTTP client cannot be built. Indexer
/// failures never surface here; they are logged and yield no releases.
///
/// # Examples
///
/// ```no_run
/// # async fn example() -> release_search::Result<()> {
/// use release_search::{
///     CancellationToken, IndexerDescriptor, SearchConfig, SearchCriteria, SearchKind, TargetEntity,
/// };
///
/// let criteria = SearchCriteria::builder(
///     TargetEntity::new(1, "Monkey Island").with_year(1990),
///     SearchKind::Entity,
/// )
/// .build()?;
/// let indexers: Vec<IndexerDescriptor> = Vec::new(); // snapshot from the configuration store
/// let decisions = release_search::search(
///     &criteria,
///     &indexers,
///     &SearchConfig::default(),
///     &CancellationToken::new(),
/// )
/// .await?;
/// for decision in decisions.iter().filter(|d| d.accepted) {
///     println!("{}", decision.candidate.raw_title);
/// }
/// # Ok(())
/// # }
/// ```
pub async fn search(
    criteria: &SearchCriteria,
    indexers: &[IndexerDescriptor],
    config: &SearchConfig,
    cancel: &CancellationToken,
) -> Result<Vec<Decision>> {
    let engine = ReleaseSearch::new(config.clone())?;
    Ok(engine.search(criteria, indexers, cancel).await)
}

/// Fetch the recent releases of every RSS-capable indexer.
///
/// Every release is accepted: a catalogue fetch has no target to reject
/// against.
///
/// # Errors
///
/// Same as [`search`].
pub async fn fetch_recent(
    indexers: &[IndexerDescriptor],
    config: &SearchConfig,
    cancel: &CancellationToken,
) -> Result<Vec<Decision>> {
    let engine = ReleaseSearch::new(config.clone())?;
    Ok(engine.fetch_recent(indexers, cancel).await)
}
