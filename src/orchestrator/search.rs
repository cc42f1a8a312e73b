//! End-to-end search flow.
//!
//! One [`ReleaseSearch`] owns the adapter registry, the transport, the
//! response parser and the decision pipeline. Provider catalogues are not
//! owned; every call takes the catalogue snapshot it should use.

use tokio_util::sync::CancellationToken;

use crate::adapter::AdapterRegistry;
use crate::config::SearchConfig;
use crate::criteria::{SearchCriteria, SearchKind};
use crate::decision::DecisionPipeline;
use crate::eligibility::{eligible_indexers, FetchMode};
use crate::error::SearchError;
use crate::matching::match_candidate;
use crate::parser::{FeedParser, ReleaseParser};
use crate::transport::{HttpTransport, Transport};
use crate::types::{Decision, IndexerDescriptor};

use super::dispatch::{dispatch, ProviderPlan};

/// The release search engine.
pub struct ReleaseSearch<T = HttpTransport, P = FeedParser> {
    config: SearchConfig,
    registry: AdapterRegistry,
    transport: T,
    parser: P,
    pipeline: DecisionPipeline,
}

impl ReleaseSearch {
    /// Build an engine that talks HTTP and reads RSS feeds, with every
    /// built-in adapter and rule.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if the configuration is invalid and
    /// [`SearchError::Http`] if the HTTP client cannot be built.
    pub fn new(config: SearchConfig) -> Result<Self, SearchError> {
        config.validate()?;
        let transport = HttpTransport::new(&config)?;
        Self::with_parts(config, transport, FeedParser)
    }
}

impl<T: Transport, P: ReleaseParser> ReleaseSearch<T, P> {
    /// Build an engine around a caller-supplied transport and parser.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::Config`] if the configuration is invalid.
    pub fn with_parts(config: SearchConfig, transport: T, parser: P) -> Result<Self, SearchError> {
        config.validate()?;
        Ok(Self {
            config,
            registry: AdapterRegistry::with_defaults(),
            transport,
            parser,
            pipeline: DecisionPipeline::with_default_rules(),
        })
    }

    /// Replace the decision pipeline.
    pub fn with_pipeline(mut self, pipeline: DecisionPipeline) -> Self {
        self.pipeline = pipeline;
        self
    }

    pub fn config(&self) -> &SearchConfig {
        &self.config
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub fn registry_mut(&mut self) -> &mut AdapterRegistry {
        &mut self.registry
    }

    pub fn pipeline_mut(&mut self) -> &mut DecisionPipeline {
        &mut self.pipeline
    }

    /// Tier chains a search would run, one per eligible indexer with a
    /// non-empty chain. Nothing is fetched.
    pub fn plan<'a>(
        &self,
        criteria: &SearchCriteria,
        indexers: &'a [IndexerDescriptor],
    ) -> Vec<ProviderPlan<'a>> {
        let mode = match criteria.kind() {
            SearchKind::Catalogue => FetchMode::Recent,
            _ => FetchMode::Search,
        };

        eligible_indexers(indexers, criteria.tags(), mode)
            .into_iter()
            .filter_map(|indexer| {
                let Some(adapter) = self.registry.get(indexer.kind) else {
                    tracing::warn!(indexer = %indexer.name, kind = %indexer.kind, "no adapter registered");
                    return None;
                };
                let chain = match mode {
                    FetchMode::Recent => adapter.build_recent_requests(indexer, &self.config),
                    FetchMode::Search => adapter.build_search_requests(indexer, criteria, &self.config),
                };
                if chain.is_empty() {
                    tracing::debug!(indexer = %indexer.name, "no usable request tier");
                    return None;
                }
                Some(ProviderPlan { indexer, chain })
            })
            .collect()
    }

    /// Run a search and judge every candidate.
    ///
    /// # Pipeline
    ///
    /// 1. Select eligible indexers for the criteria's tags
    /// 2. Build each indexer's tier chain with its adapter
    /// 3. Fetch concurrently; failing indexers contribute nothing
    /// 4. Match each candidate against the target
    /// 5. Run the decision pipeline, one decision per candidate
    ///
    /// Catalogue criteria run the indexers' recent-release feeds instead
    /// of a search. The result is never an error; an empty list is a valid
    /// outcome.
    pub async fn search(
        &self,
        criteria: &SearchCriteria,
        indexers: &[IndexerDescriptor],
        cancel: &CancellationToken,
    ) -> Vec<Decision> {
        // 1-2. Eligibility and tier planning.
        let plans = self.plan(criteria, indexers);
        tracing::debug!(indexers = plans.len(), kind = ?criteria.kind(), "search planned");

        // 3. Concurrent fan-out.
        let candidates = dispatch(plans, &self.transport, &self.parser, &self.config, cancel).await;

        // 4. Matching.
        let results = candidates
            .into_iter()
            .map(|candidate| match_candidate(candidate, criteria))
            .collect();

        // 5. Decisions.
        let decisions = self.pipeline.evaluate_all(results, Some(criteria));
        let accepted = decisions.iter().filter(|d| d.accepted).count();
        tracing::debug!(total = decisions.len(), accepted, "search finished");
        decisions
    }

    /// Fetch every eligible indexer's recent releases.
    ///
    /// Equivalent to [`search`](Self::search) with
    /// [`SearchCriteria::catalogue`]: every built-in rule accepts.
    pub async fn fetch_recent(
        &self,
        indexers: &[IndexerDescriptor],
        cancel: &CancellationToken,
    ) -> Vec<Decision> {
        self.search(&SearchCriteria::catalogue(), indexers, cancel).await
    }
}
