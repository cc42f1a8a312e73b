//! Concurrent fan-out across indexers.
//!
//! Every indexer runs its tier chain as one task; at most
//! `max_in_flight` run at a time. Inside an indexer everything is
//! sequential: tiers in declared order, queries in tier order, pages in
//! page order. Parsing happens inline between fetches and never awaits.
//!
//! One indexer's failure (transport error, timeout, unreadable page) is
//! logged and costs only that indexer's candidates. Cancellation skips
//! indexers that have not started and abandons in-flight fetches, but
//! keeps whatever was already collected.

use std::time::Duration;

use futures::stream::{self, StreamExt};
use rand::Rng;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

use crate::config::SearchConfig;
use crate::error::SearchError;
use crate::parser::ReleaseParser;
use crate::request::{IndexerRequest, PagedRequest, TierChain};
use crate::transport::Transport;
use crate::types::{CandidateRelease, IndexerDescriptor};

/// One indexer paired with the tier chain its adapter built.
#[derive(Debug, Clone)]
pub struct ProviderPlan<'a> {
    pub indexer: &'a IndexerDescriptor,
    pub chain: TierChain,
}

/// Run every plan and gather the candidates.
///
/// Returns once every indexer has finished, failed, timed out or been
/// cancelled. Candidates arrive in completion order across indexers and in
/// fetch order within one indexer.
pub async fn dispatch<T, P>(
    plans: Vec<ProviderPlan<'_>>,
    transport: &T,
    parser: &P,
    config: &SearchConfig,
    cancel: &CancellationToken,
) -> Vec<CandidateRelease>
where
    T: Transport,
    P: ReleaseParser,
{
    let per_indexer: Vec<Vec<CandidateRelease>> = stream::iter(plans)
        .map(|plan| run_provider(plan, transport, parser, config, cancel))
        .buffer_unordered(config.max_in_flight.max(1))
        .collect()
        .await;

    per_indexer.into_iter().flatten().collect()
}

async fn run_provider<T, P>(
    plan: ProviderPlan<'_>,
    transport: &T,
    parser: &P,
    config: &SearchConfig,
    cancel: &CancellationToken,
) -> Vec<CandidateRelease>
where
    T: Transport,
    P: ReleaseParser,
{
    let indexer = plan.indexer;
    if cancel.is_cancelled() {
        tracing::debug!(indexer = %indexer.name, "search cancelled, indexer skipped");
        return Vec::new();
    }

    let mut fetch = ProviderFetch {
        indexer,
        transport,
        parser,
        config,
        cancel,
        deadline: Instant::now() + Duration::from_secs(config.provider_timeout_seconds),
        requests_sent: 0,
    };

    match fetch.run_chain(&plan.chain).await {
        Ok(candidates) => {
            tracing::debug!(
                indexer = %indexer.name,
                count = candidates.len(),
                requests = fetch.requests_sent,
                "indexer finished"
            );
            candidates
        }
        Err(err) => {
            tracing::warn!(indexer = %indexer.name, error = %err, "indexer failed");
            Vec::new()
        }
    }
}

enum QueryOutcome {
    Complete,
    Cancelled,
}

struct Page {
    /// Items in the payload, including ones that failed to parse.
    item_count: usize,
    candidates: Vec<CandidateRelease>,
}

struct ProviderFetch<'a, T, P> {
    indexer: &'a IndexerDescriptor,
    transport: &'a T,
    parser: &'a P,
    config: &'a SearchConfig,
    cancel: &'a CancellationToken,
    deadline: Instant,
    requests_sent: u32,
}

impl<T: Transport, P: ReleaseParser> ProviderFetch<'_, T, P> {
    async fn run_chain(&mut self, chain: &TierChain) -> Result<Vec<CandidateRelease>, SearchError> {
        let mut collected = Vec::new();

        for (tier, requests) in chain.tiers().iter().enumerate() {
            tracing::debug!(indexer = %self.indexer.name, tier, "running tier");

            for query in requests.queries() {
                match self.run_query(query, &mut collected).await {
                    Ok(QueryOutcome::Complete) => {}
                    Ok(QueryOutcome::Cancelled) => return Ok(collected),
                    Err(SearchError::Unsupported(reason)) => {
                        tracing::debug!(indexer = %self.indexer.name, tier, %reason, "tier unsupported");
                        break;
                    }
                    Err(err) => return Err(err),
                }
            }

            if !collected.is_empty() {
                tracing::debug!(
                    indexer = %self.indexer.name,
                    tier,
                    count = collected.len(),
                    "tier returned results, remaining tiers skipped"
                );
                break;
            }
        }

        Ok(collected)
    }

    /// Fetch the pages of one query until a page comes back short or the
    /// result cap is reached.
    async fn run_query(
        &mut self,
        query: &PagedRequest,
        collected: &mut Vec<CandidateRelease>,
    ) -> Result<QueryOutcome, SearchError> {
        let page_size = self.indexer.page_size as usize;
        let mut received = 0usize;

        for request in query.pages() {
            let Some(page) = self.fetch_page(request).await? else {
                return Ok(QueryOutcome::Cancelled);
            };
            received += page.item_count;
            collected.extend(page.candidates);

            if page_size == 0 || page.item_count < page_size {
                break;
            }
            if received >= self.config.max_results_per_query {
                tracing::debug!(indexer = %self.indexer.name, received, "result cap reached");
                break;
            }
        }

        Ok(QueryOutcome::Complete)
    }

    /// Fetch and parse one page. `None` means the search was cancelled.
    async fn fetch_page(&mut self, request: &IndexerRequest) -> Result<Option<Page>, SearchError> {
        let delay = self.next_delay();
        let transport = self.transport;
        let fetch = async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            transport.fetch(request).await
        };
        tracing::trace!(indexer = %self.indexer.name, url = %request, "fetching page");

        let payload = tokio::select! {
            _ = self.cancel.cancelled() => {
                tracing::debug!(indexer = %self.indexer.name, "search cancelled during fetch");
                return Ok(None);
            }
            result = tokio::time::timeout_at(self.deadline, fetch) => match result {
                Ok(payload) => payload?,
                Err(_elapsed) => {
                    return Err(SearchError::Timeout(format!(
                        "{} after {}s",
                        self.indexer.name, self.config.provider_timeout_seconds
                    )));
                }
            }
        };

        let items = self.parser.parse(self.indexer, request, &payload)?;
        let item_count = items.len();
        let mut candidates = Vec::with_capacity(item_count);
        for item in items {
            match item {
                Ok(candidate) => candidates.push(candidate),
                Err(err) => {
                    tracing::debug!(indexer = %self.indexer.name, error = %err, "release dropped");
                }
            }
        }

        Ok(Some(Page {
            item_count,
            candidates,
        }))
    }

    /// Random pause before every request but the first.
    fn next_delay(&mut self) -> Duration {
        let (min, max) = self.config.request_delay_ms;
        let first = self.requests_sent == 0;
        self.requests_sent += 1;
        if first || max == 0 {
            return Duration::ZERO;
        }
        Duration::from_millis(rand::thread_rng().gen_range(min..=max))
    }
}
