//! Outbound request descriptors and the tiered fallback ladder.
//!
//! A [`TierChain`] is an ordered list of [`RequestTier`]s. Each tier holds
//! one [`PagedRequest`] per query variant, and each paged request holds the
//! page URLs in the order they are fetched.

use std::fmt;

/// One HTTP request to an indexer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexerRequest {
    pub url: String,
}

impl IndexerRequest {
    pub fn rss(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// The URL with any `apikey` or `passkey` value masked, safe for logs
    /// and errors.
    pub fn redacted_url(&self) -> String {
        redact_credentials(&self.url)
    }
}

impl fmt::Display for IndexerRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.redacted_url())
    }
}

/// Query parameters whose values are credentials.
const SECRET_PARAMETERS: &[&str] = &["apikey=", "passkey="];

/// Mask the value of every `apikey=` and `passkey=` query parameter.
pub fn redact_credentials(url: &str) -> String {
    let mut out = String::with_capacity(url.len());
    let mut rest = url;
    while let Some((pos, name)) = first_secret(rest) {
        let value_start = pos + name.len();
        out.push_str(&rest[..value_start]);
        out.push_str("(removed)");
        rest = &rest[value_start..];
        let value_end = rest.find('&').unwrap_or(rest.len());
        rest = &rest[value_end..];
    }
    out.push_str(rest);
    out
}

fn first_secret(text: &str) -> Option<(usize, &'static str)> {
    SECRET_PARAMETERS
        .iter()
        .filter_map(|name| text.find(name).map(|pos| (pos, *name)))
        .min_by_key(|(pos, _)| *pos)
}

/// The pages of one query, fetched in order until a stop rule triggers.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PagedRequest {
    pages: Vec<IndexerRequest>,
}

impl PagedRequest {
    pub fn new(pages: Vec<IndexerRequest>) -> Self {
        Self { pages }
    }

    pub fn pages(&self) -> &[IndexerRequest] {
        &self.pages
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }
}

/// One rung of the fallback ladder.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestTier {
    queries: Vec<PagedRequest>,
}

impl RequestTier {
    pub fn queries(&self) -> &[PagedRequest] {
        &self.queries
    }

    /// Every request of the tier, in fetch order.
    pub fn requests(&self) -> impl Iterator<Item = &IndexerRequest> {
        self.queries.iter().flat_map(|q| q.pages.iter())
    }

    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }
}

/// Ordered tiers for one (criteria, indexer) pairing.
///
/// Tiers are only ever appended. A tier that ends up without requests is
/// dropped, so a capability an adapter skipped never leaves a hole.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TierChain {
    tiers: Vec<RequestTier>,
}

impl TierChain {
    pub fn new() -> Self {
        Self::default()
    }

    /// Close the current tier and start a new one.
    pub fn add_tier(&mut self) {
        if self.tiers.last().is_some_and(|tier| !tier.is_empty()) {
            self.tiers.push(RequestTier::default());
        }
    }

    /// Add a paged query to the current tier. Empty queries are ignored.
    pub fn add(&mut self, query: PagedRequest) {
        if query.is_empty() {
            return;
        }
        match self.tiers.last_mut() {
            Some(tier) => tier.queries.push(query),
            None => self.tiers.push(RequestTier {
                queries: vec![query],
            }),
        }
    }

    pub fn tiers(&self) -> &[RequestTier] {
        let end = if self.tiers.last().is_some_and(RequestTier::is_empty) {
            self.tiers.len() - 1
        } else {
            self.tiers.len()
        };
        &self.tiers[..end]
    }

    pub fn tier_count(&self) -> usize {
        self.tiers().len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiers().is_empty()
    }
}
