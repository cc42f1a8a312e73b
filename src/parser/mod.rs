//! Response-parser boundary.
//!
//! A [`ReleaseParser`] turns one raw payload into candidate releases. Two
//! levels of failure are kept apart: a payload that cannot be read at all
//! fails the page, while a single unreadable item only drops that item.

pub mod feed;
pub mod release_title;

pub use feed::FeedParser;
pub use release_title::parse_release_title;

use crate::error::SearchError;
use crate::request::IndexerRequest;
use crate::transport::RawPayload;
use crate::types::{CandidateRelease, IndexerDescriptor};

/// Parses indexer responses into candidate releases.
pub trait ReleaseParser: Send + Sync {
    /// Parse one page.
    ///
    /// # Errors
    ///
    /// The outer `Err` means the whole page is unusable:
    /// [`SearchError::Unsupported`] when the indexer answered that the
    /// requested function is unavailable, [`SearchError::Http`] for other
    /// indexer-reported errors, [`SearchError::Parse`] for unreadable
    /// documents. Each inner `Err` is one item that could not be parsed.
    fn parse(
        &self,
        indexer: &IndexerDescriptor,
        request: &IndexerRequest,
        payload: &RawPayload,
    ) -> Result<Vec<Result<CandidateRelease, SearchError>>, SearchError>;
}
