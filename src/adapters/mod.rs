//! Indexer adapter implementations.
//!
//! Each module provides a struct implementing [`crate::adapter::IndexerAdapter`]
//! that builds the request chain for one indexer protocol.

pub mod newznab;
pub mod nyaa;
pub mod torrent_rss;
pub mod torznab;

pub use newznab::NewznabAdapter;
pub use nyaa::NyaaAdapter;
pub use torrent_rss::TorrentRssAdapter;
pub use torznab::TorznabAdapter;
