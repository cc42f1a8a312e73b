//! RSS feed parser for Newznab, Torznab, Nyaa and plain torrent feeds.
//!
//! Reads `<item>` entries and their `newznab:attr`/`torznab:attr`
//! attributes. A Newznab `<error>` document fails the whole page; an item
//! without a usable title fails alone.

use quick_xml::events::{BytesStart, Event};
use quick_xml::reader::Reader;

use super::release_title::parse_release_title;
use super::ReleaseParser;
use crate::error::SearchError;
use crate::request::IndexerRequest;
use crate::transport::RawPayload;
use crate::types::{CandidateRelease, IndexerDescriptor, IndexerId};

/// Default [`ReleaseParser`] for RSS-shaped indexer responses.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeedParser;

impl ReleaseParser for FeedParser {
    fn parse(
        &self,
        indexer: &IndexerDescriptor,
        request: &IndexerRequest,
        payload: &RawPayload,
    ) -> Result<Vec<Result<CandidateRelease, SearchError>>, SearchError> {
        if let Some(content_type) = payload.content_type.as_deref().filter(|ct| is_not_a_feed(ct)) {
            return Err(SearchError::Parse(format!(
                "{} answered {request} with {content_type}, not a feed",
                indexer.name
            )));
        }
        let items = parse_feed(&payload.body)?;
        tracing::debug!(indexer = %indexer.name, url = %request, count = items.len(), "feed items parsed");
        Ok(items
            .into_iter()
            .map(|item| item.into_candidate(indexer.id))
            .collect())
    }
}

/// Login pages and API errors served as HTML or JSON instead of XML.
fn is_not_a_feed(content_type: &str) -> bool {
    let mime = content_type.split(';').next().unwrap_or_default().trim();
    mime.eq_ignore_ascii_case("text/html")
        || mime.eq_ignore_ascii_case("application/json")
        || mime.eq_ignore_ascii_case("application/xhtml+xml")
}

/// One `<item>` as read from the feed, before title parsing.
#[derive(Debug, Default)]
struct FeedItem {
    title: Option<String>,
    link: Option<String>,
    enclosure_url: Option<String>,
    size: Option<u64>,
    attrs: Vec<(String, String)>,
    error: Option<String>,
}

impl FeedItem {
    fn set_text(&mut self, element: &str, text: String) {
        match element {
            "title" => self.title = Some(text),
            "link" => self.link = Some(text),
            "size" | "nyaa:size" => {
                if let Ok(size) = text.parse() {
                    self.size = Some(size);
                }
            }
            _ => {}
        }
    }

    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    fn id_attr(&self, names: &[&str]) -> Option<u32> {
        names
            .iter()
            .find_map(|name| self.attr(name))
            .and_then(|v| v.parse().ok())
            .filter(|id| *id > 0)
    }

    fn into_candidate(self, indexer_id: IndexerId) -> Result<CandidateRelease, SearchError> {
        if let Some(error) = self.error {
            return Err(SearchError::Parse(error));
        }
        let raw_title = self
            .title
            .clone()
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| SearchError::Parse("feed item has no title".into()))?;

        let mut parsed = parse_release_title(&raw_title)?;
        parsed.ids.tvdb = self.id_attr(&["tvdbid"]);
        parsed.ids.tmdb = self.id_attr(&["tmdbid"]);
        parsed.ids.tvmaze = self.id_attr(&["tvmazeid"]);
        parsed.ids.imdb = self
            .attr("imdb")
            .or_else(|| self.attr("imdbid"))
            .and_then(imdb_id);
        if parsed.season.is_none() {
            parsed.season = self
                .attr("season")
                .and_then(|s| s.trim_start_matches(['S', 's']).parse().ok());
        }
        if parsed.episodes.is_empty() {
            if let Some(episode) = self
                .attr("episode")
                .and_then(|e| e.trim_start_matches(['E', 'e']).parse().ok())
            {
                parsed.episodes.push(episode);
            }
        }

        let size = self
            .size
            .or_else(|| self.attr("size").and_then(|s| s.parse().ok()));

        Ok(CandidateRelease {
            raw_title,
            parsed,
            indexer_id,
            download_url: self.enclosure_url.or(self.link),
            size,
        })
    }
}

/// IMDb ids arrive with or without the `tt` prefix and zero padding.
fn imdb_id(value: &str) -> Option<String> {
    let digits = value.trim().trim_start_matches("tt");
    let id: u32 = digits.parse().ok().filter(|id| *id > 0)?;
    Some(format!("tt{id:07}"))
}

fn attribute(element: &BytesStart<'_>, key: &str) -> Option<String> {
    element
        .attributes()
        .flatten()
        .find(|a| a.key.as_ref() == key.as_bytes())
        .and_then(|a| a.unescape_value().ok())
        .map(|v| v.into_owned())
}

/// Map a Newznab `<error code=".." description=".."/>` element to an error.
///
/// Codes 201–203 (incorrect parameter, no such function, function not
/// available) mean the request shape is unsupported and the next tier
/// should be tried.
fn indexer_error(element: &BytesStart<'_>) -> SearchError {
    let code: u32 = attribute(element, "code")
        .and_then(|c| c.parse().ok())
        .unwrap_or(0);
    let description = attribute(element, "description").unwrap_or_default();
    let message = format!("indexer error {code}: {description}");
    if (201..=203).contains(&code) {
        SearchError::Unsupported(message)
    } else {
        SearchError::Http(message)
    }
}

fn parse_feed(xml: &str) -> Result<Vec<FeedItem>, SearchError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut items = Vec::new();
    let mut current: Option<FeedItem> = None;
    let mut element = String::new();

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                match name.as_str() {
                    "item" => current = Some(FeedItem::default()),
                    "error" => return Err(indexer_error(&e)),
                    _ => {}
                }
                element = name;
            }
            Ok(Event::Empty(e)) => {
                let name = String::from_utf8_lossy(e.name().as_ref()).into_owned();
                if name == "error" {
                    return Err(indexer_error(&e));
                }
                let Some(item) = current.as_mut() else {
                    continue;
                };
                match name.as_str() {
                    "enclosure" => {
                        item.enclosure_url = attribute(&e, "url");
                        if let Some(length) = attribute(&e, "length").and_then(|l| l.parse().ok()) {
                            item.size = Some(length);
                        }
                    }
                    "newznab:attr" | "torznab:attr" => {
                        if let (Some(key), Some(value)) = (attribute(&e, "name"), attribute(&e, "value")) {
                            item.attrs.push((key.to_lowercase(), value));
                        }
                    }
                    _ => {}
                }
            }
            Ok(Event::Text(e)) => {
                if let Some(item) = current.as_mut() {
                    match e.unescape() {
                        Ok(text) => item.set_text(&element, text.into_owned()),
                        Err(err) => item.error = Some(format!("bad text in <{element}>: {err}")),
                    }
                }
            }
            Ok(Event::CData(e)) => {
                if let Some(item) = current.as_mut() {
                    let text = String::from_utf8_lossy(&e.into_inner()).into_owned();
                    item.set_text(&element, text);
                }
            }
            Ok(Event::End(e)) => {
                if e.name().as_ref() == b"item" {
                    if let Some(item) = current.take() {
                        items.push(item);
                    }
                }
                element.clear();
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(SearchError::Parse(format!(
                    "XML parse error at {}: {e}",
                    reader.error_position()
                )))
            }
            _ => {}
        }
    }

    Ok(items)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::IndexerKind;
    use url::Url;

    const NEWZNAB_FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0" xmlns:newznab="http://www.newznab.com/DTD/2010/feeds/attributes/">
<channel>
  <title>Indexer</title>
  <item>
    <title>Show.Name.S01E02.720p.HDTV.x264-GRP</title>
    <link>https://indexer.example/getnzb/abc</link>
    <enclosure url="https://indexer.example/getnzb/abc.nzb" length="734003200" type="application/x-nzb"/>
    <newznab:attr name="tvdbid" value="42"/>
    <newznab:attr name="season" value="S01"/>
  </item>
  <item>
    <title><![CDATA[Fack Ju Göthe II 2015 German 1080p]]></title>
    <link>https://indexer.example/getnzb/def</link>
    <newznab:attr name="imdb" value="4176776"/>
    <newznab:attr name="size" value="1234"/>
  </item>
  <item>
    <title></title>
    <link>https://indexer.example/getnzb/broken</link>
  </item>
</channel>
</rss>"#;

    fn indexer() -> IndexerDescriptor {
        IndexerDescriptor::new(
            7,
            "Indexer",
            IndexerKind::Newznab,
            Url::parse("https://indexer.example").expect("valid url"),
        )
    }

    fn parse(body: &str) -> Result<Vec<Result<CandidateRelease, SearchError>>, SearchError> {
        FeedParser.parse(
            &indexer(),
            &IndexerRequest::rss("https://indexer.example/api"),
            &RawPayload::new(body),
        )
    }

    #[test]
    fn items_parsed_with_attributes() {
        let results = parse(NEWZNAB_FEED).expect("feed should parse");
        assert_eq!(results.len(), 3);

        let first = results[0].as_ref().expect("first item valid");
        assert_eq!(first.raw_title, "Show.Name.S01E02.720p.HDTV.x264-GRP");
        assert_eq!(first.parsed.title, "Show Name");
        assert_eq!(first.parsed.ids.tvdb, Some(42));
        assert_eq!(first.parsed.season, Some(1));
        assert_eq!(first.size, Some(734_003_200));
        assert_eq!(first.indexer_id, 7);
        assert_eq!(
            first.download_url.as_deref(),
            Some("https://indexer.example/getnzb/abc.nzb")
        );

        let second = results[1].as_ref().expect("second item valid");
        assert_eq!(second.parsed.title, "Fack Ju Göthe II");
        assert_eq!(second.parsed.year, 2015);
        assert_eq!(second.parsed.ids.imdb.as_deref(), Some("tt4176776"));
        assert_eq!(second.size, Some(1234));
        assert_eq!(
            second.download_url.as_deref(),
            Some("https://indexer.example/getnzb/def")
        );
    }

    #[test]
    fn item_without_title_fails_alone() {
        let results = parse(NEWZNAB_FEED).expect("feed should parse");
        assert!(results[0].is_ok());
        assert!(results[1].is_ok());
        assert!(matches!(results[2], Err(SearchError::Parse(_))));
    }

    #[test]
    fn empty_channel_yields_nothing() {
        let results = parse("<rss><channel></channel></rss>").expect("feed should parse");
        assert!(results.is_empty());
    }

    #[test]
    fn function_not_available_is_unsupported() {
        let err = parse(r#"<?xml version="1.0"?><error code="203" description="Function Not Available"/>"#)
            .expect_err("error document");
        assert!(matches!(err, SearchError::Unsupported(_)));
        assert!(err.to_string().contains("203"));
    }

    #[test]
    fn credential_error_is_http() {
        let err = parse(r#"<error code="100" description="Incorrect user credentials"/>"#)
            .expect_err("error document");
        assert!(matches!(err, SearchError::Http(_)));
    }

    #[test]
    fn malformed_document_is_parse_error() {
        let err = parse("<rss><channel><item><title>x</titl></item>").expect_err("malformed");
        assert!(matches!(err, SearchError::Parse(_)));
    }

    fn parse_typed(body: &str, content_type: &str) -> Result<Vec<Result<CandidateRelease, SearchError>>, SearchError> {
        let payload = RawPayload {
            body: body.into(),
            content_type: Some(content_type.into()),
        };
        FeedParser.parse(
            &indexer(),
            &IndexerRequest::rss("https://indexer.example/api?apikey=secret"),
            &payload,
        )
    }

    #[test]
    fn html_login_page_rejected() {
        let err = parse_typed("<html><body>Login</body></html>", "text/html; charset=utf-8")
            .expect_err("html is not a feed");
        assert!(matches!(err, SearchError::Parse(_)));
        assert!(err.to_string().contains("text/html"));
        assert!(!err.to_string().contains("secret"));
    }

    #[test]
    fn json_body_rejected() {
        let err = parse_typed("{}", "application/json").expect_err("json is not a feed");
        assert!(matches!(err, SearchError::Parse(_)));
    }

    #[test]
    fn xml_content_types_accepted() {
        for content_type in ["application/rss+xml", "application/xml", "text/xml; charset=UTF-8", "text/plain"] {
            let results = parse_typed(NEWZNAB_FEED, content_type).expect("feed should parse");
            assert_eq!(results.len(), 3, "content type {content_type}");
        }
    }

    #[test]
    fn imdb_formats() {
        assert_eq!(imdb_id("tt0100000").as_deref(), Some("tt0100000"));
        assert_eq!(imdb_id("100000").as_deref(), Some("tt0100000"));
        assert_eq!(imdb_id("0"), None);
        assert_eq!(imdb_id("abc"), None);
    }

    #[test]
    fn zero_ids_ignored() {
        let feed = r#"<rss><channel><item><title>Show.S01E01</title>
            <torznab:attr name="tvdbid" value="0"/></item></channel></rss>"#;
        let results = parse(feed).expect("feed should parse");
        let candidate = results[0].as_ref().expect("valid item");
        assert!(candidate.parsed.ids.tvdb.is_none());
    }
}
