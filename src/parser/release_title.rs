//! Release-name parsing: entity title, year, season/episodes, air date.
//!
//! Scene-style names are matched against a few patterns in order of
//! specificity: season/episode, then daily (`yyyy.mm.dd`), then year.
//! Anything else keeps the whole name, minus trailing quality tags, as
//! the title. Numbering is taken as-is; no alternate numbering schemes
//! are mapped.

use std::sync::OnceLock;

use chrono::NaiveDate;
use regex::{Captures, Regex};

use crate::error::SearchError;
use crate::types::ParsedInfo;

struct Patterns {
    group_prefix: Regex,
    season: Regex,
    daily: Regex,
    year: Regex,
    quality_tail: Regex,
}

static PATTERNS: OnceLock<Result<Patterns, regex::Error>> = OnceLock::new();

fn patterns() -> Result<&'static Patterns, SearchError> {
    PATTERNS
        .get_or_init(|| {
            Ok(Patterns {
                // [Group] at the front of fansub releases.
                group_prefix: Regex::new(r"^\s*\[[^\]]*\]\s*")?,
                season: Regex::new(
                    r"(?i)^(?P<title>.+?)[\s._-]+(?:\(?(?P<year>(?:19|20)\d{2})\)?[\s._-]+)?S(?P<season>\d{1,2})(?:[\s._-]?E(?P<first>\d{1,3})(?:-?E(?P<last>\d{1,3}))?)?(?:[\s._-]|$)",
                )?,
                daily: Regex::new(
                    r"^(?P<title>.+?)[\s._-]+(?P<year>(?:19|20)\d{2})[\s._-](?P<month>\d{2})[\s._-](?P<day>\d{2})(?:[\s._-]|$)",
                )?,
                // Greedy title: the last year-like token wins ("Blade Runner 2049 2017").
                year: Regex::new(
                    r"^(?P<title>.+)[\s._-]+[\(\[]?(?P<year>(?:19|20)\d{2})[\)\]]?(?:[\s._-]|$)",
                )?,
                quality_tail: Regex::new(
                    r"(?i)[\s._-]+[\(\[]?(?:480p|576p|720p|1080p|2160p|web-?dl|webrip|hdtv|bluray|x264|x265|h\.?26[45]|hevc)\b.*$",
                )?,
            })
        })
        .as_ref()
        .map_err(|e| SearchError::Parse(format!("release patterns failed to compile: {e}")))
}

/// Parse a release name into [`ParsedInfo`].
///
/// External identifiers are never present in names; feed parsers add them
/// from item attributes.
///
/// # Errors
///
/// Returns [`SearchError::Parse`] when the name is empty, leaves no title,
/// or carries an impossible date.
///
/// # Examples
///
/// ```
/// use release_search::parser::parse_release_title;
///
/// let info = parse_release_title("Show.Name.S02E05.720p.HDTV").unwrap();
/// assert_eq!(info.title, "Show Name");
/// assert_eq!(info.season, Some(2));
/// assert_eq!(info.episodes, vec![5]);
/// ```
pub fn parse_release_title(raw: &str) -> Result<ParsedInfo, SearchError> {
    let patterns = patterns()?;
    let name = patterns.group_prefix.replace(raw.trim(), "");
    if name.trim().is_empty() {
        return Err(SearchError::Parse("empty release title".into()));
    }

    let info = if let Some(caps) = patterns.season.captures(&name) {
        let season = number(&caps, "season");
        let episodes = match (number(&caps, "first"), number(&caps, "last")) {
            (Some(first), Some(last)) if last >= first => (first..=last).collect(),
            (Some(first), _) => vec![first],
            _ => Vec::new(),
        };
        ParsedInfo {
            title: clean_title(&caps["title"]),
            year: year(&caps),
            season,
            episodes,
            ..Default::default()
        }
    } else if let Some(caps) = patterns.daily.captures(&name) {
        let date = match (number(&caps, "year"), number(&caps, "month"), number(&caps, "day")) {
            (Some(y), Some(m), Some(d)) => NaiveDate::from_ymd_opt(y as i32, m, d),
            _ => None,
        };
        let Some(date) = date else {
            return Err(SearchError::Parse(format!("invalid air date in {raw:?}")));
        };
        ParsedInfo {
            title: clean_title(&caps["title"]),
            air_date: Some(date),
            ..Default::default()
        }
    } else if let Some(caps) = patterns.year.captures(&name) {
        ParsedInfo {
            title: clean_title(&caps["title"]),
            year: year(&caps),
            ..Default::default()
        }
    } else {
        ParsedInfo {
            title: clean_title(&patterns.quality_tail.replace(&name, "")),
            ..Default::default()
        }
    };

    if info.title.is_empty() {
        return Err(SearchError::Parse(format!("no title in {raw:?}")));
    }
    Ok(info)
}

fn number(caps: &Captures<'_>, group: &str) -> Option<u32> {
    caps.name(group).and_then(|m| m.as_str().parse().ok())
}

fn year(caps: &Captures<'_>) -> u16 {
    caps.name("year")
        .and_then(|m| m.as_str().parse().ok())
        .unwrap_or(0)
}

/// Dots and underscores separate words in scene names.
fn clean_title(title: &str) -> String {
    title
        .replace(['.', '_'], " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .trim_end_matches(['-', '(', '['])
        .trim()
        .to_string()
}
