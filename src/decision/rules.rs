//! Built-in decision rules.
//!
//! Every rule accepts when it has nothing to check: no criteria, no target,
//! or a search kind it does not cover.

use super::Verdict;
use crate::criteria::{SearchCriteria, SearchKind};
use crate::types::{MatchResult, Rejection};

/// The candidate must be bound to the search target.
pub fn entity_match(result: &MatchResult, criteria: Option<&SearchCriteria>) -> Verdict {
    let Some(target) = criteria.and_then(SearchCriteria::target) else {
        return Verdict::Accept;
    };
    match result.matched_entity {
        None => Verdict::Reject(Rejection::UnknownEntity),
        Some(id) if id != target.id => Verdict::Reject(Rejection::WrongEntity),
        Some(_) => Verdict::Accept,
    }
}

/// Season searches only take releases of the searched season.
///
/// A release without a season number cannot be shown to belong to the
/// season and is rejected.
pub fn season_match(result: &MatchResult, criteria: Option<&SearchCriteria>) -> Verdict {
    let Some(SearchKind::Season { season }) = criteria.map(SearchCriteria::kind) else {
        return Verdict::Accept;
    };
    if result.candidate.parsed.season == Some(season) {
        Verdict::Accept
    } else {
        Verdict::Reject(Rejection::WrongSeason)
    }
}

/// Date searches only take releases from exactly the searched date.
pub fn air_date_match(result: &MatchResult, criteria: Option<&SearchCriteria>) -> Verdict {
    let Some(SearchKind::Date { air_date }) = criteria.map(SearchCriteria::kind) else {
        return Verdict::Accept;
    };
    if result.candidate.parsed.air_date == Some(air_date) {
        Verdict::Accept
    } else {
        Verdict::Reject(Rejection::WrongRelease)
    }
}
