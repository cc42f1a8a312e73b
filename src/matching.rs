//! Binding parsed candidates to the search target.
//!
//! Matching only ever asks "is this release for the entity being searched
//! for?". It never looks a release up in the wider library, so an
//! unmatched candidate simply carries no entity.
//!
//! Precedence:
//!
//! 1. An external identifier present on both sides decides outright. The
//!    first kind both sides carry wins, in the order TVDB, TMDb, IMDb,
//!    TVmaze. A mismatch is final: the release names another entity and
//!    title comparison is not attempted.
//! 2. Otherwise any match key of the release title must equal one of the
//!    criteria's clean titles, and the years must agree when both are
//!    non-zero.
//!
//! Date and season agreement are not part of binding; the decision rules
//! check them against the bound result.

use crate::criteria::{SearchCriteria, SearchKind, TargetEntity};
use crate::normalize::clean_title_variants;
use crate::types::{CandidateRelease, ExternalIds, MatchMethod, MatchResult};

enum IdComparison {
    Same(&'static str),
    Different(&'static str),
    NoCommonId,
}

/// Reconcile one candidate against the criteria's target entity.
pub fn match_candidate(candidate: CandidateRelease, criteria: &SearchCriteria) -> MatchResult {
    let mut result = MatchResult {
        candidate,
        matched_entity: None,
        method: None,
        notes: Vec::new(),
    };

    let Some(target) = criteria.target() else {
        result.notes.push("catalogue search has no target entity".into());
        return result;
    };

    match compare_ids(&result.candidate.parsed.ids, &target.ids) {
        IdComparison::Same(kind) => {
            result.matched_entity = Some(target.id);
            result.method = Some(MatchMethod::Identifier);
            result.notes.push(format!("matched by {kind} id"));
        }
        IdComparison::Different(kind) => {
            result.notes.push(format!("{kind} id belongs to another entity"));
        }
        IdComparison::NoCommonId => match_title(&mut result, target, criteria),
    }

    if let SearchKind::Date { air_date } = criteria.kind() {
        match result.candidate.parsed.air_date {
            Some(date) if date == air_date => {}
            Some(date) => result
                .notes
                .push(format!("release date {date} differs from {air_date}")),
            None => result.notes.push("release carries no air date".into()),
        }
    }

    tracing::trace!(
        title = %result.candidate.raw_title,
        matched = result.matched_entity.is_some(),
        "candidate matched"
    );
    result
}

fn compare_ids(release: &ExternalIds, target: &ExternalIds) -> IdComparison {
    fn compare<T: PartialEq>(kind: &'static str, a: &Option<T>, b: &Option<T>) -> Option<IdComparison> {
        match (a, b) {
            (Some(a), Some(b)) if a == b => Some(IdComparison::Same(kind)),
            (Some(_), Some(_)) => Some(IdComparison::Different(kind)),
            _ => None,
        }
    }

    compare("tvdb", &release.tvdb, &target.tvdb)
        .or_else(|| compare("tmdb", &release.tmdb, &target.tmdb))
        .or_else(|| compare("imdb", &release.imdb, &target.imdb))
        .or_else(|| compare("tvmaze", &release.tvmaze, &target.tvmaze))
        .unwrap_or(IdComparison::NoCommonId)
}

fn match_title(result: &mut MatchResult, target: &TargetEntity, criteria: &SearchCriteria) {
    let parsed = &result.candidate.parsed;
    let keys = match clean_title_variants(&parsed.title) {
        Ok(keys) => keys,
        Err(e) => {
            result.notes.push(format!("release title unusable: {e}"));
            return;
        }
    };

    if !keys.iter().any(|key| criteria.clean_titles().contains(key)) {
        result
            .notes
            .push(format!("title {:?} matches no known title", parsed.title));
        return;
    }

    if parsed.year != 0 && target.year != 0 && parsed.year != target.year {
        let note = format!("year {} differs from {}", parsed.year, target.year);
        result.notes.push(note);
        return;
    }

    result.matched_entity = Some(target.id);
    result.method = Some(MatchMethod::Title);
}
