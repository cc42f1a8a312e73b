//! Immutable description of one search invocation.
//!
//! A [`SearchCriteria`] is built once through [`SearchCriteriaBuilder`] and
//! never changes afterwards. Its clean titles are derived from the target's
//! titles at build time and cannot be set by hand.

use chrono::NaiveDate;

use crate::error::SearchError;
use crate::normalize::clean_title_variants;
use crate::types::{EntityId, ExternalIds, TagId};

/// The library entity a search is for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TargetEntity {
    pub id: EntityId,
    pub title: String,
    /// Release year, zero when unknown.
    pub year: u16,
    pub ids: ExternalIds,
}

impl TargetEntity {
    pub fn new(id: EntityId, title: impl Into<String>) -> Self {
        Self {
            id,
            title: title.into(),
            year: 0,
            ids: ExternalIds::default(),
        }
    }

    pub fn with_year(mut self, year: u16) -> Self {
        self.year = year;
        self
    }

    pub fn with_ids(mut self, ids: ExternalIds) -> Self {
        self.ids = ids;
        self
    }
}

/// What the search is looking for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchKind {
    /// The whole entity, matched by identifier or title and year.
    Entity,
    /// One season of the entity.
    Season { season: u32 },
    /// The entity's release on one exact date.
    Date { air_date: NaiveDate },
    /// No target: a catalogue-wide fetch of recent releases.
    Catalogue,
}

/// Immutable description of one search.
#[derive(Debug, Clone)]
pub struct SearchCriteria {
    target: Option<TargetEntity>,
    alternate_titles: Vec<String>,
    clean_titles: Vec<String>,
    tags: Vec<TagId>,
    user_invoked: bool,
    interactive: bool,
    kind: SearchKind,
}

impl SearchCriteria {
    /// Start building criteria for a targeted search.
    pub fn builder(target: TargetEntity, kind: SearchKind) -> SearchCriteriaBuilder {
        SearchCriteriaBuilder {
            target,
            kind,
            alternate_titles: Vec::new(),
            tags: Vec::new(),
            user_invoked: false,
            interactive: false,
        }
    }

    /// Criteria for a catalogue-wide fetch: no target, no tags.
    pub fn catalogue() -> Self {
        Self {
            target: None,
            alternate_titles: Vec::new(),
            clean_titles: Vec::new(),
            tags: Vec::new(),
            user_invoked: false,
            interactive: false,
            kind: SearchKind::Catalogue,
        }
    }

    pub fn target(&self) -> Option<&TargetEntity> {
        self.target.as_ref()
    }

    pub fn alternate_titles(&self) -> &[String] {
        &self.alternate_titles
    }

    /// Match keys of the target's title and every alternate title,
    /// deduplicated, in declaration order.
    pub fn clean_titles(&self) -> &[String] {
        &self.clean_titles
    }

    pub fn tags(&self) -> &[TagId] {
        &self.tags
    }

    pub fn is_user_invoked(&self) -> bool {
        self.user_invoked
    }

    pub fn is_interactive(&self) -> bool {
        self.interactive
    }

    pub fn kind(&self) -> SearchKind {
        self.kind
    }

    /// Titles to query providers with: the target's title followed by its
    /// alternate titles, skipping any whose normalised form repeats an
    /// earlier one.
    pub fn query_titles(&self) -> Vec<&str> {
        let Some(target) = &self.target else {
            return Vec::new();
        };
        let mut seen: Vec<String> = Vec::new();
        let mut titles = Vec::new();
        for title in std::iter::once(&target.title).chain(&self.alternate_titles) {
            let Ok(key) = crate::normalize::normalize(title) else {
                continue;
            };
            if !seen.contains(&key) {
                seen.push(key);
                titles.push(title.as_str());
            }
        }
        titles
    }
}

/// Builder for [`SearchCriteria`].
#[derive(Debug, Clone)]
pub struct SearchCriteriaBuilder {
    target: TargetEntity,
    kind: SearchKind,
    alternate_titles: Vec<String>,
    tags: Vec<TagId>,
    user_invoked: bool,
    interactive: bool,
}

impl SearchCriteriaBuilder {
    pub fn alternate_titles<I, S>(mut self, titles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.alternate_titles.extend(titles.into_iter().map(Into::into));
        self
    }

    pub fn tags(mut self, tags: impl IntoIterator<Item = TagId>) -> Self {
        self.tags.extend(tags);
        self
    }

    pub fn user_invoked(mut self, user_invoked: bool) -> Self {
        self.user_invoked = user_invoked;
        self
    }

    pub fn interactive(mut self, interactive: bool) -> Self {
        self.interactive = interactive;
        self
    }

    /// Validate and freeze the criteria, deriving the clean titles.
    ///
    /// # Errors
    ///
    /// Returns [`SearchError::InvalidArgument`] when the kind is
    /// [`SearchKind::Catalogue`] (use [`SearchCriteria::catalogue`]), or when
    /// the target title or an alternate title normalises to nothing.
    pub fn build(self) -> Result<SearchCriteria, SearchError> {
        if self.kind == SearchKind::Catalogue {
            return Err(SearchError::InvalidArgument(
                "catalogue criteria have no target entity".into(),
            ));
        }

        let mut clean_titles: Vec<String> = Vec::new();
        for title in std::iter::once(&self.target.title).chain(&self.alternate_titles) {
            for key in clean_title_variants(title)? {
                if !clean_titles.contains(&key) {
                    clean_titles.push(key);
                }
            }
        }

        let mut tags = self.tags;
        tags.sort_unstable();
        tags.dedup();

        Ok(SearchCriteria {
            target: Some(self.target),
            alternate_titles: self.alternate_titles,
            clean_titles,
            tags,
            user_invoked: self.user_invoked,
            interactive: self.interactive,
            kind: self.kind,
        })
    }
}
