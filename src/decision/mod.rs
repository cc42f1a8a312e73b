//! Ordered accept/reject rule pipeline.
//!
//! Rules are plain functions kept in a list sorted by priority. Each one
//! sees the match result and the criteria of the search and either accepts
//! or rejects with a reason. Evaluation stops at the first rejection; if
//! every rule accepts, the candidate is accepted.
//!
//! A rule that does not apply to the current search (a date rule during a
//! season search, or any rule without criteria) must accept. That keeps
//! rules independent of each other and of registration order.

pub mod rules;

use crate::criteria::SearchCriteria;
use crate::types::{Decision, MatchResult, Rejection};

/// Outcome of one rule.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Verdict {
    Accept,
    Reject(Rejection),
}

type Check = Box<dyn Fn(&MatchResult, Option<&SearchCriteria>) -> Verdict + Send + Sync>;

struct Rule {
    name: &'static str,
    priority: i32,
    check: Check,
}

/// Ordered rule list applied to every match result.
pub struct DecisionPipeline {
    rules: Vec<Rule>,
}

impl DecisionPipeline {
    /// A pipeline with no rules; it accepts everything.
    pub fn new() -> Self {
        Self { rules: Vec::new() }
    }

    /// A pipeline with the built-in rules of [`rules`].
    pub fn with_default_rules() -> Self {
        let mut pipeline = Self::new();
        pipeline.register("entity_match", 0, rules::entity_match);
        pipeline.register("season_match", 10, rules::season_match);
        pipeline.register("air_date_match", 10, rules::air_date_match);
        pipeline
    }

    /// Add a rule. Lower priorities run first; equal priorities keep
    /// registration order.
    pub fn register<F>(&mut self, name: &'static str, priority: i32, check: F)
    where
        F: Fn(&MatchResult, Option<&SearchCriteria>) -> Verdict + Send + Sync + 'static,
    {
        self.rules.push(Rule {
            name,
            priority,
            check: Box::new(check),
        });
        self.rules.sort_by_key(|rule| rule.priority);
    }

    /// Rule names in evaluation order.
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|rule| rule.name).collect()
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Judge one match result.
    pub fn evaluate(&self, result: MatchResult, criteria: Option<&SearchCriteria>) -> Decision {
        let user_invoked = criteria.is_some_and(SearchCriteria::is_user_invoked);
        for rule in &self.rules {
            if let Verdict::Reject(reason) = (rule.check)(&result, criteria) {
                if user_invoked {
                    tracing::info!(
                        release = %result.candidate.raw_title,
                        rule = rule.name,
                        %reason,
                        "release rejected"
                    );
                } else {
                    tracing::debug!(
                        release = %result.candidate.raw_title,
                        rule = rule.name,
                        %reason,
                        "release rejected"
                    );
                }
                return Decision::reject(result.candidate, reason);
            }
        }
        Decision::accept(result.candidate)
    }

    /// Judge every match result, one decision each, in input order.
    pub fn evaluate_all(
        &self,
        results: Vec<MatchResult>,
        criteria: Option<&SearchCriteria>,
    ) -> Vec<Decision> {
        results
            .into_iter()
            .map(|result| self.evaluate(result, criteria))
            .collect()
    }
}

impl Default for DecisionPipeline {
    fn default() -> Self {
        Self::with_default_rules()
    }
}

impl std::fmt::Debug for DecisionPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DecisionPipeline")
            .field("rules", &self.rule_names())
            .finish()
    }
}
