//! Predicate evaluation.
//!
//! A structural match is kept only when every predicate attached to its
//! pattern holds. Predicates are tested in declaration order and the first
//! failure rejects the match. Within one predicate, a capture bound to
//! several nodes is tested node by node: plain operators require every node
//! to pass, `any-` operators require at least one. A capture that bound no
//! node in the match satisfies any predicate that references it.
//!
//! The evaluator holds no state between matches, so evaluating the same
//! match twice always gives the same verdict.

use std::fmt;

use tracing::trace;

use crate::capture::Match;
use crate::error::EvaluationError;
use crate::predicate::{Check, Predicate, PredicateOp, Quantifier};
use crate::query::CompiledQuery;
use crate::source::SourceText;

/// Outcome of evaluating one match.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verdict {
    /// Every predicate held.
    Accepted,
    /// A predicate failed.
    Rejected {
        /// Position of the failing predicate in the pattern's predicate list.
        predicate: usize,
    },
}

impl Verdict {
    /// Returns whether the match was accepted.
    #[must_use]
    pub const fn is_accepted(self) -> bool {
        matches!(self, Self::Accepted)
    }
}

/// Evaluates the predicates of one compiled query against matches found in
/// one source buffer.
#[derive(Debug, Clone, Copy)]
pub struct PredicateEvaluator<'q> {
    query: &'q CompiledQuery,
    source: &'q SourceText,
}

impl<'q> PredicateEvaluator<'q> {
    /// Creates an evaluator for matches of `query` over `source`.
    ///
    /// `source` must be the buffer the matched tree was parsed from.
    #[must_use]
    pub const fn new(query: &'q CompiledQuery, source: &'q SourceText) -> Self {
        Self { query, source }
    }

    /// Decides whether `matched` satisfies its pattern's predicates.
    ///
    /// # Errors
    ///
    /// Returns [`EvaluationError::UnknownPredicateOperator`] when the pattern
    /// carries a deferred operator. The error takes precedence over any
    /// rejection, so such a pattern never silently accepts or rejects.
    pub fn evaluate(&self, matched: &Match<'_>) -> Result<Verdict, EvaluationError> {
        let pattern_index = matched.pattern_index();
        let predicates = self.query.predicates_for(pattern_index);

        if let Some(operator) = predicates.iter().find_map(|p| match p.operator() {
            PredicateOp::Unknown(name) => Some(name),
            _ => None,
        }) {
            return Err(EvaluationError::unknown_operator(operator.as_str(), pattern_index));
        }

        for (position, predicate) in predicates.iter().enumerate() {
            if !self.holds(predicate, matched) {
                trace!(
                    pattern = pattern_index,
                    predicate = %predicate,
                    "match rejected"
                );
                return Ok(Verdict::Rejected {
                    predicate: position,
                });
            }
        }
        Ok(Verdict::Accepted)
    }

    /// Evaluates `matched` and returns the filtered match when accepted.
    ///
    /// The filtered match keeps the captures referenced by the pattern's
    /// predicates. Patterns without predicates keep every capture.
    ///
    /// # Errors
    ///
    /// Propagates the errors of [`PredicateEvaluator::evaluate`].
    pub fn filter<'tree>(
        &self,
        matched: &Match<'tree>,
    ) -> Result<Option<Match<'tree>>, EvaluationError> {
        let verdict = self.evaluate(matched)?;
        Ok(self.project(matched, verdict))
    }

    /// Wraps a match sequence so that it yields only accepted matches.
    pub fn accepted<'tree, I>(self, matches: I) -> FilteredMatches<'q, I::IntoIter>
    where
        I: IntoIterator<Item = Match<'tree>>,
    {
        FilteredMatches {
            evaluator: self,
            matches: matches.into_iter(),
            summary: MatchSummary::default(),
        }
    }

    /// Builds the filtered match for a verdict already returned by
    /// [`PredicateEvaluator::evaluate`], without evaluating again.
    ///
    /// Returns `None` for a rejection. On acceptance the match keeps the
    /// captures referenced by the pattern's predicates, or every capture
    /// when the pattern has none.
    #[must_use]
    pub fn project<'tree>(&self, matched: &Match<'tree>, verdict: Verdict) -> Option<Match<'tree>> {
        if !verdict.is_accepted() {
            return None;
        }

        let predicates = self.query.predicates_for(matched.pattern_index());
        if predicates.is_empty() {
            return Some(matched.clone());
        }

        let referenced: Vec<u32> = predicates.iter().flat_map(Predicate::captures).collect();
        let captures = matched
            .captures()
            .iter()
            .filter(|capture| referenced.contains(&capture.index()))
            .cloned()
            .collect();
        Some(Match::new(matched.pattern_index(), captures))
    }

    fn holds(&self, predicate: &Predicate, matched: &Match<'_>) -> bool {
        match predicate.check() {
            Check::EqLiteral {
                capture,
                literal,
                negated,
                quantifier,
            } => self.test_nodes(matched, *capture, *quantifier, |text| {
                (text == &**literal) != *negated
            }),
            Check::Regex {
                capture,
                regex,
                negated,
                quantifier,
            } => self.test_nodes(matched, *capture, *quantifier, |text| {
                regex.is_match(text) != *negated
            }),
            Check::AnyOf {
                capture,
                values,
                negated,
            } => self.test_nodes(matched, *capture, Quantifier::All, |text| {
                values.iter().any(|value| **value == *text) != *negated
            }),
            Check::EqCapture {
                left,
                right,
                negated,
                quantifier,
            } => self.captures_equal(matched, (*left, *right), *negated, *quantifier),
            // Deferred operators are reported before any predicate runs.
            Check::Deferred => false,
        }
    }

    fn test_nodes(
        &self,
        matched: &Match<'_>,
        capture: u32,
        quantifier: Quantifier,
        test: impl Fn(&[u8]) -> bool,
    ) -> bool {
        let mut texts = self.texts(matched, capture).peekable();
        if texts.peek().is_none() {
            return true;
        }
        match quantifier {
            Quantifier::All => texts.all(test),
            Quantifier::Any => texts.any(test),
        }
    }

    /// Compares two captures pairwise in binding order.
    fn captures_equal(
        &self,
        matched: &Match<'_>,
        (left, right): (u32, u32),
        negated: bool,
        quantifier: Quantifier,
    ) -> bool {
        let lefts: Vec<&[u8]> = self.texts(matched, left).collect();
        let rights: Vec<&[u8]> = self.texts(matched, right).collect();
        if lefts.is_empty() || rights.is_empty() {
            return true;
        }

        let mut pairs = lefts
            .iter()
            .zip(&rights)
            .map(|(a, b)| (a == b) != negated);
        match quantifier {
            Quantifier::All => lefts.len() == rights.len() && pairs.all(std::convert::identity),
            Quantifier::Any => pairs.any(std::convert::identity),
        }
    }

    fn texts(&self, matched: &Match<'_>, capture: u32) -> impl Iterator<Item = &'q [u8]> {
        let source = self.source;
        matched
            .nodes_for(capture)
            .map(move |node| source.slice(node.byte_range()).unwrap_or_default())
    }
}

/// Counts of evaluated and accepted matches.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MatchSummary {
    /// Matches evaluated.
    pub total: usize,
    /// Matches that passed every predicate.
    pub accepted: usize,
}

impl MatchSummary {
    /// Adds one verdict to the counts.
    pub const fn record(&mut self, verdict: Verdict) {
        self.total = self.total.saturating_add(1);
        if verdict.is_accepted() {
            self.accepted = self.accepted.saturating_add(1);
        }
    }

    /// Matches that failed a predicate.
    #[must_use]
    pub const fn rejected(&self) -> usize {
        self.total.saturating_sub(self.accepted)
    }
}

impl fmt::Display for MatchSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Predicates passed {} of {} matches",
            self.accepted, self.total
        )
    }
}

/// Iterator over the accepted matches of a match sequence.
///
/// Rejected matches are skipped and counted. An evaluation error is yielded
/// in place of the match that caused it and is not counted.
#[derive(Debug)]
pub struct FilteredMatches<'q, I> {
    evaluator: PredicateEvaluator<'q>,
    matches: I,
    summary: MatchSummary,
}

impl<I> FilteredMatches<'_, I> {
    /// Counts for the matches consumed so far.
    #[must_use]
    pub const fn summary(&self) -> MatchSummary {
        self.summary
    }
}

impl<'tree, I> Iterator for FilteredMatches<'_, I>
where
    I: Iterator<Item = Match<'tree>>,
{
    type Item = Result<Match<'tree>, EvaluationError>;

    fn next(&mut self) -> Option<Self::Item> {
        for matched in self.matches.by_ref() {
            let verdict = match self.evaluator.evaluate(&matched) {
                Ok(verdict) => verdict,
                Err(error) => return Some(Err(error)),
            };
            self.summary.record(verdict);
            if let Some(kept) = self.evaluator.project(&matched, verdict) {
                return Some(Ok(kept));
            }
        }
        None
    }
}
