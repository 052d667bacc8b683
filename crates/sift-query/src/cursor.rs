//! Match enumeration.
//!
//! [`MatchCursor`] adapts Tree-sitter's streaming query cursor into a plain
//! iterator of owned [`Match`] values. The cursor performs structural
//! matching only; predicates are left to
//! [`PredicateEvaluator`](crate::PredicateEvaluator).

use std::ops::Range;
use std::sync::Arc;

use streaming_iterator::StreamingIterator;

use crate::capture::{Capture, Match};
use crate::config::QueryOptions;
use crate::parser::SyntaxTree;
use crate::query::CompiledQuery;

/// A reusable enumeration cursor.
///
/// Cursors are cheap to create and must not be shared between threads.
/// Each call to [`MatchCursor::matches`] starts a fresh traversal.
pub struct MatchCursor {
    inner: tree_sitter::QueryCursor,
}

impl MatchCursor {
    /// Creates a cursor without a match limit.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: tree_sitter::QueryCursor::new(),
        }
    }

    /// Creates a cursor honouring the match limit in `options`.
    #[must_use]
    pub fn with_options(options: &QueryOptions) -> Self {
        let mut cursor = Self::new();
        if let Some(limit) = options.match_limit() {
            cursor.inner.set_match_limit(limit);
        }
        cursor
    }

    /// Restricts subsequent traversals to nodes intersecting `range`.
    pub fn set_byte_range(&mut self, range: Range<usize>) -> &mut Self {
        self.inner.set_byte_range(range);
        self
    }

    /// Returns whether the last traversal dropped matches because the match
    /// limit was reached. Check it once the [`Matches`] sequence is dropped.
    #[must_use]
    pub fn exceeded_match_limit(&self) -> bool {
        self.inner.did_exceed_match_limit()
    }

    /// Enumerates the structural matches of `query` in `tree`, lazily and in
    /// Tree-sitter's traversal order.
    pub fn matches<'c, 'tree: 'c>(
        &'c mut self,
        query: &'c CompiledQuery,
        tree: &'tree SyntaxTree,
    ) -> Matches<'c, 'tree> {
        let bytes = tree.source().as_bytes();
        let inner = self.inner.matches(query.ts_query(), tree.root_node(), bytes);
        Matches { inner, query }
    }
}

impl Default for MatchCursor {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for MatchCursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MatchCursor").finish_non_exhaustive()
    }
}

/// Lazy sequence of raw matches produced by [`MatchCursor::matches`].
pub struct Matches<'c, 'tree> {
    inner: tree_sitter::QueryMatches<'c, 'tree, &'tree [u8], &'tree [u8]>,
    query: &'c CompiledQuery,
}

impl<'tree> Iterator for Matches<'_, 'tree> {
    type Item = Match<'tree>;

    fn next(&mut self) -> Option<Self::Item> {
        let raw = self.inner.next()?;

        let captures = raw
            .captures
            .iter()
            .filter_map(|capture| {
                self.query
                    .capture_name_arc(capture.index)
                    .map(|name| Capture::new(capture.index, Arc::clone(name), capture.node))
            })
            .collect();
        Some(Match::new(raw.pattern_index, captures))
    }
}

impl std::fmt::Debug for Matches<'_, '_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Matches")
            .field("query", &self.query)
            .finish_non_exhaustive()
    }
}
