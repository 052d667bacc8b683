//! Query compilation.
//!
//! A [`CompiledQuery`] pairs Tree-sitter's structural query with the typed
//! predicates attached to each of its patterns. It is immutable once built
//! and can be shared across threads; every thread enumerates with its own
//! [`MatchCursor`](crate::MatchCursor).

mod scan;

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::config::QueryOptions;
use crate::error::QueryError;
use crate::language::Grammar;
use crate::predicate::{Predicate, PredicateArg, PredicateOp};

use self::scan::{RawArg, RawPredicate, ScannedForm, ScannedQuery};

#[derive(Debug, Clone, Default)]
struct CompiledPattern {
    captures: Vec<u32>,
    predicates: Vec<Predicate>,
}

/// A query compiled for one grammar.
pub struct CompiledQuery {
    inner: tree_sitter::Query,
    grammar: Arc<str>,
    capture_names: Vec<Arc<str>>,
    patterns: Vec<CompiledPattern>,
}

impl CompiledQuery {
    /// Compiles `text` for `grammar` with default options.
    ///
    /// # Errors
    ///
    /// See [`CompiledQuery::compile_with`].
    pub fn compile(text: &str, grammar: &Grammar) -> Result<Self, QueryError> {
        Self::compile_with(text, grammar, &QueryOptions::default())
    }

    /// Compiles `text` for `grammar`.
    ///
    /// Predicate forms are lifted out of the text before Tree-sitter sees it
    /// and attached to the pattern that owns them, so structural matching
    /// and predicate evaluation stay separate.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Compile`] for malformed query text,
    /// [`QueryError::UnknownCapture`] when a predicate references a capture
    /// its pattern does not bind, [`QueryError::UnknownPredicate`] for an
    /// unrecognised operator (unless deferral is enabled in `options`), and
    /// the argument errors raised by [`Predicate::new`].
    pub fn compile_with(
        text: &str,
        grammar: &Grammar,
        options: &QueryOptions,
    ) -> Result<Self, QueryError> {
        let scanned = scan::scan(text)?;
        let inner = tree_sitter::Query::new(grammar.language(), scanned.structural())
            .map_err(|e| QueryError::compile(e.offset, describe(&e)))?;

        let patterns = (0..inner.pattern_count())
            .map(|index| compile_pattern(&inner, &scanned, index, options))
            .collect::<Result<Vec<_>, _>>()?;
        let capture_names = inner
            .capture_names()
            .iter()
            .copied()
            .map(Arc::<str>::from)
            .collect();

        debug!(
            grammar = grammar.name(),
            patterns = patterns.len(),
            predicates = patterns.iter().map(|p| p.predicates.len()).sum::<usize>(),
            "compiled query"
        );

        Ok(Self {
            inner,
            grammar: Arc::from(grammar.name()),
            capture_names,
            patterns,
        })
    }

    /// Returns the number of patterns.
    #[must_use]
    pub fn pattern_count(&self) -> usize {
        self.patterns.len()
    }

    /// Returns the capture table, indexed by capture index.
    #[must_use]
    pub fn capture_names(&self) -> &[Arc<str>] {
        &self.capture_names
    }

    /// Returns the name of the capture at `index`.
    #[must_use]
    pub fn capture_name(&self, index: u32) -> Option<&str> {
        self.capture_name_arc(index).map(AsRef::as_ref)
    }

    /// Returns the index of the capture called `name` (without the `@`).
    #[must_use]
    pub fn capture_index(&self, name: &str) -> Option<u32> {
        self.inner.capture_index_for_name(name)
    }

    /// Capture indices bound by the pattern, in first-occurrence order.
    #[must_use]
    pub fn captures_for_pattern(&self, pattern_index: usize) -> &[u32] {
        self.patterns
            .get(pattern_index)
            .map_or(&[], |pattern| pattern.captures.as_slice())
    }

    /// Predicates attached to the pattern, in declaration order.
    ///
    /// Unknown pattern indices yield an empty slice.
    #[must_use]
    pub fn predicates_for(&self, pattern_index: usize) -> &[Predicate] {
        self.patterns
            .get(pattern_index)
            .map_or(&[], |pattern| pattern.predicates.as_slice())
    }

    /// Returns the name of the grammar the query was compiled for.
    #[must_use]
    pub fn grammar_name(&self) -> &str {
        &self.grammar
    }

    pub(crate) const fn ts_query(&self) -> &tree_sitter::Query {
        &self.inner
    }

    pub(crate) fn capture_name_arc(&self, index: u32) -> Option<&Arc<str>> {
        usize::try_from(index)
            .ok()
            .and_then(|slot| self.capture_names.get(slot))
    }
}

impl fmt::Debug for CompiledQuery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CompiledQuery")
            .field("grammar", &self.grammar)
            .field("capture_names", &self.capture_names)
            .field("patterns", &self.patterns)
            .finish_non_exhaustive()
    }
}

/// Renders Tree-sitter's query error on one line.
fn describe(error: &tree_sitter::QueryError) -> String {
    use tree_sitter::QueryErrorKind;

    match error.kind {
        QueryErrorKind::NodeType => format!("invalid node type '{}'", error.message),
        QueryErrorKind::Field => format!("invalid field name '{}'", error.message),
        QueryErrorKind::Capture => format!("invalid capture name '{}'", error.message),
        QueryErrorKind::Structure => "impossible pattern".to_owned(),
        QueryErrorKind::Language => "incompatible grammar".to_owned(),
        _ => "invalid syntax".to_owned(),
    }
}

fn compile_pattern(
    query: &tree_sitter::Query,
    scanned: &ScannedQuery,
    pattern_index: usize,
    options: &QueryOptions,
) -> Result<CompiledPattern, QueryError> {
    let start = query.start_byte_for_pattern(pattern_index);
    let Some(form) = scanned.form_at(start) else {
        return Ok(CompiledPattern::default());
    };

    let captures = form
        .captures()
        .iter()
        .filter_map(|name| query.capture_index_for_name(name))
        .collect();
    let predicates = form
        .predicates()
        .iter()
        .map(|raw| compile_predicate(query, form, raw, pattern_index, options))
        .collect::<Result<Vec<_>, _>>()?;

    Ok(CompiledPattern {
        captures,
        predicates,
    })
}

fn compile_predicate(
    query: &tree_sitter::Query,
    form: &ScannedForm,
    raw: &RawPredicate,
    pattern_index: usize,
    options: &QueryOptions,
) -> Result<Predicate, QueryError> {
    let operator = match PredicateOp::from_name(raw.operator()) {
        Some(operator) => operator,
        None if options.defer_unknown_predicates() => {
            PredicateOp::Unknown(raw.operator().to_owned())
        }
        None => return Err(QueryError::unknown_predicate(raw.operator(), raw.offset())),
    };

    let arguments = raw
        .args()
        .iter()
        .map(|arg| match arg {
            RawArg::Literal(text) => Ok(PredicateArg::Literal(text.clone())),
            RawArg::Capture(name) => form
                .binds(name)
                .then(|| query.capture_index_for_name(name))
                .flatten()
                .map(PredicateArg::Capture)
                .ok_or_else(|| {
                    QueryError::unknown_capture(name.as_str(), pattern_index, raw.offset())
                }),
        })
        .collect::<Result<Vec<_>, _>>()?;

    Predicate::new(operator, arguments, raw.offset())
}
