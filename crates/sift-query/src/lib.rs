//! Predicate-filtered Tree-sitter queries.
//!
//! This crate runs Tree-sitter queries over immutable source buffers and
//! decides, match by match, whether the textual predicates attached to each
//! pattern hold. Structural matching is left entirely to Tree-sitter;
//! predicate evaluation happens here so its semantics are explicit:
//!
//! - Predicates attach to the pattern they are written in (or directly
//!   after), never to the whole query.
//! - All predicates of a pattern must hold, and every node of a repeated
//!   capture must pass unless the operator carries the `any-` prefix.
//! - A capture that bound no node satisfies the predicates referencing it.
//! - Unknown operators fail compilation, or, when deferred, fail evaluation
//!   with an error distinct from rejection.
//!
//! # Supported operators
//!
//! `#eq?`, `#match?`, and `#any-of?`, each with the `not-` prefix, and the
//! `any-` prefix on `#eq?` and `#match?`.
//!
//! # Example
//!
//! ```
//! use sift_query::{CompiledQuery, Grammar, MatchCursor, Parser, PredicateEvaluator, SupportedLanguage};
//!
//! let grammar = Grammar::builtin(SupportedLanguage::Rust);
//! let tree = Parser::new(&grammar)?.parse("// the pond\n// a frog\n")?;
//! let query = CompiledQuery::compile(
//!     r#"((line_comment) @c (#match? @c "^// the"))"#,
//!     &grammar,
//! )?;
//!
//! let mut cursor = MatchCursor::new();
//! let evaluator = PredicateEvaluator::new(&query, tree.source());
//! let mut accepted = evaluator.accepted(cursor.matches(&query, &tree));
//! let kept = accepted.by_ref().filter_map(Result::ok).count();
//!
//! assert_eq!(kept, 1);
//! assert_eq!(accepted.summary().to_string(), "Predicates passed 1 of 2 matches");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod capture;
mod config;
mod cursor;
mod error;
mod evaluator;
mod language;
mod parser;
mod predicate;
mod query;
mod source;

pub use capture::{Capture, Match};
pub use config::QueryOptions;
pub use cursor::{MatchCursor, Matches};
pub use error::{EvaluationError, QueryError};
pub use evaluator::{FilteredMatches, MatchSummary, PredicateEvaluator, Verdict};
pub use language::{Grammar, LanguageParseError, SupportedLanguage};
pub use parser::{Parser, SyntaxTree};
pub use predicate::{Predicate, PredicateArg, PredicateOp, Quantifier};
pub use query::CompiledQuery;
pub use source::SourceText;

#[cfg(test)]
mod tests;
