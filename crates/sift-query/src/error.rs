//! Error types for query compilation, parsing, and predicate evaluation.
//!
//! Compilation and parsing failures are reported through [`QueryError`]
//! before any matching begins. Failures that can only be detected while a
//! match is being evaluated are reported through [`EvaluationError`], which
//! callers can tell apart from an ordinary predicate rejection.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while preparing a query or a syntax tree.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum QueryError {
    /// Failed to initialise the Tree-sitter parser for a grammar.
    #[error("failed to initialise parser for {grammar}: {message}")]
    ParserInit {
        /// Name of the grammar that was rejected.
        grammar: String,
        /// Description of the failure.
        message: String,
    },

    /// The parser did not produce a syntax tree.
    #[error("failed to parse source with the {grammar} grammar")]
    Parse {
        /// Name of the grammar used for parsing.
        grammar: String,
    },

    /// The file extension does not map to a built-in grammar.
    #[error("unsupported file extension: {extension}")]
    UnsupportedExtension {
        /// The extension that was not recognised.
        extension: String,
    },

    /// No grammar could be chosen for a path.
    #[error("could not determine language for path: {}", path.display())]
    UnknownLanguage {
        /// The path that could not be mapped to a grammar.
        path: PathBuf,
    },

    /// The query text is malformed.
    #[error("invalid query at byte {offset}: {message}")]
    Compile {
        /// Byte offset into the query text where the problem was found.
        offset: usize,
        /// Description of the problem.
        message: String,
    },

    /// A predicate names an operator that is not supported.
    #[error("unknown predicate operator '#{operator}' at byte {offset}")]
    UnknownPredicate {
        /// Operator name without the leading `#`.
        operator: String,
        /// Byte offset of the predicate form.
        offset: usize,
    },

    /// A predicate has the wrong shape for its operator.
    #[error("invalid arguments for '#{operator}' at byte {offset}: {message}")]
    InvalidPredicate {
        /// Operator name without the leading `#`.
        operator: String,
        /// Byte offset of the predicate form.
        offset: usize,
        /// Description of the argument problem.
        message: String,
    },

    /// A predicate references a capture that its pattern does not bind.
    #[error("predicate at byte {offset} references @{capture}, which pattern {pattern_index} does not capture")]
    UnknownCapture {
        /// Capture name without the leading `@`.
        capture: String,
        /// Index of the pattern owning the predicate.
        pattern_index: usize,
        /// Byte offset of the predicate form.
        offset: usize,
    },

    /// A `match?` literal is not a valid regular expression.
    #[error("invalid regular expression {pattern:?} at byte {offset}: {message}")]
    InvalidRegex {
        /// The rejected expression.
        pattern: String,
        /// Byte offset of the predicate form.
        offset: usize,
        /// Message from the regex compiler.
        message: String,
    },
}

impl QueryError {
    /// Creates a parser initialisation error.
    #[must_use]
    pub fn parser_init(grammar: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ParserInit {
            grammar: grammar.into(),
            message: message.into(),
        }
    }

    /// Creates a parse error.
    #[must_use]
    pub fn parse(grammar: impl Into<String>) -> Self {
        Self::Parse {
            grammar: grammar.into(),
        }
    }

    /// Creates an unsupported extension error.
    #[must_use]
    pub fn unsupported_extension(extension: impl Into<String>) -> Self {
        Self::UnsupportedExtension {
            extension: extension.into(),
        }
    }

    /// Creates an unknown language error.
    #[must_use]
    pub const fn unknown_language(path: PathBuf) -> Self {
        Self::UnknownLanguage { path }
    }

    /// Creates a query compilation error.
    #[must_use]
    pub fn compile(offset: usize, message: impl Into<String>) -> Self {
        Self::Compile {
            offset,
            message: message.into(),
        }
    }

    /// Creates an unknown predicate operator error.
    #[must_use]
    pub fn unknown_predicate(operator: impl Into<String>, offset: usize) -> Self {
        Self::UnknownPredicate {
            operator: operator.into(),
            offset,
        }
    }

    /// Creates an invalid predicate arguments error.
    #[must_use]
    pub fn invalid_predicate(
        operator: impl Into<String>,
        offset: usize,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidPredicate {
            operator: operator.into(),
            offset,
            message: message.into(),
        }
    }

    /// Creates an unknown capture reference error.
    #[must_use]
    pub fn unknown_capture(capture: impl Into<String>, pattern_index: usize, offset: usize) -> Self {
        Self::UnknownCapture {
            capture: capture.into(),
            pattern_index,
            offset,
        }
    }

    /// Creates an invalid regular expression error.
    #[must_use]
    pub fn invalid_regex(
        pattern: impl Into<String>,
        offset: usize,
        message: impl Into<String>,
    ) -> Self {
        Self::InvalidRegex {
            pattern: pattern.into(),
            offset,
            message: message.into(),
        }
    }
}

/// Errors raised while evaluating predicates against a match.
///
/// An evaluation error is never a rejection: the evaluator could not decide
/// whether the match should be kept.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EvaluationError {
    /// The pattern carries a predicate whose operator was deferred at
    /// compile time and cannot be evaluated.
    #[error("cannot evaluate unknown predicate operator '#{operator}' in pattern {pattern_index}")]
    UnknownPredicateOperator {
        /// Operator name without the leading `#`.
        operator: String,
        /// Index of the pattern owning the predicate.
        pattern_index: usize,
    },
}

impl EvaluationError {
    /// Creates an unknown operator error.
    #[must_use]
    pub fn unknown_operator(operator: impl Into<String>, pattern_index: usize) -> Self {
        Self::UnknownPredicateOperator {
            operator: operator.into(),
            pattern_index,
        }
    }
}
