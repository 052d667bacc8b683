//! Typed predicates attached to query patterns.
//!
//! Operator names are resolved once, when the query is compiled, into the
//! closed [`PredicateOp`] enumeration. Arguments are checked against the
//! operator's expected shape at the same time and regular expressions are
//! compiled up front, so evaluation never compares operator strings or
//! builds a regex.

use std::fmt;

use regex::bytes::Regex;

use crate::error::QueryError;

/// How a predicate treats a capture bound to several nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Quantifier {
    /// Every bound node must satisfy the test.
    #[default]
    All,
    /// At least one bound node must satisfy the test (`#any-…?`).
    Any,
}

/// A predicate operator.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PredicateOp {
    /// `#eq?` and its `not-` and `any-` variants.
    Equal {
        /// Whether each comparison is inverted.
        negated: bool,
        /// Repeated-capture policy.
        quantifier: Quantifier,
    },
    /// `#match?` and its `not-` and `any-` variants.
    MatchRegex {
        /// Whether each regex test is inverted.
        negated: bool,
        /// Repeated-capture policy.
        quantifier: Quantifier,
    },
    /// `#any-of?` and `#not-any-of?`.
    AnyOf {
        /// Whether membership is inverted.
        negated: bool,
    },
    /// An operator this crate does not understand, kept only when the query
    /// was compiled with deferred validation. Evaluating it is an error.
    Unknown(String),
}

impl PredicateOp {
    /// Resolves an operator name written without the leading `#`.
    ///
    /// Returns `None` for names that are not text predicates.
    ///
    /// ```text
    /// "match?"          -> MatchRegex { negated: false, quantifier: All }
    /// "any-not-eq?"     -> Equal { negated: true, quantifier: Any }
    /// "not-any-of?"     -> AnyOf { negated: true }
    /// ```
    #[must_use]
    pub fn from_name(name: &str) -> Option<Self> {
        let base = name.strip_suffix('?')?;
        let (quantifier, rest) = match base.strip_prefix("any-") {
            Some(rest) if rest != "of" => (Quantifier::Any, rest),
            _ => (Quantifier::All, base),
        };
        let (negated, operator) = rest
            .strip_prefix("not-")
            .map_or((false, rest), |operator| (true, operator));

        match (operator, quantifier) {
            ("eq", _) => Some(Self::Equal {
                negated,
                quantifier,
            }),
            ("match", _) => Some(Self::MatchRegex {
                negated,
                quantifier,
            }),
            ("any-of", Quantifier::All) => Some(Self::AnyOf { negated }),
            _ => None,
        }
    }

    /// Operator name as written in a query, without the leading `#`.
    #[must_use]
    pub fn name(&self) -> String {
        let (negated, quantifier, base) = match self {
            Self::Equal {
                negated,
                quantifier,
            } => (*negated, *quantifier, "eq"),
            Self::MatchRegex {
                negated,
                quantifier,
            } => (*negated, *quantifier, "match"),
            Self::AnyOf { negated } => (*negated, Quantifier::All, "any-of"),
            Self::Unknown(name) => return name.clone(),
        };
        let any = if quantifier == Quantifier::Any { "any-" } else { "" };
        let not = if negated { "not-" } else { "" };
        format!("{any}{not}{base}?")
    }

    /// Returns whether evaluation of this operator was deferred.
    #[must_use]
    pub const fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown(_))
    }
}

impl fmt::Display for PredicateOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.name())
    }
}

/// A predicate argument.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PredicateArg {
    /// A reference to a capture, by its index in the query's capture table.
    Capture(u32),
    /// A literal string.
    Literal(String),
}

/// The evaluable form of a predicate.
#[derive(Debug, Clone)]
pub(crate) enum Check {
    EqLiteral {
        capture: u32,
        literal: Box<[u8]>,
        negated: bool,
        quantifier: Quantifier,
    },
    EqCapture {
        left: u32,
        right: u32,
        negated: bool,
        quantifier: Quantifier,
    },
    Regex {
        capture: u32,
        regex: Regex,
        negated: bool,
        quantifier: Quantifier,
    },
    AnyOf {
        capture: u32,
        values: Vec<Box<[u8]>>,
        negated: bool,
    },
    Deferred,
}

/// A predicate attached to one pattern of a compiled query.
#[derive(Debug, Clone)]
pub struct Predicate {
    operator: PredicateOp,
    arguments: Vec<PredicateArg>,
    offset: usize,
    check: Check,
}

impl Predicate {
    /// Validates `arguments` for `operator` and builds the predicate.
    ///
    /// `offset` is the byte offset of the predicate in the query text and is
    /// only used for error reporting.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::InvalidPredicate`] when the arguments do not fit
    /// the operator, and [`QueryError::InvalidRegex`] when a `match?`
    /// literal does not compile.
    pub fn new(
        operator: PredicateOp,
        arguments: Vec<PredicateArg>,
        offset: usize,
    ) -> Result<Self, QueryError> {
        let check = build_check(&operator, &arguments, offset)?;
        Ok(Self {
            operator,
            arguments,
            offset,
            check,
        })
    }

    /// Returns the operator.
    #[must_use]
    pub const fn operator(&self) -> &PredicateOp {
        &self.operator
    }

    /// Returns the arguments in declaration order.
    #[must_use]
    pub fn arguments(&self) -> &[PredicateArg] {
        &self.arguments
    }

    /// Byte offset of the predicate in the query text.
    #[must_use]
    pub const fn offset(&self) -> usize {
        self.offset
    }

    /// Capture indices referenced by the arguments.
    pub fn captures(&self) -> impl Iterator<Item = u32> + '_ {
        self.arguments.iter().filter_map(|argument| match argument {
            PredicateArg::Capture(index) => Some(*index),
            PredicateArg::Literal(_) => None,
        })
    }

    pub(crate) const fn check(&self) -> &Check {
        &self.check
    }
}

impl fmt::Display for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}", self.operator)?;
        for argument in &self.arguments {
            match argument {
                PredicateArg::Capture(index) => write!(f, " @{index}")?,
                PredicateArg::Literal(text) => write!(f, " {text:?}")?,
            }
        }
        f.write_str(")")
    }
}

fn build_check(
    operator: &PredicateOp,
    arguments: &[PredicateArg],
    offset: usize,
) -> Result<Check, QueryError> {
    let invalid = |message: &str| QueryError::invalid_predicate(operator.name(), offset, message);

    match operator {
        PredicateOp::Unknown(_) => Ok(Check::Deferred),
        PredicateOp::Equal {
            negated,
            quantifier,
        } => match arguments {
            [PredicateArg::Capture(left), PredicateArg::Capture(right)] => Ok(Check::EqCapture {
                left: *left,
                right: *right,
                negated: *negated,
                quantifier: *quantifier,
            }),
            [PredicateArg::Capture(capture), PredicateArg::Literal(literal)] => {
                Ok(Check::EqLiteral {
                    capture: *capture,
                    literal: literal.as_bytes().into(),
                    negated: *negated,
                    quantifier: *quantifier,
                })
            }
            _ => Err(invalid(
                "expected a capture followed by a capture or a string",
            )),
        },
        PredicateOp::MatchRegex {
            negated,
            quantifier,
        } => match arguments {
            [PredicateArg::Capture(capture), PredicateArg::Literal(pattern)] => {
                let regex = Regex::new(pattern)
                    .map_err(|e| QueryError::invalid_regex(pattern.as_str(), offset, e.to_string()))?;
                Ok(Check::Regex {
                    capture: *capture,
                    regex,
                    negated: *negated,
                    quantifier: *quantifier,
                })
            }
            _ => Err(invalid("expected a capture followed by a regular expression")),
        },
        PredicateOp::AnyOf { negated } => match arguments {
            [PredicateArg::Capture(capture), values @ ..] if !values.is_empty() => {
                let literals = values
                    .iter()
                    .map(|value| match value {
                        PredicateArg::Literal(text) => Ok(text.as_bytes().into()),
                        PredicateArg::Capture(_) => Err(invalid("candidate values must be strings")),
                    })
                    .collect::<Result<Vec<Box<[u8]>>, _>>()?;
                Ok(Check::AnyOf {
                    capture: *capture,
                    values: literals,
                    negated: *negated,
                })
            }
            _ => Err(invalid("expected a capture followed by one or more strings")),
        },
    }
}
