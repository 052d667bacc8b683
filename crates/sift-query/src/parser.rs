//! Tree-sitter parser adapter.
//!
//! The parser is treated as a black box: it takes source bytes and a
//! grammar and returns a tree. [`SyntaxTree`] keeps the tree together with
//! the exact [`SourceText`] it was built from, so capture byte ranges always
//! index the right buffer.

use crate::error::QueryError;
use crate::language::Grammar;
use crate::source::SourceText;

/// A parsed tree and the source it was parsed from.
///
/// Tree-sitter recovers from syntax errors, so a tree may contain `ERROR`
/// or missing nodes. Queries still run over such trees.
#[derive(Debug)]
pub struct SyntaxTree {
    tree: tree_sitter::Tree,
    source: SourceText,
    grammar: Grammar,
}

impl SyntaxTree {
    /// Returns the Tree-sitter tree.
    #[must_use]
    pub const fn tree(&self) -> &tree_sitter::Tree {
        &self.tree
    }

    /// Returns the root node.
    #[must_use]
    pub fn root_node(&self) -> tree_sitter::Node<'_> {
        self.tree.root_node()
    }

    /// Returns the parsed source.
    #[must_use]
    pub const fn source(&self) -> &SourceText {
        &self.source
    }

    /// Returns the grammar used to parse the source.
    #[must_use]
    pub const fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    /// Returns the display name of the grammar.
    #[must_use]
    pub fn grammar_name(&self) -> &str {
        self.grammar.name()
    }

    /// Returns whether the tree contains error or missing nodes.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.tree.root_node().has_error()
    }

    /// Renders the tree as an S-expression of named nodes and field names.
    #[must_use]
    pub fn to_sexp(&self) -> String {
        self.tree.root_node().to_sexp()
    }
}

/// Parser bound to one grammar.
pub struct Parser {
    inner: tree_sitter::Parser,
    grammar: Grammar,
}

impl Parser {
    /// Creates a parser for `grammar`.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::ParserInit`] when Tree-sitter rejects the
    /// grammar, typically because of an ABI version mismatch.
    pub fn new(grammar: &Grammar) -> Result<Self, QueryError> {
        let mut inner = tree_sitter::Parser::new();
        inner
            .set_language(grammar.language())
            .map_err(|e| QueryError::parser_init(grammar.name(), e.to_string()))?;

        Ok(Self {
            inner,
            grammar: grammar.clone(),
        })
    }

    /// Returns the grammar this parser is bound to.
    #[must_use]
    pub const fn grammar(&self) -> &Grammar {
        &self.grammar
    }

    /// Parses `source` into a tree.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::Parse`] if Tree-sitter produces no tree, which
    /// only happens when parsing is cancelled or misconfigured.
    pub fn parse(&mut self, source: impl Into<SourceText>) -> Result<SyntaxTree, QueryError> {
        let text = source.into();
        let tree = self
            .inner
            .parse(text.as_bytes(), None)
            .ok_or_else(|| QueryError::parse(self.grammar.name()))?;

        Ok(SyntaxTree {
            tree,
            source: text,
            grammar: self.grammar.clone(),
        })
    }
}

impl std::fmt::Debug for Parser {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Parser")
            .field("grammar", &self.grammar)
            .finish_non_exhaustive()
    }
}
