//! Match and capture types.
//!
//! Both are transient views into a [`SyntaxTree`](crate::SyntaxTree): they
//! borrow its nodes and are dropped once the caller has consumed or rejected
//! them.

use std::borrow::Cow;
use std::ops::Range;
use std::sync::Arc;

use crate::source::SourceText;

/// A node bound to a capture name within one match.
#[derive(Debug, Clone)]
pub struct Capture<'tree> {
    index: u32,
    name: Arc<str>,
    node: tree_sitter::Node<'tree>,
}

impl<'tree> Capture<'tree> {
    /// Creates a capture of `node` under the capture-table entry `index`.
    #[must_use]
    pub const fn new(index: u32, name: Arc<str>, node: tree_sitter::Node<'tree>) -> Self {
        Self { index, name, node }
    }

    /// Index of the capture in the query's capture table.
    #[must_use]
    pub const fn index(&self) -> u32 {
        self.index
    }

    /// Capture name without the leading `@`.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// The captured node.
    #[must_use]
    pub const fn node(&self) -> tree_sitter::Node<'tree> {
        self.node
    }

    /// Grammar type of the captured node.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        self.node.kind()
    }

    /// Byte range of the captured node.
    #[must_use]
    pub fn byte_range(&self) -> Range<usize> {
        self.node.byte_range()
    }

    /// Raw bytes spanned by the node, if the range lies within `source`.
    #[must_use]
    pub fn bytes<'s>(&self, source: &'s SourceText) -> Option<&'s [u8]> {
        source.slice(self.byte_range())
    }

    /// Text spanned by the node.
    #[must_use]
    pub fn text<'s>(&self, source: &'s SourceText) -> Cow<'s, str> {
        source.text(self.byte_range())
    }

    /// One-based line and column of the node's first byte.
    #[must_use]
    pub fn start_position(&self) -> (u32, u32) {
        point_to_one_based(self.node.start_position())
    }
}

/// One structural occurrence of a pattern.
#[derive(Debug, Clone)]
pub struct Match<'tree> {
    pattern_index: usize,
    captures: Vec<Capture<'tree>>,
}

impl<'tree> Match<'tree> {
    /// Creates a match of pattern `pattern_index` holding `captures` in
    /// binding order.
    #[must_use]
    pub const fn new(pattern_index: usize, captures: Vec<Capture<'tree>>) -> Self {
        Self {
            pattern_index,
            captures,
        }
    }

    /// Index of the matched pattern.
    #[must_use]
    pub const fn pattern_index(&self) -> usize {
        self.pattern_index
    }

    /// Captures in the order they were bound.
    #[must_use]
    pub fn captures(&self) -> &[Capture<'tree>] {
        &self.captures
    }

    /// Nodes bound to capture `index`. Zero, one, or many.
    pub fn nodes_for(&self, index: u32) -> impl Iterator<Item = tree_sitter::Node<'tree>> + '_ {
        self.captures
            .iter()
            .filter(move |capture| capture.index == index)
            .map(Capture::node)
    }

    /// The first capture called `name`.
    #[must_use]
    pub fn capture(&self, name: &str) -> Option<&Capture<'tree>> {
        self.captures.iter().find(|capture| capture.name() == name)
    }

    /// Consumes the match and returns its captures.
    #[must_use]
    pub fn into_captures(self) -> Vec<Capture<'tree>> {
        self.captures
    }
}

/// Converts a Tree-sitter position (0-based) to one-based display coordinates.
fn point_to_one_based(pos: tree_sitter::Point) -> (u32, u32) {
    // Line/column numbers will realistically never exceed u32::MAX.
    let line = u32::try_from(pos.row.saturating_add(1)).unwrap_or(u32::MAX);
    let column = u32::try_from(pos.column.saturating_add(1)).unwrap_or(u32::MAX);
    (line, column)
}
