//! Grammar handles.
//!
//! There is no process-wide grammar registry. Callers build a [`Grammar`]
//! (from one of the [`SupportedLanguage`] built-ins, or from a
//! `tree_sitter::Language` they loaded themselves) and pass it explicitly to
//! [`Parser::new`](crate::Parser::new) and
//! [`CompiledQuery::compile`](crate::CompiledQuery::compile).

use std::fmt;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;

use thiserror::Error;

use crate::error::QueryError;

/// Grammars bundled with the crate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SupportedLanguage {
    /// Rust (`.rs`).
    #[default]
    Rust,
    /// Python (`.py`, `.pyi`).
    Python,
    /// TypeScript, parsed with the TSX-capable grammar.
    TypeScript,
}

impl SupportedLanguage {
    /// Maps a file extension to a built-in grammar.
    #[must_use]
    pub fn from_extension(ext: &str) -> Option<Self> {
        let lowered = ext.to_ascii_lowercase();
        Self::all()
            .iter()
            .copied()
            .find(|language| language.extensions().contains(&lowered.as_str()))
    }

    /// Maps a path to a built-in grammar using its extension.
    #[must_use]
    pub fn from_path(path: &Path) -> Option<Self> {
        path.extension()
            .and_then(|ext| ext.to_str())
            .and_then(Self::from_extension)
    }

    /// File extensions recognised for this language, without the dot.
    #[must_use]
    pub const fn extensions(self) -> &'static [&'static str] {
        match self {
            Self::Rust => &["rs"],
            Self::Python => &["py", "pyi"],
            Self::TypeScript => &["ts", "tsx", "mts", "cts"],
        }
    }

    /// Returns the Tree-sitter grammar for this language.
    #[must_use]
    pub fn tree_sitter_language(self) -> tree_sitter::Language {
        match self {
            Self::Rust => tree_sitter_rust::LANGUAGE.into(),
            Self::Python => tree_sitter_python::LANGUAGE.into(),
            Self::TypeScript => tree_sitter_typescript::LANGUAGE_TSX.into(),
        }
    }

    /// Lower-case identifier used in configuration and output.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Rust => "rust",
            Self::Python => "python",
            Self::TypeScript => "typescript",
        }
    }

    /// Returns every built-in language.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::Rust, Self::Python, Self::TypeScript]
    }
}

impl fmt::Display for SupportedLanguage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error raised when a language identifier is not recognised.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("unsupported language: '{0}'")]
pub struct LanguageParseError(String);

impl LanguageParseError {
    /// Returns the input that failed to parse.
    #[must_use]
    pub fn input(&self) -> &str {
        &self.0
    }
}

impl FromStr for SupportedLanguage {
    type Err = LanguageParseError;

    fn from_str(input: &str) -> Result<Self, Self::Err> {
        let lowered = input.trim().to_ascii_lowercase();
        Self::all()
            .iter()
            .copied()
            .find(|language| {
                language.as_str() == lowered || language.extensions().first() == Some(&lowered.as_str())
            })
            .ok_or(LanguageParseError(lowered))
    }
}

/// An explicit handle on a Tree-sitter grammar.
///
/// Cloning is cheap. The handle carries a display name so errors and logs
/// can say which grammar was involved.
#[derive(Clone)]
pub struct Grammar {
    name: Arc<str>,
    language: tree_sitter::Language,
}

impl Grammar {
    /// Wraps an externally loaded Tree-sitter language.
    #[must_use]
    pub fn new(name: &str, language: tree_sitter::Language) -> Self {
        Self {
            name: Arc::from(name),
            language,
        }
    }

    /// Returns the handle for a bundled grammar.
    #[must_use]
    pub fn builtin(language: SupportedLanguage) -> Self {
        Self::new(language.as_str(), language.tree_sitter_language())
    }

    /// Chooses a bundled grammar from a file path.
    ///
    /// # Errors
    ///
    /// Returns [`QueryError::UnknownLanguage`] when the path has no
    /// extension and [`QueryError::UnsupportedExtension`] when the extension
    /// is not recognised.
    pub fn for_path(path: &Path) -> Result<Self, QueryError> {
        let ext = path
            .extension()
            .and_then(|ext| ext.to_str())
            .ok_or_else(|| QueryError::unknown_language(path.to_path_buf()))?;
        SupportedLanguage::from_path(path)
            .map(Self::builtin)
            .ok_or_else(|| QueryError::unsupported_extension(ext))
    }

    /// Returns the grammar's display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the underlying Tree-sitter language.
    #[must_use]
    pub const fn language(&self) -> &tree_sitter::Language {
        &self.language
    }
}

impl From<SupportedLanguage> for Grammar {
    fn from(language: SupportedLanguage) -> Self {
        Self::builtin(language)
    }
}

impl fmt::Debug for Grammar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Grammar")
            .field("name", &self.name)
            .finish_non_exhaustive()
    }
}
