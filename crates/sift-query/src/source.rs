//! Immutable source buffers.
//!
//! A [`SourceText`] is the text a tree was parsed from. Predicate evaluation
//! slices it by the byte ranges of captured nodes, so the buffer must stay
//! byte-for-byte identical to what the parser saw.

use std::borrow::Cow;
use std::fmt;
use std::ops::Range;
use std::sync::Arc;

/// Immutable bytes being queried.
///
/// Clones share one allocation, so a buffer can be handed to several
/// evaluators or threads without copying the text.
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct SourceText {
    bytes: Arc<[u8]>,
}

impl SourceText {
    /// Creates a buffer holding `bytes`.
    #[must_use]
    pub fn new(bytes: impl Into<Vec<u8>>) -> Self {
        Self {
            bytes: Arc::from(bytes.into()),
        }
    }

    /// Returns the whole buffer.
    #[must_use]
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Returns the buffer length in bytes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Returns whether the buffer is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Returns the bytes in `range`, or `None` when the range falls outside
    /// the buffer.
    #[must_use]
    pub fn slice(&self, range: Range<usize>) -> Option<&[u8]> {
        self.bytes.get(range)
    }

    /// Returns the text in `range`, replacing invalid UTF-8 sequences.
    ///
    /// Out-of-bounds ranges yield an empty string.
    #[must_use]
    pub fn text(&self, range: Range<usize>) -> Cow<'_, str> {
        self.slice(range)
            .map(String::from_utf8_lossy)
            .unwrap_or_default()
    }
}

impl fmt::Debug for SourceText {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SourceText")
            .field("len", &self.len())
            .finish_non_exhaustive()
    }
}

impl From<&str> for SourceText {
    fn from(text: &str) -> Self {
        Self::new(text)
    }
}

impl From<String> for SourceText {
    fn from(text: String) -> Self {
        Self::new(text)
    }
}

impl From<&[u8]> for SourceText {
    fn from(bytes: &[u8]) -> Self {
        Self::new(bytes)
    }
}

impl From<Vec<u8>> for SourceText {
    fn from(bytes: Vec<u8>) -> Self {
        Self::new(bytes)
    }
}
