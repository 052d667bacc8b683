//! Compilation and enumeration options.

/// Options controlling query compilation and match enumeration.
///
/// The defaults validate predicate operators eagerly and leave Tree-sitter's
/// in-progress match limit unset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct QueryOptions {
    /// Maximum number of in-progress matches the cursor may track.
    match_limit: Option<u32>,
    /// Keep unknown predicate operators and fail at evaluation instead.
    defer_unknown_predicates: bool,
}

impl QueryOptions {
    /// Creates options with explicit values.
    #[must_use]
    pub const fn new(match_limit: Option<u32>, defer_unknown_predicates: bool) -> Self {
        Self {
            match_limit,
            defer_unknown_predicates,
        }
    }

    /// Sets the cursor match limit.
    #[must_use]
    pub const fn with_match_limit(mut self, limit: u32) -> Self {
        self.match_limit = Some(limit);
        self
    }

    /// Enables or disables deferred validation of predicate operators.
    #[must_use]
    pub const fn with_deferred_unknown_predicates(mut self, defer: bool) -> Self {
        self.defer_unknown_predicates = defer;
        self
    }

    /// Returns the cursor match limit.
    #[must_use]
    pub const fn match_limit(&self) -> Option<u32> {
        self.match_limit
    }

    /// Returns whether unknown operators are deferred to evaluation.
    #[must_use]
    pub const fn defer_unknown_predicates(&self) -> bool {
        self.defer_unknown_predicates
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_eager_and_unlimited() {
        let options = QueryOptions::default();
        assert_eq!(options.match_limit(), None);
        assert!(!options.defer_unknown_predicates());
    }

    #[test]
    fn builders_override_fields() {
        let options = QueryOptions::default()
            .with_match_limit(64)
            .with_deferred_unknown_predicates(true);
        assert_eq!(options, QueryOptions::new(Some(64), true));
    }
}
