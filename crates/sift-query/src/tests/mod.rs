//! Cross-module tests for sift-query.

mod scenarios;

use crate::{
    CompiledQuery, Grammar, MatchCursor, MatchSummary, Parser, PredicateEvaluator,
    SupportedLanguage, SyntaxTree,
};

/// Parses `source` with a bundled grammar.
fn parse(language: SupportedLanguage, source: &str) -> SyntaxTree {
    let mut parser = Parser::new(&Grammar::builtin(language)).expect("parser init");
    parser.parse(source).expect("parse")
}

/// Compiles `query` for a bundled grammar.
fn compile(language: SupportedLanguage, query: &str) -> CompiledQuery {
    CompiledQuery::compile(query, &Grammar::builtin(language)).expect("compile query")
}

/// Runs `query` over `tree` and returns the text of every capture kept by
/// accepted matches, together with the match counts.
fn accepted_texts(query: &CompiledQuery, tree: &SyntaxTree) -> (Vec<String>, MatchSummary) {
    let mut cursor = MatchCursor::new();
    let evaluator = PredicateEvaluator::new(query, tree.source());
    let mut filtered = evaluator.accepted(cursor.matches(query, tree));

    let texts = filtered
        .by_ref()
        .map(|result| result.expect("evaluation"))
        .flat_map(|matched| matched.into_captures())
        .map(|capture| capture.text(tree.source()).into_owned())
        .collect();
    (texts, filtered.summary())
}
