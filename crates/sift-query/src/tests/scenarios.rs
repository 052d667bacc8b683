//! End-to-end filtering scenarios over small inputs.

use std::thread;

use rstest::{fixture, rstest};

use super::{accepted_texts, compile, parse};
use crate::{
    EvaluationError, Grammar, MatchCursor, PredicateEvaluator, QueryError, QueryOptions,
    SupportedLanguage, SyntaxTree,
};

const HAIKU: &str = "\n// the ancient pond\n// a frog jumps in\n// the sound of water\n";

#[fixture]
fn haiku() -> SyntaxTree {
    parse(SupportedLanguage::Rust, HAIKU)
}

#[rstest]
#[case::nested_predicate(
    r#"((line_comment) @foo (#match? @foo "^// the"))"#,
    &["// the ancient pond", "// the sound of water"]
)]
#[case::top_level_predicate(
    "(line_comment) @foo\n(#match? @foo \"^// the\")",
    &["// the ancient pond", "// the sound of water"]
)]
#[case::anchored_at_end(
    r#"((line_comment) @foo (#match? @foo "water$"))"#,
    &["// the sound of water"]
)]
#[case::both_predicates(
    "(line_comment) @foo\n(#match? @foo \"^// the\")\n(#match? @foo \"water$\")",
    &["// the sound of water"]
)]
fn haiku_comments_are_filtered(haiku: SyntaxTree, #[case] text: &str, #[case] expected: &[&str]) {
    let query = compile(SupportedLanguage::Rust, text);
    let (texts, summary) = accepted_texts(&query, &haiku);

    assert_eq!(texts, expected);
    assert_eq!(summary.total, 3);
    assert_eq!(summary.accepted, expected.len());
}

#[rstest]
fn summary_reports_counts(haiku: SyntaxTree) {
    let query = compile(
        SupportedLanguage::Rust,
        r#"((line_comment) @foo (#match? @foo "^// the"))"#,
    );
    let (_, summary) = accepted_texts(&query, &haiku);

    assert_eq!(summary.to_string(), "Predicates passed 2 of 3 matches");
    assert_eq!(summary.rejected(), 1);
}

#[rstest]
fn predicates_only_filter_their_own_pattern(haiku: SyntaxTree) {
    let query = compile(
        SupportedLanguage::Rust,
        "(line_comment) @all\n((line_comment) @water (#match? @water \"water$\"))",
    );
    let (texts, summary) = accepted_texts(&query, &haiku);

    assert_eq!(summary.total, 6);
    assert_eq!(summary.accepted, 4);
    assert_eq!(
        texts.iter().filter(|text| text.ends_with("water")).count(),
        2
    );
}

#[test]
fn captures_compared_across_nodes() {
    let tree = parse(
        SupportedLanguage::Rust,
        "fn main() { let x = x; let y = z; let Y = y; }",
    );
    let query = compile(
        SupportedLanguage::Rust,
        "(let_declaration pattern: (identifier) @left value: (identifier) @right (#eq? @left @right))",
    );

    let (texts, summary) = accepted_texts(&query, &tree);
    assert_eq!(texts, ["x", "x"]);
    assert_eq!(summary.total, 3);
}

#[test]
fn any_of_and_negations_filter_python_names() {
    let tree = parse(
        SupportedLanguage::Python,
        "self.a = 1\ncls.b = 2\nother.c = 3\n",
    );
    let query = compile(
        SupportedLanguage::Python,
        r#"
        ((attribute object: (identifier) @obj) @attr
          (#any-of? @obj "self" "cls")
          (#not-match? @attr "\\.b$"))
        "#,
    );

    let (texts, summary) = accepted_texts(&query, &tree);
    assert_eq!(texts, ["self.a", "self"]);
    assert_eq!(summary.total, 3);
}

#[test]
fn typescript_literals_compare_with_eq() {
    let tree = parse(
        SupportedLanguage::TypeScript,
        "const answer = 42;\nconst other = 7;\n",
    );
    let query = compile(
        SupportedLanguage::TypeScript,
        "(variable_declarator name: (identifier) @name (#eq? @name \"answer\"))",
    );

    let (texts, summary) = accepted_texts(&query, &tree);
    assert_eq!(texts, ["answer"]);
    assert_eq!(summary.total, 2);
}

#[rstest]
fn deferred_operator_fails_evaluation(haiku: SyntaxTree) {
    let options = QueryOptions::default().with_deferred_unknown_predicates(true);
    let query = crate::CompiledQuery::compile_with(
        "((line_comment) @foo (#match? @foo \"^$\") (#shiny? @foo))",
        &Grammar::builtin(SupportedLanguage::Rust),
        &options,
    )
    .expect("deferred compile");

    let mut cursor = MatchCursor::new();
    let evaluator = PredicateEvaluator::new(&query, haiku.source());
    let results: Vec<_> = evaluator.accepted(cursor.matches(&query, &haiku)).collect();

    assert_eq!(results.len(), 3);
    assert!(results.iter().all(|result| matches!(
        result,
        Err(EvaluationError::UnknownPredicateOperator { operator, pattern_index: 0 })
            if operator == "shiny?"
    )));
}

#[test]
fn unknown_operator_is_rejected_before_matching() {
    let error = crate::CompiledQuery::compile(
        "((line_comment) @foo (#shiny? @foo))",
        &Grammar::builtin(SupportedLanguage::Rust),
    )
    .expect_err("eager validation");
    assert!(matches!(error, QueryError::UnknownPredicate { .. }));
}

#[rstest]
fn compiled_query_is_shared_across_threads(haiku: SyntaxTree) {
    let query = compile(
        SupportedLanguage::Rust,
        r#"((line_comment) @foo (#match? @foo "^// the"))"#,
    );
    let source = haiku.source().clone();

    let counts: Vec<usize> = thread::scope(|scope| {
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let text = source.clone();
                let shared = &query;
                scope.spawn(move || {
                    let tree = parse(SupportedLanguage::Rust, &String::from_utf8_lossy(text.as_bytes()));
                    let mut cursor = MatchCursor::new();
                    let evaluator = PredicateEvaluator::new(shared, tree.source());
                    evaluator
                        .accepted(cursor.matches(shared, &tree))
                        .filter_map(Result::ok)
                        .count()
                })
            })
            .collect();
        handles
            .into_iter()
            .map(|handle| handle.join().expect("worker"))
            .collect()
    });

    assert_eq!(counts, [2, 2, 2, 2]);
}
