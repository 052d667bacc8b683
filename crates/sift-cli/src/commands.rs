//! Subcommand implementations.

use std::fs;
use std::io::Write;

use camino::Utf8Path;
use sift_config::Config;
use sift_query::{
    CompiledQuery, Grammar, Match, MatchCursor, MatchSummary, Parser, PredicateEvaluator,
    SourceText, SupportedLanguage, SyntaxTree,
};
use tracing::{debug, warn};

use crate::cli::RunArgs;
use crate::errors::AppError;

/// Compiles the query, filters every match in the source, and prints the
/// surviving captures followed by the summary line.
pub(crate) fn run_query<W: Write>(
    args: &RunArgs,
    config: &Config,
    stdout: &mut W,
) -> Result<(), AppError> {
    let tree = parse_source(&args.source, args.language)?;
    let text = read_text(&args.query)?;
    let query = CompiledQuery::compile_with(&text, tree.grammar(), &config.query_options())
        .map_err(|source| AppError::Query {
            path: args.query.clone(),
            source,
        })?;

    let mut cursor = MatchCursor::with_options(&config.query_options());
    let evaluator = PredicateEvaluator::new(&query, tree.source());
    let mut summary = MatchSummary::default();

    for matched in cursor.matches(&query, &tree) {
        let verdict = evaluator.evaluate(&matched)?;
        summary.record(verdict);
        match evaluator.project(&matched, verdict) {
            Some(kept) => write_match(stdout, "", &kept, tree.source())?,
            None if args.all => write_match(stdout, "rejected ", &matched, tree.source())?,
            None => {}
        }
    }

    if cursor.exceeded_match_limit() {
        warn!(source = %args.source, "results are incomplete: match limit reached");
    }
    writeln!(stdout, "{summary}")?;
    Ok(())
}

/// Prints the S-expression of the parsed source.
pub(crate) fn print_tree<W: Write>(
    source: &Utf8Path,
    language: Option<SupportedLanguage>,
    stdout: &mut W,
) -> Result<(), AppError> {
    let tree = parse_source(source, language)?;
    if tree.has_errors() {
        warn!(%source, "syntax tree contains errors");
    }
    writeln!(stdout, "{}", tree.to_sexp())?;
    Ok(())
}

/// Prints each bundled grammar with its extensions.
pub(crate) fn list_languages<W: Write>(stdout: &mut W) -> Result<(), AppError> {
    for language in SupportedLanguage::all() {
        writeln!(stdout, "{language}\t{}", language.extensions().join(", "))?;
    }
    Ok(())
}

fn parse_source(
    path: &Utf8Path,
    language: Option<SupportedLanguage>,
) -> Result<SyntaxTree, AppError> {
    let query_error = |source| AppError::Query {
        path: path.to_path_buf(),
        source,
    };
    let grammar = match language {
        Some(selected) => Grammar::builtin(selected),
        None => Grammar::for_path(path.as_std_path()).map_err(query_error)?,
    };
    let bytes = fs::read(path).map_err(|source| AppError::ReadInput {
        path: path.to_path_buf(),
        source,
    })?;
    debug!(%path, grammar = grammar.name(), bytes = bytes.len(), "parsing source");

    let mut parser = Parser::new(&grammar).map_err(query_error)?;
    parser.parse(SourceText::new(bytes)).map_err(query_error)
}

fn read_text(path: &Utf8Path) -> Result<String, AppError> {
    fs::read_to_string(path).map_err(|source| AppError::ReadInput {
        path: path.to_path_buf(),
        source,
    })
}

fn write_match<W: Write>(
    stdout: &mut W,
    prefix: &str,
    matched: &Match<'_>,
    source: &SourceText,
) -> Result<(), AppError> {
    for capture in matched.captures() {
        let (line, column) = capture.start_position();
        writeln!(
            stdout,
            "{prefix}pattern {}: @{} {} {line}:{column} {:?}",
            matched.pattern_index(),
            capture.name(),
            capture.kind(),
            capture.text(source),
        )?;
    }
    Ok(())
}
