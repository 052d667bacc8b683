//! Query text scanning.
//!
//! Tree-sitter's own query compiler folds `#eq?` and `#match?` predicates
//! into its match cursor and silently drops matches that fail them. To keep
//! predicate evaluation in our hands, the scanner splits the query text into
//! top-level forms, lifts every predicate form out of the text, and blanks it
//! with spaces so that byte offsets in the remaining structural text still
//! line up with the original query.
//!
//! A predicate belongs to the form it is nested in, or, when written at the
//! top level, to the form immediately before it.

use crate::error::QueryError;

/// Characters that always end a bare word.
const DELIMITERS: &[char] = &['(', ')', '[', ']', '"', ';', '@', '#'];

/// Characters that may follow a top-level form as a quantifier.
const QUANTIFIERS: &[char] = &['*', '+', '?'];

#[derive(Debug, Clone, PartialEq, Eq)]
enum TokenKind {
    Open,
    Close,
    OpenBracket,
    CloseBracket,
    Str(String),
    Capture(String),
    Directive(String),
    Word(String),
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct Token {
    kind: TokenKind,
    start: usize,
    end: usize,
}

/// An argument of a predicate as written in the query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum RawArg {
    Capture(String),
    Literal(String),
}

/// A predicate form lifted out of the query text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct RawPredicate {
    operator: String,
    args: Vec<RawArg>,
    offset: usize,
}

impl RawPredicate {
    /// Operator name without the leading `#`.
    pub(crate) fn operator(&self) -> &str {
        &self.operator
    }

    pub(crate) fn args(&self) -> &[RawArg] {
        &self.args
    }

    /// Byte offset of the predicate's opening parenthesis.
    pub(crate) const fn offset(&self) -> usize {
        self.offset
    }
}

/// One top-level pattern of the query.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub(crate) struct ScannedForm {
    start: usize,
    captures: Vec<String>,
    predicates: Vec<RawPredicate>,
}

impl ScannedForm {
    #[cfg(test)]
    pub(crate) const fn start(&self) -> usize {
        self.start
    }

    /// Capture names bound by the structural part of the form, first
    /// occurrence order.
    pub(crate) fn captures(&self) -> &[String] {
        &self.captures
    }

    pub(crate) fn binds(&self, name: &str) -> bool {
        self.captures.iter().any(|capture| capture == name)
    }

    pub(crate) fn predicates(&self) -> &[RawPredicate] {
        &self.predicates
    }

    fn bind(&mut self, name: &str) {
        if !self.binds(name) {
            self.captures.push(name.to_owned());
        }
    }
}

/// The result of scanning a query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ScannedQuery {
    structural: String,
    forms: Vec<ScannedForm>,
}

impl ScannedQuery {
    /// Query text with every predicate form replaced by spaces.
    pub(crate) fn structural(&self) -> &str {
        &self.structural
    }

    #[cfg(test)]
    pub(crate) fn forms(&self) -> &[ScannedForm] {
        &self.forms
    }

    /// Returns the last form starting at or before `offset`.
    pub(crate) fn form_at(&self, offset: usize) -> Option<&ScannedForm> {
        self.forms.iter().rev().find(|form| form.start <= offset)
    }
}

/// Scans `source` into forms and predicates.
pub(crate) fn scan(source: &str) -> Result<ScannedQuery, QueryError> {
    let tokens = tokenize(source)?;
    let mut forms: Vec<ScannedForm> = Vec::new();
    let mut blanked: Vec<(usize, usize)> = Vec::new();
    let mut pos = 0;

    while let Some(token) = tokens.get(pos) {
        match &token.kind {
            TokenKind::Open if is_predicate_start(&tokens, pos) => {
                let (predicate, next, end) = parse_predicate(&tokens, pos)?;
                let Some(owner) = forms.last_mut() else {
                    return Err(QueryError::compile(
                        token.start,
                        "predicate does not follow a pattern",
                    ));
                };
                owner.predicates.push(predicate);
                blanked.push((token.start, end));
                pos = next;
            }
            TokenKind::Capture(_) | TokenKind::Directive(_) => {
                return Err(QueryError::compile(
                    token.start,
                    "expected a pattern before this token",
                ));
            }
            TokenKind::Close | TokenKind::CloseBracket => {
                return Err(QueryError::compile(token.start, "unbalanced closing delimiter"));
            }
            TokenKind::Open | TokenKind::OpenBracket | TokenKind::Str(_) | TokenKind::Word(_) => {
                let mut form = ScannedForm {
                    start: token.start,
                    ..ScannedForm::default()
                };
                pos = parse_form(&tokens, pos, &mut form, &mut blanked)?;
                forms.push(form);
            }
        }
    }

    Ok(ScannedQuery {
        structural: blank_ranges(source, &blanked),
        forms,
    })
}

fn is_predicate_start(tokens: &[Token], pos: usize) -> bool {
    matches!(
        tokens.get(pos.saturating_add(1)).map(|token| &token.kind),
        Some(TokenKind::Directive(_))
    )
}

/// Consumes one top-level form starting at `pos` and any trailing
/// quantifiers and captures. Returns the position after the form.
fn parse_form(
    tokens: &[Token],
    start: usize,
    form: &mut ScannedForm,
    blanked: &mut Vec<(usize, usize)>,
) -> Result<usize, QueryError> {
    let mut pos = start;
    let mut depth: usize = 0;

    while let Some(token) = tokens.get(pos) {
        match &token.kind {
            TokenKind::Open if is_predicate_start(tokens, pos) => {
                let (predicate, next, end) = parse_predicate(tokens, pos)?;
                form.predicates.push(predicate);
                blanked.push((token.start, end));
                pos = next;
                continue;
            }
            TokenKind::Open | TokenKind::OpenBracket => depth = depth.saturating_add(1),
            TokenKind::Close | TokenKind::CloseBracket => {
                depth = depth.checked_sub(1).ok_or_else(|| {
                    QueryError::compile(token.start, "unbalanced closing delimiter")
                })?;
            }
            TokenKind::Capture(name) => form.bind(name),
            TokenKind::Directive(_) => {
                return Err(QueryError::compile(
                    token.start,
                    "predicate names must be wrapped in parentheses",
                ));
            }
            TokenKind::Str(_) | TokenKind::Word(_) => {}
        }
        pos = pos.saturating_add(1);
        if depth == 0 {
            break;
        }
    }

    if depth > 0 {
        return Err(QueryError::compile(form.start, "unclosed pattern"));
    }

    while let Some(token) = tokens.get(pos) {
        match &token.kind {
            TokenKind::Capture(name) => form.bind(name),
            TokenKind::Word(word) if word.chars().all(|c| QUANTIFIERS.contains(&c)) => {}
            _ => break,
        }
        pos = pos.saturating_add(1);
    }

    Ok(pos)
}

/// Parses `(#name? args...)` starting at the opening parenthesis.
///
/// Returns the predicate, the position after the closing parenthesis, and
/// the byte offset just past it.
fn parse_predicate(
    tokens: &[Token],
    open: usize,
) -> Result<(RawPredicate, usize, usize), QueryError> {
    let offset = tokens.get(open).map_or(0, |token| token.start);
    let Some(TokenKind::Directive(operator)) = tokens
        .get(open.saturating_add(1))
        .map(|token| &token.kind)
    else {
        return Err(QueryError::compile(offset, "expected a predicate name"));
    };

    let mut args = Vec::new();
    let mut pos = open.saturating_add(2);
    loop {
        let Some(token) = tokens.get(pos) else {
            return Err(QueryError::compile(offset, "unclosed predicate"));
        };
        match &token.kind {
            TokenKind::Close => {
                let predicate = RawPredicate {
                    operator: operator.clone(),
                    args,
                    offset,
                };
                return Ok((predicate, pos.saturating_add(1), token.end));
            }
            TokenKind::Capture(name) => args.push(RawArg::Capture(name.clone())),
            TokenKind::Str(text) | TokenKind::Word(text) => args.push(RawArg::Literal(text.clone())),
            TokenKind::Open
            | TokenKind::OpenBracket
            | TokenKind::CloseBracket
            | TokenKind::Directive(_) => {
                return Err(QueryError::invalid_predicate(
                    operator.as_str(),
                    offset,
                    "arguments must be captures or strings",
                ));
            }
        }
        pos = pos.saturating_add(1);
    }
}

fn tokenize(source: &str) -> Result<Vec<Token>, QueryError> {
    let mut tokens = Vec::new();
    let mut chars = source.char_indices().peekable();

    while let Some((start, ch)) = chars.next() {
        let kind = match ch {
            c if c.is_whitespace() => continue,
            ';' => {
                while chars.next_if(|(_, c)| *c != '\n').is_some() {}
                continue;
            }
            '(' => TokenKind::Open,
            ')' => TokenKind::Close,
            '[' => TokenKind::OpenBracket,
            ']' => TokenKind::CloseBracket,
            '"' => TokenKind::Str(read_string(&mut chars, start)?),
            '@' => TokenKind::Capture(read_identifier(&mut chars)),
            '#' => TokenKind::Directive(read_identifier(&mut chars)),
            first => {
                let mut word = String::from(first);
                while let Some((_, c)) =
                    chars.next_if(|(_, c)| !c.is_whitespace() && !DELIMITERS.contains(c))
                {
                    word.push(c);
                }
                TokenKind::Word(word)
            }
        };

        let end = chars.peek().map_or(source.len(), |(offset, _)| *offset);
        if let TokenKind::Capture(name) | TokenKind::Directive(name) = &kind
            && name.is_empty()
        {
            return Err(QueryError::compile(start, format!("expected a name after '{ch}'")));
        }
        tokens.push(Token { kind, start, end });
    }

    Ok(tokens)
}

fn read_identifier(chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>) -> String {
    let mut name = String::new();
    while let Some((_, c)) =
        chars.next_if(|(_, c)| c.is_alphanumeric() || matches!(*c, '_' | '-' | '.' | '?' | '!'))
    {
        name.push(c);
    }
    name
}

fn read_string(
    chars: &mut std::iter::Peekable<std::str::CharIndices<'_>>,
    start: usize,
) -> Result<String, QueryError> {
    let mut text = String::new();
    loop {
        match chars.next() {
            None => return Err(QueryError::compile(start, "unterminated string")),
            Some((_, '"')) => return Ok(text),
            Some((_, '\\')) => match chars.next() {
                None => return Err(QueryError::compile(start, "unterminated string")),
                Some((_, 'n')) => text.push('\n'),
                Some((_, 'r')) => text.push('\r'),
                Some((_, 't')) => text.push('\t'),
                Some((_, '0')) => text.push('\0'),
                Some((_, other)) => text.push(other),
            },
            Some((_, c)) => text.push(c),
        }
    }
}

/// Replaces each byte inside `ranges` with a space, keeping newlines so
/// Tree-sitter's row and column numbers still match the original text.
fn blank_ranges(source: &str, ranges: &[(usize, usize)]) -> String {
    let mut out = String::with_capacity(source.len());
    for (offset, ch) in source.char_indices() {
        let hidden = ranges
            .iter()
            .any(|(start, end)| (*start..*end).contains(&offset));
        if !hidden || ch == '\n' {
            out.push(ch);
        } else {
            out.extend(std::iter::repeat_n(' ', ch.len_utf8()));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn nested_predicate_belongs_to_its_form() {
        let scanned = scan("(expression (comment) @foo (#match? @foo \"^// the\"))").expect("scan");

        let [form] = scanned.forms() else {
            panic!("expected one form, got {:?}", scanned.forms());
        };
        assert_eq!(form.captures(), ["foo"]);
        let [predicate] = form.predicates() else {
            panic!("expected one predicate");
        };
        assert_eq!(predicate.operator(), "match?");
        assert_eq!(
            predicate.args(),
            [
                RawArg::Capture("foo".to_owned()),
                RawArg::Literal("^// the".to_owned())
            ]
        );
    }

    #[test]
    fn top_level_predicates_attach_to_preceding_form() {
        let query = "(a) @x\n(#eq? @x \"1\")\n(b) @y\n(#eq? @y \"2\")\n(#eq? @y \"3\")";
        let scanned = scan(query).expect("scan");

        let counts: Vec<_> = scanned
            .forms()
            .iter()
            .map(|form| form.predicates().len())
            .collect();
        assert_eq!(counts, [1, 2]);
    }

    #[test]
    fn predicates_are_blanked_without_moving_offsets() {
        let query = "((a) @x (#eq? @x \"é\"))\n(b)";
        let scanned = scan(query).expect("scan");

        assert_eq!(scanned.structural().len(), query.len());
        assert!(!scanned.structural().contains('#'));
        assert_eq!(scanned.forms().last().map(ScannedForm::start), query.find("(b)"));
    }

    #[test]
    fn trailing_quantifiers_and_captures_stay_with_form() {
        let scanned = scan("(comment)+ @doc @all (x)").expect("scan");

        let names: Vec<_> = scanned.forms().iter().map(ScannedForm::captures).collect();
        assert_eq!(names, [&["doc".to_owned(), "all".to_owned()][..], &[][..]]);
    }

    #[test]
    fn comments_and_escapes_are_understood() {
        let query = "; leading comment (#eq? @x)\n((a) @x (#eq? @x \"q\\\"uote\"))";
        let scanned = scan(query).expect("scan");

        let literal = scanned
            .forms()
            .first()
            .and_then(|form| form.predicates().first())
            .and_then(|predicate| predicate.args().get(1))
            .cloned();
        assert_eq!(literal, Some(RawArg::Literal("q\"uote".to_owned())));
    }

    #[test]
    fn bare_word_arguments_are_literals() {
        let scanned = scan("((a) @x (#any-of? @x foo bar))").expect("scan");
        let args = scanned
            .forms()
            .first()
            .and_then(|form| form.predicates().first())
            .map(|predicate| predicate.args().len());
        assert_eq!(args, Some(3));
    }

    #[rstest]
    #[case("(#eq? @x \"a\")")]
    #[case("(a")]
    #[case("(a))")]
    #[case("(a) (#eq? @x \"a\"")]
    #[case("(a) \"unterminated")]
    #[case("@x")]
    #[case("(a) (#eq? @x (b))")]
    fn malformed_queries_are_rejected(#[case] query: &str) {
        assert!(scan(query).is_err(), "{query} should not scan");
    }
}
