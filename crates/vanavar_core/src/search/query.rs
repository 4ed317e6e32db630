//! Translation of user terms into FTS5 match expressions.
//!
//! # Responsibility
//! - Turn raw user terms into one opaque predicate the repository can run.
//! - Neutralize FTS5 syntax carried by user text.
//!
//! # Invariants
//! - A term ending in `$` matches whole tokens only; any other term matches
//!   token prefixes.
//! - Every term becomes a quoted FTS5 string with `"` doubled, so user text is
//!   never parsed as query syntax.
//! - Terms combine with implicit AND.
//! - No user term is rejected. A term left empty by stripping becomes an
//!   empty phrase: alone it matches nothing, next to other terms FTS5 drops
//!   it and only the remaining terms constrain the result.

use std::fmt::{Display, Formatter};

const EXACT_SUFFIX: char = '$';

/// How one term is matched against indexed tokens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TermMatch {
    /// Term must be a prefix of some token.
    Prefix,
    /// Term must equal a whole token.
    Exact,
}

/// Opaque predicate produced by [`translate`].
///
/// Only the repository reads the expression; callers build it from terms and
/// pass it through unchanged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchQuery {
    expression: String,
    term_count: usize,
}

impl MatchQuery {
    /// Splits free text on whitespace and translates every piece.
    pub fn parse(text: &str) -> Self {
        translate(text.split_whitespace())
    }

    /// Returns `true` when the query was built from zero terms.
    ///
    /// Such a query matches nothing.
    pub fn is_empty(&self) -> bool {
        self.term_count == 0
    }

    /// Number of terms combined in this query.
    pub fn term_count(&self) -> usize {
        self.term_count
    }

    pub(crate) fn expression(&self) -> &str {
        &self.expression
    }
}

impl Display for MatchQuery {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.expression)
    }
}

/// Builds a conjunctive predicate from user terms.
pub fn translate<I, S>(terms: I) -> MatchQuery
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut parts = Vec::new();
    for term in terms {
        parts.push(translate_term(term.as_ref()));
    }

    MatchQuery {
        term_count: parts.len(),
        expression: parts.join(" "),
    }
}

/// Classifies one raw term and returns it with the `$` marker removed.
pub fn classify_term(raw: &str) -> (TermMatch, &str) {
    if raw.ends_with(EXACT_SUFFIX) {
        (TermMatch::Exact, raw.trim_end_matches(EXACT_SUFFIX))
    } else {
        (TermMatch::Prefix, raw)
    }
}

fn translate_term(raw: &str) -> String {
    let (mode, text) = classify_term(raw);
    let quoted = quote_fts_string(text);
    match mode {
        TermMatch::Exact => quoted,
        TermMatch::Prefix => format!("{quoted}*"),
    }
}

fn quote_fts_string(raw: &str) -> String {
    let escaped = raw.replace('"', "\"\"");
    format!("\"{escaped}\"")
}
