//! Dependency extraction from SQL statement text
//!
//! Finds the tables a statement reads or writes with just enough lexical
//! analysis to be reliable: word tokens outside string literals, with table
//! candidates taken from the position right after `FROM`, `JOIN`, `INTO`,
//! or `UPDATE`. Candidates are filtered against a caller-supplied set of
//! known entity names, which discards CTE aliases, temp tables, and other
//! false positives.

use std::collections::BTreeSet;

use tracing::debug;

/// Extracts the set of dependency identifiers a statement references.
///
/// # Example
///
/// ```
/// use statement_cache::dependencies::DependencyExtractor;
///
/// let extractor = DependencyExtractor::new(["Posts", "Users"], "db_", false);
/// let deps = extractor.extract("SELECT * FROM [Posts] p JOIN [Users] u ON p.UserId = u.Id");
/// assert!(deps.contains("db_Posts"));
/// assert!(deps.contains("db_Users"));
/// ```
#[derive(Debug, Clone)]
pub struct DependencyExtractor {
    known_entities: BTreeSet<String>,
    prefix: String,
    case_insensitive: bool,
}

impl DependencyExtractor {
    /// Creates a new extractor.
    ///
    /// `known_entities` is the whitelist of real table/entity names,
    /// typically derived from schema metadata. `prefix` namespaces every
    /// emitted dependency identifier. With `case_insensitive` set,
    /// candidates match known names ignoring ASCII case; the emitted
    /// identifier always uses the known entity's own spelling.
    pub fn new(
        known_entities: impl IntoIterator<Item = impl Into<String>>,
        prefix: impl Into<String>,
        case_insensitive: bool,
    ) -> Self {
        Self {
            known_entities: known_entities.into_iter().map(Into::into).collect(),
            prefix: prefix.into(),
            case_insensitive,
        }
    }

    /// Returns the deterministic, duplicate-free set of dependency
    /// identifiers referenced as table targets in `text`.
    pub fn extract(&self, text: &str) -> BTreeSet<String> {
        let mut dependencies = BTreeSet::new();
        let mut expect_table = false;

        for token in word_tokens(text) {
            if expect_table {
                expect_table = false;
                if let Some(name) = table_segment(&token) {
                    if let Some(matched) = self.match_known(name) {
                        dependencies.insert(format!("{}{}", self.prefix, matched));
                    }
                }
                continue;
            }
            expect_table = is_target_keyword(&token);
        }

        debug!(?dependencies, "extracted statement dependencies");
        dependencies
    }

    fn match_known(&self, candidate: &str) -> Option<&str> {
        if self.case_insensitive {
            self.known_entities
                .iter()
                .find(|known| known.eq_ignore_ascii_case(candidate))
                .map(String::as_str)
        } else {
            self.known_entities.get(candidate).map(String::as_str)
        }
    }
}

/// Returns `true` if the statement mutates data.
///
/// A statement is treated as mutating when any of its sub-statements
/// starts with `INSERT`, `UPDATE`, or `DELETE`; sub-statements begin at
/// the start of the text, after any `;`, or on a new line, so single-line
/// batches like `SET NOCOUNT ON; UPDATE ...` are recognized. Statements
/// that are ambiguous between DDL and DML are treated conservatively as
/// mutating, so any table they reference gets invalidated.
pub fn is_mutating_statement(text: &str) -> bool {
    text.split(';').flat_map(str::lines).any(|part| {
        let trimmed = part.trim_start();
        ["INSERT", "UPDATE", "DELETE"]
            .iter()
            .any(|keyword| starts_with_keyword(trimmed, keyword))
    })
}

fn starts_with_keyword(text: &str, keyword: &str) -> bool {
    let Some(head) = text.get(..keyword.len()) else {
        return false;
    };
    if !head.eq_ignore_ascii_case(keyword) {
        return false;
    }
    // must be a whole word
    text[keyword.len()..]
        .chars()
        .next()
        .is_none_or(|c| !c.is_alphanumeric() && c != '_')
}

fn is_target_keyword(token: &str) -> bool {
    token.eq_ignore_ascii_case("FROM")
        || token.eq_ignore_ascii_case("JOIN")
        || token.eq_ignore_ascii_case("INTO")
        || token.eq_ignore_ascii_case("UPDATE")
}

/// Splits statement text into word tokens, discarding string literals.
///
/// Quoted literals (single or double quotes, with doubled-quote escapes)
/// act as token separators and their contents are never scanned, so a
/// literal containing `'[Products]'` cannot be mistaken for a table
/// reference. Bracketed and backticked identifier delimiters and `.`
/// qualifiers stay inside their token.
fn word_tokens(text: &str) -> Vec<String> {
    let mut tokens = Vec::new();
    let mut current = String::new();
    let mut chars = text.chars().peekable();

    while let Some(c) = chars.next() {
        match c {
            '\'' | '"' => {
                flush(&mut current, &mut tokens);
                while let Some(inner) = chars.next() {
                    if inner == c {
                        if chars.peek() == Some(&c) {
                            chars.next();
                        } else {
                            break;
                        }
                    }
                }
            }
            ',' | '(' | ')' | ';' | '=' | '<' | '>' => flush(&mut current, &mut tokens),
            c if c.is_whitespace() => flush(&mut current, &mut tokens),
            _ => current.push(c),
        }
    }
    flush(&mut current, &mut tokens);
    tokens
}

fn flush(current: &mut String, tokens: &mut Vec<String>) {
    if !current.is_empty() {
        tokens.push(std::mem::take(current));
    }
}

/// Reduces a candidate token to its table name: the rightmost `.`-segment
/// with any `[...]` or backtick delimiters removed.
fn table_segment(token: &str) -> Option<&str> {
    let segment = token.rsplit('.').next()?;
    let trimmed = segment.trim_matches(|c| matches!(c, '[' | ']' | '`'));
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}
