//! The subquery extractor.
//!
//! Works on the original, untrimmed statement text rather than the lexer's
//! clause map. A single left-to-right scan with a parenthesis-offset stack
//! reproduces recursive discovery: inner pairs close before their enclosing
//! pair, so nested subqueries surface as independent, earlier entries.

use tracing::trace;

use crate::error::ParseError;
use crate::keywords::Keyword;
use crate::parts::{SubQueryValues, TableUse};
use crate::scan::{leading_identifier, ClauseScanner, KeywordMatch};

/// Finds every parenthesized SELECT substring and every table referenced in
/// a FROM/JOIN position, at any nesting depth.
pub struct SubqueryExtractor<'a> {
    input: &'a str,
}

impl<'a> SubqueryExtractor<'a> {
    /// Creates an extractor over the original statement text.
    #[must_use]
    pub const fn new(input: &'a str) -> Self {
        Self { input }
    }

    /// Runs both scans. Re-running over the same text yields identical
    /// results; nothing is cached between calls.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::UnbalancedParens` when the text closes a
    /// parenthesis it never opened, or leaves one open.
    pub fn extract(&self) -> Result<SubQueryValues, ParseError> {
        Ok(SubQueryValues {
            queries: self.find_subqueries()?,
            tables_used: self.inventory_tables(),
        })
    }

    /// The depth-stack scan for SELECT-initiated parenthesized substrings.
    fn find_subqueries(&self) -> Result<Vec<String>, ParseError> {
        let mut stack: Vec<usize> = Vec::new();
        let mut queries: Vec<String> = Vec::new();
        let mut quote: Option<char> = None;
        let mut in_comment = false;
        let mut prev = '\0';

        for (i, c) in self.input.char_indices() {
            if in_comment {
                if c == '\n' {
                    in_comment = false;
                }
            } else if let Some(q) = quote {
                if c == q {
                    quote = None;
                }
            } else {
                match c {
                    '\'' | '"' | '`' => quote = Some(c),
                    '-' if prev == '-' => in_comment = true,
                    '(' => stack.push(i),
                    ')' => {
                        let open = stack.pop().ok_or(ParseError::UnbalancedParens)?;
                        let inner = &self.input[open + 1..i];
                        if starts_with_select(inner) {
                            let text = inner.trim().to_string();
                            if !queries.contains(&text) {
                                trace!(subquery = %text, "discovered subquery");
                                queries.push(text);
                            }
                        }
                    }
                    _ => {}
                }
            }
            prev = c;
        }

        if stack.is_empty() {
            Ok(queries)
        } else {
            Err(ParseError::UnbalancedParens)
        }
    }

    /// The FROM/JOIN table inventory, deduplicated by (table, alias).
    fn inventory_tables(&self) -> Vec<TableUse> {
        let scanner = ClauseScanner::new(self.input);
        let mut tables: Vec<TableUse> = Vec::new();
        let mut pos = 0;

        while let Some(m) = next_from_or_join(&scanner, pos) {
            pos = m.end;
            let rest = self.input[m.end..].trim_start();
            if rest.starts_with('(') {
                // Derived table or subquery; its own FROM is found separately.
                continue;
            }
            let Some(name) = leading_identifier(rest) else {
                continue;
            };
            let after = strip_as(&rest[name.len()..]);
            let alias = leading_identifier(after)
                .filter(|a| !a.contains('.') && !Keyword::is_keyword(a))
                .map(ToString::to_string);
            let entry = TableUse {
                table_name: name.to_string(),
                alias,
            };
            if !tables.contains(&entry) {
                tables.push(entry);
            }
        }
        tables
    }
}

/// The earliest FROM or JOIN keyword at or after `from`, at any depth.
fn next_from_or_join(scanner: &ClauseScanner<'_>, from: usize) -> Option<KeywordMatch> {
    let f = scanner.find_keyword_any_depth("FROM", from);
    let j = scanner.find_keyword_any_depth("JOIN", from);
    match (f, j) {
        (Some(a), Some(b)) => Some(if a.start < b.start { a } else { b }),
        (m, None) | (None, m) => m,
    }
}

/// True when the first significant token of a parenthesized body is SELECT.
fn starts_with_select(inner: &str) -> bool {
    ClauseScanner::new(inner)
        .leading_ident()
        .is_some_and(|tok| Keyword::from_str(tok) == Some(Keyword::Select))
}

/// Strips a leading AS keyword from an alias position.
fn strip_as(after: &str) -> &str {
    let t = after.trim_start();
    let end = t
        .find(|c: char| !c.is_alphanumeric() && c != '_')
        .unwrap_or(t.len());
    if Keyword::from_str(&t[..end]) == Some(Keyword::As) {
        &t[end..]
    } else {
        t
    }
}
