//! The statement lexer: raw text in, `QueryParts` out.

use tracing::debug;

use super::params;
use crate::error::ParseError;
use crate::keywords::Keyword;
use crate::parts::{QueryParts, StatementKind};
use crate::scan::{leading_identifier, ClauseScanner};

/// Keywords that terminate the clause currently being collected.
const CLAUSE_TERMINATORS: &[&str] = &[
    "FROM", "WHERE", "GROUP BY", "HAVING", "ORDER BY", "LIMIT", "OFFSET", "VALUES", "SET", "JOIN",
    "INNER", "LEFT", "RIGHT", "FULL", "CROSS", "ON", "UNION",
];

/// Decomposes a single statement into named clause substrings.
///
/// The lexer owns no state beyond the input it was constructed with; every
/// call to [`parse`](Self::parse) recomputes from scratch.
pub struct StatementLexer<'a> {
    input: &'a str,
}

impl<'a> StatementLexer<'a> {
    /// Creates a lexer for the given statement text.
    #[must_use]
    pub const fn new(input: &'a str) -> Self {
        Self { input }
    }

    /// Decomposes the statement into [`QueryParts`].
    ///
    /// # Errors
    ///
    /// Fails closed on multi-statement input, unbalanced parentheses, a
    /// missing subject table, a malformed placeholder, or a non-numeric
    /// LIMIT; no partial result is ever produced.
    pub fn parse(&self) -> Result<QueryParts, ParseError> {
        let text = self.strip_terminator()?;
        ClauseScanner::new(text).check_balanced()?;

        let head = ClauseScanner::new(text)
            .leading_ident()
            .ok_or(ParseError::EmptyStatement)?;
        debug!(statement = head, "classifying statement");

        match Keyword::from_str(head) {
            Some(Keyword::Select) => parse_select(text),
            Some(Keyword::Insert) => parse_insert(text),
            Some(Keyword::Update) => parse_update(text),
            Some(Keyword::Delete) => parse_delete(text),
            Some(Keyword::Create) => parse_create(text),
            _ => Err(ParseError::UnsupportedStatement(head.to_string())),
        }
    }

    /// Strips one trailing semicolon; a top-level semicolon followed by any
    /// further content is a multi-statement error.
    fn strip_terminator(&self) -> Result<&'a str, ParseError> {
        let text = self.input.trim();
        if text.is_empty() {
            return Err(ParseError::EmptyStatement);
        }
        if let Some(pos) = ClauseScanner::new(text).find_char(';', 0) {
            if !text[pos + 1..].trim().is_empty() {
                return Err(ParseError::MultipleStatements);
            }
            let stripped = text[..pos].trim_end();
            if stripped.is_empty() {
                return Err(ParseError::EmptyStatement);
            }
            return Ok(stripped);
        }
        Ok(text)
    }
}

fn parse_select(text: &str) -> Result<QueryParts, ParseError> {
    let scanner = ClauseScanner::new(text);
    let head = scanner
        .find_keyword("SELECT", 0)
        .ok_or(ParseError::EmptyStatement)?;
    let from = scanner
        .find_keyword("FROM", head.end)
        .ok_or(ParseError::MissingFrom)?;

    let mut list = &text[head.end..from.start];
    list = strip_leading_keyword(list, Keyword::Distinct);
    list = strip_leading_keyword(list, Keyword::All);
    let selector: Vec<String> = ClauseScanner::new(list)
        .split_top_level(',')
        .into_iter()
        .filter(|item| !item.is_empty())
        .map(ToString::to_string)
        .collect();

    let table = parse_table(&text[from.end..clause_end(&scanner, from.end, text.len())])?;

    Ok(QueryParts {
        kind: StatementKind::Select,
        selector: Some(selector),
        table,
        where_clauses: parse_where(&scanner, text)?,
        values: None,
        set: None,
        order_by: parse_order_by(&scanner, text),
        limit: parse_limit(&scanner, text)?,
        on: parse_on(&scanner, text)?,
    })
}

fn parse_insert(text: &str) -> Result<QueryParts, ParseError> {
    let scanner = ClauseScanner::new(text);
    let into = scanner
        .find_keyword("INTO", 0)
        .ok_or(ParseError::MissingFrom)?;
    let table = parse_table(&text[into.end..clause_end(&scanner, into.end, text.len())])?;

    let values = match scanner.find_keyword("VALUES", 0) {
        Some(m) => parse_values_tuple(text[m.end..].trim())?,
        None => None,
    };

    Ok(QueryParts {
        kind: StatementKind::Insert,
        selector: None,
        table,
        where_clauses: None,
        values,
        set: None,
        order_by: None,
        limit: None,
        on: None,
    })
}

fn parse_update(text: &str) -> Result<QueryParts, ParseError> {
    let scanner = ClauseScanner::new(text);
    let head = scanner
        .find_keyword("UPDATE", 0)
        .ok_or(ParseError::EmptyStatement)?;
    let set_m = scanner.find_keyword("SET", head.end);

    let table_end = set_m.map_or(text.len(), |m| m.start);
    let table = parse_table(&text[head.end..table_end])?;

    let set = match set_m {
        Some(m) => {
            let seg = &text[m.end..clause_end(&scanner, m.end, text.len())];
            let mut assignments = Vec::new();
            for assignment in ClauseScanner::new(seg).split_top_level(',') {
                if assignment.is_empty() {
                    continue;
                }
                params::validate_condition(assignment)?;
                assignments.push(assignment.to_string());
            }
            non_empty(assignments)
        }
        None => None,
    };

    Ok(QueryParts {
        kind: StatementKind::Update,
        selector: None,
        table,
        where_clauses: parse_where(&scanner, text)?,
        values: None,
        set,
        order_by: None,
        limit: parse_limit(&scanner, text)?,
        on: None,
    })
}

fn parse_delete(text: &str) -> Result<QueryParts, ParseError> {
    let scanner = ClauseScanner::new(text);
    let from = scanner
        .find_keyword("FROM", 0)
        .ok_or(ParseError::MissingFrom)?;
    let table = parse_table(&text[from.end..clause_end(&scanner, from.end, text.len())])?;

    Ok(QueryParts {
        kind: StatementKind::Delete,
        selector: None,
        table,
        where_clauses: parse_where(&scanner, text)?,
        values: None,
        set: None,
        order_by: None,
        limit: parse_limit(&scanner, text)?,
        on: None,
    })
}

fn parse_create(text: &str) -> Result<QueryParts, ParseError> {
    let scanner = ClauseScanner::new(text);
    let table_kw = scanner
        .find_keyword("TABLE", 0)
        .ok_or_else(|| ParseError::UnsupportedStatement(String::from("CREATE")))?;

    let mut rest = &text[table_kw.end..];
    rest = strip_leading_keyword(rest, Keyword::If);
    rest = strip_leading_keyword(rest, Keyword::Not);
    rest = strip_leading_keyword(rest, Keyword::Exists);
    let table = leading_identifier(rest)
        .ok_or(ParseError::MissingFrom)?
        .to_string();

    Ok(QueryParts {
        kind: StatementKind::CreateTable,
        selector: None,
        table,
        where_clauses: None,
        values: None,
        set: None,
        order_by: None,
        limit: None,
        on: None,
    })
}

/// End of the clause starting at `from`: the next top-level clause keyword
/// or end of string.
fn clause_end(scanner: &ClauseScanner<'_>, from: usize, len: usize) -> usize {
    scanner
        .find_any(CLAUSE_TERMINATORS, from)
        .map_or(len, |(m, _)| m.start)
}

/// The subject table of a FROM/INTO/UPDATE segment: the first identifier of
/// the first comma-separated target.
fn parse_table(segment: &str) -> Result<String, ParseError> {
    let first = ClauseScanner::new(segment)
        .split_top_level(',')
        .into_iter()
        .next()
        .unwrap_or("");
    leading_identifier(first)
        .map(ToString::to_string)
        .ok_or(ParseError::MissingFrom)
}

fn parse_where(scanner: &ClauseScanner<'_>, text: &str) -> Result<Option<Vec<String>>, ParseError> {
    let Some(m) = scanner.find_keyword("WHERE", 0) else {
        return Ok(None);
    };
    let seg = &text[m.end..clause_end(scanner, m.end, text.len())];
    Ok(non_empty(split_conditions(seg)?))
}

/// Collects every top-level JOIN ... ON condition.
fn parse_on(scanner: &ClauseScanner<'_>, text: &str) -> Result<Option<Vec<String>>, ParseError> {
    let mut conditions = Vec::new();
    let mut pos = 0;
    while let Some(m) = scanner.find_keyword("ON", pos) {
        let end = clause_end(scanner, m.end, text.len());
        conditions.extend(split_conditions(&text[m.end..end])?);
        pos = end.max(m.end);
    }
    Ok(non_empty(conditions))
}

fn parse_order_by(scanner: &ClauseScanner<'_>, text: &str) -> Option<String> {
    let m = scanner.find_keyword("ORDER BY", 0)?;
    let seg = text[m.end..clause_end(scanner, m.end, text.len())].trim();
    if seg.is_empty() {
        None
    } else {
        Some(seg.to_string())
    }
}

fn parse_limit(scanner: &ClauseScanner<'_>, text: &str) -> Result<Option<u64>, ParseError> {
    let Some(m) = scanner.find_keyword("LIMIT", 0) else {
        return Ok(None);
    };
    let seg = text[m.end..clause_end(scanner, m.end, text.len())].trim();
    seg.parse::<u64>()
        .map(Some)
        .map_err(|_| ParseError::InvalidLimit(seg.to_string()))
}

/// Splits a condition segment on top-level AND and validates each piece
/// against the named-parameter contract.
fn split_conditions(segment: &str) -> Result<Vec<String>, ParseError> {
    let mut out = Vec::new();
    for condition in ClauseScanner::new(segment).split_on_keyword("AND") {
        if condition.is_empty() {
            continue;
        }
        params::validate_condition(condition)?;
        out.push(condition.to_string());
    }
    Ok(out)
}

/// Parses the first parenthesized VALUES tuple into its entries.
fn parse_values_tuple(segment: &str) -> Result<Option<Vec<String>>, ParseError> {
    if !segment.starts_with('(') {
        return Ok(None);
    }
    let close = ClauseScanner::new(segment)
        .find_char(')', 0)
        .ok_or(ParseError::UnbalancedParens)?;
    let mut entries = Vec::new();
    for entry in ClauseScanner::new(&segment[1..close]).split_top_level(',') {
        if entry.is_empty() {
            continue;
        }
        params::validate_placeholder(entry)?;
        entries.push(entry.to_string());
    }
    Ok(non_empty(entries))
}

/// Strips a leading keyword token (e.g. DISTINCT) from a clause fragment.
fn strip_leading_keyword(text: &str, keyword: Keyword) -> &str {
    let t = text.trim_start();
    let end = t
        .find(|c: char| !c.is_alphanumeric() && c != '_')
        .unwrap_or(t.len());
    if Keyword::from_str(&t[..end]) == Some(keyword) {
        &t[end..]
    } else {
        text
    }
}

fn non_empty(items: Vec<String>) -> Option<Vec<String>> {
    if items.is_empty() {
        None
    } else {
        Some(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(sql: &str) -> Result<QueryParts, ParseError> {
        StatementLexer::new(sql).parse()
    }

    #[test]
    fn test_select_star() {
        let parts = parse("SELECT * FROM users").unwrap();
        assert_eq!(parts.kind, StatementKind::Select);
        assert_eq!(parts.selector, Some(vec![String::from("*")]));
        assert_eq!(parts.table, "users");
        assert_eq!(parts.where_clauses, None);
    }

    #[test]
    fn test_select_full_clause_set() {
        let parts = parse(
            "SELECT name, email FROM users WHERE status = @status ORDER BY created_at LIMIT 10",
        )
        .unwrap();
        assert_eq!(
            parts.selector,
            Some(vec![String::from("name"), String::from("email")])
        );
        assert_eq!(
            parts.where_clauses,
            Some(vec![String::from("status = @status")])
        );
        assert_eq!(parts.order_by, Some(String::from("created_at")));
        assert_eq!(parts.limit, Some(10));
    }

    #[test]
    fn test_lowercase_parses_identically() {
        let lower = parse("select * from users where id = @id order by created_at limit 5").unwrap();
        let upper = parse("SELECT * FROM users WHERE id = @id ORDER BY created_at LIMIT 5").unwrap();
        assert_eq!(lower.table, upper.table);
        assert_eq!(lower.where_clauses, upper.where_clauses);
        assert_eq!(lower.order_by, upper.order_by);
        assert_eq!(lower.limit, upper.limit);
    }

    #[test]
    fn test_trailing_semicolon_is_stripped() {
        let parts = parse("SELECT * FROM users;").unwrap();
        assert_eq!(parts.table, "users");
    }

    #[test]
    fn test_multiple_statements_rejected() {
        assert_eq!(
            parse("SELECT * FROM users; SELECT * FROM orders"),
            Err(ParseError::MultipleStatements)
        );
    }

    #[test]
    fn test_semicolon_inside_string_is_not_a_boundary() {
        let parts = parse("SELECT * FROM users WHERE note = ';'").unwrap();
        assert_eq!(parts.table, "users");
    }

    #[test]
    fn test_missing_from_is_fatal() {
        assert_eq!(parse("SELECT 1 + 1"), Err(ParseError::MissingFrom));
        assert_eq!(parse("DELETE WHERE id = @id"), Err(ParseError::MissingFrom));
    }

    #[test]
    fn test_where_split_on_top_level_and() {
        let parts = parse("SELECT * FROM users WHERE age > 21 AND status = @status").unwrap();
        assert_eq!(
            parts.where_clauses,
            Some(vec![
                String::from("age > 21"),
                String::from("status = @status"),
            ])
        );
    }

    #[test]
    fn test_and_inside_subquery_does_not_split() {
        let parts = parse(
            "SELECT * FROM users WHERE id IN (SELECT user_id FROM orders WHERE a = 1 AND b = 2)",
        )
        .unwrap();
        assert_eq!(parts.where_clauses.unwrap().len(), 1);
    }

    #[test]
    fn test_parameter_mismatch_is_fatal() {
        assert_eq!(
            parse("SELECT * FROM users WHERE name = @email"),
            Err(ParseError::ParameterMismatch {
                column: String::from("name"),
                parameter: String::from("email"),
            })
        );
    }

    #[test]
    fn test_bare_identifier_parameter_is_fatal() {
        assert_eq!(
            parse("SELECT * FROM users WHERE id = id"),
            Err(ParseError::InvalidParameter(String::from("id = id")))
        );
    }

    #[test]
    fn test_non_numeric_limit_is_fatal() {
        assert_eq!(
            parse("SELECT * FROM users LIMIT ten"),
            Err(ParseError::InvalidLimit(String::from("ten")))
        );
    }

    #[test]
    fn test_join_on_conditions() {
        let parts = parse(
            "SELECT u.id, o.total FROM users u JOIN orders o ON u.id = o.user_id WHERE o.total > 0",
        )
        .unwrap();
        assert_eq!(parts.table, "users");
        assert_eq!(parts.on, Some(vec![String::from("u.id = o.user_id")]));
        assert_eq!(parts.where_clauses, Some(vec![String::from("o.total > 0")]));
    }

    #[test]
    fn test_insert_values() {
        let parts = parse("INSERT INTO users (name, email) VALUES (@name, @email)").unwrap();
        assert_eq!(parts.kind, StatementKind::Insert);
        assert_eq!(parts.table, "users");
        assert_eq!(
            parts.values,
            Some(vec![String::from("@name"), String::from("@email")])
        );
        assert_eq!(parts.selector, None);
    }

    #[test]
    fn test_insert_bare_value_is_fatal() {
        assert_eq!(
            parse("INSERT INTO users (name) VALUES (name)"),
            Err(ParseError::InvalidParameter(String::from("name")))
        );
    }

    #[test]
    fn test_update_set_and_where() {
        let parts = parse("UPDATE users SET name = @name, email = @email WHERE id = @id").unwrap();
        assert_eq!(parts.kind, StatementKind::Update);
        assert_eq!(parts.table, "users");
        assert_eq!(
            parts.set,
            Some(vec![
                String::from("name = @name"),
                String::from("email = @email"),
            ])
        );
        assert_eq!(parts.where_clauses, Some(vec![String::from("id = @id")]));
    }

    #[test]
    fn test_delete() {
        let parts = parse("DELETE FROM sessions WHERE token = @token").unwrap();
        assert_eq!(parts.kind, StatementKind::Delete);
        assert_eq!(parts.table, "sessions");
    }

    #[test]
    fn test_create_table() {
        let parts = parse("CREATE TABLE IF NOT EXISTS users (id INTEGER PRIMARY KEY)").unwrap();
        assert_eq!(parts.kind, StatementKind::CreateTable);
        assert_eq!(parts.table, "users");
    }

    #[test]
    fn test_distinct_is_excluded_from_selector() {
        let parts = parse("SELECT DISTINCT city FROM users").unwrap();
        assert_eq!(parts.selector, Some(vec![String::from("city")]));
    }

    #[test]
    fn test_unbalanced_parens_rejected() {
        assert_eq!(
            parse("SELECT * FROM users WHERE id IN (1, 2"),
            Err(ParseError::UnbalancedParens)
        );
    }

    #[test]
    fn test_unsupported_statement() {
        assert_eq!(
            parse("EXPLAIN SELECT 1"),
            Err(ParseError::UnsupportedStatement(String::from("EXPLAIN")))
        );
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(parse("   "), Err(ParseError::EmptyStatement));
    }

    #[test]
    fn test_subquery_keywords_do_not_shift_boundaries() {
        let parts = parse(
            "SELECT id, (SELECT COUNT(*) FROM orders WHERE orders.user_id = users.id) FROM users",
        )
        .unwrap();
        assert_eq!(parts.table, "users");
        assert_eq!(parts.selector.unwrap().len(), 2);
        // The inner WHERE is nested, so no top-level where clause exists.
        assert_eq!(parts.where_clauses, None);
    }
}
