//! The select-list parser.
//!
//! Each top-level-comma-separated item is classified once into a fixed
//! shape ([`SelectItemKind`]); everything downstream (column inventory,
//! expression inventory) reads off that classification.

use crate::error::ParseError;
use crate::keywords::Keyword;
use crate::parts::{SelectItemKind, SelectValues};
use crate::scan::ClauseScanner;

/// Operator characters that make an item an arithmetic expression when they
/// appear at parenthesis-depth zero.
const ARITHMETIC_OPS: [char; 6] = ['+', '-', '*', '/', '%', '|'];

/// Parses a SELECT-list substring into classified items.
pub struct SelectListParser<'a> {
    input: &'a str,
}

impl<'a> SelectListParser<'a> {
    /// Creates a parser for the given select-list text (the substring
    /// between SELECT and FROM).
    #[must_use]
    pub const fn new(input: &'a str) -> Self {
        Self { input }
    }

    /// Parses every select item.
    ///
    /// # Errors
    ///
    /// Returns `ParseError::UnbalancedParens` when the list nests wrongly.
    pub fn items(&self) -> Result<Vec<SelectValues>, ParseError> {
        ClauseScanner::new(self.input).check_balanced()?;
        Ok(ClauseScanner::new(self.input)
            .split_top_level(',')
            .into_iter()
            .filter(|item| !item.is_empty())
            .map(classify_item)
            .collect())
    }

    /// All base column references across all items, in item order.
    ///
    /// Duplicates are kept: a column referenced both bare and inside an
    /// expression appears once per mention.
    ///
    /// # Errors
    ///
    /// Propagates [`Self::items`] errors.
    pub fn parse_columns(&self) -> Result<Vec<String>, ParseError> {
        Ok(self
            .items()?
            .into_iter()
            .flat_map(|item| item.columns)
            .collect())
    }

    /// The literal texts of the items classified as expressions, in item
    /// order, aliases included.
    ///
    /// # Errors
    ///
    /// Propagates [`Self::items`] errors.
    pub fn parse_expressions(&self) -> Result<Vec<String>, ParseError> {
        Ok(self
            .items()?
            .into_iter()
            .filter(|item| item.kind.is_expression())
            .map(|item| item.text)
            .collect())
    }
}

/// Classifies one select item and inventories its columns.
fn classify_item(item: &str) -> SelectValues {
    let (body, alias) = split_alias(item);
    let kind = classify(body);
    let columns = match kind {
        SelectItemKind::BareReference => vec![body.to_string()],
        SelectItemKind::SingleColumnCall => {
            vec![call_argument(body).unwrap_or_default().to_string()]
        }
        _ => collect_identifiers(body),
    };
    SelectValues {
        text: item.to_string(),
        alias,
        columns,
        kind,
    }
}

/// Decides the shape of an item body (alias already stripped).
fn classify(body: &str) -> SelectItemKind {
    if body == "*" || is_bare_reference(body) {
        return SelectItemKind::BareReference;
    }
    if ClauseScanner::new(body).leading_ident().map(Keyword::from_str) == Some(Some(Keyword::Case))
    {
        return SelectItemKind::CaseExpression;
    }
    if has_top_level_operator(body) {
        return SelectItemKind::Arithmetic;
    }
    match call_argument(body) {
        Some(arg) if arg == "*" || is_bare_reference(arg) => SelectItemKind::SingleColumnCall,
        _ => SelectItemKind::MultiArgCall,
    }
}

/// Splits `item` into its body and an optional alias (`AS name` or a
/// trailing bare identifier).
fn split_alias(item: &str) -> (&str, Option<String>) {
    let item = item.trim();
    if let Some(m) = ClauseScanner::new(item).find_keyword("AS", 0) {
        let alias = item[m.end..].trim();
        let alias = if alias.is_empty() {
            None
        } else {
            Some(alias.to_string())
        };
        return (item[..m.start].trim(), alias);
    }

    // A trailing bare identifier after top-level whitespace is an alias,
    // unless the preceding text ends in an operator (then the final token
    // is an operand, as in `price * quantity`).
    if let Some(ws) = last_top_level_whitespace(item) {
        let candidate = item[ws..].trim();
        let body = item[..ws].trim_end();
        let tail_ok = body
            .chars()
            .next_back()
            .is_some_and(|c| c.is_alphanumeric() || c == '_' || c == ')' || c == '\'');
        if tail_ok && is_plain_identifier(candidate) && !Keyword::is_keyword(candidate) {
            return (body, Some(candidate.to_string()));
        }
    }
    (item, None)
}

/// The byte offset of the last parenthesis-depth-zero whitespace character.
fn last_top_level_whitespace(item: &str) -> Option<usize> {
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut last = None;
    for (i, c) in item.char_indices() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"' | '`') => quote = Some(c),
            (None, '(') => depth += 1,
            (None, ')') => depth -= 1,
            (None, c) if c.is_whitespace() && depth == 0 => last = Some(i),
            _ => {}
        }
    }
    last
}

/// A bare (possibly dotted) column reference, optionally ending `.*`.
fn is_bare_reference(body: &str) -> bool {
    let base = body.strip_suffix(".*").unwrap_or(body);
    !base.is_empty()
        && base
            .chars()
            .next()
            .is_some_and(|c| c.is_alphabetic() || c == '_')
        && base
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '.')
}

fn is_plain_identifier(s: &str) -> bool {
    !s.is_empty()
        && s.chars()
            .next()
            .is_some_and(|c| c.is_alphabetic() || c == '_')
        && s.chars().all(|c| c.is_alphanumeric() || c == '_')
}

/// True when an arithmetic/concatenation operator sits at depth zero.
fn has_top_level_operator(body: &str) -> bool {
    let mut depth = 0i32;
    let mut quote: Option<char> = None;
    let mut prev = '\0';
    for c in body.chars() {
        match (quote, c) {
            (Some(q), c) if c == q => quote = None,
            (Some(_), _) => {}
            (None, '\'' | '"' | '`') => quote = Some(c),
            (None, '(') => depth += 1,
            (None, ')') => depth -= 1,
            (None, c) if depth == 0 && ARITHMETIC_OPS.contains(&c) => {
                // `.*` is a reference tail, not multiplication.
                if !(c == '*' && prev == '.') {
                    return true;
                }
            }
            _ => {}
        }
        if !c.is_whitespace() {
            prev = c;
        }
    }
    false
}

/// The sole argument of a simple one-argument call, e.g. `age` in
/// `MAX(age)`; `None` when the body is not that shape.
fn call_argument(body: &str) -> Option<&str> {
    let open = body.find('(')?;
    let name = body[..open].trim();
    if !is_plain_identifier(name) || !body.ends_with(')') {
        return None;
    }
    let inner = &body[open + 1..body.len() - 1];
    if inner.contains('(') || ClauseScanner::new(inner).split_top_level(',').len() != 1 {
        return None;
    }
    Some(inner.trim())
}

/// Scans an expression body for base column identifiers, skipping SQL
/// keywords, function names, placeholders, and literals. Dotted
/// qualification is preserved.
fn collect_identifiers(body: &str) -> Vec<String> {
    let mut columns = Vec::new();
    let chars: Vec<(usize, char)> = body.char_indices().collect();
    let mut idx = 0;
    while idx < chars.len() {
        let (start, c) = chars[idx];
        if c == '\'' || c == '"' || c == '`' {
            idx += 1;
            while idx < chars.len() && chars[idx].1 != c {
                idx += 1;
            }
            idx += 1; // closing quote
        } else if c == '@' {
            idx += 1;
            while idx < chars.len() && is_ident_char(chars[idx].1) {
                idx += 1;
            }
        } else if c.is_ascii_digit() {
            while idx < chars.len() && (chars[idx].1.is_ascii_alphanumeric() || chars[idx].1 == '.')
            {
                idx += 1;
            }
        } else if c.is_alphabetic() || c == '_' {
            while idx < chars.len() && is_ident_char(chars[idx].1) {
                idx += 1;
            }
            // A `.*` tail stays part of the reference.
            if idx < chars.len()
                && chars[idx].1 == '*'
                && body[start..chars[idx].0].ends_with('.')
            {
                idx += 1;
            }
            let end = chars.get(idx).map_or(body.len(), |&(pos, _)| pos);
            let token = &body[start..end];
            let is_call = body[end..].trim_start().starts_with('(');
            if !is_call && !(Keyword::is_keyword(token) && !token.contains('.')) {
                columns.push(token.to_string());
            }
        } else {
            idx += 1;
        }
    }
    columns
}

fn is_ident_char(c: char) -> bool {
    c.is_alphanumeric() || c == '_' || c == '.'
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns(list: &str) -> Vec<String> {
        SelectListParser::new(list).parse_columns().unwrap()
    }

    fn expressions(list: &str) -> Vec<String> {
        SelectListParser::new(list).parse_expressions().unwrap()
    }

    #[test]
    fn test_bare_columns() {
        assert_eq!(columns("name, email"), vec!["name", "email"]);
        assert!(expressions("name, email").is_empty());
    }

    #[test]
    fn test_star_and_dotted_star() {
        assert_eq!(columns("*"), vec!["*"]);
        assert_eq!(columns("users.*"), vec!["users.*"]);
    }

    #[test]
    fn test_alias_is_stripped_from_reference() {
        assert_eq!(columns("name AS n, users.email e"), vec!["name", "users.email"]);
        let items = SelectListParser::new("name AS n").items().unwrap();
        assert_eq!(items[0].alias.as_deref(), Some("n"));
        assert_eq!(items[0].kind, SelectItemKind::BareReference);
    }

    #[test]
    fn test_single_argument_calls() {
        assert_eq!(columns("COUNT(*), MAX(age)"), vec!["*", "age"]);
        assert_eq!(columns("UPPER(name)"), vec!["name"]);
        assert!(expressions("COUNT(*), MAX(age)").is_empty());
    }

    #[test]
    fn test_arithmetic_expression() {
        assert_eq!(columns("price * quantity AS total"), vec!["price", "quantity"]);
        assert_eq!(
            expressions("price * quantity AS total"),
            vec!["price * quantity AS total"]
        );
    }

    #[test]
    fn test_duplicate_columns_are_kept() {
        assert_eq!(columns("price, price * 2"), vec!["price", "price"]);
    }

    #[test]
    fn test_multi_argument_call() {
        let items = SelectListParser::new("COALESCE(nickname, name)").items().unwrap();
        assert_eq!(items[0].kind, SelectItemKind::MultiArgCall);
        assert_eq!(items[0].columns, vec!["nickname", "name"]);
        assert_eq!(
            expressions("COALESCE(nickname, name)"),
            vec!["COALESCE(nickname, name)"]
        );
    }

    #[test]
    fn test_nested_call() {
        let items = SelectListParser::new("ROUND(AVG(price))").items().unwrap();
        assert_eq!(items[0].kind, SelectItemKind::MultiArgCall);
        assert_eq!(items[0].columns, vec!["price"]);
    }

    #[test]
    fn test_case_expression() {
        let list = "CASE WHEN status = 1 THEN 'active' ELSE 'inactive' END AS label";
        let items = SelectListParser::new(list).items().unwrap();
        assert_eq!(items[0].kind, SelectItemKind::CaseExpression);
        assert_eq!(items[0].columns, vec!["status"]);
        assert_eq!(items[0].alias.as_deref(), Some("label"));
        assert_eq!(expressions(list), vec![list]);
    }

    #[test]
    fn test_commas_inside_calls_do_not_split() {
        let items = SelectListParser::new("COALESCE(a, b), c").items().unwrap();
        assert_eq!(items.len(), 2);
    }

    #[test]
    fn test_placeholder_and_literals_are_not_columns() {
        assert_eq!(columns("price * 2 + 1"), vec!["price"]);
        let items = SelectListParser::new("name || '!'").items().unwrap();
        assert_eq!(items[0].columns, vec!["name"]);
    }

    #[test]
    fn test_dotted_qualification_preserved_in_expressions() {
        assert_eq!(
            columns("o.price * o.quantity"),
            vec!["o.price", "o.quantity"]
        );
    }

    #[test]
    fn test_unbalanced_list_is_fatal() {
        assert!(SelectListParser::new("COUNT(name").items().is_err());
    }
}
