//! Named-parameter contract validation.
//!
//! The placeholder-binding contract: wherever a condition or assignment
//! compares a column against a bound value, that value must be an
//! `@identifier` placeholder whose identifier equals the column name.
//! Numeric and quoted-string literals pass untouched; a bare identifier in
//! value position is an invalid placeholder.

use crate::error::ParseError;
use crate::keywords::Keyword;
use crate::scan::ClauseScanner;

/// Operator characters that open an equality-style comparison.
const OP_CHARS: [char; 4] = ['!', '<', '>', '='];

/// Validates one AND-split condition or one SET assignment.
///
/// # Errors
///
/// `ParseError::InvalidParameter` for a bare identifier in value position,
/// `ParseError::ParameterMismatch` for an `@` placeholder whose identifier
/// differs from the compared column.
pub fn validate_condition(fragment: &str) -> Result<(), ParseError> {
    let scanner = ClauseScanner::new(fragment);

    // IS NULL / IS NOT NULL carry no bound value.
    if scanner.find_keyword("IS NULL", 0).is_some()
        || scanner.find_keyword("IS NOT NULL", 0).is_some()
    {
        return Ok(());
    }

    let op_pos = OP_CHARS
        .iter()
        .filter_map(|&c| scanner.find_char(c, 0))
        .min();

    let (lhs, rhs) = if let Some(pos) = op_pos {
        let mut end = pos + 1;
        if matches!(fragment.as_bytes().get(end), Some(b'=' | b'>')) {
            end += 1;
        }
        (&fragment[..pos], &fragment[end..])
    } else if let Some((m, _)) = scanner.find_any(&["LIKE", "IN"], 0) {
        (&fragment[..m.start], &fragment[m.end..])
    } else {
        // Not a comparison shape; nothing to validate.
        return Ok(());
    };

    let rhs = rhs.trim();
    if is_literal(rhs) || is_qualified_reference(rhs) {
        return Ok(());
    }
    if let Some(rest) = rhs.strip_prefix('@') {
        let parameter = ident_prefix(rest);
        let column = column_name(lhs);
        if column.eq_ignore_ascii_case(parameter) {
            return Ok(());
        }
        return Err(ParseError::ParameterMismatch {
            column: column.to_string(),
            parameter: parameter.to_string(),
        });
    }
    Err(ParseError::InvalidParameter(fragment.trim().to_string()))
}

/// Validates one entry of an INSERT VALUES tuple: literals pass, anything
/// identifier-shaped must be an `@` placeholder.
///
/// # Errors
///
/// `ParseError::InvalidParameter` when the entry is a bare identifier.
pub fn validate_placeholder(entry: &str) -> Result<(), ParseError> {
    let entry = entry.trim();
    if entry.starts_with('@') || is_literal(entry) {
        return Ok(());
    }
    Err(ParseError::InvalidParameter(entry.to_string()))
}

/// True for quoted strings, numbers, parenthesized values, and the literal
/// keywords NULL/TRUE/FALSE.
fn is_literal(value: &str) -> bool {
    if value.is_empty() || value.starts_with('\'') || value.starts_with('(') {
        return true;
    }
    let unsigned = value
        .strip_prefix('-')
        .or_else(|| value.strip_prefix('+'))
        .unwrap_or(value)
        .trim_start();
    if unsigned.chars().next().is_some_and(|c| c.is_ascii_digit()) {
        return true;
    }
    matches!(
        Keyword::from_str(ident_prefix(value)),
        Some(Keyword::Null | Keyword::True | Keyword::False | Keyword::Not)
    )
}

/// A dotted column reference (`o.user_id`) is a column-to-column
/// comparison, not a botched placeholder; an undotted bare identifier is.
fn is_qualified_reference(value: &str) -> bool {
    value.contains('.')
        && value
            .chars()
            .all(|c| c.is_alphanumeric() || c == '_' || c == '.')
}

/// The leading identifier run of a string.
fn ident_prefix(s: &str) -> &str {
    let end = s
        .find(|c: char| !c.is_alphanumeric() && c != '_')
        .unwrap_or(s.len());
    &s[..end]
}

/// The column identifier compared against: the last dotted segment of the
/// left operand.
fn column_name(lhs: &str) -> &str {
    let lhs = lhs.trim();
    lhs.rsplit('.').next().unwrap_or(lhs).trim()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_matching_parameter() {
        assert!(validate_condition("name = @name").is_ok());
        assert!(validate_condition("u.name = @name").is_ok());
        assert!(validate_condition("age >= @age").is_ok());
    }

    #[test]
    fn test_mismatched_parameter() {
        assert_eq!(
            validate_condition("name = @email"),
            Err(ParseError::ParameterMismatch {
                column: String::from("name"),
                parameter: String::from("email"),
            })
        );
    }

    #[test]
    fn test_bare_identifier_is_invalid() {
        assert_eq!(
            validate_condition("id = id"),
            Err(ParseError::InvalidParameter(String::from("id = id")))
        );
    }

    #[test]
    fn test_literals_pass() {
        assert!(validate_condition("age > 21").is_ok());
        assert!(validate_condition("status = 'active'").is_ok());
        assert!(validate_condition("score = -5").is_ok());
        assert!(validate_condition("deleted = FALSE").is_ok());
        assert!(validate_condition("deleted_at IS NOT NULL").is_ok());
    }

    #[test]
    fn test_join_column_comparison_passes() {
        assert!(validate_condition("u.id = o.user_id").is_ok());
    }

    #[test]
    fn test_subquery_rhs_is_skipped() {
        assert!(validate_condition("id IN (SELECT user_id FROM orders)").is_ok());
        assert!(validate_condition("id = (SELECT MAX(id) FROM users)").is_ok());
    }

    #[test]
    fn test_like_parameter() {
        assert!(validate_condition("name LIKE @name").is_ok());
        assert!(validate_condition("name LIKE @pattern").is_err());
    }

    #[test]
    fn test_values_placeholders() {
        assert!(validate_placeholder("@name").is_ok());
        assert!(validate_placeholder("'alice'").is_ok());
        assert!(validate_placeholder("42").is_ok());
        assert_eq!(
            validate_placeholder("name"),
            Err(ParseError::InvalidParameter(String::from("name")))
        );
    }
}
