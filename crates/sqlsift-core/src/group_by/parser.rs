//! The GROUP BY parser.

use crate::error::ParseError;
use crate::parts::{GroupByValues, HavingCondition};
use crate::scan::ClauseScanner;
use crate::statement::params;

/// Keywords that end the GROUP BY column list or a HAVING condition.
const TERMINATORS: &[&str] = &["HAVING", "ORDER BY", "LIMIT", "OFFSET", "UNION"];

/// Parses a statement's GROUP BY clause and optional HAVING condition.
///
/// The result is a list of zero or one elements; the list shape reserves
/// room for multiple grouping sets without implementing them.
pub struct GroupByParser<'a> {
    input: &'a str,
}

impl<'a> GroupByParser<'a> {
    /// Creates a parser over a statement (or clause fragment).
    #[must_use]
    pub const fn new(input: &'a str) -> Self {
        Self { input }
    }

    /// Parses the GROUP BY clause, if one exists at the top level.
    ///
    /// # Errors
    ///
    /// Propagates named-parameter contract violations found in the HAVING
    /// condition.
    pub fn parse(&self) -> Result<Vec<GroupByValues>, ParseError> {
        let scanner = ClauseScanner::new(self.input);
        let Some(group) = scanner.find_keyword("GROUP BY", 0) else {
            return Ok(Vec::new());
        };

        let columns_end = scanner
            .find_any(TERMINATORS, group.end)
            .map_or(self.input.len(), |(m, _)| m.start);
        let columns: Vec<String> = ClauseScanner::new(&self.input[group.end..columns_end])
            .split_top_level(',')
            .into_iter()
            .filter(|c| !c.is_empty())
            .map(ToString::to_string)
            .collect();

        let having_conditions = match scanner.find_keyword("HAVING", group.end) {
            Some(having) => {
                let end = scanner
                    .find_any(&["ORDER BY", "LIMIT", "OFFSET", "UNION"], having.end)
                    .map_or(self.input.len(), |(m, _)| m.start);
                let fragment = self.input[having.end..end].trim();
                params::validate_condition(fragment)?;
                parse_having(fragment)
            }
            None => None,
        };

        Ok(vec![GroupByValues {
            columns,
            having_conditions,
        }])
    }
}

/// Splits a HAVING fragment into operand, operator, and search value.
///
/// The operator is one of `= != <> < <= > >= LIKE IN IS NULL IS NOT NULL`,
/// longest match first; `IS [NOT] NULL` leaves the search value empty.
fn parse_having(fragment: &str) -> Option<HavingCondition> {
    let scanner = ClauseScanner::new(fragment);

    for kw in ["IS NOT NULL", "IS NULL"] {
        if let Some(m) = scanner.find_keyword(kw, 0) {
            return Some(HavingCondition {
                value: fragment[..m.start].trim().to_string(),
                condition: fragment[m.start..m.end].to_string(),
                search_value: String::new(),
            });
        }
    }

    let op_pos = ['!', '<', '>', '=']
        .iter()
        .filter_map(|&c| scanner.find_char(c, 0))
        .min();
    if let Some(pos) = op_pos {
        let mut end = pos + 1;
        if matches!(fragment.as_bytes().get(end), Some(b'=' | b'>')) {
            end += 1;
        }
        return Some(HavingCondition {
            value: fragment[..pos].trim().to_string(),
            condition: fragment[pos..end].to_string(),
            search_value: fragment[end..].trim().to_string(),
        });
    }

    for kw in ["LIKE", "IN"] {
        if let Some(m) = scanner.find_keyword(kw, 0) {
            return Some(HavingCondition {
                value: fragment[..m.start].trim().to_string(),
                condition: fragment[m.start..m.end].to_string(),
                search_value: fragment[m.end..].trim().to_string(),
            });
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(sql: &str) -> Vec<GroupByValues> {
        GroupByParser::new(sql).parse().unwrap()
    }

    #[test]
    fn test_absent_group_by_is_empty() {
        assert_eq!(parse("SELECT * FROM users"), Vec::new());
    }

    #[test]
    fn test_group_by_with_having() {
        let values = parse("SELECT status, COUNT(*) FROM users GROUP BY status HAVING COUNT(*) > 5");
        assert_eq!(
            values,
            vec![GroupByValues {
                columns: vec![String::from("status")],
                having_conditions: Some(HavingCondition {
                    value: String::from("COUNT(*)"),
                    condition: String::from(">"),
                    search_value: String::from("5"),
                }),
            }]
        );
    }

    #[test]
    fn test_multiple_grouping_columns() {
        let values = parse("SELECT * FROM t GROUP BY city, country ORDER BY city");
        assert_eq!(
            values[0].columns,
            vec![String::from("city"), String::from("country")]
        );
        assert_eq!(values[0].having_conditions, None);
    }

    #[test]
    fn test_having_with_quoted_value() {
        let values = parse("SELECT * FROM t GROUP BY status HAVING status = 'active'");
        let having = values[0].having_conditions.clone().unwrap();
        assert_eq!(having.value, "status");
        assert_eq!(having.condition, "=");
        assert_eq!(having.search_value, "'active'");
    }

    #[test]
    fn test_having_is_not_null() {
        let values = parse("SELECT * FROM t GROUP BY owner HAVING owner IS NOT NULL");
        let having = values[0].having_conditions.clone().unwrap();
        assert_eq!(having.condition, "IS NOT NULL");
        assert_eq!(having.search_value, "");
    }

    #[test]
    fn test_nested_group_by_is_ignored() {
        let sql = "SELECT * FROM t WHERE x IN (SELECT y FROM u GROUP BY y)";
        assert_eq!(parse(sql), Vec::new());
    }

    #[test]
    fn test_having_parameter_contract() {
        let parser = GroupByParser::new("SELECT * FROM t GROUP BY status HAVING status = @status");
        assert!(parser.parse().is_ok());
        let parser = GroupByParser::new("SELECT * FROM t GROUP BY status HAVING status = @other");
        assert!(parser.parse().is_err());
    }

    #[test]
    fn test_group_by_clause_bounded_by_limit() {
        let values = parse("SELECT * FROM t GROUP BY kind LIMIT 3");
        assert_eq!(values[0].columns, vec![String::from("kind")]);
    }
}
