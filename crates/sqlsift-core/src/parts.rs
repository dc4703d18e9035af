//! Output data model for decomposed statements.
//!
//! Every type here is an immutable snapshot computed once per input string;
//! nothing is cached or shared between calls.

use serde::{Deserialize, Serialize};

/// The kind of statement a piece of input was classified as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatementKind {
    /// `SELECT ... FROM ...`
    Select,
    /// `INSERT INTO ... VALUES (...)`
    Insert,
    /// `UPDATE ... SET ...`
    Update,
    /// `DELETE FROM ...`
    Delete,
    /// Basic `CREATE TABLE name (...)`; only the table name is captured.
    CreateTable,
}

/// The decomposed clauses of a single statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryParts {
    /// What the statement was classified as.
    pub kind: StatementKind,
    /// Select items in list order; present only for SELECT statements.
    pub selector: Option<Vec<String>>,
    /// The first FROM target (or INSERT/UPDATE subject table).
    pub table: String,
    /// One entry per top-level AND-joined WHERE condition.
    pub where_clauses: Option<Vec<String>>,
    /// Parameter placeholders of an INSERT VALUES clause.
    pub values: Option<Vec<String>>,
    /// `key = placeholder` pairs of an UPDATE SET clause.
    pub set: Option<Vec<String>>,
    /// Verbatim ORDER BY key, original casing preserved.
    pub order_by: Option<String>,
    /// LIMIT as an unsigned integer.
    pub limit: Option<u64>,
    /// JOIN ON conditions, one entry per top-level AND-joined condition.
    pub on: Option<Vec<String>>,
}

/// Shape classification of a single select item, decided once per item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SelectItemKind {
    /// A bare (possibly dotted) column reference, `*`, or `table.*`.
    BareReference,
    /// A call with a single bare-reference or `*` argument, e.g. `MAX(age)`.
    SingleColumnCall,
    /// A multi-argument or nested call, e.g. `COALESCE(a, b)`.
    MultiArgCall,
    /// An arithmetic or concatenation expression, e.g. `price * quantity`.
    Arithmetic,
    /// A `CASE ... END` expression.
    CaseExpression,
}

impl SelectItemKind {
    /// Returns true for the shapes reported by `parse_expressions`.
    #[must_use]
    pub const fn is_expression(self) -> bool {
        matches!(
            self,
            Self::MultiArgCall | Self::Arithmetic | Self::CaseExpression
        )
    }
}

/// One parsed select item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectValues {
    /// The literal item text as written, alias included.
    pub text: String,
    /// The alias, if one was given with `AS` or as a trailing bare name.
    pub alias: Option<String>,
    /// Base column identifiers the item mentions, dotted qualification kept.
    pub columns: Vec<String>,
    /// The shape the item was classified as.
    pub kind: SelectItemKind,
}

/// A table referenced in a FROM or JOIN position.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableUse {
    /// The table name, dotted qualification kept.
    pub table_name: String,
    /// The alias, if one follows the table name.
    pub alias: Option<String>,
}

/// Every subquery and table reference found in a statement.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SubQueryValues {
    /// Distinct parenthesized SELECT substrings in scan order. Inner
    /// subqueries close first, so they surface as independent entries even
    /// though they are substrings of an enclosing entry.
    pub queries: Vec<String>,
    /// Tables referenced in FROM/JOIN positions at any depth, deduplicated
    /// by the (table, alias) pair, first-seen order.
    pub tables_used: Vec<TableUse>,
}

/// A parsed HAVING comparison.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HavingCondition {
    /// The left operand, an identifier or aggregate call.
    pub value: String,
    /// The comparison operator as written.
    pub condition: String,
    /// The right operand; empty for `IS NULL` / `IS NOT NULL`.
    pub search_value: String,
}

/// One GROUP BY clause with its optional HAVING condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroupByValues {
    /// Grouping columns in list order.
    pub columns: Vec<String>,
    /// The HAVING comparison, if one follows the column list.
    pub having_conditions: Option<HavingCondition>,
}
