//! Parse error types.

use thiserror::Error;

/// An error raised while decomposing a statement.
///
/// Parsing fails closed: a malformed statement never yields partial clause
/// data, and every error is surfaced synchronously to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    /// The input contains a second statement after a top-level semicolon.
    #[error("multiple statements in input")]
    MultipleStatements,

    /// The statement requires a subject table but names none.
    #[error("FROM clause is required")]
    MissingFrom,

    /// Parenthesis nesting does not balance out.
    #[error("unbalanced parentheses")]
    UnbalancedParens,

    /// A value position holds a bare identifier instead of an `@` placeholder.
    #[error("invalid parameter format in '{0}': expected an @ placeholder")]
    InvalidParameter(String),

    /// A placeholder identifier does not match the column it is compared to.
    #[error("parameter '@{parameter}' does not match column '{column}'")]
    ParameterMismatch {
        /// The column on the left side of the comparison.
        column: String,
        /// The placeholder identifier, without the `@`.
        parameter: String,
    },

    /// The LIMIT clause is not an unsigned integer literal.
    #[error("LIMIT must be an unsigned integer, got '{0}'")]
    InvalidLimit(String),

    /// The input is empty or whitespace only.
    #[error("empty statement")]
    EmptyStatement,

    /// The statement starts with a keyword this engine does not handle.
    #[error("unsupported statement: {0}")]
    UnsupportedStatement(String),
}
