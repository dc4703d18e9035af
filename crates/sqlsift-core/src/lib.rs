//! # sqlsift-core
//!
//! Clause-level decomposition of single SQL statements, without building an
//! AST and without executing anything.
//!
//! This crate provides:
//! - A paren-depth-aware clause scanner, so keywords and commas inside
//!   subqueries, function calls, and CASE expressions never shift clause
//!   boundaries
//! - A statement lexer that splits a statement into semantically typed
//!   clause substrings and validates the `@identifier` placeholder contract
//! - A select-list parser that classifies each item as a column reference
//!   or a computed expression
//! - A subquery extractor that inventories nested SELECTs and every table
//!   referenced anywhere in a statement
//!
//! ## Decomposing a statement
//!
//! ```rust
//! use sqlsift_core::StatementLexer;
//!
//! let parts = StatementLexer::new(
//!     "SELECT name, email FROM users WHERE status = @status LIMIT 10",
//! )
//! .parse()
//! .unwrap();
//!
//! assert_eq!(parts.table, "users");
//! assert_eq!(parts.limit, Some(10));
//! ```
//!
//! ## The placeholder contract
//!
//! `@identifier` is the sole placeholder syntax, and in a comparison the
//! placeholder must be named after the column it binds to:
//!
//! ```rust
//! use sqlsift_core::StatementLexer;
//!
//! assert!(StatementLexer::new("SELECT * FROM users WHERE name = @name")
//!     .parse()
//!     .is_ok());
//! assert!(StatementLexer::new("SELECT * FROM users WHERE name = @email")
//!     .parse()
//!     .is_err());
//! ```

pub mod error;
pub mod group_by;
pub mod keywords;
pub mod parts;
pub mod scan;
pub mod select;
pub mod statement;
pub mod subquery;

pub use error::ParseError;
pub use group_by::GroupByParser;
pub use parts::{
    GroupByValues, HavingCondition, QueryParts, SelectItemKind, SelectValues, StatementKind,
    SubQueryValues, TableUse,
};
pub use scan::ClauseScanner;
pub use select::SelectListParser;
pub use statement::StatementLexer;
pub use subquery::SubqueryExtractor;
