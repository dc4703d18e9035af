//! Statement decomposition into named clause substrings.

mod lexer;
pub(crate) mod params;

pub use lexer::StatementLexer;
