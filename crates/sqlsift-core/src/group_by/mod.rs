//! GROUP BY / HAVING parsing.

mod parser;

pub use parser::GroupByParser;
