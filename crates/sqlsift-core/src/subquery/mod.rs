//! Recursive subquery discovery and table inventory.

mod extractor;

pub use extractor::SubqueryExtractor;
