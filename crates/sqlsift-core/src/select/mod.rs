//! Select-list parsing and item classification.

mod list;

pub use list::SelectListParser;
