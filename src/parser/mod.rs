// Parsers for user-entered option values

pub mod ranges;

pub use ranges::{line_ranges, parse_line_ranges, LineRange};
