//! BibTeX parsing and formatting
//!
//! This crate provides the parser and formatter behind the refolio
//! reference site. Supported input:
//! - @string definitions with substitution into field values
//! - @preamble declarations and @comment sections
//! - Braced and quoted field values, bare numbers
//! - String concatenation with #
//! - Nested braces in field values
//!
//! Parsing is strict per file: the first malformed entry fails the whole
//! file, and the caller decides what a failed file means (for the site
//! loader: that file contributes zero references).

mod entry;
mod formatter;
pub mod parser;

pub use entry::{Entry, EntryType, Field};
pub use formatter::{format_entries, format_entry};
pub use parser::{parse, ParseError};
