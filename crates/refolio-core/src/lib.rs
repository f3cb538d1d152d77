//! Core library for the refolio reference site.
//!
//! Holds the reference domain model, the display-time field normalizers
//! (brace stripping, author/editor name lists), the filter/sort/search
//! engine, Spanish entry-type labels, and the filesystem collection loader.
//!
//! The view pipeline is deliberately a pure function: collections are parsed
//! once, the records are immutable, and every change of criteria recomputes
//! the visible subset from scratch via [`filter::apply`].

pub mod display;
pub mod error;
pub mod filter;
pub mod labels;
pub mod library;
pub mod record;

pub use error::LibraryError;
pub use filter::{apply, observed_types, observed_years, FilterCriteria, SortMode};
pub use library::{load_collection, Collection};
pub use record::Reference;
