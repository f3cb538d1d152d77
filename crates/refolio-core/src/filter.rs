//! Filter, search, and sort pipeline for reference lists.
//!
//! [`apply`] is a pure function from a record slice and a set of criteria to
//! the visible, ordered subset. There is no cached state: every criterion
//! change recomputes from scratch, which is the right trade at the few
//! hundred records a collection holds.

use serde::{Deserialize, Serialize};

use crate::record::Reference;

/// Year rank for records with no extractable year, so they sort last in
/// both modes.
const YEAR_NONE: u32 = 9999;

/// Sort order for a reference list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortMode {
    /// First-author family name ascending, then year ascending.
    #[default]
    AuthorYear,
    /// Year descending (most recent first), then first-author family name.
    YearAuthor,
}

/// User-selected view criteria.
#[derive(Debug, Clone, Default)]
pub struct FilterCriteria {
    /// Case-insensitive substring matched against title, author, editor,
    /// and abstract. Empty matches everything.
    pub search: String,
    /// Entry-type code to keep; `None` keeps all types.
    pub entry_type: Option<String>,
    /// Year to keep; `None` keeps all years. Records with no extractable
    /// year never match a selected year.
    pub year: Option<String>,
    pub sort: SortMode,
}

impl FilterCriteria {
    /// Whether these criteria keep every record (sort still applies).
    pub fn is_empty(&self) -> bool {
        self.search.is_empty() && self.entry_type.is_none() && self.year.is_none()
    }
}

/// Compute the visible subset in display order.
///
/// The sort is stable, so records tied on both keys keep the order they
/// were parsed in.
pub fn apply<'a>(records: &'a [Reference], criteria: &FilterCriteria) -> Vec<&'a Reference> {
    let mut visible: Vec<&Reference> = records
        .iter()
        .filter(|r| matches_type(r, criteria))
        .filter(|r| matches_year(r, criteria))
        .filter(|r| matches_search(r, criteria))
        .collect();

    match criteria.sort {
        SortMode::AuthorYear => {
            visible.sort_by(|a, b| {
                (a.sort_author(), year_rank(a)).cmp(&(b.sort_author(), year_rank(b)))
            });
        }
        SortMode::YearAuthor => {
            visible.sort_by(|a, b| {
                (std::cmp::Reverse(year_rank(a)), a.sort_author())
                    .cmp(&(std::cmp::Reverse(year_rank(b)), b.sort_author()))
            });
        }
    }

    visible
}

fn matches_type(record: &Reference, criteria: &FilterCriteria) -> bool {
    match &criteria.entry_type {
        Some(code) => record.entry_type == *code,
        None => true,
    }
}

fn matches_year(record: &Reference, criteria: &FilterCriteria) -> bool {
    match &criteria.year {
        Some(year) => record.extracted_year() == Some(year.as_str()),
        None => true,
    }
}

fn matches_search(record: &Reference, criteria: &FilterCriteria) -> bool {
    if criteria.search.is_empty() {
        return true;
    }
    let term = criteria.search.to_lowercase();
    [
        record.title.as_deref(),
        record.author.as_deref(),
        record.editor.as_deref(),
        record.abstract_text.as_deref(),
    ]
    .into_iter()
    .flatten()
    .any(|field| field.to_lowercase().contains(&term))
}

fn year_rank(record: &Reference) -> u32 {
    record
        .extracted_year()
        .and_then(|y| y.parse().ok())
        .unwrap_or(YEAR_NONE)
}

/// Distinct entry-type codes present, ascending, for the type selector.
pub fn observed_types(records: &[Reference]) -> Vec<String> {
    let mut types: Vec<String> = records.iter().map(|r| r.entry_type.clone()).collect();
    types.sort();
    types.dedup();
    types
}

/// Distinct years present, most recent first, for the year selector.
pub fn observed_years(records: &[Reference]) -> Vec<String> {
    let mut years: Vec<String> = records
        .iter()
        .filter_map(|r| r.extracted_year().map(str::to_string))
        .collect();
    years.sort();
    years.dedup();
    years.reverse();
    years
}
