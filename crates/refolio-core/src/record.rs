//! Reference domain model.
//!
//! A [`Reference`] is one bibliographic record: the well-known fields the
//! site renders, plus an `extra` map for anything else the source file
//! carried. Records are built once from parsed BibTeX entries and never
//! mutated afterwards.

use std::collections::BTreeMap;

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};
use unicode_normalization::UnicodeNormalization;

use refolio_bibtex::Entry;

lazy_static! {
    /// First 4-digit run in a date or year field.
    static ref YEAR_RE: Regex = Regex::new(r"\d{4}").unwrap();
}

/// One bibliographic record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Reference {
    pub citation_key: String,
    /// Lower-cased entry-type code (e.g. "article"); unknown codes kept as-is.
    pub entry_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub editor: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub year: Option<String>,
    #[serde(rename = "journaltitle", skip_serializing_if = "Option::is_none")]
    pub journal_title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub doi: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(rename = "abstract", skip_serializing_if = "Option::is_none")]
    pub abstract_text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub publisher: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub series: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub edition: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub volume: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub isbn: Option<String>,
    /// Source fields with no dedicated slot above.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extra: BTreeMap<String, String>,
}

impl Reference {
    /// The publication year: first 4-digit run in `date`, falling back to
    /// `year`. `None` when neither field yields one.
    pub fn extracted_year(&self) -> Option<&str> {
        let source = self.date.as_deref().or(self.year.as_deref())?;
        YEAR_RE.find(source).map(|m| m.as_str())
    }

    /// Sort key: folded family name of the first author, falling back to the
    /// first editor, else empty.
    pub fn sort_author(&self) -> String {
        let names = match self.author.as_deref().or(self.editor.as_deref()) {
            Some(names) => names,
            None => return String::new(),
        };
        let first = names.split(" and ").next().unwrap_or(names).trim();
        fold_name(first_family_name(first))
    }
}

impl From<Entry> for Reference {
    fn from(entry: Entry) -> Self {
        let mut reference = Reference {
            citation_key: entry.cite_key,
            entry_type: entry.entry_type.code().to_string(),
            title: None,
            author: None,
            editor: None,
            date: None,
            year: None,
            journal_title: None,
            doi: None,
            url: None,
            abstract_text: None,
            publisher: None,
            location: None,
            series: None,
            edition: None,
            volume: None,
            isbn: None,
            extra: BTreeMap::new(),
        };

        for field in entry.fields {
            let slot = match field.key.as_str() {
                "title" => &mut reference.title,
                "author" => &mut reference.author,
                "editor" => &mut reference.editor,
                "date" => &mut reference.date,
                "year" => &mut reference.year,
                "journaltitle" | "journal" => &mut reference.journal_title,
                "doi" => &mut reference.doi,
                "url" => &mut reference.url,
                "abstract" => &mut reference.abstract_text,
                "publisher" => &mut reference.publisher,
                "location" | "address" => &mut reference.location,
                "series" => &mut reference.series,
                "edition" => &mut reference.edition,
                "volume" => &mut reference.volume,
                "isbn" => &mut reference.isbn,
                _ => {
                    reference.extra.insert(field.key, field.value);
                    continue;
                }
            };
            *slot = Some(field.value);
        }

        reference
    }
}

/// Family name of a single name string: the `family=` component in the
/// biblatex extended form, the text before the comma in "Family, Given",
/// the last word otherwise.
fn first_family_name(name: &str) -> &str {
    if let Some(pos) = name.find("family=") {
        let rest = &name[pos + "family=".len()..];
        return rest.split(',').next().unwrap_or(rest).trim();
    }
    if let Some((family, _)) = name.split_once(',') {
        return family.trim();
    }
    name.split_whitespace().last().unwrap_or(name)
}

/// Fold a name for ordering: strip braces, drop diacritics, lower-case.
fn fold_name(name: &str) -> String {
    name.chars()
        .filter(|c| *c != '{' && *c != '}')
        .nfkd()
        .filter(|c| c.is_ascii_alphanumeric() || c.is_ascii_whitespace())
        .collect::<String>()
        .to_lowercase()
        .trim()
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use refolio_bibtex::parse;

    fn reference(input: &str) -> Reference {
        let entries = parse(input).unwrap();
        Reference::from(entries.into_iter().next().unwrap())
    }

    #[test]
    fn well_known_fields_and_extra() {
        let r = reference(
            r#"@book{K, title={T}, publisher={P}, address={Madrid}, langid={spanish}}"#,
        );
        assert_eq!(r.title.as_deref(), Some("T"));
        assert_eq!(r.publisher.as_deref(), Some("P"));
        assert_eq!(r.location.as_deref(), Some("Madrid"));
        assert_eq!(r.extra.get("langid").map(String::as_str), Some("spanish"));
        assert_eq!(r.entry_type, "book");
    }

    #[test]
    fn year_from_date_with_fallback() {
        let dated = reference("@misc{K, date={2023-05-01}}");
        assert_eq!(dated.extracted_year(), Some("2023"));

        let year_only = reference("@misc{K, year={2022}}");
        assert_eq!(year_only.extracted_year(), Some("2022"));

        let undated = reference("@misc{K, title={T}}");
        assert_eq!(undated.extracted_year(), None);
    }

    #[test]
    fn date_wins_over_year() {
        let r = reference("@misc{K, date={2019}, year={2020}}");
        assert_eq!(r.extracted_year(), Some("2019"));
    }

    #[test]
    fn sort_author_formats() {
        let plain = reference("@misc{K, author={Smith, John and Doe, Jane}}");
        assert_eq!(plain.sort_author(), "smith");

        let extended = reference("@misc{K, author={family=Gómez, given=Ana}}");
        assert_eq!(extended.sort_author(), "gomez");

        let first_last = reference("@misc{K, author={John Smith}}");
        assert_eq!(first_last.sort_author(), "smith");
    }

    #[test]
    fn sort_author_falls_back_to_editor() {
        let r = reference("@misc{K, editor={Pérez, Luis}}");
        assert_eq!(r.sort_author(), "perez");

        let neither = reference("@misc{K, title={T}}");
        assert_eq!(neither.sort_author(), "");
    }
}
