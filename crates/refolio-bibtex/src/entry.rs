//! BibTeX entry data structures

use serde::{Deserialize, Serialize};

/// BibTeX entry type.
///
/// The standard types are closed variants; anything else is carried through
/// as `Other` with the lower-cased raw code, so unrecognized types survive
/// a round trip and can still be matched or translated downstream.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntryType {
    Article,
    Book,
    Booklet,
    InBook,
    InCollection,
    InProceedings,
    Manual,
    MastersThesis,
    Misc,
    PhdThesis,
    Proceedings,
    TechReport,
    Report,
    Unpublished,
    Online,
    Software,
    Dataset,
    Other(String),
}

impl EntryType {
    /// Parse an entry type from its raw code (case-insensitive).
    pub fn from_code(code: &str) -> Self {
        match code.to_lowercase().as_str() {
            "article" => Self::Article,
            "book" => Self::Book,
            "booklet" => Self::Booklet,
            "inbook" => Self::InBook,
            "incollection" => Self::InCollection,
            "inproceedings" | "conference" => Self::InProceedings,
            "manual" => Self::Manual,
            "mastersthesis" => Self::MastersThesis,
            "misc" => Self::Misc,
            "phdthesis" => Self::PhdThesis,
            "proceedings" => Self::Proceedings,
            "techreport" => Self::TechReport,
            "report" => Self::Report,
            "unpublished" => Self::Unpublished,
            "online" | "electronic" | "www" => Self::Online,
            "software" => Self::Software,
            "dataset" => Self::Dataset,
            other => Self::Other(other.to_string()),
        }
    }

    /// The canonical lower-case code for this type.
    pub fn code(&self) -> &str {
        match self {
            Self::Article => "article",
            Self::Book => "book",
            Self::Booklet => "booklet",
            Self::InBook => "inbook",
            Self::InCollection => "incollection",
            Self::InProceedings => "inproceedings",
            Self::Manual => "manual",
            Self::MastersThesis => "mastersthesis",
            Self::Misc => "misc",
            Self::PhdThesis => "phdthesis",
            Self::Proceedings => "proceedings",
            Self::TechReport => "techreport",
            Self::Report => "report",
            Self::Unpublished => "unpublished",
            Self::Online => "online",
            Self::Software => "software",
            Self::Dataset => "dataset",
            Self::Other(code) => code,
        }
    }
}

/// A single BibTeX field (key-value pair). Keys are stored lower-cased.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    pub key: String,
    pub value: String,
}

/// A parsed BibTeX entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entry {
    pub cite_key: String,
    pub entry_type: EntryType,
    pub fields: Vec<Field>,
}

impl Entry {
    pub fn new(cite_key: String, entry_type: EntryType) -> Self {
        Self {
            cite_key,
            entry_type,
            fields: Vec::new(),
        }
    }

    /// Set a field, lower-casing the key. A repeated key overwrites the
    /// earlier value in place (last write wins).
    pub fn set_field(&mut self, key: impl Into<String>, value: impl Into<String>) {
        let key = key.into().to_lowercase();
        let value = value.into();
        if let Some(existing) = self.fields.iter_mut().find(|f| f.key == key) {
            existing.value = value;
        } else {
            self.fields.push(Field { key, value });
        }
    }

    /// Get a field value by key (case-insensitive).
    pub fn get_field(&self, key: &str) -> Option<&str> {
        let key = key.to_lowercase();
        self.fields
            .iter()
            .find(|f| f.key == key)
            .map(|f| f.value.as_str())
    }

    pub fn title(&self) -> Option<&str> {
        self.get_field("title")
    }

    pub fn author(&self) -> Option<&str> {
        self.get_field("author")
    }

    pub fn year(&self) -> Option<&str> {
        self.get_field("year")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn entry_type_codes() {
        assert_eq!(EntryType::from_code("article"), EntryType::Article);
        assert_eq!(EntryType::from_code("ARTICLE"), EntryType::Article);
        assert_eq!(EntryType::from_code("conference"), EntryType::InProceedings);
        assert_eq!(
            EntryType::from_code("Colección"),
            EntryType::Other("colección".to_string())
        );
        assert_eq!(EntryType::Other("colección".into()).code(), "colección");
        assert_eq!(EntryType::PhdThesis.code(), "phdthesis");
    }

    #[test]
    fn field_access_is_case_insensitive() {
        let mut entry = Entry::new("Smith2024".to_string(), EntryType::Article);
        entry.set_field("Title", "A Great Paper");
        entry.set_field("AUTHOR", "John Smith");

        assert_eq!(entry.title(), Some("A Great Paper"));
        assert_eq!(entry.get_field("Author"), Some("John Smith"));
        assert_eq!(entry.year(), None);
    }

    #[test]
    fn repeated_field_last_write_wins() {
        let mut entry = Entry::new("k".to_string(), EntryType::Misc);
        entry.set_field("year", "2020");
        entry.set_field("YEAR", "2021");

        assert_eq!(entry.year(), Some("2021"));
        assert_eq!(entry.fields.len(), 1);
    }
}
