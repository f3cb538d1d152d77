//! Formats entries back into BibTeX text.

use crate::entry::Entry;

/// Format a single entry.
pub fn format_entry(entry: &Entry) -> String {
    let mut result = String::new();

    result.push('@');
    result.push_str(entry.entry_type.code());
    result.push('{');
    result.push_str(&entry.cite_key);
    result.push_str(",\n");

    for field in &entry.fields {
        result.push_str("    ");
        result.push_str(&field.key);
        result.push_str(" = ");
        result.push_str(&format_field_value(&field.value));
        result.push_str(",\n");
    }

    result.push('}');
    result
}

/// Format multiple entries as one document.
pub fn format_entries(entries: &[Entry]) -> String {
    entries
        .iter()
        .map(format_entry)
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Pick delimiters for a field value: bare for pure numbers, braces
/// otherwise (braces preserve inner case-protection braces verbatim).
fn format_field_value(value: &str) -> String {
    if !value.is_empty() && value.chars().all(|c| c.is_ascii_digit()) {
        return value.to_string();
    }

    let mut result = String::with_capacity(value.len() + 2);
    result.push('{');
    result.push_str(value);
    result.push('}');
    result
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entry::EntryType;
    use crate::parser::parse;

    #[test]
    fn format_simple_entry() {
        let mut entry = Entry::new("Smith2024".to_string(), EntryType::Article);
        entry.set_field("title", "A Great Paper");
        entry.set_field("year", "2024");

        let text = format_entry(&entry);
        assert!(text.starts_with("@article{Smith2024,"));
        assert!(text.contains("title = {A Great Paper},"));
        assert!(text.contains("year = 2024,"));
        assert!(text.ends_with('}'));
    }

    #[test]
    fn round_trip_preserves_entries() {
        let input = r#"
@article{Smith2024,
    author = {{World Health Organization} and Doe, Jane},
    title = {The {DNA} Story},
    year = {2024},
}

@reporte{X1,
    note = {unknown type survives},
}
"#;
        let first = parse(input).unwrap();
        let text = format_entries(&first);
        let second = parse(&text).unwrap();

        assert_eq!(first, second);
    }
}
