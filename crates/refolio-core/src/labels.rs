//! Spanish display labels for entry-type codes.

use lazy_static::lazy_static;
use std::collections::HashMap;

lazy_static! {
    static ref TYPE_LABELS: HashMap<&'static str, &'static str> = {
        let mut map = HashMap::new();
        map.insert("article", "Artículo");
        map.insert("book", "Libro");
        map.insert("incollection", "Capítulo de libro");
        map.insert("inproceedings", "Conferencia");
        map.insert("proceedings", "Actas");
        map.insert("phdthesis", "Tesis doctoral");
        map.insert("mastersthesis", "Tesis de maestría");
        map.insert("techreport", "Reporte técnico");
        map.insert("manual", "Manual");
        map.insert("misc", "Misceláneo");
        map.insert("online", "En línea");
        map.insert("report", "Reporte");
        map
    };
}

/// Display label for an entry-type code; unknown codes pass through.
pub fn translate_entry_type(code: &str) -> &str {
    TYPE_LABELS
        .get(code.to_lowercase().as_str())
        .copied()
        .unwrap_or(code)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn known_codes_translate() {
        assert_eq!(translate_entry_type("article"), "Artículo");
        assert_eq!(translate_entry_type("phdthesis"), "Tesis doctoral");
        assert_eq!(translate_entry_type("ARTICLE"), "Artículo");
    }

    #[test]
    fn unknown_codes_pass_through() {
        assert_eq!(translate_entry_type("patent"), "patent");
    }
}
