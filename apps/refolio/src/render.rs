//! Static HTML rendering.
//!
//! Hand-written writer over `io::Write`; each page is emitted in one pass
//! with all field text HTML-escaped after brace stripping.

use std::io::{self, Write};

use refolio_core::display::{format_name_list, strip_braces, NAME_CAP_CARD};
use refolio_core::labels::translate_entry_type;
use refolio_core::{apply, observed_types, observed_years, Collection, FilterCriteria, Reference};

use crate::config::{SectionConfig, SiteConfig};

/// Shown when a section's folder produced zero records.
pub const MSG_NO_REFERENCES: &str = "No se encontraron referencias";
/// Shown when records exist but none match the current criteria.
pub const MSG_NO_MATCHES: &str =
    "No se encontraron referencias que coincidan con los filtros seleccionados";

/// Escape HTML special characters.
fn escape_html(s: &str) -> String {
    s.chars()
        .map(|c| match c {
            '&' => "&amp;".to_string(),
            '<' => "&lt;".to_string(),
            '>' => "&gt;".to_string(),
            '"' => "&quot;".to_string(),
            '\'' => "&#39;".to_string(),
            _ => c.to_string(),
        })
        .collect()
}

/// Strip braces then escape, the order every rendered field goes through.
fn clean(raw: &str) -> String {
    escape_html(&strip_braces(raw))
}

/// Result-count line, pluralized the way the section pages show it.
pub fn count_line(visible: usize, total: usize) -> String {
    let noun = if total == 1 { "referencia" } else { "referencias" };
    format!("Mostrando {} de {} {}", visible, total, noun)
}

fn write_head<W: Write>(buf: &mut W, title: &str) -> io::Result<()> {
    writeln!(buf, "<!DOCTYPE html>")?;
    writeln!(buf, "<html lang=\"es\">")?;
    writeln!(buf, "<head>")?;
    writeln!(buf, "<meta charset=\"utf-8\">")?;
    writeln!(
        buf,
        "<meta name=\"viewport\" content=\"width=device-width, initial-scale=1\">"
    )?;
    writeln!(buf, "<title>{}</title>", escape_html(title))?;
    writeln!(buf, "<link rel=\"stylesheet\" href=\"refolio.css\">")?;
    writeln!(buf, "<script src=\"refolio.js\" defer></script>")?;
    writeln!(buf, "</head>")?;
    writeln!(buf, "<body>")
}

/// Search box plus type/year selectors, populated from the facets the
/// loaded collection actually contains.
fn write_filter_form<W: Write>(buf: &mut W, references: &[Reference]) -> io::Result<()> {
    writeln!(buf, "<form class=\"filters\" onsubmit=\"return false\">")?;
    writeln!(
        buf,
        "<input id=\"search\" type=\"search\" placeholder=\"Buscar por título, autor o contenido...\">"
    )?;

    writeln!(buf, "<select id=\"type\">")?;
    writeln!(buf, "<option value=\"\">Todos los tipos</option>")?;
    for code in observed_types(references) {
        writeln!(
            buf,
            "<option value=\"{}\">{}</option>",
            escape_html(&code),
            escape_html(translate_entry_type(&code))
        )?;
    }
    writeln!(buf, "</select>")?;

    writeln!(buf, "<select id=\"year\">")?;
    writeln!(buf, "<option value=\"\">Todos los años</option>")?;
    for year in observed_years(references) {
        writeln!(buf, "<option value=\"{0}\">{0}</option>", escape_html(&year))?;
    }
    writeln!(buf, "</select>")?;

    writeln!(buf, "<button type=\"reset\" id=\"clear\">Limpiar filtros</button>")?;
    writeln!(buf, "</form>")
}

fn write_nav<W: Write>(buf: &mut W, site: &SiteConfig, current: Option<&str>) -> io::Result<()> {
    writeln!(buf, "<nav>")?;
    writeln!(buf, "<a href=\"index.html\">Inicio</a>")?;
    for section in &site.sections {
        let class = if current == Some(section.slug.as_str()) {
            " class=\"active\""
        } else {
            ""
        };
        writeln!(
            buf,
            "<a href=\"{}.html\"{}>{}</a>",
            escape_html(&section.slug),
            class,
            escape_html(&section.title)
        )?;
    }
    writeln!(buf, "</nav>")
}

/// Render the landing page linking every section.
pub fn write_index<W: Write>(
    buf: &mut W,
    site: &SiteConfig,
    counts: &[(String, usize)],
) -> io::Result<()> {
    write_head(buf, &site.title)?;
    write_nav(buf, site, None)?;
    writeln!(buf, "<main>")?;
    writeln!(buf, "<h1>{}</h1>", escape_html(&site.title))?;
    if let Some(tagline) = &site.tagline {
        writeln!(buf, "<p class=\"tagline\">{}</p>", escape_html(tagline))?;
    }
    writeln!(buf, "<ul class=\"sections\">")?;
    for section in &site.sections {
        let count = counts
            .iter()
            .find(|(slug, _)| slug == &section.slug)
            .map(|(_, n)| *n)
            .unwrap_or(0);
        writeln!(
            buf,
            "<li><a href=\"{}.html\">{}</a> <span class=\"count\">({})</span></li>",
            escape_html(&section.slug),
            escape_html(&section.title),
            count
        )?;
    }
    writeln!(buf, "</ul>")?;
    writeln!(buf, "</main>")?;
    writeln!(buf, "</body>")?;
    writeln!(buf, "</html>")
}

/// Render one section page with its full, pre-sorted reference list.
pub fn write_section_page<W: Write>(
    buf: &mut W,
    site: &SiteConfig,
    section: &SectionConfig,
    collection: &Collection,
) -> io::Result<()> {
    let criteria = FilterCriteria {
        sort: section.sort,
        ..Default::default()
    };
    let visible = apply(&collection.references, &criteria);

    write_head(buf, &section.title)?;
    write_nav(buf, site, Some(&section.slug))?;
    writeln!(buf, "<main>")?;
    writeln!(buf, "<h1>{}</h1>", escape_html(&section.title))?;

    if collection.is_empty() {
        writeln!(
            buf,
            "<p class=\"result-count\">{}</p>",
            count_line(0, 0)
        )?;
        writeln!(buf, "<p class=\"empty\">{}</p>", MSG_NO_REFERENCES)?;
    } else {
        write_filter_form(buf, &collection.references)?;
        writeln!(
            buf,
            "<p class=\"result-count\">{}</p>",
            count_line(visible.len(), collection.len())
        )?;
        // Toggled by the filter script when nothing matches
        writeln!(
            buf,
            "<p class=\"empty hidden\" id=\"no-match\">{}</p>",
            MSG_NO_MATCHES
        )?;
    }

    for reference in &visible {
        write_card(buf, reference)?;
    }

    writeln!(buf, "</main>")?;
    writeln!(buf, "</body>")?;
    writeln!(buf, "</html>")
}

/// Lower-cased haystack the client-side search runs over: title, author,
/// editor, and abstract, matching the engine's search fields.
fn search_blob(r: &Reference) -> String {
    [
        r.title.as_deref(),
        r.author.as_deref(),
        r.editor.as_deref(),
        r.abstract_text.as_deref(),
    ]
    .into_iter()
    .flatten()
    .collect::<Vec<_>>()
    .join("\n")
    .to_lowercase()
}

/// One reference card.
fn write_card<W: Write>(buf: &mut W, r: &Reference) -> io::Result<()> {
    writeln!(
        buf,
        "<article class=\"reference\" data-type=\"{}\" data-year=\"{}\" data-search=\"{}\">",
        escape_html(&r.entry_type),
        escape_html(r.extracted_year().unwrap_or("")),
        escape_html(&search_blob(r))
    )?;

    let title = r.title.as_deref().map(clean);
    writeln!(
        buf,
        "<h3>{}</h3>",
        title.as_deref().unwrap_or("Sin título")
    )?;
    writeln!(
        buf,
        "<span class=\"type\">{}</span>",
        escape_html(translate_entry_type(&r.entry_type))
    )?;

    if let Some(author) = &r.author {
        writeln!(
            buf,
            "<p><strong>Autores:</strong> <em>{}</em></p>",
            escape_html(&format_name_list(author, NAME_CAP_CARD))
        )?;
    }
    if let Some(editor) = &r.editor {
        writeln!(
            buf,
            "<p><strong>Editores:</strong> <em>{}</em></p>",
            escape_html(&format_name_list(editor, NAME_CAP_CARD))
        )?;
    }

    if r.entry_type == "book" {
        write_book_details(buf, r)?;
    }

    writeln!(buf, "<p class=\"meta\">")?;
    if let Some(date) = &r.date {
        writeln!(buf, "<span>{}</span>", clean(date))?;
    }
    if let Some(journal) = &r.journal_title {
        writeln!(buf, "<span>{}</span>", clean(journal))?;
    }
    if let Some(doi) = &r.doi {
        writeln!(buf, "<span>DOI: {}</span>", clean(doi))?;
    }
    writeln!(buf, "</p>")?;

    if let Some(abstract_text) = &r.abstract_text {
        writeln!(buf, "<details>")?;
        writeln!(buf, "<summary>Ver resumen</summary>")?;
        writeln!(buf, "<p>{}</p>", clean(abstract_text))?;
        writeln!(buf, "</details>")?;
    }

    if let Some(url) = &r.url {
        writeln!(
            buf,
            "<a class=\"external\" href=\"{}\" target=\"_blank\" rel=\"noopener noreferrer\">Ver artículo completo</a>",
            escape_html(url)
        )?;
    }

    writeln!(buf, "</article>")
}

/// Book-specific block: publisher, place, series, edition, volume, ISBN.
fn write_book_details<W: Write>(buf: &mut W, r: &Reference) -> io::Result<()> {
    writeln!(buf, "<div class=\"book-details\">")?;
    let rows = [
        ("Editorial", &r.publisher),
        ("Lugar", &r.location),
        ("Serie", &r.series),
        ("Edición", &r.edition),
        ("Volumen", &r.volume),
        ("ISBN", &r.isbn),
    ];
    for (label, value) in rows {
        if let Some(value) = value {
            writeln!(buf, "<p><strong>{}:</strong> {}</p>", label, clean(value))?;
        }
    }
    writeln!(buf, "</div>")
}

/// Small shared stylesheet written next to the pages.
pub const STYLESHEET: &str = "\
body { font-family: system-ui, sans-serif; max-width: 60rem; margin: 0 auto; padding: 1rem; color: #1a1a1a; }
nav a { margin-right: 1rem; font-weight: 600; }
nav a.active { text-decoration: underline; }
article.reference { border: 1px solid #ddd; border-radius: 0.5rem; padding: 1rem; margin: 1rem 0; }
article.reference h3 { margin: 0 0 0.25rem 0; }
.type { font-size: 0.75rem; text-transform: uppercase; letter-spacing: 0.05em; background: #1a1a1a; color: #fff; border-radius: 1rem; padding: 0.15rem 0.6rem; }
.meta span { margin-right: 1rem; color: #555; font-size: 0.9rem; }
.book-details { border-left: 3px solid #1a1a1a; padding-left: 0.75rem; margin: 0.5rem 0; font-size: 0.9rem; }
.result-count { font-weight: 600; }
.empty { color: #555; text-align: center; padding: 2rem 0; }
.filters { display: flex; flex-wrap: wrap; gap: 0.5rem; margin: 1rem 0; }
.filters input[type=search] { flex: 1 1 16rem; padding: 0.5rem; }
.hidden { display: none; }
";

/// Client-side filter script. It only toggles card visibility and the count
/// line; the server-rendered order is never changed, and the matching rules
/// mirror the engine (exact type, exact extracted year, case-insensitive
/// substring over the search blob).
pub const SCRIPT: &str = r#"document.addEventListener('DOMContentLoaded', function () {
  var search = document.getElementById('search');
  if (!search) return;
  var type = document.getElementById('type');
  var year = document.getElementById('year');
  var clear = document.getElementById('clear');
  var cards = Array.prototype.slice.call(document.querySelectorAll('article.reference'));
  var count = document.querySelector('.result-count');
  var noMatch = document.getElementById('no-match');

  function update() {
    var term = search.value.toLowerCase();
    var visible = 0;
    cards.forEach(function (card) {
      var ok = (!type.value || card.dataset.type === type.value)
        && (!year.value || card.dataset.year === year.value)
        && (!term || card.dataset.search.indexOf(term) !== -1);
      card.classList.toggle('hidden', !ok);
      if (ok) visible++;
    });
    var noun = cards.length === 1 ? 'referencia' : 'referencias';
    count.textContent = 'Mostrando ' + visible + ' de ' + cards.length + ' ' + noun;
    noMatch.classList.toggle('hidden', visible > 0);
  }

  search.addEventListener('input', update);
  type.addEventListener('change', update);
  year.addEventListener('change', update);
  clear.addEventListener('click', function () {
    search.value = '';
    type.value = '';
    year.value = '';
    update();
  });
});
"#;

#[cfg(test)]
mod tests {
    use super::*;

    fn render_section(input: &str, sort: refolio_core::SortMode) -> String {
        let references: Vec<Reference> = refolio_bibtex::parse(input)
            .unwrap()
            .into_iter()
            .map(Reference::from)
            .collect();
        let collection = Collection {
            name: "test".to_string(),
            references,
        };
        let site = SiteConfig::default();
        let section = SectionConfig {
            slug: "referencias".to_string(),
            title: "Referencias".to_string(),
            folder: None,
            sort,
        };
        let mut buf = Vec::new();
        write_section_page(&mut buf, &site, &section, &collection).unwrap();
        String::from_utf8(buf).unwrap()
    }

    #[test]
    fn escapes_html() {
        assert_eq!(escape_html("a < b & \"c\""), "a &lt; b &amp; &quot;c&quot;");
    }

    #[test]
    fn empty_collection_shows_no_data_message() {
        let html = render_section("", refolio_core::SortMode::AuthorYear);
        assert!(html.contains(MSG_NO_REFERENCES));
        assert!(html.contains("Mostrando 0 de 0 referencias"));
    }

    #[test]
    fn card_renders_cleaned_fields() {
        let html = render_section(
            r#"@book{K,
                title = {Historia de las {Matemáticas} <tomo 1>},
                author = {Pérez, Ana},
                publisher = {Ediciones Sur},
                isbn = {978-1},
                year = {2020},
            }"#,
            refolio_core::SortMode::AuthorYear,
        );
        assert!(html.contains("Historia de las Matemáticas &lt;tomo 1&gt;"));
        assert!(html.contains("<strong>Autores:</strong> <em>Pérez, Ana</em>"));
        assert!(html.contains("Libro"));
        assert!(html.contains("<strong>Editorial:</strong> Ediciones Sur"));
        assert!(html.contains("<strong>ISBN:</strong> 978-1"));
        assert!(html.contains("Mostrando 1 de 1 referencia"));
    }

    #[test]
    fn filter_form_enumerates_observed_facets() {
        let html = render_section(
            r#"
@book{b, title = {B}, year = {2020}}
@article{a, title = {A}, date = {2023-01-01}, abstract = {Redes profundas}}
"#,
            refolio_core::SortMode::AuthorYear,
        );
        assert!(html.contains("<option value=\"\">Todos los tipos</option>"));
        assert!(html.contains("<option value=\"article\">Artículo</option>"));
        assert!(html.contains("<option value=\"book\">Libro</option>"));
        // Years descending after the catch-all
        let y2023 = html.find("<option value=\"2023\">").unwrap();
        let y2020 = html.find("<option value=\"2020\">").unwrap();
        assert!(y2023 < y2020);
        // Cards carry the attributes the filter script matches on
        assert!(html.contains("data-type=\"book\" data-year=\"2020\""));
        assert!(html.contains("data-search=\"a\nredes profundas\""));
        assert!(html.contains("id=\"no-match\""));
    }

    #[test]
    fn untitled_record_gets_placeholder() {
        let html = render_section(
            "@misc{K, author = {Solo, Autor}}",
            refolio_core::SortMode::AuthorYear,
        );
        assert!(html.contains("Sin título"));
    }
}
