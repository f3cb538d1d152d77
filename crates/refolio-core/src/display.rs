//! Display-time field normalization.
//!
//! BibTeX protects capitalization with `{...}` wrapping, and biblatex can
//! spell names in an extended `family=X, given=Y` form. Neither belongs in
//! rendered output, so both transformations happen here, at render time;
//! the stored records keep the raw values.

use lazy_static::lazy_static;
use regex::Regex;

lazy_static! {
    /// Innermost double-braced group.
    static ref DOUBLE_BRACE_RE: Regex = Regex::new(r"\{\{([^{}]*)\}\}").unwrap();
    /// Innermost single-braced group.
    static ref SINGLE_BRACE_RE: Regex = Regex::new(r"\{([^{}]*)\}").unwrap();
    static ref FAMILY_RE: Regex = Regex::new(r"family=([^,]+)").unwrap();
    static ref GIVEN_RE: Regex = Regex::new(r"given=([^,]+)").unwrap();
}

/// Default name cap for list views.
pub const NAME_CAP_LIST: usize = 3;
/// Name cap for the per-record cards.
pub const NAME_CAP_CARD: usize = 5;

/// Remove case-protection braces from a field value.
///
/// One pass unwraps every innermost `{{...}}` and then every innermost
/// `{...}`; passes repeat until a fixed point. Iterations are capped at the
/// input length so unbalanced input cannot loop; leftover unmatched braces
/// stay as-is.
pub fn strip_braces(text: &str) -> String {
    let mut current = text.to_string();

    for _ in 0..=text.len() {
        let pass = SINGLE_BRACE_RE
            .replace_all(&DOUBLE_BRACE_RE.replace_all(&current, "$1"), "$1")
            .into_owned();
        if pass == current {
            break;
        }
        current = pass;
    }

    current.trim().to_string()
}

/// Format an author or editor field for display.
///
/// Names separated by `" and "` are joined with `"; "`. The biblatex
/// extended form is reduced to `"Family, Given"`; the plain
/// `"Family, Given"` form passes through. At most `cap` names are shown,
/// followed by `" et al."` when more exist.
pub fn format_name_list(value: &str, cap: usize) -> String {
    if value.is_empty() {
        return String::new();
    }

    let clean = strip_braces(value);
    let names: Vec<String> = clean
        .split(" and ")
        .map(|person| format_single_name(person))
        .filter(|n| !n.is_empty())
        .collect();

    if names.len() > cap {
        format!("{} et al.", names[..cap].join("; "))
    } else {
        names.join("; ")
    }
}

/// Reduce one name to "Family, Given" if in extended form, else pass through.
fn format_single_name(person: &str) -> String {
    if let Some(family) = FAMILY_RE.captures(person).and_then(|c| c.get(1)) {
        let family = family.as_str().trim();
        let given = GIVEN_RE
            .captures(person)
            .and_then(|c| c.get(1))
            .map(|g| g.as_str().trim())
            .unwrap_or("");
        if given.is_empty() {
            family.to_string()
        } else {
            format!("{}, {}", family, given)
        }
    } else {
        person.trim().to_string()
    }
}
