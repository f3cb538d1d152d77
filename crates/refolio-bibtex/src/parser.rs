//! BibTeX parser built on nom primitives.
//!
//! The grammar follows standard BibTeX: `@type{key, field = value, ...}`
//! entries with braced, quoted, or bare-number values, nested braces inside
//! values, `#` concatenation, `@string` macros, `@preamble`, `@comment`,
//! and `%` line comments. Field keys are lower-cased as they are read.
//!
//! Parsing is strict: the first malformed entry aborts with a [`ParseError`]
//! naming the line it occurred on. Text between entries that is not part of
//! any `@` construct is ignored, as BibTeX tools traditionally do.

use nom::{
    branch::alt,
    bytes::complete::take_while1,
    character::complete::{char, multispace0},
    combinator::map,
    sequence::{delimited, preceded},
    IResult,
};
use std::collections::HashMap;

use crate::entry::{Entry, EntryType};

/// Error type for parsing failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ParseError {
    #[error("syntax error at line {line}: {message}")]
    Syntax { line: u32, message: String },
}

/// Parse a BibTeX document into its entries.
///
/// `@string` definitions are applied to later field values, `@preamble` and
/// `@comment` blocks are consumed and discarded.
pub fn parse(input: &str) -> Result<Vec<Entry>, ParseError> {
    let mut entries = Vec::new();
    let mut strings: HashMap<String, String> = HashMap::new();
    let mut remaining = input;

    loop {
        remaining = skip_junk(remaining);
        if remaining.is_empty() {
            break;
        }

        match parse_at_block(remaining, &strings) {
            Ok((rest, block)) => {
                match block {
                    AtBlock::Entry(entry) => entries.push(entry),
                    AtBlock::StringDef(key, value) => {
                        strings.insert(key, value);
                    }
                    AtBlock::Ignored => {}
                }
                remaining = rest;
            }
            Err(_) => {
                return Err(ParseError::Syntax {
                    line: line_of(input, remaining),
                    message: "malformed entry".to_string(),
                });
            }
        }
    }

    Ok(entries)
}

/// Result of parsing one `@` construct.
enum AtBlock {
    Entry(Entry),
    StringDef(String, String),
    /// @preamble or @comment
    Ignored,
}

/// 1-based line number of `at` within `input`.
fn line_of(input: &str, at: &str) -> u32 {
    let consumed = input.len() - at.len();
    input[..consumed].matches('\n').count() as u32 + 1
}

/// Skip whitespace, `%` line comments, and stray text before the next `@`.
fn skip_junk(input: &str) -> &str {
    let mut pos = 0;
    let bytes = input.as_bytes();

    while pos < bytes.len() {
        if bytes[pos].is_ascii_whitespace() {
            pos += 1;
        } else if bytes[pos] == b'%' {
            while pos < bytes.len() && bytes[pos] != b'\n' {
                pos += 1;
            }
        } else if bytes[pos] == b'@' {
            break;
        } else {
            // Inter-entry text, ignored
            pos += 1;
        }
    }

    &input[pos..]
}

/// Parse one `@` construct: entry, @string, @preamble, or @comment.
fn parse_at_block<'a>(
    input: &'a str,
    strings: &HashMap<String, String>,
) -> IResult<&'a str, AtBlock> {
    let (rest, _) = char('@')(input)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, type_code) = take_while1(|c: char| c.is_ascii_alphanumeric())(rest)?;

    match type_code.to_lowercase().as_str() {
        "string" => {
            let (rest, (key, value)) = parse_string_definition(rest, strings)?;
            Ok((rest, AtBlock::StringDef(key, value)))
        }
        "preamble" => {
            let (rest, _) = parse_preamble(rest, strings)?;
            Ok((rest, AtBlock::Ignored))
        }
        "comment" => {
            let (rest, _) = parse_comment_body(rest)?;
            Ok((rest, AtBlock::Ignored))
        }
        _ => {
            let (rest, entry) = parse_entry_body(rest, type_code, strings)?;
            Ok((rest, AtBlock::Entry(entry)))
        }
    }
}

/// Parse a `@string{key = value}` definition.
fn parse_string_definition<'a>(
    input: &'a str,
    strings: &HashMap<String, String>,
) -> IResult<&'a str, (String, String)> {
    delimited(
        preceded(multispace0, char('{')),
        |i| parse_assignment(i, strings),
        preceded(multispace0, char('}')),
    )(input)
}

/// Parse a `@preamble{...}` declaration.
fn parse_preamble<'a>(
    input: &'a str,
    strings: &HashMap<String, String>,
) -> IResult<&'a str, String> {
    delimited(
        preceded(multispace0, char('{')),
        |i| parse_field_value(i, strings),
        preceded(multispace0, char('}')),
    )(input)
}

/// Consume a `@comment` body: a braced block, or the rest of the line.
fn parse_comment_body(input: &str) -> IResult<&str, ()> {
    let (rest, _) = multispace0(input)?;
    if rest.starts_with('{') {
        let (rest, _) = braced_content(rest)?;
        Ok((rest, ()))
    } else {
        let pos = rest.find('\n').unwrap_or(rest.len());
        Ok((&rest[pos..], ()))
    }
}

/// Parse the `{key, field = value, ...}` body of an entry.
fn parse_entry_body<'a>(
    input: &'a str,
    type_code: &str,
    strings: &HashMap<String, String>,
) -> IResult<&'a str, Entry> {
    let (rest, _) = multispace0(input)?;
    let (rest, _) = char('{')(rest)?;
    let (rest, _) = multispace0(rest)?;

    let (rest, cite_key) =
        take_while1(|c: char| c.is_ascii_alphanumeric() || "_-:./+".contains(c))(rest)?;
    let (rest, _) = multispace0(rest)?;
    let (rest, _) = char(',')(rest)?;

    let (rest, fields) = parse_fields(rest, strings)?;

    let (rest, _) = multispace0(rest)?;
    let (rest, _) = char('}')(rest)?;

    let mut entry = Entry::new(cite_key.to_string(), EntryType::from_code(type_code));
    for (key, value) in fields {
        entry.set_field(key, value);
    }

    Ok((rest, entry))
}

/// Parse the field list of an entry, tolerating a trailing comma.
fn parse_fields<'a>(
    input: &'a str,
    strings: &HashMap<String, String>,
) -> IResult<&'a str, Vec<(String, String)>> {
    let mut fields = Vec::new();
    let mut remaining = input;

    loop {
        let (rest, _) = multispace0(remaining)?;

        if rest.starts_with('}') {
            return Ok((rest, fields));
        }

        let (rest, (key, value)) = parse_assignment(rest, strings)?;
        fields.push((key, value));

        let (rest, _) = multispace0(rest)?;
        if let Some(stripped) = rest.strip_prefix(',') {
            remaining = stripped;
        } else {
            // No comma: next concrete char must close the entry
            return Ok((rest, fields));
        }
    }
}

/// Parse one `key = value` assignment, the shape shared by entry fields and
/// `@string` bodies.
fn parse_assignment<'a>(
    input: &'a str,
    strings: &HashMap<String, String>,
) -> IResult<&'a str, (String, String)> {
    let (rest, key) = preceded(multispace0, identifier)(input)?;
    let (rest, _) = preceded(multispace0, char('='))(rest)?;
    let (rest, value) = parse_field_value(rest, strings)?;
    Ok((rest, (key.to_string(), value)))
}

/// A field key or `@string` macro name.
fn identifier(input: &str) -> IResult<&str, &str> {
    take_while1(|c: char| c.is_ascii_alphanumeric() || c == '_' || c == '-')(input)
}

/// Parse a field value: braced, quoted, bare number, or string reference,
/// possibly concatenated with `#`.
fn parse_field_value<'a>(
    input: &'a str,
    strings: &HashMap<String, String>,
) -> IResult<&'a str, String> {
    let mut result = String::new();
    let mut remaining = input;

    loop {
        let (rest, _) = multispace0(remaining)?;

        let (rest, part) = alt((
            parse_braced_value,
            parse_quoted_value,
            map(take_while1(|c: char| c.is_ascii_digit()), |s: &str| {
                s.to_string()
            }),
            map(identifier, |s: &str| {
                strings.get(s).cloned().unwrap_or_else(|| s.to_string())
            }),
        ))(rest)?;

        result.push_str(&part);

        let (rest, _) = multispace0(rest)?;
        if let Some(stripped) = rest.strip_prefix('#') {
            remaining = stripped;
        } else {
            return Ok((rest, result));
        }
    }
}

/// Parse a braced value, dropping the outer braces only.
fn parse_braced_value(input: &str) -> IResult<&str, String> {
    let (rest, content) = braced_content(input)?;
    let inner = &content[1..content.len() - 1];
    Ok((rest, inner.to_string()))
}

/// Scan a `{...}` block, counting nesting depth, honoring `\` escapes.
fn braced_content(input: &str) -> IResult<&str, &str> {
    if !input.starts_with('{') {
        return Err(nom_error(input));
    }

    let mut depth = 0usize;
    let mut chars = input.char_indices();
    while let Some((idx, c)) = chars.next() {
        match c {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    let end = idx + 1;
                    return Ok((&input[end..], &input[..end]));
                }
            }
            '\\' => {
                // An escaped brace never affects the depth
                chars.next();
            }
            _ => {}
        }
    }

    Err(nom_error(input))
}

/// Parse a quoted value. Braces inside quotes protect embedded `"`.
fn parse_quoted_value(input: &str) -> IResult<&str, String> {
    if !input.starts_with('"') {
        return Err(nom_error(input));
    }

    let mut result = String::new();
    let mut brace_depth = 0usize;
    let mut chars = input.char_indices().skip(1).peekable();

    while let Some((idx, c)) = chars.next() {
        match c {
            '"' if brace_depth == 0 => {
                return Ok((&input[idx + 1..], result));
            }
            '{' => {
                brace_depth += 1;
                result.push('{');
            }
            '}' => {
                brace_depth = brace_depth.saturating_sub(1);
                result.push('}');
            }
            '\\' => {
                result.push('\\');
                if let Some((_, escaped)) = chars.next() {
                    result.push(escaped);
                }
            }
            c => result.push(c),
        }
    }

    Err(nom_error(input))
}

fn nom_error(input: &str) -> nom::Err<nom::error::Error<&str>> {
    nom::Err::Error(nom::error::Error::new(input, nom::error::ErrorKind::Char))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_simple_entry() {
        let input = r#"
@article{Smith2024,
    author = {John Smith},
    title = {A Great Paper},
    year = {2024},
    journaltitle = {Nature},
}
"#;
        let entries = parse(input).unwrap();
        assert_eq!(entries.len(), 1);

        let entry = &entries[0];
        assert_eq!(entry.cite_key, "Smith2024");
        assert_eq!(entry.entry_type, EntryType::Article);
        assert_eq!(entry.author(), Some("John Smith"));
        assert_eq!(entry.title(), Some("A Great Paper"));
        assert_eq!(entry.year(), Some("2024"));
        assert_eq!(entry.get_field("journaltitle"), Some("Nature"));
    }

    #[test]
    fn parse_quoted_values() {
        let input = r#"
@article{Test2024,
    author = "Jane Doe",
    title = "Testing \"Quotes\"",
}
"#;
        let entries = parse(input).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].author(), Some("Jane Doe"));
    }

    #[test]
    fn parse_nested_braces() {
        let input = r#"
@article{Test2024,
    title = {A {B}ook about {LaTeX}},
}
"#;
        let entries = parse(input).unwrap();
        assert_eq!(entries[0].title(), Some("A {B}ook about {LaTeX}"));
    }

    #[test]
    fn parse_multiline_value() {
        let input = "@misc{m, note = {spans\ntwo lines}}";
        let entries = parse(input).unwrap();
        assert_eq!(entries[0].get_field("note"), Some("spans\ntwo lines"));
    }

    #[test]
    fn parse_string_definitions() {
        let input = r#"
@string{nature = "Nature"}
@article{Test2024,
    journaltitle = nature,
}
"#;
        let entries = parse(input).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].get_field("journaltitle"), Some("Nature"));
    }

    #[test]
    fn parse_concatenation() {
        let input = r#"
@string{pre = "Jour"}
@article{T, journaltitle = pre # "nal of " # {Tests}}
"#;
        let entries = parse(input).unwrap();
        assert_eq!(entries[0].get_field("journaltitle"), Some("Journal of Tests"));
    }

    #[test]
    fn parse_multiple_entries() {
        let input = r#"
@article{First2024,
    title = {First Paper},
}

@book{Second2024,
    title = {Second Book},
}
"#;
        let entries = parse(input).unwrap();
        assert_eq!(entries.len(), 2);
        assert_eq!(entries[0].cite_key, "First2024");
        assert_eq!(entries[1].cite_key, "Second2024");
    }

    #[test]
    fn field_keys_lowercased() {
        let input = "@Article{K, TITLE = {T}, Author = {A}}";
        let entries = parse(input).unwrap();
        assert_eq!(entries[0].fields[0].key, "title");
        assert_eq!(entries[0].fields[1].key, "author");
    }

    #[test]
    fn duplicate_fields_last_wins() {
        let input = "@misc{K, year = {2020}, year = {2021}}";
        let entries = parse(input).unwrap();
        assert_eq!(entries[0].year(), Some("2021"));
        assert_eq!(entries[0].fields.len(), 1);
    }

    #[test]
    fn comments_and_preamble_skipped() {
        let input = r#"
% a line comment
@preamble{{\newcommand{\x}{y}}}
@comment{anything goes here}
@misc{K, title = {T}}
"#;
        let entries = parse(input).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].cite_key, "K");
    }

    #[test]
    fn malformed_entry_fails_with_line() {
        let input = "@article{Good, title = {T}}\n@article{Bad, title = {unclosed\n";
        let err = parse(input).unwrap_err();
        let ParseError::Syntax { line, .. } = err;
        assert_eq!(line, 2);
    }

    #[test]
    fn escaped_braces_do_not_close_values() {
        let input = r"@misc{K, note = {left \{ right \} done}}";
        let entries = parse(input).unwrap();
        assert_eq!(entries[0].get_field("note"), Some(r"left \{ right \} done"));
    }

    #[test]
    fn trailing_comma_tolerated() {
        let input = "@misc{K, title = {T},}";
        let entries = parse(input).unwrap();
        assert_eq!(entries[0].title(), Some("T"));
    }
}
