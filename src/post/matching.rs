//! Line recognizers
//!
//! Recognizes the Textile forms the updaters manipulate, one line at a time:
//!
//! - Footnote reference, anywhere in body text:
//!   `["(#note-title-r1). ^1^":#note-title-1]`
//! - Footnote target, at the start of a line inside the footnote block:
//!   `["(#note-title-1). ^1^":#note-title-r1]Note text`
//! - New inline note, anywhere in body text: `[#note-title: Note text]`
//! - Section headline: `h3(section#headline-id). Headline text`
//!
//! Recognizers never modify their input. They report byte offsets into the
//! line they were given, so callers that substitute text must search again
//! from an adjusted offset.
//!
//! References, targets and headlines are plain regular expressions. New notes
//! may contain balanced bracket pairs (`[#t: see ["this":http://x] too]`),
//! which a regular expression cannot pair up, so they are found with an
//! explicit depth-counting scan.

use crate::post::error::UpdateError;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};
use std::ops::Range;

/// Numeral carried by a reference that was just expanded from a new note and
/// has not been numbered yet.
pub const PLACEHOLDER: usize = 0;

/// First group: note title; second group: note numeral
static REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"\["\(#([a-z0-9-]+)-r([0-9]+)\)\. \^[0-9]+\^":#[a-z0-9-]+-[0-9]+\]"#).unwrap()
});

/// First group: note title; second group: note numeral
static TARGET: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r#"^\["\(#([a-z0-9-]+)-([0-9]+)\)\. \^[0-9]+\^":#[a-z0-9-]+-r[0-9]+\]"#).unwrap()
});

/// First group: heading level; second group: anchor id; third group: display text
static HEADLINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^h([1-6])\(section#([a-zA-Z0-9-]+)\)\. (.+)").unwrap());

/// Group: link text
static LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r#"\[?"([^"]+)":[^ ]+\]?"#).unwrap());

/// Characters that must not survive in a stripped headline
static HEADLINE_MARKUP: Lazy<Regex> = Lazy::new(|| Regex::new(r#"["\[\]]"#).unwrap());

/// An existing footnote reference in body text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference<'a> {
    pub span: Range<usize>,
    pub title: &'a str,
    pub numeral: usize,
}

impl Reference<'_> {
    pub fn is_placeholder(&self) -> bool {
        self.numeral == PLACEHOLDER
    }
}

/// The marker opening a footnote body inside the footnote block
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Target<'a> {
    /// Always starts at 0; the body text follows `span.end`
    pub span: Range<usize>,
    pub title: &'a str,
    pub numeral: usize,
}

/// A new footnote written inline, not yet expanded into a reference
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewNote<'a> {
    pub span: Range<usize>,
    pub title: &'a str,
    pub text: &'a str,
}

/// Why a `[#title` opener was not recognized as a new note
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Ambiguity {
    /// The title is not followed by `": "`
    MissingSeparator,
    /// No `]` balances the opening bracket on this line
    Unclosed,
}

/// A `[#title` opener that looks like a new note but is not one
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmbiguousNote<'a> {
    pub offset: usize,
    pub title: &'a str,
    pub reason: Ambiguity,
}

/// A section headline
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Headline<'a> {
    pub level: u8,
    pub id: &'a str,
    pub text: &'a str,
}

enum Opener<'a> {
    NotAnOpener,
    Ambiguous(AmbiguousNote<'a>),
    Note(NewNote<'a>),
}

/// The line without its trailing newline.
pub fn line_body(line: &str) -> &str {
    line.strip_suffix('\n').unwrap_or(line)
}

/// Find the first reference starting at or after byte offset `from`.
pub fn find_reference(line: &str, from: usize) -> Result<Option<Reference<'_>>, UpdateError> {
    let Some(caps) = line.get(from..).and_then(|rest| REFERENCE.captures(rest)) else {
        return Ok(None);
    };
    let whole = span_of(&caps);
    Ok(Some(Reference {
        span: from + whole.start..from + whole.end,
        title: group(&caps, 1),
        numeral: parse_numeral(group(&caps, 2))?,
    }))
}

/// Match a footnote target at the start of the line.
pub fn match_target(line: &str) -> Result<Option<Target<'_>>, UpdateError> {
    let Some(caps) = TARGET.captures(line) else {
        return Ok(None);
    };
    Ok(Some(Target {
        span: span_of(&caps),
        title: group(&caps, 1),
        numeral: parse_numeral(group(&caps, 2))?,
    }))
}

// Every group in REFERENCE and TARGET is mandatory, so a match always has them.
fn group<'h>(caps: &Captures<'h>, index: usize) -> &'h str {
    caps.get(index).map_or("", |m| m.as_str())
}

fn span_of(caps: &Captures<'_>) -> Range<usize> {
    caps.get(0).map_or(0..0, |m| m.range())
}

fn parse_numeral(digits: &str) -> Result<usize, UpdateError> {
    digits.parse().map_err(|_| UpdateError::NumeralOutOfRange {
        numeral: digits.to_string(),
    })
}

/// Find the first new note whose opening bracket is at or after byte offset `from`.
pub fn find_new_note(line: &str, from: usize) -> Option<NewNote<'_>> {
    let rest = line.get(from..)?;
    rest.match_indices("[#")
        .find_map(|(offset, _)| match parse_opener(line, from + offset) {
            Opener::Note(note) => Some(note),
            _ => None,
        })
}

/// Every `[#title` opener on the line that is not a well-formed new note.
pub fn ambiguous_new_notes(line: &str) -> Vec<AmbiguousNote<'_>> {
    line.match_indices("[#")
        .filter_map(|(offset, _)| match parse_opener(line, offset) {
            Opener::Ambiguous(found) => Some(found),
            _ => None,
        })
        .collect()
}

fn parse_opener(line: &str, start: usize) -> Opener<'_> {
    let bytes = line.as_bytes();
    let title_start = start + 2;
    let title_len = bytes[title_start..]
        .iter()
        .take_while(|&&b| b.is_ascii_lowercase() || b.is_ascii_digit() || b == b'-')
        .count();
    if title_len == 0 {
        return Opener::NotAnOpener;
    }
    let title_end = title_start + title_len;
    let title = &line[title_start..title_end];

    if !line[title_end..].starts_with(": ") {
        return Opener::Ambiguous(AmbiguousNote {
            offset: start,
            title,
            reason: Ambiguity::MissingSeparator,
        });
    }

    let text_start = title_end + 2;
    let mut depth = 1usize;
    for (i, &b) in bytes.iter().enumerate().skip(text_start) {
        match b {
            b'[' => depth += 1,
            b']' => {
                depth -= 1;
                if depth == 0 {
                    if i == text_start {
                        return Opener::NotAnOpener;
                    }
                    return Opener::Note(NewNote {
                        span: start..i + 1,
                        title,
                        text: &line[text_start..i],
                    });
                }
            }
            _ => {}
        }
    }
    Opener::Ambiguous(AmbiguousNote {
        offset: start,
        title,
        reason: Ambiguity::Unclosed,
    })
}

/// Match a section headline of any level 1-6.
pub fn match_headline(line: &str) -> Option<Headline<'_>> {
    let caps = HEADLINE.captures(line_body(line))?;
    Some(Headline {
        level: caps.get(1)?.as_str().parse().ok()?,
        id: caps.get(2)?.as_str(),
        text: caps.get(3)?.as_str(),
    })
}

/// The text following a table of contents marker, or `None` if the line does
/// not start with the marker. One space after the marker is dropped.
pub fn after_toc_marker<'a>(line: &'a str, marker: &str) -> Option<&'a str> {
    let rest = line.strip_prefix(marker)?;
    Some(rest.strip_prefix(' ').unwrap_or(rest))
}

/// `["(#title-rN). ^N^":#title-N]`
pub fn render_reference(title: &str, n: usize) -> String {
    format!(r#"["(#{title}-r{n}). ^{n}^":#{title}-{n}]"#)
}

/// `["(#title-N). ^N^":#title-rN]`
pub fn render_target(title: &str, n: usize) -> String {
    format!(r#"["(#{title}-{n}). ^{n}^":#{title}-r{n}]"#)
}

/// Reduce headline text to plain display text: references and new notes are
/// removed and links collapse to their text.
pub fn strip_headline_markup(text: &str) -> String {
    let mut plain = REFERENCE.replace_all(text, "").into_owned();
    while let Some(note) = find_new_note(&plain, 0) {
        plain.replace_range(note.span, "");
    }
    LINK.replace_all(&plain, "${1}").into_owned()
}

/// True if quotes or brackets remain, meaning some link or footnote syntax
/// could not be stripped.
pub fn contains_markup(text: &str) -> bool {
    HEADLINE_MARKUP.is_match(text)
}
