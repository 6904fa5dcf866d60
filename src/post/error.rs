//! Error types for post updates
//!
//! Every error is fatal: the driver stops at the first one and produces no
//! output, since continuing would attach footnote text to the wrong reference
//! or write a broken table of contents entry.

use std::fmt;
use thiserror::Error;

/// Errors a processor raises while handling a line or finishing a pass
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpdateError {
    /// A footnote target names an original numeral that no unresolved reference holds
    #[error(
        "Only {parsed} references or new notes parsed, but expected more; look for malformed \
         new notes, or malformed or missing references for existing footnotes \
         (target declares footnote {index})"
    )]
    UnresolvedTarget { index: usize, parsed: usize },

    /// The footnote block closed before every existing reference found its target
    #[error("footnote block has no target for existing reference(s) {}", join_numerals(.originals))]
    MissingTargets { originals: Vec<usize> },

    /// A placeholder reference (numeral 0) appeared with no new note text waiting for it
    #[error("placeholder reference for '{title}' has no new note text")]
    OrphanPlaceholder { title: String },

    /// A footnote reference or new note appears after the footnote block closed
    #[error("footnote reference for '{title}' appears after the footnote block")]
    ReferenceAfterBlock { title: String },

    /// The document ended inside the footnote block
    #[error("footnote block is never closed with '{marker}'")]
    UnclosedFootnoteBlock { marker: String },

    /// A reference or target numeral does not fit in a machine word
    #[error("footnote numeral {numeral} is too large")]
    NumeralOutOfRange { numeral: String },

    /// Link or footnote markup survived stripping of a section headline
    #[error("Malformed link or footnote in section headline: {text}")]
    MalformedHeadline { text: String },
}

/// One of the two traversals the driver makes over a document
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Pass {
    First,
    Second,
}

impl fmt::Display for Pass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Pass::First => write!(f, "first"),
            Pass::Second => write!(f, "second"),
        }
    }
}

/// An [`UpdateError`] located at the pass and line where it was raised
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{pass} pass, line {line}: {source}")]
pub struct PassError {
    pub pass: Pass,
    /// 1-based line number within the document the pass was reading; errors
    /// raised once the pass has run out of lines carry the last line
    pub line: usize,
    #[source]
    pub source: UpdateError,
}

fn join_numerals(numerals: &[usize]) -> String {
    numerals
        .iter()
        .map(|n| n.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}
