//! Footnote updating
//!
//! Expands new inline footnotes and renumbers every footnote reference in
//! document order, then rewrites the footnote block so its bodies follow the
//! same order.
//!
//! # Format
//!
//! Existing references appear in body text as:
//!
//! ```text
//! ["(#note-title-r1). ^1^":#note-title-1]
//! ```
//!
//! where `note-title` is a prefix unique to the post, so that ids stay unique
//! when several posts share a page, and `1` is any nonnegative integer.
//!
//! Their targets open each footnote body inside the footnote block:
//!
//! ```text
//! <div class="footnote">
//! ["(#note-title-1). ^1^":#note-title-r1]Footnote text.
//! </div>
//! ```
//!
//! New notes are written inline where the reference belongs:
//!
//! ```text
//! [#note-title: New footnote text here.]
//! ```
//!
//! # Passes
//!
//! The first pass replaces each new note with a placeholder reference
//! (numeral 0), then numbers every reference on the line from a running
//! count. Each reference claims the next footnote slot: new notes fill their
//! slot with their text right away, existing references leave it waiting for
//! the target carrying their original numeral. Inside the footnote block each
//! target, plus any following lines up to the next target, becomes the body
//! of the slot waiting for it.
//!
//! The second pass drops the original footnote block contents and writes the
//! slots out in order just before the closing marker.
//!
//! Nested footnotes are not supported. Every reference must come before the
//! footnote block, and the block must be closed before the document ends.

use crate::post::config::FootnoteConfig;
use crate::post::error::{Pass, UpdateError};
use crate::post::matching::{
    ambiguous_new_notes, find_new_note, find_reference, line_body, match_target,
    render_reference, render_target, Ambiguity, Target, PLACEHOLDER,
};
use crate::post::sequence::is_sorted;
use crate::post::updater::Updater;
use log::{debug, warn};
use std::collections::VecDeque;

/// The body of one footnote, at its position in the final numbering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FootnoteEntry {
    /// A note that was already numbered in the input. `body` stays empty until
    /// the footnote block supplies the target carrying `original`.
    Existing {
        original: usize,
        body: Option<String>,
    },
    /// A note expanded from inline text during this update.
    New { body: String },
}

impl FootnoteEntry {
    pub fn body(&self) -> Option<&str> {
        match self {
            FootnoteEntry::Existing { body, .. } => body.as_deref(),
            FootnoteEntry::New { body } => Some(body),
        }
    }

    fn is_waiting_for(&self, numeral: usize) -> bool {
        matches!(self, FootnoteEntry::Existing { original, body: None } if *original == numeral)
    }
}

/// Expands new footnotes and renumbers existing ones.
///
/// Build one per document; the updater carries the state of a single update.
#[derive(Debug, Clone)]
pub struct FootnoteUpdater {
    open_marker: String,
    close_marker: String,
    /// Footnote number `n` lives at index `n - 1`.
    notes: Vec<FootnoteEntry>,
    /// Text of new notes expanded on the current line, waiting for their number.
    new_notes: VecDeque<String>,
    /// Original numerals of existing references, in document order.
    existing_order: Vec<usize>,
    num_new_notes: usize,
    in_footnote_block: bool,
    saw_footnote_block: bool,
    /// Slot receiving continuation lines of the footnote body being read.
    current: Option<usize>,
}

impl FootnoteUpdater {
    pub fn new(config: &FootnoteConfig) -> Self {
        Self {
            open_marker: config.open_marker.clone(),
            close_marker: config.close_marker.clone(),
            notes: Vec::new(),
            new_notes: VecDeque::new(),
            existing_order: Vec::new(),
            num_new_notes: 0,
            in_footnote_block: false,
            saw_footnote_block: false,
            current: None,
        }
    }

    /// Footnotes recorded so far; footnote `n` is at index `n - 1`.
    pub fn entries(&self) -> &[FootnoteEntry] {
        &self.notes
    }

    pub fn new_note_count(&self) -> usize {
        self.num_new_notes
    }

    /// Original numerals of the existing references, in the order they appeared.
    pub fn existing_order(&self) -> &[usize] {
        &self.existing_order
    }

    /// Expand new notes on a body text line, then number its references.
    fn renumber_line(&mut self, mut line: String) -> Result<String, UpdateError> {
        let mut from = 0;
        while let Some((span, title, text)) = find_new_note(&line, from)
            .map(|note| (note.span, note.title.to_string(), note.text.to_string()))
        {
            let placeholder = render_reference(&title, PLACEHOLDER);
            line.replace_range(span.clone(), &placeholder);
            from = span.start + placeholder.len();
            self.new_notes.push_back(text);
        }

        for found in ambiguous_new_notes(&line) {
            let reason = match found.reason {
                Ambiguity::MissingSeparator => "is not followed by \": \"",
                Ambiguity::Unclosed => "has no closing bracket",
            };
            warn!(
                "'[#{}' at byte {} {}; left unchanged",
                found.title, found.offset, reason
            );
        }

        let mut from = 0;
        while let Some((span, title, numeral, is_new)) = find_reference(&line, from)?.map(|reference| {
            let is_new = reference.is_placeholder();
            (reference.span, reference.title.to_string(), reference.numeral, is_new)
        }) {
            if self.saw_footnote_block {
                return Err(UpdateError::ReferenceAfterBlock { title });
            }
            let n = self.notes.len() + 1;
            let reference = render_reference(&title, n);
            line.replace_range(span.clone(), &reference);
            from = span.start + reference.len();

            if is_new {
                let text = self
                    .new_notes
                    .pop_front()
                    .ok_or_else(|| UpdateError::OrphanPlaceholder {
                        title: title.clone(),
                    })?;
                debug!("new footnote {} for '{}'", n, title);
                self.notes.push(FootnoteEntry::New {
                    body: format!("{}{}\n", render_target(&title, n), text),
                });
                self.num_new_notes += 1;
            } else {
                if numeral != n {
                    debug!("footnote {} renumbered to {}", numeral, n);
                }
                self.existing_order.push(numeral);
                self.notes.push(FootnoteEntry::Existing {
                    original: numeral,
                    body: None,
                });
            }
        }
        Ok(line)
    }

    /// Attach a target line to the first slot still waiting for its numeral.
    fn resolve_target(&mut self, line: &str, target: Target<'_>) -> Result<(), UpdateError> {
        let index = self
            .notes
            .iter()
            .position(|entry| entry.is_waiting_for(target.numeral))
            .ok_or(UpdateError::UnresolvedTarget {
                index: target.numeral,
                parsed: self.notes.len(),
            })?;
        let n = index + 1;
        self.notes[index] = FootnoteEntry::Existing {
            original: target.numeral,
            body: Some(format!(
                "{}{}",
                render_target(target.title, n),
                &line[target.span.end..]
            )),
        };
        self.current = Some(index);
        Ok(())
    }

    fn close_block(&mut self) -> Result<(), UpdateError> {
        self.in_footnote_block = false;
        self.current = None;
        let originals = self.waiting_originals();
        if !originals.is_empty() {
            return Err(UpdateError::MissingTargets { originals });
        }
        debug!("footnote block closed with {} notes", self.notes.len());
        Ok(())
    }

    /// Original numerals of existing references that have no body yet.
    fn waiting_originals(&self) -> Vec<usize> {
        self.notes
            .iter()
            .filter_map(|entry| match entry {
                FootnoteEntry::Existing {
                    original,
                    body: None,
                } => Some(*original),
                _ => None,
            })
            .collect()
    }

    /// Render every slot, one blank line between bodies.
    fn write_block(&self, extra: &mut String) -> Result<(), UpdateError> {
        let mut bodies = Vec::with_capacity(self.notes.len());
        for entry in &self.notes {
            let body = entry.body().ok_or_else(|| UpdateError::MissingTargets {
                originals: self.waiting_originals(),
            })?;
            bodies.push(trim_trailing_blank_lines(body));
        }
        if !bodies.is_empty() {
            extra.push_str(&bodies.join("\n\n"));
            extra.push('\n');
        }
        Ok(())
    }
}

impl Default for FootnoteUpdater {
    fn default() -> Self {
        Self::new(&FootnoteConfig::default())
    }
}

impl Updater for FootnoteUpdater {
    fn first_pass(&mut self, line: String, _extra: &mut String) -> Result<String, UpdateError> {
        let body = line_body(&line);
        if body == self.open_marker {
            self.in_footnote_block = true;
            self.saw_footnote_block = true;
            self.current = None;
            debug!("footnote block opened after {} notes", self.notes.len());
            return Ok(line);
        }

        if !self.in_footnote_block {
            return self.renumber_line(line);
        }

        if let Some(target) = match_target(&line)? {
            self.resolve_target(&line, target)?;
        } else if body == self.close_marker {
            self.close_block()?;
        } else if let Some(index) = self.current {
            if let FootnoteEntry::Existing {
                body: Some(text), ..
            } = &mut self.notes[index]
            {
                text.push_str(&line);
            }
        }
        Ok(line)
    }

    fn second_pass(&mut self, line: String, extra: &mut String) -> Result<String, UpdateError> {
        let body = line_body(&line);
        if body == self.open_marker {
            self.in_footnote_block = true;
            return Ok(line);
        }
        if !self.in_footnote_block {
            return Ok(line);
        }
        if body == self.close_marker {
            self.in_footnote_block = false;
            self.write_block(extra)?;
            return Ok(line);
        }
        Ok(String::new())
    }

    fn end_pass(&mut self, pass: Pass, _extra: &mut String) -> Result<(), UpdateError> {
        if pass == Pass::First && self.in_footnote_block {
            return Err(UpdateError::UnclosedFootnoteBlock {
                marker: self.close_marker.clone(),
            });
        }
        self.in_footnote_block = false;
        self.current = None;
        Ok(())
    }

    fn summary(&self) -> String {
        if self.num_new_notes != 0 && !self.saw_footnote_block {
            warn!(
                "{} new footnote(s) expanded but no '{}' block found",
                self.num_new_notes, self.open_marker
            );
        }

        let mut msg = String::new();
        if self.num_new_notes != 0 {
            let plural = if self.num_new_notes == 1 { "" } else { "s" };
            msg = format!("{} new footnote{}", self.num_new_notes, plural);
        }
        if !is_sorted(&self.existing_order) {
            if !msg.is_empty() {
                msg.push_str(", ");
            }
            msg.push_str("existing footnotes reordered");
        }
        msg
    }
}

/// Drop trailing lines that hold only whitespace, and the final newline.
fn trim_trailing_blank_lines(body: &str) -> &str {
    let mut rest = body.trim_end_matches('\n');
    while let Some(last_newline) = rest.rfind('\n') {
        if !rest[last_newline + 1..].trim().is_empty() {
            break;
        }
        rest = rest[..last_newline].trim_end_matches('\n');
    }
    rest
}
