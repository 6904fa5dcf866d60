//! Table of contents updating
//!
//! Rebuilds the table of contents paragraph from the section headlines of a
//! post, in document order. Only one table of contents per post is supported.
//!
//! # Format
//!
//! The table of contents is the paragraph starting with `p(toc).`, one
//! entry per line, ended by a blank line:
//!
//! ```text
//! p(toc). "Headline A":#post-a
//! "Headline B":#post-b
//! ```
//!
//! Headlines are read from lines of the form:
//!
//! ```text
//! h3(section#post-a). Headline A
//! ```
//!
//! where the id is usually prefixed with something unique to the post, to
//! avoid collisions when several posts are concatenated on one page.
//!
//! Headline text may contain links, footnote references and new notes; only
//! the display text goes into the table of contents:
//!
//! ```text
//! h3(section#post-link). Headline With "Link":http://example.com/ Embedded
//! h3(section#post-note). Headline With Footnote[#post-notes: Note text.]
//! ```
//!
//! become
//!
//! ```text
//! "Headline With Link Embedded":#post-link
//! "Headline With Footnote":#post-note
//! ```

use crate::post::config::TocConfig;
use crate::post::error::{Pass, UpdateError};
use crate::post::matching::{
    after_toc_marker, contains_markup, line_body, match_headline, strip_headline_markup,
};
use crate::post::sequence::{elements_equal, set_difference, set_intersection_unordered, sorted_copy};
use crate::post::updater::Updater;
use log::debug;

/// Rebuilds the table of contents from section headlines.
#[derive(Debug, Clone)]
pub struct TableOfContentsUpdater {
    marker: String,
    headline_levels: Vec<u8>,
    in_toc: bool,
    /// Entries of the table of contents found in the input.
    prev: Vec<String>,
    /// Entries built from the headlines, in document order.
    curr: Vec<String>,
}

impl TableOfContentsUpdater {
    pub fn new(config: &TocConfig) -> Self {
        Self {
            marker: config.marker.clone(),
            headline_levels: config.headline_levels.clone(),
            in_toc: false,
            prev: Vec::new(),
            curr: Vec::new(),
        }
    }

    /// Entries read from the existing table of contents, newline included.
    pub fn previous_entries(&self) -> &[String] {
        &self.prev
    }

    /// Entries built from the headlines, newline included.
    pub fn current_entries(&self) -> &[String] {
        &self.curr
    }

    /// Entries after the first, which follow the marker line.
    fn write_remaining(&self, extra: &mut String) {
        for entry in self.curr.iter().skip(1) {
            extra.push_str(entry);
        }
    }

    fn add_headline(&mut self, line: &str) -> Result<(), UpdateError> {
        let Some(headline) = match_headline(line) else {
            return Ok(());
        };
        if !self.headline_levels.contains(&headline.level) {
            return Ok(());
        }
        let text = strip_headline_markup(headline.text);
        if contains_markup(&text) {
            return Err(UpdateError::MalformedHeadline { text });
        }
        debug!("headline '{}' -> #{}", text, headline.id);
        self.curr.push(format!("\"{}\":#{}\n", text, headline.id));
        Ok(())
    }
}

impl Default for TableOfContentsUpdater {
    fn default() -> Self {
        Self::new(&TocConfig::default())
    }
}

fn is_blank(line: &str) -> bool {
    line_body(line).is_empty()
}

impl Updater for TableOfContentsUpdater {
    fn first_pass(&mut self, line: String, _extra: &mut String) -> Result<String, UpdateError> {
        if self.in_toc {
            if is_blank(&line) {
                self.in_toc = false;
            } else {
                self.prev.push(line.clone());
            }
        } else if let Some(first) = after_toc_marker(&line, &self.marker) {
            self.in_toc = true;
            if !first.trim().is_empty() {
                self.prev.push(first.to_string());
            }
        } else {
            self.add_headline(&line)?;
        }
        Ok(line)
    }

    fn second_pass(&mut self, line: String, extra: &mut String) -> Result<String, UpdateError> {
        if self.in_toc {
            if !is_blank(&line) {
                return Ok(String::new());
            }
            self.in_toc = false;
            self.write_remaining(extra);
        } else if after_toc_marker(&line, &self.marker).is_some() {
            self.in_toc = true;
            if let Some(first) = self.curr.first() {
                return Ok(format!("{} {}", self.marker, first));
            }
        }
        Ok(line)
    }

    fn end_pass(&mut self, pass: Pass, extra: &mut String) -> Result<(), UpdateError> {
        if self.in_toc && pass == Pass::Second {
            debug!("'{}' paragraph runs to the end of the document", self.marker);
            self.write_remaining(extra);
        }
        self.in_toc = false;
        Ok(())
    }

    fn summary(&self) -> String {
        let mut msg = String::new();
        let prev = sorted_copy(&self.prev);
        let curr = sorted_copy(&self.curr);
        let changed = set_difference(&curr, &prev).len();
        if changed != 0 {
            let plural = if changed == 1 { "" } else { "s" };
            msg = format!("{} new/changed headline{}", changed, plural);
        }

        let before = set_intersection_unordered(&self.prev, &curr);
        let after = set_intersection_unordered(&self.curr, &prev);
        if !elements_equal(&before, &after) {
            if !msg.is_empty() {
                msg.push_str(", ");
            }
            msg.push_str("existing headlines reordered");
        }
        msg
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn first_pass_all(updater: &mut TableOfContentsUpdater, text: &str) -> Result<(), UpdateError> {
        let mut extra = String::new();
        for line in text.split_inclusive('\n') {
            updater.first_pass(line.to_string(), &mut extra)?;
        }
        Ok(())
    }

    #[test]
    fn test_collects_previous_and_current_entries() {
        let text = "p(toc). \"B\":#b\n\"A\":#a\n\nh3(section#a). A\n\nh3(section#b). B\n";
        let mut updater = TableOfContentsUpdater::default();
        first_pass_all(&mut updater, text).unwrap();
        assert_eq!(updater.previous_entries(), &["\"B\":#b\n", "\"A\":#a\n"]);
        assert_eq!(updater.current_entries(), &["\"A\":#a\n", "\"B\":#b\n"]);
        assert_eq!(updater.summary(), "existing headlines reordered");
    }

    #[test]
    fn test_empty_marker_line_has_no_previous_entry() {
        let mut updater = TableOfContentsUpdater::default();
        first_pass_all(&mut updater, "p(toc).\n\n").unwrap();
        assert!(updater.previous_entries().is_empty());
    }

    #[test]
    fn test_headlines_inside_toc_paragraph_are_entries() {
        // Until the blank line, every line belongs to the table of contents.
        let mut updater = TableOfContentsUpdater::default();
        first_pass_all(&mut updater, "p(toc).\nh3(section#a). A\n").unwrap();
        assert_eq!(updater.previous_entries(), &["h3(section#a). A\n"]);
        assert!(updater.current_entries().is_empty());
    }

    #[test]
    fn test_headline_levels_are_configurable() {
        let config = TocConfig {
            marker: "p(toc).".to_string(),
            headline_levels: vec![2],
        };
        let mut updater = TableOfContentsUpdater::new(&config);
        first_pass_all(&mut updater, "h2(section#a). A\nh3(section#b). B\n").unwrap();
        assert_eq!(updater.current_entries(), &["\"A\":#a\n"]);
    }

    #[test]
    fn test_malformed_headline_is_fatal() {
        let mut updater = TableOfContentsUpdater::default();
        let result = first_pass_all(&mut updater, "h3(section#a). Broken \"link\n");
        assert_eq!(
            result,
            Err(UpdateError::MalformedHeadline {
                text: "Broken \"link".to_string()
            })
        );
    }

    #[test]
    fn test_second_pass_rewrites_paragraph() {
        let mut updater = TableOfContentsUpdater::default();
        first_pass_all(&mut updater, "h3(section#a). A\nh3(section#b). B\n").unwrap();

        let mut extra = String::new();
        let marker = updater
            .second_pass("p(toc). \"Old\":#old\n".to_string(), &mut extra)
            .unwrap();
        assert_eq!(marker, "p(toc). \"A\":#a\n");
        let stale = updater
            .second_pass("\"Stale\":#stale\n".to_string(), &mut extra)
            .unwrap();
        assert_eq!(stale, "");
        let blank = updater.second_pass("\n".to_string(), &mut extra).unwrap();
        assert_eq!(blank, "\n");
        assert_eq!(extra, "\"B\":#b\n");
    }

    #[test]
    fn test_paragraph_at_end_of_document() {
        let mut updater = TableOfContentsUpdater::default();
        let mut extra = String::new();
        first_pass_all(&mut updater, "h3(section#a). A\nh3(section#b). B\np(toc).\n").unwrap();
        updater.end_pass(Pass::First, &mut extra).unwrap();

        // The second pass starts outside the paragraph, so the headlines survive.
        let headline = updater
            .second_pass("h3(section#a). A\n".to_string(), &mut extra)
            .unwrap();
        assert_eq!(headline, "h3(section#a). A\n");
        let marker = updater
            .second_pass("p(toc).\n".to_string(), &mut extra)
            .unwrap();
        assert_eq!(marker, "p(toc). \"A\":#a\n");
        assert!(extra.is_empty());

        updater.end_pass(Pass::Second, &mut extra).unwrap();
        assert_eq!(extra, "\"B\":#b\n");
    }

    #[test]
    fn test_summary_counts_changed_headlines() {
        let mut updater = TableOfContentsUpdater::default();
        updater.prev = vec!["\"A\":#a\n".to_string()];
        updater.curr = vec![
            "\"A\":#a\n".to_string(),
            "\"B\":#b\n".to_string(),
            "\"C\":#c\n".to_string(),
        ];
        assert_eq!(updater.summary(), "2 new/changed headlines");

        updater.curr.reverse();
        updater.prev.push("\"C\":#c\n".to_string());
        assert_eq!(
            updater.summary(),
            "1 new/changed headline, existing headlines reordered"
        );
    }
}
