//! Two-pass update driver
//!
//! Streams a document through every processor, line by line, twice. The
//! first pass reads the original document; the second reads the complete
//! output of the first. Within a pass each processor sees the line as left by
//! the processors before it, in list order.
//!
//! Lines keep their trailing newline. A final line without one is passed
//! through unterminated.

use crate::post::config::PostConfig;
use crate::post::error::{Pass, PassError, UpdateError};
use crate::post::footnotes::FootnoteUpdater;
use crate::post::toc::TableOfContentsUpdater;
use crate::post::updater::Updater;
use log::debug;

/// The rewritten document and what changed in it
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Update {
    pub text: String,
    /// Processor summaries joined with `"; "`; empty if nothing changed
    pub summary: String,
}

/// The processors the `update-post` tool runs, in order: footnotes first,
/// then the table of contents.
pub fn standard_updaters(config: &PostConfig) -> Vec<Box<dyn Updater>> {
    vec![
        Box::new(FootnoteUpdater::new(&config.footnotes)),
        Box::new(TableOfContentsUpdater::new(&config.toc)),
    ]
}

/// Run both passes of `updaters` over `input`.
///
/// Processors carry the state of one update, so use fresh ones per document.
pub fn update_post(
    updaters: &mut [Box<dyn Updater>],
    input: &str,
) -> Result<Update, PassError> {
    let lines: Vec<&str> = input.split_inclusive('\n').collect();
    update_lines(updaters, &lines)
}

/// Run both passes of `updaters` over a document already split into lines.
///
/// Every line but the last should end with `\n`.
pub fn update_lines<S: AsRef<str>>(
    updaters: &mut [Box<dyn Updater>],
    lines: &[S],
) -> Result<Update, PassError> {
    let first = run_pass(updaters, Pass::First, lines.iter().map(|line| line.as_ref()))?;
    let second = run_pass(updaters, Pass::Second, first.split_inclusive('\n'))?;

    let summary = updaters
        .iter()
        .map(|updater| updater.summary())
        .filter(|msg| !msg.is_empty())
        .collect::<Vec<_>>()
        .join("; ");

    Ok(Update {
        text: second,
        summary,
    })
}

fn run_pass<'a>(
    updaters: &mut [Box<dyn Updater>],
    pass: Pass,
    lines: impl Iterator<Item = &'a str>,
) -> Result<String, PassError> {
    let mut output = String::new();
    let mut count = 0;
    for (index, line) in lines.enumerate() {
        let line = apply(updaters, pass, line.to_string(), &mut output).map_err(|source| {
            PassError {
                pass,
                line: index + 1,
                source,
            }
        })?;
        output.push_str(&line);
        count = index + 1;
    }
    for updater in updaters.iter_mut() {
        updater
            .end_pass(pass, &mut output)
            .map_err(|source| PassError {
                pass,
                line: count,
                source,
            })?;
    }
    debug!("{} pass read {} lines", pass, count);
    Ok(output)
}

/// Hand one line through every processor; extra output lands in `output`
/// ahead of the line itself.
fn apply(
    updaters: &mut [Box<dyn Updater>],
    pass: Pass,
    mut line: String,
    output: &mut String,
) -> Result<String, UpdateError> {
    for updater in updaters.iter_mut() {
        line = match pass {
            Pass::First => updater.first_pass(line, output)?,
            Pass::Second => updater.second_pass(line, output)?,
        };
    }
    Ok(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Upper-cases lines in the first pass, tags them in the second.
    struct Shout {
        lines: usize,
    }

    impl Updater for Shout {
        fn first_pass(&mut self, line: String, _extra: &mut String) -> Result<String, UpdateError> {
            self.lines += 1;
            Ok(line.to_uppercase())
        }

        fn second_pass(&mut self, line: String, extra: &mut String) -> Result<String, UpdateError> {
            extra.push_str("> ");
            Ok(line)
        }

        fn summary(&self) -> String {
            format!("{} shouted", self.lines)
        }
    }

    /// Fails on the first line containing `bad` in the given pass.
    struct FailOn {
        pass: Pass,
    }

    impl FailOn {
        fn check(&self, pass: Pass, line: String) -> Result<String, UpdateError> {
            if pass == self.pass && line.contains("bad") {
                return Err(UpdateError::MalformedHeadline { text: line });
            }
            Ok(line)
        }
    }

    impl Updater for FailOn {
        fn first_pass(&mut self, line: String, _extra: &mut String) -> Result<String, UpdateError> {
            self.check(Pass::First, line)
        }

        fn second_pass(&mut self, line: String, _extra: &mut String) -> Result<String, UpdateError> {
            self.check(Pass::Second, line)
        }

        fn summary(&self) -> String {
            String::new()
        }
    }

    /// Appends a trailer line once the second pass ends.
    struct Trailer;

    impl Updater for Trailer {
        fn end_pass(&mut self, pass: Pass, extra: &mut String) -> Result<(), UpdateError> {
            if pass == Pass::Second {
                extra.push_str("-- end\n");
            }
            Ok(())
        }

        fn summary(&self) -> String {
            String::new()
        }
    }

    /// Rejects every document at the end of the first pass.
    struct Unfinished;

    impl Updater for Unfinished {
        fn end_pass(&mut self, pass: Pass, _extra: &mut String) -> Result<(), UpdateError> {
            match pass {
                Pass::First => Err(UpdateError::UnclosedFootnoteBlock {
                    marker: "</div>".to_string(),
                }),
                Pass::Second => Ok(()),
            }
        }

        fn summary(&self) -> String {
            String::new()
        }
    }

    struct Silent;

    impl Updater for Silent {
        fn summary(&self) -> String {
            String::new()
        }
    }

    #[test]
    fn test_extra_output_precedes_line() {
        let mut updaters: Vec<Box<dyn Updater>> = vec![Box::new(Shout { lines: 0 })];
        let update = update_post(&mut updaters, "a\nb").unwrap();
        assert_eq!(update.text, "> A\n> B");
        assert_eq!(update.summary, "2 shouted");
    }

    #[test]
    fn test_processors_chain_in_order() {
        // The second processor sees the upper-cased line, so "bad" never reaches it.
        let mut updaters: Vec<Box<dyn Updater>> = vec![
            Box::new(Shout { lines: 0 }),
            Box::new(FailOn { pass: Pass::First }),
        ];
        let update = update_post(&mut updaters, "bad\n").unwrap();
        assert_eq!(update.text, "> BAD\n");
    }

    #[test]
    fn test_summaries_skip_empty_and_join() {
        let mut updaters: Vec<Box<dyn Updater>> = vec![
            Box::new(Shout { lines: 0 }),
            Box::new(Silent),
            Box::new(Shout { lines: 0 }),
        ];
        let update = update_post(&mut updaters, "x\n").unwrap();
        assert_eq!(update.summary, "1 shouted; 1 shouted");
    }

    #[test]
    fn test_error_reports_pass_and_line() {
        let mut updaters: Vec<Box<dyn Updater>> = vec![Box::new(FailOn { pass: Pass::Second })];
        let err = update_post(&mut updaters, "ok\nok\nbad\n").unwrap_err();
        assert_eq!(err.pass, Pass::Second);
        assert_eq!(err.line, 3);
        assert_eq!(
            err.source,
            UpdateError::MalformedHeadline {
                text: "bad\n".to_string()
            }
        );
    }

    #[test]
    fn test_end_of_pass_output_is_appended() {
        let mut updaters: Vec<Box<dyn Updater>> = vec![Box::new(Trailer)];
        let update = update_post(&mut updaters, "body\n").unwrap();
        assert_eq!(update.text, "body\n-- end\n");
    }

    #[test]
    fn test_end_of_pass_error_reports_last_line() {
        let mut updaters: Vec<Box<dyn Updater>> = vec![Box::new(Unfinished)];
        let err = update_post(&mut updaters, "one\ntwo\n").unwrap_err();
        assert_eq!(err.pass, Pass::First);
        assert_eq!(err.line, 2);
    }

    #[test]
    fn test_empty_document() {
        let mut updaters: Vec<Box<dyn Updater>> = vec![Box::new(Shout { lines: 0 })];
        let update = update_post(&mut updaters, "").unwrap();
        assert_eq!(update.text, "");
        assert_eq!(update.summary, "0 shouted");
    }

    #[test]
    fn test_update_lines_matches_update_post() {
        let lines = ["one\n", "two\n", "three"];
        let mut by_lines = standard_updaters(&PostConfig::default());
        let mut by_text = standard_updaters(&PostConfig::default());
        assert_eq!(
            update_lines(&mut by_lines, &lines).unwrap(),
            update_post(&mut by_text, &lines.concat()).unwrap()
        );
    }
}
