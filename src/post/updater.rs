//! Line processor trait
//!
//! An [`Updater`] rewrites a post one line at a time over two passes. The
//! driver ([`update_post`](crate::post::driver::update_post)) handles reading
//! lines, chaining processors and collecting their output, so implementations
//! only describe what happens to a single line.
//!
//! # Design
//!
//! The first pass sees the original document and is where processors collect
//! state (footnote bodies, headlines) and rewrite inline markup. The second
//! pass sees the output of the first pass and is where processors regenerate
//! block-level content from that state.
//!
//! Each pass method receives the line (with its trailing newline, if any) and
//! returns the line to pass on to the next processor. Extra output that must
//! appear before the line, such as a regenerated footnote block ahead of its
//! closing marker, is appended to `extra` instead of being folded into the
//! returned line. Returning an empty string drops the line. Once a pass runs
//! out of lines, [`Updater::end_pass`] lets a processor flush pending output
//! or reject a document that ended in the middle of a block.
//!
//! # Examples
//!
//! ```ignore
//! // Counts lines, changing nothing
//! struct LineCounter {
//!     lines: usize,
//! }
//!
//! impl Updater for LineCounter {
//!     fn first_pass(&mut self, line: String, _extra: &mut String) -> Result<String, UpdateError> {
//!         self.lines += 1;
//!         Ok(line)
//!     }
//!
//!     fn summary(&self) -> String {
//!         String::new()
//!     }
//! }
//! ```

use crate::post::error::{Pass, UpdateError};

/// A processor applied to every line of a post, over two passes.
///
/// Pass methods default to returning the line unchanged, so implementations
/// only override the passes they take part in. Every update must be
/// idempotent: running a processor over its own output must reproduce that
/// output and report an empty summary.
pub trait Updater {
    /// Rewrite `line` during the first pass.
    ///
    /// Text appended to `extra` is written before the returned line.
    fn first_pass(&mut self, line: String, extra: &mut String) -> Result<String, UpdateError> {
        let _ = extra;
        Ok(line)
    }

    /// Rewrite `line` during the second pass, which reads the first pass output.
    ///
    /// Text appended to `extra` is written before the returned line.
    fn second_pass(&mut self, line: String, extra: &mut String) -> Result<String, UpdateError> {
        let _ = extra;
        Ok(line)
    }

    /// Called after the last line of each pass.
    ///
    /// Text appended to `extra` is written at the end of the pass output. State
    /// that only describes where the pass stopped, such as being inside a
    /// block, must be settled here so the next pass starts from the top.
    fn end_pass(&mut self, pass: Pass, extra: &mut String) -> Result<(), UpdateError> {
        let _ = (pass, extra);
        Ok(())
    }

    /// Summary of the changes made, or the empty string if nothing changed.
    ///
    /// Called once, after the second pass.
    fn summary(&self) -> String;
}
