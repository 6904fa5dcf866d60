//! Textile post updating
//!
//! Layout follows the data flow of one update:
//!
//! - [`matching`]: recognizers for references, targets, new notes, headlines
//! - [`updater`]: the [`Updater`] trait every line processor implements
//! - [`footnotes`]: expands new notes and renumbers the footnote block
//! - [`toc`]: rebuilds the table of contents from section headlines
//! - [`driver`]: runs the processors over both passes and joins their summaries
//! - [`sequence`]: sorted-sequence helpers used to detect reordering
//! - [`config`]: embedded defaults layered with user configuration files
//! - [`error`]: processor and pass errors
//! - [`testing`]: assertion helpers for tests

pub mod config;
pub mod driver;
pub mod error;
pub mod footnotes;
pub mod matching;
pub mod sequence;
pub mod testing;
pub mod toc;
pub mod updater;

pub use config::{load_defaults, FootnoteConfig, Loader, PostConfig, TocConfig};
pub use driver::{standard_updaters, update_lines, update_post, Update};
pub use error::{Pass, PassError, UpdateError};
pub use footnotes::FootnoteUpdater;
pub use toc::TableOfContentsUpdater;
pub use updater::Updater;
