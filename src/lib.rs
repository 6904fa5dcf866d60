//! # textile-post
//!
//! Keeps the footnotes and the table of contents of a Textile blog post
//! consistent.
//!
//! Authors write new footnotes inline as `[#note-title: Note text.]` and list
//! sections as `h3(section#id). Headline` lines. Running the post through
//! [`post::update_post`] expands the new notes, renumbers every footnote
//! reference in document order, rewrites the footnote block to match, and
//! regenerates the `p(toc).` paragraph from the headlines. Every update is
//! idempotent: running it over its own output changes nothing.
//!
//! For the test helpers shared by the unit and integration tests, see the
//! [testing module](post::testing).

pub mod post;
