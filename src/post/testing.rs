//! Assertion helpers shared by unit and integration tests

use crate::post::driver::update_post;
use crate::post::updater::Updater;

/// Update `original` with `updaters` and compare the result and summary.
///
/// Panics with the expected and actual values side by side when either
/// differs, or when the update fails.
#[track_caller]
pub fn assert_update(
    expected_summary: &str,
    expected_text: &str,
    original: &str,
    updaters: &mut [Box<dyn Updater>],
) {
    let update = match update_post(updaters, original) {
        Ok(update) => update,
        Err(err) => panic!("update failed: {err}\noriginal:\n{original}"),
    };
    if update.text != expected_text {
        panic!(
            "updated post does not match expectation:\nexpected:\n{expected_text}\n--------\nactual:\n{}",
            update.text
        );
    }
    if update.summary != expected_summary {
        panic!(
            "update summary does not match expectation:\nexpected:\n{expected_summary}\n--------\nactual:\n{}",
            update.summary
        );
    }
}
