//! Assertion helpers for rendered markup and host mutation counts.

use arbor_core::MutationStats;

/// Assert that rendered markup contains a fragment.
pub fn assert_contains_text(html: &str, fragment: &str, msg: &str) {
    assert!(
        html.contains(fragment),
        "{}: '{}' not found in {}",
        msg,
        fragment,
        html
    );
}

/// Assert that rendered markup does not contain a fragment.
pub fn assert_not_contains_text(html: &str, fragment: &str, msg: &str) {
    assert!(
        !html.contains(fragment),
        "{}: '{}' unexpectedly found in {}",
        msg,
        fragment,
        html
    );
}

/// Assert that an update produced no host mutations at all.
pub fn assert_no_mutations(stats: &MutationStats, msg: &str) {
    assert_eq!(stats.total(), 0, "{}: unexpected mutations {:?}", msg, stats);
}

/// Assert that an update did not create, insert, move or remove any handle.
pub fn assert_structure_stable(stats: &MutationStats, msg: &str) {
    assert!(
        stats.created == 0 && stats.inserted == 0 && stats.moved == 0 && stats.removed == 0,
        "{}: structural mutations {:?}",
        msg,
        stats
    );
}

/// Assert the number of handles moved by a keyed update.
pub fn assert_moves(stats: &MutationStats, expected: usize, msg: &str) {
    assert_eq!(
        stats.moved, expected,
        "{}: expected {} moves, got {:?}",
        msg, expected, stats
    );
}
