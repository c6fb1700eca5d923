//! Tests for the candidate selection algorithm.
//!
//! The unrated-candidate filter and the exact-title tie-break are easy to
//! regress; every branch of the algorithm is pinned down here against
//! synthetic candidate lists, with no I/O involved.

mod common;

use catalog_importer::core::matcher::{select_candidate, TitleMatch};
use common::candidate;

// ========== TRIVIAL CASES ==========

#[test]
fn test_no_results_is_not_found() {
    assert!(matches!(
        select_candidate("Amélie", vec![]),
        TitleMatch::NotFound
    ));
}

#[test]
fn test_single_result_is_confident_even_without_rating() {
    let result = select_candidate("Amélie", vec![candidate(1, "Amélie", None, None)]);
    match result {
        TitleMatch::Confident(c) => assert_eq!(c.id, 1),
        other => panic!("Expected Confident, got {:?}", other),
    }
}

// ========== QUALITY FILTER ==========

#[test]
fn test_unrated_candidates_are_discarded() {
    // Two unrated plus one rated: confident, not ambiguous.
    let result = select_candidate(
        "Solaris",
        vec![
            candidate(1, "Solaris", Some(4.2), None),
            candidate(2, "Solaris", Some(12.0), Some(7.9)),
            candidate(3, "Solaris", None, Some(5.0)),
        ],
    );
    match result {
        TitleMatch::Confident(c) => assert_eq!(c.id, 2),
        other => panic!("Expected Confident, got {:?}", other),
    }
}

#[test]
fn test_zero_popularity_counts_as_unrated() {
    let result = select_candidate(
        "Solaris",
        vec![
            candidate(1, "Solaris", Some(0.0), Some(6.0)),
            candidate(2, "Solaris", Some(3.0), Some(7.0)),
        ],
    );
    match result {
        TitleMatch::Confident(c) => assert_eq!(c.id, 2),
        other => panic!("Expected Confident, got {:?}", other),
    }
}

#[test]
fn test_all_unrated_is_not_found_not_ambiguous() {
    // Ambiguous-but-unratable is treated as unresolvable.
    let result = select_candidate(
        "Solaris",
        vec![
            candidate(1, "Solaris", None, None),
            candidate(2, "Solaris", Some(0.0), Some(0.0)),
            candidate(3, "Solaris (1972)", Some(5.0), None),
        ],
    );
    assert!(matches!(result, TitleMatch::NotFound));
}

// ========== EXACT-TITLE TIE-BREAK ==========

#[test]
fn test_exact_title_overrides_popularity() {
    // The fuzzy match is far more popular; the exact title still wins.
    let result = select_candidate(
        "Dune",
        vec![
            candidate(1, "Dune: Part Two", Some(900.0), Some(8.3)),
            candidate(2, "Dune", Some(40.0), Some(7.8)),
        ],
    );
    match result {
        TitleMatch::Confident(c) => assert_eq!(c.id, 2),
        other => panic!("Expected Confident, got {:?}", other),
    }
}

#[test]
fn test_exact_title_match_is_case_insensitive_and_trimmed() {
    let result = select_candidate(
        "  the thing ",
        vec![
            candidate(1, "The Thing", Some(30.0), Some(8.1)),
            candidate(2, "The Thing About Harry", Some(50.0), Some(6.5)),
        ],
    );
    match result {
        TitleMatch::Confident(c) => assert_eq!(c.id, 1),
        other => panic!("Expected Confident, got {:?}", other),
    }
}

#[test]
fn test_multiple_exact_matches_are_ambiguous() {
    // Remakes share the exact title; no safe automatic pick.
    let result = select_candidate(
        "Solaris",
        vec![
            candidate(1, "Solaris", Some(20.0), Some(8.0)),
            candidate(2, "Solaris", Some(15.0), Some(6.2)),
        ],
    );
    assert!(matches!(result, TitleMatch::Ambiguous));
}

#[test]
fn test_no_exact_match_among_several_is_ambiguous() {
    let result = select_candidate(
        "Alien",
        vec![
            candidate(1, "Aliens", Some(80.0), Some(8.4)),
            candidate(2, "Alien 3", Some(40.0), Some(6.4)),
        ],
    );
    assert!(matches!(result, TitleMatch::Ambiguous));
}

#[test]
fn test_single_survivor_after_filter_is_confident_without_exact_title() {
    // Only one rated candidate remains and it is not an exact match.
    let result = select_candidate(
        "Alien",
        vec![
            candidate(1, "Aliens", Some(80.0), Some(8.4)),
            candidate(2, "Alien vs Hamster", None, None),
        ],
    );
    match result {
        TitleMatch::Confident(c) => assert_eq!(c.id, 1),
        other => panic!("Expected Confident, got {:?}", other),
    }
}
