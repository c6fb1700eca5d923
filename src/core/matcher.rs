//! Candidate selection.
//!
//! The matching/tie-break algorithm as a pure function over a synthetic
//! candidate list, independent of any I/O. This logic is intricate and easy
//! to regress; keep changes covered by `tests/matcher_tests.rs`.

use crate::models::media::Candidate;

/// Outcome of selecting among search results.
#[derive(Debug, Clone)]
pub enum TitleMatch {
    /// A single candidate selected without human input.
    Confident(Candidate),
    /// Multiple plausible candidates remain; a human must choose.
    Ambiguous,
    /// Nothing usable came back.
    NotFound,
}

/// Select a candidate for `query` from raw search results.
///
/// - Zero results: not found.
/// - Exactly one result: confident, regardless of rating.
/// - Multiple results: candidates with no rating or a zero/absent popularity
///   are discarded first. An empty survivor set is treated as not found
///   (ambiguous-but-unratable is unresolvable, a quality filter rather than a
///   tie-break). A lone survivor is confident. Among several survivors, an
///   exact title match (case-insensitive, trimmed) wins over popularity
///   ordering when it is unique; otherwise the set is ambiguous.
pub fn select_candidate(query: &str, candidates: Vec<Candidate>) -> TitleMatch {
    if candidates.is_empty() {
        return TitleMatch::NotFound;
    }

    if candidates.len() == 1 {
        let only = candidates.into_iter().next().unwrap();
        return TitleMatch::Confident(only);
    }

    let rated: Vec<Candidate> = candidates
        .into_iter()
        .filter(|c| c.vote_average.unwrap_or(0.0) > 0.0 && c.popularity.unwrap_or(0.0) > 0.0)
        .collect();

    if rated.is_empty() {
        return TitleMatch::NotFound;
    }

    if rated.len() == 1 {
        let only = rated.into_iter().next().unwrap();
        return TitleMatch::Confident(only);
    }

    let wanted = query.trim().to_lowercase();
    let mut exact: Vec<Candidate> = rated
        .into_iter()
        .filter(|c| c.title.trim().to_lowercase() == wanted)
        .collect();

    if exact.len() == 1 {
        return TitleMatch::Confident(exact.remove(0));
    }

    TitleMatch::Ambiguous
}
