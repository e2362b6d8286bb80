//! Fuzzy matching of citation strings against document names.
//!
//! [`score`] is the ranking used for suggestions: the length of the longest
//! prefix of the query that appears verbatim somewhere in the candidate.
//! [`similarity`] is a bigram (Dice) coefficient that callers may select
//! instead; it is not used by the graph's default suggestion feed.

use std::collections::HashMap;

use crate::error::Error;

/// Minimum prefix length, in characters, a candidate must contain to count as a match.
pub const DEFAULT_MIN_MATCH_LENGTH: usize = 5;

/// Length of the longest prefix of `query` (at least `min_match_length`
/// characters) that occurs as a contiguous substring of `candidate`.
///
/// Returns 0 when even the shortest allowed prefix is absent. Only the
/// query's tail is ever shortened; matching is case-sensitive and lengths
/// are counted in characters.
///
/// # Errors
///
/// Returns `Error::Match` if `min_match_length` is 0 or the query has fewer
/// than `min_match_length` characters.
pub fn score(candidate: &str, query: &str, min_match_length: usize) -> Result<usize, Error> {
    let query_len = query.chars().count();
    if min_match_length == 0 || query_len < min_match_length {
        return Err(Error::Match { min_match_length, query: query.to_string() });
    }

    let mut best = 0;
    // A prefix that fails rules out every longer prefix, so stop at the first miss.
    for (len, prefix) in char_prefixes(query).skip(min_match_length.saturating_sub(1)) {
        if !candidate.contains(prefix) {
            break;
        }
        best = len;
    }
    return Ok(best);
}

/// Bigram overlap between two strings, in `[0, 1]`.
///
/// `2 * |pairs(a) ∩ pairs(b)| / (|pairs(a)| + |pairs(b)|)`, where pairs are
/// adjacent characters and the intersection counts each shared pair as many
/// times as it occurs in both. Strings too short to have a pair score 1 when
/// equal and 0 otherwise.
pub fn similarity(a: &str, b: &str) -> f64 {
    let pairs_a = bigrams(a);
    let pairs_b = bigrams(b);
    let total = pairs_a.len().saturating_add(pairs_b.len());
    if total == 0 {
        return if a == b { 1.0 } else { 0.0 };
    }

    let mut counts: HashMap<(char, char), usize> = HashMap::new();
    for pair in pairs_a {
        let count = counts.entry(pair).or_default();
        *count = count.saturating_add(1);
    }
    let mut shared = 0_usize;
    for pair in pairs_b {
        if let Some(count) = counts.get_mut(&pair)
            && *count > 0
        {
            *count = count.saturating_sub(1);
            shared = shared.saturating_add(1);
        }
    }

    return count_to_f64(shared.saturating_mul(2)) / count_to_f64(total);
}

/// Adjacent character pairs of `s`, in order.
fn bigrams(s: &str) -> Vec<(char, char)> {
    let chars: Vec<char> = s.chars().collect();
    return chars.windows(2).filter_map(|w| return Some((*w.first()?, *w.get(1)?))).collect();
}

/// Every non-empty prefix of `s`, paired with its length in characters.
fn char_prefixes(s: &str) -> impl Iterator<Item = (usize, &str)> {
    return s
        .char_indices()
        .enumerate()
        .filter_map(move |(i, (start, c))| {
            let end = start.saturating_add(c.len_utf8());
            return s.get(..end).map(|p| return (i.saturating_add(1), p));
        });
}

/// Counts here are string lengths, far below 2^52, so the conversion is exact.
#[allow(clippy::as_conversions, clippy::cast_precision_loss, reason = "pair counts fit in f64 mantissa")]
fn count_to_f64(n: usize) -> f64 {
    return n as f64;
}

#[cfg(test)]
#[allow(clippy::missing_panics_doc, reason = "tests")]
mod tests {
    use super::*;

    #[test]
    fn longest_literal_prefix_wins() {
        // "Antenna" is in the name, "Antenna " is not.
        assert_eq!(score("REGS-2-R1-AntennaSpec", "Antenna Specification", 5).unwrap(), 7);
        assert_eq!(score("AntennaSpec", "AntennaSpec rev 2", 5).unwrap(), 11);
    }

    #[test]
    fn no_match_scores_zero() {
        assert_eq!(score("unrelated", "Antenna", 5).unwrap(), 0);
    }

    #[test]
    fn prefix_must_start_at_query_start() {
        // "ntenna" occurs but "Anten" does not.
        assert_eq!(score("xntennax", "Antenna", 5).unwrap(), 0);
    }

    #[test]
    fn matching_is_case_sensitive() {
        assert_eq!(score("antennaspec", "Antenna", 5).unwrap(), 0);
    }

    #[test]
    fn whole_query_match_returns_query_length() {
        assert_eq!(score("GroundStationPlan", "Station", 5).unwrap(), 7);
    }

    #[test]
    fn short_query_is_an_error() {
        let err = score("anything", "Ant", 5).unwrap_err();
        assert!(matches!(err, Error::Match { min_match_length: 5, .. }));
    }

    #[test]
    fn zero_minimum_is_an_error() {
        assert!(score("anything", "Antenna", 0).is_err());
    }

    #[test]
    fn lengths_count_characters() {
        assert_eq!(score("Überprüfung", "Überprü!", 5).unwrap(), 7);
    }

    #[test]
    fn lower_threshold_never_scores_less() {
        let cases = [
            ("REGS-2-R1-AntennaSpec", "Antenna Specification"),
            ("GroundStationPlan", "Ground Station"),
            ("YagiMountDrawing", "YagiMount rev 3"),
            ("unrelated", "Antenna"),
        ];
        for (name, query) in cases {
            for high in 2..=query.chars().count() {
                let high_score = score(name, query, high).unwrap();
                if high_score == 0 {
                    continue;
                }
                for low in 1..high {
                    assert!(score(name, query, low).unwrap() >= high_score, "{name} / {query}: {low} < {high}");
                }
            }
        }
    }

    #[test]
    fn similarity_of_identical_strings_is_one() {
        assert!((similarity("France", "France") - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn similarity_of_disjoint_strings_is_zero() {
        assert!(similarity("abc", "xyz").abs() < f64::EPSILON);
    }

    #[test]
    fn similarity_counts_shared_pairs() {
        // pairs(France) = Fr ra an nc ce, pairs(French) = Fr re en nc ch; shared = Fr nc.
        assert!((similarity("France", "French") - 0.4).abs() < 1e-9);
    }

    #[test]
    fn similarity_respects_pair_multiplicity() {
        // pairs(aaa) = aa aa, pairs(aa) = aa; one shared pair.
        assert!((similarity("aaa", "aa") - 2.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn similarity_of_short_strings() {
        assert!((similarity("a", "a") - 1.0).abs() < f64::EPSILON);
        assert!(similarity("a", "b").abs() < f64::EPSILON);
        assert!(similarity("", "ab").abs() < f64::EPSILON);
    }
}
