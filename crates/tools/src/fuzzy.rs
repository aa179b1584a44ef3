//! Fuzzy text similarity for resolving to-do items by description.
//!
//! Scores are in [0, 1]. Several cheap measures are combined by taking the
//! maximum, so a candidate only needs to look similar in one way:
//! typo-tolerant edit distance, word-order-insensitive edit distance,
//! substring containment, and word overlap.

/// Default minimum similarity for a match.
pub const DEFAULT_MATCH_THRESHOLD: f32 = 0.6;

/// Shorter strings than this never score by containment ("a" is in everything).
const MIN_CONTAINMENT_CHARS: usize = 3;

/// Lowercase, drop punctuation, collapse whitespace.
pub fn normalize(text: &str) -> String {
    text.chars()
        .map(|c| if c.is_alphanumeric() { c.to_ascii_lowercase() } else { ' ' })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// How similar `query` is to `candidate`.
pub fn similarity(query: &str, candidate: &str) -> f32 {
    let q = normalize(query);
    let c = normalize(candidate);
    if q.is_empty() || c.is_empty() {
        return 0.0;
    }
    if q == c {
        return 1.0;
    }

    let direct = levenshtein_similarity(&q, &c);
    let reordered = levenshtein_similarity(&sorted_words(&q), &sorted_words(&c));

    [direct, reordered, containment(&q, &c), word_overlap(&q, &c)]
        .into_iter()
        .fold(0.0, f32::max)
}

fn sorted_words(s: &str) -> String {
    let mut words: Vec<&str> = s.split(' ').collect();
    words.sort_unstable();
    words.join(" ")
}

fn containment(q: &str, c: &str) -> f32 {
    let (short, long) = if q.len() <= c.len() { (q, c) } else { (c, q) };
    // Whole words only: "read" is not inside "the thread"
    if short.chars().count() < MIN_CONTAINMENT_CHARS || !format!(" {long} ").contains(&format!(" {short} ")) {
        return 0.0;
    }
    let ratio = short.chars().count() as f32 / long.chars().count() as f32;
    0.75 + 0.25 * ratio
}

/// Fraction of the candidate's words that appear in the query.
fn word_overlap(q: &str, c: &str) -> f32 {
    let query_words: Vec<&str> = q.split(' ').collect();
    let candidate_words: Vec<&str> = c.split(' ').collect();
    let hits = candidate_words
        .iter()
        .filter(|w| query_words.contains(w))
        .count();
    hits as f32 / candidate_words.len() as f32
}

fn levenshtein_similarity(a: &str, b: &str) -> f32 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let longest = a.len().max(b.len());
    if longest == 0 {
        return 1.0;
    }
    1.0 - levenshtein(&a, &b) as f32 / longest as f32
}

// Two-row dynamic programming.
fn levenshtein(a: &[char], b: &[char]) -> usize {
    let mut prev: Vec<usize> = (0..=b.len()).collect();
    let mut curr = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        curr[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let cost = usize::from(ca != cb);
            curr[j + 1] = (prev[j] + cost).min(prev[j + 1] + 1).min(curr[j] + 1);
        }
        std::mem::swap(&mut prev, &mut curr);
    }
    prev[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_strips_case_and_punctuation() {
        assert_eq!(normalize("  Groceries,   BUY! "), "groceries buy");
        assert_eq!(normalize("..."), "");
    }

    #[test]
    fn levenshtein_known_distances() {
        let d = |a: &str, b: &str| {
            levenshtein(&a.chars().collect::<Vec<_>>(), &b.chars().collect::<Vec<_>>())
        };
        assert_eq!(d("kitten", "sitting"), 3);
        assert_eq!(d("", "abc"), 3);
        assert_eq!(d("same", "same"), 0);
    }

    #[test]
    fn case_difference_is_exact_match() {
        assert_eq!(similarity("buy groceries", "Buy groceries"), 1.0);
    }

    #[test]
    fn typo_clears_threshold() {
        assert!(similarity("byu groceries", "Buy groceries") >= DEFAULT_MATCH_THRESHOLD);
    }

    #[test]
    fn word_order_is_ignored() {
        assert_eq!(similarity("Groceries, buy", "Buy groceries"), 1.0);
    }

    #[test]
    fn unrelated_text_stays_below_threshold() {
        assert!(similarity("Launch rocket", "Buy groceries") < DEFAULT_MATCH_THRESHOLD);
    }

    #[test]
    fn partial_description_matches_by_containment() {
        let score = similarity("the milk", "buy the milk");
        assert!(score >= DEFAULT_MATCH_THRESHOLD);
        assert!(score < 1.0);
    }

    #[test]
    fn containment_respects_word_boundaries() {
        assert_eq!(containment("read", "the thread"), 0.0);
        assert!(similarity("the thread", "read") < DEFAULT_MATCH_THRESHOLD);
        assert!(containment("read", "read the paper") > 0.75);
    }

    #[test]
    fn tiny_queries_do_not_match_by_containment() {
        assert_eq!(containment("a", "buy a car"), 0.0);
    }

    #[test]
    fn empty_input_scores_zero() {
        assert_eq!(similarity("", "Buy groceries"), 0.0);
        assert_eq!(similarity("buy", "!!"), 0.0);
    }
}
