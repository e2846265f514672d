/// Regional spelling variants the narrator and the recognizer disagree on.
const SPELLING_VARIANTS: &[(&str, &str)] = &[
    ("gray", "grey"),
    ("color", "colour"),
    ("center", "centre"),
    ("realize", "realise"),
    ("analyze", "analyse"),
];

/// Maximum relative length difference before two words are rejected outright.
const MAX_LENGTH_DELTA: f64 = 0.3;
/// Overlap threshold for short words (4 chars or fewer).
const SHORT_WORD_THRESHOLD: f64 = 0.9;
/// Overlap threshold for longer words.
const LONG_WORD_THRESHOLD: f64 = 0.75;

/// Whether two normalized words are close enough to count as the same word.
///
/// Deliberately O(n) and order-insensitive rather than edit distance:
/// adequate for single-character recognition noise in English narration, at
/// the cost of some false positives on anagram-like pairs.
pub fn similar(a: &str, b: &str) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }
    if a == b {
        return true;
    }
    if SPELLING_VARIANTS
        .iter()
        .any(|&(x, y)| (a == x && b == y) || (a == y && b == x))
    {
        return true;
    }

    let len_a = a.chars().count();
    let len_b = b.chars().count();
    let longer = len_a.max(len_b);
    if len_a.abs_diff(len_b) as f64 > longer as f64 * MAX_LENGTH_DELTA {
        return false;
    }

    let threshold = if len_a.min(len_b) <= 4 {
        SHORT_WORD_THRESHOLD
    } else {
        LONG_WORD_THRESHOLD
    };
    overlap_ratio(a, b) >= threshold
}

/// Symmetric character-overlap ratio in [0, 1]:
/// `2 * |chars of a present in b| / (len(a) + len(b))`.
pub fn overlap_ratio(a: &str, b: &str) -> f64 {
    let len_a = a.chars().count();
    let len_b = b.chars().count();
    if len_a + len_b == 0 {
        return 0.0;
    }
    let common = a.chars().filter(|&c| b.contains(c)).count();
    (2.0 * common as f64) / (len_a + len_b) as f64
}
