//! Fuzzy source-name matching.
//!
//! The news API reports source names that rarely equal the labels we show in
//! the keyboards ("BBC News" vs "BBC", "The Verge" vs "Verge"), so matching is
//! done with a case-insensitive partial ratio: the shorter string is aligned
//! against every window of the longer one and the best indel similarity wins.

pub const DEFAULT_THRESHOLD: u8 = 80;

/// `true` if `candidate` and `preferred` score at least `threshold` (0–100).
pub fn matches(candidate: &str, preferred: &str, threshold: u8) -> bool {
    partial_ratio(&candidate.to_lowercase(), &preferred.to_lowercase()) >= f64::from(threshold)
}

/// Best-aligned substring similarity on a 0–100 scale.
pub fn partial_ratio(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();

    if a.is_empty() && b.is_empty() {
        return 100.0;
    }
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }

    if a.len() == b.len() {
        return best_window(&a, &b).max(best_window(&b, &a));
    }
    if a.len() < b.len() {
        best_window(&a, &b)
    } else {
        best_window(&b, &a)
    }
}

/// Indel similarity: `100 * (1 - indel_distance / (len_a + len_b))`.
pub fn ratio(a: &[char], b: &[char]) -> f64 {
    let total = a.len() + b.len();
    if total == 0 {
        return 100.0;
    }
    let lcs = lcs_len(a, b);
    100.0 * (2 * lcs) as f64 / total as f64
}

/// Score `short` against every window of `long` with `short.len()` chars,
/// plus the partial windows hanging off either edge.
fn best_window(short: &[char], long: &[char]) -> f64 {
    let m = short.len();
    let n = long.len();
    let mut best = 0.0f64;

    let mut consider = |window: &[char]| {
        let score = ratio(short, window);
        if score > best {
            best = score;
        }
        best >= 100.0
    };

    for end in 1..m.min(n) {
        if consider(&long[..end]) {
            return 100.0;
        }
    }
    for start in 0..=(n - m) {
        if consider(&long[start..start + m]) {
            return 100.0;
        }
    }
    for start in (n - m + 1)..n {
        if consider(&long[start..]) {
            return 100.0;
        }
    }

    best
}

fn lcs_len(a: &[char], b: &[char]) -> usize {
    let mut prev = vec![0usize; b.len() + 1];
    let mut cur = vec![0usize; b.len() + 1];
    for &ca in a {
        for (j, &cb) in b.iter().enumerate() {
            cur[j + 1] = if ca == cb {
                prev[j] + 1
            } else {
                cur[j].max(prev[j + 1])
            };
        }
        std::mem::swap(&mut prev, &mut cur);
    }
    prev[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn case_insensitive_identity_always_matches() {
        for s in ["BBC News", "wired", "The Verge", "ESPN", "x", ""] {
            assert!(matches(s, &s.to_uppercase(), 100), "{s}");
            assert!(matches(&s.to_lowercase(), s, DEFAULT_THRESHOLD), "{s}");
        }
    }

    #[test]
    fn substring_scores_full_marks() {
        assert_eq!(partial_ratio("bbc", "bbc news"), 100.0);
        assert_eq!(partial_ratio("the verge", "verge"), 100.0);
        assert!(matches("BBC News", "BBC", DEFAULT_THRESHOLD));
        assert!(matches("Business Insider", "business insider (uk)", DEFAULT_THRESHOLD));
    }

    #[test]
    fn unrelated_sources_do_not_match() {
        assert!(!matches("Reuters", "CNN", DEFAULT_THRESHOLD));
        assert!(!matches("Fox News", "ESPN", DEFAULT_THRESHOLD));
        assert!(!matches("TechCrunch", "Wired", DEFAULT_THRESHOLD));
    }

    #[test]
    fn near_misses_depend_on_threshold() {
        // One substituted character in a 10-char label.
        let score = partial_ratio("techcrunch", "techcrunsh");
        assert!(score >= 80.0 && score < 100.0, "{score}");
        assert!(matches("TechCrunch", "TechCrunsh", 80));
        assert!(!matches("TechCrunch", "TechCrunsh", 95));
    }

    #[test]
    fn empty_side_never_matches() {
        assert_eq!(partial_ratio("", "cnn"), 0.0);
        assert!(!matches("CNN", "", 1));
    }

    #[test]
    fn ratio_is_indel_normalized() {
        let a: Vec<char> = "abcd".chars().collect();
        let b: Vec<char> = "abxd".chars().collect();
        // lcs = 3 → 2*3/8
        assert_eq!(ratio(&a, &b), 75.0);
    }
}
