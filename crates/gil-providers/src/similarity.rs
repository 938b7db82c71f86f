//! Character-bigram similarity (Dice coefficient).
//!
//! Used by the geocoder to score candidates when no substring relation holds
//! between the query and a place name. Returns a ratio in `[0, 1]`.

use std::collections::HashMap;

pub fn ratio(a: &str, b: &str) -> f64 {
    if a == b {
        return 1.0;
    }
    let a_grams = bigrams(a);
    let b_grams = bigrams(b);
    if a_grams.is_empty() || b_grams.is_empty() {
        return 0.0;
    }

    let mut counts: HashMap<(char, char), usize> = HashMap::new();
    for g in &a_grams {
        *counts.entry(*g).or_insert(0) += 1;
    }
    let mut matches = 0usize;
    for g in &b_grams {
        if let Some(n) = counts.get_mut(g) {
            if *n > 0 {
                *n -= 1;
                matches += 1;
            }
        }
    }

    (2.0 * matches as f64) / (a_grams.len() + b_grams.len()) as f64
}

fn bigrams(s: &str) -> Vec<(char, char)> {
    let chars: Vec<char> = s.chars().collect();
    chars.windows(2).map(|w| (w[0], w[1])).collect()
}

// ── Tests ──────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn identical_strings_score_one() {
        assert_eq!(ratio("경복궁", "경복궁"), 1.0);
    }

    #[test]
    fn disjoint_strings_score_zero() {
        assert_eq!(ratio("경복궁", "해운대"), 0.0);
    }

    #[test]
    fn partial_overlap_scores_between() {
        let r = ratio("해운대해수욕장", "해운대 해수욕장");
        assert!(r > 0.5 && r < 1.0, "got {r}");
    }

    #[test]
    fn single_char_strings_never_panic() {
        assert_eq!(ratio("산", "강"), 0.0);
        assert_eq!(ratio("산", "산"), 1.0);
    }
}
