// src/matching/jaccard.rs - Suffix-stripped token-set overlap
use std::collections::HashSet;

use crate::matching::normalize::SuffixStripper;

/// Whitespace tokens of `name` after suffix stripping, duplicates collapsed.
pub fn token_set(name: &str, stripper: &SuffixStripper) -> HashSet<String> {
    stripper
        .strip_legal_suffixes(name)
        .split_whitespace()
        .map(|t| t.to_string())
        .collect()
}

/// `1 - |A ∩ B| / |A ∪ B|` over prepared token sets. Two empty sets are
/// maximally distant.
pub fn jaccard_distance_sets(a: &HashSet<String>, b: &HashSet<String>) -> f64 {
    let (smaller, larger) = if a.len() <= b.len() { (a, b) } else { (b, a) };
    let intersection = smaller.iter().filter(|t| larger.contains(*t)).count();
    let union = a.len() + b.len() - intersection;

    if union == 0 {
        return 1.0;
    }
    1.0 - intersection as f64 / union as f64
}

pub fn jaccard_distance(query: &str, candidate: &str, stripper: &SuffixStripper) -> f64 {
    jaccard_distance_sets(&token_set(query, stripper), &token_set(candidate, stripper))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_LEGAL_SUFFIXES;

    fn stripper() -> SuffixStripper {
        SuffixStripper::new(DEFAULT_LEGAL_SUFFIXES).unwrap()
    }

    #[test]
    fn test_identity_is_zero() {
        let s = stripper();
        assert_eq!(jaccard_distance("Acme Widgets", "Acme Widgets", &s), 0.0);
        assert_eq!(jaccard_distance("Acme Widgets Inc", "acme widgets", &s), 0.0);
    }

    #[test]
    fn test_symmetry() {
        let s = stripper();
        let pairs = [
            ("Globax Incorporated", "Globex Inc"),
            ("North Star Foods Pvt Ltd", "Star Foods"),
            ("a b c", "c d"),
        ];
        for (a, b) in pairs {
            assert_eq!(jaccard_distance(a, b, &s), jaccard_distance(b, a, &s));
        }
    }

    #[test]
    fn test_partial_overlap() {
        let s = stripper();
        // {north, star, foods} vs {star, foods}: 2 shared of 3
        let d = jaccard_distance("North Star Foods Pvt Ltd", "Star Foods", &s);
        assert!((d - (1.0 - 2.0 / 3.0)).abs() < 1e-12);
        assert_eq!(jaccard_distance("alpha", "beta", &s), 1.0);
    }

    #[test]
    fn test_duplicates_collapse() {
        let s = stripper();
        assert_eq!(jaccard_distance("acme acme", "acme", &s), 0.0);
    }

    #[test]
    fn test_empty_sets_are_maximal_distance() {
        let s = stripper();
        assert_eq!(jaccard_distance("Inc", "LLC", &s), 1.0);
        assert_eq!(jaccard_distance("", "   ", &s), 1.0);
        assert_eq!(jaccard_distance("Acme", "Corp", &s), 1.0);
    }
}
