// src/matching/permutation.rs - Token-order invariant Jaro-Winkler distance
use std::time::Instant;
use strsim::jaro_winkler;

/// Orderings scored between deadline checks.
const DEADLINE_CHECK_INTERVAL: usize = 256;

/// Result of scoring one query against one candidate.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PermutationScore {
    pub distance: f64,
    /// True when the query exceeded the token cap and only its original
    /// ordering was scored
    pub degraded: bool,
}

/// Query tokens prepared once and reused against every candidate.
///
/// Holds every distinct ordering of the query's whitespace tokens joined by a
/// single space. Above `max_tokens` only the original ordering is kept.
#[derive(Debug, Clone)]
pub struct PermutedQuery {
    orderings: Vec<String>,
    token_count: usize,
    degraded: bool,
}

impl PermutedQuery {
    pub fn new(query: &str, max_tokens: usize) -> Self {
        let tokens: Vec<&str> = query.split_whitespace().collect();
        let token_count = tokens.len();

        if token_count == 0 {
            return Self {
                orderings: Vec::new(),
                token_count,
                degraded: false,
            };
        }

        if token_count > max_tokens {
            return Self {
                orderings: vec![tokens.join(" ")],
                token_count,
                degraded: true,
            };
        }

        Self {
            orderings: distinct_orderings(tokens),
            token_count,
            degraded: false,
        }
    }

    pub fn token_count(&self) -> usize {
        self.token_count
    }

    pub fn is_degraded(&self) -> bool {
        self.degraded
    }

    pub fn orderings(&self) -> &[String] {
        &self.orderings
    }

    /// `1 - max(jaro_winkler(ordering, candidate))`. An empty query scores 1.0.
    pub fn distance_to(&self, candidate: &str) -> f64 {
        self.distance_within(candidate, None).unwrap_or(1.0)
    }

    /// Same as [`PermutedQuery::distance_to`], but gives up with `None` once
    /// `deadline` has passed.
    pub fn distance_within(&self, candidate: &str, deadline: Option<Instant>) -> Option<f64> {
        if self.orderings.is_empty() {
            return Some(1.0);
        }

        let mut best = 0.0_f64;
        for (i, ordering) in self.orderings.iter().enumerate() {
            if i % DEADLINE_CHECK_INTERVAL == 0 && deadline.is_some_and(|d| Instant::now() >= d) {
                return None;
            }
            best = best.max(jaro_winkler(ordering, candidate));
        }

        Some((1.0 - best).clamp(0.0, 1.0))
    }
}

/// One-shot form of [`PermutedQuery::distance_to`].
pub fn permutation_distance(query: &str, candidate: &str, max_tokens: usize) -> PermutationScore {
    let prepared = PermutedQuery::new(query, max_tokens);
    PermutationScore {
        distance: prepared.distance_to(candidate),
        degraded: prepared.is_degraded(),
    }
}

/// Every distinct ordering of `tokens`, joined by single spaces. Repeated
/// tokens yield each arrangement once.
fn distinct_orderings(mut tokens: Vec<&str>) -> Vec<String> {
    tokens.sort_unstable();
    let mut orderings = vec![tokens.join(" ")];
    while next_permutation(&mut tokens) {
        orderings.push(tokens.join(" "));
    }
    orderings
}

/// Advances `items` to the next lexicographic permutation. Returns false once
/// the last permutation has been reached.
fn next_permutation<T: Ord>(items: &mut [T]) -> bool {
    if items.len() < 2 {
        return false;
    }

    let mut i = items.len() - 1;
    while i > 0 && items[i - 1] >= items[i] {
        i -= 1;
    }
    if i == 0 {
        return false;
    }

    let mut j = items.len() - 1;
    while items[j] <= items[i - 1] {
        j -= 1;
    }
    items.swap(i - 1, j);
    items[i..].reverse();
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reordering_invariance() {
        let a = permutation_distance("john smith", "smith john", 8);
        let b = permutation_distance("smith john", "smith john", 8);
        assert_eq!(a.distance, b.distance);
        assert!(a.distance.abs() < 1e-12);
        assert!(!a.degraded);

        let x = "jon smyth ltd";
        assert_eq!(
            permutation_distance("john smith", x, 8).distance,
            permutation_distance("smith john", x, 8).distance
        );
    }

    #[test]
    fn test_single_token_has_one_ordering() {
        let q = PermutedQuery::new("acme", 8);
        assert_eq!(q.orderings(), &["acme".to_string()]);
        assert_eq!(q.token_count(), 1);
    }

    #[test]
    fn test_distinct_orderings() {
        assert_eq!(PermutedQuery::new("a b c", 8).orderings().len(), 6);
        // Repeated tokens collapse duplicate orderings
        assert_eq!(PermutedQuery::new("a a b", 8).orderings().len(), 3);
        assert_eq!(PermutedQuery::new("x  x", 8).orderings(), &["x x".to_string()]);
    }

    #[test]
    fn test_empty_query_is_maximal_distance() {
        let score = permutation_distance("", "acme corp", 8);
        assert_eq!(score.distance, 1.0);
        assert!(!score.degraded);
        assert_eq!(PermutedQuery::new("   ", 8).distance_to("acme"), 1.0);
    }

    #[test]
    fn test_distance_in_unit_range() {
        for (q, c) in [("globax incorporated", "globex inc"), ("stark industries", "acme corp"), ("a", "")] {
            let d = permutation_distance(q, c, 8).distance;
            assert!((0.0..=1.0).contains(&d), "distance {} out of range for {} / {}", d, q, c);
        }
    }

    #[test]
    fn test_token_cap_falls_back_to_original_ordering() {
        let long_name = "one two three four five six seven eight nine ten eleven twelve";
        let q = PermutedQuery::new(long_name, 8);
        assert!(q.is_degraded());
        assert_eq!(q.token_count(), 12);
        assert_eq!(q.orderings(), &[long_name.to_string()]);

        let score = permutation_distance(long_name, long_name, 8);
        assert!(score.degraded);
        assert!(score.distance.abs() < 1e-12);
    }

    #[test]
    fn test_cap_is_inclusive() {
        let q = PermutedQuery::new("a b c d", 4);
        assert!(!q.is_degraded());
        assert_eq!(q.orderings().len(), 24);
        assert!(PermutedQuery::new("a b c d e", 4).is_degraded());
    }

    #[test]
    fn test_expired_deadline_stops_scoring() {
        let q = PermutedQuery::new("a b c d e f", 8);
        assert_eq!(q.distance_within("f e d c b a", Some(Instant::now())), None);
        let unbounded = q.distance_within("f e d c b a", None).unwrap();
        assert!(unbounded.abs() < 1e-12);
        // An empty query never needs scoring
        assert_eq!(PermutedQuery::new("", 8).distance_within("x", Some(Instant::now())), Some(1.0));
    }

    #[test]
    fn test_next_permutation_sequence() {
        let mut v = vec![1, 2, 3];
        let mut seen = vec![v.clone()];
        while next_permutation(&mut v) {
            seen.push(v.clone());
        }
        assert_eq!(
            seen,
            vec![
                vec![1, 2, 3],
                vec![1, 3, 2],
                vec![2, 1, 3],
                vec![2, 3, 1],
                vec![3, 1, 2],
                vec![3, 2, 1]
            ]
        );
    }
}
