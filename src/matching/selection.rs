// src/matching/selection.rs - Top-K selection and interleave merge
use std::cmp::Ordering;
use std::collections::HashSet;

use crate::models::core::CandidateSet;

fn by_distance_then_index(a: &(usize, f64), b: &(usize, f64)) -> Ordering {
    a.1.total_cmp(&b.1).then_with(|| a.0.cmp(&b.0))
}

/// Indices of the `k` smallest distances, ascending. Equal distances keep
/// master-table order (lower index first). Indices are assumed unique.
pub fn top_k(mut distances: Vec<(usize, f64)>, k: usize) -> CandidateSet {
    if k == 0 || distances.is_empty() {
        return Vec::new();
    }

    if distances.len() > k {
        distances.select_nth_unstable_by(k - 1, by_distance_then_index);
        distances.truncate(k);
    }
    distances.sort_unstable_by(by_distance_then_index);
    distances.into_iter().map(|(idx, _)| idx).collect()
}

/// Alternates between `top_a` and `top_b`, one element from each per round,
/// until both are drained or `k` indices have been emitted. An index already
/// emitted is skipped and that list's turn for the round is spent.
pub fn interleave_merge(top_a: &[usize], top_b: &[usize], k: usize) -> CandidateSet {
    let mut merged = Vec::with_capacity(k.min(top_a.len() + top_b.len()));
    let mut seen = HashSet::with_capacity(merged.capacity());
    let mut a = top_a.iter();
    let mut b = top_b.iter();

    while merged.len() < k {
        let next_a = a.next();
        if let Some(&idx) = next_a {
            if seen.insert(idx) {
                merged.push(idx);
                if merged.len() == k {
                    break;
                }
            }
        }

        let next_b = b.next();
        if let Some(&idx) = next_b {
            if seen.insert(idx) {
                merged.push(idx);
            }
        }

        if next_a.is_none() && next_b.is_none() {
            break;
        }
    }

    merged
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_top_k_ascending() {
        let d = vec![(0, 0.9), (1, 0.1), (2, 0.5), (3, 0.3)];
        assert_eq!(top_k(d, 3), vec![1, 3, 2]);
    }

    #[test]
    fn test_top_k_stable_ties() {
        let d = vec![(0, 0.5), (1, 0.2), (2, 0.5), (3, 0.2), (4, 0.5)];
        assert_eq!(top_k(d.clone(), 5), vec![1, 3, 0, 2, 4]);
        assert_eq!(top_k(d, 3), vec![1, 3, 0]);

        // Input order does not matter, master index decides
        let shuffled = vec![(4, 0.5), (2, 0.5), (0, 0.5)];
        assert_eq!(top_k(shuffled, 2), vec![0, 2]);
    }

    #[test]
    fn test_top_k_bounds() {
        let d: Vec<(usize, f64)> = (0..25).map(|i| (i, 1.0 - i as f64 / 100.0)).collect();
        let picked = top_k(d, 10);
        assert_eq!(picked.len(), 10);
        assert_eq!(picked, (15..25).rev().collect::<Vec<_>>());

        assert_eq!(top_k(vec![(0, 0.1), (1, 0.2)], 10), vec![0, 1]);
        assert!(top_k(vec![(0, 0.1)], 0).is_empty());
        assert!(top_k(Vec::new(), 10).is_empty());
    }

    #[test]
    fn test_top_k_no_duplicates() {
        let d: Vec<(usize, f64)> = (0..50).map(|i| (i, (i % 3) as f64)).collect();
        let picked = top_k(d, 10);
        let unique: HashSet<_> = picked.iter().collect();
        assert_eq!(unique.len(), picked.len());
    }

    #[test]
    fn test_merge_alternates() {
        assert_eq!(interleave_merge(&[1, 2, 3], &[4, 5, 6], 10), vec![1, 4, 2, 5, 3, 6]);
    }

    #[test]
    fn test_merge_duplicate_spends_turn() {
        // The second 1 is dropped rather than replaced by 4 in the same round
        assert_eq!(interleave_merge(&[1, 2, 3], &[1, 4, 5], 10), vec![1, 2, 4, 3, 5]);
        assert_eq!(interleave_merge(&[7, 8], &[8, 7], 10), vec![7, 8]);
    }

    #[test]
    fn test_merge_truncates_to_k() {
        let a: Vec<usize> = (0..10).collect();
        let b: Vec<usize> = (10..20).collect();
        let merged = interleave_merge(&a, &b, 10);
        assert_eq!(merged, vec![0, 10, 1, 11, 2, 12, 3, 13, 4, 14]);

        assert_eq!(interleave_merge(&[1, 2], &[3, 4], 3), vec![1, 3, 2]);
    }

    #[test]
    fn test_merge_drains_longer_list() {
        assert_eq!(interleave_merge(&[1], &[2, 3, 4], 10), vec![1, 2, 3, 4]);
        assert_eq!(interleave_merge(&[1, 2, 3], &[], 10), vec![1, 2, 3]);
        assert!(interleave_merge(&[], &[], 10).is_empty());
    }

    #[test]
    fn test_merge_first_occurrence_keeps_rank() {
        let merged = interleave_merge(&[5, 6, 7], &[9, 5, 6], 10);
        assert_eq!(merged, vec![5, 9, 6, 7]);
        let unique: HashSet<_> = merged.iter().collect();
        assert_eq!(unique.len(), merged.len());
    }
}
