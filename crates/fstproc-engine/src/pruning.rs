//! Post-selection pruning over a committed candidate set (§4.4.5): `-N`
//! caps the absolute count, `-L` caps the number of distinct weight
//! classes. Both assume `candidates` is already sorted by ascending weight
//! (the order [`crate::traversal::select_committed`] returns).

use crate::traversal::Candidate;

/// Keeps at most `n` candidates, strongest (lowest-weight) first.
#[must_use]
pub fn prune_max_analyses(candidates: Vec<Candidate>, n: usize) -> Vec<Candidate> {
    let mut candidates = candidates;
    candidates.truncate(n);
    candidates
}

/// Keeps every candidate belonging to one of the `k` lowest-valued distinct
/// weight classes, where a weight class is a maximal run of candidates
/// sharing the same weight bit pattern. Ties within a class are all kept;
/// pruning only ever drops whole classes.
#[must_use]
pub fn prune_weight_classes(candidates: Vec<Candidate>, k: usize) -> Vec<Candidate> {
    if k == 0 {
        return Vec::new();
    }
    let mut out = Vec::with_capacity(candidates.len());
    let mut classes_seen = 0usize;
    let mut last_weight: Option<u64> = None;
    for candidate in candidates {
        let bits = candidate.weight.to_bits();
        if last_weight != Some(bits) {
            classes_seen += 1;
            last_weight = Some(bits);
        }
        if classes_seen > k {
            break;
        }
        out.push(candidate);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(weight: f64, seq: usize) -> Candidate {
        Candidate { input_len: 1, emission: Vec::new(), weight, seq }
    }

    #[test]
    fn max_analyses_keeps_only_the_first_n() {
        let candidates = vec![candidate(0.0, 0), candidate(0.5, 1), candidate(1.0, 2)];
        let pruned = prune_max_analyses(candidates, 2);
        assert_eq!(pruned.len(), 2);
        assert_eq!(pruned[1].seq, 1);
    }

    #[test]
    fn weight_classes_keep_whole_ties_and_drop_whole_classes() {
        let candidates = vec![candidate(0.0, 0), candidate(0.0, 1), candidate(0.5, 2), candidate(1.0, 3)];
        let pruned = prune_weight_classes(candidates, 1);
        assert_eq!(pruned.len(), 2, "both members of the lowest class survive");

        let candidates = vec![candidate(0.0, 0), candidate(0.0, 1), candidate(0.5, 2), candidate(1.0, 3)];
        let pruned = prune_weight_classes(candidates, 2);
        assert_eq!(pruned.len(), 3);
    }

    #[test]
    fn zero_classes_yields_nothing() {
        let candidates = vec![candidate(0.0, 0)];
        assert!(prune_weight_classes(candidates, 0).is_empty());
    }
}
