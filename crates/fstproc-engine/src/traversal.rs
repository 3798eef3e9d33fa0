//! Longest-match, backtracking traversal of a transducer against a
//! sequence of alphabet symbols (§4.4.2).
//!
//! Both directions share this one routine: analysis tokenizes surface text
//! into per-character symbols, generation/bilingual tokenize lexical text
//! (which may contain tags) via [`fstproc_alphabet::Alphabet::tokenize`].

use fstproc_alphabet::{Alphabet, Symbol};
use fstproc_transducer::{State, Transducer, Weight};

use crate::case::fold;
use crate::util::SortedVec;

/// A committed or provisional match result: how much input it consumed,
/// what it emitted, and its accumulated weight.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Number of input symbols consumed to reach this result.
    pub input_len: usize,
    /// The output symbol sequence emitted along this path.
    pub emission: Vec<Symbol>,
    /// Total accumulated weight (path weight plus the final-state weight).
    pub weight: Weight,
    /// Order in which this candidate was recorded, used as the final
    /// tie-break after weight.
    pub seq: usize,
}

#[derive(Debug, Clone)]
struct LivePath {
    state: State,
    weight: Weight,
    emission: Vec<Symbol>,
}

fn matches(
    pair_input: Symbol,
    token: Symbol,
    case_insensitive: bool,
    any_char: Option<Symbol>,
    any_tag: Option<Symbol>,
) -> bool {
    if pair_input == token {
        return true;
    }
    if case_insensitive && pair_input > 0 && token > 0 {
        if let (Some(a), Some(b)) = (char::from_u32(pair_input as u32), char::from_u32(token as u32)) {
            if fold(a) == fold(b) {
                return true;
            }
        }
    }
    if let Some(ac) = any_char {
        if pair_input == ac && token > 0 {
            return true;
        }
    }
    if let Some(at) = any_tag {
        if pair_input == at && token < 0 {
            return true;
        }
    }
    false
}

/// Expands a frontier through "free" moves: edges whose input component is
/// the epsilon symbol, which includes the reflexive `(0,0)` pair (literal
/// epsilon) and input-side insertion arcs `(0, x)`. Both are free in the
/// sense that they consume no input symbol, but insertion arcs still emit
/// an output symbol, which [`fstproc_transducer::Transducer::free_closure`]
/// surfaces as the pair-code path for this function to decode.
fn expand_free_moves(alphabet: &Alphabet, transducer: &Transducer, paths: Vec<LivePath>) -> Vec<LivePath> {
    let mut seen: SortedVec<(State, Vec<Symbol>)> = SortedVec::new();
    let mut out = Vec::new();
    for path in paths {
        let closure = transducer.free_closure(path.state, |pc| pc == 0 || alphabet.decode_pair(pc).0 == 0);
        for (state, added_weight, pair_path) in closure {
            let mut emission = path.emission.clone();
            for pc in pair_path {
                let (_, out_sym) = alphabet.decode_pair(pc);
                if out_sym != 0 {
                    emission.push(out_sym);
                }
            }
            let key = (state, emission.clone());
            if seen.insert(key) {
                out.push(LivePath { state, weight: path.weight + added_weight, emission });
            }
        }
    }
    out
}

fn record_candidates(
    candidates: &mut Vec<Candidate>,
    frontier: &[LivePath],
    transducer: &Transducer,
    input_len: usize,
    seq: &mut usize,
) {
    for path in frontier {
        if let Some(final_weight) = transducer.final_weight(path.state) {
            candidates.push(Candidate {
                input_len,
                emission: path.emission.clone(),
                weight: path.weight + final_weight,
                seq: *seq,
            });
            *seq += 1;
        }
    }
}

/// Simulates `transducer` over `input` non-deterministically, recording a
/// candidate every time any live path lands on a final state. Returns all
/// candidates found at every prefix length, unfiltered — callers apply
/// [`select_committed`] to pick the longest-match set.
#[must_use]
pub fn run_word(alphabet: &Alphabet, transducer: &Transducer, input: &[Symbol], case_insensitive: bool) -> Vec<Candidate> {
    let any_char = alphabet.lookup_tag("<ANY_CHAR>");
    let any_tag = alphabet.lookup_tag("<ANY_TAG>");
    let mut seq = 0usize;
    let mut candidates = Vec::new();

    let mut frontier =
        expand_free_moves(alphabet, transducer, vec![LivePath { state: 0, weight: 0.0, emission: Vec::new() }]);
    record_candidates(&mut candidates, &frontier, transducer, 0, &mut seq);

    for (pos, &token) in input.iter().enumerate() {
        let mut next = Vec::new();
        for path in &frontier {
            for pair_code in transducer.out_pair_codes(path.state) {
                let (in_sym, out_sym) = alphabet.decode_pair(pair_code);
                if in_sym == 0 {
                    continue; // free move, handled by expand_free_moves
                }
                if matches(in_sym, token, case_insensitive, any_char, any_tag) {
                    for edge in transducer.edges(path.state, pair_code) {
                        let mut emission = path.emission.clone();
                        if out_sym != 0 {
                            emission.push(out_sym);
                        }
                        next.push(LivePath { state: edge.target, weight: path.weight + edge.weight, emission });
                    }
                }
            }
        }
        if next.is_empty() {
            break;
        }
        frontier = expand_free_moves(alphabet, transducer, next);
        record_candidates(&mut candidates, &frontier, transducer, pos + 1, &mut seq);
    }

    candidates
}

/// Picks the longest-input candidate set from `candidates` and orders it by
/// (ascending weight, then insertion order) per §4.4.2 / §5.
#[must_use]
pub fn select_committed(candidates: Vec<Candidate>) -> Vec<Candidate> {
    let Some(max_len) = candidates.iter().map(|c| c.input_len).max() else {
        return Vec::new();
    };
    let mut committed: Vec<Candidate> = candidates.into_iter().filter(|c| c.input_len == max_len).collect();
    committed.sort_by(|a, b| a.weight.partial_cmp(&b.weight).unwrap_or(std::cmp::Ordering::Equal).then(a.seq.cmp(&b.seq)));
    committed
}

#[cfg(test)]
mod tests {
    use super::*;
    use fstproc_transducer::Transducer;

    fn cats_transducer(alphabet: &mut Alphabet) -> Transducer {
        // cats -> cat<n><pl>
        let n = alphabet.intern_tag("<n>");
        let pl = alphabet.intern_tag("<pl>");
        let mut t = Transducer::with_states(6);
        let pc = |a: &mut Alphabet, c: char| a.encode_pair(c as Symbol, c as Symbol);
        t.add_edge(0, pc(alphabet, 'c'), 1, 0.0);
        t.add_edge(1, pc(alphabet, 'a'), 2, 0.0);
        t.add_edge(2, pc(alphabet, 't'), 3, 0.0);
        let p_n = alphabet.encode_pair(0, n);
        let p_pl = alphabet.encode_pair(0, pl);
        t.add_edge(3, p_n, 4, 0.0);
        t.add_edge(4, p_pl, 5, 0.0);
        t.add_edge(3, pc(alphabet, 's'), 5, 0.0); // 's' maps straight through too, alt path
        t.set_final(5, 0.0);
        t
    }

    #[test]
    fn longest_match_commits_full_word() {
        let mut alphabet = Alphabet::new();
        let t = cats_transducer(&mut alphabet);
        let input: Vec<Symbol> = "cats".chars().map(|c| c as Symbol).collect();
        let candidates = run_word(&alphabet, &t, &input, false);
        let committed = select_committed(candidates);
        assert!(!committed.is_empty());
        let best = &committed[0];
        assert_eq!(best.input_len, 4);
    }

    #[test]
    fn no_match_yields_no_candidates() {
        let mut alphabet = Alphabet::new();
        let t = cats_transducer(&mut alphabet);
        let input: Vec<Symbol> = "xyzzy".chars().map(|c| c as Symbol).collect();
        let candidates = run_word(&alphabet, &t, &input, false);
        let committed = select_committed(candidates);
        assert!(committed.is_empty());
    }
}
