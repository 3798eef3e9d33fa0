//! fstproc-transducer — compact storage for one compiled finite-state
//! transducer (C3).
//!
//! A [`Transducer`] is a directed graph over integer states. States are
//! addressed `0..num_states`; state `0` is always the initial state in
//! serialised form. Each state carries an optional final weight and a
//! sorted, contiguous list of out-edges keyed by alphabet pair code, so the
//! hot-path lookup in [`Transducer::edges`] is a binary search over a flat
//! slice rather than a hash lookup.

#![deny(missing_docs)]

use std::io::{Read, Write};

use smallvec::SmallVec;

use fstproc_core::varint::{read_uint, write_uint};
use fstproc_core::CoreResult;

/// A transducer state index.
pub type State = u32;

/// An accumulated or per-edge weight. Finite real number; lower is better.
pub type Weight = f64;

/// A single transducer edge: a target state and the weight added when
/// taking it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Edge {
    /// State reached by this edge.
    pub target: State,
    /// Weight contributed by traversing this edge.
    pub weight: Weight,
}

/// Up to two edges inline before spilling to the heap; non-determinism
/// commonly produces only a handful of parallel edges per (state, pair).
type EdgeSet = SmallVec<[Edge; 2]>;

/// Per-state out-edges, sorted by pair code for binary-search dispatch.
type StateEdges = Vec<(u32, EdgeSet)>;

/// A compiled finite-state transducer: states, final weights, and
/// transitions keyed by alphabet pair code.
#[derive(Debug, Clone)]
pub struct Transducer {
    finals: Vec<Option<Weight>>,
    transitions: Vec<StateEdges>,
}

impl Transducer {
    /// Creates an empty transducer with `num_states` states, none final and
    /// none connected. Callers populate it with [`Transducer::add_edge`] and
    /// [`Transducer::set_final`].
    #[must_use]
    pub fn with_states(num_states: usize) -> Self {
        Self { finals: vec![None; num_states], transitions: vec![Vec::new(); num_states] }
    }

    /// Number of states in the transducer.
    #[must_use]
    pub fn num_states(&self) -> usize {
        self.transitions.len()
    }

    /// Marks `state` final with the given weight, overwriting any previous
    /// final weight for that state.
    pub fn set_final(&mut self, state: State, weight: Weight) {
        self.finals[state as usize] = Some(weight);
    }

    /// `true` iff `state` is a final state.
    #[must_use]
    pub fn is_final(&self, state: State) -> bool {
        self.finals[state as usize].is_some()
    }

    /// The final weight of `state`, or `None` if it is not final.
    #[must_use]
    pub fn final_weight(&self, state: State) -> Option<Weight> {
        self.finals[state as usize]
    }

    /// Adds an out-edge `state --pair_code/weight--> target`. Multiple
    /// edges for the same `(state, pair_code)` are kept (non-determinism).
    pub fn add_edge(&mut self, state: State, pair_code: u32, target: State, weight: Weight) {
        let row = &mut self.transitions[state as usize];
        match row.binary_search_by_key(&pair_code, |(p, _)| *p) {
            Ok(idx) => row[idx].1.push(Edge { target, weight }),
            Err(idx) => {
                let mut set = EdgeSet::new();
                set.push(Edge { target, weight });
                row.insert(idx, (pair_code, set));
            }
        }
    }

    /// Out-edges of `state` labelled with `pair_code`, or an empty slice if
    /// there are none.
    #[must_use]
    pub fn edges(&self, state: State, pair_code: u32) -> &[Edge] {
        let row = &self.transitions[state as usize];
        match row.binary_search_by_key(&pair_code, |(p, _)| *p) {
            Ok(idx) => &row[idx].1,
            Err(_) => &[],
        }
    }

    /// Iterates over the pair codes labelling `state`'s out-edges.
    pub fn out_pair_codes(&self, state: State) -> impl Iterator<Item = u32> + '_ {
        self.transitions[state as usize].iter().map(|(pair_code, _)| *pair_code)
    }

    /// Iterates over every distinct pair code referenced by any state's
    /// out-edges. Used by callers that validate a freshly loaded transducer
    /// against an alphabet's pair table.
    pub fn referenced_pair_codes(&self) -> impl Iterator<Item = u32> + '_ {
        self.transitions.iter().flat_map(|row| row.iter().map(|(pair_code, _)| *pair_code))
    }

    /// The reflexive epsilon closure of `state`: every state reachable from
    /// `state` by zero or more pair-code-`0` edges, each paired with the
    /// accumulated weight of the epsilon path that reached it (the first
    /// path found; the graph may contain epsilon cycles, so each state is
    /// visited at most once).
    #[must_use]
    pub fn epsilon_closure(&self, state: State) -> Vec<(State, Weight)> {
        let mut visited = vec![false; self.num_states()];
        let mut out = Vec::new();
        let mut stack = vec![(state, 0.0)];
        visited[state as usize] = true;
        out.push((state, 0.0));
        while let Some((s, w)) = stack.pop() {
            for edge in self.edges(s, 0) {
                if !visited[edge.target as usize] {
                    visited[edge.target as usize] = true;
                    let acc = w + edge.weight;
                    out.push((edge.target, acc));
                    stack.push((edge.target, acc));
                }
            }
        }
        out
    }

    /// A generalised closure over "free" edges: edges for which
    /// `is_free(pair_code)` holds are followed without being counted as
    /// consuming an input symbol. Returns, for every reachable state, the
    /// accumulated weight and the sequence of pair codes traversed to reach
    /// it (so a caller that can decode pair codes, e.g. against an
    /// alphabet, can recover any output emitted along the way). Each state
    /// is visited at most once, so epsilon cycles terminate.
    ///
    /// This generalises [`Transducer::epsilon_closure`] to cover input-side
    /// insertion arcs (pair code with input component `0` but a non-zero
    /// output component) alongside the fully-silent `(0,0)` pair — see
    /// this workspace's design notes on why pair code `0` alone is too
    /// narrow for real compiled transducers.
    #[must_use]
    pub fn free_closure<F: Fn(u32) -> bool>(&self, state: State, is_free: F) -> Vec<(State, Weight, Vec<u32>)> {
        let mut best: Vec<Option<usize>> = vec![None; self.num_states()];
        let mut out: Vec<(State, Weight, Vec<u32>)> = Vec::new();
        let mut stack = vec![(state, 0.0, Vec::<u32>::new())];
        best[state as usize] = Some(0);
        out.push((state, 0.0, Vec::new()));
        while let Some((s, w, path)) = stack.pop() {
            for pair_code in self.out_pair_codes(s) {
                if !is_free(pair_code) {
                    continue;
                }
                for edge in self.edges(s, pair_code) {
                    if best[edge.target as usize].is_some() {
                        continue;
                    }
                    let acc = w + edge.weight;
                    let mut next_path = path.clone();
                    next_path.push(pair_code);
                    best[edge.target as usize] = Some(out.len());
                    out.push((edge.target, acc, next_path.clone()));
                    stack.push((edge.target, acc, next_path));
                }
            }
        }
        out
    }

    /// Serialises the transducer: state count, then per state a final-weight
    /// marker (and weight if present), then its out-edges as
    /// `(pair_code, target_state, weight)` triples.
    ///
    /// Weights are written as raw little-endian `f64` bytes: the multibyte
    /// codec is defined only over non-negative integers, so it is used for
    /// counts, pair codes, and state indices, while weights bypass it.
    pub fn write<W: Write>(&self, w: &mut W) -> CoreResult<()> {
        write_uint(w, self.num_states() as u32)?;
        for state in 0..self.num_states() {
            match self.finals[state] {
                Some(weight) => {
                    write_uint(w, 1)?;
                    w.write_all(&weight.to_le_bytes())?;
                }
                None => write_uint(w, 0)?,
            }

            let row = &self.transitions[state];
            write_uint(w, row.len() as u32)?;
            for (pair_code, edges) in row {
                write_uint(w, *pair_code)?;
                write_uint(w, edges.len() as u32)?;
                for edge in edges {
                    write_uint(w, edge.target)?;
                    w.write_all(&edge.weight.to_le_bytes())?;
                }
            }
        }
        Ok(())
    }

    /// Deserialises a transducer written by [`Transducer::write`].
    pub fn read<R: Read>(r: &mut R) -> CoreResult<Self> {
        let num_states = read_uint(r)? as usize;
        let mut finals = Vec::with_capacity(num_states);
        let mut transitions = Vec::with_capacity(num_states);

        for _ in 0..num_states {
            let has_final = read_uint(r)?;
            if has_final != 0 {
                finals.push(Some(read_weight(r)?));
            } else {
                finals.push(None);
            }

            let pair_count = read_uint(r)? as usize;
            let mut row: StateEdges = Vec::with_capacity(pair_count);
            for _ in 0..pair_count {
                let pair_code = read_uint(r)?;
                let edge_count = read_uint(r)? as usize;
                let mut set = EdgeSet::with_capacity(edge_count);
                for _ in 0..edge_count {
                    let target = read_uint(r)?;
                    let weight = read_weight(r)?;
                    set.push(Edge { target, weight });
                }
                row.push((pair_code, set));
            }
            transitions.push(row);
        }

        Ok(Self { finals, transitions })
    }
}

fn read_weight<R: Read>(r: &mut R) -> CoreResult<Weight> {
    let mut buf = [0u8; 8];
    r.read_exact(&mut buf).map_err(fstproc_core::CoreError::Io)?;
    Ok(f64::from_le_bytes(buf))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn sample() -> Transducer {
        // 0 --('c','c')--> 1 --eps--> 2 (final, weight 0.5)
        let mut t = Transducer::with_states(3);
        t.add_edge(0, 5, 1, 1.0);
        t.add_edge(1, 0, 2, 0.25);
        t.set_final(2, 0.5);
        t
    }

    #[test]
    fn edges_lookup_by_pair_code() {
        let t = sample();
        assert_eq!(t.edges(0, 5), &[Edge { target: 1, weight: 1.0 }]);
        assert!(t.edges(0, 999).is_empty());
    }

    #[test]
    fn multiple_edges_for_same_pair_are_kept() {
        let mut t = Transducer::with_states(2);
        t.add_edge(0, 1, 1, 0.1);
        t.add_edge(0, 1, 1, 0.2);
        assert_eq!(t.edges(0, 1).len(), 2);
    }

    #[test]
    fn final_state_reports_weight() {
        let t = sample();
        assert!(!t.is_final(1));
        assert!(t.is_final(2));
        assert_eq!(t.final_weight(2), Some(0.5));
        assert_eq!(t.final_weight(0), None);
    }

    #[test]
    fn epsilon_closure_is_reflexive_and_follows_eps_edges() {
        let t = sample();
        let mut closure = t.epsilon_closure(1);
        closure.sort_by_key(|(s, _)| *s);
        assert_eq!(closure, vec![(1, 0.0), (2, 0.25)]);
    }

    #[test]
    fn epsilon_closure_terminates_on_cycles() {
        let mut t = Transducer::with_states(2);
        t.add_edge(0, 0, 1, 1.0);
        t.add_edge(1, 0, 0, 1.0); // cycle back to 0
        let closure = t.epsilon_closure(0);
        assert_eq!(closure.len(), 2);
    }

    #[test]
    fn roundtrip_preserves_states_finals_and_edges() {
        let t = sample();
        let mut buf = Vec::new();
        t.write(&mut buf).unwrap();
        let mut cur = Cursor::new(buf);
        let t2 = Transducer::read(&mut cur).unwrap();

        assert_eq!(t2.num_states(), t.num_states());
        for s in 0..t.num_states() as State {
            assert_eq!(t2.final_weight(s), t.final_weight(s));
        }
        assert_eq!(t2.edges(0, 5), t.edges(0, 5));
        assert_eq!(t2.edges(1, 0), t.edges(1, 0));
    }
}
