//! fstproc-alphabet — the alphabet of (input, output) symbol pairs (C2).
//!
//! An [`Alphabet`] is a compact, reversible encoding that maps
//! `(input-symbol, output-symbol)` pairs of a transducer into dense integer
//! pair codes, and registers multi-character tag strings (`<n>`, `<pl>`, …)
//! under negative symbol codes. See the crate-level invariants enforced by
//! [`Alphabet`]'s methods and exercised in the test module at the bottom of
//! this file.

#![deny(missing_docs)]

use std::collections::HashMap;
use std::io::{Read, Write};

use fstproc_core::varint::{read_u16string, read_uint, write_u16string, write_uint};
use fstproc_core::CoreResult;

/// A single symbol code. Positive values are Unicode scalar values, negative
/// values are tag indices (`-t-1` names the tag at position `t` in the tag
/// list), and zero is the epsilon / no-symbol sentinel.
pub type Symbol = i32;

/// A dense, non-negative index naming a `(input, output)` pair in the
/// alphabet's pair table.
pub type PairCode = u32;

/// Which side of a pair a loopback projection should read from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    /// Project the input (left) component of each pair.
    Left,
    /// Project the output (right) component of each pair.
    Right,
}

/// Errors that can arise while reading an alphabet from a container.
#[derive(Debug, thiserror::Error)]
pub enum AlphabetError {
    /// Lower-level codec failure (truncated stream, bad varint, bad UTF-16).
    #[error(transparent)]
    Core(#[from] fstproc_core::CoreError),
}

/// Result alias for alphabet operations that can fail.
pub type AlphabetResult<T> = Result<T, AlphabetError>;

/// Bidirectional map between `(input, output)` symbol pairs and dense pair
/// codes, plus the registry of multi-character tag strings.
///
/// Invariants (see spec §3):
/// - `tag_index[tags[i]] == -(i as Symbol + 1)` for every `i`.
/// - `pair_index[pairs[k]] == k` for every `k`.
/// - `pairs[0] == (0, 0)` and `pair_index[(0, 0)] == 0`.
/// - codes are stable once assigned: new entries only ever extend the
///   sequences, never renumber existing ones.
#[derive(Debug, Clone)]
pub struct Alphabet {
    tags: Vec<String>,
    tag_index: HashMap<String, Symbol>,
    pairs: Vec<(Symbol, Symbol)>,
    pair_index: HashMap<(Symbol, Symbol), PairCode>,
}

impl Default for Alphabet {
    fn default() -> Self {
        let mut a = Self {
            tags: Vec::new(),
            tag_index: HashMap::new(),
            pairs: Vec::new(),
            pair_index: HashMap::new(),
        };
        // pairs[0] == (0, 0), per the invariant in spec §3.
        a.pairs.push((0, 0));
        a.pair_index.insert((0, 0), 0);
        a
    }
}

impl Alphabet {
    /// Creates an empty alphabet (already containing the `(0,0)` epsilon
    /// pair at code 0).
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `s` (which must already include its surrounding angle
    /// brackets, e.g. `"<n>"`) as a tag if it is not already known, and
    /// returns its tag code.
    pub fn intern_tag(&mut self, s: &str) -> Symbol {
        if let Some(&code) = self.tag_index.get(s) {
            return code;
        }
        // Tag indices are always produced via an explicit signed
        // conversion from the (unsigned) current length, never via
        // unsigned subtraction — see DESIGN.md's resolved Open Question.
        let code: Symbol = -(self.tags.len() as Symbol + 1);
        self.tags.push(s.to_string());
        self.tag_index.insert(s.to_string(), code);
        code
    }

    /// Returns the tag code for `s` without creating it. Agrees with
    /// [`Alphabet::lookup_tag_mut`].
    pub fn lookup_tag(&self, s: &str) -> Option<Symbol> {
        self.tag_index.get(s).copied()
    }

    /// Read-only-equivalent lookup exposed through a `&mut self` receiver
    /// for callers that only have mutable access at hand; must never
    /// auto-create a tag, and must agree with [`Alphabet::lookup_tag`].
    pub fn lookup_tag_mut(&mut self, s: &str) -> Option<Symbol> {
        self.tag_index.get(s).copied()
    }

    /// Registers the pair `(a, b)` if not already present, and returns its
    /// pair code. Always succeeds.
    pub fn encode_pair(&mut self, a: Symbol, b: Symbol) -> PairCode {
        if let Some(&code) = self.pair_index.get(&(a, b)) {
            return code;
        }
        let code = self.pairs.len() as PairCode;
        self.pairs.push((a, b));
        self.pair_index.insert((a, b), code);
        code
    }

    /// Returns `pairs[k]`. Out-of-range codes are a programmer error: the
    /// transducer layer must never reference a pair code the alphabet does
    /// not know about.
    pub fn decode_pair(&self, k: PairCode) -> (Symbol, Symbol) {
        self.pairs
            .get(k as usize)
            .copied()
            .unwrap_or_else(|| panic!("pair code {k} out of range (alphabet has {} pairs)", self.pairs.len()))
    }

    /// Number of distinct tags registered.
    pub fn tag_count(&self) -> usize {
        self.tags.len()
    }

    /// Number of distinct pairs registered (always `>= 1`, for the `(0,0)`
    /// epsilon pair).
    pub fn pair_count(&self) -> usize {
        self.pairs.len()
    }

    /// `true` iff `code` names a tag rather than a literal character.
    #[must_use]
    pub fn is_tag(code: Symbol) -> bool {
        code < 0
    }

    /// Appends the textual rendering of `code` to `out`: the tag string for
    /// negative codes, the (optionally uppercased) character for positive
    /// codes, and nothing for the epsilon code `0`.
    pub fn render(&self, code: Symbol, upper: bool, out: &mut String) {
        if code == 0 {
            return;
        }
        if code < 0 {
            let idx = (-code - 1) as usize;
            out.push_str(&self.tags[idx]);
        } else if let Some(c) = char::from_u32(code as u32) {
            if upper {
                out.extend(c.to_uppercase());
            } else {
                out.push(c);
            }
        }
    }

    /// Scans `text` into a sequence of symbol codes.
    ///
    /// - A backslash is consumed silently; the next code point is then
    ///   tokenized normally (escape semantics are the caller's business).
    /// - `<` begins a tag: the bracketed substring up to the matching `>`
    ///   must already be a known tag (looked up, never interned here); its
    ///   code is emitted. An unterminated `<…` (no closing `>` before the
    ///   end of `text`) is silently dropped, and scanning resumes character
    ///   by character from right after the `<` — this mirrors the original
    ///   engine's behaviour exactly (see DESIGN.md).
    /// - Any other code point is emitted as its scalar value.
    pub fn tokenize(&self, text: &str) -> Vec<Symbol> {
        let chars: Vec<char> = text.chars().collect();
        let mut out = Vec::new();
        let mut i = 0usize;
        while i < chars.len() {
            let c = chars[i];
            i += 1;
            if c == '\\' {
                continue;
            } else if c == '<' {
                let mut j = i;
                let mut closed = false;
                while j < chars.len() {
                    let cj = chars[j];
                    j += 1;
                    if cj == '>' {
                        closed = true;
                        break;
                    }
                }
                if closed {
                    let tag: String = std::iter::once('<').chain(chars[i..j].iter().copied()).collect();
                    if let Some(code) = self.lookup_tag(&tag) {
                        out.push(code);
                    }
                    i = j;
                }
                // unterminated: drop the '<', resume at i (unchanged)
            } else {
                out.push(c as Symbol);
            }
        }
        out
    }

    /// Cross-alphabet symbol equality. `true` iff both sides are the same
    /// positive scalar, both are tags with equal tag strings, or
    /// `allow_any` is set and one side is the appropriate wildcard tag
    /// (`<ANY_CHAR>` matches any positive code, `<ANY_TAG>` matches any
    /// negative code).
    pub fn same_symbol(&self, a: Symbol, other: &Alphabet, b: Symbol, allow_any: bool) -> bool {
        if a >= 0 && a == b {
            return true;
        }
        if a < 0 && b < 0 && self.tags[(-a - 1) as usize] == other.tags[(-b - 1) as usize] {
            return true;
        }
        if allow_any {
            if a < 0 && self.tags[(-a - 1) as usize] == "<ANY_CHAR>" && b > 0 {
                return true;
            }
            if a < 0 && self.tags[(-a - 1) as usize] == "<ANY_TAG>" && b < 0 {
                return true;
            }
            if b < 0 && other.tags[(-b - 1) as usize] == "<ANY_CHAR>" && a > 0 {
                return true;
            }
            if b < 0 && other.tags[(-b - 1) as usize] == "<ANY_TAG>" && a < 0 {
                return true;
            }
        }
        false
    }

    /// Returns the pair codes whose input component equals `l`.
    pub fn symbols_with_left(&self, l: Symbol) -> Vec<PairCode> {
        self.pairs
            .iter()
            .enumerate()
            .filter(|(_, &(a, _))| a == l)
            .map(|(k, _)| k as PairCode)
            .collect()
    }

    /// Projects one side of `basis`'s pair table into `self` as identity
    /// pairs `(x, x)`, re-interning any tags seen on that side. Returns the
    /// set of pair codes inserted into `self`. Idempotent: calling this
    /// twice with the same arguments yields the same set of codes, because
    /// both [`Alphabet::intern_tag`] and [`Alphabet::encode_pair`] are
    /// themselves idempotent.
    pub fn create_loopback_symbols(&mut self, basis: &Alphabet, side: Side, include_non_tags: bool) -> Vec<PairCode> {
        let mut inserted = Vec::new();
        let mut tag_symbols_seen: Vec<Symbol> = Vec::new();

        for &(a, b) in &basis.pairs {
            let side_symbol = match side {
                Side::Left => a,
                Side::Right => b,
            };
            if Self::is_tag(side_symbol) {
                if !tag_symbols_seen.contains(&side_symbol) {
                    tag_symbols_seen.push(side_symbol);
                }
            } else if include_non_tags {
                let code = self.encode_pair(side_symbol, side_symbol);
                inserted.push(code);
            }
        }

        for &sym in &tag_symbols_seen {
            let name = &basis.tags[(-sym - 1) as usize];
            let new_code = self.intern_tag(name);
            let code = self.encode_pair(new_code, new_code);
            inserted.push(code);
        }

        inserted
    }

    /// Serialises the alphabet: tag list first (interiors only, brackets
    /// stripped), then the pair table with both components biased by
    /// `tags.len()` so every written value is non-negative.
    pub fn write<W: Write>(&self, w: &mut W) -> CoreResult<()> {
        write_uint(w, self.tags.len() as u32)?;
        for tag in &self.tags {
            let interior = tag.strip_prefix('<').and_then(|s| s.strip_suffix('>')).unwrap_or(tag);
            write_u16string(w, interior)?;
        }

        write_uint(w, self.pairs.len() as u32)?;
        let bias = self.tags.len() as i64;
        for &(a, b) in &self.pairs {
            write_uint(w, (i64::from(a) + bias) as u32)?;
            write_uint(w, (i64::from(b) + bias) as u32)?;
        }
        Ok(())
    }

    /// Deserialises an alphabet written by [`Alphabet::write`].
    pub fn read<R: Read>(r: &mut R) -> CoreResult<Self> {
        let tag_count = read_uint(r)? as usize;
        let mut tags = Vec::with_capacity(tag_count);
        let mut tag_index = HashMap::with_capacity(tag_count);
        for i in 0..tag_count {
            let interior = read_u16string(r)?;
            let full = format!("<{interior}>");
            // explicit signed conversion — see DESIGN.md's resolved Open Question
            let code: Symbol = -(i as Symbol + 1);
            tag_index.insert(full.clone(), code);
            tags.push(full);
        }

        let pair_count = read_uint(r)? as usize;
        let mut pairs = Vec::with_capacity(pair_count.max(1));
        let mut pair_index = HashMap::with_capacity(pair_count.max(1));
        let bias = tags.len() as i64;
        for k in 0..pair_count {
            let a_raw = i64::from(read_uint(r)?);
            let b_raw = i64::from(read_uint(r)?);
            let pair = ((a_raw - bias) as Symbol, (b_raw - bias) as Symbol);
            pairs.push(pair);
            pair_index.insert(pair, k as PairCode);
        }

        if pairs.is_empty() {
            pairs.push((0, 0));
            pair_index.insert((0, 0), 0);
        }

        Ok(Self { tags, tag_index, pairs, pair_index })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    #[test]
    fn epsilon_pair_is_preloaded() {
        let a = Alphabet::new();
        assert_eq!(a.decode_pair(0), (0, 0));
        assert_eq!(a.pair_count(), 1);
    }

    #[test]
    fn intern_tag_assigns_stable_negative_codes() {
        let mut a = Alphabet::new();
        let n = a.intern_tag("<n>");
        let pl = a.intern_tag("<pl>");
        assert_eq!(n, -1);
        assert_eq!(pl, -2);
        assert_eq!(a.intern_tag("<n>"), n, "re-interning must not move the code");
        assert!(Alphabet::is_tag(n) && Alphabet::is_tag(pl));
    }

    #[test]
    fn encode_pair_is_stable_and_dense() {
        let mut a = Alphabet::new();
        let p1 = a.encode_pair('c' as Symbol, 'c' as Symbol);
        let p2 = a.encode_pair('a' as Symbol, 'a' as Symbol);
        assert_eq!(a.encode_pair('c' as Symbol, 'c' as Symbol), p1);
        assert_ne!(p1, p2);
        assert_eq!(a.decode_pair(p1), ('c' as Symbol, 'c' as Symbol));
    }

    #[test]
    fn lookup_tag_variants_agree_and_never_autocreate() {
        let mut a = Alphabet::new();
        assert_eq!(a.lookup_tag("<n>"), None);
        assert_eq!(a.lookup_tag_mut("<n>"), None);
        assert_eq!(a.tag_count(), 0, "lookup must not have interned anything");
        let n = a.intern_tag("<n>");
        assert_eq!(a.lookup_tag("<n>"), Some(n));
        assert_eq!(a.lookup_tag_mut("<n>"), Some(n));
    }

    #[test]
    fn render_tag_char_and_epsilon() {
        let mut a = Alphabet::new();
        let n = a.intern_tag("<n>");
        let mut out = String::new();
        a.render(n, false, &mut out);
        assert_eq!(out, "<n>");

        out.clear();
        a.render('a' as Symbol, false, &mut out);
        a.render('a' as Symbol, true, &mut out);
        assert_eq!(out, "aA");

        out.clear();
        a.render(0, false, &mut out);
        assert_eq!(out, "");
    }

    #[test]
    fn tokenize_render_inverse_for_tag_free_text() {
        let a = Alphabet::new();
        let s = "cats and dogs";
        let codes = a.tokenize(s);
        let mut out = String::new();
        for c in codes {
            a.render(c, false, &mut out);
        }
        assert_eq!(out, s);
    }

    #[test]
    fn tokenize_known_tag_emits_its_code() {
        let mut a = Alphabet::new();
        let n = a.intern_tag("<n>");
        let codes = a.tokenize("cat<n>");
        assert_eq!(codes, vec!['c' as Symbol, 'a' as Symbol, 't' as Symbol, n]);
    }

    #[test]
    fn tokenize_drops_backslash_and_unknown_unterminated_tag() {
        let a = Alphabet::new();
        // backslash is swallowed, next char literal
        assert_eq!(a.tokenize("a\\b"), vec!['a' as Symbol, 'b' as Symbol]);
        // unterminated tag: '<' dropped, rest tokenized char by char
        assert_eq!(a.tokenize("<abc"), vec!['a' as Symbol, 'b' as Symbol, 'c' as Symbol]);
        // unknown but well-formed tag: silently produces nothing for it
        assert_eq!(a.tokenize("<xyz>"), Vec::<Symbol>::new());
    }

    #[test]
    fn same_symbol_matches_chars_tags_and_wildcards() {
        let mut a = Alphabet::new();
        let mut b = Alphabet::new();
        let a_n = a.intern_tag("<n>");
        let b_n = b.intern_tag("<n>");
        assert!(a.same_symbol('x' as Symbol, &b, 'x' as Symbol, false));
        assert!(a.same_symbol(a_n, &b, b_n, false));
        assert!(!a.same_symbol('x' as Symbol, &b, 'y' as Symbol, false));

        let a_any_char = a.intern_tag("<ANY_CHAR>");
        assert!(a.same_symbol(a_any_char, &b, 'z' as Symbol, true));
        assert!(!a.same_symbol(a_any_char, &b, 'z' as Symbol, false));
    }

    #[test]
    fn symbols_with_left_filters_by_input_component() {
        let mut a = Alphabet::new();
        let p1 = a.encode_pair('a' as Symbol, 'x' as Symbol);
        let _p2 = a.encode_pair('a' as Symbol, 'y' as Symbol);
        let _p3 = a.encode_pair('b' as Symbol, 'x' as Symbol);
        let mut found = a.symbols_with_left('a' as Symbol);
        found.sort_unstable();
        assert_eq!(found, vec![p1, _p2]);
    }

    #[test]
    fn create_loopback_symbols_is_idempotent() {
        let mut basis = Alphabet::new();
        basis.encode_pair('a' as Symbol, 'a' as Symbol);
        let n = basis.intern_tag("<n>");
        basis.encode_pair(n, n);

        let mut target = Alphabet::new();
        let first = target.create_loopback_symbols(&basis, Side::Left, true);
        let second = target.create_loopback_symbols(&basis, Side::Left, true);
        assert_eq!(first, second);
    }

    #[test]
    fn roundtrip_preserves_tags_pairs_and_indices() {
        let mut a = Alphabet::new();
        let n = a.intern_tag("<n>");
        let pl = a.intern_tag("<pl>");
        a.encode_pair('c' as Symbol, 'c' as Symbol);
        a.encode_pair(n, pl);

        let mut buf = Vec::new();
        a.write(&mut buf).unwrap();
        let mut cur = Cursor::new(buf);
        let b = Alphabet::read(&mut cur).unwrap();

        assert_eq!(a.tags, b.tags);
        assert_eq!(a.pairs, b.pairs);
        for (tag, code) in &a.tag_index {
            assert_eq!(b.tag_index.get(tag), Some(code));
        }
        for (pair, code) in &a.pair_index {
            assert_eq!(b.pair_index.get(pair), Some(code));
        }
    }
}
