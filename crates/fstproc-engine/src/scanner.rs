//! Input scanner (§4.4.1): splits a text stream into word, blank, and
//! superblank segments, with backslash-escaping and null-flush handling.

use std::collections::{HashMap, HashSet};

/// The three character-class tables (plus restoration map) that configure
/// how the scanner segments a stream and how the engine matches within a
/// word.
#[derive(Debug, Clone, Default)]
pub struct CharClasses {
    /// Characters that belong to a word segment. Empty means "fall back to
    /// `char::is_alphanumeric`".
    pub word: HashSet<char>,
    /// Characters for which escaping changes the outcome (tracked for
    /// driver-layer configuration; the scanner itself escapes uniformly).
    pub escape_sensitive: HashSet<char>,
    /// Characters invisible to the transducer: removed before matching,
    /// reinserted at their original offsets in the emitted surface text.
    pub ignorable: HashSet<char>,
    /// Diacritic restoration map: `surface_form -> matching_form` (the
    /// direction `-r FILE` is parsed in). Folded into the matching form
    /// with [`CharClasses::fold_restore`] before running the transducer;
    /// the caller restores the original surface spelling afterward the
    /// same way ignorable characters are, by substituting the folded
    /// surface back out in the formatted result.
    pub restore: HashMap<char, char>,
}

impl CharClasses {
    /// The built-in default ignore set used unless the driver layer passes
    /// `-I` to disable it: the soft hyphen and zero-width characters that
    /// commonly leak into running text without carrying meaning for
    /// morphological matching.
    #[must_use]
    pub fn with_default_ignorable() -> Self {
        let mut ignorable = HashSet::new();
        ignorable.insert('\u{00AD}'); // soft hyphen
        ignorable.insert('\u{200B}'); // zero-width space
        ignorable.insert('\u{200C}'); // zero-width non-joiner
        ignorable.insert('\u{200D}'); // zero-width joiner
        Self { ignorable, ..Self::default() }
    }

    /// Folds every character present in `restore` to its matching-form
    /// counterpart (§4.4.6), one-for-one so the result stays the same
    /// length as `word`. A no-op when no restore table was loaded.
    #[must_use]
    pub fn fold_restore(&self, word: &str) -> String {
        if self.restore.is_empty() {
            return word.to_string();
        }
        word.chars().map(|c| self.restore.get(&c).copied().unwrap_or(c)).collect()
    }

    fn is_word(&self, c: char) -> bool {
        if self.word.is_empty() {
            c.is_alphanumeric()
        } else {
            self.word.contains(&c)
        }
    }

    /// Removes ignorable characters from `word`, returning the filtered
    /// text plus each removed character's original byte offset so it can
    /// be reinserted with [`CharClasses::reinsert_ignorable`].
    #[must_use]
    pub fn strip_ignorable(&self, word: &str) -> (String, Vec<(usize, char)>) {
        if self.ignorable.is_empty() {
            return (word.to_string(), Vec::new());
        }
        let mut filtered = String::with_capacity(word.len());
        let mut removed = Vec::new();
        for (offset, c) in word.char_indices() {
            if self.ignorable.contains(&c) {
                removed.push((offset, c));
            } else {
                filtered.push(c);
            }
        }
        (filtered, removed)
    }

    /// Reinserts characters previously removed by
    /// [`CharClasses::strip_ignorable`] back into `text` at their original
    /// byte offsets (best-effort: offsets beyond the rewritten text's
    /// length are appended at the end).
    #[must_use]
    pub fn reinsert_ignorable(&self, text: &str, removed: &[(usize, char)]) -> String {
        if removed.is_empty() {
            return text.to_string();
        }
        let mut out = String::with_capacity(text.len() + removed.len());
        let mut chars: Vec<(usize, char)> = text.char_indices().collect();
        chars.push((text.len(), '\0')); // sentinel end marker, never emitted
        let mut ri = 0;
        for &(offset, c) in &chars[..chars.len() - 1] {
            while ri < removed.len() && removed[ri].0 <= offset {
                out.push(removed[ri].1);
                ri += 1;
            }
            out.push(c);
        }
        while ri < removed.len() {
            out.push(removed[ri].1);
            ri += 1;
        }
        out
    }
}

/// One unit produced by [`scan`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// A maximal run of word characters the transducer may consume.
    Word(String),
    /// Whitespace/punctuation between words, passed through verbatim.
    Blank(String),
    /// A `[ … ]` region, opaque to the transducer, emitted unchanged.
    Superblank(String),
    /// A `U+0000` flush point in null-flush mode.
    NullFlush,
}

/// Scans `text` into segments per §4.4.1. `null_flush` gates whether a
/// `U+0000` splits the stream into a [`Segment::NullFlush`] (`-z`); when
/// it is `false`, a stray `U+0000` is treated as an ordinary non-word
/// character instead.
#[must_use]
pub fn scan(text: &str, classes: &CharClasses, null_flush: bool) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut word_buf = String::new();
    let mut blank_buf = String::new();
    let mut chars = text.chars().peekable();

    macro_rules! flush_word {
        () => {
            if !word_buf.is_empty() {
                segments.push(Segment::Word(std::mem::take(&mut word_buf)));
            }
        };
    }
    macro_rules! flush_blank {
        () => {
            if !blank_buf.is_empty() {
                segments.push(Segment::Blank(std::mem::take(&mut blank_buf)));
            }
        };
    }

    while let Some(c) = chars.next() {
        match c {
            '\\' => {
                if let Some(next) = chars.next() {
                    flush_blank!();
                    word_buf.push(next);
                }
                // trailing backslash with nothing after it: drop silently
            }
            '\u{0}' if null_flush => {
                flush_word!();
                flush_blank!();
                segments.push(Segment::NullFlush);
            }
            '[' => {
                flush_word!();
                flush_blank!();
                let mut sb = String::from("[");
                let mut closed = false;
                for c2 in chars.by_ref() {
                    sb.push(c2);
                    if c2 == ']' {
                        closed = true;
                        break;
                    }
                }
                // Unterminated superblank (input error, §7): emit verbatim
                // and continue rather than failing the whole stream.
                let _ = closed;
                segments.push(Segment::Superblank(sb));
            }
            c if classes.is_word(c) => {
                flush_blank!();
                word_buf.push(c);
            }
            c => {
                flush_word!();
                blank_buf.push(c);
            }
        }
    }
    flush_word!();
    flush_blank!();
    segments
}
