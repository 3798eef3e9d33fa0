//! fstproc-engine — the streaming traversal engine (C4): scanning, case
//! policy, non-deterministic longest-match traversal, mode drivers, and
//! weight-based pruning, wired together by [`Processor`].

#![deny(missing_docs)]

pub mod case;
pub mod error;
pub mod modes;
pub mod options;
pub mod pruning;
pub mod scanner;
pub mod traversal;
mod util;

pub use case::{CapPattern, CasePolicy};
pub use error::{EngineError, EngineResult};
pub use modes::{GenerationSubmode, Mode};
pub use options::EngineOptions;
pub use pruning::{prune_max_analyses, prune_weight_classes};
pub use scanner::{CharClasses, Segment};
pub use traversal::{run_word, select_committed, Candidate};

use fstproc_alphabet::Alphabet;
use fstproc_transducer::Transducer;

use modes::{
    analysis_mode, bilingual_mode, decomposition_mode, generation_mode, postgeneration_mode, sao_mode,
    transliteration_mode,
};

/// Drives one transducer over a text stream in a single [`Mode`], per
/// §4.4: scans the stream into word/blank/superblank/null-flush segments,
/// dispatches each word through the configured mode's driver, and passes
/// everything else through unchanged.
pub struct Processor<'a> {
    alphabet: &'a Alphabet,
    transducer: &'a Transducer,
    mode: Mode,
    options: EngineOptions,
}

impl<'a> Processor<'a> {
    /// Builds a processor over `transducer` (interpreted against
    /// `alphabet`) running in `mode` with `options`.
    #[must_use]
    pub fn new(alphabet: &'a Alphabet, transducer: &'a Transducer, mode: Mode, options: EngineOptions) -> Self {
        Self { alphabet, transducer, mode, options }
    }

    /// Processes `input` start to finish, honouring null-flush boundaries:
    /// each [`Segment::NullFlush`] re-emits `U+0000` into the output, but
    /// otherwise every word is handled independently, so engine state never
    /// leaks from one flushed unit to the next.
    #[must_use]
    pub fn process_stream(&self, input: &str) -> String {
        let segments = scanner::scan(input, &self.options.char_classes, self.options.null_flush);
        let mut out = String::with_capacity(input.len());
        for segment in segments {
            match segment {
                Segment::Word(word) => out.push_str(&self.process_word(&word)),
                Segment::Blank(blank) | Segment::Superblank(blank) => out.push_str(&blank),
                Segment::NullFlush => out.push('\u{0}'),
            }
        }
        out
    }

    fn process_word(&self, word: &str) -> String {
        match self.mode {
            Mode::Analysis => self.with_surface_preprocessing(word, analysis_mode),
            Mode::Generation(submode) => generation_mode(self.alphabet, self.transducer, word, submode),
            Mode::Bilingual { keep_surface } => bilingual_mode(self.alphabet, self.transducer, word, keep_surface),
            Mode::PostGeneration | Mode::InterGeneration => postgeneration_mode(self.alphabet, self.transducer, word),
            Mode::Transliteration => transliteration_mode(self.alphabet, self.transducer, word),
            Mode::Sao => sao_mode(self.alphabet, self.transducer, word),
            Mode::Decomposition => self.with_surface_preprocessing(word, decomposition_mode),
        }
    }

    /// Folds diacritic-restoration characters (§4.4.6) and strips ignorable
    /// characters (soft hyphen, zero-width joiners, …) from `word` before
    /// handing it to `driver` (shared by [`Mode::Analysis`] and
    /// [`Mode::Decomposition`], which get identical treatment here), then
    /// restores the original surface spelling in the formatted result.
    fn with_surface_preprocessing(
        &self,
        word: &str,
        driver: fn(&Alphabet, &Transducer, &str, &EngineOptions) -> String,
    ) -> String {
        let folded = self.options.char_classes.fold_restore(word);
        let (filtered, removed) = self.options.char_classes.strip_ignorable(&folded);
        if folded == word && removed.is_empty() {
            return driver(self.alphabet, self.transducer, word, &self.options);
        }
        let result = driver(self.alphabet, self.transducer, &filtered, &self.options);
        result.replacen(&format!("^{filtered}"), &format!("^{word}"), 1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fstproc_alphabet::Symbol;

    fn cats_transducer() -> (Alphabet, Transducer) {
        let mut a = Alphabet::new();
        let n = a.intern_tag("<n>");
        let pl = a.intern_tag("<pl>");
        let mut t = Transducer::with_states(7);
        let mut pc = |a: &mut Alphabet, c: char| a.encode_pair(c as Symbol, c as Symbol);
        t.add_edge(0, pc(&mut a, 'c'), 1, 0.0);
        t.add_edge(1, pc(&mut a, 'a'), 2, 0.0);
        t.add_edge(2, pc(&mut a, 't'), 3, 0.0);
        let p_s = a.encode_pair('s' as Symbol, 0);
        let p_n = a.encode_pair(0, n);
        let p_pl = a.encode_pair(0, pl);
        t.add_edge(3, p_s, 4, 0.0);
        t.add_edge(4, p_n, 5, 0.0);
        t.add_edge(5, p_pl, 6, 0.0);
        t.set_final(6, 0.0);
        (a, t)
    }

    #[test]
    fn process_stream_preserves_blanks_between_words() {
        let (a, t) = cats_transducer();
        let processor = Processor::new(&a, &t, Mode::Analysis, EngineOptions::default());
        let out = processor.process_stream("cats  xyzzy");
        assert_eq!(out, "^cats/cat<n><pl>$  ^xyzzy/*xyzzy$");
    }

    #[test]
    fn process_stream_emits_null_flush_between_segments_when_enabled() {
        let (a, t) = cats_transducer();
        let options = EngineOptions { null_flush: true, ..EngineOptions::default() };
        let processor = Processor::new(&a, &t, Mode::Analysis, options);
        let out = processor.process_stream("cats\u{0}xyzzy");
        assert_eq!(out, "^cats/cat<n><pl>$\u{0}^xyzzy/*xyzzy$");
    }

    #[test]
    fn process_stream_passes_superblanks_through_untouched() {
        let (a, t) = cats_transducer();
        let processor = Processor::new(&a, &t, Mode::Analysis, EngineOptions::default());
        let out = processor.process_stream("cats[<tag>]xyzzy");
        assert_eq!(out, "^cats/cat<n><pl>$[<tag>]^xyzzy/*xyzzy$");
    }

    #[test]
    fn process_word_shows_weight_when_enabled() {
        let (a, t) = cats_transducer();
        let options = EngineOptions { show_weights: true, ..EngineOptions::default() };
        let processor = Processor::new(&a, &t, Mode::Analysis, options);
        let out = processor.process_stream("cats");
        assert_eq!(out, "^cats/cat<n><pl><W:0.000000>$");
    }

    #[test]
    fn process_word_applies_diacritic_restoration_before_matching() {
        let (a, t) = cats_transducer();
        let mut options = EngineOptions::default();
        options.char_classes.restore.insert('á', 'a');
        let processor = Processor::new(&a, &t, Mode::Analysis, options);
        let out = processor.process_stream("cáts");
        assert_eq!(out, "^cáts/cat<n><pl>$");
    }

    #[test]
    fn decomposition_mode_strips_ignorable_like_analysis() {
        let (a, t) = cats_transducer();
        let processor = Processor::new(&a, &t, Mode::Decomposition, EngineOptions::default());
        let out = processor.process_stream("ca\u{00AD}ts");
        assert_eq!(out, "^ca\u{00AD}ts/cat<n><pl>$");
    }
}
