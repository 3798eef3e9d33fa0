//! Mode drivers (§4.4.3): each differs only in which transducer is used,
//! the case policy, how emissions are formatted, and the unknown-word
//! marker — all built on the same [`crate::traversal::run_word`] primitive.

use fstproc_alphabet::{Alphabet, Symbol};
use fstproc_transducer::Transducer;

use crate::case::{apply_pattern, classify_pattern, CasePolicy};
use crate::options::EngineOptions;
use crate::pruning::{prune_max_analyses, prune_weight_classes};
use crate::traversal::{run_word, select_committed};

/// Which driver is processing the stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    /// Surface-to-dictionary analysis, `^surface/analysis1/analysis2$`.
    Analysis,
    /// Dictionary-to-surface generation, one surface form per lexical unit.
    Generation(GenerationSubmode),
    /// Bilingual transfer, `^src/tgt$`.
    Bilingual {
        /// When set, the surface form is carried through unchanged
        /// alongside the translated lexical form.
        keep_surface: bool,
    },
    /// Post-generation rewrites over adjacent output tokens.
    PostGeneration,
    /// Like post-generation, with different token delimiters.
    InterGeneration,
    /// Verbatim one-to-one transliteration.
    Transliteration,
    /// SGML-tagged surface annotation.
    Sao,
    /// Analysis with compound-splitting retry on unknown words.
    Decomposition,
}

/// Generation sub-modes (`gm_*`), selecting how unknown lemmas and
/// debugging detail are handled.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GenerationSubmode {
    /// Emit `#surface` for unknown lemmas.
    Unknown,
    /// Drop unknown marks entirely.
    Clean,
    /// Keep the full debugging form (lemma and tags) on failure.
    All,
    /// Keep the lexical form, stripping unknown marks.
    Tagged,
    /// Tagged, with marks always stripped.
    TaggedNm,
    /// Prefer dictionary case, falling back to surface case.
    CarefulCase,
}

fn render_symbols(alphabet: &Alphabet, symbols: &[Symbol]) -> String {
    let mut out = String::new();
    for &sym in symbols {
        alphabet.render(sym, false, &mut out);
    }
    out
}

fn strip_brackets(line: &str) -> &str {
    line.strip_prefix('^').and_then(|s| s.strip_suffix('$')).unwrap_or(line)
}

fn split_bilingual(inner: &str) -> (&str, &str) {
    inner.split_once('/').unwrap_or((inner, ""))
}

/// Runs the `analysis` driver over one surface word, yielding
/// `^surface/analysis1/analysis2$` or `^surface/*surface$` if unknown.
///
/// Applies `options`' weight-class (`-L`) then analyses-count (`-N`)
/// pruning to the committed candidate set before rendering (§4.4.5), and
/// appends each analysis's accumulated weight when `options.show_weights`
/// is set.
#[must_use]
pub fn analysis_mode(alphabet: &Alphabet, transducer: &Transducer, surface_word: &str, options: &EngineOptions) -> String {
    let input: Vec<Symbol> = surface_word.chars().map(|c| c as Symbol).collect();
    let case_insensitive = options.case_policy == CasePolicy::Default;
    let mut committed = select_committed(run_word(alphabet, transducer, &input, case_insensitive));

    if committed.is_empty() {
        return format!("^{surface_word}/*{surface_word}$");
    }

    if let Some(k) = options.max_weight_classes {
        committed = prune_weight_classes(committed, k);
    }
    if let Some(n) = options.max_analyses {
        committed = prune_max_analyses(committed, n);
    }

    let pattern = classify_pattern(surface_word);
    let analyses: Vec<String> = committed
        .iter()
        .map(|c| {
            let rendered = render_symbols(alphabet, &c.emission);
            let rendered = if options.case_policy == CasePolicy::Default {
                apply_pattern(pattern, &rendered)
            } else {
                rendered
            };
            if options.show_weights {
                format!("{rendered}<W:{:.6}>", c.weight)
            } else {
                rendered
            }
        })
        .collect();
    format!("^{surface_word}/{}$", analyses.join("/"))
}

/// Runs the `generation` driver over one `^lexical-form$` unit.
#[must_use]
pub fn generation_mode(alphabet: &Alphabet, transducer: &Transducer, line: &str, submode: GenerationSubmode) -> String {
    let inner = strip_brackets(line.trim());
    let tokens = alphabet.tokenize(inner);
    let committed = select_committed(run_word(alphabet, transducer, &tokens, false));

    if committed.is_empty() {
        return match submode {
            GenerationSubmode::Clean | GenerationSubmode::TaggedNm => inner.to_string(),
            GenerationSubmode::All | GenerationSubmode::Tagged => format!("#{inner}"),
            GenerationSubmode::Unknown | GenerationSubmode::CarefulCase => format!("#{inner}"),
        };
    }
    render_symbols(alphabet, &committed[0].emission)
}

/// Runs the `bilingual` driver over one `^surface/lexical$` unit
/// (`keep_surface = true` for surface-bilingual, `false` for plain
/// bilingual where the left-hand side is the lexical source form itself).
#[must_use]
pub fn bilingual_mode(alphabet: &Alphabet, transducer: &Transducer, line: &str, keep_surface: bool) -> String {
    let inner = strip_brackets(line.trim());
    let (surface, lexical) = split_bilingual(inner);
    let lexical = if lexical.is_empty() { surface } else { lexical };

    let tokens = alphabet.tokenize(lexical);
    let committed = select_committed(run_word(alphabet, transducer, &tokens, false));

    let left = if keep_surface { surface } else { lexical };
    if committed.is_empty() {
        format!("^{left}/@{lexical}$")
    } else {
        let rendered = render_symbols(alphabet, &committed[0].emission);
        format!("^{left}/{rendered}$")
    }
}

/// Runs the `transliteration` driver: verbatim one-to-one mapping, no
/// markers. Unmatched characters are passed through literally.
#[must_use]
pub fn transliteration_mode(alphabet: &Alphabet, transducer: &Transducer, text: &str) -> String {
    rewrite_stream(alphabet, transducer, text, None)
}

/// Runs the `post-generation` / `inter-generation` drivers: scans the
/// whole already-generated stream (not split on word/blank boundaries,
/// since these rules rewrite across adjacent tokens) and applies the
/// transducer's longest match at each position, copying through whatever
/// is not rewritten.
#[must_use]
pub fn postgeneration_mode(alphabet: &Alphabet, transducer: &Transducer, text: &str) -> String {
    rewrite_stream(alphabet, transducer, text, None)
}

/// Runs the `SAO` driver: surface case, SGML-tagged analysis.
#[must_use]
pub fn sao_mode(alphabet: &Alphabet, transducer: &Transducer, surface_word: &str) -> String {
    let input: Vec<Symbol> = surface_word.chars().map(|c| c as Symbol).collect();
    let committed = select_committed(run_word(alphabet, transducer, &input, false));
    match committed.first() {
        Some(c) => format!("<w>{}</w>", render_symbols(alphabet, &c.emission)),
        None => format!("<w>{surface_word}</w>"),
    }
}

/// Runs `analysis` with compound-splitting retry: on an unknown word,
/// tries every prefix/suffix split and joins successful halves with `+`.
#[must_use]
pub fn decomposition_mode(alphabet: &Alphabet, transducer: &Transducer, surface_word: &str, options: &EngineOptions) -> String {
    let plain = analysis_mode(alphabet, transducer, surface_word, options);
    if !plain.contains("/*") {
        return plain;
    }

    let chars: Vec<char> = surface_word.chars().collect();
    for split in 1..chars.len() {
        let left: String = chars[..split].iter().collect();
        let right: String = chars[split..].iter().collect();
        let left_res = analysis_mode(alphabet, transducer, &left, options);
        let right_res = analysis_mode(alphabet, transducer, &right, options);
        if !left_res.contains("/*") && !right_res.contains("/*") {
            let left_lex = strip_brackets(&left_res).split_once('/').map_or(left_res.as_str(), |(_, l)| l);
            let right_lex = strip_brackets(&right_res).split_once('/').map_or(right_res.as_str(), |(_, l)| l);
            return format!("^{surface_word}/{left_lex}+{right_lex}$");
        }
    }
    plain
}

fn rewrite_stream(alphabet: &Alphabet, transducer: &Transducer, text: &str, _delimiter: Option<char>) -> String {
    let tokens = alphabet.tokenize(text);
    let mut out = String::new();
    let mut pos = 0;
    while pos < tokens.len() {
        let remaining = &tokens[pos..];
        let committed = select_committed(run_word(alphabet, transducer, remaining, false));
        if let Some(best) = committed.first() {
            out.push_str(&render_symbols(alphabet, &best.emission));
            pos += best.input_len.max(1);
        } else {
            alphabet.render(tokens[pos], false, &mut out);
            pos += 1;
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use fstproc_alphabet::Alphabet;
    use fstproc_transducer::Transducer;

    fn cats_transducer() -> (Alphabet, Transducer) {
        // cats -> cat<n><pl>: the surface 's' is consumed and replaced by
        // the two inserted tags, so the whole word is matched.
        let mut a = Alphabet::new();
        let n = a.intern_tag("<n>");
        let pl = a.intern_tag("<pl>");
        let mut t = Transducer::with_states(7);
        let mut pc = |a: &mut Alphabet, c: char| a.encode_pair(c as Symbol, c as Symbol);
        t.add_edge(0, pc(&mut a, 'c'), 1, 0.0);
        t.add_edge(1, pc(&mut a, 'a'), 2, 0.0);
        t.add_edge(2, pc(&mut a, 't'), 3, 0.0);
        let p_s = a.encode_pair('s' as Symbol, 0); // consume 's', emit nothing
        let p_n = a.encode_pair(0, n); // insert <n>
        let p_pl = a.encode_pair(0, pl); // insert <pl>
        t.add_edge(3, p_s, 4, 0.0);
        t.add_edge(4, p_n, 5, 0.0);
        t.add_edge(5, p_pl, 6, 0.0);
        t.set_final(6, 0.0);
        (a, t)
    }

    #[test]
    fn analysis_scenario_lowercase() {
        let (a, t) = cats_transducer();
        assert_eq!(analysis_mode(&a, &t, "cats", &EngineOptions::default()), "^cats/cat<n><pl>$");
    }

    #[test]
    fn analysis_scenario_titlecase_reprojects() {
        let (a, t) = cats_transducer();
        assert_eq!(analysis_mode(&a, &t, "Cats", &EngineOptions::default()), "^Cats/Cat<n><pl>$");
    }

    #[test]
    fn analysis_scenario_unknown_word() {
        let (a, t) = cats_transducer();
        assert_eq!(analysis_mode(&a, &t, "xyzzy", &EngineOptions::default()), "^xyzzy/*xyzzy$");
    }

    // cats -> cat<n><pl> (weight 0.0) or cats -> cats (weight 1.0), both
    // consuming all four input characters, for exercising weight display
    // and pruning.
    fn cats_transducer_two_weighted_paths() -> (Alphabet, Transducer) {
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
        let p_s_literal = pc(&mut a, 's');
        t.add_edge(3, p_s_literal, 6, 1.0); // alt path: pass 's' straight through, heavier
        (a, t)
    }

    #[test]
    fn analysis_mode_appends_weight_when_enabled() {
        let (a, t) = cats_transducer_two_weighted_paths();
        let options = EngineOptions { show_weights: true, ..EngineOptions::default() };
        assert_eq!(analysis_mode(&a, &t, "cats", &options), "^cats/cat<n><pl><W:0.000000>/cats<W:1.000000>$");
    }

    #[test]
    fn analysis_mode_max_analyses_keeps_only_the_lightest() {
        let (a, t) = cats_transducer_two_weighted_paths();
        let options = EngineOptions { max_analyses: Some(1), ..EngineOptions::default() };
        assert_eq!(analysis_mode(&a, &t, "cats", &options), "^cats/cat<n><pl>$");
    }

    #[test]
    fn analysis_mode_max_weight_classes_keeps_only_the_lightest_class() {
        let (a, t) = cats_transducer_two_weighted_paths();
        let options = EngineOptions { max_weight_classes: Some(1), ..EngineOptions::default() };
        assert_eq!(analysis_mode(&a, &t, "cats", &options), "^cats/cat<n><pl>$");
    }

    fn generation_transducer() -> (Alphabet, Transducer) {
        // cat<n><pl> -> cats
        let mut a = Alphabet::new();
        let n = a.intern_tag("<n>");
        let pl = a.intern_tag("<pl>");
        let mut t = Transducer::with_states(6);
        let mut pc = |a: &mut Alphabet, c: char| a.encode_pair(c as Symbol, c as Symbol);
        t.add_edge(0, pc(&mut a, 'c'), 1, 0.0);
        t.add_edge(1, pc(&mut a, 'a'), 2, 0.0);
        t.add_edge(2, pc(&mut a, 't'), 3, 0.0);
        let p_n = a.encode_pair(n, 0); // consume <n>, emit nothing
        let p_pl = a.encode_pair(pl, 's' as Symbol); // consume <pl>, emit 's'
        t.add_edge(3, p_n, 4, 0.0);
        t.add_edge(4, p_pl, 5, 0.0);
        t.set_final(5, 0.0);
        (a, t)
    }

    #[test]
    fn generation_scenario_emits_surface_form() {
        let (a, t) = generation_transducer();
        assert_eq!(generation_mode(&a, &t, "^cat<n><pl>$", GenerationSubmode::Unknown), "cats");
    }

    fn bilingual_transducer() -> (Alphabet, Transducer) {
        let mut a = Alphabet::new();
        let n = a.intern_tag("<n>");
        let pl = a.intern_tag("<pl>");
        let mut t = Transducer::with_states(6);
        let mut pc_in = |a: &mut Alphabet, c: char, o: char| a.encode_pair(c as Symbol, o as Symbol);
        t.add_edge(0, pc_in(&mut a, 'c', 'g'), 1, 0.0);
        t.add_edge(1, pc_in(&mut a, 'a', 'a'), 2, 0.0);
        t.add_edge(2, pc_in(&mut a, 't', 't'), 3, 0.0);
        let extra_o = a.encode_pair(0, 'o' as Symbol);
        t.add_edge(3, extra_o, 4, 0.0);
        let p_n = a.encode_pair(n, n);
        let p_pl = a.encode_pair(pl, pl);
        t.add_edge(4, p_n, 5, 0.0);
        t.add_edge(5, p_pl, 5, 0.0);
        t.set_final(5, 0.0);
        (a, t)
    }

    #[test]
    fn bilingual_surface_scenario() {
        let (a, t) = bilingual_transducer();
        assert_eq!(bilingual_mode(&a, &t, "^cats/cat<n><pl>$", true), "^cats/gato<n><pl>$");
    }
}
