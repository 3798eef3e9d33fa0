//! Runtime configuration bundled by the driver layer (§4.4, §6): case
//! policy, pruning limits, null-flush, and the ignore/restore character
//! tables the scanner consults.

use crate::case::CasePolicy;
use crate::scanner::CharClasses;

/// Configuration shared by every mode driver for one run of the processor.
#[derive(Debug, Clone)]
pub struct EngineOptions {
    /// How surface case interacts with matching and emission.
    pub case_policy: CasePolicy,
    /// Append each committed candidate's accumulated weight to its output.
    pub show_weights: bool,
    /// Cap the number of analyses reported per word (`-N`), strongest first.
    pub max_analyses: Option<usize>,
    /// Cap the number of distinct weight classes reported per word (`-L`).
    pub max_weight_classes: Option<usize>,
    /// Flush output and echo a `U+0000` at every null-flush point in the
    /// input, resetting engine state between flushes.
    pub null_flush: bool,
    /// Character classification tables consulted by the scanner.
    pub char_classes: CharClasses,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            case_policy: CasePolicy::Default,
            show_weights: false,
            max_analyses: None,
            max_weight_classes: None,
            null_flush: false,
            char_classes: CharClasses::with_default_ignorable(),
        }
    }
}

impl EngineOptions {
    /// Starts from the defaults with case-sensitive matching (`-C`), as
    /// used by the bilingual, generation, and transliteration directions.
    #[must_use]
    pub fn case_sensitive() -> Self {
        Self { case_policy: CasePolicy::CaseSensitive, ..Self::default() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_case_folding_with_soft_hyphen_ignored() {
        let opts = EngineOptions::default();
        assert_eq!(opts.case_policy, CasePolicy::Default);
        assert!(opts.char_classes.ignorable.contains(&'\u{00AD}'));
        assert!(!opts.null_flush);
    }
}
