//! Case policy (§4.4.4): how surface case is matched against the
//! transducer and how dictionary case is re-applied to emitted output.

/// How surface-form case interacts with matching and emission.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CasePolicy {
    /// Surface case is consumed literally; no folding, no re-casing.
    CaseSensitive,
    /// Surface is matched case-insensitively; emission is re-cased by
    /// transplanting the surface's capitalisation pattern.
    Default,
    /// Emission uses dictionary case verbatim.
    DictionaryCase,
    /// Dictionary case when the dictionary form is defined, else surface
    /// case.
    CarefulCase,
}

/// The capitalisation shape of a surface word, used to re-cast output
/// under [`CasePolicy::Default`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapPattern {
    /// Every cased character is lowercase.
    AllLower,
    /// Only the first cased character is uppercase.
    Title,
    /// Every cased character is uppercase (and at least one is cased).
    AllUpper,
    /// None of the above — left as-is.
    Mixed,
}

/// Folds `c` to lowercase for case-insensitive matching.
#[must_use]
pub fn fold(c: char) -> char {
    c.to_lowercase().next().unwrap_or(c)
}

/// Classifies the capitalisation pattern of `word`.
#[must_use]
pub fn classify_pattern(word: &str) -> CapPattern {
    let cased: Vec<char> = word.chars().filter(|c| c.is_alphabetic()).collect();
    if cased.is_empty() {
        return CapPattern::Mixed;
    }
    if cased.iter().all(|c| c.is_lowercase()) {
        return CapPattern::AllLower;
    }
    if cased.iter().all(|c| c.is_uppercase()) {
        return CapPattern::AllUpper;
    }
    let mut iter = cased.iter();
    let first_upper = iter.next().is_some_and(|c| c.is_uppercase());
    let rest_lower = iter.all(|c| c.is_lowercase());
    if first_upper && rest_lower {
        return CapPattern::Title;
    }
    CapPattern::Mixed
}

/// Transplants `pattern` onto `output`: all-lower leaves it untouched,
/// all-upper uppercases every character, title uppercases only the first
/// cased character, and mixed leaves it untouched.
#[must_use]
pub fn apply_pattern(pattern: CapPattern, output: &str) -> String {
    match pattern {
        CapPattern::AllLower | CapPattern::Mixed => output.to_string(),
        CapPattern::AllUpper => output.to_uppercase(),
        CapPattern::Title => {
            let mut chars = output.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => String::new(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classify_recognises_each_pattern() {
        assert_eq!(classify_pattern("cats"), CapPattern::AllLower);
        assert_eq!(classify_pattern("Cats"), CapPattern::Title);
        assert_eq!(classify_pattern("CATS"), CapPattern::AllUpper);
        assert_eq!(classify_pattern("CaTs"), CapPattern::Mixed);
    }

    #[test]
    fn apply_pattern_transplants_title_case() {
        assert_eq!(apply_pattern(CapPattern::Title, "cat"), "Cat");
        assert_eq!(apply_pattern(CapPattern::AllUpper, "cat"), "CAT");
        assert_eq!(apply_pattern(CapPattern::AllLower, "Cat"), "Cat");
    }

    #[test]
    fn fold_lowercases_ascii_and_unicode() {
        assert_eq!(fold('A'), 'a');
        assert_eq!(fold('a'), 'a');
    }
}
