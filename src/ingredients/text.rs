//! Whole-word phrase matching over ingredient text
//!
//! Text is split into lowercase alphanumeric words; a phrase matches when its
//! words occur consecutively. "peanut oil" contains "peanut", "peanutty" does
//! not.

/// Lowercase words of a text, in order
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct WordIndex {
    words: Vec<String>,
}

/// Split into lowercase words. A lone "e" followed by a number is joined
/// into an E-number, so "E 965" and "E-965" read as "e965".
pub fn tokenize(text: &str) -> Vec<String> {
    let raw: Vec<String> = text
        .split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
        .map(str::to_lowercase)
        .collect();

    let mut words = Vec::with_capacity(raw.len());
    let mut iter = raw.into_iter().peekable();
    while let Some(word) = iter.next() {
        let next_is_code = iter
            .peek()
            .map(|n| (3..=4).contains(&n.len()) && n.chars().all(|c| c.is_ascii_digit()))
            .unwrap_or(false);
        if word == "e" && next_is_code {
            if let Some(code) = iter.next() {
                words.push(format!("e{}", code));
            }
        } else {
            words.push(word);
        }
    }
    words
}

impl WordIndex {
    pub fn new(text: &str) -> Self {
        Self { words: tokenize(text) }
    }

    pub fn is_empty(&self) -> bool {
        self.words.iter().all(String::is_empty)
    }

    /// Whether the phrase occurs as whole consecutive words
    pub fn contains_phrase(&self, phrase: &str) -> bool {
        let needle = tokenize(phrase);
        if needle.is_empty() || needle.len() > self.words.len() {
            return false;
        }
        self.words.windows(needle.len()).any(|w| w == needle.as_slice())
    }

    /// The phrases from the list that occur in the text, in list order
    pub fn matching<'a, S: AsRef<str>>(&self, phrases: &'a [S]) -> Vec<&'a str> {
        phrases
            .iter()
            .map(AsRef::as_ref)
            .filter(|p| self.contains_phrase(p))
            .collect()
    }

    /// Copy with every occurrence of the phrases blanked out. Blanked words
    /// never match, so remaining words cannot join across a removed phrase.
    pub fn without_phrases<S: AsRef<str>>(&self, phrases: &[S]) -> WordIndex {
        let mut words = self.words.clone();
        for phrase in phrases {
            let needle = tokenize(phrase.as_ref());
            if needle.is_empty() || needle.len() > words.len() {
                continue;
            }
            for start in 0..=(words.len() - needle.len()) {
                if words[start..start + needle.len()] == needle[..] {
                    for word in &mut words[start..start + needle.len()] {
                        word.clear();
                    }
                }
            }
        }
        WordIndex { words }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_word_matching() {
        let index = WordIndex::new("Sugar, PEANUT OIL, salt");
        assert!(index.contains_phrase("peanut"));
        assert!(index.contains_phrase("peanut oil"));
        assert!(!index.contains_phrase("oil salt pepper"));

        let index = WordIndex::new("a peanutty flavor");
        assert!(!index.contains_phrase("peanut"));
    }

    #[test]
    fn test_e_numbers() {
        assert_eq!(tokenize("sweetener (E965)"), vec!["sweetener", "e965"]);
        assert_eq!(tokenize("E-965, e 420"), vec!["e965", "e420"]);
        assert_eq!(tokenize("vitamin e 5 mg"), vec!["vitamin", "e", "5", "mg"]);
    }

    #[test]
    fn test_without_phrases() {
        let index = WordIndex::new("sugar alcohols (maltitol), cocoa");
        assert!(index.contains_phrase("sugar"));
        let cleaned = index.without_phrases(&["sugar alcohols"]);
        assert!(!cleaned.contains_phrase("sugar"));
        assert!(cleaned.contains_phrase("maltitol"));
    }

    #[test]
    fn test_matching_preserves_list_order() {
        let index = WordIndex::new("milk, whey, butter");
        let found = index.matching(&["butter", "cream", "milk"]);
        assert_eq!(found, vec!["butter", "milk"]);
    }

    #[test]
    fn test_empty() {
        assert!(WordIndex::new(" ,; ").is_empty());
        assert!(!WordIndex::new("").contains_phrase(""));
    }
}
