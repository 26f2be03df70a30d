//! Case-insensitive whole-word keyword matching.

use regex::{Matches, Regex};

/// A compiled whole-word, case-insensitive pattern for one keyword.
///
/// Word boundaries are Unicode-aware, and the keyword is escaped so that
/// characters like `+` or `.` match literally.
#[derive(Debug, Clone)]
pub struct WordMatcher {
    keyword: String,
    regex: Regex,
}

impl WordMatcher {
    /// Compile a matcher for `keyword`.
    ///
    /// Returns `None` for blank keywords, which can never bound a word.
    pub fn new(keyword: &str) -> Option<Self> {
        if keyword.trim().is_empty() {
            return None;
        }

        let pattern = format!(r"(?i)\b{}\b", regex::escape(keyword));
        match Regex::new(&pattern) {
            Ok(regex) => Some(Self {
                keyword: keyword.to_string(),
                regex,
            }),
            Err(e) => {
                log::warn!("Could not compile pattern for keyword '{}': {}", keyword, e);
                None
            }
        }
    }

    /// The keyword as it was given.
    pub fn keyword(&self) -> &str {
        &self.keyword
    }

    /// Whether the keyword occurs as a whole word anywhere in `text`.
    pub fn is_match(&self, text: &str) -> bool {
        self.regex.is_match(text)
    }

    /// All non-overlapping whole-word occurrences, left to right.
    pub fn find_iter<'r, 't>(&'r self, text: &'t str) -> Matches<'r, 't> {
        self.regex.find_iter(text)
    }
}

/// Whether `keyword` occurs in `text` as a whole word, ignoring case.
pub fn contains_word(text: &str, keyword: &str) -> bool {
    WordMatcher::new(keyword).is_some_and(|m| m.is_match(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_whole_word_only() {
        assert!(contains_word("a cat sat", "cat"));
        assert!(!contains_word("the category page", "cat"));
        assert!(!contains_word("concatenate", "cat"));
    }

    #[test]
    fn test_case_insensitive() {
        assert!(contains_word("I like python", "Python"));
        assert!(contains_word("PYTHON rocks", "python"));
    }

    #[test]
    fn test_metacharacters_are_literal() {
        assert!(contains_word("version 3.10 released", "3.10"));
        assert!(!contains_word("version 3x10 released", "3.10"));
        assert!(contains_word("call f(x) now", "f(x"));
    }

    #[test]
    fn test_unicode_word_boundaries() {
        assert!(contains_word("die Größe zählt", "größe"));
        assert!(!contains_word("Größenordnung", "größe"));
    }

    #[test]
    fn test_blank_keyword_never_matches() {
        assert!(WordMatcher::new("").is_none());
        assert!(WordMatcher::new("   ").is_none());
        assert!(!contains_word("anything", ""));
    }

    #[test]
    fn test_find_iter_reports_source_casing() {
        let m = WordMatcher::new("cache").unwrap();
        let found: Vec<&str> = m.find_iter("Cache hit, CACHE miss, cached").map(|m| m.as_str()).collect();
        assert_eq!(found, vec!["Cache", "CACHE"]);
    }

    #[test]
    fn test_matches_outlive_matcher() {
        let text = String::from("index the index");
        let matches: Vec<regex::Match<'_>> = {
            let m = WordMatcher::new("INDEX").unwrap();
            let found = m.find_iter(&text).collect();
            found
        };
        let spans: Vec<(usize, usize)> = matches.iter().map(|m| (m.start(), m.end())).collect();
        assert_eq!(spans, vec![(0, 5), (10, 15)]);
    }
}
