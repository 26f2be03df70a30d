//! Filtering service suggestions down to keywords present in the slide.

use slidemark_core::matcher::contains_word;

/// Keep the keywords that occur in `slide_text` as whole words, ignoring case.
///
/// Order is preserved and duplicates are kept; blank entries are dropped.
pub fn validate_keywords<S: AsRef<str>>(keywords: &[S], slide_text: &str) -> Vec<String> {
    keywords
        .iter()
        .map(|keyword| keyword.as_ref())
        .filter(|keyword| {
            let present = contains_word(slide_text, keyword);
            if !present {
                log::debug!("Dropping keyword not found in slide: {:?}", keyword);
            }
            present
        })
        .map(str::to_string)
        .collect()
}
