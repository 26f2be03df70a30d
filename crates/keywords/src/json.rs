//! Locating a JSON object inside free-form model output.
//!
//! The service is asked for bare JSON but often wraps it in prose or code
//! fences, so the answer is scanned for the first balanced `{...}` block.

/// The first balanced brace-delimited block in `text`, newlines included.
///
/// Braces inside JSON string literals are ignored. If a `{` never closes,
/// the scan moves on to the next `{`. Returns `None` when no block closes.
pub fn first_json_object(text: &str) -> Option<&str> {
    let mut search_from = 0;

    while let Some(offset) = text[search_from..].find('{') {
        let start = search_from + offset;
        if let Some(end) = balanced_end(&text[start..]) {
            return Some(&text[start..start + end]);
        }
        search_from = start + 1;
    }

    None
}

/// Byte length of the balanced block at the start of `text` (which begins with `{`).
fn balanced_end(text: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut in_string = false;
    let mut escaped = false;

    for (i, c) in text.char_indices() {
        if in_string {
            match c {
                _ if escaped => escaped = false,
                '\\' => escaped = true,
                '"' => in_string = false,
                _ => {}
            }
            continue;
        }

        match c {
            '"' => in_string = true,
            '{' => depth += 1,
            '}' => {
                depth = depth.checked_sub(1)?;
                if depth == 0 {
                    return Some(i + 1);
                }
            }
            _ => {}
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bare_object() {
        let text = r#"{"keywords": ["cache", "eviction"]}"#;
        assert_eq!(first_json_object(text), Some(text));
    }

    #[test]
    fn test_object_embedded_in_prose_across_lines() {
        let text = "Here are the keywords:\n```json\n{\n  \"keywords\": [\"cache\"]\n}\n```\nHope this helps!";
        assert_eq!(first_json_object(text), Some("{\n  \"keywords\": [\"cache\"]\n}"));
    }

    #[test]
    fn test_first_object_wins() {
        let text = r#"{"keywords": ["a"]} and later {"keywords": ["b"]}"#;
        assert_eq!(first_json_object(text), Some(r#"{"keywords": ["a"]}"#));
    }

    #[test]
    fn test_nested_objects_and_braces_in_strings() {
        let text = r#"x {"keywords": ["set {a}", "quote \" }"], "meta": {"n": 2}} y"#;
        assert_eq!(
            first_json_object(text),
            Some(r#"{"keywords": ["set {a}", "quote \" }"], "meta": {"n": 2}}"#)
        );
    }

    #[test]
    fn test_unclosed_brace_skips_to_next_block() {
        let text = r#"{ oops, then {"keywords": []}"#;
        assert_eq!(first_json_object(text), Some(r#"{"keywords": []}"#));
    }

    #[test]
    fn test_no_object() {
        assert_eq!(first_json_object("no json here"), None);
        assert_eq!(first_json_object("} stray {"), None);
        assert_eq!(first_json_object(""), None);
    }
}
